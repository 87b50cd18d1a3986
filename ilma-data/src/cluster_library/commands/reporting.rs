//! Attribute reporting configuration

use core::convert::TryFrom;

use byteorder::{ByteOrder, LittleEndian};

use crate::cluster_library::{AttributeDataType, AttributeValue, ClusterLibraryStatus};
use crate::common::AttributeId;
use crate::pack::Pack;
use crate::Error;

/// Reports are sent by the server
const DIRECTION_REPORTED: u8 = 0x00;

/// Reporting configuration record
#[derive(Clone, Debug, PartialEq)]
pub struct ReportingConfiguration {
    pub identifier: u32,
    pub data_type: AttributeDataType,
    /// Minimum reporting interval in seconds
    pub minimum_interval: u16,
    /// Maximum reporting interval in seconds
    pub maximum_interval: u16,
    /// Only carried by analog data types
    pub reportable_change: Option<AttributeValue>,
}

/// Configure attribute reporting
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigureReporting {
    pub records: Vec<ReportingConfiguration>,
}

impl Pack<ConfigureReporting, Error> for ConfigureReporting {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        let mut offset = 0;
        for record in self.records.iter() {
            if data.len() < offset + 10 {
                return Err(Error::WrongNumberOfBytes);
            }
            data[offset] = DIRECTION_REPORTED;
            LittleEndian::write_u32(&mut data[offset + 1..offset + 5], record.identifier);
            data[offset + 5] = u8::from(record.data_type);
            LittleEndian::write_u16(&mut data[offset + 6..offset + 8], record.minimum_interval);
            LittleEndian::write_u16(&mut data[offset + 8..offset + 10], record.maximum_interval);
            offset += 10;
            if let Some(change) = &record.reportable_change {
                if change.data_type() != record.data_type {
                    return Err(Error::InvalidValue);
                }
                offset += change.pack(&mut data[offset..])?;
            }
        }
        Ok(offset)
    }

    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        let mut offset = 0;
        let mut records = Vec::new();
        while offset < data.len() {
            if data.len() < offset + 10 {
                return Err(Error::WrongNumberOfBytes);
            }
            if data[offset] != DIRECTION_REPORTED {
                return Err(Error::NotImplemented);
            }
            let identifier = LittleEndian::read_u32(&data[offset + 1..offset + 5]);
            let data_type = AttributeDataType::try_from(data[offset + 5])?;
            let minimum_interval = LittleEndian::read_u16(&data[offset + 6..offset + 8]);
            let maximum_interval = LittleEndian::read_u16(&data[offset + 8..offset + 10]);
            offset += 10;
            let reportable_change = if data_type.is_analog() {
                let (value, used) = AttributeValue::unpack(&data[offset..], data_type)?;
                offset += used;
                Some(value)
            } else {
                None
            };
            records.push(ReportingConfiguration {
                identifier,
                data_type,
                minimum_interval,
                maximum_interval,
                reportable_change,
            });
        }
        Ok((Self { records }, offset))
    }
}

/// Status record of a configure reporting response
#[derive(Clone, Debug, PartialEq)]
pub struct ReportingStatus {
    pub status: ClusterLibraryStatus,
    /// Only present on failure
    pub identifier: Option<AttributeId>,
}

/// Response to a configure reporting request
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigureReportingResponse {
    pub records: Vec<ReportingStatus>,
}

impl ConfigureReportingResponse {
    pub fn failure(&self) -> Option<ClusterLibraryStatus> {
        self.records
            .iter()
            .map(|r| r.status)
            .find(|s| *s != ClusterLibraryStatus::Success)
    }
}

impl Pack<ConfigureReportingResponse, Error> for ConfigureReportingResponse {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        let mut offset = 0;
        for record in self.records.iter() {
            let size = if record.identifier.is_some() { 4 } else { 1 };
            if data.len() < offset + size {
                return Err(Error::WrongNumberOfBytes);
            }
            data[offset] = u8::from(record.status);
            if let Some(identifier) = record.identifier {
                data[offset + 1] = DIRECTION_REPORTED;
                LittleEndian::write_u16(&mut data[offset + 2..offset + 4], identifier);
            }
            offset += size;
        }
        Ok(offset)
    }

    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        let mut offset = 0;
        let mut records = Vec::new();
        while offset < data.len() {
            let status = ClusterLibraryStatus::from_byte(data[offset]);
            offset += 1;
            let identifier = if status == ClusterLibraryStatus::Success {
                None
            } else {
                if data.len() < offset + 3 {
                    return Err(Error::WrongNumberOfBytes);
                }
                let identifier = LittleEndian::read_u16(&data[offset + 1..offset + 3]);
                offset += 3;
                Some(identifier)
            };
            records.push(ReportingStatus { status, identifier });
        }
        Ok((Self { records }, offset))
    }
}

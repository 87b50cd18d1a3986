//! Global attribute commands
//!
//! Requests from a client carry 32-bit attribute identifiers, responses and
//! reports from a server carry 16-bit identifiers.

use core::convert::TryFrom;

use byteorder::{ByteOrder, LittleEndian};

use crate::cluster_library::{AttributeDataType, AttributeValue, ClusterLibraryStatus};
use crate::common::AttributeId;
use crate::pack::Pack;
use crate::Error;

/// Read one or more attributes
#[derive(Clone, Debug, PartialEq)]
pub struct ReadAttributes {
    pub attributes: Vec<u32>,
}

impl Pack<ReadAttributes, Error> for ReadAttributes {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        if data.len() < self.attributes.len() * 4 {
            return Err(Error::WrongNumberOfBytes);
        }
        let mut offset = 0;
        for attribute in self.attributes.iter() {
            LittleEndian::write_u32(&mut data[offset..offset + 4], *attribute);
            offset += 4;
        }
        Ok(offset)
    }

    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        if data.len() % 4 != 0 {
            return Err(Error::WrongNumberOfBytes);
        }
        let attributes = data.chunks_exact(4).map(LittleEndian::read_u32).collect();
        Ok((Self { attributes }, data.len()))
    }
}

/// Status record of a read attributes response
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeStatus {
    pub identifier: AttributeId,
    pub status: ClusterLibraryStatus,
    pub value: Option<AttributeValue>,
}

impl Pack<AttributeStatus, Error> for AttributeStatus {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        if data.len() < 3 {
            return Err(Error::WrongNumberOfBytes);
        }
        LittleEndian::write_u16(&mut data[0..2], self.identifier);
        data[2] = u8::from(self.status);
        match &self.value {
            Some(value) => {
                if data.len() < 4 {
                    return Err(Error::WrongNumberOfBytes);
                }
                data[3] = u8::from(value.data_type());
                Ok(value.pack(&mut data[4..])? + 4)
            }
            None => Ok(3),
        }
    }

    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        if data.len() < 3 {
            return Err(Error::WrongNumberOfBytes);
        }
        let identifier = LittleEndian::read_u16(&data[0..2]);
        let status = ClusterLibraryStatus::from_byte(data[2]);
        if status != ClusterLibraryStatus::Success {
            return Ok((
                Self {
                    identifier,
                    status,
                    value: None,
                },
                3,
            ));
        }
        if data.len() < 4 {
            return Err(Error::WrongNumberOfBytes);
        }
        let data_type = AttributeDataType::try_from(data[3])?;
        let (value, used) = AttributeValue::unpack(&data[4..], data_type)?;
        Ok((
            Self {
                identifier,
                status,
                value: Some(value),
            },
            used + 4,
        ))
    }
}

/// Response to a read attributes request
#[derive(Clone, Debug, PartialEq)]
pub struct ReadAttributesResponse {
    pub attributes: Vec<AttributeStatus>,
}

impl ReadAttributesResponse {
    /// First status which is not success
    pub fn failure(&self) -> Option<ClusterLibraryStatus> {
        self.attributes
            .iter()
            .map(|a| a.status)
            .find(|s| *s != ClusterLibraryStatus::Success)
    }
}

impl Pack<ReadAttributesResponse, Error> for ReadAttributesResponse {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        let mut offset = 0;
        for attribute in self.attributes.iter() {
            offset += attribute.pack(&mut data[offset..])?;
        }
        Ok(offset)
    }

    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        let mut offset = 0;
        let mut attributes = Vec::new();
        while offset < data.len() {
            let (attribute, used) = AttributeStatus::unpack(&data[offset..])?;
            attributes.push(attribute);
            offset += used;
        }
        Ok((Self { attributes }, offset))
    }
}

/// Attribute record of a write attributes request
#[derive(Clone, Debug, PartialEq)]
pub struct WriteAttributeRecord {
    pub identifier: u32,
    pub value: AttributeValue,
}

/// Write one or more attributes
#[derive(Clone, Debug, PartialEq)]
pub struct WriteAttributes {
    pub attributes: Vec<WriteAttributeRecord>,
}

impl Pack<WriteAttributes, Error> for WriteAttributes {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        let mut offset = 0;
        for record in self.attributes.iter() {
            if data.len() < offset + 5 {
                return Err(Error::WrongNumberOfBytes);
            }
            LittleEndian::write_u32(&mut data[offset..offset + 4], record.identifier);
            data[offset + 4] = u8::from(record.value.data_type());
            offset += 5;
            offset += record.value.pack(&mut data[offset..])?;
        }
        Ok(offset)
    }

    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        let mut offset = 0;
        let mut attributes = Vec::new();
        while offset < data.len() {
            if data.len() < offset + 5 {
                return Err(Error::WrongNumberOfBytes);
            }
            let identifier = LittleEndian::read_u32(&data[offset..offset + 4]);
            let data_type = AttributeDataType::try_from(data[offset + 4])?;
            offset += 5;
            let (value, used) = AttributeValue::unpack(&data[offset..], data_type)?;
            offset += used;
            attributes.push(WriteAttributeRecord { identifier, value });
        }
        Ok((Self { attributes }, offset))
    }
}

/// Status record of a write attributes response
#[derive(Clone, Debug, PartialEq)]
pub struct WriteAttributeStatus {
    pub status: ClusterLibraryStatus,
    /// Only present on failure
    pub identifier: Option<AttributeId>,
}

/// Response to a write attributes request
///
/// A single success record means all attributes were written.
#[derive(Clone, Debug, PartialEq)]
pub struct WriteAttributesResponse {
    pub attributes: Vec<WriteAttributeStatus>,
}

impl WriteAttributesResponse {
    pub fn failure(&self) -> Option<ClusterLibraryStatus> {
        self.attributes
            .iter()
            .map(|a| a.status)
            .find(|s| *s != ClusterLibraryStatus::Success)
    }
}

impl Pack<WriteAttributesResponse, Error> for WriteAttributesResponse {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        let mut offset = 0;
        for record in self.attributes.iter() {
            let size = if record.identifier.is_some() { 3 } else { 1 };
            if data.len() < offset + size {
                return Err(Error::WrongNumberOfBytes);
            }
            data[offset] = u8::from(record.status);
            if let Some(identifier) = record.identifier {
                LittleEndian::write_u16(&mut data[offset + 1..offset + 3], identifier);
            }
            offset += size;
        }
        Ok(offset)
    }

    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        let mut offset = 0;
        let mut attributes = Vec::new();
        while offset < data.len() {
            let status = ClusterLibraryStatus::from_byte(data[offset]);
            offset += 1;
            let identifier = if status == ClusterLibraryStatus::Success {
                None
            } else {
                if data.len() < offset + 2 {
                    return Err(Error::WrongNumberOfBytes);
                }
                let identifier = LittleEndian::read_u16(&data[offset..offset + 2]);
                offset += 2;
                Some(identifier)
            };
            attributes.push(WriteAttributeStatus { status, identifier });
        }
        Ok((Self { attributes }, offset))
    }
}

/// Attribute report record
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeReport {
    pub identifier: AttributeId,
    pub value: AttributeValue,
}

/// Unsolicited attribute report
#[derive(Clone, Debug, PartialEq)]
pub struct ReportAttributes {
    pub attributes: Vec<AttributeReport>,
}

impl Pack<ReportAttributes, Error> for ReportAttributes {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        let mut offset = 0;
        for report in self.attributes.iter() {
            if data.len() < offset + 3 {
                return Err(Error::WrongNumberOfBytes);
            }
            LittleEndian::write_u16(&mut data[offset..offset + 2], report.identifier);
            data[offset + 2] = u8::from(report.value.data_type());
            offset += 3;
            offset += report.value.pack(&mut data[offset..])?;
        }
        Ok(offset)
    }

    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        let mut offset = 0;
        let mut attributes = Vec::new();
        while offset < data.len() {
            if data.len() < offset + 3 {
                return Err(Error::WrongNumberOfBytes);
            }
            let identifier = LittleEndian::read_u16(&data[offset..offset + 2]);
            let data_type = AttributeDataType::try_from(data[offset + 2])?;
            offset += 3;
            let (value, used) = AttributeValue::unpack(&data[offset..], data_type)?;
            offset += used;
            attributes.push(AttributeReport { identifier, value });
        }
        Ok((Self { attributes }, offset))
    }
}

/// Discover the attributes of a cluster
#[derive(Clone, Debug, PartialEq)]
pub struct DiscoverAttributes {
    pub start: u32,
    pub max_count: u8,
}

impl Default for DiscoverAttributes {
    fn default() -> Self {
        Self {
            start: 0,
            max_count: 0xff,
        }
    }
}

impl Pack<DiscoverAttributes, Error> for DiscoverAttributes {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        if data.len() < 5 {
            return Err(Error::WrongNumberOfBytes);
        }
        LittleEndian::write_u32(&mut data[0..4], self.start);
        data[4] = self.max_count;
        Ok(5)
    }

    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        if data.len() < 5 {
            return Err(Error::WrongNumberOfBytes);
        }
        Ok((
            Self {
                start: LittleEndian::read_u32(&data[0..4]),
                max_count: data[4],
            },
            5,
        ))
    }
}

/// Discovered attribute
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeInformation {
    pub identifier: AttributeId,
    pub data_type: AttributeDataType,
}

/// Response to a discover attributes request
#[derive(Clone, Debug, PartialEq)]
pub struct DiscoverAttributesResponse {
    pub complete: bool,
    pub attributes: Vec<AttributeInformation>,
}

impl Pack<DiscoverAttributesResponse, Error> for DiscoverAttributesResponse {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        let size = 1 + self.attributes.len() * 3;
        if data.len() < size {
            return Err(Error::WrongNumberOfBytes);
        }
        data[0] = self.complete as u8;
        let mut offset = 1;
        for attribute in self.attributes.iter() {
            LittleEndian::write_u16(&mut data[offset..offset + 2], attribute.identifier);
            data[offset + 2] = u8::from(attribute.data_type);
            offset += 3;
        }
        Ok(offset)
    }

    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        if data.is_empty() || (data.len() - 1) % 3 != 0 {
            return Err(Error::WrongNumberOfBytes);
        }
        let mut attributes = Vec::with_capacity((data.len() - 1) / 3);
        for chunk in data[1..].chunks_exact(3) {
            attributes.push(AttributeInformation {
                identifier: LittleEndian::read_u16(&chunk[0..2]),
                data_type: AttributeDataType::try_from(chunk[2])?,
            });
        }
        Ok((
            Self {
                complete: data[0] != 0,
                attributes,
            },
            data.len(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_attributes_wide_identifiers() {
        let cmd = ReadAttributes {
            attributes: vec![0x0000, 0x4003],
        };
        let mut data = [0u8; 8];
        assert_eq!(cmd.pack(&mut data), Ok(8));
        assert_eq!(data, [0x00, 0x00, 0x00, 0x00, 0x03, 0x40, 0x00, 0x00]);
        assert_eq!(ReadAttributes::unpack(&data), Ok((cmd, 8)));
        assert_eq!(
            ReadAttributes::unpack(&data[..6]),
            Err(Error::WrongNumberOfBytes)
        );
    }

    #[test]
    fn read_attributes_response() {
        let data = [0x00, 0x00, 0x00, 0x10, 0x01, 0x01, 0x40, 0x86];
        let (cmd, used) = ReadAttributesResponse::unpack(&data).unwrap();
        assert_eq!(used, 8);
        assert_eq!(cmd.attributes.len(), 2);
        assert_eq!(cmd.attributes[0].identifier, 0x0000);
        assert_eq!(cmd.attributes[0].value, Some(AttributeValue::Boolean(1)));
        assert_eq!(cmd.attributes[1].identifier, 0x4001);
        assert_eq!(
            cmd.attributes[1].status,
            ClusterLibraryStatus::UnsupportedAttribute
        );
        assert_eq!(cmd.failure(), Some(ClusterLibraryStatus::UnsupportedAttribute));
    }

    #[test]
    fn write_attributes() {
        let cmd = WriteAttributes {
            attributes: vec![WriteAttributeRecord {
                identifier: 0x0010,
                value: AttributeValue::Unsigned16(0x0102),
            }],
        };
        let mut data = [0u8; 16];
        let used = cmd.pack(&mut data).unwrap();
        assert_eq!(data[..used], [0x10, 0x00, 0x00, 0x00, 0x21, 0x02, 0x01]);
        assert_eq!(WriteAttributes::unpack(&data[..used]), Ok((cmd, used)));
    }

    #[test]
    fn write_attributes_response() {
        let (cmd, used) = WriteAttributesResponse::unpack(&[0x00]).unwrap();
        assert_eq!(used, 1);
        assert_eq!(cmd.failure(), None);

        let (cmd, _) = WriteAttributesResponse::unpack(&[0x88, 0x00, 0x40]).unwrap();
        assert_eq!(cmd.failure(), Some(ClusterLibraryStatus::ReadOnly));
        assert_eq!(cmd.attributes[0].identifier, Some(0x4000));

        assert_eq!(
            WriteAttributesResponse::unpack(&[0x88, 0x00]),
            Err(Error::WrongNumberOfBytes)
        );
    }

    #[test]
    fn report_attributes() {
        let data = [0x00, 0x00, 0x20, 0x7f, 0x01, 0x00, 0x10, 0x00];
        let (cmd, used) = ReportAttributes::unpack(&data).unwrap();
        assert_eq!(used, 8);
        assert_eq!(cmd.attributes[0].value, AttributeValue::Unsigned8(0x7f));
        assert_eq!(cmd.attributes[1].identifier, 0x0001);
        let mut buffer = [0u8; 8];
        assert_eq!(cmd.pack(&mut buffer), Ok(8));
        assert_eq!(buffer, data);
    }

    #[test]
    fn discover_attributes() {
        let mut data = [0u8; 5];
        assert_eq!(DiscoverAttributes::default().pack(&mut data), Ok(5));
        assert_eq!(data, [0x00, 0x00, 0x00, 0x00, 0xff]);

        let (cmd, _) =
            DiscoverAttributesResponse::unpack(&[0x01, 0x00, 0x00, 0x10, 0x01, 0x00, 0x20])
                .unwrap();
        assert!(cmd.complete);
        assert_eq!(cmd.attributes[1].data_type, AttributeDataType::Unsigned8);
    }
}

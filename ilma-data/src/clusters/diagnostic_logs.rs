//! Diagnostic Logs cluster

use core::convert::TryFrom;

use crate::clusters::{enter_fields, ClusterCommand};
use crate::common::{ClusterId, CommandId};
use crate::error::Error;
use crate::tlv::{ContainerType, FromTlv, Tag, TlvReader, TlvWriter, ToTlv};

pub const CLUSTER: ClusterId = 0x0032;

/// Largest log content carried in a response payload
pub const MAX_LOG_CONTENT_SIZE: usize = 1024;

/// Largest transfer file designator
pub const MAX_FILE_DESIGNATOR_SIZE: usize = 32;

extended_enum!(
    /// Kind of logs requested
    Intent, u8,
    EndUserSupport => 0x00,
    NetworkDiag => 0x01,
    CrashLogs => 0x02,
);

extended_enum!(
    /// How the logs are transferred
    TransferProtocol, u8,
    ResponsePayload => 0x00,
    Bdx => 0x01,
);

extended_enum!(
    /// Status of a log retrieval
    LogsStatus, u8,
    Success => 0x00,
    Exhausted => 0x01,
    NoLogs => 0x02,
    Busy => 0x03,
    Denied => 0x04,
);

/// Request logs from a node
#[derive(Clone, Debug, PartialEq)]
pub struct RetrieveLogsRequest {
    pub intent: Intent,
    pub requested_protocol: TransferProtocol,
    pub transfer_file_designator: Option<String>,
}

impl ClusterCommand for RetrieveLogsRequest {
    const CLUSTER: ClusterId = CLUSTER;
    const COMMAND: CommandId = 0x00;
}

impl ToTlv for RetrieveLogsRequest {
    fn to_tlv(&self, writer: &mut TlvWriter<'_>, tag: Tag) -> Result<(), Error> {
        let marker = writer.start_container(tag, ContainerType::Structure)?;
        writer.put_u8(Tag::Context(0), u8::from(self.intent))?;
        writer.put_u8(Tag::Context(1), u8::from(self.requested_protocol))?;
        if let Some(designator) = &self.transfer_file_designator {
            writer.put_str(Tag::Context(2), designator)?;
        }
        writer.end_container(marker)
    }
}

impl FromTlv for RetrieveLogsRequest {
    fn from_tlv(reader: &mut TlvReader<'_>) -> Result<Self, Error> {
        let marker = enter_fields(reader)?;
        let mut intent = None;
        let mut requested_protocol = None;
        let mut transfer_file_designator = None;
        while let Some(tag) = reader.next_member()? {
            match tag {
                Tag::Context(0) => intent = Some(Intent::try_from(reader.get_u8()?)?),
                Tag::Context(1) => {
                    requested_protocol = Some(TransferProtocol::try_from(reader.get_u8()?)?)
                }
                Tag::Context(2) => transfer_file_designator = Some(reader.get_str()?.to_string()),
                _ => {}
            }
        }
        reader.exit_container(marker)?;
        Ok(Self {
            intent: intent.ok_or(Error::MissingField)?,
            requested_protocol: requested_protocol.ok_or(Error::MissingField)?,
            transfer_file_designator,
        })
    }
}

/// Response carrying the logs, or the reason there are none
#[derive(Clone, Debug, PartialEq)]
pub struct RetrieveLogsResponse {
    pub status: LogsStatus,
    pub log_content: Vec<u8>,
    /// UTC time of the first log entry, in microseconds
    pub utc_time_stamp: Option<u64>,
    /// Time since boot of the first log entry, in microseconds
    pub time_since_boot: Option<u64>,
}

impl RetrieveLogsResponse {
    /// Response without log content
    pub fn with_status(status: LogsStatus) -> Self {
        Self {
            status,
            log_content: Vec::new(),
            utc_time_stamp: None,
            time_since_boot: None,
        }
    }
}

impl ClusterCommand for RetrieveLogsResponse {
    const CLUSTER: ClusterId = CLUSTER;
    const COMMAND: CommandId = 0x01;
}

impl ToTlv for RetrieveLogsResponse {
    fn to_tlv(&self, writer: &mut TlvWriter<'_>, tag: Tag) -> Result<(), Error> {
        if self.log_content.len() > MAX_LOG_CONTENT_SIZE {
            return Err(Error::InvalidValue);
        }
        let marker = writer.start_container(tag, ContainerType::Structure)?;
        writer.put_u8(Tag::Context(0), u8::from(self.status))?;
        writer.put_bytes(Tag::Context(1), &self.log_content)?;
        if let Some(timestamp) = self.utc_time_stamp {
            writer.put_u64(Tag::Context(2), timestamp)?;
        }
        if let Some(timestamp) = self.time_since_boot {
            writer.put_u64(Tag::Context(3), timestamp)?;
        }
        writer.end_container(marker)
    }
}

impl FromTlv for RetrieveLogsResponse {
    fn from_tlv(reader: &mut TlvReader<'_>) -> Result<Self, Error> {
        let marker = enter_fields(reader)?;
        let mut status = None;
        let mut log_content = None;
        let mut utc_time_stamp = None;
        let mut time_since_boot = None;
        while let Some(tag) = reader.next_member()? {
            match tag {
                Tag::Context(0) => status = Some(LogsStatus::try_from(reader.get_u8()?)?),
                Tag::Context(1) => log_content = Some(reader.get_bytes()?.to_vec()),
                Tag::Context(2) => utc_time_stamp = Some(reader.get_u64()?),
                Tag::Context(3) => time_since_boot = Some(reader.get_u64()?),
                _ => {}
            }
        }
        reader.exit_container(marker)?;
        Ok(Self {
            status: status.ok_or(Error::MissingField)?,
            log_content: log_content.ok_or(Error::MissingField)?,
            utc_time_stamp,
            time_since_boot,
        })
    }
}

//! # Cluster Library
//!
//! Legacy binary framing used by the cluster proxies: the application support
//! frame, the cluster library header, attribute values and the global
//! attribute commands.

use core::convert::TryFrom;

mod aps;
mod attribute;
pub mod commands;
mod frame;

pub use aps::{ApsFrame, CLIENT_SOURCE_ENDPOINT};
pub use attribute::{AttributeDataType, AttributeValue};
pub use commands::{Command, GeneralCommandIdentifier};
pub use frame::{ClusterLibraryHeader, Direction, FrameControl, FrameType};

extended_enum!(
    /// Cluster library status codes
    ClusterLibraryStatus, u8,
    /// Operation was successful.
    Success => 0x00,
    /// Operation was not successful.
    Failure => 0x01,
    /// The sender is not authorised to carry out this command.
    NotAuthorised => 0x7e,
    /// A reserved field contains a non-zero value.
    ReservedFieldNotZero => 0x7f,
    /// Fields are missing or malformed. Command not carried out.
    MalformedCommand => 0x80,
    /// The cluster command is not supported. Command not carried out.
    UnsupportedClusterCommand => 0x81,
    /// The general command is not supported.
    UnsupportedGeneralCommand => 0x82,
    /// A field of the command contains an incorrect value.
    InvalidField => 0x85,
    /// The attribute does not exist on the device.
    UnsupportedAttribute => 0x86,
    /// Out of range, or set to a reserved value. Attribute keeps its old value.
    InvalidValue => 0x87,
    /// Attempt to write a read only attribute.
    ReadOnly => 0x88,
    /// Not enough free space to complete the operation.
    InsufficientSpace => 0x89,
    /// The table entry already exists.
    DuplicateExists => 0x8a,
    /// The requested information could not be found.
    NotFound => 0x8b,
    /// Periodic reports cannot be issued for this attribute.
    UnreportableAttribute => 0x8c,
    /// The data type given for an attribute is incorrect.
    InvalidDataType => 0x8d,
    /// Attempt to read a write only attribute.
    WriteOnly => 0x8f,
    /// The supplied values are inconsistent.
    Inconsistent => 0x92,
    /// The credentials of the sender are not sufficient.
    ActionDenied => 0x93,
    /// The exchange was aborted due to excessive response time.
    Timeout => 0x94,
    /// The command has been received and is being processed.
    NotificationPending => 0x9a,
    /// The receiver is busy.
    Busy => 0x9c,
    /// Failure caused by hardware.
    HardwareFailure => 0xc0,
    /// Failure caused by software.
    SoftwareFailure => 0xc1,
    /// The cluster is not supported.
    UnsupportedCluster => 0xc3,
);

impl ClusterLibraryStatus {
    /// Map a status byte, unknown codes become `Failure`
    pub fn from_byte(value: u8) -> Self {
        Self::try_from(value).unwrap_or(ClusterLibraryStatus::Failure)
    }
}

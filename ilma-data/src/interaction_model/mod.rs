//! # Interaction model
//!
//! Status codes, protocol opcodes and the TLV messages of the invoke
//! interaction.

mod messages;
mod status;

pub use messages::{
    CommandData, InvokeRequestMessage, InvokeResponse, InvokeResponseMessage, StatusIb,
    StatusResponseMessage, EMPTY_FIELDS, INTERACTION_MODEL_REVISION, MAX_COMMAND_FIELDS_SIZE,
};
pub use status::Status;

extended_enum!(
    /// Interaction model protocol opcodes
    OpCode, u8,
    StatusResponse => 0x01,
    ReadRequest => 0x02,
    SubscribeRequest => 0x03,
    SubscribeResponse => 0x04,
    ReportData => 0x05,
    WriteRequest => 0x06,
    WriteResponse => 0x07,
    InvokeRequest => 0x08,
    InvokeResponse => 0x09,
    TimedRequest => 0x0a,
);

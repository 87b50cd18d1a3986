use core::convert::From;

use ilma_data::interaction_model::Status;

/// Errors
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Error {
    /// Encoding or decoding failed
    DataError(ilma_data::Error),
    /// Failure which maps onto an interaction model status
    Status(Status),
    /// A command handler reported failure
    Internal,
    /// The cluster is already part of the schema
    DuplicateCluster,
    /// The command is already registered for the cluster
    DuplicateCommand,
    /// No room in the transmit queue
    NotEnoughSpace,
    /// No callback registered for the key
    KeyNotFound,
    /// All sequence numbers towards the peer are in use
    Busy,
    /// No response within the allotted time
    Timeout,
    /// Argument out of range or too large to frame
    InvalidArgument,
    /// Received frame could not be parsed
    MalformedPacket,
}

impl Error {
    /// Interaction model status carried by the error, if any
    pub fn status(&self) -> Option<Status> {
        match self {
            Error::Status(status) => Some(*status),
            _ => None,
        }
    }
}

impl From<ilma_data::Error> for Error {
    fn from(error: ilma_data::Error) -> Self {
        Self::DataError(error)
    }
}

impl From<Status> for Error {
    fn from(status: Status) -> Self {
        Self::Status(status)
    }
}

//! # Error handling

/// Errors
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Error {
    /// The buffer is too small for the operation, nothing was written
    BufferTooSmall,
    /// Wrong number of bytes provided to the operation
    WrongNumberOfBytes,
    /// The value provided is invalid
    InvalidValue,
    /// The code path has not been implemented
    NotImplemented,
    /// The frame type is unknown
    UnknownFrameType,
    /// The attribute value is unsupported
    UnsupportedAttributeValue,
    /// An argument, such as a tag in the current container context, is invalid
    InvalidArgument,
    /// The operation is not allowed in the current state
    IncorrectState,
    /// There are no more elements in the current container
    EndOfTlv,
    /// The element has another type than the one requested
    WrongTlvType,
    /// The integer does not fit the requested width
    InvalidIntegerValue,
    /// The element control byte or tag is malformed
    InvalidTlvElement,
    /// The element claims more data than available
    TlvUnderrun,
    /// Too many nested containers
    NestingTooDeep,
    /// A string has an invalid length
    InvalidStringLength,
    /// A string is not valid UTF-8
    InvalidUtf8,
    /// Memory could not be allocated
    NoMemory,
    /// A required field is missing from a structure
    MissingField,
}

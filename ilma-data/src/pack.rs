//! # Positional binary codecs
//!
//! Legacy cluster library frames are laid out field after field with fixed
//! widths. These traits read and write such frames from byte slices.

/// Codec for a frame part with a fixed width, the slice must match exactly
pub trait PackFixed<T, E> {
    /// Write into `data`
    fn pack(&self, data: &mut [u8]) -> Result<(), E>;
    /// Read from `data`
    fn unpack(data: &[u8]) -> Result<T, E>;
}

/// Codec for a frame part with a variable width
pub trait Pack<T, E> {
    /// Write into `data`, returns the number of bytes written
    fn pack(&self, data: &mut [u8]) -> Result<usize, E>;
    /// Read from the start of `data`, returns the value and the number of
    /// bytes consumed
    fn unpack(data: &[u8]) -> Result<(T, usize), E>;
}

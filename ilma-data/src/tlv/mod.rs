//! # Tag-Length-Value encoding
//!
//! Every element starts with a control byte, the upper three bits select the
//! tag form and the lower five bits the element type. Tag, length and value
//! follow, all multi-byte fields are little endian.

mod reader;
mod value;
mod writer;

pub use reader::TlvReader;
pub use value::TlvValue;
pub use writer::TlvWriter;

use core::convert::TryFrom;

use crate::error::Error;

/// Maximum number of nested containers for readers and writers
pub const MAX_CONTAINER_DEPTH: usize = 16;

const TAG_CONTROL_SHIFT: u8 = 5;
const ELEMENT_TYPE_MASK: u8 = 0b0001_1111;

extended_enum!(
    /// Element type, the lower five bits of the control byte
    ElementType, u8,
    Int8 => 0x00,
    Int16 => 0x01,
    Int32 => 0x02,
    Int64 => 0x03,
    UInt8 => 0x04,
    UInt16 => 0x05,
    UInt32 => 0x06,
    UInt64 => 0x07,
    False => 0x08,
    True => 0x09,
    Float32 => 0x0a,
    Float64 => 0x0b,
    Utf8String1 => 0x0c,
    Utf8String2 => 0x0d,
    Utf8String4 => 0x0e,
    Utf8String8 => 0x0f,
    ByteString1 => 0x10,
    ByteString2 => 0x11,
    ByteString4 => 0x12,
    ByteString8 => 0x13,
    Null => 0x14,
    Structure => 0x15,
    Array => 0x16,
    List => 0x17,
    EndOfContainer => 0x18,
);

impl ElementType {
    /// Width of the fixed value, or of the length field for strings
    fn field_width(self) -> usize {
        match self {
            ElementType::Int8
            | ElementType::UInt8
            | ElementType::Utf8String1
            | ElementType::ByteString1 => 1,
            ElementType::Int16
            | ElementType::UInt16
            | ElementType::Utf8String2
            | ElementType::ByteString2 => 2,
            ElementType::Int32
            | ElementType::UInt32
            | ElementType::Float32
            | ElementType::Utf8String4
            | ElementType::ByteString4 => 4,
            ElementType::Int64
            | ElementType::UInt64
            | ElementType::Float64
            | ElementType::Utf8String8
            | ElementType::ByteString8 => 8,
            ElementType::False
            | ElementType::True
            | ElementType::Null
            | ElementType::Structure
            | ElementType::Array
            | ElementType::List
            | ElementType::EndOfContainer => 0,
        }
    }
}

/// Kind of container
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContainerType {
    /// Members carry unique, non-anonymous tags
    Structure,
    /// Ordered anonymous members
    Array,
    /// Ordered members, tagged or not
    List,
}

impl From<ContainerType> for ElementType {
    fn from(value: ContainerType) -> Self {
        match value {
            ContainerType::Structure => ElementType::Structure,
            ContainerType::Array => ElementType::Array,
            ContainerType::List => ElementType::List,
        }
    }
}

/// Proof of an open container, consumed when the container is closed
#[derive(Debug, PartialEq)]
pub struct ContainerMarker {
    depth: usize,
    container_type: ContainerType,
}

impl ContainerMarker {
    pub fn container_type(&self) -> ContainerType {
        self.container_type
    }
}

/// Element tag
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tag {
    /// No tag
    Anonymous,
    /// Tag only meaningful within the enclosing structure
    Context(u8),
    /// Tag from the common profile
    CommonProfile(u32),
    /// Tag from the profile implied by the context
    ImplicitProfile(u32),
    /// Tag with vendor and profile
    FullyQualified { vendor: u16, profile: u16, tag: u32 },
}

impl Tag {
    /// Tag control bits
    fn control(&self) -> u8 {
        match *self {
            Tag::Anonymous => 0b000,
            Tag::Context(_) => 0b001,
            Tag::CommonProfile(tag) if tag <= 0xffff => 0b010,
            Tag::CommonProfile(_) => 0b011,
            Tag::ImplicitProfile(tag) if tag <= 0xffff => 0b100,
            Tag::ImplicitProfile(_) => 0b101,
            Tag::FullyQualified { tag, .. } if tag <= 0xffff => 0b110,
            Tag::FullyQualified { .. } => 0b111,
        }
    }

    /// Write the tag bytes, `data` must hold at least the number of tag bytes
    fn pack(&self, data: &mut [u8]) -> usize {
        use byteorder::{ByteOrder, LittleEndian};
        match *self {
            Tag::Anonymous => 0,
            Tag::Context(tag) => {
                data[0] = tag;
                1
            }
            Tag::CommonProfile(tag) | Tag::ImplicitProfile(tag) => {
                if tag <= 0xffff {
                    LittleEndian::write_u16(&mut data[0..2], tag as u16);
                    2
                } else {
                    LittleEndian::write_u32(&mut data[0..4], tag);
                    4
                }
            }
            Tag::FullyQualified {
                vendor,
                profile,
                tag,
            } => {
                LittleEndian::write_u16(&mut data[0..2], vendor);
                LittleEndian::write_u16(&mut data[2..4], profile);
                if tag <= 0xffff {
                    LittleEndian::write_u16(&mut data[4..6], tag as u16);
                    6
                } else {
                    LittleEndian::write_u32(&mut data[4..8], tag);
                    8
                }
            }
        }
    }

    /// Read a tag given the tag control bits, returns tag and bytes used
    fn unpack(control: u8, data: &[u8]) -> Result<(Self, usize), Error> {
        use byteorder::{ByteOrder, LittleEndian};
        let needed = match control {
            0b000 => 0,
            0b001 => 1,
            0b010 | 0b100 => 2,
            0b011 | 0b101 => 4,
            0b110 => 6,
            _ => 8,
        };
        if data.len() < needed {
            return Err(Error::TlvUnderrun);
        }
        let tag = match control {
            0b000 => Tag::Anonymous,
            0b001 => Tag::Context(data[0]),
            0b010 => Tag::CommonProfile(u32::from(LittleEndian::read_u16(&data[0..2]))),
            0b011 => Tag::CommonProfile(LittleEndian::read_u32(&data[0..4])),
            0b100 => Tag::ImplicitProfile(u32::from(LittleEndian::read_u16(&data[0..2]))),
            0b101 => Tag::ImplicitProfile(LittleEndian::read_u32(&data[0..4])),
            0b110 => Tag::FullyQualified {
                vendor: LittleEndian::read_u16(&data[0..2]),
                profile: LittleEndian::read_u16(&data[2..4]),
                tag: u32::from(LittleEndian::read_u16(&data[4..6])),
            },
            _ => Tag::FullyQualified {
                vendor: LittleEndian::read_u16(&data[0..2]),
                profile: LittleEndian::read_u16(&data[2..4]),
                tag: LittleEndian::read_u32(&data[4..8]),
            },
        };
        Ok((tag, needed))
    }
}

fn control_byte(tag: &Tag, element_type: ElementType) -> u8 {
    (tag.control() << TAG_CONTROL_SHIFT) | u8::from(element_type)
}

fn split_control_byte(control: u8) -> Result<(u8, ElementType), Error> {
    let element_type =
        ElementType::try_from(control & ELEMENT_TYPE_MASK).map_err(|_| Error::InvalidTlvElement)?;
    Ok((control >> TAG_CONTROL_SHIFT, element_type))
}

/// Serialise a value as a TLV element with the given tag
pub trait ToTlv {
    fn to_tlv(&self, writer: &mut TlvWriter<'_>, tag: Tag) -> Result<(), Error>;
}

/// De-serialise the element the reader is positioned on
pub trait FromTlv: Sized {
    fn from_tlv(reader: &mut TlvReader<'_>) -> Result<Self, Error>;
}

/// Encode `item` into a new buffer of at most `capacity` bytes
pub fn encode_to_vec<T: ToTlv + ?Sized>(
    item: &T,
    tag: Tag,
    capacity: usize,
) -> Result<Vec<u8>, Error> {
    let mut buffer = vec![0u8; capacity];
    let mut writer = TlvWriter::new(&mut buffer);
    item.to_tlv(&mut writer, tag)?;
    let used = writer.finalize()?;
    buffer.truncate(used);
    Ok(buffer)
}

/// Decode the first top level element of `data`
pub fn decode_from_slice<T: FromTlv>(data: &[u8]) -> Result<T, Error> {
    let mut reader = TlvReader::new(data);
    reader.next()?;
    T::from_tlv(&mut reader)
}

macro_rules! tlv_primitive {
    ($ty:ty, $put:ident, $get:ident) => {
        impl ToTlv for $ty {
            fn to_tlv(&self, writer: &mut TlvWriter<'_>, tag: Tag) -> Result<(), Error> {
                writer.$put(tag, *self)
            }
        }

        impl FromTlv for $ty {
            fn from_tlv(reader: &mut TlvReader<'_>) -> Result<Self, Error> {
                reader.$get()
            }
        }
    };
}

tlv_primitive!(u8, put_u8, get_u8);
tlv_primitive!(u16, put_u16, get_u16);
tlv_primitive!(u32, put_u32, get_u32);
tlv_primitive!(u64, put_u64, get_u64);
tlv_primitive!(i8, put_i8, get_i8);
tlv_primitive!(i16, put_i16, get_i16);
tlv_primitive!(i32, put_i32, get_i32);
tlv_primitive!(i64, put_i64, get_i64);
tlv_primitive!(bool, put_bool, get_bool);
tlv_primitive!(f32, put_f32, get_f32);
tlv_primitive!(f64, put_f64, get_f64);

impl ToTlv for String {
    fn to_tlv(&self, writer: &mut TlvWriter<'_>, tag: Tag) -> Result<(), Error> {
        writer.put_str(tag, self)
    }
}

impl FromTlv for String {
    fn from_tlv(reader: &mut TlvReader<'_>) -> Result<Self, Error> {
        reader.get_str().map(String::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_byte_layout() {
        assert_eq!(control_byte(&Tag::Anonymous, ElementType::Structure), 0x15);
        assert_eq!(control_byte(&Tag::Context(1), ElementType::UInt8), 0x24);
        assert_eq!(control_byte(&Tag::CommonProfile(0x10), ElementType::True), 0x49);
        assert_eq!(
            control_byte(&Tag::CommonProfile(0x1_0000), ElementType::Null),
            0x74
        );
        let tag = Tag::FullyQualified {
            vendor: 0xfff1,
            profile: 0xdeed,
            tag: 1,
        };
        assert_eq!(control_byte(&tag, ElementType::Int8), 0xc0);
        assert_eq!(split_control_byte(0x36).unwrap(), (0b001, ElementType::Array));
        assert_eq!(split_control_byte(0x1f), Err(Error::InvalidTlvElement));
    }

    #[test]
    fn tag_bytes() {
        let mut data = [0u8; 8];
        let tag = Tag::FullyQualified {
            vendor: 0xfff1,
            profile: 0xdeed,
            tag: 0xaa55_1234,
        };
        assert_eq!(tag.pack(&mut data), 8);
        assert_eq!(data, [0xf1, 0xff, 0xed, 0xde, 0x34, 0x12, 0x55, 0xaa]);
        assert_eq!(Tag::unpack(0b111, &data).unwrap(), (tag, 8));
        assert_eq!(Tag::unpack(0b111, &data[..7]), Err(Error::TlvUnderrun));
    }
}

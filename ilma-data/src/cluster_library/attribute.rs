use core::convert::TryFrom;
use core::fmt;

use crate::error::Error;

use byteorder::{ByteOrder, LittleEndian};

extended_enum!(
    /// Attribute data type identifiers
    AttributeDataType, u8,
    None => 0x00,
    Data8 => 0x08,
    Data16 => 0x09,
    Boolean => 0x10,
    Bitmap8 => 0x18,
    Bitmap16 => 0x19,
    Bitmap32 => 0x1b,
    Unsigned8 => 0x20,
    Unsigned16 => 0x21,
    Unsigned24 => 0x22,
    Unsigned32 => 0x23,
    Unsigned64 => 0x27,
    Signed8 => 0x28,
    Signed16 => 0x29,
    Signed32 => 0x2b,
    Signed64 => 0x2f,
    Enumeration8 => 0x30,
    Enumeration16 => 0x31,
    FloatingPoint32 => 0x39,
    FloatingPoint64 => 0x3a,
    OctetString => 0x41,
    CharacterString => 0x42,
);

impl AttributeDataType {
    /// Size of a value of this type, `None` for strings
    pub fn num_octets(self) -> Option<usize> {
        match self {
            AttributeDataType::None => Some(0),
            AttributeDataType::Data8
            | AttributeDataType::Boolean
            | AttributeDataType::Bitmap8
            | AttributeDataType::Unsigned8
            | AttributeDataType::Signed8
            | AttributeDataType::Enumeration8 => Some(1),
            AttributeDataType::Data16
            | AttributeDataType::Bitmap16
            | AttributeDataType::Unsigned16
            | AttributeDataType::Signed16
            | AttributeDataType::Enumeration16 => Some(2),
            AttributeDataType::Unsigned24 => Some(3),
            AttributeDataType::Bitmap32
            | AttributeDataType::Unsigned32
            | AttributeDataType::Signed32
            | AttributeDataType::FloatingPoint32 => Some(4),
            AttributeDataType::Unsigned64
            | AttributeDataType::Signed64
            | AttributeDataType::FloatingPoint64 => Some(8),
            AttributeDataType::OctetString | AttributeDataType::CharacterString => None,
        }
    }

    /// Analog types carry a reportable change when reporting is configured
    pub fn is_analog(self) -> bool {
        matches!(
            self,
            AttributeDataType::Unsigned8
                | AttributeDataType::Unsigned16
                | AttributeDataType::Unsigned24
                | AttributeDataType::Unsigned32
                | AttributeDataType::Unsigned64
                | AttributeDataType::Signed8
                | AttributeDataType::Signed16
                | AttributeDataType::Signed32
                | AttributeDataType::Signed64
                | AttributeDataType::FloatingPoint32
                | AttributeDataType::FloatingPoint64
        )
    }
}

/// Typed attribute value
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    None,
    Data8(u8),
    Data16(u16),
    Boolean(u8),
    Bitmap8(u8),
    Bitmap16(u16),
    Bitmap32(u32),
    Unsigned8(u8),
    Unsigned16(u16),
    Unsigned24(u32),
    Unsigned32(u32),
    Unsigned64(u64),
    Signed8(i8),
    Signed16(i16),
    Signed32(i32),
    Signed64(i64),
    Enumeration8(u8),
    Enumeration16(u16),
    FloatingPoint32(f32),
    FloatingPoint64(f64),
    /// `None` is the invalid string, encoded with length 0xff
    OctetString(Option<Vec<u8>>),
    CharacterString(Option<String>),
}

const STRING_INVALID_LENGTH: u8 = 0xff;

impl AttributeValue {
    /// Number of bytes `pack` writes
    pub fn packed_length(&self) -> usize {
        match self {
            AttributeValue::OctetString(Some(v)) => v.len() + 1,
            AttributeValue::CharacterString(Some(v)) => v.len() + 1,
            AttributeValue::OctetString(None) | AttributeValue::CharacterString(None) => 1,
            _ => self.data_type().num_octets().unwrap_or(0),
        }
    }

    pub fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        let length = self.packed_length();
        if data.len() < length {
            return Err(Error::WrongNumberOfBytes);
        }
        match self {
            AttributeValue::None => {}
            AttributeValue::Data8(v)
            | AttributeValue::Boolean(v)
            | AttributeValue::Bitmap8(v)
            | AttributeValue::Unsigned8(v)
            | AttributeValue::Enumeration8(v) => data[0] = *v,
            AttributeValue::Data16(v)
            | AttributeValue::Bitmap16(v)
            | AttributeValue::Unsigned16(v)
            | AttributeValue::Enumeration16(v) => LittleEndian::write_u16(&mut data[0..2], *v),
            AttributeValue::Unsigned24(v) => {
                if *v > 0x00ff_ffff {
                    return Err(Error::InvalidValue);
                }
                LittleEndian::write_u24(&mut data[0..3], *v)
            }
            AttributeValue::Bitmap32(v) | AttributeValue::Unsigned32(v) => {
                LittleEndian::write_u32(&mut data[0..4], *v)
            }
            AttributeValue::Unsigned64(v) => LittleEndian::write_u64(&mut data[0..8], *v),
            AttributeValue::Signed8(v) => data[0] = *v as u8,
            AttributeValue::Signed16(v) => LittleEndian::write_i16(&mut data[0..2], *v),
            AttributeValue::Signed32(v) => LittleEndian::write_i32(&mut data[0..4], *v),
            AttributeValue::Signed64(v) => LittleEndian::write_i64(&mut data[0..8], *v),
            AttributeValue::FloatingPoint32(v) => LittleEndian::write_f32(&mut data[0..4], *v),
            AttributeValue::FloatingPoint64(v) => LittleEndian::write_f64(&mut data[0..8], *v),
            AttributeValue::OctetString(v) => {
                pack_string(v.as_ref().map(|v| v.as_slice()), data)?;
            }
            AttributeValue::CharacterString(v) => {
                pack_string(v.as_ref().map(|v| v.as_bytes()), data)?;
            }
        }
        Ok(length)
    }

    pub fn unpack(data: &[u8], data_type: AttributeDataType) -> Result<(Self, usize), Error> {
        if let Some(num_octets) = data_type.num_octets() {
            if data.len() < num_octets {
                return Err(Error::WrongNumberOfBytes);
            }
        }
        let value = match data_type {
            AttributeDataType::None => AttributeValue::None,
            AttributeDataType::Data8 => AttributeValue::Data8(data[0]),
            AttributeDataType::Data16 => AttributeValue::Data16(LittleEndian::read_u16(data)),
            AttributeDataType::Boolean => match data[0] {
                0x00 | 0x01 | 0xff => AttributeValue::Boolean(data[0]),
                _ => return Err(Error::InvalidValue),
            },
            AttributeDataType::Bitmap8 => AttributeValue::Bitmap8(data[0]),
            AttributeDataType::Bitmap16 => AttributeValue::Bitmap16(LittleEndian::read_u16(data)),
            AttributeDataType::Bitmap32 => AttributeValue::Bitmap32(LittleEndian::read_u32(data)),
            AttributeDataType::Unsigned8 => AttributeValue::Unsigned8(data[0]),
            AttributeDataType::Unsigned16 => {
                AttributeValue::Unsigned16(LittleEndian::read_u16(data))
            }
            AttributeDataType::Unsigned24 => {
                AttributeValue::Unsigned24(LittleEndian::read_u24(data))
            }
            AttributeDataType::Unsigned32 => {
                AttributeValue::Unsigned32(LittleEndian::read_u32(data))
            }
            AttributeDataType::Unsigned64 => {
                AttributeValue::Unsigned64(LittleEndian::read_u64(data))
            }
            AttributeDataType::Signed8 => AttributeValue::Signed8(data[0] as i8),
            AttributeDataType::Signed16 => AttributeValue::Signed16(LittleEndian::read_i16(data)),
            AttributeDataType::Signed32 => AttributeValue::Signed32(LittleEndian::read_i32(data)),
            AttributeDataType::Signed64 => AttributeValue::Signed64(LittleEndian::read_i64(data)),
            AttributeDataType::Enumeration8 => AttributeValue::Enumeration8(data[0]),
            AttributeDataType::Enumeration16 => {
                AttributeValue::Enumeration16(LittleEndian::read_u16(data))
            }
            AttributeDataType::FloatingPoint32 => {
                AttributeValue::FloatingPoint32(LittleEndian::read_f32(data))
            }
            AttributeDataType::FloatingPoint64 => {
                AttributeValue::FloatingPoint64(LittleEndian::read_f64(data))
            }
            AttributeDataType::OctetString => {
                let (value, used) = unpack_string(data)?;
                return Ok((AttributeValue::OctetString(value.map(|v| v.to_vec())), used));
            }
            AttributeDataType::CharacterString => {
                let (value, used) = unpack_string(data)?;
                let value = match value {
                    Some(v) => Some(
                        core::str::from_utf8(v)
                            .map_err(|_| Error::InvalidUtf8)?
                            .to_string(),
                    ),
                    None => None,
                };
                return Ok((AttributeValue::CharacterString(value), used));
            }
        };
        Ok((value, data_type.num_octets().unwrap_or(0)))
    }

    pub fn data_type(&self) -> AttributeDataType {
        match self {
            AttributeValue::None => AttributeDataType::None,
            AttributeValue::Data8(_) => AttributeDataType::Data8,
            AttributeValue::Data16(_) => AttributeDataType::Data16,
            AttributeValue::Boolean(_) => AttributeDataType::Boolean,
            AttributeValue::Bitmap8(_) => AttributeDataType::Bitmap8,
            AttributeValue::Bitmap16(_) => AttributeDataType::Bitmap16,
            AttributeValue::Bitmap32(_) => AttributeDataType::Bitmap32,
            AttributeValue::Unsigned8(_) => AttributeDataType::Unsigned8,
            AttributeValue::Unsigned16(_) => AttributeDataType::Unsigned16,
            AttributeValue::Unsigned24(_) => AttributeDataType::Unsigned24,
            AttributeValue::Unsigned32(_) => AttributeDataType::Unsigned32,
            AttributeValue::Unsigned64(_) => AttributeDataType::Unsigned64,
            AttributeValue::Signed8(_) => AttributeDataType::Signed8,
            AttributeValue::Signed16(_) => AttributeDataType::Signed16,
            AttributeValue::Signed32(_) => AttributeDataType::Signed32,
            AttributeValue::Signed64(_) => AttributeDataType::Signed64,
            AttributeValue::Enumeration8(_) => AttributeDataType::Enumeration8,
            AttributeValue::Enumeration16(_) => AttributeDataType::Enumeration16,
            AttributeValue::FloatingPoint32(_) => AttributeDataType::FloatingPoint32,
            AttributeValue::FloatingPoint64(_) => AttributeDataType::FloatingPoint64,
            AttributeValue::OctetString(_) => AttributeDataType::OctetString,
            AttributeValue::CharacterString(_) => AttributeDataType::CharacterString,
        }
    }

    /// The value is not the invalid marker of its type
    pub fn is_valid(&self) -> bool {
        match self {
            AttributeValue::None
            | AttributeValue::Data8(_)
            | AttributeValue::Data16(_)
            | AttributeValue::Bitmap8(_)
            | AttributeValue::Bitmap16(_)
            | AttributeValue::Bitmap32(_) => true,
            AttributeValue::Boolean(v) => *v == 0x00 || *v == 0x01,
            AttributeValue::Unsigned8(v) | AttributeValue::Enumeration8(v) => *v != u8::MAX,
            AttributeValue::Unsigned16(v) | AttributeValue::Enumeration16(v) => *v != u16::MAX,
            AttributeValue::Unsigned24(v) => *v < 0x00ff_ffff,
            AttributeValue::Unsigned32(v) => *v != u32::MAX,
            AttributeValue::Unsigned64(v) => *v != u64::MAX,
            AttributeValue::Signed8(v) => *v != i8::MIN,
            AttributeValue::Signed16(v) => *v != i16::MIN,
            AttributeValue::Signed32(v) => *v != i32::MIN,
            AttributeValue::Signed64(v) => *v != i64::MIN,
            AttributeValue::FloatingPoint32(v) => !v.is_nan(),
            AttributeValue::FloatingPoint64(v) => !v.is_nan(),
            AttributeValue::OctetString(v) => v.is_some(),
            AttributeValue::CharacterString(v) => v.is_some(),
        }
    }
}

fn pack_string(value: Option<&[u8]>, data: &mut [u8]) -> Result<(), Error> {
    match value {
        Some(value) => {
            let length = u8::try_from(value.len())
                .ok()
                .filter(|length| *length != STRING_INVALID_LENGTH)
                .ok_or(Error::InvalidValue)?;
            data[0] = length;
            data[1..=value.len()].copy_from_slice(value);
        }
        None => data[0] = STRING_INVALID_LENGTH,
    }
    Ok(())
}

fn unpack_string(data: &[u8]) -> Result<(Option<&[u8]>, usize), Error> {
    let length = *data.first().ok_or(Error::WrongNumberOfBytes)?;
    if length == STRING_INVALID_LENGTH {
        return Ok((None, 1));
    }
    let length = usize::from(length);
    let value = data.get(1..=length).ok_or(Error::WrongNumberOfBytes)?;
    Ok((Some(value), length + 1))
}

const STRING_INVALID: &str = "Invalid";

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return write!(f, "{}", STRING_INVALID);
        }
        match self {
            AttributeValue::None => write!(f, "None"),
            AttributeValue::Boolean(v) => write!(f, "{}", *v == 0x01),
            AttributeValue::Data8(v)
            | AttributeValue::Bitmap8(v)
            | AttributeValue::Unsigned8(v)
            | AttributeValue::Enumeration8(v) => write!(f, "{}", v),
            AttributeValue::Data16(v)
            | AttributeValue::Bitmap16(v)
            | AttributeValue::Unsigned16(v)
            | AttributeValue::Enumeration16(v) => write!(f, "{}", v),
            AttributeValue::Bitmap32(v)
            | AttributeValue::Unsigned24(v)
            | AttributeValue::Unsigned32(v) => write!(f, "{}", v),
            AttributeValue::Unsigned64(v) => write!(f, "{}", v),
            AttributeValue::Signed8(v) => write!(f, "{}", v),
            AttributeValue::Signed16(v) => write!(f, "{}", v),
            AttributeValue::Signed32(v) => write!(f, "{}", v),
            AttributeValue::Signed64(v) => write!(f, "{}", v),
            AttributeValue::FloatingPoint32(v) => write!(f, "{}", v),
            AttributeValue::FloatingPoint64(v) => write!(f, "{}", v),
            AttributeValue::OctetString(v) => match v {
                Some(v) => write!(f, "{}", hex::encode(v)),
                None => write!(f, "{}", STRING_INVALID),
            },
            AttributeValue::CharacterString(v) => match v {
                Some(v) => write!(f, "{}", v),
                None => write!(f, "{}", STRING_INVALID),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_value_unsigned8() {
        for v in u8::MIN..=u8::MAX {
            let value = AttributeValue::Unsigned8(v);
            assert_eq!(value.data_type(), AttributeDataType::Unsigned8);
            if v == u8::MAX {
                assert_eq!(value.is_valid(), false);
                assert_eq!(format!("{}", value), "Invalid");
            } else {
                assert_eq!(value.is_valid(), true);
                assert_eq!(format!("{}", value), format!("{}", v));
            }
        }
    }

    #[test]
    fn attribute_value_signed16() {
        let value = AttributeValue::Signed16(i16::MIN);
        assert_eq!(value.is_valid(), false);
        let value = AttributeValue::Signed16(-300);
        let mut data = [0u8; 2];
        assert_eq!(value.pack(&mut data), Ok(2));
        assert_eq!(data, [0xd4, 0xfe]);
        assert_eq!(
            AttributeValue::unpack(&data, AttributeDataType::Signed16),
            Ok((value, 2))
        );
    }

    #[test]
    fn boolean() {
        assert_eq!(
            AttributeValue::unpack(&[0x01], AttributeDataType::Boolean),
            Ok((AttributeValue::Boolean(1), 1))
        );
        assert_eq!(
            AttributeValue::unpack(&[0x02], AttributeDataType::Boolean),
            Err(Error::InvalidValue)
        );
        assert_eq!(format!("{}", AttributeValue::Boolean(1)), "true");
    }

    #[test]
    fn strings() {
        let value = AttributeValue::CharacterString(Some("lamp".to_string()));
        let mut data = [0u8; 8];
        assert_eq!(value.pack(&mut data), Ok(5));
        assert_eq!(data[..5], [0x04, b'l', b'a', b'm', b'p']);
        assert_eq!(
            AttributeValue::unpack(&data[..5], AttributeDataType::CharacterString),
            Ok((value, 5))
        );

        let value = AttributeValue::OctetString(None);
        assert_eq!(value.pack(&mut data), Ok(1));
        assert_eq!(data[0], 0xff);
        assert_eq!(
            AttributeValue::unpack(&data[..1], AttributeDataType::OctetString),
            Ok((value, 1))
        );

        assert_eq!(
            AttributeValue::unpack(&[0x03, 0x01], AttributeDataType::OctetString),
            Err(Error::WrongNumberOfBytes)
        );
        assert_eq!(
            AttributeValue::CharacterString(Some("x".repeat(255))).pack(&mut [0u8; 300]),
            Err(Error::InvalidValue)
        );
    }

    #[test]
    fn short_input() {
        assert_eq!(
            AttributeValue::unpack(&[0x01], AttributeDataType::Unsigned16),
            Err(Error::WrongNumberOfBytes)
        );
        assert_eq!(AttributeDataType::try_from(0x99), Err(Error::InvalidValue));
    }
}

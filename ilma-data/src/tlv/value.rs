use core::fmt;

use crate::error::Error;
use crate::tlv::{ContainerType, FromTlv, Tag, TlvReader, TlvWriter, ToTlv};

/// Owned TLV element tree
#[derive(Clone, Debug, PartialEq)]
pub enum TlvValue {
    Signed(i64),
    Unsigned(u64),
    Bool(bool),
    Float32(f32),
    Float64(f64),
    Utf8(String),
    Bytes(Vec<u8>),
    Null,
    Structure(Vec<(Tag, TlvValue)>),
    Array(Vec<TlvValue>),
    List(Vec<(Tag, TlvValue)>),
}

impl TlvValue {
    /// Encode the tree under `tag`
    pub fn encode(&self, writer: &mut TlvWriter<'_>, tag: Tag) -> Result<(), Error> {
        match self {
            TlvValue::Signed(value) => writer.put_i64(tag, *value),
            TlvValue::Unsigned(value) => writer.put_u64(tag, *value),
            TlvValue::Bool(value) => writer.put_bool(tag, *value),
            TlvValue::Float32(value) => writer.put_f32(tag, *value),
            TlvValue::Float64(value) => writer.put_f64(tag, *value),
            TlvValue::Utf8(value) => writer.put_str(tag, value),
            TlvValue::Bytes(value) => writer.put_bytes(tag, value),
            TlvValue::Null => writer.put_null(tag),
            TlvValue::Structure(members) | TlvValue::List(members) => {
                let container_type = if let TlvValue::List(_) = self {
                    ContainerType::List
                } else {
                    ContainerType::Structure
                };
                let marker = writer.start_container(tag, container_type)?;
                for (member_tag, member) in members.iter() {
                    member.encode(writer, *member_tag)?;
                }
                writer.end_container(marker)
            }
            TlvValue::Array(members) => {
                let marker = writer.start_container(tag, ContainerType::Array)?;
                for member in members.iter() {
                    member.encode(writer, Tag::Anonymous)?;
                }
                writer.end_container(marker)
            }
        }
    }

    /// Decode the element the reader is positioned on, including any
    /// container content
    pub fn decode(reader: &mut TlvReader<'_>) -> Result<Self, Error> {
        use crate::tlv::ElementType;

        let element_type = reader.element_type().ok_or(Error::IncorrectState)?;
        let value = match element_type {
            ElementType::Int8 | ElementType::Int16 | ElementType::Int32 | ElementType::Int64 => {
                TlvValue::Signed(reader.get_i64()?)
            }
            ElementType::UInt8
            | ElementType::UInt16
            | ElementType::UInt32
            | ElementType::UInt64 => TlvValue::Unsigned(reader.get_u64()?),
            ElementType::False | ElementType::True => TlvValue::Bool(reader.get_bool()?),
            ElementType::Float32 => TlvValue::Float32(reader.get_f32()?),
            ElementType::Float64 => TlvValue::Float64(reader.get_f64()?),
            ElementType::Utf8String1
            | ElementType::Utf8String2
            | ElementType::Utf8String4
            | ElementType::Utf8String8 => TlvValue::Utf8(reader.get_str()?.to_string()),
            ElementType::ByteString1
            | ElementType::ByteString2
            | ElementType::ByteString4
            | ElementType::ByteString8 => TlvValue::Bytes(reader.get_bytes()?.to_vec()),
            ElementType::Null => TlvValue::Null,
            ElementType::Structure | ElementType::List => {
                let marker = reader.enter_container()?;
                let mut members = Vec::new();
                while let Some(tag) = reader.next_member()? {
                    members.push((tag, TlvValue::decode(reader)?));
                }
                reader.exit_container(marker)?;
                if element_type == ElementType::List {
                    TlvValue::List(members)
                } else {
                    TlvValue::Structure(members)
                }
            }
            ElementType::Array => {
                let marker = reader.enter_container()?;
                let mut members = Vec::new();
                while reader.next_member()?.is_some() {
                    members.push(TlvValue::decode(reader)?);
                }
                reader.exit_container(marker)?;
                TlvValue::Array(members)
            }
            ElementType::EndOfContainer => return Err(Error::InvalidTlvElement),
        };
        Ok(value)
    }

    /// Decode the first top level element of `data`
    pub fn from_bytes(data: &[u8]) -> Result<(Tag, Self), Error> {
        let mut reader = TlvReader::new(data);
        reader.next()?;
        let tag = reader.tag().ok_or(Error::IncorrectState)?;
        Ok((tag, TlvValue::decode(&mut reader)?))
    }

    /// Member of a structure or list by tag
    pub fn member(&self, tag: Tag) -> Option<&TlvValue> {
        match self {
            TlvValue::Structure(members) | TlvValue::List(members) => members
                .iter()
                .find(|(member_tag, _)| *member_tag == tag)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        match self {
            TlvValue::Signed(value) => write!(f, "{}", value),
            TlvValue::Unsigned(value) => write!(f, "{}U", value),
            TlvValue::Bool(value) => write!(f, "{}", value),
            TlvValue::Float32(value) => write!(f, "{}f", value),
            TlvValue::Float64(value) => write!(f, "{}", value),
            TlvValue::Utf8(value) => write!(f, "{:?}", value),
            TlvValue::Bytes(value) => write!(f, "hex:{}", hex::encode(value)),
            TlvValue::Null => write!(f, "null"),
            TlvValue::Structure(members) | TlvValue::List(members) => {
                let (open, close) = if let TlvValue::List(_) = self {
                    ('[', ']')
                } else {
                    ('{', '}')
                };
                writeln!(f, "{}", open)?;
                for (tag, member) in members.iter() {
                    write!(f, "{:width$}", "", width = indent + 2)?;
                    write_tag(f, tag)?;
                    member.write_indented(f, indent + 2)?;
                    writeln!(f, ",")?;
                }
                write!(f, "{:width$}{}", "", close, width = indent)
            }
            TlvValue::Array(members) => {
                writeln!(f, "[[")?;
                for member in members.iter() {
                    write!(f, "{:width$}", "", width = indent + 2)?;
                    member.write_indented(f, indent + 2)?;
                    writeln!(f, ",")?;
                }
                write!(f, "{:width$}]]", "", width = indent)
            }
        }
    }
}

fn write_tag(f: &mut fmt::Formatter<'_>, tag: &Tag) -> fmt::Result {
    match tag {
        Tag::Anonymous => Ok(()),
        Tag::Context(tag) => write!(f, "{} = ", tag),
        Tag::CommonProfile(tag) => write!(f, "common:{} = ", tag),
        Tag::ImplicitProfile(tag) => write!(f, "implicit:{} = ", tag),
        Tag::FullyQualified {
            vendor,
            profile,
            tag,
        } => write!(f, "{:04x}:{:04x}:{} = ", vendor, profile, tag),
    }
}

impl fmt::Display for TlvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

impl ToTlv for TlvValue {
    fn to_tlv(&self, writer: &mut TlvWriter<'_>, tag: Tag) -> Result<(), Error> {
        self.encode(writer, tag)
    }
}

impl FromTlv for TlvValue {
    fn from_tlv(reader: &mut TlvReader<'_>) -> Result<Self, Error> {
        TlvValue::decode(reader)
    }
}

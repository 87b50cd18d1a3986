//! # JSON to TLV encoding
//!
//! Free form JSON documents are turned into TLV so that command fields can be
//! given on a command line. Objects become structures whose keys are context
//! tags, arrays become arrays. Strings may carry a prefix selecting the TLV
//! type:
//!
//! * `hex:` followed by a non-empty, even number of hex digits, an octet
//!   string
//! * `u:` followed by an unsigned integer
//! * `s:` followed by a signed integer
//!
//! Any other string is a UTF-8 string. Integers following a prefix, and
//! object keys, accept the `0x` hexadecimal and leading `0` octal forms.

use serde_json::Value;

use crate::error::Error;
use crate::tlv::{ContainerType, Tag, TlvValue, TlvWriter};
use crate::utils::{parse_signed, parse_unsigned};

/// Upper bound of an encoded argument
pub const CUSTOM_ARGUMENT_MAX_LEN: usize = 4096;

const PREFIX_HEX: &str = "hex:";
const PREFIX_UNSIGNED: &str = "u:";
const PREFIX_SIGNED: &str = "s:";

/// Encode a JSON value as a TLV element with the given tag
pub fn encode_json(writer: &mut TlvWriter<'_>, tag: Tag, value: &Value) -> Result<(), Error> {
    match value {
        Value::Object(members) => {
            let marker = writer.start_container(tag, ContainerType::Structure)?;
            for (key, member) in members.iter() {
                let index = parse_unsigned(key).ok_or(Error::InvalidArgument)?;
                let index = u8::try_from(index).map_err(|_| Error::InvalidArgument)?;
                encode_json(writer, Tag::Context(index), member)?;
            }
            writer.end_container(marker)
        }
        Value::Array(members) => {
            let marker = writer.start_container(tag, ContainerType::Array)?;
            for member in members.iter() {
                encode_json(writer, Tag::Anonymous, member)?;
            }
            writer.end_container(marker)
        }
        Value::String(text) => encode_string(writer, tag, text),
        Value::Null => writer.put_null(tag),
        Value::Bool(flag) => writer.put_bool(tag, *flag),
        Value::Number(number) => {
            if let Some(value) = number.as_u64() {
                writer.put_u64(tag, value)
            } else if let Some(value) = number.as_i64() {
                writer.put_i64(tag, value)
            } else if let Some(value) = number.as_f64() {
                writer.put_f64(tag, value)
            } else {
                Err(Error::NotImplemented)
            }
        }
    }
}

fn encode_string(writer: &mut TlvWriter<'_>, tag: Tag, text: &str) -> Result<(), Error> {
    if let Some(digits) = text.strip_prefix(PREFIX_HEX) {
        if text.len() % 2 != 0 {
            return Err(Error::InvalidStringLength);
        }
        // Undecodable digits and an empty value both yield no octets
        let octets = hex::decode(digits).map_err(|_| Error::NoMemory)?;
        if octets.is_empty() {
            return Err(Error::NoMemory);
        }
        writer.put_bytes(tag, &octets)
    } else if let Some(digits) = text.strip_prefix(PREFIX_UNSIGNED) {
        let value = parse_unsigned(digits).ok_or(Error::InvalidArgument)?;
        writer.put_u64(tag, value)
    } else if let Some(digits) = text.strip_prefix(PREFIX_SIGNED) {
        let value = parse_signed(digits).ok_or(Error::InvalidArgument)?;
        writer.put_i64(tag, value)
    } else {
        writer.put_str(tag, text)
    }
}

/// Command argument given as JSON, held in its encoded form
#[derive(Clone, Debug, PartialEq)]
pub struct CustomArgument {
    data: Vec<u8>,
}

impl CustomArgument {
    /// Parse and encode a JSON document
    ///
    /// Nothing is kept if any part of the document fails to encode.
    pub fn parse(json: &str) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(json).map_err(|error| {
            log::error!("Invalid JSON argument, {}", error);
            Error::InvalidArgument
        })?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, Error> {
        let mut buffer = vec![0u8; CUSTOM_ARGUMENT_MAX_LEN];
        let mut writer = TlvWriter::new(&mut buffer);
        encode_json(&mut writer, Tag::Anonymous, value)?;
        let used = writer.finalize()?;
        buffer.truncate(used);
        Ok(Self { data: buffer })
    }

    /// The encoded element, anonymously tagged
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Copy the encoded element into `writer` under a new tag
    pub fn encode(&self, writer: &mut TlvWriter<'_>, tag: Tag) -> Result<(), Error> {
        let (_, value) = TlvValue::from_bytes(&self.data)?;
        value.encode(writer, tag)
    }
}

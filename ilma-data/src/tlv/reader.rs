use byteorder::{ByteOrder, LittleEndian};

use crate::error::Error;
use crate::tlv::{
    split_control_byte, ContainerMarker, ContainerType, ElementType, Tag, MAX_CONTAINER_DEPTH,
};

#[derive(Copy, Clone, Debug, PartialEq)]
enum Value<'a> {
    Signed(i64),
    Unsigned(u64),
    Bool(bool),
    Float32(f32),
    Float64(f64),
    Utf8(&'a [u8]),
    Bytes(&'a [u8]),
    Null,
    Container(ContainerType),
    EndOfContainer,
}

#[derive(Copy, Clone, Debug)]
struct Element<'a> {
    tag: Tag,
    element_type: ElementType,
    value: Value<'a>,
}

/// Cursor over an encoded TLV buffer
///
/// `next` positions the reader on the next element of the current container,
/// the typed getters read the element the reader is positioned on.
#[derive(Clone, Debug)]
pub struct TlvReader<'a> {
    data: &'a [u8],
    offset: usize,
    current: Option<Element<'a>>,
    containers: heapless::Vec<ContainerType, MAX_CONTAINER_DEPTH>,
}

impl<'a> TlvReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            current: None,
            containers: heapless::Vec::new(),
        }
    }

    fn parse_element(&self, offset: usize) -> Result<(Element<'a>, usize), Error> {
        let data = self.data.get(offset..).ok_or(Error::TlvUnderrun)?;
        let control = *data.first().ok_or(Error::TlvUnderrun)?;
        let (tag_control, element_type) = split_control_byte(control)?;
        let (tag, tag_length) = Tag::unpack(tag_control, &data[1..])?;
        if element_type == ElementType::EndOfContainer && tag != Tag::Anonymous {
            return Err(Error::InvalidTlvElement);
        }
        let mut used = 1 + tag_length;
        let width = element_type.field_width();
        let field = data.get(used..used + width).ok_or(Error::TlvUnderrun)?;
        used += width;
        let value = match element_type {
            ElementType::Int8 => Value::Signed(i64::from(field[0] as i8)),
            ElementType::Int16 => Value::Signed(i64::from(LittleEndian::read_i16(field))),
            ElementType::Int32 => Value::Signed(i64::from(LittleEndian::read_i32(field))),
            ElementType::Int64 => Value::Signed(LittleEndian::read_i64(field)),
            ElementType::UInt8 => Value::Unsigned(u64::from(field[0])),
            ElementType::UInt16 => Value::Unsigned(u64::from(LittleEndian::read_u16(field))),
            ElementType::UInt32 => Value::Unsigned(u64::from(LittleEndian::read_u32(field))),
            ElementType::UInt64 => Value::Unsigned(LittleEndian::read_u64(field)),
            ElementType::False => Value::Bool(false),
            ElementType::True => Value::Bool(true),
            ElementType::Float32 => Value::Float32(LittleEndian::read_f32(field)),
            ElementType::Float64 => Value::Float64(LittleEndian::read_f64(field)),
            ElementType::Utf8String1
            | ElementType::Utf8String2
            | ElementType::Utf8String4
            | ElementType::Utf8String8
            | ElementType::ByteString1
            | ElementType::ByteString2
            | ElementType::ByteString4
            | ElementType::ByteString8 => {
                let length = usize::try_from(LittleEndian::read_uint(field, width))
                    .map_err(|_| Error::TlvUnderrun)?;
                let end = used.checked_add(length).ok_or(Error::TlvUnderrun)?;
                let content = data.get(used..end).ok_or(Error::TlvUnderrun)?;
                used = end;
                if u8::from(element_type) < u8::from(ElementType::ByteString1) {
                    Value::Utf8(content)
                } else {
                    Value::Bytes(content)
                }
            }
            ElementType::Null => Value::Null,
            ElementType::Structure => Value::Container(ContainerType::Structure),
            ElementType::Array => Value::Container(ContainerType::Array),
            ElementType::List => Value::Container(ContainerType::List),
            ElementType::EndOfContainer => Value::EndOfContainer,
        };
        Ok((
            Element {
                tag,
                element_type,
                value,
            },
            offset + used,
        ))
    }

    /// Skip members up to and including the end of the container whose
    /// content starts at `offset`
    fn skip_container(&self, mut offset: usize) -> Result<usize, Error> {
        let mut depth = 1usize;
        while depth > 0 {
            let (element, next) = self.parse_element(offset)?;
            match element.value {
                Value::Container(_) => depth += 1,
                Value::EndOfContainer => depth -= 1,
                _ => {}
            }
            offset = next;
        }
        Ok(offset)
    }

    /// Advance to the next element in the current container
    ///
    /// Fails with `EndOfTlv` when the container, or the top level buffer,
    /// has no more elements.
    pub fn next(&mut self) -> Result<(), Error> {
        if let Some(element) = self.current.take() {
            if let Value::Container(_) = element.value {
                self.offset = self.skip_container(self.offset)?;
            }
        }
        if self.offset >= self.data.len() {
            return if self.containers.is_empty() {
                Err(Error::EndOfTlv)
            } else {
                Err(Error::TlvUnderrun)
            };
        }
        let (element, next) = self.parse_element(self.offset)?;
        if element.value == Value::EndOfContainer {
            return if self.containers.is_empty() {
                Err(Error::InvalidTlvElement)
            } else {
                Err(Error::EndOfTlv)
            };
        }
        self.current = Some(element);
        self.offset = next;
        Ok(())
    }

    /// Advance to the next member, `None` at the end of the container
    pub fn next_member(&mut self) -> Result<Option<Tag>, Error> {
        match self.next() {
            Ok(()) => Ok(self.tag()),
            Err(Error::EndOfTlv) => Ok(None),
            Err(error) => Err(error),
        }
    }

    fn element(&self) -> Result<&Element<'a>, Error> {
        self.current.as_ref().ok_or(Error::IncorrectState)
    }

    /// Tag of the current element
    pub fn tag(&self) -> Option<Tag> {
        self.current.as_ref().map(|element| element.tag)
    }

    /// Type of the current element
    pub fn element_type(&self) -> Option<ElementType> {
        self.current.as_ref().map(|element| element.element_type)
    }

    /// Container type of the current element, `None` for scalars
    pub fn container_type(&self) -> Option<ContainerType> {
        match self.current.as_ref().map(|element| element.value) {
            Some(Value::Container(container_type)) => Some(container_type),
            _ => None,
        }
    }

    /// Nesting depth of the reader
    pub fn depth(&self) -> usize {
        self.containers.len()
    }

    /// Step into the container the reader is positioned on
    pub fn enter_container(&mut self) -> Result<ContainerMarker, Error> {
        let container_type = match self.element()?.value {
            Value::Container(container_type) => container_type,
            _ => return Err(Error::WrongTlvType),
        };
        self.containers
            .push(container_type)
            .map_err(|_| Error::NestingTooDeep)?;
        self.current = None;
        Ok(ContainerMarker {
            depth: self.containers.len(),
            container_type,
        })
    }

    /// Leave the innermost container, skipping any members not read
    pub fn exit_container(&mut self, marker: ContainerMarker) -> Result<(), Error> {
        match self.containers.last() {
            Some(container_type)
                if marker.depth == self.containers.len()
                    && *container_type == marker.container_type => {}
            _ => return Err(Error::IncorrectState),
        }
        if let Some(element) = self.current.take() {
            if let Value::Container(_) = element.value {
                self.offset = self.skip_container(self.offset)?;
            }
        }
        self.offset = self.skip_container(self.offset)?;
        self.containers.pop();
        Ok(())
    }

    pub fn get_u64(&self) -> Result<u64, Error> {
        match self.element()?.value {
            Value::Unsigned(value) => Ok(value),
            _ => Err(Error::WrongTlvType),
        }
    }

    pub fn get_u32(&self) -> Result<u32, Error> {
        u32::try_from(self.get_u64()?).map_err(|_| Error::InvalidIntegerValue)
    }

    pub fn get_u16(&self) -> Result<u16, Error> {
        u16::try_from(self.get_u64()?).map_err(|_| Error::InvalidIntegerValue)
    }

    pub fn get_u8(&self) -> Result<u8, Error> {
        u8::try_from(self.get_u64()?).map_err(|_| Error::InvalidIntegerValue)
    }

    pub fn get_i64(&self) -> Result<i64, Error> {
        match self.element()?.value {
            Value::Signed(value) => Ok(value),
            _ => Err(Error::WrongTlvType),
        }
    }

    pub fn get_i32(&self) -> Result<i32, Error> {
        i32::try_from(self.get_i64()?).map_err(|_| Error::InvalidIntegerValue)
    }

    pub fn get_i16(&self) -> Result<i16, Error> {
        i16::try_from(self.get_i64()?).map_err(|_| Error::InvalidIntegerValue)
    }

    pub fn get_i8(&self) -> Result<i8, Error> {
        i8::try_from(self.get_i64()?).map_err(|_| Error::InvalidIntegerValue)
    }

    pub fn get_bool(&self) -> Result<bool, Error> {
        match self.element()?.value {
            Value::Bool(value) => Ok(value),
            _ => Err(Error::WrongTlvType),
        }
    }

    pub fn get_f32(&self) -> Result<f32, Error> {
        match self.element()?.value {
            Value::Float32(value) => Ok(value),
            _ => Err(Error::WrongTlvType),
        }
    }

    /// Read a floating point value, single precision values are widened
    pub fn get_f64(&self) -> Result<f64, Error> {
        match self.element()?.value {
            Value::Float32(value) => Ok(f64::from(value)),
            Value::Float64(value) => Ok(value),
            _ => Err(Error::WrongTlvType),
        }
    }

    pub fn get_str(&self) -> Result<&'a str, Error> {
        match self.element()?.value {
            Value::Utf8(value) => core::str::from_utf8(value).map_err(|_| Error::InvalidUtf8),
            _ => Err(Error::WrongTlvType),
        }
    }

    pub fn get_bytes(&self) -> Result<&'a [u8], Error> {
        match self.element()?.value {
            Value::Bytes(value) => Ok(value),
            _ => Err(Error::WrongTlvType),
        }
    }

    pub fn is_null(&self) -> Result<bool, Error> {
        Ok(self.element()?.value == Value::Null)
    }
}

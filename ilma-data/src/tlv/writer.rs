use byteorder::{ByteOrder, LittleEndian};

use crate::error::Error;
use crate::tlv::{control_byte, ContainerMarker, ContainerType, ElementType, Tag, MAX_CONTAINER_DEPTH};

/// Bounded TLV encoder writing into a caller provided buffer
///
/// Elements are written whole or not at all, a write that would overflow the
/// buffer fails with `BufferTooSmall` and leaves the buffer untouched.
pub struct TlvWriter<'a> {
    data: &'a mut [u8],
    offset: usize,
    // Bytes kept free at the end for closing the open containers
    reserved: usize,
    containers: heapless::Vec<ContainerType, MAX_CONTAINER_DEPTH>,
}

impl<'a> TlvWriter<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        Self {
            data,
            offset: 0,
            reserved: 0,
            containers: heapless::Vec::new(),
        }
    }

    /// Number of bytes written
    pub fn len(&self) -> usize {
        self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.offset == 0
    }

    /// Bytes written so far
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.offset]
    }

    /// Finish encoding, fails if any container is still open
    pub fn finalize(&self) -> Result<usize, Error> {
        if !self.containers.is_empty() {
            return Err(Error::IncorrectState);
        }
        Ok(self.offset)
    }

    fn check_tag(&self, tag: &Tag) -> Result<(), Error> {
        match self.containers.last() {
            Some(ContainerType::Array) if *tag != Tag::Anonymous => Err(Error::InvalidArgument),
            Some(ContainerType::Structure) if *tag == Tag::Anonymous => {
                Err(Error::InvalidArgument)
            }
            _ => Ok(()),
        }
    }

    fn available(&self) -> usize {
        self.data.len() - self.offset - self.reserved
    }

    fn emit(
        &mut self,
        tag: Tag,
        element_type: ElementType,
        fixed: &[u8],
        payload: &[u8],
    ) -> Result<(), Error> {
        let mut header = [0u8; 9];
        header[0] = control_byte(&tag, element_type);
        let header_length = 1 + tag.pack(&mut header[1..]);
        let length = header_length + fixed.len() + payload.len();
        if self.available() < length {
            return Err(Error::BufferTooSmall);
        }
        let mut offset = self.offset;
        self.data[offset..offset + header_length].copy_from_slice(&header[..header_length]);
        offset += header_length;
        self.data[offset..offset + fixed.len()].copy_from_slice(fixed);
        offset += fixed.len();
        self.data[offset..offset + payload.len()].copy_from_slice(payload);
        self.offset = offset + payload.len();
        Ok(())
    }

    /// Write an unsigned integer using the smallest encoding that holds it
    pub fn put_unsigned(&mut self, tag: Tag, value: u64) -> Result<(), Error> {
        self.check_tag(&tag)?;
        let mut buffer = [0u8; 8];
        let (element_type, width) = if value <= u64::from(u8::MAX) {
            buffer[0] = value as u8;
            (ElementType::UInt8, 1)
        } else if value <= u64::from(u16::MAX) {
            LittleEndian::write_u16(&mut buffer, value as u16);
            (ElementType::UInt16, 2)
        } else if value <= u64::from(u32::MAX) {
            LittleEndian::write_u32(&mut buffer, value as u32);
            (ElementType::UInt32, 4)
        } else {
            LittleEndian::write_u64(&mut buffer, value);
            (ElementType::UInt64, 8)
        };
        self.emit(tag, element_type, &buffer[..width], &[])
    }

    /// Write a signed integer using the smallest encoding that holds it
    pub fn put_signed(&mut self, tag: Tag, value: i64) -> Result<(), Error> {
        self.check_tag(&tag)?;
        let mut buffer = [0u8; 8];
        let (element_type, width) = if i8::try_from(value).is_ok() {
            buffer[0] = value as u8;
            (ElementType::Int8, 1)
        } else if i16::try_from(value).is_ok() {
            LittleEndian::write_i16(&mut buffer, value as i16);
            (ElementType::Int16, 2)
        } else if i32::try_from(value).is_ok() {
            LittleEndian::write_i32(&mut buffer, value as i32);
            (ElementType::Int32, 4)
        } else {
            LittleEndian::write_i64(&mut buffer, value);
            (ElementType::Int64, 8)
        };
        self.emit(tag, element_type, &buffer[..width], &[])
    }

    pub fn put_u8(&mut self, tag: Tag, value: u8) -> Result<(), Error> {
        self.put_unsigned(tag, u64::from(value))
    }

    pub fn put_u16(&mut self, tag: Tag, value: u16) -> Result<(), Error> {
        self.put_unsigned(tag, u64::from(value))
    }

    pub fn put_u32(&mut self, tag: Tag, value: u32) -> Result<(), Error> {
        self.put_unsigned(tag, u64::from(value))
    }

    pub fn put_u64(&mut self, tag: Tag, value: u64) -> Result<(), Error> {
        self.put_unsigned(tag, value)
    }

    pub fn put_i8(&mut self, tag: Tag, value: i8) -> Result<(), Error> {
        self.put_signed(tag, i64::from(value))
    }

    pub fn put_i16(&mut self, tag: Tag, value: i16) -> Result<(), Error> {
        self.put_signed(tag, i64::from(value))
    }

    pub fn put_i32(&mut self, tag: Tag, value: i32) -> Result<(), Error> {
        self.put_signed(tag, i64::from(value))
    }

    pub fn put_i64(&mut self, tag: Tag, value: i64) -> Result<(), Error> {
        self.put_signed(tag, value)
    }

    pub fn put_bool(&mut self, tag: Tag, value: bool) -> Result<(), Error> {
        self.check_tag(&tag)?;
        let element_type = if value {
            ElementType::True
        } else {
            ElementType::False
        };
        self.emit(tag, element_type, &[], &[])
    }

    pub fn put_f32(&mut self, tag: Tag, value: f32) -> Result<(), Error> {
        self.check_tag(&tag)?;
        let mut buffer = [0u8; 4];
        LittleEndian::write_f32(&mut buffer, value);
        self.emit(tag, ElementType::Float32, &buffer, &[])
    }

    pub fn put_f64(&mut self, tag: Tag, value: f64) -> Result<(), Error> {
        self.check_tag(&tag)?;
        let mut buffer = [0u8; 8];
        LittleEndian::write_f64(&mut buffer, value);
        self.emit(tag, ElementType::Float64, &buffer, &[])
    }

    pub fn put_null(&mut self, tag: Tag) -> Result<(), Error> {
        self.check_tag(&tag)?;
        self.emit(tag, ElementType::Null, &[], &[])
    }

    fn put_string(&mut self, tag: Tag, base: ElementType, value: &[u8]) -> Result<(), Error> {
        self.check_tag(&tag)?;
        let mut buffer = [0u8; 8];
        let length = value.len();
        let (step, width) = if length <= usize::from(u8::MAX) {
            buffer[0] = length as u8;
            (0, 1)
        } else if length <= usize::from(u16::MAX) {
            LittleEndian::write_u16(&mut buffer, length as u16);
            (1, 2)
        } else if length as u64 <= u64::from(u32::MAX) {
            LittleEndian::write_u32(&mut buffer, length as u32);
            (2, 4)
        } else {
            LittleEndian::write_u64(&mut buffer, length as u64);
            (3, 8)
        };
        let element_type =
            ElementType::try_from(u8::from(base) + step).map_err(|_| Error::InvalidTlvElement)?;
        self.emit(tag, element_type, &buffer[..width], value)
    }

    pub fn put_str(&mut self, tag: Tag, value: &str) -> Result<(), Error> {
        self.put_string(tag, ElementType::Utf8String1, value.as_bytes())
    }

    pub fn put_bytes(&mut self, tag: Tag, value: &[u8]) -> Result<(), Error> {
        self.put_string(tag, ElementType::ByteString1, value)
    }

    /// Open a container, the returned marker closes it
    pub fn start_container(
        &mut self,
        tag: Tag,
        container_type: ContainerType,
    ) -> Result<ContainerMarker, Error> {
        self.check_tag(&tag)?;
        if self.containers.is_full() {
            return Err(Error::NestingTooDeep);
        }
        // The end of container byte must always fit
        if self.available() < 1 {
            return Err(Error::BufferTooSmall);
        }
        self.reserved += 1;
        if let Err(error) = self.emit(tag, ElementType::from(container_type), &[], &[]) {
            self.reserved -= 1;
            return Err(error);
        }
        self.containers
            .push(container_type)
            .map_err(|_| Error::NestingTooDeep)?;
        Ok(ContainerMarker {
            depth: self.containers.len(),
            container_type,
        })
    }

    /// Close the innermost container
    pub fn end_container(&mut self, marker: ContainerMarker) -> Result<(), Error> {
        match self.containers.last() {
            Some(container_type)
                if marker.depth == self.containers.len()
                    && *container_type == marker.container_type => {}
            _ => return Err(Error::IncorrectState),
        }
        self.reserved -= 1;
        self.data[self.offset] = u8::from(ElementType::EndOfContainer);
        self.offset += 1;
        self.containers.pop();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_width_integers() {
        let mut buffer = [0u8; 64];
        let mut writer = TlvWriter::new(&mut buffer);
        writer.put_u64(Tag::Anonymous, 42).unwrap();
        writer.put_u32(Tag::Anonymous, 0x1234).unwrap();
        writer.put_i64(Tag::Anonymous, -7).unwrap();
        writer.put_i16(Tag::Anonymous, -300).unwrap();
        let used = writer.finalize().unwrap();
        assert_eq!(
            buffer[..used],
            [0x04, 0x2a, 0x05, 0x34, 0x12, 0x00, 0xf9, 0x01, 0xd4, 0xfe]
        );
    }

    #[test]
    fn structure_with_context_tags() {
        let mut buffer = [0u8; 64];
        let mut writer = TlvWriter::new(&mut buffer);
        let outer = writer
            .start_container(Tag::Anonymous, ContainerType::Structure)
            .unwrap();
        writer.put_bool(Tag::Context(0), true).unwrap();
        writer.put_str(Tag::Context(1), "hi").unwrap();
        writer.put_null(Tag::Context(2)).unwrap();
        writer.end_container(outer).unwrap();
        let used = writer.finalize().unwrap();
        assert_eq!(
            buffer[..used],
            [0x15, 0x29, 0x00, 0x2c, 0x01, 0x02, b'h', b'i', 0x34, 0x02, 0x18]
        );
    }

    #[test]
    fn tag_rules_per_container() {
        let mut buffer = [0u8; 64];
        let mut writer = TlvWriter::new(&mut buffer);
        let structure = writer
            .start_container(Tag::Anonymous, ContainerType::Structure)
            .unwrap();
        assert_eq!(
            writer.put_u8(Tag::Anonymous, 1),
            Err(Error::InvalidArgument)
        );
        let array = writer
            .start_container(Tag::Context(3), ContainerType::Array)
            .unwrap();
        assert_eq!(
            writer.put_u8(Tag::Context(1), 1),
            Err(Error::InvalidArgument)
        );
        writer.put_u8(Tag::Anonymous, 1).unwrap();
        writer.end_container(array).unwrap();
        let list = writer
            .start_container(Tag::Context(4), ContainerType::List)
            .unwrap();
        writer.put_u8(Tag::Anonymous, 1).unwrap();
        writer.put_u8(Tag::Context(1), 2).unwrap();
        writer.end_container(list).unwrap();
        writer.end_container(structure).unwrap();
        assert!(writer.finalize().is_ok());
    }

    #[test]
    fn containers_close_in_order() {
        let mut buffer = [0u8; 64];
        let mut writer = TlvWriter::new(&mut buffer);
        let outer = writer
            .start_container(Tag::Anonymous, ContainerType::Structure)
            .unwrap();
        let inner = writer
            .start_container(Tag::Context(0), ContainerType::List)
            .unwrap();
        assert_eq!(writer.finalize(), Err(Error::IncorrectState));
        assert_eq!(writer.end_container(outer), Err(Error::IncorrectState));
        writer.end_container(inner).unwrap();
        assert_eq!(writer.finalize(), Err(Error::IncorrectState));
    }

    #[test]
    fn overflow_leaves_buffer_untouched() {
        let mut buffer = [0u8; 4];
        let mut writer = TlvWriter::new(&mut buffer);
        writer.put_u8(Tag::Context(1), 5).unwrap();
        assert_eq!(
            writer.put_str(Tag::Anonymous, "abc"),
            Err(Error::BufferTooSmall)
        );
        assert_eq!(writer.len(), 3);
        assert_eq!(writer.as_slice(), [0x24, 0x01, 0x05]);
    }

    #[test]
    fn container_reserves_end_byte() {
        let mut buffer = [0u8; 2];
        let mut writer = TlvWriter::new(&mut buffer);
        let marker = writer
            .start_container(Tag::Anonymous, ContainerType::Array)
            .unwrap();
        assert_eq!(
            writer.put_bool(Tag::Anonymous, true),
            Err(Error::BufferTooSmall)
        );
        writer.end_container(marker).unwrap();
        assert_eq!(writer.finalize(), Ok(2));
    }
}

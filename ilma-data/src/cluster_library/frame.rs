use core::convert::TryFrom;

use crate::error::Error;
use crate::pack::{Pack, PackFixed};

use byteorder::{ByteOrder, LittleEndian};

/// Frame type field
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FrameType {
    /// The command is global for all clusters
    Global = 0b00,
    /// Command is specific to a cluster
    Local = 0b01,
}

impl TryFrom<u8> for FrameType {
    type Error = Error;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value & 0b11 {
            0b00 => Ok(FrameType::Global),
            0b01 => Ok(FrameType::Local),
            _ => Err(Error::UnknownFrameType),
        }
    }
}

/// Direction of the command
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Direction {
    /// Sent from the client side to the server side
    ToServer,
    /// Sent from the server side to the client side
    ToClient,
}

impl From<u8> for Direction {
    fn from(value: u8) -> Self {
        if value & 0b0000_1000 == 0 {
            Direction::ToServer
        } else {
            Direction::ToClient
        }
    }
}

impl From<Direction> for u8 {
    fn from(value: Direction) -> u8 {
        match value {
            Direction::ToServer => 0b0000_0000,
            Direction::ToClient => 0b0000_1000,
        }
    }
}

/// Cluster library frame control field
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameControl {
    pub frame_type: FrameType,
    pub manufacturer_specific: bool,
    pub direction: Direction,
    pub disable_default_response: bool,
}

impl FrameControl {
    /// Global command sent from client to server, `0x00` on the wire
    pub fn global_to_server() -> Self {
        Self {
            frame_type: FrameType::Global,
            manufacturer_specific: false,
            direction: Direction::ToServer,
            disable_default_response: false,
        }
    }

    /// Cluster specific command sent from client to server, `0x01` on the wire
    pub fn local_to_server() -> Self {
        Self {
            frame_type: FrameType::Local,
            ..Self::global_to_server()
        }
    }

    /// Global commands from a client carry a 32-bit command identifier,
    /// all other frames an 8-bit one
    pub fn command_width(&self) -> usize {
        match (self.frame_type, self.direction) {
            (FrameType::Global, Direction::ToServer) => 4,
            _ => 1,
        }
    }
}

impl PackFixed<FrameControl, Error> for FrameControl {
    fn pack(&self, data: &mut [u8]) -> Result<(), Error> {
        if data.len() != 1 {
            return Err(Error::WrongNumberOfBytes);
        }
        data[0] = self.frame_type as u8
            | ((self.manufacturer_specific as u8) << 2)
            | u8::from(self.direction)
            | ((self.disable_default_response as u8) << 4);
        Ok(())
    }

    fn unpack(data: &[u8]) -> Result<Self, Error> {
        if data.len() != 1 {
            return Err(Error::WrongNumberOfBytes);
        }
        Ok(Self {
            frame_type: FrameType::try_from(data[0])?,
            manufacturer_specific: (data[0] & 0b0000_0100) == 0b0000_0100,
            direction: Direction::from(data[0]),
            disable_default_response: (data[0] & 0b0001_0000) == 0b0001_0000,
        })
    }
}

/// Cluster library frame header
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClusterLibraryHeader {
    pub control: FrameControl,
    /// Manufacturer code for manufacturer specific commands
    pub manufacturer: Option<u16>,
    pub transaction_sequence: u8,
    pub command: u32,
}

impl Pack<ClusterLibraryHeader, Error> for ClusterLibraryHeader {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        let command_width = self.control.command_width();
        let manufacturer_width = if self.manufacturer.is_some() { 2 } else { 0 };
        if data.len() < 2 + manufacturer_width + command_width {
            return Err(Error::WrongNumberOfBytes);
        }
        let mut control = self.control;
        control.manufacturer_specific = self.manufacturer.is_some();
        control.pack(&mut data[0..1])?;
        let mut offset = 1;
        if let Some(manufacturer) = self.manufacturer {
            LittleEndian::write_u16(&mut data[offset..offset + 2], manufacturer);
            offset += 2;
        }
        data[offset] = self.transaction_sequence;
        offset += 1;
        if command_width == 4 {
            LittleEndian::write_u32(&mut data[offset..offset + 4], self.command);
        } else {
            data[offset] = u8::try_from(self.command).map_err(|_| Error::InvalidValue)?;
        }
        Ok(offset + command_width)
    }

    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        if data.is_empty() {
            return Err(Error::WrongNumberOfBytes);
        }
        let control = FrameControl::unpack(&data[0..1])?;
        let command_width = control.command_width();
        let manufacturer_width = if control.manufacturer_specific { 2 } else { 0 };
        if data.len() < 2 + manufacturer_width + command_width {
            return Err(Error::WrongNumberOfBytes);
        }
        let mut offset = 1;
        let manufacturer = if control.manufacturer_specific {
            let manufacturer = LittleEndian::read_u16(&data[offset..offset + 2]);
            offset += 2;
            Some(manufacturer)
        } else {
            None
        };
        let transaction_sequence = data[offset];
        offset += 1;
        let command = if command_width == 4 {
            LittleEndian::read_u32(&data[offset..offset + 4])
        } else {
            u32::from(data[offset])
        };
        Ok((
            Self {
                control,
                manufacturer,
                transaction_sequence,
                command,
            },
            offset + command_width,
        ))
    }
}

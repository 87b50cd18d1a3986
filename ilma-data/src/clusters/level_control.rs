//! Level Control cluster

use byteorder::{ByteOrder, LittleEndian};

use crate::clusters::{enter_fields, ClusterCommand};
use crate::common::{AttributeId, ClusterId, CommandId};
use crate::error::Error;
use crate::pack::Pack;
use crate::tlv::{ContainerType, FromTlv, Tag, TlvReader, TlvWriter, ToTlv};

pub const CLUSTER: ClusterId = 0x0008;

pub const ATTRIBUTE_CURRENT_LEVEL: AttributeId = 0x0000;

/// Highest level a device can be set to
pub const MAX_LEVEL: u8 = 0xfe;

/// Move to a level over a transition time
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MoveToLevel {
    pub level: u8,
    /// Transition time in tenths of a second
    pub transition_time: u16,
    pub options_mask: u8,
    pub options_override: u8,
}

impl ClusterCommand for MoveToLevel {
    const CLUSTER: ClusterId = CLUSTER;
    const COMMAND: CommandId = 0x00;
}

impl ToTlv for MoveToLevel {
    fn to_tlv(&self, writer: &mut TlvWriter<'_>, tag: Tag) -> Result<(), Error> {
        let marker = writer.start_container(tag, ContainerType::Structure)?;
        writer.put_u8(Tag::Context(0), self.level)?;
        writer.put_u16(Tag::Context(1), self.transition_time)?;
        writer.put_u8(Tag::Context(2), self.options_mask)?;
        writer.put_u8(Tag::Context(3), self.options_override)?;
        writer.end_container(marker)
    }
}

impl FromTlv for MoveToLevel {
    fn from_tlv(reader: &mut TlvReader<'_>) -> Result<Self, Error> {
        let marker = enter_fields(reader)?;
        let mut level = None;
        let mut command = MoveToLevel::default();
        while let Some(tag) = reader.next_member()? {
            match tag {
                Tag::Context(0) => level = Some(reader.get_u8()?),
                Tag::Context(1) => command.transition_time = reader.get_u16()?,
                Tag::Context(2) => command.options_mask = reader.get_u8()?,
                Tag::Context(3) => command.options_override = reader.get_u8()?,
                _ => {}
            }
        }
        reader.exit_container(marker)?;
        command.level = level.ok_or(Error::MissingField)?;
        Ok(command)
    }
}

impl Pack<MoveToLevel, Error> for MoveToLevel {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        if data.len() < 5 {
            return Err(Error::WrongNumberOfBytes);
        }
        data[0] = self.level;
        LittleEndian::write_u16(&mut data[1..3], self.transition_time);
        data[3] = self.options_mask;
        data[4] = self.options_override;
        Ok(5)
    }

    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        if data.len() < 5 {
            return Err(Error::WrongNumberOfBytes);
        }
        Ok((
            Self {
                level: data[0],
                transition_time: LittleEndian::read_u16(&data[1..3]),
                options_mask: data[3],
                options_override: data[4],
            },
            5,
        ))
    }
}

empty_command!(
    /// Stop any level transition in progress
    Stop,
    CLUSTER,
    0x03
);

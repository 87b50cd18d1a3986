//! Barrier Control cluster

use crate::clusters::{enter_fields, ClusterCommand};
use crate::common::{AttributeId, ClusterId, CommandId};
use crate::error::Error;
use crate::pack::Pack;
use crate::tlv::{ContainerType, FromTlv, Tag, TlvReader, TlvWriter, ToTlv};

pub const CLUSTER: ClusterId = 0x0103;

pub const ATTRIBUTE_MOVING_STATE: AttributeId = 0x0001;
pub const ATTRIBUTE_SAFETY_STATUS: AttributeId = 0x0002;
pub const ATTRIBUTE_CAPABILITIES: AttributeId = 0x0003;
pub const ATTRIBUTE_POSITION: AttributeId = 0x000a;

/// Open the barrier to a percentage
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GoToPercent {
    pub percent_open: u8,
}

impl ClusterCommand for GoToPercent {
    const CLUSTER: ClusterId = CLUSTER;
    const COMMAND: CommandId = 0x00;
}

impl ToTlv for GoToPercent {
    fn to_tlv(&self, writer: &mut TlvWriter<'_>, tag: Tag) -> Result<(), Error> {
        let marker = writer.start_container(tag, ContainerType::Structure)?;
        writer.put_u8(Tag::Context(0), self.percent_open)?;
        writer.end_container(marker)
    }
}

impl FromTlv for GoToPercent {
    fn from_tlv(reader: &mut TlvReader<'_>) -> Result<Self, Error> {
        let marker = enter_fields(reader)?;
        let mut percent_open = None;
        while let Some(tag) = reader.next_member()? {
            if tag == Tag::Context(0) {
                percent_open = Some(reader.get_u8()?);
            }
        }
        reader.exit_container(marker)?;
        Ok(Self {
            percent_open: percent_open.ok_or(Error::MissingField)?,
        })
    }
}

impl Pack<GoToPercent, Error> for GoToPercent {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        if data.is_empty() {
            return Err(Error::WrongNumberOfBytes);
        }
        data[0] = self.percent_open;
        Ok(1)
    }

    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        if data.is_empty() {
            return Err(Error::WrongNumberOfBytes);
        }
        Ok((
            Self {
                percent_open: data[0],
            },
            1,
        ))
    }
}

empty_command!(
    /// Stop the barrier
    Stop,
    CLUSTER,
    0x01
);

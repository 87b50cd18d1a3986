//! # Clusters
//!
//! Typed command structures for the supported clusters. Each command is
//! carried as a TLV structure on the interaction model path and as a
//! positional payload on the legacy cluster library path.

use crate::common::{ClusterId, CommandId};
use crate::error::Error;
use crate::tlv::{ContainerMarker, ContainerType, TlvReader};

/// Identifies the cluster and command a structure is sent as
pub trait ClusterCommand {
    const CLUSTER: ClusterId;
    const COMMAND: CommandId;
}

/// Enter the fields of a command, which must be a structure
pub(crate) fn enter_fields(reader: &mut TlvReader<'_>) -> Result<ContainerMarker, Error> {
    match reader.container_type() {
        Some(ContainerType::Structure) => reader.enter_container(),
        Some(_) | None => Err(Error::WrongTlvType),
    }
}

/// Command without any fields
macro_rules! empty_command {
    ($(#[$meta:meta])* $name:ident, $cluster:expr, $command:expr) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Default, PartialEq)]
        pub struct $name;

        impl $crate::clusters::ClusterCommand for $name {
            const CLUSTER: $crate::common::ClusterId = $cluster;
            const COMMAND: $crate::common::CommandId = $command;
        }

        impl $crate::tlv::ToTlv for $name {
            fn to_tlv(
                &self,
                writer: &mut $crate::tlv::TlvWriter<'_>,
                tag: $crate::tlv::Tag,
            ) -> Result<(), $crate::error::Error> {
                let marker = writer.start_container(tag, $crate::tlv::ContainerType::Structure)?;
                writer.end_container(marker)
            }
        }

        impl $crate::tlv::FromTlv for $name {
            fn from_tlv(
                reader: &mut $crate::tlv::TlvReader<'_>,
            ) -> Result<Self, $crate::error::Error> {
                let marker = $crate::clusters::enter_fields(reader)?;
                reader.exit_container(marker)?;
                Ok($name)
            }
        }

        impl $crate::pack::Pack<$name, $crate::error::Error> for $name {
            fn pack(&self, _data: &mut [u8]) -> Result<usize, $crate::error::Error> {
                Ok(0)
            }

            fn unpack(_data: &[u8]) -> Result<(Self, usize), $crate::error::Error> {
                Ok(($name, 0))
            }
        }
    };
}

pub mod barrier_control;
pub mod diagnostic_logs;
pub mod level_control;
pub mod on_off;

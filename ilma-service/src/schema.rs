//! Cluster schema
//!
//! Static description of the clusters served by a node: the command table,
//! binding every (cluster, command) pair to a decoder and a handler, and the
//! attribute metadata. The schema is assembled once and only read after.

use std::collections::BTreeMap;

use ilma_data::cluster_library::{AttributeDataType, AttributeValue};
use ilma_data::interaction_model::Status;
use ilma_data::tlv::{FromTlv, TlvReader};
use ilma_data::{AttributeId, ClusterId, CommandId, ConcreteCommandPath};

use crate::command_handler::CommandHandler;
use crate::Error;

/// Decodes the command fields and runs the handler
pub type CommandFn<C> = Box<
    dyn Fn(&mut C, &mut CommandHandler, &ConcreteCommandPath, &mut TlvReader<'_>) -> Result<(), Error>,
>;

/// Attribute description
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeMetadata {
    pub identifier: AttributeId,
    pub data_type: AttributeDataType,
    /// Size of the fixed size type, or of the encoded default
    pub size: usize,
    pub default: AttributeValue,
}

impl AttributeMetadata {
    /// Attribute typed by its default value
    pub fn new(identifier: AttributeId, default: AttributeValue) -> Self {
        let data_type = default.data_type();
        Self {
            identifier,
            data_type,
            size: data_type.num_octets().unwrap_or_else(|| default.packed_length()),
            default,
        }
    }
}

struct ClusterEntry<C> {
    commands: BTreeMap<CommandId, CommandFn<C>>,
    attributes: BTreeMap<AttributeId, AttributeMetadata>,
}

/// Command and attribute table, `C` is the context handlers operate on
pub struct Schema<C> {
    clusters: BTreeMap<ClusterId, ClusterEntry<C>>,
}

impl<C> Default for Schema<C> {
    fn default() -> Self {
        Self {
            clusters: BTreeMap::new(),
        }
    }
}

impl<C> Schema<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_cluster(&mut self, cluster: ClusterId) -> Result<(), Error> {
        if self.clusters.contains_key(&cluster) {
            return Err(Error::DuplicateCluster);
        }
        self.clusters.insert(
            cluster,
            ClusterEntry {
                commands: BTreeMap::new(),
                attributes: BTreeMap::new(),
            },
        );
        Ok(())
    }

    fn cluster_mut(&mut self, cluster: ClusterId) -> Result<&mut ClusterEntry<C>, Error> {
        self.clusters
            .get_mut(&cluster)
            .ok_or(Error::Status(Status::UnsupportedCluster))
    }

    /// Bind a command to its field type and handler
    ///
    /// The handler only ever sees fully decoded fields. A handler returning
    /// `false` is reported as an internal failure.
    pub fn add_command<T, F>(
        &mut self,
        cluster: ClusterId,
        command: CommandId,
        handler: F,
    ) -> Result<(), Error>
    where
        T: FromTlv + 'static,
        F: Fn(&mut C, &mut CommandHandler, &ConcreteCommandPath, &T) -> bool + 'static,
    {
        let entry = self.cluster_mut(cluster)?;
        if entry.commands.contains_key(&command) {
            return Err(Error::DuplicateCommand);
        }
        let function: CommandFn<C> = Box::new(
            move |context: &mut C,
                  responder: &mut CommandHandler,
                  path: &ConcreteCommandPath,
                  reader: &mut TlvReader<'_>| {
                let fields = T::from_tlv(reader)?;
                if handler(context, responder, path, &fields) {
                    Ok(())
                } else {
                    Err(Error::Internal)
                }
            },
        );
        entry.commands.insert(command, function);
        Ok(())
    }

    pub fn add_attribute(
        &mut self,
        cluster: ClusterId,
        attribute: AttributeMetadata,
    ) -> Result<(), Error> {
        let entry = self.cluster_mut(cluster)?;
        if entry.attributes.contains_key(&attribute.identifier) {
            return Err(Error::InvalidArgument);
        }
        entry.attributes.insert(attribute.identifier, attribute);
        Ok(())
    }

    /// Look up a command, distinguishing an unknown cluster from an unknown
    /// command of a known cluster
    pub fn command(&self, cluster: ClusterId, command: CommandId) -> Result<&CommandFn<C>, Error> {
        let entry = self
            .clusters
            .get(&cluster)
            .ok_or(Error::Status(Status::UnsupportedCluster))?;
        entry
            .commands
            .get(&command)
            .ok_or(Error::Status(Status::UnsupportedCommand))
    }

    pub fn attribute(
        &self,
        cluster: ClusterId,
        attribute: AttributeId,
    ) -> Result<&AttributeMetadata, Error> {
        let entry = self
            .clusters
            .get(&cluster)
            .ok_or(Error::Status(Status::UnsupportedCluster))?;
        entry
            .attributes
            .get(&attribute)
            .ok_or(Error::Status(Status::UnsupportedAttribute))
    }

    pub fn has_cluster(&self, cluster: ClusterId) -> bool {
        self.clusters.contains_key(&cluster)
    }

    pub fn clusters(&self) -> impl Iterator<Item = ClusterId> + '_ {
        self.clusters.keys().copied()
    }

    /// Command identifiers of a cluster, in ascending order
    pub fn commands(&self, cluster: ClusterId) -> impl Iterator<Item = CommandId> + '_ {
        self.clusters
            .get(&cluster)
            .into_iter()
            .flat_map(|entry| entry.commands.keys().copied())
    }

    /// Every attribute with its cluster
    pub fn attributes(&self) -> impl Iterator<Item = (ClusterId, &AttributeMetadata)> + '_ {
        self.clusters.iter().flat_map(|(cluster, entry)| {
            entry
                .attributes
                .values()
                .map(move |attribute| (*cluster, attribute))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ilma_data::clusters::on_off::{self, On, Toggle};

    fn schema() -> Schema<u32> {
        let mut schema = Schema::new();
        schema.add_cluster(on_off::CLUSTER).unwrap();
        schema
            .add_command::<On, _>(on_off::CLUSTER, 0x01, |count, _, _, _| {
                *count += 1;
                true
            })
            .unwrap();
        schema
            .add_attribute(
                on_off::CLUSTER,
                AttributeMetadata::new(on_off::ATTRIBUTE_ON_OFF, AttributeValue::Boolean(0)),
            )
            .unwrap();
        schema
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut schema = schema();
        assert_eq!(schema.add_cluster(on_off::CLUSTER), Err(Error::DuplicateCluster));
        assert_eq!(
            schema
                .add_command::<Toggle, _>(on_off::CLUSTER, 0x01, |_, _, _, _| true)
                .err(),
            Some(Error::DuplicateCommand)
        );
        assert_eq!(
            schema
                .add_command::<Toggle, _>(0x0300, 0x02, |_, _, _, _| true)
                .err(),
            Some(Error::Status(Status::UnsupportedCluster))
        );
    }

    #[test]
    fn lookup() {
        let schema = schema();
        assert!(schema.command(on_off::CLUSTER, 0x01).is_ok());
        assert_eq!(
            schema.command(on_off::CLUSTER, 0x02).err(),
            Some(Error::Status(Status::UnsupportedCommand))
        );
        assert_eq!(
            schema.command(0x0300, 0x01).err(),
            Some(Error::Status(Status::UnsupportedCluster))
        );
        assert_eq!(schema.commands(on_off::CLUSTER).collect::<Vec<_>>(), [0x01]);

        let attribute = schema.attribute(on_off::CLUSTER, 0x0000).unwrap();
        assert_eq!(attribute.data_type, AttributeDataType::Boolean);
        assert_eq!(attribute.size, 1);
        assert_eq!(
            schema.attribute(on_off::CLUSTER, 0x4000).err(),
            Some(Error::Status(Status::UnsupportedAttribute))
        );
        assert_eq!(schema.attributes().count(), 1);
    }
}

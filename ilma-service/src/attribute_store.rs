//! Attribute values of a node

use std::collections::BTreeMap;

use ilma_data::cluster_library::AttributeValue;
use ilma_data::interaction_model::Status;
use ilma_data::{ConcreteAttributePath, EndpointId};

use crate::schema::Schema;
use crate::Error;

/// Current attribute values, one set per endpoint
#[derive(Clone, Debug, Default)]
pub struct AttributeStore {
    values: BTreeMap<ConcreteAttributePath, AttributeValue>,
}

impl AttributeStore {
    /// Create a store holding the default value of every attribute in the
    /// schema, on each of the endpoints
    pub fn new<C>(schema: &Schema<C>, endpoints: &[EndpointId]) -> Self {
        let mut values = BTreeMap::new();
        for endpoint in endpoints {
            for (cluster, attribute) in schema.attributes() {
                let path = ConcreteAttributePath::new(*endpoint, cluster, attribute.identifier);
                values.insert(path, attribute.default.clone());
            }
        }
        Self { values }
    }

    pub fn read(&self, path: &ConcreteAttributePath) -> Result<&AttributeValue, Error> {
        self.values
            .get(path)
            .ok_or(Error::Status(Status::UnsupportedAttribute))
    }

    /// Update from the node itself, returns the previous value
    pub fn set(
        &mut self,
        path: &ConcreteAttributePath,
        value: AttributeValue,
    ) -> Result<AttributeValue, Error> {
        match self.values.get_mut(path) {
            Some(current) => {
                if current.data_type() != value.data_type() {
                    return Err(Error::Status(Status::InvalidDataType));
                }
                Ok(core::mem::replace(current, value))
            }
            None => Err(Error::Status(Status::UnsupportedAttribute)),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AttributeMetadata;

    const CLUSTER: u16 = 0x0000;

    fn schema() -> Schema<()> {
        let mut schema = Schema::new();
        schema.add_cluster(CLUSTER).unwrap();
        schema
            .add_attribute(
                CLUSTER,
                AttributeMetadata::new(0x0000, AttributeValue::Unsigned8(3)),
            )
            .unwrap();
        schema
            .add_attribute(
                CLUSTER,
                AttributeMetadata::new(
                    0x0005,
                    AttributeValue::CharacterString(Some(String::new())),
                ),
            )
            .unwrap();
        schema
    }

    #[test]
    fn defaults_per_endpoint() {
        let schema = schema();
        let store = AttributeStore::new(&schema, &[1, 2]);
        assert_eq!(store.len(), 4);
        assert_eq!(
            store.read(&ConcreteAttributePath::new(2, CLUSTER, 0x0000)),
            Ok(&AttributeValue::Unsigned8(3))
        );
        assert_eq!(
            store.read(&ConcreteAttributePath::new(3, CLUSTER, 0x0000)),
            Err(Error::Status(Status::UnsupportedAttribute))
        );
    }

    #[test]
    fn set_keeps_the_type() {
        let schema = schema();
        let mut store = AttributeStore::new(&schema, &[1]);
        let version = ConcreteAttributePath::new(1, CLUSTER, 0x0000);
        let label = ConcreteAttributePath::new(1, CLUSTER, 0x0005);

        assert_eq!(
            store.set(&label, AttributeValue::Unsigned8(4)),
            Err(Error::Status(Status::InvalidDataType))
        );
        assert_eq!(
            store.set(
                &ConcreteAttributePath::new(2, CLUSTER, 0x0005),
                AttributeValue::CharacterString(None)
            ),
            Err(Error::Status(Status::UnsupportedAttribute))
        );
        let kitchen = AttributeValue::CharacterString(Some("kitchen".to_string()));
        assert_eq!(
            store.set(&label, kitchen.clone()),
            Ok(AttributeValue::CharacterString(Some(String::new())))
        );
        assert_eq!(store.read(&label), Ok(&kitchen));

        assert_eq!(
            store.set(&version, AttributeValue::Unsigned8(5)),
            Ok(AttributeValue::Unsigned8(3))
        );
    }
}

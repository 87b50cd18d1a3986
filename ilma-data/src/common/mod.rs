//! # Common identifiers and paths

/// 16-bit cluster identifier
pub type ClusterId = u16;
/// 16-bit command identifier
pub type CommandId = u16;
/// 16-bit attribute identifier
pub type AttributeId = u16;
/// Endpoint identifier
pub type EndpointId = u16;
/// 64-bit node identifier
pub type NodeId = u64;

/// Fully resolved address of a command
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConcreteCommandPath {
    pub endpoint: EndpointId,
    pub cluster: ClusterId,
    pub command: CommandId,
}

impl ConcreteCommandPath {
    pub fn new(endpoint: EndpointId, cluster: ClusterId, command: CommandId) -> Self {
        Self {
            endpoint,
            cluster,
            command,
        }
    }

    /// Path of an attribute on the same endpoint and cluster
    pub fn attribute(&self, attribute: AttributeId) -> ConcreteAttributePath {
        ConcreteAttributePath::new(self.endpoint, self.cluster, attribute)
    }
}

/// Fully resolved address of an attribute
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConcreteAttributePath {
    pub endpoint: EndpointId,
    pub cluster: ClusterId,
    pub attribute: AttributeId,
}

impl ConcreteAttributePath {
    pub fn new(endpoint: EndpointId, cluster: ClusterId, attribute: AttributeId) -> Self {
        Self {
            endpoint,
            cluster,
            attribute,
        }
    }
}

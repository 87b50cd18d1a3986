//! Server clusters of a node

use ilma_data::clusters::diagnostic_logs::{RetrieveLogsRequest, CLUSTER as DIAGNOSTIC_LOGS};
use ilma_data::clusters::ClusterCommand;
use ilma_data::EndpointId;

use crate::attribute_store::AttributeStore;
use crate::schema::Schema;
use crate::Error;

pub mod diagnostic_logs;
mod level_control;
mod on_off;

pub use self::diagnostic_logs::{DiagnosticLogsServer, LogProviderDelegate, LogSessionHandle};

/// Context the server clusters operate on
pub struct Node {
    pub attributes: AttributeStore,
    pub diagnostic_logs: DiagnosticLogsServer,
}

impl Node {
    /// Schema with the On/Off, Level Control and Diagnostic Logs clusters
    pub fn schema() -> Result<Schema<Node>, Error> {
        let mut schema = Schema::new();
        on_off::register(&mut schema)?;
        level_control::register(&mut schema)?;
        schema.add_cluster(DIAGNOSTIC_LOGS)?;
        schema.add_command::<RetrieveLogsRequest, _>(
            DIAGNOSTIC_LOGS,
            RetrieveLogsRequest::COMMAND,
            |node, handler, path, request| {
                node.diagnostic_logs
                    .handle_retrieve_logs(handler, path, request)
            },
        )?;
        Ok(schema)
    }

    /// Node serving the attributes of `schema` on `endpoints`
    pub fn new(
        schema: &Schema<Node>,
        endpoints: &[EndpointId],
        diagnostic_logs: DiagnosticLogsServer,
    ) -> Self {
        Self {
            attributes: AttributeStore::new(schema, endpoints),
            diagnostic_logs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_handler::CommandHandler;
    use crate::dispatch::dispatch;
    use ilma_data::cluster_library::AttributeValue;
    use ilma_data::interaction_model::{InvokeResponse, Status, StatusIb};
    use ilma_data::tlv::TlvReader;
    use ilma_data::{ConcreteAttributePath, ConcreteCommandPath};

    fn invoke(
        schema: &Schema<Node>,
        node: &mut Node,
        path: ConcreteCommandPath,
        fields: &[u8],
    ) -> Status {
        let mut handler = CommandHandler::new();
        let mut reader = TlvReader::new(fields);
        reader.next().unwrap();
        dispatch(schema, node, &mut handler, &path, &mut reader);
        match handler.responses() {
            [InvokeResponse::Status {
                status: StatusIb { status, .. },
                ..
            }] => *status,
            other => panic!("Unexpected responses {:?}", other),
        }
    }

    #[test]
    fn on_off() {
        let schema = Node::schema().unwrap();
        let mut node = Node::new(&schema, &[1], DiagnosticLogsServer::default());
        let attribute = ConcreteAttributePath::new(1, 0x0006, 0x0000);

        let status = invoke(&schema, &mut node, ConcreteCommandPath::new(1, 0x0006, 0x01), &[0x15, 0x18]);
        assert_eq!(status, Status::Success);
        assert_eq!(node.attributes.read(&attribute), Ok(&AttributeValue::Boolean(1)));

        let status = invoke(&schema, &mut node, ConcreteCommandPath::new(1, 0x0006, 0x02), &[0x15, 0x18]);
        assert_eq!(status, Status::Success);
        assert_eq!(node.attributes.read(&attribute), Ok(&AttributeValue::Boolean(0)));

        let status = invoke(&schema, &mut node, ConcreteCommandPath::new(2, 0x0006, 0x01), &[0x15, 0x18]);
        assert_eq!(status, Status::UnsupportedEndpoint);
    }

    #[test]
    fn level_control() {
        let schema = Node::schema().unwrap();
        let mut node = Node::new(&schema, &[1], DiagnosticLogsServer::default());
        let attribute = ConcreteAttributePath::new(1, 0x0008, 0x0000);

        let status = invoke(
            &schema,
            &mut node,
            ConcreteCommandPath::new(1, 0x0008, 0x00),
            &[0x15, 0x24, 0x00, 0x80, 0x18],
        );
        assert_eq!(status, Status::Success);
        assert_eq!(node.attributes.read(&attribute), Ok(&AttributeValue::Unsigned8(0x80)));

        let status = invoke(
            &schema,
            &mut node,
            ConcreteCommandPath::new(1, 0x0008, 0x00),
            &[0x15, 0x24, 0x00, 0xff, 0x18],
        );
        assert_eq!(status, Status::ConstraintError);
        assert_eq!(node.attributes.read(&attribute), Ok(&AttributeValue::Unsigned8(0x80)));

        let status = invoke(&schema, &mut node, ConcreteCommandPath::new(1, 0x0008, 0x03), &[0x15, 0x18]);
        assert_eq!(status, Status::Success);
    }

    #[test]
    fn unknown_protocol_is_an_invalid_command() {
        let schema = Node::schema().unwrap();
        let mut node = Node::new(&schema, &[0], DiagnosticLogsServer::default());
        let status = invoke(
            &schema,
            &mut node,
            ConcreteCommandPath::new(0, 0x0032, 0x00),
            &[0x15, 0x24, 0x00, 0x00, 0x24, 0x01, 0x05, 0x18],
        );
        assert_eq!(status, Status::InvalidCommand);
    }
}

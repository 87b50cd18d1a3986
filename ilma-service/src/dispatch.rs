//! Server side command dispatch
//!
//! Errors are classified in three groups: addressing errors carry their own
//! status (`UnsupportedCluster`, `UnsupportedCommand`), decode errors and
//! handler failures become `InvalidCommand`. Translation into a status
//! happens once, in `dispatch_server_error`.

use ilma_data::interaction_model::Status;
use ilma_data::tlv::TlvReader;
use ilma_data::ConcreteCommandPath;

use crate::command_handler::CommandHandler;
use crate::schema::Schema;
use crate::Error;

/// Route a command to its handler
///
/// The reader must be positioned on the command fields.
pub fn dispatch_command<C>(
    schema: &Schema<C>,
    context: &mut C,
    handler: &mut CommandHandler,
    path: &ConcreteCommandPath,
    reader: &mut TlvReader<'_>,
) -> Result<(), Error> {
    let command = schema.command(path.cluster, path.command)?;
    command(context, handler, path, reader)
}

/// Turn a dispatch failure into a status response
pub fn dispatch_server_error(handler: &mut CommandHandler, path: &ConcreteCommandPath, error: Error) {
    let status = error.status().unwrap_or(Status::InvalidCommand);
    match error {
        Error::DataError(data_error) => {
            log::warn!(
                "> Failed to decode {:04x}:{:04x} on {}, {:?}",
                path.cluster,
                path.command,
                path.endpoint,
                data_error
            );
        }
        _ => {
            log::warn!(
                "> Command {:04x}:{:04x} on {} failed, {:?}",
                path.cluster,
                path.command,
                path.endpoint,
                error
            );
        }
    }
    handler.add_status(path, status);
}

/// Dispatch a command and answer failures with a status
pub fn dispatch<C>(
    schema: &Schema<C>,
    context: &mut C,
    handler: &mut CommandHandler,
    path: &ConcreteCommandPath,
    reader: &mut TlvReader<'_>,
) {
    log::info!(
        "> Command {:04x}:{:04x} on {}",
        path.cluster,
        path.command,
        path.endpoint
    );
    if let Err(error) = dispatch_command(schema, context, handler, path, reader) {
        dispatch_server_error(handler, path, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ilma_data::clusters::level_control::{self, MoveToLevel};
    use ilma_data::interaction_model::{InvokeResponse, StatusIb};

    #[derive(Default)]
    struct Lamp {
        level: Option<u8>,
    }

    fn schema() -> Schema<Lamp> {
        let mut schema = Schema::new();
        schema.add_cluster(level_control::CLUSTER).unwrap();
        schema
            .add_command::<MoveToLevel, _>(
                level_control::CLUSTER,
                0x00,
                |lamp: &mut Lamp, handler, path, request| {
                    if request.level == 0 {
                        return false;
                    }
                    lamp.level = Some(request.level);
                    handler.add_status(path, Status::Success);
                    true
                },
            )
            .unwrap();
        schema
    }

    fn status(handler: &CommandHandler) -> Status {
        match handler.responses() {
            [InvokeResponse::Status {
                status: StatusIb { status, .. },
                ..
            }] => *status,
            other => panic!("Unexpected responses {:?}", other),
        }
    }

    fn run(lamp: &mut Lamp, path: ConcreteCommandPath, fields: &[u8]) -> CommandHandler {
        let schema = schema();
        let mut handler = CommandHandler::new();
        let mut reader = TlvReader::new(fields);
        reader.next().unwrap();
        dispatch(&schema, lamp, &mut handler, &path, &mut reader);
        handler
    }

    #[test]
    fn handled() {
        let mut lamp = Lamp::default();
        let handler = run(
            &mut lamp,
            ConcreteCommandPath::new(1, 0x0008, 0x00),
            &[0x15, 0x24, 0x00, 0x40, 0x18],
        );
        assert_eq!(status(&handler), Status::Success);
        assert_eq!(lamp.level, Some(0x40));
    }

    #[test]
    fn unsupported_cluster_and_command() {
        let mut lamp = Lamp::default();
        let handler = run(&mut lamp, ConcreteCommandPath::new(1, 0x0006, 0x00), &[0x15, 0x18]);
        assert_eq!(status(&handler), Status::UnsupportedCluster);

        let handler = run(&mut lamp, ConcreteCommandPath::new(1, 0x0008, 0x07), &[0x15, 0x18]);
        assert_eq!(status(&handler), Status::UnsupportedCommand);
        assert_eq!(lamp.level, None);
    }

    #[test]
    fn decode_failures_never_reach_the_handler() {
        let mut lamp = Lamp::default();
        // Missing level
        let handler = run(&mut lamp, ConcreteCommandPath::new(1, 0x0008, 0x00), &[0x15, 0x18]);
        assert_eq!(status(&handler), Status::InvalidCommand);
        // Wrong type
        let handler = run(
            &mut lamp,
            ConcreteCommandPath::new(1, 0x0008, 0x00),
            &[0x15, 0x28, 0x00, 0x18],
        );
        assert_eq!(status(&handler), Status::InvalidCommand);
        // Truncated structure
        let handler = run(
            &mut lamp,
            ConcreteCommandPath::new(1, 0x0008, 0x00),
            &[0x15, 0x24, 0x00],
        );
        assert_eq!(status(&handler), Status::InvalidCommand);
        assert_eq!(lamp.level, None);
    }

    #[test]
    fn handler_failure() {
        let mut lamp = Lamp::default();
        let handler = run(
            &mut lamp,
            ConcreteCommandPath::new(1, 0x0008, 0x00),
            &[0x15, 0x24, 0x00, 0x00, 0x18],
        );
        assert_eq!(status(&handler), Status::InvalidCommand);
    }

    #[test]
    fn translated_once() {
        let mut handler = CommandHandler::new();
        let path = ConcreteCommandPath::new(1, 0x0008, 0x00);
        dispatch_server_error(&mut handler, &path, Error::Status(Status::ConstraintError));
        dispatch_server_error(&mut handler, &path, Error::Internal);
        assert_eq!(handler.len(), 2);
        assert_eq!(
            handler.responses()[0],
            InvokeResponse::Status {
                path,
                status: StatusIb {
                    status: Status::ConstraintError,
                    cluster_status: None
                }
            }
        );
    }
}

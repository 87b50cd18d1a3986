//! Collects the responses produced while dispatching an invoke request

use ilma_data::clusters::ClusterCommand;
use ilma_data::interaction_model::{
    CommandData, InvokeResponse, Status, StatusIb, MAX_COMMAND_FIELDS_SIZE,
};
use ilma_data::tlv::{encode_to_vec, Tag, ToTlv};
use ilma_data::ConcreteCommandPath;

use crate::Error;

/// Responder handed to every command handler
#[derive(Debug, Default)]
pub struct CommandHandler {
    responses: Vec<InvokeResponse>,
}

impl CommandHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a response command, addressed to the endpoint of the request
    pub fn add_response<T>(&mut self, request: &ConcreteCommandPath, response: &T) -> Result<(), Error>
    where
        T: ToTlv + ClusterCommand,
    {
        let fields = encode_to_vec(response, Tag::Anonymous, MAX_COMMAND_FIELDS_SIZE)?;
        let path = ConcreteCommandPath::new(request.endpoint, T::CLUSTER, T::COMMAND);
        log::debug!("< Response {:?}", path);
        self.responses
            .push(InvokeResponse::Command(CommandData::new(path, fields)));
        Ok(())
    }

    /// Add a status for the request
    pub fn add_status(&mut self, request: &ConcreteCommandPath, status: Status) {
        self.push_status(request, status, None);
    }

    /// Add a status with a cluster specific status code
    pub fn add_cluster_status(
        &mut self,
        request: &ConcreteCommandPath,
        status: Status,
        cluster_status: u8,
    ) {
        self.push_status(request, status, Some(cluster_status));
    }

    fn push_status(
        &mut self,
        request: &ConcreteCommandPath,
        status: Status,
        cluster_status: Option<u8>,
    ) {
        log::debug!("< Status {:?} {:?}", request, status);
        self.responses.push(InvokeResponse::Status {
            path: *request,
            status: StatusIb {
                status,
                cluster_status,
            },
        });
    }

    pub fn responses(&self) -> &[InvokeResponse] {
        &self.responses
    }

    pub fn into_responses(self) -> Vec<InvokeResponse> {
        self.responses
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ilma_data::clusters::level_control::MoveToLevel;
    use ilma_data::tlv::decode_from_slice;

    #[test]
    fn response_uses_command_identifiers() {
        let mut handler = CommandHandler::new();
        let request = ConcreteCommandPath::new(2, 0x0008, 0x04);
        let response = MoveToLevel {
            level: 1,
            ..MoveToLevel::default()
        };
        handler.add_response(&request, &response).unwrap();
        handler.add_status(&request, Status::Success);
        assert_eq!(handler.len(), 2);

        match &handler.responses()[0] {
            InvokeResponse::Command(data) => {
                assert_eq!(data.path, ConcreteCommandPath::new(2, 0x0008, 0x00));
                assert_eq!(decode_from_slice::<MoveToLevel>(&data.fields), Ok(response));
            }
            other => panic!("Unexpected response {:?}", other),
        }
        assert_eq!(
            handler.responses()[1],
            InvokeResponse::Status {
                path: request,
                status: StatusIb {
                    status: Status::Success,
                    cluster_status: None
                }
            }
        );
    }
}

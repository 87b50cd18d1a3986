//! Diagnostic Logs cluster server
//!
//! Logs are fetched from a per-endpoint provider and returned in the
//! response payload. A collection session is closed whenever it was opened,
//! whichever way the request ends.

use std::collections::BTreeMap;

use ilma_data::clusters::diagnostic_logs::{
    Intent, LogsStatus, RetrieveLogsRequest, RetrieveLogsResponse, TransferProtocol,
    MAX_FILE_DESIGNATOR_SIZE, MAX_LOG_CONTENT_SIZE,
};
use ilma_data::interaction_model::Status;
use ilma_data::{ConcreteCommandPath, EndpointId};

use crate::command_handler::CommandHandler;
use crate::Error;

/// Log collection session identifier
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogSessionHandle(u16);

impl LogSessionHandle {
    /// Returned when no session could be started
    pub const INVALID: Self = Self(0xffff);

    pub fn new(value: u16) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

/// Source of log content
pub trait LogProviderDelegate {
    /// Start collecting logs, `LogSessionHandle::INVALID` when there are none
    fn start_log_collection(&mut self, intent: Intent) -> LogSessionHandle;
    /// Fill `buffer` with the next chunk, returns the number of bytes written
    /// and whether the end of the logs was reached
    fn get_next_chunk(
        &mut self,
        session: LogSessionHandle,
        buffer: &mut [u8],
    ) -> Result<(usize, bool), Error>;
    fn end_log_collection(&mut self, session: LogSessionHandle);
}

/// Open collection session, ended on drop
struct LogSession<'a> {
    delegate: &'a mut dyn LogProviderDelegate,
    handle: LogSessionHandle,
}

impl<'a> LogSession<'a> {
    fn start(delegate: &'a mut dyn LogProviderDelegate, intent: Intent) -> Option<Self> {
        let handle = delegate.start_log_collection(intent);
        if handle.is_valid() {
            Some(Self { delegate, handle })
        } else {
            None
        }
    }

    fn next_chunk(&mut self, buffer: &mut [u8]) -> Result<(usize, bool), Error> {
        let (used, end_of_file) = self.delegate.get_next_chunk(self.handle, buffer)?;
        if used > buffer.len() {
            return Err(Error::InvalidArgument);
        }
        Ok((used, end_of_file))
    }
}

impl<'a> Drop for LogSession<'a> {
    fn drop(&mut self) {
        self.delegate.end_log_collection(self.handle);
    }
}

/// Diagnostic Logs server with one log provider per endpoint
pub struct DiagnosticLogsServer {
    delegates: BTreeMap<EndpointId, Box<dyn LogProviderDelegate>>,
    content_buffer_size: usize,
}

impl Default for DiagnosticLogsServer {
    fn default() -> Self {
        Self::new(MAX_LOG_CONTENT_SIZE)
    }
}

impl DiagnosticLogsServer {
    /// Server returning at most `content_buffer_size` bytes of logs, never
    /// more than `MAX_LOG_CONTENT_SIZE`
    pub fn new(content_buffer_size: usize) -> Self {
        if content_buffer_size > MAX_LOG_CONTENT_SIZE {
            log::warn!(
                "Log content size {} limited to {}",
                content_buffer_size,
                MAX_LOG_CONTENT_SIZE
            );
        }
        Self {
            delegates: BTreeMap::new(),
            content_buffer_size: content_buffer_size.min(MAX_LOG_CONTENT_SIZE),
        }
    }

    /// Set the provider of an endpoint, returns the provider it replaces
    pub fn set_log_provider_delegate(
        &mut self,
        endpoint: EndpointId,
        delegate: Box<dyn LogProviderDelegate>,
    ) -> Option<Box<dyn LogProviderDelegate>> {
        self.delegates.insert(endpoint, delegate)
    }

    pub fn remove_log_provider_delegate(
        &mut self,
        endpoint: EndpointId,
    ) -> Option<Box<dyn LogProviderDelegate>> {
        self.delegates.remove(&endpoint)
    }

    pub fn content_buffer_size(&self) -> usize {
        self.content_buffer_size
    }

    /// Handle a retrieve logs request
    pub fn handle_retrieve_logs(
        &mut self,
        handler: &mut CommandHandler,
        path: &ConcreteCommandPath,
        request: &RetrieveLogsRequest,
    ) -> bool {
        if let Some(designator) = &request.transfer_file_designator {
            if designator.len() > MAX_FILE_DESIGNATOR_SIZE {
                handler.add_status(path, Status::ConstraintError);
                return true;
            }
        }
        match request.requested_protocol {
            TransferProtocol::ResponsePayload => {
                let response = self.retrieve_for_response_payload(path.endpoint, request.intent);
                match handler.add_response(path, &response) {
                    Ok(()) => true,
                    Err(error) => {
                        log::error!("< Failed to add logs response, {:?}", error);
                        false
                    }
                }
            }
            TransferProtocol::Bdx => {
                log::info!("> Log transfer over BDX is not supported");
                handler.add_status(path, Status::InvalidCommand);
                true
            }
        }
    }

    fn retrieve_for_response_payload(
        &mut self,
        endpoint: EndpointId,
        intent: Intent,
    ) -> RetrieveLogsResponse {
        let delegate = match self.delegates.get_mut(&endpoint) {
            Some(delegate) => delegate,
            None => {
                log::info!("No log provider for endpoint {}", endpoint);
                return RetrieveLogsResponse::with_status(LogsStatus::NoLogs);
            }
        };

        let mut buffer = Vec::new();
        if buffer.try_reserve_exact(self.content_buffer_size).is_err() {
            log::error!("Failed to allocate {} bytes for logs", self.content_buffer_size);
            return RetrieveLogsResponse::with_status(LogsStatus::NoLogs);
        }
        buffer.resize(self.content_buffer_size, 0u8);

        let mut session = match LogSession::start(delegate.as_mut(), intent) {
            Some(session) => session,
            None => {
                log::info!("No {:?} logs on endpoint {}", intent, endpoint);
                return RetrieveLogsResponse::with_status(LogsStatus::NoLogs);
            }
        };

        match session.next_chunk(&mut buffer) {
            Ok((used, end_of_file)) => {
                log::info!(
                    "< {} bytes of {:?} logs, end of file {}",
                    used,
                    intent,
                    end_of_file
                );
                buffer.truncate(used);
                RetrieveLogsResponse {
                    log_content: buffer,
                    ..RetrieveLogsResponse::with_status(LogsStatus::Success)
                }
            }
            Err(error) => {
                log::warn!("Failed to read {:?} logs, {:?}", intent, error);
                RetrieveLogsResponse::with_status(LogsStatus::NoLogs)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ilma_data::clusters::diagnostic_logs::{self, Intent};
    use ilma_data::interaction_model::{InvokeResponse, StatusIb};
    use ilma_data::tlv::decode_from_slice;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct Calls {
        start: usize,
        chunk: usize,
        end: usize,
    }

    struct TestProvider {
        calls: Rc<RefCell<Calls>>,
        start_valid: bool,
        chunk: Result<Vec<u8>, Error>,
    }

    impl LogProviderDelegate for TestProvider {
        fn start_log_collection(&mut self, _intent: Intent) -> LogSessionHandle {
            self.calls.borrow_mut().start += 1;
            if self.start_valid {
                LogSessionHandle::new(7)
            } else {
                LogSessionHandle::INVALID
            }
        }

        fn get_next_chunk(
            &mut self,
            session: LogSessionHandle,
            buffer: &mut [u8],
        ) -> Result<(usize, bool), Error> {
            assert_eq!(session, LogSessionHandle::new(7));
            self.calls.borrow_mut().chunk += 1;
            let chunk = self.chunk.clone()?;
            let used = chunk.len().min(buffer.len());
            buffer[..used].copy_from_slice(&chunk[..used]);
            Ok((used, used == chunk.len()))
        }

        fn end_log_collection(&mut self, session: LogSessionHandle) {
            assert_eq!(session, LogSessionHandle::new(7));
            self.calls.borrow_mut().end += 1;
        }
    }

    fn request(protocol: TransferProtocol) -> RetrieveLogsRequest {
        RetrieveLogsRequest {
            intent: Intent::EndUserSupport,
            requested_protocol: protocol,
            transfer_file_designator: None,
        }
    }

    fn path() -> ConcreteCommandPath {
        ConcreteCommandPath::new(0, diagnostic_logs::CLUSTER, 0x00)
    }

    fn logs_response(handler: &CommandHandler) -> RetrieveLogsResponse {
        assert_eq!(handler.len(), 1);
        match &handler.responses()[0] {
            InvokeResponse::Command(data) => {
                assert_eq!(data.path, ConcreteCommandPath::new(0, diagnostic_logs::CLUSTER, 0x01));
                decode_from_slice(&data.fields).unwrap()
            }
            other => panic!("Unexpected response {:?}", other),
        }
    }

    fn run(
        buffer_size: usize,
        start_valid: bool,
        chunk: Result<Vec<u8>, Error>,
    ) -> (RetrieveLogsResponse, Rc<RefCell<Calls>>) {
        // Bypass the size limit so that allocation failures can be provoked
        let server = DiagnosticLogsServer {
            delegates: BTreeMap::new(),
            content_buffer_size: buffer_size,
        };
        run_on(server, start_valid, chunk)
    }

    fn run_on(
        mut server: DiagnosticLogsServer,
        start_valid: bool,
        chunk: Result<Vec<u8>, Error>,
    ) -> (RetrieveLogsResponse, Rc<RefCell<Calls>>) {
        let calls = Rc::new(RefCell::new(Calls::default()));
        server.set_log_provider_delegate(
            0,
            Box::new(TestProvider {
                calls: calls.clone(),
                start_valid,
                chunk,
            }),
        );
        let mut handler = CommandHandler::new();
        assert!(server.handle_retrieve_logs(
            &mut handler,
            &path(),
            &request(TransferProtocol::ResponsePayload)
        ));
        (logs_response(&handler), calls)
    }

    #[test]
    fn success() {
        let (response, calls) = run(MAX_LOG_CONTENT_SIZE, true, Ok(b"reboot".to_vec()));
        assert_eq!(response.status, LogsStatus::Success);
        assert_eq!(response.log_content, b"reboot");
        let calls = calls.borrow();
        assert_eq!((calls.start, calls.chunk, calls.end), (1, 1, 1));
    }

    #[test]
    fn content_is_bounded() {
        let (response, calls) = run(4, true, Ok(b"reboot".to_vec()));
        assert_eq!(response.status, LogsStatus::Success);
        assert_eq!(response.log_content, b"rebo");
        assert_eq!(calls.borrow().end, 1);
    }

    #[test]
    fn content_size_is_limited() {
        let server = DiagnosticLogsServer::new(1500);
        assert_eq!(server.content_buffer_size(), MAX_LOG_CONTENT_SIZE);
        let (response, calls) = run_on(server, true, Ok(vec![0x2a; 1500]));
        assert_eq!(response.status, LogsStatus::Success);
        assert_eq!(response.log_content, vec![0x2a; MAX_LOG_CONTENT_SIZE]);
        assert_eq!(calls.borrow().end, 1);
    }

    #[test]
    fn chunk_failure_ends_session() {
        let (response, calls) = run(MAX_LOG_CONTENT_SIZE, true, Err(Error::Internal));
        assert_eq!(response.status, LogsStatus::NoLogs);
        assert!(response.log_content.is_empty());
        let calls = calls.borrow();
        assert_eq!((calls.start, calls.chunk, calls.end), (1, 1, 1));
    }

    #[test]
    fn invalid_handle_is_never_ended() {
        let (response, calls) = run(MAX_LOG_CONTENT_SIZE, false, Ok(b"reboot".to_vec()));
        assert_eq!(response.status, LogsStatus::NoLogs);
        let calls = calls.borrow();
        assert_eq!((calls.start, calls.chunk, calls.end), (1, 0, 0));
    }

    #[test]
    fn allocation_failure() {
        let (response, calls) = run(usize::MAX, true, Ok(b"reboot".to_vec()));
        assert_eq!(response.status, LogsStatus::NoLogs);
        let calls = calls.borrow();
        assert_eq!((calls.start, calls.chunk, calls.end), (0, 0, 0));
    }

    #[test]
    fn every_combination_ends_what_it_starts() {
        for allocation_fails in [false, true] {
            for start_valid in [false, true] {
                for chunk_fails in [false, true] {
                    let size = if allocation_fails {
                        usize::MAX
                    } else {
                        MAX_LOG_CONTENT_SIZE
                    };
                    let chunk = if chunk_fails {
                        Err(Error::Internal)
                    } else {
                        Ok(vec![0x55; 16])
                    };
                    let (response, calls) = run(size, start_valid, chunk);
                    let calls = calls.borrow();
                    let started = !allocation_fails && start_valid;
                    assert_eq!(calls.end, started as usize);
                    let success = started && !chunk_fails;
                    assert_eq!(
                        response.status,
                        if success {
                            LogsStatus::Success
                        } else {
                            LogsStatus::NoLogs
                        }
                    );
                }
            }
        }
    }

    #[test]
    fn no_delegate() {
        let mut server = DiagnosticLogsServer::default();
        let mut handler = CommandHandler::new();
        assert!(server.handle_retrieve_logs(
            &mut handler,
            &path(),
            &request(TransferProtocol::ResponsePayload)
        ));
        let response = logs_response(&handler);
        assert_eq!(response.status, LogsStatus::NoLogs);
        assert!(response.log_content.is_empty());
    }

    #[test]
    fn bdx_and_long_designator() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut server = DiagnosticLogsServer::default();
        server.set_log_provider_delegate(
            0,
            Box::new(TestProvider {
                calls: calls.clone(),
                start_valid: true,
                chunk: Ok(vec![]),
            }),
        );
        let mut handler = CommandHandler::new();
        server.handle_retrieve_logs(&mut handler, &path(), &request(TransferProtocol::Bdx));
        let mut long = request(TransferProtocol::ResponsePayload);
        long.transfer_file_designator = Some("x".repeat(MAX_FILE_DESIGNATOR_SIZE + 1));
        server.handle_retrieve_logs(&mut handler, &path(), &long);

        let statuses: Vec<Status> = handler
            .responses()
            .iter()
            .map(|response| match response {
                InvokeResponse::Status {
                    status: StatusIb { status, .. },
                    ..
                } => *status,
                other => panic!("Unexpected response {:?}", other),
            })
            .collect();
        assert_eq!(statuses, [Status::InvalidCommand, Status::ConstraintError]);
        assert_eq!(calls.borrow().start, 0);
    }
}

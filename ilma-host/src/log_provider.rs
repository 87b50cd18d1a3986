use std::fs;
use std::path::PathBuf;

use ilma_data::clusters::diagnostic_logs::Intent;
use ilma_service::server::{LogProviderDelegate, LogSessionHandle};
use ilma_service::Error;

/// Serves the content of a file as end user support logs
pub struct FileLogProvider {
    path: PathBuf,
    session: Option<Session>,
    next_handle: u16,
}

struct Session {
    handle: LogSessionHandle,
    content: Vec<u8>,
    offset: usize,
}

impl FileLogProvider {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            session: None,
            next_handle: 0,
        }
    }
}

impl LogProviderDelegate for FileLogProvider {
    fn start_log_collection(&mut self, intent: Intent) -> LogSessionHandle {
        if intent != Intent::EndUserSupport || self.session.is_some() {
            return LogSessionHandle::INVALID;
        }
        match fs::read(&self.path) {
            Ok(content) => {
                let handle = LogSessionHandle::new(self.next_handle);
                self.next_handle =
                    self.next_handle.wrapping_add(1) % LogSessionHandle::INVALID.value();
                self.session = Some(Session {
                    handle,
                    content,
                    offset: 0,
                });
                handle
            }
            Err(error) => {
                log::warn!("Failed to read {}, {}", self.path.display(), error);
                LogSessionHandle::INVALID
            }
        }
    }

    fn get_next_chunk(
        &mut self,
        handle: LogSessionHandle,
        buffer: &mut [u8],
    ) -> Result<(usize, bool), Error> {
        match self.session.as_mut() {
            Some(session) if session.handle == handle => {
                let remaining = &session.content[session.offset..];
                let used = remaining.len().min(buffer.len());
                buffer[..used].copy_from_slice(&remaining[..used]);
                session.offset += used;
                Ok((used, session.offset == session.content.len()))
            }
            _ => Err(Error::InvalidArgument),
        }
    }

    fn end_log_collection(&mut self, handle: LogSessionHandle) {
        if self.session.as_ref().map(|s| s.handle) == Some(handle) {
            self.session = None;
        }
    }
}

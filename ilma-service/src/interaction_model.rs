//! Interaction model engine, the server side of invoke interactions

use core::convert::TryFrom;

use bbqueue::{ArrayLength, Consumer, Producer};

use ilma_data::interaction_model::{
    InvokeRequestMessage, InvokeResponseMessage, OpCode, Status, StatusResponseMessage,
};
use ilma_data::tlv::{decode_from_slice, encode_to_vec, Tag};

use crate::command_handler::CommandHandler;
use crate::dispatch::dispatch;
use crate::queue;
use crate::schema::Schema;
use crate::Error;

/// Largest encoded message
pub const MAX_MESSAGE_SIZE: usize = 2048;

/// Runs invoke requests through the schema against a context
pub struct InteractionModelEngine<C> {
    schema: Schema<C>,
    context: C,
}

impl<C> InteractionModelEngine<C> {
    pub fn new(schema: Schema<C>, context: C) -> Self {
        Self { schema, context }
    }

    pub fn schema(&self) -> &Schema<C> {
        &self.schema
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Dispatch every command of the request, in order
    pub fn invoke(&mut self, request: &InvokeRequestMessage) -> InvokeResponseMessage {
        let mut handler = CommandHandler::new();
        for command in request.invoke_requests.iter() {
            match command.fields_reader() {
                Ok(mut reader) => {
                    dispatch(
                        &self.schema,
                        &mut self.context,
                        &mut handler,
                        &command.path,
                        &mut reader,
                    );
                }
                Err(error) => {
                    crate::dispatch::dispatch_server_error(
                        &mut handler,
                        &command.path,
                        Error::DataError(error),
                    );
                }
            }
        }
        InvokeResponseMessage {
            suppress_response: request.suppress_response,
            invoke_responses: handler.into_responses(),
        }
    }

    /// Handle a message, returns the reply if there is one
    pub fn handle_message(
        &mut self,
        opcode: u8,
        payload: &[u8],
    ) -> Result<Option<(OpCode, Vec<u8>)>, Error> {
        match OpCode::try_from(opcode) {
            Ok(OpCode::InvokeRequest) => self.handle_invoke_request(payload),
            Ok(opcode) => {
                log::warn!("> Unsupported interaction {:?}", opcode);
                self.status_response(Status::InvalidAction)
            }
            Err(_) => {
                log::warn!("> Unknown opcode {:02x}", opcode);
                self.status_response(Status::InvalidAction)
            }
        }
    }

    fn handle_invoke_request(&mut self, payload: &[u8]) -> Result<Option<(OpCode, Vec<u8>)>, Error> {
        let request = match decode_from_slice::<InvokeRequestMessage>(payload) {
            Ok(request) => request,
            Err(error) => {
                log::warn!("> Malformed invoke request, {:?}", error);
                return self.status_response(Status::InvalidAction);
            }
        };
        log::info!(
            "> Invoke request, {} commands",
            request.invoke_requests.len()
        );
        let response = self.invoke(&request);
        if response.suppress_response {
            return Ok(None);
        }
        match encode_to_vec(&response, Tag::Anonymous, MAX_MESSAGE_SIZE) {
            Ok(data) => {
                log::info!("< Invoke response, {} bytes", data.len());
                Ok(Some((OpCode::InvokeResponse, data)))
            }
            Err(error) => {
                log::error!("< Failed to encode invoke response, {:?}", error);
                self.status_response(Status::ResourceExhausted)
            }
        }
    }

    fn status_response(&self, status: Status) -> Result<Option<(OpCode, Vec<u8>)>, Error> {
        let message = StatusResponseMessage { status };
        let data = encode_to_vec(&message, Tag::Anonymous, MAX_MESSAGE_SIZE)?;
        Ok(Some((OpCode::StatusResponse, data)))
    }

    /// Handle every message waiting in `rx`, replies are queued on `tx`
    ///
    /// Each frame holds an opcode followed by the TLV payload. Returns the
    /// number of messages handled. A message which cannot be answered is
    /// logged and the following ones are still handled.
    pub fn process_incoming<N, M>(
        &mut self,
        rx: &mut Consumer<'_, N>,
        tx: &mut Producer<'_, M>,
    ) -> Result<usize, Error>
    where
        N: ArrayLength<u8>,
        M: ArrayLength<u8>,
    {
        let mut count = 0;
        loop {
            let frame = match queue::dequeue(rx) {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(error) => {
                    log::warn!("> Dropped malformed frame, {:?}", error);
                    continue;
                }
            };
            count += 1;
            let (opcode, payload) = match frame.split_first() {
                Some((opcode, payload)) => (*opcode, payload),
                None => {
                    log::warn!("> Empty message");
                    continue;
                }
            };
            match self.handle_message(opcode, payload) {
                Ok(Some((opcode, data))) => {
                    if let Err(error) = queue::enqueue(tx, &[&[u8::from(opcode)], &data]) {
                        log::error!("< Failed to queue {:?}, {:?}", opcode, error);
                    }
                }
                Ok(None) => (),
                Err(error) => {
                    log::error!("> Failed to handle message {:02x}, {:?}", opcode, error);
                }
            }
        }
        Ok(count)
    }
}

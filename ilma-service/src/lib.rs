//! # Ilma Service
//!
//! Command dispatch for the interaction model and the client side of the
//! cluster library.
//!
//! On the server side an [`InteractionModelEngine`] decodes invoke requests,
//! routes every command through a [`Schema`] and collects the results in a
//! [`CommandHandler`]. On the client side a [`Controller`] frames commands
//! for peers and delivers their responses to the callbacks registered in a
//! [`DeviceCallbacks`] table.

mod attribute_store;
pub mod callbacks;
pub mod clusters;
mod command_handler;
pub mod controller;
mod dispatch;
mod error;
mod interaction_model;
pub mod queue;
mod schema;
pub mod server;

pub use attribute_store::AttributeStore;
pub use callbacks::{DeviceCallbacks, ReportKey, Response, ResponseCallbacks, ResponseKey};
pub use command_handler::CommandHandler;
pub use controller::{Controller, StatusDelegate};
pub use dispatch::{dispatch, dispatch_command, dispatch_server_error};
pub use error::Error;
pub use interaction_model::{InteractionModelEngine, MAX_MESSAGE_SIZE};
pub use schema::{AttributeMetadata, CommandFn, Schema};

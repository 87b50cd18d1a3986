//! # Ilma data
//!
//! Wire formats of the ilma engine: the TLV codec, the JSON to TLV encoder,
//! interaction model messages and status codes, the legacy cluster library
//! framing and the typed command structures of the supported clusters.

#[macro_use]
mod utils;

pub mod buffer;
pub mod cluster_library; // ZCL
pub mod clusters;
pub mod common;
pub mod error;
pub mod interaction_model; // IM
#[cfg(feature = "json")]
pub mod json;
pub mod pack;
pub mod tlv;

pub use common::{
    AttributeId, ClusterId, CommandId, ConcreteAttributePath, ConcreteCommandPath, EndpointId,
    NodeId,
};
pub use error::Error;
pub use utils::{parse_signed, parse_unsigned};

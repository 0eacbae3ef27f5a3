//! The contract shared by the processing units of a message pipeline
//!
//! Messages are immutable snapshots; a [Processor] that needs to amend one
//! derives a [MessageBuilder] from it and builds the next snapshot.
//! Processors can be driven one message at a time, awaiting the outcome of
//! each call, or plugged over an ordered [stream](crate::streams) of
//! messages. Both models obey the same semantics.

mod errors;
mod message;
mod pipeline;
mod processor;
pub mod streams;

pub use errors::*;
pub use message::*;
pub use pipeline::*;
pub use processor::*;
pub use streams::MessageStream;

use crate::Message;
use thiserror::Error;

/// An opaque error cause raised by a processor or a predicate
pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An error raised while a message crosses the pipeline
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// A processor failed while handling a specific message
    ///
    /// The carried message is the snapshot as it was when the failure
    /// occurred, including any mutation staged before the error.
    #[error("{processor} failed to process message {message}: {source}")]
    Messaging {
        processor: String,
        message: Box<Message>,
        source: DynError,
    },

    /// A message has been rejected by a filter configured to raise on rejection
    #[error("message rejected by filter")]
    MessageRejected,
}

impl ProcessingError {
    /// Attribute an error to the processor where it occurred and to the message being processed
    pub fn messaging(processor: &str, message: Message, cause: impl Into<DynError>) -> Self {
        ProcessingError::Messaging {
            processor: processor.to_string(),
            message: Box::new(message),
            source: cause.into(),
        }
    }

    /// The message the failure is attributed to, if any
    pub fn message(&self) -> Option<&Message> {
        match self {
            ProcessingError::Messaging { message, .. } => Some(message),
            ProcessingError::MessageRejected => None,
        }
    }
}

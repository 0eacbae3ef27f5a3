use crate::streams;
use crate::Message;
use crate::MessageStream;
use crate::ProcessingError;
use async_trait::async_trait;

/// A processing unit messages flow through
///
/// A processor can be invoked with a single message, awaiting the outcome of
/// the call, or plugged over a whole stream of messages. The two models obey
/// the same semantics: each message produces at most one result, no output
/// meaning the message has been consumed with nothing to forward.
#[async_trait]
pub trait Processor: 'static + Send + Sync {
    /// The name of this processor, used to attribute errors and logs
    fn name(&self) -> &str;

    /// Process a single message
    ///
    /// Return `Ok(None)` when the message is consumed without producing any
    /// output.
    async fn process(&self, message: Message) -> Result<Option<Message>, ProcessingError>;

    /// Transform a stream of messages, preserving their order
    ///
    /// The default implementation demultiplexes the input one message at a
    /// time over [process](Processor::process).
    fn apply<'a>(&'a self, input: MessageStream<'a>) -> MessageStream<'a> {
        streams::concat_map(input, move |message| async move {
            match self.process(message).await {
                Ok(Some(message)) => streams::one(message),
                Ok(None) => streams::none(),
                Err(error) => streams::fail(error),
            }
        })
    }
}

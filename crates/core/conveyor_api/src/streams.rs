//! Building blocks for ordered streams of messages
//!
//! A [MessageStream] interleaves messages and errors. Errors are terminal:
//! the operators of this module emit the first error encountered and then
//! end the stream. A dropped element, on the contrary, contributes
//! [nothing](none) and leaves the rest of the stream unaffected.

use crate::Message;
use crate::ProcessingError;
use futures::stream;
use futures::stream::BoxStream;
use futures::Future;
use futures::FutureExt;
use futures::StreamExt;

/// An ordered stream of messages, failed elements surfacing as errors
pub type MessageStream<'a> = BoxStream<'a, Result<Message, ProcessingError>>;

/// A stream contributing a single message
pub fn one<'a>(message: Message) -> MessageStream<'a> {
    stream::iter([Ok(message)]).boxed()
}

/// The contribution of a dropped element: no message, but no error either
pub fn none<'a>() -> MessageStream<'a> {
    stream::empty().boxed()
}

/// A stream contributing the given messages in order
pub fn all<'a>(messages: Vec<Message>) -> MessageStream<'a> {
    stream::iter(messages.into_iter().map(Ok)).boxed()
}

/// A stream failing with the given error
pub fn fail<'a>(error: ProcessingError) -> MessageStream<'a> {
    stream::iter([Err(error)]).boxed()
}

/// Map each message of a stream to a sub-stream, splicing the sub-streams in order
///
/// A single element is in flight at a time: its sub-stream is exhausted
/// before the next element is pulled from the input. Errors, incoming or
/// produced by a sub-stream, terminate the output.
pub fn concat_map<'a, F, Fut>(input: MessageStream<'a>, mut f: F) -> MessageStream<'a>
where
    F: FnMut(Message) -> Fut + Send + 'a,
    Fut: Future<Output = MessageStream<'a>> + Send + 'a,
{
    let spliced = input
        .map(move |item| match item {
            Ok(message) => f(message).flatten_stream().boxed(),
            Err(error) => fail(error),
        })
        .flatten();
    until_error(spliced.boxed())
}

/// Truncate a stream after its first error
///
/// The truncated stream is dropped as soon as the error is emitted, so no
/// further element is pulled from it.
pub fn until_error(input: MessageStream<'_>) -> MessageStream<'_> {
    stream::unfold(Some(input), |state| async move {
        let mut input = state?;
        match input.next().await {
            Some(Ok(message)) => Some((Ok(message), Some(input))),
            Some(Err(error)) => Some((Err(error), None)),
            None => None,
        }
    })
    .boxed()
}

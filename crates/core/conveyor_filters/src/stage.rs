use crate::FilterPredicate;
use crate::UnacceptedPolicy;
use async_trait::async_trait;
use conveyor_api::streams;
use conveyor_api::Message;
use conveyor_api::MessageBuilder;
use conveyor_api::MessageStream;
use conveyor_api::Pipeline;
use conveyor_api::ProcessingError;
use conveyor_api::Processor;
use futures::future::ready;
use tracing::debug;

/// A pipeline stage forwarding downstream only the messages its predicate accepts
///
/// Each message is inspected through a fresh [MessageBuilder], so the
/// predicate can annotate the snapshot seen by whichever branch is taken
/// next. A rejected message is, in this order of precedence: handed over to
/// the unaccepted processor when one is configured, raised as a
/// [MessageRejected](ProcessingError::MessageRejected) error when the stage
/// is configured to throw, or silently dropped. In the stream model a
/// dropped message contributes nothing and leaves the rest of the stream
/// unaffected.
///
/// ```
/// # use conveyor_api::Message;
/// # use conveyor_api::Processor;
/// # use conveyor_filters::FilteringStage;
/// # use conveyor_filters::PredicateFn;
/// # #[tokio::main]
/// # async fn main() -> Result<(), conveyor_api::ProcessingError> {
/// let stage = FilteringStage::new(
///     "skip-empty",
///     PredicateFn::new(|message, _builder| !message.payload().is_empty()),
/// );
///
/// let forwarded = stage.process(Message::new("m-1", "340 kWh")).await?;
/// assert_eq!(forwarded, Some(Message::new("m-1", "340 kWh")));
///
/// let dropped = stage.process(Message::new("m-2", "")).await?;
/// assert_eq!(dropped, None);
/// # Ok(())
/// # }
/// ```
pub struct FilteringStage<F> {
    name: String,
    predicate: F,
    next: Option<Box<dyn Processor>>,
    unaccepted_processor: Option<Box<dyn Processor>>,
    throw_on_unaccepted: bool,
    redirects_to_pipeline: bool,
}

impl<F: FilterPredicate> FilteringStage<F> {
    pub fn new(name: &str, predicate: F) -> Self {
        FilteringStage {
            name: name.to_string(),
            predicate,
            next: None,
            unaccepted_processor: None,
            throw_on_unaccepted: false,
            redirects_to_pipeline: false,
        }
    }

    /// Set the processor accepted messages are forwarded to
    ///
    /// Without a next processor, accepted messages are returned as they are.
    pub fn with_next(mut self, next: impl Processor) -> Self {
        self.next = Some(Box::new(next));
        self
    }

    /// Fail on rejected messages instead of silently dropping them
    ///
    /// Ignored as long as an unaccepted processor is configured.
    pub fn with_throw_on_unaccepted(mut self, throw_on_unaccepted: bool) -> Self {
        self.throw_on_unaccepted = throw_on_unaccepted;
        self
    }

    /// Route rejected messages to an alternate processor
    pub fn with_unaccepted_processor(mut self, processor: impl Processor) -> Self {
        self.unaccepted_processor = Some(Box::new(processor));
        self.redirects_to_pipeline = false;
        self
    }

    /// Route rejected messages to a whole pipeline, i.e. a top-level entry point
    pub fn with_unaccepted_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.unaccepted_processor = Some(Box::new(pipeline));
        self.redirects_to_pipeline = true;
        self
    }

    pub fn throw_on_unaccepted(&self) -> bool {
        self.throw_on_unaccepted
    }

    pub fn unaccepted_processor(&self) -> Option<&dyn Processor> {
        self.unaccepted_processor.as_deref()
    }

    /// Whether the configured unaccepted processor is a pipeline entry point
    ///
    /// Bookkeeping only: the filtering logic itself never reads this flag.
    pub fn redirects_to_pipeline(&self) -> bool {
        self.redirects_to_pipeline
    }

    fn policy(&self) -> UnacceptedPolicy<'_> {
        UnacceptedPolicy::resolve(
            self.unaccepted_processor.as_deref(),
            self.throw_on_unaccepted,
        )
    }

    /// Run the predicate over a fresh builder
    ///
    /// An evaluation failure is wrapped with the snapshot as mutated so far,
    /// never interpreted as a rejection.
    fn evaluate(&self, message: &Message) -> Result<(bool, MessageBuilder), ProcessingError> {
        let mut builder = message.builder();
        match self.predicate.accept(message, &mut builder) {
            Ok(accepted) => Ok((accepted, builder)),
            Err(error) => Err(ProcessingError::messaging(
                &self.name,
                builder.build(),
                error,
            )),
        }
    }

    async fn process_next(&self, message: Message) -> Result<Option<Message>, ProcessingError> {
        match &self.next {
            Some(next) => next.process(message).await,
            None => Ok(Some(message)),
        }
    }

    async fn process_unaccepted(
        &self,
        message: Message,
    ) -> Result<Option<Message>, ProcessingError> {
        match self.policy() {
            UnacceptedPolicy::Redirect(processor) => processor.process(message).await,
            UnacceptedPolicy::RaiseError => Err(ProcessingError::MessageRejected),
            UnacceptedPolicy::Drop => {
                debug!(target: "filters", "{}: dropped rejected message {}", self.name, message.correlation_id());
                Ok(None)
            }
        }
    }

    /// The contribution of a single stream element
    fn apply_one<'a>(&'a self, message: Message) -> MessageStream<'a> {
        let (accepted, builder) = match self.evaluate(&message) {
            Ok(outcome) => outcome,
            Err(error) => return streams::fail(error),
        };
        if accepted {
            self.apply_next(streams::one(builder.build()))
        } else {
            self.apply_unaccepted(builder.build())
        }
    }

    fn apply_next<'a>(&'a self, input: MessageStream<'a>) -> MessageStream<'a> {
        match &self.next {
            Some(next) => next.apply(input),
            None => input,
        }
    }

    fn apply_unaccepted<'a>(&'a self, message: Message) -> MessageStream<'a> {
        match self.policy() {
            UnacceptedPolicy::Redirect(processor) => processor.apply(streams::one(message)),
            UnacceptedPolicy::RaiseError => streams::fail(ProcessingError::MessageRejected),
            UnacceptedPolicy::Drop => {
                debug!(target: "filters", "{}: dropped rejected message {}", self.name, message.correlation_id());
                streams::none()
            }
        }
    }
}

#[async_trait]
impl<F: FilterPredicate> Processor for FilteringStage<F> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn process(&self, message: Message) -> Result<Option<Message>, ProcessingError> {
        let (accepted, builder) = self.evaluate(&message)?;
        if accepted {
            self.process_next(builder.build()).await
        } else {
            self.process_unaccepted(builder.build()).await
        }
    }

    fn apply<'a>(&'a self, input: MessageStream<'a>) -> MessageStream<'a> {
        streams::concat_map(input, move |message| ready(self.apply_one(message)))
    }
}

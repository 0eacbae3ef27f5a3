use crate::Message;
use crate::MessageStream;
use crate::ProcessingError;
use crate::Processor;
use async_trait::async_trait;

/// A named chain of processors applied in order
///
/// A pipeline is itself a [Processor]: it can be invoked as a whole, nested
/// into another pipeline or used as a redirect target.
pub struct Pipeline {
    name: String,
    processors: Vec<Box<dyn Processor>>,
}

impl Pipeline {
    pub fn new(name: &str) -> Self {
        Pipeline {
            name: name.to_string(),
            processors: vec![],
        }
    }

    /// Append a processor at the end of the chain
    pub fn then(mut self, processor: impl Processor) -> Self {
        self.processors.push(Box::new(processor));
        self
    }
}

#[async_trait]
impl Processor for Pipeline {
    fn name(&self) -> &str {
        &self.name
    }

    /// Hand the message over from processor to processor
    ///
    /// A processor consuming the message without output ends the chain for
    /// that message.
    async fn process(&self, mut message: Message) -> Result<Option<Message>, ProcessingError> {
        for processor in self.processors.iter() {
            match processor.process(message).await? {
                Some(next) => message = next,
                None => return Ok(None),
            }
        }
        Ok(Some(message))
    }

    fn apply<'a>(&'a self, input: MessageStream<'a>) -> MessageStream<'a> {
        self.processors
            .iter()
            .fold(input, |messages, processor| processor.apply(messages))
    }
}

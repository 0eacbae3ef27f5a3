use conveyor_api::Message;
use conveyor_api::MessageBuilder;
use std::convert::Infallible;

/// The accept/reject decision applied by a [FilteringStage](crate::FilteringStage)
///
/// A predicate may annotate the message under scrutiny by mutating its
/// builder, whatever the outcome of the decision. An `Err` outcome is an
/// evaluation failure: it is never interpreted as a rejection and always
/// surfaces to the caller.
pub trait FilterPredicate: 'static + Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Decide whether a message may continue downstream
    fn accept(&self, message: &Message, builder: &mut MessageBuilder) -> Result<bool, Self::Error>;
}

/// A plain function used as an infallible predicate
///
/// ```
/// # use conveyor_filters::PredicateFn;
/// let non_empty = PredicateFn::new(|message, _builder| !message.payload().is_empty());
/// ```
pub struct PredicateFn<F>(F);

impl<F> PredicateFn<F>
where
    F: Fn(&Message, &mut MessageBuilder) -> bool + Send + Sync + 'static,
{
    pub fn new(predicate: F) -> Self {
        PredicateFn(predicate)
    }
}

impl<F> FilterPredicate for PredicateFn<F>
where
    F: Fn(&Message, &mut MessageBuilder) -> bool + Send + Sync + 'static,
{
    type Error = Infallible;

    fn accept(&self, message: &Message, builder: &mut MessageBuilder) -> Result<bool, Infallible> {
        Ok((self.0)(message, builder))
    }
}

use conveyor_api::Processor;

/// What a filtering stage does with a message its predicate rejected
#[derive(Clone, Copy)]
pub enum UnacceptedPolicy<'a> {
    /// Hand the rejected message over to an alternate processor
    Redirect(&'a dyn Processor),

    /// Fail with [MessageRejected](conveyor_api::ProcessingError::MessageRejected)
    RaiseError,

    /// Discard the rejected message: no output, no error
    Drop,
}

impl std::fmt::Debug for UnacceptedPolicy<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnacceptedPolicy::Redirect(processor) => {
                f.debug_tuple("Redirect").field(&processor.name()).finish()
            }
            UnacceptedPolicy::RaiseError => f.write_str("RaiseError"),
            UnacceptedPolicy::Drop => f.write_str("Drop"),
        }
    }
}

impl<'a> UnacceptedPolicy<'a> {
    /// Resolve the policy from the stage configuration, first match winning
    ///
    /// A redirect target takes precedence over the raise flag; with neither,
    /// rejected messages are dropped. Both execution models go through this
    /// single resolution.
    pub fn resolve(
        redirect: Option<&'a dyn Processor>,
        throw_on_unaccepted: bool,
    ) -> UnacceptedPolicy<'a> {
        match redirect {
            Some(processor) => UnacceptedPolicy::Redirect(processor),
            None if throw_on_unaccepted => UnacceptedPolicy::RaiseError,
            None => UnacceptedPolicy::Drop,
        }
    }
}

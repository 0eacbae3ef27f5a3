use crate::FilterPredicate;
use conveyor_api::Message;
use conveyor_api::MessageBuilder;
use serde::Deserialize;
use serde_json::Value;
use std::convert::Infallible;

/// Ready-made predicates that can be named in a stage configuration
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinPredicate {
    /// Accept messages carrying the given property with exactly the given value
    PropertyEquals { property: String, value: Value },

    /// Accept messages carrying the given property, whatever its value
    HasProperty { property: String },

    /// Accept messages whose payload does not exceed the given size in bytes
    PayloadWithin { max_bytes: usize },
}

impl FilterPredicate for BuiltinPredicate {
    type Error = Infallible;

    fn accept(
        &self,
        message: &Message,
        _builder: &mut MessageBuilder,
    ) -> Result<bool, Infallible> {
        let accepted = match self {
            BuiltinPredicate::PropertyEquals { property, value } => {
                message.property(property) == Some(value)
            }
            BuiltinPredicate::HasProperty { property } => message.property(property).is_some(),
            BuiltinPredicate::PayloadWithin { max_bytes } => message.payload().len() <= *max_bytes,
        };
        Ok(accepted)
    }
}

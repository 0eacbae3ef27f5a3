use crate::BuiltinPredicate;
use crate::FilteringStage;
use serde::Deserialize;

/// The configuration of a filtering stage, as found in a pipeline definition
///
/// ```toml
/// accept = { property_equals = { property = "type", value = "measurement" } }
/// throw_on_unaccepted = true
/// ```
#[derive(Deserialize)]
pub struct StageConfig {
    /// The predicate messages must satisfy to continue downstream
    accept: BuiltinPredicate,

    /// Raise on rejected messages instead of dropping them
    #[serde(default)]
    throw_on_unaccepted: bool,
}

impl StageConfig {
    /// Materialize the stage this configuration describes
    ///
    /// Redirect targets are processors, not configuration data: when one is
    /// wanted, the assembling code wires it on the returned stage.
    pub fn compile(self, name: &str) -> FilteringStage<BuiltinPredicate> {
        FilteringStage::new(name, self.accept).with_throw_on_unaccepted(self.throw_on_unaccepted)
    }
}

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// An immutable message flowing through a pipeline
///
/// A message is never mutated in place: a processor that needs to amend one
/// derives a [MessageBuilder] from it and builds the next snapshot.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Message {
    correlation_id: String,
    payload: Vec<u8>,
    properties: HashMap<String, Value>,
}

impl Message {
    pub fn new(correlation_id: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Message {
            correlation_id: correlation_id.into(),
            payload: payload.into(),
            properties: HashMap::default(),
        }
    }

    /// Attach a property to a freshly created message
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// The identity shared by all the snapshots derived from the same unit of work
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> &HashMap<String, Value> {
        &self.properties
    }

    /// Start the next snapshot of this message
    pub fn builder(&self) -> MessageBuilder {
        MessageBuilder {
            correlation_id: self.correlation_id.clone(),
            payload: self.payload.clone(),
            properties: self.properties.clone(),
        }
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] ", self.correlation_id)?;
        match &self.payload_str() {
            Some(str) => write!(f, "{str}"),
            None => write!(f, "{:?}", self.payload),
        }
    }
}

/// The mutable staging area producing the next [Message] snapshot
///
/// A builder is bound to the snapshot it has been derived from and is
/// exclusively owned by the processor working on that message. The
/// correlation identity is carried over unchanged.
pub struct MessageBuilder {
    correlation_id: String,
    payload: Vec<u8>,
    properties: HashMap<String, Value>,
}

impl MessageBuilder {
    pub fn set_payload(&mut self, payload: impl Into<Vec<u8>>) -> &mut Self {
        self.payload = payload.into();
        self
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn remove_property(&mut self, name: &str) -> &mut Self {
        self.properties.remove(name);
        self
    }

    /// Produce the new immutable snapshot, consuming the staging area
    pub fn build(self) -> Message {
        Message {
            correlation_id: self.correlation_id,
            payload: self.payload,
            properties: self.properties,
        }
    }
}

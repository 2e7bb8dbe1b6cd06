use serde::{Deserialize, Serialize};

/// What caused an assistant lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingSource {
    Startup,
    Resume,
    Clear,
    Compact,
    Stop,
}

impl BindingSource {
    /// Sources that start a new assistant conversation, so continuity must be
    /// carried over from the previous one.
    pub fn starts_fresh(&self) -> bool {
        matches!(self, BindingSource::Startup | BindingSource::Clear)
    }
}

/// Inbound lifecycle event from the external assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingEvent {
    pub source: BindingSource,
    #[serde(default)]
    pub bound_assistant_id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

impl BindingEvent {
    pub fn new(source: BindingSource, bound_assistant_id: Option<&str>) -> Self {
        Self {
            source,
            bound_assistant_id: bound_assistant_id.map(str::to_string),
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::PageRecord;

const ACTIONS: [&str; 4] = ["pageContent", "retrieve", "openAndHighlight", "highlight"];

/// Every message carried on the bus, discriminated by `action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Msg {
    /// Observer -> coordinator: index this page. Fire-and-forget.
    PageContent { url: String, text: String },
    /// Query surface -> coordinator: look up pages. Answered with a `RetrieveResponse`.
    Retrieve { query: String },
    /// Query surface -> coordinator: open `result` and highlight `query` once loaded.
    OpenAndHighlight { result: PageRecord, query: String },
    /// Coordinator -> one specific page: highlight `query`.
    Highlight { query: String },
}

impl Msg {
    /// Decodes a message from its JSON wire form.
    pub fn decode(raw: &str) -> Result<Self, DecodeError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|err| DecodeError::Malformed(err.to_string()))?;
        let action = value
            .get("action")
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingAction)?;
        if !ACTIONS.contains(&action) {
            return Err(DecodeError::UnknownAction(action.to_owned()));
        }
        serde_json::from_value(value).map_err(|err| DecodeError::Malformed(err.to_string()))
    }

    pub fn action(&self) -> &'static str {
        match self {
            Msg::PageContent { .. } => ACTIONS[0],
            Msg::Retrieve { .. } => ACTIONS[1],
            Msg::OpenAndHighlight { .. } => ACTIONS[2],
            Msg::Highlight { .. } => ACTIONS[3],
        }
    }

    /// Whether the sender waits on a reply. Only `retrieve` does.
    pub fn expects_reply(&self) -> bool {
        matches!(self, Msg::Retrieve { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed message: {0}")]
    Malformed(String),
    #[error("message has no action")]
    MissingAction,
    #[error("unrecognized action {0:?}")]
    UnknownAction(String),
}

/// Reply to `retrieve`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RetrieveResponse {
    #[serde(default)]
    pub results: Vec<PageRecord>,
}

impl RetrieveResponse {
    pub fn new(results: Vec<PageRecord>) -> Self {
        Self { results }
    }

    /// The degraded reply used for every retrieval failure.
    pub fn empty() -> Self {
        Self::default()
    }
}

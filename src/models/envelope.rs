use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::window::DateWindow;

/// One row of a grouped table; columns keep the order they were produced in.
pub type Row = Map<String, Value>;

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Body of a [`ResultEnvelope`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Scalar(f64),
    Mapping(Row),
    Table(Vec<Row>),
    Text(String),
}

impl Payload {
    /// The envelope type this payload shape renders as.
    pub fn kind(&self) -> EnvelopeKind {
        match self {
            Payload::Scalar(_) | Payload::Mapping(_) => EnvelopeKind::Value,
            Payload::Table(_) => EnvelopeKind::Table,
            Payload::Text(_) => EnvelopeKind::Text,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Payload::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Row> {
        match self {
            Payload::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&[Row]> {
        match self {
            Payload::Table(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeKind {
    Value,
    Table,
    Text,
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,
    pub start: String,
    pub end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_end: Option<String>,
}

// ---------------------------------------------------------------------------
// ResultEnvelope
// ---------------------------------------------------------------------------

/// Uniform `(title, payload, metadata)` answer to one query.
///
/// `metadata.kind` is always derived from the payload shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub title: String,
    pub payload: Payload,
    pub metadata: Metadata,
}

impl ResultEnvelope {
    pub fn new(title: impl Into<String>, payload: Payload, window: &DateWindow) -> Self {
        let (start, end) = window.bounds();
        Self {
            title: title.into(),
            metadata: Metadata {
                kind: payload.kind(),
                start,
                end,
                prev_start: None,
                prev_end: None,
            },
            payload,
        }
    }

    pub fn text(title: impl Into<String>, message: impl Into<String>, window: &DateWindow) -> Self {
        Self::new(title, Payload::Text(message.into()), window)
    }

    /// Attach the comparison window of a period-over-period answer.
    pub fn with_previous(mut self, previous: &DateWindow) -> Self {
        let (start, end) = previous.bounds();
        self.metadata.prev_start = Some(start);
        self.metadata.prev_end = Some(end);
        self
    }

    pub fn kind(&self) -> EnvelopeKind {
        self.metadata.kind
    }
}

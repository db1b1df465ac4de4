//! Record: one stored analysis entry in a student's history.
//!
//! Two kinds share one shape:
//! - `text_exchange`: a typed-in problem or the model's reply to it (carries a `role`)
//! - `image_analysis`: the model's reading of a photographed mistake (carries a `type` label)
//!
//! Archives written before the `kind` field existed still load: a record
//! with a `role` is a text exchange, anything else is an image analysis.

use crate::message::{Message, Role};
use chrono::Local;
use serde::{Deserialize, Serialize};

/// Format used for the `time` field.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Label given to image analyses created by this crate.
pub const IMAGE_ANALYSIS_LABEL: &str = "拍照错题分析";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    TextExchange,
    ImageAnalysis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRecord")]
pub struct Record {
    pub kind: RecordKind,

    /// Speaker of a text exchange
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Free-form label of an image analysis
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Local wall-clock time the record was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    pub content: String,
}

impl Record {
    /// A problem as submitted by the teacher.
    pub fn user(content: impl Into<String>) -> Self {
        Self::exchange(Role::User, content)
    }

    /// The model's analysis of the preceding problem.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::exchange(Role::Assistant, content)
    }

    fn exchange(role: Role, content: impl Into<String>) -> Self {
        Self {
            kind: RecordKind::TextExchange,
            role: Some(role),
            label: None,
            time: Some(now()),
            content: content.into(),
        }
    }

    pub fn image_analysis(label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: RecordKind::ImageAnalysis,
            role: None,
            label: Some(label.into()),
            time: Some(now()),
            content: content.into(),
        }
    }

    /// Override the timestamp (tests, imports).
    pub fn with_time(mut self, time: Option<String>) -> Self {
        self.time = time;
        self
    }

    pub fn is_text_exchange(&self) -> bool {
        self.kind == RecordKind::TextExchange
    }

    /// Whether this record is a problem the teacher submitted.
    pub fn is_submitted_problem(&self) -> bool {
        self.is_text_exchange() && self.role == Some(Role::User)
    }

    /// Replay a text exchange as a request message. Image analyses have no turn to replay.
    pub fn to_message(&self) -> Option<Message> {
        match (self.kind, self.role) {
            (RecordKind::TextExchange, Some(role)) => Some(Message {
                role,
                content: crate::message::MessageContent::Text(self.content.clone()),
            }),
            _ => None,
        }
    }
}

fn now() -> String {
    Local::now().format(TIME_FORMAT).to_string()
}

/// On-disk shape, tolerant of records written without `kind`.
#[derive(Deserialize)]
struct RawRecord {
    #[serde(default)]
    kind: Option<RecordKind>,
    #[serde(default)]
    role: Option<Role>,
    #[serde(rename = "type", default)]
    label: Option<String>,
    #[serde(default)]
    time: Option<String>,
    content: String,
}

impl From<RawRecord> for Record {
    fn from(raw: RawRecord) -> Self {
        let kind = raw.kind.unwrap_or(if raw.role.is_some() {
            RecordKind::TextExchange
        } else {
            RecordKind::ImageAnalysis
        });
        Self {
            kind,
            role: raw.role,
            label: raw.label,
            time: raw.time,
            content: raw.content,
        }
    }
}

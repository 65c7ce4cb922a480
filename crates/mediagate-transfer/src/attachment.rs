//! Attachment record and transfer state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Composite attachment identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentId {
    pub row_id: i64,
    pub unique_id: i64,
}

impl AttachmentId {
    pub fn new(row_id: i64, unique_id: i64) -> Self {
        Self { row_id, unique_id }
    }
}

impl std::fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.row_id, self.unique_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferState {
    /// Transfer finished
    Done,
    /// Transfer in flight
    Started,
    /// Queued, waiting for automatic-download approval
    AutoPending,
    /// Waiting for the user to request the download
    PendingManual,
    /// Transfer failed
    Failed,
}

impl TransferState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferState::Done => "done",
            TransferState::Started => "started",
            TransferState::AutoPending => "auto_pending",
            TransferState::PendingManual => "pending_manual",
            TransferState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TransferState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransferState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "done" => Ok(TransferState::Done),
            "started" => Ok(TransferState::Started),
            "auto_pending" => Ok(TransferState::AutoPending),
            "pending_manual" => Ok(TransferState::PendingManual),
            "failed" => Ok(TransferState::Failed),
            _ => Err(format!("Unknown transfer state: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub message_id: i64,
    pub content_type: String,
    pub transfer_state: TransferState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Attachment {
    /// A freshly received attachment, queued for automatic download.
    pub fn new(message_id: i64, id: AttachmentId, content_type: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            message_id,
            content_type: content_type.into(),
            transfer_state: TransferState::AutoPending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_state(mut self, state: TransferState) -> Self {
        self.transfer_state = state;
        self
    }
}

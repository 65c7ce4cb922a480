//! Job requirements
//!
//! A download job carries requirements that the job runner polls before
//! running it. Requirements are persisted with the job as JSON; runtime
//! dependencies are injected again after loading.

use serde::{Deserialize, Serialize};

use mediagate_transfer::{AdmissionPolicy, AttachmentId};

/// Precondition a queued job waits on.
pub trait Requirement {
    fn is_present(&self) -> bool;
}

/// Holds an attachment download job until the current network allows the
/// attachment to auto-download.
///
/// Being polled is not side-effect free: a present requirement has already
/// moved the attachment from auto-pending to started.
#[derive(Clone, Serialize, Deserialize)]
pub struct AutoDownloadRequirement {
    message_id: i64,
    attachment_id: AttachmentId,
    #[serde(skip)]
    policy: Option<AdmissionPolicy>,
}

impl AutoDownloadRequirement {
    pub fn new(message_id: i64, attachment_id: AttachmentId) -> Self {
        Self {
            message_id,
            attachment_id,
            policy: None,
        }
    }

    pub fn message_id(&self) -> i64 {
        self.message_id
    }

    pub fn attachment_id(&self) -> AttachmentId {
        self.attachment_id
    }

    pub fn set_context(&mut self, policy: AdmissionPolicy) {
        self.policy = Some(policy);
    }

    pub fn with_context(mut self, policy: AdmissionPolicy) -> Self {
        self.set_context(policy);
        self
    }

    pub fn has_context(&self) -> bool {
        self.policy.is_some()
    }
}

impl std::fmt::Debug for AutoDownloadRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoDownloadRequirement")
            .field("message_id", &self.message_id)
            .field("attachment_id", &self.attachment_id)
            .field("has_context", &self.has_context())
            .finish()
    }
}

impl Requirement for AutoDownloadRequirement {
    fn is_present(&self) -> bool {
        let Some(policy) = &self.policy else {
            tracing::warn!(
                attachment_id = %self.attachment_id,
                "Requirement polled without context"
            );
            return false;
        };

        match policy.is_admitted(self.message_id, &self.attachment_id) {
            Ok(present) => present,
            Err(e) => {
                // Retried on the next poll
                tracing::warn!(
                    attachment_id = %self.attachment_id,
                    error = %e,
                    "Admission check failed"
                );
                false
            }
        }
    }
}

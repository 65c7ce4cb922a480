//! Auto-download admission
//!
//! Decides whether a queued attachment may start downloading on the current
//! network. Deciding ([`AdmissionPolicy::evaluate`]) and recording the start
//! ([`AdmissionPolicy::commit_start`]) are separate steps;
//! [`AdmissionPolicy::is_admitted`] chains them for job runners.

use std::sync::Arc;

use mediagate_policy::{ContentClassifier, MediaKind, NetworkClass, PreferenceSource, Purpose};

use crate::attachment::{AttachmentId, TransferState};
use crate::connectivity::ConnectivitySource;
use crate::store::AttachmentStore;
use crate::Result;

/// Media kind checked by [`AdmissionPolicy::is_preview_admitted`].
pub const PREVIEW_KIND: MediaKind = MediaKind::AnimatedPreview;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// No usable network
    NoConnectivity,
    /// Content type could not be classified
    UnknownContentType(String),
    /// The user does not auto-download this kind on this network
    KindNotAllowed {
        network: NetworkClass,
        kind: MediaKind,
    },
    /// Not waiting for automatic download
    NotAutoPending(TransferState),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// No record exists; nothing to gate
    Untracked,
    /// Transfer already started
    InFlight,
    /// Auto-pending and allowed; the start still has to be committed
    Admit {
        network: NetworkClass,
        kind: MediaKind,
    },
    Deny(DenyReason),
}

impl Decision {
    pub fn is_admitted(&self) -> bool {
        !matches!(self, Decision::Deny(_))
    }

    /// Whether acting on this decision requires an AutoPending -> Started write.
    pub fn needs_commit(&self) -> bool {
        matches!(self, Decision::Admit { .. })
    }
}

/// Auto-download admission policy.
///
/// Holds no transfer state of its own: every evaluation reads the attachment
/// record from the store again.
#[derive(Clone)]
pub struct AdmissionPolicy {
    store: Arc<dyn AttachmentStore>,
    connectivity: Arc<dyn ConnectivitySource>,
    preferences: Arc<dyn PreferenceSource>,
    classifier: Arc<dyn ContentClassifier>,
}

impl AdmissionPolicy {
    pub fn new(
        store: Arc<dyn AttachmentStore>,
        connectivity: Arc<dyn ConnectivitySource>,
        preferences: Arc<dyn PreferenceSource>,
        classifier: Arc<dyn ContentClassifier>,
    ) -> Self {
        Self {
            store,
            connectivity,
            preferences,
            classifier,
        }
    }

    /// Decide without writing anything.
    pub fn evaluate(&self, id: &AttachmentId) -> Result<Decision> {
        let Some(attachment) = self.store.get_attachment(id)? else {
            tracing::warn!(attachment_id = %id, "Attachment missing, admitting vacuously");
            return Ok(Decision::Untracked);
        };

        tracing::debug!(
            attachment_id = %id,
            state = %attachment.transfer_state,
            "Evaluating auto-download admission"
        );

        let decision = match attachment.transfer_state {
            TransferState::Started => Decision::InFlight,
            TransferState::AutoPending => self.evaluate_pending(&attachment.content_type),
            other => Decision::Deny(DenyReason::NotAutoPending(other)),
        };

        tracing::debug!(attachment_id = %id, decision = ?decision, "Admission decided");

        Ok(decision)
    }

    fn evaluate_pending(&self, content_type: &str) -> Decision {
        let network = self.connectivity.current_network_class();
        if !network.is_connected() {
            return Decision::Deny(DenyReason::NoConnectivity);
        }

        let Some(kind) = self.classifier.classify(content_type) else {
            return Decision::Deny(DenyReason::UnknownContentType(content_type.to_string()));
        };

        let allowed = self.preferences.allowed_kinds(network, Purpose::Media);
        if allowed.contains(&kind) {
            Decision::Admit { network, kind }
        } else {
            Decision::Deny(DenyReason::KindNotAllowed { network, kind })
        }
    }

    /// Record that the transfer started: AutoPending -> Started, in one
    /// storage transaction.
    ///
    /// Returns `false` if the record was no longer auto-pending, e.g. because
    /// a manual download or another job got there first.
    pub fn commit_start(&self, message_id: i64, id: &AttachmentId) -> Result<bool> {
        self.store.transition_transfer_state(
            message_id,
            id,
            TransferState::AutoPending,
            TransferState::Started,
        )
    }

    /// Evaluate and, when admitted from AutoPending, commit the start.
    ///
    /// **This writes.** An admitted auto-pending attachment is moved to
    /// `Started` before this returns, so do not call it just to peek; use
    /// [`evaluate`](Self::evaluate) for that.
    ///
    /// A missing record is admitted. If the commit loses a race, the record
    /// is read again and the call is admitted only if it is now started.
    pub fn is_admitted(&self, message_id: i64, id: &AttachmentId) -> Result<bool> {
        let decision = self.evaluate(id)?;

        if !decision.needs_commit() {
            return Ok(decision.is_admitted());
        }

        if self.commit_start(message_id, id)? {
            return Ok(true);
        }

        let admitted = match self.store.get_attachment(id)? {
            Some(attachment) => attachment.transfer_state == TransferState::Started,
            None => true,
        };

        tracing::info!(attachment_id = %id, admitted, "Lost start race, re-read attachment");

        Ok(admitted)
    }

    /// Whether animated previews may load on the current network. No writes.
    pub fn is_preview_admitted(&self) -> bool {
        let network = self.connectivity.current_network_class();
        if !network.is_connected() {
            return false;
        }

        self.preferences
            .allowed_kinds(network, Purpose::Preview)
            .contains(&PREVIEW_KIND)
    }
}

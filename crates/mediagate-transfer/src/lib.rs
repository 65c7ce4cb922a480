//! mediagate Attachment Transfers
//!
//! - Attachment records and their transfer states
//! - SQLite-backed attachment store
//! - Connectivity source for the active network
//! - Auto-download admission: evaluate, then commit the start

mod admission;
mod attachment;
mod connectivity;
mod error;
mod store;

pub use admission::{AdmissionPolicy, Decision, DenyReason, PREVIEW_KIND};
pub use attachment::{Attachment, AttachmentId, TransferState};
pub use connectivity::{ConnectivitySource, SharedConnectivity};
pub use error::TransferError;
pub use store::{AttachmentRepository, AttachmentStore};

pub type Result<T> = std::result::Result<T, TransferError>;

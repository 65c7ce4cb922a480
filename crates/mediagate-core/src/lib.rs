//! mediagate Core
//!
//! Wires storage, preferences and connectivity into an admission policy that
//! background download jobs consult before fetching attachment media.

mod config;
mod error;
mod gate;
mod requirement;

pub use config::Config;
pub use error::CoreError;
pub use gate::Gate;
pub use requirement::{AutoDownloadRequirement, Requirement};

// Re-export core components
pub use mediagate_policy::{
    AutoDownloadPermissions, ContentClassifier, DiscreteMimeClassifier, MediaKind, NetworkClass,
    NetworkInfo, PreferenceSource, Purpose, StoredPreferences, Transport,
};
pub use mediagate_storage::{Database, StorageError};
pub use mediagate_transfer::{
    AdmissionPolicy, Attachment, AttachmentId, AttachmentRepository, AttachmentStore,
    ConnectivitySource, Decision, DenyReason, SharedConnectivity, TransferError, TransferState,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}

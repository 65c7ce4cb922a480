//! Gate: the assembled admission stack
//!
//! Owns the database, the attachment store, stored preferences and the
//! connectivity source, and hands out the policy and job requirements built
//! on top of them.

use std::sync::Arc;

use mediagate_policy::{AutoDownloadPermissions, DiscreteMimeClassifier, StoredPreferences};
use mediagate_storage::Database;
use mediagate_transfer::{AdmissionPolicy, AttachmentId, AttachmentRepository, SharedConnectivity};

use crate::config::Config;
use crate::requirement::AutoDownloadRequirement;
use crate::Result;

pub struct Gate {
    config: Config,
    attachments: AttachmentRepository,
    preferences: StoredPreferences,
    connectivity: SharedConnectivity,
    policy: AdmissionPolicy,
}

impl Gate {
    /// Open the database named by `config`, creating its directory if needed.
    pub fn new(config: Config) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database_path)?;
        Ok(Self::with_database(config, db))
    }

    pub fn with_database(config: Config, db: Database) -> Self {
        let attachments = AttachmentRepository::new(db.clone());
        let preferences = StoredPreferences::new(db, config.default_permissions.clone());
        let connectivity = SharedConnectivity::new();

        let policy = AdmissionPolicy::new(
            Arc::new(attachments.clone()),
            Arc::new(connectivity.clone()),
            Arc::new(preferences.clone()),
            Arc::new(DiscreteMimeClassifier),
        );

        Self {
            config,
            attachments,
            preferences,
            connectivity,
            policy,
        }
    }

    /// Seed stored permissions from the config defaults on first run.
    pub fn initialize(&self) -> Result<()> {
        if !self.preferences.is_stored()? {
            self.preferences.store(&self.config.default_permissions)?;
            tracing::info!("Seeded auto-download permissions from config");
        }

        let pending = self.attachments.auto_pending()?.len();
        tracing::info!(pending, "Gate initialized");

        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn admission_policy(&self) -> &AdmissionPolicy {
        &self.policy
    }

    pub fn attachments(&self) -> &AttachmentRepository {
        &self.attachments
    }

    /// Host-updated connectivity; feed it from network change callbacks.
    pub fn connectivity(&self) -> &SharedConnectivity {
        &self.connectivity
    }

    pub fn permissions(&self) -> AutoDownloadPermissions {
        self.preferences.load()
    }

    pub fn set_permissions(&self, permissions: &AutoDownloadPermissions) -> Result<()> {
        Ok(self.preferences.store(permissions)?)
    }

    pub fn is_preview_admitted(&self) -> bool {
        self.policy.is_preview_admitted()
    }

    /// A requirement for a new download job, ready to poll.
    pub fn requirement(&self, message_id: i64, attachment_id: AttachmentId) -> AutoDownloadRequirement {
        AutoDownloadRequirement::new(message_id, attachment_id).with_context(self.policy.clone())
    }

    /// Rebuild a requirement persisted with its job.
    pub fn restore_requirement(&self, json: &str) -> Result<AutoDownloadRequirement> {
        let mut requirement: AutoDownloadRequirement = serde_json::from_str(json)?;
        requirement.set_context(self.policy.clone());
        Ok(requirement)
    }
}

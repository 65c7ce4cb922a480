//! Auto-download permissions
//!
//! Defaults:
//! | Purpose | Wifi                          | Mobile           | Roaming |
//! | Media   | image, audio, video, document | image, audio     | -       |
//! | Preview | animated preview              | animated preview | -       |

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use mediagate_storage::Database;

use crate::media::MediaKind;
use crate::network::NetworkClass;

/// Settings key holding the JSON-encoded [`AutoDownloadPermissions`].
pub const PERMISSIONS_SETTING_KEY: &str = "auto_download_permissions";

/// Which allow-list a lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    /// Ordinary attachment media
    Media,
    /// Animated preview thumbnails
    Preview,
}

/// Allowed media kinds for each connected network class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkAllowList {
    #[serde(default)]
    pub wifi: BTreeSet<MediaKind>,
    #[serde(default)]
    pub mobile: BTreeSet<MediaKind>,
    #[serde(default)]
    pub roaming: BTreeSet<MediaKind>,
}

impl NetworkAllowList {
    /// Allowed kinds on `network`. Never anything without connectivity.
    pub fn for_network(&self, network: NetworkClass) -> Option<&BTreeSet<MediaKind>> {
        match network {
            NetworkClass::Wifi => Some(&self.wifi),
            NetworkClass::Mobile => Some(&self.mobile),
            NetworkClass::MobileRoaming => Some(&self.roaming),
            NetworkClass::None => None,
        }
    }

    pub fn for_network_mut(&mut self, network: NetworkClass) -> Option<&mut BTreeSet<MediaKind>> {
        match network {
            NetworkClass::Wifi => Some(&mut self.wifi),
            NetworkClass::Mobile => Some(&mut self.mobile),
            NetworkClass::MobileRoaming => Some(&mut self.roaming),
            NetworkClass::None => None,
        }
    }

    pub fn allows(&self, network: NetworkClass, kind: MediaKind) -> bool {
        self.for_network(network)
            .map(|kinds| kinds.contains(&kind))
            .unwrap_or(false)
    }
}

/// User-configured auto-download permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoDownloadPermissions {
    pub media: NetworkAllowList,
    pub preview: NetworkAllowList,
}

impl AutoDownloadPermissions {
    /// Nothing allowed anywhere.
    pub fn deny_all() -> Self {
        Self {
            media: NetworkAllowList::default(),
            preview: NetworkAllowList::default(),
        }
    }

    pub fn allow_list(&self, purpose: Purpose) -> &NetworkAllowList {
        match purpose {
            Purpose::Media => &self.media,
            Purpose::Preview => &self.preview,
        }
    }

    /// Replace the allowed kinds for one network and purpose.
    ///
    /// Ignored for `NetworkClass::None`, which always allows nothing.
    pub fn set_allowed(
        &mut self,
        network: NetworkClass,
        purpose: Purpose,
        kinds: impl IntoIterator<Item = MediaKind>,
    ) {
        let list = match purpose {
            Purpose::Media => &mut self.media,
            Purpose::Preview => &mut self.preview,
        };

        if let Some(slot) = list.for_network_mut(network) {
            *slot = kinds.into_iter().collect();
        }
    }

    pub fn is_allowed(&self, network: NetworkClass, purpose: Purpose, kind: MediaKind) -> bool {
        self.allow_list(purpose).allows(network, kind)
    }
}

impl Default for AutoDownloadPermissions {
    fn default() -> Self {
        let all_media = [
            MediaKind::Image,
            MediaKind::Audio,
            MediaKind::Video,
            MediaKind::Document,
        ];

        Self {
            media: NetworkAllowList {
                wifi: all_media.into_iter().collect(),
                mobile: [MediaKind::Image, MediaKind::Audio].into_iter().collect(),
                roaming: BTreeSet::new(),
            },
            preview: NetworkAllowList {
                wifi: [MediaKind::AnimatedPreview].into_iter().collect(),
                mobile: [MediaKind::AnimatedPreview].into_iter().collect(),
                roaming: BTreeSet::new(),
            },
        }
    }
}

/// Source of the allowed media kinds per network and purpose.
pub trait PreferenceSource: Send + Sync {
    fn allowed_kinds(&self, network: NetworkClass, purpose: Purpose) -> BTreeSet<MediaKind>;
}

impl PreferenceSource for AutoDownloadPermissions {
    fn allowed_kinds(&self, network: NetworkClass, purpose: Purpose) -> BTreeSet<MediaKind> {
        self.allow_list(purpose)
            .for_network(network)
            .cloned()
            .unwrap_or_default()
    }
}

/// Permissions persisted in the settings table.
///
/// Every lookup reads the stored value again, so edits made through another
/// handle are seen on the next evaluation. Missing or undecodable values fall
/// back to the configured defaults.
#[derive(Clone)]
pub struct StoredPreferences {
    db: Database,
    fallback: AutoDownloadPermissions,
}

impl StoredPreferences {
    pub fn new(db: Database, fallback: AutoDownloadPermissions) -> Self {
        Self { db, fallback }
    }

    /// Current permissions, or the fallback when nothing usable is stored.
    pub fn load(&self) -> AutoDownloadPermissions {
        match self
            .db
            .get_json_setting::<AutoDownloadPermissions>(PERMISSIONS_SETTING_KEY)
        {
            Ok(Some(permissions)) => permissions,
            Ok(None) => self.fallback.clone(),
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable auto-download permissions, using defaults");
                self.fallback.clone()
            }
        }
    }

    pub fn store(&self, permissions: &AutoDownloadPermissions) -> mediagate_storage::Result<()> {
        self.db
            .set_json_setting(PERMISSIONS_SETTING_KEY, permissions)?;
        tracing::info!("Stored auto-download permissions");
        Ok(())
    }

    /// Whether a permissions value has been written yet.
    pub fn is_stored(&self) -> mediagate_storage::Result<bool> {
        Ok(self.db.get_setting(PERMISSIONS_SETTING_KEY)?.is_some())
    }
}

impl PreferenceSource for StoredPreferences {
    fn allowed_kinds(&self, network: NetworkClass, purpose: Purpose) -> BTreeSet<MediaKind> {
        self.load().allowed_kinds(network, purpose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_permissions() {
        let permissions = AutoDownloadPermissions::default();

        assert!(permissions.is_allowed(NetworkClass::Wifi, Purpose::Media, MediaKind::Video));
        assert!(permissions.is_allowed(NetworkClass::Mobile, Purpose::Media, MediaKind::Image));
        assert!(!permissions.is_allowed(NetworkClass::Mobile, Purpose::Media, MediaKind::Video));
        assert!(permissions
            .allowed_kinds(NetworkClass::MobileRoaming, Purpose::Media)
            .is_empty());
        assert!(permissions.is_allowed(
            NetworkClass::Wifi,
            Purpose::Preview,
            MediaKind::AnimatedPreview
        ));
    }

    #[test]
    fn test_none_network_allows_nothing() {
        let mut permissions = AutoDownloadPermissions::default();
        permissions.set_allowed(NetworkClass::None, Purpose::Media, [MediaKind::Image]);

        assert!(permissions
            .allowed_kinds(NetworkClass::None, Purpose::Media)
            .is_empty());
        assert!(!permissions.is_allowed(
            NetworkClass::None,
            Purpose::Preview,
            MediaKind::AnimatedPreview
        ));
    }

    #[test]
    fn test_set_allowed() {
        let mut permissions = AutoDownloadPermissions::deny_all();
        permissions.set_allowed(
            NetworkClass::MobileRoaming,
            Purpose::Media,
            [MediaKind::Audio],
        );

        assert!(permissions.is_allowed(
            NetworkClass::MobileRoaming,
            Purpose::Media,
            MediaKind::Audio
        ));
        assert!(!permissions.is_allowed(NetworkClass::Wifi, Purpose::Media, MediaKind::Audio));
    }

    #[test]
    fn test_stored_preferences_fallback() {
        let db = Database::open_in_memory().unwrap();
        let prefs = StoredPreferences::new(db.clone(), AutoDownloadPermissions::default());

        assert!(!prefs.is_stored().unwrap());
        assert_eq!(prefs.load(), AutoDownloadPermissions::default());

        db.set_setting(PERMISSIONS_SETTING_KEY, "{broken").unwrap();
        assert_eq!(prefs.load(), AutoDownloadPermissions::default());
    }

    #[test]
    fn test_stored_preferences_read_fresh() {
        let db = Database::open_in_memory().unwrap();
        let prefs = StoredPreferences::new(db.clone(), AutoDownloadPermissions::default());
        let other_handle = StoredPreferences::new(db, AutoDownloadPermissions::default());

        other_handle
            .store(&AutoDownloadPermissions::deny_all())
            .unwrap();

        assert!(prefs
            .allowed_kinds(NetworkClass::Wifi, Purpose::Media)
            .is_empty());
    }
}

//! mediagate Auto-Download Policy Inputs
//!
//! Everything the admission policy reads but does not own:
//! - Network classification from raw connectivity signals
//! - Content-type classification into coarse media kinds
//! - Per-network allow-lists for ordinary media and for previews
//!
//! | Network         | Media default                 | Preview default |
//! | Wifi            | image, audio, video, document | allowed         |
//! | Mobile          | image, audio                  | allowed         |
//! | Mobile roaming  | none                          | denied          |
//! | None            | none (fixed)                  | denied (fixed)  |

mod media;
mod network;
mod permissions;

pub use media::{ContentClassifier, DiscreteMimeClassifier, MediaKind};
pub use network::{NetworkClass, NetworkInfo, Transport};
pub use permissions::{
    AutoDownloadPermissions, NetworkAllowList, PreferenceSource, Purpose, StoredPreferences,
    PERMISSIONS_SETTING_KEY,
};

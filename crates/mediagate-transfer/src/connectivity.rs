//! Connectivity source

use parking_lot::RwLock;
use std::sync::Arc;

use mediagate_policy::{NetworkClass, NetworkInfo};

/// Answers "what network are we on right now".
pub trait ConnectivitySource: Send + Sync {
    fn current_network_class(&self) -> NetworkClass;
}

/// Connectivity pushed in by the host on network change events.
///
/// Starts out with no network info, which classifies as `NetworkClass::None`.
#[derive(Clone, Default)]
pub struct SharedConnectivity {
    info: Arc<RwLock<Option<NetworkInfo>>>,
}

impl SharedConnectivity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_info(info: NetworkInfo) -> Self {
        let connectivity = Self::new();
        connectivity.update(Some(info));
        connectivity
    }

    /// Record the current active network; `None` when the platform reports none.
    pub fn update(&self, info: Option<NetworkInfo>) {
        let class = NetworkClass::classify(info.as_ref());
        *self.info.write() = info;

        tracing::debug!(network = %class, "Connectivity changed");
    }
}

impl ConnectivitySource for SharedConnectivity {
    fn current_network_class(&self) -> NetworkClass {
        NetworkClass::classify(self.info.read().as_ref())
    }
}

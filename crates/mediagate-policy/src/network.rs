//! Network classification

use serde::{Deserialize, Serialize};

/// Transport type of the active network, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    Wifi,
    Mobile,
    /// Ethernet, bluetooth tethering, VPN-only and anything else
    Other,
}

/// Raw connectivity signals for the active network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub connected: bool,
    pub transport: Transport,
    pub roaming: bool,
}

impl NetworkInfo {
    pub fn wifi() -> Self {
        Self {
            connected: true,
            transport: Transport::Wifi,
            roaming: false,
        }
    }

    pub fn mobile(roaming: bool) -> Self {
        Self {
            connected: true,
            transport: Transport::Mobile,
            roaming,
        }
    }
}

/// Connectivity class relevant to auto-download decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkClass {
    None,
    Wifi,
    Mobile,
    MobileRoaming,
}

impl NetworkClass {
    /// Classify the active network.
    ///
    /// Wifi wins over roaming, roaming over plain mobile. No info, a
    /// disconnected network or an unsupported transport all classify as
    /// `None`. The roaming flag only counts on a mobile transport.
    pub fn classify(info: Option<&NetworkInfo>) -> Self {
        let Some(info) = info.filter(|info| info.connected) else {
            return NetworkClass::None;
        };

        match info.transport {
            Transport::Wifi => NetworkClass::Wifi,
            Transport::Mobile if info.roaming => NetworkClass::MobileRoaming,
            Transport::Mobile => NetworkClass::Mobile,
            Transport::Other => NetworkClass::None,
        }
    }

    pub fn is_connected(&self) -> bool {
        *self != NetworkClass::None
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkClass::None => "none",
            NetworkClass::Wifi => "wifi",
            NetworkClass::Mobile => "mobile",
            NetworkClass::MobileRoaming => "mobile_roaming",
        }
    }
}

impl std::fmt::Display for NetworkClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

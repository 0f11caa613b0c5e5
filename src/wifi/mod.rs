//! # Wi-Fi Module
//!
//! Finding and joining the drone's access point.
//!
//! This module handles:
//! - Scanning visible networks through the host's network manager
//! - Selecting the drone network by SSID pattern
//! - Joining the open drone network

pub mod discovery;
pub mod nmcli;
pub mod pairing;

use async_trait::async_trait;

use crate::error::Result;

pub use discovery::{discover, select_target, SsidPattern};
pub use nmcli::NmcliBackend;
pub use pairing::{pair, Connected};

/// One network seen by a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiNetwork {
    pub ssid: String,
    /// Hardware address of the access point
    pub bssid: String,
    /// Signal strength in percent, if reported
    pub signal: Option<u8>,
    /// Security label as reported by the backend, empty for open networks
    pub security: String,
}

impl WifiNetwork {
    /// Shorthand for an open network with no signal information
    pub fn open(ssid: impl Into<String>, bssid: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            bssid: bssid.into(),
            signal: None,
            security: String::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        let security = self.security.trim();
        security.is_empty() || security == "--"
    }
}

/// Trait abstraction for the host Wi-Fi stack to enable testing
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WifiBackend: Send + Sync {
    /// List currently visible networks
    async fn scan(&self) -> Result<Vec<WifiNetwork>>;

    /// Associate with an open network, returning once the OS confirms
    async fn connect(&self, network: &WifiNetwork) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_network() {
        let network = WifiNetwork::open("HelicMax-1", "AA:BB:CC:DD:EE:FF");
        assert!(network.is_open());
        assert_eq!(network.signal, None);
    }

    #[test]
    fn test_secured_network() {
        let mut network = WifiNetwork::open("HomeWifi", "11:22:33:44:55:66");
        network.security = "WPA2".to_string();
        assert!(!network.is_open());

        network.security = "--".to_string();
        assert!(network.is_open());
    }
}

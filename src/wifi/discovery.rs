//! # Drone Network Discovery
//!
//! Picks the drone's access point out of a scan result.
//!
//! Drone SSIDs are a vendor prefix followed by a serial number, e.g.
//! `HelicMax-3021`. The first match in scan order wins; signal strength is
//! not considered.

use tracing::{debug, info};

use super::{WifiBackend, WifiNetwork};
use crate::error::{HelicLinkError, Result};

/// Vendor prefix used when none is configured
pub const DEFAULT_SSID_PREFIX: &str = "HelicMax-";

/// SSID naming pattern: `<prefix><one or more ASCII digits>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsidPattern {
    prefix: String,
}

impl Default for SsidPattern {
    fn default() -> Self {
        Self::new(DEFAULT_SSID_PREFIX)
    }
}

impl SsidPattern {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether an SSID belongs to a drone
    ///
    /// # Examples
    ///
    /// ```
    /// use helicmax_link::wifi::SsidPattern;
    ///
    /// let pattern = SsidPattern::default();
    /// assert!(pattern.matches("HelicMax-3021"));
    /// assert!(!pattern.matches("HelicMax-"));
    /// assert!(!pattern.matches("HomeWifi"));
    /// ```
    pub fn matches(&self, ssid: &str) -> bool {
        match ssid.strip_prefix(&self.prefix) {
            Some(serial) => !serial.is_empty() && serial.bytes().all(|b| b.is_ascii_digit()),
            None => false,
        }
    }
}

/// Select the first network whose SSID matches the pattern
///
/// Returns `None` when nothing matches, including for an empty scan.
pub fn select_target<'a>(
    networks: &'a [WifiNetwork],
    pattern: &SsidPattern,
) -> Option<&'a WifiNetwork> {
    networks.iter().find(|network| pattern.matches(&network.ssid))
}

/// Scan and select the drone network
///
/// # Errors
///
/// - `Scan`: the backend could not query the radio
/// - `TargetNotFound`: no visible network matched
pub async fn discover<B>(backend: &B, pattern: &SsidPattern) -> Result<WifiNetwork>
where
    B: WifiBackend + ?Sized,
{
    info!("Scanning for drone wifi network...");

    let networks = backend.scan().await?;
    debug!("Scan returned {} networks", networks.len());

    match select_target(&networks, pattern) {
        Some(network) => {
            info!("Found drone network \"{}\" ({})", network.ssid, network.bssid);
            Ok(network.clone())
        }
        None => Err(HelicLinkError::TargetNotFound(pattern.prefix().to_string())),
    }
}

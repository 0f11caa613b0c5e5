//! # Link Establishment
//!
//! Everything that has to succeed before the first datagram is sent:
//! discovery, pairing, and building session options from configuration.
//! Each step is fatal on failure; there is no automatic retry.

use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::session::SessionOptions;
use crate::wifi::{discover, pair, Connected, SsidPattern, WifiBackend};

/// Find the drone network and join it
///
/// # Errors
///
/// - `Scan`: the radio could not be queried
/// - `TargetNotFound`: no drone network visible
/// - `Pairing`: association failed or timed out
pub async fn establish<B>(backend: &B, config: &Config) -> Result<Connected>
where
    B: WifiBackend + ?Sized,
{
    let pattern = SsidPattern::new(config.drone.ssid_prefix.clone());
    let network = discover(backend, &pattern).await?;
    let connected = pair(backend, &network, config.wifi.connect_timeout()).await?;

    info!("Joined \"{}\"", connected.ssid);
    Ok(connected)
}

/// Session options with any configured wire overrides applied
///
/// # Errors
///
/// Returns `Protocol` error if the configured template is not a valid frame.
pub fn session_options(config: &Config) -> Result<SessionOptions> {
    let mut options = SessionOptions::from_config(&config.session);

    if let Some(wake) = &config.protocol.wake_packet {
        options.wake_packet = wake.clone();
    }
    if let Some(template) = config.protocol.template()? {
        options.template = template;
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HelicLinkError;
    use crate::protocol::{neutral_template, wake_packet};
    use crate::wifi::{MockWifiBackend, WifiNetwork};
    use mockall::Sequence;
    use std::time::Duration;

    fn scan_result() -> Vec<WifiNetwork> {
        vec![
            WifiNetwork::open("HomeWifi", "11:22:33:44:55:66"),
            WifiNetwork::open("HelicMax-3021", "AA:BB:CC:DD:EE:FF"),
            WifiNetwork::open("HelicMax-9", "AA:BB:CC:DD:EE:00"),
        ]
    }

    #[tokio::test]
    async fn test_establish_scans_then_pairs_first_match() {
        let mut backend = MockWifiBackend::new();
        let mut seq = Sequence::new();
        backend
            .expect_scan()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(scan_result()));
        backend
            .expect_connect()
            .withf(|network| network.ssid == "HelicMax-3021")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let connected = establish(&backend, &Config::default()).await.unwrap();
        assert_eq!(connected.ssid, "HelicMax-3021");
        assert_eq!(connected.bssid, "AA:BB:CC:DD:EE:FF");
    }

    #[tokio::test]
    async fn test_scan_failure_is_fatal_before_pairing() {
        let mut backend = MockWifiBackend::new();
        backend
            .expect_scan()
            .times(1)
            .returning(|| Err(HelicLinkError::Scan("wlan0: operation not permitted".into())));
        backend.expect_connect().times(0);

        let err = establish(&backend, &Config::default()).await.unwrap_err();
        assert!(matches!(err, HelicLinkError::Scan(_)));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_no_drone_network_is_fatal() {
        let mut backend = MockWifiBackend::new();
        backend
            .expect_scan()
            .returning(|| Ok(vec![WifiNetwork::open("HomeWifi", "11:22:33:44:55:66")]));
        backend.expect_connect().times(0);

        let err = establish(&backend, &Config::default()).await.unwrap_err();
        assert!(matches!(err, HelicLinkError::TargetNotFound(_)));
    }

    #[tokio::test]
    async fn test_pairing_failure_is_not_retried() {
        let mut backend = MockWifiBackend::new();
        backend.expect_scan().returning(|| Ok(scan_result()));
        backend.expect_connect().times(1).returning(|network| {
            Err(HelicLinkError::Pairing {
                ssid: network.ssid.clone(),
                reason: "association rejected".into(),
            })
        });

        let err = establish(&backend, &Config::default()).await.unwrap_err();
        assert!(matches!(err, HelicLinkError::Pairing { .. }));
    }

    #[tokio::test]
    async fn test_configured_prefix() {
        let mut config = Config::default();
        config.drone.ssid_prefix = "Quad_".to_string();

        let mut backend = MockWifiBackend::new();
        backend.expect_scan().returning(|| {
            Ok(vec![
                WifiNetwork::open("HelicMax-1", "AA:BB:CC:DD:EE:01"),
                WifiNetwork::open("Quad_77", "AA:BB:CC:DD:EE:02"),
            ])
        });
        backend
            .expect_connect()
            .withf(|network| network.ssid == "Quad_77")
            .returning(|_| Ok(()));

        let connected = establish(&backend, &config).await.unwrap();
        assert_eq!(connected.ssid, "Quad_77");
    }

    #[test]
    fn test_session_options_defaults() {
        let options = session_options(&Config::default()).unwrap();
        assert_eq!(options.tick_interval, Duration::from_millis(50));
        assert_eq!(options.disarm_grace, Duration::from_millis(1000));
        assert_eq!(options.wake_packet, wake_packet());
        assert_eq!(options.template, neutral_template());
    }

    #[test]
    fn test_session_options_overrides() {
        let config = Config::from_toml(
            r#"
[session]
disarm_grace_ms = 2000

[protocol]
wake_packet = [0xAA]
neutral_template = [0, 0, 0, 0, 0, 0, 0, 0, 0x10, 0x20, 0x00, 0x40, 0x00, 0x70]
"#,
        )
        .unwrap();

        let options = session_options(&config).unwrap();
        assert_eq!(options.disarm_grace, Duration::from_millis(2000));
        assert_eq!(options.wake_packet, vec![0xAA]);
        assert_eq!(options.template.checksum(), 0x70);
    }
}

//! # Drone Network Pairing
//!
//! Joins the drone's open access point. There is no retry here; a caller that
//! wants another attempt calls [`pair`] again.

use std::time::Duration;
use tracing::{info, warn};

use super::{WifiBackend, WifiNetwork};
use crate::error::{HelicLinkError, Result};

/// Proof that the host is associated with the drone network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connected {
    pub ssid: String,
    pub bssid: String,
}

/// Associate with `network` without a credential
///
/// # Arguments
///
/// * `backend` - Host Wi-Fi stack
/// * `network` - Network chosen by discovery
/// * `timeout` - Upper bound on the association wait
///
/// # Errors
///
/// Returns `Pairing` error if the backend rejects the association or the
/// timeout elapses first.
pub async fn pair<B>(backend: &B, network: &WifiNetwork, timeout: Duration) -> Result<Connected>
where
    B: WifiBackend + ?Sized,
{
    info!("Connecting to \"{}\" ({})", network.ssid, network.bssid);

    if !network.is_open() {
        warn!(
            "Network \"{}\" advertises security \"{}\", trying without a password anyway",
            network.ssid, network.security
        );
    }

    match tokio::time::timeout(timeout, backend.connect(network)).await {
        Ok(Ok(())) => {
            info!("Associated with \"{}\"", network.ssid);
            Ok(Connected {
                ssid: network.ssid.clone(),
                bssid: network.bssid.clone(),
            })
        }
        Ok(Err(e @ HelicLinkError::Pairing { .. })) => Err(e),
        Ok(Err(other)) => Err(HelicLinkError::Pairing {
            ssid: network.ssid.clone(),
            reason: other.to_string(),
        }),
        Err(_) => Err(HelicLinkError::Pairing {
            ssid: network.ssid.clone(),
            reason: format!("association timed out after {} ms", timeout.as_millis()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wifi::MockWifiBackend;
    use async_trait::async_trait;

    fn drone() -> WifiNetwork {
        WifiNetwork::open("HelicMax-3021", "AA:BB:CC:DD:EE:FF")
    }

    /// Backend whose association never completes
    struct HangingBackend;

    #[async_trait]
    impl WifiBackend for HangingBackend {
        async fn scan(&self) -> Result<Vec<WifiNetwork>> {
            Ok(vec![])
        }

        async fn connect(&self, _network: &WifiNetwork) -> Result<()> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_pair_success() {
        let mut backend = MockWifiBackend::new();
        backend
            .expect_connect()
            .withf(|network| network.ssid == "HelicMax-3021")
            .times(1)
            .returning(|_| Ok(()));

        let connected = pair(&backend, &drone(), Duration::from_secs(5)).await.unwrap();
        assert_eq!(connected.ssid, "HelicMax-3021");
        assert_eq!(connected.bssid, "AA:BB:CC:DD:EE:FF");
    }

    #[tokio::test]
    async fn test_pair_rejected() {
        let mut backend = MockWifiBackend::new();
        backend.expect_connect().returning(|network| {
            Err(HelicLinkError::Pairing {
                ssid: network.ssid.clone(),
                reason: "driver rejected association".into(),
            })
        });

        let err = pair(&backend, &drone(), Duration::from_secs(5)).await.unwrap_err();
        match err {
            HelicLinkError::Pairing { ssid, reason } => {
                assert_eq!(ssid, "HelicMax-3021");
                assert!(reason.contains("rejected"));
            }
            other => panic!("Expected Pairing error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_pair_wraps_other_errors() {
        let mut backend = MockWifiBackend::new();
        backend.expect_connect().returning(|_| {
            Err(HelicLinkError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "not authorized",
            )))
        });

        let err = pair(&backend, &drone(), Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, HelicLinkError::Pairing { .. }));
        assert!(err.to_string().contains("not authorized"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pair_timeout() {
        let err = pair(&HangingBackend, &drone(), Duration::from_millis(500))
            .await
            .unwrap_err();

        match err {
            HelicLinkError::Pairing { reason, .. } => assert!(reason.contains("timed out")),
            other => panic!("Expected Pairing error, got: {:?}", other),
        }
    }
}

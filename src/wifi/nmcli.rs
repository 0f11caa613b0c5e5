//! # NetworkManager Backend
//!
//! [`WifiBackend`] implementation driving the `nmcli` command line tool.
//!
//! Scans use terse output (`-t`), where fields are separated by `:` and any
//! literal `:` or `\` inside a field is backslash-escaped, e.g.
//!
//! ```text
//! HelicMax-3021:AA\:BB\:CC\:DD\:EE\:FF:72:
//! HomeWifi:11\:22\:33\:44\:55\:66:54:WPA2
//! ```

use async_trait::async_trait;
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

use super::{WifiBackend, WifiNetwork};
use crate::error::{HelicLinkError, Result};

/// NetworkManager CLI binary
const NMCLI: &str = "nmcli";

/// Fields requested from `nmcli device wifi list`, in output order
const SCAN_FIELDS: &str = "SSID,BSSID,SIGNAL,SECURITY";

/// Wi-Fi backend using NetworkManager
#[derive(Debug, Clone, Default)]
pub struct NmcliBackend {
    /// Interface to use, `None` for any
    interface: Option<String>,
}

impl NmcliBackend {
    pub fn new(interface: Option<&str>) -> Self {
        Self {
            interface: interface.map(str::to_string),
        }
    }

    fn scan_args(&self) -> Vec<String> {
        let mut args: Vec<String> = [
            "--terse", "--escape", "yes", "--fields", SCAN_FIELDS, "device", "wifi", "list",
            "--rescan", "yes",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        if let Some(iface) = &self.interface {
            args.push("ifname".to_string());
            args.push(iface.clone());
        }
        args
    }

    fn connect_args(&self, network: &WifiNetwork) -> Vec<String> {
        let mut args = vec![
            "device".to_string(),
            "wifi".to_string(),
            "connect".to_string(),
            network.ssid.clone(),
        ];

        if let Some(iface) = &self.interface {
            args.push("ifname".to_string());
            args.push(iface.clone());
        }
        args
    }
}

#[async_trait]
impl WifiBackend for NmcliBackend {
    async fn scan(&self) -> Result<Vec<WifiNetwork>> {
        let output = run_nmcli(&self.scan_args())
            .await
            .map_err(|e| HelicLinkError::Scan(format!("could not run {}: {}", NMCLI, e)))?;

        if !output.status.success() {
            return Err(HelicLinkError::Scan(stderr_message(&output)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_scan_output(&stdout))
    }

    async fn connect(&self, network: &WifiNetwork) -> Result<()> {
        let output = run_nmcli(&self.connect_args(network))
            .await
            .map_err(|e| HelicLinkError::Pairing {
                ssid: network.ssid.clone(),
                reason: format!("could not run {}: {}", NMCLI, e),
            })?;

        if !output.status.success() {
            return Err(HelicLinkError::Pairing {
                ssid: network.ssid.clone(),
                reason: stderr_message(&output),
            });
        }
        Ok(())
    }
}

async fn run_nmcli(args: &[String]) -> std::io::Result<Output> {
    debug!("Running {} {}", NMCLI, args.join(" "));

    Command::new(NMCLI)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
}

fn stderr_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let message = stderr.trim();
    if message.is_empty() {
        format!("{} exited with {}", NMCLI, output.status)
    } else {
        message.to_string()
    }
}

/// Parse terse `nmcli device wifi list` output
///
/// Lines with a missing field or an empty SSID (hidden networks) are skipped.
pub fn parse_scan_output(stdout: &str) -> Vec<WifiNetwork> {
    stdout
        .lines()
        .filter_map(|line| {
            let fields = split_terse_line(line);
            if fields.len() < 4 || fields[0].is_empty() {
                return None;
            }

            Some(WifiNetwork {
                ssid: fields[0].clone(),
                bssid: fields[1].clone(),
                signal: fields[2].parse().ok(),
                security: fields[3].clone(),
            })
        })
        .collect()
}

/// Split one terse line on unescaped `:` and drop the escapes
fn split_terse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            ':' => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);

    fields
}

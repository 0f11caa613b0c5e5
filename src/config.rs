//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use crate::error::{HelicLinkError, Result};
use crate::protocol::ControlFrame;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub drone: DroneConfig,
    #[serde(default)]
    pub wifi: WifiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub protocol: ProtocolConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Drone addressing
#[derive(Debug, Deserialize, Clone)]
pub struct DroneConfig {
    #[serde(default = "default_drone_address")]
    pub address: IpAddr,

    #[serde(default = "default_control_port")]
    pub control_port: u16,

    #[serde(default = "default_ssid_prefix")]
    pub ssid_prefix: String,
}

/// Host Wi-Fi configuration
#[derive(Debug, Deserialize, Clone)]
pub struct WifiConfig {
    /// Interface to scan and connect with, empty for any
    #[serde(default)]
    pub interface: String,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

/// Control session timing
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    #[serde(default = "default_disarm_grace_ms")]
    pub disarm_grace_ms: u64,

    #[serde(default = "default_status_interval_frames")]
    pub status_interval_frames: u64,
}

/// Gamepad configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ControllerConfig {
    #[serde(default = "default_controller_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub device_path: String,

    #[serde(default = "default_deadzone_stick")]
    pub deadzone_stick: f32,

    #[serde(default = "default_expo_horizontal")]
    pub expo_horizontal: f32,

    #[serde(default = "default_expo_vertical")]
    pub expo_vertical: f32,

    #[serde(default = "default_expo_throttle")]
    pub expo_throttle: f32,
}

/// Wire format overrides
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProtocolConfig {
    #[serde(default)]
    pub wake_packet: Option<Vec<u8>>,

    #[serde(default)]
    pub neutral_template: Option<Vec<u8>>,
}

/// Log output configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    /// Directory for daily rolling log files, empty for stdout only
    #[serde(default)]
    pub log_dir: String,
}

// Default value functions
fn default_drone_address() -> IpAddr { IpAddr::from([192, 168, 0, 1]) }
fn default_control_port() -> u16 { 40000 }
fn default_ssid_prefix() -> String { "HelicMax-".to_string() }

fn default_connect_timeout_ms() -> u64 { 30_000 }

fn default_tick_interval_ms() -> u64 { 50 }
fn default_disarm_grace_ms() -> u64 { 1000 }
fn default_status_interval_frames() -> u64 { 200 }

fn default_controller_enabled() -> bool { true }
fn default_deadzone_stick() -> f32 { 0.05 }
fn default_expo_horizontal() -> f32 { 0.3 }
fn default_expo_vertical() -> f32 { 0.3 }
fn default_expo_throttle() -> f32 { 0.0 }

impl Default for DroneConfig {
    fn default() -> Self {
        Self {
            address: default_drone_address(),
            control_port: default_control_port(),
            ssid_prefix: default_ssid_prefix(),
        }
    }
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            interface: String::new(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            disarm_grace_ms: default_disarm_grace_ms(),
            status_interval_frames: default_status_interval_frames(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            enabled: default_controller_enabled(),
            device_path: String::new(),
            deadzone_stick: default_deadzone_stick(),
            expo_horizontal: default_expo_horizontal(),
            expo_vertical: default_expo_vertical(),
            expo_throttle: default_expo_throttle(),
        }
    }
}

impl DroneConfig {
    /// UDP destination for control datagrams
    pub fn control_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.control_port)
    }
}

impl WifiConfig {
    /// Interface name, `None` when any interface may be used
    pub fn interface(&self) -> Option<&str> {
        if self.interface.is_empty() {
            None
        } else {
            Some(&self.interface)
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl SessionConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn disarm_grace(&self) -> Duration {
        Duration::from_millis(self.disarm_grace_ms)
    }
}

impl ProtocolConfig {
    /// Template override parsed into a frame, if one is configured
    ///
    /// # Errors
    ///
    /// Returns `Protocol` error if the override is not a valid 14-byte frame.
    pub fn template(&self) -> Result<Option<ControlFrame>> {
        self.neutral_template
            .as_deref()
            .map(ControlFrame::from_bytes)
            .transpose()
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use helicmax_link::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.drone.control_port == 0 {
            return Err(invalid("control_port must be greater than 0"));
        }

        if self.drone.ssid_prefix.is_empty() {
            return Err(invalid("ssid_prefix cannot be empty"));
        }

        if self.wifi.connect_timeout_ms == 0 || self.wifi.connect_timeout_ms > 120_000 {
            return Err(invalid("connect_timeout_ms must be between 1 and 120000"));
        }

        if self.session.tick_interval_ms < 10 || self.session.tick_interval_ms > 1000 {
            return Err(invalid("tick_interval_ms must be between 10 and 1000"));
        }

        if self.session.disarm_grace_ms < 100 || self.session.disarm_grace_ms > 10_000 {
            return Err(invalid("disarm_grace_ms must be between 100 and 10000"));
        }

        if self.session.status_interval_frames == 0 {
            return Err(invalid("status_interval_frames must be greater than 0"));
        }

        if !(0.0..=0.25).contains(&self.controller.deadzone_stick) {
            return Err(invalid("deadzone_stick must be between 0.0 and 0.25"));
        }

        for (name, value) in [
            ("expo_horizontal", self.controller.expo_horizontal),
            ("expo_vertical", self.controller.expo_vertical),
            ("expo_throttle", self.controller.expo_throttle),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{} must be between 0.0 and 1.0", name)));
            }
        }

        if let Some(wake) = &self.protocol.wake_packet {
            if wake.is_empty() {
                return Err(invalid("wake_packet cannot be empty"));
            }
        }

        if let Err(e) = self.protocol.template() {
            return Err(invalid(format!("neutral_template is invalid: {}", e)));
        }

        Ok(())
    }
}

fn invalid(msg: impl std::fmt::Display) -> HelicLinkError {
    HelicLinkError::Config(toml::de::Error::custom(msg))
}

//! # Error Types
//!
//! Custom error types for HelicMax Link using `thiserror`.

use thiserror::Error;

/// Main error type for HelicMax Link
#[derive(Debug, Error)]
pub enum HelicLinkError {
    /// Wireless interface could not be queried
    #[error("Wi-Fi scan failed: {0}")]
    Scan(String),

    /// No visible network matched the drone naming pattern
    #[error("No drone network found matching \"{0}<digits>\"")]
    TargetNotFound(String),

    /// Association with the drone network failed
    #[error("Could not connect to drone network \"{ssid}\": {reason}")]
    Pairing { ssid: String, reason: String },

    /// UDP control channel could not be bound or connected
    #[error("Could not open control channel to {addr}: {source}")]
    ChannelOpen {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// A single datagram send failed
    #[error("Failed to transmit datagram: {0}")]
    Transmit(#[source] std::io::Error),

    /// Control frame layout errors
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Gamepad errors
    #[error("Controller error: {0}")]
    Controller(String),

    /// No supported gamepad connected
    #[error("No PS5 DualSense controller found")]
    ControllerNotFound,

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HelicLinkError {
    /// Whether this error aborts session establishment.
    ///
    /// Everything except a single failed transmit is fatal.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, HelicLinkError::Transmit(_))
    }
}

/// Result type alias for HelicMax Link
pub type Result<T> = std::result::Result<T, HelicLinkError>;

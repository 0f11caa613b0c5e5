//! # HelicMax Link Library
//!
//! Fly a HelicMax toy quadcopter from a Linux host over its Wi-Fi control
//! protocol.
//!
//! This library finds and joins the drone's access point, sends the wake
//! handshake, streams 14-byte control frames over UDP at a fixed cadence, and
//! disarms the drone on shutdown.

pub mod config;
pub mod error;
pub mod input;
pub mod link;
pub mod protocol;
pub mod session;
pub mod transport;
pub mod wifi;

//! # HelicMax Control Protocol Module
//!
//! Wire format for the drone's UDP control plane.
//!
//! This module handles:
//! - The one-shot wake packet sent before any control frame
//! - The 14-byte neutral frame template
//! - Stamping axis/throttle values into a frame
//! - XOR checksum calculation and validation

pub mod axis;
pub mod checksum;
pub mod encoder;
pub mod frame;

pub use axis::AxisState;
pub use encoder::{encode_disarm_frame, encode_frame};
pub use frame::{neutral_template, wake_packet, ControlFrame};

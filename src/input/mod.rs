//! # Input Module
//!
//! Sources of [`AxisState`] snapshots for the control session.
//!
//! This module handles:
//! - The non-blocking `InputProvider` read used once per transmit tick
//! - A watch-channel feed so input can be produced on another thread
//! - Deadzone and expo shaping of raw stick values
//! - PS5 DualSense gamepad input via evdev

pub mod calibration;
pub mod gamepad;

use tokio::sync::watch;

pub use crate::protocol::AxisState;

/// Non-blocking source of the latest stick state
///
/// Called once per tick for the whole session; must never wait for fresh
/// input.
pub trait InputProvider: Send + Sync {
    fn axis_state(&self) -> AxisState;
}

/// A fixed snapshot, e.g. rest state when no gamepad is attached
impl InputProvider for AxisState {
    fn axis_state(&self) -> AxisState {
        *self
    }
}

/// Writing half of an axis feed
#[derive(Debug)]
pub struct AxisPublisher {
    tx: watch::Sender<AxisState>,
}

impl AxisPublisher {
    /// Replace the current snapshot. Never blocks, even with no readers.
    pub fn publish(&self, state: AxisState) {
        self.tx.send_replace(state);
    }
}

/// Reading half of an axis feed, always yields the latest snapshot
#[derive(Debug, Clone)]
pub struct AxisFeed {
    rx: watch::Receiver<AxisState>,
}

impl InputProvider for AxisFeed {
    fn axis_state(&self) -> AxisState {
        *self.rx.borrow()
    }
}

/// Create a publisher/feed pair starting at the rest state
///
/// # Examples
///
/// ```
/// use helicmax_link::input::{axis_channel, AxisState, InputProvider};
///
/// let (publisher, feed) = axis_channel();
/// assert_eq!(feed.axis_state(), AxisState::REST);
///
/// publisher.publish(AxisState::new(0.0, 0.5, 1.0));
/// assert_eq!(feed.axis_state().vertical, 0.5);
/// ```
pub fn axis_channel() -> (AxisPublisher, AxisFeed) {
    let (tx, rx) = watch::channel(AxisState::REST);
    (AxisPublisher { tx }, AxisFeed { rx })
}

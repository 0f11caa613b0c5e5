//! # Control Session Module
//!
//! Drives one flight from wake handshake to disarm.
//!
//! ```text
//! Idle -> Handshaking -> Streaming -> Disarming -> Terminated
//! ```
//!
//! - **Handshaking**: wake packet once, then one rest-state frame
//! - **Streaming**: one encoded frame per tick, strictly in tick order
//! - **Disarming**: one zero-throttle frame immediately, then a fixed grace
//!   delay so it can reach the drone (nothing is ever acknowledged)
//!
//! A single task owns the sink, so there is exactly one sender on the wire.

pub mod shutdown;

use chrono::{DateTime, Local};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{HelicLinkError, Result};
use crate::input::InputProvider;
use crate::protocol::{
    encode_disarm_frame, encode_frame, neutral_template, wake_packet, AxisState, ControlFrame,
};
use crate::transport::{DatagramSink, UdpChannel};

pub use shutdown::ShutdownHandle;

/// Shortest tick period the stream loop will run at
const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Session lifecycle. Transitions only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionState {
    Idle,
    Handshaking,
    Streaming,
    Disarming,
    Terminated,
}

/// What happened during a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub started_at: DateTime<Local>,
    /// Control frames sent, including the baseline and disarm frames
    pub frames_sent: u64,
    pub transmit_failures: u64,
    pub final_state: SessionState,
}

/// Timing and wire template for a session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub tick_interval: Duration,
    pub disarm_grace: Duration,
    /// Log a status line every this many streamed frames
    pub status_interval_frames: u64,
    pub wake_packet: Vec<u8>,
    pub template: ControlFrame,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

impl SessionOptions {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            tick_interval: config.tick_interval(),
            disarm_grace: config.disarm_grace(),
            status_interval_frames: config.status_interval_frames,
            wake_packet: wake_packet().to_vec(),
            template: neutral_template(),
        }
    }
}

/// Live control session with the drone
pub struct ControlSession<S> {
    sink: S,
    state: SessionState,
    shutdown: ShutdownHandle,
    options: SessionOptions,
    report: SessionReport,
}

impl<S> std::fmt::Debug for ControlSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlSession")
            .field("state", &self.state)
            .field("frames_sent", &self.report.frames_sent)
            .finish_non_exhaustive()
    }
}

impl ControlSession<UdpChannel> {
    /// Open the UDP channel to the drone and create an idle session
    ///
    /// # Errors
    ///
    /// Returns `ChannelOpen` if the channel cannot be opened. Nothing has
    /// been sent at that point.
    pub async fn open(
        peer: SocketAddr,
        options: SessionOptions,
        shutdown: ShutdownHandle,
    ) -> Result<Self> {
        info!("Opening control socket to drone...");
        let channel = UdpChannel::open(peer).await?;
        Ok(Self::new(channel, options, shutdown))
    }
}

impl<S: DatagramSink> ControlSession<S> {
    pub fn new(sink: S, options: SessionOptions, shutdown: ShutdownHandle) -> Self {
        Self {
            sink,
            state: SessionState::Idle,
            shutdown,
            options,
            report: SessionReport {
                started_at: Local::now(),
                frames_sent: 0,
                transmit_failures: 0,
                final_state: SessionState::Idle,
            },
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Handle for requesting shutdown from elsewhere
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Run the whole session: handshake, stream until shutdown, disarm
    ///
    /// # Errors
    ///
    /// Returns `Transmit` if a handshake datagram cannot be sent. Send
    /// failures after the handshake are logged and counted, never returned.
    pub async fn run<I>(mut self, input: &I) -> Result<SessionReport>
    where
        I: InputProvider + ?Sized,
    {
        self.handshake().await?;
        self.stream(input).await;
        self.disarm().await;
        Ok(self.report)
    }

    /// Idle -> Handshaking -> Streaming
    ///
    /// Sends the wake packet and then one rest-state frame as a baseline.
    /// No acknowledgment is awaited.
    pub async fn handshake(&mut self) -> Result<()> {
        self.transition(SessionState::Handshaking);

        self.sink
            .send(&self.options.wake_packet)
            .await
            .map_err(HelicLinkError::Transmit)?;
        info!("Connected to drone!");

        let baseline = encode_frame(&self.options.template, &AxisState::REST);
        self.sink
            .send(baseline.as_bytes())
            .await
            .map_err(HelicLinkError::Transmit)?;
        self.report.frames_sent += 1;

        self.transition(SessionState::Streaming);
        Ok(())
    }

    /// Streaming: one frame per tick until shutdown is requested
    ///
    /// The first tick fires one interval after the baseline frame. Late ticks
    /// are not caught up. A zero interval runs at [`MIN_TICK_INTERVAL`].
    pub async fn stream<I>(&mut self, input: &I)
    where
        I: InputProvider + ?Sized,
    {
        let period = self.options.tick_interval.max(MIN_TICK_INTERVAL);
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Streaming control frames every {} ms", period.as_millis());

        let shutdown = self.shutdown.clone();
        let mut streamed: u64 = 0;

        loop {
            tokio::select! {
                biased;

                _ = shutdown.wait() => break,

                _ = ticker.tick() => {
                    if shutdown.is_requested() {
                        break;
                    }

                    let axis = input.axis_state();
                    let frame = encode_frame(&self.options.template, &axis);
                    self.transmit(&frame).await;

                    streamed += 1;
                    if streamed % self.options.status_interval_frames.max(1) == 0 {
                        info!(
                            "Sent {} frames ({} failed), last h={} v={} t={}",
                            self.report.frames_sent,
                            self.report.transmit_failures,
                            frame.horizontal(),
                            frame.vertical(),
                            frame.throttle()
                        );
                    }
                }
            }
        }
    }

    /// Streaming -> Disarming -> Terminated
    ///
    /// Sends exactly one disarm frame right away, waits out the grace delay,
    /// then terminates.
    pub async fn disarm(&mut self) {
        if self.state >= SessionState::Disarming {
            return;
        }
        self.transition(SessionState::Disarming);
        info!("Shutting down drone...");

        let frame = encode_disarm_frame(&self.options.template);
        self.transmit(&frame).await;

        sleep(self.options.disarm_grace).await;
        self.transition(SessionState::Terminated);

        info!(
            "Session ended: {} frames sent, {} failed",
            self.report.frames_sent, self.report.transmit_failures
        );
    }

    /// Send one frame, logging failures instead of returning them
    async fn transmit(&mut self, frame: &ControlFrame) {
        debug_assert!(frame.verify().is_ok(), "encoder produced a bad checksum");

        match self.sink.send(frame.as_bytes()).await {
            Ok(_) => {
                self.report.frames_sent += 1;
                debug!(
                    "Frame h={} v={} t={} sum=0x{:02x}",
                    frame.horizontal(),
                    frame.vertical(),
                    frame.throttle(),
                    frame.checksum()
                );
            }
            Err(e) => {
                self.report.transmit_failures += 1;
                warn!("{}", HelicLinkError::Transmit(e));
            }
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug_assert!(next > self.state, "{:?} -> {:?}", self.state, next);
        debug!("Session {:?} -> {:?}", self.state, next);
        self.state = next;
        self.report.final_state = next;
    }
}

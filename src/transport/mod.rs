//! # Transport Module
//!
//! UDP datagram channel to the drone's control plane.
//!
//! This module handles:
//! - Binding a local socket and fixing the drone as its only peer
//! - Fire-and-forget datagram sends (nothing is ever read back)

pub mod sink;

use tokio::net::UdpSocket;
use tracing::{debug, info};

use crate::error::{HelicLinkError, Result};
use std::net::SocketAddr;

pub use sink::DatagramSink;

/// Connected UDP socket to the drone
pub struct UdpChannel {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl std::fmt::Debug for UdpChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpChannel")
            .field("peer", &self.peer)
            .finish_non_exhaustive()
    }
}

impl UdpChannel {
    /// Open a channel to the drone
    ///
    /// Binds an ephemeral local port and connects it to `peer`, so every
    /// later send goes to the drone and nowhere else.
    ///
    /// # Errors
    ///
    /// Returns `ChannelOpen` if the socket cannot be bound or connected
    /// (e.g. the host has no route to the drone network).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use helicmax_link::transport::UdpChannel;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let channel = UdpChannel::open("192.168.0.1:40000".parse()?).await?;
    ///     println!("Sending to {}", channel.peer());
    ///     Ok(())
    /// }
    /// ```
    pub async fn open(peer: SocketAddr) -> Result<Self> {
        let local: SocketAddr = if peer.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };

        let socket = UdpSocket::bind(local)
            .await
            .map_err(|source| HelicLinkError::ChannelOpen { addr: peer, source })?;

        socket
            .connect(peer)
            .await
            .map_err(|source| HelicLinkError::ChannelOpen { addr: peer, source })?;

        match socket.local_addr() {
            Ok(local) => info!("Control channel open {} -> {}", local, peer),
            Err(_) => info!("Control channel open to {}", peer),
        }

        Ok(Self { socket, peer })
    }

    /// Drone address this channel sends to
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

#[async_trait::async_trait]
impl DatagramSink for UdpChannel {
    async fn send(&mut self, datagram: &[u8]) -> std::io::Result<usize> {
        let sent = self.socket.send(datagram).await?;
        debug!("Sent datagram ({} bytes) to {}", sent, self.peer);
        Ok(sent)
    }
}

//! Trait abstraction for datagram sends to enable testing

use async_trait::async_trait;
use std::io;

/// Anything that can carry one datagram to the drone
#[async_trait]
pub trait DatagramSink: Send {
    /// Send one whole datagram, returning the number of bytes sent
    async fn send(&mut self, datagram: &[u8]) -> io::Result<usize>;
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    /// Mock sink recording every datagram with its send time
    #[derive(Clone)]
    pub struct RecordingSink {
        pub sent: Arc<Mutex<Vec<(Instant, Vec<u8>)>>>,
        pub send_error: Arc<Mutex<Option<io::ErrorKind>>>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                send_error: Arc::new(Mutex::new(None)),
            }
        }

        pub fn datagrams(&self) -> Vec<Vec<u8>> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|(_, data)| data.clone())
                .collect()
        }

        pub fn timestamps(&self) -> Vec<Instant> {
            self.sent.lock().unwrap().iter().map(|(at, _)| *at).collect()
        }

        pub fn set_send_error(&self, error: Option<io::ErrorKind>) {
            *self.send_error.lock().unwrap() = error;
        }
    }

    #[async_trait]
    impl DatagramSink for RecordingSink {
        async fn send(&mut self, datagram: &[u8]) -> io::Result<usize> {
            if let Some(error) = *self.send_error.lock().unwrap() {
                return Err(io::Error::new(error, "Mock send error"));
            }
            self.sent
                .lock()
                .unwrap()
                .push((Instant::now(), datagram.to_vec()));
            Ok(datagram.len())
        }
    }
}

//! Host network-link adapter.
//!
//! The host is assumed to be online; the link state is simulated so the
//! reconnect path can be exercised.  One reconnect attempt in ten fails,
//! the way a flaky access point does.

use std::io;

use log::{info, warn};

use crate::app::ports::LinkPort;

pub struct HostLink {
    connected: bool,
    attempts: u32,
}

impl Default for HostLink {
    fn default() -> Self {
        Self::new()
    }
}

impl HostLink {
    pub fn new() -> Self {
        Self {
            connected: true,
            attempts: 0,
        }
    }

    /// Simulate losing the link.
    pub fn drop_link(&mut self) {
        warn!("Link(sim): link dropped");
        self.connected = false;
    }
}

impl LinkPort for HostLink {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn reconnect(&mut self) -> io::Result<()> {
        self.attempts = self.attempts.wrapping_add(1);
        if self.attempts % 10 == 3 {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "simulated association failure",
            ));
        }
        self.connected = true;
        info!("Link(sim): connected (attempt {})", self.attempts);
        Ok(())
    }

    /// The host clock is already disciplined by the OS.
    fn sync_time(&mut self) -> io::Result<()> {
        if !self.connected {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "link down"));
        }
        Ok(())
    }
}

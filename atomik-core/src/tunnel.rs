//! Adapter between a device and a host-supplied byte transport.
//!
//! The transport is any duplex `Read`/`Write` channel (a connected socket,
//! a pipe, an in-memory buffer). Socket setup is the host's business.

use std::io::{self, Read, Write};

use rand::RngCore;
use thiserror::Error;
use tracing::{debug, info};

use crate::channel::Transmission;
use crate::device::Device;
use crate::error::HalError;

/// Largest inbound chunk surfaced per receive
pub const INBOUND_CHUNK: usize = 511;

/// Tunnel failure.
#[derive(Debug, Error)]
pub enum TunnelError {
    /// The device refused the send.
    #[error(transparent)]
    Hal(#[from] HalError),
    /// The transport failed.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
}

/// Raw inbound bytes, rendered for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Bytes received
    pub len: usize,
    /// Lossy UTF-8 rendering
    pub text: String,
}

/// Secure tunnel over a transport `T`.
#[derive(Debug)]
pub struct Tunnel<T> {
    transport: T,
}

impl<T> Tunnel<T> {
    /// Wrap a connected transport
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Borrow the transport
    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Unwrap the transport
    pub fn into_inner(self) -> T {
        self.transport
    }
}

impl<T: Write> Tunnel<T> {
    /// Pass `msg` through the device's secure channel, then transmit it.
    ///
    /// Nothing is written when the device rejects the send.
    pub fn send<R: RngCore>(
        &mut self,
        device: &mut Device<R>,
        msg: &[u8],
    ) -> Result<Transmission, TunnelError> {
        let tx = device.secure_send(msg)?;
        self.transport.write_all(msg)?;
        self.transport.flush()?;
        info!(bytes = msg.len(), preview = %tx.preview, "sent via tunnel");
        Ok(tx)
    }
}

impl<T: Read> Tunnel<T> {
    /// Poll the transport once.
    ///
    /// Returns `None` if nothing is pending, including on `WouldBlock` from a
    /// non-blocking transport.
    pub fn receive(&mut self) -> Result<Option<IncomingMessage>, TunnelError> {
        let mut buf = [0u8; INBOUND_CHUNK];
        let len = match self.transport.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        debug!(len, "incoming via tunnel");
        Ok(Some(IncomingMessage {
            len,
            text: String::from_utf8_lossy(&buf[..len]).into_owned(),
        }))
    }
}

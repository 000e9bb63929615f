//! Serial driver tying the extractor and decoder to a device handle.

use crate::{
    command::ConfigCommand,
    error::{Error, Result},
    frame::FrameExtractor,
    reading::{Reading, Timestamp},
};
use embedded_io::Error as _;

/// Most frames one poll will hand back. At the device's emission rate this is
/// far more than a 1024-byte buffer can hold anyway.
pub const MAX_READINGS_PER_POLL: usize = 8;

/// You can create a TriSense driver using any interface which implements
/// [embedded_io::Read] & [embedded_io::Write].
///
/// The driver is pull-based and single-owner: call [`TriSense::poll`] on each
/// tick of whatever scheduler the embedding system uses (timer, thread, async
/// task). `N` sizes the frame accumulation buffer.
pub struct TriSense<S: embedded_io::Read + embedded_io::Write, const N: usize = 1024> {
    interface: S,
    extractor: FrameExtractor<N>,
}

impl<S: embedded_io::Read + embedded_io::Write, const N: usize> TriSense<S, N> {
    /// Create a new driver over the given serial interface.
    pub fn new(interface: S) -> Self {
        Self {
            interface,
            extractor: FrameExtractor::new(),
        }
    }

    /// Drain currently-available bytes and decode every complete frame.
    ///
    /// Never blocks beyond what the interface's `read` does: a `TimedOut` or
    /// `Other` (would-block) result ends the drain, any other read error is
    /// propagated. Partial frames stay buffered for the next poll. The caller
    /// supplies the capture instant stamped onto each reading.
    pub fn poll(
        &mut self,
        now: Timestamp,
    ) -> Result<heapless::Vec<Reading, MAX_READINGS_PER_POLL>, S::Error> {
        let mut chunk = [0u8; 32];
        loop {
            match self.interface.read(&mut chunk) {
                Ok(0) => break,
                Ok(bytes_read) => self.extractor.append(&chunk[..bytes_read]),
                Err(e) => {
                    if matches!(
                        e.kind(),
                        embedded_io::ErrorKind::Other | embedded_io::ErrorKind::TimedOut
                    ) {
                        break;
                    }
                    return Err(Error::SerialError(e));
                }
            }
        }

        let mut readings = heapless::Vec::new();
        while let Some(frame) = self.extractor.extract_frame() {
            if readings.push(Reading::decode(&frame, now)).is_err() {
                // Full; remaining frames stay buffered for the next poll.
                break;
            }
        }
        Ok(readings)
    }

    /// Write a configuration packet and wait for the device acknowledgement.
    ///
    /// The device answers each accepted packet with an `OK` line. No data at
    /// all is a [`Error::Timeout`]; anything else is [`Error::InvalidResponse`].
    pub fn send_config(&mut self, command: &ConfigCommand) -> Result<(), S::Error> {
        let packet = command.encode();
        self.interface
            .write_all(&packet)
            .map_err(Error::SerialError)?;

        let mut ack: heapless::Vec<u8, 16> = heapless::Vec::new();
        let mut chunk = [0u8; 8];
        loop {
            match self.interface.read(&mut chunk) {
                Ok(0) => break,
                Ok(bytes_read) => {
                    let _ = ack.extend_from_slice(&chunk[..bytes_read]);
                    if ack.len() >= 2 {
                        break;
                    }
                }
                Err(e) => {
                    if matches!(
                        e.kind(),
                        embedded_io::ErrorKind::Other | embedded_io::ErrorKind::TimedOut
                    ) {
                        break;
                    }
                    return Err(Error::SerialError(e));
                }
            }
        }

        if ack.is_empty() {
            Err(Error::Timeout)
        } else if ack.starts_with(b"OK") {
            Ok(())
        } else {
            Err(Error::InvalidResponse)
        }
    }

    /// Parse a raw UI triple and send it as a configuration packet.
    ///
    /// Convenience over [`ConfigCommand::parse`] + [`TriSense::send_config`]
    /// for embedders passing user input straight through; validation failures
    /// surface as [`Error::Protocol`].
    pub fn configure(&mut self, channel: &str, method: &str, value: &str) -> Result<(), S::Error> {
        let command = ConfigCommand::parse(channel, method, value)?;
        self.send_config(&command)
    }

    /// Extractor diagnostics (pending byte count, overflow counter).
    pub fn extractor(&self) -> &FrameExtractor<N> {
        &self.extractor
    }
}

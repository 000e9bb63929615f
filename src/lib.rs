//! This crate provides the wire protocol for the TriSense family of three-channel
//! source-measure units: framing of the byte-oriented serial stream, decoding of
//! per-channel telemetry (voltage, current, resistance, power) and encoding of the
//! outbound channel configuration packets.
//!
//! It supports `no-std` environments by use of the `no_std` feature flag.
//!
//! The protocol is marker-framed: telemetry frames are delimited by `<:` and `:>`,
//! with big-endian 16-bit registers at fixed offsets inside the frame. There is no
//! checksum; the stream may carry noise between frames and the extractor is
//! expected to skip over it.
//!
//! The serial port used for device comms should be configured like so:
//! * Baud rate: 115200
//! * Data bits: 8
//! * Stop bits: 1
//! * Parity: None
//!
//! Typical use: wrap the serial handle in [`device::TriSense`] and call
//! [`device::TriSense::poll`] on each tick, or drive [`frame::FrameExtractor`]
//! and [`reading::Reading::decode`] directly if you own the read loop.

#![cfg_attr(feature = "no_std", no_std)]

pub mod command;
pub mod device;
pub mod error;
pub mod frame;
pub mod reading;

#[cfg(test)]
mod mock_serial;

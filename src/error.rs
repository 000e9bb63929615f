//! Our error types for the TriSense protocol and driver.

use thiserror::Error;

pub type Result<T, I> = core::result::Result<T, Error<I>>;

/// Errors from the pure protocol layer (command validation and strict decoding).
///
/// These never involve I/O and can be produced in `no_std` contexts.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum ProtocolError {
    /// Channel identifier is not one of `CH1`..`CH3`.
    #[error("Invalid channel identifier")]
    InvalidChannel,
    /// Method identifier is not one of `I`, `R`, `P`.
    #[error("Invalid method identifier")]
    InvalidMethod,
    /// Setpoint value is not a number.
    #[error("Invalid setpoint value")]
    InvalidValue,
    /// Strict decoding only: the frame does not cover every register field.
    ///
    /// Lenient decoding ([`Reading::decode`](crate::reading::Reading::decode))
    /// zero-fills missing fields instead of returning this.
    #[error("Truncated frame: {len} bytes, {required} required")]
    TruncatedFrame { len: usize, required: usize },
}

/// Custom error type for TriSense device communications.
#[derive(Error, Debug)]
pub enum Error<I: embedded_io::Error> {
    #[error("Serial communication error")]
    SerialError(I),
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("Communication timeout")]
    Timeout,
    #[error("Invalid response received")]
    InvalidResponse,
}

//! Encoding of outbound channel configuration packets.
//!
//! The host configures one channel at a time: pick a working method (current,
//! resistance or power) and a 16-bit setpoint, and the device answers with an
//! `OK` line. The packet shares the frame markers and field separators with
//! the telemetry direction.

use crate::error::ProtocolError;
use crate::reading::{Channel, Method};

/// Fixed size of a configuration packet.
pub const PACKET_LEN: usize = 10;

/// A validated channel configuration: channel, working method and clamped
/// 16-bit setpoint. Build one with [`ConfigCommand::new`] or
/// [`ConfigCommand::parse`], then [`ConfigCommand::encode`] it for the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigCommand {
    pub channel: Channel,
    pub method: Method,
    pub value: u16,
}

impl ConfigCommand {
    /// Create a command from an already-typed channel and method.
    ///
    /// The value is clamped to `[0, 65535]` and truncated toward zero;
    /// out-of-range inputs are not rejected. `NaN` is the one value that
    /// cannot be interpreted as a setpoint.
    pub fn new(channel: Channel, method: Method, value: f64) -> Result<Self, ProtocolError> {
        if value.is_nan() {
            return Err(ProtocolError::InvalidValue);
        }
        let value = value.clamp(0.0, f64::from(u16::MAX)) as u16;
        Ok(Self {
            channel,
            method,
            value,
        })
    }

    /// Create a command from the raw UI triple.
    ///
    /// Channel is `CH1`..`CH3`, method is one of the letters `I`/`R`/`P`,
    /// value is any decimal number. Each field reports its own error so the
    /// UI can point at the offending input.
    pub fn parse(channel: &str, method: &str, value: &str) -> Result<Self, ProtocolError> {
        let channel: Channel = channel.parse()?;
        let method: Method = method.parse()?;
        let value: f64 = value
            .trim()
            .parse()
            .map_err(|_| ProtocolError::InvalidValue)?;
        Self::new(channel, method, value)
    }

    /// Serialize to the 10-byte wire packet.
    ///
    /// Layout: `<` `:` channel-code `:` method-code `:` valueHi valueLo `:` `>`.
    /// Performs no I/O; writing the bytes and waiting for the device `OK` is
    /// the caller's job (see [`TriSense::send_config`](crate::device::TriSense::send_config)).
    pub fn encode(&self) -> [u8; PACKET_LEN] {
        let [hi, lo] = self.value.to_be_bytes();
        [
            b'<',
            b':',
            self.channel.code(),
            b':',
            self.method.code(),
            b':',
            hi,
            lo,
            b':',
            b'>',
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameExtractor;
    use strum::IntoEnumIterator;

    #[test]
    fn encodes_resistance_setpoint() {
        let cmd = ConfigCommand::parse("CH2", "R", "300").unwrap();
        assert_eq!(
            cmd.encode(),
            [b'<', b':', 2, b':', 2, b':', 0x01, 0x2C, b':', b'>']
        );
    }

    #[test]
    fn method_codes_follow_irp_order() {
        assert_eq!(Method::Current.code(), 1);
        assert_eq!(Method::Resistance.code(), 2);
        assert_eq!(Method::Power.code(), 3);
    }

    #[test]
    fn value_is_clamped_not_rejected() {
        let low = ConfigCommand::new(Channel::Ch1, Method::Current, -42.0).unwrap();
        assert_eq!(low.value, 0);

        let high = ConfigCommand::new(Channel::Ch1, Method::Current, 1e9).unwrap();
        assert_eq!(high.value, u16::MAX);
    }

    #[test]
    fn fractional_values_truncate_toward_zero() {
        let cmd = ConfigCommand::new(Channel::Ch3, Method::Power, 299.9).unwrap();
        assert_eq!(cmd.value, 299);
    }

    #[test]
    fn each_field_reports_its_own_error() {
        assert_eq!(
            ConfigCommand::parse("CH4", "R", "1").unwrap_err(),
            ProtocolError::InvalidChannel
        );
        assert_eq!(
            ConfigCommand::parse("CH1", "Q", "1").unwrap_err(),
            ProtocolError::InvalidMethod
        );
        assert_eq!(
            ConfigCommand::parse("CH1", "R", "volts").unwrap_err(),
            ProtocolError::InvalidValue
        );
        assert_eq!(
            ConfigCommand::new(Channel::Ch1, Method::Power, f64::NAN).unwrap_err(),
            ProtocolError::InvalidValue
        );
    }

    #[test]
    fn packet_round_trips_through_the_extractor() {
        // Marker symmetry: a command packet fed back as device input frames
        // cleanly, and an echo decode recovers channel, method and value.
        for channel in Channel::iter() {
            for method in Method::iter() {
                let cmd = ConfigCommand::new(channel, method, 4242.0).unwrap();
                let packet = cmd.encode();

                let mut ex: FrameExtractor = FrameExtractor::new();
                ex.append(&packet);
                let frame = ex.extract_frame().unwrap();
                assert_eq!(frame.as_slice(), packet.as_slice());
                assert!(ex.extract_frame().is_none());

                assert_eq!(frame[2], channel.code());
                assert_eq!(frame[4], method.code());
                assert_eq!(u16::from_be_bytes([frame[6], frame[7]]), cmd.value);
            }
        }
    }
}

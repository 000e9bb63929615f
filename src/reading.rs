//! Decoding of telemetry frames into per-channel measurements.
//!
//! A full frame carries three channels, each as a 10-byte group of big-endian
//! registers: voltage, current, the active working method (mode byte) and the
//! ancillary register `G`. `G` holds the device-side value for whichever
//! quantity the channel's method regulates, and replaces the derived value of
//! that quantity when the frame is decoded.

use core::str::FromStr;

use strum_macros::EnumIter;

use crate::error::ProtocolError;

/// Monotonic capture instant for a reading, in milliseconds.
///
/// Supplied by the caller on each decode; the decoder itself never reads a
/// clock, which keeps it pure and testable.
pub type Timestamp = fugit::TimerInstantU64<1_000>;

/// Scale applied to derived power: raw volts x raw amps reported in
/// milli-units. See DESIGN.md for the scale decision.
pub const POWER_SCALE: f64 = 1000.0;

/// Frame length needed to cover every register of all three channels.
pub const FULL_FRAME_LEN: usize = 31;

/// A measurement channel of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Channel {
    Ch1 = 1,
    Ch2 = 2,
    Ch3 = 3,
}

impl Channel {
    pub const COUNT: usize = 3;

    /// Wire code used in configuration packets.
    pub fn code(self) -> u8 {
        self as u8
    }

    pub(crate) fn index(self) -> usize {
        self as usize - 1
    }
}

impl FromStr for Channel {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("CH1") {
            Ok(Channel::Ch1)
        } else if s.eq_ignore_ascii_case("CH2") {
            Ok(Channel::Ch2)
        } else if s.eq_ignore_ascii_case("CH3") {
            Ok(Channel::Ch3)
        } else {
            Err(ProtocolError::InvalidChannel)
        }
    }
}

/// Working method of a channel: which quantity the device regulates.
///
/// The same codes serve both directions of the protocol: outbound as the
/// method byte of a configuration packet, inbound as the per-channel mode
/// byte of a telemetry frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Method {
    /// `I` - current setpoint.
    Current = 1,
    /// `R` - resistance setpoint.
    Resistance = 2,
    /// `P` - power setpoint.
    Power = 3,
}

impl Method {
    /// Wire code used in configuration packets and frame mode bytes.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Interpret a frame mode byte. Codes outside `1..=3` carry no override.
    pub fn from_code(code: u8) -> Option<Method> {
        match code {
            1 => Some(Method::Current),
            2 => Some(Method::Resistance),
            3 => Some(Method::Power),
            _ => None,
        }
    }

    /// The single-letter identifier shown in the device UI.
    pub fn letter(self) -> char {
        match self {
            Method::Current => 'I',
            Method::Resistance => 'R',
            Method::Power => 'P',
        }
    }
}

impl FromStr for Method {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "I" | "i" => Ok(Method::Current),
            "R" | "r" => Ok(Method::Resistance),
            "P" | "p" => Ok(Method::Power),
            _ => Err(ProtocolError::InvalidMethod),
        }
    }
}

/// Measurements of a single channel.
///
/// `voltage` and `current` are the raw 16-bit registers; `resistance` and
/// `power` are derived from them. When the channel's mode byte names a
/// method, the corresponding field (current, resistance or power) carries the
/// device-reported `G` register instead of the derived value. Voltage is never
/// overridden.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelReading {
    pub voltage: u16,
    pub current: u16,
    /// `voltage / current` in ohms when current is non-zero, else 0.
    pub resistance: f64,
    /// `voltage * current * 1000` (milli-scale), see [`POWER_SCALE`].
    pub power: f64,
}

/// One decoded telemetry frame: a capture timestamp plus all three channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub timestamp: Timestamp,
    channels: [ChannelReading; Channel::COUNT],
}

impl Reading {
    /// Decode a frame leniently.
    ///
    /// Offsets are fixed per channel `k` (0-based), markers included in the
    /// indexing: voltage at `10k+2`, current at `10k+5`, mode byte at `10k+8`,
    /// `G` at `10k+9`, all registers big-endian. Fields beyond the end of a
    /// short frame read as zero; legacy single-channel firmware sends 11-byte
    /// frames that populate CH1 only, and this decode never fails on them.
    ///
    /// Resistance and power are derived from the raw registers before the
    /// mode override is applied, so an overridden current does not feed back
    /// into the derived resistance.
    pub fn decode(frame: &[u8], timestamp: Timestamp) -> Reading {
        let mut channels = [ChannelReading::default(); Channel::COUNT];
        for (k, slot) in channels.iter_mut().enumerate() {
            let base = 10 * k;
            let voltage = reg16(frame, base + 2);
            let current = reg16(frame, base + 5);
            let mode = byte(frame, base + 8);
            let g = reg16(frame, base + 9);

            let mut reading = ChannelReading {
                voltage,
                current,
                resistance: if current != 0 {
                    f64::from(voltage) / f64::from(current)
                } else {
                    0.0
                },
                power: f64::from(voltage) * f64::from(current) * POWER_SCALE,
            };
            match Method::from_code(mode) {
                Some(Method::Current) => reading.current = g,
                Some(Method::Resistance) => reading.resistance = f64::from(g),
                Some(Method::Power) => reading.power = f64::from(g),
                None => {}
            }
            *slot = reading;
        }
        Reading {
            timestamp,
            channels,
        }
    }

    /// Decode a frame, rejecting any that does not cover every register.
    ///
    /// Opt-in alternative to [`Reading::decode`] for callers that want short
    /// frames surfaced as [`ProtocolError::TruncatedFrame`] instead of being
    /// zero-filled.
    pub fn decode_strict(frame: &[u8], timestamp: Timestamp) -> Result<Reading, ProtocolError> {
        if frame.len() < FULL_FRAME_LEN {
            return Err(ProtocolError::TruncatedFrame {
                len: frame.len(),
                required: FULL_FRAME_LEN,
            });
        }
        Ok(Self::decode(frame, timestamp))
    }

    /// Measurements of one channel.
    pub fn channel(&self, channel: Channel) -> &ChannelReading {
        &self.channels[channel.index()]
    }

    /// Iterate all channels in order.
    pub fn channels(&self) -> impl Iterator<Item = (Channel, &ChannelReading)> {
        use strum::IntoEnumIterator;
        Channel::iter().map(|ch| (ch, self.channel(ch)))
    }
}

fn reg16(frame: &[u8], at: usize) -> u16 {
    match frame.get(at..at + 2) {
        Some(bytes) => u16::from_be_bytes([bytes[0], bytes[1]]),
        None => 0,
    }
}

fn byte(frame: &[u8], at: usize) -> u8 {
    frame.get(at).copied().unwrap_or(0)
}

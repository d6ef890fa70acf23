//! MIDI message definitions
//!
//! Status byte classification, the decoded [`Message`] record and the
//! controller numbers used by the RPN/NRPN send sequences.
use heapless::Vec;

/// Lowest value of a pitch bend, maps to wheel fully down.
pub const PITCHBEND_MIN: i16 = -8192;
/// Highest value of a pitch bend, maps to wheel fully up.
pub const PITCHBEND_MAX: i16 = 8191;

/// 14-bit "null function" parameter number, deselects RPN/NRPN.
pub const RPN_NULL_FUNCTION: u16 = (0x7f << 7) + 0x7f;

/// Control Change numbers with a reserved meaning for this crate.
///
/// Only the controllers driven by the encoder's parameter-number sequences
/// are listed, see <http://www.somascape.org/midi/tech/spec.html#ctrlnums>
/// for the full map.
pub mod control_change {
    pub const DATA_ENTRY_MSB: u8 = 6;
    pub const DATA_ENTRY_LSB: u8 = 38;
    pub const DATA_INCREMENT: u8 = 96;
    pub const DATA_DECREMENT: u8 = 97;
    pub const NRPN_LSB: u8 = 98;
    pub const NRPN_MSB: u8 = 99;
    pub const RPN_LSB: u8 = 100;
    pub const RPN_MSB: u8 = 101;
}

/// Enumeration of MIDI message types.
///
/// Channel message discriminants carry the status high nibble (channel
/// nibble stripped), system common and real-time ones the full status byte.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(Debug))]
#[repr(u8)]
pub enum MidiType {
    /// For notifying errors
    InvalidType = 0x00,
    /// Note Off
    NoteOff = 0x80,
    /// Note On
    NoteOn = 0x90,
    /// Polyphonic AfterTouch
    AfterTouchPoly = 0xA0,
    /// Control Change / Channel Mode
    ControlChange = 0xB0,
    /// Program Change
    ProgramChange = 0xC0,
    /// Channel (monophonic) AfterTouch
    AfterTouchChannel = 0xD0,
    /// Pitch Bend
    PitchBend = 0xE0,
    /// System Exclusive (start)
    SystemExclusive = 0xF0,
    /// System Common - MIDI Time Code Quarter Frame
    TimeCodeQuarterFrame = 0xF1,
    /// System Common - Song Position Pointer
    SongPosition = 0xF2,
    /// System Common - Song Select
    SongSelect = 0xF3,
    /// System Common - Tune Request
    TuneRequest = 0xF6,
    /// System Exclusive End
    SystemExclusiveEnd = 0xF7,
    /// System Real Time - Timing Clock
    Clock = 0xF8,
    /// System Real Time - Start
    Start = 0xFA,
    /// System Real Time - Continue
    Continue = 0xFB,
    /// System Real Time - Stop
    Stop = 0xFC,
    /// System Real Time - Active Sensing
    ActiveSensing = 0xFE,
    /// System Real Time - System Reset
    SystemReset = 0xFF,
}

/// Byte count of a framed message of a given type.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub enum MessageLength {
    Single,
    Two,
    Three,
    /// System Exclusive, bounded by the configured capacity.
    Variable,
}

impl MidiType {
    /// Extract an enumerated MIDI type from a status byte.
    ///
    /// Data bytes (`< 0x80`) and the four undefined system bytes
    /// (`F4`/`F5`/`F9`/`FD`) map to [`MidiType::InvalidType`].
    pub fn from_status(status: u8) -> MidiType {
        match status {
            0x00..=0x7f | 0xf4 | 0xf5 | 0xf9 | 0xfd => MidiType::InvalidType,
            0x80..=0x8f => MidiType::NoteOff,
            0x90..=0x9f => MidiType::NoteOn,
            0xa0..=0xaf => MidiType::AfterTouchPoly,
            0xb0..=0xbf => MidiType::ControlChange,
            0xc0..=0xcf => MidiType::ProgramChange,
            0xd0..=0xdf => MidiType::AfterTouchChannel,
            0xe0..=0xef => MidiType::PitchBend,
            0xf0 => MidiType::SystemExclusive,
            0xf1 => MidiType::TimeCodeQuarterFrame,
            0xf2 => MidiType::SongPosition,
            0xf3 => MidiType::SongSelect,
            0xf6 => MidiType::TuneRequest,
            0xf7 => MidiType::SystemExclusiveEnd,
            0xf8 => MidiType::Clock,
            0xfa => MidiType::Start,
            0xfb => MidiType::Continue,
            0xfc => MidiType::Stop,
            0xfe => MidiType::ActiveSensing,
            0xff => MidiType::SystemReset,
        }
    }

    /// True exactly for the seven types carrying a 1-16 channel number.
    pub fn is_channel_message(self) -> bool {
        matches!(
            self,
            MidiType::NoteOff
                | MidiType::NoteOn
                | MidiType::AfterTouchPoly
                | MidiType::ControlChange
                | MidiType::ProgramChange
                | MidiType::AfterTouchChannel
                | MidiType::PitchBend
        )
    }

    /// True for the six single-byte types which may interleave inside any
    /// other in-progress message.
    pub fn is_real_time(self) -> bool {
        matches!(
            self,
            MidiType::Clock
                | MidiType::Start
                | MidiType::Continue
                | MidiType::Stop
                | MidiType::ActiveSensing
                | MidiType::SystemReset
        )
    }

    /// Number of bytes a complete message of this type occupies on the wire.
    ///
    /// Returns `None` for [`MidiType::InvalidType`] and the bare EOX byte,
    /// which never frame a message on their own.
    pub fn expected_length(self) -> Option<MessageLength> {
        match self {
            MidiType::Clock
            | MidiType::Start
            | MidiType::Continue
            | MidiType::Stop
            | MidiType::ActiveSensing
            | MidiType::SystemReset
            | MidiType::TuneRequest => Some(MessageLength::Single),
            MidiType::ProgramChange
            | MidiType::AfterTouchChannel
            | MidiType::TimeCodeQuarterFrame
            | MidiType::SongSelect => Some(MessageLength::Two),
            MidiType::NoteOff
            | MidiType::NoteOn
            | MidiType::ControlChange
            | MidiType::PitchBend
            | MidiType::AfterTouchPoly
            | MidiType::SongPosition => Some(MessageLength::Three),
            MidiType::SystemExclusive => Some(MessageLength::Variable),
            MidiType::InvalidType | MidiType::SystemExclusiveEnd => None,
        }
    }
}

/// Channel encoded in a status byte's low nibble, range 1 to 16.
///
/// Always computable, only meaningful for channel message status bytes.
pub fn channel_of(status: u8) -> u8 {
    (status & 0x0f) + 1
}

/// Compose a channel message status byte from a type and a 1-16 channel.
pub fn status_of(kind: MidiType, channel: u8) -> u8 {
    kind as u8 | ((channel - 1) & 0x0f)
}

/// Decoded data of one MIDI message.
///
/// A single record is owned by the parser and overwritten in place on every
/// successful parse; `valid` flips to `true` only once a structurally
/// complete message has been assembled.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub struct Message<const SYSEX_MAX: usize> {
    /// Channel the message was received on, 1 to 16. Zero for system
    /// messages.
    pub channel: u8,
    pub kind: MidiType,
    /// First data byte, 0 to 127. For System Exclusive this is the payload
    /// length LSB.
    pub data1: u8,
    /// Second data byte, 0 to 127. Zero for 2-byte messages, payload length
    /// MSB for System Exclusive.
    pub data2: u8,
    /// System Exclusive payload, boundary bytes included.
    pub sysex: Vec<u8, SYSEX_MAX>,
    pub valid: bool,
}

impl<const SYSEX_MAX: usize> Message<SYSEX_MAX> {
    pub fn new() -> Self {
        Message {
            channel: 0,
            kind: MidiType::InvalidType,
            data1: 0,
            data2: 0,
            sysex: Vec::new(),
            valid: false,
        }
    }

    /// Length of the System Exclusive payload, decoded from data1 (LSB) and
    /// data2 (MSB), capped at the buffer capacity.
    pub fn sysex_len(&self) -> usize {
        let size = (usize::from(self.data2) << 8) | usize::from(self.data1);
        size.min(SYSEX_MAX)
    }
}

impl<const SYSEX_MAX: usize> Default for Message<SYSEX_MAX> {
    fn default() -> Self {
        Self::new()
    }
}

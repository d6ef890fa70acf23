use defmt::Formatter;

use crate::codec::CodecError;
use crate::interface::ThruMode;
use crate::message::{Message, MessageLength, MidiType};
use crate::packet::EventPacket;
use crate::parser::Settings;
use crate::value::Value14;

impl defmt::Format for MidiType {
    fn format(&self, fmt: Formatter<'_>) {
        let name = match self {
            MidiType::InvalidType => "InvalidType",
            MidiType::NoteOff => "NoteOff",
            MidiType::NoteOn => "NoteOn",
            MidiType::AfterTouchPoly => "AfterTouchPoly",
            MidiType::ControlChange => "ControlChange",
            MidiType::ProgramChange => "ProgramChange",
            MidiType::AfterTouchChannel => "AfterTouchChannel",
            MidiType::PitchBend => "PitchBend",
            MidiType::SystemExclusive => "SystemExclusive",
            MidiType::TimeCodeQuarterFrame => "TimeCodeQuarterFrame",
            MidiType::SongPosition => "SongPosition",
            MidiType::SongSelect => "SongSelect",
            MidiType::TuneRequest => "TuneRequest",
            MidiType::SystemExclusiveEnd => "SystemExclusiveEnd",
            MidiType::Clock => "Clock",
            MidiType::Start => "Start",
            MidiType::Continue => "Continue",
            MidiType::Stop => "Stop",
            MidiType::ActiveSensing => "ActiveSensing",
            MidiType::SystemReset => "SystemReset",
        };
        defmt::write!(fmt, "{=str}", name)
    }
}

impl defmt::Format for MessageLength {
    fn format(&self, fmt: Formatter<'_>) {
        let name = match self {
            MessageLength::Single => "Single",
            MessageLength::Two => "Two",
            MessageLength::Three => "Three",
            MessageLength::Variable => "Variable",
        };
        defmt::write!(fmt, "{=str}", name)
    }
}

impl<const SYSEX_MAX: usize> defmt::Format for Message<SYSEX_MAX> {
    fn format(&self, fmt: Formatter<'_>) {
        defmt::write!(
            fmt,
            "Message {{ kind: {}, channel: {=u8}, data1: {=u8}, data2: {=u8}, valid: {=bool} }}",
            self.kind,
            self.channel,
            self.data1,
            self.data2,
            self.valid
        )
    }
}

impl defmt::Format for Settings {
    fn format(&self, fmt: Formatter<'_>) {
        defmt::write!(
            fmt,
            "Settings {{ running_status: {=bool}, null_velocity_note_off: {=bool}, 1_byte_parsing: {=bool} }}",
            self.use_running_status,
            self.handle_null_velocity_note_on_as_note_off,
            self.use_1_byte_parsing
        )
    }
}

impl defmt::Format for ThruMode {
    fn format(&self, fmt: Formatter<'_>) {
        let name = match self {
            ThruMode::Off => "Off",
            ThruMode::Full => "Full",
            ThruMode::SameChannel => "SameChannel",
            ThruMode::DifferentChannel => "DifferentChannel",
        };
        defmt::write!(fmt, "{=str}", name)
    }
}

impl defmt::Format for CodecError {
    fn format(&self, fmt: Formatter<'_>) {
        match self {
            CodecError::OutputTooShort => defmt::write!(fmt, "CodecError::OutputTooShort"),
        }
    }
}

impl defmt::Format for EventPacket {
    fn format(&self, fmt: Formatter<'_>) {
        defmt::write!(
            fmt,
            "EventPacket {{ {=u8:x} {=u8:x} {=u8:x} {=u8:x} }}",
            self.header,
            self.byte1,
            self.byte2,
            self.byte3
        )
    }
}

impl defmt::Format for Value14 {
    fn format(&self, fmt: Formatter<'_>) {
        defmt::write!(fmt, "Value14({=u16})", self.as_14bits())
    }
}

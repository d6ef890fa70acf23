//! MIDI input parser
//!
//! Reconstructs complete messages from the raw byte stream: framing of 1, 2,
//! 3 byte and System Exclusive messages, running status on the receive side
//! and real-time bytes interleaved in the middle of another message.
use heapless::Vec;

use crate::message::{channel_of, MessageLength, Message, MidiType};
use crate::transport::ByteSource;

/// Runtime knobs recognized by the codec.
///
/// Defaults follow the wire-friendly configuration: running status on the
/// transmit side enabled, null-velocity NoteOn reported as NoteOff, parse
/// calls drain the input until a message completes or it runs dry.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub struct Settings {
    /// Elide repeated status bytes on the transmit side.
    pub use_running_status: bool,
    /// Report a NoteOn with velocity 0 as a NoteOff.
    pub handle_null_velocity_note_on_as_note_off: bool,
    /// Consume at most one byte per parse call (bounds worst-case latency)
    /// instead of draining the source.
    pub use_1_byte_parsing: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            use_running_status: true,
            handle_null_velocity_note_on_as_note_off: true,
            use_1_byte_parsing: false,
        }
    }
}

/// Outcome of feeding a single byte to the parser.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Debug))]
enum Step {
    /// A complete message is stored in the record.
    Completed,
    /// Byte absorbed, message still pending.
    NotYet,
    /// Free-standing undefined byte (F9/FD), ignored without touching state.
    Skipped,
    /// Framing error, pending state was reset.
    Rejected,
}

/// Decoder state machine, one instance per input direction.
pub struct Parser<const SYSEX_MAX: usize> {
    settings: Settings,
    message: Message<SYSEX_MAX>,
    /// Last channel message status byte seen, 0 when none.
    running_status: u8,
    /// Raw bytes of the in-progress message, status byte first.
    pending: Vec<u8, SYSEX_MAX>,
    /// Total length the pending message will have, 0 when idle.
    expected: usize,
}

impl<const SYSEX_MAX: usize> Parser<SYSEX_MAX> {
    pub fn new(settings: Settings) -> Self {
        Parser {
            settings,
            message: Message::new(),
            running_status: 0,
            pending: Vec::new(),
            expected: 0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Last decoded message. Only meaningful right after a parse call
    /// reported completion; overwritten in place by the next one.
    pub fn message(&self) -> &Message<SYSEX_MAX> {
        &self.message
    }

    /// Channel filter: does the stored message concern `listen_channel`?
    ///
    /// System messages always pass. Channel messages pass when the channels
    /// match or `listen_channel` is [`crate::CHANNEL_OMNI`];
    /// [`crate::CHANNEL_OFF`] matches nothing.
    pub fn input_filter(&self, listen_channel: u8) -> bool {
        if !self.message.valid || self.message.kind == MidiType::InvalidType {
            return false;
        }
        if self.message.kind.is_channel_message() {
            listen_channel == crate::CHANNEL_OMNI || listen_channel == self.message.channel
        } else {
            true
        }
    }

    /// Forget any in-progress message and the receive running status.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.expected = 0;
        self.running_status = 0;
        self.message.valid = false;
    }

    /// Pull bytes from `source` until a message completes or no input is
    /// left. With [`Settings::use_1_byte_parsing`] a single byte is
    /// consumed instead. Returns true when a complete message was stored.
    pub fn parse(&mut self, source: &mut impl ByteSource) -> bool {
        loop {
            if source.available() == 0 {
                return false;
            }
            match self.step(source.read()) {
                Step::Completed => return true,
                Step::NotYet | Step::Skipped => {
                    if self.settings.use_1_byte_parsing {
                        return false;
                    }
                }
                Step::Rejected => return false,
            }
        }
    }

    /// Feed one byte directly (for transports that deliver bytes out of
    /// band). Returns true when this byte completed a message.
    pub fn feed(&mut self, byte: u8) -> bool {
        self.step(byte) == Step::Completed
    }

    fn step(&mut self, byte: u8) -> Step {
        if self.expected == 0 {
            self.idle_step(byte)
        } else {
            self.accumulating_step(byte)
        }
    }

    /// No pending message: `byte` opens a new one, either as a fresh status
    /// byte or as a data byte riding on the running status.
    fn idle_step(&mut self, byte: u8) -> Step {
        // Free-standing undefined bytes are skipped without disturbing
        // the running status.
        if byte == 0xf9 || byte == 0xfd {
            return Step::Skipped;
        }

        let mut status = byte;
        let mut seeded_data = None;
        if byte < 0x80 {
            // Data byte with no status: only valid under running status.
            if self.running_status == 0 {
                self.reset();
                return Step::Rejected;
            }
            status = self.running_status;
            seeded_data = Some(byte);
        }

        let kind = MidiType::from_status(status);
        match kind.expected_length() {
            None => {
                // InvalidType or a stray EOX.
                self.reset();
                Step::Rejected
            }
            Some(MessageLength::Single) => {
                self.message.kind = kind;
                self.message.channel = 0;
                self.message.data1 = 0;
                self.message.data2 = 0;
                self.message.valid = true;
                // Real-time and TuneRequest are transparent to the receive
                // running status: they may appear spliced inside another
                // message's byte stream.
                self.pending.clear();
                self.expected = 0;
                Step::Completed
            }
            Some(length @ (MessageLength::Two | MessageLength::Three)) => {
                self.pending.clear();
                let _ = self.pending.push(status);
                if let Some(data) = seeded_data {
                    let _ = self.pending.push(data);
                }
                self.expected = match length {
                    MessageLength::Two => 2,
                    _ => 3,
                };
                // The running-status seed path may already satisfy a
                // 2-byte message.
                self.try_finalize()
            }
            Some(MessageLength::Variable) => {
                // SysEx always breaks running status.
                self.running_status = 0;
                self.pending.clear();
                let _ = self.pending.push(status);
                self.expected = SYSEX_MAX;
                Step::NotYet
            }
        }
    }

    /// Mid-message byte: data to append, an interleaved real-time byte, the
    /// EOX terminator, or a framing error.
    fn accumulating_step(&mut self, byte: u8) -> Step {
        if byte >= 0x80 {
            let kind = MidiType::from_status(byte);
            if kind.is_real_time() {
                // Emit the one-byte message on its own and leave the
                // pending message untouched; it resumes on the next byte.
                self.message.kind = kind;
                self.message.channel = 0;
                self.message.data1 = 0;
                self.message.data2 = 0;
                self.message.valid = true;
                return Step::Completed;
            }
            if byte == 0xf7 {
                if self.pending[0] == 0xf0 {
                    return self.finalize_sysex();
                }
                // EOX without a SysEx in progress.
                self.reset();
                return Step::Rejected;
            }
            // Any other status byte mid-message aborts the pending one.
            // Policy: discard it and restart framing from this byte.
            self.pending.clear();
            self.expected = 0;
            return self.idle_step(byte);
        }

        if self.pending.push(byte).is_err() {
            // Can only happen for SysEx when capacity < expected.
            self.reset();
            return Step::Rejected;
        }
        self.try_finalize()
    }

    fn try_finalize(&mut self) -> Step {
        if self.pending.len() < self.expected {
            return Step::NotYet;
        }

        let status = self.pending[0];
        let kind = MidiType::from_status(status);
        if kind == MidiType::SystemExclusive {
            // Buffer filled up without an EOX byte: overflow, drop the
            // message.
            self.reset();
            return Step::Rejected;
        }

        self.message.kind = kind;
        self.message.channel = if kind.is_channel_message() {
            channel_of(status)
        } else {
            0
        };
        self.message.data1 = self.pending[1];
        self.message.data2 = if self.expected == 3 {
            self.pending[2]
        } else {
            0
        };
        self.message.valid = true;

        if self.settings.handle_null_velocity_note_on_as_note_off
            && kind == MidiType::NoteOn
            && self.message.data2 == 0
        {
            self.message.kind = MidiType::NoteOff;
        }

        // Running status activates for channel messages only; the raw
        // status byte is stored even when the null-velocity rule rewrote
        // the reported type.
        if kind.is_channel_message() {
            self.running_status = status;
        } else {
            self.running_status = 0;
        }

        self.pending.clear();
        self.expected = 0;
        Step::Completed
    }

    fn finalize_sysex(&mut self) -> Step {
        if self.pending.push(0xf7).is_err() {
            self.reset();
            return Step::Rejected;
        }
        let length = self.pending.len();
        self.message.kind = MidiType::SystemExclusive;
        self.message.channel = 0;
        self.message.data1 = (length & 0xff) as u8;
        self.message.data2 = (length >> 8) as u8;
        self.message.sysex.clear();
        let _ = self.message.sysex.extend_from_slice(&self.pending);
        self.message.valid = true;

        self.pending.clear();
        self.expected = 0;
        Step::Completed
    }
}

impl<const SYSEX_MAX: usize> Default for Parser<SYSEX_MAX> {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

//! High-level MIDI I/O surface
//!
//! [`MidiInterface`] ties a [`Parser`] and an [`Encoder`] to one transport
//! pair and layers the channel filter, Thru routing and handler dispatch on
//! top. One instance per MIDI port; there is no global state.
use crate::encoder::Encoder;
use crate::message::{Message, MidiType, PITCHBEND_MIN};
use crate::parser::{Parser, Settings};
use crate::transport::{ByteSink, ByteSource};

/// Software-Thru routing policy for received channel messages.
///
/// System messages are mirrored in every mode except [`ThruMode::Off`].
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub enum ThruMode {
    /// Nothing is mirrored.
    Off,
    /// Every received message is mirrored to the output.
    Full,
    /// Only messages on the listen channel are mirrored.
    SameChannel,
    /// Only messages off the listen channel are mirrored.
    DifferentChannel,
}

/// Per-type message hooks invoked by [`MidiInterface::read_with`].
///
/// Every method has an empty default body, implement only the ones you care
/// about. Channel numbers are 1 to 16.
pub trait MidiHandlers {
    fn note_off(&mut self, channel: u8, note: u8, velocity: u8) {
        let _ = (channel, note, velocity);
    }
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        let _ = (channel, note, velocity);
    }
    fn after_touch_poly(&mut self, channel: u8, note: u8, pressure: u8) {
        let _ = (channel, note, pressure);
    }
    fn control_change(&mut self, channel: u8, number: u8, value: u8) {
        let _ = (channel, number, value);
    }
    fn program_change(&mut self, channel: u8, program: u8) {
        let _ = (channel, program);
    }
    fn after_touch_channel(&mut self, channel: u8, pressure: u8) {
        let _ = (channel, pressure);
    }
    /// `bend` is centered on 0, [`PITCHBEND_MIN`] to
    /// [`crate::message::PITCHBEND_MAX`].
    fn pitch_bend(&mut self, channel: u8, bend: i16) {
        let _ = (channel, bend);
    }
    /// Complete frame, `F0`/`F7` boundary bytes included.
    fn sys_ex(&mut self, data: &[u8]) {
        let _ = data;
    }
    fn time_code_quarter_frame(&mut self, data: u8) {
        let _ = data;
    }
    fn song_position(&mut self, beats: u16) {
        let _ = beats;
    }
    fn song_select(&mut self, song: u8) {
        let _ = song;
    }
    fn tune_request(&mut self) {}
    fn clock(&mut self) {}
    fn start(&mut self) {}
    fn continue_playback(&mut self) {}
    fn stop(&mut self) {}
    fn active_sensing(&mut self) {}
    fn system_reset(&mut self) {}
}

/// One bidirectional MIDI port: input parsing and filtering, output
/// encoding, optional Thru mirroring between the two.
pub struct MidiInterface<S: ByteSource, W: ByteSink, const SYSEX_MAX: usize> {
    source: S,
    parser: Parser<SYSEX_MAX>,
    encoder: Encoder<W>,
    input_channel: u8,
    thru_mode: ThruMode,
}

impl<S: ByteSource, W: ByteSink, const SYSEX_MAX: usize> MidiInterface<S, W, SYSEX_MAX> {
    /// Listens on all channels, Thru off.
    pub fn new(source: S, sink: W, settings: Settings) -> Self {
        MidiInterface {
            source,
            parser: Parser::new(settings),
            encoder: Encoder::new(sink, settings.use_running_status),
            input_channel: crate::CHANNEL_OMNI,
            thru_mode: ThruMode::Off,
        }
    }

    pub fn input_channel(&self) -> u8 {
        self.input_channel
    }

    /// [`crate::CHANNEL_OMNI`] listens on all 16 channels,
    /// [`crate::CHANNEL_OFF`] on none.
    pub fn set_input_channel(&mut self, channel: u8) {
        self.input_channel = channel;
    }

    pub fn thru_mode(&self) -> ThruMode {
        self.thru_mode
    }

    pub fn set_thru_mode(&mut self, mode: ThruMode) {
        self.thru_mode = mode;
    }

    /// Outgoing side, for sending messages of your own.
    pub fn encoder_mut(&mut self) -> &mut Encoder<W> {
        &mut self.encoder
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Last decoded message, overwritten by every successful read.
    pub fn message(&self) -> &Message<SYSEX_MAX> {
        self.parser.message()
    }

    pub fn message_type(&self) -> MidiType {
        self.parser.message().kind
    }

    pub fn channel(&self) -> u8 {
        self.parser.message().channel
    }

    pub fn data1(&self) -> u8 {
        self.parser.message().data1
    }

    pub fn data2(&self) -> u8 {
        self.parser.message().data2
    }

    /// System Exclusive frame of the last message, boundaries included.
    pub fn sysex_array(&self) -> &[u8] {
        &self.parser.message().sysex
    }

    /// Poll the input once.
    ///
    /// Returns true when a complete message addressed to the listen channel
    /// was decoded. Thru mirroring runs even for messages the channel filter
    /// drops, so a port listening on one channel still passes the rest of
    /// the stream along.
    pub fn read(&mut self) -> bool {
        if !self.parser.parse(&mut self.source) {
            return false;
        }
        let channel_match = self.parser.input_filter(self.input_channel);
        self.thru_filter();
        channel_match
    }

    /// Like [`Self::read`], additionally dispatching accepted messages to
    /// `handlers`.
    pub fn read_with(&mut self, handlers: &mut impl MidiHandlers) -> bool {
        if !self.read() {
            return false;
        }
        self.dispatch(handlers);
        true
    }

    fn dispatch(&self, handlers: &mut impl MidiHandlers) {
        let message = self.parser.message();
        match message.kind {
            MidiType::NoteOff => handlers.note_off(message.channel, message.data1, message.data2),
            MidiType::NoteOn => handlers.note_on(message.channel, message.data1, message.data2),
            MidiType::AfterTouchPoly => {
                handlers.after_touch_poly(message.channel, message.data1, message.data2)
            }
            MidiType::ControlChange => {
                handlers.control_change(message.channel, message.data1, message.data2)
            }
            MidiType::ProgramChange => handlers.program_change(message.channel, message.data1),
            MidiType::AfterTouchChannel => {
                handlers.after_touch_channel(message.channel, message.data1)
            }
            MidiType::PitchBend => {
                let bend = (i32::from(message.data2) << 7 | i32::from(message.data1))
                    + i32::from(PITCHBEND_MIN);
                handlers.pitch_bend(message.channel, bend as i16);
            }
            MidiType::SystemExclusive => handlers.sys_ex(&message.sysex),
            MidiType::TimeCodeQuarterFrame => handlers.time_code_quarter_frame(message.data1),
            MidiType::SongPosition => {
                handlers.song_position(u16::from(message.data2) << 7 | u16::from(message.data1))
            }
            MidiType::SongSelect => handlers.song_select(message.data1),
            MidiType::TuneRequest => handlers.tune_request(),
            MidiType::Clock => handlers.clock(),
            MidiType::Start => handlers.start(),
            MidiType::Continue => handlers.continue_playback(),
            MidiType::Stop => handlers.stop(),
            MidiType::ActiveSensing => handlers.active_sensing(),
            MidiType::SystemReset => handlers.system_reset(),
            MidiType::SystemExclusiveEnd | MidiType::InvalidType => {}
        }
    }

    /// Mirror the stored message to the output according to the Thru mode.
    fn thru_filter(&mut self) {
        if self.thru_mode == ThruMode::Off {
            return;
        }

        let message = self.parser.message().clone();
        if message.kind.is_channel_message() {
            let same = self.input_channel == crate::CHANNEL_OMNI
                || message.channel == self.input_channel;
            let forward = match self.thru_mode {
                ThruMode::Full => true,
                ThruMode::SameChannel => same,
                ThruMode::DifferentChannel => !same,
                ThruMode::Off => false,
            };
            if forward {
                self.encoder
                    .send(message.kind, message.data1, message.data2, message.channel);
            }
            return;
        }

        // System messages are mirrored in every active mode.
        match message.kind {
            MidiType::SystemExclusive => self.encoder.send_sys_ex(&message.sysex, true),
            MidiType::TimeCodeQuarterFrame => {
                self.encoder.send_time_code_quarter_frame_byte(message.data1)
            }
            MidiType::SongPosition => self
                .encoder
                .send_song_position(u16::from(message.data2) << 7 | u16::from(message.data1)),
            MidiType::SongSelect => self.encoder.send_song_select(message.data1),
            MidiType::TuneRequest => self.encoder.send_tune_request(),
            _ => self.encoder.send_real_time(message.kind),
        }
    }
}

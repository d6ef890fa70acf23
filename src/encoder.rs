//! MIDI output encoder
//!
//! Turns typed messages into canonical byte sequences on a [`ByteSink`],
//! maintaining the transmit-side running status and the currently selected
//! RPN/NRPN parameter number.
use crate::message::{control_change, status_of, MidiType, PITCHBEND_MAX, PITCHBEND_MIN};
use crate::transport::ByteSink;

/// Sentinel for "no parameter number selected".
const NO_PARAMETER: u16 = 0xffff;

/// Transmit side of the codec, one instance per output direction.
pub struct Encoder<W: ByteSink> {
    sink: W,
    use_running_status: bool,
    /// Last status byte transmitted, 0 when none.
    running_status: u8,
    current_rpn: u16,
    current_nrpn: u16,
}

impl<W: ByteSink> Encoder<W> {
    pub fn new(sink: W, use_running_status: bool) -> Self {
        Encoder {
            sink,
            use_running_status,
            running_status: 0,
            current_rpn: NO_PARAMETER,
            current_nrpn: NO_PARAMETER,
        }
    }

    pub fn sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    pub fn into_sink(self) -> W {
        self.sink
    }

    /// Forget the transmitted running status, forcing the next channel
    /// message to carry a fresh status byte.
    pub fn reset(&mut self) {
        self.running_status = 0;
        self.current_rpn = NO_PARAMETER;
        self.current_nrpn = NO_PARAMETER;
    }

    /// Generate and send a message from the given values.
    ///
    /// Invalid arguments (channel out of 1..=16, type below the status
    /// range) are silently ignored: no bytes are written. Data bytes are
    /// masked to 7 bits.
    pub fn send(&mut self, kind: MidiType, data1: u8, data2: u8, channel: u8) {
        if channel < 1 || channel > 16 || (kind as u8) < 0x80 {
            self.running_status = 0;
            return;
        }

        if kind.is_channel_message() {
            let data1 = data1 & 0x7f;
            let data2 = data2 & 0x7f;
            let status = status_of(kind, channel);

            if self.use_running_status {
                if self.running_status != status {
                    // New status byte, memorise and send the header.
                    self.running_status = status;
                    self.sink.write(status);
                }
            } else {
                self.sink.write(status);
            }

            self.sink.write(data1);
            if kind != MidiType::ProgramChange && kind != MidiType::AfterTouchChannel {
                self.sink.write(data2);
            }
            return;
        }

        if kind == MidiType::TuneRequest || kind.is_real_time() {
            self.send_real_time(kind);
        }
    }

    pub fn send_note_on(&mut self, note: u8, velocity: u8, channel: u8) {
        self.send(MidiType::NoteOn, note, velocity, channel);
    }

    /// Send a real NoteOff message (as opposed to a NoteOn with null
    /// velocity).
    pub fn send_note_off(&mut self, note: u8, velocity: u8, channel: u8) {
        self.send(MidiType::NoteOff, note, velocity, channel);
    }

    pub fn send_program_change(&mut self, program: u8, channel: u8) {
        self.send(MidiType::ProgramChange, program, 0, channel);
    }

    pub fn send_control_change(&mut self, number: u8, value: u8, channel: u8) {
        self.send(MidiType::ControlChange, number, value, channel);
    }

    pub fn send_poly_pressure(&mut self, note: u8, pressure: u8, channel: u8) {
        self.send(MidiType::AfterTouchPoly, note, pressure, channel);
    }

    pub fn send_after_touch(&mut self, pressure: u8, channel: u8) {
        self.send(MidiType::AfterTouchChannel, pressure, 0, channel);
    }

    /// Send a pitch bend as a signed integer, [`PITCHBEND_MIN`] to
    /// [`PITCHBEND_MAX`], center 0.
    pub fn send_pitch_bend(&mut self, value: i16, channel: u8) {
        let bend = (i32::from(value.clamp(PITCHBEND_MIN, PITCHBEND_MAX)) - i32::from(PITCHBEND_MIN))
            as u16;
        self.send(
            MidiType::PitchBend,
            (bend & 0x7f) as u8,
            ((bend >> 7) & 0x7f) as u8,
            channel,
        );
    }

    /// Send a pitch bend as a float, -1.0 (full downwards) to +1.0 (full
    /// upwards), center 0.0, saturating at the extremes.
    pub fn send_pitch_bend_normalized(&mut self, value: f32, channel: u8) {
        let clamped = value.clamp(-1.0, 1.0);
        self.send_pitch_bend((clamped * PITCHBEND_MAX as f32) as i16, channel);
    }

    /// Send a System Exclusive frame.
    ///
    /// Unless `contains_boundaries` states that `data` already carries the
    /// `F0`/`F7` bytes, they are added around the payload. SysEx always
    /// invalidates the transmitted running status.
    pub fn send_sys_ex(&mut self, data: &[u8], contains_boundaries: bool) {
        if !contains_boundaries {
            self.sink.write(0xf0);
        }
        self.sink.write_slice(data);
        if !contains_boundaries {
            self.sink.write(0xf7);
        }
        self.running_status = 0;
    }

    /// Send a Time Code Quarter Frame from its type and value nibbles.
    pub fn send_time_code_quarter_frame(&mut self, type_nibble: u8, values_nibble: u8) {
        let data = ((type_nibble & 0x07) << 4) | (values_nibble & 0x0f);
        self.send_time_code_quarter_frame_byte(data);
    }

    pub fn send_time_code_quarter_frame_byte(&mut self, data: u8) {
        self.sink.write(MidiType::TimeCodeQuarterFrame as u8);
        self.sink.write(data & 0x7f);
        self.running_status = 0;
    }

    /// Send a Song Position Pointer, in beats since the start of the song.
    pub fn send_song_position(&mut self, beats: u16) {
        self.sink.write(MidiType::SongPosition as u8);
        self.sink.write((beats & 0x7f) as u8);
        self.sink.write(((beats >> 7) & 0x7f) as u8);
        self.running_status = 0;
    }

    pub fn send_song_select(&mut self, song: u8) {
        self.sink.write(MidiType::SongSelect as u8);
        self.sink.write(song & 0x7f);
        self.running_status = 0;
    }

    pub fn send_tune_request(&mut self) {
        self.send_real_time(MidiType::TuneRequest);
    }

    /// Send a single-byte message.
    ///
    /// Real-time bytes never touch the running status, so they are safe to
    /// interleave in the middle of another outgoing message. TuneRequest is
    /// accepted here as well (one byte anyway) but, being System Common, it
    /// does reset the running status.
    pub fn send_real_time(&mut self, kind: MidiType) {
        if kind == MidiType::TuneRequest || kind.is_real_time() {
            self.sink.write(kind as u8);
        }
        if kind == MidiType::TuneRequest {
            self.running_status = 0;
        }
    }

    /// Select a Registered Parameter Number for the following value sends.
    /// Re-selecting the current number emits nothing.
    pub fn begin_rpn(&mut self, number: u16, channel: u8) {
        if self.current_rpn != number {
            self.send_control_change(control_change::RPN_LSB, (number & 0x7f) as u8, channel);
            self.send_control_change(control_change::RPN_MSB, ((number >> 7) & 0x7f) as u8, channel);
            self.current_rpn = number;
        }
    }

    /// Send a full 14-bit value for the currently selected RPN.
    pub fn send_rpn_value(&mut self, value: u16, channel: u8) {
        self.send_rpn_value_bytes(((value >> 7) & 0x7f) as u8, (value & 0x7f) as u8, channel);
    }

    pub fn send_rpn_value_bytes(&mut self, msb: u8, lsb: u8, channel: u8) {
        self.send_control_change(control_change::DATA_ENTRY_MSB, msb, channel);
        self.send_control_change(control_change::DATA_ENTRY_LSB, lsb, channel);
    }

    pub fn send_rpn_increment(&mut self, amount: u8, channel: u8) {
        self.send_control_change(control_change::DATA_INCREMENT, amount, channel);
    }

    pub fn send_rpn_decrement(&mut self, amount: u8, channel: u8) {
        self.send_control_change(control_change::DATA_DECREMENT, amount, channel);
    }

    /// Deselect the current RPN on the wire using the null function number.
    pub fn end_rpn(&mut self, channel: u8) {
        self.send_control_change(control_change::RPN_LSB, 0x7f, channel);
        self.send_control_change(control_change::RPN_MSB, 0x7f, channel);
        self.current_rpn = NO_PARAMETER;
    }

    /// Select a Non-Registered Parameter Number for the following value
    /// sends. Re-selecting the current number emits nothing.
    pub fn begin_nrpn(&mut self, number: u16, channel: u8) {
        if self.current_nrpn != number {
            self.send_control_change(control_change::NRPN_LSB, (number & 0x7f) as u8, channel);
            self.send_control_change(
                control_change::NRPN_MSB,
                ((number >> 7) & 0x7f) as u8,
                channel,
            );
            self.current_nrpn = number;
        }
    }

    pub fn send_nrpn_value(&mut self, value: u16, channel: u8) {
        self.send_nrpn_value_bytes(((value >> 7) & 0x7f) as u8, (value & 0x7f) as u8, channel);
    }

    pub fn send_nrpn_value_bytes(&mut self, msb: u8, lsb: u8, channel: u8) {
        self.send_control_change(control_change::DATA_ENTRY_MSB, msb, channel);
        self.send_control_change(control_change::DATA_ENTRY_LSB, lsb, channel);
    }

    pub fn send_nrpn_increment(&mut self, amount: u8, channel: u8) {
        self.send_control_change(control_change::DATA_INCREMENT, amount, channel);
    }

    pub fn send_nrpn_decrement(&mut self, amount: u8, channel: u8) {
        self.send_control_change(control_change::DATA_DECREMENT, amount, channel);
    }

    /// Deselect the current NRPN on the wire using the null function number.
    pub fn end_nrpn(&mut self, channel: u8) {
        self.send_control_change(control_change::NRPN_LSB, 0x7f, channel);
        self.send_control_change(control_change::NRPN_MSB, 0x7f, channel);
        self.current_nrpn = NO_PARAMETER;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;

    fn encoder(use_running_status: bool) -> Encoder<Vec<u8, 64>> {
        Encoder::new(Vec::new(), use_running_status)
    }

    #[test]
    fn test_running_status_elides_repeated_status() {
        let mut enc = encoder(true);
        enc.send_note_on(10, 11, 12);
        enc.send_note_on(12, 13, 12);
        assert_eq!(&enc.into_sink()[..], &[0x9b, 10, 11, 12, 13]);
    }

    #[test]
    fn test_running_status_disabled_repeats_status() {
        let mut enc = encoder(false);
        enc.send_note_on(10, 11, 12);
        enc.send_note_on(12, 13, 12);
        assert_eq!(&enc.into_sink()[..], &[0x9b, 10, 11, 0x9b, 12, 13]);
    }

    #[test]
    fn test_different_status_breaks_running_status() {
        let mut enc = encoder(true);
        enc.send_note_on(10, 11, 1);
        enc.send_control_change(7, 100, 1);
        enc.send_note_on(12, 13, 1);
        assert_eq!(
            &enc.into_sink()[..],
            &[0x90, 10, 11, 0xb0, 7, 100, 0x90, 12, 13]
        );
    }

    #[test]
    fn test_two_byte_types_skip_data2() {
        let mut enc = encoder(false);
        enc.send_program_change(42, 3);
        enc.send_after_touch(99, 3);
        assert_eq!(&enc.into_sink()[..], &[0xc2, 42, 0xd2, 99]);
    }

    #[test]
    fn test_invalid_channel_sends_nothing() {
        let mut enc = encoder(true);
        enc.send_note_on(1, 2, 0); // omni is not a valid send target
        enc.send_note_on(1, 2, 17);
        assert!(enc.into_sink().is_empty());
    }

    #[test]
    fn test_data_bytes_masked_to_seven_bits() {
        let mut enc = encoder(false);
        enc.send_note_on(0x8a, 0xff, 1);
        assert_eq!(&enc.into_sink()[..], &[0x90, 0x0a, 0x7f]);
    }

    #[test]
    fn test_real_time_does_not_touch_running_status() {
        let mut enc = encoder(true);
        enc.send_note_on(1, 2, 1);
        enc.send_real_time(MidiType::Clock);
        enc.send_note_on(3, 4, 1);
        assert_eq!(&enc.into_sink()[..], &[0x90, 1, 2, 0xf8, 3, 4]);
    }

    #[test]
    fn test_tune_request_resets_running_status() {
        let mut enc = encoder(true);
        enc.send_note_on(1, 2, 1);
        enc.send_tune_request();
        enc.send_note_on(3, 4, 1);
        assert_eq!(&enc.into_sink()[..], &[0x90, 1, 2, 0xf6, 0x90, 3, 4]);
    }

    #[test]
    fn test_sys_ex_wraps_payload_and_breaks_running_status() {
        let mut enc = encoder(true);
        enc.send_note_on(1, 2, 1);
        enc.send_sys_ex(&[0x7e, 0x06, 0x01], false);
        enc.send_note_on(3, 4, 1);
        assert_eq!(
            &enc.into_sink()[..],
            &[0x90, 1, 2, 0xf0, 0x7e, 0x06, 0x01, 0xf7, 0x90, 3, 4]
        );
    }

    #[test]
    fn test_sys_ex_with_boundaries_sent_verbatim() {
        let mut enc = encoder(false);
        enc.send_sys_ex(&[0xf0, 0x7d, 0xf7], true);
        assert_eq!(&enc.into_sink()[..], &[0xf0, 0x7d, 0xf7]);
    }

    #[test]
    fn test_pitch_bend_center_and_extremes() {
        let mut enc = encoder(false);
        enc.send_pitch_bend(0, 1);
        enc.send_pitch_bend(PITCHBEND_MIN, 1);
        enc.send_pitch_bend(PITCHBEND_MAX, 1);
        assert_eq!(
            &enc.into_sink()[..],
            &[0xe0, 0x00, 0x40, 0xe0, 0x00, 0x00, 0xe0, 0x7f, 0x7f]
        );
    }

    #[test]
    fn test_pitch_bend_normalized_saturates() {
        let mut enc = encoder(false);
        enc.send_pitch_bend_normalized(2.0, 1);
        let wire = enc.into_sink();
        assert_eq!(&wire[..], &[0xe0, 0x7f, 0x7f]);
    }

    #[test]
    fn test_song_position_splits_fourteen_bits() {
        let mut enc = encoder(false);
        enc.send_song_position(0x2005);
        assert_eq!(&enc.into_sink()[..], &[0xf2, 0x05, 0x40]);
    }

    #[test]
    fn test_time_code_quarter_frame_nibbles() {
        let mut enc = encoder(false);
        enc.send_time_code_quarter_frame(0x03, 0x0a);
        assert_eq!(&enc.into_sink()[..], &[0xf1, 0x3a]);
    }

    #[test]
    fn test_rpn_selection_is_cached() {
        let mut enc = encoder(false);
        enc.begin_rpn(0x0000, 1); // pitch bend sensitivity
        enc.send_rpn_value(0x0100, 1);
        enc.send_rpn_value(0x0180, 1);
        enc.end_rpn(1);
        assert_eq!(
            &enc.into_sink()[..],
            &[
                0xb0, 100, 0x00, 0xb0, 101, 0x00, // select once
                0xb0, 6, 0x02, 0xb0, 38, 0x00, // value 1
                0xb0, 6, 0x03, 0xb0, 38, 0x00, // value 2
                0xb0, 100, 0x7f, 0xb0, 101, 0x7f, // null function
            ]
        );
    }

    #[test]
    fn test_rpn_reselect_same_number_emits_nothing() {
        let mut enc = encoder(false);
        enc.begin_rpn(0x0005, 1);
        let selected = enc.sink_mut().len();
        enc.begin_rpn(0x0005, 1);
        assert_eq!(enc.sink_mut().len(), selected);
    }

    #[test]
    fn test_nrpn_uses_its_own_controller_pair() {
        let mut enc = encoder(false);
        enc.begin_nrpn(0x1234, 1);
        enc.send_nrpn_increment(1, 1);
        enc.end_nrpn(1);
        assert_eq!(
            &enc.into_sink()[..],
            &[
                0xb0, 98, 0x34, 0xb0, 99, 0x24, //
                0xb0, 96, 1, //
                0xb0, 98, 0x7f, 0xb0, 99, 0x7f,
            ]
        );
    }
}

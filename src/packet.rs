//! USB-MIDI event packetization
//!
//! USB-MIDI moves fixed 4-byte event packets instead of a raw byte stream:
//! a header carrying the Code Index Number (CIN) plus up to three message
//! bytes. [`compose_tx_packet`] cuts packets off the front of a byte stream
//! queued in a [`RingBuffer`]; [`unpack_rx_packet`] streams a received
//! packet back into plain bytes for the parser.
use crate::buffer::RingBuffer;
use crate::transport::ByteSink;

/// Code Index Numbers of the USB-MIDI event packet header low nibble.
pub mod code_index {
    pub const RESERVED: u8 = 0x00;
    pub const CABLE_EVENT: u8 = 0x01;
    pub const SYSTEM_COMMON_2_BYTES: u8 = 0x02;
    pub const SYSTEM_COMMON_3_BYTES: u8 = 0x03;
    pub const SYSEX_START: u8 = 0x04;
    /// Shares the code of [`SYSEX_START`].
    pub const SYSEX_CONTINUE: u8 = SYSEX_START;
    pub const SYSTEM_COMMON_1_BYTE: u8 = 0x05;
    /// Shares the code of [`SYSTEM_COMMON_1_BYTE`].
    pub const SYSEX_ENDS_1_BYTE: u8 = SYSTEM_COMMON_1_BYTE;
    pub const SYSEX_ENDS_2_BYTES: u8 = 0x06;
    pub const SYSEX_ENDS_3_BYTES: u8 = 0x07;
    pub const NOTE_OFF: u8 = 0x08;
    pub const NOTE_ON: u8 = 0x09;
    pub const POLY_PRESSURE: u8 = 0x0a;
    pub const CONTROL_CHANGE: u8 = 0x0b;
    pub const PROGRAM_CHANGE: u8 = 0x0c;
    pub const CHANNEL_PRESSURE: u8 = 0x0d;
    pub const PITCH_BEND: u8 = 0x0e;
    pub const SINGLE_BYTE: u8 = 0x0f;

    /// CIN a message starting with `status` travels under.
    pub fn from_status(status: u8) -> u8 {
        let high_nibble = status & 0xf0;
        if (0x80..=0xe0).contains(&high_nibble) {
            // Channel voice messages: the CIN is the status high nibble.
            return status >> 4;
        }
        match status {
            0xf8 | 0xfa | 0xfb | 0xfc | 0xfe | 0xff => SINGLE_BYTE,
            0xf0 => SYSEX_START,
            0xf7 => SYSEX_ENDS_1_BYTE,
            0xf1 | 0xf3 => SYSTEM_COMMON_2_BYTES,
            0xf2 => SYSTEM_COMMON_3_BYTES,
            0xf6 => SYSTEM_COMMON_1_BYTE,
            _ => RESERVED,
        }
    }

    /// Number of meaningful bytes in a packet of the given CIN, 0 when the
    /// CIN does not pin the length down.
    pub fn size(cin: u8) -> usize {
        match cin {
            NOTE_ON | NOTE_OFF | CONTROL_CHANGE | PITCH_BEND | POLY_PRESSURE
            | SYSTEM_COMMON_3_BYTES | SYSEX_ENDS_3_BYTES | SYSEX_START => 3,
            PROGRAM_CHANGE | CHANNEL_PRESSURE | SYSTEM_COMMON_2_BYTES | SYSEX_ENDS_2_BYTES => 2,
            SYSTEM_COMMON_1_BYTE | SINGLE_BYTE => 1,
            _ => 0,
        }
    }
}

/// One 4-byte USB-MIDI event packet. The header low nibble is the CIN, the
/// high nibble the cable number (always 0 here).
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub struct EventPacket {
    pub header: u8,
    pub byte1: u8,
    pub byte2: u8,
    pub byte3: u8,
}

/// Cut the next complete event packet off the front of `buffer`.
///
/// Returns `None` when the queued bytes do not yet form a complete packet;
/// the buffer is left untouched so the caller can retry once more bytes
/// arrived. A leading data byte is treated as the continuation of a running
/// SysEx message. Undefined status bytes are discarded.
pub fn compose_tx_packet<const N: usize>(buffer: &mut RingBuffer<N>) -> Option<EventPacket> {
    if buffer.is_empty() {
        return None;
    }
    let queued = buffer.len();
    let status = buffer.peek(0);
    let cin = code_index::from_status(status);
    let message_length = code_index::size(cin);

    if status == 0xf0 {
        // Start of SysEx: does the whole frame fit in one packet?
        if queued == 2 && buffer.peek(1) == 0xf7 {
            buffer.pop(2);
            return Some(EventPacket {
                header: code_index::SYSEX_ENDS_2_BYTES,
                byte1: status,
                byte2: 0xf7,
                byte3: 0x00,
            });
        }
        if queued >= 3 && buffer.peek(2) == 0xf7 {
            let byte2 = buffer.peek(1);
            buffer.pop(3);
            return Some(EventPacket {
                header: code_index::SYSEX_ENDS_3_BYTES,
                byte1: status,
                byte2,
                byte3: 0xf7,
            });
        }
    }

    if status & 0x80 == 0 {
        // Leading data byte: part of a running SysEx message. Look for the
        // end byte within the next two bytes.
        if queued == 1 {
            return None;
        }
        if queued == 2 {
            if buffer.peek(1) != 0xf7 {
                return None;
            }
            let byte2 = buffer.peek(1);
            buffer.pop(2);
            return Some(EventPacket {
                header: code_index::SYSEX_ENDS_2_BYTES,
                byte1: status,
                byte2,
                byte3: 0x00,
            });
        }
        let byte2 = buffer.peek(1);
        let byte3 = buffer.peek(2);
        buffer.pop(3);
        return Some(EventPacket {
            header: if byte3 == 0xf7 {
                code_index::SYSEX_ENDS_3_BYTES
            } else {
                code_index::SYSEX_CONTINUE
            },
            byte1: status,
            byte2,
            byte3,
        });
    }

    if message_length == 0 {
        // Undefined status byte, drop it rather than stall the queue.
        buffer.pop(1);
        return None;
    }
    if queued < message_length {
        return None;
    }

    let packet = EventPacket {
        header: cin,
        byte1: status,
        byte2: if message_length >= 2 { buffer.peek(1) } else { 0 },
        byte3: if message_length >= 3 { buffer.peek(2) } else { 0 },
    };
    buffer.pop(message_length);
    Some(packet)
}

/// Stream the meaningful bytes of a received packet into `sink`. Packets
/// with a reserved CIN carry nothing and are ignored.
pub fn unpack_rx_packet(packet: &EventPacket, sink: &mut impl ByteSink) {
    let cin = packet.header & 0x0f;
    match code_index::size(cin) {
        1 => sink.write(packet.byte1),
        2 => sink.write_slice(&[packet.byte1, packet.byte2]),
        3 => sink.write_slice(&[packet.byte1, packet.byte2, packet.byte3]),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;

    fn queued(bytes: &[u8]) -> RingBuffer<64> {
        let mut buffer = RingBuffer::new();
        buffer.write_slice(bytes);
        buffer
    }

    fn packet(header: u8, byte1: u8, byte2: u8, byte3: u8) -> EventPacket {
        EventPacket {
            header,
            byte1,
            byte2,
            byte3,
        }
    }

    #[test]
    fn test_cin_from_status() {
        assert_eq!(code_index::from_status(0x9b), code_index::NOTE_ON);
        assert_eq!(code_index::from_status(0x80), code_index::NOTE_OFF);
        assert_eq!(code_index::from_status(0xc4), code_index::PROGRAM_CHANGE);
        assert_eq!(code_index::from_status(0xf0), code_index::SYSEX_START);
        assert_eq!(code_index::from_status(0xf7), code_index::SYSEX_ENDS_1_BYTE);
        assert_eq!(code_index::from_status(0xf8), code_index::SINGLE_BYTE);
        assert_eq!(
            code_index::from_status(0xf2),
            code_index::SYSTEM_COMMON_3_BYTES
        );
        assert_eq!(code_index::from_status(0xf4), code_index::RESERVED);
    }

    #[test]
    fn test_empty_buffer_yields_nothing() {
        let mut buffer = queued(&[]);
        assert_eq!(compose_tx_packet(&mut buffer), None);
    }

    #[test]
    fn test_channel_message_packets() {
        let mut buffer = queued(&[0x9b, 12, 34, 0xc2, 5]);
        assert_eq!(
            compose_tx_packet(&mut buffer),
            Some(packet(code_index::NOTE_ON, 0x9b, 12, 34))
        );
        assert_eq!(
            compose_tx_packet(&mut buffer),
            Some(packet(code_index::PROGRAM_CHANGE, 0xc2, 5, 0))
        );
        assert_eq!(compose_tx_packet(&mut buffer), None);
    }

    #[test]
    fn test_partial_message_waits_for_more_bytes() {
        let mut buffer = queued(&[0x9b, 12]);
        assert_eq!(compose_tx_packet(&mut buffer), None);
        assert_eq!(buffer.len(), 2);

        buffer.write(34);
        assert_eq!(
            compose_tx_packet(&mut buffer),
            Some(packet(code_index::NOTE_ON, 0x9b, 12, 34))
        );
    }

    #[test]
    fn test_real_time_single_byte_packet() {
        let mut buffer = queued(&[0xf8]);
        assert_eq!(
            compose_tx_packet(&mut buffer),
            Some(packet(code_index::SINGLE_BYTE, 0xf8, 0, 0))
        );
    }

    #[test]
    fn test_sysex_two_byte_frame() {
        let mut buffer = queued(&[0xf0, 0xf7]);
        assert_eq!(
            compose_tx_packet(&mut buffer),
            Some(packet(code_index::SYSEX_ENDS_2_BYTES, 0xf0, 0xf7, 0))
        );
    }

    #[test]
    fn test_sysex_three_byte_frame() {
        let mut buffer = queued(&[0xf0, 0x41, 0xf7]);
        assert_eq!(
            compose_tx_packet(&mut buffer),
            Some(packet(code_index::SYSEX_ENDS_3_BYTES, 0xf0, 0x41, 0xf7))
        );
    }

    #[test]
    fn test_sysex_spanning_packets_ends_on_two_bytes() {
        let mut buffer = queued(&[0xf0, 0x01, 0x02, 0x03, 0xf7]);
        assert_eq!(
            compose_tx_packet(&mut buffer),
            Some(packet(code_index::SYSEX_START, 0xf0, 0x01, 0x02))
        );
        assert_eq!(
            compose_tx_packet(&mut buffer),
            Some(packet(code_index::SYSEX_ENDS_2_BYTES, 0x03, 0xf7, 0))
        );
    }

    #[test]
    fn test_sysex_spanning_packets_ends_on_three_bytes() {
        let mut buffer = queued(&[0xf0, 0x01, 0x02, 0x03, 0x04, 0xf7]);
        assert_eq!(
            compose_tx_packet(&mut buffer),
            Some(packet(code_index::SYSEX_START, 0xf0, 0x01, 0x02))
        );
        assert_eq!(
            compose_tx_packet(&mut buffer),
            Some(packet(code_index::SYSEX_ENDS_3_BYTES, 0x03, 0x04, 0xf7))
        );
    }

    #[test]
    fn test_sysex_continue_packet() {
        let mut buffer = queued(&[0x03, 0x04, 0x05, 0x06, 0xf7]);
        assert_eq!(
            compose_tx_packet(&mut buffer),
            Some(packet(code_index::SYSEX_CONTINUE, 0x03, 0x04, 0x05))
        );
        assert_eq!(
            compose_tx_packet(&mut buffer),
            Some(packet(code_index::SYSEX_ENDS_2_BYTES, 0x06, 0xf7, 0))
        );
    }

    #[test]
    fn test_running_sysex_waits_for_terminator() {
        // 0x12 0x42: not enough to tell continuation from ending
        let mut buffer = queued(&[0x12, 0x42]);
        assert_eq!(compose_tx_packet(&mut buffer), None);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_undefined_status_byte_is_discarded() {
        let mut buffer = queued(&[0xf4, 0xf8]);
        assert_eq!(compose_tx_packet(&mut buffer), None);
        assert_eq!(
            compose_tx_packet(&mut buffer),
            Some(packet(code_index::SINGLE_BYTE, 0xf8, 0, 0))
        );
    }

    #[test]
    fn test_unpack_writes_cin_sized_prefix() {
        let mut sink = Vec::<u8, 16>::new();
        unpack_rx_packet(&packet(code_index::NOTE_ON, 0x90, 1, 2), &mut sink);
        unpack_rx_packet(&packet(code_index::PROGRAM_CHANGE, 0xc0, 7, 0), &mut sink);
        unpack_rx_packet(&packet(code_index::SINGLE_BYTE, 0xf8, 0, 0), &mut sink);
        unpack_rx_packet(&packet(code_index::RESERVED, 0x55, 0x66, 0x77), &mut sink);
        assert_eq!(&sink[..], &[0x90, 1, 2, 0xc0, 7, 0xf8]);
    }

    #[test]
    fn test_stream_round_trips_through_packets() {
        let stream = [
            0x9b, 12, 34, // NoteOn
            0xf0, 0x7e, 0x7f, 0x06, 0x01, 0xf7, // SysEx
            0xf2, 0x05, 0x40, // SongPosition
            0xf8, // Clock
            0xc2, 5, // ProgramChange
        ];
        let mut buffer = queued(&stream);
        let mut rebuilt = Vec::<u8, 32>::new();
        while let Some(event) = compose_tx_packet(&mut buffer) {
            unpack_rx_packet(&event, &mut rebuilt);
        }
        assert_eq!(&rebuilt[..], &stream[..]);
    }
}

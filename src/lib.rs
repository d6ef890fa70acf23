//! Byte-stream codec for the MIDI 1.0 serial protocol.
//!
//! The crate decodes an incoming byte stream into typed [`message::Message`]s
//! and encodes typed messages back into canonical byte sequences, tracking
//! running status in both directions. [`interface::MidiInterface`] ties the
//! parser, the encoder and the Thru routing policy together over a pair of
//! byte transport capabilities ([`transport::ByteSource`] /
//! [`transport::ByteSink`]) so it can run on top of a UART, a USB-MIDI
//! endpoint (see [`packet`]) or an in-memory buffer ([`buffer::RingBuffer`]).

#![cfg_attr(any(not(feature = "std"), not(test)), no_std)]

pub mod buffer;
pub mod codec;
pub mod encoder;
pub mod interface;
pub mod message;
pub mod packet;
pub mod parser;
pub mod transport;
pub mod value;

// include defmt::Format implementations
// we don't want them derive()d in the modules unless defmt-impl feature is set
#[cfg(feature = "defmt-impl")]
pub mod defmt;

// reexport heapless
pub use heapless;

/// Wildcard input channel: listen to every channel.
pub const CHANNEL_OMNI: u8 = 0;
/// Input disabled sentinel (17 and over).
pub const CHANNEL_OFF: u8 = 17;

/// Default capacity for System Exclusive payloads, in bytes.
pub const DEFAULT_SYSEX_MAX_SIZE: usize = 255;

/// Standard baud rate of a DIN-5 MIDI serial line.
pub const MIDI_BAUDRATE: u32 = 31_250;

//! Byte transport capabilities consumed by the codec.
//!
//! The core never talks to hardware directly: the encoder writes through a
//! [`ByteSink`], the parser drains a [`ByteSource`]. A UART driver, a USB
//! endpoint or a plain in-memory buffer can all sit behind these traits.
use heapless::Vec;

use crate::buffer::RingBuffer;

/// Outgoing byte stream consumed by the encoder and Thru routing.
pub trait ByteSink {
    fn write(&mut self, byte: u8);

    fn write_slice(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.write(byte);
        }
    }
}

/// Incoming byte stream drained by the parser.
pub trait ByteSource {
    fn available(&self) -> usize;
    fn read(&mut self) -> u8;
}

impl<const N: usize> ByteSink for RingBuffer<N> {
    fn write(&mut self, byte: u8) {
        RingBuffer::write(self, byte);
    }
}

impl<const N: usize> ByteSource for RingBuffer<N> {
    fn available(&self) -> usize {
        self.len()
    }

    fn read(&mut self) -> u8 {
        RingBuffer::read(self)
    }
}

/// Capture sink: bytes past the capacity are dropped, not an error. Useful
/// as a bounded output tap in tests and for Thru capture.
impl<const N: usize> ByteSink for Vec<u8, N> {
    fn write(&mut self, byte: u8) {
        let _ = self.push(byte);
    }
}

impl<T: ByteSink + ?Sized> ByteSink for &mut T {
    fn write(&mut self, byte: u8) {
        (**self).write(byte);
    }
}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    fn available(&self) -> usize {
        (**self).available()
    }

    fn read(&mut self) -> u8 {
        (**self).read()
    }
}

/// In-memory stand-in for a serial port: what is written to `tx` stays
/// readable for inspection, what is pushed into `rx` is served to the
/// parser.
#[derive(Default)]
pub struct SerialMock<const N: usize> {
    pub rx: RingBuffer<N>,
    pub tx: RingBuffer<N>,
}

impl<const N: usize> SerialMock<N> {
    pub fn new() -> Self {
        SerialMock {
            rx: RingBuffer::new(),
            tx: RingBuffer::new(),
        }
    }

    /// Queue bytes as if they arrived from the wire.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.rx.write_slice(bytes);
    }

    /// Drain everything written to the tx side.
    pub fn sent(&mut self) -> Vec<u8, N> {
        let mut out = Vec::new();
        while !self.tx.is_empty() {
            let _ = out.push(self.tx.read());
        }
        out
    }
}

impl<const N: usize> ByteSink for SerialMock<N> {
    fn write(&mut self, byte: u8) {
        self.tx.write(byte);
    }
}

impl<const N: usize> ByteSource for SerialMock<N> {
    fn available(&self) -> usize {
        self.rx.len()
    }

    fn read(&mut self) -> u8 {
        self.rx.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer_as_source() {
        let mut buffer = RingBuffer::<8>::new();
        ByteSink::write_slice(&mut buffer, &[0x90, 0x3c, 0x40]);
        assert_eq!(ByteSource::available(&buffer), 3);
        assert_eq!(ByteSource::read(&mut buffer), 0x90);
    }

    #[test]
    fn test_vec_sink_drops_on_overflow() {
        let mut sink = Vec::<u8, 2>::new();
        sink.write(1);
        sink.write(2);
        sink.write(3);
        assert_eq!(&sink[..], &[1, 2]);
    }

    #[test]
    fn test_serial_mock_round_trip() {
        let mut serial = SerialMock::<16>::new();
        serial.feed(&[0xf8]);
        assert_eq!(serial.available(), 1);
        assert_eq!(serial.read(), 0xf8);

        serial.write_slice(&[0xfa, 0xfc]);
        assert_eq!(&serial.sent()[..], &[0xfa, 0xfc]);
    }
}

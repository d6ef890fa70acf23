//! 7-bit-safe binary codec for System Exclusive payloads
//!
//! Arbitrary 8-bit data cannot travel inside a SysEx frame, where every
//! payload byte must stay below 0x80. The codec packs each group of up to 7
//! data bytes behind a header byte collecting their high bits: 7 data bytes
//! become 8 wire bytes, a final partial group of `r` bytes becomes `r + 1`.
//!
//! By default the high bit of data byte `i` lands in header bit `6 - i`;
//! `flip_header_bits` uses bit `i` instead, for peers that pack the other
//! way around.

/// Errors of the SysEx codec.
#[cfg_attr(feature = "std", derive(Debug))]
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// The output slice cannot hold the result.
    OutputTooShort,
}

/// Wire length of `len` data bytes once encoded.
pub const fn encoded_sysex_len(len: usize) -> usize {
    len + (len + 6) / 7
}

/// Data length recovered from `len` wire bytes.
pub const fn decoded_sysex_len(len: usize) -> usize {
    len - (len + 7) / 8
}

/// Encode `data` into `out`, returning the number of bytes written.
pub fn encode_sysex(data: &[u8], out: &mut [u8], flip_header_bits: bool) -> Result<usize, CodecError> {
    if out.len() < encoded_sysex_len(data.len()) {
        return Err(CodecError::OutputTooShort);
    }

    let mut written = 0;
    for chunk in data.chunks(7) {
        let header = written;
        out[header] = 0;
        written += 1;
        for (i, &byte) in chunk.iter().enumerate() {
            let shift = if flip_header_bits { i } else { 6 - i };
            out[header] |= (byte >> 7) << shift;
            out[written] = byte & 0x7f;
            written += 1;
        }
    }
    Ok(written)
}

/// Decode `encoded` into `out`, returning the number of bytes written.
///
/// `flip_header_bits` must match the encoding side.
pub fn decode_sysex(
    encoded: &[u8],
    out: &mut [u8],
    flip_header_bits: bool,
) -> Result<usize, CodecError> {
    if out.len() < decoded_sysex_len(encoded.len()) {
        return Err(CodecError::OutputTooShort);
    }

    let mut written = 0;
    for chunk in encoded.chunks(8) {
        let header = chunk[0];
        for (i, &body) in chunk[1..].iter().enumerate() {
            let shift = if flip_header_bits { i } else { 6 - i };
            out[written] = ((header >> shift) & 1) << 7 | body;
            written += 1;
        }
    }
    Ok(written)
}

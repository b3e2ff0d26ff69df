//! Abridged frame codec for the persistent-socket transport.
//!
//! This crate owns the wire representation of one message on an abridged
//! socket: a length indicator counted in 4-byte words, followed by the payload.
//! It is pure and runtime-free so both the transport and tooling can share it.
//!
//! ```text
//! short form:  [w]                    payload (4 * w bytes)   w <= 126
//! long form:   [0x7F][w0][w1][w2]     payload (4 * w bytes)   w little-endian
//! ```

/// Byte sent once right after the socket opens to select abridged framing.
pub const HANDSHAKE_FLAG: u8 = 0xEF;

/// First byte of a long-form length prefix.
pub const LONG_FORM_MARKER: u8 = 0x7F;

/// Largest word count that fits the one-byte short form.
pub const MAX_SHORT_WORDS: usize = 126;

/// Largest word count representable by the 3-byte long form.
pub const MAX_WORDS: usize = (1 << 24) - 1;

const WORD: usize = 4;
const LONG_PREFIX_LEN: usize = 4;

/// Error returned by [`encode`] and [`decode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Payload length is not a multiple of 4.
    #[error("payload length {0} is not a multiple of 4")]
    UnalignedLength(usize),
    /// Payload is longer than the long-form prefix can describe.
    #[error("payload length {0} exceeds the abridged frame limit")]
    TooLong(usize),
    /// Buffer holds no length prefix at all.
    #[error("empty frame buffer")]
    Empty,
    /// First byte is neither a short-form length nor the long-form marker.
    #[error("invalid length prefix byte {0:#04x}")]
    InvalidPrefix(u8),
    /// Buffer ends before the declared frame does.
    #[error("truncated frame: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
}

/// Total wire length of a frame carrying `payload_len` bytes.
///
/// # Errors
///
/// Same conditions as [`encode`].
pub fn encoded_len(payload_len: usize) -> Result<usize, CodecError> {
    let words = word_count(payload_len)?;
    let prefix = if words <= MAX_SHORT_WORDS { 1 } else { LONG_PREFIX_LEN };
    Ok(prefix + payload_len)
}

/// Encode a payload as one abridged frame.
///
/// # Errors
///
/// Returns [`CodecError::UnalignedLength`] when the payload length is not a
/// multiple of 4 and [`CodecError::TooLong`] when it needs more than 24 bits
/// of word count.
#[allow(clippy::cast_possible_truncation)]
pub fn encode(payload: &[u8]) -> Result<Vec<u8>, CodecError> {
    let words = word_count(payload.len())?;

    let mut out = Vec::with_capacity(encoded_len(payload.len())?);
    if words <= MAX_SHORT_WORDS {
        // Bounded by MAX_SHORT_WORDS above.
        out.push(words as u8);
    } else {
        out.push(LONG_FORM_MARKER);
        out.extend_from_slice(&(words as u32).to_le_bytes()[..3]);
    }
    out.extend_from_slice(payload);
    Ok(out)
}

/// Decode one abridged frame from the front of `buffer`.
///
/// Returns the payload and the number of bytes the frame occupied, so a
/// buffer holding several frames can be walked by advancing that many bytes.
///
/// # Errors
///
/// Returns [`CodecError::Empty`] for an empty buffer,
/// [`CodecError::InvalidPrefix`] for a first byte above the long-form marker,
/// and [`CodecError::Truncated`] when fewer bytes remain than declared.
pub fn decode(buffer: &[u8]) -> Result<(&[u8], usize), CodecError> {
    let Some(&first) = buffer.first() else {
        return Err(CodecError::Empty);
    };

    let (words, prefix) = match first {
        LONG_FORM_MARKER => {
            let Some(raw) = buffer.get(1..LONG_PREFIX_LEN) else {
                return Err(CodecError::Truncated { expected: LONG_PREFIX_LEN, actual: buffer.len() });
            };
            let words = usize::from(raw[0]) | (usize::from(raw[1]) << 8) | (usize::from(raw[2]) << 16);
            (words, LONG_PREFIX_LEN)
        }
        short if short < LONG_FORM_MARKER => (usize::from(short), 1),
        other => return Err(CodecError::InvalidPrefix(other)),
    };

    let expected = prefix + words * WORD;
    let Some(payload) = buffer.get(prefix..expected) else {
        return Err(CodecError::Truncated { expected, actual: buffer.len() });
    };
    Ok((payload, expected))
}

fn word_count(payload_len: usize) -> Result<usize, CodecError> {
    if !payload_len.is_multiple_of(WORD) {
        return Err(CodecError::UnalignedLength(payload_len));
    }
    let words = payload_len / WORD;
    if words > MAX_WORDS {
        return Err(CodecError::TooLong(payload_len));
    }
    Ok(words)
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;

//! Bounded sliding FIFO of hard-decided bits, one bit per byte.
//!
//! The demodulator hands us bytes where each byte is already a hard decision in
//! `{0, 1}`, so there is no packing/unpacking to do here - just a fixed-size ring
//! that never grows, with a `head` kept at offset zero by shifting down on every
//! consuming operation.

/// `FRAME_LEN` frames of slack, matching the reference implementation's `10 * FRAME_LEN`
/// byte array.
pub(crate) const CAPACITY: usize = 10 * crate::tables::FRAME_LEN;

pub(crate) struct BitBuffer {
    data: [u8; CAPACITY],
    len: usize,
}

impl BitBuffer {
    pub(crate) fn new() -> Self {
        BitBuffer {
            data: [0u8; CAPACITY],
            len: 0,
        }
    }

    /// Appends as many bits from `input` as there is remaining capacity for.
    ///
    /// Returns the number actually accepted; the rest is silently dropped. This is the
    /// crate's sole form of backpressure - the caller can detect truncation by comparing
    /// the return value to `input.len()`.
    pub(crate) fn recv(&mut self, input: &[u8]) -> usize {
        let space = CAPACITY - self.len;
        let n = input.len().min(space);
        self.data[self.len..self.len + n].copy_from_slice(&input[..n]);
        self.len += n;
        n
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Discards the first `n` bits (clamped to the current length), shifting everything
    /// else down so the head stays at offset zero.
    pub(crate) fn advance(&mut self, n: usize) {
        let n = n.min(self.len);
        self.data.copy_within(n..self.len, 0);
        self.len -= n;
    }
}

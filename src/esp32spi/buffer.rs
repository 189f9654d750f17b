//! Transaction staging buffer
//!
//! Small writes (command bytes, one colour) dominate display traffic. They are
//! collected here and handed to the peripheral in blocks of up to
//! [`DATA_BUF_LEN`] bytes. Every method that may transmit takes the transmit
//! path as a closure, so the buffer never owns the hardware.

/// Capacity of the staging buffer in bytes
pub const DATA_BUF_LEN: usize = 64;

/// Fixed staging area with a write cursor
#[derive(Debug, Clone)]
pub struct TransactionBuffer {
    data: [u8; DATA_BUF_LEN],
    len: usize,
}

impl Default for TransactionBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionBuffer {
    pub const fn new() -> Self {
        Self {
            data: [0; DATA_BUF_LEN],
            len: 0,
        }
    }

    /// Bytes waiting to be transmitted
    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn is_full(&self) -> bool {
        self.len == DATA_BUF_LEN
    }

    /// Free space before the next flush
    pub const fn remaining(&self) -> usize {
        DATA_BUF_LEN - self.len
    }

    /// Pending bytes, in write order
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Queue `bytes` behind what is already buffered.
    ///
    /// A write of at most [`DATA_BUF_LEN`] bytes that does not fit flushes the
    /// buffer first and then lands whole in the empty buffer, so a word is
    /// never split between two transfers. Longer writes are streamed: fill,
    /// flush, refill.
    pub fn append<F>(&mut self, mut bytes: &[u8], tx: &mut F)
    where
        F: FnMut(&[u8]),
    {
        if bytes.len() > self.remaining() && bytes.len() <= DATA_BUF_LEN {
            self.flush(tx);
        }

        while !bytes.is_empty() {
            if self.is_full() {
                self.flush(tx);
            }
            let n = bytes.len().min(self.remaining());
            self.data[self.len..self.len + n].copy_from_slice(&bytes[..n]);
            self.len += n;
            bytes = &bytes[n..];
        }
    }

    /// Queue `total` bytes cycling through `pattern`.
    ///
    /// The free space is filled in one go and the buffer only goes out when it
    /// is full, however short the pattern is.
    pub fn append_cycle<F>(&mut self, pattern: &[u8], total: u64, tx: &mut F)
    where
        F: FnMut(&[u8]),
    {
        if pattern.is_empty() {
            return;
        }

        let mut offset = 0;
        let mut left = total;
        while left > 0 {
            if self.is_full() {
                self.flush(tx);
            }
            let room = self.remaining();
            let n = usize::try_from(left).map_or(room, |left| left.min(room));
            let source = pattern.iter().cycle().skip(offset);
            for (slot, byte) in self.data[self.len..self.len + n].iter_mut().zip(source) {
                *slot = *byte;
            }
            offset = (offset + n) % pattern.len();
            self.len += n;
            left -= n as u64;
        }
    }

    /// Hand the pending bytes to `tx` and empty the buffer. No-op when empty.
    pub fn flush<F>(&mut self, tx: &mut F)
    where
        F: FnMut(&[u8]),
    {
        if self.len == 0 {
            return;
        }
        tx(&self.data[..self.len]);
        self.len = 0;
    }
}

//! Growable read buffer used while a request is still arriving.

pub const INITIAL_CAPACITY: usize = 8;

/// Byte buffer with an explicit count of valid, unconsumed bytes.
///
/// Reads land in [`ReadBuffer::spare_mut`]; the capacity doubles whenever the
/// buffer is full. [`ReadBuffer::consume`] shifts the remainder to the front so
/// the next read appends directly after real data.
#[derive(Debug)]
pub struct ReadBuffer {
    buf: Vec<u8>,
    filled: usize,
}

impl Default for ReadBuffer {
    fn default() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }
}

impl ReadBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity.max(1)],
            filled: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// The valid bytes not yet consumed.
    pub fn filled(&self) -> &[u8] {
        &self.buf[..self.filled]
    }

    /// Free space after the valid bytes, grown first if there is none.
    pub fn spare_mut(&mut self) -> &mut [u8] {
        if self.filled == self.buf.len() {
            let doubled = self.buf.len() * 2;
            self.buf.resize(doubled, 0);
        }
        &mut self.buf[self.filled..]
    }

    /// Records `n` freshly read bytes written into the spare space.
    pub fn advance(&mut self, n: usize) {
        debug_assert!(self.filled + n <= self.buf.len());
        self.filled += n;
    }

    /// Drops `n` bytes from the front, moving the rest down.
    pub fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.filled);
        self.buf.copy_within(n..self.filled, 0);
        self.filled -= n;
    }
}

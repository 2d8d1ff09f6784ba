//! # Fixed-Size Bitset
//!
//! Activity bits over borrowed (usually arena) bytes.
//!
//! ## Performance
//!
//! - Activate / deactivate / query: O(1)
//! - First active / inactive scan: O(n/8), whole bytes that are all-1 or
//!   all-0 are skipped without looking at individual bits

/// A fixed-size bit vector over a borrowed byte slice.
///
/// Bit `i` lives in byte `i / 8`, bit `i % 8`. Bits past `len` in the last
/// byte are kept at zero so whole-byte scans never report them.
#[derive(Debug)]
pub struct BitSet<'a> {
    /// Backing bytes, at least `bytes_for(len)` long.
    bytes: &'a mut [u8],
    /// Number of addressable bits.
    len: usize,
}

impl<'a> BitSet<'a> {
    /// Number of bytes needed to hold `len` bits.
    #[inline]
    #[must_use]
    pub const fn bytes_for(len: usize) -> usize {
        len.div_ceil(8)
    }

    /// Wraps `bytes` as a bitset of `len` bits, clearing every bit.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is shorter than `bytes_for(len)`.
    #[must_use]
    pub fn new(bytes: &'a mut [u8], len: usize) -> Self {
        assert!(
            bytes.len() >= Self::bytes_for(len),
            "bitset of {len} bits needs {} bytes",
            Self::bytes_for(len)
        );
        let bytes = &mut bytes[..Self::bytes_for(len)];
        bytes.fill(0);
        Self { bytes, len }
    }

    /// Number of addressable bits.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the bitset addresses zero bits.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sets bit `index`.
    #[inline]
    pub fn activate(&mut self, index: usize) {
        debug_assert!(index < self.len, "bit index out of bounds");
        self.bytes[index / 8] |= 1 << (index % 8);
    }

    /// Clears bit `index`.
    #[inline]
    pub fn deactivate(&mut self, index: usize) {
        debug_assert!(index < self.len, "bit index out of bounds");
        self.bytes[index / 8] &= !(1 << (index % 8));
    }

    /// Checks bit `index`. Out-of-range indices read as inactive.
    #[inline]
    #[must_use]
    pub fn is_active(&self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        (self.bytes[index / 8] >> (index % 8)) & 1 == 1
    }

    /// Lowest clear bit, or None if every bit is set.
    #[must_use]
    pub fn first_inactive(&self) -> Option<usize> {
        for (byte_idx, byte) in self.bytes.iter().enumerate() {
            if *byte == u8::MAX {
                continue;
            }
            let index = byte_idx * 8 + byte.trailing_ones() as usize;
            // Padding bits in the last byte are zero; never report them.
            return (index < self.len).then_some(index);
        }
        None
    }

    /// Lowest set bit, or None if every bit is clear.
    #[must_use]
    pub fn first_active(&self) -> Option<usize> {
        self.bytes
            .iter()
            .enumerate()
            .find(|(_, byte)| **byte != 0)
            .map(|(byte_idx, byte)| byte_idx * 8 + byte.trailing_zeros() as usize)
    }

    /// Whether every bit is set. Vacuously true when empty.
    #[inline]
    #[must_use]
    pub fn are_all_active(&self) -> bool {
        self.first_inactive().is_none()
    }

    /// Whether every bit is clear.
    #[inline]
    #[must_use]
    pub fn are_all_inactive(&self) -> bool {
        self.bytes.iter().all(|byte| *byte == 0)
    }

    /// Number of set bits.
    #[must_use]
    pub fn count_active(&self) -> usize {
        self.bytes.iter().map(|byte| byte.count_ones() as usize).sum()
    }

    /// Clears every bit.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// Iterates over set bit indices in ascending order.
    pub fn iter_active(&self) -> ActiveBits<'_> {
        ActiveBits {
            bytes: &self.bytes[..],
            byte_idx: 0,
            current: self.bytes.first().copied().unwrap_or(0),
        }
    }
}

/// Iterator over set bit indices.
pub struct ActiveBits<'b> {
    bytes: &'b [u8],
    byte_idx: usize,
    current: u8,
}

impl Iterator for ActiveBits<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                // Clear the lowest set bit.
                self.current &= self.current - 1;
                return Some(self.byte_idx * 8 + bit);
            }
            self.byte_idx += 1;
            self.current = *self.bytes.get(self.byte_idx)?;
        }
    }
}

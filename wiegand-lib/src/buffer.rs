use crate::constants::{MAX_BITS, MAX_BYTES};

/// Fixed-capacity store of captured bits, oldest first.
///
/// Bits live in a `u128` shift register so appending is a shift and an or. Nothing here
/// allocates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitBuffer {
    bits: u128,
    count: u8,
    overflowed: bool,
}

impl BitBuffer {
    pub const fn new() -> Self {
        Self {
            bits: 0,
            count: 0,
            overflowed: false,
        }
    }

    /// Stores a bit, or marks the buffer overflowed once it is full.
    ///
    /// Returns `false` when the bit was dropped.
    pub fn append(&mut self, bit: bool) -> bool {
        if self.count >= MAX_BITS {
            self.overflowed = true;
            return false;
        }
        self.bits = (self.bits << 1) | u128::from(bit);
        self.count += 1;
        true
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn len(&self) -> u8 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Bit `index` in transmission order (0 is the first bit received).
    pub fn bit(&self, index: u8) -> Option<bool> {
        (index < self.count).then(|| (self.bits >> (self.count - 1 - index)) & 1 == 1)
    }

    /// Packs the stored bits MSB-first, zero-padding the high bits of the first byte.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::pack(self.bits, self.count)
    }
}

/// Byte-packed copy of up to `MAX_BITS` bits.
///
/// A 4-bit value `1111` packs as `[0x0F]`, a 10-bit value as two bytes with the top six bits
/// of the first byte zero.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    bytes: [u8; MAX_BYTES],
    len: usize,
    bits: u8,
}

impl Snapshot {
    pub(crate) fn pack(value: u128, bits: u8) -> Self {
        let len = usize::from(bits).div_ceil(8);
        let mut bytes = [0u8; MAX_BYTES];
        for (i, byte) in bytes[..len].iter_mut().enumerate() {
            let shift = 8 * (len - 1 - i);
            *byte = (value >> shift) as u8;
        }
        Self { bytes, len, bits }
    }

    /// Packs `bits` bits taken from the low end of `value`.
    pub fn from_value(value: u128, bits: u8) -> Self {
        let bits = bits.min(MAX_BITS);
        let mask = if bits == 0 { 0 } else { u128::MAX >> (128 - u32::from(bits)) };
        Self::pack(value & mask, bits)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Bit `index` in transmission order.
    pub fn bit(&self, index: u8) -> Option<bool> {
        (index < self.bits).then(|| (self.value() >> (self.bits - 1 - index)) & 1 == 1)
    }

    /// The packed bits as an integer, first bit most significant.
    pub fn value(&self) -> u128 {
        self.as_bytes()
            .iter()
            .fold(0u128, |acc, &b| (acc << 8) | u128::from(b))
    }
}

impl AsRef<[u8]> for Snapshot {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl core::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Snapshot({} bits, {:02x?})", self.bits, self.as_bytes())
    }
}

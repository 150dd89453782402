// Protocol constants for Wiegand readers

/// Capacity of the bit buffer. Longer frames overflow and are reported as `SizeTooBig`.
pub const MAX_BITS: u8 = 80;

/// Bytes needed to hold `MAX_BITS` packed bits
pub const MAX_BYTES: usize = (MAX_BITS as usize).div_ceil(8);

/// Silence after the last bit that ends an any-length frame (milliseconds)
pub const DEFAULT_TIMEOUT_MS: u32 = 25;

/// Raw sentinel for "any length", as accepted by `Length::from_raw`
pub const LENGTH_ANY: u8 = 0xFF;

/// 4-bit keypad frame: one key, no check bits
pub const KEYPAD_4_BITS: u8 = 4;

/// 8-bit keypad frame: key nibble followed by its complement
pub const KEYPAD_8_BITS: u8 = 8;

/// 26-bit card frame: even parity, 24 data bits, odd parity
pub const WIEGAND_26_BITS: u8 = 26;

/// 32-bit frame without check bits
pub const WIEGAND_32_BITS: u8 = 32;

/// 34-bit card frame: even parity, 32 data bits, odd parity
pub const WIEGAND_34_BITS: u8 = 34;

//! Tests for format validation and payload extraction

mod common;

use common::*;
use proptest::prelude::*;

fn decoding() -> Config {
    Config::default()
}

fn passthrough() -> Config {
    Config::default().with_decode_messages(false)
}

#[test]
fn test_passthrough_is_identity() {
    let frames = [
        encode_keypad_4(0x0B),
        encode_keypad_8(0x07),
        encode_26(0x7F, 0xBEEF),
        Snapshot::from_value(0x1234_5678, 32),
        encode_34(0xCAFE_F00D),
        // Not even a known length
        frame("1100110011"),
    ];

    for raw in frames {
        let message = decode(&raw, false, &passthrough()).expect("passthrough never fails");
        assert_eq!(message.data(), raw.as_bytes(), "{:?}", raw);
        assert_eq!(message.bits(), raw.bits());
    }
}

#[test]
fn test_keypad_4_passthrough() {
    let message = decode(&frame("1011"), false, &decoding()).unwrap();
    assert_eq!(hex::encode(message.data()), "0b");
    assert_eq!(message.bits(), 4);
}

#[test]
fn test_keypad_8_all_inputs() {
    for value in 0u8..=255 {
        let high = value >> 4;
        let low = value & 0x0F;
        let result = decode(&Snapshot::from_value(u128::from(value), 8), false, &decoding());

        if low == !high & 0x0F {
            let message = result.unwrap_or_else(|f| panic!("{:#04x} rejected: {:?}", value, f));
            assert_eq!(message.data(), &[low]);
            assert_eq!(message.bits(), 4);
        } else {
            let failure = result.expect_err("bad complement accepted");
            assert_eq!(failure.error, DataError::VerificationFailed);
            assert_eq!(failure.raw.as_bytes(), &[value]);
        }
    }
}

#[test]
fn test_wiegand_26_fields() {
    let message = decode(&encode_26(123, 45_678), false, &decoding()).unwrap();
    assert_eq!(message.bits(), 24);
    assert_eq!(hex::encode(message.data()), "7bb26e");
    assert_eq!(message.facility_code(), Some(123));
    assert_eq!(message.card_number(), Some(45_678));
}

#[test]
fn test_wiegand_34_payload() {
    let message = decode(&encode_34(0xDEAD_BEEF), false, &decoding()).unwrap();
    assert_eq!(message.bits(), 32);
    assert_eq!(hex::encode(message.data()), "deadbeef");
    assert_eq!(message.as_u64(), Some(0xDEAD_BEEF));
    assert_eq!(message.facility_code(), None);
}

#[test]
fn test_wiegand_32_taken_as_is() {
    // Any bit pattern is accepted, no parity
    let message = decode(&Snapshot::from_value(0x8000_0001, 32), false, &decoding()).unwrap();
    assert_eq!(hex::encode(message.data()), "80000001");
}

#[test]
fn test_unknown_lengths_fail_decode() {
    for bits in [1u8, 2, 3, 5, 7, 9, 10, 16, 24, 25, 27, 33, 35, 37, 64, MAX_BITS] {
        let raw = Snapshot::from_value(u128::MAX, bits);
        let failure = decode(&raw, false, &decoding()).expect_err("unknown length accepted");
        assert_eq!(failure.error, DataError::DecodeFailed, "{} bits", bits);
        assert_eq!(failure.raw, raw);
    }
}

#[test]
fn test_overflow_wins_over_everything() {
    let raw = encode_26(1, 2);
    for config in [decoding(), passthrough(), Config::new(Length::Bits(26), true)] {
        let failure = decode(&raw, true, &config).unwrap_err();
        assert_eq!(failure.error, DataError::SizeTooBig);
    }
}

#[test]
fn test_unexpected_size_checked_before_decoding() {
    let config = Config::new(Length::Bits(34), false);
    let failure = decode(&encode_26(1, 2), false, &config).unwrap_err();
    assert_eq!(failure.error, DataError::SizeUnexpected);
    assert_eq!(failure.raw.bits(), 26);
}

fn flip(raw: &Snapshot, index: u8) -> Snapshot {
    let bits = raw.bits();
    Snapshot::from_value(raw.value() ^ (1u128 << (bits - 1 - index)), bits)
}

proptest! {
    #[test]
    fn prop_wiegand_26_roundtrip(facility in any::<u8>(), card in any::<u16>()) {
        let message = decode(&encode_26(facility, card), false, &decoding()).unwrap();
        prop_assert_eq!(message.facility_code(), Some(facility));
        prop_assert_eq!(message.card_number(), Some(card));
    }

    #[test]
    fn prop_wiegand_26_single_flip_fails(facility in any::<u8>(), card in any::<u16>(), index in 0u8..26) {
        let corrupted = flip(&encode_26(facility, card), index);
        let failure = decode(&corrupted, false, &decoding()).unwrap_err();
        prop_assert_eq!(failure.error, DataError::VerificationFailed);
        prop_assert_eq!(failure.raw, corrupted);
    }

    #[test]
    fn prop_wiegand_34_roundtrip(payload in any::<u32>()) {
        let message = decode(&encode_34(payload), false, &decoding()).unwrap();
        prop_assert_eq!(message.as_u64(), Some(u64::from(payload)));
        prop_assert_eq!(message.bits(), 32);
    }

    #[test]
    fn prop_wiegand_34_single_flip_fails(payload in any::<u32>(), index in 0u8..34) {
        let corrupted = flip(&encode_34(payload), index);
        let failure = decode(&corrupted, false, &decoding()).unwrap_err();
        prop_assert_eq!(failure.error, DataError::VerificationFailed);
    }
}

//! Tests for edge cases and error handling

mod common;

use common::*;

#[test]
fn test_check_timeout_on_empty_session_is_noop() {
    let (mut wiegand, events) = recording_wiegand(Config::default());
    for now in [0, 25, 1_000, u32::MAX] {
        wiegand.check_timeout(now);
    }
    assert!(drain(&events).is_empty());
}

#[test]
fn test_handlers_are_optional() {
    let mut wiegand = Wiegand::new(Config::new(Length::Bits(4), true)).unwrap();
    wiegand.set_data0(true);
    wiegand.set_data1(true);
    send_bits(&mut wiegand, &[1, 0, 1, 1], 0);
    assert_eq!(wiegand.pending_bits(), 0);
}

#[test]
fn test_invalid_configuration_rejected() {
    assert!(Wiegand::new(Config::new(Length::Bits(0), true)).is_err());
    assert!(Wiegand::new(Config::new(Length::Bits(MAX_BITS + 1), true)).is_err());
    assert!(Wiegand::new(Config::new(Length::from_raw(LENGTH_ANY), true)).is_ok());

    let err = Wiegand::new(Config::new(Length::Bits(0), true)).unwrap_err();
    assert_eq!(err.to_string(), format!("Invalid expected length 0: must be between 1 and {}", MAX_BITS));
}

#[test]
fn test_data_error_codes_and_names() {
    let all = [
        (DataError::Communication, 0u8, "Communication"),
        (DataError::SizeTooBig, 1, "SizeTooBig"),
        (DataError::SizeUnexpected, 2, "SizeUnexpected"),
        (DataError::DecodeFailed, 3, "DecodeFailed"),
        (DataError::VerificationFailed, 4, "VerificationFailed"),
    ];
    for (error, code, name) in all {
        assert_eq!(u8::from(error), code);
        assert_eq!(DataError::try_from(code).unwrap(), error);
        assert_eq!(error.to_string(), name);
        assert!(!error.description().is_empty());
    }
    assert!(DataError::try_from(5).is_err());
}

#[test]
fn test_instances_share_nothing() {
    let (mut first, first_events) = recording_wiegand(Config::new(Length::Bits(4), true));
    let (mut second, second_events) = recording_wiegand(Config::default());

    send_bits(&mut first, &[1, 0, 1, 1], 0);
    send_bits(&mut second, &[0, 1], 0);
    second.set_data0(false);
    second.set_data1(false);

    assert_eq!(drain(&first_events), vec![Event::Received { data: vec![0x0B], bits: 4 }]);
    assert_eq!(drain(&second_events), vec![Event::State(false)]);
    assert!(first.is_connected());
    assert_eq!(second.pending_bits(), 3);
}

#[test]
fn test_handler_replacement() {
    let (mut wiegand, events) = recording_wiegand(Config::new(Length::Bits(4), true));
    let counter: std::sync::Arc<std::sync::Mutex<u32>> = Default::default();
    wiegand.on_receive(
        |message, counter: &mut std::sync::Arc<std::sync::Mutex<u32>>| {
            *counter.lock().unwrap() += u32::from(message.data()[0]);
        },
        counter.clone(),
    );

    send_bits(&mut wiegand, &[1, 0, 1, 1], 0);
    send_bits(&mut wiegand, &[0, 0, 0, 1], 20);
    assert_eq!(*counter.lock().unwrap(), 12);
    // The original receive handler no longer fires
    assert!(drain(&events).is_empty());
}

//! End-to-end ZWC text engine scenarios (spec §8 scenario 4).

use veilcode::Password;
use veilcode::engine::zwc::{self, Placement, ZwcOptions};

#[test]
fn round_trip_with_password_succeeds() {
    let cover = "The quick brown fox jumps over the lazy dog. ".repeat(10);
    let password = Password::new("mypassword");

    let options = ZwcOptions::new(Placement::Appended).password(password);
    let encoded = zwc::encode_text(&cover, "Secret message", &options);
    assert!(zwc::has_hidden_data(&encoded));

    let secret = zwc::decode_text(&encoded, &options).unwrap().unwrap();
    assert_eq!(secret, "Secret message");
}

#[test]
fn wrong_password_fails_almost_surely() {
    let cover = "The quick brown fox jumps over the lazy dog. ".repeat(10);
    let encode_options = ZwcOptions::new(Placement::Appended).password(Password::new("right"));
    let encoded = zwc::encode_text(&cover, "Secret message", &encode_options);

    let decode_options = ZwcOptions::new(Placement::Appended).password(Password::new("wrong"));
    let result = zwc::decode_text(&encoded, &decode_options);
    assert!(result.is_err());
}

#[test]
fn detection_and_stripping() {
    let cover = "hello world".to_string();
    assert!(!zwc::has_hidden_data(&cover));

    let encoded = zwc::encode_text(&cover, "s", &ZwcOptions::new(Placement::Appended));
    assert!(zwc::has_hidden_data(&encoded));
    assert_eq!(zwc::strip_zwc(&encoded).trim_end(), cover);
}

#[test]
fn distributed_mode_scatters_through_cover() {
    let cover = "One. Two. Three. Four. Five. Six. Seven. Eight. Nine. Ten.".repeat(5);
    let options = ZwcOptions::new(Placement::Distributed);
    let encoded = zwc::encode_text(&cover, "hidden", &options);
    let secret = zwc::decode_text(&encoded, &options).unwrap().unwrap();
    assert_eq!(secret, "hidden");
    // Distributed placement should not simply append after the cover text.
    assert_ne!(zwc::strip_zwc(&encoded), encoded);
}

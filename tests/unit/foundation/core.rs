use super::*;

#[test]
fn parses_long_short_and_alpha_hex() {
    assert_eq!(
        FrameColor::parse_hex("#4A90E2").unwrap(),
        FrameColor::rgb(0x4A, 0x90, 0xE2)
    );
    assert_eq!(
        FrameColor::parse_hex("4a90e2").unwrap(),
        FrameColor::rgb(0x4A, 0x90, 0xE2)
    );
    assert_eq!(
        FrameColor::parse_hex("#f0a").unwrap(),
        FrameColor::rgb(0xFF, 0x00, 0xAA)
    );

    let c = FrameColor::parse_hex("#0000ff80").unwrap();
    assert_eq!(c.a, 0x80);
    assert_eq!(c.to_hex(), "#0000FF80");
}

#[test]
fn rejects_malformed_hex() {
    for bad in ["", "#12", "#12345", "#gggggg", "#1234567", "#ÿÿÿ"] {
        let err = FrameColor::parse_hex(bad).unwrap_err();
        assert!(err.to_string().contains("validation error:"), "{bad}");
    }
}

#[test]
fn hex_round_trips_through_serde() {
    let c: FrameColor = serde_json::from_str("\"#4a90e2\"").unwrap();
    assert_eq!(c, FrameColor::DEFAULT);
    assert_eq!(serde_json::to_string(&c).unwrap(), "\"#4A90E2\"");

    let translucent = FrameColor {
        r: 1,
        g: 2,
        b: 3,
        a: 4,
    };
    assert_eq!(translucent.to_hex(), "#01020304");
    assert!(serde_json::from_str::<FrameColor>("\"nope\"").is_err());
}

#[test]
fn canvas_pixel_count() {
    let c = Canvas {
        width: 1200,
        height: 1200,
    };
    assert_eq!(c.pixel_count(), 1_440_000);
}

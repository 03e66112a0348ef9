use super::*;

#[test]
fn normalize_path_slash_normalization() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[test]
fn parse_classifies_sources() {
    assert_eq!(
        ImageSource::parse("frames/gold.png").unwrap(),
        ImageSource::Path("frames/gold.png".to_owned())
    );
    assert!(matches!(
        ImageSource::parse("data:image/png;base64,AAAA").unwrap(),
        ImageSource::DataUrl(_)
    ));

    let err = ImageSource::parse("https://cdn.test/frame.png").unwrap_err();
    assert!(matches!(err, FrameitError::Decode(_)));
    assert!(ImageSource::parse("blob:http://x/1").is_err());
    assert!(ImageSource::parse("   ").is_err());
}

#[test]
fn data_url_header_parsing() {
    let d = parse_data_url("data:image/jpeg;base64,/9j/").unwrap();
    assert_eq!(d.mime, "image/jpeg");
    assert!(d.base64);
    assert_eq!(d.payload, "/9j/");

    let d = parse_data_url("data:,hello").unwrap();
    assert_eq!(d.mime, "text/plain");
    assert!(!d.base64);

    assert!(parse_data_url("data:image/png;base64").is_err());
    assert!(parse_data_url("image/png;base64,AAAA").is_err());
}

#[test]
fn data_url_encode_decode() {
    let url = encode_data_url("image/png", b"\x89PNG");
    assert!(url.starts_with("data:image/png;base64,"));
    let (mime, bytes) = decode_data_url(&url).unwrap();
    assert_eq!(mime, "image/png");
    assert_eq!(bytes, b"\x89PNG");

    // Line-wrapped payloads are accepted.
    let (_, bytes) = decode_data_url("data:image/png;base64,iVBO\nRw==").unwrap();
    assert_eq!(bytes, b"\x89PNG");

    assert!(decode_data_url("data:image/png;base64,***").is_err());
    assert!(decode_data_url("data:image/svg+xml,%3Csvg").is_err());
}

#[test]
fn load_reads_relative_files_and_reports_missing_ones() {
    let dir = std::path::PathBuf::from("target").join("unit_source_load");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("a.bin"), b"xyz").unwrap();

    let src = ImageSource::parse("a.bin").unwrap();
    assert_eq!(src.load(&dir).unwrap(), b"xyz");

    let missing = ImageSource::parse("missing.bin").unwrap();
    let err = missing.load(&dir).unwrap_err();
    assert!(matches!(err, FrameitError::Decode(_)));
    assert!(missing.describe().contains("missing.bin"));

    let bytes = ImageSource::from_bytes(vec![1u8, 2, 3]);
    assert_eq!(bytes.load(&dir).unwrap(), vec![1, 2, 3]);
}

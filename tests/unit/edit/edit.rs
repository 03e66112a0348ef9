use chrono::Utc;

use super::*;

fn placement(scale: f64, rotate: f64) -> UserCustomization {
    UserCustomization {
        user_image: None,
        placement: PhotoPlacement {
            scale_percent: scale,
            rotate_degrees: rotate,
            offset: Vec2::new(12.0, -4.0),
        },
    }
}

#[test]
fn slider_bounds_are_inclusive() {
    placement(50.0, 0.0).validate().unwrap();
    placement(150.0, 360.0).validate().unwrap();
    assert!(matches!(
        placement(49.9, 0.0).validate(),
        Err(FrameitError::Validation(_))
    ));
    assert!(placement(100.0, 360.5).validate().is_err());
    assert!(placement(100.0, -1.0).validate().is_err());
    assert!(placement(f64::NAN, 0.0).validate().is_err());
}

#[test]
fn non_finite_offsets_are_rejected() {
    let mut c = placement(100.0, 0.0);
    c.placement.offset = Vec2::new(f64::INFINITY, 0.0);
    assert!(c.validate().is_err());
}

#[test]
fn from_template_carries_suggested_placement() {
    let t = FrameTemplate {
        frame_id: "frame_abc".to_owned(),
        user_id: "u".to_owned(),
        image_url: "frames/gold.png".to_owned(),
        frame_color: "#112233".parse().unwrap(),
        caption: "hi".to_owned(),
        template_name: "Gold".to_owned(),
        custom_path: None,
        scale: 120.0,
        rotate: 15.0,
        created_at: Utc::now(),
    };
    let edit = FrameEdit::from_template(&t).unwrap();
    assert_eq!(edit.frame_id.as_deref(), Some("frame_abc"));
    assert_eq!(edit.overlay, ImageSource::Path("frames/gold.png".to_owned()));
    assert_eq!(edit.frame_color.to_hex(), "#112233");
    assert_eq!(edit.customization.placement.scale_percent, 120.0);
    assert_eq!(edit.customization.placement.rotate_degrees, 15.0);
    assert!(edit.customization.user_image.is_none());

    let with_photo = edit.with_photo(ImageSource::from_bytes(vec![1, 2]));
    assert!(with_photo.customization.user_image.is_some());
}

#[test]
fn from_template_rejects_remote_overlays() {
    let t = FrameTemplate {
        frame_id: "frame_abc".to_owned(),
        user_id: "u".to_owned(),
        image_url: "https://cdn.test/f.png".to_owned(),
        frame_color: FrameColor::DEFAULT,
        caption: String::new(),
        template_name: "name".to_owned(),
        custom_path: None,
        scale: 100.0,
        rotate: 0.0,
        created_at: Utc::now(),
    };
    assert!(matches!(
        FrameEdit::from_template(&t),
        Err(FrameitError::Decode(_))
    ));
}

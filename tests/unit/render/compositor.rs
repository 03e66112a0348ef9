use super::*;
use crate::foundation::core::Vec2;
use crate::render::transform::{PhotoPlacement, resolve_user_transform};

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];

fn solid(w: u32, h: u32, px: [u8; 4]) -> PreparedImage {
    let bytes = px.iter().copied().cycle().take((w * h * 4) as usize).collect();
    PreparedImage::from_straight(w, h, bytes).unwrap()
}

/// 16x16 overlay: transparent 4 px border, opaque green window in the middle.
fn window_overlay() -> PreparedImage {
    let mut bytes = Vec::with_capacity(16 * 16 * 4);
    for y in 0..16u32 {
        for x in 0..16u32 {
            let inside = (4..12).contains(&x) && (4..12).contains(&y);
            bytes.extend_from_slice(if inside { &GREEN } else { &[0, 0, 0, 0] });
        }
    }
    PreparedImage::from_straight(16, 16, bytes).unwrap()
}

fn geometry() -> CanvasGeometry {
    CompositorOpts::default()
        .with_output_size(64)
        .with_preview_size(32)
        .geometry()
        .unwrap()
}

fn placed(scale: f64, rotate: f64, offset: (f64, f64)) -> UserTransform {
    resolve_user_transform(
        geometry(),
        &PhotoPlacement {
            scale_percent: scale,
            rotate_degrees: rotate,
            offset: Vec2::new(offset.0, offset.1),
        },
    )
}

fn color_px(c: FrameColor) -> [u8; 4] {
    [c.r, c.g, c.b, c.a]
}

#[test]
fn no_photo_and_transparent_overlay_yields_solid_frame_color() {
    let color = FrameColor::parse_hex("#4A90E2").unwrap();
    let overlay = solid(64, 64, [0, 0, 0, 0]);
    let surface = composite(&CompositeInput {
        frame_color: color,
        user_image: None,
        user_transform: UserTransform::centered(geometry()),
        overlay: &overlay,
    })
    .unwrap();

    assert_eq!((surface.width, surface.height), (64, 64));
    for px in surface.data.chunks_exact(4) {
        assert_eq!(px, &[0x4A, 0x90, 0xE2, 0xFF]);
    }
}

#[test]
fn frame_color_shows_where_overlay_is_transparent() {
    let color = FrameColor::rgb(10, 20, 30);
    let overlay = window_overlay();
    let surface = composite(&CompositeInput {
        frame_color: color,
        user_image: None,
        user_transform: UserTransform::centered(geometry()),
        overlay: &overlay,
    })
    .unwrap();

    for (x, y) in [(0, 0), (2, 2), (63, 0), (0, 63), (61, 61), (32, 1)] {
        assert_eq!(surface.pixel(x, y), Some(color_px(color)), "({x},{y})");
    }
    assert_eq!(surface.pixel(32, 32), Some(GREEN));
}

#[test]
fn compositing_is_pure() {
    let photo = solid(8, 8, RED);
    let overlay = window_overlay();
    let input = CompositeInput {
        frame_color: FrameColor::DEFAULT,
        user_image: Some(&photo),
        user_transform: placed(73.0, 33.0, (3.5, -2.0)),
        overlay: &overlay,
    };
    let a = composite(&input).unwrap();
    let b = composite(&input).unwrap();
    assert_eq!(a, b);
}

#[test]
fn photo_is_stretched_to_cover_the_canvas_at_identity() {
    let photo = solid(5, 3, RED);
    let overlay = solid(4, 4, [0, 0, 0, 0]);
    let surface = composite(&CompositeInput {
        frame_color: FrameColor::DEFAULT,
        user_image: Some(&photo),
        user_transform: UserTransform::centered(geometry()),
        overlay: &overlay,
    })
    .unwrap();

    for (x, y) in [(0, 0), (63, 63), (32, 32), (0, 63)] {
        assert_eq!(surface.pixel(x, y), Some(RED), "({x},{y})");
    }
}

#[test]
fn half_scale_photo_leaves_a_frame_color_margin() {
    let color = FrameColor::rgb(1, 2, 3);
    let photo = solid(8, 8, RED);
    let overlay = solid(4, 4, [0, 0, 0, 0]);
    let surface = composite(&CompositeInput {
        frame_color: color,
        user_image: Some(&photo),
        user_transform: placed(50.0, 0.0, (0.0, 0.0)),
        overlay: &overlay,
    })
    .unwrap();

    assert_eq!(surface.pixel(32, 32), Some(RED));
    assert_eq!(surface.pixel(2, 2), Some(color_px(color)));
    assert_eq!(surface.pixel(61, 32), Some(color_px(color)));
}

#[test]
fn offset_moves_the_photo_in_output_space() {
    let color = FrameColor::rgb(1, 2, 3);
    let photo = solid(8, 8, RED);
    let overlay = solid(4, 4, [0, 0, 0, 0]);
    // 8 preview px = 16 output px: the half-size photo now spans x in [32, 64].
    let surface = composite(&CompositeInput {
        frame_color: color,
        user_image: Some(&photo),
        user_transform: placed(50.0, 0.0, (8.0, 0.0)),
        overlay: &overlay,
    })
    .unwrap();

    assert_eq!(surface.pixel(40, 32), Some(RED));
    assert_eq!(surface.pixel(60, 32), Some(RED));
    assert_eq!(surface.pixel(20, 32), Some(color_px(color)));
}

#[test]
fn rotated_photo_uncovers_the_corners() {
    let color = FrameColor::rgb(1, 2, 3);
    let photo = solid(8, 8, RED);
    let overlay = solid(4, 4, [0, 0, 0, 0]);
    let surface = composite(&CompositeInput {
        frame_color: color,
        user_image: Some(&photo),
        user_transform: placed(100.0, 45.0, (0.0, 0.0)),
        overlay: &overlay,
    })
    .unwrap();

    assert_eq!(surface.pixel(32, 32), Some(RED));
    for (x, y) in [(1, 1), (62, 1), (1, 62), (62, 62)] {
        assert_eq!(surface.pixel(x, y), Some(color_px(color)), "({x},{y})");
    }
}

#[test]
fn overlay_is_drawn_above_the_photo() {
    let photo = solid(8, 8, RED);
    let overlay = window_overlay();
    let surface = composite(&CompositeInput {
        frame_color: FrameColor::DEFAULT,
        user_image: Some(&photo),
        user_transform: UserTransform::centered(geometry()),
        overlay: &overlay,
    })
    .unwrap();

    assert_eq!(surface.pixel(32, 32), Some(GREEN));
    assert_eq!(surface.pixel(1, 1), Some(RED));
}

#[test]
fn translucent_frame_color_stays_translucent() {
    let color = FrameColor::parse_hex("#FF000080").unwrap();
    let overlay = solid(4, 4, [0, 0, 0, 0]);
    let surface = composite(&CompositeInput {
        frame_color: color,
        user_image: None,
        user_transform: UserTransform::centered(geometry()),
        overlay: &overlay,
    })
    .unwrap();

    let px = surface.pixel(10, 10).unwrap();
    assert!(px[3].abs_diff(128) <= 1, "{px:?}");
    assert!(px[0].abs_diff(128) <= 1, "{px:?}");
    assert_eq!(&px[1..3], &[0, 0]);
}

#[test]
fn opts_reject_oversized_output() {
    assert!(
        CompositorOpts::default()
            .with_output_size(70_000)
            .geometry()
            .is_err()
    );
    assert!(CompositorOpts::default().with_preview_size(0).geometry().is_err());
}

#[test]
fn surface_accessors() {
    let s = RasterSurface {
        width: 2,
        height: 1,
        data: vec![10, 20, 30, 255, 64, 0, 0, 128],
    };
    assert_eq!(s.pixel(1, 0), Some([64, 0, 0, 128]));
    assert_eq!(s.pixel(2, 0), None);
    assert_eq!(s.pixel(0, 1), None);
    assert_eq!(s.to_premul_rgb8(), vec![10, 20, 30, 64, 0, 0]);
    assert_eq!(s.to_straight_rgba8(), vec![10, 20, 30, 255, 128, 0, 0, 128]);
}

#[test]
fn zero_sized_layers_are_rejected() {
    assert!(matches!(
        pixmap_from_premul_bytes(&[], 0, 0),
        Err(FrameitError::Decode(_))
    ));
    assert!(matches!(
        pixmap_from_premul_bytes(&[], 4, 0),
        Err(FrameitError::Decode(_))
    ));
    assert!(PreparedImage::from_premul(0, 0, Vec::new()).is_err());
}

#[test]
fn opts_read_size_overrides_from_lookup() {
    let opts = CompositorOpts::from_lookup(|name| match name {
        "FRAMEIT_OUTPUT_SIZE" => Some("640".to_owned()),
        "FRAMEIT_PREVIEW_SIZE" => Some("0".to_owned()),
        _ => None,
    });
    assert_eq!(opts.output_size, 640);
    assert_eq!(opts.preview_size, CompositorOpts::default().preview_size);
    assert_eq!(CompositorOpts::from_lookup(|_| None), CompositorOpts::default());
}

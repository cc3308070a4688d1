// Host-side tests for color parsing and palette fallback.

use gradient_core::color::{
    default_palette, normalize_color, parse_color_array, parse_rgb_color, parse_rgba_color,
    resolve_palette, MAX_COLORS,
};
use gradient_core::ColorError;

fn approx(a: [f32; 4], b: [f32; 4]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-6)
}

#[test]
fn channels_normalize_to_unit_range() {
    for c in [0u32, 1, 127, 254, 255] {
        let rgba = parse_rgba_color(&format!("rgb({c},{c},{c})")).expect("valid");
        assert!(approx(rgba, [c as f32 / 255.0, c as f32 / 255.0, c as f32 / 255.0, 1.0]));
    }
}

#[test]
fn whitespace_and_case_are_ignored() {
    let rgba = parse_rgba_color(" RGBA( 255, 0 ,51 , 0.5 ) ").expect("valid");
    assert!(approx(rgba, [1.0, 0.0, 0.2, 0.5]));
    assert_eq!(parse_rgb_color("rgb(255,0,0)"), Ok([1.0, 0.0, 0.0]));
}

#[test]
fn malformed_inputs_are_rejected() {
    for input in ["rgb(1,2)", "hsl(1,2,3)", "rgb(1,2,3", "rgb(-1,2,3)", "rgb(1.5,2,3)", "", "#ff0000"] {
        assert!(
            matches!(parse_rgba_color(input), Err(ColorError::Malformed { .. })),
            "{input} should be malformed"
        );
    }
}

#[test]
fn out_of_range_components_are_rejected() {
    assert!(matches!(
        parse_rgba_color("rgb(256,0,0)"),
        Err(ColorError::OutOfRange { .. })
    ));
    assert!(matches!(
        parse_rgba_color("rgba(0,0,0,1.5)"),
        Err(ColorError::OutOfRange { .. })
    ));
}

#[test]
fn lists_are_rejected_as_a_whole() {
    assert_eq!(parse_color_array::<&str>(&[]), Err(ColorError::Empty));
    let six = ["rgb(0,0,0)"; MAX_COLORS + 1];
    assert_eq!(parse_color_array(&six), Err(ColorError::TooMany { count: 6 }));
    let one_bad = ["rgb(0,0,0)", "rgb(0,0)", "rgb(1,1,1)"];
    assert!(matches!(
        parse_color_array(&one_bad),
        Err(ColorError::Invalid { index: 1, .. })
    ));
    let good = ["rgb(255,0,0)", "rgba(0,255,0,0.25)"];
    let colors = parse_color_array(&good).expect("valid list");
    assert_eq!(colors.len(), 2);
    assert!(approx(colors[1], [0.0, 1.0, 0.0, 0.25]));
}

#[test]
fn hex_palette_normalizes() {
    assert!(approx(
        normalize_color(0xc3e4ff),
        [195.0 / 255.0, 228.0 / 255.0, 1.0, 1.0]
    ));
    let palette = default_palette();
    assert_eq!(palette.len(), 4);
    assert!(palette.iter().all(|c| c[3] == 1.0));
}

#[test]
fn palette_falls_back_to_defaults() {
    let none = resolve_palette::<&str>(None);
    assert_eq!(none.colors, default_palette());
    assert!(none.fallback.is_none());

    let valid = resolve_palette(Some(&["rgb(0,0,255)"][..]));
    assert_eq!(valid.colors, vec![[0.0, 0.0, 1.0, 1.0]]);
    assert!(valid.fallback.is_none());

    let invalid = resolve_palette(Some(&["not-a-color"][..]));
    assert_eq!(invalid.colors, default_palette());
    assert!(matches!(
        invalid.fallback,
        Some(ColorError::Invalid { index: 0, .. })
    ));
}

#[test]
fn palettes_with_a_fallback_reason_clone() {
    let invalid = resolve_palette(Some(&["rgb(1,2)", "rgb(0,0,0)"][..]));
    let copy = invalid.clone();
    assert_eq!(copy, invalid);
    assert!(matches!(copy.fallback, Some(ColorError::Invalid { index: 0, .. })));
}

//! Color input handling: `rgb()`/`rgba()` strings from the host and the
//! built-in hex palette, both normalized to RGBA in the 0..1 range.

use crate::constants::DEFAULT_SECTION_COLORS;
use crate::error::ColorError;

pub type Rgba = [f32; 4];

/// Most colors accepted from the host: one base color plus four wave layers.
pub const MAX_COLORS: usize = 5;

/// Parses `rgb(r, g, b)` or `rgba(r, g, b, a)`; whitespace and case are
/// ignored. Channels must be integers in 0..=255 and alpha in 0..=1; alpha
/// defaults to 1.
pub fn parse_rgba_color(input: &str) -> Result<Rgba, ColorError> {
    let malformed = || ColorError::Malformed {
        input: input.to_owned(),
    };
    let clean: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    let inner = clean
        .strip_prefix("rgba(")
        .or_else(|| clean.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(malformed)?;

    let parts: Vec<&str> = inner.split(',').collect();
    if !(3..=4).contains(&parts.len()) {
        return Err(malformed());
    }
    let mut rgba = [0.0, 0.0, 0.0, 1.0];
    for (slot, part) in rgba.iter_mut().zip(&parts[..3]) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let channel: u32 = part.parse().map_err(|_| ColorError::OutOfRange {
            input: input.to_owned(),
        })?;
        if channel > 255 {
            return Err(ColorError::OutOfRange {
                input: input.to_owned(),
            });
        }
        *slot = channel as f32 / 255.0;
    }
    if let Some(alpha) = parts.get(3) {
        if alpha.is_empty() || !alpha.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
            return Err(malformed());
        }
        let a: f32 = alpha.parse().map_err(|_| malformed())?;
        if !(0.0..=1.0).contains(&a) {
            return Err(ColorError::OutOfRange {
                input: input.to_owned(),
            });
        }
        rgba[3] = a;
    }
    Ok(rgba)
}

/// RGB-only form of [`parse_rgba_color`].
pub fn parse_rgb_color(input: &str) -> Result<[f32; 3], ColorError> {
    parse_rgba_color(input).map(|[r, g, b, _]| [r, g, b])
}

/// Parses a whole list; any bad entry rejects the list.
pub fn parse_color_array<S: AsRef<str>>(colors: &[S]) -> Result<Vec<Rgba>, ColorError> {
    if colors.is_empty() {
        return Err(ColorError::Empty);
    }
    if colors.len() > MAX_COLORS {
        return Err(ColorError::TooMany {
            count: colors.len(),
        });
    }
    colors
        .iter()
        .enumerate()
        .map(|(index, color)| {
            parse_rgba_color(color.as_ref()).map_err(|e| ColorError::Invalid {
                index,
                source: Box::new(e),
            })
        })
        .collect()
}

/// `0xRRGGBB` -> `[r, g, b, 1.0]`.
pub fn normalize_color(hex: u32) -> Rgba {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        1.0,
    ]
}

pub fn default_palette() -> Vec<Rgba> {
    DEFAULT_SECTION_COLORS.iter().copied().map(normalize_color).collect()
}

/// Colors a gradient renders with, plus the reason host colors were
/// discarded when the built-in palette had to be used instead.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    pub colors: Vec<Rgba>,
    pub fallback: Option<ColorError>,
}

/// Host colors if they all parse, otherwise the default palette (logged).
pub fn resolve_palette<S: AsRef<str>>(colors: Option<&[S]>) -> Palette {
    match colors.map(parse_color_array) {
        None => Palette {
            colors: default_palette(),
            fallback: None,
        },
        Some(Ok(colors)) => Palette {
            colors,
            fallback: None,
        },
        Some(Err(e)) => {
            log::warn!("invalid gradient colors, using defaults: {}", e);
            Palette {
                colors: default_palette(),
                fallback: Some(e),
            }
        }
    }
}

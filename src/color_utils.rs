//! Color utility functions shared by the scheme loaders.
//!
//! Hierarchical schemes describe colors as CSS `rgba(...)` strings while the
//! view layer wants a plain `#rrggbb` code, so conversion lives here.

/// Parse an `rgba(r, g, b, a)` or `rgb(r, g, b)` string into RGB bytes.
///
/// The alpha component is ignored. Components may be integers or decimals;
/// decimals are rounded and clamped to 0-255.
///
/// # Returns
/// `None` if fewer than three numeric components are present.
pub fn parse_rgba(text: &str) -> Option<[u8; 3]> {
    let inner = text
        .trim()
        .trim_start_matches("rgba")
        .trim_start_matches("rgb")
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')');

    let mut rgb = [0u8; 3];
    let mut parts = inner.split(',');
    for channel in rgb.iter_mut() {
        *channel = parse_channel(parts.next()?)?;
    }
    Some(rgb)
}

fn parse_channel(part: &str) -> Option<u8> {
    let part = part.trim();
    if let Ok(value) = part.parse::<u8>() {
        return Some(value);
    }
    let value: f32 = part.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(value.round().clamp(0.0, 255.0) as u8)
}

/// Format RGB bytes as a lowercase `#rrggbb` hex code.
pub fn rgb_to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// Convert a CSS `rgba(...)` string straight to a hex code.
pub fn rgba_to_hex(text: &str) -> Option<String> {
    parse_rgba(text).map(rgb_to_hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rgba_ignores_alpha() {
        assert_eq!(parse_rgba("rgba(255, 0, 128, 0.5)"), Some([255, 0, 128]));
        assert_eq!(parse_rgba("rgb(1,2,3)"), Some([1, 2, 3]));
    }

    #[test]
    fn test_parse_rgba_decimal_channels() {
        assert_eq!(parse_rgba("rgba(10.4, 300, 0, 1)"), Some([10, 255, 0]));
    }

    #[test]
    fn test_parse_rgba_rejects_garbage() {
        assert_eq!(parse_rgba("rgba(1, 2)"), None);
        assert_eq!(parse_rgba("blue"), None);
    }

    #[test]
    fn test_rgba_to_hex() {
        assert_eq!(rgba_to_hex("rgba(0, 0, 0, 1)").as_deref(), Some("#000000"));
        assert_eq!(
            rgba_to_hex("rgba(255, 171, 16, 1)").as_deref(),
            Some("#ffab10")
        );
    }
}

//! Color normalization for subtitle styling

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ColorError;

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap());

/// A color as supplied by a caller: numeric components or text.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorValue {
    /// Numeric components in RGBA order
    Components(Vec<f32>),
    /// A hex string or an `rgba(r,g,b,a)` string
    Text(String),
}

impl From<&str> for ColorValue {
    fn from(value: &str) -> Self {
        ColorValue::Text(value.to_string())
    }
}

impl From<String> for ColorValue {
    fn from(value: String) -> Self {
        ColorValue::Text(value)
    }
}

impl From<Vec<f32>> for ColorValue {
    fn from(value: Vec<f32>) -> Self {
        ColorValue::Components(value)
    }
}

impl From<(u8, u8, u8, u8)> for ColorValue {
    fn from((r, g, b, a): (u8, u8, u8, u8)) -> Self {
        ColorValue::Components(vec![r as f32, g as f32, b as f32, a as f32])
    }
}

/// Normalize a color into a hex string.
///
/// Hex input matching `#RGB` or `#RRGGBB` passes through unchanged.
/// Anything else must carry exactly four numeric components; the first
/// three are rounded and clamped to 0..=255, the alpha component is
/// discarded, and the result is lower-case `#rrggbb`.
pub fn validate_color(value: &ColorValue) -> Result<String, ColorError> {
    match value {
        ColorValue::Text(text) => {
            let text = text.trim();
            if HEX_COLOR.is_match(text) {
                return Ok(text.to_string());
            }
            let components = parse_rgba_text(text)?;
            hex_from_components(&components)
        }
        ColorValue::Components(components) => hex_from_components(components),
    }
}

fn parse_rgba_text(text: &str) -> Result<Vec<f32>, ColorError> {
    let inner = text
        .strip_prefix("rgba(")
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| ColorError::Unrecognized(text.to_string()))?;

    inner
        .split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<f32>()
                .map_err(|_| ColorError::NonNumeric(part.to_string()))
        })
        .collect()
}

fn hex_from_components(components: &[f32]) -> Result<String, ColorError> {
    if components.len() != 4 {
        return Err(ColorError::ComponentCount {
            got: components.len(),
        });
    }

    let [r, g, b] =
        [components[0], components[1], components[2]].map(|c| c.round().clamp(0.0, 255.0) as u8);
    Ok(format!("#{r:02x}{g:02x}{b:02x}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_tuple_to_hex() {
        let color = ColorValue::from((255, 0, 0, 255));
        assert_eq!(validate_color(&color).unwrap(), "#ff0000");
    }

    #[test]
    fn test_rgba_string_to_hex() {
        let color = ColorValue::from("rgba(0,128,255,1)");
        assert_eq!(validate_color(&color).unwrap(), "#0080ff");
    }

    #[test]
    fn test_rgba_string_allows_spaces() {
        let color = ColorValue::from("rgba(12, 34.6, 300, 0.5)");
        assert_eq!(validate_color(&color).unwrap(), "#0c23ff");
    }

    #[test]
    fn test_hex_passes_through_unchanged() {
        for hex in ["#ABC", "#abc", "#FFFFFF", "#0080ff"] {
            let color = ColorValue::from(hex);
            assert_eq!(validate_color(&color).unwrap(), hex);
        }
    }

    #[test]
    fn test_components_are_clamped_and_rounded() {
        let color = ColorValue::from(vec![-10.0, 127.5, 260.0, 0.0]);
        assert_eq!(validate_color(&color).unwrap(), "#0080ff");
    }

    #[test]
    fn test_wrong_arity_is_rejected() {
        let err = validate_color(&ColorValue::from(vec![1.0, 2.0, 3.0])).unwrap_err();
        assert!(matches!(err, ColorError::ComponentCount { got: 3 }));

        let err = validate_color(&ColorValue::from("rgba(1,2)")).unwrap_err();
        assert!(matches!(err, ColorError::ComponentCount { got: 2 }));
    }

    #[test]
    fn test_non_numeric_component_is_rejected() {
        let err = validate_color(&ColorValue::from("rgba(red,0,0,1)")).unwrap_err();
        assert!(matches!(err, ColorError::NonNumeric(_)));
    }

    #[test]
    fn test_unrecognized_text_is_rejected() {
        for bad in ["red", "#ABCD", "rgb(1,2,3)", "rgba(1,2,3,4"] {
            let err = validate_color(&ColorValue::from(bad)).unwrap_err();
            assert!(matches!(err, ColorError::Unrecognized(_)), "input: {bad}");
        }
    }
}

use crossterm::style::{Attribute, Color, ContentStyle};

/// 24-bit true color parsed from a theme entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrueColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl TrueColor {
    /// Create a new true color from RGB values
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (the leading `#` is optional)
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Self::new(r, g, b))
    }
}

impl From<TrueColor> for Color {
    fn from(c: TrueColor) -> Self {
        Color::Rgb {
            r: c.r,
            g: c.g,
            b: c.b,
        }
    }
}

/// Build a terminal style from a theme entry such as `"#ff0000 bold"`.
///
/// Recognised tokens are `#RRGGBB` (foreground), `bg:#RRGGBB` (background)
/// and the attributes `bold`, `italic`, `underline`, `reverse` and `blink`.
/// Unknown tokens are ignored, so an empty string yields the terminal default.
#[must_use]
pub fn parse_style(spec: &str) -> ContentStyle {
    let mut style = ContentStyle::new();

    for token in spec.split_whitespace() {
        if let Some(bg) = token.strip_prefix("bg:") {
            if let Some(color) = TrueColor::from_hex(bg) {
                style.background_color = Some(color.into());
            }
            continue;
        }

        let token = token.strip_prefix("fg:").unwrap_or(token);
        if token.starts_with('#') {
            if let Some(color) = TrueColor::from_hex(token) {
                style.foreground_color = Some(color.into());
            }
            continue;
        }

        let attribute = match token.to_ascii_lowercase().as_str() {
            "bold" => Attribute::Bold,
            "italic" => Attribute::Italic,
            "underline" => Attribute::Underlined,
            "reverse" => Attribute::Reverse,
            "blink" => Attribute::SlowBlink,
            _ => continue,
        };
        style.attributes.set(attribute);
    }

    style
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(TrueColor::from_hex("#3399ff"), Some(TrueColor::new(0x33, 0x99, 0xFF)));
        assert_eq!(TrueColor::from_hex("3399FF"), Some(TrueColor::new(0x33, 0x99, 0xFF)));
        assert_eq!(TrueColor::from_hex("#39f"), None);
        assert_eq!(TrueColor::from_hex("#zz99ff"), None);
    }

    #[test]
    fn test_parse_style_color_and_bold() {
        let style = parse_style("#ff0000 bold");
        assert_eq!(style.foreground_color, Some(Color::Rgb { r: 255, g: 0, b: 0 }));
        assert!(style.attributes.has(Attribute::Bold));
        assert_eq!(style.background_color, None);
    }

    #[test]
    fn test_parse_style_empty_is_default() {
        assert_eq!(parse_style(""), ContentStyle::new());
    }

    #[test]
    fn test_parse_style_background() {
        let style = parse_style("bg:#000000 #ffffff");
        assert_eq!(style.background_color, Some(Color::Rgb { r: 0, g: 0, b: 0 }));
        assert_eq!(style.foreground_color, Some(Color::Rgb { r: 255, g: 255, b: 255 }));
    }
}

use crossterm::style::Color;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn parse_hex(input: &str) -> Option<Self> {
        let hex = input.trim().strip_prefix('#').unwrap_or(input.trim());
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}

impl From<Rgb> for Color {
    fn from(c: Rgb) -> Self {
        Color::Rgb {
            r: c.r,
            g: c.g,
            b: c.b,
        }
    }
}

const PRESETS: [(&str, &str, &str); 5] = [
    ("default", "#5A56E0", "#EE6FF8"),
    ("ocean", "#00C9FF", "#92FE9D"),
    ("sunset", "#FF512F", "#F09819"),
    ("forest", "#134E5E", "#71B280"),
    ("mono", "#626262", "#EEEEEE"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gradient {
    pub start: Rgb,
    pub end: Rgb,
}

impl Default for Gradient {
    fn default() -> Self {
        Gradient::preset("default").unwrap_or(Gradient {
            start: Rgb { r: 0x5A, g: 0x56, b: 0xE0 },
            end: Rgb { r: 0xEE, g: 0x6F, b: 0xF8 },
        })
    }
}

impl Gradient {
    pub fn preset(name: &str) -> Option<Self> {
        PRESETS
            .iter()
            .find(|(preset, _, _)| preset.eq_ignore_ascii_case(name.trim()))
            .and_then(|(_, start, end)| Gradient::from_pair(start, end))
    }

    /// Accepts a preset name or a `#RRGGBB,#RRGGBB` pair.
    pub fn parse(input: &str) -> Option<Self> {
        match input.split_once(',') {
            Some((start, end)) => Gradient::from_pair(start, end),
            None => Gradient::preset(input),
        }
    }

    /// Like [`Gradient::parse`], but never fails: unknown values fall back to
    /// the default gradient with a warning.
    pub fn resolve(input: &str) -> Self {
        Gradient::parse(input).unwrap_or_else(|| {
            let presets: Vec<_> = Gradient::preset_names().collect();
            warn!(gradient = input, ?presets, "unknown gradient, using default");
            Gradient::default()
        })
    }

    pub fn preset_names() -> impl Iterator<Item = &'static str> {
        PRESETS.iter().map(|(name, _, _)| *name)
    }

    fn from_pair(start: &str, end: &str) -> Option<Self> {
        Some(Gradient {
            start: Rgb::parse_hex(start)?,
            end: Rgb::parse_hex(end)?,
        })
    }

    /// Color at position `t` along the gradient, `t` in `[0, 1]`.
    pub fn at(&self, t: f64) -> Rgb {
        self.start.lerp(self.end, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_with_and_without_hash() {
        let expected = Rgb { r: 0x5A, g: 0x56, b: 0xE0 };
        assert_eq!(Rgb::parse_hex("#5A56E0"), Some(expected));
        assert_eq!(Rgb::parse_hex("5a56e0"), Some(expected));
    }

    #[test]
    fn parse_hex_rejects_garbage() {
        assert_eq!(Rgb::parse_hex("#5A56E"), None);
        assert_eq!(Rgb::parse_hex("#GGGGGG"), None);
        assert_eq!(Rgb::parse_hex("#ééé"), None);
    }

    #[test]
    fn every_preset_parses() {
        for name in Gradient::preset_names() {
            assert!(Gradient::preset(name).is_some(), "{name}");
        }
    }

    #[test]
    fn parse_custom_pair() {
        let g = Gradient::parse("#000000,#FFFFFF").unwrap();
        assert_eq!(g.start, Rgb { r: 0, g: 0, b: 0 });
        assert_eq!(g.end, Rgb { r: 255, g: 255, b: 255 });
    }

    #[test]
    fn preset_lookup_ignores_case() {
        assert_eq!(Gradient::parse("Ocean"), Gradient::preset("ocean"));
    }

    #[test]
    fn unknown_preset_falls_back_to_default() {
        assert_eq!(Gradient::resolve("rainbow"), Gradient::default());
        assert_eq!(Gradient::resolve("#000000,nope"), Gradient::default());
    }

    #[test]
    fn interpolation_endpoints_and_midpoint() {
        let g = Gradient::parse("#000000,#FFFFFF").unwrap();
        assert_eq!(g.at(0.0), g.start);
        assert_eq!(g.at(1.0), g.end);
        assert_eq!(g.at(0.5), Rgb { r: 128, g: 128, b: 128 });
        assert_eq!(g.at(2.0), g.end);
    }
}

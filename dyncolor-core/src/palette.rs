//! Color tokens for the screen and the light/dark/dynamic resolution rule.

use anyhow::Result;
use log::warn;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn from_rgb(rgb: u32) -> Self {
        Color {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
        }
    }

    /// `hue` in degrees, `saturation` and `lightness` in `0.0..=1.0`.
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 360.0;
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);

        if s == 0.0 {
            let v = (l * 255.0).round() as u8;
            return Color { r: v, g: v, b: v };
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let channel = |t: f32| (hue_to_rgb(p, q, t) * 255.0).round() as u8;
        Color {
            r: channel(h + 1.0 / 3.0),
            g: channel(h),
            b: channel(h - 1.0 / 3.0),
        }
    }

    /// Returns `(hue in degrees, saturation, lightness)`.
    pub fn to_hsl(self) -> (f32, f32, f32) {
        let r = self.r as f32 / 255.0;
        let g = self.g as f32 / 255.0;
        let b = self.b as f32 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;
        let l = (max + min) / 2.0;

        if delta == 0.0 {
            return (0.0, 0.0, l);
        }

        let s = if l < 0.5 {
            delta / (max + min)
        } else {
            delta / (2.0 - max - min)
        };
        let h = if max == r {
            60.0 * ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        (h, s, l)
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

macro_rules! color_roles {
    ($($field:ident => $variant:ident, $name:literal;)*) => {
        /// Semantic role a color plays on the screen.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ColorRole {
            $($variant,)*
        }

        impl ColorRole {
            pub const ALL: &'static [ColorRole] = &[$(ColorRole::$variant,)*];

            pub fn name(self) -> &'static str {
                match self {
                    $(ColorRole::$variant => $name,)*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(ColorRole::$variant),)*
                    _ => None,
                }
            }
        }

        /// One color for every [`ColorRole`]. A set can't be built with a
        /// role missing.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct TokenSet {
            $(pub $field: Color,)*
        }

        impl TokenSet {
            pub fn get(&self, role: ColorRole) -> Color {
                match role {
                    $(ColorRole::$variant => self.$field,)*
                }
            }
        }
    };
}

color_roles! {
    primary => Primary, "primary";
    on_primary => OnPrimary, "onPrimary";
    primary_container => PrimaryContainer, "primaryContainer";
    on_primary_container => OnPrimaryContainer, "onPrimaryContainer";
    inverse_primary => InversePrimary, "inversePrimary";
    secondary => Secondary, "secondary";
    on_secondary => OnSecondary, "onSecondary";
    secondary_container => SecondaryContainer, "secondaryContainer";
    on_secondary_container => OnSecondaryContainer, "onSecondaryContainer";
    tertiary => Tertiary, "tertiary";
    on_tertiary => OnTertiary, "onTertiary";
    tertiary_container => TertiaryContainer, "tertiaryContainer";
    on_tertiary_container => OnTertiaryContainer, "onTertiaryContainer";
    background => Background, "background";
    on_background => OnBackground, "onBackground";
    surface => Surface, "surface";
    on_surface => OnSurface, "onSurface";
    surface_variant => SurfaceVariant, "surfaceVariant";
    on_surface_variant => OnSurfaceVariant, "onSurfaceVariant";
    inverse_surface => InverseSurface, "inverseSurface";
    inverse_on_surface => InverseOnSurface, "inverseOnSurface";
    error => Error, "error";
    on_error => OnError, "onError";
    error_container => ErrorContainer, "errorContainer";
    on_error_container => OnErrorContainer, "onErrorContainer";
    outline => Outline, "outline";
}

pub const LIGHT_TOKENS: TokenSet = TokenSet {
    primary: Color::from_rgb(0x6750A4),
    on_primary: Color::from_rgb(0xFFFFFF),
    primary_container: Color::from_rgb(0xEADDFF),
    on_primary_container: Color::from_rgb(0x21005D),
    inverse_primary: Color::from_rgb(0xD0BCFF),
    secondary: Color::from_rgb(0x625B71),
    on_secondary: Color::from_rgb(0xFFFFFF),
    secondary_container: Color::from_rgb(0xE8DEF8),
    on_secondary_container: Color::from_rgb(0x1D192B),
    tertiary: Color::from_rgb(0x7D5260),
    on_tertiary: Color::from_rgb(0xFFFFFF),
    tertiary_container: Color::from_rgb(0xFFD8E4),
    on_tertiary_container: Color::from_rgb(0x31111D),
    background: Color::from_rgb(0xFFFBFE),
    on_background: Color::from_rgb(0x1C1B1F),
    surface: Color::from_rgb(0xFFFBFE),
    on_surface: Color::from_rgb(0x1C1B1F),
    surface_variant: Color::from_rgb(0xE7E0EC),
    on_surface_variant: Color::from_rgb(0x49454F),
    inverse_surface: Color::from_rgb(0x313033),
    inverse_on_surface: Color::from_rgb(0xF4EFF4),
    error: Color::from_rgb(0xB3261E),
    on_error: Color::from_rgb(0xFFFFFF),
    error_container: Color::from_rgb(0xF9DEDC),
    on_error_container: Color::from_rgb(0x410E0B),
    outline: Color::from_rgb(0x79747E),
};

pub const DARK_TOKENS: TokenSet = TokenSet {
    primary: Color::from_rgb(0xD0BCFF),
    on_primary: Color::from_rgb(0x381E72),
    primary_container: Color::from_rgb(0x4F378B),
    on_primary_container: Color::from_rgb(0xEADDFF),
    inverse_primary: Color::from_rgb(0x6750A4),
    secondary: Color::from_rgb(0xCCC2DC),
    on_secondary: Color::from_rgb(0x332D41),
    secondary_container: Color::from_rgb(0x4A4458),
    on_secondary_container: Color::from_rgb(0xE8DEF8),
    tertiary: Color::from_rgb(0xEFB8C8),
    on_tertiary: Color::from_rgb(0x492532),
    tertiary_container: Color::from_rgb(0x633B48),
    on_tertiary_container: Color::from_rgb(0xFFD8E4),
    background: Color::from_rgb(0x1C1B1F),
    on_background: Color::from_rgb(0xE6E1E5),
    surface: Color::from_rgb(0x1C1B1F),
    on_surface: Color::from_rgb(0xE6E1E5),
    surface_variant: Color::from_rgb(0x49454F),
    on_surface_variant: Color::from_rgb(0xCAC4D0),
    inverse_surface: Color::from_rgb(0xE6E1E5),
    inverse_on_surface: Color::from_rgb(0x313033),
    error: Color::from_rgb(0xF2B8B5),
    on_error: Color::from_rgb(0x601410),
    error_container: Color::from_rgb(0x8C1D18),
    on_error_container: Color::from_rgb(0xF9DEDC),
    outline: Color::from_rgb(0x938F99),
};

/// Platform facility able to derive a token set from system context.
pub trait DynamicColorSource: Send + Sync {
    fn tokens(&self, dark: bool) -> Result<TokenSet>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeKind {
    StaticLight,
    StaticDark,
    DynamicLight,
    DynamicDark,
}

impl SchemeKind {
    pub fn is_dark(self) -> bool {
        matches!(self, SchemeKind::StaticDark | SchemeKind::DynamicDark)
    }

    pub fn is_dynamic(self) -> bool {
        matches!(self, SchemeKind::DynamicLight | SchemeKind::DynamicDark)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub kind: SchemeKind,
    pub tokens: TokenSet,
}

impl ColorScheme {
    pub fn static_for(dark: bool) -> Self {
        if dark {
            ColorScheme {
                kind: SchemeKind::StaticDark,
                tokens: DARK_TOKENS,
            }
        } else {
            ColorScheme {
                kind: SchemeKind::StaticLight,
                tokens: LIGHT_TOKENS,
            }
        }
    }
}

/// Picks the active scheme. With dynamic color available the source decides;
/// if it fails right now the static set for `dark_requested` is used instead.
pub fn resolve(
    dark_requested: bool,
    supports_dynamic_color: bool,
    source: &dyn DynamicColorSource,
) -> ColorScheme {
    if !supports_dynamic_color {
        return ColorScheme::static_for(dark_requested);
    }

    match source.tokens(dark_requested) {
        Ok(tokens) => ColorScheme {
            kind: if dark_requested {
                SchemeKind::DynamicDark
            } else {
                SchemeKind::DynamicLight
            },
            tokens,
        },
        Err(e) => {
            warn!("Dynamic color unavailable, using static palette: {:#}", e);
            ColorScheme::static_for(dark_requested)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct Fixed(TokenSet);

    impl DynamicColorSource for Fixed {
        fn tokens(&self, _dark: bool) -> Result<TokenSet> {
            Ok(self.0)
        }
    }

    struct Failing;

    impl DynamicColorSource for Failing {
        fn tokens(&self, _dark: bool) -> Result<TokenSet> {
            Err(anyhow!("no wallpaper"))
        }
    }

    fn tinted(color: Color) -> TokenSet {
        TokenSet {
            primary: color,
            ..LIGHT_TOKENS
        }
    }

    #[test]
    fn static_dark_is_used_role_for_role_without_dynamic_support() {
        let scheme = resolve(true, false, &Fixed(tinted(Color::from_rgb(0x123456))));
        assert_eq!(scheme.kind, SchemeKind::StaticDark);
        for role in ColorRole::ALL {
            assert_eq!(scheme.tokens.get(*role), DARK_TOKENS.get(*role), "{}", role.name());
        }
    }

    #[test]
    fn static_light_when_light_requested() {
        let scheme = resolve(false, false, &Failing);
        assert_eq!(scheme, ColorScheme::static_for(false));
        assert!(!scheme.kind.is_dark());
    }

    #[test]
    fn dynamic_source_wins_when_supported() {
        let custom = tinted(Color::from_rgb(0x00AA55));
        let scheme = resolve(true, true, &Fixed(custom));
        assert_eq!(scheme.kind, SchemeKind::DynamicDark);
        assert_eq!(scheme.tokens, custom);
    }

    #[test]
    fn failing_dynamic_source_falls_back_to_static() {
        let scheme = resolve(false, true, &Failing);
        assert_eq!(scheme.kind, SchemeKind::StaticLight);
        assert_eq!(scheme.tokens, LIGHT_TOKENS);
    }

    #[test]
    fn role_names_round_trip() {
        assert_eq!(ColorRole::ALL.len(), 26);
        for role in ColorRole::ALL {
            assert_eq!(ColorRole::from_name(role.name()), Some(*role));
        }
        assert_eq!(ColorRole::from_name("accent"), None);
    }

    #[test]
    fn hsl_conversion_matches_known_colors() {
        assert_eq!(Color::from_hsl(0.0, 1.0, 0.5), Color::from_rgb(0xFF0000));
        assert_eq!(Color::from_hsl(120.0, 1.0, 0.5), Color::from_rgb(0x00FF00));
        assert_eq!(Color::from_hsl(240.0, 1.0, 0.5), Color::from_rgb(0x0000FF));
        assert_eq!(Color::from_hsl(300.0, 0.0, 1.0), Color::from_rgb(0xFFFFFF));

        let (h, s, l) = Color::from_rgb(0x0000FF).to_hsl();
        assert!((h - 240.0).abs() < 0.01);
        assert!((s - 1.0).abs() < 0.01);
        assert!((l - 0.5).abs() < 0.01);
    }

    #[test]
    fn hex_formatting() {
        assert_eq!(LIGHT_TOKENS.primary.to_hex(), "#6750A4");
        assert_eq!(DARK_TOKENS.outline.to_string(), "#938F99");
    }
}

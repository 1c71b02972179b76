//! Dynamic color: token sets derived from the dominant hue of the current
//! desktop wallpaper.

use anyhow::{anyhow, Context, Result};
use image::RgbImage;
use log::{debug, info};
use std::path::PathBuf;

use crate::palette::{Color, DynamicColorSource, TokenSet};

/// Seed used when the wallpaper has no chromatic pixels at all.
const NEUTRAL_SEED: Color = Color::from_rgb(0x6750A4);

const HUE_BUCKETS: usize = 12;

/// What the running platform can do, probed once at start-up and passed around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlatformCapabilities {
    pub dynamic_color: bool,
}

impl PlatformCapabilities {
    /// Dynamic color needs a readable current wallpaper to seed from.
    pub fn detect() -> Self {
        let dynamic_color = current_wallpaper_path()
            .map(|path| path.is_file())
            .unwrap_or(false);
        info!("Dynamic color supported: {}", dynamic_color);
        Self { dynamic_color }
    }

    /// Capabilities with dynamic color turned off regardless of the platform.
    pub fn without_dynamic_color(self) -> Self {
        Self {
            dynamic_color: false,
        }
    }
}

fn current_wallpaper_path() -> Result<PathBuf> {
    let location = wallpaper::get().map_err(|e| anyhow!("failed to query current wallpaper: {e}"))?;
    let location = location.trim().trim_matches('\'');
    let location = location.strip_prefix("file://").unwrap_or(location);
    Ok(PathBuf::from(location))
}

/// [`DynamicColorSource`] reading the desktop wallpaper on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallpaperSeeded;

impl DynamicColorSource for WallpaperSeeded {
    fn tokens(&self, dark: bool) -> Result<TokenSet> {
        let path = current_wallpaper_path()?;
        let img = image::open(&path)
            .with_context(|| format!("Failed to open wallpaper {}", path.display()))?;

        let thumb = img.thumbnail(200, 200).to_rgb8();
        let seed = dominant_color(&thumb).unwrap_or(NEUTRAL_SEED);
        debug!("Seed color {} from {}", seed, path.display());
        Ok(derive_tokens(seed, dark))
    }
}

/// Average color of the most populated hue bucket, ignoring near-black,
/// near-white and grey pixels. `None` when nothing chromatic is left.
pub fn dominant_color(image: &RgbImage) -> Option<Color> {
    #[derive(Default, Clone, Copy)]
    struct Bucket {
        h_sum: f64,
        s_sum: f64,
        l_sum: f64,
        count: u64,
    }

    let mut buckets = [Bucket::default(); HUE_BUCKETS];

    for pixel in image.pixels() {
        let (h, s, l) = Color {
            r: pixel[0],
            g: pixel[1],
            b: pixel[2],
        }
        .to_hsl();

        if !(0.08..=0.92).contains(&l) || s < 0.1 {
            continue;
        }

        let bucket = &mut buckets[((h / 30.0) as usize).min(HUE_BUCKETS - 1)];
        bucket.h_sum += h as f64;
        bucket.s_sum += s as f64;
        bucket.l_sum += l as f64;
        bucket.count += 1;
    }

    let best = buckets.iter().filter(|b| b.count > 0).max_by_key(|b| b.count)?;
    let n = best.count as f64;
    Some(Color::from_hsl(
        (best.h_sum / n) as f32,
        (best.s_sum / n) as f32,
        (best.l_sum / n) as f32,
    ))
}

/// Builds a full token set around `seed`'s hue. Tones follow the Material
/// layout: accents at 40/80, containers at 90/30, neutrals near the ends.
pub fn derive_tokens(seed: Color, dark: bool) -> TokenSet {
    let (hue, saturation, _) = seed.to_hsl();
    let primary_s = saturation.clamp(0.35, 0.85);
    let secondary_s = primary_s * 0.35;
    let tertiary_hue = hue + 60.0;
    let tertiary_s = primary_s * 0.6;
    let neutral_s = primary_s * 0.06;
    let neutral_variant_s = primary_s * 0.12;
    const ERROR_HUE: f32 = 4.0;
    const ERROR_S: f32 = 0.75;

    let tone = |h: f32, s: f32, t: u8| Color::from_hsl(h, s, t as f32 / 100.0);

    // (accent, on-accent, container, on-container) tones
    let (a, on_a, c, on_c) = if dark { (80, 20, 30, 90) } else { (40, 100, 90, 10) };

    let accent = |h: f32, s: f32| (tone(h, s, a), tone(h, s, on_a), tone(h, s, c), tone(h, s, on_c));
    let (primary, on_primary, primary_container, on_primary_container) = accent(hue, primary_s);
    let (secondary, on_secondary, secondary_container, on_secondary_container) =
        accent(hue, secondary_s);
    let (tertiary, on_tertiary, tertiary_container, on_tertiary_container) =
        accent(tertiary_hue, tertiary_s);
    let (error, on_error, error_container, on_error_container) = accent(ERROR_HUE, ERROR_S);

    let n = |t: u8| tone(hue, neutral_s, t);
    let nv = |t: u8| tone(hue, neutral_variant_s, t);

    if dark {
        TokenSet {
            primary,
            on_primary,
            primary_container,
            on_primary_container,
            inverse_primary: tone(hue, primary_s, 40),
            secondary,
            on_secondary,
            secondary_container,
            on_secondary_container,
            tertiary,
            on_tertiary,
            tertiary_container,
            on_tertiary_container,
            background: n(10),
            on_background: n(90),
            surface: n(10),
            on_surface: n(90),
            surface_variant: nv(30),
            on_surface_variant: nv(80),
            inverse_surface: n(90),
            inverse_on_surface: n(20),
            error,
            on_error,
            error_container,
            on_error_container,
            outline: nv(60),
        }
    } else {
        TokenSet {
            primary,
            on_primary,
            primary_container,
            on_primary_container,
            inverse_primary: tone(hue, primary_s, 80),
            secondary,
            on_secondary,
            secondary_container,
            on_secondary_container,
            tertiary,
            on_tertiary,
            tertiary_container,
            on_tertiary_container,
            background: n(99),
            on_background: n(10),
            surface: n(99),
            on_surface: n(10),
            surface_variant: nv(90),
            on_surface_variant: nv(30),
            inverse_surface: n(20),
            inverse_on_surface: n(95),
            error,
            on_error,
            error_container,
            on_error_container,
            outline: nv(50),
        }
    }
}

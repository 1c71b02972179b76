use chrono::Utc;
use image::ImageFormat;
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::Config;
use crate::fetch::DecodedImage;

/// Largest edge, in pixels, the desktop facility is handed.
pub const MAX_WALLPAPER_EDGE: u32 = 16_384;

#[derive(Debug, Error)]
pub enum WallpaperError {
    #[error("bitmap is empty")]
    Empty,
    #[error("bitmap of {width}x{height} exceeds the {max}px limit")]
    Oversized { width: u32, height: u32, max: u32 },
    #[error("failed to write wallpaper file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode wallpaper: {0}")]
    Encode(#[from] image::ImageError),
    #[error("platform refused the wallpaper: {0}")]
    Platform(String),
}

/// The system-wide "replace wallpaper" facility.
pub trait WallpaperSetter: Send + Sync {
    fn set_wallpaper(&self, image: &DecodedImage) -> Result<(), WallpaperError>;
}

pub fn validate_bitmap(image: &DecodedImage) -> Result<(), WallpaperError> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(WallpaperError::Empty);
    }
    if width > MAX_WALLPAPER_EDGE || height > MAX_WALLPAPER_EDGE {
        return Err(WallpaperError::Oversized {
            width,
            height,
            max: MAX_WALLPAPER_EDGE,
        });
    }
    Ok(())
}

/// Writes the bitmap into the cache directory as PNG and points the desktop at it.
pub struct DesktopWallpaper {
    config: Config,
}

impl DesktopWallpaper {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn write_cached(&self, image: &DecodedImage) -> Result<PathBuf, WallpaperError> {
        let path = self.config.cached_wallpaper_path(Utc::now());
        image.bitmap.save_with_format(&path, ImageFormat::Png).map_err(|e| match e {
            image::ImageError::IoError(source) => WallpaperError::Io {
                path: path.clone(),
                source,
            },
            other => WallpaperError::Encode(other),
        })?;
        Ok(path)
    }
}

impl WallpaperSetter for DesktopWallpaper {
    fn set_wallpaper(&self, image: &DecodedImage) -> Result<(), WallpaperError> {
        validate_bitmap(image)?;
        let path = self.write_cached(image)?;
        set_wallpaper_from_path(&path)?;

        if let Err(e) = self.config.prune_cached_wallpapers(&path) {
            warn!("Failed to prune old cached wallpapers: {:#}", e);
        }
        Ok(())
    }
}

pub fn set_wallpaper_from_path(file_path: &Path) -> Result<(), WallpaperError> {
    let file_loc = file_path.to_string_lossy();

    match wallpaper::set_from_path(&file_loc) {
        Ok(()) => {
            info!("Wallpaper set successfully to: {}", file_loc);
            Ok(())
        }
        Err(e) => {
            warn!("wallpaper backend failed for {}: {}", file_loc, e);
            set_wallpaper_fallback(file_path, e.to_string())
        }
    }
}

#[cfg(target_os = "linux")]
fn set_wallpaper_fallback(file_path: &Path, backend_error: String) -> Result<(), WallpaperError> {
    use crate::desktop::DesktopEnvironment;
    use std::process::Command;

    let desktop_env = DesktopEnvironment::detect();
    let commands = fallback_commands(desktop_env, file_path);
    if commands.is_empty() {
        error!("Desktop environment {:?} not supported", desktop_env);
        return Err(WallpaperError::Platform(backend_error));
    }

    for (program, args) in &commands {
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| WallpaperError::Platform(format!("{program}: {e}")))?;
        if !output.status.success() {
            return Err(WallpaperError::Platform(format!(
                "{program} exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
    }

    info!("Wallpaper set through {:?} fallback", desktop_env);
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn set_wallpaper_fallback(_file_path: &Path, backend_error: String) -> Result<(), WallpaperError> {
    error!("No fallback wallpaper method on this platform");
    Err(WallpaperError::Platform(backend_error))
}

/// Commands that replace the wallpaper on desktops the `wallpaper` crate misses.
#[cfg(target_os = "linux")]
pub(crate) fn fallback_commands(
    desktop_env: crate::desktop::DesktopEnvironment,
    file_path: &Path,
) -> Vec<(&'static str, Vec<String>)> {
    use crate::desktop::DesktopEnvironment;

    let file_loc = file_path.to_string_lossy().into_owned();
    let uri = url::Url::from_file_path(file_path)
        .map(String::from)
        .unwrap_or_else(|()| format!("file://{}", file_loc));
    let args = |parts: &[&str]| parts.iter().map(|p| p.to_string()).collect::<Vec<_>>();

    match desktop_env {
        DesktopEnvironment::Gnome => vec![
            ("gsettings", args(&["set", "org.gnome.desktop.background", "picture-uri", uri.as_str()])),
            ("gsettings", args(&["set", "org.gnome.desktop.background", "picture-uri-dark", uri.as_str()])),
        ],
        DesktopEnvironment::Mate => vec![(
            "gsettings",
            args(&["set", "org.mate.background", "picture-filename", file_loc.as_str()]),
        )],
        DesktopEnvironment::Xfce => vec![
            (
                "xfconf-query",
                args(&["-c", "xfce4-desktop", "-p", "/backdrop/screen0/monitor0/image-path", "-s", file_loc.as_str()]),
            ),
            (
                "xfconf-query",
                args(&["-c", "xfce4-desktop", "-p", "/backdrop/screen0/monitor0/image-style", "-s", "3"]),
            ),
            ("xfdesktop", args(&["--reload"])),
        ],
        DesktopEnvironment::Lxde => vec![(
            "pcmanfm",
            args(&["--set-wallpaper", file_loc.as_str(), "--wallpaper-mode=scaled"]),
        )],
        DesktopEnvironment::Fluxbox => vec![("fbsetbg", args(&[file_loc.as_str()]))],
        DesktopEnvironment::Kde | DesktopEnvironment::Unknown => Vec::new(),
    }
}

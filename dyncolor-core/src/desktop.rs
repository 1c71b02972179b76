//! Desktop environment probing done by shelling out to the platform's own
//! settings tools.

use log::debug;
use std::process::Command;

/// Desktop sessions we know how to talk to, normalised from `DESKTOP_SESSION`
/// and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopEnvironment {
    Gnome,
    Kde,
    Mate,
    Xfce,
    Lxde,
    Fluxbox,
    Unknown,
}

impl DesktopEnvironment {
    pub fn detect() -> Self {
        let session = std::env::var("DESKTOP_SESSION").ok();
        let kde_full_session = std::env::var("KDE_FULL_SESSION").ok();
        let gnome_session_id = std::env::var("GNOME_DESKTOP_SESSION_ID").is_ok();
        Self::from_session(session.as_deref(), kde_full_session.as_deref(), gnome_session_id)
    }

    pub fn from_session(
        desktop_session: Option<&str>,
        kde_full_session: Option<&str>,
        gnome_session_id: bool,
    ) -> Self {
        if let Some(session) = desktop_session {
            let session = session.to_lowercase();
            let detected = match session.as_str() {
                "gnome" | "unity" | "cinnamon" | "ubuntu" => Some(Self::Gnome),
                "kde" | "plasma" | "trinity" => Some(Self::Kde),
                "mate" => Some(Self::Mate),
                "lxde" => Some(Self::Lxde),
                "fluxbox" | "openbox" | "jwm" | "afterstep" | "blackbox" => Some(Self::Fluxbox),
                s if s.contains("xfce") || s.starts_with("xubuntu") => Some(Self::Xfce),
                s if s.starts_with("kubuntu") || s.starts_with("ubuntustudio") => Some(Self::Kde),
                s if s.starts_with("lubuntu") => Some(Self::Lxde),
                s if s.starts_with("ubuntu") => Some(Self::Gnome),
                _ => None,
            };
            if let Some(env) = detected {
                return env;
            }
        }

        if kde_full_session == Some("true") {
            return Self::Kde;
        }
        if gnome_session_id {
            return Self::Gnome;
        }
        Self::Unknown
    }
}

/// Asks the desktop whether the user picked a dark color scheme. Any failure
/// to ask reads as "light".
pub fn system_prefers_dark() -> bool {
    let prefers_dark = query_dark_preference().unwrap_or(false);
    debug!("Desktop prefers dark scheme: {}", prefers_dark);
    prefers_dark
}

#[cfg(target_os = "linux")]
fn query_dark_preference() -> Option<bool> {
    let output = Command::new("gsettings")
        .args(["get", "org.gnome.desktop.interface", "color-scheme"])
        .output()
        .ok()?;
    if output.status.success() {
        let scheme = String::from_utf8_lossy(&output.stdout);
        return Some(scheme.contains("prefer-dark"));
    }

    let output = Command::new("gsettings")
        .args(["get", "org.gnome.desktop.interface", "gtk-theme"])
        .output()
        .ok()?;
    Some(String::from_utf8_lossy(&output.stdout).to_lowercase().contains("dark"))
}

#[cfg(target_os = "macos")]
fn query_dark_preference() -> Option<bool> {
    // `defaults` exits non-zero when the key is absent, which means light mode.
    let output = Command::new("defaults")
        .args(["read", "-g", "AppleInterfaceStyle"])
        .output()
        .ok()?;
    Some(output.status.success() && String::from_utf8_lossy(&output.stdout).contains("Dark"))
}

#[cfg(target_os = "windows")]
fn query_dark_preference() -> Option<bool> {
    let output = Command::new("reg")
        .args([
            "query",
            r"HKCU\Software\Microsoft\Windows\CurrentVersion\Themes\Personalize",
            "/v",
            "AppsUseLightTheme",
        ])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).contains("0x0"))
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn query_dark_preference() -> Option<bool> {
    None
}

use anyhow::Result;
use log::{debug, info, warn};
use std::sync::Arc;

use crate::apply::{ApplyTicket, WallpaperApplier};
use crate::config::{save_preferences, Config, Preferences, ThemeMode};
use crate::desktop::system_prefers_dark;
use crate::dynamic::{PlatformCapabilities, WallpaperSeeded};
use crate::fetch::HttpImageFetcher;
use crate::gallery::{gallery_items, GalleryItem, CANDIDATE_IMAGES};
use crate::notify::{greet, Notification, NotificationKind, Notify};
use crate::palette::{resolve, ColorScheme, DynamicColorSource};
use crate::selection::Selection;
use crate::wallpaper::DesktopWallpaper;

/// Immutable picture of the screen handed to front-ends for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenSnapshot {
    pub username: String,
    pub input_focused: bool,
    pub gallery: Vec<GalleryItem>,
    pub selected: Option<String>,
    pub apply_enabled: bool,
    pub dark: bool,
    pub scheme: ColorScheme,
}

/// Owns the state of the one screen and is the only thing that mutates it.
pub struct ScreenController {
    candidates: Vec<String>,
    selection: Selection,
    username: String,
    input_focused: bool,
    dark_requested: bool,
    capabilities: PlatformCapabilities,
    palette_source: Arc<dyn DynamicColorSource>,
    // Resolved only when its inputs change; rendering never reaches the source.
    scheme: ColorScheme,
    applier: WallpaperApplier,
    notifier: Arc<dyn Notify>,
}

impl ScreenController {
    pub fn new(
        candidates: Vec<String>,
        applier: WallpaperApplier,
        palette_source: Arc<dyn DynamicColorSource>,
        capabilities: PlatformCapabilities,
        notifier: Arc<dyn Notify>,
    ) -> Self {
        Self::with_dark(candidates, applier, palette_source, capabilities, notifier, false)
    }

    fn with_dark(
        candidates: Vec<String>,
        applier: WallpaperApplier,
        palette_source: Arc<dyn DynamicColorSource>,
        capabilities: PlatformCapabilities,
        notifier: Arc<dyn Notify>,
        dark: bool,
    ) -> Self {
        let scheme = resolve(dark, capabilities.dynamic_color, palette_source.as_ref());
        Self {
            candidates,
            selection: Selection::new(),
            username: String::new(),
            input_focused: false,
            dark_requested: dark,
            capabilities,
            palette_source,
            scheme,
            applier,
            notifier,
        }
    }

    /// Wires the controller to the real network, desktop and wallpaper facilities.
    pub fn for_desktop(config: &Config, preferences: &Preferences, notifier: Arc<dyn Notify>) -> Self {
        let mut capabilities = PlatformCapabilities::detect();
        if !preferences.dynamic_color {
            info!("Dynamic color disabled by preferences");
            capabilities = capabilities.without_dynamic_color();
        }

        let applier = WallpaperApplier::new(
            Arc::new(HttpImageFetcher::default()),
            Arc::new(DesktopWallpaper::new(config.clone())),
        );

        Self::with_dark(
            CANDIDATE_IMAGES.iter().map(|url| url.to_string()).collect(),
            applier,
            Arc::new(WallpaperSeeded),
            capabilities,
            notifier,
            preferences.theme.is_dark(system_prefers_dark),
        )
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn set_username(&mut self, text: &str) {
        self.username = text.to_string();
        self.input_focused = true;
    }

    /// Dismisses the input and greets whatever name was typed.
    pub fn say_hello(&mut self) {
        self.input_focused = false;
        self.notifier.notify(greet(&self.username));
    }

    pub fn selected(&self) -> Option<&str> {
        self.selection.selected()
    }

    /// Toggles `url` in the selection. URLs outside the gallery are ignored.
    pub fn tap(&mut self, url: &str) -> Option<&str> {
        if !self.candidates.iter().any(|candidate| candidate == url) {
            warn!("Ignoring tap on unknown image {}", url);
            return self.selection.selected();
        }
        let selected = self.selection.toggle(url);
        debug!("Selection is now {:?}", selected);
        selected
    }

    /// Same as [`Self::tap`] addressed by 1-based gallery position.
    pub fn tap_position(&mut self, position: usize) -> Option<&str> {
        let url = position
            .checked_sub(1)
            .and_then(|index| self.candidates.get(index))
            .cloned();
        match url {
            Some(url) => self.tap(&url),
            None => {
                warn!("No gallery item at position {}", position);
                self.selection.selected()
            }
        }
    }

    pub fn apply_enabled(&self) -> bool {
        !self.selection.is_empty()
    }

    /// Starts applying the selected image. Returns `None`, doing nothing, when
    /// the apply control is disabled.
    pub fn apply_selected(&self) -> Option<ApplyTicket> {
        let url = self.selection.selected()?;
        let notifier = Arc::clone(&self.notifier);
        Some(self.applier.apply(url, move |outcome| {
            notifier.notify(Notification::from(&outcome));
        }))
    }

    pub fn dark(&self) -> bool {
        self.dark_requested
    }

    pub fn set_dark(&mut self, dark: bool) {
        if self.dark_requested != dark {
            self.dark_requested = dark;
            self.refresh_scheme();
        }
    }

    /// Flips light/dark and remembers the choice as an explicit theme.
    pub fn toggle_dark(&mut self, config: &Config, preferences: &mut Preferences) -> Result<()> {
        self.dark_requested = !self.dark_requested;
        self.refresh_scheme();
        preferences.theme = if self.dark_requested {
            ThemeMode::Dark
        } else {
            ThemeMode::Light
        };
        save_preferences(config, preferences)
    }

    pub fn capabilities(&self) -> PlatformCapabilities {
        self.capabilities
    }

    pub fn scheme(&self) -> ColorScheme {
        self.scheme
    }

    /// Resolves the scheme again from the dark flag and the color source.
    pub fn refresh_scheme(&mut self) {
        self.scheme = resolve(
            self.dark_requested,
            self.capabilities.dynamic_color,
            self.palette_source.as_ref(),
        );
        debug!("Color scheme is now {:?}", self.scheme.kind);
    }

    /// Lets the controller react to a delivered notification. A newly set
    /// wallpaper changes the dynamic color seed.
    pub fn acknowledge(&mut self, notification: &Notification) {
        if notification.kind == NotificationKind::WallpaperApplied && self.capabilities.dynamic_color {
            self.refresh_scheme();
        }
    }

    pub fn snapshot(&self) -> ScreenSnapshot {
        ScreenSnapshot {
            username: self.username.clone(),
            input_focused: self.input_focused,
            gallery: gallery_items(&self.candidates, &self.selection),
            selected: self.selection.selected().map(str::to_string),
            apply_enabled: self.apply_enabled(),
            dark: self.dark_requested,
            scheme: self.scheme,
        }
    }
}

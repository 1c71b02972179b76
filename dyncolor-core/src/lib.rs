//! Core of the dyncolor wallpaper picker: selection state, the gallery
//! model, palette resolution and the fetch-then-apply wallpaper workflow.
//! Front-ends (`dyncolorcli`, `dyncolor-gui`) only render snapshots of a
//! [`ScreenController`] and forward user input to it.

pub mod apply;
pub mod config;
pub mod desktop;
pub mod dynamic;
pub mod fetch;
pub mod gallery;
pub mod notify;
pub mod palette;
pub mod screen;
pub mod selection;
pub mod wallpaper;

pub use apply::{ApplyError, ApplyOutcome, ApplyTicket, WallpaperApplier};
pub use config::{load_preferences, save_preferences, Config, Preferences, ThemeMode};
pub use dynamic::{PlatformCapabilities, WallpaperSeeded};
pub use fetch::{DecodedImage, FetchError, HttpImageFetcher, ImageFetcher};
pub use gallery::{gallery_items, GalleryItem, CANDIDATE_IMAGES};
pub use notify::{greet, Notification, NotificationKind, Notify};
pub use palette::{resolve, Color, ColorRole, ColorScheme, DynamicColorSource, SchemeKind, TokenSet};
pub use screen::{ScreenController, ScreenSnapshot};
pub use selection::{toggle, Selection};
pub use wallpaper::{DesktopWallpaper, WallpaperError, WallpaperSetter};

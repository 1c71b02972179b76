#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

use anyhow::{Context, Result};
use clap::Parser;
use dyncolor_core::*;
use dyncolorcli::{init_logging, AppOptions, DynColorCliApp};
use log::{debug, error, info};
use std::sync::Arc;
use tao::{
    event::Event,
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tray_icon::{
    menu::{CheckMenuItem, Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem},
    TrayIcon, TrayIconBuilder, TrayIconEvent,
};

#[cfg(target_os = "windows")]
use windows_sys::Win32::{
    System::Console::{AllocConsole, GetConsoleWindow},
    UI::WindowsAndMessaging::{ShowWindow, SW_HIDE, SW_SHOW},
};

const ICON_SIZE: u32 = 32;

#[derive(Parser)]
#[command(name = "dyncolor-gui")]
#[command(about = "dyncolor - pick a background, set it as wallpaper, follow its colors")]
#[command(version)]
struct Cli {
    /// Run in CLI mode (text-based interface)
    #[arg(long)]
    cli: bool,

    /// Show debug console (Windows only) and log at debug level
    #[arg(long)]
    debug: bool,

    /// Name used by "Say Hello"
    #[arg(long)]
    username: Option<String>,

    /// Theme to start with: system, light or dark
    #[arg(long)]
    theme: Option<ThemeMode>,

    /// Never derive colors from the current wallpaper
    #[arg(long)]
    no_dynamic_color: bool,
}

impl Cli {
    fn options(&self) -> AppOptions {
        AppOptions {
            username: self.username.clone(),
            theme: self.theme,
            dynamic_color: self.no_dynamic_color.then_some(false),
        }
    }
}

enum UserEvent {
    TrayIconEvent(tray_icon::TrayIconEvent),
    MenuEvent(tray_icon::menu::MenuEvent),
    Notification(Notification),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum MenuAction {
    SayHello,
    Tap(String),
    Apply,
    ToggleDark,
    Exit,
}

/// Ids of the clickable items of the current menu; rebuilt with the menu.
struct MenuIds {
    say_hello: MenuId,
    gallery: Vec<(MenuId, String)>,
    apply: MenuId,
    dark: MenuId,
    exit: MenuId,
}

impl MenuIds {
    fn action_for(&self, id: &MenuId) -> Option<MenuAction> {
        if *id == self.say_hello {
            return Some(MenuAction::SayHello);
        }
        if let Some((_, url)) = self.gallery.iter().find(|(item_id, _)| item_id == id) {
            return Some(MenuAction::Tap(url.clone()));
        }
        if *id == self.apply {
            Some(MenuAction::Apply)
        } else if *id == self.dark {
            Some(MenuAction::ToggleDark)
        } else if *id == self.exit {
            Some(MenuAction::Exit)
        } else {
            None
        }
    }
}

struct TrayApp {
    config: Config,
    preferences: Preferences,
    screen: ScreenController,
    last_message: Option<String>,
}

impl TrayApp {
    fn handle(&mut self, action: MenuAction) {
        match action {
            MenuAction::SayHello => self.screen.say_hello(),
            MenuAction::Tap(url) => {
                self.screen.tap(&url);
            }
            MenuAction::Apply => match self.screen.apply_selected() {
                Some(ticket) => {
                    info!("Apply #{} started", ticket.id());
                    self.last_message = Some("Downloading selected image...".to_string());
                }
                None => info!("Set selected as background is disabled - nothing selected"),
            },
            MenuAction::ToggleDark => {
                if let Err(e) = self.screen.toggle_dark(&self.config, &mut self.preferences) {
                    error!("Failed to save theme preference: {:#}", e);
                }
            }
            MenuAction::Exit => {}
        }
    }

    fn tooltip(&self) -> String {
        match &self.last_message {
            Some(message) => format!("dyncolor - {}", message),
            None => "dyncolor - wallpaper picker".to_string(),
        }
    }
}

fn create_tray_menu(snapshot: &ScreenSnapshot, last_message: Option<&str>) -> Result<(Menu, MenuIds)> {
    let tray_menu = Menu::new();

    // Info items (non-clickable)
    let user_item = MenuItem::new(
        if snapshot.username.is_empty() {
            "Username: (not set)".to_string()
        } else {
            format!("Username: {}", snapshot.username)
        },
        false,
        None,
    );
    let status_item = MenuItem::new(
        last_message.map(str::to_string).unwrap_or_else(|| {
            format!(
                "Theme: {} ({})",
                if snapshot.dark { "dark" } else { "light" },
                if snapshot.scheme.kind.is_dynamic() { "dynamic" } else { "static" }
            )
        }),
        false,
        None,
    );

    let say_hello_item = MenuItem::new("Say Hello", true, None);
    let gallery_items: Vec<CheckMenuItem> = snapshot
        .gallery
        .iter()
        .map(|item| CheckMenuItem::new(format!("{}. {}", item.position, item.label), true, item.selected, None))
        .collect();
    let apply_item = MenuItem::new("Set selected as background", snapshot.apply_enabled, None);
    let dark_item = CheckMenuItem::new("Dark theme", true, snapshot.dark, None);
    let exit_item = MenuItem::new("Exit", true, None);

    tray_menu.append_items(&[
        &user_item,
        &status_item,
        &PredefinedMenuItem::separator(),
        &say_hello_item,
        &PredefinedMenuItem::separator(),
    ])?;
    for item in &gallery_items {
        tray_menu.append(item)?;
    }
    tray_menu.append_items(&[
        &PredefinedMenuItem::separator(),
        &apply_item,
        &dark_item,
        &PredefinedMenuItem::separator(),
        &exit_item,
    ])?;

    let ids = MenuIds {
        say_hello: say_hello_item.id().clone(),
        gallery: gallery_items
            .iter()
            .zip(&snapshot.gallery)
            .map(|(menu_item, item)| (menu_item.id().clone(), item.url.clone()))
            .collect(),
        apply: apply_item.id().clone(),
        dark: dark_item.id().clone(),
        exit: exit_item.id().clone(),
    };

    Ok((tray_menu, ids))
}

/// RGBA pixels of the tray icon: a primary-colored disc with an on-primary
/// dot, ringed in tertiary while an image is selected.
fn icon_rgba(scheme: &ColorScheme, selected: bool) -> Vec<u8> {
    let tokens = &scheme.tokens;
    let mut rgba = vec![0u8; (ICON_SIZE * ICON_SIZE * 4) as usize];
    let center = (ICON_SIZE as f32 - 1.0) / 2.0;

    for y in 0..ICON_SIZE {
        for x in 0..ICON_SIZE {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let distance = (dx * dx + dy * dy).sqrt();

            let color = if distance <= 5.0 {
                Some(tokens.on_primary)
            } else if distance <= 12.5 {
                Some(tokens.primary)
            } else if distance <= 15.5 && selected {
                Some(tokens.tertiary)
            } else {
                None
            };

            if let Some(color) = color {
                let idx = ((y * ICON_SIZE + x) * 4) as usize;
                rgba[idx..idx + 4].copy_from_slice(&[color.r, color.g, color.b, 255]);
            }
        }
    }
    rgba
}

fn load_icon(snapshot: &ScreenSnapshot) -> Result<tray_icon::Icon> {
    let rgba = icon_rgba(&snapshot.scheme, snapshot.selected.is_some());
    tray_icon::Icon::from_rgba(rgba, ICON_SIZE, ICON_SIZE).context("Failed to create icon")
}

fn update_tray(tray_icon: &TrayIcon, app: &TrayApp, menu_ids: &mut Option<MenuIds>) -> Result<()> {
    let snapshot = app.screen.snapshot();
    let (menu, ids) = create_tray_menu(&snapshot, app.last_message.as_deref())?;
    tray_icon.set_menu(Some(Box::new(menu)));
    tray_icon.set_icon(Some(load_icon(&snapshot)?))?;
    tray_icon.set_tooltip(Some(app.tooltip()))?;
    *menu_ids = Some(ids);
    Ok(())
}

#[cfg(target_os = "windows")]
fn hide_console() {
    unsafe {
        let console_window = GetConsoleWindow();
        if !console_window.is_null() {
            ShowWindow(console_window, SW_HIDE);
        }
    }
}

#[cfg(target_os = "windows")]
fn show_console() {
    unsafe {
        let console_window = GetConsoleWindow();
        if !console_window.is_null() {
            ShowWindow(console_window, SW_SHOW);
        } else {
            AllocConsole();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(target_os = "windows")]
    {
        if cli.debug || cli.cli {
            show_console();
        } else {
            hide_console();
        }
    }

    init_logging(cli.debug);

    if cli.cli {
        let mut app = DynColorCliApp::new(cli.options())?;
        println!("dyncolor CLI mode started successfully!");
        return app.run();
    }

    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();

    let proxy = event_loop.create_proxy();
    TrayIconEvent::set_event_handler(Some(move |event| {
        let _ = proxy.send_event(UserEvent::TrayIconEvent(event));
    }));

    let proxy = event_loop.create_proxy();
    MenuEvent::set_event_handler(Some(move |event| {
        let _ = proxy.send_event(UserEvent::MenuEvent(event));
    }));

    // Apply outcomes arrive from the worker thread and are handled on the event loop.
    let proxy = event_loop.create_proxy();
    let notifier = move |notification: Notification| {
        let _ = proxy.send_event(UserEvent::Notification(notification));
    };

    let options = cli.options();
    let config = Config::new()?;
    let mut preferences = load_preferences(&config);
    if let Some(theme) = options.theme {
        preferences.theme = theme;
    }
    if let Some(dynamic_color) = options.dynamic_color {
        preferences.dynamic_color = dynamic_color;
    }
    let mut screen = ScreenController::for_desktop(&config, &preferences, Arc::new(notifier));
    if let Some(username) = &options.username {
        screen.set_username(username);
    }

    let mut app = TrayApp {
        config,
        preferences,
        screen,
        last_message: None,
    };

    info!("dyncolor tray started");

    let mut tray_icon: Option<TrayIcon> = None;
    let mut menu_ids: Option<MenuIds> = None;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::NewEvents(tao::event::StartCause::Init) => {
                let snapshot = app.screen.snapshot();
                let built = create_tray_menu(&snapshot, None).and_then(|(menu, ids)| {
                    let icon = TrayIconBuilder::new()
                        .with_menu(Box::new(menu))
                        .with_tooltip(app.tooltip())
                        .with_icon(load_icon(&snapshot)?)
                        .build()?;
                    Ok((icon, ids))
                });

                match built {
                    Ok((icon, ids)) => {
                        tray_icon = Some(icon);
                        menu_ids = Some(ids);
                    }
                    Err(e) => {
                        error!("Failed to create tray icon: {:#}", e);
                        *control_flow = ControlFlow::Exit;
                        return;
                    }
                }

                // Request redraw for macOS
                #[cfg(target_os = "macos")]
                {
                    use objc2_core_foundation::CFRunLoop;
                    if let Some(rl) = CFRunLoop::main() {
                        rl.wake_up();
                    }
                }
            }

            Event::UserEvent(UserEvent::TrayIconEvent(event)) => {
                debug!("Tray event: {:?}", event);
            }

            Event::UserEvent(UserEvent::MenuEvent(event)) => {
                let action = menu_ids.as_ref().and_then(|ids| ids.action_for(&event.id));
                let Some(action) = action else {
                    debug!("Unknown menu item clicked: {:?}", event.id);
                    return;
                };

                info!("Executing: {:?}", action);
                if action == MenuAction::Exit {
                    tray_icon.take();
                    *control_flow = ControlFlow::Exit;
                    return;
                }

                app.handle(action);
                if let Some(ref icon) = tray_icon {
                    if let Err(e) = update_tray(icon, &app, &mut menu_ids) {
                        error!("Failed to refresh tray: {:#}", e);
                    }
                }
            }

            Event::UserEvent(UserEvent::Notification(notification)) => {
                info!("{}", notification.text);
                app.screen.acknowledge(&notification);
                app.last_message = Some(notification.text);
                if let Some(ref icon) = tray_icon {
                    if let Err(e) = update_tray(icon, &app, &mut menu_ids) {
                        error!("Failed to refresh tray: {:#}", e);
                    }
                }
            }

            _ => {}
        }
    })
}

pub use crate::app::{AppOptions, DynColorCliApp};
pub use crate::render::{render_notification, render_screen};

/// Sets up `env_logger`, defaulting to `debug` in debug builds and `info` otherwise.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose || cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .try_init();
}

mod render {
    use crossterm::style::{Color as TermColor, Stylize};
    use dyncolor_core::{Color, Notification, ScreenSnapshot};

    fn term(color: Color) -> TermColor {
        TermColor::Rgb {
            r: color.r,
            g: color.g,
            b: color.b,
        }
    }

    /// Renders the screen as lines of styled text, painted with the snapshot's scheme.
    pub fn render_screen(snapshot: &ScreenSnapshot) -> Vec<String> {
        let tokens = &snapshot.scheme.tokens;
        let mut lines = Vec::new();

        lines.push(String::new());
        lines.push(format!("{}", " Hello Material3 ".with(term(tokens.on_primary_container)).on(term(tokens.primary_container)).bold()));

        let theme = format!(
            "Theme: {} ({})",
            if snapshot.dark { "dark" } else { "light" },
            if snapshot.scheme.kind.is_dynamic() { "dynamic" } else { "static" }
        );
        lines.push(format!("{}", theme.with(term(tokens.outline))));

        let username = if snapshot.username.is_empty() {
            format!("{}", "Username".with(term(tokens.on_surface_variant)).italic())
        } else {
            format!("{}", snapshot.username.as_str().with(term(tokens.on_surface)))
        };
        lines.push(format!("Username: {}", username));

        lines.push(String::new());
        lines.push(format!("{}", "Backgrounds".with(term(tokens.primary)).bold()));
        for item in &snapshot.gallery {
            let entry = format!("  [{}] {}", item.position, item.label);
            if item.selected {
                lines.push(format!(
                    "{} {}",
                    entry.with(term(tokens.on_surface)).bold(),
                    " ✓ ".with(term(tokens.on_tertiary)).on(term(tokens.tertiary))
                ));
            } else {
                lines.push(format!("{}", entry.with(term(tokens.on_surface_variant))));
            }
        }

        lines.push(String::new());
        lines.push("1. Enter username".to_string());
        lines.push("2. Say Hello".to_string());
        lines.push(format!("3. Select image (1-{})", snapshot.gallery.len()));
        let apply = " 4. Set selected as background ";
        if snapshot.apply_enabled {
            lines.push(format!("{}", apply.with(term(tokens.on_primary)).on(term(tokens.primary))));
        } else {
            lines.push(format!(
                "{} {}",
                apply.with(term(tokens.on_secondary)).on(term(tokens.secondary)),
                "(select an image first)".with(term(tokens.outline))
            ));
        }
        lines.push(format!("5. Switch to {} theme", if snapshot.dark { "light" } else { "dark" }));
        lines.push("6. Exit".to_string());
        lines
    }

    /// Styled like a snackbar: inverse surface colors, error colors for failures.
    pub fn render_notification(notification: &Notification, snapshot: &ScreenSnapshot) -> String {
        let tokens = &snapshot.scheme.tokens;
        let text = format!(" {} ", notification.text);
        let (fg, bg) = if notification.is_failure() {
            (tokens.on_error_container, tokens.error_container)
        } else {
            (tokens.inverse_on_surface, tokens.inverse_surface)
        };
        format!("{}", text.with(term(fg)).on(term(bg)))
    }
}

mod app {
    use anyhow::{Context, Result};
    use chrono::Local;
    use dyncolor_core::*;
    use log::{info, warn};
    use std::io::{self, BufRead, Write};
    use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
    use std::sync::Arc;
    use std::time::Duration;

    use crate::render::{render_notification, render_screen};

    /// How long the menu waits for an apply attempt before showing the menu again.
    const APPLY_WAIT: Duration = Duration::from_secs(90);

    /// Start-up overrides, typically from command-line flags.
    #[derive(Debug, Clone, Default)]
    pub struct AppOptions {
        pub username: Option<String>,
        pub theme: Option<ThemeMode>,
        pub dynamic_color: Option<bool>,
    }

    pub struct DynColorCliApp {
        config: Config,
        preferences: Preferences,
        screen: ScreenController,
        notifications: Receiver<Notification>,
    }

    impl DynColorCliApp {
        pub fn new(options: AppOptions) -> Result<Self> {
            let config = Config::new()?;
            let mut preferences = load_preferences(&config);
            if let Some(theme) = options.theme {
                preferences.theme = theme;
            }
            if let Some(dynamic_color) = options.dynamic_color {
                preferences.dynamic_color = dynamic_color;
            }

            let (tx, notifications) = mpsc::channel();
            let notifier = move |notification: Notification| {
                let _ = tx.send(notification);
            };
            let mut screen = ScreenController::for_desktop(&config, &preferences, Arc::new(notifier));
            if let Some(username) = options.username {
                screen.set_username(&username);
            }

            Ok(Self::from_parts(config, preferences, screen, notifications))
        }

        pub fn from_parts(
            config: Config,
            preferences: Preferences,
            screen: ScreenController,
            notifications: Receiver<Notification>,
        ) -> Self {
            Self {
                config,
                preferences,
                screen,
                notifications,
            }
        }

        pub fn screen(&self) -> &ScreenController {
            &self.screen
        }

        pub fn run(&mut self) -> Result<()> {
            let stdin = io::stdin();
            let stdout = io::stdout();
            self.run_with(stdin.lock(), stdout.lock())
        }

        /// The menu loop over arbitrary input/output. Ends on "6" or end of input.
        pub fn run_with<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> Result<()> {
            loop {
                self.show_pending(&mut out)?;
                self.show_menu(&mut out)?;

                let Some(choice) = prompt(&mut input, &mut out, "\nSelect an option (1-6): ")? else {
                    break;
                };

                match choice.trim() {
                    "1" => {
                        // Read verbatim (minus the line ending): spaces are part of the name.
                        if let Some(name) = prompt(&mut input, &mut out, "Username: ")? {
                            self.screen.set_username(&name);
                        }
                    }
                    "2" => self.screen.say_hello(),
                    "3" => {
                        let Some(answer) = prompt(&mut input, &mut out, "Image number: ")? else {
                            break;
                        };
                        match answer.trim().parse::<usize>() {
                            Ok(position) if (1..=self.screen.candidates().len()).contains(&position) => {
                                self.screen.tap_position(position);
                            }
                            _ => writeln!(out, "No image numbered \"{}\".", answer.trim())?,
                        }
                    }
                    "4" => self.apply_selected(&mut out)?,
                    "5" => {
                        if let Err(e) = self.screen.toggle_dark(&self.config, &mut self.preferences) {
                            warn!("Failed to save theme preference: {:#}", e);
                        }
                    }
                    "6" => {
                        writeln!(out, "Exiting dyncolor...")?;
                        break;
                    }
                    other => writeln!(out, "Invalid option \"{}\". Please select 1-6.", other)?,
                }
            }

            Ok(())
        }

        fn show_menu<W: Write>(&self, out: &mut W) -> Result<()> {
            for line in render_screen(&self.screen.snapshot()) {
                writeln!(out, "{}", line)?;
            }
            Ok(())
        }

        fn show_pending<W: Write>(&mut self, out: &mut W) -> Result<()> {
            while let Ok(notification) = self.notifications.try_recv() {
                self.show_notification(out, &notification)?;
            }
            Ok(())
        }

        fn show_notification<W: Write>(&mut self, out: &mut W, notification: &Notification) -> Result<()> {
            self.screen.acknowledge(notification);
            let snapshot = self.screen.snapshot();
            writeln!(
                out,
                "[{}] {}",
                Local::now().format("%H:%M:%S"),
                render_notification(notification, &snapshot)
            )?;
            Ok(())
        }

        fn apply_selected<W: Write>(&mut self, out: &mut W) -> Result<()> {
            let Some(ticket) = self.screen.apply_selected() else {
                writeln!(out, "Select an image first.")?;
                return Ok(());
            };

            info!("Waiting for apply #{}", ticket.id());
            writeln!(out, "Downloading selected image...")?;
            out.flush()?;

            loop {
                match self.notifications.recv_timeout(APPLY_WAIT) {
                    Ok(notification) => {
                        self.show_notification(out, &notification)?;
                        // Results of earlier, timed-out attempts are shown but do not end the wait.
                        if notification.ticket == Some(ticket) {
                            break;
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        writeln!(out, "Still working; the result will show up later.")?;
                        break;
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            Ok(())
        }
    }

    /// Prints `label` and reads one line without its line ending. `None` at end of input.
    fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> Result<Option<String>> {
        write!(out, "{}", label)?;
        out.flush()?;

        let mut line = String::new();
        let read = input.read_line(&mut line).context("Failed to read from stdin")?;
        if read == 0 {
            return Ok(None);
        }
        let trimmed = line.strip_suffix('\n').unwrap_or(&line);
        let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
        Ok(Some(trimmed.to_string()))
    }
}

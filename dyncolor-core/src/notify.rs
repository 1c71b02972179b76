use crate::apply::{ApplyOutcome, ApplyTicket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Greeting,
    WallpaperApplied,
    WallpaperFailed,
    WallpaperSuperseded,
}

/// A one-shot, toast-style message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub text: String,
    /// Set on apply results, naming the attempt they report on.
    pub ticket: Option<ApplyTicket>,
}

impl Notification {
    pub fn is_failure(&self) -> bool {
        self.kind == NotificationKind::WallpaperFailed
    }
}

impl From<&ApplyOutcome> for Notification {
    fn from(outcome: &ApplyOutcome) -> Self {
        let (kind, text) = match outcome {
            ApplyOutcome::Applied { .. } => (NotificationKind::WallpaperApplied, "Wallpaper set"),
            ApplyOutcome::Failed { .. } => (NotificationKind::WallpaperFailed, "Failed to set wallpaper"),
            ApplyOutcome::Superseded { .. } => (
                NotificationKind::WallpaperSuperseded,
                "Wallpaper request replaced by a newer one",
            ),
        };
        Notification {
            kind,
            text: format!("SetWallpaper result: {text}"),
            ticket: Some(outcome.ticket()),
        }
    }
}

/// Where notifications go. Front-ends hand in a closure that forwards to
/// their UI loop.
pub trait Notify: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl<F> Notify for F
where
    F: Fn(Notification) + Send + Sync,
{
    fn notify(&self, notification: Notification) {
        self(notification)
    }
}

/// The greeting shown by "Say Hello". The name is used verbatim.
pub fn greet(name: &str) -> Notification {
    Notification {
        kind: NotificationKind::Greeting,
        text: format!("Hello {name}"),
        ticket: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::ApplyError;
    use crate::wallpaper::WallpaperError;

    #[test]
    fn greeting_uses_name_verbatim() {
        assert_eq!(greet("Ada").text, "Hello Ada");
        assert_eq!(greet("  spaced ").text, "Hello   spaced ");
        assert_eq!(greet("").text, "Hello ");
        assert_eq!(greet("").kind, NotificationKind::Greeting);
    }

    #[test]
    fn outcomes_map_to_generic_messages() {
        let url = "https://example.com/a.jpg".to_string();

        let applied = Notification::from(&ApplyOutcome::Applied {
            ticket: ApplyTicket(1),
            url: url.clone(),
        });
        assert_eq!(applied.kind, NotificationKind::WallpaperApplied);
        assert_eq!(applied.ticket, Some(ApplyTicket(1)));
        assert!(!applied.is_failure());

        let failed = Notification::from(&ApplyOutcome::Failed {
            ticket: ApplyTicket(2),
            url: url.clone(),
            error: ApplyError::Rejected(WallpaperError::Empty),
        });
        assert!(failed.is_failure());
        assert!(!failed.text.contains("empty"), "cause stays out of the toast");

        let superseded = Notification::from(&ApplyOutcome::Superseded {
            ticket: ApplyTicket(3),
            url,
        });
        assert_eq!(superseded.kind, NotificationKind::WallpaperSuperseded);
        assert_eq!(superseded.ticket.map(ApplyTicket::id), Some(3));
        assert_eq!(greet("Ada").ticket, None);
    }
}

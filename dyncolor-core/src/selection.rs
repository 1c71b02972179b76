/// New selection after tapping `tapped` while `current` is selected.
pub fn toggle(current: Option<&str>, tapped: &str) -> Option<String> {
    if current == Some(tapped) {
        None
    } else {
        Some(tapped.to_string())
    }
}

/// The single "currently selected URL" of one screen. Lives only as long as
/// the screen that owns it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_none()
    }

    pub fn is_selected(&self, url: &str) -> bool {
        self.selected() == Some(url)
    }

    pub fn toggle(&mut self, url: &str) -> Option<&str> {
        self.selected = toggle(self.selected(), url);
        self.selected()
    }
}

use crate::selection::Selection;

/// Background images offered by the gallery, in display order.
pub const CANDIDATE_IMAGES: &[&str] = &[
    "https://images.unsplash.com/photo-1648847680218-a7e7f8506299?ixlib=rb-1.2.1&ixid=MnwxMjA3fDB8MHxwaG90by1wYWdlfHx8fGVufDB8fHx8&auto=format&fit=crop&w=1049&q=80",
    "https://images.unsplash.com/photo-1648873274070-3ad22b22ed6e?ixlib=rb-1.2.1&ixid=MnwxMjA3fDB8MHxwaG90by1wYWdlfHx8fGVufDB8fHx8&auto=format&fit=crop&w=1064&q=80",
    "https://images.unsplash.com/photo-1648763336679-6c343b693b1b?ixlib=rb-1.2.1&ixid=MnwxMjA3fDB8MHxwaG90by1wYWdlfHx8fGVufDB8fHx8&auto=format&fit=crop&w=987&q=80",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    /// 1-based position, as shown to the user.
    pub position: usize,
    pub url: String,
    pub label: String,
    pub selected: bool,
}

/// Render model of the gallery. Depends on nothing but its two arguments.
pub fn gallery_items<S: AsRef<str>>(candidates: &[S], selection: &Selection) -> Vec<GalleryItem> {
    candidates
        .iter()
        .enumerate()
        .map(|(i, url)| {
            let url = url.as_ref();
            GalleryItem {
                position: i + 1,
                url: url.to_string(),
                label: short_label(url),
                selected: selection.is_selected(url),
            }
        })
        .collect()
}

/// Short human label for an image URL: the last path segment, without query
/// and without the trailing hash-like suffix Unsplash appends.
pub fn short_label(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or(path);

    match segment.rsplit_once('-') {
        Some((head, tail)) if head.starts_with("photo-") && tail.chars().all(|c| c.is_ascii_hexdigit()) => {
            head.to_string()
        }
        _ => segment.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_only_the_selected_item() {
        let mut selection = Selection::new();
        selection.toggle(CANDIDATE_IMAGES[1]);

        let items = gallery_items(CANDIDATE_IMAGES, &selection);
        assert_eq!(items.len(), 3);
        assert_eq!(items.iter().filter(|item| item.selected).count(), 1);
        assert!(items[1].selected);
        assert_eq!(items[1].position, 2);
    }

    #[test]
    fn nothing_marked_without_selection() {
        let items = gallery_items(CANDIDATE_IMAGES, &Selection::new());
        assert!(items.iter().all(|item| !item.selected));
    }

    #[test]
    fn labels_strip_query_and_suffix() {
        assert_eq!(short_label(CANDIDATE_IMAGES[0]), "photo-1648847680218");
        assert_eq!(short_label("https://example.com/img/sunset.jpg?w=10"), "sunset.jpg");
        assert_eq!(short_label("plain"), "plain");
    }
}

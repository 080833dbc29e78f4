//! Category derivation and the bookmark filter.
//!
//! Everything here is a pure function of its inputs. The dashboard recomputes
//! the visible set on every keystroke, so none of it caches.

use crate::config::CategoryConfig;
use crate::models::{ALL_CATEGORY, Bookmark};
use std::collections::HashSet;

/// `"all"` followed by every distinct category in first-appearance order.
pub fn derive_categories(bookmarks: &[Bookmark]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut categories = vec![ALL_CATEGORY.to_string()];
    for bookmark in bookmarks {
        if seen.insert(bookmark.category.as_str()) {
            categories.push(bookmark.category.clone());
        }
    }
    categories
}

/// Number of bookmarks shown under `label`.
pub fn count_for(bookmarks: &[Bookmark], label: &str) -> usize {
    if label == ALL_CATEGORY {
        bookmarks.len()
    } else {
        bookmarks.iter().filter(|b| b.category == label).count()
    }
}

/// Bookmarks in `active_category` whose title contains `search_term`,
/// ignoring case. Input order is preserved.
pub fn filter_bookmarks<'a>(
    bookmarks: &'a [Bookmark],
    active_category: &str,
    search_term: &str,
) -> Vec<&'a Bookmark> {
    let needle = search_term.to_lowercase();
    bookmarks
        .iter()
        .filter(|b| active_category == ALL_CATEGORY || b.category == active_category)
        .filter(|b| needle.is_empty() || b.title.to_lowercase().contains(&needle))
        .collect()
}

pub fn category_glyph<'a>(config: &'a CategoryConfig, label: &str) -> &'a str {
    config
        .glyphs
        .get(label)
        .map(String::as_str)
        .unwrap_or(config.fallback_glyph.as_str())
}

pub fn category_label<'a>(config: &'a CategoryConfig, label: &'a str) -> &'a str {
    if label == ALL_CATEGORY {
        &config.all_label
    } else {
        label
    }
}

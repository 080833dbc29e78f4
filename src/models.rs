use serde::{Deserialize, Serialize};

/// Reserved pseudo-category meaning "no filter".
pub const ALL_CATEGORY: &str = "all";

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FocusArea {
    Sidebar,
    #[default]
    Content,
    Repos,
}

impl FocusArea {
    pub fn next(&self, repos_visible: bool) -> Self {
        match self {
            FocusArea::Sidebar => FocusArea::Content,
            FocusArea::Content if repos_visible => FocusArea::Repos,
            FocusArea::Content | FocusArea::Repos => FocusArea::Sidebar,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing narrows the card grid live.
    Filter,
    /// Typing composes a query for the configured web search engine.
    WebSearch,
}

/// A single bookmark record. Never mutated after the config is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: u32,
    pub title: String,
    pub url: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
}

impl Bookmark {
    pub fn new(id: u32, title: &str, url: &str, category: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            url: url.to_string(),
            category: category.to_string(),
            icon: None,
            bg_color: None,
        }
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }

    /// Host part of the bookmark URL, `None` when the URL does not parse.
    pub fn hostname(&self) -> Option<String> {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }
}

/// A repository shown in the trending side panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repo {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub url: String,
    pub star_count: u64,
    pub language: Option<String>,
    pub language_color: Option<String>,
}

/// Raw GitHub search API payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoSearchResponse {
    pub items: Vec<RepoItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoItem {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub stargazers_count: u64,
    pub language: Option<String>,
}

/// Favicon state for a single card.
///
/// `FallbackShown` is terminal: once a card has fallen back it is never
/// retried, so a broken default can not loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardIcon {
    Loading { source: Option<String> },
    Loaded { source: String },
    FallbackShown,
}

impl CardIcon {
    /// Picks the icon source for a bookmark: its explicit icon, otherwise the
    /// favicon service for its host.
    pub fn for_bookmark(bookmark: &Bookmark) -> Self {
        let source = bookmark.icon.clone().or_else(|| {
            bookmark
                .hostname()
                .map(|host| format!("https://www.google.com/s2/favicons?domain={host}&sz=32"))
        });
        CardIcon::Loading { source }
    }

    /// Resolves a pending icon. Without a usable source this is a failure.
    /// Returns `true` only on the transition into `FallbackShown`.
    pub fn resolve(&mut self) -> bool {
        let CardIcon::Loading { source } = self else {
            return false;
        };
        match source.take() {
            Some(source) if url::Url::parse(&source).is_ok() => {
                *self = CardIcon::Loaded { source };
                false
            }
            _ => {
                *self = CardIcon::FallbackShown;
                true
            }
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, CardIcon::FallbackShown)
    }
}

#[derive(Debug, Clone)]
pub struct ListState {
    pub selected_index: Option<usize>,
    pub offset: usize,
}

impl Default for ListState {
    fn default() -> Self {
        Self::new()
    }
}

impl ListState {
    pub fn new() -> Self {
        Self {
            selected_index: Some(0),
            offset: 0,
        }
    }

    pub fn select(&mut self, index: Option<usize>) {
        self.selected_index = index;
        if let Some(idx) = index
            && idx < self.offset
        {
            self.offset = idx;
        }
    }

    pub fn select_first(&mut self) {
        self.selected_index = Some(0);
        self.offset = 0;
    }

    /// Clamps the selection after the underlying list changed length.
    pub fn clamp(&mut self, max_items: usize) {
        self.selected_index = match self.selected_index {
            _ if max_items == 0 => None,
            Some(i) if i >= max_items => Some(max_items - 1),
            None => Some(0),
            keep => keep,
        };
        if let Some(i) = self.selected_index
            && i < self.offset
        {
            self.offset = i;
        }
    }

    pub fn select_previous(&mut self, max_items: usize) {
        self.step_back(max_items, 1);
    }

    pub fn select_next(&mut self, max_items: usize) {
        self.step_forward(max_items, 1);
    }

    /// Moves backwards by `step` with wrap-around, used by the card grid to
    /// jump a whole row.
    pub fn step_back(&mut self, max_items: usize, step: usize) {
        if max_items == 0 {
            self.selected_index = None;
            return;
        }

        let i = match self.selected_index {
            Some(i) if i >= step => i - step,
            Some(_) => max_items - 1,
            None => 0,
        };
        self.selected_index = Some(i);

        if i < self.offset {
            self.offset = i;
        }
    }

    pub fn step_forward(&mut self, max_items: usize, step: usize) {
        if max_items == 0 {
            self.selected_index = None;
            return;
        }

        let i = match self.selected_index {
            Some(i) if i + step < max_items => i + step,
            Some(_) => 0,
            None => 0,
        };
        self.selected_index = Some(i);

        // Assume a 10-item viewport; the grid recomputes its own window
        if i >= self.offset + 10 {
            self.offset = i.saturating_sub(9);
        } else if i < self.offset {
            self.offset = i;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostname_of_valid_and_malformed_urls() {
        let ok = Bookmark::new(1, "GitHub", "https://github.com/rust-lang", "社区");
        assert_eq!(ok.hostname().as_deref(), Some("github.com"));

        let broken = Bookmark::new(2, "Broken", "not a url", "其他");
        assert_eq!(broken.hostname(), None);
    }

    #[test]
    fn test_card_icon_prefers_explicit_icon() {
        let bookmark = Bookmark::new(1, "React 文档", "https://react.dev", "开发")
            .with_icon("https://zh-hans.react.dev/favicon-32x32.png");
        let mut icon = CardIcon::for_bookmark(&bookmark);
        icon.resolve();
        assert_eq!(
            icon,
            CardIcon::Loaded {
                source: "https://zh-hans.react.dev/favicon-32x32.png".to_string()
            }
        );
    }

    #[test]
    fn test_card_icon_uses_favicon_service_for_host() {
        let bookmark = Bookmark::new(4, "知乎", "https://zhihu.com", "资讯");
        let mut icon = CardIcon::for_bookmark(&bookmark);
        icon.resolve();
        match icon {
            CardIcon::Loaded { source } => assert!(source.contains("domain=zhihu.com")),
            other => panic!("unexpected icon state: {other:?}"),
        }
    }

    #[test]
    fn test_card_icon_falls_back_once() {
        let bookmark = Bookmark::new(9, "Broken", "::::", "其他");
        let mut icon = CardIcon::for_bookmark(&bookmark);
        assert_eq!(icon, CardIcon::Loading { source: None });
        assert!(icon.resolve());
        assert!(icon.is_fallback());

        // Already fallen back, nothing is retried
        assert!(!icon.resolve());
        assert!(icon.is_fallback());
    }

    #[test]
    fn test_loaded_icon_stays_loaded() {
        let bookmark = Bookmark::new(6, "GitHub", "https://github.com", "社区");
        let mut icon = CardIcon::for_bookmark(&bookmark);
        assert!(!icon.resolve());
        let loaded = icon.clone();
        assert!(!icon.resolve());
        assert_eq!(icon, loaded);
    }

    #[test]
    fn test_list_state_wraps() {
        let mut state = ListState::new();
        state.select_previous(3);
        assert_eq!(state.selected_index, Some(2));
        state.select_next(3);
        assert_eq!(state.selected_index, Some(0));
    }

    #[test]
    fn test_list_state_row_steps() {
        let mut state = ListState::new();
        state.step_forward(7, 3);
        assert_eq!(state.selected_index, Some(3));
        state.step_forward(7, 3);
        assert_eq!(state.selected_index, Some(6));
        state.step_forward(7, 3);
        assert_eq!(state.selected_index, Some(0));
        state.step_back(7, 3);
        assert_eq!(state.selected_index, Some(6));
    }

    #[test]
    fn test_list_state_clamp() {
        let mut state = ListState::new();
        state.select(Some(5));
        state.clamp(2);
        assert_eq!(state.selected_index, Some(1));
        state.clamp(0);
        assert_eq!(state.selected_index, None);
        state.clamp(4);
        assert_eq!(state.selected_index, Some(0));
    }

    #[test]
    fn test_focus_cycle_skips_hidden_repos() {
        assert_eq!(FocusArea::Content.next(false), FocusArea::Sidebar);
        assert_eq!(FocusArea::Content.next(true), FocusArea::Repos);
        assert_eq!(FocusArea::Repos.next(true), FocusArea::Sidebar);
    }
}

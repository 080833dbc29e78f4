use crate::models::{ALL_CATEGORY, Bookmark};
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

pub const APP_DIR_NAME: &str = "bookmark-dash";
pub const FALLBACK_GLYPH: &str = "📁";

/// Everything the dashboard needs, passed explicitly into each component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Query template for `?` web search; `{query}` is replaced by the
    /// percent-encoded input.
    pub search_engine: String,
    pub categories: CategoryConfig,
    pub repos: RepoConfig,
    pub animation: AnimationConfig,
    pub bookmarks: Vec<Bookmark>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    pub all_label: String,
    pub fallback_glyph: String,
    pub glyphs: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub min_stars: u64,
    pub per_page: u8,
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub enabled: bool,
    pub particle_count: usize,
    pub wave_count: usize,
    pub sample_points: usize,
    pub fps: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            search_engine: "https://www.google.com/search?q={query}".to_string(),
            categories: CategoryConfig::default(),
            repos: RepoConfig::default(),
            animation: AnimationConfig::default(),
            bookmarks: sample_bookmarks(),
        }
    }
}

impl Default for CategoryConfig {
    fn default() -> Self {
        let glyphs = [
            (ALL_CATEGORY, "📚"),
            ("阅读", "📖"),
            ("视频", "🎬"),
            ("音乐", "🎵"),
            ("开发", "💻"),
            ("工具", "🔧"),
            ("其他", "📁"),
        ]
        .into_iter()
        .map(|(label, glyph)| (label.to_string(), glyph.to_string()))
        .collect();

        Self {
            all_label: "全部书签".to_string(),
            fallback_glyph: FALLBACK_GLYPH.to_string(),
            glyphs,
        }
    }
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.github.com/search/repositories".to_string(),
            min_stars: 10_000,
            per_page: 10,
            timeout_secs: 10,
            user_agent: concat!("bookmark-dash/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            particle_count: 50,
            wave_count: 3,
            sample_points: 100,
            fps: 30,
        }
    }
}

/// The bookmarks shipped with a fresh install.
pub fn sample_bookmarks() -> Vec<Bookmark> {
    vec![
        Bookmark::new(1, "React 文档", "https://react.dev", "开发")
            .with_icon("https://zh-hans.react.dev/favicon-32x32.png"),
        Bookmark::new(2, "TypeScript 文档", "https://typescriptlang.org", "开发")
            .with_icon("https://www.typescriptlang.org/favicon-32x32.png"),
        Bookmark::new(3, "MDN Web Docs", "https://developer.mozilla.org", "开发")
            .with_icon("https://developer.mozilla.org/favicon.svg"),
        Bookmark::new(6, "GitHub", "https://github.com", "社区"),
        Bookmark::new(4, "知乎", "https://zhihu.com", "资讯"),
        Bookmark::new(5, "掘金", "https://juejin.cn", "资讯"),
    ]
}

impl AppConfig {
    /// Default location: `<config dir>/bookmark-dash/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
            .join("config.toml")
    }

    /// Loads the config at `path`. A missing file yields the built-in
    /// defaults; an unreadable or invalid one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let config = Self::from_toml(&raw)
            .with_context(|| format!("invalid config at {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            bookmarks = config.bookmarks.len(),
            "loaded config"
        );
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for bookmark in &self.bookmarks {
            if !seen.insert(bookmark.id) {
                return Err(anyhow!("duplicate bookmark id {}", bookmark.id));
            }
            if bookmark.title.trim().is_empty() {
                return Err(anyhow!("bookmark {} has an empty title", bookmark.id));
            }
            if bookmark.category == ALL_CATEGORY {
                return Err(anyhow!(
                    "bookmark {} uses the reserved category \"{ALL_CATEGORY}\"",
                    bookmark.id
                ));
            }
        }

        if !self.search_engine.contains("{query}") {
            return Err(anyhow!("search_engine must contain a {{query}} placeholder"));
        }
        if self.animation.fps == 0 {
            return Err(anyhow!("animation.fps must be greater than zero"));
        }
        Ok(())
    }
}

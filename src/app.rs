use crate::{
    HttpClient,
    animation::AnimationHost,
    catalog::{self, derive_categories, filter_bookmarks},
    config::AppConfig,
    events::{AppEvent, FrameTicker},
    models::{ALL_CATEGORY, Bookmark, CardIcon, FocusArea, InputMode, ListState, Repo},
};
use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// How long an opened card stays highlighted.
pub const CLICK_FLASH: Duration = Duration::from_millis(150);
/// How long the grid fades in after the active category changed.
pub const CATEGORY_FADE: Duration = Duration::from_millis(100);

pub type UrlOpener = Box<dyn Fn(&str) + Send>;

/// Trending repositories panel. Each mount issues one fetch.
pub struct RepoPanel {
    pub repos: Vec<Repo>,
    pub list_state: ListState,
    loading: bool,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl Default for RepoPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl RepoPanel {
    pub fn new() -> Self {
        Self {
            repos: Vec::new(),
            list_state: ListState::new(),
            loading: false,
            generation: 0,
            task: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Starts a fetch whose result arrives as [`AppEvent::ReposLoaded`].
    /// A fetch still running from an earlier mount is aborted.
    pub fn mount(&mut self, client: Arc<HttpClient>, tx: UnboundedSender<AppEvent>) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation += 1;
        self.loading = true;
        self.repos.clear();

        let generation = self.generation;
        self.task = Some(tokio::spawn(async move {
            let repos = client.top_repos_or_fallback().await;
            // The UI may already be gone
            let _ = tx.send(AppEvent::ReposLoaded { generation, repos });
        }));
    }

    /// Applies a fetch result. Results of superseded mounts, and a second
    /// result for the current one, are dropped.
    pub fn settle(&mut self, generation: u64, repos: Vec<Repo>) -> bool {
        if generation != self.generation || !self.loading {
            tracing::debug!(generation, current = self.generation, "dropping stale repositories");
            return false;
        }
        self.repos = repos;
        self.loading = false;
        self.task = None;
        self.list_state.clamp(self.repos.len());
        true
    }

    pub fn selected(&self) -> Option<&Repo> {
        self.list_state
            .selected_index
            .and_then(|i| self.repos.get(i))
    }

    pub fn unmount(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

pub struct App {
    pub config: AppConfig,
    pub categories: Vec<String>,
    pub active_category: usize,
    pub search_query: String,
    pub web_query: String,
    pub input_mode: InputMode,
    pub cards: ListState,
    pub icons: HashMap<u32, CardIcon>,
    pub compact: bool,
    /// Card columns of the last rendered grid, used for row navigation.
    pub grid_columns: usize,
    pub focus_area: FocusArea,
    pub repo_panel: Option<RepoPanel>,
    pub animation: Option<AnimationHost>,
    pub status: Option<String>,
    pub clicked: Option<(u32, Instant)>,
    pub category_changed: Option<Instant>,
    pub quit: bool,
    client: Option<Arc<HttpClient>>,
    frame_ticker: Option<FrameTicker>,
    events: UnboundedSender<AppEvent>,
    opener: UrlOpener,
}

impl App {
    pub fn new(config: AppConfig, events: UnboundedSender<AppEvent>) -> Result<Self> {
        let client = if config.repos.enabled {
            Some(Arc::new(HttpClient::new(config.repos.clone())?))
        } else {
            None
        };

        let icons = config
            .bookmarks
            .iter()
            .map(|bookmark| (bookmark.id, CardIcon::for_bookmark(bookmark)))
            .collect();

        let animation = config
            .animation
            .enabled
            .then(|| AnimationHost::new(config.animation.clone()));

        Ok(Self {
            categories: derive_categories(&config.bookmarks),
            active_category: 0,
            search_query: String::new(),
            web_query: String::new(),
            input_mode: InputMode::Normal,
            cards: ListState::new(),
            icons,
            compact: true,
            grid_columns: 1,
            focus_area: FocusArea::default(),
            repo_panel: client.as_ref().map(|_| RepoPanel::new()),
            animation,
            status: None,
            clicked: None,
            category_changed: None,
            quit: false,
            client,
            frame_ticker: None,
            events,
            opener: Box::new(open_in_browser),
            config,
        })
    }

    pub fn with_opener(mut self, opener: UrlOpener) -> Self {
        self.opener = opener;
        self
    }

    /// Starts the side panels: one repository fetch and the frame ticker.
    pub fn mount(&mut self) {
        self.mount_repos();
        if self.animation.is_some() && self.frame_ticker.is_none() {
            self.frame_ticker = Some(FrameTicker::start(
                self.events.clone(),
                self.config.animation.fps,
            ));
        }
    }

    fn mount_repos(&mut self) {
        if let (Some(panel), Some(client)) = (self.repo_panel.as_mut(), self.client.as_ref()) {
            panel.mount(Arc::clone(client), self.events.clone());
        }
    }

    /// Disposes the animation and cancels every scheduled task.
    pub fn teardown(&mut self) {
        if let Some(mut ticker) = self.frame_ticker.take() {
            ticker.stop();
        }
        if let Some(animation) = self.animation.as_mut() {
            animation.dispose();
        }
        if let Some(panel) = self.repo_panel.as_mut() {
            panel.unmount();
        }
    }

    pub fn frame_ticker_running(&self) -> bool {
        self.frame_ticker.as_ref().is_some_and(FrameTicker::is_running)
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Frame => {
                if let Some(animation) = self.animation.as_mut() {
                    animation.tick();
                }
            }
            AppEvent::ReposLoaded { generation, repos } => {
                if let Some(panel) = self.repo_panel.as_mut() {
                    panel.settle(generation, repos);
                }
            }
            AppEvent::Input(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                self.handle_key_event(key)
            }
            AppEvent::Input(_) => {}
        }
    }

    pub fn active_category(&self) -> &str {
        self.categories
            .get(self.active_category)
            .map(String::as_str)
            .unwrap_or(ALL_CATEGORY)
    }

    pub fn visible_bookmarks(&self) -> Vec<&Bookmark> {
        filter_bookmarks(
            &self.config.bookmarks,
            self.active_category(),
            &self.search_query,
        )
    }

    pub fn count_for(&self, label: &str) -> usize {
        catalog::count_for(&self.config.bookmarks, label)
    }

    pub fn selected_bookmark(&self) -> Option<&Bookmark> {
        let visible = self.visible_bookmarks();
        self.cards
            .selected_index
            .and_then(|i| visible.get(i).copied())
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit = true;
            return;
        }

        match self.input_mode {
            InputMode::Normal => self.handle_normal_input(key),
            InputMode::Filter => self.handle_filter_input(key),
            InputMode::WebSearch => self.handle_web_search_input(key),
        }
    }

    fn handle_filter_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.search_query.clear();
                self.refresh_cards();
            }
            KeyCode::Enter => {
                // Keep the filter, hand the keyboard back to the grid
                self.input_mode = InputMode::Normal;
                self.focus_area = FocusArea::Content;
            }
            KeyCode::Backspace => {
                self.search_query.pop();
                self.refresh_cards();
            }
            KeyCode::Down => self.card_next(),
            KeyCode::Up => self.card_previous(),
            KeyCode::Char(c) => {
                self.search_query.push(c);
                self.refresh_cards();
            }
            _ => {}
        }
    }

    fn handle_web_search_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.web_query.clear();
            }
            KeyCode::Enter => {
                let query = self.web_query.trim().to_string();
                if !query.is_empty() {
                    let url = web_search_url(&self.config.search_engine, &query);
                    self.open_url(&url);
                }
                self.web_query.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.web_query.pop();
            }
            KeyCode::Char(c) => self.web_query.push(c),
            _ => {}
        }
    }

    fn handle_normal_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.quit = true,
            KeyCode::Char('h') => self.focus_area = FocusArea::Sidebar,
            KeyCode::Char('l') => self.focus_area = FocusArea::Content,
            KeyCode::Tab => {
                self.focus_area = self.focus_area.next(self.repo_panel.is_some());
            }
            KeyCode::Char('j') | KeyCode::Down => match self.focus_area {
                FocusArea::Sidebar => self.next_category(),
                FocusArea::Content => self.card_down(),
                FocusArea::Repos => self.repo_next(),
            },
            KeyCode::Char('k') | KeyCode::Up => match self.focus_area {
                FocusArea::Sidebar => self.previous_category(),
                FocusArea::Content => self.card_up(),
                FocusArea::Repos => self.repo_previous(),
            },
            KeyCode::Right if self.focus_area == FocusArea::Content => self.card_next(),
            KeyCode::Left if self.focus_area == FocusArea::Content => self.card_previous(),
            KeyCode::Home => self.cards.select_first(),
            KeyCode::End => {
                let len = self.visible_bookmarks().len();
                if len > 0 {
                    self.cards.select(Some(len - 1));
                }
            }
            KeyCode::Enter => match self.focus_area {
                FocusArea::Repos => self.open_selected_repo(),
                _ => self.open_selected_bookmark(),
            },
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Filter;
                self.focus_area = FocusArea::Content;
            }
            KeyCode::Char('?') => {
                self.input_mode = InputMode::WebSearch;
                self.web_query.clear();
            }
            KeyCode::Char('c') => self.compact = !self.compact,
            KeyCode::Char('r') | KeyCode::Char('R') => self.mount_repos(),
            KeyCode::Esc => {
                self.search_query.clear();
                self.status = None;
                self.refresh_cards();
            }
            _ => {}
        }
    }

    pub fn select_category(&mut self, index: usize) {
        if index < self.categories.len() && index != self.active_category {
            self.active_category = index;
            self.category_changed = Some(Instant::now());
            self.cards.select_first();
            self.refresh_cards();
        }
    }

    pub fn next_category(&mut self) {
        if !self.categories.is_empty() {
            self.select_category((self.active_category + 1) % self.categories.len());
        }
    }

    pub fn previous_category(&mut self) {
        if !self.categories.is_empty() {
            let index = if self.active_category == 0 {
                self.categories.len() - 1
            } else {
                self.active_category - 1
            };
            self.select_category(index);
        }
    }

    /// Keeps the card selection valid after the visible set changed.
    fn refresh_cards(&mut self) {
        let len = self.visible_bookmarks().len();
        self.cards.clamp(len);
    }

    pub fn card_next(&mut self) {
        let len = self.visible_bookmarks().len();
        self.cards.select_next(len);
    }

    pub fn card_previous(&mut self) {
        let len = self.visible_bookmarks().len();
        self.cards.select_previous(len);
    }

    pub fn card_down(&mut self) {
        let len = self.visible_bookmarks().len();
        self.cards.step_forward(len, self.grid_columns.max(1));
    }

    pub fn card_up(&mut self) {
        let len = self.visible_bookmarks().len();
        self.cards.step_back(len, self.grid_columns.max(1));
    }

    fn repo_next(&mut self) {
        if let Some(panel) = self.repo_panel.as_mut() {
            panel.list_state.select_next(panel.repos.len());
        }
    }

    fn repo_previous(&mut self) {
        if let Some(panel) = self.repo_panel.as_mut() {
            panel.list_state.select_previous(panel.repos.len());
        }
    }

    fn open_selected_bookmark(&mut self) {
        if let Some((id, url)) = self
            .selected_bookmark()
            .map(|b| (b.id, b.url.clone()))
        {
            self.clicked = Some((id, Instant::now()));
            self.open_url(&url);
        }
    }

    fn open_selected_repo(&mut self) {
        let url = self
            .repo_panel
            .as_ref()
            .and_then(RepoPanel::selected)
            .map(|repo| repo.url.clone());
        if let Some(url) = url {
            self.open_url(&url);
        }
    }

    /// Settles the icon of a card that is about to be drawn for the first
    /// time.
    pub fn resolve_icon(&mut self, id: u32) {
        if let Some(icon) = self.icons.get_mut(&id)
            && icon.resolve()
        {
            tracing::debug!(id, "card icon fell back");
        }
    }

    pub fn is_fading(&self) -> bool {
        self.category_changed
            .is_some_and(|at| at.elapsed() < CATEGORY_FADE)
    }

    pub fn is_flashing(&self, id: u32) -> bool {
        self.clicked
            .is_some_and(|(clicked, at)| clicked == id && at.elapsed() < CLICK_FLASH)
    }

    pub fn open_url(&mut self, url: &str) {
        tracing::info!(%url, "opening url");
        (self.opener)(url);
        self.status = Some(format!("Opened {url}"));
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }
}

/// Fills the `{query}` slot of a search engine template with the
/// percent-encoded query.
pub fn web_search_url(template: &str, query: &str) -> String {
    // form encoding turns spaces into '+', literal '+' is already %2B
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    template.replace("{query}", &encoded)
}

/// Opens `url` in a new browser window using the platform launcher.
pub fn open_in_browser(url: &str) {
    let result = std::process::Command::new("xdg-open")
        .arg(url)
        .spawn()
        .or_else(|_| std::process::Command::new("open").arg(url).spawn())
        .or_else(|_| {
            std::process::Command::new("cmd")
                .args(["/c", "start", url])
                .spawn()
        });

    if let Err(err) = result {
        tracing::warn!(%url, error = %err, "no browser launcher available");
    }
}

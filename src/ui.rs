use crate::{
    App,
    animation::HostState,
    catalog::{category_glyph, category_label},
    languages::parse_hex,
    models::{Bookmark, CardIcon, FocusArea, InputMode},
};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block, Borders, List, ListItem, ListState, Paragraph, Wrap,
        canvas::{Canvas, Circle, Line as CanvasLine, Points},
    },
};

const SIDEBAR_WIDTH: u16 = 26;
const SIDE_PANEL_WIDTH: u16 = 38;
/// Below this width the repository and animation panels are hidden.
const SIDE_PANEL_MIN_TERMINAL: u16 = 110;
const COMPACT_CARD: (u16, u16) = (28, 4);
const FULL_CARD: (u16, u16) = (38, 6);

pub fn draw(f: &mut Frame, app: &mut App) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Sidebar, grid and side panel
            Constraint::Length(2), // Footer
        ])
        .split(f.size());

    draw_header(f, main_chunks[0], app);

    let show_side = f.size().width >= SIDE_PANEL_MIN_TERMINAL
        && (app.repo_panel.is_some() || app.animation.is_some());

    let mut constraints = vec![Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)];
    if show_side {
        constraints.push(Constraint::Length(SIDE_PANEL_WIDTH));
    }
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(main_chunks[1]);

    draw_sidebar(f, body[0], app);
    draw_grid(f, body[1], app);
    if show_side {
        draw_side_panel(f, body[2], app);
    } else if let Some(animation) = app.animation.as_mut() {
        // No surface this frame
        animation.observe_surface(0.0, 0.0);
    }
    draw_footer(f, main_chunks[2], app);
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let title = Paragraph::new(Line::from(vec![
        Span::styled("📚 ", Style::default().fg(Color::Yellow)),
        Span::styled(
            "Bookmark Dash",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let active = app.active_category();
    let label = category_label(&app.config.categories, active);
    let summary = Paragraph::new(Line::from(vec![
        Span::styled("│ ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{} {}", category_glyph(&app.config.categories, active), label),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" ({})", app.visible_bookmarks().len()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(" │", Style::default().fg(Color::DarkGray)),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(summary, chunks[1]);

    let cursor = Span::styled(
        "▌",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::SLOW_BLINK),
    );
    let search_line = match app.input_mode {
        InputMode::Filter => Line::from(vec![
            Span::styled("🔍 ", Style::default().fg(Color::Yellow)),
            Span::styled(&app.search_query, Style::default().fg(Color::Yellow)),
            cursor,
        ]),
        InputMode::WebSearch => Line::from(vec![
            Span::styled("🌐 ", Style::default().fg(Color::Magenta)),
            Span::styled(&app.web_query, Style::default().fg(Color::Magenta)),
            cursor,
        ]),
        InputMode::Normal if !app.search_query.is_empty() => Line::from(vec![
            Span::styled("🔍 ", Style::default().fg(Color::DarkGray)),
            Span::styled(&app.search_query, Style::default().fg(Color::Gray)),
            Span::styled("  (Esc clears)", Style::default().fg(Color::DarkGray)),
        ]),
        InputMode::Normal => Line::from(Span::styled(
            "Press / to filter titles, ? to search the web",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )),
    };
    f.render_widget(
        Paragraph::new(search_line).alignment(Alignment::Center),
        chunks[2],
    );
}

fn focus_border(app: &App, area: FocusArea) -> Style {
    if app.focus_area == area {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Blue)
    }
}

fn draw_sidebar(f: &mut Frame, area: Rect, app: &App) {
    let categories = &app.config.categories;
    let items: Vec<ListItem> = app
        .categories
        .iter()
        .enumerate()
        .map(|(i, category)| {
            let count = app.count_for(category);
            let glyph = category_glyph(categories, category);
            let label = category_label(categories, category);

            if i == app.active_category {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        "▶ ",
                        Style::default()
                            .fg(Color::Green)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(format!("{glyph} ")),
                    Span::styled(
                        label.to_string(),
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!(" ({count})"),
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::DIM),
                    ),
                ]))
            } else {
                ListItem::new(Line::from(vec![
                    Span::raw("  "),
                    Span::raw(format!("{glyph} ")),
                    Span::styled(label.to_string(), Style::default().fg(Color::Gray)),
                    Span::styled(format!(" ({count})"), Style::default().fg(Color::DarkGray)),
                ]))
            }
        })
        .collect();

    let sidebar = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("📂 书签分类")
            .border_style(focus_border(app, FocusArea::Sidebar)),
    );
    // Scrolls the active category into view
    let mut state = ListState::default();
    state.select(Some(app.active_category));
    f.render_stateful_widget(sidebar, area, &mut state);
}

/// Number of card columns that fit into `width`.
pub fn grid_columns(width: u16, compact: bool) -> usize {
    let (card_width, _) = if compact { COMPACT_CARD } else { FULL_CARD };
    usize::from((width / card_width).max(1))
}

fn draw_grid(f: &mut Frame, area: Rect, app: &mut App) {
    let label = category_label(&app.config.categories, app.active_category()).to_string();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("📋 {} ({})", label, app.visible_bookmarks().len()))
        .border_style(focus_border(app, FocusArea::Content));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let columns = grid_columns(inner.width, app.compact);
    app.grid_columns = columns;

    if app.visible_bookmarks().is_empty() {
        let empty = Paragraph::new(Line::from(vec![
            Span::styled("📭 ", Style::default().fg(Color::Gray)),
            Span::styled(
                "该分类下暂无书签",
                Style::default()
                    .fg(Color::Gray)
                    .add_modifier(Modifier::BOLD),
            ),
        ]))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        f.render_widget(empty, inner);
        return;
    }

    let (_, card_height) = if app.compact { COMPACT_CARD } else { FULL_CARD };
    let rows_fit = usize::from((inner.height / card_height).max(1));
    let selected = app.cards.selected_index.unwrap_or(0);
    let first_row = (selected / columns).saturating_sub(rows_fit - 1);
    let card_width = inner.width / columns as u16;

    let on_screen: Vec<u32> = app
        .visible_bookmarks()
        .iter()
        .skip(first_row * columns)
        .take(rows_fit * columns)
        .map(|bookmark| bookmark.id)
        .collect();
    for id in on_screen {
        app.resolve_icon(id);
    }

    let visible = app.visible_bookmarks();
    for (slot, (index, bookmark)) in visible
        .iter()
        .enumerate()
        .skip(first_row * columns)
        .take(rows_fit * columns)
        .enumerate()
    {
        let row = (slot / columns) as u16;
        let col = (slot % columns) as u16;
        let rect = Rect {
            x: inner.x + col * card_width,
            y: inner.y + row * card_height,
            width: card_width,
            height: card_height.min(inner.height.saturating_sub(row * card_height)),
        };
        let is_selected =
            app.focus_area == FocusArea::Content && app.cards.selected_index == Some(index);
        draw_card(f, rect, app, bookmark, is_selected);
    }
}

fn draw_card(f: &mut Frame, area: Rect, app: &App, bookmark: &Bookmark, selected: bool) {
    let categories = &app.config.categories;
    let host = bookmark.hostname();

    let icon = match app.icons.get(&bookmark.id) {
        Some(CardIcon::Loaded { .. }) => Span::styled("🔗 ", Style::default().fg(Color::Blue)),
        Some(CardIcon::Loading { .. }) => Span::styled("… ", Style::default().fg(Color::DarkGray)),
        Some(CardIcon::FallbackShown) | None => {
            Span::styled("🌐 ", Style::default().fg(Color::DarkGray))
        }
    };

    let mut title_style = if selected {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    if app.is_fading() {
        title_style = title_style.add_modifier(Modifier::DIM);
    }

    let tag = Span::styled(
        format!(
            "{} {}",
            category_glyph(categories, &bookmark.category),
            bookmark.category
        ),
        Style::default().fg(Color::Yellow),
    );
    let host_span = match host {
        Some(host) => Span::styled(host, Style::default().fg(Color::DarkGray)),
        None => Span::styled(
            "invalid url",
            Style::default().fg(Color::Red).add_modifier(Modifier::DIM),
        ),
    };

    let lines = if app.compact {
        vec![
            Line::from(vec![icon, Span::styled(bookmark.title.as_str(), title_style)]),
            Line::from(vec![tag, Span::raw("  "), host_span]),
        ]
    } else {
        vec![
            Line::from(vec![icon, Span::styled(bookmark.title.as_str(), title_style)]),
            Line::from(tag),
            Line::from(vec![
                Span::styled("→ ", Style::default().fg(Color::Green)),
                Span::styled("访问链接", Style::default().fg(Color::Green)),
            ]),
            Line::from(host_span),
        ]
    };

    let mut border = if selected {
        Style::default().fg(Color::Green)
    } else {
        bookmark
            .bg_color
            .as_deref()
            .and_then(parse_hex)
            .map(|(r, g, b)| Style::default().fg(Color::Rgb(r, g, b)))
            .unwrap_or_else(|| Style::default().fg(Color::DarkGray))
    };
    if app.is_flashing(bookmark.id) {
        border = border.add_modifier(Modifier::REVERSED);
    }

    let card = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border),
    );
    f.render_widget(card, area);
}

fn draw_side_panel(f: &mut Frame, area: Rect, app: &mut App) {
    match (app.repo_panel.is_some(), app.animation.is_some()) {
        (true, true) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(area);
            draw_repos(f, chunks[0], app);
            draw_animation(f, chunks[1], app);
        }
        (true, false) => draw_repos(f, area, app),
        (false, true) => draw_animation(f, area, app),
        (false, false) => {}
    }
}

/// Compact star count, e.g. `412.3k`.
pub fn format_stars(stars: u64) -> String {
    // Anything that rounds to 1000.0k is shown in millions
    if stars >= 999_950 {
        format!("{:.1}m", stars as f64 / 1_000_000.0)
    } else if stars >= 1_000 {
        format!("{:.1}k", stars as f64 / 1_000.0)
    } else {
        stars.to_string()
    }
}

fn draw_repos(f: &mut Frame, area: Rect, app: &App) {
    let Some(panel) = app.repo_panel.as_ref() else {
        return;
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title("🔥 Trending repositories")
        .border_style(focus_border(app, FocusArea::Repos));

    if panel.is_loading() {
        let loading = Paragraph::new(Line::from(vec![
            Span::styled(
                "⏳ ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                "Loading repositories...",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ]))
        .alignment(Alignment::Center)
        .block(block);
        f.render_widget(loading, area);
        return;
    }

    let items: Vec<ListItem> = panel
        .repos
        .iter()
        .map(|repo| {
            let dot_color = repo
                .language_color
                .as_deref()
                .and_then(parse_hex)
                .map(|(r, g, b)| Color::Rgb(r, g, b))
                .unwrap_or(Color::DarkGray);
            let description: String = repo
                .description
                .as_deref()
                .unwrap_or("No description")
                .chars()
                .take(32)
                .collect();

            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        format!("★ {:>6} ", format_stars(repo.star_count)),
                        Style::default().fg(Color::Yellow),
                    ),
                    Span::styled(
                        repo.full_name.as_str(),
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(vec![
                    Span::styled("  ● ", Style::default().fg(dot_color)),
                    Span::styled(
                        repo.language.as_deref().unwrap_or("-"),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        description,
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::ITALIC),
                    ),
                ]),
            ])
        })
        .collect();

    let mut state = ListState::default();
    if app.focus_area == FocusArea::Repos {
        state.select(panel.list_state.selected_index);
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_animation(f: &mut Frame, area: Rect, app: &mut App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("✨ Ambient")
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(animation) = app.animation.as_mut() else {
        return;
    };
    // Braille cells hold 2x4 dots
    animation.observe_surface(f64::from(inner.width) * 2.0, f64::from(inner.height) * 4.0);
    if animation.state() != HostState::Running {
        return;
    }

    let animation = &*animation;
    let (width, height) = animation.size();
    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            for wave in &animation.waves {
                for segment in wave.path.windows(2) {
                    ctx.draw(&CanvasLine {
                        x1: segment[0].0,
                        y1: segment[0].1,
                        x2: segment[1].0,
                        y2: segment[1].1,
                        color: wave.color,
                    });
                }
            }
            ctx.layer();
            for particle in &animation.particles {
                if particle.radius >= 2.0 {
                    ctx.draw(&Circle {
                        x: particle.x,
                        y: particle.y,
                        radius: particle.radius / 2.0,
                        color: particle.color,
                    });
                } else {
                    ctx.draw(&Points {
                        coords: &[(particle.x, particle.y)],
                        color: particle.color,
                    });
                }
            }
        });
    f.render_widget(canvas, inner);
}

fn draw_footer(f: &mut Frame, area: Rect, app: &App) {
    let key = |k: &'static str, color: Color| {
        Span::styled(k, Style::default().fg(color).add_modifier(Modifier::BOLD))
    };
    let sep = |text: &'static str| Span::styled(text, Style::default().fg(Color::DarkGray));

    let help = match app.input_mode {
        InputMode::Filter => Line::from(vec![
            key("ESC", Color::Yellow),
            sep(": Clear filter │ "),
            key("Enter", Color::Green),
            sep(": Keep filter │ Type to narrow titles..."),
        ]),
        InputMode::WebSearch => Line::from(vec![
            key("ESC", Color::Yellow),
            sep(": Cancel │ "),
            key("Enter", Color::Green),
            sep(": Search the web"),
        ]),
        InputMode::Normal => Line::from(vec![
            key("h/l", Color::Cyan),
            sep(": Focus │ "),
            key("j/k", Color::Cyan),
            sep(": Navigate │ "),
            key("Enter", Color::Green),
            sep(": Open │ "),
            key("/", Color::Magenta),
            sep(": Filter │ "),
            key("?", Color::Magenta),
            sep(": Web │ "),
            key("c", Color::Blue),
            sep(": Compact │ "),
            key("R", Color::Yellow),
            sep(": Reload │ "),
            key("Q", Color::Red),
            sep(": Quit"),
        ]),
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);
    f.render_widget(Paragraph::new(help).alignment(Alignment::Center), chunks[0]);

    if let Some(status) = &app.status {
        let status = Paragraph::new(Span::styled(
            status.as_str(),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center);
        f.render_widget(status, chunks[1]);
    }
}

use image::{DynamicImage, GenericImageView};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Tabs, Wrap,
    },
    Frame,
};
use tui_big_text::{BigText, PixelSize};

use crate::app::{App, PlayerModal, RosterModal, Screen, TeamsStatus};
use crate::render::{Division, NO_FAVORITES_MESSAGE};
use crate::roster::RosterTab;
use crate::theme::{ui_theme_names, Palette};

fn base(p: Palette) -> Style {
    Style::default().fg(p.highlight).bg(p.background)
}

fn accent(p: Palette) -> Style {
    Style::default().fg(p.accent).bg(p.background)
}

fn selected(p: Palette) -> Style {
    Style::default()
        .fg(p.background)
        .bg(p.accent)
        .add_modifier(Modifier::BOLD)
}

fn panel(p: Palette, title: &str, focused: bool) -> Block<'static> {
    let border = if focused {
        accent(p).add_modifier(Modifier::BOLD)
    } else {
        accent(p)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(format!(" {title} "), border))
        .style(base(p))
}

pub fn draw(f: &mut Frame, app: &App) {
    let p = app.theme.vars();
    let size = f.area();
    f.render_widget(Block::default().style(base(p)), size);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Screen
            Constraint::Length(1), // Status
        ])
        .split(size);

    draw_header(f, app, chunks[0]);
    match app.screen {
        Screen::Teams => draw_teams(f, app, chunks[1]),
        Screen::Standings => draw_standings(f, app, chunks[1]),
        Screen::Favorites => draw_favorites(f, app, chunks[1]),
    }
    draw_status(f, app, chunks[2]);

    if let Some(modal) = &app.roster {
        draw_roster_modal(f, p, modal, size);
    }
    if let Some(modal) = &app.player {
        draw_player_modal(f, p, modal, size);
    }
    if app.show_help {
        draw_help(f, p, size);
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let p = app.theme.vars();
    let theme_label = match app.theme.active_team_theme() {
        Some(team) => format!(" {team} "),
        None => format!(" theme: {} ", app.theme.ui_theme()),
    };
    let auto = if app.theme.auto_team_theme() { "auto" } else { "manual" };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(accent(p))
        .title(Span::styled(" ⚾ MLB Explorer ", accent(p).add_modifier(Modifier::BOLD)))
        .title(Line::from(format!("{theme_label}[{auto}] ")).right_aligned())
        .style(base(p));

    let titles: Vec<Line> = Screen::ALL
        .iter()
        .enumerate()
        .map(|(i, s)| Line::from(format!("{} {}", i + 1, s.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .block(block)
        .select(app.screen.index())
        .style(base(p))
        .highlight_style(selected(p));
    f.render_widget(tabs, area);
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let p = app.theme.vars();
    let mut spans = Vec::new();
    if app.searching || !app.search.query().is_empty() {
        let cursor = if app.searching { "_" } else { "" };
        spans.push(Span::styled(
            format!(" /{}{} ", app.search.query(), cursor),
            selected(p),
        ));
    }
    if let Some(flash) = &app.flash {
        spans.push(Span::styled(format!(" {flash} "), accent(p)));
    }
    spans.push(Span::styled(
        " ←→ division  ↑↓ team  ⏎ roster  f favorite  / search  t theme  a auto  r reset  ? help  q quit",
        base(p).add_modifier(Modifier::DIM),
    ));
    f.render_widget(Paragraph::new(Line::from(spans)).style(base(p)), area);
}

/// Two rows of three: AL on top, NL below.
fn division_areas(area: Rect) -> Vec<(Division, Rect)> {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let mut out = Vec::with_capacity(6);
    for (row, divisions) in rows.iter().zip(Division::ALL.chunks(3)) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(*row);
        for (division, col) in divisions.iter().zip(cols.iter()) {
            out.push((*division, *col));
        }
    }
    out
}

fn centered_message(f: &mut Frame, p: Palette, area: Rect, title: &str, message: &str) {
    let block = panel(p, title, false);
    let inner = block.inner(area);
    f.render_widget(block, area);
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(inner);
    let para = Paragraph::new(message.to_string())
        .style(accent(p))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(para, v[1]);
}

fn draw_teams(f: &mut Frame, app: &App, area: Rect) {
    let p = app.theme.vars();
    match &app.teams_status {
        TeamsStatus::Loading(message) => return centered_message(f, p, area, "Teams", message),
        TeamsStatus::Failed(message) => return centered_message(f, p, area, "Teams", message),
        TeamsStatus::Ready => {}
    }

    for (division, rect) in division_areas(area) {
        let focused = division == app.division;
        let cards = app.grid.visible_cards(division);
        let items: Vec<ListItem> = cards
            .iter()
            .map(|card| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{} ", card.star()), accent(p)),
                    Span::raw(card.name.clone()),
                ]))
            })
            .collect();

        // Full division name when the column is wide enough.
        let title = if (rect.width as usize) > division.name().len() + 4 {
            division.name()
        } else {
            division.short_label()
        };
        let list = List::new(items)
            .block(panel(p, title, focused))
            .style(base(p))
            .highlight_style(selected(p));

        let mut state = ListState::default();
        if focused && !cards.is_empty() {
            state.select(Some(app.card_index));
        }
        f.render_stateful_widget(list, rect, &mut state);
    }
}

fn draw_standings(f: &mut Frame, app: &App, area: Rect) {
    let p = app.theme.vars();
    for (division, rect) in division_areas(area) {
        let title = match app.standings_updated {
            Some(at) => format!("{} · {}", division.short_label(), at.format("%H:%M")),
            None => division.short_label().to_string(),
        };
        let block = panel(p, &title, false);

        let Some(rows) = app.standings.table(division) else {
            let message = app
                .standings_error
                .as_deref()
                .unwrap_or("Loading standings...");
            let para = Paragraph::new(message.to_string())
                .block(block)
                .style(base(p))
                .wrap(Wrap { trim: true });
            f.render_widget(para, rect);
            continue;
        };

        let header = Row::new(vec!["Team", "W", "L", "PCT"])
            .style(accent(p).add_modifier(Modifier::BOLD));
        let body: Vec<Row> = rows
            .iter()
            .map(|r| {
                Row::new(vec![
                    Cell::from(r.team.clone()),
                    Cell::from(r.wins.to_string()),
                    Cell::from(r.losses.to_string()),
                    Cell::from(r.pct.clone()),
                ])
            })
            .collect();
        let table = Table::new(
            body,
            [
                Constraint::Min(10),
                Constraint::Length(4),
                Constraint::Length(4),
                Constraint::Length(5),
            ],
        )
        .header(header)
        .block(block)
        .style(base(p));
        f.render_widget(table, rect);
    }
}

fn draw_favorites(f: &mut Frame, app: &App, area: Rect) {
    let p = app.theme.vars();
    if app.favorites.list().is_empty() {
        return centered_message(f, p, area, "Favorites", NO_FAVORITES_MESSAGE);
    }
    if let Some(error) = &app.favorites_error {
        return centered_message(f, p, area, "Favorites", error);
    }

    let cards = app.favorite_cards();
    if cards.is_empty() {
        let message = if app.favorites_loading() {
            "Loading favorites..."
        } else {
            NO_FAVORITES_MESSAGE
        };
        return centered_message(f, p, area, "Favorites", message);
    }

    let items: Vec<ListItem> = cards
        .iter()
        .map(|card| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!("{} ", card.star()), accent(p)),
                    Span::raw(card.name.clone()),
                ]),
                Line::from(Span::styled(
                    format!("  {}", card.logo_url),
                    base(p).add_modifier(Modifier::DIM),
                )),
            ])
        })
        .collect();
    let list = List::new(items)
        .block(panel(p, "Favorites", true))
        .style(base(p))
        .highlight_style(selected(p));
    let mut state = ListState::default();
    state.select(Some(app.favorites_index));
    f.render_stateful_widget(list, area, &mut state);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(v[1])[1]
}

fn draw_roster_modal(f: &mut Frame, p: Palette, modal: &RosterModal, area: Rect) {
    let area = centered_rect(80, 80, area);
    f.render_widget(Clear, area);
    let block = panel(p, &format!("{} Roster", modal.team.name), true);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let tabs = Tabs::new(RosterTab::ALL.iter().map(|t| t.title()).collect::<Vec<_>>())
        .select(modal.tab.index())
        .style(base(p))
        .highlight_style(selected(p));
    f.render_widget(tabs, chunks[0]);

    let Some(roster) = &modal.roster else {
        let message = modal.error.as_deref().unwrap_or("Loading roster...");
        let para = Paragraph::new(message.to_string())
            .style(accent(p))
            .alignment(Alignment::Center);
        f.render_widget(para, chunks[1]);
        return;
    };

    let mut items = Vec::new();
    let mut selected_row = None;
    let mut player_index = 0;
    for (group, players) in roster.tab_sections(modal.tab) {
        items.push(ListItem::new(Line::from(Span::styled(
            group.label(),
            accent(p).add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        ))));
        for player in players {
            if player_index == modal.selected {
                selected_row = Some(items.len());
            }
            player_index += 1;
            items.push(ListItem::new(vec![
                Line::from(vec![
                    Span::styled(player.name.clone(), base(p).add_modifier(Modifier::BOLD)),
                    Span::raw(format!(" ({})", player.position)),
                ]),
                Line::from(format!("   {}", player.stat_summary())),
            ]));
        }
    }
    if items.is_empty() {
        items.push(ListItem::new("No players in this group."));
    }

    let list = List::new(items)
        .style(base(p))
        .highlight_style(selected(p));
    let mut state = ListState::default();
    state.select(selected_row);
    f.render_stateful_widget(list, chunks[1], &mut state);
}

fn draw_player_modal(f: &mut Frame, p: Palette, modal: &PlayerModal, area: Rect) {
    let area = centered_rect(60, 60, area);
    f.render_widget(Clear, area);
    let block = panel(p, "Player", true);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(detail) = &modal.detail else {
        let message = modal.error.as_deref().unwrap_or("Loading player...");
        let para = Paragraph::new(message.to_string())
            .style(accent(p))
            .alignment(Alignment::Center);
        f.render_widget(para, inner);
        return;
    };

    let photo_width = if modal.headshot.is_some() { 24 } else { 0 };
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(photo_width), Constraint::Min(0)])
        .split(inner);

    if let Some(img) = &modal.headshot {
        draw_headshot(f, img, cols[0]);
    }

    let text_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(cols[1]);

    // Quadrant pixels are 4 columns per glyph.
    if (text_area[0].width as usize) < detail.name.chars().count() * 4 {
        let name = Paragraph::new(detail.name.clone())
            .style(accent(p).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        f.render_widget(name, text_area[0]);
    } else {
        let name = BigText::builder()
            .pixel_size(PixelSize::Quadrant)
            .style(accent(p))
            .lines(vec![detail.name.clone().into()])
            .alignment(Alignment::Center)
            .build();
        f.render_widget(name, text_area[0]);
    }

    let field = |label: &str, value: &str| {
        Line::from(vec![
            Span::styled(format!("{label}: "), accent(p).add_modifier(Modifier::BOLD)),
            Span::raw(value.to_string()),
        ])
    };
    let lines = vec![
        field("Team", &detail.team),
        Line::from(""),
        field("Age", &detail.age),
        field("Height", &detail.height),
        field("Weight", &detail.weight),
        field("Birthplace", &detail.birthplace),
    ];
    f.render_widget(
        Paragraph::new(lines).style(base(p)).wrap(Wrap { trim: true }),
        text_area[1],
    );
}

fn draw_headshot(f: &mut Frame, img: &DynamicImage, area: Rect) {
    let canvas = Canvas::default()
        .block(Block::default())
        .marker(Marker::Braille)
        .x_bounds([0.0, 40.0])
        .y_bounds([0.0, 40.0])
        .paint(|ctx| {
            let (w, h) = img.dimensions();
            for y in 0..80 {
                for x in 0..80 {
                    let img_x = (x as f64 / 80.0 * w as f64) as u32;
                    let img_y = (y as f64 / 80.0 * h as f64) as u32;
                    if img_x < w && img_y < h {
                        let px = img.get_pixel(img_x, img_y);
                        if px[3] > 128 {
                            ctx.draw(&Points {
                                coords: &[(x as f64 / 2.0, 40.0 - (y as f64 / 2.0))],
                                color: ratatui::style::Color::Rgb(px[0], px[1], px[2]),
                            });
                        }
                    }
                }
            }
        });
    f.render_widget(canvas, area);
}

fn draw_help(f: &mut Frame, p: Palette, area: Rect) {
    let area = centered_rect(50, 60, area);
    f.render_widget(Clear, area);
    let lines = vec![
        Line::from("Tab / 1-3    switch screen"),
        Line::from("←→ ↑↓        move between divisions and teams"),
        Line::from("Enter        open roster, then a player"),
        Line::from("f / Space    favorite or unfavorite a team"),
        Line::from("/            search teams (Esc clears)"),
        Line::from(format!(
            "t            next UI theme ({})",
            ui_theme_names().collect::<Vec<_>>().join(", ")
        )),
        Line::from("a            auto team theme on/off"),
        Line::from("r            reset theme"),
        Line::from("Esc          close a dialog"),
        Line::from("q            quit"),
        Line::from(""),
        Line::from(Span::styled("Press any key to close", accent(p))),
    ];
    f.render_widget(
        Paragraph::new(lines).block(panel(p, "Help", true)).style(base(p)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppEvent;
    use crate::model::{DivisionRef, Team};
    use crate::storage::{keys, MemoryStorage};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Instant;
    use std::sync::Arc;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn loading_and_failure_text_replace_the_grid() {
        let mut app = App::new(Arc::new(MemoryStorage::new()));
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        terminal.draw(|f| draw(f, &app)).unwrap();
        assert!(screen_text(&terminal).contains("Loading teams..."));

        app.apply(AppEvent::TeamsFailed("boom".into()));
        terminal.draw(|f| draw(f, &app)).unwrap();
        assert!(screen_text(&terminal).contains("Unable to load teams. Please refresh."));
    }

    #[test]
    fn unresolvable_favorites_show_empty_message() {
        let storage = Arc::new(MemoryStorage::with_entries([(keys::FAVORITES, "[5]")]));
        let mut app = App::new(storage);
        app.apply(AppEvent::TeamsLoaded(vec![Team {
            id: 147,
            name: "New York Yankees".into(),
            division: Some(DivisionRef {
                name: Some("American League East".into()),
                abbreviation: None,
            }),
        }]));
        let commands = app.on_key(
            KeyEvent::new(KeyCode::Char('3'), KeyModifiers::NONE),
            Instant::now(),
        );
        assert!(commands.is_empty());

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains(NO_FAVORITES_MESSAGE));
        assert!(!text.contains("Loading favorites..."));
    }

    #[test]
    fn grid_shows_divisions_and_teams() {
        let mut app = App::new(Arc::new(MemoryStorage::new()));
        app.apply(AppEvent::TeamsLoaded(vec![Team {
            id: 119,
            name: "Los Angeles Dodgers".into(),
            division: Some(DivisionRef {
                name: Some("National League West".into()),
                abbreviation: None,
            }),
        }]));
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("National League West"));
        assert!(text.contains("☆ Los Angeles Dodgers"));

        let mut narrow = Terminal::new(TestBackend::new(60, 30)).unwrap();
        narrow.draw(|f| draw(f, &app)).unwrap();
        let text = screen_text(&narrow);
        assert!(text.contains("NL West"));
        assert!(!text.contains("National League West"));
    }

    #[test]
    fn favorites_list_shows_logo_urls() {
        let storage = Arc::new(MemoryStorage::with_entries([(keys::FAVORITES, "[147]")]));
        let mut app = App::new(storage);
        app.apply(AppEvent::TeamsLoaded(vec![Team {
            id: 147,
            name: "New York Yankees".into(),
            division: Some(DivisionRef {
                name: Some("American League East".into()),
                abbreviation: None,
            }),
        }]));
        app.on_key(
            KeyEvent::new(KeyCode::Char('3'), KeyModifiers::NONE),
            Instant::now(),
        );

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("★ New York Yankees"));
        assert!(text.contains("https://www.mlbstatic.com/team-logos/147.svg"));
    }

    #[test]
    fn help_lists_ui_themes() {
        let mut app = App::new(Arc::new(MemoryStorage::new()));
        app.show_help = true;
        let mut terminal = Terminal::new(TestBackend::new(160, 40)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();
        assert!(screen_text(&terminal).contains("classic, cleanblue, graysoft, night"));
    }
}

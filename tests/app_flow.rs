use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, Terminal};

use mlb_tui::app::{App, AppEvent, Command, Screen};
use mlb_tui::model::{DivisionRef, Team};
use mlb_tui::render::{Division, NO_FAVORITES_MESSAGE};
use mlb_tui::storage::{keys, FileStorage, MemoryStorage, Storage};
use mlb_tui::theme::team_palette;
use mlb_tui::ui;

fn yankees() -> Team {
    Team {
        id: 147,
        name: "New York Yankees".to_string(),
        division: Some(DivisionRef {
            name: Some("American League East".to_string()),
            abbreviation: None,
        }),
    }
}

fn press(app: &mut App, code: KeyCode) -> Vec<Command> {
    app.on_key(KeyEvent::new(code, KeyModifiers::NONE), Instant::now())
}

fn render(app: &App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(120, 32)).unwrap();
    terminal.draw(|f| ui::draw(f, app)).unwrap();
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
fn favorite_yankees_end_to_end() {
    let storage = Arc::new(MemoryStorage::with_entries([(keys::FAVORITES, "[147]")]));
    let mut app = App::new(storage.clone());

    assert_eq!(app.start(), vec![Command::LoadTeams]);
    assert_eq!(
        app.apply(AppEvent::TeamsLoaded(vec![yankees()])),
        vec![Command::LoadStandings]
    );

    let (division, card) = app.grid.find(147).unwrap();
    assert_eq!(division, Division::AlEast);
    assert!(card.favorite);

    let screen = render(&app);
    assert!(screen.contains("New York Yankees"));
    assert!(screen.contains("★"));

    assert!(press(&mut app, KeyCode::Char('f')).is_empty());
    assert_eq!(storage.get(keys::FAVORITES).as_deref(), Some("[]"));
    assert!(!app.grid.find(147).unwrap().1.favorite);

    press(&mut app, KeyCode::Char('3'));
    assert_eq!(app.screen, Screen::Favorites);
    assert!(render(&app).contains(NO_FAVORITES_MESSAGE));
}

#[test]
fn preferences_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");

    {
        let mut app = App::new(Arc::new(FileStorage::open(&path)));
        app.apply(AppEvent::TeamsLoaded(vec![yankees()]));
        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('t'));
    }

    let storage = Arc::new(FileStorage::open(&path));
    assert_eq!(storage.get(keys::FAVORITES).as_deref(), Some("[147]"));
    assert_eq!(
        storage.get(keys::FAVORITE_TEAM_THEME).as_deref(),
        Some("New York Yankees")
    );

    let app = App::new(storage);
    assert!(app.favorites.is_favorite(147));
    // A saved team theme wins over the UI theme at startup.
    assert_eq!(app.theme.vars(), team_palette("New York Yankees").unwrap());
}

#[test]
fn standings_render_after_teams_fail() {
    let mut app = App::new(Arc::new(MemoryStorage::new()));
    assert_eq!(
        app.apply(AppEvent::TeamsFailed("timed out".into())),
        vec![Command::LoadStandings]
    );
    assert!(render(&app).contains("Unable to load teams. Please refresh."));

    let response = serde_json::from_str(
        r#"{"records":[{"division":{"name":"National League Central"},
            "teamRecords":[{"team":{"name":"Milwaukee Brewers"},"wins":93,"losses":69,"winningPercentage":".574"}]}]}"#,
    )
    .unwrap();
    app.apply(AppEvent::StandingsLoaded(response));
    press(&mut app, KeyCode::Char('2'));

    let screen = render(&app);
    assert!(screen.contains("Milwaukee Brewers"));
    assert!(screen.contains(".574"));
    assert!(app.standings.table(Division::AlCentral).is_none());
}

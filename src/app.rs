use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::cache::TeamCache;
use crate::favorites::FavoritesStore;
use crate::model::{StandingsResponse, Team};
use crate::render::{
    favorites_view, Division, DivisionGrid, PlayerDetail, SearchFilter, StandingsBoard, TeamCard,
    FAVORITES_FAILED_MESSAGE, TEAMS_FAILED_MESSAGE,
};
use crate::roster::{GroupedRoster, PlayerView, RosterTab};
use crate::storage::Storage;
use crate::theme::ThemeEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Teams,
    Standings,
    Favorites,
}

impl Screen {
    pub const ALL: [Screen; 3] = [Screen::Teams, Screen::Standings, Screen::Favorites];

    pub fn title(self) -> &'static str {
        match self {
            Screen::Teams => "Teams",
            Screen::Standings => "Standings",
            Screen::Favorites => "Favorites",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Screen::Teams => 0,
            Screen::Standings => 1,
            Screen::Favorites => 2,
        }
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Results reported back by background tasks.
#[derive(Debug)]
pub enum AppEvent {
    Progress(String),
    TeamsLoaded(Vec<Team>),
    TeamsFailed(String),
    StandingsLoaded(StandingsResponse),
    StandingsFailed(String),
    BackfillLoaded(Vec<Team>),
    BackfillFailed(String),
    RosterLoaded { team_id: u32, roster: GroupedRoster },
    RosterFailed { team_id: u32, error: String },
    PlayerLoaded { person_id: u64, detail: PlayerDetail },
    PlayerFailed { person_id: u64, error: String },
    HeadshotLoaded { person_id: u64, image: DynamicImage },
}

/// Network work the app wants done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    LoadTeams,
    LoadStandings,
    BackfillTeams,
    LoadRoster { team_id: u32 },
    LoadPlayer { person_id: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamsStatus {
    Loading(String),
    Ready,
    Failed(String),
}

#[derive(Debug)]
pub struct RosterModal {
    pub team: Team,
    pub tab: RosterTab,
    pub roster: Option<GroupedRoster>,
    pub error: Option<String>,
    pub selected: usize,
}

impl RosterModal {
    fn new(team: Team) -> Self {
        Self {
            team,
            tab: RosterTab::default(),
            roster: None,
            error: None,
            selected: 0,
        }
    }

    pub fn tab_players(&self) -> Vec<&PlayerView> {
        self.roster
            .as_ref()
            .map(|r| r.tab_players(self.tab))
            .unwrap_or_default()
    }

    pub fn selected_player(&self) -> Option<&PlayerView> {
        self.tab_players().get(self.selected).copied()
    }

    fn switch_tab(&mut self, tab: RosterTab) {
        self.tab = tab;
        self.selected = 0;
    }

    fn move_selection(&mut self, down: bool) {
        let len = self.tab_players().len();
        self.selected = step(self.selected, len, down);
    }
}

#[derive(Debug)]
pub struct PlayerModal {
    pub person_id: u64,
    pub detail: Option<PlayerDetail>,
    pub headshot: Option<DynamicImage>,
    pub error: Option<String>,
}

pub struct App {
    pub should_quit: bool,
    pub screen: Screen,
    pub cache: TeamCache,
    pub grid: DivisionGrid,
    pub teams_status: TeamsStatus,
    pub standings: StandingsBoard,
    pub standings_error: Option<String>,
    pub standings_updated: Option<DateTime<Local>>,
    pub favorites: FavoritesStore,
    pub favorites_error: Option<String>,
    pub theme: ThemeEngine,
    pub search: SearchFilter,
    pub searching: bool,
    pub division: Division,
    pub card_index: usize,
    pub favorites_index: usize,
    pub roster: Option<RosterModal>,
    pub player: Option<PlayerModal>,
    pub show_help: bool,
    pub flash: Option<String>,
    backfill_attempted: bool,
    backfill_pending: bool,
}

impl App {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let mut theme = ThemeEngine::new(storage.clone());
        theme.boot();
        Self {
            should_quit: false,
            screen: Screen::default(),
            cache: TeamCache::new(),
            grid: DivisionGrid::default(),
            teams_status: TeamsStatus::Loading("Loading teams...".to_string()),
            standings: StandingsBoard::default(),
            standings_error: None,
            standings_updated: None,
            favorites: FavoritesStore::new(storage),
            favorites_error: None,
            theme,
            search: SearchFilter::default(),
            searching: false,
            division: Division::AlEast,
            card_index: 0,
            favorites_index: 0,
            roster: None,
            player: None,
            show_help: false,
            flash: None,
            backfill_attempted: false,
            backfill_pending: false,
        }
    }

    /// Commands to issue right after startup.
    pub fn start(&self) -> Vec<Command> {
        vec![Command::LoadTeams]
    }

    pub fn selected_card(&self) -> Option<&TeamCard> {
        self.grid
            .visible_cards(self.division)
            .get(self.card_index)
            .copied()
    }

    pub fn favorite_cards(&self) -> Vec<TeamCard> {
        favorites_view(&self.favorites.list(), &self.cache)
    }

    /// True while a fetch that could still fill the favorites screen is running.
    pub fn favorites_loading(&self) -> bool {
        self.backfill_pending || matches!(self.teams_status, TeamsStatus::Loading(_))
    }

    // --- Background results ---

    pub fn apply(&mut self, event: AppEvent) -> Vec<Command> {
        match event {
            AppEvent::Progress(message) => {
                if matches!(self.teams_status, TeamsStatus::Loading(_)) {
                    self.teams_status = TeamsStatus::Loading(message);
                } else {
                    self.flash = Some(message);
                }
                Vec::new()
            }
            AppEvent::TeamsLoaded(teams) => {
                info!(count = teams.len(), "teams loaded");
                self.cache.extend(teams);
                self.rebuild_grid();
                self.teams_status = TeamsStatus::Ready;
                self.favorites_error = None;
                vec![Command::LoadStandings]
            }
            AppEvent::TeamsFailed(error) => {
                warn!("teams unavailable: {error}");
                self.teams_status = TeamsStatus::Failed(TEAMS_FAILED_MESSAGE.to_string());
                vec![Command::LoadStandings]
            }
            AppEvent::StandingsLoaded(response) => {
                self.standings = StandingsBoard::build(&response);
                self.standings_error = None;
                self.standings_updated = Some(Local::now());
                Vec::new()
            }
            AppEvent::StandingsFailed(error) => {
                warn!("standings unavailable: {error}");
                self.standings_error = Some("Unable to load standings.".to_string());
                Vec::new()
            }
            AppEvent::BackfillLoaded(teams) => {
                self.backfill_pending = false;
                self.cache.extend(teams);
                if self.grid.is_empty() {
                    self.rebuild_grid();
                    self.teams_status = TeamsStatus::Ready;
                }
                self.favorites_error = None;
                Vec::new()
            }
            AppEvent::BackfillFailed(error) => {
                warn!("could not backfill team cache: {error}");
                self.backfill_pending = false;
                self.favorites_error = Some(FAVORITES_FAILED_MESSAGE.to_string());
                Vec::new()
            }
            AppEvent::RosterLoaded { team_id, roster } => {
                match self.roster.as_mut().filter(|m| m.team.id == team_id) {
                    Some(modal) => {
                        modal.roster = Some(roster);
                        modal.error = None;
                        modal.selected = 0;
                    }
                    None => debug!(team_id, "roster arrived after its modal closed"),
                }
                Vec::new()
            }
            AppEvent::RosterFailed { team_id, error } => {
                match self.roster.as_mut().filter(|m| m.team.id == team_id) {
                    Some(modal) => modal.error = Some(format!("Unable to load roster: {error}")),
                    None => debug!(team_id, "roster failure for a closed modal"),
                }
                Vec::new()
            }
            AppEvent::PlayerLoaded { person_id, detail } => {
                if let Some(modal) = self.player.as_mut().filter(|m| m.person_id == person_id) {
                    modal.detail = Some(detail);
                }
                Vec::new()
            }
            AppEvent::PlayerFailed { person_id, error } => {
                if let Some(modal) = self.player.as_mut().filter(|m| m.person_id == person_id) {
                    modal.error = Some(format!("Unable to load player: {error}"));
                }
                Vec::new()
            }
            AppEvent::HeadshotLoaded { person_id, image } => {
                if let Some(modal) = self.player.as_mut().filter(|m| m.person_id == person_id) {
                    modal.headshot = Some(image);
                }
                Vec::new()
            }
        }
    }

    fn rebuild_grid(&mut self) {
        self.grid = DivisionGrid::build(self.cache.all(), &self.favorites.list());
        self.grid.apply_filter(self.search.query());
        self.clamp_selection();
    }

    /// Applies the search query once typing has settled.
    pub fn tick(&mut self, now: Instant) {
        if let Some(query) = self.search.due(now) {
            let query = query.to_string();
            let visible = self.grid.apply_filter(&query);
            debug!(query, visible, "applied search filter");
            self.clamp_selection();
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.grid.visible_cards(self.division).len();
        if self.card_index >= len {
            self.card_index = len.saturating_sub(1);
        }
        let favs = self.favorite_cards().len();
        if self.favorites_index >= favs {
            self.favorites_index = favs.saturating_sub(1);
        }
    }

    // --- Input ---

    pub fn on_key(&mut self, key: KeyEvent, now: Instant) -> Vec<Command> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Vec::new();
        }
        if self.player.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q')) {
                self.player = None;
            }
            return Vec::new();
        }
        if self.roster.is_some() {
            return self.on_roster_key(key.code);
        }
        if self.searching {
            self.on_search_key(key.code, now);
            return Vec::new();
        }
        if self.show_help {
            self.show_help = false;
            return Vec::new();
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => return self.switch_screen(self.screen.next()),
            KeyCode::BackTab => return self.switch_screen(self.screen.previous()),
            KeyCode::Char('1') => return self.switch_screen(Screen::Teams),
            KeyCode::Char('2') => return self.switch_screen(Screen::Standings),
            KeyCode::Char('3') => return self.switch_screen(Screen::Favorites),
            KeyCode::Char('/') => {
                self.screen = Screen::Teams;
                self.searching = true;
            }
            KeyCode::Char('t') => {
                let name = self.theme.cycle_ui_theme().to_string();
                self.flash = Some(format!("Theme: {name}"));
            }
            KeyCode::Char('a') => {
                let enabled = !self.theme.auto_team_theme();
                self.theme.set_auto_team_theme(enabled);
                self.flash = Some(format!(
                    "Auto team theme {}",
                    if enabled { "on" } else { "off" }
                ));
            }
            KeyCode::Char('r') => {
                self.theme.reset();
                self.flash = Some("Theme reset to classic".to_string());
            }
            KeyCode::Char('?') => self.show_help = true,
            code => match self.screen {
                Screen::Teams => return self.on_teams_key(code),
                Screen::Favorites => return self.on_favorites_key(code),
                Screen::Standings => {}
            },
        }
        Vec::new()
    }

    fn switch_screen(&mut self, screen: Screen) -> Vec<Command> {
        self.screen = screen;
        if screen != Screen::Favorites {
            return Vec::new();
        }
        self.clamp_selection();
        let needs_backfill =
            self.cache.is_empty() && !self.backfill_attempted && !self.favorites.list().is_empty();
        if needs_backfill {
            self.backfill_attempted = true;
            self.backfill_pending = true;
            return vec![Command::BackfillTeams];
        }
        Vec::new()
    }

    fn on_search_key(&mut self, code: KeyCode, now: Instant) {
        match code {
            KeyCode::Esc => {
                self.search.clear(now);
                self.searching = false;
            }
            KeyCode::Enter => self.searching = false,
            KeyCode::Backspace => self.search.pop(now),
            KeyCode::Char(c) => self.search.push(c, now),
            _ => {}
        }
    }

    fn on_teams_key(&mut self, code: KeyCode) -> Vec<Command> {
        match code {
            KeyCode::Left | KeyCode::Char('h') => self.move_division(false),
            KeyCode::Right | KeyCode::Char('l') => self.move_division(true),
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.grid.visible_cards(self.division).len();
                self.card_index = step(self.card_index, len, true);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let len = self.grid.visible_cards(self.division).len();
                self.card_index = step(self.card_index, len, false);
            }
            KeyCode::Char('f') | KeyCode::Char(' ') => {
                if let Some(id) = self.selected_card().map(|c| c.id) {
                    self.toggle_favorite(id);
                }
            }
            KeyCode::Enter => {
                if let Some(id) = self.selected_card().map(|c| c.id) {
                    return self.open_team(id);
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn on_favorites_key(&mut self, code: KeyCode) -> Vec<Command> {
        let cards = self.favorite_cards();
        match code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.favorites_index = step(self.favorites_index, cards.len(), true);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.favorites_index = step(self.favorites_index, cards.len(), false);
            }
            KeyCode::Char('f') | KeyCode::Char(' ') => {
                if let Some(card) = cards.get(self.favorites_index) {
                    self.toggle_favorite(card.id);
                }
            }
            KeyCode::Enter => {
                if let Some(card) = cards.get(self.favorites_index) {
                    return self.open_team(card.id);
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn on_roster_key(&mut self, code: KeyCode) -> Vec<Command> {
        let Some(modal) = self.roster.as_mut() else {
            return Vec::new();
        };
        match code {
            KeyCode::Esc | KeyCode::Char('q') => self.roster = None,
            KeyCode::Left | KeyCode::Char('h') => modal.switch_tab(modal.tab.previous()),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => modal.switch_tab(modal.tab.next()),
            KeyCode::Down | KeyCode::Char('j') => modal.move_selection(true),
            KeyCode::Up | KeyCode::Char('k') => modal.move_selection(false),
            KeyCode::Enter => {
                if let Some(person_id) = modal.selected_player().map(|p| p.id) {
                    self.player = Some(PlayerModal {
                        person_id,
                        detail: None,
                        headshot: None,
                        error: None,
                    });
                    return vec![Command::LoadPlayer { person_id }];
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn move_division(&mut self, forward: bool) {
        let all = Division::ALL;
        let pos = all.iter().position(|d| *d == self.division).unwrap_or(0);
        let next = if forward {
            (pos + 1) % all.len()
        } else {
            (pos + all.len() - 1) % all.len()
        };
        self.division = all[next];
        self.clamp_selection();
    }

    /// Flips a favorite and mirrors it onto the grid's star. No network involved.
    pub fn toggle_favorite(&mut self, team_id: u32) -> bool {
        let favorite = self.favorites.toggle(team_id);
        self.grid.set_favorite(team_id, favorite);
        self.clamp_selection();
        favorite
    }

    /// Opens the roster modal for a cached team, applying its theme first when
    /// auto-theme is on.
    pub fn open_team(&mut self, team_id: u32) -> Vec<Command> {
        let Some(team) = self.cache.get(team_id).cloned() else {
            return Vec::new();
        };
        self.theme.select_team(&team.name);
        info!(team_id, team = %team.name, "opening roster");
        self.roster = Some(RosterModal::new(team));
        vec![Command::LoadRoster { team_id }]
    }
}

fn step(index: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (index + 1) % len
    } else if index == 0 {
        len - 1
    } else {
        index - 1
    }
}

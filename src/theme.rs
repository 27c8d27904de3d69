//! UI and team color palettes.
//!
//! Both kinds resolve to the same three colors; whichever was applied last is
//! what the screen shows.

use std::sync::Arc;

use ratatui::style::Color;
use tracing::{debug, info};

use crate::storage::{keys, Storage};

pub const DEFAULT_UI_THEME: &str = "classic";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub accent: Color,
    pub highlight: Color,
    pub background: Color,
}

struct ThemeSpec {
    name: &'static str,
    accent: &'static str,
    highlight: &'static str,
    background: &'static str,
}

impl ThemeSpec {
    fn palette(&self) -> Palette {
        Palette {
            accent: parse_color(self.accent),
            highlight: parse_color(self.highlight),
            background: parse_color(self.background),
        }
    }
}

const fn spec(
    name: &'static str,
    accent: &'static str,
    highlight: &'static str,
    background: &'static str,
) -> ThemeSpec {
    ThemeSpec {
        name,
        accent,
        highlight,
        background,
    }
}

const UI_THEMES: &[ThemeSpec] = &[
    spec("classic", "#007BFF", "#000000", "#ffffff"),
    spec("cleanblue", "#0051A8", "#1A1A1A", "#F9FBFF"),
    spec("graysoft", "#444444", "#222222", "#FAFAFA"),
    spec("night", "#ffffff", "#C9D1D9", "#0D1117"),
];

// Tuned for a white background.
const TEAM_THEMES: &[ThemeSpec] = &[
    spec("New York Yankees", "#0C2340", "#0C2340", "#ffffff"),
    spec("Boston Red Sox", "#BD3039", "#BD3039", "#ffffff"),
    spec("Tampa Bay Rays", "#092C5C", "#092C5C", "#ffffff"),
    spec("Toronto Blue Jays", "#134A8E", "#134A8E", "#ffffff"),
    spec("Baltimore Orioles", "#DF4601", "#DF4601", "#ffffff"),
    spec("Minnesota Twins", "#002B5C", "#002B5C", "#ffffff"),
    spec("Cleveland Guardians", "#0C2340", "#E31937", "#ffffff"),
    spec("Chicago White Sox", "#000000", "#000000", "#ffffff"),
    spec("Detroit Tigers", "#0C2340", "#FA4616", "#ffffff"),
    spec("Kansas City Royals", "#004687", "#7A6A4F", "#ffffff"),
    spec("Houston Astros", "#002D62", "#EB6E1F", "#ffffff"),
    spec("Texas Rangers", "#003278", "#C0111F", "#ffffff"),
    spec("Seattle Mariners", "#003278", "#0C2C56", "#ffffff"),
    spec("Los Angeles Angels", "#BA0021", "#003263", "#ffffff"),
    spec("Oakland Athletics", "#003831", "#EFB21E", "#ffffff"),
    spec("Athletics", "#003831", "#EFB21E", "#ffffff"),
    spec("Atlanta Braves", "#0E2340", "#CE1141", "#ffffff"),
    spec("Philadelphia Phillies", "#E81828", "#002D72", "#ffffff"),
    spec("New York Mets", "#002D72", "#FF5910", "#ffffff"),
    spec("Miami Marlins", "#00A3E0", "#EF3340", "#ffffff"),
    spec("Washington Nationals", "#AB0003", "#14225A", "#ffffff"),
    spec("Chicago Cubs", "#0E3386", "#CC3433", "#ffffff"),
    spec("Milwaukee Brewers", "#12284B", "#FFC52F", "#ffffff"),
    spec("St. Louis Cardinals", "#C41E3A", "#FEDB00", "#ffffff"),
    spec("Pittsburgh Pirates", "#000000", "#FFB81C", "#ffffff"),
    spec("Cincinnati Reds", "#C6011F", "#333333", "#ffffff"),
    spec("Los Angeles Dodgers", "#005A9C", "#EF3E42", "#ffffff"),
    spec("San Diego Padres", "#2F241D", "#FFC425", "#ffffff"),
    spec("San Francisco Giants", "#FD5A1E", "#27251F", "#ffffff"),
    spec("Arizona Diamondbacks", "#A71930", "#5F574F", "#ffffff"),
    spec("Colorado Rockies", "#33006F", "#4F5B66", "#ffffff"),
];

pub fn parse_color(hex: &str) -> Color {
    let hex = hex.trim_start_matches('#');
    if hex.len() == 6 && hex.is_ascii() {
        let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
        let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
        let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
        Color::Rgb(r, g, b)
    } else {
        Color::White
    }
}

pub fn ui_theme_names() -> impl Iterator<Item = &'static str> {
    UI_THEMES.iter().map(|t| t.name)
}

pub fn ui_palette(name: &str) -> Option<Palette> {
    UI_THEMES.iter().find(|t| t.name == name).map(ThemeSpec::palette)
}

pub fn team_palette(team_name: &str) -> Option<Palette> {
    TEAM_THEMES
        .iter()
        .find(|t| t.name == team_name)
        .map(ThemeSpec::palette)
}

/// Owns the three live colors and the theme preferences behind them.
pub struct ThemeEngine {
    storage: Arc<dyn Storage>,
    vars: Palette,
    ui_theme: String,
    team_theme: Option<String>,
}

impl ThemeEngine {
    /// Starts on the default UI theme without touching storage; call [`boot`](Self::boot)
    /// to pick up saved preferences.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let vars = ui_palette(DEFAULT_UI_THEME).unwrap_or(Palette {
            accent: Color::Blue,
            highlight: Color::Black,
            background: Color::White,
        });
        Self {
            storage,
            vars,
            ui_theme: DEFAULT_UI_THEME.to_string(),
            team_theme: None,
        }
    }

    pub fn vars(&self) -> Palette {
        self.vars
    }

    /// Name of the UI theme last applied.
    pub fn ui_theme(&self) -> &str {
        &self.ui_theme
    }

    /// Team whose colors are currently showing, if a team theme was applied last.
    pub fn active_team_theme(&self) -> Option<&str> {
        self.team_theme.as_deref()
    }

    pub fn apply_ui_theme(&mut self, name: &str) -> bool {
        let Some(palette) = ui_palette(name) else {
            debug!(theme = name, "unknown ui theme");
            return false;
        };
        self.vars = palette;
        self.ui_theme = name.to_string();
        self.team_theme = None;
        self.storage.set(keys::SELECTED_UI_THEME, name);
        info!(theme = name, "applied ui theme");
        true
    }

    /// Applies a team palette without persisting anything.
    pub fn apply_team_theme(&mut self, team_name: &str) -> bool {
        let Some(palette) = team_palette(team_name) else {
            debug!(team = team_name, "no palette for team");
            return false;
        };
        self.vars = palette;
        self.team_theme = Some(team_name.to_string());
        info!(team = team_name, "applied team theme");
        true
    }

    pub fn favorite_team_theme(&self) -> Option<String> {
        self.storage
            .get(keys::FAVORITE_TEAM_THEME)
            .filter(|name| !name.is_empty())
    }

    pub fn save_favorite_team_theme(&self, team_name: &str) {
        self.storage.set(keys::FAVORITE_TEAM_THEME, team_name);
    }

    /// Stored auto-theme setting, lowercased. Absent means `"on"`.
    pub fn auto_team_theme_setting(&self) -> String {
        self.storage
            .get(keys::AUTO_TEAM_THEME)
            .map(|v| v.trim().to_lowercase())
            .unwrap_or_else(|| "on".to_string())
    }

    /// Anything but an explicit `"off"` counts as enabled.
    pub fn auto_team_theme(&self) -> bool {
        self.auto_team_theme_setting() != "off"
    }

    pub fn set_auto_team_theme(&self, enabled: bool) {
        let value = if enabled { "on" } else { "off" };
        self.storage.set(keys::AUTO_TEAM_THEME, value);
        info!(auto_team_theme = value, "updated auto team theme");
    }

    /// Card activation: with auto-theme on, switch to the team's colors and
    /// remember them for the next start.
    pub fn select_team(&mut self, team_name: &str) -> bool {
        if !self.auto_team_theme() {
            return false;
        }
        if !self.apply_team_theme(team_name) {
            return false;
        }
        self.save_favorite_team_theme(team_name);
        true
    }

    /// Restores saved preferences: the UI theme first, then the favorite team
    /// theme on top of it when auto-theme allows.
    pub fn boot(&mut self) {
        let saved = self
            .storage
            .get(keys::SELECTED_UI_THEME)
            .unwrap_or_else(|| DEFAULT_UI_THEME.to_string());
        self.apply_ui_theme(&saved);

        if let Some(team) = self.favorite_team_theme() {
            if self.auto_team_theme() {
                self.apply_team_theme(&team);
            }
        }
    }

    /// Forgets the favorite team theme and goes back to the default UI theme.
    pub fn reset(&mut self) {
        self.storage.remove(keys::FAVORITE_TEAM_THEME);
        self.apply_ui_theme(DEFAULT_UI_THEME);
    }

    /// Applies the UI theme after the current one, wrapping around.
    pub fn cycle_ui_theme(&mut self) -> &str {
        let pos = UI_THEMES
            .iter()
            .position(|t| t.name == self.ui_theme)
            .map_or(0, |i| (i + 1) % UI_THEMES.len());
        self.apply_ui_theme(UI_THEMES[pos].name);
        &self.ui_theme
    }
}

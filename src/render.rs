//! View models for the screens, built from API data and preferences with no
//! terminal involved.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::cache::TeamCache;
use crate::data::{headshot_url, team_logo_url, HeadshotSize};
use crate::model::{Person, StandingsResponse, Team};
use crate::roster::PLACEHOLDER;

pub const TEAMS_FAILED_MESSAGE: &str = "Unable to load teams. Please refresh.";
pub const FAVORITES_FAILED_MESSAGE: &str = "Failed to load teams.";
pub const NO_FAVORITES_MESSAGE: &str = "No favorites yet. ★ Mark teams on the Teams screen.";
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(80);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Division {
    AlEast,
    AlCentral,
    AlWest,
    NlEast,
    NlCentral,
    NlWest,
}

impl Division {
    pub const ALL: [Division; 6] = [
        Division::AlEast,
        Division::AlCentral,
        Division::AlWest,
        Division::NlEast,
        Division::NlCentral,
        Division::NlWest,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Division::AlEast => "American League East",
            Division::AlCentral => "American League Central",
            Division::AlWest => "American League West",
            Division::NlEast => "National League East",
            Division::NlCentral => "National League Central",
            Division::NlWest => "National League West",
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            Division::AlEast => "AL East",
            Division::AlCentral => "AL Central",
            Division::AlWest => "AL West",
            Division::NlEast => "NL East",
            Division::NlCentral => "NL Central",
            Division::NlWest => "NL West",
        }
    }

    pub fn container_id(self) -> &'static str {
        match self {
            Division::AlEast => "AL-East",
            Division::AlCentral => "AL-Central",
            Division::AlWest => "AL-West",
            Division::NlEast => "NL-East",
            Division::NlCentral => "NL-Central",
            Division::NlWest => "NL-West",
        }
    }

    pub fn standings_id(self) -> String {
        format!("{}-standings", self.container_id())
    }

    /// Matches full names ("National League West") and short forms ("NL West")
    /// on whole words, ignoring case.
    pub fn resolve(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let has = |w: &str| words.contains(&w);

        let american = has("american") || has("al");
        let national = has("national") || has("nl");
        let league_al = match (american, national) {
            (true, false) => true,
            (false, true) => false,
            _ => return None,
        };

        let division = match (league_al, has("east"), has("central"), has("west")) {
            (true, true, false, false) => Division::AlEast,
            (true, false, true, false) => Division::AlCentral,
            (true, false, false, true) => Division::AlWest,
            (false, true, false, false) => Division::NlEast,
            (false, false, true, false) => Division::NlCentral,
            (false, false, false, true) => Division::NlWest,
            _ => return None,
        };
        Some(division)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamCard {
    pub id: u32,
    pub name: String,
    pub logo_url: String,
    pub favorite: bool,
    pub visible: bool,
}

impl TeamCard {
    pub fn new(team: &Team, favorite: bool) -> Self {
        Self {
            id: team.id,
            name: team.name.clone(),
            logo_url: team_logo_url(team.id),
            favorite,
            visible: true,
        }
    }

    pub fn star(&self) -> &'static str {
        if self.favorite {
            "★"
        } else {
            "☆"
        }
    }

    fn matches(&self, query_lower: &str) -> bool {
        self.name.to_lowercase().contains(query_lower)
    }
}

/// Team cards arranged by division.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DivisionGrid {
    columns: BTreeMap<Division, Vec<TeamCard>>,
}

impl DivisionGrid {
    pub fn build<'a>(teams: impl IntoIterator<Item = &'a Team>, favorites: &[u32]) -> Self {
        let mut grid = Self::default();
        for team in teams {
            let Some(division) = Division::resolve(team.division_name()) else {
                debug!(team = %team.name, division = team.division_name(), "dropping team with unknown division");
                continue;
            };
            if grid.find(team.id).is_some() {
                continue;
            }
            grid.columns
                .entry(division)
                .or_default()
                .push(TeamCard::new(team, favorites.contains(&team.id)));
        }
        for (division, cards) in &grid.columns {
            debug!(column = division.container_id(), cards = cards.len(), "built division column");
        }
        grid
    }

    pub fn cards(&self, division: Division) -> &[TeamCard] {
        self.columns
            .get(&division)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn visible_cards(&self, division: Division) -> Vec<&TeamCard> {
        self.cards(division).iter().filter(|c| c.visible).collect()
    }

    pub fn find(&self, id: u32) -> Option<(Division, &TeamCard)> {
        self.columns
            .iter()
            .find_map(|(d, cards)| cards.iter().find(|c| c.id == id).map(|c| (*d, c)))
    }

    pub fn set_favorite(&mut self, id: u32, favorite: bool) {
        for card in self.columns.values_mut().flatten() {
            if card.id == id {
                card.favorite = favorite;
            }
        }
    }

    /// Shows cards whose name contains `query` (case-insensitive) and hides the
    /// rest. Returns how many stay visible.
    pub fn apply_filter(&mut self, query: &str) -> usize {
        let query = query.to_lowercase();
        let mut visible = 0;
        for card in self.columns.values_mut().flatten() {
            card.visible = card.matches(&query);
            if card.visible {
                visible += 1;
            }
        }
        visible
    }

    pub fn len(&self) -> usize {
        self.columns.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingRow {
    pub team: String,
    pub wins: u32,
    pub losses: u32,
    pub pct: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StandingsBoard {
    tables: BTreeMap<Division, Vec<StandingRow>>,
}

impl StandingsBoard {
    /// Rows keep the API's order.
    pub fn build(response: &StandingsResponse) -> Self {
        let mut tables = BTreeMap::new();
        for record in &response.records {
            let label = record.division_label();
            let Some(division) = Division::resolve(label) else {
                debug!(division = label, "skipping standings for unknown division");
                continue;
            };
            let rows = record
                .team_records
                .iter()
                .map(|tr| StandingRow {
                    team: tr.team.name.clone(),
                    wins: tr.wins,
                    losses: tr.losses,
                    pct: tr.winning_percentage.clone(),
                })
                .collect::<Vec<_>>();
            debug!(table = %division.standings_id(), rows = rows.len(), "built standings table");
            tables.insert(division, rows);
        }
        Self { tables }
    }

    pub fn table(&self, division: Division) -> Option<&[StandingRow]> {
        self.tables.get(&division).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Search box text plus the debounce bookkeeping for applying it.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    query: String,
    edited_at: Option<Instant>,
}

impl SearchFilter {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn push(&mut self, c: char, now: Instant) {
        self.query.push(c);
        self.edited_at = Some(now);
    }

    pub fn pop(&mut self, now: Instant) {
        if self.query.pop().is_some() {
            self.edited_at = Some(now);
        }
    }

    pub fn clear(&mut self, now: Instant) {
        if !self.query.is_empty() {
            self.query.clear();
            self.edited_at = Some(now);
        }
    }

    /// Returns the query once it has been quiet for [`SEARCH_DEBOUNCE`].
    pub fn due(&mut self, now: Instant) -> Option<&str> {
        let edited_at = self.edited_at?;
        if now.saturating_duration_since(edited_at) < SEARCH_DEBOUNCE {
            return None;
        }
        self.edited_at = None;
        Some(&self.query)
    }
}

/// Favorite ids resolved through the cache, in favorites order. Ids the cache
/// does not know are skipped.
pub fn favorites_view(ids: &[u32], cache: &TeamCache) -> Vec<TeamCard> {
    ids.iter()
        .filter_map(|id| cache.get(*id))
        .map(|team| TeamCard::new(team, true))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerDetail {
    pub id: u64,
    pub name: String,
    pub team: String,
    pub age: String,
    pub height: String,
    pub weight: String,
    pub birthplace: String,
    pub headshot_url: String,
}

impl PlayerDetail {
    pub fn from_person(id: u64, person: Option<&Person>) -> Self {
        let text = |v: Option<String>| v.filter(|s| !s.is_empty());
        let placeholder = || PLACEHOLDER.to_string();
        Self {
            id,
            name: text(person.and_then(|p| p.full_name.clone()))
                .unwrap_or_else(|| "Unknown".to_string()),
            team: text(
                person
                    .and_then(|p| p.current_team.as_ref())
                    .map(|t| t.name.clone()),
            )
            .unwrap_or_else(|| "Unknown".to_string()),
            age: person
                .and_then(|p| p.current_age)
                .map(|a| a.to_string())
                .unwrap_or_else(placeholder),
            height: text(person.and_then(|p| p.height.clone())).unwrap_or_else(placeholder),
            weight: person
                .and_then(|p| p.weight)
                .map(|w| format!("{w} lbs"))
                .unwrap_or_else(placeholder),
            birthplace: text(person.and_then(|p| p.birth_city.clone())).unwrap_or_else(placeholder),
            headshot_url: headshot_url(id, HeadshotSize::Full),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DivisionRecord, DivisionRef, TeamRecord, TeamRef};

    fn team(id: u32, name: &str, division: &str) -> Team {
        Team {
            id,
            name: name.to_string(),
            division: Some(DivisionRef {
                name: Some(division.to_string()),
                abbreviation: None,
            }),
        }
    }

    #[test]
    fn resolves_full_and_short_division_names() {
        assert_eq!(Division::resolve("American League East"), Some(Division::AlEast));
        assert_eq!(Division::resolve("american league central"), Some(Division::AlCentral));
        assert_eq!(Division::resolve("AL West"), Some(Division::AlWest));
        assert_eq!(Division::resolve("National League East"), Some(Division::NlEast));
        assert_eq!(Division::resolve("NL Central"), Some(Division::NlCentral));
        assert_eq!(Division::resolve("nl-west"), Some(Division::NlWest));
    }

    #[test]
    fn division_ids() {
        assert_eq!(Division::NlCentral.container_id(), "NL-Central");
        assert_eq!(Division::AlEast.standings_id(), "AL-East-standings");
        assert_eq!(Division::resolve(Division::AlWest.name()), Some(Division::AlWest));
    }

    #[test]
    fn rejects_unknown_divisions() {
        for name in ["", "Cactus League", "American League", "East", "Central Division"] {
            assert_eq!(Division::resolve(name), None, "{name}");
        }
    }

    #[test]
    fn grid_places_each_team_once_and_drops_unknown() {
        let teams = vec![
            team(147, "New York Yankees", "American League East"),
            team(111, "Boston Red Sox", "AL East"),
            team(119, "Los Angeles Dodgers", "National League West"),
            team(999, "Mystery Club", "Pacific Coast League"),
            team(147, "New York Yankees", "American League East"),
        ];
        let grid = DivisionGrid::build(&teams, &[119]);

        let al_east: Vec<u32> = grid.cards(Division::AlEast).iter().map(|c| c.id).collect();
        assert_eq!(al_east, vec![147, 111]);
        assert_eq!(grid.len(), 3);
        assert!(grid.find(999).is_none());
        assert!(grid.find(119).is_some_and(|(d, c)| d == Division::NlWest && c.favorite));
        assert!(grid.cards(Division::AlCentral).is_empty());
    }

    #[test]
    fn filter_only_toggles_visibility() {
        let teams = vec![
            team(147, "New York Yankees", "American League East"),
            team(121, "New York Mets", "National League East"),
            team(111, "Boston Red Sox", "American League East"),
        ];
        let mut grid = DivisionGrid::build(&teams, &[]);

        assert_eq!(grid.apply_filter("NEW YORK"), 2);
        assert_eq!(grid.visible_cards(Division::AlEast).len(), 1);

        assert_eq!(grid.apply_filter("zzz"), 0);
        assert!(Division::ALL.iter().all(|d| grid.visible_cards(*d).is_empty()));

        assert_eq!(grid.apply_filter(""), 3);
        assert_eq!(grid.len(), 3);
    }

    #[test]
    fn standings_keep_api_order() {
        let response = StandingsResponse {
            records: vec![DivisionRecord {
                division: Some(DivisionRef {
                    name: None,
                    abbreviation: Some("AL East".into()),
                }),
                team_records: vec![
                    TeamRecord {
                        team: TeamRef { id: None, name: "Baltimore Orioles".into() },
                        wins: 91,
                        losses: 71,
                        winning_percentage: ".562".into(),
                    },
                    TeamRecord {
                        team: TeamRef { id: None, name: "New York Yankees".into() },
                        wins: 94,
                        losses: 68,
                        winning_percentage: ".580".into(),
                    },
                ],
            }],
        };
        let board = StandingsBoard::build(&response);
        let rows = board.table(Division::AlEast).unwrap();
        assert_eq!(rows[0].team, "Baltimore Orioles");
        assert_eq!(rows[1].pct, ".580");
        assert!(board.table(Division::NlEast).is_none());
    }

    #[test]
    fn search_is_debounced() {
        let start = Instant::now();
        let mut search = SearchFilter::default();
        search.push('m', start);
        search.push('e', start + Duration::from_millis(30));

        assert!(search.due(start + Duration::from_millis(60)).is_none());
        assert_eq!(search.due(start + Duration::from_millis(120)), Some("me"));
        assert!(search.due(start + Duration::from_millis(500)).is_none());

        search.clear(start + Duration::from_millis(600));
        assert_eq!(search.due(start + Duration::from_millis(700)), Some(""));
    }

    #[test]
    fn favorites_view_follows_favorites_order() {
        let mut cache = TeamCache::new();
        cache.extend([
            team(147, "New York Yankees", "American League East"),
            team(111, "Boston Red Sox", "American League East"),
        ]);
        let cards = favorites_view(&[111, 5, 147], &cache);
        let names: Vec<&str> = cards.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Boston Red Sox", "New York Yankees"]);
        assert!(cards.iter().all(|c| c.favorite));
    }

    #[test]
    fn player_detail_placeholders() {
        let detail = PlayerDetail::from_person(1, None);
        assert_eq!(detail.name, "Unknown");
        assert_eq!(detail.team, "Unknown");
        assert_eq!(detail.age, PLACEHOLDER);
        assert_eq!(detail.weight, PLACEHOLDER);

        let person = Person {
            full_name: Some("Aaron Judge".into()),
            current_age: Some(32),
            height: Some("6' 7\"".into()),
            weight: Some(282),
            birth_city: Some("Linden".into()),
            current_team: Some(TeamRef { id: Some(147), name: "New York Yankees".into() }),
        };
        let detail = PlayerDetail::from_person(592450, Some(&person));
        assert_eq!(detail.weight, "282 lbs");
        assert_eq!(detail.team, "New York Yankees");
        assert!(detail.headshot_url.contains("w_300"));
    }
}

use serde::{Deserialize, Serialize};

// --- Teams backend ---

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamsResponse {
    #[serde(default)]
    pub teams: Vec<Team>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub division: Option<DivisionRef>,
}

impl Team {
    pub fn division_name(&self) -> &str {
        self.division
            .as_ref()
            .and_then(|d| d.name.as_deref())
            .unwrap_or("")
    }
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionRef {
    pub name: Option<String>,
    pub abbreviation: Option<String>,
}

// --- Stats API: standings ---

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsResponse {
    #[serde(default)]
    pub records: Vec<DivisionRecord>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionRecord {
    #[serde(default)]
    pub division: Option<DivisionRef>,
    #[serde(default)]
    pub team_records: Vec<TeamRecord>,
}

impl DivisionRecord {
    /// Full division name, falling back to the abbreviation.
    pub fn division_label(&self) -> &str {
        let Some(div) = &self.division else {
            return "";
        };
        div.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(div.abbreviation.as_deref())
            .unwrap_or("")
    }
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRecord {
    pub team: TeamRef,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub winning_percentage: String,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRef {
    pub id: Option<u32>,
    #[serde(default)]
    pub name: String,
}

// --- Stats API: roster ---

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterResponse {
    #[serde(default)]
    pub roster: Vec<RosterEntry>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub person: PersonRef,
    #[serde(default)]
    pub position: Option<Position>,
}

impl RosterEntry {
    pub fn position_abbreviation(&self) -> Option<&str> {
        self.position
            .as_ref()
            .and_then(|p| p.abbreviation.as_deref())
            .filter(|a| !a.is_empty())
    }
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRef {
    pub id: u64,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub abbreviation: Option<String>,
}

// --- Stats API: player season stats ---

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatsResponse {
    #[serde(default)]
    pub stats: Vec<StatGroup>,
}

impl PlayerStatsResponse {
    /// The first split of the first stat group, which is where the season line lives.
    pub fn season_line(self) -> Option<StatLine> {
        self.stats
            .into_iter()
            .next()?
            .splits
            .into_iter()
            .next()
            .map(|split| split.stat)
    }
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatGroup {
    #[serde(default)]
    pub splits: Vec<StatSplit>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatSplit {
    #[serde(default)]
    pub stat: StatLine,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatLine {
    pub avg: Option<String>,
    pub home_runs: Option<u32>,
    pub rbi: Option<u32>,
    pub era: Option<String>,
}

// --- Stats API: person detail ---

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeopleResponse {
    #[serde(default)]
    pub people: Vec<Person>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub full_name: Option<String>,
    pub current_age: Option<u32>,
    pub height: Option<String>,
    pub weight: Option<u32>,
    pub birth_city: Option<String>,
    pub current_team: Option<TeamRef>,
}

//! Position buckets and the three roster tabs.

use std::collections::BTreeMap;
use std::future::Future;

use anyhow::Result;
use futures::future::join_all;
use tracing::warn;

use crate::data::{headshot_url, HeadshotSize};
use crate::model::{RosterEntry, StatLine};

pub const PLACEHOLDER: &str = "—";

/// Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PositionGroup {
    StartingPitchers,
    ReliefPitchers,
    PitchersDh,
    Catchers,
    Infielders,
    Outfielders,
}

impl PositionGroup {
    pub const ALL: [PositionGroup; 6] = [
        PositionGroup::StartingPitchers,
        PositionGroup::ReliefPitchers,
        PositionGroup::PitchersDh,
        PositionGroup::Catchers,
        PositionGroup::Infielders,
        PositionGroup::Outfielders,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PositionGroup::StartingPitchers => "Starting Pitchers",
            PositionGroup::ReliefPitchers => "Relief Pitchers",
            PositionGroup::PitchersDh => "Pitchers/DH",
            PositionGroup::Catchers => "Catchers",
            PositionGroup::Infielders => "Infielders",
            PositionGroup::Outfielders => "Outfielders",
        }
    }

    pub fn from_abbreviation(abbreviation: &str) -> Self {
        match abbreviation {
            "SP" => PositionGroup::StartingPitchers,
            "RP" | "CP" | "LRP" | "MRP" => PositionGroup::ReliefPitchers,
            "C" => PositionGroup::Catchers,
            "1B" | "2B" | "3B" | "SS" | "IF" => PositionGroup::Infielders,
            "LF" | "CF" | "RF" | "OF" => PositionGroup::Outfielders,
            _ => PositionGroup::PitchersDh,
        }
    }

    pub fn tab(self) -> RosterTab {
        match self {
            PositionGroup::StartingPitchers
            | PositionGroup::ReliefPitchers
            | PositionGroup::PitchersDh => RosterTab::Pitchers,
            PositionGroup::Catchers => RosterTab::Catchers,
            PositionGroup::Infielders | PositionGroup::Outfielders => RosterTab::Batters,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RosterTab {
    #[default]
    Pitchers,
    Catchers,
    Batters,
}

impl RosterTab {
    pub const ALL: [RosterTab; 3] = [RosterTab::Pitchers, RosterTab::Catchers, RosterTab::Batters];

    pub fn title(self) -> &'static str {
        match self {
            RosterTab::Pitchers => "Pitchers",
            RosterTab::Catchers => "Catchers",
            RosterTab::Batters => "Batters",
        }
    }

    pub fn index(self) -> usize {
        match self {
            RosterTab::Pitchers => 0,
            RosterTab::Catchers => 1,
            RosterTab::Batters => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub id: u64,
    pub name: String,
    pub position: String,
    pub stats: StatLine,
    pub headshot_url: String,
}

impl PlayerView {
    pub fn new(entry: RosterEntry, stats: Option<StatLine>) -> Self {
        let position = entry.position_abbreviation().unwrap_or("DH").to_string();
        Self {
            id: entry.person.id,
            headshot_url: headshot_url(entry.person.id, HeadshotSize::Thumb),
            name: entry.person.full_name,
            position,
            stats: stats.unwrap_or_default(),
        }
    }

    pub fn group(&self) -> PositionGroup {
        PositionGroup::from_abbreviation(&self.position)
    }

    pub fn stat_summary(&self) -> String {
        format!(
            "AVG: {} | HR: {} | RBI: {} | ERA: {}",
            or_placeholder(self.stats.avg.as_deref()),
            or_placeholder(self.stats.home_runs),
            or_placeholder(self.stats.rbi),
            or_placeholder(self.stats.era.as_deref()),
        )
    }
}

fn or_placeholder<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedRoster {
    groups: BTreeMap<PositionGroup, Vec<PlayerView>>,
}

impl GroupedRoster {
    /// Buckets players by position, keeping input order inside each bucket.
    pub fn group(players: impl IntoIterator<Item = (RosterEntry, Option<StatLine>)>) -> Self {
        let mut groups: BTreeMap<PositionGroup, Vec<PlayerView>> = BTreeMap::new();
        for (entry, stats) in players {
            let view = PlayerView::new(entry, stats);
            groups.entry(view.group()).or_default().push(view);
        }
        Self { groups }
    }

    pub fn players(&self, group: PositionGroup) -> &[PlayerView] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or_default()
    }

    /// Non-empty buckets in display order.
    pub fn sections(&self) -> impl Iterator<Item = (PositionGroup, &[PlayerView])> {
        self.groups
            .iter()
            .filter(|(_, players)| !players.is_empty())
            .map(|(group, players)| (*group, players.as_slice()))
    }

    pub fn tab_sections(&self, tab: RosterTab) -> impl Iterator<Item = (PositionGroup, &[PlayerView])> {
        self.sections().filter(move |(group, _)| group.tab() == tab)
    }

    /// Players of one tab flattened in display order, used for row selection.
    pub fn tab_players(&self, tab: RosterTab) -> Vec<&PlayerView> {
        self.tab_sections(tab)
            .flat_map(|(_, players)| players.iter())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Looks up season stats for every player as one concurrent batch.
///
/// A failed lookup only costs that player their stat line.
pub async fn collect_stats<F, Fut>(entries: Vec<RosterEntry>, fetch: F) -> Vec<(RosterEntry, Option<StatLine>)>
where
    F: Fn(u64) -> Fut,
    Fut: Future<Output = Result<Option<StatLine>>>,
{
    let lookups = entries.iter().map(|entry| {
        let person_id = entry.person.id;
        let lookup = fetch(person_id);
        async move {
            match lookup.await {
                Ok(stats) => stats,
                Err(err) => {
                    warn!(person_id, "season stats unavailable: {err:#}");
                    None
                }
            }
        }
    });
    let stats = join_all(lookups).await;
    entries.into_iter().zip(stats).collect()
}

pub async fn build<F, Fut>(entries: Vec<RosterEntry>, fetch: F) -> GroupedRoster
where
    F: Fn(u64) -> Fut,
    Fut: Future<Output = Result<Option<StatLine>>>,
{
    GroupedRoster::group(collect_stats(entries, fetch).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PersonRef, Position};
    use anyhow::bail;

    fn entry(id: u64, name: &str, pos: Option<&str>) -> RosterEntry {
        RosterEntry {
            person: PersonRef {
                id,
                full_name: name.to_string(),
            },
            position: pos.map(|a| Position {
                abbreviation: Some(a.to_string()),
            }),
        }
    }

    #[test]
    fn starting_pitcher_lands_on_pitchers_tab() {
        let roster = GroupedRoster::group([(entry(1, "Gerrit Cole", Some("SP")), None)]);
        assert_eq!(roster.players(PositionGroup::StartingPitchers).len(), 1);
        assert_eq!(
            roster.tab_players(RosterTab::Pitchers)[0].name,
            "Gerrit Cole"
        );
        assert!(roster.tab_players(RosterTab::Batters).is_empty());
    }

    #[test]
    fn unknown_or_missing_position_defaults_to_pitchers_dh() {
        let roster = GroupedRoster::group([
            (entry(1, "Two Way", Some("TWP")), None),
            (entry(2, "No Position", None), None),
        ]);
        let bucket = roster.players(PositionGroup::PitchersDh);
        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket[1].position, "DH");
    }

    #[test]
    fn tab_follows_label_rule() {
        for group in PositionGroup::ALL {
            let label = group.label();
            let expected = if label.contains("Pitcher") || label.contains("DH") {
                RosterTab::Pitchers
            } else if label.contains("Catch") {
                RosterTab::Catchers
            } else {
                RosterTab::Batters
            };
            assert_eq!(group.tab(), expected, "{label}");
        }
    }

    #[test]
    fn empty_buckets_are_omitted_and_order_is_kept() {
        let roster = GroupedRoster::group([
            (entry(1, "Aaron Judge", Some("RF")), None),
            (entry(2, "Anthony Volpe", Some("SS")), None),
            (entry(3, "Juan Soto", Some("RF")), None),
            (entry(4, "Austin Wells", Some("C")), None),
        ]);
        let sections: Vec<PositionGroup> = roster.sections().map(|(g, _)| g).collect();
        assert_eq!(
            sections,
            vec![PositionGroup::Catchers, PositionGroup::Infielders, PositionGroup::Outfielders]
        );
        let outfield: Vec<&str> = roster
            .players(PositionGroup::Outfielders)
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(outfield, vec!["Aaron Judge", "Juan Soto"]);
        assert_eq!(roster.tab_sections(RosterTab::Pitchers).count(), 0);
        assert_eq!(roster.len(), 4);
    }

    #[test]
    fn stat_summary_uses_placeholders() {
        let view = PlayerView::new(
            entry(7, "Someone", Some("1B")),
            Some(StatLine {
                avg: Some(".288".into()),
                home_runs: Some(0),
                rbi: None,
                era: None,
            }),
        );
        assert_eq!(view.stat_summary(), "AVG: .288 | HR: 0 | RBI: — | ERA: —");
        assert!(view.headshot_url.contains("/people/7/"));
    }

    #[test]
    fn tab_cycling() {
        assert_eq!(RosterTab::Pitchers.next(), RosterTab::Catchers);
        assert_eq!(RosterTab::Batters.next(), RosterTab::Pitchers);
        assert_eq!(RosterTab::Pitchers.previous(), RosterTab::Batters);
    }

    #[tokio::test]
    async fn stat_failure_is_isolated_to_one_player() {
        let entries = vec![
            entry(1, "Good Hitter", Some("CF")),
            entry(2, "Broken Lookup", Some("CF")),
            entry(3, "Another Hitter", Some("LF")),
        ];
        let roster = build(entries, |id| async move {
            if id == 2 {
                bail!("500 from stats endpoint");
            }
            Ok(Some(StatLine {
                avg: Some(".300".into()),
                ..StatLine::default()
            }))
        })
        .await;

        let outfield = roster.players(PositionGroup::Outfielders);
        assert_eq!(outfield.len(), 3);
        assert_eq!(outfield[0].stats.avg.as_deref(), Some(".300"));
        assert_eq!(outfield[1].stats, StatLine::default());
        assert_eq!(outfield[2].stats.avg.as_deref(), Some(".300"));
    }
}

use indexmap::IndexMap;

use crate::model::Team;

/// Teams by id, kept in the order the backend listed them.
///
/// Filled once per successful team-list fetch; the favorites screen resolves
/// ids through it instead of going back to the network.
#[derive(Debug, Default, Clone)]
pub struct TeamCache {
    by_id: IndexMap<u32, Team>,
}

impl TeamCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites. An overwritten team keeps its original position.
    pub fn set(&mut self, team: Team) {
        self.by_id.insert(team.id, team);
    }

    pub fn get(&self, id: u32) -> Option<&Team> {
        self.by_id.get(&id)
    }

    pub fn has(&self, id: u32) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn all(&self) -> impl Iterator<Item = &Team> {
        self.by_id.values()
    }

    pub fn extend(&mut self, teams: impl IntoIterator<Item = Team>) {
        for team in teams {
            self.set(team);
        }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

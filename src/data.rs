use anyhow::{Context, Result};
use image::DynamicImage;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::model::{
    PeopleResponse, Person, PlayerStatsResponse, RosterEntry, RosterResponse, StandingsResponse,
    StatLine, Team, TeamsResponse,
};
use crate::retry::{retry, RetryPolicy};
use crate::roster::{self, GroupedRoster};

pub const DEFAULT_BACKEND_URL: &str = "https://mlb-stats-backend-1.onrender.com";
pub const DEFAULT_STATS_URL: &str = "https://statsapi.mlb.com";
pub const DEFAULT_SEASON: u16 = 2024;

const LOGO_BASE: &str = "https://www.mlbstatic.com/team-logos";
const HEADSHOT_BASE: &str = "https://img.mlbstatic.com/mlb-photos/image/upload";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadshotSize {
    Thumb,
    Full,
}

impl HeadshotSize {
    fn width(self) -> u32 {
        match self {
            HeadshotSize::Thumb => 120,
            HeadshotSize::Full => 300,
        }
    }
}

pub fn team_logo_url(team_id: u32) -> String {
    format!("{LOGO_BASE}/{team_id}.svg")
}

pub fn headshot_url(person_id: u64, size: HeadshotSize) -> String {
    format!(
        "{HEADSHOT_BASE}/w_{},q_auto:best/v1/people/{person_id}/headshot/silo/current",
        size.width()
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub backend: String,
    pub stats: String,
    pub season: u16,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            backend: DEFAULT_BACKEND_URL.to_string(),
            stats: DEFAULT_STATS_URL.to_string(),
            season: DEFAULT_SEASON,
        }
    }
}

impl Endpoints {
    fn backend_base(&self) -> &str {
        self.backend.trim_end_matches('/')
    }

    fn stats_base(&self) -> &str {
        self.stats.trim_end_matches('/')
    }

    pub fn teams_url(&self) -> String {
        format!("{}/api/teams", self.backend_base())
    }

    pub fn standings_url(&self) -> String {
        format!(
            "{}/api/v1/standings?leagueId=103,104&season={}&standingsTypes=regularSeason&hydrate=division",
            self.stats_base(),
            self.season
        )
    }

    pub fn roster_url(&self, team_id: u32) -> String {
        format!("{}/api/v1/teams/{team_id}/roster", self.stats_base())
    }

    pub fn player_stats_url(&self, person_id: u64) -> String {
        format!(
            "{}/api/v1/people/{person_id}/stats?stats=season&season={}",
            self.stats_base(),
            self.season
        )
    }

    pub fn person_url(&self, person_id: u64) -> String {
        format!("{}/api/v1/people/{person_id}", self.stats_base())
    }
}

pub struct DataClient {
    client: Client,
    endpoints: Endpoints,
    retry: RetryPolicy,
}

impl DataClient {
    pub fn new(endpoints: Endpoints, retry: RetryPolicy) -> Self {
        Self {
            client: Client::new(),
            endpoints,
            retry,
        }
    }

    /// GET with the client's retry policy. Error statuses count as failed
    /// attempts and are never handed back as a response.
    pub async fn fetch_with_retry<P>(&self, url: &str, on_progress: P) -> Result<Response>
    where
        P: FnMut(&str),
    {
        retry(
            self.retry,
            |attempt| {
                let request = self.client.get(url);
                async move {
                    debug!(attempt, url, "GET");
                    let resp = request.send().await?.error_for_status()?;
                    Ok::<_, anyhow::Error>(resp)
                }
            },
            on_progress,
        )
        .await
        .with_context(|| format!("GET {url} failed"))
    }

    /// Single attempt, error statuses rejected.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url, "GET");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .and_then(Response::error_for_status)
            .with_context(|| format!("GET {url} failed"))?;
        let data = resp
            .json::<T>()
            .await
            .with_context(|| format!("unexpected payload from {url}"))?;
        Ok(data)
    }

    pub async fn fetch_teams<P>(&self, on_progress: P) -> Result<Vec<Team>>
    where
        P: FnMut(&str),
    {
        let url = self.endpoints.teams_url();
        debug!(
            url = %url,
            attempts = self.retry.max_attempts,
            worst_case_wait_ms = self.retry.worst_case_wait().as_millis() as u64,
            "fetching teams"
        );
        let resp = self.fetch_with_retry(&url, on_progress).await?;
        let data = resp
            .json::<TeamsResponse>()
            .await
            .context("unexpected teams payload")?;
        Ok(data.teams)
    }

    pub async fn fetch_standings(&self) -> Result<StandingsResponse> {
        self.get_json(&self.endpoints.standings_url()).await
    }

    pub async fn fetch_roster(&self, team_id: u32) -> Result<Vec<RosterEntry>> {
        let data: RosterResponse = self.get_json(&self.endpoints.roster_url(team_id)).await?;
        Ok(data.roster)
    }

    pub async fn fetch_season_stats(&self, person_id: u64) -> Result<Option<StatLine>> {
        let data: PlayerStatsResponse = self
            .get_json(&self.endpoints.player_stats_url(person_id))
            .await?;
        Ok(data.season_line())
    }

    pub async fn fetch_person(&self, person_id: u64) -> Result<Option<Person>> {
        let data: PeopleResponse = self.get_json(&self.endpoints.person_url(person_id)).await?;
        Ok(data.people.into_iter().next())
    }

    /// Roster plus one season-stat lookup per player.
    pub async fn load_roster(&self, team_id: u32) -> Result<GroupedRoster> {
        let entries = self.fetch_roster(team_id).await?;
        Ok(roster::build(entries, |person_id| self.fetch_season_stats(person_id)).await)
    }

    pub async fn fetch_headshot(&self, person_id: u64) -> Result<DynamicImage> {
        let url = headshot_url(person_id, HeadshotSize::Full);
        let bytes = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(Response::error_for_status)
            .with_context(|| format!("GET {url} failed"))?
            .bytes()
            .await?;
        let img = image::load_from_memory(&bytes).context("headshot is not a decodable image")?;
        Ok(img)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_follow_templates() {
        let endpoints = Endpoints {
            backend: "http://localhost:3000/".into(),
            stats: "https://statsapi.mlb.com".into(),
            season: 2024,
        };
        assert_eq!(endpoints.teams_url(), "http://localhost:3000/api/teams");
        assert_eq!(
            endpoints.standings_url(),
            "https://statsapi.mlb.com/api/v1/standings?leagueId=103,104&season=2024&standingsTypes=regularSeason&hydrate=division"
        );
        assert_eq!(
            endpoints.roster_url(147),
            "https://statsapi.mlb.com/api/v1/teams/147/roster"
        );
        assert_eq!(
            endpoints.player_stats_url(592450),
            "https://statsapi.mlb.com/api/v1/people/592450/stats?stats=season&season=2024"
        );
    }

    #[test]
    fn image_urls_are_derived_from_ids() {
        assert_eq!(team_logo_url(147), "https://www.mlbstatic.com/team-logos/147.svg");
        assert_eq!(
            headshot_url(592450, HeadshotSize::Thumb),
            "https://img.mlbstatic.com/mlb-photos/image/upload/w_120,q_auto:best/v1/people/592450/headshot/silo/current"
        );
        assert!(headshot_url(592450, HeadshotSize::Full).contains("/w_300,"));
    }
}

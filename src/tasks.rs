use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::app::{AppEvent, Command};
use crate::data::DataClient;
use crate::render::PlayerDetail;

/// Runs [`Command`]s off the UI task and reports back over the channel.
#[derive(Clone)]
pub struct Runner {
    client: Arc<DataClient>,
    tx: mpsc::Sender<AppEvent>,
    headshots: bool,
}

impl Runner {
    pub fn new(client: Arc<DataClient>, tx: mpsc::Sender<AppEvent>, headshots: bool) -> Self {
        Self {
            client,
            tx,
            headshots,
        }
    }

    pub fn spawn(&self, command: Command) {
        let runner = self.clone();
        tokio::spawn(async move { runner.run(command).await });
    }

    pub async fn run(&self, command: Command) {
        debug!(?command, "running command");
        match command {
            Command::LoadTeams => {
                let progress = self.tx.clone();
                let result = self
                    .client
                    .fetch_teams(|msg| {
                        let _ = progress.try_send(AppEvent::Progress(msg.to_string()));
                    })
                    .await;
                let event = match result {
                    Ok(teams) => AppEvent::TeamsLoaded(teams),
                    Err(err) => {
                        error!("team load error: {err:#}");
                        AppEvent::TeamsFailed(format!("{err:#}"))
                    }
                };
                self.send(event).await;
            }
            Command::LoadStandings => {
                let event = match self.client.fetch_standings().await {
                    Ok(response) => AppEvent::StandingsLoaded(response),
                    Err(err) => {
                        error!("standings load error: {err:#}");
                        AppEvent::StandingsFailed(format!("{err:#}"))
                    }
                };
                self.send(event).await;
            }
            Command::BackfillTeams => {
                let event = match self.client.fetch_teams(|_| {}).await {
                    Ok(teams) => AppEvent::BackfillLoaded(teams),
                    Err(err) => AppEvent::BackfillFailed(format!("{err:#}")),
                };
                self.send(event).await;
            }
            Command::LoadRoster { team_id } => {
                let event = match self.client.load_roster(team_id).await {
                    Ok(roster) => AppEvent::RosterLoaded { team_id, roster },
                    Err(err) => {
                        error!(team_id, "roster load error: {err:#}");
                        AppEvent::RosterFailed {
                            team_id,
                            error: format!("{err:#}"),
                        }
                    }
                };
                self.send(event).await;
            }
            Command::LoadPlayer { person_id } => {
                let event = match self.client.fetch_person(person_id).await {
                    Ok(person) => AppEvent::PlayerLoaded {
                        person_id,
                        detail: PlayerDetail::from_person(person_id, person.as_ref()),
                    },
                    Err(err) => {
                        error!(person_id, "player load error: {err:#}");
                        AppEvent::PlayerFailed {
                            person_id,
                            error: format!("{err:#}"),
                        }
                    }
                };
                self.send(event).await;

                if self.headshots {
                    match self.client.fetch_headshot(person_id).await {
                        Ok(image) => self.send(AppEvent::HeadshotLoaded { person_id, image }).await,
                        Err(err) => warn!(person_id, "headshot unavailable: {err:#}"),
                    }
                }
            }
        }
    }

    async fn send(&self, event: AppEvent) {
        if self.tx.send(event).await.is_err() {
            debug!("ui is gone, dropping result");
        }
    }
}

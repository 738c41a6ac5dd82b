use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;

use crate::aoc::leaderboard::LeaderboardSnapshot;
use crate::error::{BotError, BotResult};

/// Source of private leaderboard snapshots.
#[async_trait]
pub trait LeaderboardClient: Send + Sync {
    async fn private_leaderboard(&self) -> BotResult<LeaderboardSnapshot>;
}

enum Endpoint {
    PrivateLeaderboard(i32, u64),
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Endpoint::PrivateLeaderboard(year, id) => {
                write!(f, "/{}/leaderboard/private/view/{}.json", year, id)
            }
        }
    }
}

pub struct AoC {
    http_client: Client,
    base_url: String,
    session_cookie: String,
    private_leaderboard_id: u64,
    year: i32,
}

impl AoC {
    pub fn new(
        base_url: String,
        timeout: Duration,
        private_leaderboard_id: u64,
        year: i32,
        session_cookie: String,
    ) -> BotResult<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
            private_leaderboard_id,
            year,
            session_cookie,
        })
    }

    fn url(&self, endpoint: &Endpoint) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), endpoint)
    }

    async fn get(&self, endpoint: &Endpoint, session_cookie: Option<&str>) -> BotResult<String> {
        let mut request = self.http_client.get(self.url(endpoint));

        if let Some(session) = session_cookie {
            request = request.header("cookie", format!("session={session}"))
        }
        let response = request.send().await?;

        match response.status() {
            StatusCode::OK => response.text().await.map_err(|_| BotError::Parse),
            // AoC responds with INTERNAL_SERVER_ERROR when the session cookie is invalid.
            StatusCode::INTERNAL_SERVER_ERROR => Err(BotError::Http(format!(
                "{}. The session cookie might have expired.",
                StatusCode::INTERNAL_SERVER_ERROR
            ))),
            _ => Err(BotError::Http(format!("{}", response.status()))),
        }
    }
}

#[async_trait]
impl LeaderboardClient for AoC {
    async fn private_leaderboard(&self) -> BotResult<LeaderboardSnapshot> {
        let endpoint = Endpoint::PrivateLeaderboard(self.year, self.private_leaderboard_id);
        let payload = self.get(&endpoint, Some(&self.session_cookie)).await?;
        LeaderboardSnapshot::from_json(&payload, Utc::now())
    }
}

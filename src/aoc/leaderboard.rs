use crate::error::{BotError, BotResult};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Deserialize;
use std::collections::HashMap;

// Member of the private leaderboard, as seen at fetch time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberEntry {
    pub name: String,
    pub local_score: u64,
    pub stars: u64,
}

/// One fetch result of the private leaderboard. Never mutated once built,
/// a newer fetch replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardSnapshot {
    pub timestamp: DateTime<Utc>,
    pub year: i32,
    members: HashMap<String, MemberEntry>,
}

// Response from AOC private leaderboard API.
#[derive(Debug, Deserialize)]
struct AOCPrivateLeaderboardResponse {
    event: String,
    members: HashMap<String, AOCPrivateLeaderboardMember>,
}

#[derive(Debug, Deserialize)]
struct AOCPrivateLeaderboardMember {
    id: u64,
    /// anonymous users appear with null names in the AoC API
    name: Option<String>,
    local_score: u64,
    stars: u64,
}

impl LeaderboardSnapshot {
    pub fn new(
        timestamp: DateTime<Utc>,
        year: i32,
        members: HashMap<String, MemberEntry>,
    ) -> LeaderboardSnapshot {
        LeaderboardSnapshot {
            timestamp,
            year,
            members,
        }
    }

    /// Parsing of the private leaderboard JSON payload.
    pub fn from_json(payload: &str, timestamp: DateTime<Utc>) -> BotResult<Self> {
        let parsed = serde_json::from_str::<AOCPrivateLeaderboardResponse>(payload)?;

        let members = parsed
            .members
            .into_iter()
            .map(|(key, member)| {
                let name = member
                    .name
                    .unwrap_or_else(|| format!("anonymous user #{}", member.id));
                (
                    key,
                    MemberEntry {
                        name,
                        local_score: member.local_score,
                        stars: member.stars,
                    },
                )
            })
            .collect::<HashMap<String, MemberEntry>>();

        Ok(LeaderboardSnapshot {
            timestamp,
            year: parsed.event.parse().map_err(|_| BotError::Parse)?,
            members,
        })
    }

    pub fn members(&self) -> &HashMap<String, MemberEntry> {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members ranked by local score, best first. Order among equal scores
    /// is not defined.
    pub fn standings_by_local_score(&self) -> Vec<&MemberEntry> {
        self.members
            .values()
            .sorted_by_key(|m| m.local_score)
            .rev()
            .collect()
    }

    pub fn top(&self, n: usize) -> Vec<&MemberEntry> {
        self.standings_by_local_score()
            .into_iter()
            .take(n)
            .collect()
    }
}

#[cfg(test)]
pub(crate) fn snapshot_with_scores(scores: &[(&str, u64)]) -> LeaderboardSnapshot {
    let members = scores
        .iter()
        .enumerate()
        .map(|(idx, (name, score))| {
            (
                idx.to_string(),
                MemberEntry {
                    name: name.to_string(),
                    local_score: *score,
                    stars: score / 10,
                },
            )
        })
        .collect();
    LeaderboardSnapshot::new(Utc::now(), 2020, members)
}

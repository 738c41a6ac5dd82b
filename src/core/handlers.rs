use crate::{
    core::{commands::Command, templates::MessageTemplate},
    error::{BotError, BotResult},
    storage::MemoryCache,
    utils::{format_duration, Clock},
};

use chrono::{Datelike, FixedOffset, TimeZone};
use minijinja::context;
use std::sync::Arc;

pub const TORTOISE_LEADERBOARD_ID: u64 = 432225;
pub const TORTOISE_LEADERBOARD_INVITE: &str = "432225-ab5dcfc1";

const LEADERBOARD_SIZE: usize = 10;
// Must match the interval of the refresh job, it is announced to users.
const REFRESH_NOTICE_MINUTES: u64 = 30;
// Puzzles unlock at midnight UTC-5.
const AOC_UTC_OFFSET_SECONDS: i32 = 5 * 3600;
const AOC_MONTH: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Info,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub kind: ReplyKind,
    pub title: Option<String>,
    pub body: String,
}

impl Reply {
    fn info(title: &str, body: String) -> Self {
        Reply {
            kind: ReplyKind::Info,
            title: Some(title.to_string()),
            body,
        }
    }

    fn failure(body: String) -> Self {
        Reply {
            kind: ReplyKind::Failure,
            title: None,
            body,
        }
    }

    /// Message text as posted on the chat platform.
    pub fn render(&self) -> BotResult<String> {
        let template = match self.kind {
            ReplyKind::Info => MessageTemplate::InfoReply,
            ReplyKind::Failure => MessageTemplate::FailureReply,
        };
        template.render(context! { title => self.title, body => self.body })
    }
}

pub struct CommandHandlers {
    cache: MemoryCache,
    clock: Arc<dyn Clock>,
    year: i32,
}

impl CommandHandlers {
    pub fn new(cache: MemoryCache, clock: Arc<dyn Clock>, year: i32) -> Self {
        CommandHandlers { cache, clock, year }
    }

    pub fn handle(&self, command: Command) -> BotResult<Reply> {
        match command {
            Command::Help => self.help(),
            Command::Invite => self.invite(),
            Command::Leaderboard => self.leaderboard(),
            Command::Countdown => self.aoc_countdown(),
        }
    }

    pub fn help(&self) -> BotResult<Reply> {
        let body = MessageTemplate::Help.render(context! {
            refresh_minutes => REFRESH_NOTICE_MINUTES,
        })?;
        Ok(Reply::info("Tortoise AoC", body))
    }

    /// Shows invite to our Tortoise Advent of Code leaderboard.
    pub fn invite(&self) -> BotResult<Reply> {
        let body = MessageTemplate::Invite.render(context! {
            invite_code => TORTOISE_LEADERBOARD_INVITE,
            year => self.year,
        })?;
        Ok(Reply::info("Tortoise AoC", body))
    }

    /// Shows Tortoise leaderboard, from the last cached snapshot.
    pub fn leaderboard(&self) -> BotResult<Reply> {
        let snapshot = match self.cache.get() {
            Some(snapshot) => snapshot,
            None => {
                return Ok(Reply::failure(
                    MessageTemplate::CacheNotReady.render(context! {})?,
                ))
            }
        };

        let rows = snapshot
            .top(LEADERBOARD_SIZE)
            .iter()
            .enumerate()
            .map(|(idx, member)| {
                format!(
                    "{}. {:4}p {:4} {}",
                    // idx is zero-based
                    idx + 1,
                    member.local_score,
                    format!("★{}", member.stars),
                    member.name
                )
            })
            .collect::<Vec<String>>();

        let body = MessageTemplate::LeaderboardDisplay.render(context! {
            rows => rows,
            refresh_minutes => REFRESH_NOTICE_MINUTES,
        })?;
        Ok(Reply::info("Tortoise AoC leaderboard", body))
    }

    /// Time until next challenge starts.
    ///
    /// On December 31st the day ends on January 1st midnight of the next year.
    pub fn aoc_countdown(&self) -> BotResult<Reply> {
        let offset = FixedOffset::west_opt(AOC_UTC_OFFSET_SECONDS).ok_or(BotError::Parse)?;
        let now = self.clock.now().with_timezone(&offset);

        if now.month() != AOC_MONTH {
            return Ok(Reply::failure(MessageTemplate::AocOver.render(context! {})?));
        }

        let next_midnight = now
            .date_naive()
            .succ_opt()
            .and_then(|day| day.and_hms_opt(0, 0, 0))
            .and_then(|midnight| offset.from_local_datetime(&midnight).single())
            .ok_or(BotError::Parse)?;

        let body = MessageTemplate::Countdown.render(context! {
            day => now.day(),
            remaining => format_duration(next_midnight - now),
        })?;
        Ok(Reply::info("Countdown", body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aoc::leaderboard::snapshot_with_scores;
    use crate::utils::FixedClock;
    use chrono::{DateTime, Utc};

    fn at_utc_minus_5(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
        FixedOffset::west_opt(AOC_UTC_OFFSET_SECONDS)
            .unwrap()
            .with_ymd_and_hms(year, month, day, hour, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn handlers_at(cache: MemoryCache, now: DateTime<Utc>) -> CommandHandlers {
        CommandHandlers::new(cache, Arc::new(FixedClock(now)), 2020)
    }

    fn handlers(cache: MemoryCache) -> CommandHandlers {
        handlers_at(cache, at_utc_minus_5(2020, 12, 10, 8, 0))
    }

    fn rows(reply: &Reply) -> Vec<&str> {
        reply
            .body
            .lines()
            .filter(|line| line.contains(". ") && line.contains("p ★"))
            .collect()
    }

    #[test]
    fn invite_contains_code_and_link() {
        let reply = handlers(MemoryCache::new()).invite().unwrap();

        assert_eq!(reply.kind, ReplyKind::Info);
        assert_eq!(reply.title.as_deref(), Some("Tortoise AoC"));
        assert!(reply.body.contains("*432225-ab5dcfc1*"));
        assert!(reply
            .body
            .contains("https://adventofcode.com/2020/leaderboard"));
    }

    #[test]
    fn leaderboard_on_cold_start_is_not_ready() {
        let reply = handlers(MemoryCache::new()).leaderboard().unwrap();

        assert_eq!(reply.kind, ReplyKind::Failure);
        assert_eq!(
            reply.body,
            "Please try again in few seconds as cache is not yet loaded."
        );
    }

    #[test]
    fn leaderboard_ranks_by_local_score() {
        let cache = MemoryCache::new();
        cache.set(snapshot_with_scores(&[
            ("alice", 50),
            ("bob", 80),
            ("carol", 80),
            ("dave", 10),
        ]));

        let reply = handlers(cache).leaderboard().unwrap();
        let rows = rows(&reply);

        assert_eq!(rows.len(), 4);
        let mut leaders = rows[..2]
            .iter()
            .map(|row| row.split_whitespace().last().unwrap())
            .collect::<Vec<&str>>();
        leaders.sort();
        assert_eq!(leaders, vec!["bob", "carol"]);
        assert_eq!(rows[2], "3.   50p ★5   alice");
        assert_eq!(rows[3], "4.   10p ★1   dave");
        assert!(reply.body.starts_with("```\n1.   80p ★8   "));
        assert!(reply
            .body
            .ends_with("```\n\nThe leaderboard is refreshed each 30 minutes."));
    }

    #[test]
    fn leaderboard_shows_top_ten() {
        let names = (0..15).map(|i| format!("m{i}")).collect::<Vec<String>>();
        let scores = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), 100 + i as u64))
            .collect::<Vec<(&str, u64)>>();
        let cache = MemoryCache::new();
        cache.set(snapshot_with_scores(&scores));

        let reply = handlers(cache).leaderboard().unwrap();
        let rows = rows(&reply);

        assert_eq!(rows.len(), 10);
        assert!(rows[0].starts_with("1. "));
        assert!(rows[9].starts_with("10. "));
        assert!(rows[9].ends_with(" m5"));
    }

    #[test]
    fn leaderboard_reads_latest_snapshot() {
        let cache = MemoryCache::new();
        let handlers = handlers(cache.clone());
        cache.set(snapshot_with_scores(&[("alice", 50)]));
        cache.set(snapshot_with_scores(&[("bob", 80)]));

        let reply = handlers.leaderboard().unwrap();
        assert!(reply.body.contains("bob"));
        assert!(!reply.body.contains("alice"));
    }

    #[test]
    fn countdown_mid_month() {
        let handlers = handlers_at(MemoryCache::new(), at_utc_minus_5(2020, 12, 10, 8, 0));
        let reply = handlers.aoc_countdown().unwrap();

        assert_eq!(reply.kind, ReplyKind::Info);
        assert_eq!(reply.title.as_deref(), Some("Countdown"));
        assert_eq!(reply.body, "Day 10 ends in 16h 0m");
    }

    #[test]
    fn countdown_off_season() {
        let cache = MemoryCache::new();
        cache.set(snapshot_with_scores(&[("alice", 50)]));
        let handlers = handlers_at(cache, at_utc_minus_5(2021, 7, 1, 12, 0));
        let reply = handlers.aoc_countdown().unwrap();

        assert_eq!(reply.kind, ReplyKind::Failure);
        assert_eq!(reply.body, "AoC is over!");
    }

    #[test]
    fn countdown_on_december_31_rolls_over_to_next_year() {
        let handlers = handlers_at(MemoryCache::new(), at_utc_minus_5(2020, 12, 31, 23, 0));
        let reply = handlers.aoc_countdown().unwrap();

        assert_eq!(reply.body, "Day 31 ends in 1h 0m");
    }

    #[test]
    fn countdown_uses_utc_minus_5() {
        // Still November 30th in UTC-5.
        let now = Utc.with_ymd_and_hms(2020, 12, 1, 3, 0, 0).unwrap();
        let reply = handlers_at(MemoryCache::new(), now).aoc_countdown().unwrap();
        assert_eq!(reply.kind, ReplyKind::Failure);

        let now = Utc.with_ymd_and_hms(2020, 12, 1, 5, 30, 0).unwrap();
        let reply = handlers_at(MemoryCache::new(), now).aoc_countdown().unwrap();
        assert_eq!(reply.body, "Day 1 ends in 23h 30m");
    }

    #[test]
    fn handle_dispatches_commands() {
        let handlers = handlers(MemoryCache::new());

        assert_eq!(
            handlers.handle(Command::Invite).unwrap(),
            handlers.invite().unwrap()
        );
        assert_eq!(
            handlers.handle(Command::Leaderboard).unwrap().kind,
            ReplyKind::Failure
        );
        assert!(handlers
            .handle(Command::Help)
            .unwrap()
            .body
            .contains("`!aoc_countdown`"));
    }

    #[test]
    fn replies_render_for_chat() {
        let handlers = handlers(MemoryCache::new());

        assert_eq!(
            handlers.aoc_countdown().unwrap().render().unwrap(),
            "*Countdown*\nDay 10 ends in 16h 0m"
        );
        assert_eq!(
            handlers.leaderboard().unwrap().render().unwrap(),
            ":x: Please try again in few seconds as cache is not yet loaded."
        );
    }
}

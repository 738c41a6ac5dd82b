use clap::Parser;
use serde::Serialize;

#[derive(Debug, Parser, Serialize)]
pub struct Cli {
    /// Max level of the emitted traces (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_level: Option<String>,
    /// AoC event whose private leaderboard is fetched
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aoc_event_year: Option<i32>,
}

use crate::cli::Cli;
use crate::error::BotResult;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::Level;

const TRACE_LEVELS: [&'static str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
const LOCAL_SETTINGS_YAML_FILE: &str = ".env.local.yaml";

// All settings may be configured via environment variables. Example:
// SLACK_TOKEN="xxx" would set slack_token to the xxx value.
// Command line flags take precedence over everything else.
#[derive(Deserialize, Debug)]
pub struct Settings {
    #[serde(default = "default_trace_level")]
    trace_level: String,
    pub slack_token: String,
    pub slack_app_token: String,
    #[serde(default = "default_aoc_base_url")]
    pub aoc_base_url: String,
    #[serde(default = "default_aoc_api_timeout_sec")]
    pub aoc_api_timeout_sec: u64,
    pub aoc_session_cookie: String,
    #[serde(default = "default_aoc_event_year")]
    pub aoc_event_year: i32,
    // AoC API rules states to not fetch leaderboard at a frequency higher than 15min.
    #[serde(default = "default_refresh_interval_sec")]
    pub refresh_interval_sec: u64,
}

impl Settings {
    pub fn new(cli: Cli) -> BotResult<Self> {
        let mut figment = Figment::new();
        if Path::new(LOCAL_SETTINGS_YAML_FILE).exists() {
            println!(
                "\n######################################\n\
                   ##   Found '.env.local.yaml' file,  ##\n\
                   ##   loading local configuration.   ##\n\
                   ######################################\n\
                "
            );
            figment = figment.merge(Yaml::file(LOCAL_SETTINGS_YAML_FILE));
        }

        Settings::from_figment(
            figment
                .merge(Env::raw())
                .merge(Serialized::defaults(cli)),
        )
    }

    pub fn from_figment(figment: Figment) -> BotResult<Self> {
        Ok(figment.extract()?)
    }

    pub fn get_trace_level(&self) -> Level {
        get_trace_level(&self.trace_level)
    }

    pub fn aoc_api_timeout(&self) -> Duration {
        Duration::from_secs(self.aoc_api_timeout_sec)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_sec)
    }
}

fn get_trace_level(level_str: &str) -> Level {
    match level_str {
        level if level == TRACE_LEVELS[0] => Level::TRACE,
        level if level == TRACE_LEVELS[1] => Level::DEBUG,
        level if level == TRACE_LEVELS[2] => Level::INFO,
        level if level == TRACE_LEVELS[3] => Level::WARN,
        level if level == TRACE_LEVELS[4] => Level::ERROR,
        // Default trace level
        _ => Level::INFO,
    }
}

fn default_trace_level() -> String {
    "INFO".to_string()
}

fn default_aoc_api_timeout_sec() -> u64 {
    5
}

fn default_aoc_base_url() -> String {
    "https://adventofcode.com".to_string()
}

fn default_aoc_event_year() -> i32 {
    2020
}

fn default_refresh_interval_sec() -> u64 {
    30 * 60
}

use crate::error::BotResult;
use minijinja::{Environment, Template};
use once_cell::sync::Lazy;
use serde::Serialize;
use strum::{EnumIter, IntoEnumIterator};
use tracing::{error, info};

static TEMPLATES_ENVIRONMENT: Lazy<Environment> = Lazy::new(|| {
    info!("Initializing templating engine environment.");
    let mut env = Environment::new();

    // Use strum to iterate over the variants of the enum.
    // A template failing to load is reported again when it is requested.
    for template in MessageTemplate::iter() {
        if let Err(e) = env.add_template(template.name(), template.template()) {
            error!("Could not load template {}. {e}", template.name());
        }
    }

    info!("Templates loaded in templating engine environment.");
    env
});

#[derive(Debug, Clone, Copy, EnumIter)]
pub enum MessageTemplate {
    Help,
    Invite,
    LeaderboardDisplay,
    CacheNotReady,
    Countdown,
    AocOver,
    InfoReply,
    FailureReply,
}

impl MessageTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            MessageTemplate::Help => "help.txt",
            MessageTemplate::Invite => "invite.txt",
            MessageTemplate::LeaderboardDisplay => "leaderboard.txt",
            MessageTemplate::CacheNotReady => "cache_not_ready.txt",
            MessageTemplate::Countdown => "countdown.txt",
            MessageTemplate::AocOver => "aoc_over.txt",
            MessageTemplate::InfoReply => "info_reply.txt",
            MessageTemplate::FailureReply => "failure_reply.txt",
        }
    }

    pub fn get(&self) -> BotResult<Template<'static, 'static>> {
        Ok(TEMPLATES_ENVIRONMENT.get_template(self.name())?)
    }

    pub fn render<S: Serialize>(&self, ctx: S) -> BotResult<String> {
        Ok(self.get()?.render(ctx)?)
    }

    pub fn template(&self) -> &'static str {
        // \n\ at each code line end creates a line break at the proper position and discards further spaces in this line of code.
        // \x20 (hex; 32 in decimal) is an ASCII space and an indicator for the first space to be preserved in this line of the string.
        match self {
            MessageTemplate::Help => {
                "🗒️ Tortoise AoC commands:\n\
                    \x20 • `!invite`: shows invite to our Tortoise Advent of Code leaderboard.\n\
                    \x20 • `!leaderboard` (or `!lb`): shows Tortoise leaderboard, updated each {{ refresh_minutes }} minutes.\n\
                    \x20 • `!aoc_countdown`: time until next challenge starts.\n\
                    \x20 • `!help`: explains the bot commands. You're currently reading this."
            }
            MessageTemplate::Invite => {
                "Use this code to join Tortoise AoC leaderboard: *{{ invite_code }}*\n\n\
                 To join you can go to the AoC website: https://adventofcode.com/{{ year }}/leaderboard"
            }
            MessageTemplate::LeaderboardDisplay => {
                "```\n\
                 {%- for row in rows %}\n{{ row }}\n{%- endfor %}\n\
                 ```\n\n\
                 The leaderboard is refreshed each {{ refresh_minutes }} minutes."
            }
            MessageTemplate::CacheNotReady => {
                "Please try again in few seconds as cache is not yet loaded."
            }
            MessageTemplate::Countdown => "Day {{ day }} ends in {{ remaining }}",
            MessageTemplate::AocOver => "AoC is over!",
            MessageTemplate::InfoReply => {
                "{%- if title -%}*{{ title }}*\n{% endif -%}{{ body }}"
            }
            MessageTemplate::FailureReply => ":x: {{ body }}",
        }
    }
}

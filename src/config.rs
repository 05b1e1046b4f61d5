use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

use crate::score::ScoringRules;

/// All gameplay tunables for one session. The defaults are the shipped
/// balance; tests shrink the delays to keep runs fast.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub max_hp: u32,
    pub question_seconds: u32,
    pub player_attack: u32,
    pub enemy_wrong_answer: u32,
    pub enemy_timeout: u32,
    pub scoring: ScoringRules,
    pub countdown_step: Duration,
    pub countdown_final: Duration,
    pub end_delay: Duration,
    pub next_question_delay: Duration,
    pub taunt_frequency: u32,
    pub taunts: Vec<String>,
    pub pause_tips: Vec<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_hp: 100,
            question_seconds: 15,
            player_attack: 25,
            enemy_wrong_answer: 20,
            enemy_timeout: 15,
            scoring: ScoringRules::default(),
            countdown_step: Duration::from_millis(1500),
            countdown_final: Duration::from_millis(1000),
            end_delay: Duration::from_millis(500),
            next_question_delay: Duration::from_millis(1200),
            taunt_frequency: 2,
            taunts: [
                "So close!",
                "Faster!",
                "My problems are hard ones!",
                "Keep trying!",
                "A calculator? Heh.",
                "Oops, not that one!",
            ]
            .map(String::from)
            .to_vec(),
            pause_tips: [
                "Any number multiplied by 9: the digits of the result add up to 9. (9x7=63, 6+3=9)",
                "Pi is infinite and never repeats a pattern. It's an irrational number!",
                "A googol is a 1 followed by 100 zeros.",
                "The Fibonacci sequence (1, 1, 2, 3, 5, 8...) shows up in flower petals.",
                "Zero was invented in India and underpins the number system we use today.",
                "Multiplying by 11: for 25x11 split the 2 and 5 and put their sum between. 275!",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

/// Process-level configuration for the binary, read from the environment
/// (with `.env` support). Endpoints are optional: without them the server
/// runs in local mode on the built-in question set and skips stats upload.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub listen_addr: String,
    pub health_addr: String,
    pub question_api_url: Option<Url>,
    pub question_category: String,
    pub stats_api_url: Option<Url>,
    pub user_id: Option<String>,
    pub game_id: u32,
}

impl BackendConfig {
    pub fn from_env() -> Result<Self> {
        let question_api_url = parse_optional_url("QUESTION_API_URL")?;
        let stats_api_url = parse_optional_url("STATS_API_URL")?;

        let game_id = match env::var("GAME_ID") {
            Ok(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("GAME_ID is not a number: {raw}"))?,
            Err(_) => 1,
        };

        Ok(Self {
            listen_addr: env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:9002".to_string()),
            health_addr: env::var("HEALTH_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            question_api_url,
            question_category: env::var("QUESTION_CATEGORY")
                .unwrap_or_else(|_| "arithmetic".to_string()),
            stats_api_url,
            user_id: env::var("USER_ID").ok().filter(|v| !v.is_empty()),
            game_id,
        })
    }
}

fn parse_optional_url(var: &str) -> Result<Option<Url>> {
    match env::var(var) {
        Ok(raw) if !raw.is_empty() => {
            let url = Url::parse(&raw).with_context(|| format!("{var} is not a valid URL: {raw}"))?;
            Ok(Some(url))
        }
        _ => Ok(None),
    }
}

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::PropError;

const DEFAULT_WINDOW_GAMES: usize = 10;
const DEFAULT_MIN_GAMES: usize = 5;
const DEFAULT_NEAR_TOLERANCE: f64 = 1.5;
const DEFAULT_STATS_DELAY_MS: u64 = 700;
const DEFAULT_ODDS_DELAY_MS: u64 = 300;
const DEFAULT_SEASON: &str = "2025-26";

/// Run parameters, read once at startup. Everything except the API key has
/// a sensible default so a bare `.env` with one key is enough.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub odds_api_key: String,
    pub window_games: usize,
    pub min_games: usize,
    pub near_tolerance: f64,
    pub stats_delay: Duration,
    pub odds_delay: Duration,
    pub regions: String,
    pub season: String,
    pub export_xlsx: bool,
    pub report_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, PropError> {
        let odds_api_key = env::var("ODDS_API_KEY")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                PropError::Auth(
                    "ODDS_API_KEY is not set; get a free key at https://the-odds-api.com"
                        .to_string(),
                )
            })?;

        let window_games = env_usize("PROP_WINDOW_GAMES", DEFAULT_WINDOW_GAMES).clamp(3, 25);
        let min_games = env_usize("PROP_MIN_GAMES", DEFAULT_MIN_GAMES).clamp(1, window_games);
        let near_tolerance =
            env_f64("NEAR_MISS_TOLERANCE", DEFAULT_NEAR_TOLERANCE).clamp(0.0, 10.0);

        let stats_delay =
            Duration::from_millis(env_u64("STATS_REQUEST_DELAY_MS", DEFAULT_STATS_DELAY_MS));
        let odds_delay =
            Duration::from_millis(env_u64("ODDS_REQUEST_DELAY_MS", DEFAULT_ODDS_DELAY_MS));

        let regions = env::var("ODDS_REGIONS")
            .unwrap_or_else(|_| "us".to_string())
            .trim()
            .to_ascii_lowercase();
        let season = env::var("PROP_SEASON")
            .unwrap_or_else(|_| DEFAULT_SEASON.to_string())
            .trim()
            .to_string();

        let export_xlsx = env_bool("PROP_EXPORT_XLSX", false);
        let report_dir = env::var("REPORT_DIR")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            odds_api_key,
            window_games,
            min_games,
            near_tolerance,
            stats_delay,
            odds_delay,
            regions,
            season,
            export_xlsx,
            report_dir,
        })
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| {
            let t = v.trim().to_ascii_lowercase();
            !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
        })
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::{env_bool, env_f64, env_usize};

    #[test]
    fn unset_vars_fall_back_to_defaults() {
        assert_eq!(env_usize("PROPEDGE_TEST_UNSET_USIZE", 10), 10);
        assert_eq!(env_f64("PROPEDGE_TEST_UNSET_F64", 1.5), 1.5);
        assert!(env_bool("PROPEDGE_TEST_UNSET_BOOL", true));
    }

    #[test]
    fn bool_parsing_accepts_common_spellings() {
        unsafe {
            std::env::set_var("PROPEDGE_TEST_BOOL_OFF", "off");
            std::env::set_var("PROPEDGE_TEST_BOOL_ONE", "1");
        }
        assert!(!env_bool("PROPEDGE_TEST_BOOL_OFF", true));
        assert!(env_bool("PROPEDGE_TEST_BOOL_ONE", false));
    }

    #[test]
    fn garbage_numbers_fall_back_to_defaults() {
        unsafe {
            std::env::set_var("PROPEDGE_TEST_USIZE_BAD", "many");
        }
        assert_eq!(env_usize("PROPEDGE_TEST_USIZE_BAD", 7), 7);
    }
}

//! 環境變數設定
//!
//! 所有 `FARKLE_*` 變數都有預設值；格式錯誤時記錄警告並使用預設值。
//! 啟動時先載入 `.env`（已存在的環境變數優先）。

use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: String,
    /// 每個牌桌事件廣播的緩衝大小
    pub event_buffer: usize,
    pub game_code_length: usize,
    pub game_code_chars: String,
    pub default_victory_score: u32,
    pub min_victory_score: u32,
    pub max_victory_score: u32,
    /// 已結束的牌桌保留多久後移除
    pub finished_game_retention: Duration,
    pub cleanup_interval: Duration,
    /// Prometheus `/metrics` 端點位址
    pub metrics_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:50051".to_string(),
            event_buffer: 256,
            game_code_length: 5,
            game_code_chars: "ABCDEFGHJKLMNPQRSTUVWXYZ23456789".to_string(),
            default_victory_score: 2000,
            min_victory_score: 100,
            max_victory_score: 100_000,
            finished_game_retention: Duration::from_secs(5 * 60),
            cleanup_interval: Duration::from_secs(60),
            metrics_addr: "127.0.0.1:9090".to_string(),
        }
    }
}

impl Config {
    /// 載入 `.env`（或指定檔案）後讀取環境變數
    pub fn load(env_file: Option<&Path>) -> Self {
        match env_file {
            Some(path) => {
                if let Err(err) = dotenvy::from_path(path) {
                    warn!(path = %path.display(), %err, "failed to load env file");
                }
            }
            None => {
                // 沒有 .env 是正常情況
                let _ = dotenvy::dotenv();
            }
        }
        Self::from_env()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            addr: env_string("FARKLE_ADDR", &defaults.addr),
            event_buffer: env_parse("FARKLE_EVENT_BUFFER", defaults.event_buffer),
            game_code_length: env_parse("FARKLE_GAME_CODE_LENGTH", defaults.game_code_length),
            game_code_chars: env_string("FARKLE_GAME_CODE_CHARS", &defaults.game_code_chars),
            default_victory_score: env_parse(
                "FARKLE_DEFAULT_VICTORY_SCORE",
                defaults.default_victory_score,
            ),
            min_victory_score: env_parse("FARKLE_MIN_VICTORY_SCORE", defaults.min_victory_score),
            max_victory_score: env_parse("FARKLE_MAX_VICTORY_SCORE", defaults.max_victory_score),
            finished_game_retention: Duration::from_secs(env_parse(
                "FARKLE_FINISHED_GAME_RETENTION_SECS",
                defaults.finished_game_retention.as_secs(),
            )),
            cleanup_interval: Duration::from_secs(env_parse(
                "FARKLE_CLEANUP_INTERVAL_SECS",
                defaults.cleanup_interval.as_secs(),
            )),
            metrics_addr: env_string("FARKLE_METRICS_ADDR", &defaults.metrics_addr),
        }
        .sanitized()
    }

    /// 把會讓大廳無法運作的值換回預設值
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.game_code_length == 0 {
            warn!(default = defaults.game_code_length, "game code length must be positive, using default");
            self.game_code_length = defaults.game_code_length;
        }
        if self.game_code_chars.trim().is_empty() {
            warn!(default = %defaults.game_code_chars, "game code alphabet is empty, using default");
            self.game_code_chars = defaults.game_code_chars;
        }
        if self.event_buffer == 0 {
            warn!(default = defaults.event_buffer, "event buffer must be positive, using default");
            self.event_buffer = defaults.event_buffer;
        }
        self
    }

    /// 超出範圍（或未指定，即 0）時使用預設勝利分數
    pub fn clamp_victory_score(&self, requested: i64) -> u32 {
        if requested < self.min_victory_score as i64 || requested > self.max_victory_score as i64 {
            self.default_victory_score
        } else {
            requested as u32
        }
    }
}

fn env_string(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Debug,
{
    match env::var(key) {
        Ok(value) if !value.is_empty() => value.parse().unwrap_or_else(|_| {
            warn!(key = key, value = %value, default = ?default, "invalid config value, using default");
            default
        }),
        _ => default,
    }
}

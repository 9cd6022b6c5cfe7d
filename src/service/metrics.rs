//! Prometheus 指標
//!
//! 每個 `Lobby` 持有一份 `Metrics`；伺服器把同一個 registry 以文字格式
//! 輸出到 `/metrics`。

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    pub games_created: IntCounter,
    pub games_joined: IntCounter,
    /// 仍在記憶體中的牌桌數
    pub active_games: IntGauge,
    pub farkles: IntCounter,
    pub roll_duration: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let games_created = IntCounter::with_opts(Opts::new(
            "farkle_games_created_total",
            "Total number of games created",
        ))?;
        let games_joined = IntCounter::with_opts(Opts::new(
            "farkle_games_joined_total",
            "Total number of players that joined a game",
        ))?;
        let active_games = IntGauge::with_opts(Opts::new(
            "farkle_active_games",
            "Number of active games in memory",
        ))?;
        let farkles = IntCounter::with_opts(Opts::new(
            "farkle_farkles_total",
            "Total number of farkle events",
        ))?;
        let roll_duration = Histogram::with_opts(HistogramOpts::new(
            "farkle_roll_duration_seconds",
            "Duration of roll handling in seconds",
        ))?;

        registry.register(Box::new(games_created.clone()))?;
        registry.register(Box::new(games_joined.clone()))?;
        registry.register(Box::new(active_games.clone()))?;
        registry.register(Box::new(farkles.clone()))?;
        registry.register(Box::new(roll_duration.clone()))?;

        Ok(Self {
            registry,
            games_created,
            games_joined,
            active_games,
            farkles,
            roll_duration,
        })
    }

    /// Prometheus 文字格式
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_all_metrics() {
        let metrics = Metrics::new().unwrap();
        metrics.games_created.inc();
        metrics.roll_duration.observe(0.01);

        let text = metrics.render().unwrap();
        assert!(text.contains("farkle_games_created_total 1"));
        assert!(text.contains("farkle_games_joined_total 0"));
        assert!(text.contains("farkle_active_games 0"));
        assert!(text.contains("farkle_farkles_total 0"));
        assert!(text.contains("farkle_roll_duration_seconds_count 1"));
    }

    #[test]
    fn test_registries_are_independent() {
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();
        a.farkles.inc();
        assert_eq!(a.farkles.get(), 1);
        assert_eq!(b.farkles.get(), 0);
    }
}

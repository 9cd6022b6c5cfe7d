//! 牌桌大廳
//!
//! 以遊戲代碼索引所有牌桌。每張牌桌有自己的事件廣播頻道；
//! 每個動作成功後先送出動作事件，再送出附快照的 `StateChanged`。

use std::sync::Arc;
use std::time::Instant;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::error::ActionError;
use super::metrics::Metrics;
use super::snapshot::{event_to_proto, snapshot_from_state, state_changed};
use super::state::{TableEvent, TableState};
use crate::config::Config;
use crate::proto::{GameEvent, GameSnapshot};

const SEAT_TOKEN_LENGTH: usize = 24;
/// 產生不重複遊戲代碼的嘗試上限
const MAX_GAME_CODE_ATTEMPTS: usize = 100;

/// 入座結果
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Seated {
    pub game_code: String,
    pub player_index: usize,
    pub seat_token: String,
}

struct Room {
    state: TableState,
    events: broadcast::Sender<GameEvent>,
}

impl Room {
    fn publish(&self, events: &[TableEvent]) {
        for event in events {
            debug!(game = %self.state.code, ?event, "table event");
            // 沒有訂閱者時 send 會失敗，忽略即可
            let _ = self.events.send(event_to_proto(event, &self.state));
        }
        let _ = self.events.send(state_changed(&self.state));
    }
}

pub struct Lobby {
    config: Config,
    rooms: DashMap<String, Room>,
    metrics: Arc<Metrics>,
}

fn normalize_code(code: &str) -> Result<String, ActionError> {
    let code = code.trim().to_uppercase();
    if code.is_empty() {
        return Err(ActionError::GameCodeRequired);
    }
    Ok(code)
}

fn new_seat_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SEAT_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

impl Lobby {
    pub fn new(config: Config, metrics: Arc<Metrics>) -> Self {
        Self {
            config: config.sanitized(),
            rooms: DashMap::new(),
            metrics,
        }
    }

    pub fn game_count(&self) -> usize {
        self.rooms.len()
    }

    fn new_game_code(&self) -> String {
        let chars: Vec<char> = self.config.game_code_chars.chars().collect();
        let mut rng = thread_rng();
        (0..self.config.game_code_length)
            .map(|_| chars.choose(&mut rng).copied().unwrap_or('A'))
            .collect()
    }

    /// 開新牌桌，建立者坐 0 號位
    pub fn create_game(&self, player_name: &str, victory_score: i64) -> Result<Seated, ActionError> {
        let victory_score = self.config.clamp_victory_score(victory_score);

        for _ in 0..MAX_GAME_CODE_ATTEMPTS {
            let code = self.new_game_code();
            let Entry::Vacant(slot) = self.rooms.entry(code.clone()) else {
                continue;
            };

            let mut state = TableState::new(code.clone(), victory_score, thread_rng().gen());
            let seat_token = new_seat_token();
            let (player_index, _) = state.join(player_name, seat_token.clone())?;
            let (events, _) = broadcast::channel(self.config.event_buffer.max(1));

            info!(
                game = %code,
                player = %state.seats[player_index].name,
                victory_score,
                "game created"
            );
            slot.insert(Room { state, events });
            self.metrics.games_created.inc();
            self.metrics.active_games.inc();

            return Ok(Seated {
                game_code: code,
                player_index,
                seat_token,
            });
        }

        warn!(games = self.rooms.len(), "game code space exhausted");
        Err(ActionError::NoGameCodeAvailable)
    }

    /// 加入既有牌桌
    pub fn join_game(&self, game_code: &str, player_name: &str) -> Result<Seated, ActionError> {
        let code = normalize_code(game_code)?;
        let mut room = self.rooms.get_mut(&code).ok_or(ActionError::GameNotFound)?;

        let seat_token = new_seat_token();
        let (player_index, events) = room.state.join(player_name, seat_token.clone())?;
        info!(
            game = %code,
            player = %room.state.seats[player_index].name,
            player_index,
            "player joined"
        );
        room.publish(&events);
        self.metrics.games_joined.inc();

        Ok(Seated {
            game_code: code,
            player_index,
            seat_token,
        })
    }

    /// 依憑證找到座位後執行動作，廣播事件並回傳最新快照
    fn act<F>(&self, game_code: &str, seat_token: &str, action: F) -> Result<GameSnapshot, ActionError>
    where
        F: FnOnce(&mut TableState, usize) -> Result<Vec<TableEvent>, ActionError>,
    {
        let code = normalize_code(game_code)?;
        let mut room = self.rooms.get_mut(&code).ok_or(ActionError::GameNotFound)?;
        let player = room.state.seat_of(seat_token)?;

        let events = action(&mut room.state, player)?;
        room.publish(&events);

        let farkles = events
            .iter()
            .filter(|e| matches!(e, TableEvent::Farkle { .. }))
            .count();
        self.metrics.farkles.inc_by(farkles as u64);

        if let Some(winner) = room.state.winner {
            if events.iter().any(|e| matches!(e, TableEvent::GameOver { .. })) {
                info!(game = %code, winner, "game over");
            }
        }

        Ok(snapshot_from_state(&room.state))
    }

    pub fn roll(&self, game_code: &str, seat_token: &str) -> Result<GameSnapshot, ActionError> {
        let _timer = self.metrics.roll_duration.start_timer();
        self.act(game_code, seat_token, |state, player| state.roll(player))
    }

    pub fn toggle_select(
        &self,
        game_code: &str,
        seat_token: &str,
        index: i32,
    ) -> Result<GameSnapshot, ActionError> {
        let index = usize::try_from(index).map_err(|_| ActionError::InvalidIndex)?;
        self.act(game_code, seat_token, |state, player| {
            state.toggle_select(player, index).map(|_| Vec::new())
        })
    }

    pub fn set_aside(&self, game_code: &str, seat_token: &str) -> Result<GameSnapshot, ActionError> {
        self.act(game_code, seat_token, |state, player| state.set_aside(player))
    }

    pub fn bank(&self, game_code: &str, seat_token: &str) -> Result<GameSnapshot, ActionError> {
        self.act(game_code, seat_token, |state, player| state.bank(player))
    }

    /// 離開牌桌；回傳牌桌是否因此關閉
    pub fn leave(&self, game_code: &str, seat_token: &str) -> Result<bool, ActionError> {
        let code = normalize_code(game_code)?;
        {
            let mut room = self.rooms.get_mut(&code).ok_or(ActionError::GameNotFound)?;
            let player = room.state.seat_of(seat_token)?;
            let events = room.state.leave(player);
            info!(game = %code, player, "player left");
            room.publish(&events);
        }

        // 釋放 RefMut 後才能移除
        let closed = self
            .rooms
            .remove_if(&code, |_, room| room.state.is_abandoned())
            .is_some();
        if closed {
            self.metrics.active_games.dec();
            info!(game = %code, "game closed");
        }
        Ok(closed)
    }

    pub fn get_state(&self, game_code: &str) -> Result<GameSnapshot, ActionError> {
        let code = normalize_code(game_code)?;
        let room = self.rooms.get(&code).ok_or(ActionError::GameNotFound)?;
        Ok(snapshot_from_state(&room.state))
    }

    pub fn subscribe(&self, game_code: &str) -> Result<broadcast::Receiver<GameEvent>, ActionError> {
        let code = normalize_code(game_code)?;
        let room = self.rooms.get(&code).ok_or(ActionError::GameNotFound)?;
        Ok(room.events.subscribe())
    }

    /// 移除結束超過保留時間的牌桌，回傳移除數量
    pub fn cleanup_finished(&self, now: Instant) -> usize {
        let retention = self.config.finished_game_retention;
        let before = self.rooms.len();
        self.rooms.retain(|_, room| match room.state.finished_at {
            Some(at) => now.saturating_duration_since(at) < retention,
            None => true,
        });
        let removed = before.saturating_sub(self.rooms.len());
        self.metrics.active_games.sub(removed as i64);
        if removed > 0 {
            info!(removed, remaining = self.rooms.len(), "cleaned up finished games");
        }
        removed
    }

    #[cfg(test)]
    pub(crate) fn for_tests(config: Config) -> Self {
        Self::new(config, Arc::new(Metrics::new().unwrap()))
    }

    #[cfg(test)]
    pub(crate) fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    #[cfg(test)]
    pub(crate) fn with_table<R>(&self, game_code: &str, f: impl FnOnce(&mut TableState) -> R) -> Option<R> {
        let mut room = self.rooms.get_mut(game_code)?;
        Some(f(&mut room.state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_code_uses_configured_alphabet() {
        let config = Config {
            game_code_length: 8,
            game_code_chars: "XY".to_string(),
            ..Config::default()
        };
        let lobby = Lobby::for_tests(config);
        let code = lobby.new_game_code();
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c == 'X' || c == 'Y'));
    }

    #[test]
    fn test_exhausted_code_space_returns_error() {
        let config = Config {
            game_code_length: 1,
            game_code_chars: "A".to_string(),
            ..Config::default()
        };
        let lobby = Lobby::for_tests(config);
        let first = lobby.create_game("Ana", 0).unwrap();
        assert_eq!(first.game_code, "A");

        assert_eq!(
            lobby.create_game("Ben", 0),
            Err(ActionError::NoGameCodeAvailable)
        );
        assert_eq!(lobby.game_count(), 1);
        assert_eq!(lobby.metrics().games_created.get(), 1);
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(" abcde "), Ok("ABCDE".to_string()));
        assert_eq!(normalize_code("  "), Err(ActionError::GameCodeRequired));
    }

    #[test]
    fn test_seat_tokens_are_distinct() {
        let a = new_seat_token();
        let b = new_seat_token();
        assert_eq!(a.len(), SEAT_TOKEN_LENGTH);
        assert_ne!(a, b);
    }
}

//! 狀態與事件轉換為 protobuf 訊息

use super::error::ActionError;
use super::state::{Die, TableEvent, TableState};
use crate::game::{ScoreResult, FACE_MAX, FACE_MIN, NUM_DICE};
use crate::proto::{
    ComboBreakdown, Die as ProtoDie, EventKind, GameEvent, GameSnapshot, Player,
    ScoreSelectionResponse, TurnMove as ProtoTurnMove,
};

fn index_or_none(index: Option<usize>) -> i32 {
    index.map(|i| i as i32).unwrap_or(-1)
}

fn dice_to_proto(dice: &[Die]) -> Vec<ProtoDie> {
    dice.iter()
        .map(|d| ProtoDie {
            value: d.value as i32,
            held: d.held,
        })
        .collect()
}

/// 構建牌桌快照
pub fn snapshot_from_state(state: &TableState) -> GameSnapshot {
    GameSnapshot {
        game_code: state.code.clone(),
        players: state
            .seats
            .iter()
            .map(|s| Player {
                name: s.name.clone(),
                total: s.total as i32,
                seated: s.is_seated(),
            })
            .collect(),
        current_player_index: state.current_player as i32,
        dice: dice_to_proto(&state.dice),
        selected_indices: state.selected.iter().map(|&i| i as i32).collect(),
        remaining_dice_count: state.remaining_dice() as i32,
        turn_points: state.turn_points as i32,
        turn_moves: state
            .turn_moves
            .iter()
            .map(|m| ProtoTurnMove {
                id: m.id as i32,
                values: m.values.iter().map(|&v| v as i32).collect(),
                points: m.points as i32,
            })
            .collect(),
        victory_score: state.victory_score as i32,
        final_round_trigger_index: index_or_none(state.final_round_trigger),
        winner_index: index_or_none(state.winner),
        status: state.status().as_str().to_string(),
    }
}

/// 狀態變更事件（附快照）
pub fn state_changed(state: &TableState) -> GameEvent {
    GameEvent {
        kind: EventKind::StateChanged as i32,
        message: String::new(),
        player_index: state.current_player as i32,
        winner_index: index_or_none(state.winner),
        dice: Vec::new(),
        snapshot: Some(snapshot_from_state(state)),
    }
}

/// 動作事件轉換
pub fn event_to_proto(event: &TableEvent, state: &TableState) -> GameEvent {
    let name_of = |i: usize| state.seats[i].name.clone();

    let (kind, message, player, winner, dice) = match event {
        TableEvent::PlayerJoined { index, name } => (
            EventKind::PlayerJoined,
            format!("{} joined the game", name),
            Some(*index),
            None,
            Vec::new(),
        ),
        TableEvent::PlayerLeft { index, winner } => (
            EventKind::PlayerLeft,
            format!("{} left the game. {} wins!", name_of(*index), name_of(*winner)),
            Some(*index),
            Some(*winner),
            Vec::new(),
        ),
        TableEvent::RollResult { dice } => (
            EventKind::RollResult,
            format!("{} rolled", name_of(state.current_player)),
            Some(state.current_player),
            None,
            dice_to_proto(dice),
        ),
        TableEvent::Farkle { player } => (
            EventKind::Farkle,
            format!("Farkle! {} loses the turn points", name_of(*player)),
            Some(*player),
            None,
            Vec::new(),
        ),
        TableEvent::HotDice { player } => (
            EventKind::HotDice,
            format!("Hot dice! {} can roll all 6 dice again", name_of(*player)),
            Some(*player),
            None,
            Vec::new(),
        ),
        TableEvent::TurnChanged { next_player, name } => (
            EventKind::TurnChanged,
            format!("It's {}'s turn", name),
            Some(*next_player),
            None,
            Vec::new(),
        ),
        TableEvent::FinalRound { trigger } => (
            EventKind::FinalRound,
            format!(
                "{} reached {} points. Final round!",
                name_of(*trigger),
                state.victory_score
            ),
            Some(*trigger),
            None,
            Vec::new(),
        ),
        TableEvent::GameOver { winner } => (
            EventKind::GameOver,
            format!("{} wins the game!", name_of(*winner)),
            None,
            Some(*winner),
            Vec::new(),
        ),
    };

    GameEvent {
        kind: kind as i32,
        message,
        player_index: index_or_none(player),
        winner_index: index_or_none(winner),
        dice,
        snapshot: None,
    }
}

pub fn score_result_to_proto(result: &ScoreResult) -> ScoreSelectionResponse {
    ScoreSelectionResponse {
        valid: result.valid,
        points: result.points as i32,
        breakdown: result
            .breakdown
            .iter()
            .map(|c| ComboBreakdown {
                label: c.label(),
                points: c.points as i32,
                uses: c.uses.as_array().iter().map(|&n| n as i32).collect(),
            })
            .collect(),
    }
}

/// 驗證請求中的骰子點數：最多 6 顆、每顆 1..=6
pub fn dice_values_from_proto(values: &[i32]) -> Result<Vec<u8>, ActionError> {
    if values.len() > NUM_DICE {
        return Err(ActionError::InvalidDice(format!(
            "at most {} dice, got {}",
            NUM_DICE,
            values.len()
        )));
    }
    values
        .iter()
        .map(|&v| {
            if (FACE_MIN as i32..=FACE_MAX as i32).contains(&v) {
                Ok(v as u8)
            } else {
                Err(ActionError::InvalidDice(format!("face {} out of range", v)))
            }
        })
        .collect()
}

//! 牌桌狀態管理
//!
//! 一張牌桌 = 兩個座位 + 當前回合。所有動作都先檢查回合歸屬，
//! 成功時回傳要廣播的事件。

use std::time::Instant;

use rand::{rngs::StdRng, Rng, SeedableRng};

use super::error::ActionError;
use crate::game::{has_any_scoring_option, score_selection, FACE_MAX, FACE_MIN, NUM_DICE, NUM_PLAYERS};

/// 桌上的一顆骰子
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Die {
    pub value: u8,
    /// 已保留（apartado），不再重擲
    pub held: bool,
}

/// 本回合的一次保留記錄
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnMove {
    pub id: u32,
    pub values: Vec<u8>,
    pub points: u32,
}

/// 座位
#[derive(Clone, Debug, Default)]
pub struct Seat {
    pub name: String,
    /// 入座憑證；離開後為 None
    pub token: Option<String>,
    pub total: u32,
}

impl Seat {
    pub fn is_seated(&self) -> bool {
        self.token.is_some()
    }
}

/// 牌桌階段
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableStatus {
    Waiting,
    Playing,
    Finished,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Waiting => "waiting",
            TableStatus::Playing => "playing",
            TableStatus::Finished => "finished",
        }
    }
}

/// 動作產生的事件
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableEvent {
    PlayerJoined { index: usize, name: String },
    PlayerLeft { index: usize, winner: usize },
    RollResult { dice: Vec<Die> },
    Farkle { player: usize },
    HotDice { player: usize },
    TurnChanged { next_player: usize, name: String },
    FinalRound { trigger: usize },
    GameOver { winner: usize },
}

/// 牌桌狀態
pub struct TableState {
    pub rng: StdRng,
    pub code: String,

    pub seats: [Seat; NUM_PLAYERS],
    pub current_player: usize,

    // 當前回合
    pub dice: Vec<Die>,
    pub selected: Vec<usize>,
    pub turn_points: u32,
    pub turn_moves: Vec<TurnMove>,
    pub set_aside_this_roll: bool,

    // 勝負
    pub victory_score: u32,
    pub final_round_trigger: Option<usize>,
    pub winner: Option<usize>,
    pub finished_at: Option<Instant>,
}

impl TableState {
    pub fn new(code: impl Into<String>, victory_score: u32, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            code: code.into(),
            seats: Default::default(),
            current_player: 0,
            dice: Vec::new(),
            selected: Vec::new(),
            turn_points: 0,
            turn_moves: Vec::new(),
            set_aside_this_roll: false,
            victory_score,
            final_round_trigger: None,
            winner: None,
            finished_at: None,
        }
    }

    pub fn status(&self) -> TableStatus {
        if self.winner.is_some() {
            TableStatus::Finished
        } else if self.seats.iter().all(Seat::is_seated) {
            TableStatus::Playing
        } else {
            TableStatus::Waiting
        }
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    /// 沒有任何人在座
    pub fn is_abandoned(&self) -> bool {
        !self.seats.iter().any(Seat::is_seated)
    }

    /// 未保留的骰子數
    pub fn remaining_dice(&self) -> usize {
        self.dice.iter().filter(|d| !d.held).count()
    }

    pub fn seat_of(&self, token: &str) -> Result<usize, ActionError> {
        self.seats
            .iter()
            .position(|s| s.token.as_deref() == Some(token))
            .ok_or(ActionError::NotInGame)
    }

    /// 入座第一個空位
    pub fn join(&mut self, name: &str, token: String) -> Result<(usize, Vec<TableEvent>), ActionError> {
        if self.is_finished() {
            return Err(ActionError::GameFinished);
        }
        let index = self
            .seats
            .iter()
            .position(|s| !s.is_seated())
            .ok_or(ActionError::GameFull)?;

        let name = if name.trim().is_empty() {
            format!("Player {}", index + 1)
        } else {
            name.trim().to_string()
        };

        let seat = &mut self.seats[index];
        seat.name = name.clone();
        seat.token = Some(token);

        Ok((index, vec![TableEvent::PlayerJoined { index, name }]))
    }

    /// 離開座位；對局進行中時對手直接獲勝
    pub fn leave(&mut self, player: usize) -> Vec<TableEvent> {
        self.seats[player].token = None;

        if self.is_finished() {
            return Vec::new();
        }

        let opponent = (player + 1) % NUM_PLAYERS;
        if !self.seats[opponent].is_seated() {
            return Vec::new();
        }

        self.finish(opponent);
        vec![TableEvent::PlayerLeft {
            index: player,
            winner: opponent,
        }]
    }

    fn check_turn(&self, player: usize) -> Result<(), ActionError> {
        if self.is_finished() {
            return Err(ActionError::GameFinished);
        }
        if self.status() == TableStatus::Waiting {
            return Err(ActionError::WaitingForOpponent);
        }
        if self.current_player != player {
            return Err(ActionError::NotYourTurn);
        }
        Ok(())
    }

    fn check_can_roll(&self, player: usize) -> Result<(), ActionError> {
        self.check_turn(player)?;
        if !self.dice.is_empty() && !self.set_aside_this_roll {
            return Err(ActionError::RollWithoutSetAside);
        }
        Ok(())
    }

    /// 下一次擲骰的骰子數：新回合（或 hot dice 後）擲 6 顆，否則只擲未保留的
    pub fn dice_to_roll(&self) -> usize {
        if self.dice.is_empty() {
            NUM_DICE
        } else {
            self.remaining_dice()
        }
    }

    /// 擲骰
    pub fn roll(&mut self, player: usize) -> Result<Vec<TableEvent>, ActionError> {
        self.check_can_roll(player)?;
        let values: Vec<u8> = (0..self.dice_to_roll())
            .map(|_| self.rng.gen_range(FACE_MIN..=FACE_MAX))
            .collect();
        self.apply_roll(player, &values)
    }

    /// 以指定點數完成擲骰
    ///
    /// `values` 依序填入未保留的骰子。
    pub fn apply_roll(&mut self, player: usize, values: &[u8]) -> Result<Vec<TableEvent>, ActionError> {
        self.check_can_roll(player)?;
        if values.len() != self.dice_to_roll() {
            return Err(ActionError::InvalidDice(format!(
                "expected {} values, got {}",
                self.dice_to_roll(),
                values.len()
            )));
        }
        if values.iter().any(|v| !(FACE_MIN..=FACE_MAX).contains(v)) {
            return Err(ActionError::InvalidDice(format!("{:?}", values)));
        }

        if self.dice.is_empty() {
            self.dice = values.iter().map(|&value| Die { value, held: false }).collect();
        } else {
            // 保留的骰子維持原值，也不計入爆骰判定
            for (die, &value) in self.dice.iter_mut().filter(|d| !d.held).zip(values) {
                die.value = value;
            }
        }
        self.selected.clear();
        self.set_aside_this_roll = false;

        let mut events = vec![TableEvent::RollResult {
            dice: self.dice.clone(),
        }];

        if !has_any_scoring_option(values) {
            // Farkle：本回合分數歸零
            events.push(TableEvent::Farkle { player });
            self.reset_turn();
            events.push(self.pass_turn(player));
        }

        Ok(events)
    }

    /// 切換骰子選取
    pub fn toggle_select(&mut self, player: usize, index: usize) -> Result<(), ActionError> {
        self.check_turn(player)?;
        let die = self.dice.get(index).ok_or(ActionError::InvalidIndex)?;
        if die.held {
            return Err(ActionError::SelectHeldDie);
        }

        if let Some(pos) = self.selected.iter().position(|&i| i == index) {
            self.selected.remove(pos);
        } else {
            self.selected.push(index);
        }
        Ok(())
    }

    /// 保留已選骰子並計分（apartar）
    pub fn set_aside(&mut self, player: usize) -> Result<Vec<TableEvent>, ActionError> {
        self.check_turn(player)?;
        if self.dice.is_empty() {
            return Err(ActionError::RollFirst);
        }
        if self.selected.is_empty() {
            return Err(ActionError::SelectBeforeSetAside);
        }

        let picked: Vec<u8> = self
            .selected
            .iter()
            .filter_map(|&i| self.dice.get(i))
            .filter(|d| !d.held)
            .map(|d| d.value)
            .collect();
        if picked.is_empty() {
            return Err(ActionError::SelectNotHeld);
        }

        let result = score_selection(&picked);
        if !result.valid {
            return Err(ActionError::InvalidSelection);
        }

        self.turn_points += result.points;
        self.set_aside_this_roll = true;
        self.turn_moves.push(TurnMove {
            id: self.turn_moves.len() as u32 + 1,
            values: picked,
            points: result.points,
        });

        for &i in &self.selected {
            if let Some(die) = self.dice.get_mut(i) {
                die.held = true;
            }
        }
        self.selected.clear();

        // Hot dice：全部保留後可重新擲 6 顆
        if self.dice.iter().all(|d| d.held) {
            self.dice.clear();
            return Ok(vec![TableEvent::HotDice { player }]);
        }

        Ok(Vec::new())
    }

    /// 存分並結束回合
    pub fn bank(&mut self, player: usize) -> Result<Vec<TableEvent>, ActionError> {
        self.check_turn(player)?;
        if self.turn_points == 0 {
            return Err(ActionError::BankNoPoints);
        }
        if self.remaining_dice() > 0 && !self.set_aside_this_roll {
            return Err(ActionError::BankMustSetAside);
        }

        self.seats[player].total += self.turn_points;
        self.reset_turn();

        // 第一個達標的玩家觸發最後一輪
        if self.final_round_trigger.is_none() && self.seats[player].total >= self.victory_score {
            self.final_round_trigger = Some(player);
            self.current_player = (player + 1) % NUM_PLAYERS;
            return Ok(vec![TableEvent::FinalRound { trigger: player }]);
        }

        Ok(vec![self.pass_turn(player)])
    }

    fn reset_turn(&mut self) {
        self.turn_points = 0;
        self.turn_moves.clear();
        self.dice.clear();
        self.selected.clear();
        self.set_aside_this_roll = false;
    }

    /// 換手；最後一輪中非觸發者結束回合即結算
    fn pass_turn(&mut self, finished: usize) -> TableEvent {
        self.current_player = (finished + 1) % NUM_PLAYERS;

        match self.final_round_trigger {
            Some(trigger) if trigger != finished => {
                let winner = self.leader(trigger);
                self.finish(winner);
                TableEvent::GameOver { winner }
            }
            _ => TableEvent::TurnChanged {
                next_player: self.current_player,
                name: self.seats[self.current_player].name.clone(),
            },
        }
    }

    /// 最高分者；同分歸觸發最後一輪的玩家
    fn leader(&self, trigger: usize) -> usize {
        let best = self.seats.iter().map(|s| s.total).max().unwrap_or(0);
        if self.seats[trigger].total == best {
            trigger
        } else {
            self.seats
                .iter()
                .position(|s| s.total == best)
                .unwrap_or(trigger)
        }
    }

    fn finish(&mut self, winner: usize) {
        self.winner = Some(winner);
        self.finished_at = Some(Instant::now());
        self.dice.clear();
        self.selected.clear();
    }
}

// ============================================================================
// 單元測試
// ============================================================================

//! 遊戲核心模組
//!
//! Farkle 計分引擎：
//! - `constants`: 規則常量與分數表
//! - `dice`: 每點數計數 `DiceCounts`
//! - `combos`: 計分組合列舉
//! - `scoring`: 用掉全部骰子的最高分搜尋
//! - `farkle`: 爆骰判定
//! - `odds`: 擲骰機率統計

pub mod combos;
pub mod constants;
pub mod dice;
pub mod farkle;
pub mod odds;
pub mod scoring;

pub use combos::{possible_combos, Combo, ComboKind};
pub use constants::*;
pub use dice::DiceCounts;
pub use farkle::has_any_scoring_option;
pub use odds::{best_set_aside, odds_table, roll_odds, RollOdds};
pub use scoring::{best_score_using_all, score_selection, ScoreResult};

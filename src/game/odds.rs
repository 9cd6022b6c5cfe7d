//! 擲骰機率表
//!
//! 窮舉 n 顆骰的全部 6^n 種有序結果（rayon 平行），統計爆骰率、
//! 整手可保留（hot dice）次數，以及每次擲骰最佳保留分數的平均值。

use rayon::prelude::*;
use serde::Serialize;

use super::constants::{NUM_DICE, NUM_FACES};
use super::dice::DiceCounts;
use super::scoring::score_selection;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RollOdds {
    pub num_dice: usize,
    pub rolls: u64,
    pub busts: u64,
    pub bust_probability: f64,
    /// 整手骰子都能計分的結果數
    pub hot_dice: u64,
    /// 每次擲骰單次保留的最高分平均（爆骰計 0）
    pub mean_best_points: f64,
}

/// 第 `index` 種有序擲骰結果（以 6 進位展開）
fn decode_roll(mut index: u64, num_dice: usize) -> Vec<u8> {
    let mut roll = Vec::with_capacity(num_dice);
    for _ in 0..num_dice {
        roll.push((index % NUM_FACES as u64) as u8 + 1);
        index /= NUM_FACES as u64;
    }
    roll
}

/// 所有非空子集中，能被完整拆分的最高分
pub fn best_set_aside(roll: &[u8]) -> u32 {
    let n = roll.len();
    (1u32..(1 << n))
        .map(|mask| {
            let subset: Vec<u8> = roll
                .iter()
                .enumerate()
                .filter(|(i, _)| (mask >> i) & 1 == 1)
                .map(|(_, &v)| v)
                .collect();
            score_selection(&subset).points
        })
        .max()
        .unwrap_or(0)
}

/// 計算 `num_dice` 顆骰的機率統計
pub fn roll_odds(num_dice: usize) -> RollOdds {
    let rolls = (NUM_FACES as u64).pow(num_dice as u32);

    let (busts, hot_dice, best_sum) = (0..rolls)
        .into_par_iter()
        .map(|index| {
            let roll = decode_roll(index, num_dice);
            if DiceCounts::from_values(&roll).is_bust() {
                return (1u64, 0u64, 0u64);
            }
            let hot = score_selection(&roll).valid as u64;
            (0, hot, best_set_aside(&roll) as u64)
        })
        .reduce(|| (0, 0, 0), |a, b| (a.0 + b.0, a.1 + b.1, a.2 + b.2));

    RollOdds {
        num_dice,
        rolls,
        busts,
        bust_probability: busts as f64 / rolls as f64,
        hot_dice,
        mean_best_points: best_sum as f64 / rolls as f64,
    }
}

/// 1..=6 顆骰的完整表
pub fn odds_table() -> Vec<RollOdds> {
    (1..=NUM_DICE).map(roll_odds).collect()
}

// ============================================================================
// 單元測試
// ============================================================================

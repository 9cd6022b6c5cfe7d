//! Farkle（爆骰）判定
//!
//! 擲骰後立即檢查是否「有任何東西可以計分」。比 `score_selection` 寬鬆：
//! 回傳 true 不代表玩家選的某個子集能被完整拆分。

use super::combos::{is_four_with_pair, is_three_pairs, is_two_triples};
use super::constants::NUM_DICE;
use super::dice::DiceCounts;

/// 擲出的骰子中是否存在至少一個計分組合
pub fn has_any_scoring_option(values: &[u8]) -> bool {
    DiceCounts::from_values(values).has_scoring_option()
}

impl DiceCounts {
    pub fn has_scoring_option(&self) -> bool {
        if self.count(1) > 0 || self.count(5) > 0 {
            return true;
        }

        if Self::faces().any(|face| self.count(face) >= 3) {
            return true;
        }

        // 六顆骰專屬牌型
        if self.total() as usize != NUM_DICE {
            return false;
        }

        let straight = Self::faces().all(|face| self.count(face) == 1);
        straight || is_three_pairs(self) || is_four_with_pair(self) || is_two_triples(self)
    }

    /// 沒有任何計分組合
    pub fn is_bust(&self) -> bool {
        !self.has_scoring_option()
    }
}

// ============================================================================
// 單元測試
// ============================================================================

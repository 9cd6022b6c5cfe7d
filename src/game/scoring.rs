//! 計分引擎
//!
//! 對一組骰子找出「用掉全部骰子」的最高分拆法。
//! 每次呼叫各自建立 memo 表，呼叫結束即丟棄。

use std::collections::HashMap;

use super::combos::{possible_combos, Combo};
use super::dice::DiceCounts;

/// 計分結果
///
/// `valid == false` 時 `points == 0` 且 `breakdown` 為空。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScoreResult {
    pub valid: bool,
    pub points: u32,
    pub breakdown: Vec<Combo>,
}

impl ScoreResult {
    /// 無法計分的統一結果
    pub fn invalid() -> Self {
        Self::default()
    }

    fn empty() -> Self {
        Self {
            valid: true,
            points: 0,
            breakdown: Vec::new(),
        }
    }

    /// breakdown 消耗的骰子總和
    pub fn dice_used(&self) -> DiceCounts {
        self.breakdown
            .iter()
            .fold(DiceCounts::new(), |acc, combo| acc.add(&combo.uses))
    }
}

type Memo = HashMap<DiceCounts, ScoreResult>;

/// 找出用掉全部骰子的最高分拆法
pub fn best_score_using_all(counts: DiceCounts) -> ScoreResult {
    let mut memo = Memo::new();
    search(counts, &mut memo)
}

fn search(state: DiceCounts, memo: &mut Memo) -> ScoreResult {
    if let Some(cached) = memo.get(&state) {
        return cached.clone();
    }

    if state.is_empty() {
        let result = ScoreResult::empty();
        memo.insert(state, result.clone());
        return result;
    }

    let mut best = ScoreResult::invalid();

    for combo in possible_combos(&state) {
        // 組合依當前計數產生，理論上必定可減
        let Some(next) = state.checked_sub(&combo.uses) else {
            continue;
        };

        let sub = search(next, memo);
        if !sub.valid {
            continue;
        }

        let total = combo.points + sub.points;
        // 同分保留先找到的拆法
        if !best.valid || total > best.points {
            let mut breakdown = Vec::with_capacity(sub.breakdown.len() + 1);
            breakdown.push(combo);
            breakdown.extend(sub.breakdown);
            best = ScoreResult {
                valid: true,
                points: total,
                breakdown,
            };
        }
    }

    memo.insert(state, best.clone());
    best
}

/// 驗證玩家要「保留」的骰子並計分
///
/// 只有每顆骰子都屬於某個組合時才有效；部分計分一律視為無效。
pub fn score_selection(values: &[u8]) -> ScoreResult {
    if values.is_empty() {
        return ScoreResult::invalid();
    }

    let counts = DiceCounts::from_values(values);
    let best = best_score_using_all(counts);
    if !best.valid || best.points == 0 {
        return ScoreResult::invalid();
    }
    best
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::combos::ComboKind;
    use proptest::prelude::*;

    fn assert_invalid(result: &ScoreResult) {
        assert!(!result.valid);
        assert_eq!(result.points, 0);
        assert!(result.breakdown.is_empty());
    }

    fn kinds(result: &ScoreResult) -> Vec<ComboKind> {
        result.breakdown.iter().map(|c| c.kind).collect()
    }

    #[test]
    fn test_empty_selection() {
        assert_invalid(&score_selection(&[]));
    }

    #[test]
    fn test_no_scoring_dice() {
        assert_invalid(&score_selection(&[2, 3, 4]));
        assert_invalid(&score_selection(&[6]));
    }

    #[test]
    fn test_partial_selection_rejected() {
        // 1 可以計分，但 2 不行，整組無效
        assert_invalid(&score_selection(&[1, 2]));
        assert_invalid(&score_selection(&[5, 5, 5, 3]));
    }

    #[test]
    fn test_single_one_and_five() {
        let result = score_selection(&[1]);
        assert!(result.valid);
        assert_eq!(result.points, 100);

        let result = score_selection(&[5]);
        assert_eq!(result.points, 50);

        let result = score_selection(&[1, 5]);
        assert_eq!(result.points, 150);
        assert_eq!(kinds(&result), vec![ComboKind::SingleOne, ComboKind::SingleFive]);
    }

    #[test]
    fn test_triple_one_beats_singles() {
        let result = score_selection(&[1, 1, 1]);
        assert!(result.valid);
        assert_eq!(result.points, 1000);
        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.breakdown[0].label(), "Triple of 1");
    }

    #[test]
    fn test_straight() {
        let result = score_selection(&[1, 2, 3, 4, 5, 6]);
        assert!(result.valid);
        assert_eq!(result.points, 1500);
        assert_eq!(kinds(&result), vec![ComboKind::Straight]);
    }

    #[test]
    fn test_six_of_a_kind() {
        let result = score_selection(&[5, 5, 5, 5, 5, 5]);
        assert!(result.valid);
        assert_eq!(result.points, 3000);
        assert_eq!(kinds(&result), vec![ComboKind::SixOfAKind(5)]);
    }

    #[test]
    fn test_three_pairs() {
        let result = score_selection(&[2, 2, 3, 3, 4, 4]);
        assert!(result.valid);
        assert_eq!(result.points, 1500);
        assert_eq!(kinds(&result), vec![ComboKind::ThreePairs]);
    }

    #[test]
    fn test_three_pairs_beats_singles() {
        // 6 無法單獨計分，只能整組算三對
        let result = score_selection(&[1, 1, 5, 5, 6, 6]);
        assert_eq!(result.points, 1500);
    }

    #[test]
    fn test_two_triples_beats_split_triples() {
        // 三條 2 + 三條 3 = 500 < 雙三條 2500
        let result = score_selection(&[2, 2, 2, 3, 3, 3]);
        assert_eq!(result.points, 2500);
        assert_eq!(kinds(&result), vec![ComboKind::TwoTriples]);
    }

    #[test]
    fn test_four_with_pair() {
        let result = score_selection(&[4, 4, 4, 4, 2, 2]);
        assert_eq!(result.points, 1500);
        assert_eq!(kinds(&result), vec![ComboKind::FourWithPair]);
    }

    #[test]
    fn test_four_ones_with_pair_of_fives() {
        // 四帶二 1500 > 三條 1 + 單 1 + 兩個單 5 = 1200
        let result = score_selection(&[1, 1, 1, 1, 5, 5]);
        assert_eq!(result.points, 1500);
    }

    #[test]
    fn test_four_of_a_kind_vs_triple_plus_single() {
        // 四條 1 = 1000，三條 1 + 單 1 = 1100
        let result = score_selection(&[1, 1, 1, 1]);
        assert_eq!(result.points, 1100);
        assert_eq!(kinds(&result), vec![ComboKind::Triple(1), ComboKind::SingleOne]);

        // 四條 5 = 1000，三條 5 + 單 5 = 550
        let result = score_selection(&[5, 5, 5, 5]);
        assert_eq!(result.points, 1000);
        assert_eq!(kinds(&result), vec![ComboKind::FourOfAKind(5)]);
    }

    #[test]
    fn test_four_of_non_scoring_face_requires_quad() {
        // 4 顆 2：只能用四條，三條會剩下一顆 2
        let result = score_selection(&[2, 2, 2, 2]);
        assert_eq!(result.points, 1000);
        assert_eq!(kinds(&result), vec![ComboKind::FourOfAKind(2)]);
    }

    #[test]
    fn test_five_of_a_kind_with_single() {
        let result = score_selection(&[3, 3, 3, 3, 3, 1]);
        assert_eq!(result.points, 2100);
    }

    #[test]
    fn test_straight_not_available_with_missing_face() {
        // 缺 6：1,5 計分，但 2,3,4 無法使用
        assert_invalid(&score_selection(&[1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_breakdown_order_outermost_first() {
        let result = score_selection(&[1, 5, 5, 5]);
        assert_eq!(result.points, 600);
        assert_eq!(kinds(&result), vec![ComboKind::Triple(5), ComboKind::SingleOne]);
    }

    #[test]
    fn test_best_score_using_all_empty_is_valid() {
        let result = best_score_using_all(DiceCounts::new());
        assert!(result.valid);
        assert_eq!(result.points, 0);
    }

    #[test]
    fn test_deterministic() {
        let values = [1, 1, 5, 5, 5, 1];
        let first = score_selection(&values);
        for _ in 0..10 {
            assert_eq!(score_selection(&values), first);
        }
    }

    // ========================================================================
    // Property 測試
    // ========================================================================

    fn dice_values() -> impl Strategy<Value = Vec<u8>> {
        static DICE_POOL: [u8; 36] = [
            1, 1, 1, 1, 1, 1,
            2, 2, 2, 2, 2, 2,
            3, 3, 3, 3, 3, 3,
            4, 4, 4, 4, 4, 4,
            5, 5, 5, 5, 5, 5,
            6, 6, 6, 6, 6, 6,
        ];
        proptest::sample::subsequence(DICE_POOL.as_ref(), 0..=6).prop_shuffle()
    }

    /// 一定能完整計分的 1..=5 顆骰：三條加至多兩顆 1/5，或只有 1/5
    fn scoring_hand() -> impl Strategy<Value = Vec<u8>> {
        let single = || prop_oneof![Just(1u8), Just(5u8)];
        let triple_plus_singles = (1u8..=6, proptest::collection::vec(single(), 0..=2))
            .prop_map(|(face, mut singles)| {
                singles.extend([face; 3]);
                singles
            });
        let singles_only = proptest::collection::vec(single(), 1..=5);
        prop_oneof![triple_plus_singles, singles_only].prop_shuffle()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        #[test]
        fn test_prop_valid_breakdown_reconstructs_input(values in dice_values()) {
            let result = score_selection(&values);
            if result.valid {
                let sum: u32 = result.breakdown.iter().map(|c| c.points).sum();
                prop_assert_eq!(sum, result.points);
                prop_assert_eq!(result.dice_used(), DiceCounts::from_values(&values));
                prop_assert!(result.points > 0);
            } else {
                prop_assert_eq!(result.points, 0);
                prop_assert!(result.breakdown.is_empty());
            }
        }

        #[test]
        fn test_prop_order_independent(values in dice_values()) {
            let mut sorted = values.clone();
            sorted.sort_unstable();
            prop_assert_eq!(score_selection(&values), score_selection(&sorted));
        }

        #[test]
        fn test_prop_valid_selection_implies_scoring_option(values in dice_values()) {
            if score_selection(&values).valid {
                prop_assert!(crate::game::has_any_scoring_option(&values));
            }
        }

        #[test]
        fn test_prop_adding_single_one_adds_at_least_100(values in scoring_hand()) {
            let base = score_selection(&values);
            prop_assert!(base.valid);
            let mut more = values.clone();
            more.push(1);
            let extended = score_selection(&more);
            prop_assert!(extended.valid);
            prop_assert!(extended.points >= base.points + 100);
        }
    }
}

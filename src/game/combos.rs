//! 計分組合定義與列舉
//!
//! 同一點數的重疊組合（例如 4 顆時的三條與四條）會同時列出，
//! 由搜尋決定最佳拆法。

use super::constants::{
    triple_points, NUM_DICE, NUM_FACES, POINTS_FIVE, POINTS_FOUR, POINTS_FOUR_WITH_PAIR, POINTS_SINGLE_1,
    POINTS_SINGLE_5, POINTS_SIX, POINTS_STRAIGHT, POINTS_THREE_PAIRS, POINTS_TWO_TRIPLES,
};
use super::dice::DiceCounts;

/// 組合類型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComboKind {
    Straight,
    ThreePairs,
    FourWithPair,
    TwoTriples,
    Triple(u8),
    FourOfAKind(u8),
    FiveOfAKind(u8),
    SixOfAKind(u8),
    SingleOne,
    SingleFive,
}

impl ComboKind {
    pub fn points(&self) -> u32 {
        match self {
            ComboKind::Straight => POINTS_STRAIGHT,
            ComboKind::ThreePairs => POINTS_THREE_PAIRS,
            ComboKind::FourWithPair => POINTS_FOUR_WITH_PAIR,
            ComboKind::TwoTriples => POINTS_TWO_TRIPLES,
            ComboKind::Triple(face) => triple_points(*face),
            ComboKind::FourOfAKind(_) => POINTS_FOUR,
            ComboKind::FiveOfAKind(_) => POINTS_FIVE,
            ComboKind::SixOfAKind(_) => POINTS_SIX,
            ComboKind::SingleOne => POINTS_SINGLE_1,
            ComboKind::SingleFive => POINTS_SINGLE_5,
        }
    }

    /// 顯示給玩家的名稱
    pub fn label(&self) -> String {
        match self {
            ComboKind::Straight => "Straight 1-6".to_string(),
            ComboKind::ThreePairs => "Three pairs".to_string(),
            ComboKind::FourWithPair => "Four of a kind and a pair".to_string(),
            ComboKind::TwoTriples => "Two triples".to_string(),
            ComboKind::Triple(face) => format!("Triple of {}", face),
            ComboKind::FourOfAKind(face) => format!("Four of {}", face),
            ComboKind::FiveOfAKind(face) => format!("Five of {}", face),
            ComboKind::SixOfAKind(face) => format!("Six of {}", face),
            ComboKind::SingleOne => "Single 1".to_string(),
            ComboKind::SingleFive => "Single 5".to_string(),
        }
    }
}

/// 一個計分組合：`uses` 精確描述消耗哪些骰子
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Combo {
    pub kind: ComboKind,
    pub uses: DiceCounts,
    pub points: u32,
}

impl Combo {
    pub fn new(kind: ComboKind, uses: DiceCounts) -> Self {
        Self {
            kind,
            uses,
            points: kind.points(),
        }
    }

    pub fn label(&self) -> String {
        self.kind.label()
    }
}

// ============================================================================
// 六顆骰專屬牌型
// ============================================================================

/// 1-6 各至少一顆
pub fn is_straight(counts: &DiceCounts) -> bool {
    DiceCounts::faces().all(|face| counts.count(face) >= 1)
}

/// 六顆骰，恰好三個點數各 2 顆
pub fn is_three_pairs(counts: &DiceCounts) -> bool {
    counts.total() as usize == NUM_DICE
        && counts.faces_with_count(2) == 3
        && counts.faces_with_count(0) == 3
}

/// 六顆骰，一個點數 4 顆 + 另一個點數 2 顆
pub fn is_four_with_pair(counts: &DiceCounts) -> bool {
    counts.total() as usize == NUM_DICE
        && counts.faces_with_count(4) == 1
        && counts.faces_with_count(2) == 1
}

/// 六顆骰，兩個不同點數各 3 顆
pub fn is_two_triples(counts: &DiceCounts) -> bool {
    counts.total() as usize == NUM_DICE && counts.faces_with_count(3) == 2
}

/// 列出目前計數下所有可成立的組合
///
/// 順序：順子、三對、四帶二、雙三條、各點數三條、各點數 4/5/6 條、單 1、單 5。
/// 搜尋遇到同分時保留先找到的拆法，因此順序影響 breakdown 但不影響分數。
pub fn possible_combos(counts: &DiceCounts) -> Vec<Combo> {
    let mut combos = Vec::new();

    if is_straight(counts) {
        combos.push(Combo::new(
            ComboKind::Straight,
            DiceCounts::from_counts([1; NUM_FACES]),
        ));
    }

    // 六顆骰牌型消耗全部骰子
    if is_three_pairs(counts) {
        combos.push(Combo::new(ComboKind::ThreePairs, *counts));
    }
    if is_four_with_pair(counts) {
        combos.push(Combo::new(ComboKind::FourWithPair, *counts));
    }
    if is_two_triples(counts) {
        combos.push(Combo::new(ComboKind::TwoTriples, *counts));
    }

    for face in DiceCounts::faces() {
        if counts.count(face) >= 3 {
            combos.push(Combo::new(
                ComboKind::Triple(face),
                DiceCounts::of_face(face, 3),
            ));
        }
    }

    for face in DiceCounts::faces() {
        let n = counts.count(face);
        if n >= 4 {
            combos.push(Combo::new(
                ComboKind::FourOfAKind(face),
                DiceCounts::of_face(face, 4),
            ));
        }
        if n >= 5 {
            combos.push(Combo::new(
                ComboKind::FiveOfAKind(face),
                DiceCounts::of_face(face, 5),
            ));
        }
        if n >= 6 {
            combos.push(Combo::new(
                ComboKind::SixOfAKind(face),
                DiceCounts::of_face(face, 6),
            ));
        }
    }

    if counts.count(1) >= 1 {
        combos.push(Combo::new(ComboKind::SingleOne, DiceCounts::of_face(1, 1)));
    }
    if counts.count(5) >= 1 {
        combos.push(Combo::new(ComboKind::SingleFive, DiceCounts::of_face(5, 1)));
    }

    combos
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(values: &[u8]) -> Vec<ComboKind> {
        possible_combos(&DiceCounts::from_values(values))
            .into_iter()
            .map(|c| c.kind)
            .collect()
    }

    #[test]
    fn test_combo_points() {
        assert_eq!(ComboKind::Triple(1).points(), 1000);
        assert_eq!(ComboKind::Triple(2).points(), 200);
        assert_eq!(ComboKind::Triple(6).points(), 600);
        assert_eq!(ComboKind::FourOfAKind(3).points(), 1000);
        assert_eq!(ComboKind::FiveOfAKind(3).points(), 2000);
        assert_eq!(ComboKind::SixOfAKind(3).points(), 3000);
        assert_eq!(ComboKind::TwoTriples.points(), 2500);
        assert_eq!(ComboKind::SingleFive.points(), 50);
    }

    #[test]
    fn test_combo_labels() {
        assert_eq!(ComboKind::Triple(1).label(), "Triple of 1");
        assert_eq!(ComboKind::FourOfAKind(6).label(), "Four of 6");
        assert_eq!(ComboKind::Straight.label(), "Straight 1-6");
    }

    #[test]
    fn test_no_combos() {
        assert!(kinds(&[]).is_empty());
        assert!(kinds(&[2, 3, 4]).is_empty());
        assert!(kinds(&[2, 2, 3, 4, 6]).is_empty());
    }

    #[test]
    fn test_straight_emits_singles_too() {
        assert_eq!(
            kinds(&[1, 2, 3, 4, 5, 6]),
            vec![ComboKind::Straight, ComboKind::SingleOne, ComboKind::SingleFive]
        );
    }

    #[test]
    fn test_straight_uses_one_of_each_face() {
        let counts = DiceCounts::from_values(&[6, 5, 4, 3, 2, 1]);
        let straight = &possible_combos(&counts)[0];
        assert_eq!(straight.kind, ComboKind::Straight);
        assert_eq!(straight.uses.as_array(), [1; NUM_FACES]);
        assert_eq!(straight.points, 1500);
    }

    #[test]
    fn test_overlapping_same_face() {
        // 4 顆 1：三條、四條、單 1 都要列出
        assert_eq!(
            kinds(&[1, 1, 1, 1]),
            vec![ComboKind::Triple(1), ComboKind::FourOfAKind(1), ComboKind::SingleOne]
        );
    }

    #[test]
    fn test_six_of_a_kind_emits_all_sizes() {
        assert_eq!(
            kinds(&[5, 5, 5, 5, 5, 5]),
            vec![
                ComboKind::Triple(5),
                ComboKind::FourOfAKind(5),
                ComboKind::FiveOfAKind(5),
                ComboKind::SixOfAKind(5),
                ComboKind::SingleFive,
            ]
        );
    }

    #[test]
    fn test_three_pairs() {
        let counts = DiceCounts::from_values(&[2, 2, 3, 3, 4, 4]);
        let combos = possible_combos(&counts);
        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0].kind, ComboKind::ThreePairs);
        assert_eq!(combos[0].uses, counts);
    }

    #[test]
    fn test_three_pairs_requires_six_dice() {
        assert!(!is_three_pairs(&DiceCounts::from_values(&[2, 2, 3, 3])));
        // 4+2 不是三對
        assert!(!is_three_pairs(&DiceCounts::from_values(&[2, 2, 2, 2, 3, 3])));
    }

    #[test]
    fn test_four_with_pair() {
        let found = kinds(&[3, 3, 3, 3, 6, 6]);
        assert_eq!(
            found,
            vec![ComboKind::FourWithPair, ComboKind::Triple(3), ComboKind::FourOfAKind(3)]
        );
    }

    #[test]
    fn test_two_triples() {
        let found = kinds(&[1, 1, 1, 4, 4, 4]);
        assert_eq!(
            found,
            vec![
                ComboKind::TwoTriples,
                ComboKind::Triple(1),
                ComboKind::Triple(4),
                ComboKind::SingleOne,
            ]
        );
    }

    #[test]
    fn test_combos_always_fit_counts() {
        let counts = DiceCounts::from_values(&[1, 1, 1, 5, 5, 5]);
        for combo in possible_combos(&counts) {
            assert!(counts.checked_sub(&combo.uses).is_some(), "{:?}", combo.kind);
            assert!(combo.points > 0);
        }
    }
}

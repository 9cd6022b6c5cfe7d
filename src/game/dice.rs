//! 骰子點數計數
//!
//! `DiceCounts` 是計分引擎的狀態單位：列舉、相減與 memo 都以它為鍵。

use std::fmt;
use std::ops::RangeInclusive;

use super::constants::{FACE_MAX, FACE_MIN, NUM_FACES};

/// 每個點數（1..=6）的骰子數
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiceCounts([u8; NUM_FACES]);

impl DiceCounts {
    pub const fn new() -> Self {
        Self([0; NUM_FACES])
    }

    /// 直接由計數陣列建立（索引 0 = 點數 1）
    pub const fn from_counts(counts: [u8; NUM_FACES]) -> Self {
        Self(counts)
    }

    /// 由骰子點數列表建立
    ///
    /// 超出 1..=6 的值不計入任何點數；呼叫端應在進入引擎前過濾。
    pub fn from_values(values: &[u8]) -> Self {
        let mut counts = Self::new();
        for &value in values {
            if Self::faces().contains(&value) {
                counts.0[(value - FACE_MIN) as usize] += 1;
            }
        }
        counts
    }

    /// 只含 `n` 顆 `face` 的計數
    pub fn of_face(face: u8, n: u8) -> Self {
        let mut counts = Self::new();
        counts.0[(face - FACE_MIN) as usize] = n;
        counts
    }

    pub fn faces() -> RangeInclusive<u8> {
        FACE_MIN..=FACE_MAX
    }

    #[inline]
    pub fn count(&self, face: u8) -> u8 {
        self.0[(face - FACE_MIN) as usize]
    }

    pub fn total(&self) -> u8 {
        self.0.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&c| c == 0)
    }

    pub fn as_array(&self) -> [u8; NUM_FACES] {
        self.0
    }

    /// 相減產生新的計數；任何點數不足時回傳 None
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        let mut next = *self;
        for (slot, used) in next.0.iter_mut().zip(other.0.iter()) {
            *slot = slot.checked_sub(*used)?;
        }
        Some(next)
    }

    pub fn add(&self, other: &Self) -> Self {
        let mut sum = *self;
        for (slot, extra) in sum.0.iter_mut().zip(other.0.iter()) {
            *slot += extra;
        }
        sum
    }

    /// 恰好有 `n` 顆的點數個數
    pub fn faces_with_count(&self, n: u8) -> usize {
        self.0.iter().filter(|&&c| c == n).count()
    }
}

impl fmt::Display for DiceCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.0;
        write!(f, "{},{},{},{},{},{}", c[0], c[1], c[2], c[3], c[4], c[5])
    }
}

// ============================================================================
// 單元測試
// ============================================================================

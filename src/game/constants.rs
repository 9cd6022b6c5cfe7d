//! 遊戲常量定義

// ============================================================================
// 骰子常量
// ============================================================================

pub const NUM_DICE: usize = 6;   // 每次完整擲骰的骰子數
pub const NUM_FACES: usize = 6;  // 骰子點數 1..=6
pub const FACE_MIN: u8 = 1;
pub const FACE_MAX: u8 = 6;
pub const NUM_PLAYERS: usize = 2;

// ============================================================================
// 計分常量
// ============================================================================

pub const POINTS_SINGLE_1: u32 = 100;
pub const POINTS_SINGLE_5: u32 = 50;
pub const POINTS_TRIPLE_1: u32 = 1000;
pub const POINTS_TRIPLE_2: u32 = 200;
pub const POINTS_TRIPLE_3: u32 = 300;
pub const POINTS_TRIPLE_4: u32 = 400;
pub const POINTS_TRIPLE_5: u32 = 500;
pub const POINTS_TRIPLE_6: u32 = 600;
pub const POINTS_FOUR: u32 = 1000;
pub const POINTS_FIVE: u32 = 2000;
pub const POINTS_SIX: u32 = 3000;
pub const POINTS_STRAIGHT: u32 = 1500;
pub const POINTS_THREE_PAIRS: u32 = 1500;
pub const POINTS_FOUR_WITH_PAIR: u32 = 1500;
pub const POINTS_TWO_TRIPLES: u32 = 2500;

/// 三條分數（依點數）
pub const fn triple_points(face: u8) -> u32 {
    match face {
        1 => POINTS_TRIPLE_1,
        2 => POINTS_TRIPLE_2,
        3 => POINTS_TRIPLE_3,
        4 => POINTS_TRIPLE_4,
        5 => POINTS_TRIPLE_5,
        _ => POINTS_TRIPLE_6,
    }
}

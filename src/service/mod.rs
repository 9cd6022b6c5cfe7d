//! 服務層模組
//!
//! 牌桌狀態機、大廳、動作錯誤、指標與 protobuf 快照轉換

pub mod error;
pub mod lobby;
pub mod metrics;
pub mod snapshot;
pub mod state;

pub use error::ActionError;
pub use lobby::{Lobby, Seated};
pub use metrics::Metrics;
pub use snapshot::{
    dice_values_from_proto, event_to_proto, score_result_to_proto, snapshot_from_state,
    state_changed,
};
pub use state::{Die, Seat, TableEvent, TableState, TableStatus, TurnMove};

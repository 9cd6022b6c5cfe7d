//! Farkle 雙人骰子遊戲引擎
//!
//! - `game`: 計分引擎（純函數，無狀態）
//! - `service`: 牌桌狀態機、大廳、gRPC 訊息轉換
//! - `config`: 環境變數設定

pub mod proto {
    tonic::include_proto!("farkle");
}

pub mod config;
pub mod game;
pub mod service;

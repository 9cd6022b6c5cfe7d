//! 輸出 1..=6 顆骰子的爆骰機率表（JSON）

use farkle_env::game::odds_table;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let table = odds_table();
    println!("{}", serde_json::to_string_pretty(&table)?);
    Ok(())
}

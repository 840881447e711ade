//! 成本曲線交叉點

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 交叉點
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossPoint {
    /// 交叉數量（向下取整）
    pub quantity: u64,

    /// 交叉點的庫存消耗成本
    pub value: Decimal,
}

/// 交叉點檢測器
pub struct CrossoverDetector;

impl CrossoverDetector {
    /// 找出庫存消耗成本追上新增採購成本的第一個位置
    ///
    /// 取第一組相鄰採樣點 `(i, i+1)`，滿足 `repl[i] ≤ proc[i]` 且
    /// `repl[i+1] ≥ proc[i+1]`，在兩點間線性插值。兩點差值皆為 0 時不算交叉。
    pub fn detect(
        quantities: &[u64],
        replenishment: &[Decimal],
        procurement: &[Decimal],
    ) -> Option<CrossPoint> {
        let len = quantities.len().min(replenishment.len()).min(procurement.len());

        (1..len).find_map(|next| {
            let i = next - 1;
            let diff_before = replenishment[i] - procurement[i];
            let diff_after = replenishment[next] - procurement[next];

            if diff_before > Decimal::ZERO || diff_after < Decimal::ZERO {
                return None;
            }
            let span = diff_after - diff_before;
            if span.is_zero() {
                return None;
            }

            let ratio = -diff_before / span;
            let q_before = Decimal::from(quantities[i]);
            let q_after = Decimal::from(quantities[next]);

            let quantity = (q_before + ratio * (q_after - q_before))
                .floor()
                .to_u64()
                .unwrap_or(0);
            let value = replenishment[i] + ratio * (replenishment[next] - replenishment[i]);

            Some(CrossPoint { quantity, value })
        })
    }
}

//! 最大可生產數量（不新增採購）

use mrp_calc::NettingEngine;
use mrp_core::LotSizingRule;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// 產能規劃器
pub struct CapacityPlanner;

impl CapacityPlanner {
    /// 二分搜尋 `[0, ceiling]` 內新增採購成本為 0 的最大生產數量
    ///
    /// 依賴採購成本隨數量單調不減；輸入違反此前提（如負單價）時結果無意義。
    /// 產品沒有子件（或不在 BOM 中）時只計算成品庫存。
    pub fn max_producible(engine: &NettingEngine<'_>, product_code: &str, ceiling: u64) -> u64 {
        if !engine.has_components(product_code) {
            let on_hand = engine
                .inventory()
                .get(product_code)
                .map(|entry| entry.quantity)
                .unwrap_or_default();
            let max = on_hand.floor().to_u64().unwrap_or(0).min(ceiling);
            tracing::debug!("產品 {} 沒有子件，可生產數量取成品庫存 {}", product_code, max);
            return max;
        }

        let mut low = 0u64;
        let mut high = ceiling;
        let mut iterations = 0u32;

        while low < high {
            let mid = low + (high - low).div_ceil(2);
            iterations += 1;

            if engine
                .net(product_code, Decimal::from(mid), LotSizingRule::LotForLot)
                .is_purchase_free()
            {
                low = mid;
            } else {
                high = mid - 1;
            }
        }

        tracing::debug!(
            "產品 {} 最大可生產數量: {}（搜尋 {} 次，上限 {}）",
            product_code,
            low,
            iterations,
            ceiling
        );
        low
    }
}

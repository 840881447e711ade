//! 單節點淨需求計算

use mrp_core::WorkingStock;
use rust_decimal::Decimal;

/// 單節點淨需求計算結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetRequirement {
    /// 總需求
    pub gross_requirement: Decimal,
    /// 計算前庫存
    pub stock_before: Decimal,
    /// 消耗庫存
    pub used_stock: Decimal,
    /// 淨需求
    pub net_requirement: Decimal,
}

impl NetRequirement {
    /// 是否已由庫存滿足
    pub fn is_satisfied(&self) -> bool {
        self.net_requirement <= Decimal::ZERO
    }
}

/// 淨需求計算器
pub struct NettingCalculator;

impl NettingCalculator {
    /// 以現有庫存沖銷需求
    ///
    /// `used = min(庫存, 需求)`，`net = 需求 - used`，庫存同步扣減。
    pub fn calculate(stock: &mut WorkingStock, code: &str, demand: Decimal) -> NetRequirement {
        let gross_requirement = demand.max(Decimal::ZERO);
        let stock_before = stock.available(code);
        let used_stock = stock.consume(code, gross_requirement);

        NetRequirement {
            gross_requirement,
            stock_before,
            used_stock,
            net_requirement: gross_requirement - used_stock,
        }
    }
}

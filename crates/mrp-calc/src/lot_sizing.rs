//! 批量規則實現

use mrp_core::LotSizingRule;
use rust_decimal::Decimal;

/// 批量規則計算器
pub struct LotSizingCalculator;

impl LotSizingCalculator {
    /// 原材料採購量
    ///
    /// MOQ 模式下，物料自身設有正的 MOQ 時以其為準，否則使用規則中的 MOQ。
    pub fn purchase_quantity(
        net_requirement: Decimal,
        rule: LotSizingRule,
        material_moq: Option<Decimal>,
    ) -> Decimal {
        if net_requirement <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        match rule {
            LotSizingRule::LotForLot => net_requirement,
            LotSizingRule::MinimumOrderMultiple(moq) => {
                let lot = material_moq.filter(|m| *m > Decimal::ZERO).unwrap_or(moq);
                Self::round_up_to_multiple(net_requirement, lot)
            }
        }
    }

    /// 向上取整到倍數（倍數非正時原樣返回）
    pub fn round_up_to_multiple(quantity: Decimal, multiple: Decimal) -> Decimal {
        if multiple <= Decimal::ZERO {
            return quantity;
        }

        let remainder = quantity % multiple;
        if remainder > Decimal::ZERO {
            quantity - remainder + multiple
        } else {
            quantity
        }
    }

    /// 非正 MOQ 退化為批對批
    pub fn normalize(rule: LotSizingRule) -> LotSizingRule {
        match rule {
            LotSizingRule::MinimumOrderMultiple(moq) if moq <= Decimal::ZERO => {
                tracing::warn!("最小訂購量 {} 無效，改用批對批", moq);
                LotSizingRule::LotForLot
            }
            other => other,
        }
    }
}

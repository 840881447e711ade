//! 成本曲線採樣

use mrp_calc::{NettingEngine, NettingResult};
use mrp_core::{AnalysisConfig, LotSizingRule};
use rayon::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::CostSeries;

/// 採樣計劃
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SamplePlan {
    /// 曲線最大數量
    pub max_quantity: Decimal,

    /// 採樣步長
    pub step: u64,

    /// 採樣數量：step, 2·step, … ≤ max_quantity
    pub quantities: Vec<u64>,
}

/// 兩種情境的成本曲線
#[derive(Debug, Clone, Default)]
pub struct CostCurves {
    pub without_moq: CostSeries,
    pub with_moq: CostSeries,
}

/// 成本曲線採樣器
pub struct CurveSampler;

impl CurveSampler {
    /// 根據最大可生產數量制定採樣計劃
    pub fn plan(max_producible: u64, config: &AnalysisConfig) -> SamplePlan {
        let max_quantity = match config.max_quantity {
            Some(max) => Decimal::from(max),
            None => Decimal::from(max_producible)
                .checked_mul(config.range_multiplier)
                .unwrap_or(Decimal::MAX)
                .max(Decimal::from(config.min_range)),
        }
        .min(Decimal::from(u64::MAX));

        let step = match config.step {
            Some(step) => step,
            None => {
                let points = Decimal::from(config.sample_points.max(1));
                let raw = (max_quantity / points)
                    .ceil()
                    .to_u64()
                    .unwrap_or(config.min_step)
                    .max(config.min_step);
                Self::perturb_step(raw)
            }
        }
        .max(1);

        let mut quantities = Vec::new();
        let mut next = Some(step);
        while let Some(quantity) = next.filter(|q| Decimal::from(*q) <= max_quantity) {
            quantities.push(quantity);
            next = quantity.checked_add(step);
        }

        tracing::debug!(
            "採樣計劃: 範圍 {}，步長 {}，{} 個點",
            max_quantity,
            step,
            quantities.len()
        );

        SamplePlan {
            max_quantity,
            step,
            quantities,
        }
    }

    /// 步長錯位
    ///
    /// 步長恰為 MOQ 倍數時，每個採樣點的 MOQ 取整餘量都是 0，
    /// 呆滯成本曲線會被採成一條 0 線（實際為鋸齒狀）。
    pub fn perturb_step(step: u64) -> u64 {
        if step % 50 == 0 {
            step + 13
        } else if step % 100 == 0 {
            step + 23
        } else {
            step
        }
    }

    /// 對每個採樣點分別計算不含 / 含 MOQ 的成本
    ///
    /// 各採樣點使用獨立庫存副本，並行計算後按數量順序寫回。
    pub fn sample(
        engine: &NettingEngine<'_>,
        product_code: &str,
        plan: &SamplePlan,
        config: &AnalysisConfig,
    ) -> CostCurves {
        let moq_rule = config.include_moq.then(|| config.moq_rule());

        let points: Vec<(NettingResult, Option<NettingResult>)> = plan
            .quantities
            .par_iter()
            .map(|&quantity| {
                let quantity = Decimal::from(quantity);
                let without = engine.net(product_code, quantity, LotSizingRule::LotForLot);
                let with = moq_rule.map(|rule| engine.net(product_code, quantity, rule));
                (without, with)
            })
            .collect();

        let mut curves = CostCurves::default();
        for (without, with) in points {
            curves.without_moq.push(without);
            if let Some(with) = with {
                curves.with_moq.push(with);
            }
        }
        curves
    }
}

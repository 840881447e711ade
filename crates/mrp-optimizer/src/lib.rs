//! # MRP Optimizer
//!
//! 生產數量分析：最大可生產數量、成本曲線、交叉點與分析結論

pub mod analyzer;
pub mod capacity;
pub mod crossover;
pub mod insight;
pub mod sampling;

// Re-export 主要類型
pub use analyzer::ProductionAnalyzer;
pub use capacity::CapacityPlanner;
pub use crossover::{CrossPoint, CrossoverDetector};
pub use insight::InsightSummarizer;
pub use sampling::{CurveSampler, SamplePlan};

use mrp_calc::NettingResult;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 成本序列（與生產數量序列一一對應）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSeries {
    /// 庫存消耗成本
    pub replenishment_costs: Vec<Decimal>,

    /// 新增採購成本
    pub new_procurement_costs: Vec<Decimal>,

    /// 新增呆滯成本
    pub new_stagnant_costs: Vec<Decimal>,
}

impl CostSeries {
    /// 追加一個採樣點
    pub fn push(&mut self, result: NettingResult) {
        self.replenishment_costs.push(result.replenishment_cost);
        self.new_procurement_costs.push(result.new_procurement_cost);
        self.new_stagnant_costs.push(result.new_stagnant_cost);
    }

    /// 採樣點數
    pub fn len(&self) -> usize {
        self.replenishment_costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replenishment_costs.is_empty()
    }
}

/// 關鍵指標
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetrics {
    /// 不新增採購可生產的最大數量
    pub max_producible_without_purchase: u64,

    /// 交叉點數量（0 表示範圍內無交叉）
    pub cross_point_quantity: u64,

    /// 交叉點成本
    pub cross_point_value: Decimal,

    /// 庫存總價值
    pub total_inventory_value: Decimal,
}

/// 物料庫存價值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialRequirement {
    pub code: String,
    pub name: String,
    pub stock_value: Decimal,
    pub is_stagnant: bool,
}

/// 生產數量分析結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionAnalysisResult {
    /// 分析ID
    pub analysis_id: Uuid,

    /// 產品編碼
    pub product_code: String,

    /// 產品名稱
    pub product_name: String,

    /// 採樣生產數量
    pub production_quantities: Vec<u64>,

    /// 採樣步長
    pub sample_step: u64,

    /// 不考慮 MOQ 的成本
    pub without_moq: CostSeries,

    /// 考慮 MOQ 的成本（未啟用 MOQ 分析時為空）
    pub with_moq: CostSeries,

    /// 關鍵指標
    pub key_metrics: KeyMetrics,

    /// 庫存價值最高的物料
    pub top_expensive_materials: Vec<MaterialRequirement>,

    /// 分析結論
    pub analysis_conclusions: Vec<String>,

    /// 計算耗時（毫秒）
    pub processing_time_ms: u64,
}

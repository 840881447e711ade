//! # MRP Calculation Engine
//!
//! BOM 淨需求展開與成本計算

pub mod calculator;
pub mod lot_sizing;
pub mod netting;
pub mod pegging;

// Re-export 主要類型
pub use calculator::NettingEngine;
pub use netting::NetRequirement;
pub use pegging::PeggingRecord;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 單次淨需求計算的成本彙總
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NettingResult {
    /// 消耗現有庫存的價值
    pub replenishment_cost: Decimal,

    /// 新增採購成本
    pub new_procurement_cost: Decimal,

    /// MOQ 取整產生的新增呆滯成本
    pub new_stagnant_cost: Decimal,
}

impl NettingResult {
    /// 是否無需新增採購
    pub fn is_purchase_free(&self) -> bool {
        self.new_procurement_cost.is_zero()
    }
}

/// 展開結果（含追溯與警告）
#[derive(Debug, Clone, Default)]
pub struct NettingRun {
    /// 成本彙總
    pub result: NettingResult,

    /// 按處理順序的追溯記錄
    pub pegging: Vec<PeggingRecord>,

    /// 警告信息
    pub warnings: Vec<MrpWarning>,
}

impl NettingRun {
    /// 指定物料的所有追溯記錄
    pub fn records_for<'r>(&'r self, code: &'r str) -> impl Iterator<Item = &'r PeggingRecord> + 'r {
        self.pegging.iter().filter(move |record| record.code == code)
    }
}

/// MRP 警告
#[derive(Debug, Clone)]
pub struct MrpWarning {
    pub component_id: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl MrpWarning {
    pub fn new(component_id: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            component_id,
            message,
            severity,
        }
    }

    pub fn info(component_id: String, message: String) -> Self {
        Self::new(component_id, message, WarningSeverity::Info)
    }

    pub fn warning(component_id: String, message: String) -> Self {
        Self::new(component_id, message, WarningSeverity::Warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Info,
    Warning,
}

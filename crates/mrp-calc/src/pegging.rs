//! 需求追溯

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::netting::NetRequirement;

/// 單筆需求記錄的沖銷追溯
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeggingRecord {
    /// 物料編碼
    pub code: String,

    /// 展開路徑（產品 → … → 本物料）
    pub path: Vec<String>,

    /// 總需求
    pub demand: Decimal,

    /// 處理前庫存
    pub stock_before: Decimal,

    /// 消耗庫存
    pub used_stock: Decimal,

    /// 淨需求
    pub net_requirement: Decimal,

    /// 採購數量（僅原材料）
    pub purchase_qty: Decimal,
}

impl PeggingRecord {
    /// 由淨需求結果創建追溯記錄
    pub fn new(code: impl Into<String>, requirement: &NetRequirement) -> Self {
        Self {
            code: code.into(),
            path: Vec::new(),
            demand: requirement.gross_requirement,
            stock_before: requirement.stock_before,
            used_stock: requirement.used_stock,
            net_requirement: requirement.net_requirement,
            purchase_qty: Decimal::ZERO,
        }
    }

    /// 建構器模式：設置追溯路徑
    pub fn with_path(mut self, path: Vec<String>) -> Self {
        self.path = path;
        self
    }

    /// 建構器模式：設置採購數量
    pub fn with_purchase_qty(mut self, purchase_qty: Decimal) -> Self {
        self.purchase_qty = purchase_qty;
        self
    }
}

//! 庫存模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::bom::BomTree;
use crate::stock_status::storage_days_from_batch;

/// 單一物料的庫存快照項
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    /// 庫存數量
    pub quantity: Decimal,

    /// 單價
    pub unit_price: Decimal,
}

impl StockEntry {
    pub fn new(quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            quantity,
            unit_price,
        }
    }

    /// 庫存價值
    pub fn value(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

/// 庫存快照（物料編碼 → 庫存項）
///
/// 分析期間只讀；每次淨需求計算都透過 [`InventorySnapshot::working_stock`]
/// 取得獨立的可消耗副本。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventorySnapshot {
    entries: HashMap<String, StockEntry>,
}

impl InventorySnapshot {
    /// 創建空快照
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 BOM 樹的節點庫存建立快照（同一編碼取第一次出現）
    pub fn from_tree(tree: &BomTree) -> Self {
        let entries = tree
            .unique_materials()
            .into_iter()
            .map(|node| {
                (
                    node.code.clone(),
                    StockEntry::new(node.current_stock, node.unit_price),
                )
            })
            .collect();
        Self { entries }
    }

    /// 建構器模式：添加庫存項
    pub fn with_entry(
        mut self,
        code: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Self {
        self.insert(code, StockEntry::new(quantity, unit_price));
        self
    }

    /// 寫入庫存項（覆蓋同編碼）
    pub fn insert(&mut self, code: impl Into<String>, entry: StockEntry) {
        self.entries.insert(code.into(), entry);
    }

    /// 查詢庫存項
    pub fn get(&self, code: &str) -> Option<&StockEntry> {
        self.entries.get(code)
    }

    /// 物料數量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 庫存總價值
    pub fn total_value(&self) -> Decimal {
        self.entries.values().map(StockEntry::value).sum()
    }

    /// 產生本次計算專用的可消耗庫存
    pub fn working_stock(&self) -> WorkingStock {
        WorkingStock {
            remaining: self
                .entries
                .iter()
                .map(|(code, entry)| (code.clone(), entry.quantity.max(Decimal::ZERO)))
                .collect(),
        }
    }
}

/// 單次計算的可消耗庫存
#[derive(Debug, Clone)]
pub struct WorkingStock {
    remaining: HashMap<String, Decimal>,
}

impl WorkingStock {
    /// 剩餘可用數量
    pub fn available(&self, code: &str) -> Decimal {
        self.remaining.get(code).copied().unwrap_or(Decimal::ZERO)
    }

    /// 消耗庫存，回傳實際消耗數量 `min(剩餘, 需求)`
    pub fn consume(&mut self, code: &str, quantity: Decimal) -> Decimal {
        if quantity <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        match self.remaining.get_mut(code) {
            Some(remaining) => {
                let used = (*remaining).min(quantity);
                *remaining -= used;
                used
            }
            None => Decimal::ZERO,
        }
    }
}

/// 倉庫批次庫存記錄（資料載入層提供）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRecord {
    /// 物料編碼
    pub material_code: String,

    /// 現有庫存
    pub on_hand_qty: Decimal,

    /// 可用庫存
    pub available_qty: Decimal,

    /// 單價
    pub unit_price: Decimal,

    /// 批次號
    pub batch_no: Option<String>,

    /// 倉庫
    pub warehouse_id: Option<String>,
}

impl StockRecord {
    /// 創建新的庫存記錄
    pub fn new(material_code: impl Into<String>, on_hand_qty: Decimal, unit_price: Decimal) -> Self {
        Self {
            material_code: material_code.into(),
            on_hand_qty,
            available_qty: on_hand_qty,
            unit_price,
            batch_no: None,
            warehouse_id: None,
        }
    }

    /// 建構器模式：設置可用庫存
    pub fn with_available_qty(mut self, available_qty: Decimal) -> Self {
        self.available_qty = available_qty;
        self
    }

    /// 建構器模式：設置批次號
    pub fn with_batch_no(mut self, batch_no: impl Into<String>) -> Self {
        self.batch_no = Some(batch_no.into());
        self
    }

    /// 建構器模式：設置倉庫
    pub fn with_warehouse_id(mut self, warehouse_id: impl Into<String>) -> Self {
        self.warehouse_id = Some(warehouse_id.into());
        self
    }
}

/// 物料庫存（多倉庫彙總）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MaterialStock {
    pub current_stock: Decimal,
    pub available_stock: Decimal,
    /// 最老批次的庫齡
    pub storage_days: u32,
    pub unit_price: Decimal,
}

/// 按物料編碼彙總多倉庫記錄
///
/// 數量累加，庫齡取最大值，單價取第一筆記錄。
pub fn aggregate_stock_records(
    records: &[StockRecord],
    today: NaiveDate,
) -> HashMap<String, MaterialStock> {
    let mut aggregated: HashMap<String, MaterialStock> = HashMap::new();

    for record in records.iter().filter(|r| !r.material_code.is_empty()) {
        let storage_days = record
            .batch_no
            .as_deref()
            .map(|batch| storage_days_from_batch(batch, today))
            .unwrap_or(0);

        aggregated
            .entry(record.material_code.clone())
            .and_modify(|stock| {
                stock.current_stock += record.on_hand_qty;
                stock.available_stock += record.available_qty;
                stock.storage_days = stock.storage_days.max(storage_days);
            })
            .or_insert(MaterialStock {
                current_stock: record.on_hand_qty,
                available_stock: record.available_qty,
                storage_days,
                unit_price: record.unit_price,
            });
    }

    aggregated
}

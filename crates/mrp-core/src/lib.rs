//! # MRP Core
//!
//! BOM 樹、庫存快照與分析配置等核心資料模型

pub mod bom;
pub mod builder;
pub mod config;
pub mod inventory;
pub mod stock_status;

// Re-export 主要類型
pub use bom::{BomIndex, BomNode, BomStatistics, BomTree, NodeRole};
pub use builder::{BomLine, BomTreeBuilder, MaterialInfo, SubstitutionRelation};
pub use config::{AnalysisConfig, LotSizingRule};
pub use inventory::{InventorySnapshot, MaterialStock, StockEntry, StockRecord, WorkingStock};
pub use stock_status::StockStatus;

/// MRP 錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum MrpError {
    #[error("產品不存在: {0}")]
    ProductNotFound(String),

    #[error("無效的最小訂購量: {0}")]
    InvalidMoq(rust_decimal::Decimal),

    #[error("無效的分析配置: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, MrpError>;

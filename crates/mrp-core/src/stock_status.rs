//! 庫存狀態與庫齡

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 庫齡達到此天數視為呆滯
pub const STAGNANT_DAYS: u32 = 90;

/// 庫齡達到此天數發出預警
pub const WARNING_DAYS: u32 = 60;

/// 庫存狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    /// 充足
    Sufficient,
    /// 庫齡預警
    Warning,
    /// 呆滯
    Stagnant,
    /// 缺料
    Insufficient,
}

impl StockStatus {
    /// 根據庫齡與可用庫存判定狀態
    pub fn evaluate(storage_days: u32, available_stock: Decimal) -> Self {
        if available_stock <= Decimal::ZERO {
            return Self::Insufficient;
        }
        if storage_days >= STAGNANT_DAYS {
            return Self::Stagnant;
        }
        if storage_days >= WARNING_DAYS {
            return Self::Warning;
        }
        Self::Sufficient
    }

    /// 是否呆滯
    pub fn is_stagnant(self) -> bool {
        self == Self::Stagnant
    }
}

/// 從批次號推算庫齡
///
/// 以 `202` 開頭的批次號前 8 碼為入庫日期（`YYYYMMDD`），
/// 其他格式或無法解析時回傳 0。
pub fn storage_days_from_batch(batch_no: &str, today: NaiveDate) -> u32 {
    if !batch_no.starts_with("202") {
        return 0;
    }

    let Some(date_part) = batch_no.get(..8) else {
        return 0;
    };

    match NaiveDate::parse_from_str(date_part, "%Y%m%d") {
        Ok(inbound_date) => u32::try_from((today - inbound_date).num_days()).unwrap_or(0),
        Err(e) => {
            tracing::warn!("解析批次號失敗: {}, {}", batch_no, e);
            0
        }
    }
}

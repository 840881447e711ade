//! 生產分析配置

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{MrpError, Result};

/// 最大可生產數量的二分搜尋上限
///
/// 實務上的量級假設，不是業務上限。
pub const MAX_SEARCH_QUANTITY: u64 = 100_000;

/// 成本曲線的預設採樣點數
pub const DEFAULT_SAMPLE_POINTS: u32 = 15;

/// 單次分析允許的最多採樣點數
pub const MAX_SAMPLE_POINTS: u32 = 10_000;

/// 成本曲線範圍 = 最大可生產數量 × 此倍數（至少 [`DEFAULT_MIN_RANGE`]）
pub const DEFAULT_RANGE_MULTIPLIER: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// 成本曲線的最小範圍
pub const DEFAULT_MIN_RANGE: u64 = 3_000;

/// 最小採樣步長
pub const DEFAULT_MIN_STEP: u64 = 100;

/// 預設最小訂購量
pub const DEFAULT_MOQ_SIZE: Decimal = Decimal::ONE_HUNDRED;

/// 預設列出的高價值物料數量
pub const DEFAULT_TOP_MATERIALS: usize = 10;

/// 批量規則
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LotSizingRule {
    /// 批對批（Lot for Lot）- 按淨需求採購
    LotForLot,

    /// 最小訂購量倍數 - 採購量向上取整到 MOQ 的倍數
    MinimumOrderMultiple(Decimal),
}

/// 生產數量分析配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// 最小訂購量
    pub moq_size: Decimal,

    /// 是否包含 MOQ 分析
    pub include_moq: bool,

    /// 採樣點數
    pub sample_points: u32,

    /// 二分搜尋上限
    pub search_ceiling: u64,

    /// 曲線範圍倍數
    pub range_multiplier: Decimal,

    /// 曲線最小範圍
    pub min_range: u64,

    /// 最小採樣步長
    pub min_step: u64,

    /// 指定曲線最大數量（覆蓋自動範圍）
    pub max_quantity: Option<u64>,

    /// 指定採樣步長（原樣使用，不做錯位調整）
    pub step: Option<u64>,

    /// 高價值物料列表長度
    pub top_materials: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            moq_size: DEFAULT_MOQ_SIZE,
            include_moq: true,
            sample_points: DEFAULT_SAMPLE_POINTS,
            search_ceiling: MAX_SEARCH_QUANTITY,
            range_multiplier: DEFAULT_RANGE_MULTIPLIER,
            min_range: DEFAULT_MIN_RANGE,
            min_step: DEFAULT_MIN_STEP,
            max_quantity: None,
            step: None,
            top_materials: DEFAULT_TOP_MATERIALS,
        }
    }
}

impl AnalysisConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置最小訂購量
    pub fn with_moq_size(mut self, moq_size: Decimal) -> Self {
        self.moq_size = moq_size;
        self
    }

    /// 建構器模式：設置是否包含 MOQ 分析
    pub fn with_include_moq(mut self, include: bool) -> Self {
        self.include_moq = include;
        self
    }

    /// 建構器模式：設置採樣點數
    pub fn with_sample_points(mut self, points: u32) -> Self {
        self.sample_points = points;
        self
    }

    /// 建構器模式：設置二分搜尋上限
    pub fn with_search_ceiling(mut self, ceiling: u64) -> Self {
        self.search_ceiling = ceiling;
        self
    }

    /// 建構器模式：設置曲線範圍倍數
    pub fn with_range_multiplier(mut self, multiplier: Decimal) -> Self {
        self.range_multiplier = multiplier;
        self
    }

    /// 建構器模式：設置曲線最小範圍
    pub fn with_min_range(mut self, min_range: u64) -> Self {
        self.min_range = min_range;
        self
    }

    /// 建構器模式：設置最小採樣步長
    pub fn with_min_step(mut self, min_step: u64) -> Self {
        self.min_step = min_step;
        self
    }

    /// 建構器模式：指定曲線最大數量
    pub fn with_max_quantity(mut self, max_quantity: u64) -> Self {
        self.max_quantity = Some(max_quantity);
        self
    }

    /// 建構器模式：指定採樣步長
    pub fn with_step(mut self, step: u64) -> Self {
        self.step = Some(step);
        self
    }

    /// 建構器模式：設置高價值物料列表長度
    pub fn with_top_materials(mut self, count: usize) -> Self {
        self.top_materials = count;
        self
    }

    /// 含 MOQ 情境使用的批量規則
    pub fn moq_rule(&self) -> LotSizingRule {
        LotSizingRule::MinimumOrderMultiple(self.moq_size)
    }

    /// 曲線範圍上限（未指定時以搜尋上限推算）
    fn range_upper_bound(&self) -> Decimal {
        match self.max_quantity {
            Some(max) => Decimal::from(max),
            None => Decimal::from(self.search_ceiling)
                .checked_mul(self.range_multiplier)
                .unwrap_or(Decimal::MAX)
                .max(Decimal::from(self.min_range)),
        }
    }

    /// 驗證配置
    pub fn validate(&self) -> Result<()> {
        if self.include_moq && self.moq_size <= Decimal::ZERO {
            return Err(MrpError::InvalidMoq(self.moq_size));
        }
        if self.sample_points == 0 || self.sample_points > MAX_SAMPLE_POINTS {
            return Err(MrpError::InvalidConfig(format!(
                "採樣點數必須介於 1 與 {}: {}",
                MAX_SAMPLE_POINTS, self.sample_points
            )));
        }
        if self.search_ceiling == 0 {
            return Err(MrpError::InvalidConfig("搜尋上限必須大於 0".to_string()));
        }
        if self.range_multiplier < Decimal::ZERO {
            return Err(MrpError::InvalidConfig(format!(
                "曲線範圍倍數不可為負: {}",
                self.range_multiplier
            )));
        }
        if let Some(step) = self.step {
            if step == 0 {
                return Err(MrpError::InvalidConfig("採樣步長必須大於 0".to_string()));
            }
            let points = self.range_upper_bound() / Decimal::from(step);
            if points > Decimal::from(MAX_SAMPLE_POINTS) {
                return Err(MrpError::InvalidConfig(format!(
                    "採樣步長 {} 過小，採樣點數將超過 {}",
                    step, MAX_SAMPLE_POINTS
                )));
            }
        }
        if self.min_step == 0 && self.step.is_none() {
            return Err(MrpError::InvalidConfig("最小採樣步長必須大於 0".to_string()));
        }
        Ok(())
    }
}

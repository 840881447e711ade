//! BOM 樹模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::stock_status::StockStatus;

/// 節點角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeRole {
    /// 主料
    Primary,
    /// 替代料（淨需求計算不會消耗）
    Substitute { priority: u32 },
}

/// BOM 節點
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BomNode {
    /// 物料編碼（同一編碼可出現在樹的不同位置，例如共用半成品）
    pub code: String,

    /// 物料名稱
    pub name: String,

    /// 層級（根節點為 0）
    pub level: u32,

    /// 單位用量（每一個父件消耗的數量）
    pub quantity_per_parent: Decimal,

    /// 單位
    pub unit: String,

    /// 單價
    pub unit_price: Decimal,

    /// 現有庫存
    pub current_stock: Decimal,

    /// 可用庫存
    pub available_stock: Decimal,

    /// 庫齡（天）
    pub storage_days: u32,

    /// 物料自身的最小訂購量
    pub moq: Option<Decimal>,

    /// 節點角色
    pub role: NodeRole,

    /// 子件
    pub children: Vec<BomNode>,

    /// 替代料
    pub substitutes: Vec<BomNode>,
}

impl BomNode {
    /// 創建新的主料節點
    pub fn new(code: impl Into<String>, quantity_per_parent: Decimal) -> Self {
        let code = code.into();
        Self {
            name: code.clone(),
            code,
            level: 0,
            quantity_per_parent,
            unit: "個".to_string(),
            unit_price: Decimal::ZERO,
            current_stock: Decimal::ZERO,
            available_stock: Decimal::ZERO,
            storage_days: 0,
            moq: None,
            role: NodeRole::Primary,
            children: Vec::new(),
            substitutes: Vec::new(),
        }
    }

    /// 創建根節點（單位用量為 1）
    pub fn root(code: impl Into<String>) -> Self {
        Self::new(code, Decimal::ONE)
    }

    /// 創建替代料節點
    pub fn substitute(code: impl Into<String>, quantity_per_parent: Decimal, priority: u32) -> Self {
        let mut node = Self::new(code, quantity_per_parent);
        node.role = NodeRole::Substitute { priority };
        node
    }

    /// 建構器模式：設置名稱
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 建構器模式：設置單位
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// 建構器模式：設置單價
    pub fn with_unit_price(mut self, unit_price: Decimal) -> Self {
        self.unit_price = unit_price;
        self
    }

    /// 建構器模式：設置現有庫存（可用庫存同步設置）
    pub fn with_stock(mut self, stock: Decimal) -> Self {
        self.current_stock = stock;
        self.available_stock = stock;
        self
    }

    /// 建構器模式：設置可用庫存
    pub fn with_available_stock(mut self, available: Decimal) -> Self {
        self.available_stock = available;
        self
    }

    /// 建構器模式：設置庫齡
    pub fn with_storage_days(mut self, days: u32) -> Self {
        self.storage_days = days;
        self
    }

    /// 建構器模式：設置最小訂購量
    pub fn with_moq(mut self, moq: Decimal) -> Self {
        self.moq = Some(moq);
        self
    }

    /// 建構器模式：添加子件（子樹層級自動調整）
    pub fn with_child(mut self, mut child: BomNode) -> Self {
        child.set_level(self.level + 1);
        self.children.push(child);
        self
    }

    /// 建構器模式：添加替代料（與本節點同層）
    pub fn with_substitute(mut self, mut substitute: BomNode) -> Self {
        substitute.set_level(self.level);
        self.substitutes.push(substitute);
        self
    }

    /// 遞迴設置層級
    pub fn set_level(&mut self, level: u32) {
        self.level = level;
        for child in &mut self.children {
            child.set_level(level + 1);
        }
        for substitute in &mut self.substitutes {
            substitute.set_level(level);
        }
    }

    /// 是否為原材料（無子件）
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// 是否為替代料
    pub fn is_substitute(&self) -> bool {
        matches!(self.role, NodeRole::Substitute { .. })
    }

    /// 庫存價值
    pub fn stock_value(&self) -> Decimal {
        self.current_stock * self.unit_price
    }

    /// 庫存狀態
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::evaluate(self.storage_days, self.available_stock)
    }
}

/// BOM 統計信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomStatistics {
    /// 物料數量（唯一編碼）
    pub total_materials: usize,

    /// 庫存總價值
    pub total_inventory_value: Decimal,

    /// 呆滯物料數量
    pub stagnant_count: usize,

    /// 缺料物料數量
    pub insufficient_count: usize,
}

/// 產品 BOM 樹
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BomTree {
    root: BomNode,
}

impl BomTree {
    /// 以根節點創建 BOM 樹（層級從 0 重新編排）
    pub fn new(mut root: BomNode) -> Self {
        root.set_level(0);
        Self { root }
    }

    /// 根節點
    pub fn root(&self) -> &BomNode {
        &self.root
    }

    /// 產品編碼
    pub fn product_code(&self) -> &str {
        &self.root.code
    }

    /// 產品名稱
    pub fn product_name(&self) -> &str {
        &self.root.name
    }

    /// 建立編碼索引
    pub fn index(&self) -> BomIndex<'_> {
        BomIndex::build(&self.root)
    }

    /// 按層序展平所有主料節點（重複編碼保留）
    pub fn flatten(&self) -> Vec<&BomNode> {
        let mut nodes = Vec::new();
        let mut queue = VecDeque::from([&self.root]);

        while let Some(node) = queue.pop_front() {
            nodes.push(node);
            queue.extend(node.children.iter());
        }

        nodes
    }

    /// 每個編碼只取第一次出現的節點
    pub fn unique_materials(&self) -> Vec<&BomNode> {
        let mut seen = HashSet::new();
        self.flatten()
            .into_iter()
            .filter(|&node| seen.insert(node.code.as_str()))
            .collect()
    }

    /// 計算統計信息
    pub fn statistics(&self) -> BomStatistics {
        let materials = self.unique_materials();

        BomStatistics {
            total_materials: materials.len(),
            total_inventory_value: materials.iter().map(|n| n.stock_value()).sum(),
            stagnant_count: materials
                .iter()
                .filter(|n| n.stock_status() == StockStatus::Stagnant)
                .count(),
            insufficient_count: materials
                .iter()
                .filter(|n| n.stock_status() == StockStatus::Insufficient)
                .count(),
        }
    }
}

/// 編碼 → 節點索引
///
/// 同一編碼出現多次時，以層序第一次出現的節點為準。
#[derive(Debug, Clone)]
pub struct BomIndex<'a> {
    nodes: HashMap<&'a str, &'a BomNode>,
}

impl<'a> BomIndex<'a> {
    /// 從根節點建立索引
    pub fn build(root: &'a BomNode) -> Self {
        let mut nodes = HashMap::new();
        let mut queue = VecDeque::from([root]);

        while let Some(node) = queue.pop_front() {
            nodes.entry(node.code.as_str()).or_insert(node);
            queue.extend(node.children.iter());
        }

        Self { nodes }
    }

    /// 查找節點
    pub fn get(&self, code: &str) -> Option<&'a BomNode> {
        self.nodes.get(code).copied()
    }

    /// 索引大小
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// 索引是否為空
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

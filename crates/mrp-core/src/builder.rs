//! 由扁平 BOM 記錄建立 BOM 樹

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::bom::{BomNode, BomTree, NodeRole};
use crate::inventory::MaterialStock;
use crate::{MrpError, Result};

/// 物料主檔
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialInfo {
    /// 物料編碼
    pub code: String,

    /// 物料名稱
    pub name: String,

    /// 單位
    pub unit: String,

    /// 最小訂購量
    pub moq: Option<Decimal>,

    /// 主檔單價（無庫存單價時使用）
    pub unit_price: Decimal,
}

impl MaterialInfo {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            unit: "個".to_string(),
            moq: None,
            unit_price: Decimal::ZERO,
        }
    }

    /// 建構器模式：設置單位
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// 建構器模式：設置最小訂購量（0 視為未設置）
    pub fn with_moq(mut self, moq: Decimal) -> Self {
        self.moq = (moq > Decimal::ZERO).then_some(moq);
        self
    }

    /// 建構器模式：設置單價
    pub fn with_unit_price(mut self, unit_price: Decimal) -> Self {
        self.unit_price = unit_price;
        self
    }
}

/// BOM 行（父件 → 子件）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BomLine {
    pub parent_code: String,
    pub child_code: String,

    /// 標準用量（優先使用）
    pub standard_usage: Option<Decimal>,

    /// 用量分子
    pub usage_numerator: Decimal,

    /// 用量分母
    pub usage_denominator: Decimal,

    /// 替代組
    pub alternative_group: Option<String>,

    /// 是否為替代料
    pub is_substitute: bool,

    /// 替代優先級（數字越小越優先）
    pub alternative_priority: u32,
}

impl BomLine {
    /// 以標準用量創建 BOM 行
    pub fn new(parent_code: impl Into<String>, child_code: impl Into<String>, usage: Decimal) -> Self {
        Self {
            parent_code: parent_code.into(),
            child_code: child_code.into(),
            standard_usage: Some(usage),
            usage_numerator: Decimal::ONE,
            usage_denominator: Decimal::ONE,
            alternative_group: None,
            is_substitute: false,
            alternative_priority: 999,
        }
    }

    /// 以分數用量創建 BOM 行
    pub fn with_fraction(
        parent_code: impl Into<String>,
        child_code: impl Into<String>,
        numerator: Decimal,
        denominator: Decimal,
    ) -> Self {
        let mut line = Self::new(parent_code, child_code, Decimal::ZERO);
        line.standard_usage = None;
        line.usage_numerator = numerator;
        line.usage_denominator = denominator;
        line
    }

    /// 建構器模式：標記為替代組主料
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.alternative_group = Some(group.into());
        self
    }

    /// 建構器模式：標記為替代料
    pub fn as_substitute(mut self, group: impl Into<String>, priority: u32) -> Self {
        self.alternative_group = Some(group.into());
        self.is_substitute = true;
        self.alternative_priority = priority;
        self
    }

    /// 單位用量（標準用量為 0 時改用分子 / 分母）
    pub fn usage(&self) -> Decimal {
        match self.standard_usage.filter(|usage| !usage.is_zero()) {
            Some(usage) => usage,
            None if self.usage_denominator.is_zero() => Decimal::ZERO,
            None => self.usage_numerator / self.usage_denominator,
        }
    }
}

/// 替代料關係
#[derive(Debug, Clone)]
pub struct SubstitutionRelation {
    /// 主料
    pub primary: BomLine,

    /// 替代料（按優先級排序）
    pub substitutes: Vec<BomLine>,
}

/// 解析替代料關係
///
/// 按 (父件, 替代組) 分組，組內需同時有主料與替代料。
/// 回傳以 (父件, 主料子件) 為鍵的關係表。
pub fn parse_substitution_relations(
    lines: &[BomLine],
) -> HashMap<(String, String), SubstitutionRelation> {
    let mut groups: HashMap<(&str, &str), Vec<&BomLine>> = HashMap::new();
    for line in lines {
        if let Some(group) = line.alternative_group.as_deref().filter(|g| !g.is_empty()) {
            groups
                .entry((line.parent_code.as_str(), group))
                .or_default()
                .push(line);
        }
    }

    let mut relations = HashMap::new();
    for items in groups.into_values() {
        let Some(primary) = items.iter().find(|line| !line.is_substitute) else {
            continue;
        };

        let mut substitutes: Vec<BomLine> = items
            .iter()
            .filter(|line| line.is_substitute)
            .map(|line| (*line).clone())
            .collect();
        if substitutes.is_empty() {
            continue;
        }
        substitutes.sort_by_key(|line| line.alternative_priority);

        relations.insert(
            (primary.parent_code.clone(), primary.child_code.clone()),
            SubstitutionRelation {
                primary: (*primary).clone(),
                substitutes,
            },
        );
    }

    tracing::debug!("解析替代料關係: {} 組", relations.len());
    relations
}

/// BOM 樹建構器
pub struct BomTreeBuilder {
    materials: HashMap<String, MaterialInfo>,
    children: HashMap<String, Vec<BomLine>>,
    relations: HashMap<(String, String), SubstitutionRelation>,
    stock: HashMap<String, MaterialStock>,
    include_substitutes: bool,
}

impl BomTreeBuilder {
    /// 創建建構器
    pub fn new(
        materials: Vec<MaterialInfo>,
        lines: Vec<BomLine>,
        stock: HashMap<String, MaterialStock>,
    ) -> Self {
        let relations = parse_substitution_relations(&lines);

        let mut children: HashMap<String, Vec<BomLine>> = HashMap::new();
        for line in lines.into_iter().filter(|line| !line.is_substitute) {
            children.entry(line.parent_code.clone()).or_default().push(line);
        }

        Self {
            materials: materials
                .into_iter()
                .map(|m| (m.code.clone(), m))
                .collect(),
            children,
            relations,
            stock,
            include_substitutes: true,
        }
    }

    /// 建構器模式：是否掛載替代料
    pub fn with_substitutes(mut self, include: bool) -> Self {
        self.include_substitutes = include;
        self
    }

    /// 建立產品 BOM 樹
    pub fn build(&self, product_code: &str) -> Result<BomTree> {
        if !self.materials.contains_key(product_code) {
            return Err(MrpError::ProductNotFound(product_code.to_string()));
        }

        tracing::info!("構建 BOM 樹: {}", product_code);

        let mut path = Vec::new();
        let root = self
            .build_node(product_code, Decimal::ONE, &mut path)
            .ok_or_else(|| MrpError::ProductNotFound(product_code.to_string()))?;

        Ok(BomTree::new(root))
    }

    /// 遞迴建立節點，`path` 為祖先編碼路徑
    fn build_node(&self, code: &str, quantity: Decimal, path: &mut Vec<String>) -> Option<BomNode> {
        if path.iter().any(|ancestor| ancestor == code) {
            tracing::warn!("檢測到循環引用: {} (路徑: {})", code, path.join(" → "));
            return None;
        }

        path.push(code.to_string());

        let mut node = self.material_node(code, quantity);
        for line in self.children.get(code).into_iter().flatten() {
            let Some(mut child) = self.build_node(&line.child_code, line.usage(), path) else {
                continue;
            };

            if self.include_substitutes {
                if let Some(relation) = self
                    .relations
                    .get(&(code.to_string(), line.child_code.clone()))
                {
                    for sub in &relation.substitutes {
                        let mut substitute = self.material_node(&sub.child_code, sub.usage());
                        substitute.role = NodeRole::Substitute {
                            priority: sub.alternative_priority,
                        };
                        child = child.with_substitute(substitute);
                    }
                }
            }

            node = node.with_child(child);
        }

        path.pop();
        Some(node)
    }

    /// 以主檔與庫存建立不含子件的節點
    fn material_node(&self, code: &str, quantity: Decimal) -> BomNode {
        let mut node = BomNode::new(code, quantity);

        if let Some(material) = self.materials.get(code) {
            node.name = material.name.clone();
            node.unit = material.unit.clone();
            node.moq = material.moq;
            node.unit_price = material.unit_price;
        }

        let Some(stock) = self.stock.get(code) else {
            return node;
        };
        if !stock.unit_price.is_zero() {
            node.unit_price = stock.unit_price;
        }
        node.with_stock(stock.current_stock)
            .with_available_stock(stock.available_stock)
            .with_storage_days(stock.storage_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(qty: i64, price: i64, days: u32) -> MaterialStock {
        MaterialStock {
            current_stock: Decimal::from(qty),
            available_stock: Decimal::from(qty),
            storage_days: days,
            unit_price: Decimal::from(price),
        }
    }

    fn bike_builder() -> BomTreeBuilder {
        let materials = vec![
            MaterialInfo::new("BIKE", "腳踏車"),
            MaterialInfo::new("FRAME", "車架"),
            MaterialInfo::new("WHEEL", "輪子").with_moq(Decimal::from(50)),
            MaterialInfo::new("TUBE", "鋼管").with_unit("米").with_unit_price(Decimal::from(3)),
            MaterialInfo::new("TUBE-ALT", "鋁管"),
        ];
        let lines = vec![
            BomLine::new("BIKE", "FRAME", Decimal::ONE),
            BomLine::new("BIKE", "WHEEL", Decimal::from(2)),
            BomLine::new("FRAME", "TUBE", Decimal::from(3)).in_group("G1"),
            BomLine::new("FRAME", "TUBE-ALT", Decimal::from(2)).as_substitute("G1", 1),
        ];
        let mut inventory = HashMap::new();
        inventory.insert("WHEEL".to_string(), stock(40, 12, 100));
        inventory.insert("TUBE-ALT".to_string(), stock(7, 4, 0));

        BomTreeBuilder::new(materials, lines, inventory)
    }

    #[test]
    fn test_build_bike_tree() {
        let tree = bike_builder().build("BIKE").unwrap();

        assert_eq!(tree.product_name(), "腳踏車");
        let index = tree.index();

        let wheel = index.get("WHEEL").unwrap();
        assert_eq!(wheel.level, 1);
        assert_eq!(wheel.quantity_per_parent, Decimal::from(2));
        assert_eq!(wheel.moq, Some(Decimal::from(50)));
        assert_eq!(wheel.unit_price, Decimal::from(12));
        assert!(wheel.stock_status().is_stagnant());

        let tube = index.get("TUBE").unwrap();
        assert_eq!(tube.level, 2);
        assert_eq!(tube.unit, "米");
        // 無庫存時使用主檔單價
        assert_eq!(tube.unit_price, Decimal::from(3));
        assert_eq!(tube.substitutes.len(), 1);

        let alt = &tube.substitutes[0];
        assert_eq!(alt.code, "TUBE-ALT");
        assert_eq!(alt.role, NodeRole::Substitute { priority: 1 });
        assert_eq!(alt.current_stock, Decimal::from(7));
        assert_eq!(alt.level, 2);

        // 替代料不是子件
        assert!(index.get("TUBE-ALT").is_none());
    }

    #[test]
    fn test_build_without_substitutes() {
        let tree = bike_builder().with_substitutes(false).build("BIKE").unwrap();
        assert!(tree.index().get("TUBE").unwrap().substitutes.is_empty());
    }

    #[test]
    fn test_unknown_product() {
        let result = bike_builder().build("CAR");
        assert!(matches!(result, Err(MrpError::ProductNotFound(code)) if code == "CAR"));
    }

    #[test]
    fn test_cycle_is_cut() {
        let materials = vec![MaterialInfo::new("A", "A"), MaterialInfo::new("B", "B")];
        let lines = vec![
            BomLine::new("A", "B", Decimal::ONE),
            BomLine::new("B", "A", Decimal::ONE),
            BomLine::new("B", "C", Decimal::from(2)),
        ];
        let tree = BomTreeBuilder::new(materials, lines, HashMap::new())
            .build("A")
            .unwrap();

        let codes: Vec<_> = tree.flatten().iter().map(|n| n.code.as_str()).collect();
        assert_eq!(codes, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_fractional_usage() {
        let line = BomLine::with_fraction("P", "C", Decimal::from(1), Decimal::from(4));
        assert_eq!(line.usage(), Decimal::new(25, 2));

        let broken = BomLine::with_fraction("P", "C", Decimal::from(1), Decimal::ZERO);
        assert_eq!(broken.usage(), Decimal::ZERO);
    }

    #[test]
    fn test_zero_standard_usage_uses_fraction() {
        let mut line = BomLine::new("P", "C", Decimal::ZERO);
        line.usage_numerator = Decimal::from(3);
        line.usage_denominator = Decimal::from(2);
        assert_eq!(line.usage(), Decimal::new(15, 1));

        let tree = BomTreeBuilder::new(
            vec![MaterialInfo::new("P", "產品"), MaterialInfo::new("C", "子件")],
            vec![line],
            HashMap::new(),
        )
        .build("P")
        .unwrap();
        assert_eq!(tree.root().children[0].quantity_per_parent, Decimal::new(15, 1));
    }

    #[test]
    fn test_relation_requires_primary() {
        let lines = vec![
            BomLine::new("P", "X", Decimal::ONE).as_substitute("G", 2),
            BomLine::new("P", "Y", Decimal::ONE).as_substitute("G", 1),
        ];
        assert!(parse_substitution_relations(&lines).is_empty());

        let lines = vec![
            BomLine::new("P", "M", Decimal::ONE).in_group("G"),
            BomLine::new("P", "X", Decimal::ONE).as_substitute("G", 2),
            BomLine::new("P", "Y", Decimal::ONE).as_substitute("G", 1),
        ];
        let relations = parse_substitution_relations(&lines);
        let relation = &relations[&("P".to_string(), "M".to_string())];
        let order: Vec<_> = relation
            .substitutes
            .iter()
            .map(|l| l.child_code.as_str())
            .collect();
        assert_eq!(order, vec!["Y", "X"]);
    }
}

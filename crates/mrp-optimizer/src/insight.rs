//! 分析結論

use mrp_core::{BomTree, InventorySnapshot};
use rust_decimal::Decimal;

use crate::{MaterialRequirement, ProductionAnalysisResult};

/// 分析結論生成器
pub struct InsightSummarizer;

impl InsightSummarizer {
    /// BOM 中每個物料（唯一編碼）的庫存價值
    ///
    /// 數量與單價以庫存快照為準，快照沒有的物料使用節點資料。
    pub fn materials(tree: &BomTree, inventory: &InventorySnapshot) -> Vec<MaterialRequirement> {
        tree.unique_materials()
            .into_iter()
            .map(|node| MaterialRequirement {
                code: node.code.clone(),
                name: node.name.clone(),
                stock_value: inventory
                    .get(&node.code)
                    .map(|entry| entry.value())
                    .unwrap_or_else(|| node.stock_value()),
                is_stagnant: node.stock_status().is_stagnant(),
            })
            .collect()
    }

    /// 按庫存價值降序取前 `limit` 項（價值為 0 的物料不列入）
    pub fn rank(materials: &[MaterialRequirement], limit: usize) -> Vec<MaterialRequirement> {
        let mut ranked: Vec<_> = materials
            .iter()
            .filter(|m| m.stock_value > Decimal::ZERO)
            .cloned()
            .collect();
        ranked.sort_by(|a, b| {
            b.stock_value
                .cmp(&a.stock_value)
                .then_with(|| a.code.cmp(&b.code))
        });
        ranked.truncate(limit);
        ranked
    }

    /// 生成分析結論
    ///
    /// `materials` 只含產品本身時視為空 BOM，只輸出空 BOM 與成品庫存的說明。
    pub fn conclusions(
        result: &ProductionAnalysisResult,
        materials: &[MaterialRequirement],
    ) -> Vec<String> {
        let metrics = &result.key_metrics;
        let mut conclusions = Vec::new();

        if materials.iter().all(|m| m.code == result.product_code) {
            conclusions.push(format!(
                "產品 {} 的 BOM 沒有任何子件，無物料需求可分析",
                result.product_code
            ));
            if metrics.max_producible_without_purchase > 0 {
                conclusions.push(format!(
                    "現有成品庫存可直接供應 {} 件",
                    metrics.max_producible_without_purchase
                ));
            }
            return conclusions;
        }

        if metrics.max_producible_without_purchase > 0 {
            conclusions.push(format!(
                "在不新增採購的情況下，現有庫存最多可生產 {} 件 {}",
                metrics.max_producible_without_purchase, result.product_name
            ));
        } else {
            conclusions.push(format!(
                "現有庫存不足以在不新增採購的情況下生產 {}",
                result.product_name
            ));
        }

        if metrics.cross_point_quantity > 0 {
            conclusions.push(format!(
                "生產數量約 {} 件時，庫存消耗成本追上新增採購成本（交叉點成本 {}）",
                metrics.cross_point_quantity,
                metrics.cross_point_value.round_dp(2)
            ));
        } else {
            conclusions.push(format!(
                "分析範圍內（至 {} 件）庫存消耗成本與新增採購成本未出現交叉",
                result.production_quantities.last().copied().unwrap_or(0)
            ));
        }

        if let Some(top) = result.top_expensive_materials.first() {
            conclusions.push(format!(
                "庫存價值最高的物料為 {}（{}），價值 {}",
                top.code,
                top.name,
                top.stock_value.round_dp(2)
            ));
        }

        let stagnant: Vec<_> = materials.iter().filter(|m| m.is_stagnant).collect();
        if stagnant.is_empty() {
            conclusions.push("BOM 中無呆滯物料".to_string());
        } else {
            let total: Decimal = stagnant.iter().map(|m| m.stock_value).sum();
            conclusions.push(format!(
                "呆滯物料 {} 項，庫存價值合計 {}",
                stagnant.len(),
                total.round_dp(2)
            ));
        }

        if let (Some(&quantity), Some(&stagnant_cost), Some(&with), Some(&without)) = (
            result.production_quantities.last(),
            result.with_moq.new_stagnant_costs.last(),
            result.with_moq.new_procurement_costs.last(),
            result.without_moq.new_procurement_costs.last(),
        ) {
            conclusions.push(format!(
                "考慮 MOQ 時，生產 {} 件需多採購 {}，新增呆滯成本 {}",
                quantity,
                (with - without).round_dp(2),
                stagnant_cost.round_dp(2)
            ));
        }

        conclusions
    }
}

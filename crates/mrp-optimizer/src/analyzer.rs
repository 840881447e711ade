//! 生產數量分析主入口

use mrp_calc::NettingEngine;
use mrp_core::{AnalysisConfig, BomTree, InventorySnapshot};
use uuid::Uuid;

use crate::capacity::CapacityPlanner;
use crate::crossover::CrossoverDetector;
use crate::insight::InsightSummarizer;
use crate::sampling::{CostCurves, CurveSampler, SamplePlan};
use crate::{KeyMetrics, ProductionAnalysisResult};

/// 生產數量分析器
#[derive(Debug, Clone, Default)]
pub struct ProductionAnalyzer {
    config: AnalysisConfig,
}

impl ProductionAnalyzer {
    /// 以驗證過的配置創建分析器
    pub fn new(config: AnalysisConfig) -> mrp_core::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 分析配置
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// 執行完整分析
    ///
    /// 1. 二分搜尋不新增採購的最大生產數量
    /// 2. 採樣成本曲線（含 / 不含 MOQ）
    /// 3. 找出不含 MOQ 曲線的交叉點
    /// 4. 物料價值排名與結論
    pub fn analyze(&self, tree: &BomTree, inventory: &InventorySnapshot) -> ProductionAnalysisResult {
        let product_code = tree.product_code();
        tracing::info!(
            "開始生產數量分析：產品 {}，庫存 {} 筆",
            product_code,
            inventory.len()
        );
        let start_time = std::time::Instant::now();

        let engine = NettingEngine::new(tree, inventory);

        tracing::debug!("Step 1: 最大可生產數量");
        let max_producible =
            CapacityPlanner::max_producible(&engine, product_code, self.config.search_ceiling);

        tracing::debug!("Step 2: 成本曲線採樣");
        let (plan, curves) = if engine.has_components(product_code) {
            let plan = CurveSampler::plan(max_producible, &self.config);
            let curves = CurveSampler::sample(&engine, product_code, &plan, &self.config);
            (plan, curves)
        } else {
            tracing::warn!("產品 {} 的 BOM 沒有子件，跳過成本曲線採樣", product_code);
            (SamplePlan::default(), CostCurves::default())
        };

        tracing::debug!("Step 3: 交叉點");
        let cross_point = CrossoverDetector::detect(
            &plan.quantities,
            &curves.without_moq.replenishment_costs,
            &curves.without_moq.new_procurement_costs,
        )
        .unwrap_or_default();

        tracing::debug!("Step 4: 分析結論");
        let materials = InsightSummarizer::materials(tree, inventory);
        let total_inventory_value = materials.iter().map(|m| m.stock_value).sum();

        let mut result = ProductionAnalysisResult {
            analysis_id: Uuid::new_v4(),
            product_code: product_code.to_string(),
            product_name: tree.product_name().to_string(),
            production_quantities: plan.quantities,
            sample_step: plan.step,
            without_moq: curves.without_moq,
            with_moq: curves.with_moq,
            key_metrics: KeyMetrics {
                max_producible_without_purchase: max_producible,
                cross_point_quantity: cross_point.quantity,
                cross_point_value: cross_point.value,
                total_inventory_value,
            },
            top_expensive_materials: InsightSummarizer::rank(&materials, self.config.top_materials),
            analysis_conclusions: Vec::new(),
            processing_time_ms: 0,
        };
        result.analysis_conclusions = InsightSummarizer::conclusions(&result, &materials);

        let elapsed = start_time.elapsed();
        result.processing_time_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

        tracing::info!(
            "生產數量分析完成，耗時 {:?}；最大可生產 {}，交叉點 {}",
            elapsed,
            max_producible,
            cross_point.quantity
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrp_core::{BomNode, MrpError};
    use rust_decimal::Decimal;

    fn simple_tree() -> BomTree {
        BomTree::new(
            BomNode::root("P").with_name("產品P").with_child(
                BomNode::new("A", Decimal::from(2))
                    .with_stock(Decimal::from(5))
                    .with_unit_price(Decimal::from(10))
                    .with_child(BomNode::new("M", Decimal::from(3)).with_unit_price(Decimal::from(2))),
            ),
        )
    }

    #[test]
    fn test_rejects_invalid_config() {
        let result = ProductionAnalyzer::new(AnalysisConfig::new().with_sample_points(0));
        assert!(matches!(result, Err(MrpError::InvalidConfig(_))));
    }

    #[test]
    fn test_analyze_simple_tree() {
        let tree = simple_tree();
        let inventory = InventorySnapshot::from_tree(&tree);
        let analyzer = ProductionAnalyzer::default();

        let result = analyzer.analyze(&tree, &inventory);

        assert_eq!(result.product_code, "P");
        assert_eq!(result.product_name, "產品P");
        assert_eq!(result.key_metrics.max_producible_without_purchase, 2);
        assert_eq!(result.key_metrics.total_inventory_value, Decimal::from(50));
        assert_eq!(result.sample_step, 213);
        assert_eq!(result.production_quantities.len(), 14);
        assert_eq!(result.without_moq.len(), 14);
        assert_eq!(result.with_moq.len(), 14);

        // 庫存消耗固定 50，採購成本持續上升，不會出現交叉
        assert!(result
            .without_moq
            .replenishment_costs
            .iter()
            .all(|c| *c == Decimal::from(50)));
        assert_eq!(result.key_metrics.cross_point_quantity, 0);
        assert_eq!(result.key_metrics.cross_point_value, Decimal::ZERO);

        assert_eq!(result.top_expensive_materials.len(), 1);
        assert_eq!(result.top_expensive_materials[0].code, "A");
        assert_eq!(result.analysis_conclusions.len(), 5);
    }

    #[test]
    fn test_analyze_bare_root() {
        let tree = BomTree::new(BomNode::root("EMPTY"));
        let inventory = InventorySnapshot::new();

        let result = ProductionAnalyzer::default().analyze(&tree, &inventory);

        assert_eq!(result.key_metrics.max_producible_without_purchase, 0);
        assert_eq!(result.key_metrics.cross_point_quantity, 0);
        assert_eq!(result.key_metrics.total_inventory_value, Decimal::ZERO);
        assert!(result.production_quantities.is_empty());
        assert_eq!(result.sample_step, 0);
        assert!(result.without_moq.is_empty());
        assert!(result.with_moq.is_empty());
        assert!(result.top_expensive_materials.is_empty());
        assert_eq!(
            result.analysis_conclusions,
            vec!["產品 EMPTY 的 BOM 沒有任何子件，無物料需求可分析".to_string()]
        );
    }

    #[test]
    fn test_analyze_bare_root_with_finished_stock() {
        let tree = BomTree::new(BomNode::root("KIT").with_name("成品套件"));
        let inventory = InventorySnapshot::new().with_entry("KIT", Decimal::from(7), Decimal::from(20));

        let result = ProductionAnalyzer::default().analyze(&tree, &inventory);

        assert_eq!(result.key_metrics.max_producible_without_purchase, 7);
        assert!(result.production_quantities.is_empty());
        assert_eq!(result.analysis_conclusions.len(), 2);
        assert!(result.analysis_conclusions[1].contains('7'));
    }

    #[test]
    fn test_config_is_kept() {
        let config = AnalysisConfig::new().with_top_materials(3);
        let analyzer = ProductionAnalyzer::new(config.clone()).unwrap();
        assert_eq!(analyzer.config(), &config);
    }

    #[test]
    fn test_result_serializes_with_snake_case_fields() {
        let tree = simple_tree();
        let inventory = InventorySnapshot::from_tree(&tree);
        let result = ProductionAnalyzer::default().analyze(&tree, &inventory);

        let json = serde_json::to_value(&result).unwrap();
        assert!(json["key_metrics"]["max_producible_without_purchase"].is_number());
        assert!(json["with_moq"]["new_stagnant_costs"].is_array());
        assert!(json["production_quantities"].is_array());
    }
}

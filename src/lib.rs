//! # MRP Analysis
//!
//! BOM 淨需求展開與生產數量分析
//!
//! ```ignore
//! let tree = BomTree::new(BomNode::root("BIKE").with_child(...));
//! let inventory = InventorySnapshot::from_tree(&tree);
//! let result = mrp_analysis::analyze_production(&tree, &inventory);
//! ```

pub use mrp_calc::{NettingEngine, NettingResult, NettingRun};
pub use mrp_core::{
    AnalysisConfig, BomNode, BomTree, InventorySnapshot, LotSizingRule, MrpError, Result,
};
pub use mrp_optimizer::{ProductionAnalysisResult, ProductionAnalyzer};

/// 以預設配置分析生產數量
pub fn analyze_production(tree: &BomTree, inventory: &InventorySnapshot) -> ProductionAnalysisResult {
    ProductionAnalyzer::default().analyze(tree, inventory)
}

/// 以自訂配置分析生產數量
pub fn analyze_production_with(
    tree: &BomTree,
    inventory: &InventorySnapshot,
    config: AnalysisConfig,
) -> Result<ProductionAnalysisResult> {
    Ok(ProductionAnalyzer::new(config)?.analyze(tree, inventory))
}

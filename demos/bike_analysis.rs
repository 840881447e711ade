//! 腳踏車生產數量分析示例

use chrono::NaiveDate;
use mrp_analysis::ProductionAnalyzer;
use mrp_core::inventory::aggregate_stock_records;
use mrp_core::{AnalysisConfig, BomLine, BomTreeBuilder, InventorySnapshot, MaterialInfo, StockRecord};
use rust_decimal::Decimal;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== 腳踏車生產數量分析示例 ===\n");

    // 物料主檔
    let materials = vec![
        MaterialInfo::new("BIKE-001", "城市腳踏車"),
        MaterialInfo::new("FRAME-001", "鋁合金車架").with_unit_price(Decimal::from(450)),
        MaterialInfo::new("WHEEL-001", "26吋車輪").with_unit_price(Decimal::from(120)),
        MaterialInfo::new("TUBE-AL", "鋁管")
            .with_unit("米")
            .with_unit_price(Decimal::from(35))
            .with_moq(Decimal::from(50)),
        MaterialInfo::new("SPOKE-001", "不鏽鋼輻條").with_unit_price(Decimal::new(15, 1)),
        MaterialInfo::new("SPOKE-002", "碳鋼輻條").with_unit_price(Decimal::ONE),
        MaterialInfo::new("RIM-001", "輪圈").with_unit_price(Decimal::from(60)),
        MaterialInfo::new("CHAIN-001", "鏈條").with_unit_price(Decimal::from(80)),
    ];

    // BOM 結構
    let lines = vec![
        BomLine::new("BIKE-001", "FRAME-001", Decimal::ONE),
        BomLine::new("BIKE-001", "WHEEL-001", Decimal::from(2)),
        BomLine::new("BIKE-001", "CHAIN-001", Decimal::ONE),
        BomLine::with_fraction("FRAME-001", "TUBE-AL", Decimal::from(5), Decimal::from(2)),
        BomLine::new("WHEEL-001", "RIM-001", Decimal::ONE),
        BomLine::new("WHEEL-001", "SPOKE-001", Decimal::from(36)).in_group("SPOKE"),
        BomLine::new("WHEEL-001", "SPOKE-002", Decimal::from(36)).as_substitute("SPOKE", 1),
    ];

    // 多倉庫批次庫存
    let today = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap_or_default();
    let records = vec![
        StockRecord::new("FRAME-001", Decimal::from(20), Decimal::from(450))
            .with_batch_no("20250601-A")
            .with_warehouse_id("WH-01"),
        StockRecord::new("FRAME-001", Decimal::from(10), Decimal::from(460))
            .with_batch_no("20251015-B")
            .with_warehouse_id("WH-02"),
        StockRecord::new("WHEEL-001", Decimal::from(30), Decimal::from(120)),
        StockRecord::new("TUBE-AL", Decimal::from(200), Decimal::from(35)),
        StockRecord::new("RIM-001", Decimal::from(40), Decimal::from(60)),
        StockRecord::new("SPOKE-001", Decimal::from(2000), Decimal::new(15, 1))
            .with_available_qty(Decimal::from(1800)),
        StockRecord::new("CHAIN-001", Decimal::from(100), Decimal::from(80))
            .with_batch_no("20250801-C"),
    ];
    let stock = aggregate_stock_records(&records, today);

    let tree = BomTreeBuilder::new(materials, lines, stock).build("BIKE-001")?;
    let statistics = tree.statistics();
    println!(
        "BOM: {}（{}），物料 {} 項，庫存價值 {}，呆滯 {} 項\n",
        tree.product_name(),
        tree.product_code(),
        statistics.total_materials,
        statistics.total_inventory_value,
        statistics.stagnant_count
    );

    let inventory = InventorySnapshot::from_tree(&tree);
    let analyzer = ProductionAnalyzer::new(
        AnalysisConfig::new()
            .with_moq_size(Decimal::from(100))
            .with_min_range(2_000)
            .with_min_step(50),
    )?;
    let config = analyzer.config();
    println!(
        "分析配置: MOQ {}，曲線最小範圍 {}，最小步長 {}\n",
        config.moq_size, config.min_range, config.min_step
    );
    let result = analyzer.analyze(&tree, &inventory);

    println!("關鍵指標:");
    println!(
        "  - 不新增採購最大可生產: {}",
        result.key_metrics.max_producible_without_purchase
    );
    println!(
        "  - 交叉點: {} 件（成本 {}）",
        result.key_metrics.cross_point_quantity,
        result.key_metrics.cross_point_value.round_dp(2)
    );
    println!("  - 庫存總價值: {}", result.key_metrics.total_inventory_value);

    println!("\n成本曲線（步長 {}）:", result.sample_step);
    for (i, quantity) in result.production_quantities.iter().enumerate() {
        println!(
            "  {:>6} 件  消耗 {:>10}  採購 {:>10}  MOQ採購 {:>10}  新增呆滯 {:>10}",
            quantity,
            result.without_moq.replenishment_costs[i],
            result.without_moq.new_procurement_costs[i],
            result.with_moq.new_procurement_costs[i],
            result.with_moq.new_stagnant_costs[i],
        );
    }

    println!("\n庫存價值最高的物料:");
    for material in &result.top_expensive_materials {
        println!(
            "  - {} {}: {}{}",
            material.code,
            material.name,
            material.stock_value,
            if material.is_stagnant { "（呆滯）" } else { "" }
        );
    }

    println!("\n分析結論:");
    for conclusion in &result.analysis_conclusions {
        println!("  - {}", conclusion);
    }

    println!("\n耗時 {} ms", result.processing_time_ms);
    Ok(())
}

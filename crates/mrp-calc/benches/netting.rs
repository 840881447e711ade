//! 淨需求展開效能測試

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mrp_calc::NettingEngine;
use mrp_core::{BomNode, BomTree, InventorySnapshot, LotSizingRule};
use rust_decimal::Decimal;

/// 三層、每層 `width` 個子件，原材料在各分支間共用
fn wide_tree(width: usize) -> BomTree {
    let mut root = BomNode::root("PRODUCT");
    for i in 0..width {
        let mut assembly = BomNode::new(format!("ASM-{i}"), Decimal::from(2))
            .with_stock(Decimal::from(10))
            .with_unit_price(Decimal::from(50));
        for j in 0..width {
            assembly = assembly.with_child(
                BomNode::new(format!("RAW-{j}"), Decimal::from(3))
                    .with_stock(Decimal::from(500))
                    .with_unit_price(Decimal::from(2)),
            );
        }
        root = root.with_child(assembly);
    }
    BomTree::new(root)
}

fn bench_netting(c: &mut Criterion) {
    let tree = wide_tree(20);
    let inventory = InventorySnapshot::from_tree(&tree);
    let engine = NettingEngine::new(&tree, &inventory);
    let moq = LotSizingRule::MinimumOrderMultiple(Decimal::from(100));

    c.bench_function("net_lot_for_lot_400_nodes", |b| {
        b.iter(|| engine.net("PRODUCT", black_box(Decimal::from(1_000)), LotSizingRule::LotForLot))
    });

    c.bench_function("net_moq_400_nodes", |b| {
        b.iter(|| engine.net("PRODUCT", black_box(Decimal::from(1_000)), moq))
    });
}

criterion_group!(benches, bench_netting);
criterion_main!(benches);

//! BOM 淨需求展開引擎

use mrp_core::{BomIndex, BomNode, BomTree, InventorySnapshot, LotSizingRule};
use rust_decimal::Decimal;
use std::collections::{HashSet, VecDeque};

use crate::lot_sizing::LotSizingCalculator;
use crate::netting::NettingCalculator;
use crate::pegging::PeggingRecord;
use crate::{MrpWarning, NettingResult, NettingRun};

/// 展開佇列中的需求記錄
struct DemandRecord<'a> {
    code: &'a str,
    quantity: Decimal,
    /// 父記錄在記錄表中的位置
    parent: Option<usize>,
}

/// 淨需求展開引擎
///
/// 索引在創建時建立一次，之後每次計算都使用獨立的可消耗庫存，
/// 因此同一引擎可重複（或並行）呼叫而互不影響。
pub struct NettingEngine<'a> {
    index: BomIndex<'a>,
    inventory: &'a InventorySnapshot,
}

impl<'a> NettingEngine<'a> {
    /// 創建引擎
    pub fn new(tree: &'a BomTree, inventory: &'a InventorySnapshot) -> Self {
        let index = tree.index();
        tracing::debug!(
            "建立 BOM 索引: 產品 {}，物料 {} 項",
            tree.product_code(),
            index.len()
        );
        report_cycles(&index, tree.product_code());
        Self { index, inventory }
    }

    /// 庫存快照
    pub fn inventory(&self) -> &'a InventorySnapshot {
        self.inventory
    }

    /// 產品是否有可展開的子件
    pub fn has_components(&self, product_code: &str) -> bool {
        self.index
            .get(product_code)
            .is_some_and(|node| !node.is_leaf())
    }

    /// 計算指定生產數量的三項成本（不保留追溯記錄）
    pub fn net(&self, product_code: &str, quantity: Decimal, rule: LotSizingRule) -> NettingResult {
        self.run(product_code, quantity, rule, false).result
    }

    /// 廣度優先展開並沖銷庫存，保留追溯記錄
    ///
    /// 同一物料來自不同父件的需求按出隊順序（層序）依次佔用共用庫存，
    /// 先出隊者優先。
    pub fn explode(&self, product_code: &str, quantity: Decimal, rule: LotSizingRule) -> NettingRun {
        self.run(product_code, quantity, rule, true)
    }

    fn run(
        &self,
        product_code: &str,
        quantity: Decimal,
        rule: LotSizingRule,
        trace: bool,
    ) -> NettingRun {
        let mut run = NettingRun::default();
        if quantity <= Decimal::ZERO {
            return run;
        }

        let rule = LotSizingCalculator::normalize(rule);
        let mut stock = self.inventory.working_stock();

        let mut records = vec![DemandRecord {
            code: product_code,
            quantity,
            parent: None,
        }];
        let mut queue = VecDeque::from([0usize]);

        while let Some(current) = queue.pop_front() {
            let code = records[current].code;
            let demand = records[current].quantity;

            let Some(node) = self.index.get(code) else {
                tracing::debug!("物料 {} 不在 BOM 索引中，視為已滿足", code);
                run.warnings.push(MrpWarning::info(
                    code.to_string(),
                    "物料不在 BOM 中，需求視為已滿足".to_string(),
                ));
                continue;
            };

            let unit_price = self.unit_price(node);
            let requirement = NettingCalculator::calculate(&mut stock, code, demand);
            run.result.replenishment_cost += requirement.used_stock * unit_price;

            let mut purchase_qty = Decimal::ZERO;
            if !requirement.is_satisfied() {
                if node.is_leaf() {
                    purchase_qty = LotSizingCalculator::purchase_quantity(
                        requirement.net_requirement,
                        rule,
                        node.moq,
                    );
                    run.result.new_procurement_cost += purchase_qty * unit_price;
                    run.result.new_stagnant_cost +=
                        (purchase_qty - requirement.net_requirement) * unit_price;
                } else {
                    // 替代料不展開
                    for child in &node.children {
                        if Self::is_on_path(&records, current, &child.code) {
                            tracing::debug!("循環引用 {} → {}，停止展開", code, child.code);
                            run.warnings.push(MrpWarning::warning(
                                child.code.clone(),
                                format!("循環引用（父件 {}），停止展開", code),
                            ));
                            continue;
                        }

                        records.push(DemandRecord {
                            code: child.code.as_str(),
                            quantity: requirement.net_requirement * child.quantity_per_parent,
                            parent: Some(current),
                        });
                        queue.push_back(records.len() - 1);
                    }
                }
            }

            if trace {
                run.pegging.push(
                    PeggingRecord::new(code, &requirement)
                        .with_path(Self::path_of(&records, current))
                        .with_purchase_qty(purchase_qty),
                );
            }
        }

        run
    }

    /// 單價：快照有記錄時以快照為準，否則使用節點單價
    fn unit_price(&self, node: &BomNode) -> Decimal {
        self.inventory
            .get(&node.code)
            .map(|entry| entry.unit_price)
            .unwrap_or(node.unit_price)
    }

    /// `code` 是否已在 `index` 記錄（含）的祖先路徑上
    fn is_on_path(records: &[DemandRecord<'_>], index: usize, code: &str) -> bool {
        let mut cursor = Some(index);
        while let Some(i) = cursor {
            if records[i].code == code {
                return true;
            }
            cursor = records[i].parent;
        }
        false
    }

    /// 從產品到本記錄的編碼路徑
    fn path_of(records: &[DemandRecord<'_>], index: usize) -> Vec<String> {
        let mut path = Vec::new();
        let mut cursor = Some(index);
        while let Some(i) = cursor {
            path.push(records[i].code.to_string());
            cursor = records[i].parent;
        }
        path.reverse();
        path
    }
}

/// 在編碼圖上找出循環引用並各警告一次，回傳 (父件, 子件) 清單
fn report_cycles<'a>(index: &BomIndex<'a>, product_code: &'a str) -> Vec<(&'a str, &'a str)> {
    let mut cycles = Vec::new();
    let mut finished = HashSet::new();
    let mut path = Vec::new();
    visit_codes(index, product_code, &mut path, &mut finished, &mut cycles);

    for (parent, child) in &cycles {
        tracing::warn!("檢測到循環引用: {} → {}，展開時將截斷", parent, child);
    }
    cycles
}

fn visit_codes<'a>(
    index: &BomIndex<'a>,
    code: &'a str,
    path: &mut Vec<&'a str>,
    finished: &mut HashSet<&'a str>,
    cycles: &mut Vec<(&'a str, &'a str)>,
) {
    let Some(node) = index.get(code) else {
        return;
    };

    path.push(code);
    for child in &node.children {
        let child_code = child.code.as_str();
        if path.contains(&child_code) {
            cycles.push((code, child_code));
        } else if !finished.contains(child_code) {
            visit_codes(index, child_code, path, finished, cycles);
        }
    }
    path.pop();
    finished.insert(code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrp_core::{BomNode, BomTree};
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// P → A x2 → M x3；A 庫存 5 @ 10，M 無庫存 @ 2
    fn simple_tree() -> (BomTree, InventorySnapshot) {
        let tree = BomTree::new(
            BomNode::root("P").with_child(
                BomNode::new("A", Decimal::from(2))
                    .with_stock(Decimal::from(5))
                    .with_unit_price(Decimal::from(10))
                    .with_child(BomNode::new("M", Decimal::from(3)).with_unit_price(Decimal::from(2))),
            ),
        );
        let inventory = InventorySnapshot::from_tree(&tree);
        (tree, inventory)
    }

    #[test]
    fn test_net_without_moq() {
        let (tree, inventory) = simple_tree();
        let engine = NettingEngine::new(&tree, &inventory);

        let result = engine.net("P", Decimal::from(3), LotSizingRule::LotForLot);

        assert_eq!(result.replenishment_cost, Decimal::from(50));
        assert_eq!(result.new_procurement_cost, Decimal::from(6));
        assert_eq!(result.new_stagnant_cost, Decimal::ZERO);
    }

    #[test]
    fn test_net_with_moq() {
        let (tree, inventory) = simple_tree();
        let engine = NettingEngine::new(&tree, &inventory);

        let result = engine.net(
            "P",
            Decimal::from(3),
            LotSizingRule::MinimumOrderMultiple(Decimal::from(100)),
        );

        assert_eq!(result.replenishment_cost, Decimal::from(50));
        assert_eq!(result.new_procurement_cost, Decimal::from(200));
        assert_eq!(result.new_stagnant_cost, Decimal::from(194));
    }

    #[test]
    fn test_zero_quantity() {
        let (tree, inventory) = simple_tree();
        let engine = NettingEngine::new(&tree, &inventory);

        let run = engine.explode("P", Decimal::ZERO, LotSizingRule::LotForLot);
        assert_eq!(run.result, NettingResult::default());
        assert!(run.pegging.is_empty());
    }

    #[test]
    fn test_calls_do_not_share_stock() {
        let (tree, inventory) = simple_tree();
        let engine = NettingEngine::new(&tree, &inventory);

        let first = engine.net("P", Decimal::from(2), LotSizingRule::LotForLot);
        let second = engine.net("P", Decimal::from(2), LotSizingRule::LotForLot);

        assert_eq!(first, second);
        assert!(first.new_procurement_cost.is_zero());
        assert_eq!(inventory.get("A").unwrap().quantity, Decimal::from(5));
    }

    #[test]
    fn test_pegging_trace() {
        let (tree, inventory) = simple_tree();
        let engine = NettingEngine::new(&tree, &inventory);

        let run = engine.explode("P", Decimal::from(3), LotSizingRule::LotForLot);
        let codes: Vec<_> = run.pegging.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["P", "A", "M"]);

        let a = &run.pegging[1];
        assert_eq!(a.demand, Decimal::from(6));
        assert_eq!(a.used_stock, Decimal::from(5));
        assert_eq!(a.net_requirement, Decimal::ONE);

        let m = &run.pegging[2];
        assert_eq!(m.path, vec!["P", "A", "M"]);
        assert_eq!(m.purchase_qty, Decimal::from(3));
    }

    #[test]
    fn test_unknown_product_is_satisfied() {
        let (tree, inventory) = simple_tree();
        let engine = NettingEngine::new(&tree, &inventory);

        let run = engine.explode("NOPE", Decimal::from(10), LotSizingRule::LotForLot);
        assert_eq!(run.result, NettingResult::default());
        assert_eq!(run.warnings.len(), 1);
    }

    #[test]
    fn test_snapshot_price_wins_over_node_price() {
        let (tree, _) = simple_tree();
        let inventory = InventorySnapshot::new().with_entry("M", Decimal::ZERO, Decimal::from(5));
        let engine = NettingEngine::new(&tree, &inventory);

        // A 不在快照中：無庫存可用，單價取節點 10；M 單價取快照 5
        let result = engine.net("P", Decimal::ONE, LotSizingRule::LotForLot);
        assert_eq!(result.replenishment_cost, Decimal::ZERO);
        assert_eq!(result.new_procurement_cost, Decimal::from(30));
    }

    #[test]
    fn test_invalid_moq_falls_back_to_lot_for_lot() {
        let (tree, inventory) = simple_tree();
        let engine = NettingEngine::new(&tree, &inventory);

        let result = engine.net(
            "P",
            Decimal::from(3),
            LotSizingRule::MinimumOrderMultiple(Decimal::ZERO),
        );
        assert_eq!(result.new_procurement_cost, Decimal::from(6));
        assert_eq!(result.new_stagnant_cost, Decimal::ZERO);
    }

    #[test]
    fn test_code_level_cycle_stops() {
        // P → A → P（同編碼的葉節點），索引中的 P 指向根節點
        let tree = BomTree::new(
            BomNode::root("P").with_child(
                BomNode::new("A", Decimal::ONE)
                    .with_child(BomNode::new("P", Decimal::ONE).with_unit_price(Decimal::ONE)),
            ),
        );
        let inventory = InventorySnapshot::new();
        let engine = NettingEngine::new(&tree, &inventory);

        let run = engine.explode("P", Decimal::from(4), LotSizingRule::LotForLot);
        assert_eq!(run.pegging.len(), 2);
        assert_eq!(run.warnings.len(), 1);
        assert_eq!(run.result.new_procurement_cost, Decimal::ZERO);
    }

    #[rstest]
    #[case(LotSizingRule::LotForLot)]
    #[case(LotSizingRule::MinimumOrderMultiple(Decimal::from(100)))]
    fn test_net_matches_explode_totals(#[case] rule: LotSizingRule) {
        let (tree, inventory) = simple_tree();
        let engine = NettingEngine::new(&tree, &inventory);

        for quantity in [1, 3, 17, 250] {
            let quantity = Decimal::from(quantity);
            assert_eq!(
                engine.net("P", quantity, rule),
                engine.explode("P", quantity, rule).result
            );
        }
    }

    #[test]
    fn test_cycles_found_on_code_graph() {
        let tree = BomTree::new(
            BomNode::root("P").with_child(
                BomNode::new("A", Decimal::ONE).with_child(
                    BomNode::new("B", Decimal::from(2))
                        .with_child(BomNode::new("A", Decimal::ONE)),
                ),
            ),
        );
        assert_eq!(report_cycles(&tree.index(), "P"), vec![("B", "A")]);

        let (acyclic, _) = simple_tree();
        assert!(report_cycles(&acyclic.index(), "P").is_empty());
    }

    /// 統計 WARN 級別事件數量
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn test_cycle_warning_logged_once_per_engine() {
        let tree = BomTree::new(
            BomNode::root("P").with_child(
                BomNode::new("A", Decimal::ONE)
                    .with_child(BomNode::new("P", Decimal::ONE).with_unit_price(Decimal::ONE)),
            ),
        );
        let inventory = InventorySnapshot::new();
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));

        tracing::subscriber::with_default(subscriber, || {
            let engine = NettingEngine::new(&tree, &inventory);
            for quantity in 1..=20 {
                let run = engine.explode("P", Decimal::from(quantity), LotSizingRule::LotForLot);
                assert_eq!(run.warnings.len(), 1);
                engine.net("P", Decimal::from(quantity), LotSizingRule::LotForLot);
            }
        });

        assert_eq!(warnings.load(Ordering::SeqCst), 1);
    }
}

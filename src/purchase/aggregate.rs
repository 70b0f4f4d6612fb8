//! Production rule aggregation: final placements to a purchase order.

use std::collections::BTreeMap;

use super::context::AllocationContext;
use super::option::PurchaseOptions;
use super::PurchaseError;
use crate::board::UnitTypeId;

/// Production rule name to number of purchases.
pub type PurchaseOrder = BTreeMap<String, u32>;

/// Tallies every placed unit and converts the counts into rule purchases.
///
/// Each unit type is charged to the first option producing it; counts are
/// divided by that option's batch quantity and zero entries are omitted.
pub fn aggregate(ctx: &AllocationContext, options: &PurchaseOptions) -> Result<PurchaseOrder, PurchaseError> {
    let mut counts: BTreeMap<UnitTypeId, u32> = BTreeMap::new();
    for unit in ctx.all_placed() {
        *counts.entry(unit.unit_type).or_default() += 1;
    }

    let mut order = PurchaseOrder::new();
    for (unit_type, count) in counts {
        let option = options
            .for_unit_type(unit_type)
            .ok_or(PurchaseError::UnmatchedUnitType(unit_type))?;
        let purchases = count / option.quantity;
        if purchases > 0 {
            *order.entry(option.rule.clone()).or_default() += purchases;
        }
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::TerritoryGraph;
    use crate::purchase::catalog;
    use crate::purchase::context::greedy_commit;
    use crate::purchase::option::PurchaseOption;
    use crate::purchase::testing::*;

    #[test]
    fn counts_every_entry() {
        let board = board();
        let options = options(&board);
        let mut ctx = catalog::build(&board, GERMANY, 40);
        let berlin = ctx.entry(BERLIN, BERLIN).unwrap();
        let baltic = ctx.entry(BERLIN, BALTIC).unwrap();

        let mut ledger = ctx.ledger(2);
        greedy_commit(&mut ledger, |_| options.single_land(INFANTRY));
        ctx.commit(berlin, ledger);
        let transport = options.for_unit_type(TRANSPORT).unwrap();
        let mut ledger = ctx.ledger(1);
        greedy_commit(&mut ledger, |_| Some(transport));
        ctx.commit(baltic, ledger);

        let order = aggregate(&ctx, &options).unwrap();
        assert_eq!(order, PurchaseOrder::from([("buyinfantry".to_string(), 2), ("buytransport".to_string(), 1)]));
        assert_eq!(aggregate(&ctx, &options).unwrap(), order, "aggregation is idempotent");
    }

    #[test]
    fn batches_divide_by_quantity() {
        let board = board();
        let stats = board.unit_stats(INFANTRY).unwrap();
        let pair = PurchaseOption::new("buyInfantryPair", INFANTRY, stats, 5, 2);
        let options = PurchaseOptions::new([pair.clone()]);
        let mut ctx = catalog::build(&board, GERMANY, 10);
        let berlin = ctx.entry(BERLIN, BERLIN).unwrap();
        let mut ledger = ctx.ledger(10);
        greedy_commit(&mut ledger, |_| Some(&pair));
        ctx.commit(berlin, ledger);

        assert_eq!(ctx.place(berlin).placed().len(), 4);
        assert_eq!(aggregate(&ctx, &options).unwrap(), PurchaseOrder::from([("buyInfantryPair".to_string(), 2)]));
    }

    #[test]
    fn empty_placements_give_an_empty_order() {
        let board = board();
        let ctx = catalog::build(&board, GERMANY, 10);
        assert!(aggregate(&ctx, &options(&board)).unwrap().is_empty());
    }

    #[test]
    fn unit_without_option_is_an_error() {
        let board = board();
        let options = options(&board);
        let mut ctx = catalog::build(&board, GERMANY, 10);
        let berlin = ctx.entry(BERLIN, BERLIN).unwrap();
        let mut ledger = ctx.ledger(1);
        greedy_commit(&mut ledger, |_| options.single_land(TANK));
        ctx.commit(berlin, ledger);

        let without_tanks = PurchaseOptions::new(options.iter().filter(|o| o.unit_type != TANK).cloned());
        let err = aggregate(&ctx, &without_tanks).unwrap_err();
        assert!(matches!(err, PurchaseError::UnmatchedUnitType(t) if t == TANK));
    }
}

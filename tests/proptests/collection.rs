//! Property tests for the share box collection

use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use safeparts_client::ShareCollection;
use safeparts_client::collection::MIN_BOXES;

#[derive(Clone, Debug)]
enum Op {
    Add,
    Remove(usize),
    Grow(usize),
    SetText(usize, bool),
    MarkInvalid(usize),
    Append,
}

impl Arbitrary for Op {
    fn arbitrary(g: &mut Gen) -> Self {
        let pick = usize::arbitrary(g) % 6;
        let n = usize::arbitrary(g) % 8;
        match pick {
            0 => Op::Add,
            1 => Op::Remove(n),
            2 => Op::Grow(n),
            3 => Op::SetText(n, bool::arbitrary(g)),
            4 => Op::MarkInvalid(n),
            _ => Op::Append,
        }
    }
}

fn apply(collection: &mut ShareCollection, op: &Op) {
    let ids: Vec<_> = collection.boxes().iter().map(|b| b.id()).collect();
    match *op {
        Op::Add => {
            collection.add_box();
        }
        Op::Remove(i) => {
            collection.remove_box(ids[i % ids.len()]);
        }
        Op::Grow(target) => {
            collection.grow_to(target, true);
        }
        Op::SetText(i, filled) => {
            let text = if filled { "apple bread" } else { "  " };
            collection.set_box_text(ids[i % ids.len()], text);
        }
        Op::MarkInvalid(n) => {
            collection.mark_invalid_by_count(n);
        }
        Op::Append => {
            collection.append_text("crane delta");
        }
    }
}

#[quickcheck]
fn prop_never_fewer_than_two_boxes(ops: Vec<Op>) -> bool {
    let mut collection = ShareCollection::new();
    ops.iter().all(|op| {
        apply(&mut collection, op);
        collection.len() >= MIN_BOXES
    })
}

#[quickcheck]
fn prop_box_ids_stay_unique(ops: Vec<Op>) -> bool {
    let mut collection = ShareCollection::new();
    for op in &ops {
        apply(&mut collection, op);
    }
    let mut ids: Vec<_> = collection.boxes().iter().map(|b| b.id()).collect();
    let total = ids.len();
    ids.sort();
    ids.dedup();
    ids.len() == total
}

#[quickcheck]
fn prop_only_empty_boxes_are_flagged(ops: Vec<Op>) -> bool {
    let mut collection = ShareCollection::new();
    for op in &ops {
        apply(&mut collection, op);
    }
    collection.clear_invalid();
    let flagged = collection.mark_invalid_by_count(usize::MAX);
    flagged
        .iter()
        .all(|id| collection.get(*id).is_some_and(|b| b.shares().is_empty()))
}

#[quickcheck]
fn prop_grow_reaches_target_and_never_shrinks(target: u8) -> bool {
    let mut collection = ShareCollection::new();
    let target = usize::from(target % 64);
    collection.grow_to(target, false);
    collection.len() == target.max(MIN_BOXES)
}

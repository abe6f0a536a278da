//! Bulk-create fan-out tests.
//!
//! A bulk request is a list of `{itemType, quantity}` lines sharing one
//! expiry; quantity N becomes N independent rows, never one row with a count.

use armory_core::ItemType;
use armory_server::routes::battle_items::expand_quantities;

#[test]
fn two_gloves_and_zero_mist_make_exactly_two_gloves() {
    let expanded = expand_quantities(&[(ItemType::Glove, 2), (ItemType::Mist, 0)])
        .expect("valid quantities");

    assert_eq!(expanded.len(), 2);
    assert!(expanded.iter().all(|&ty| ty == ItemType::Glove));
}

#[test]
fn every_type_fans_out_independently() {
    let lines: Vec<(ItemType, i64)> = ItemType::ALL
        .iter()
        .enumerate()
        .map(|(i, &ty)| (ty, i as i64))
        .collect();

    let expanded = expand_quantities(&lines).expect("valid quantities");

    // 0 + 1 + 2 + 3 + 4 + 5
    assert_eq!(expanded.len(), 15);
    for (i, &ty) in ItemType::ALL.iter().enumerate() {
        let count = expanded.iter().filter(|&&t| t == ty).count();
        assert_eq!(count, i, "type {ty}");
    }
}

#[test]
fn all_zero_lines_produce_an_empty_batch() {
    // Leaving every counter at zero is not an error; it creates nothing.
    let expanded = expand_quantities(&[(ItemType::Time, 0), (ItemType::StunHammer, 0)])
        .expect("zero quantities are skipped");
    assert!(expanded.is_empty());
}

#[test]
fn negative_quantity_is_rejected_with_the_offending_line() {
    let err = expand_quantities(&[(ItemType::Glove, 1), (ItemType::SecondBooster, -3)])
        .expect_err("negative quantity");
    assert_eq!(err.item_type, ItemType::SecondBooster);
    assert_eq!(err.quantity, -3);
}

#[test]
fn duplicate_lines_accumulate() {
    let expanded = expand_quantities(&[(ItemType::Mist, 1), (ItemType::Mist, 2)])
        .expect("valid quantities");
    assert_eq!(expanded.len(), 3);
}

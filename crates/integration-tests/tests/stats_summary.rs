//! Per-type summary completeness tests.
//!
//! The chart on the dashboard indexes by item type, so the summary must
//! contain exactly one entry per declared type whatever the query returned.

use armory_core::ItemType;
use armory_server::routes::stats::complete_summary;

#[test]
fn summary_always_has_one_entry_per_type() {
    for counts in [
        vec![],
        vec![(ItemType::Glove, 1)],
        ItemType::ALL.iter().map(|&ty| (ty, 9)).collect(),
    ] {
        let summary = complete_summary(&counts);
        assert_eq!(summary.len(), ItemType::ALL.len());

        for &ty in &ItemType::ALL {
            assert_eq!(
                summary.iter().filter(|e| e.item_type == ty).count(),
                1,
                "type {ty} must appear exactly once"
            );
        }
    }
}

#[test]
fn missing_types_are_reported_as_zero_not_omitted() {
    let summary = complete_summary(&[(ItemType::ThirdBooster, 4)]);

    let third = summary
        .iter()
        .find(|e| e.item_type == ItemType::ThirdBooster)
        .expect("present");
    assert_eq!(third.count, 4);

    for entry in summary.iter().filter(|e| e.item_type != ItemType::ThirdBooster) {
        assert_eq!(entry.count, 0);
    }
}

#[test]
fn summary_total_matches_the_input_total() {
    let counts = [
        (ItemType::Glove, 2),
        (ItemType::Mist, 7),
        (ItemType::Time, 1),
    ];
    let summary = complete_summary(&counts);

    let input_total: i64 = counts.iter().map(|&(_, c)| c).sum();
    let summary_total: i64 = summary.iter().map(|e| e.count).sum();
    assert_eq!(summary_total, input_total);
}

#[test]
fn summary_serializes_with_camel_case_fields() {
    let summary = complete_summary(&[(ItemType::Glove, 2)]);
    let json = serde_json::to_value(&summary).expect("serialize");

    let first = json.get(0).expect("non-empty");
    assert_eq!(first["itemType"], "GLOVE");
    assert_eq!(first["count"], 2);
}

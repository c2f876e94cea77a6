//! End-to-end query scenarios over a small fixed visit log.

use std::collections::HashMap;
use visitstats::{
    count_by_domain, count_by_time_scale, to_sorted_entries, Entry, SortBy, TimeScale,
    Transition, Visit, VisitFilter, VisitStore,
};

fn visit(id: &str, url: &str, time: i64) -> Visit {
    Visit {
        id: id.to_string(),
        url: url.to_string(),
        title: String::new(),
        time,
        ref_id: None,
        transition: Transition::Link,
    }
}

fn sample_store() -> VisitStore {
    VisitStore::new(vec![
        visit("1", "http://a.com", 1000),
        visit("2", "http://b.com", 2000),
        visit("3", "http://a.com", 3000),
    ])
}

fn ids(visits: &[&Visit]) -> Vec<String> {
    visits.iter().map(|v| v.id.clone()).collect()
}

#[test]
fn counts_by_domain_then_sorts_by_value() {
    let store = sample_store();

    let counts = count_by_domain(store.visits());
    let expected: HashMap<String, u32> =
        HashMap::from([("a.com".to_string(), 2), ("b.com".to_string(), 1)]);
    assert_eq!(counts, expected);

    assert_eq!(
        to_sorted_entries(&counts, SortBy::Value),
        [
            Entry {
                key: "b.com".to_string(),
                val: 1
            },
            Entry {
                key: "a.com".to_string(),
                val: 2
            },
        ]
    );
}

#[test]
fn legacy_sort_flag_selects_ordering() {
    let counts = count_by_domain(sample_store().visits());
    let by_key = to_sorted_entries(&counts, SortBy::from(false));
    assert_eq!(by_key[0].key, "a.com");
    let by_value = to_sorted_entries(&counts, SortBy::from(true));
    assert_eq!(by_value[0].key, "b.com");
}

#[test]
fn filters_by_domain_in_storage_order() {
    let store = sample_store();
    let matched = store.get_visits(&VisitFilter::new().with_domain("a.com"));
    assert_eq!(ids(&matched), ["1", "3"]);
}

#[test]
fn zero_min_time_is_not_applied() {
    let store = sample_store();
    let filter = VisitFilter::new().with_min_time(0).with_max_time(2000);
    let matched = store.get_visits(&filter);
    assert_eq!(ids(&matched), ["1", "2"]);
}

#[test]
fn unconstrained_filter_returns_everything() {
    let store = sample_store();
    let matched = store.get_visits(&VisitFilter::default());
    assert_eq!(ids(&matched), ["1", "2", "3"]);
}

#[test]
fn combined_predicates_are_anded() {
    let store = sample_store();
    let filter = VisitFilter::new()
        .with_domain("a.com")
        .with_min_time(1500)
        .with_max_time(5000);
    assert_eq!(ids(&store.get_visits(&filter)), ["3"]);
}

#[test]
fn empty_store_yields_empty_results() {
    let store = VisitStore::default();
    assert!(store.is_empty());
    assert!(store.get_visits(&VisitFilter::new().with_domain("a.com")).is_empty());
    assert!(count_by_domain(store.visits()).is_empty());
    for scale in [TimeScale::Hour, TimeScale::Day, TimeScale::Month, TimeScale::Year] {
        assert!(count_by_time_scale(store.visits(), scale).unwrap().is_empty());
    }
}

#[test]
fn filtered_subset_feeds_time_buckets() {
    // 2023-12-31T23:00:00Z and 2024-01-01T01:00:00Z
    let store = VisitStore::new(vec![
        visit("1", "https://a.com/x", 1_704_063_600_000),
        visit("2", "https://a.com/y", 1_704_070_800_000),
        visit("3", "https://b.com/", 1_704_070_800_000),
    ]);
    let matched = store.get_visits(&VisitFilter::new().with_domain("a.com"));

    let years = count_by_time_scale(matched.iter().copied(), TimeScale::Year).unwrap();
    assert_eq!(years, HashMap::from([(2023, 1), (2024, 1)]));

    let months = count_by_time_scale(matched.iter().copied(), TimeScale::Month).unwrap();
    assert_eq!(
        to_sorted_entries(&months, SortBy::Key),
        [Entry { key: 0, val: 1 }, Entry { key: 11, val: 1 }]
    );

    let hours = count_by_time_scale(matched, TimeScale::Hour).unwrap();
    assert_eq!(hours, HashMap::from([(23, 1), (1, 1)]));
}

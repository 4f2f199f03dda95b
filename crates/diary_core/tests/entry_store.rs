use chrono::NaiveDate;
use diary_core::{
    AttachmentDuration, Entry, EntryDraft, EntryStore, Happiness, StoreError,
};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn full_entry(date: NaiveDate) -> Entry {
    Entry::from_draft(
        date,
        EntryDraft {
            summary: Some("Walked along the ocean, then dinner.".to_string()),
            happiness: Some(Happiness::new(4.5).unwrap()),
            attachment: Some(AttachmentDuration::parse("0:12:30").unwrap()),
            people: vec!["john doe".to_string(), "Ann".to_string()],
        },
    )
}

#[test]
fn insert_then_get_returns_equal_entry() {
    let mut store = EntryStore::new();
    let entry = full_entry(ymd(2021, 2, 5));
    store.insert(entry.clone()).unwrap();

    let loaded = store.get(ymd(2021, 2, 5)).unwrap();
    assert_eq!(loaded, &entry);
    assert_eq!(loaded.weekday(), "Friday");
    assert_eq!(loaded.month(), "February");
    assert_eq!(loaded.people, vec!["John Doe".to_string(), "Ann".to_string()]);
}

#[test]
fn scenario_c_second_insert_for_same_date_is_rejected() {
    let mut store = EntryStore::new();
    store.insert(Entry::new(ymd(2021, 2, 5))).unwrap();

    let err = store.insert(full_entry(ymd(2021, 2, 5))).unwrap_err();
    assert_eq!(err, StoreError::DuplicateDate(ymd(2021, 2, 5)));
    assert_eq!(store.get(ymd(2021, 2, 5)).unwrap().summary, None);
    assert_eq!(store.len(), 1);
}

#[test]
fn from_entries_rejects_duplicates() {
    let err = EntryStore::from_entries(vec![
        Entry::new(ymd(2021, 1, 1)),
        Entry::new(ymd(2021, 1, 1)),
    ])
    .unwrap_err();
    assert_eq!(err, StoreError::DuplicateDate(ymd(2021, 1, 1)));
}

#[test]
fn mutations_preserve_date_and_other_fields() {
    let mut store = EntryStore::new();
    store.insert(full_entry(ymd(2021, 2, 5))).unwrap();

    store
        .mutate_summary(ymd(2021, 2, 5), |summary| {
            *summary = summary.as_ref().map(|text| text.replace("ocean", "lake"));
        })
        .unwrap();
    store
        .mutate_people(ymd(2021, 2, 5), |people| people.retain(|name| name != "Ann"))
        .unwrap();

    let entry = store.get(ymd(2021, 2, 5)).unwrap();
    assert_eq!(entry.date(), ymd(2021, 2, 5));
    assert_eq!(
        entry.summary.as_deref(),
        Some("Walked along the lake, then dinner.")
    );
    assert_eq!(entry.people, vec!["John Doe".to_string()]);
    assert_eq!(entry.happiness, Some(Happiness::new(4.5).unwrap()));
}

#[test]
fn mutate_summary_on_absent_date_is_not_found() {
    let mut store = EntryStore::new();
    let err = store
        .mutate_summary(ymd(2021, 2, 6), |summary| *summary = None)
        .unwrap_err();
    assert_eq!(err, StoreError::NotFound(ymd(2021, 2, 6)));
}

#[test]
fn entry_serialization_uses_expected_wire_fields() {
    let entry = full_entry(ymd(2021, 2, 5));

    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["date"], "2021-02-05");
    assert_eq!(json["happiness"], 4.5);
    assert_eq!(json["attachment"], "0:12:30");
    assert_eq!(json["people"][0], "John Doe");

    let decoded: Entry = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, entry);
}

#[test]
fn out_of_set_rating_fails_deserialization() {
    let json = serde_json::json!({
        "date": "2021-02-05",
        "summary": null,
        "happiness": 3.3,
        "attachment": null,
        "people": []
    });
    assert!(serde_json::from_value::<Entry>(json).is_err());
}

use chrono::NaiveDate;
use diary_core::{
    AttachmentDuration, CsvFileBackend, Entry, EntryBackend, EntryDraft, Happiness, PersistError,
    SqliteBackend, RECORD_FIELDS_HEADER,
};
use std::fs;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_entries() -> Vec<Entry> {
    vec![
        Entry::from_draft(
            ymd(2021, 1, 10),
            EntryDraft {
                summary: Some(
                    "This morning, I ran, fast.\nOverall, I'd say today was \"great\"".to_string(),
                ),
                happiness: Some(Happiness::new(4.5).unwrap()),
                attachment: Some(AttachmentDuration::parse("1:05:09").unwrap()),
                people: vec!["John Doe".to_string(), "Ann Lee".to_string()],
            },
        ),
        Entry::new(ymd(2021, 1, 11)),
        Entry::from_draft(
            ymd(2021, 1, 12),
            EntryDraft {
                summary: Some("plain".to_string()),
                happiness: Some(Happiness::new(1.0).unwrap()),
                attachment: None,
                people: Vec::new(),
            },
        ),
    ]
}

#[test]
fn csv_backend_round_trips_every_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("entries.csv");
    let entries = sample_entries();

    let mut backend = CsvFileBackend::new(&path);
    backend.rewrite_all(&mut entries.iter()).unwrap();

    let mut reloaded = CsvFileBackend::new(&path);
    assert_eq!(reloaded.load_all().unwrap(), entries);

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with(RECORD_FIELDS_HEADER));
    assert!(text.contains("2021-01-11,2021,January,Monday,,,,\n"));
}

#[test]
fn csv_append_creates_header_then_appends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("entries.csv");
    let entries = sample_entries();

    let mut backend = CsvFileBackend::new(&path);
    assert!(backend.load_all().unwrap().is_empty());
    for entry in &entries {
        backend.append_one(entry).unwrap();
    }

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.matches(RECORD_FIELDS_HEADER).count(), 1);
    assert_eq!(backend.load_all().unwrap(), entries);
}

#[test]
fn csv_failed_rewrite_keeps_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("entries.csv");
    let entries = sample_entries();
    let mut backend = CsvFileBackend::new(&path);
    backend.rewrite_all(&mut entries.iter()).unwrap();
    let before = fs::read_to_string(&path).unwrap();

    let mut broken = Entry::new(ymd(2021, 1, 13));
    broken.people = vec!["A;B".to_string()];
    let err = backend
        .rewrite_all(&mut entries.iter().chain(std::iter::once(&broken)))
        .unwrap_err();

    assert!(matches!(err, PersistError::UnencodablePerson(_)));
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn csv_rejects_inconsistent_weekday_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("entries.csv");
    fs::write(
        &path,
        format!("{RECORD_FIELDS_HEADER}2021-01-10,2021,January,Monday,,,,\n"),
    )
    .unwrap();

    let err = CsvFileBackend::new(&path).load_all().unwrap_err();
    match err {
        PersistError::CorruptRecord { location, message } => {
            assert_eq!(location, "line 2");
            assert!(message.contains("weekday"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn csv_rejects_malformed_dates_and_ratings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("entries.csv");

    let bad_date = format!("{RECORD_FIELDS_HEADER}10/01/2021,2021,January,Sunday,,,,\n");
    fs::write(&path, bad_date).unwrap();
    assert!(matches!(
        CsvFileBackend::new(&path).load_all().unwrap_err(),
        PersistError::MalformedDate { .. }
    ));

    let bad_rating = format!("{RECORD_FIELDS_HEADER}2021-01-10,2021,January,Sunday,,3.2,,\n");
    fs::write(&path, bad_rating).unwrap();
    assert!(matches!(
        CsvFileBackend::new(&path).load_all().unwrap_err(),
        PersistError::InvalidField { .. }
    ));
}

#[test]
fn csv_rejects_unknown_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("entries.csv");
    fs::write(&path, "date,summary\n2021-01-10,hi\n").unwrap();

    let err = CsvFileBackend::new(&path).load_all().unwrap_err();
    assert!(err.to_string().contains("unexpected header"));
}

#[test]
fn sqlite_backend_round_trips_every_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("diary.sqlite3");
    let entries = sample_entries();

    let mut backend = SqliteBackend::open(&path).unwrap();
    backend.append_one(&entries[1]).unwrap();
    backend.append_one(&entries[0]).unwrap();
    backend.append_one(&entries[2]).unwrap();
    drop(backend);

    let mut reopened = SqliteBackend::open(&path).unwrap();
    assert_eq!(reopened.load_all().unwrap(), entries);
}

#[test]
fn sqlite_rewrite_replaces_all_rows() {
    let mut backend = SqliteBackend::open_in_memory().unwrap();
    let entries = sample_entries();
    backend.rewrite_all(&mut entries.iter()).unwrap();
    backend.rewrite_all(&mut entries.iter().take(1)).unwrap();

    assert_eq!(backend.load_all().unwrap(), entries[..1].to_vec());
}

#[test]
fn sqlite_duplicate_append_is_rejected_by_primary_key() {
    let mut backend = SqliteBackend::open_in_memory().unwrap();
    let entry = Entry::new(ymd(2021, 2, 5));
    backend.append_one(&entry).unwrap();

    assert!(matches!(
        backend.append_one(&entry).unwrap_err(),
        PersistError::Db(_)
    ));
}

#[test]
fn csv_append_rewrites_file_with_new_record_last() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("entries.csv");
    let entries = sample_entries();
    let mut backend = CsvFileBackend::new(&path);
    backend.rewrite_all(&mut entries[..2].iter()).unwrap();
    let before = fs::read_to_string(&path).unwrap();

    backend.append_one(&entries[2]).unwrap();

    let after = fs::read_to_string(&path).unwrap();
    assert!(after.starts_with(&before));
    assert!(after.ends_with("2021-01-12,2021,January,Tuesday,plain,1.0,,\n"));
}

#[test]
fn csv_truncated_tail_is_reported_not_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("entries.csv");
    let mut backend = CsvFileBackend::new(&path);
    backend.rewrite_all(&mut sample_entries().iter()).unwrap();
    let full = fs::read_to_string(&path).unwrap();

    // Cut inside the multi-line quoted summary of the first record.
    let cut = full.find("fast.").unwrap();
    fs::write(&path, &full[..cut]).unwrap();
    let err = CsvFileBackend::new(&path).load_all().unwrap_err();
    assert!(matches!(
        &err,
        PersistError::CorruptRecord { location, message }
            if location == "line 2" && message.contains("truncated")
    ));

    // Cut right after a delimiter of the last record.
    let cut = full.rfind("plain,").unwrap() + "plain,".len();
    fs::write(&path, &full[..cut]).unwrap();
    let err = CsvFileBackend::new(&path).load_all().unwrap_err();
    assert!(err.to_string().contains("truncated"));

    // Appending after a truncated tail is refused and leaves the file as is.
    let mut backend = CsvFileBackend::new(&path);
    assert!(backend.append_one(&Entry::new(ymd(2021, 1, 20))).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), full[..cut]);
}

//! Report export: year statistics and search results written as delimited
//! text or JSON.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use diary_core::{format_date, CsvFileBackend, Entry, EntryBackend, HappinessStat, YearStats};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

const STATS_HEADER: &str = "section,rank,label,value,count";

/// Writes `stats` to `out`.
///
/// Delimited output has one row per ranked month, weekday and person, in
/// rank order. Months and weekdays without ratings carry an empty value.
pub fn write_year_stats<W: Write>(
    stats: &YearStats,
    format: ExportFormat,
    mut out: W,
) -> Result<()> {
    match format {
        ExportFormat::Json => serde_json::to_writer_pretty(&mut out, stats)?,
        ExportFormat::Csv => {
            writeln!(out, "{STATS_HEADER}")?;
            write_ranked(&mut out, "month", &stats.monthly_happiness)?;
            write_ranked(&mut out, "weekday", &stats.weekday_happiness)?;
            for (rank, person) in stats.people_mentions.iter().enumerate() {
                writeln!(out, "people,{},{},,{}", rank + 1, quote(&person.name), person.count)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn write_ranked<W: Write>(out: &mut W, section: &str, ranked: &[HappinessStat]) -> Result<()> {
    for (rank, stat) in ranked.iter().enumerate() {
        let value = stat.mean.value().map(|mean| format!("{mean:.2}")).unwrap_or_default();
        writeln!(
            out,
            "{section},{},{},{value},{}",
            rank + 1,
            stat.label,
            stat.rated_entries
        )?;
    }
    Ok(())
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Writes `stats` to `<dir>/stats_<year>.<ext>` and returns the path.
pub fn export_year_stats(stats: &YearStats, format: ExportFormat, dir: &Path) -> Result<PathBuf> {
    let path = target_path(dir, &format!("stats_{}", stats.year), format)?;
    let file =
        fs::File::create(&path).with_context(|| format!("cannot create `{}`", path.display()))?;
    write_year_stats(stats, format, BufWriter::new(file))?;
    Ok(path)
}

/// Writes matching entries to `<dir>/<stem>.<ext>` and returns the path.
///
/// Delimited output uses the same record layout as the diary file, so an
/// export can be opened as a diary of its own.
pub fn export_entries(
    entries: &[&Entry],
    stem: &str,
    format: ExportFormat,
    dir: &Path,
) -> Result<PathBuf> {
    let path = target_path(dir, stem, format)?;
    match format {
        ExportFormat::Csv => CsvFileBackend::new(&path)
            .rewrite_all(&mut entries.iter().copied())
            .with_context(|| format!("cannot export to `{}`", path.display()))?,
        ExportFormat::Json => {
            let file = fs::File::create(&path)
                .with_context(|| format!("cannot create `{}`", path.display()))?;
            let mut out = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut out, entries)?;
            out.flush()?;
        }
    }
    Ok(path)
}

/// File stem for search results, e.g. `search_keyword_beach`.
pub fn search_stem(kind: &str, term: &str) -> String {
    let slug = term
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' {
                ch.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect::<String>();
    format!("search_{kind}_{slug}")
}

fn target_path(dir: &Path, stem: &str, format: ExportFormat) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("cannot create `{}`", dir.display()))?;
    Ok(dir.join(format!("{stem}.{}", format.extension())))
}

/// One-line rendering used by `show` and `search`.
pub fn entry_line(entry: &Entry) -> String {
    let rating = entry
        .happiness
        .map(|h| h.to_string())
        .unwrap_or_else(|| "-".to_string());
    let first_line = entry
        .summary
        .as_deref()
        .and_then(|text| text.lines().next())
        .unwrap_or("");
    format!(
        "{} {:<9} [{rating}] {first_line}",
        format_date(entry.date()),
        entry.weekday()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use diary_core::{aggregate_year, CsvFileBackend, EntryDraft, Happiness};

    fn entries() -> Vec<Entry> {
        let rated = |d: u32, rating: f64, people: &[&str]| {
            Entry::from_draft(
                NaiveDate::from_ymd_opt(2021, 1, d).unwrap(),
                EntryDraft {
                    summary: Some(format!("day {d}, fine")),
                    happiness: Some(Happiness::new(rating).unwrap()),
                    attachment: None,
                    people: people.iter().map(|p| p.to_string()).collect(),
                },
            )
        };
        vec![rated(4, 3.0, &["Ann"]), rated(5, 4.0, &["ann", "Doe, Jon"])]
    }

    #[test]
    fn csv_stats_rank_rows_with_empty_value_for_no_data() {
        let entries = entries();
        let stats = aggregate_year(2021, &entries);
        let mut out = Vec::new();
        write_year_stats(&stats, ExportFormat::Csv, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines = text.lines().collect::<Vec<_>>();

        assert_eq!(lines[0], STATS_HEADER);
        assert_eq!(lines[1], "month,1,January,3.50,2");
        assert_eq!(lines[2], "month,2,February,,0");
        assert!(lines.contains(&"people,1,Ann,,2"));
        assert!(lines.contains(&"people,2,\"Doe, Jon\",,1"));
        assert_eq!(lines.len(), 1 + 12 + 7 + 2);
    }

    #[test]
    fn json_stats_use_null_for_no_data() {
        let entries = entries();
        let stats = aggregate_year(2021, &entries);
        let mut out = Vec::new();
        write_year_stats(&stats, ExportFormat::Json, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["year"], 2021);
        assert_eq!(value["monthly_happiness"][0]["mean"], 3.5);
        assert!(value["monthly_happiness"][1]["mean"].is_null());
    }

    #[test]
    fn entry_exports_land_in_target_dir() {
        let dir = tempfile::tempdir().unwrap();
        let entries = entries();
        let refs = entries.iter().collect::<Vec<_>>();

        let stem = "search_person_ann";
        let csv = export_entries(&refs, stem, ExportFormat::Csv, dir.path()).unwrap();
        assert_eq!(csv, dir.path().join("search_person_ann.csv"));
        assert_eq!(CsvFileBackend::new(&csv).load_all().unwrap(), entries);

        let json = export_entries(&refs, stem, ExportFormat::Json, dir.path()).unwrap();
        let text = fs::read_to_string(json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn search_stems_are_file_safe() {
        assert_eq!(search_stem("keyword", "Beach Day!"), "search_keyword_beach_day_");
        assert_eq!(search_stem("date", "2021-01"), "search_date_2021-01");
    }
}

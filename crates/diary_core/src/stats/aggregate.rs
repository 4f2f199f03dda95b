//! Year aggregation and ranking.
//!
//! # Responsibility
//! - Compute mean happiness per month and per weekday for one year.
//! - Tally people mentions with case-insensitive identity.
//! - Rank every summary with a total, reproducible order.
//!
//! # Invariants
//! - All twelve months and all seven weekdays are always present.
//! - Unrated entries never contribute to a mean, not even to its denominator.
//! - A bucket without ratings is `MeanHappiness::NoData`, never `0` or `NaN`.
//! - Ranking: value descending, `NoData` last, ties in natural key order
//!   (calendar months, Sunday-first weekdays, case-insensitive names).

use crate::calendar::{weekday_index, MONTHS, WEEKDAYS};
use crate::model::entry::{canonical_person_name, Entry};
use chrono::Datelike;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Mean rating of a bucket, or an explicit marker when nothing was rated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MeanHappiness {
    Mean(f64),
    NoData,
}

impl MeanHappiness {
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Mean(value) => Some(value),
            Self::NoData => None,
        }
    }

    pub fn is_no_data(self) -> bool {
        matches!(self, Self::NoData)
    }

    /// Ranking order: higher means first, `NoData` after every number.
    pub fn rank_cmp(self, other: Self) -> Ordering {
        match (self, other) {
            (Self::Mean(a), Self::Mean(b)) => b.total_cmp(&a),
            (Self::Mean(_), Self::NoData) => Ordering::Less,
            (Self::NoData, Self::Mean(_)) => Ordering::Greater,
            (Self::NoData, Self::NoData) => Ordering::Equal,
        }
    }
}

/// Mean happiness for one month or weekday.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HappinessStat {
    pub label: &'static str,
    pub mean: MeanHappiness,
    /// Number of entries in the bucket that carried a rating.
    pub rated_entries: usize,
}

/// Mention count for one person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonMentions {
    pub name: String,
    pub count: usize,
}

/// Ranked statistics for one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearStats {
    pub year: i32,
    pub entry_count: usize,
    pub rated_count: usize,
    pub overall_happiness: MeanHappiness,
    /// Twelve months, ranked.
    pub monthly_happiness: Vec<HappinessStat>,
    /// Seven weekdays, ranked.
    pub weekday_happiness: Vec<HappinessStat>,
    /// Everyone mentioned this year, ranked.
    pub people_mentions: Vec<PersonMentions>,
}

impl YearStats {
    /// Looks up a month by name, case-insensitively.
    pub fn month(&self, name: &str) -> Option<&HappinessStat> {
        find_label(&self.monthly_happiness, name)
    }

    /// Looks up a weekday by name, case-insensitively.
    pub fn weekday(&self, name: &str) -> Option<&HappinessStat> {
        find_label(&self.weekday_happiness, name)
    }

    /// The `n` most mentioned people.
    pub fn top_people(&self, n: usize) -> &[PersonMentions] {
        &self.people_mentions[..n.min(self.people_mentions.len())]
    }

    /// Mention count for `name` after canonicalization.
    pub fn mentions_of(&self, name: &str) -> usize {
        let Some(canonical) = canonical_person_name(name) else {
            return 0;
        };
        self.people_mentions
            .iter()
            .find(|person| person.name == canonical)
            .map_or(0, |person| person.count)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct RatingTally {
    sum: f64,
    count: usize,
}

impl RatingTally {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(self) -> MeanHappiness {
        if self.count == 0 {
            MeanHappiness::NoData
        } else {
            MeanHappiness::Mean(self.sum / self.count as f64)
        }
    }
}

/// Aggregates the entries of `year` into ranked statistics.
///
/// Entries dated outside `year` are skipped, so a whole-store scan is a
/// valid input.
pub fn aggregate_year<'a>(year: i32, entries: impl IntoIterator<Item = &'a Entry>) -> YearStats {
    let mut months = [RatingTally::default(); 12];
    let mut weekdays = [RatingTally::default(); 7];
    let mut overall = RatingTally::default();
    let mut mentions: HashMap<String, usize> = HashMap::new();
    let mut entry_count = 0;

    for entry in entries.into_iter().filter(|entry| entry.year() == year) {
        entry_count += 1;

        if let Some(rating) = entry.happiness {
            let value = rating.value();
            months[entry.date().month0() as usize].add(value);
            weekdays[weekday_index(entry.date().weekday())].add(value);
            overall.add(value);
        }

        for name in entry.people.iter().filter_map(|name| canonical_person_name(name)) {
            *mentions.entry(name).or_insert(0) += 1;
        }
    }

    YearStats {
        year,
        entry_count,
        rated_count: overall.count,
        overall_happiness: overall.mean(),
        monthly_happiness: rank_buckets(&MONTHS, &months),
        weekday_happiness: rank_buckets(&WEEKDAYS, &weekdays),
        people_mentions: rank_people(mentions),
    }
}

fn rank_buckets(labels: &[&'static str], tallies: &[RatingTally]) -> Vec<HappinessStat> {
    let mut stats = labels
        .iter()
        .zip(tallies)
        .map(|(&label, tally)| HappinessStat {
            label,
            mean: tally.mean(),
            rated_entries: tally.count,
        })
        .collect::<Vec<_>>();
    // Stable sort: equal means keep the natural label order built above.
    stats.sort_by(|a, b| a.mean.rank_cmp(b.mean));
    stats
}

fn rank_people(mentions: HashMap<String, usize>) -> Vec<PersonMentions> {
    let mut people = mentions
        .into_iter()
        .map(|(name, count)| PersonMentions { name, count })
        .collect::<Vec<_>>();
    people.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.name.cmp(&b.name))
    });
    people
}

fn find_label<'s>(stats: &'s [HappinessStat], name: &str) -> Option<&'s HappinessStat> {
    let name = name.trim();
    stats
        .iter()
        .find(|stat| stat.label.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::{aggregate_year, MeanHappiness};
    use crate::model::entry::{Entry, Happiness};
    use chrono::NaiveDate;
    use std::cmp::Ordering;

    fn rated(y: i32, m: u32, d: u32, rating: f64) -> Entry {
        let mut entry = Entry::new(NaiveDate::from_ymd_opt(y, m, d).unwrap());
        entry.happiness = Some(Happiness::new(rating).unwrap());
        entry
    }

    #[test]
    fn no_data_ranks_after_any_mean() {
        assert_eq!(
            MeanHappiness::Mean(1.0).rank_cmp(MeanHappiness::NoData),
            Ordering::Less
        );
        assert_eq!(
            MeanHappiness::Mean(4.0).rank_cmp(MeanHappiness::Mean(2.0)),
            Ordering::Less
        );
    }

    #[test]
    fn unrated_entries_do_not_dilute_the_mean() {
        let entries = vec![
            rated(2021, 1, 4, 3.0),
            rated(2021, 1, 5, 4.0),
            Entry::new(NaiveDate::from_ymd_opt(2021, 1, 6).unwrap()),
        ];
        let stats = aggregate_year(2021, &entries);

        assert_eq!(stats.entry_count, 3);
        assert_eq!(stats.rated_count, 2);
        assert_eq!(stats.month("january").unwrap().mean, MeanHappiness::Mean(3.5));
        assert_eq!(stats.overall_happiness, MeanHappiness::Mean(3.5));
    }

    #[test]
    fn weekday_ties_fall_back_to_sunday_first_order() {
        // 2021-01-03 is a Sunday, 2021-01-09 a Saturday.
        let entries = vec![rated(2021, 1, 9, 4.0), rated(2021, 1, 3, 4.0)];
        let stats = aggregate_year(2021, &entries);
        let labels = stats
            .weekday_happiness
            .iter()
            .map(|stat| stat.label)
            .collect::<Vec<_>>();

        assert_eq!(
            labels,
            vec!["Sunday", "Saturday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
        );
    }
}

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::error::{QueryError, QueryResult};
use super::filter::filter_by_substring;
use super::model::{Field, FieldValue, Record, SalesField};

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// The first `n` records after a stable sort on `sort_field`.
///
/// Ties keep their input order. Missing values sort last in either direction.
/// `n` larger than the input returns everything.
pub fn top_n<'a, I>(
    records: I,
    sort_field: Field,
    n: usize,
    descending: bool,
) -> QueryResult<Vec<&'a Record>>
where
    I: IntoIterator<Item = &'a Record>,
{
    if n == 0 {
        return Err(QueryError::InvalidCount(n));
    }
    let mut sorted: Vec<&Record> = records.into_iter().collect();
    sorted.sort_by(|a, b| compare_field(a, b, sort_field, descending));
    sorted.truncate(n);
    Ok(sorted)
}

fn compare_field(a: &Record, b: &Record, field: Field, descending: bool) -> Ordering {
    let directed = |ord: Ordering| if descending { ord.reverse() } else { ord };
    if field.is_numeric() {
        match (a.numeric(field), b.numeric(field)) {
            (Some(x), Some(y)) => directed(x.total_cmp(&y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    } else {
        match (a.text(field), b.text(field)) {
            (Some(x), Some(y)) => directed(x.cmp(y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// The first `n` records in input order.
pub fn head<'a, I>(records: I, n: usize) -> QueryResult<Vec<&'a Record>>
where
    I: IntoIterator<Item = &'a Record>,
{
    if n == 0 {
        return Err(QueryError::InvalidCount(n));
    }
    Ok(records.into_iter().take(n).collect())
}

/// The record with the highest global sales; the earliest one on ties.
pub fn best_seller<'a, I>(records: I) -> QueryResult<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .fold(None, |best: Option<&Record>, rec| match best {
            Some(b) if b.sales_global >= rec.sales_global => Some(b),
            _ => Some(rec),
        })
        .ok_or(QueryError::EmptyDataset)
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Per-group sums produced by [`group_sum`].
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSum {
    pub key: FieldValue,
    /// Number of records in the group.
    pub count: usize,
    /// One sum per requested field, in request order.
    pub sums: Vec<f64>,
}

/// Partition by `group_field` and sum each of `sum_fields` per group.
///
/// Groups come out in first-seen order. Missing values form their own
/// [`FieldValue::Null`] group.
pub fn group_sum<'a, I>(records: I, group_field: Field, sum_fields: &[SalesField]) -> Vec<GroupSum>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut index: HashMap<FieldValue, usize> = HashMap::new();
    let mut groups: Vec<GroupSum> = Vec::new();

    for rec in records {
        let key = rec.value(group_field);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(GroupSum {
                key,
                count: 0,
                sums: vec![0.0; sum_fields.len()],
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.count += 1;
        for (sum, &field) in group.sums.iter_mut().zip(sum_fields) {
            *sum += rec.sales(field);
        }
    }
    groups
}

/// The `n` most frequent values of `field` with their counts.
///
/// Ties keep first-seen order. Missing values are not counted.
pub fn most_frequent<'a, I>(
    records: I,
    field: Field,
    n: usize,
) -> QueryResult<Vec<(FieldValue, usize)>>
where
    I: IntoIterator<Item = &'a Record>,
{
    if n == 0 {
        return Err(QueryError::InvalidCount(n));
    }
    let mut index: HashMap<FieldValue, usize> = HashMap::new();
    let mut counts: Vec<(FieldValue, usize)> = Vec::new();
    for rec in records {
        let value = rec.value(field);
        if value.is_null() {
            continue;
        }
        match index.get(&value) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(value.clone(), counts.len());
                counts.push((value, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(n);
    Ok(counts)
}

// ---------------------------------------------------------------------------
// Decades
// ---------------------------------------------------------------------------

/// Release-year bucket used by the regional distribution view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Decade {
    Before1990,
    Nineties,
    TwoThousands,
    TwentyTens,
}

impl Decade {
    pub const ALL: [Decade; 4] = [
        Decade::Before1990,
        Decade::Nineties,
        Decade::TwoThousands,
        Decade::TwentyTens,
    ];

    /// Classify a release year.
    ///
    /// 1990 itself lands in the `1991-2000` bucket. Saved outputs depend on
    /// this boundary, so it is kept as-is.
    pub fn of_year(year: i32) -> Self {
        if year < 1990 {
            Decade::Before1990
        } else if year <= 2000 {
            Decade::Nineties
        } else if year <= 2010 {
            Decade::TwoThousands
        } else {
            Decade::TwentyTens
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Decade::Before1990 => "before-1990",
            Decade::Nineties => "1991-2000",
            Decade::TwoThousands => "2001-2010",
            Decade::TwentyTens => "2011-2020",
        }
    }
}

impl fmt::Display for Decade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label of the decade bucket for `year`.
pub fn bucket_by_decade(year: i32) -> &'static str {
    Decade::of_year(year).label()
}

/// Records released in `decade`. Records with no year are excluded.
pub fn filter_by_decade<'a, I>(records: I, decade: Decade) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter(|rec| rec.year.is_some_and(|y| Decade::of_year(y) == decade))
        .collect()
}

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

/// Sales summed column by column. `Default` is the identity (all zeros).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RegionTotals {
    pub na: f64,
    pub eu: f64,
    pub jp: f64,
    pub other: f64,
    pub global: f64,
}

impl RegionTotals {
    pub fn get(&self, field: SalesField) -> f64 {
        match field {
            SalesField::Na => self.na,
            SalesField::Eu => self.eu,
            SalesField::Jp => self.jp,
            SalesField::Other => self.other,
            SalesField::Global => self.global,
        }
    }

    fn add(&mut self, rec: &Record) {
        self.na += rec.sales_na;
        self.eu += rec.sales_eu;
        self.jp += rec.sales_jp;
        self.other += rec.sales_other;
        self.global += rec.sales_global;
    }
}

pub fn region_totals<'a, I>(records: I) -> RegionTotals
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut totals = RegionTotals::default();
    for rec in records {
        totals.add(rec);
    }
    totals
}

/// Matches of a name search plus their summed sales.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<'a> {
    pub records: Vec<&'a Record>,
    pub totals: RegionTotals,
}

/// Case-insensitive substring search on `name`, with regional totals.
pub fn search<'a, I>(records: I, needle: &str) -> QueryResult<SearchResult<'a>>
where
    I: IntoIterator<Item = &'a Record>,
{
    let records = filter_by_substring(records, Field::Name, needle)?;
    let totals = region_totals(records.iter().copied());
    Ok(SearchResult { records, totals })
}

/// Records whose `sales_global` differs from the sum of the regions by more
/// than `tolerance`. The stored global figure is never corrected.
pub fn sales_discrepancies<'a, I>(records: I, tolerance: f64) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter(|rec| (rec.sales_global - rec.regional_sum()).abs() > tolerance)
        .collect()
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

/// Headline metrics for the dashboard front page.
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub records: usize,
    pub columns: usize,
    pub unique_titles: usize,
    pub earliest_year: Option<i32>,
    pub latest_year: Option<i32>,
    /// Mean global sales per record, in millions.
    pub mean_global_sales: f64,
    pub total_global_sales: f64,
    /// Publisher with the most records, and that count.
    pub top_publisher: Option<(String, usize)>,
}

pub fn overview<'a, I>(records: I) -> QueryResult<Overview>
where
    I: IntoIterator<Item = &'a Record>,
{
    let records: Vec<&Record> = records.into_iter().collect();
    if records.is_empty() {
        return Err(QueryError::EmptyDataset);
    }

    let unique_titles = records.iter().map(|r| r.name.as_str()).collect::<HashSet<_>>().len();
    let years = records.iter().filter_map(|r| r.year);
    let earliest_year = years.clone().min();
    let latest_year = years.max();
    let total_global_sales: f64 = records.iter().map(|r| r.sales_global).sum();
    let top_publisher = most_frequent(records.iter().copied(), Field::Publisher, 1)?
        .into_iter()
        .next()
        .map(|(value, count)| (value.to_string(), count));

    Ok(Overview {
        records: records.len(),
        columns: Field::ALL.len(),
        unique_titles,
        earliest_year,
        latest_year,
        mean_global_sales: total_global_sales / records.len() as f64,
        total_global_sales,
        top_publisher,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{record, regional};

    fn scenario() -> Vec<Record> {
        vec![
            record("A", Some("X"), Some(2001), 3.0),
            record("B", Some("X"), Some(2002), 1.0),
            record("C", Some("Y"), Some(2003), 5.0),
        ]
    }

    fn names(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn three_record_scenario() {
        let data = scenario();

        let groups = group_sum(&data, Field::Publisher, &[SalesField::Global]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, FieldValue::from("X"));
        assert_eq!(groups[0].sums, vec![4.0]);
        assert_eq!(groups[1].key, FieldValue::from("Y"));
        assert_eq!(groups[1].sums, vec![5.0]);

        let top = top_n(&data, Field::SalesGlobal, 1, true).unwrap();
        assert_eq!(names(&top), ["C"]);

        let freq = most_frequent(&data, Field::Publisher, 1).unwrap();
        assert_eq!(freq, vec![(FieldValue::from("X"), 2)]);
    }

    #[test]
    fn top_n_is_stable_and_idempotent() {
        let data = vec![
            record("first", None, None, 2.0),
            record("big", None, None, 9.0),
            record("second", None, None, 2.0),
            record("third", None, None, 2.0),
        ];
        let top = top_n(&data, Field::SalesGlobal, 3, true).unwrap();
        assert_eq!(names(&top), ["big", "first", "second"]);

        let again = top_n(top.iter().copied(), Field::SalesGlobal, 3, true).unwrap();
        assert_eq!(again, top);

        let ascending = top_n(&data, Field::SalesGlobal, 10, false).unwrap();
        assert_eq!(names(&ascending), ["first", "second", "third", "big"]);
    }

    #[test]
    fn top_n_puts_missing_last_and_rejects_zero() {
        let data = vec![
            record("unknown", None, None, 1.0),
            record("old", None, Some(1990), 1.0),
            record("new", None, Some(2010), 1.0),
        ];
        let by_year = top_n(&data, Field::Year, 3, true).unwrap();
        assert_eq!(names(&by_year), ["new", "old", "unknown"]);
        let by_year = top_n(&data, Field::Year, 3, false).unwrap();
        assert_eq!(names(&by_year), ["old", "new", "unknown"]);

        assert_eq!(top_n(&data, Field::Year, 0, true), Err(QueryError::InvalidCount(0)));
    }

    #[test]
    fn group_sum_conserves_totals() {
        let data = vec![
            regional("a", "Action", Some(2001), 1.1, 0.2, 0.3, 0.05),
            regional("b", "Sports", Some(2002), 4.1, 2.2, 0.1, 0.5),
            regional("c", "Action", None, 0.7, 0.6, 0.01, 0.02),
            regional("d", "Puzzle", Some(1989), 23.2, 2.26, 4.22, 0.58),
        ];
        let groups = group_sum(&data, Field::Genre, &[SalesField::Global]);
        let grouped: f64 = groups.iter().map(|g| g.sums[0]).sum();
        let direct: f64 = data.iter().map(|r| r.sales_global).sum();
        assert!((grouped - direct).abs() <= 1e-6 * direct.abs());
        assert_eq!(groups.iter().map(|g| g.count).sum::<usize>(), data.len());
    }

    #[test]
    fn group_sum_keeps_unknown_year_group() {
        let data = vec![
            record("a", None, Some(2001), 1.0),
            record("b", None, None, 2.0),
            record("c", None, Some(2001), 3.0),
            record("d", None, None, 4.0),
        ];
        let groups = group_sum(&data, Field::Year, &[SalesField::Global, SalesField::Na]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, FieldValue::from(2001));
        assert_eq!(groups[0].sums, vec![4.0, 0.0]);
        assert_eq!(groups[1].key, FieldValue::Null);
        assert_eq!(groups[1].count, 2);
        assert_eq!(groups[1].sums, vec![6.0, 0.0]);
    }

    #[test]
    fn decade_boundaries() {
        assert_eq!(bucket_by_decade(1990), "1991-2000");
        assert_eq!(bucket_by_decade(1989), "before-1990");
        assert_eq!(bucket_by_decade(2000), "1991-2000");
        assert_eq!(bucket_by_decade(2001), "2001-2010");
        assert_eq!(bucket_by_decade(2010), "2001-2010");
        assert_eq!(bucket_by_decade(2015), "2011-2020");
        assert_eq!(bucket_by_decade(1970), "before-1990");
        assert_eq!(bucket_by_decade(2035), "2011-2020");
    }

    #[test]
    fn decade_filter_drops_unknown_years() {
        let data = vec![
            record("a", None, Some(1990), 1.0),
            record("b", None, None, 1.0),
            record("c", None, Some(1995), 1.0),
        ];
        let hits = filter_by_decade(&data, Decade::Nineties);
        assert_eq!(names(&hits), ["a", "c"]);
        assert!(filter_by_decade(&data, Decade::Before1990).is_empty());
    }

    #[test]
    fn most_frequent_breaks_ties_by_first_seen() {
        let data = vec![
            record("a", Some("Sega"), None, 1.0),
            record("b", Some("Atari"), None, 1.0),
            record("c", None, None, 1.0),
            record("d", Some("Atari"), None, 1.0),
            record("e", Some("Sega"), None, 1.0),
            record("f", None, None, 1.0),
        ];
        let freq = most_frequent(&data, Field::Publisher, 5).unwrap();
        assert_eq!(
            freq,
            vec![(FieldValue::from("Sega"), 2), (FieldValue::from("Atari"), 2)]
        );
    }

    #[test]
    fn search_totals_matches() {
        let data = vec![
            regional("Pokemon Red", "RPG", Some(1996), 11.27, 8.89, 10.22, 1.0),
            regional("Tetris", "Puzzle", Some(1989), 23.2, 2.26, 4.22, 0.58),
            regional("Pokemon Gold", "RPG", Some(1999), 9.0, 6.18, 7.2, 0.71),
        ];
        let found = search(&data, "pokemon").unwrap();
        assert_eq!(found.records.len(), 2);
        assert!((found.totals.na - 20.27).abs() < 1e-9);
        assert!((found.totals.jp - 17.42).abs() < 1e-9);

        let none = search(&data, "zelda").unwrap();
        assert!(none.records.is_empty());
        assert_eq!(none.totals, RegionTotals::default());
    }

    #[test]
    fn empty_inputs_return_identities() {
        let data: Vec<Record> = Vec::new();
        assert!(top_n(&data, Field::SalesGlobal, 5, true).unwrap().is_empty());
        assert!(group_sum(&data, Field::Genre, &[SalesField::Global]).is_empty());
        assert!(most_frequent(&data, Field::Genre, 3).unwrap().is_empty());
        assert_eq!(region_totals(&data), RegionTotals::default());
        assert_eq!(overview(&data), Err(QueryError::EmptyDataset));
        assert_eq!(best_seller(&data), Err(QueryError::EmptyDataset));
    }

    #[test]
    fn best_seller_prefers_earliest_on_ties() {
        let data = vec![
            record("a", None, None, 1.0),
            record("b", None, None, 7.0),
            record("c", None, None, 7.0),
        ];
        assert_eq!(best_seller(&data).unwrap().name, "b");
    }

    #[test]
    fn discrepancies_compare_against_regions() {
        let mut off = regional("off", "Action", None, 1.0, 1.0, 1.0, 1.0);
        off.sales_global = 4.5;
        let data = vec![regional("ok", "Action", None, 1.0, 1.0, 1.0, 1.01), off];
        let flagged = sales_discrepancies(&data, 0.05);
        assert_eq!(names(&flagged), ["off"]);
    }

    #[test]
    fn overview_metrics() {
        let mut data = scenario();
        data.push(record("A", Some("Y"), None, 3.0));
        let ov = overview(&data).unwrap();
        assert_eq!(ov.records, 4);
        assert_eq!(ov.columns, 11);
        assert_eq!(ov.unique_titles, 3);
        assert_eq!(ov.earliest_year, Some(2001));
        assert_eq!(ov.latest_year, Some(2003));
        assert!((ov.mean_global_sales - 3.0).abs() < 1e-9);
        assert_eq!(ov.top_publisher, Some(("X".to_string(), 2)));
    }

    #[test]
    fn group_sum_merges_negative_zero_sales() {
        let text = "\
Rank,Name,Platform,Year,Genre,Publisher,NA_Sales,EU_Sales,JP_Sales,Other_Sales,Global_Sales
1,A,Wii,2006,Sports,Nintendo,0,1.00,0,0,1.00
2,B,Wii,2007,Sports,Nintendo,-0,2.00,0,0,2.00
";
        let ds = crate::data::loader::load_csv(text.as_bytes()).unwrap();
        let groups = group_sum(&ds.records, Field::SalesNa, &[SalesField::Global]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].count, 2);
        assert!((groups[0].sums[0] - 3.0).abs() < 1e-9);
        assert_eq!(ds.distinct_values(Field::SalesNa).len(), groups.len());
    }
}

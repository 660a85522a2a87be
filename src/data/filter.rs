use std::collections::{BTreeMap, BTreeSet};

use super::error::{QueryError, QueryResult};
use super::model::{Field, FieldValue, Record, SalesField};

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------
//
// Every filter takes any iterator of `&Record` and returns the matching
// records in their original relative order. Results borrow from the input, so
// filters compose without copying and the dataset is never touched.

/// Records where `field == value` (exact, case-sensitive).
pub fn filter_by_equality<'a, I>(records: I, field: Field, value: &FieldValue) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter(|rec| rec.value(field) == *value)
        .collect()
}

/// Records whose text `field` contains `needle`, ignoring case.
///
/// An empty needle matches every record that has a value. A missing value
/// (unknown publisher) never matches.
pub fn filter_by_substring<'a, I>(
    records: I,
    field: Field,
    needle: &str,
) -> QueryResult<Vec<&'a Record>>
where
    I: IntoIterator<Item = &'a Record>,
{
    if !field.is_text() {
        return Err(QueryError::FieldKind {
            field,
            expected: "text",
        });
    }
    let needle = needle.to_lowercase();
    Ok(records
        .into_iter()
        .filter(|rec| {
            rec.text(field)
                .is_some_and(|text| text.to_lowercase().contains(&needle))
        })
        .collect())
}

/// How [`filter_by_threshold`] combines several fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdMode {
    /// At least one field exceeds the minimum.
    #[default]
    Any,
    /// Every field exceeds the minimum.
    All,
}

/// Records whose sales `fields` exceed `min_value` (strictly), combined per `mode`.
///
/// With no fields, `Any` matches nothing and `All` matches everything.
pub fn filter_by_threshold<'a, I>(
    records: I,
    fields: &[SalesField],
    min_value: f64,
    mode: ThresholdMode,
) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter(|rec| {
            let mut above = fields.iter().map(|&f| rec.sales(f) > min_value);
            match mode {
                ThresholdMode::Any => above.any(|b| b),
                ThresholdMode::All => above.all(|b| b),
            }
        })
        .collect()
}

/// Records with `low <= field <= high`. Missing values never match.
pub fn filter_by_range<'a, I>(
    records: I,
    field: Field,
    low: f64,
    high: f64,
) -> QueryResult<Vec<&'a Record>>
where
    I: IntoIterator<Item = &'a Record>,
{
    if !field.is_numeric() {
        return Err(QueryError::FieldKind {
            field,
            expected: "numeric",
        });
    }
    // Also rejects NaN bounds.
    if !(low <= high) {
        return Err(QueryError::InvalidRange { low, high });
    }
    Ok(records
        .into_iter()
        .filter(|rec| rec.numeric(field).is_some_and(|v| low <= v && v <= high))
        .collect())
}

// ---------------------------------------------------------------------------
// Multi-select: which values are selected per column
// ---------------------------------------------------------------------------

/// Per-column selection: maps column → set of accepted values.
/// A column that is absent or has an empty set is unconstrained.
pub type Selection = BTreeMap<Field, BTreeSet<FieldValue>>;

/// Records that pass every non-empty column selection.
pub fn filter_by_selection<'a, I>(records: I, selection: &Selection) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let active: Vec<(&Field, &BTreeSet<FieldValue>)> =
        selection.iter().filter(|(_, vals)| !vals.is_empty()).collect();
    records
        .into_iter()
        .filter(|rec| {
            active
                .iter()
                .all(|(field, accepted)| accepted.contains(&rec.value(**field)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{record, regional};

    fn sample() -> Vec<Record> {
        vec![
            record("Super Mario Bros.", Some("Nintendo"), Some(1985), 40.24),
            record("Wii Sports", Some("Nintendo"), Some(2006), 82.74),
            record("Grand Theft Auto V", Some("Take-Two Interactive"), Some(2013), 21.4),
            record("Mystery Game", None, None, 0.5),
            record("Mario Kart Wii", Some("Nintendo"), Some(2008), 35.82),
        ]
    }

    #[test]
    fn equality_keeps_order_and_returns_empty_on_miss() {
        let data = sample();
        let hits = filter_by_equality(&data, Field::Publisher, &FieldValue::from("Nintendo"));
        let names: Vec<&str> = hits.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Super Mario Bros.", "Wii Sports", "Mario Kart Wii"]);

        let lowercase = FieldValue::from("nintendo");
        assert!(filter_by_equality(&data, Field::Publisher, &lowercase).is_empty());
    }

    #[test]
    fn equality_partitions_the_input() {
        let data = sample();
        let mut distinct: Vec<FieldValue> = data.iter().map(|r| r.value(Field::Year)).collect();
        distinct.sort();
        distinct.dedup();

        let mut seen = 0;
        for value in &distinct {
            let part = filter_by_equality(&data, Field::Year, value);
            assert!(part.iter().all(|r| r.value(Field::Year) == *value));
            seen += part.len();
        }
        assert_eq!(seen, data.len());
    }

    #[test]
    fn substring_ignores_case_and_skips_missing() {
        let data = sample();
        let hits = filter_by_substring(&data, Field::Name, "MARIO").unwrap();
        assert_eq!(hits.len(), 2);

        let all = filter_by_substring(&data, Field::Name, "").unwrap();
        assert_eq!(all.len(), data.len());

        // The record with no publisher is not a wildcard match.
        let publishers = filter_by_substring(&data, Field::Publisher, "").unwrap();
        assert_eq!(publishers.len(), 4);

        assert!(matches!(
            filter_by_substring(&data, Field::Year, "19"),
            Err(QueryError::FieldKind { field: Field::Year, .. })
        ));
    }

    #[test]
    fn threshold_is_strict_and_all_is_subset_of_any() {
        let data = vec![
            regional("a", "Action", Some(2000), 10.0, 0.0, 0.0, 0.0),
            regional("b", "Action", Some(2000), 10.5, 3.0, 0.0, 0.0),
            regional("c", "Action", Some(2000), 11.0, 12.0, 0.0, 0.0),
            regional("d", "Action", Some(2000), 1.0, 10.01, 0.0, 0.0),
        ];
        let fields = [SalesField::Na, SalesField::Eu];

        let any = filter_by_threshold(&data, &fields, 10.0, ThresholdMode::Any);
        let any_names: Vec<&str> = any.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(any_names, ["b", "c", "d"]);

        let all = filter_by_threshold(&data, &fields, 10.0, ThresholdMode::All);
        let all_names: Vec<&str> = all.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(all_names, ["c"]);
        assert!(all.iter().all(|r| any.contains(r)));
    }

    #[test]
    fn threshold_with_no_fields() {
        let data = sample();
        assert!(filter_by_threshold(&data, &[], 0.0, ThresholdMode::Any).is_empty());
        assert_eq!(filter_by_threshold(&data, &[], 0.0, ThresholdMode::All).len(), data.len());
    }

    #[test]
    fn range_is_inclusive_and_excludes_missing() {
        let data = sample();
        let hits = filter_by_range(&data, Field::Year, 1985.0, 2008.0).unwrap();
        let names: Vec<&str> = hits.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Super Mario Bros.", "Wii Sports", "Mario Kart Wii"]);

        let wide = filter_by_range(&data, Field::Year, f64::MIN, f64::MAX).unwrap();
        assert_eq!(wide.len(), 4);
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        let data = sample();
        assert_eq!(
            filter_by_range(&data, Field::Year, 2010.0, 2000.0),
            Err(QueryError::InvalidRange {
                low: 2010.0,
                high: 2000.0
            })
        );
        assert!(filter_by_range(&data, Field::Genre, 0.0, 1.0).is_err());
    }

    #[test]
    fn filters_compose() {
        let data = sample();
        let nintendo = filter_by_substring(&data, Field::Publisher, "nintendo").unwrap();
        let recent =
            filter_by_range(nintendo.iter().copied(), Field::Year, 2000.0, 2020.0).unwrap();
        assert_eq!(recent.len(), 2);
    }

    #[test]
    fn empty_selection_is_unconstrained() {
        let data = sample();
        let mut selection = Selection::new();
        selection.insert(Field::Publisher, BTreeSet::new());
        assert_eq!(filter_by_selection(&data, &selection).len(), data.len());

        selection
            .entry(Field::Year)
            .or_default()
            .extend([FieldValue::from(1985), FieldValue::Null]);
        let hits = filter_by_selection(&data, &selection);
        let names: Vec<&str> = hits.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Super Mario Bros.", "Mystery Game"]);
    }
}

//! Query engine: owns the loaded dataset and answers [`Request`]s.
//!
//! Presentation shells never touch the filter / aggregate functions directly;
//! they build a `Request`, call [`QueryEngine::execute`] and render the
//! [`Response`]. The same request against the same dataset always produces an
//! equal response.

use std::sync::Arc;

use crate::data::aggregate::{
    Decade, GroupSum, Overview, RegionTotals, best_seller, filter_by_decade, group_sum, head,
    most_frequent, overview, region_totals, sales_discrepancies, search, top_n,
};
use crate::data::error::QueryResult;
use crate::data::filter::{
    Selection, ThresholdMode, filter_by_equality, filter_by_range, filter_by_selection,
    filter_by_substring, filter_by_threshold,
};
use crate::data::model::{Dataset, Field, FieldValue, Record, SalesField};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// One user-facing question. Each variant maps to a fixed composition of
/// filter / aggregate operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Headline metrics.
    Overview,
    /// Titles released in `year`, with their summed global sales.
    ReleasesInYear { year: i32 },
    /// Publisher name contains `needle` (case-insensitive).
    ByPublisher { needle: String },
    /// Any regional sales column above `min`.
    AboveRegionalSales { min: f64 },
    /// A publisher's titles in one region, optionally above a threshold there.
    RegionalByPublisher {
        region: SalesField,
        publisher: String,
        min: Option<f64>,
    },
    /// Total global sales, or the titles above `min` when given.
    GlobalSales { min: Option<f64> },
    /// Best sellers by `by`, after the multi-select filter.
    TopSellers {
        n: usize,
        by: SalesField,
        selection: Selection,
    },
    /// The single best-selling title worldwide.
    BestSeller,
    /// Every release whose name is exactly `name`.
    GameDetails { name: String },
    /// All records, or the first `limit`.
    ListGames { limit: Option<usize> },
    /// Regional totals for one decade bucket.
    RegionsByDecade { decade: Decade },
    /// NA / EU / JP sales per genre for releases in `from..=to`.
    GenrePopularity { from: i32, to: i32 },
    /// Global sales per release year.
    SalesTrend,
    /// Name search with regional totals.
    Search { needle: String },
    /// Most common values of a column.
    MostFrequent { field: Field, n: usize },
    /// Records whose global figure disagrees with the regional sum.
    Discrepancies { tolerance: f64 },
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Owned result of a request, so shells can keep it across frames.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Overview(Overview),
    Records { records: Vec<Record>, global_total: f64 },
    Record(Record),
    Total(f64),
    Groups {
        group_field: Field,
        fields: Vec<SalesField>,
        groups: Vec<GroupSum>,
    },
    Regions { label: String, totals: RegionTotals },
    Search { records: Vec<Record>, totals: RegionTotals },
    Frequencies { field: Field, counts: Vec<(FieldValue, usize)> },
}

impl Response {
    fn records(view: Vec<&Record>) -> Self {
        let global_total = view.iter().map(|r| r.sales_global).sum();
        Response::Records {
            records: view.into_iter().cloned().collect(),
            global_total,
        }
    }

    /// Row-shaped part of the response, if any (used for export).
    pub fn rows(&self) -> &[Record] {
        match self {
            Response::Records { records, .. } | Response::Search { records, .. } => records,
            Response::Record(rec) => std::slice::from_ref(rec),
            _ => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Read-only query front for one loaded [`Dataset`].
#[derive(Debug, Clone)]
pub struct QueryEngine {
    dataset: Arc<Dataset>,
}

impl QueryEngine {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset: Arc::new(dataset),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn records(&self) -> &[Record] {
        &self.dataset.records
    }

    /// Log how many records disagree with their regional sum by more than
    /// `tolerance`. Returns the count.
    pub fn report_discrepancies(&self, tolerance: f64) -> usize {
        let count = sales_discrepancies(self.records(), tolerance).len();
        if count > 0 {
            log::warn!(
                "{count} records have Global_Sales off the regional sum by more than {tolerance}"
            );
        }
        count
    }

    /// Answer one request.
    pub fn execute(&self, request: &Request) -> QueryResult<Response> {
        log::debug!("executing {request:?}");
        let all = self.records();

        let response = match request {
            Request::Overview => Response::Overview(overview(all)?),

            Request::ReleasesInYear { year } => {
                Response::records(filter_by_equality(all, Field::Year, &FieldValue::from(*year)))
            }

            Request::ByPublisher { needle } => {
                Response::records(filter_by_substring(all, Field::Publisher, needle)?)
            }

            Request::AboveRegionalSales { min } => Response::records(filter_by_threshold(
                all,
                &SalesField::REGIONS,
                *min,
                ThresholdMode::Any,
            )),

            Request::RegionalByPublisher { region, publisher, min } => {
                let view = filter_by_substring(all, Field::Publisher, publisher)?;
                let view = match min {
                    Some(min) => filter_by_threshold(view, &[*region], *min, ThresholdMode::Any),
                    None => view,
                };
                Response::records(view)
            }

            Request::GlobalSales { min: None } => Response::Total(region_totals(all).global),
            Request::GlobalSales { min: Some(min) } => Response::records(filter_by_threshold(
                all,
                &[SalesField::Global],
                *min,
                ThresholdMode::Any,
            )),

            Request::TopSellers { n, by, selection } => {
                let view = filter_by_selection(all, selection);
                Response::records(top_n(view, by.field(), *n, true)?)
            }

            Request::BestSeller => Response::Record(best_seller(all)?.clone()),

            Request::GameDetails { name } => {
                let name = FieldValue::from(name.as_str());
                Response::records(filter_by_equality(all, Field::Name, &name))
            }

            Request::ListGames { limit: None } => Response::records(all.iter().collect()),
            Request::ListGames { limit: Some(n) } => Response::records(head(all, *n)?),

            Request::RegionsByDecade { decade } => Response::Regions {
                label: decade.label().to_string(),
                totals: region_totals(filter_by_decade(all, *decade)),
            },

            Request::GenrePopularity { from, to } => {
                let fields = vec![SalesField::Na, SalesField::Eu, SalesField::Jp];
                let view = filter_by_range(all, Field::Year, f64::from(*from), f64::from(*to))?;
                Response::Groups {
                    group_field: Field::Genre,
                    groups: group_sum(view, Field::Genre, &fields),
                    fields,
                }
            }

            Request::SalesTrend => {
                let mut groups = group_sum(all, Field::Year, &[SalesField::Global]);
                // Chronological, unknown year last.
                groups.sort_by(|a, b| (a.key.is_null(), &a.key).cmp(&(b.key.is_null(), &b.key)));
                Response::Groups {
                    group_field: Field::Year,
                    fields: vec![SalesField::Global],
                    groups,
                }
            }

            Request::Search { needle } => {
                let found = search(all, needle)?;
                Response::Search {
                    records: found.records.into_iter().cloned().collect(),
                    totals: found.totals,
                }
            }

            Request::MostFrequent { field, n } => Response::Frequencies {
                field: *field,
                counts: most_frequent(all, *field, *n)?,
            },

            Request::Discrepancies { tolerance } => {
                Response::records(sales_discrepancies(all, *tolerance))
            }
        };
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::data::error::QueryError;
    use crate::data::model::fixtures::{record, regional};

    fn engine() -> QueryEngine {
        let mut recs = vec![
            regional("Wii Sports", "Sports", Some(2006), 41.49, 29.02, 3.77, 8.46),
            regional("Tetris", "Puzzle", Some(1989), 23.2, 2.26, 4.22, 0.58),
            regional("Pokemon Red", "Role-Playing", Some(1996), 11.27, 8.89, 10.22, 1.0),
            regional("Wii Fit", "Sports", Some(2007), 8.92, 8.03, 3.6, 2.15),
            regional("Madden NFL 2004", "Sports", None, 4.26, 0.26, 0.01, 0.71),
        ];
        recs[2].publisher = Some("The Pokemon Company".to_string());
        recs[4].publisher = Some("Electronic Arts".to_string());
        recs[1].platform = "GB".to_string();
        QueryEngine::new(Dataset::from_records(recs))
    }

    fn names(response: &Response) -> Vec<&str> {
        response.rows().iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn execution_is_deterministic() {
        let engine = engine();
        let requests = [
            Request::SalesTrend,
            Request::Search {
                needle: "wii".to_string(),
            },
            Request::MostFrequent {
                field: Field::Genre,
                n: 2,
            },
        ];
        for request in &requests {
            assert_eq!(engine.execute(request).unwrap(), engine.execute(request).unwrap());
        }
    }

    #[test]
    fn releases_in_year_totals_global() {
        let response = engine().execute(&Request::ReleasesInYear { year: 2006 }).unwrap();
        match response {
            Response::Records { records, global_total } => {
                assert_eq!(records.len(), 1);
                assert!((global_total - 82.74).abs() < 1e-9);
            }
            other => panic!("unexpected response {other:?}"),
        }

        let none = engine().execute(&Request::ReleasesInYear { year: 1970 }).unwrap();
        assert!(none.rows().is_empty());
    }

    #[test]
    fn regional_by_publisher_applies_optional_threshold() {
        let engine = engine();
        let all = engine
            .execute(&Request::RegionalByPublisher {
                region: SalesField::Eu,
                publisher: "nintendo".to_string(),
                min: None,
            })
            .unwrap();
        assert_eq!(names(&all), ["Wii Sports", "Tetris", "Wii Fit"]);

        let above = engine
            .execute(&Request::RegionalByPublisher {
                region: SalesField::Eu,
                publisher: "nintendo".to_string(),
                min: Some(8.03),
            })
            .unwrap();
        assert_eq!(names(&above), ["Wii Sports"]);
    }

    #[test]
    fn global_sales_total_or_filtered() {
        let engine = engine();
        let response = engine.execute(&Request::GlobalSales { min: None }).unwrap();
        let Response::Total(total) = response else {
            panic!("expected a total");
        };
        let direct: f64 = engine.records().iter().map(|r| r.sales_global).sum();
        assert!((total - direct).abs() < 1e-9);

        let above = engine.execute(&Request::GlobalSales { min: Some(30.0) }).unwrap();
        assert_eq!(names(&above), ["Wii Sports", "Tetris", "Pokemon Red"]);
    }

    #[test]
    fn top_sellers_respects_selection() {
        let engine = engine();
        let mut selection = Selection::new();
        selection.insert(Field::Genre, BTreeSet::from([FieldValue::from("Sports")]));
        let top = engine
            .execute(&Request::TopSellers {
                n: 2,
                by: SalesField::Jp,
                selection,
            })
            .unwrap();
        assert_eq!(names(&top), ["Wii Sports", "Wii Fit"]);

        let err = engine.execute(&Request::TopSellers {
            n: 0,
            by: SalesField::Global,
            selection: Selection::new(),
        });
        assert_eq!(err, Err(QueryError::InvalidCount(0)));
    }

    #[test]
    fn genre_popularity_groups_by_first_seen() {
        let engine = engine();
        let response = engine.execute(&Request::GenrePopularity { from: 1990, to: 2010 }).unwrap();
        let Response::Groups { groups, fields, .. } = response else {
            panic!("expected groups");
        };
        assert_eq!(fields.len(), 3);
        let keys: Vec<String> = groups.iter().map(|g| g.key.to_string()).collect();
        assert_eq!(keys, ["Sports", "Role-Playing"]);
        assert!((groups[0].sums[0] - (41.49 + 8.92)).abs() < 1e-9);

        assert_eq!(
            engine.execute(&Request::GenrePopularity { from: 2010, to: 2000 }),
            Err(QueryError::InvalidRange {
                low: 2010.0,
                high: 2000.0
            })
        );
    }

    #[test]
    fn sales_trend_is_chronological_with_unknown_last() {
        let response = engine().execute(&Request::SalesTrend).unwrap();
        let Response::Groups { groups, .. } = response else {
            panic!("expected groups");
        };
        let keys: Vec<FieldValue> = groups.into_iter().map(|g| g.key).collect();
        assert_eq!(
            keys,
            vec![
                FieldValue::from(1989),
                FieldValue::from(1996),
                FieldValue::from(2006),
                FieldValue::from(2007),
                FieldValue::Null,
            ]
        );
    }

    #[test]
    fn regions_by_decade_sums_bucket() {
        let response = engine()
            .execute(&Request::RegionsByDecade {
                decade: Decade::TwoThousands,
            })
            .unwrap();
        let Response::Regions { label, totals } = response else {
            panic!("expected regions");
        };
        assert_eq!(label, "2001-2010");
        assert!((totals.na - (41.49 + 8.92)).abs() < 1e-9);
    }

    #[test]
    fn best_seller_and_empty_engine() {
        let Response::Record(best) = engine().execute(&Request::BestSeller).unwrap() else {
            panic!("expected a record");
        };
        assert_eq!(best.name, "Wii Sports");

        let empty = QueryEngine::new(Dataset::default());
        assert_eq!(empty.execute(&Request::BestSeller), Err(QueryError::EmptyDataset));
        assert_eq!(empty.execute(&Request::Overview), Err(QueryError::EmptyDataset));
        assert!(empty.execute(&Request::ListGames { limit: None }).unwrap().rows().is_empty());
    }

    #[test]
    fn list_games_and_discrepancies() {
        let mut recs = vec![record("a", None, None, 1.0), record("b", None, None, 0.0)];
        recs[1].sales_na = 0.2;
        let engine = QueryEngine::new(Dataset::from_records(recs));

        let first = engine.execute(&Request::ListGames { limit: Some(1) }).unwrap();
        assert_eq!(names(&first), ["a"]);
        assert_eq!(engine.report_discrepancies(0.05), 2);
        let flagged = engine.execute(&Request::Discrepancies { tolerance: 0.5 }).unwrap();
        assert_eq!(names(&flagged), ["a"]);
    }
}

use std::path::Path;
use std::sync::Arc;

use vgsales_viewer::config::Settings;
use vgsales_viewer::data::aggregate::Decade;
use vgsales_viewer::data::error::QueryError;
use vgsales_viewer::data::export::save_csv;
use vgsales_viewer::data::filter::Selection;
use vgsales_viewer::data::loader::load_file;
use vgsales_viewer::data::model::{Dataset, Field, FieldValue, SalesField};
use vgsales_viewer::engine::{QueryEngine, Request, Response};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// One page of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Overview,
    Releases,
    SalesFilters,
    TopGames,
    RegionsByDecade,
    GenrePopularity,
    SalesTrend,
    GameSearch,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Overview,
        Section::Releases,
        Section::SalesFilters,
        Section::TopGames,
        Section::RegionsByDecade,
        Section::GenrePopularity,
        Section::SalesTrend,
        Section::GameSearch,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::Overview => "Overview",
            Section::Releases => "Releases by Year",
            Section::SalesFilters => "Sales Filters",
            Section::TopGames => "Top Games",
            Section::RegionsByDecade => "Regions by Decade",
            Section::GenrePopularity => "Genre Popularity",
            Section::SalesTrend => "Sales Trend",
            Section::GameSearch => "Game Search",
        }
    }
}

/// Sub-views of the "Sales Filters" page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesFilter {
    ByPublisher,
    AboveRegionalSales,
    ByRegion,
    GlobalSales,
    BestSellers,
    ByName,
}

impl SalesFilter {
    pub const ALL: [SalesFilter; 6] = [
        SalesFilter::ByPublisher,
        SalesFilter::AboveRegionalSales,
        SalesFilter::ByRegion,
        SalesFilter::GlobalSales,
        SalesFilter::BestSellers,
        SalesFilter::ByName,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SalesFilter::ByPublisher => "Games by publisher",
            SalesFilter::AboveRegionalSales => "Games above a sales figure",
            SalesFilter::ByRegion => "Publisher sales by region",
            SalesFilter::GlobalSales => "Global sales",
            SalesFilter::BestSellers => "Best sellers",
            SalesFilter::ByName => "Game details by name",
        }
    }
}

// ---------------------------------------------------------------------------
// Page parameters
// ---------------------------------------------------------------------------

/// Widget-bound inputs of every page. Kept across page switches.
#[derive(Debug, Clone)]
pub struct PageParams {
    pub year: i32,
    pub sales_filter: SalesFilter,
    pub publisher: String,
    pub region: SalesField,
    pub min_sales: f64,
    pub use_min_sales: bool,
    pub best_count: usize,
    pub use_best_count: bool,
    pub game_name: String,
    pub top_n: usize,
    pub top_by: SalesField,
    pub selection: Selection,
    pub decade: Decade,
    pub year_from: i32,
    pub year_to: i32,
    pub search: String,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            year: 2006,
            sales_filter: SalesFilter::ByPublisher,
            publisher: String::new(),
            region: SalesField::Na,
            min_sales: 10.0,
            use_min_sales: false,
            best_count: 10,
            use_best_count: false,
            game_name: String::new(),
            top_n: 10,
            top_by: SalesField::Global,
            selection: Selection::new(),
            decade: Decade::TwoThousands,
            year_from: 2000,
            year_to: 2010,
            search: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Slider range used until a dataset with known years is loaded.
const DEFAULT_YEAR_BOUNDS: (i32, i32) = (1980, 2020);

/// Last executed request and what it produced.
type Cached = (Request, Result<Arc<Response>, QueryError>);

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Query engine over the loaded dataset (None until a file is loaded).
    pub engine: Option<QueryEngine>,

    pub settings: Settings,

    /// Page shown in the central panel.
    pub section: Section,

    pub params: PageParams,

    /// Colours for genre-coloured charts.
    pub genre_colors: Option<ColorMap>,

    /// Earliest / latest known release year, for slider bounds.
    pub year_bounds: (i32, i32),

    /// Sorted distinct titles for the game-details picker.
    pub game_names: Vec<String>,

    cached: Option<Cached>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            engine: None,
            settings,
            section: Section::Overview,
            params: PageParams::default(),
            genre_colors: None,
            year_bounds: DEFAULT_YEAR_BOUNDS,
            game_names: Vec::new(),
            cached: None,
            status_message: None,
        }
    }

    /// Ingest a newly loaded dataset and reset derived state.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.genre_colors = dataset.unique_values.get(&Field::Genre).map(ColorMap::new);

        let years = dataset.records.iter().filter_map(|r| r.year);
        self.year_bounds = match (years.clone().min(), years.max()) {
            (Some(lo), Some(hi)) => (lo, hi),
            _ => DEFAULT_YEAR_BOUNDS,
        };
        self.game_names = dataset
            .distinct_values(Field::Name)
            .iter()
            .map(ToString::to_string)
            .collect();
        self.params.selection.clear();

        let engine = QueryEngine::new(dataset);
        engine.report_discrepancies(self.settings.tolerance);
        self.engine = Some(engine);
        self.cached = None;
        self.status_message = None;
    }

    /// Load a file, reporting failure in the status line.
    pub fn load_path(&mut self, path: &Path) {
        match load_file(path) {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// The request the current page and its inputs describe. `None` while
    /// a required text input is still empty.
    pub fn current_request(&self) -> Option<Request> {
        let p = &self.params;
        let non_empty = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        let request = match self.section {
            Section::Overview => Request::Overview,
            Section::Releases => Request::ReleasesInYear { year: p.year },
            Section::SalesFilters => match p.sales_filter {
                SalesFilter::ByPublisher => Request::ByPublisher {
                    needle: non_empty(&p.publisher)?,
                },
                SalesFilter::AboveRegionalSales => Request::AboveRegionalSales { min: p.min_sales },
                SalesFilter::ByRegion => Request::RegionalByPublisher {
                    region: p.region,
                    publisher: non_empty(&p.publisher)?,
                    min: p.use_min_sales.then_some(p.min_sales),
                },
                SalesFilter::GlobalSales => Request::GlobalSales {
                    min: p.use_min_sales.then_some(p.min_sales),
                },
                SalesFilter::BestSellers if p.use_best_count => Request::TopSellers {
                    n: p.best_count,
                    by: SalesField::Global,
                    selection: Selection::new(),
                },
                SalesFilter::BestSellers => Request::BestSeller,
                SalesFilter::ByName => Request::GameDetails {
                    name: non_empty(&p.game_name)?,
                },
            },
            Section::TopGames => Request::TopSellers {
                n: p.top_n,
                by: p.top_by,
                selection: p.selection.clone(),
            },
            Section::RegionsByDecade => Request::RegionsByDecade { decade: p.decade },
            Section::GenrePopularity => Request::GenrePopularity {
                from: p.year_from,
                to: p.year_to,
            },
            Section::SalesTrend => Request::SalesTrend,
            Section::GameSearch => Request::Search {
                needle: non_empty(&p.search)?,
            },
        };
        Some(request)
    }

    /// Result of the current request, re-executed only when the request changed.
    pub fn result(&mut self) -> Option<Result<Arc<Response>, QueryError>> {
        let request = self.current_request()?;
        let Some(engine) = &self.engine else {
            return Some(Err(QueryError::EmptyDataset));
        };
        if let Some((cached_request, result)) = &self.cached {
            if *cached_request == request {
                return Some(result.clone());
            }
        }
        let result = engine.execute(&request).map(Arc::new);
        self.cached = Some((request, result.clone()));
        Some(result)
    }

    /// Toggle a single value in a column's multi-select.
    pub fn toggle_selection(&mut self, column: Field, value: &FieldValue) {
        let selected = self.params.selection.entry(column).or_default();
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
    }

    /// Write the rows of the current result to `path`.
    pub fn export_current(&mut self, path: &Path) {
        let rows = match self.result() {
            Some(Ok(response)) => response,
            _ => {
                self.status_message = Some("Nothing to export".to_string());
                return;
            }
        };
        match save_csv(path, rows.rows()) {
            Ok(n) => self.status_message = Some(format!("Exported {n} rows to {}", path.display())),
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use vgsales_viewer::data::model::Record;

    use super::*;

    fn record(name: &str, genre: &str, year: Option<i32>, global: f64) -> Record {
        Record {
            rank: 1,
            name: name.to_string(),
            platform: "DS".to_string(),
            year,
            genre: genre.to_string(),
            publisher: Some("Nintendo".to_string()),
            sales_na: global,
            sales_eu: 0.0,
            sales_jp: 0.0,
            sales_other: 0.0,
            sales_global: global,
        }
    }

    fn state() -> AppState {
        let mut state = AppState::new(Settings {
            data_path: "unused.csv".into(),
            tolerance: 0.05,
        });
        state.set_dataset(Dataset::from_records(vec![
            record("Nintendogs", "Simulation", Some(2005), 24.76),
            record("Brain Age", "Misc", Some(2005), 20.22),
            record("Tetris DS", "Puzzle", None, 2.0),
        ]));
        state
    }

    #[test]
    fn empty_search_builds_no_request() {
        let mut state = state();
        state.section = Section::GameSearch;
        assert_eq!(state.current_request(), None);
        assert!(state.result().is_none());

        state.params.search = "  brain ".to_string();
        assert_eq!(
            state.current_request(),
            Some(Request::Search {
                needle: "brain".to_string()
            })
        );
    }

    #[test]
    fn result_is_cached_until_request_changes() {
        let mut state = state();
        state.section = Section::Releases;
        state.params.year = 2005;
        let first = state.result().unwrap().unwrap();
        let again = state.result().unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(first.rows().len(), 2);

        state.params.year = 2006;
        let changed = state.result().unwrap().unwrap();
        assert!(!Arc::ptr_eq(&first, &changed));
        assert!(changed.rows().is_empty());
    }

    #[test]
    fn no_dataset_reports_empty() {
        let mut state = AppState::new(Settings {
            data_path: "unused.csv".into(),
            tolerance: 0.05,
        });
        assert_eq!(state.result(), Some(Err(QueryError::EmptyDataset)));
    }

    #[test]
    fn selection_toggles_and_resets_on_load() {
        let mut state = state();
        let misc = FieldValue::from("Misc");
        state.toggle_selection(Field::Genre, &misc);
        assert!(state.params.selection[&Field::Genre].contains(&misc));
        state.toggle_selection(Field::Genre, &misc);
        assert!(state.params.selection[&Field::Genre].is_empty());

        state.toggle_selection(Field::Genre, &misc);
        state.set_dataset(Dataset::default());
        assert!(state.params.selection.is_empty());
    }

    #[test]
    fn year_bounds_follow_dataset() {
        let state = state();
        assert_eq!(state.year_bounds, (2005, 2005));
    }

    #[test]
    fn best_sellers_switches_between_single_and_top_n() {
        let mut state = state();
        state.section = Section::SalesFilters;
        state.params.sales_filter = SalesFilter::BestSellers;
        assert_eq!(state.current_request(), Some(Request::BestSeller));
        state.params.use_best_count = true;
        state.params.best_count = 2;
        assert!(matches!(state.current_request(), Some(Request::TopSellers { n: 2, .. })));
    }

    #[test]
    fn year_bounds_reset_without_known_years() {
        let mut state = state();
        assert_eq!(state.year_bounds, (2005, 2005));

        state.set_dataset(Dataset::from_records(vec![record("Pong", "Sports", None, 0.1)]));
        assert_eq!(state.year_bounds, DEFAULT_YEAR_BOUNDS);
    }

    #[test]
    fn game_names_are_sorted_and_distinct() {
        let mut state = state();
        assert_eq!(state.game_names, vec!["Brain Age", "Nintendogs", "Tetris DS"]);

        state.set_dataset(Dataset::from_records(vec![
            record("Zoo Tycoon", "Simulation", Some(2005), 1.0),
            record("Zoo Tycoon", "Simulation", Some(2006), 1.0),
        ]));
        assert_eq!(state.game_names, vec!["Zoo Tycoon"]);
    }
}

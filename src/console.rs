//! Numbered console menu over the query engine.
//!
//! Reading input goes through the [`Prompt`] trait so the menu logic runs the
//! same against a line editor or a scripted list of answers. Each completed
//! walk through the menu yields one [`Action`]; rendering turns a
//! [`Response`] back into plain text.

use std::fmt::Write as _;

use thiserror::Error;

use crate::data::aggregate::{Decade, RegionTotals};
use crate::data::error::QueryError;
use crate::data::filter::Selection;
use crate::data::model::{Field, Record, SalesField};
use crate::engine::{Request, Response};

/// Longest cell printed before truncation.
const MAX_CELL: usize = 36;

/// Source of user answers. `None` means input is closed.
pub trait Prompt {
    fn ask(&mut self, prompt: &str) -> Option<String>;
}

/// Scripted answers, consumed front to back.
impl Prompt for std::collections::VecDeque<String> {
    fn ask(&mut self, _prompt: &str) -> Option<String> {
        self.pop_front()
    }
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Run(Request),
    ShowColumns,
    Quit,
}

/// Rejected input. The menu reports it and starts over.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("'{0}' is not a menu option")]
    InvalidChoice(String),
    #[error("'{0}' is not a valid number")]
    InvalidNumber(String),
    #[error("a search term is required")]
    EmptyInput,
    #[error(transparent)]
    Query(#[from] QueryError),
}

pub const MAIN_MENU: &str = "\
Choose an option:
1 - File information
2 - Sales
3 - List games
4 - Releases
5 - Publisher titles above a regional threshold
6 - Search a game
7 - Most frequent values
0 - Quit";

const INFO_MENU: &str = "\
1 - Column titles
2 - Overview (rows, columns, headline metrics)";

const SALES_MENU: &str = "\
1 - Filter by year
2 - Filter by publisher
3 - Filter by regional sales
4 - Filter by region
5 - Global sales
6 - Best sellers
7 - Game details by name";

const LIST_MENU: &str = "\
1 - All games
2 - First N games";

const RELEASES_MENU: &str = "\
1 - Releases in a year
2 - Regional sales by decade
3 - Genre popularity over a year range
4 - Yearly global sales trend";

const REGION_MENU: &str = "\
1 - NA_Sales
2 - EU_Sales
3 - JP_Sales
4 - Other_Sales";

/// Walk the menu once and return the chosen action.
pub fn next_action(prompt: &mut impl Prompt) -> Result<Action, InputError> {
    let Some(choice) = prompt.ask(MAIN_MENU) else {
        return Ok(Action::Quit);
    };
    let action = match choice.trim() {
        "0" | "q" | "quit" => Action::Quit,
        "1" => match ask_choice(prompt, INFO_MENU)? {
            1 => Action::ShowColumns,
            2 => Action::Run(Request::Overview),
            n => return Err(InputError::InvalidChoice(n.to_string())),
        },
        "2" => Action::Run(sales_request(prompt)?),
        "3" => match ask_choice(prompt, LIST_MENU)? {
            1 => Action::Run(Request::ListGames { limit: None }),
            2 => Action::Run(Request::ListGames {
                limit: Some(ask_number(prompt, "How many games?")?),
            }),
            n => return Err(InputError::InvalidChoice(n.to_string())),
        },
        "4" => Action::Run(releases_request(prompt)?),
        "5" => Action::Run(Request::RegionalByPublisher {
            publisher: ask_text(prompt, "Publisher name:")?,
            region: ask_region(prompt)?,
            min: Some(ask_number(prompt, "Minimum sales (millions):")?),
        }),
        "6" => Action::Run(Request::Search {
            needle: ask_text(prompt, "Game name:")?,
        }),
        "7" => Action::Run(Request::MostFrequent {
            field: ask_text(prompt, "Column (e.g. Genre, Platform, Publisher):")?.parse()?,
            n: ask_number(prompt, "How many values?")?,
        }),
        other => return Err(InputError::InvalidChoice(other.to_string())),
    };
    Ok(action)
}

fn sales_request(prompt: &mut impl Prompt) -> Result<Request, InputError> {
    let request = match ask_choice(prompt, SALES_MENU)? {
        1 => Request::ReleasesInYear {
            year: ask_number(prompt, "Year:")?,
        },
        2 => Request::ByPublisher {
            needle: ask_text(prompt, "Publisher name:")?,
        },
        3 => Request::AboveRegionalSales {
            min: ask_number(prompt, "Minimum sales (millions):")?,
        },
        4 => Request::RegionalByPublisher {
            region: ask_region(prompt)?,
            publisher: ask_text(prompt, "Publisher name:")?,
            min: ask_optional_number(prompt, "Minimum sales (millions, empty for none):")?,
        },
        5 => Request::GlobalSales {
            min: ask_optional_number(
                prompt,
                "Minimum global sales (millions, empty for the total):",
            )?,
        },
        6 => match ask_optional_number(prompt, "How many games (empty for the best seller)?")? {
            Some(n) => Request::TopSellers {
                n,
                by: SalesField::Global,
                selection: Selection::new(),
            },
            None => Request::BestSeller,
        },
        7 => Request::GameDetails {
            name: ask_text(prompt, "Exact game name:")?,
        },
        n => return Err(InputError::InvalidChoice(n.to_string())),
    };
    Ok(request)
}

fn releases_request(prompt: &mut impl Prompt) -> Result<Request, InputError> {
    let request = match ask_choice(prompt, RELEASES_MENU)? {
        1 => Request::ReleasesInYear {
            year: ask_number(prompt, "Year:")?,
        },
        2 => {
            let menu = Decade::ALL
                .iter()
                .enumerate()
                .map(|(i, d)| format!("{} - {d}", i + 1))
                .collect::<Vec<_>>()
                .join("\n");
            let idx = ask_choice(prompt, &menu)?;
            let decade = idx
                .checked_sub(1)
                .and_then(|i| Decade::ALL.get(i))
                .ok_or_else(|| InputError::InvalidChoice(idx.to_string()))?;
            Request::RegionsByDecade { decade: *decade }
        }
        3 => Request::GenrePopularity {
            from: ask_number(prompt, "From year:")?,
            to: ask_number(prompt, "To year:")?,
        },
        4 => Request::SalesTrend,
        n => return Err(InputError::InvalidChoice(n.to_string())),
    };
    Ok(request)
}

// -- Input helpers --

fn ask_text(prompt: &mut impl Prompt, question: &str) -> Result<String, InputError> {
    let answer = prompt.ask(question).unwrap_or_default();
    let answer = answer.trim();
    if answer.is_empty() {
        return Err(InputError::EmptyInput);
    }
    Ok(answer.to_string())
}

fn ask_number<T: std::str::FromStr>(
    prompt: &mut impl Prompt,
    question: &str,
) -> Result<T, InputError> {
    let answer = prompt.ask(question).unwrap_or_default();
    answer
        .trim()
        .parse()
        .map_err(|_| InputError::InvalidNumber(answer.trim().to_string()))
}

fn ask_optional_number<T: std::str::FromStr>(
    prompt: &mut impl Prompt,
    question: &str,
) -> Result<Option<T>, InputError> {
    let answer = prompt.ask(question).unwrap_or_default();
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(None);
    }
    answer
        .parse()
        .map(Some)
        .map_err(|_| InputError::InvalidNumber(answer.to_string()))
}

fn ask_choice(prompt: &mut impl Prompt, menu: &str) -> Result<usize, InputError> {
    let answer = prompt.ask(menu).unwrap_or_default();
    answer
        .trim()
        .parse()
        .map_err(|_| InputError::InvalidChoice(answer.trim().to_string()))
}

fn ask_region(prompt: &mut impl Prompt) -> Result<SalesField, InputError> {
    let idx = ask_choice(prompt, REGION_MENU)?;
    idx.checked_sub(1)
        .and_then(|i| SalesField::REGIONS.get(i).copied())
        .ok_or_else(|| InputError::InvalidChoice(idx.to_string()))
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Columns shown for the records a request returns.
pub fn columns_for(request: &Request) -> Vec<Field> {
    match request {
        Request::ReleasesInYear { .. } => {
            vec![Field::Name, Field::Rank, Field::Year, Field::Publisher, Field::Genre]
        }
        Request::ByPublisher { .. } | Request::ListGames { .. } => {
            vec![Field::Name, Field::Publisher]
        }
        Request::AboveRegionalSales { .. } => {
            let mut cols = vec![Field::Name, Field::Publisher];
            cols.extend(SalesField::REGIONS.iter().map(|r| r.field()));
            cols
        }
        Request::RegionalByPublisher { region, .. } => {
            vec![Field::Name, Field::Publisher, region.field()]
        }
        Request::TopSellers { by, .. } => {
            vec![Field::Rank, Field::Name, Field::Publisher, by.field()]
        }
        _ => vec![Field::Name, Field::Platform, Field::Year, Field::Publisher, Field::SalesGlobal],
    }
}

/// Plain-text rendering of a response to `request`.
pub fn render(request: &Request, response: &Response) -> String {
    let mut out = String::new();
    match response {
        Response::Overview(ov) => {
            let years = match (ov.earliest_year, ov.latest_year) {
                (Some(a), Some(b)) => format!("{a}-{b}"),
                _ => "unknown".to_string(),
            };
            let _ = writeln!(out, "Rows: {} | Columns: {}", ov.records, ov.columns);
            let _ = writeln!(out, "Unique titles: {}", ov.unique_titles);
            let _ = writeln!(out, "Release years: {years}");
            let _ = writeln!(
                out,
                "Mean global sales per game: {:.2} million",
                ov.mean_global_sales
            );
            let _ = writeln!(out, "Total global sales: {:.2} million", ov.total_global_sales);
            if let Some((publisher, count)) = &ov.top_publisher {
                let _ = writeln!(out, "Publisher with most games: {publisher} ({count})");
            }
        }
        Response::Records { records, global_total } => {
            if records.is_empty() {
                out.push_str("No matching games.\n");
            } else {
                out.push_str(&records_table(records, &columns_for(request)));
                let _ = writeln!(
                    out,
                    "{} games | total global sales: {global_total:.2} million",
                    records.len()
                );
            }
        }
        Response::Record(rec) => out.push_str(&record_details(rec)),
        Response::Total(total) => {
            let _ = writeln!(out, "Total global sales: {total:.2} million");
        }
        Response::Groups {
            group_field,
            fields,
            groups,
        } => {
            let mut header = vec![group_field.header().to_string(), "Games".to_string()];
            header.extend(fields.iter().map(|f| f.to_string()));
            let rows = groups
                .iter()
                .map(|g| {
                    let mut row = vec![g.key.to_string(), g.count.to_string()];
                    row.extend(g.sums.iter().map(|s| format!("{s:.2}")));
                    row
                })
                .collect::<Vec<_>>();
            out.push_str(&text_table(&header, &rows));
        }
        Response::Regions { label, totals } => {
            let _ = writeln!(out, "Sales distribution for {label}:");
            out.push_str(&region_lines(totals));
        }
        Response::Search { records, totals } => {
            if records.is_empty() {
                out.push_str("No game found with that name.\n");
            } else {
                out.push_str(&records_table(records, &columns_for(request)));
                out.push_str(&region_lines(totals));
            }
        }
        Response::Frequencies { field, counts } => {
            let header = [field.header().to_string(), "Count".to_string()];
            let rows = counts
                .iter()
                .map(|(v, c)| vec![v.to_string(), c.to_string()])
                .collect::<Vec<_>>();
            out.push_str(&text_table(&header, &rows));
        }
    }
    out
}

/// Column titles, numbered.
pub fn render_columns(columns: &[&str]) -> String {
    columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {c}\n", i + 1))
        .collect()
}

fn record_details(rec: &Record) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", rec.name, rec.platform);
    let _ = writeln!(out, "Rank: {}", rec.rank);
    let _ = writeln!(out, "Publisher: {}", rec.value(Field::Publisher));
    for field in SalesField::ALL.iter().rev() {
        let _ = writeln!(out, "{field}: {:.2} million", rec.sales(*field));
    }
    out
}

fn region_lines(totals: &RegionTotals) -> String {
    let regional: f64 = SalesField::REGIONS.iter().map(|&r| totals.get(r)).sum();
    SalesField::REGIONS
        .iter()
        .map(|&r| {
            let share = if regional > 0.0 { totals.get(r) / regional * 100.0 } else { 0.0 };
            format!("{:<14} {:>9.2} million ({share:.1}%)\n", r.label(), totals.get(r))
        })
        .collect()
}

/// Fixed-width table of `records` restricted to `columns`.
pub fn records_table(records: &[Record], columns: &[Field]) -> String {
    let header: Vec<String> = columns.iter().map(|f| f.header().to_string()).collect();
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|rec| columns.iter().map(|&f| rec.display(f)).collect())
        .collect();
    text_table(&header, &rows)
}

fn truncate(s: &str) -> String {
    if s.chars().count() <= MAX_CELL {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(MAX_CELL - 1).collect();
        cut.push('…');
        cut
    }
}

fn text_table(header: &[String], rows: &[Vec<String>]) -> String {
    let header: Vec<String> = header.iter().map(|h| truncate(h)).collect();
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.iter().map(|c| truncate(c)).collect())
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (w, c) in widths.iter_mut().zip(row) {
            *w = (*w).max(c.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = line(header.as_slice());
    out.push_str(&format!(
        "{}\n",
        widths.iter().map(|&w| "-".repeat(w)).collect::<Vec<_>>().join("  ")
    ));
    for row in &rows {
        out.push_str(&line(row.as_slice()));
    }
    out
}

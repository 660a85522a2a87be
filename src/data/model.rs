use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::error::QueryError;

// ---------------------------------------------------------------------------
// Field – the closed set of columns
// ---------------------------------------------------------------------------

/// Every column of the sales table, in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Rank,
    Name,
    Platform,
    Year,
    Genre,
    Publisher,
    SalesNa,
    SalesEu,
    SalesJp,
    SalesOther,
    SalesGlobal,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::Rank,
        Field::Name,
        Field::Platform,
        Field::Year,
        Field::Genre,
        Field::Publisher,
        Field::SalesNa,
        Field::SalesEu,
        Field::SalesJp,
        Field::SalesOther,
        Field::SalesGlobal,
    ];

    /// Columns whose distinct values are indexed for selection widgets.
    pub const CATEGORICAL: [Field; 4] =
        [Field::Platform, Field::Year, Field::Genre, Field::Publisher];

    /// Snake-case engine name (`sales_global`).
    pub fn name(self) -> &'static str {
        match self {
            Field::Rank => "rank",
            Field::Name => "name",
            Field::Platform => "platform",
            Field::Year => "year",
            Field::Genre => "genre",
            Field::Publisher => "publisher",
            Field::SalesNa => "sales_na",
            Field::SalesEu => "sales_eu",
            Field::SalesJp => "sales_jp",
            Field::SalesOther => "sales_other",
            Field::SalesGlobal => "sales_global",
        }
    }

    /// Header used by the source CSV (`Global_Sales`).
    pub fn header(self) -> &'static str {
        match self {
            Field::Rank => "Rank",
            Field::Name => "Name",
            Field::Platform => "Platform",
            Field::Year => "Year",
            Field::Genre => "Genre",
            Field::Publisher => "Publisher",
            Field::SalesNa => "NA_Sales",
            Field::SalesEu => "EU_Sales",
            Field::SalesJp => "JP_Sales",
            Field::SalesOther => "Other_Sales",
            Field::SalesGlobal => "Global_Sales",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Field::Rank | Field::Year) || self.as_sales().is_some()
    }

    pub fn is_text(self) -> bool {
        matches!(self, Field::Name | Field::Platform | Field::Genre | Field::Publisher)
    }

    pub fn as_sales(self) -> Option<SalesField> {
        match self {
            Field::SalesNa => Some(SalesField::Na),
            Field::SalesEu => Some(SalesField::Eu),
            Field::SalesJp => Some(SalesField::Jp),
            Field::SalesOther => Some(SalesField::Other),
            Field::SalesGlobal => Some(SalesField::Global),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Accepts either the engine name or the CSV header, case-insensitively.
impl FromStr for Field {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Field::ALL
            .into_iter()
            .find(|f| {
                f.name().eq_ignore_ascii_case(wanted) || f.header().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| QueryError::MissingField(wanted.to_string()))
    }
}

// ---------------------------------------------------------------------------
// SalesField – the numeric sales columns
// ---------------------------------------------------------------------------

/// A sales column, in millions of units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SalesField {
    Na,
    Eu,
    Jp,
    Other,
    Global,
}

impl SalesField {
    /// The four regional columns; `Global` is expected to be their sum.
    pub const REGIONS: [SalesField; 4] =
        [SalesField::Na, SalesField::Eu, SalesField::Jp, SalesField::Other];

    pub const ALL: [SalesField; 5] = [
        SalesField::Na,
        SalesField::Eu,
        SalesField::Jp,
        SalesField::Other,
        SalesField::Global,
    ];

    pub fn field(self) -> Field {
        match self {
            SalesField::Na => Field::SalesNa,
            SalesField::Eu => Field::SalesEu,
            SalesField::Jp => Field::SalesJp,
            SalesField::Other => Field::SalesOther,
            SalesField::Global => Field::SalesGlobal,
        }
    }

    /// Human label for charts and menus.
    pub fn label(self) -> &'static str {
        match self {
            SalesField::Na => "North America",
            SalesField::Eu => "Europe",
            SalesField::Jp => "Japan",
            SalesField::Other => "Other",
            SalesField::Global => "Global",
        }
    }
}

impl fmt::Display for SalesField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field().header())
    }
}

impl FromStr for SalesField {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field: Field = s.parse()?;
        field.as_sales().ok_or(QueryError::FieldKind {
            field,
            expected: "sales",
        })
    }
}

// ---------------------------------------------------------------------------
// FieldValue – a single cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value, used as a group key and equality operand.
/// Needs `Ord` + `Hash` so it can live in `BTreeSet` / `HashMap` keys.
/// Equality, ordering and hashing all treat `-0.0` and `0.0` as one value.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// Missing year or publisher.
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for FieldValue {}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use FieldValue::*;
        fn discriminant(v: &FieldValue) -> u8 {
            match v {
                Null => 0,
                Integer(_) => 1,
                Float(_) => 2,
                Text(_) => 3,
            }
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => (a + 0.0).total_cmp(&(b + 0.0)),
            (Text(a), Text(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

impl std::hash::Hash for FieldValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            FieldValue::Text(s) => s.hash(state),
            FieldValue::Integer(i) => i.hash(state),
            FieldValue::Float(f) => (f + 0.0).to_bits().hash(state),
            FieldValue::Null => {}
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v:.2}"),
            FieldValue::Null => write!(f, "N/A"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Integer(i64::from(i))
    }
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the table
// ---------------------------------------------------------------------------

/// One release of a title on one platform. Serializes with the source header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(rename = "Rank")]
    pub rank: u32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Platform")]
    pub platform: String,
    #[serde(rename = "Year")]
    pub year: Option<i32>,
    #[serde(rename = "Genre")]
    pub genre: String,
    #[serde(rename = "Publisher")]
    pub publisher: Option<String>,
    #[serde(rename = "NA_Sales")]
    pub sales_na: f64,
    #[serde(rename = "EU_Sales")]
    pub sales_eu: f64,
    #[serde(rename = "JP_Sales")]
    pub sales_jp: f64,
    #[serde(rename = "Other_Sales")]
    pub sales_other: f64,
    #[serde(rename = "Global_Sales")]
    pub sales_global: f64,
}

impl Record {
    /// The cell for `field` as a dynamically typed value.
    pub fn value(&self, field: Field) -> FieldValue {
        match field {
            Field::Rank => FieldValue::Integer(i64::from(self.rank)),
            Field::Name => FieldValue::Text(self.name.clone()),
            Field::Platform => FieldValue::Text(self.platform.clone()),
            Field::Year => self.year.map_or(FieldValue::Null, FieldValue::from),
            Field::Genre => FieldValue::Text(self.genre.clone()),
            Field::Publisher => self
                .publisher
                .as_deref()
                .map_or(FieldValue::Null, FieldValue::from),
            _ => match field.as_sales() {
                // `+ 0.0` folds a loaded `-0` into `0`.
                Some(sales) => FieldValue::Float(self.sales(sales) + 0.0),
                None => FieldValue::Null,
            },
        }
    }

    /// Numeric view of a field. `None` for text fields and a missing year.
    pub fn numeric(&self, field: Field) -> Option<f64> {
        match field {
            Field::Rank => Some(f64::from(self.rank)),
            Field::Year => self.year.map(f64::from),
            _ => field.as_sales().map(|s| self.sales(s)),
        }
    }

    /// Text view of a field. `None` for numeric fields and a missing publisher.
    pub fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => Some(&self.name),
            Field::Platform => Some(&self.platform),
            Field::Genre => Some(&self.genre),
            Field::Publisher => self.publisher.as_deref(),
            _ => None,
        }
    }

    pub fn sales(&self, field: SalesField) -> f64 {
        match field {
            SalesField::Na => self.sales_na,
            SalesField::Eu => self.sales_eu,
            SalesField::Jp => self.sales_jp,
            SalesField::Other => self.sales_other,
            SalesField::Global => self.sales_global,
        }
    }

    /// Cell text for tables: sales with two decimals, `N/A` for missing.
    pub fn display(&self, field: Field) -> String {
        match field.as_sales() {
            Some(sales) => format!("{:.2}", self.sales(sales)),
            None => self.value(field).to_string(),
        }
    }

    /// Sum of the four regional columns, independent of `sales_global`.
    pub fn regional_sum(&self) -> f64 {
        SalesField::REGIONS.iter().map(|&r| self.sales(r)).sum()
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full loaded table with pre-computed indices over categorical columns.
/// Never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// All records, in source order.
    pub records: Vec<Record>,
    /// For each categorical column the sorted set of distinct values.
    pub unique_values: BTreeMap<Field, BTreeSet<FieldValue>>,
}

impl Dataset {
    /// Build column indices from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut unique_values: BTreeMap<Field, BTreeSet<FieldValue>> = BTreeMap::new();
        for rec in &records {
            for field in Field::CATEGORICAL {
                unique_values.entry(field).or_default().insert(rec.value(field));
            }
        }
        Dataset {
            records,
            unique_values,
        }
    }

    /// Sorted distinct values of a column, missing values first. Served from
    /// the index for categorical columns.
    pub fn distinct_values(&self, field: Field) -> Vec<FieldValue> {
        match self.unique_values.get(&field) {
            Some(values) => values.iter().cloned().collect(),
            None => self
                .records
                .iter()
                .map(|r| r.value(field))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        }
    }

    /// Column headers in source order.
    pub fn column_names(&self) -> Vec<&'static str> {
        Field::ALL.iter().map(|f| f.header()).collect()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::Record;

    /// A record with only the fields most tests care about.
    pub fn record(name: &str, publisher: Option<&str>, year: Option<i32>, global: f64) -> Record {
        Record {
            rank: 1,
            name: name.to_string(),
            platform: "Wii".to_string(),
            year,
            genre: "Sports".to_string(),
            publisher: publisher.map(str::to_string),
            sales_na: 0.0,
            sales_eu: 0.0,
            sales_jp: 0.0,
            sales_other: 0.0,
            sales_global: global,
        }
    }

    /// A record with explicit regional sales; global is their sum.
    pub fn regional(
        name: &str,
        genre: &str,
        year: Option<i32>,
        na: f64,
        eu: f64,
        jp: f64,
        other: f64,
    ) -> Record {
        Record {
            rank: 1,
            name: name.to_string(),
            platform: "PS2".to_string(),
            year,
            genre: genre.to_string(),
            publisher: Some("Nintendo".to_string()),
            sales_na: na,
            sales_eu: eu,
            sales_jp: jp,
            sales_other: other,
            sales_global: na + eu + jp + other,
        }
    }
}

//! Command-line / environment configuration shared by the binaries.

use std::path::PathBuf;

use clap::Args;

/// Default dataset file, looked up in the working directory.
pub const DEFAULT_DATA_PATH: &str = "vgsales.csv";

/// Default allowed gap between `Global_Sales` and the regional sum. The source
/// rounds every column to 0.01, so small gaps are expected.
pub const DEFAULT_TOLERANCE: f64 = 0.05;

/// Options every binary accepts; flatten into the binary's own parser.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Sales table to load (.csv, .json or .parquet).
    #[arg(value_name = "FILE", env = "VGSALES_DATA")]
    pub data: Option<PathBuf>,

    /// Allowed difference between Global_Sales and the sum of the regions
    /// before a record is reported.
    #[arg(
        long,
        value_name = "MILLIONS",
        env = "VGSALES_TOLERANCE",
        default_value_t = DEFAULT_TOLERANCE
    )]
    pub tolerance: f64,
}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_path: PathBuf,
    pub tolerance: f64,
}

impl From<CommonArgs> for Settings {
    fn from(args: CommonArgs) -> Self {
        Self {
            data_path: args.data.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH)),
            tolerance: args.tolerance.max(0.0),
        }
    }
}

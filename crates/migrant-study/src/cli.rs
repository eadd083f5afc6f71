//! Command line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use migrant_study::{MeasureVariant, OutputFormat};

#[derive(Parser)]
#[command(
    name = "migrant-study",
    version,
    about = "Migrant cohort datasets and annual measures from a primary-care extract"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding the backend extract CSV files.
    #[arg(long, value_name = "DIR", env = "MIGRANT_DATA_PATH", global = true, default_value = ".")]
    pub data_dir: PathBuf,

    /// Directory holding the codelist CSV files.
    #[arg(
        long,
        value_name = "DIR",
        env = "MIGRANT_CODELIST_PATH",
        global = true,
        default_value = "codelists"
    )]
    pub codelist_dir: PathBuf,

    /// Output file (default: stdout).
    #[arg(long, short, value_name = "PATH", global = true)]
    pub output: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value = "csv", global = true)]
    pub format: FormatArg,

    /// Skip malformed backend rows instead of failing.
    #[arg(long, global = true)]
    pub lenient: bool,

    /// More logging (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Errors only.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Patients registered and alive on the census date.
    CensusCohort {
        /// Census reference date (YYYY-MM-DD).
        #[arg(long, value_name = "DATE")]
        census_date: Option<String>,
    },

    /// Patients with any migration code, registered during the study.
    FullStudyCohort,

    /// All patients registered during the study.
    PopulationDenominator,

    /// One row per migration code event of the full study cohort.
    MigrationEvents,

    /// Annual counts per measure, interval and subgroup.
    AnnualCounts {
        /// Which family of measures to count.
        #[arg(value_enum)]
        variant: VariantArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Json => OutputFormat::JsonLines,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum VariantArg {
    Indicators,
    #[value(name = "status-2cat")]
    Status2Cat,
    StatusTypes,
}

impl From<VariantArg> for MeasureVariant {
    fn from(value: VariantArg) -> Self {
        match value {
            VariantArg::Indicators => MeasureVariant::Indicators,
            VariantArg::Status2Cat => MeasureVariant::Status2Cat,
            VariantArg::StatusTypes => MeasureVariant::StatusTypes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annual_counts_variant() {
        let cli = Cli::try_parse_from(["migrant-study", "annual-counts", "status-2cat", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Command::AnnualCounts {
                variant: VariantArg::Status2Cat
            }
        ));
    }

    #[test]
    fn test_census_date_and_format() {
        let cli = Cli::try_parse_from([
            "migrant-study",
            "census-cohort",
            "--census-date",
            "2011-03-27",
            "--format",
            "json",
            "--data-dir",
            "extract",
        ])
        .unwrap();
        assert!(matches!(cli.format, FormatArg::Json));
        assert_eq!(cli.data_dir, PathBuf::from("extract"));
        assert!(matches!(
            cli.command,
            Command::CensusCohort { census_date: Some(ref d) } if d == "2011-03-27"
        ));
    }

    #[test]
    fn test_unknown_variant_rejected() {
        assert!(Cli::try_parse_from(["migrant-study", "annual-counts", "all"]).is_err());
    }
}

//! Migrant cohort study binary.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use migrant_loader::{discover_backend_files, CodelistRegistry, LoadConfig, PatientStore};
use migrant_study::logging::{init_logging, LogConfig};
use migrant_study::{
    annual_measures, census_cohort, full_study_cohort, migration_events, parse_date,
    population_denominator, write_dataset, Dataset, MeasureVariant, OutputFormat, StudyConfig,
};

mod cli;

use crate::cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_flags(cli.verbose, cli.quiet));

    let exit_code = match run(&cli) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = StudyConfig::default();
    if let Command::CensusCohort {
        census_date: Some(date),
    } = &cli.command
    {
        config = config.with_census_date(parse_date(date)?);
    }

    tracing::info!("Loading codelists from: {}", cli.codelist_dir.display());
    let registry = CodelistRegistry::load(&cli.codelist_dir).with_context(|| {
        format!("failed to load codelists from {}", cli.codelist_dir.display())
    })?;

    let store = load_store(&cli.data_dir, cli.lenient)?;

    let dataset = match &cli.command {
        Command::CensusCohort { .. } => census_cohort(&registry, config.census_date).evaluate(&store),
        Command::FullStudyCohort => full_study_cohort(&registry, &config).evaluate(&store),
        Command::PopulationDenominator => population_denominator(&registry, &config).evaluate(&store),
        Command::MigrationEvents => migration_events(&registry, &config).evaluate(&store),
        Command::AnnualCounts { variant } => {
            let variant: MeasureVariant = (*variant).into();
            annual_measures(&registry, &config, variant)?
                .evaluate(&store)?
                .to_dataset(variant.name())
        }
    };

    write_output(&dataset, cli)
}

fn load_store(data_dir: &Path, lenient: bool) -> Result<PatientStore> {
    tracing::info!("Loading backend extract from: {}", data_dir.display());
    let files = discover_backend_files(data_dir)
        .with_context(|| format!("failed to discover backend files in {}", data_dir.display()))?;

    let config = if lenient {
        LoadConfig::lenient()
    } else {
        LoadConfig::default()
    };

    let mut store = PatientStore::new();
    #[cfg(feature = "parallel")]
    let summary = store.load_all_parallel(&files, config);
    #[cfg(not(feature = "parallel"))]
    let summary = store.load_all(&files, config);
    summary.context("failed to load backend extract")?;

    tracing::info!(
        "Loaded {} patients, {} events, {} registrations, {} addresses",
        store.patient_count(),
        store.event_count(),
        store.registration_count(),
        store.address_count()
    );
    Ok(store)
}

fn write_output(dataset: &Dataset, cli: &Cli) -> Result<()> {
    let format: OutputFormat = cli.format.into();
    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_dataset(dataset, BufWriter::new(file), format)?;
            tracing::info!("Wrote {} rows to {}", dataset.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_dataset(dataset, &mut handle, format)?;
            handle.flush()?;
        }
    }
    Ok(())
}

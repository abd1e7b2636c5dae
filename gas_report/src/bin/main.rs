use clap::{App, Arg};
use color_eyre::eyre::{self, WrapErr};
use color_eyre::Report;
use gas_report::progress::GroupProgress;
use gas_report::{ReportConfig, ResultsDB, Variant};
use std::path::PathBuf;

fn main() -> Result<(), Report> {
    color_eyre::install()?;
    let config = parse_args()?;

    // init logging
    let progress = GroupProgress::init();

    let db = ResultsDB::open(&config.results_dir).wrap_err("load results")?;
    progress.start(db.group_count());

    let summary = gas_report::report_groups(&db, &config, |group| {
        progress.group_done(group)
    })?;
    progress.finish(&config.output_file.display().to_string());

    tracing::info!(
        "{} sheets written to {} ({} empty groups skipped)",
        summary.sheets.len(),
        config.output_file.display(),
        summary.skipped.len(),
    );
    Ok(())
}

fn parse_args() -> Result<ReportConfig, Report> {
    let matches = App::new("gas_report")
        .version("0.1")
        .about("Renders per-run gas consumption results into a spreadsheet, one sheet per experiment group.")
        .arg(
            Arg::with_name("results_dir")
                .long("results_dir")
                .value_name("RESULTS_DIR")
                .help("directory with one folder of JSON result files per experiment group; default: 'results'")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("output")
                .long("output")
                .value_name("OUTPUT")
                .help("workbook to generate; default: 'results.xlsx'")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("recap")
                .long("recap")
                .value_name("RECAP")
                .help("add a block of aggregate formulas (per phase and per user) to each sheet; default: true")
                .takes_value(true),
        )
        .get_matches();

    // parse arguments
    let mut config = ReportConfig::default();
    if let Some(results_dir) = matches.value_of("results_dir") {
        config.results_dir = PathBuf::from(results_dir);
    }
    if let Some(output) = matches.value_of("output") {
        config.output_file = PathBuf::from(output);
    }
    config.variant = parse_variant(matches.value_of("recap"))?;
    Ok(config)
}

fn parse_variant(recap: Option<&str>) -> Result<Variant, Report> {
    let recap = match recap {
        Some(recap) => recap.parse::<bool>().map_err(|_| {
            eyre::eyre!("recap should be a boolean, found {:?}", recap)
        })?,
        None => true,
    };
    Ok(if recap {
        Variant::Recap
    } else {
        Variant::Plain
    })
}

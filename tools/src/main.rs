//! collection-runner: headless contact-plan runner.
//!
//! Usage:
//!   collection-runner --seed 12345 --customers 20000 --db plan.db
//!   collection-runner --csv-dir ./snapshot --format json --out plan.json
//!   collection-runner --seed 7 --no-persist --export-dir ./snapshot

use anyhow::{bail, Context, Result};
use collection_core::{
    config::CollectionConfig,
    csv_io,
    generator::generate_snapshot,
    pipeline::ContactPipeline,
    report::ContactPlanReport,
    snapshot::Snapshot,
    store::CollectionStore,
};
use serde::Serialize;
use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Csv,
    Json,
}

/// Machine-readable run summary written by `--summary`.
#[derive(Serialize)]
struct RunSummary {
    run_id: Option<String>,
    seed: Option<u64>,
    source: String,
    fingerprint: String,
    eligible_customers: u64,
    excluded: Vec<(String, u64)>,
    groups: usize,
    total_expected_collection: f64,
    total_daily_call_capacity: u64,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64)?;
    let no_persist = args.iter().any(|a| a == "--no-persist");
    let db = flag_value(&args, "--db").unwrap_or(":memory:");
    let csv_dir = flag_value(&args, "--csv-dir");
    let out = flag_value(&args, "--out");
    let export_dir = flag_value(&args, "--export-dir");
    let summary_path = flag_value(&args, "--summary");
    let format = match flag_value(&args, "--format").unwrap_or("csv") {
        "csv" => OutputFormat::Csv,
        "json" => OutputFormat::Json,
        other => bail!("unknown --format '{other}' (expected csv or json)"),
    };

    let mut config = match flag_value(&args, "--config") {
        Some(path) => CollectionConfig::load(path)?,
        None => CollectionConfig::default(),
    };
    if flag_value(&args, "--customers").is_some() {
        config.generator.customers = parse_arg(&args, "--customers", 0usize)?;
        config.validate()?;
    }

    eprintln!("collection-runner");
    match csv_dir {
        Some(dir) => eprintln!("  source:    csv {dir}"),
        None => eprintln!("  source:    generated, seed {seed}"),
    }
    eprintln!("  db:        {}", if no_persist { "(not persisted)" } else { db });
    eprintln!();

    let (snapshot, run_seed, source) = match csv_dir {
        Some(dir) => (csv_io::load_snapshot_dir(dir)?, None, format!("csv:{dir}")),
        None => (
            generate_snapshot(seed, &config.generator)?,
            Some(seed),
            "generated".to_string(),
        ),
    };
    if let Some(dir) = export_dir {
        csv_io::write_snapshot_dir(dir, &snapshot)?;
        eprintln!("  snapshot exported to {dir}");
    }

    let pipeline = ContactPipeline::new(&config.pipeline)?;
    let (run_id, report) = if no_persist {
        (None, pipeline.run(&snapshot)?.report)
    } else {
        let store = CollectionStore::open(db)?;
        store.migrate()?;
        store.replace_snapshot(&snapshot)?;
        let (run_id, report) = pipeline.run_and_record(&store, &snapshot, run_seed)?;
        (Some(run_id), report)
    };

    write_report(&report, format, out)?;
    print_summary(run_id.as_deref(), &snapshot, &report);

    if let Some(path) = summary_path {
        let summary = RunSummary {
            run_id,
            seed: run_seed,
            source,
            fingerprint: snapshot.fingerprint(),
            eligible_customers: report.eligible_customers,
            excluded: report
                .audit
                .entries()
                .iter()
                .map(|(reason, count)| (reason.to_string(), *count))
                .collect(),
            groups: report.groups.len(),
            total_expected_collection: report.total_expected_collection(),
            total_daily_call_capacity: report.total_daily_call_capacity(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&summary)?)
            .with_context(|| format!("Cannot write summary to {path}"))?;
    }

    Ok(())
}

fn write_report(report: &ContactPlanReport, format: OutputFormat, out: Option<&str>) -> Result<()> {
    let sink: Box<dyn Write> = match out {
        Some(path) => Box::new(File::create(path).with_context(|| format!("Cannot create {path}"))?),
        None => Box::new(io::stdout().lock()),
    };
    let mut sink = BufWriter::new(sink);
    match format {
        OutputFormat::Csv => report.write_csv(&mut sink)?,
        OutputFormat::Json => writeln!(sink, "{}", report.to_json()?)?,
    }
    sink.flush()?;
    Ok(())
}

fn print_summary(run_id: Option<&str>, snapshot: &Snapshot, report: &ContactPlanReport) {
    eprintln!("=== RUN SUMMARY ===");
    eprintln!("  run_id:              {}", run_id.unwrap_or("-"));
    eprintln!("  snapshot:            {}", snapshot.fingerprint());
    eprintln!("  eligible customers:  {}", report.eligible_customers);
    eprintln!("  operational groups:  {}", report.groups.len());
    eprintln!("  expected collection: {:.2}", report.total_expected_collection());
    eprintln!("  daily call capacity: {}", report.total_daily_call_capacity());

    eprintln!();
    eprintln!("=== EXCLUSIONS ===");
    for (reason, count) in report.audit.entries() {
        if count > 0 {
            eprintln!("  {reason:<24} {count}");
        }
    }
    if report.audit.flagged_geography() > 0 {
        eprintln!(
            "  {} customers flagged for unresolved geography",
            report.audit.flagged_geography()
        );
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// Value of `flag` parsed as `T`, or `default` when the flag is absent.
/// A present but unparseable value is an error.
fn parse_arg<T>(args: &[String], flag: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match flag_value(args, flag) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{flag} expects a number, got '{raw}'")),
        None => Ok(default),
    }
}

mod live;

use anyhow::{Context, Result, bail};
use builderport_core::WldDocument;
use builderport_core::report::{Issue, Report};
use builderport_core::wld::sector::Manifest;
use builderport_core::wld::{classify, reciprocity, validate};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "worldtool", about = "Audit and edit tooling for .wld zone files and the BuilderPort server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sanity-audit .wld files for boot-breaking issues
    Audit { files: Vec<PathBuf> },
    /// Capture a vnum -> sector baseline manifest
    Snapshot {
        files: Vec<PathBuf>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Re-derive the sector map and report drift from a baseline
    Verify {
        #[arg(long)]
        baseline: PathBuf,
        files: Vec<PathBuf>,
    },
    /// Report one-way and dangling exits across the given zones
    Reciprocity { files: Vec<PathBuf> },
    /// List zones whose files look like overland grassland grids
    Grids { files: Vec<PathBuf> },
    /// Flag road/river descriptions that look hallucinated
    Descriptions { files: Vec<PathBuf> },
    /// Connect to a live server and list zones
    Zones {
        #[command(flatten)]
        server: live::ServerOpts,
    },
    /// Dump a single room from a live server
    Dump {
        vnum: u32,
        #[command(flatten)]
        server: live::ServerOpts,
    },
    /// Open and immediately abort a ZONES transaction (plumbing check)
    TxCheck {
        zone: u32,
        #[command(flatten)]
        server: live::ServerOpts,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let report = match cli.command {
        Command::Audit { files } => run_audit(&files)?,
        Command::Snapshot { files, out } => return run_snapshot(&files, &out),
        Command::Verify { baseline, files } => run_verify(&baseline, &files)?,
        Command::Reciprocity { files } => run_reciprocity(&files)?,
        Command::Grids { files } => return run_grids(&files),
        Command::Descriptions { files } => run_descriptions(&files)?,
        Command::Zones { server } => return live::zones(server).await,
        Command::Dump { vnum, server } => return live::dump(vnum, server).await,
        Command::TxCheck { zone, server } => return live::tx_check(zone, server).await,
    };

    let mut stdout = std::io::stdout().lock();
    report.write_tsv(&mut stdout)?;
    std::process::exit(report.exit_code());
}

fn file_label(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("?")
        .to_string()
}

fn require_files(files: &[PathBuf]) -> Result<()> {
    if files.is_empty() {
        bail!("no .wld files given");
    }
    Ok(())
}

fn load_all(files: &[PathBuf]) -> Result<Vec<WldDocument>> {
    require_files(files)?;
    files
        .iter()
        .map(|path| {
            WldDocument::load(path).with_context(|| format!("parsing {}", path.display()))
        })
        .collect()
}

fn run_audit(files: &[PathBuf]) -> Result<Report> {
    require_files(files)?;
    let mut report = Report::new();
    for path in files {
        let bytes =
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        report.extend(validate::audit_bytes(&file_label(path), &bytes));
    }
    Ok(report)
}

fn run_snapshot(files: &[PathBuf], out: &Path) -> Result<()> {
    let docs = load_all(files)?;
    let manifest = Manifest::snapshot(docs.iter().flat_map(|d| d.rooms()));
    manifest
        .save(out)
        .with_context(|| format!("writing {}", out.display()))?;
    tracing::info!(rooms = manifest.len(), out = %out.display(), "baseline captured");
    Ok(())
}

fn run_verify(baseline: &Path, files: &[PathBuf]) -> Result<Report> {
    let manifest = Manifest::load(baseline)
        .with_context(|| format!("reading baseline {}", baseline.display()))?;
    let docs = load_all(files)?;
    let mut report = Report::new();
    for drift in manifest.verify(docs.iter().flat_map(|d| d.rooms())) {
        report.push(Issue::new(
            (drift.vnum() / 100).to_string(),
            "sector-drift",
            drift.to_string(),
        ));
    }
    Ok(report)
}

fn run_reciprocity(files: &[PathBuf]) -> Result<Report> {
    let docs = load_all(files)?;
    let mut report = Report::new();
    for issue in reciprocity::check(docs.iter().flat_map(|d| d.rooms())) {
        report.push(Issue::new(
            (issue.from_vnum() / 100).to_string(),
            issue.kind(),
            issue.to_string(),
        ));
    }
    Ok(report)
}

fn run_grids(files: &[PathBuf]) -> Result<()> {
    require_files(files)?;
    for path in files {
        let doc =
            WldDocument::load(path).with_context(|| format!("parsing {}", path.display()))?;
        let Some(zone) = classify::dominant_zone(&doc) else {
            continue;
        };
        if classify::is_overland_grid(&doc, zone) {
            println!("{zone}");
        }
    }
    Ok(())
}

fn run_descriptions(files: &[PathBuf]) -> Result<Report> {
    let docs = load_all(files)?;
    let mut report = Report::new();
    for issue in classify::audit_descriptions(docs.iter().flat_map(|d| d.rooms())) {
        report.push(Issue::new(
            issue.zone.to_string(),
            "description",
            format!("VNUM {}: {}", issue.vnum, issue.reason),
        ));
    }
    Ok(report)
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, prelude::*};

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

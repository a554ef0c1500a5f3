//! # Takeoff CLI
//!
//! Prints the material record list of a takeoff session.
//!
//! ```text
//! takeoff_cli [SESSION.json] [--settings FILE] [--save FILE] [--persist] [--json]
//! ```
//!
//! Without a session file a demo session is built. `--persist` writes every
//! row collection to the settings' snapshot directory (relative to the
//! session file, or the working directory). Logging goes to stderr;
//! set `RUST_LOG` for the filter and `TAKEOFF_LOG_JSON=1` for JSON lines.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use takeoff_core::cost::{CostInput, Vendor};
use takeoff_core::record::MaterialRecord;
use takeoff_core::snapshot::FileSnapshotStore;
use takeoff_core::{load_session, save_session, MaterialCategory, TakeoffError, TakeoffSession, TakeoffSettings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const USAGE: &str = "usage: takeoff_cli [SESSION.json] [--settings FILE] [--save FILE] [--persist] [--json]";

#[derive(Debug, Default)]
struct Args {
    session: Option<PathBuf>,
    settings: Option<PathBuf>,
    save: Option<PathBuf>,
    persist: bool,
    json_only: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--settings" => args.settings = Some(iter.next().ok_or("--settings needs a file")?.into()),
            "--save" => args.save = Some(iter.next().ok_or("--save needs a file")?.into()),
            "--persist" => args.persist = true,
            "--json" => args.json_only = true,
            "-h" | "--help" => return Err(USAGE.into()),
            other if other.starts_with("--") => return Err(format!("unknown option {}", other)),
            other => args.session = Some(other.into()),
        }
    }
    Ok(args)
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if env_bool("TAKEOFF_LOG_JSON", false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn demo_session(settings: TakeoffSettings) -> TakeoffSession {
    let mut session = TakeoffSession::with_settings("Demo Residence", "cli", settings);

    session.concrete.rows.update_row(1, "name", "Ground slab");
    session.concrete.rows.update_row(1, "length", 8.0);
    session.concrete.rows.update_row(1, "width", 6.0);
    session.concrete.rows.update_row(1, "height", 0.15);

    session.component.rows.update_row(1, "name", "C1");
    session.component.rows.update_row(1, "preset", "C40x40");
    session.component.rows.update_row(1, "height", 3.2);
    session.component.rows.update_row(1, "count", 6.0);

    session.brick.rows.update_row(1, "name", "Partition walls");
    session.brick.rows.update_row(1, "area", 42.0);

    session.plaster.rows.update_row(1, "area", 84.0);

    session.tile.rows.update_row(1, "name", "Living room");
    session.tile.rows.update_row(1, "area", 40.0);
    session.grout.rows.update_row(1, "area", 40.0);
    session.tile_labor.input.area = 40.0;

    session.paint.rows.update_row(1, "area", 160.0);

    let steel = Vendor::new("v-01", "North Steel", ["rebar"]);
    let mixer = Vendor::new("v-02", "Harbor Ready-Mix", ["concrete"]);
    session
        .costs
        .set(MaterialCategory::Concrete, "fc210", CostInput::new(Some(&mixer), "fc' 210", 3200.0));
    session
        .costs
        .set(MaterialCategory::Rebar, "column", CostInput::new(Some(&steel), "#4 SD280", 28.0));
    session
        .costs
        .set(MaterialCategory::Brick, "brick", CostInput::new(None, "red brick", 5.5));

    session
}

fn print_table(session: &TakeoffSession, records: &[MaterialRecord]) {
    println!("{} ({})", session.meta.name, session.meta.estimator);
    println!("{}", "=".repeat(96));
    println!(
        "{:<10} {:<18} {:<32} {:>12} {:>12} {:<5}",
        "category", "sub type", "label", "quantity", "w/ wastage", "unit"
    );
    println!("{}", "-".repeat(96));

    let mut total = 0.0;
    for r in records {
        println!(
            "{:<10} {:<18} {:<32} {:>12.3} {:>12.3} {:<5}",
            r.category(),
            r.sub_type(),
            r.label(),
            r.quantity(),
            r.wastage_adjusted_quantity(),
            r.unit()
        );
        if let Some(cost) = r.cost() {
            println!(
                "{:<10} {:<18} {:<32} {:>12.2} {:>12.2} {}",
                "",
                "",
                format!("  @ {} {}", cost.vendor_name, cost.spec).trim_end(),
                cost.unit_price,
                cost.subtotal,
                session.settings.currency
            );
            total += cost.subtotal;
        }
    }

    println!("{}", "-".repeat(96));
    println!("{} records, priced total {:.2} {}", records.len(), total, session.settings.currency);
    println!();
}

fn run(args: &Args) -> Result<(), TakeoffError> {
    let settings = match &args.settings {
        Some(path) => Some(TakeoffSettings::load(path)?),
        None => None,
    };

    let mut session = match &args.session {
        Some(path) => {
            let mut session = load_session(path)?;
            if let Some(settings) = settings {
                session.settings = settings;
            }
            session
        }
        None => demo_session(settings.unwrap_or_default()),
    };

    if let Some(path) = &args.save {
        save_session(&mut session, path)?;
    }

    if args.persist {
        let base = args
            .session
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let dir = base.join(&session.settings.snapshot_dir);
        let mut store = FileSnapshotStore::new(dir, session.meta.estimator.as_str());
        session.persist(&mut store)?;
        tracing::info!(dir = %store.dir().display(), "row snapshots written");
    }

    let mut records: Vec<MaterialRecord> = Vec::new();
    session.export_records(&session.costs, &mut records);

    if !args.json_only {
        print_table(&session, &records);
    }
    let json = serde_json::to_string_pretty(&records).map_err(TakeoffError::serialization)?;
    println!("{}", json);
    Ok(())
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };

    init_tracing();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error_code = e.error_code(), "{}", e);
            eprintln!("Error [{}]: {}", e.error_code(), e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}

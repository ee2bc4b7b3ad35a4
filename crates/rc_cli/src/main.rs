// crates/rc_cli/src/main.rs
//
// `rc` binary: parse flags, install logging, run one subcommand, map the
// outcome to an exit code. Documents go to stdout (or --out); diagnostics go
// to stderr.

mod args;

mod exitcodes {
    pub const OK: u8 = 0;
    /// Bad flags, invalid metadata, out-of-domain parameters.
    pub const USAGE: u8 = 2;
    /// Unreadable or malformed inputs, manifest problems, failed writes.
    pub const IO: u8 = 3;
    /// Indicator or country not in the dataset.
    pub const UNKNOWN: u8 = 4;
    /// Document could not be built or rendered.
    pub const BUILD: u8 = 5;
}

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use args::{parse_and_validate as parse_cli, Args, CliError, Command, Format, OutputArgs, TableArgs, WeightsArgs};

use rc_io::{load_manifest, load_meta, Preferences};
use rc_pipeline::{validate_meta, PipelineError, RankingDoc, Session, TableDoc, ViewRequest};

/// Central error type for exit-code mapping.
#[derive(Debug)]
enum MainError {
    Usage(String),
    Io(String),
    Unknown(String),
    Build(String),
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Usage(m) | MainError::Io(m) | MainError::Unknown(m) | MainError::Build(m) => {
                f.write_str(m)
            }
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("rc: error: {e}");
            return ExitCode::from(exitcodes::USAGE);
        }
    };
    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::from(exitcodes::OK),
        Err(e) => {
            eprintln!("rc: error: {e}");
            ExitCode::from(exit_code(&e))
        }
    }
}

/// `-v` / `-vv` win over `RC_LOG`; default is `warn`.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env("RC_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<(), MainError> {
    match &args.command {
        Command::Table(t) => table(args, t),
        Command::Rank(out) => rank(args, out),
        Command::Validate => validate(args),
        Command::Weights(w) => weights(args, w),
        Command::Indicators => indicators(args),
    }
}

// ---------- subcommands ----------

fn table(args: &Args, t: &TableArgs) -> Result<(), MainError> {
    let mut session = open_session(args)?;
    if let Some(home) = &t.home {
        session.set_home_country(Some(home)).map_err(map_pipeline_err)?;
    }
    let req = ViewRequest {
        indicator: t.indicator.clone(),
        relation: t.relation,
        comparison_year: t.compare_year,
        sort: t.sort,
        chart_countries: t.chart.clone(),
    };
    let doc = session.table(&req).map_err(map_pipeline_err)?;
    info!(id = %doc.id, rows = doc.body.table.rows.len(), "table document built");
    emit(&render_table(&doc, t.output.format)?, t.output.out.as_deref())
}

fn rank(args: &Args, out: &OutputArgs) -> Result<(), MainError> {
    let session = open_session(args)?;
    let doc = session.ranking().map_err(map_pipeline_err)?;
    info!(id = %doc.id, countries = doc.body.ranking.entries.len(), "ranking document built");
    emit(&render_ranking(&doc, out.format)?, out.out.as_deref())
}

/// Prints the metadata report; exits with USAGE when it has errors.
fn validate(args: &Args) -> Result<(), MainError> {
    let manifest = load_manifest(&args.manifest).map_err(map_io_err)?;
    let raw = load_meta(&manifest.meta).map_err(map_io_err)?;
    let (metas, report) = validate_meta(&raw);

    let mut summary = json!({
        "pass": report.pass,
        "indicators": metas.len(),
        "issues": report.issues,
    });
    if report.pass {
        let session = Session::from_manifest(&manifest).map_err(map_pipeline_err)?;
        summary["countries"] = json!(session.countries().len());
        summary["groups"] = json!(session.groups().len());
        summary["series"] = json!(session.store().len());
        summary["load_failures"] = json!(session.store().failures());
    }
    emit(&pretty(&summary)?, None)?;

    if report.pass {
        Ok(())
    } else {
        Err(MainError::Usage(format!("metadata has {} error(s)", report.errors().count())))
    }
}

fn weights(args: &Args, w: &WeightsArgs) -> Result<(), MainError> {
    let mut session = open_session(args)?;
    let path: PathBuf = args
        .weights
        .clone()
        .or_else(|| session.preferences_path().map(Path::to_path_buf))
        .ok_or_else(|| MainError::Usage(CliError::NoPreferencesPath.to_string()))?;

    if w.reset {
        session.reset_relevance();
    }
    for (indicator, tier) in &w.set {
        session.set_relevance(indicator, *tier).map_err(map_pipeline_err)?;
    }
    if let Some(home) = &w.home {
        session.set_home_country(Some(home)).map_err(map_pipeline_err)?;
    }
    if w.clear_home {
        session.set_home_country(None).map_err(map_pipeline_err)?;
    }
    if w.reset || !w.set.is_empty() || w.home.is_some() || w.clear_home {
        session.save_preferences(&path).map_err(map_pipeline_err)?;
        info!(path = %path.display(), "preferences saved");
    }

    let prefs = session.preferences();
    let summary = json!({
        "file": path.display().to_string(),
        "overrides": prefs.weights,
        "home_country": prefs.home_country,
        "effective": session.relevance(),
    });
    emit(&pretty(&summary)?, None)
}

fn indicators(args: &Args) -> Result<(), MainError> {
    let session = open_session(args)?;
    emit(&pretty(&session.indicator_options())?, None)
}

// ---------- helpers ----------

/// Load the manifest's session; `--weights` replaces the manifest's preferences.
fn open_session(args: &Args) -> Result<Session, MainError> {
    let mut session = Session::load(&args.manifest).map_err(map_pipeline_err)?;
    if let Some(path) = &args.weights {
        let prefs = Preferences::load(path).map_err(map_io_err)?;
        session.apply_preferences(&prefs);
    }
    Ok(session)
}

fn render_table(doc: &TableDoc, format: Format) -> Result<String, MainError> {
    let rendered = match format {
        #[cfg(feature = "report-json")]
        Format::Json => rc_report::render_table_json(doc),
        #[cfg(feature = "report-html")]
        Format::Html => rc_report::render_table_html(doc),
        #[allow(unreachable_patterns)]
        other => return Err(MainError::Usage(format!("{other:?} output is not built into this binary"))),
    };
    rendered.map_err(|e| MainError::Build(format!("render: {e}")))
}

fn render_ranking(doc: &RankingDoc, format: Format) -> Result<String, MainError> {
    let rendered = match format {
        #[cfg(feature = "report-json")]
        Format::Json => rc_report::render_ranking_json(doc),
        #[cfg(feature = "report-html")]
        Format::Html => rc_report::render_ranking_html(doc),
        #[allow(unreachable_patterns)]
        other => return Err(MainError::Usage(format!("{other:?} output is not built into this binary"))),
    };
    rendered.map_err(|e| MainError::Build(format!("render: {e}")))
}

fn pretty<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, MainError> {
    serde_json::to_string_pretty(value).map_err(|e| MainError::Build(format!("json: {e}")))
}

fn emit(text: &str, out: Option<&Path>) -> Result<(), MainError> {
    match out {
        Some(path) => {
            let mut bytes = text.as_bytes().to_vec();
            bytes.push(b'\n');
            rc_io::canonical_json::write_atomic(path, &bytes)
                .map_err(|e| MainError::Io(format!("write {}: {e}", path.display())))?;
            info!(path = %path.display(), "output written");
            Ok(())
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}").map_err(|e| MainError::Io(format!("stdout: {e}")))
        }
    }
}

// ---------- exit-code mapping ----------

fn exit_code(e: &MainError) -> u8 {
    use exitcodes::*;
    match e {
        MainError::Usage(_) => USAGE,
        MainError::Io(_) => IO,
        MainError::Unknown(_) => UNKNOWN,
        MainError::Build(_) => BUILD,
    }
}

fn map_io_err(e: rc_io::IoError) -> MainError {
    use rc_io::IoError::*;
    match e {
        Invalid(m) => MainError::Usage(format!("invalid: {m}")),
        Hash(m) => MainError::Build(format!("hash: {m}")),
        other => MainError::Io(other.to_string()),
    }
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    match e {
        PipelineError::Io(io) => map_io_err(io),
        PipelineError::Validate(m) => MainError::Usage(format!("metadata validation failed: {m}")),
        PipelineError::Core(c) => MainError::Usage(c.to_string()),
        e @ (PipelineError::UnknownIndicator(_) | PipelineError::UnknownCountry(_)) => {
            MainError::Unknown(e.to_string())
        }
    }
}

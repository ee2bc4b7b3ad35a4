// crates/rc_cli/src/args.rs
//
// CLI surface: subcommands, flags and value parsers.
//
// Rules:
// - Every path is local (no scheme://); existence is checked by the loaders.
// - `--sort` takes `<column>[:asc|:desc]`; without a direction the column's
//   first-click direction applies.
// - `--weights` names the preferences file; it overrides the manifest's
//   `preferences` entry.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand, ValueEnum};

use rc_algo::SortState;
use rc_core::{RelationMode, Relevance};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "rc",
    version,
    disable_help_subcommand = true,
    about = "Offline indicator tables and composite country rankings"
)]
pub struct Args {
    /// Data manifest JSON.
    #[arg(long, global = true, default_value = "manifest.json")]
    pub manifest: PathBuf,

    /// Preferences file (relevance overrides + home country).
    #[arg(long, global = true)]
    pub weights: Option<PathBuf>,

    /// More diagnostics on stderr (-v info, -vv debug). RC_LOG applies otherwise.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Per-indicator table (rows, deltas, groups, chart series).
    Table(TableArgs),
    /// Composite ranking over every eligible indicator.
    Rank(OutputArgs),
    /// Check metadata and inputs; print the validation report.
    Validate,
    /// Show or change stored relevance tiers and home country.
    Weights(WeightsArgs),
    /// Indicators available for selection, by cluster.
    Indicators,
}

#[derive(Debug, ClapArgs, Clone)]
pub struct TableArgs {
    /// Indicator id or title.
    #[arg(long)]
    pub indicator: String,

    /// absolute | percapita | pergdp | perkm2
    #[arg(long, value_parser = parse_relation, default_value = "absolute")]
    pub relation: RelationMode,

    /// Year to compare the latest values against.
    #[arg(long = "compare-year")]
    pub compare_year: Option<i32>,

    /// Column sort, e.g. `value:asc`, `country`.
    #[arg(long, value_parser = parse_sort)]
    pub sort: Option<SortState>,

    /// Home country for this run (pinned to the top and highlighted).
    #[arg(long)]
    pub home: Option<String>,

    /// Countries for the chart series (repeatable).
    #[arg(long = "chart", num_args = 1..)]
    pub chart: Vec<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, ClapArgs, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = Format::Json)]
    pub format: Format,

    /// Output file (default: stdout).
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, ClapArgs, Clone)]
pub struct WeightsArgs {
    /// `<indicator>=<tier>` (very_high, high, normal, low, irrelevant); repeatable.
    #[arg(long = "set", value_parser = parse_assignment)]
    pub set: Vec<(String, Relevance)>,

    /// Drop every override before applying `--set`.
    #[arg(long)]
    pub reset: bool,

    /// Store a home country.
    #[arg(long, conflicts_with = "clear_home")]
    pub home: Option<String>,

    /// Forget the stored home country.
    #[arg(long)]
    pub clear_home: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Html,
}

/// Errors surfaced by argument checks after parsing.
#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
    NoPreferencesPath,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
            CliError::NoPreferencesPath => {
                write!(f, "no preferences file: pass --weights or set `preferences` in the manifest")
            }
        }
    }
}

impl std::error::Error for CliError {}

pub fn parse_relation(s: &str) -> Result<RelationMode, String> {
    RelationMode::from_token(s).ok_or_else(|| format!("unknown relation `{s}` (absolute, percapita, pergdp, perkm2)"))
}

pub fn parse_sort(s: &str) -> Result<SortState, String> {
    s.parse()
}

pub fn parse_tier(s: &str) -> Result<Relevance, String> {
    match Relevance::from_token(s) {
        (tier, true) if !s.trim().is_empty() => Ok(tier),
        _ => Err(format!("unknown relevance tier `{s}`")),
    }
}

pub fn parse_assignment(s: &str) -> Result<(String, Relevance), String> {
    let (id, tier) = s.rsplit_once('=').ok_or_else(|| format!("expected <indicator>=<tier>, got `{s}`"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing indicator in `{s}`"));
    }
    Ok((id.to_string(), parse_tier(tier)?))
}

fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

fn ensure_local(p: &Path) -> Result<(), CliError> {
    match p.to_str() {
        Some(s) if has_scheme(s) => Err(CliError::NonLocalPath(s.to_string())),
        _ => Ok(()),
    }
}

/// Parse argv and run the path checks.
pub fn parse_and_validate() -> Result<Args, CliError> {
    let args = Args::parse();
    check(&args)?;
    Ok(args)
}

pub fn check(args: &Args) -> Result<(), CliError> {
    ensure_local(&args.manifest)?;
    if let Some(w) = &args.weights {
        ensure_local(w)?;
    }
    let out = match &args.command {
        Command::Table(t) => t.output.out.as_deref(),
        Command::Rank(o) => o.out.as_deref(),
        _ => None,
    };
    if let Some(o) = out {
        ensure_local(o)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_algo::SortColumn;

    #[test]
    fn sort_flag_forms() {
        assert_eq!(parse_sort("value:asc").unwrap(), SortState { column: SortColumn::Value, ascending: true });
        assert_eq!(parse_sort("country").unwrap(), SortState::initial(SortColumn::Country));
        assert!(!parse_sort("delta_pct").unwrap().ascending);
        assert!(parse_sort("value:up").is_err());
        assert!(parse_sort("nope").is_err());
    }

    #[test]
    fn tier_assignments() {
        assert_eq!(parse_assignment("gdp=high").unwrap(), ("gdp".to_string(), Relevance::High));
        assert_eq!(parse_assignment("gdp=none").unwrap().1, Relevance::Irrelevant);
        assert!(parse_assignment("gdp=extreme").is_err());
        assert!(parse_assignment("gdp=").is_err());
        assert!(parse_assignment("=high").is_err());
        assert!(parse_assignment("gdp").is_err());
    }

    #[test]
    fn remote_paths_rejected() {
        let args = Args::try_parse_from(["rc", "--manifest", "https://example.org/m.json", "validate"]).unwrap();
        assert!(matches!(check(&args), Err(CliError::NonLocalPath(_))));
        let args = Args::try_parse_from(["rc", "rank", "--format", "html"]).unwrap();
        assert!(check(&args).is_ok());
    }
}

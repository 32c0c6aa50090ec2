//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use prospector_core::{
    ConfidenceTier, PipelineState, ProgressReporter, ResultFilter, SearchOutcome, SearchPipeline,
    explain,
};
use prospector_export::{ProspectSummary, read_json, write_csv, write_json};
use prospector_shared::{
    AppConfig, IcpSpec, Prospect, init_config, load_config, render_config, validate_api_keys,
};
use tracing::{info, warn};

/// Prospects printed in the terminal summary.
const TOP_N: usize = 5;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Prospector: find companies that match your Ideal Customer Profile.
#[derive(Parser)]
#[command(
    name = "prospector",
    version,
    about = "Find, merge, score, and rank B2B prospects against an Ideal Customer Profile.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Post-search narrowing flags shared by `search` and `filter`.
#[derive(clap::Args, Debug, Default)]
pub(crate) struct FilterArgs {
    /// Keep only this industry (repeatable). "Unknown" selects prospects without one.
    #[arg(long = "industry")]
    pub industries: Vec<String>,

    /// Keep only prospects at or above this confidence.
    #[arg(long)]
    pub min_confidence: Option<f64>,

    /// Keep only prospects with a funding signal.
    #[arg(long)]
    pub funded_only: bool,
}

impl FilterArgs {
    fn to_filter(&self) -> Result<ResultFilter> {
        Ok(ResultFilter::new(
            self.industries.clone(),
            self.min_confidence,
            self.funded_only,
        )?)
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run a prospect search for an ICP file.
    Search {
        /// ICP file (.yaml, .yml, .json, or .toml).
        #[arg(long)]
        icp: PathBuf,

        /// JSON output path (defaults to <output.dir>/prospects.json).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Also write a CSV export to this path.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Use deterministic mock data only; no API calls.
        #[arg(long)]
        mock_only: bool,

        /// Print the per-factor score breakdown for the top prospects.
        #[arg(long)]
        explain: bool,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Narrow a previous JSON export.
    Filter {
        /// Prospects JSON written by `search`.
        results: PathBuf,

        /// Write the filtered set as CSV.
        #[arg(long)]
        csv: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// ICP file utilities.
    Icp {
        #[command(subcommand)]
        action: IcpAction,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// ICP subcommands.
#[derive(Subcommand)]
pub(crate) enum IcpAction {
    /// Parse and validate an ICP file.
    Validate {
        /// ICP file (.yaml, .yml, .json, or .toml).
        path: PathBuf,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "prospector=info",
        1 => "prospector=debug",
        _ => "prospector=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Search {
            icp,
            out,
            csv,
            mock_only,
            explain,
            filter,
        } => {
            cmd_search(&icp, out.as_deref(), csv.as_deref(), mock_only, explain, &filter).await
        }
        Command::Filter {
            results,
            csv,
            filter,
        } => cmd_filter(&results, csv.as_deref(), &filter),
        Command::Icp { action } => match action {
            IcpAction::Validate { path } => cmd_icp_validate(&path),
        },
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_search(
    icp_path: &Path,
    out: Option<&Path>,
    csv: Option<&Path>,
    mock_only: bool,
    explain_scores: bool,
    filter_args: &FilterArgs,
) -> Result<()> {
    let config = load_config()?;
    let filter = filter_args.to_filter()?;
    let icp = IcpSpec::load(icp_path)?;

    if !mock_only {
        if let Err(e) = validate_api_keys(&config) {
            warn!(error = %e, "continuing with mock company data");
        }
    }

    let pipeline = SearchPipeline::from_config(&config, mock_only)?;
    info!(
        icp = %icp_path.display(),
        mock_only,
        primaries = ?pipeline.registry().primary_names(),
        "starting search"
    );

    let reporter = CliProgress::new();
    let outcome = pipeline.search(&icp, &reporter).await?;

    let prospects = if filter.is_empty() {
        outcome.prospects.clone()
    } else {
        filter.apply(&outcome.prospects)
    };

    let json_path = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(&config));
    write_json(&json_path, &prospects)?;
    if let Some(csv_path) = csv {
        write_csv(csv_path, &prospects)?;
    }

    print_run(&outcome, prospects.len());
    print_prospects(&prospects, explain_scores.then_some(&icp));

    println!("  JSON:  {}", json_path.display());
    if let Some(csv_path) = csv {
        println!("  CSV:   {}", csv_path.display());
    }
    println!();

    Ok(())
}

fn cmd_filter(results: &Path, csv: Option<&Path>, filter_args: &FilterArgs) -> Result<()> {
    let all = read_json(results)?;
    let filter = filter_args.to_filter()?;
    let prospects = filter.apply(&all);

    println!();
    println!("  Showing {} of {} prospects", prospects.len(), all.len());
    print_prospects(&prospects, None);

    if let Some(csv_path) = csv {
        write_csv(csv_path, &prospects)?;
        println!("  CSV:   {}", csv_path.display());
        println!();
    }
    Ok(())
}

fn cmd_icp_validate(path: &Path) -> Result<()> {
    let icp = IcpSpec::load(path)?;
    let criteria = &icp.icp;

    println!();
    println!("  ICP is valid: {}", path.display());
    println!("  Industries:  {}", join_or_any(&criteria.industry));
    println!(
        "  Revenue:     {} to {}",
        criteria.revenue_min,
        bound_label(criteria.revenue_max)
    );
    println!(
        "  Employees:   {} to {}",
        criteria.employee_count_min,
        bound_label(criteria.employee_count_max)
    );
    println!("  Geography:   {}", join_or_any(&criteria.geography));
    println!("  Keywords:    {}", join_or_any(&criteria.keywords));
    println!(
        "  Signals:     funding={} hiring={} tech=[{}]",
        icp.signals.funding,
        icp.signals.hiring_data_roles,
        icp.signals.tech_stack.join(", ")
    );
    println!(
        "  Results:     max {} at confidence >= {:.2}, contacts {}",
        icp.search_params.max_results,
        icp.search_params.min_confidence_score,
        if icp.search_params.include_contacts {
            format!("up to {}", icp.search_params.max_contacts_per_company)
        } else {
            "off".to_string()
        }
    );
    println!();
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    println!("{}", render_config(&config)?);
    match validate_api_keys(&config) {
        Ok(()) => println!("# live company sources: configured"),
        Err(e) => println!("# live company sources: not configured ({e})"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn default_output_path(config: &AppConfig) -> PathBuf {
    PathBuf::from(&config.output.dir).join("prospects.json")
}

fn print_run(outcome: &SearchOutcome, shown: usize) {
    let stats = &outcome.stats;
    let summary = ProspectSummary::of(&outcome.prospects);

    println!();
    println!("  Search complete!");
    println!("  Run:        {}", outcome.run_id);
    println!(
        "  Pipeline:   {} fetched → {} merged → {} unique → {} below threshold → {} returned",
        stats.fetched, stats.merged, stats.unique, stats.below_threshold, stats.returned
    );
    if shown != outcome.prospects.len() {
        println!("  Filtered:   showing {shown} of {}", outcome.prospects.len());
    }
    println!("  Avg score:  {:.2}", summary.avg_confidence);
    println!("  Contacts:   {}", summary.total_contacts);
    println!("  Funded:     {}", summary.with_funding);
    println!("  Hiring:     {}", summary.hiring);
    println!("  Time:       {:.1}s", outcome.elapsed.as_secs_f64());
}

fn print_prospects(prospects: &[Prospect], explain_with: Option<&IcpSpec>) {
    if prospects.is_empty() {
        println!();
        println!("  No prospects matched.");
        println!();
        return;
    }

    println!();
    println!("  Top {}:", prospects.len().min(TOP_N));
    for (rank, p) in prospects.iter().take(TOP_N).enumerate() {
        println!(
            "  {:>2}. {:<32} {:.2} ({})  {}  {}",
            rank + 1,
            p.company_name,
            p.confidence,
            ConfidenceTier::of(p.confidence).as_str(),
            p.industry.as_deref().unwrap_or("-"),
            p.domain,
        );
        if let Some(icp) = explain_with {
            let b = explain(p, icp);
            println!(
                "      industry {:.2} | size {:.2} | keywords {:.2} | funding {:.2} | hiring {:.2} | tech {:.2}",
                b.industry, b.revenue_size, b.keywords, b.funding, b.hiring, b.tech_stack
            );
        }
    }
    println!();
}

fn join_or_any(values: &[String]) -> String {
    if values.is_empty() {
        "any".to_string()
    } else {
        values.join(", ")
    }
}

fn bound_label(value: u64) -> String {
    if value == u64::MAX {
        "unbounded".to_string()
    } else {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn state(&self, state: PipelineState) {
        self.spinner.set_message(state.to_string());
    }

    fn company_enriched(&self, company: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Enriching [{current}/{total}] {company}"));
    }

    fn done(&self, _outcome: &SearchOutcome) {
        self.spinner.finish_and_clear();
    }
}

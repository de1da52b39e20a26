//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;

use smartbuy_materials::MaterialCascade;
use smartbuy_shared::{
    AppConfig, EstimationRequest, MaterialRequest, MaterialsConfig, SmartBuyError, VendorRequest,
    VendorSearchConfig, init_config, load_config, load_config_from, validate_limits,
};
use smartbuy_vendors::VendorCascade;

use crate::report::{PredictReport, VendorReport, sample_projects};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// SmartBuy — material and vendor estimates for construction projects.
#[derive(Parser)]
#[command(
    name = "smartbuy",
    version,
    about = "Estimate construction materials and find vendors, with graceful fallbacks.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.smartbuy/smartbuy.toml.
    #[arg(long, global = true, env = "SMARTBUY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Include every strategy attempt in the output.
    #[arg(long, global = true)]
    pub explain: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Estimate the materials a project needs.
    Predict {
        /// Project type, e.g. "Commercial Construction".
        #[arg(long)]
        project_type: String,

        /// Size label ("Small (<₹1Cr)", "Medium (₹1Cr–₹10Cr)", "Large (>₹10Cr)")
        /// or a building size.
        #[arg(long)]
        size: String,

        #[arg(long, default_value = "")]
        state: String,

        #[arg(long, default_value = "")]
        city: String,

        /// Project volume in rupees.
        #[arg(long, default_value = "")]
        volume: String,

        #[arg(long)]
        floors: Option<u32>,

        /// Model artifact to use instead of the configured one.
        #[arg(long)]
        model: Option<PathBuf>,
    },

    /// Find vendors for a material.
    Vendors {
        /// Material to search for.
        #[arg(long)]
        material: String,

        /// City or region.
        #[arg(long, default_value = "")]
        location: String,

        /// Maximum number of vendors returned.
        #[arg(long)]
        max_results: Option<usize>,
    },

    /// Run a JSON request file: `{"kind": "material", ...}` or
    /// `{"kind": "vendor", ...}`.
    Run {
        /// Request file path.
        file: PathBuf,
    },

    /// Estimate materials for the built-in sample projects.
    Demo,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
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

/// Initialize tracing based on CLI flags. Logs go to stderr; stdout carries
/// the JSON report.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "smartbuy=info",
        1 => "smartbuy=debug",
        _ => "smartbuy=trace",
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
    let explain = cli.explain;
    let config_path = cli.config;

    match cli.command {
        Command::Predict {
            project_type,
            size,
            state,
            city,
            volume,
            floors,
            model,
        } => {
            let request = MaterialRequest {
                project_type,
                size_category: size,
                state,
                city,
                volume,
                num_floors: floors,
            };
            let config = resolve_config(config_path.as_deref())?;
            cmd_predict(&config, &request, model, explain).await
        }
        Command::Vendors {
            material,
            location,
            max_results,
        } => {
            let request = VendorRequest {
                material_name: material,
                location,
            };
            let config = resolve_config(config_path.as_deref())?;
            cmd_vendors(&config, &request, max_results, explain).await
        }
        Command::Run { file } => {
            let request = read_request(&file)?;
            let config = resolve_config(config_path.as_deref())?;
            match request {
                EstimationRequest::Material(request) => {
                    cmd_predict(&config, &request, None, explain).await
                }
                EstimationRequest::Vendor(request) => {
                    cmd_vendors(&config, &request, None, explain).await
                }
            }
        }
        Command::Demo => {
            let config = resolve_config(config_path.as_deref())?;
            cmd_demo(&config, explain).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path.as_deref()).await,
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    validate_limits(&config)?;
    Ok(config)
}

fn read_request(path: &Path) -> Result<EstimationRequest> {
    let content = std::fs::read_to_string(path).map_err(|e| SmartBuyError::io(path, e))?;
    let request = serde_json::from_str(&content)
        .map_err(|e| eyre!("invalid request file {}: {e}", path.display()))?;
    Ok(request)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_predict(
    config: &AppConfig,
    request: &MaterialRequest,
    model: Option<PathBuf>,
    explain: bool,
) -> Result<()> {
    let mut materials_config = MaterialsConfig::from(config);
    if model.is_some() {
        materials_config.model_path = model;
    }

    let cascade = MaterialCascade::from_config(&materials_config)?;
    info!(
        project_type = %request.project_type,
        size = %request.size_category,
        model_loaded = cascade.model_info().classifier_loaded,
        "estimating materials"
    );

    let (result, attempts) = cascade.estimate_with_attempts(request).await?;
    let attempts = if explain { attempts } else { Vec::new() };
    print_json(&PredictReport::new(
        request,
        &result,
        cascade.model_info(),
        &attempts,
    ))
}

async fn cmd_vendors(
    config: &AppConfig,
    request: &VendorRequest,
    max_results: Option<usize>,
    explain: bool,
) -> Result<()> {
    let mut search_config = VendorSearchConfig::from(config);
    if let Some(max) = max_results {
        if max == 0 {
            return Err(eyre!("--max-results must be at least 1"));
        }
        search_config.max_results = max;
    }

    let cascade = VendorCascade::from_config(&search_config)?;
    info!(
        material = %request.material_name,
        location = %request.location,
        "searching vendors"
    );

    let spinner = Spinner::new(format!("Searching vendors for {}", request.material_name));
    let outcome = cascade.search_with_attempts(request).await;
    spinner.finish();

    let (result, attempts) = outcome?;
    let attempts = if explain { attempts } else { Vec::new() };
    print_json(&VendorReport::new(request, &result, &attempts))
}

/// One entry of the `demo` output.
#[derive(Serialize)]
struct DemoEntry<'a> {
    name: &'a str,
    #[serde(flatten)]
    report: PredictReport<'a>,
}

async fn cmd_demo(config: &AppConfig, explain: bool) -> Result<()> {
    let cascade = MaterialCascade::from_config(&MaterialsConfig::from(config))?;
    let projects = sample_projects();

    let mut runs = Vec::with_capacity(projects.len());
    for project in &projects {
        let (result, attempts) = cascade.estimate_with_attempts(&project.request).await?;
        runs.push((project, result, if explain { attempts } else { Vec::new() }));
    }

    let entries: Vec<DemoEntry<'_>> = runs
        .iter()
        .map(|(project, result, attempts)| DemoEntry {
            name: project.name,
            report: PredictReport::new(&project.request, result, cascade.model_info(), attempts),
        })
        .collect();

    info!(projects = entries.len(), "demo estimates ready");
    print_json(&entries)
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = resolve_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress spinner
// ---------------------------------------------------------------------------

/// Spinner on stderr while a slow lookup runs.
struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    fn new(message: String) -> Self {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        bar.set_style(style);
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    fn finish(self) {
        self.bar.finish_and_clear();
    }
}

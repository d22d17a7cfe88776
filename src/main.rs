//! Takeoff - price construction takeoffs from formula templates

mod commands;
mod config;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use takeoff_engine::engine::MeasureKind;

#[derive(Parser, Debug)]
#[command(name = "takeoff", version, about = "Formula and bill-of-materials engine for construction takeoffs")]
struct Cli {
    /// Read settings from this file instead of the user config.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Ignore the user config file.
    #[arg(long, global = true, conflicts_with = "config")]
    no_config: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate one formula and print the result (#N/A when it cannot be computed).
    Eval(EvalArgs),
    /// Price a template for a measured value and print its bill of materials.
    Price(PriceArgs),
    /// Check template formulas for errors and references that read as 0.
    Lint(LintArgs),
    /// Build the estimate for a project's markups and write it as CSV.
    Export(ExportArgs),
}

#[derive(Args, Debug)]
pub struct EvalArgs {
    pub formula: String,

    /// Measured quantity bound to qty.
    #[arg(long, allow_negative_numbers = true)]
    pub qty: Option<f64>,

    /// Named value, e.g. --var "Wall Height=9". Repeatable.
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, f64)>,
}

#[derive(Args, Debug)]
#[command(group = clap::ArgGroup::new("measurement").required(true).args(["value", "measured"]))]
pub struct PriceArgs {
    /// Template library (JSON). Defaults to `templates` from the config.
    pub library: Option<PathBuf>,

    /// Template name or id.
    #[arg(long, short)]
    pub template: String,

    /// Raw drawing value: pixels, square pixels or a count.
    #[arg(long, allow_negative_numbers = true)]
    pub value: Option<f64>,

    /// Quantity already in the template's unit; accepts dimensions like 10' 6".
    #[arg(long)]
    pub measured: Option<String>,

    /// Unit to convert to, overriding the template's.
    #[arg(long)]
    pub unit: Option<String>,

    /// Pixels per foot.
    #[arg(long)]
    pub scale: Option<f64>,

    /// Treat the value as this kind, overriding the template's tool.
    #[arg(long)]
    pub kind: Option<MeasureKind>,

    /// Override a template variable. Repeatable.
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, f64)>,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct LintArgs {
    /// Template library (JSON). Defaults to `templates` from the config.
    pub library: Option<PathBuf>,

    /// Only check this template.
    #[arg(long, short)]
    pub template: Option<String>,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Project file (JSON) with page scales and markups.
    pub project: PathBuf,

    #[arg(long, short, value_name = "FILE")]
    pub output: PathBuf,

    /// Column ids to include, e.g. name,quantityDisplay,grandTotal.
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Pixels per foot for pages without a calibration.
    #[arg(long)]
    pub scale: Option<f64>,
}

/// `NAME=VALUE`, split on the last `=` so names may contain spaces.
fn parse_var(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {:?}", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing name in {:?}", s));
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid number {:?} for {}", value.trim(), name))?;
    Ok((name.to_string(), value))
}

fn init_logging(config_filter: &str) {
    let filter = EnvFilter::try_from_env("TAKEOFF_LOG")
        .or_else(|_| EnvFilter::try_new(config_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, warnings) = if cli.no_config {
        (config::Config::default(), Vec::new())
    } else {
        config::load_config(cli.config.as_deref())
    };
    init_logging(&config.log_filter);
    for warning in warnings {
        tracing::warn!("{}", warning);
    }

    let result = match cli.command {
        Command::Eval(args) => commands::eval(args),
        Command::Price(args) => commands::price(args, &config),
        Command::Lint(args) => commands::lint(args, &config),
        Command::Export(args) => commands::export(args, &config),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_var_splits_on_last_equals() {
        assert_eq!(parse_var("Wall Height=9"), Ok(("Wall Height".to_string(), 9.0)));
        assert_eq!(parse_var("a=b=2.5"), Ok(("a=b".to_string(), 2.5)));
        assert!(parse_var("height").is_err());
        assert!(parse_var("=3").is_err());
        assert!(parse_var("height=tall").is_err());
    }
}

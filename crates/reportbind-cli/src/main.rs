//! reportbind CLI - build Word reports from templates and query results

mod config;
mod timespec;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{ArgAction, Parser, Subcommand};
use env_logger::Env;
use reportbind::prelude::*;
use reportbind::{TableModel, XmlTree};

use crate::config::{ReportConfig, EARLIEST_TIME, LATEST_TIME};
use crate::timespec::{parse_relative, PARAMETER_FORMAT};

#[derive(Parser)]
#[command(name = "reportbind")]
#[command(
    author,
    version,
    about = "Fill Word report templates with query results"
)]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bind a template using a report configuration
    Build {
        /// Report configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Output document (default: from the configuration)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Start of the reporting window, e.g. `today-7d` or `lastmonth`
        #[arg(long)]
        earliest: Option<String>,

        /// End of the reporting window, e.g. `now` or `thismonth`
        #[arg(long)]
        latest: Option<String>,

        /// Extra report parameter, overriding the configuration
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        params: Vec<(String, String)>,
    },

    /// List the placeholders of a template
    Inspect {
        /// Template document
        template: PathBuf,
    },

    /// Render a result file as a WordprocessingML table to stdout
    RenderTable {
        /// Result file (JSON with `fields` and `rows`)
        input: PathBuf,

        /// Table style id
        #[arg(short, long, default_value = reportbind::DEFAULT_TABLE_STYLE)]
        style: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build {
            config,
            output,
            earliest,
            latest,
            params,
        } => build(&config, output, earliest.as_deref(), latest.as_deref(), params),
        Commands::Inspect { template } => inspect(&template),
        Commands::RenderTable { input, style } => render_table(&input, &style),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty parameter name in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

fn build(
    config_path: &Path,
    output: Option<PathBuf>,
    earliest: Option<&str>,
    latest: Option<&str>,
    params: Vec<(String, String)>,
) -> Result<()> {
    let config = ReportConfig::load(config_path)?;
    let now = Local::now().naive_local();

    let mut parameters = config.parameters_with_builtins(now);
    for (name, expr) in [(EARLIEST_TIME, earliest), (LATEST_TIME, latest)] {
        if let Some(expr) = expr {
            let time = parse_relative(expr, now)
                .with_context(|| format!("Invalid --{} '{}'", name_flag(name), expr))?;
            parameters.insert(name.to_string(), time.format(PARAMETER_FORMAT).to_string());
        }
    }
    parameters.extend(params);

    let results = config.result_set(&parameters)?;
    let output = output.unwrap_or_else(|| config.output_path(&parameters));
    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create '{}'", dir.display()))?;
    }

    let template = config.template_path();
    log::info!("Binding '{}' into '{}'", template.display(), output.display());
    let report = build_report(&template, &output, &results, &config.bind_options())
        .with_context(|| format!("Failed to build report from '{}'", template.display()))?;

    eprintln!(
        "Bound {} placeholders ({} fell back) into '{}'",
        report.placeholders.len(),
        report.fallbacks(),
        output.display()
    );
    if report.skipped > 0 {
        eprintln!("Skipped {} nested placeholders", report.skipped);
    }
    Ok(())
}

fn name_flag(parameter: &str) -> &'static str {
    if parameter == EARLIEST_TIME {
        "earliest"
    } else {
        "latest"
    }
}

fn inspect(path: &Path) -> Result<()> {
    let package =
        Package::open(path).with_context(|| format!("Failed to open '{}'", path.display()))?;
    let regions = inspect_template(&package)
        .with_context(|| format!("Failed to scan '{}'", path.display()))?;

    println!("Template: {}", path.display());
    println!("Placeholders: {}", regions.len());
    for region in &regions {
        let context = match region.context {
            StructuralContext::Inline => "inline",
            StructuralContext::TableCell => "cell",
            StructuralContext::Block => "block",
        };
        print!(
            "  {:<16} {:<6} {:<24} {}",
            region.kind, context, region.part, region.title
        );
        match &region.chart {
            Some(chart) => println!(" (sheet '{}')", chart.sheet_name),
            None => println!(),
        }
    }
    Ok(())
}

fn render_table(input: &Path, style: &str) -> Result<()> {
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read '{}'", input.display()))?;
    let data = TabularResult::from_json(&json)
        .with_context(|| format!("Invalid result '{}'", input.display()))?;

    let table = TableModel::from_result(&data, style);
    let bytes = XmlTree::from_element(&table.to_element()).to_bytes()?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(&bytes)?;
    handle.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("Customer=A=B").unwrap(),
            ("Customer".to_string(), "A=B".to_string())
        );
        assert!(parse_key_value("Customer").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_cli_parses_build() {
        let cli = Cli::try_parse_from([
            "reportbind", "-vv", "build", "-c", "r.json", "--earliest", "today-7d", "-p", "A=1",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Build { config, earliest, params, output, .. } => {
                assert_eq!(config, PathBuf::from("r.json"));
                assert_eq!(earliest.as_deref(), Some("today-7d"));
                assert_eq!(params, vec![("A".to_string(), "1".to_string())]);
                assert!(output.is_none());
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

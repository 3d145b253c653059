use anyhow::{Context as AnyhowContext, Result};
use clap::{ArgGroup, Parser, ValueEnum};
use pom_extractor::{decode_xml, parse_element_list, Extractor, ExtractorConfig};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

mod output;

#[derive(Parser)]
#[command(name = "pom-interceptor")]
#[command(about = "Derive POM_* build parameters from a Maven POM", long_about = None)]
#[command(version)]
#[command(group(ArgGroup::new("query").required(true).args(["selector", "elements"])))]
struct Cli {
    /// POM file to read ("-" for stdin)
    #[arg(long, default_value = "pom.xml")]
    pom: PathBuf,

    /// XPath selector for the elements to export
    #[arg(short, long)]
    selector: Option<String>,

    /// Comma-separated names of top-level POM elements (e.g. artifactId,version)
    #[arg(short, long)]
    elements: Option<String>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not report the version badge
    #[arg(long)]
    no_badge: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Env)]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long)]
    quiet: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// KEY=value lines, with backslash, newline and CR escaped
    Env,
    /// Java properties file
    Properties,
    /// Full result as JSON
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut config = match &cli.config {
        Some(path) => ExtractorConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ExtractorConfig::default(),
    };
    if cli.no_badge {
        config.emit_badge = false;
    }
    let extractor = Extractor::new(config)?;

    let data = read_pom(&cli.pom)?;
    let xml = decode_xml(&data)
        .with_context(|| format!("Failed to decode POM {}", cli.pom.display()))?;
    let result = match &cli.selector {
        Some(selector) => extractor.extract(xml, selector),
        None => {
            let list = cli.elements.as_deref().unwrap_or_default();
            extractor.extract_elements(xml, &parse_element_list(list))
        }
    }
    .with_context(|| format!("Failed to extract parameters from {}", cli.pom.display()))?;

    log::debug!("Extracted {} parameter(s)", result.entries().len());
    if let Some(badge) = result.badge_text() {
        log::info!("Badge: {badge}");
    }

    print!("{}", output::render(&result, cli.format)?);
    Ok(())
}

fn read_pom(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut data = Vec::new();
        io::stdin()
            .read_to_end(&mut data)
            .context("Failed to read POM from stdin")?;
        return Ok(data);
    }

    fs::read(path).with_context(|| format!("Failed to read POM {}", path.display()))
}

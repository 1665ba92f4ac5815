//! socioscope demo binary.
//!
//! Runs one scan against the bundled fixture collector and prints the
//! result as JSON. Real deployments register live collector adapters
//! instead of fixtures; the engine does not care which it is given.

use anyhow::{bail, Context, Result};
use socioscope::{
    CollectorSet, IdentifierType, IdentityQuery, Platform, RegexExtractor, ScanEngine,
    ScanOptions, StaticCollector,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_FIXTURES: &str = "fixtures/profiles.json";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("socioscope=info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let args = CliArgs::parse(std::env::args().skip(1))?;

    println!("{}", "═".repeat(62));
    println!("  socioscope - profile exposure and impersonation scan");
    println!("{}", "═".repeat(62));

    let fixtures = Arc::new(
        StaticCollector::from_file(&args.fixtures)
            .with_context(|| format!("Fixture collector unavailable ({})", args.fixtures))?,
    );
    let platforms = if args.platforms.is_empty() {
        fixtures.platforms()
    } else {
        args.platforms.clone()
    };

    let collectors = CollectorSet::new().register_all(&platforms, fixtures);
    let engine = ScanEngine::new(collectors, Arc::new(RegexExtractor::new()))
        .with_options(ScanOptions::from_env());

    let query = IdentityQuery::new(&args.identifier, args.identifier_type, &platforms)?;
    info!(identifier = %query.raw_input, kind = %query.identifier_type, "Query normalized");

    let result = engine.scan(query).await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    println!("{}", "═".repeat(62));
    println!(
        "  {} profile(s) | risk {} ({}) | {} impersonation flag(s){}",
        result.total_profiles_found,
        result.overall_risk.score,
        result.overall_risk.level,
        result.impersonation_risks.len(),
        if result.partial { " | PARTIAL" } else { "" }
    );
    println!("{}", "═".repeat(62));

    Ok(())
}

struct CliArgs {
    identifier: String,
    identifier_type: Option<IdentifierType>,
    platforms: Vec<Platform>,
    fixtures: String,
}

impl CliArgs {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Result<Self> {
        let mut identifier = None;
        let mut identifier_type = None;
        let mut platforms = Vec::new();
        let mut fixtures = DEFAULT_FIXTURES.to_string();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--type" | "-t" => {
                    let value = args
                        .next()
                        .context("--type needs a value (name|username|email)")?;
                    identifier_type = Some(parse_identifier_type(&value)?);
                }
                "--platforms" | "-p" => {
                    let value = args
                        .next()
                        .context("--platforms needs a comma-separated list")?;
                    for part in value.split(',') {
                        platforms.push(part.parse::<Platform>()?);
                    }
                }
                "--fixtures" | "-f" => {
                    fixtures = args.next().context("--fixtures needs a path")?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                flag if flag.starts_with('-') => bail!("Unknown flag: {}", flag),
                positional => {
                    if identifier.is_some() {
                        bail!("Only one identifier may be given");
                    }
                    identifier = Some(positional.to_string());
                }
            }
        }

        Ok(Self {
            identifier: identifier.context("An identifier is required; try --help")?,
            identifier_type,
            platforms,
            fixtures,
        })
    }
}

fn parse_identifier_type(value: &str) -> Result<IdentifierType> {
    match value.to_lowercase().as_str() {
        "name" => Ok(IdentifierType::Name),
        "username" | "handle" => Ok(IdentifierType::Username),
        "email" => Ok(IdentifierType::Email),
        other => bail!(
            "Unknown identifier type: {} (expected name, username, or email)",
            other
        ),
    }
}

fn print_usage() {
    println!("Usage: socioscope <identifier> [options]");
    println!();
    println!("Options:");
    println!("  -t, --type <kind>        Force classification: name, username, or email");
    println!("  -p, --platforms <list>   Comma-separated platforms (default: all in fixtures)");
    println!(
        "  -f, --fixtures <path>    Fixture file for the offline collector (default: {})",
        DEFAULT_FIXTURES
    );
    println!("  -h, --help               Show this help");
    println!();
    println!("Environment:");
    println!("  SOCIOSCOPE_PLATFORM_TIMEOUT_SECS   Per-attempt collection timeout");
    println!("  SOCIOSCOPE_GLOBAL_DEADLINE_SECS    Whole-scan deadline");
    println!("  SOCIOSCOPE_RETRY_LIMIT             Extra attempts for transient failures");
    println!("  SOCIOSCOPE_SIMILARITY_THRESHOLD    Impersonation flag threshold (0-100)");
}

//! ROIC CLI binary.
//!
//! Provides a command-line interface for ROIC quality assessment, forecasts,
//! history, comparisons and the HTTP service.

mod cmd;
mod config;
mod data;

use anyhow::Result;
use clap::{Parser, Subcommand};
use crate::cmd::OutputFormat;
use crate::config::Settings;
use roic::QualityCalculator;
use roic::quality::ExportFormat;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "roic")]
#[command(about = "ROIC quality metrics and quality-based price forecasts", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./roic.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// JSON fundamentals file to use instead of the FMP API
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess the quality of a company's latest period
    Assess {
        /// Ticker symbol
        symbol: String,
    },

    /// Quality-based price forecast with scenarios
    Forecast {
        /// Ticker symbol
        symbol: String,

        /// Projection horizon in years (defaults to forecast.years)
        #[arg(short, long)]
        years: Option<u32>,
    },

    /// Multi-year ROIC history and trend
    History {
        /// Ticker symbol
        symbol: String,

        /// Number of annual periods (defaults to forecast.periods)
        #[arg(short, long)]
        years: Option<u32>,

        /// Export the rows as csv or json instead of printing a report
        #[arg(short, long)]
        export: Option<ExportFormat>,

        /// Export destination (stdout when omitted)
        #[arg(short, long, requires = "export")]
        output: Option<PathBuf>,
    },

    /// Rank symbols by combined quality and valuation score
    Compare {
        /// Ticker symbols
        #[arg(required = true, value_delimiter = ',')]
        symbols: Vec<String>,
    },

    /// Classify a ROIC percentage against the quality bands
    Classify {
        /// ROIC in percent
        #[arg(allow_negative_numbers = true)]
        roic: f64,
    },

    /// Show the active quality bands
    Bands,

    /// Run the HTTP service
    Serve {
        /// Address to bind (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Pick up ROIC_* and FMP_API_KEY from .env before reading settings
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    let calculator = QualityCalculator::new(settings.policy.clone())?;
    let format = cli.format;
    let periods = settings.forecast.periods;
    let source = || data::open_source(cli.data.as_deref(), &settings);

    match cli.command {
        Commands::Assess { ref symbol } => {
            cmd::assess::run(source()?.as_ref(), &calculator, symbol, periods, format).await?;
        }
        Commands::Forecast { ref symbol, years } => {
            let years = years.unwrap_or(settings.forecast.years);
            cmd::forecast::run(source()?.as_ref(), &calculator, symbol, years, periods, format)
                .await?;
        }
        Commands::History {
            ref symbol,
            years,
            export,
            ref output,
        } => {
            let years = years.unwrap_or(periods).max(1);
            cmd::history::run(
                source()?.as_ref(),
                &calculator,
                symbol,
                years,
                export,
                output.as_deref(),
                format,
            )
            .await?;
        }
        Commands::Compare { ref symbols } => {
            cmd::compare::run(source()?.as_ref(), &calculator, symbols, periods, format).await?;
        }
        Commands::Classify { roic } => {
            cmd::classify::run(&calculator, roic, format)?;
        }
        Commands::Bands => {
            cmd::bands::run(calculator.policy(), format)?;
        }
        Commands::Serve { ref host, port } => {
            let host = host.as_deref().unwrap_or(&settings.server.host);
            let port = port.unwrap_or(settings.server.port);
            cmd::serve::run(source()?, calculator, host, port, periods).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "roic", "forecast", "AAPL", "--years", "5", "--format", "json", "--data", "f.json",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.data, Some(PathBuf::from("f.json")));
        assert!(matches!(cli.command, Commands::Forecast { years: Some(5), .. }));
    }

    #[test]
    fn test_parse_compare_list() {
        let cli = Cli::try_parse_from(["roic", "compare", "AAPL,MSFT", "GOOG"]).unwrap();
        let Commands::Compare { symbols } = cli.command else {
            panic!("expected compare");
        };
        assert_eq!(symbols, vec!["AAPL", "MSFT", "GOOG"]);
    }

    #[test]
    fn test_parse_history_export() {
        let cli =
            Cli::try_parse_from(["roic", "history", "AAPL", "--export", "csv", "-o", "out.csv"])
                .unwrap();
        assert!(matches!(
            cli.command,
            Commands::History {
                export: Some(ExportFormat::Csv),
                ..
            }
        ));

        assert!(Cli::try_parse_from(["roic", "history", "AAPL", "-o", "out.csv"]).is_err());
        assert!(Cli::try_parse_from(["roic", "history", "AAPL", "--export", "xml"]).is_err());
    }

    #[test]
    fn test_parse_negative_roic() {
        let cli = Cli::try_parse_from(["roic", "classify", "-4.5"]).unwrap();
        assert!(matches!(cli.command, Commands::Classify { roic } if roic < 0.0));
    }
}

// Entrypoint for the CLI application.
// - Parses flags, sets up logging and loads configuration.
// - Opens the configured workbook (Google Sheets or a local file) and hands
//   it to the UI loop.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bookworm_cli::config::{Backend, Config, Overrides};
use bookworm_cli::store::local::LocalWorkbook;
use bookworm_cli::store::sheets::SheetsClient;
use bookworm_cli::ui::main_menu;
use clap::Parser;
use log::{info, LevelFilter};

#[derive(Parser, Debug)]
#[clap(name = "bookworm", version, about = "Personal library catalog backed by a spreadsheet")]
struct Cli {
    #[clap(
        long,
        conflicts_with = "spreadsheet_id",
        help = "Keep the library in this JSON file instead of a spreadsheet"
    )]
    local: Option<PathBuf>,

    #[clap(long, help = "Google Sheets spreadsheet id (needs BOOKWORM_ACCESS_TOKEN)")]
    spreadsheet_id: Option<String>,

    #[clap(long, help = "Books shown per page")]
    page_size: Option<String>,

    #[clap(
        long,
        default_value = "warn",
        value_parser = parse_level,
        help = "off, error, warn, info, debug or trace"
    )]
    log_level: LevelFilter,

    #[clap(long, help = "Write logs to this file instead of stderr")]
    log_file: Option<PathBuf>,
}

fn parse_level(raw: &str) -> Result<LevelFilter, String> {
    raw.parse()
        .map_err(|_| format!("unknown log level '{raw}', expected off, error, warn, info, debug or trace"))
}

fn init_logging(cli: &Cli) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(cli.log_level);
    if let Some(path) = &cli.log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let overrides = Overrides {
        local: cli.local.clone(),
        spreadsheet_id: cli.spreadsheet_id.clone(),
        page_size: cli.page_size.clone(),
    };
    Ok(Config::from_env(&overrides)?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;
    let config = load_config(&cli)?;

    // Both backends implement `Workbook`; the UI is generic over it.
    match &config.backend {
        Backend::Sheets {
            api_url,
            spreadsheet_id,
            access_token,
        } => {
            info!("using spreadsheet {}", spreadsheet_id);
            let workbook = SheetsClient::new(api_url.as_str(), spreadsheet_id.as_str(), access_token.as_str())
                .context("Failed to build spreadsheet client")?;
            main_menu(&workbook, &config)
        }
        Backend::Local { path } => {
            info!("using local library {}", path.display());
            let workbook = LocalWorkbook::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            main_menu(&workbook, &config)
        }
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use async_trait::async_trait;
use clap::{Parser as _, Subcommand};
use serde_json::{json, Value};
use tracing::{info, warn};

use score_core::{ConversionResult, Game, ImportType, InMemoryCatalog, Playtype};
use score_import::app::ports::ConvertOutputPort;
use score_import::config::Config;
use score_import::constants::default_service;
use score_import::pipeline::convert::converters::BatchManualContext;
use score_import::pipeline::parser::{
    BatchManualParser, EamusementIidxCsvParser, MetricsParser, ParsedImport, Parser,
};
use score_import::{logging, observability, ConvertUseCase, ConverterKey, ConverterRegistry, ImportContext, ReferenceResolver};

#[derive(clap::Parser)]
#[command(name = "score_import")]
#[command(about = "Convert external game score records into canonical dry scores")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one upload and print each converted score as a JSON line
    Convert {
        /// e.g. api/cg-dev-sdvx, file/eamusement-iidx-csv, file/batch-manual
        #[arg(long)]
        import_type: ImportType,
        /// Defaults to the game the import type is for
        #[arg(long)]
        game: Option<Game>,
        /// Required for IIDX CSVs; otherwise defaults from the game or the file
        #[arg(long)]
        playtype: Option<Playtype>,
        /// CSV, batch-manual JSON, or one JSON record per line for API types
        #[arg(long)]
        input: PathBuf,
        /// Service name recorded on scores
        #[arg(long)]
        service: Option<String>,
        /// Game version the file was exported from (IIDX CSVs)
        #[arg(long)]
        game_version: Option<String>,
        /// Catalog snapshot; overrides [catalog] path in the config
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Print a Prometheus metrics snapshot when done
        #[arg(long)]
        metrics: bool,
    },
    /// List every import type, game and playtype with a converter
    List,
}

struct StdoutOutput;

#[async_trait]
impl ConvertOutputPort for StdoutOutput {
    async fn write_conversion(&self, index: usize, result: &ConversionResult) -> anyhow::Result<()> {
        let line = serde_json::to_string(&json!({ "index": index, "result": result }))?;
        println!("{}", line);
        Ok(())
    }
}

/// Records given one JSON object per line, as API pulls are stored
fn parse_json_lines(bytes: &[u8], service: &str) -> Result<ParsedImport> {
    let text = std::str::from_utf8(bytes).context("input is not valid UTF-8")?;
    let records = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<Value>(line).with_context(|| format!("line {} is not JSON", i + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ParsedImport {
        records,
        context: ImportContext::new(service, None),
    })
}

fn default_game(import_type: ImportType) -> Game {
    match import_type {
        ImportType::ApiCgDevSdvx | ImportType::ApiCgNagSdvx | ImportType::ApiCgGanSdvx => Game::Sdvx,
        ImportType::FileEamusementIidxCsv | ImportType::FilePliIidxCsv | ImportType::FileBatchManual => {
            Game::Iidx
        }
    }
}

/// Parse the input and work out which converter key it belongs under
fn parse_input(
    import_type: ImportType,
    game: Option<Game>,
    playtype: Option<Playtype>,
    service: &str,
    game_version: Option<String>,
    bytes: &[u8],
) -> Result<(ConverterKey, ParsedImport)> {
    match import_type {
        ImportType::FileEamusementIidxCsv | ImportType::FilePliIidxCsv => {
            let playtype = playtype.context("--playtype is required for IIDX CSV imports")?;
            let parser = MetricsParser::new(EamusementIidxCsvParser::new(
                service.to_string(),
                playtype,
                game_version,
            ));
            let parsed = parser.parse(bytes)?;
            Ok((ConverterKey::new(import_type, Game::Iidx, playtype), parsed))
        }
        ImportType::FileBatchManual => {
            let parsed = MetricsParser::new(BatchManualParser).parse(bytes)?;
            let meta: BatchManualContext = serde_json::from_value(parsed.context.data.clone())?;
            if game.map_or(false, |g| g != meta.game) || playtype.map_or(false, |p| p != meta.playtype) {
                bail!(
                    "File is for {} {}, which does not match the requested game and playtype",
                    meta.game,
                    meta.playtype
                );
            }
            Ok((ConverterKey::new(import_type, meta.game, meta.playtype), parsed))
        }
        ImportType::ApiCgDevSdvx | ImportType::ApiCgNagSdvx | ImportType::ApiCgGanSdvx => {
            let game = game.unwrap_or_else(|| default_game(import_type));
            let playtype = match playtype {
                Some(p) => p,
                None => *game.playtypes().first().context("game has no playtypes")?,
            };
            Ok((ConverterKey::new(import_type, game, playtype), parse_json_lines(bytes, service)?))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    let _log_guard = logging::init_logging(&config.logging)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            let registry = ConverterRegistry::standard(ReferenceResolver::new(Arc::new(InMemoryCatalog::new())))?;
            for key in registry.list_keys() {
                let enabled = if config.is_enabled(key.import_type) { "" } else { " (disabled)" };
                println!("{}{}", key, enabled);
            }
        }
        Commands::Convert {
            import_type,
            game,
            playtype,
            input,
            service,
            game_version,
            catalog,
            metrics,
        } => {
            let metrics_handle = if metrics {
                Some(observability::init().map_err(|e| anyhow::anyhow!(e.to_string()))?)
            } else {
                None
            };

            if !config.is_enabled(import_type) {
                bail!("Import type {} is disabled in the config", import_type);
            }

            let catalog_path = catalog
                .or_else(|| config.catalog.path.clone())
                .context("No catalog given; pass --catalog or set [catalog] path")?;
            let catalog = InMemoryCatalog::load_from_file(&catalog_path)
                .with_context(|| format!("Failed to load catalog {}", catalog_path.display()))?;
            info!(
                "Loaded catalog: {} songs, {} charts",
                catalog.song_count(),
                catalog.chart_count()
            );

            let registry = ConverterRegistry::standard(ReferenceResolver::new(Arc::new(catalog)))?;
            config.validate_against(&registry)?;

            let service = service.unwrap_or_else(|| default_service(import_type).to_string());
            let bytes = std::fs::read(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let (key, parsed) = parse_input(import_type, game, playtype, &service, game_version, &bytes)?;

            let use_case = ConvertUseCase::new(
                Arc::new(registry),
                Box::new(StdoutOutput),
                config.import.max_concurrency,
            );
            let report = use_case.convert_batch(key, parsed.records, parsed.context).await?;

            for failed in report.failures() {
                warn!(
                    index = failed.index,
                    kind = %failed.failure.kind(),
                    "{}",
                    failed.failure.message()
                );
            }
            eprintln!("{}", serde_json::to_string(&report.summary())?);

            if let Some(handle) = metrics_handle {
                eprintln!("{}", handle.render());
            }
        }
    }

    Ok(())
}

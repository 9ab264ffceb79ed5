use clap::{Parser, Subcommand};
use contracts::usecases::u508_sync_stocks::SyncOutcome;
use std::path::{Path, PathBuf};
use stock_sync::shared::config::{load_config, Config};
use stock_sync::shared::marketplaces::MarketplaceApi;
use stock_sync::system;
use stock_sync::usecases::u508_sync_stocks::feed_client::FeedSource;
use stock_sync::usecases::u508_sync_stocks::{
    FeedClient, OzonApiClient, SyncExecutor, YandexApiClient,
};

/// Выгрузка остатков и цен поставщика на маркетплейсы
#[derive(Parser, Debug)]
#[command(name = "stock_sync", version, about)]
struct Args {
    /// Путь к config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Локальный прайс (.zip или .xls) вместо скачивания
    #[arg(long, global = true)]
    feed_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Синхронизировать кабинет OZON
    Ozon,
    /// Синхронизировать кампании Яндекс Маркета (FBS, затем DBS)
    Yandex,
    /// OZON, затем Яндекс Маркет
    All,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to load .env: {}", e);
        }
    }

    let log_dir = system::tracing::initialize()?;
    let config = load_config(args.config.as_deref())?;

    let source = match &args.feed_file {
        Some(path) => FeedSource::File(path.clone()),
        None => FeedSource::Url(config.feed.url.clone()),
    };
    let feed = FeedClient::new()?.load(&source, &config.feed).await?;
    let executor = SyncExecutor::new(feed);

    let api_log = config.logging.api_log.then_some(log_dir.as_path());
    let mut outcomes = Vec::new();

    if matches!(args.command, Command::Ozon | Command::All) {
        outcomes.extend(run_ozon(&executor, &config, api_log).await);
    }
    if matches!(args.command, Command::Yandex | Command::All) {
        outcomes.extend(run_yandex(&executor, &config, api_log).await);
    }

    for outcome in &outcomes {
        println!("{}", summary_line(outcome));
    }

    Ok(())
}

async fn run_ozon(
    executor: &SyncExecutor,
    config: &Config,
    api_log: Option<&Path>,
) -> Vec<SyncOutcome> {
    let client = match config
        .validate_ozon()
        .and_then(|_| OzonApiClient::new(&config.ozon))
    {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("OZON sync is not configured: {}", e);
            return vec![SyncOutcome::Failed {
                target: "Ozon".to_string(),
                error: e.to_string(),
            }];
        }
    };
    let client = match api_log {
        Some(dir) => client.with_api_log(dir.to_path_buf()),
        None => client,
    };

    vec![executor.run_target(&client).await]
}

async fn run_yandex(
    executor: &SyncExecutor,
    config: &Config,
    api_log: Option<&Path>,
) -> Vec<SyncOutcome> {
    if let Err(e) = config.validate_yandex() {
        tracing::error!("Yandex Market sync is not configured: {}", e);
        return vec![SyncOutcome::Failed {
            target: "Яндекс Маркет".to_string(),
            error: e.to_string(),
        }];
    }

    let mut targets: Vec<Box<dyn MarketplaceApi>> = Vec::new();
    let mut outcomes = Vec::new();
    for campaign in &config.yandex.campaigns {
        match YandexApiClient::new(&config.yandex, campaign) {
            Ok(client) => {
                let client = match api_log {
                    Some(dir) => client.with_api_log(dir.to_path_buf()),
                    None => client,
                };
                targets.push(Box::new(client));
            }
            Err(e) => outcomes.push(SyncOutcome::Failed {
                target: format!("Яндекс Маркет {}", campaign.label),
                error: e.to_string(),
            }),
        }
    }

    outcomes.extend(executor.run_targets(&targets).await);
    outcomes
}

fn summary_line(outcome: &SyncOutcome) -> String {
    let details = match outcome {
        SyncOutcome::Completed(report) => format!(
            "{} остатков ({} в наличии), пачек остатков: {}, цен: {}, пачек цен: {}",
            report.stocks.len(),
            report.in_stock.len(),
            report.stock_batches,
            report.prices_sent,
            report.price_batches
        ),
        SyncOutcome::Skipped { reason, .. } => reason.clone(),
        SyncOutcome::Failed { error, .. } => error.clone(),
    };
    let status = match outcome {
        SyncOutcome::Completed(_) => "OK",
        SyncOutcome::Skipped { .. } => "SKIP",
        SyncOutcome::Failed { .. } => "FAIL",
    };
    format!("[{}] {}: {}", status, outcome.target(), details)
}

mod coingecko;
mod config;
mod engine;
mod exchange_rate;
mod export;
mod pricing;
mod types;
mod validation;
mod view;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Args as ClapArgs, Parser, Subcommand};
use dotenvy::dotenv;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::coingecko::{coingecko_client::CoinGeckoClient, coingecko_config::CoinGeckoConfig};
use crate::config::quote_config::QuoteConfig;
use crate::engine::{
    quote_engine::QuoteEngine,
    session::{QuoteSession, SessionPhase},
};
use crate::exchange_rate::exchange_rate_client::ExchangeRateClient;
use crate::export::{
    clipboard::{Clipboard, FileClipboard, StdoutClipboard},
    handoff::ChatHandoff,
    quote_text::QuoteFormatter,
};
use crate::pricing::{
    price_book::{PriceBook, PriceLookup},
    price_fetcher::{FailureMode, FailurePolicy, PriceFetcher},
};
use crate::types::{asset::Asset, fiat::FiatCurrency, money::format_money};
use crate::validation::{form::QuoteForm, validator::RequestValidator};

#[derive(Debug, Clone, Parser)]
#[command(name = "otc-quote", about = "OTC desk quote calculator")]
struct Args {
    #[arg(long, default_value = QuoteConfig::FILE_NAME)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Price a trade and render the quote.
    Quote(QuoteArgs),
    /// Keep a live price book of the catalog.
    Prices {
        /// Refresh once, print the table and exit.
        #[arg(long)]
        once: bool,
    },
}

#[derive(Debug, Clone, ClapArgs)]
struct QuoteArgs {
    #[arg(long, default_value = "buy")]
    pub operation: String,

    #[arg(long, default_value = "bitcoin")]
    pub asset: String,

    #[arg(long)]
    pub amount: String,

    #[arg(long, default_value = "usd")]
    pub fiat: String,

    #[arg(long, default_value = "bitcoin")]
    pub blockchain: String,

    #[arg(long)]
    pub wallet_address: String,

    #[arg(long, default_value = "")]
    pub bank_name: String,

    #[arg(long, default_value = "")]
    pub country: String,

    #[arg(long, default_value = "")]
    pub account_owner: String,

    #[arg(long, default_value = "")]
    pub owner_id: String,

    #[arg(long, default_value = "")]
    pub account_number: String,

    #[arg(long, default_value = "savings")]
    pub account_type: String,

    #[arg(long, default_value = "")]
    pub email: String,

    #[arg(long, default_value = "")]
    pub cellphone: String,

    #[arg(long, default_value = "")]
    pub telegram: String,

    /// Overrides `on_price_fetch_failure` from the config file.
    #[arg(long, value_enum)]
    pub on_failure: Option<FailureMode>,

    /// Write the export text to this file, or `-` for stdout.
    #[arg(long)]
    pub copy_to: Option<PathBuf>,

    /// Print the chat link that opens the desk with the quote pre-filled.
    #[arg(long)]
    pub handoff: bool,
}

impl From<&QuoteArgs> for QuoteForm {
    fn from(args: &QuoteArgs) -> Self {
        Self {
            operation: args.operation.clone(),
            asset: args.asset.clone(),
            fiat: args.fiat.clone(),
            amount: args.amount.clone(),
            blockchain: args.blockchain.clone(),
            wallet_address: args.wallet_address.clone(),
            bank_name: args.bank_name.clone(),
            country: args.country.clone(),
            account_owner: args.account_owner.clone(),
            owner_id: args.owner_id.clone(),
            account_number: args.account_number.clone(),
            account_type: args.account_type.clone(),
            email: args.email.clone(),
            cellphone: args.cellphone.clone(),
            telegram: args.telegram.clone(),
        }
    }
}

const DEFAULT_LOG_FILTER: &str = "otc_quote=info,otc_quote::pricing=debug";

/// `RUST_LOG` replaces the defaults as a whole when it is set and parses.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = QuoteConfig::load(&args.config)?;

    match &args.command {
        Command::Quote(quote_args) => run_quote(&config, quote_args).await,
        Command::Prices { once } => run_prices(&config, *once).await,
    }
}

async fn run_quote(config: &QuoteConfig, args: &QuoteArgs) -> Result<()> {
    let mode = args.on_failure.unwrap_or(config.on_price_fetch_failure);
    info!(on_failure = %mode, submission_policy = %config.submission_policy, "starting quote");

    let source = CoinGeckoClient::new(
        CoinGeckoConfig::from_env(config.price_api_base.clone()),
        config.request_timeout(),
    )?;

    let fetcher = PriceFetcher::new(
        Arc::new(source),
        config.retry_policy(),
        config.request_timeout(),
        FailurePolicy::from_mode(mode, config.fallback_table()),
    );

    let session = QuoteSession::new(
        Arc::new(QuoteEngine::new(fetcher)),
        Arc::new(RequestValidator::standard()),
        config.submission_policy,
    );

    if let Err(error) = session.submit(QuoteForm::from(args)).await {
        debug!(%error, "quote submission ended without a quote");
    }
    print!("{}", session.view().await);

    let quote = match (session.phase().await, session.quote().await) {
        (SessionPhase::Success, Some(quote)) => quote,
        (SessionPhase::Failed(message), _) => bail!("no quote generated: {message}"),
        (phase, _) => bail!("no quote generated, session is {phase:?}"),
    };

    let formatter = QuoteFormatter::new(config.desk.clone(), config.quote_validity_minutes);
    let text = formatter.format(&quote);

    if let Some(target) = &args.copy_to {
        let copied = if target.as_os_str() == "-" {
            StdoutClipboard.write_text(&text)
        } else {
            FileClipboard::new(target).write_text(&text)
        };

        match copied {
            Ok(()) => info!(quote_id = %quote.id, "quote copied"),
            Err(error) => warn!(%error, "failed to copy quote, please copy it manually"),
        }
    }

    if args.handoff {
        let link = ChatHandoff::new(&config.desk.telegram_handle).link(&text)?;
        println!("{link}");
    }

    session.reset().await;
    debug!(quote_id = %quote.id, "quote handed off, session cleared");

    Ok(())
}

async fn run_prices(config: &QuoteConfig, once: bool) -> Result<()> {
    let price_source = CoinGeckoClient::new(
        CoinGeckoConfig::from_env(config.price_api_base.clone()),
        config.request_timeout(),
    )?;
    let rate_source = ExchangeRateClient::new(config.fx_api_base.clone(), config.request_timeout())?;

    let mut book = PriceBook::new(
        Arc::new(price_source),
        Arc::new(rate_source),
        config.request_timeout(),
        Duration::from_secs(config.price_book.max_age_secs),
    );

    if once {
        let outcome = book.refresh().await;
        info!(?outcome, "price book refreshed");
        print_prices(|asset, fiat| book.lookup(asset, fiat, tokio::time::Instant::now()));
        return Ok(());
    }

    let handle = book.spawn(
        Duration::from_secs(config.price_book.price_refresh_secs),
        Duration::from_secs(config.price_book.fx_refresh_secs),
    );
    let mut snapshots = handle.subscribe();

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    warn!("price book stopped");
                    break;
                }
                print_prices(|asset, fiat| handle.lookup(asset, fiat));
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down price book");
                break;
            }
        }
    }

    Ok(())
}

fn print_prices(lookup: impl Fn(Asset, FiatCurrency) -> PriceLookup) {
    for asset in Asset::ALL {
        let cells: Vec<String> = FiatCurrency::ALL
            .into_iter()
            .map(|fiat| match lookup(asset, fiat) {
                PriceLookup::Fresh(price) => format_money(price.as_f64(), fiat),
                PriceLookup::Stale { price, age } => {
                    format!("{} (stale {}s)", format_money(price.as_f64(), fiat), age.as_secs())
                }
                PriceLookup::Missing => "n/a".to_string(),
            })
            .collect();

        println!("{:<6}{}", asset.symbol(), cells.join(" | "));
    }
}

#[cfg(test)]
mod tests {
    use tracing::level_filters::LevelFilter;

    use super::*;

    #[test]
    fn rust_log_overrides_default_directives() {
        assert_eq!(
            log_filter(Some("otc_quote=trace")).max_level_hint(),
            Some(LevelFilter::TRACE)
        );
        assert_eq!(
            log_filter(Some("otc_quote=warn")).max_level_hint(),
            Some(LevelFilter::WARN)
        );
    }

    #[test]
    fn defaults_apply_without_rust_log() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::DEBUG));
    }
}

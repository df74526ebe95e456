use chrono::{DateTime, Utc};
use tracing::info;

use crate::engine::error::QuoteError;
use crate::pricing::price_fetcher::PriceFetcher;
use crate::types::{
    operation::Operation, price::Price, quote::Quote, quote_id::QuoteId,
    quote_request::QuoteRequest,
};

/// Discount applied to the spot price on sell-side quotes.
pub const SELL_SPREAD: f64 = 0.02;

#[derive(Debug)]
pub struct QuoteEngine {
    fetcher: PriceFetcher,
}

impl QuoteEngine {
    pub fn new(fetcher: PriceFetcher) -> Self {
        Self { fetcher }
    }

    pub async fn quote(&self, request: QuoteRequest) -> Result<Quote, QuoteError> {
        let spot = self.fetcher.spot_price(request.asset, request.fiat).await?;
        let quote = Self::build_quote(request, spot);

        info!(
            quote_id = %quote.id,
            operation = %quote.operation,
            asset = %quote.asset,
            fiat = %quote.fiat,
            amount = quote.amount,
            unit_price = %quote.unit_price,
            total = quote.total,
            "quote built"
        );

        Ok(quote)
    }

    pub fn build_quote(request: QuoteRequest, spot: Price) -> Quote {
        Self::build_quote_at(request, spot, Utc::now())
    }

    pub fn build_quote_at(request: QuoteRequest, spot: Price, now: DateTime<Utc>) -> Quote {
        let unit_price = effective_price(request.operation, spot);
        let total = request.amount * unit_price.as_f64();

        Quote {
            id: QuoteId::generate(now),
            generated_at: now,
            operation: request.operation,
            asset: request.asset,
            fiat: request.fiat,
            blockchain: request.blockchain,
            wallet_address: request.wallet_address,
            amount: request.amount,
            spot_price: spot,
            unit_price,
            total,
            bank: request.bank,
            contact: request.contact,
        }
    }
}

pub fn effective_price(operation: Operation, spot: Price) -> Price {
    match operation {
        Operation::Buy => spot,
        Operation::Sell => spot * (1.0 - SELL_SPREAD),
    }
}

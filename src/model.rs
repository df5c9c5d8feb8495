// Core structs: Offer, Catalog, IndividualDeal, BestDeal
use thiserror::Error;

/// One seller's listing for one product at the requested quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct Offer {
    pub seller: String,
    pub seller_link: String,
    pub seller_reviews: u32,
    pub seller_reviews_link: String,
    pub seller_rating: Option<f64>,
    pub price: f64,
    pub quantity: u32,
    pub delivery_price: f64,
    /// Minimum basket total at which delivery is free. `None` means the seller
    /// offers no free-delivery tier at all; `Some(0.0)` is an always-met tier.
    pub free_delivery: Option<f64>,
    pub total_price: f64,
    pub total_price_plus_delivery: f64,
    pub availability: bool,
    pub link: String,
}

/// Applies the free-delivery threshold policy to a basket total.
pub fn price_plus_delivery(total: f64, delivery_price: f64, free_delivery: Option<f64>) -> f64 {
    match free_delivery {
        Some(threshold) if total >= threshold => total,
        _ => total + delivery_price,
    }
}

impl Offer {
    /// Recomputes the derived totals from price, quantity and delivery terms.
    /// Called once at construction time; the deal engine treats both fields as
    /// invariant inputs afterwards.
    pub fn compute_totals(&mut self) {
        self.total_price = self.price * f64::from(self.quantity);
        self.total_price_plus_delivery =
            price_plus_delivery(self.total_price, self.delivery_price, self.free_delivery);
    }

    /// Checks the contract the deal engine relies on. Upstream code that hands
    /// over nonsense (negative prices, zero quantity) is a bug we want surfaced,
    /// not coerced.
    pub fn validate(&self) -> Result<(), DealError> {
        let fail = |reason: &str| {
            Err(DealError::InvalidOffer {
                seller: self.seller.clone(),
                reason: reason.to_string(),
            })
        };
        if self.seller.is_empty() {
            return fail("empty seller name");
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return fail("price is negative or not finite");
        }
        if self.quantity == 0 {
            return fail("quantity must be positive");
        }
        if !self.delivery_price.is_finite() || self.delivery_price < 0.0 {
            return fail("delivery price is negative or not finite");
        }
        if let Some(threshold) = self.free_delivery {
            if !threshold.is_finite() || threshold < 0.0 {
                return fail("free delivery threshold is negative or not finite");
            }
        }
        if !self.total_price.is_finite() || self.total_price_plus_delivery < self.total_price {
            return fail("derived totals are inconsistent");
        }
        Ok(())
    }
}

/// Scanned products and their offers, in scan order. A plain map would lose
/// insertion order and make tie-breaks in the ranking depend on hash seeds, so
/// this is Vec-backed: same input, same output, every run.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<(String, Vec<Offer>)>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the offer list for a product.
    pub fn insert(&mut self, name: impl Into<String>, offers: Vec<Offer>) {
        let name = name.into();
        match self.products.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = offers,
            None => self.products.push((name, offers)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[Offer]> {
        self.products
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, offers)| offers.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Offer])> {
        self.products
            .iter()
            .map(|(name, offers)| (name.as_str(), offers.as_slice()))
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    pub fn offer_count(&self) -> usize {
        self.products.iter().map(|(_, offers)| offers.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Validates every offer in the catalog, failing fast on the first
    /// contract violation.
    pub fn validate(&self) -> Result<(), DealError> {
        for (_, offers) in self.iter() {
            for offer in offers {
                offer.validate()?;
            }
        }
        Ok(())
    }
}

/// An offer that clears its own free-delivery threshold, annotated with the
/// product it was scanned for.
#[derive(Debug, Clone, PartialEq)]
pub struct IndividualDeal {
    pub product: String,
    pub offer: Offer,
}

/// Single-seller total across every scanned product, for a seller that carries
/// all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct BestDeal {
    /// Product name of the last offer folded into this deal.
    pub product: String,
    pub seller: String,
    pub seller_link: String,
    pub seller_reviews: u32,
    pub seller_reviews_link: String,
    pub seller_rating: Option<f64>,
    pub delivery_price: f64,
    pub free_delivery: Option<f64>,
    pub availability: bool,
    pub link: String,
    pub cumulative_price: f64,
    pub cumulative_price_plus_delivery: f64,
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected response status: {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("invalid selector: {0}")]
    Selector(String),
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("malformed number: `{0}`")]
    MalformedNumber(String),
    #[error("listing contains no offers")]
    EmptyListing,
}

#[derive(Debug, Error)]
pub enum DealError {
    #[error("invalid offer from seller `{seller}`: {reason}")]
    InvalidOffer { seller: String, reason: String },
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

// TrovaPrezzi listing HTML parsing
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::model::{Offer, ParserError};

const SITE_ORIGIN: &str = "https://www.trovaprezzi.it";

/// Matches Italian-formatted amounts: `5,99`, `1.299,00`, `2.184`.
const NUMBER_PATTERN: &str = r"\d+(?:\.\d{3})*(?:,\d+)?";

pub struct TrovaParser {
    number: Regex,
    product_name: Selector,
    listing_row: Selector,
    merchant_name: Selector,
    merchant_anchor: Selector,
    merchant_reviews: Selector,
    basic_price: Selector,
    delivery_price: Selector,
    free_shipping: Selector,
    availability: Selector,
    offer_anchor: Selector,
}

fn selector(css: &'static str) -> Result<Selector, ParserError> {
    Selector::parse(css).map_err(|e| ParserError::Selector(e.to_string()))
}

impl TrovaParser {
    pub fn new() -> Result<Self, ParserError> {
        Ok(Self {
            number: Regex::new(NUMBER_PATTERN)
                .map_err(|e| ParserError::Selector(e.to_string()))?,
            product_name: selector("div.name_and_rating h1")?,
            listing_row: selector("#listing ul li")?,
            merchant_name: selector("div.item_merchant > div > a > span")?,
            merchant_anchor: selector("div.item_merchant > div > a")?,
            merchant_reviews: selector("a.merchant_reviews")?,
            basic_price: selector("div.item_basic_price")?,
            delivery_price: selector("div.item_delivery_price")?,
            free_shipping: selector("div.free_shipping_threshold span span span")?,
            availability: selector("div.item_availability span")?,
            offer_anchor: selector("div.item_actions a")?,
        })
    }

    /// Extracts the product name and every seller row from a listing page.
    /// A listing with no rows parses to an empty offer list, not an error.
    pub fn parse_listing(
        &self,
        html: &str,
        quantity: u32,
    ) -> Result<(String, Vec<Offer>), ParserError> {
        let document = Html::parse_document(html);
        let name = self.product_name_of(&document)?;

        let mut offers = Vec::new();
        for row in document.select(&self.listing_row) {
            offers.push(self.parse_row(row, quantity)?);
        }
        Ok((name, offers))
    }

    /// Extracts the top row of the shipping-included listing variant: the
    /// single best offer once delivery is counted into the ordering.
    pub fn parse_best_shipping_included(
        &self,
        html: &str,
        quantity: u32,
    ) -> Result<(String, Offer), ParserError> {
        let document = Html::parse_document(html);
        let name = self.product_name_of(&document)?;
        let row = document
            .select(&self.listing_row)
            .next()
            .ok_or(ParserError::EmptyListing)?;
        Ok((name, self.parse_row(row, quantity)?))
    }

    fn product_name_of(&self, document: &Html) -> Result<String, ParserError> {
        let h1 = document
            .select(&self.product_name)
            .next()
            .ok_or(ParserError::MissingField("product name"))?;
        Ok(collapsed_text(h1))
    }

    fn parse_row(&self, row: ElementRef, quantity: u32) -> Result<Offer, ParserError> {
        let seller = row
            .select(&self.merchant_name)
            .next()
            .map(collapsed_text)
            .ok_or(ParserError::MissingField("seller name"))?;
        let seller_link = row
            .select(&self.merchant_anchor)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|href| format!("{SITE_ORIGIN}{href}"))
            .ok_or(ParserError::MissingField("seller link"))?;

        // The rating anchor carries `merchant_reviews` too; the review count
        // is the one without the rating image.
        let reviews_anchor = row
            .select(&self.merchant_reviews)
            .find(|a| rating_from_classes(*a).is_none())
            .ok_or(ParserError::MissingField("seller reviews"))?;
        let seller_reviews = self.parse_count(&collapsed_text(reviews_anchor))?;
        let seller_reviews_link = reviews_anchor
            .value()
            .attr("href")
            .map(|href| format!("{SITE_ORIGIN}{href}"))
            .ok_or(ParserError::MissingField("seller reviews link"))?;
        let seller_rating = row
            .select(&self.merchant_reviews)
            .find_map(rating_from_classes);

        let price = row
            .select(&self.basic_price)
            .next()
            .map(|el| self.parse_decimal(&collapsed_text(el)))
            .ok_or(ParserError::MissingField("price"))??;
        let delivery_price = row
            .select(&self.delivery_price)
            .next()
            .map(|el| self.parse_decimal(&collapsed_text(el)))
            .transpose()?
            .unwrap_or(0.0);
        let free_delivery = row
            .select(&self.free_shipping)
            .next()
            .map(|el| self.parse_decimal(&collapsed_text(el)))
            .transpose()?;

        let availability = row
            .select(&self.availability)
            .next()
            .map(|el| el.value().classes().any(|class| class == "available"))
            .ok_or(ParserError::MissingField("availability"))?;
        let link = row
            .select(&self.offer_anchor)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|href| format!("{SITE_ORIGIN}{href}"))
            .ok_or(ParserError::MissingField("offer link"))?;

        let mut offer = Offer {
            seller,
            seller_link,
            seller_reviews,
            seller_reviews_link,
            seller_rating,
            price,
            quantity,
            delivery_price,
            free_delivery,
            total_price: 0.0,
            total_price_plus_delivery: 0.0,
            availability,
            link,
        };
        offer.compute_totals();
        Ok(offer)
    }

    /// `"+ 7,99 € Sped."` → 7.99, `"1.299,00 €"` → 1299.0.
    fn parse_decimal(&self, text: &str) -> Result<f64, ParserError> {
        let matched = self
            .number
            .find(text)
            .ok_or_else(|| ParserError::MalformedNumber(text.to_string()))?;
        matched
            .as_str()
            .replace('.', "")
            .replace(',', ".")
            .parse()
            .map_err(|_| ParserError::MalformedNumber(text.to_string()))
    }

    /// `"2.184 recensioni"` → 2184.
    fn parse_count(&self, text: &str) -> Result<u32, ParserError> {
        let matched = self
            .number
            .find(text)
            .ok_or_else(|| ParserError::MalformedNumber(text.to_string()))?;
        let digits = matched.as_str().replace('.', "");
        digits
            .split(',')
            .next()
            .unwrap_or(&digits)
            .parse()
            .map_err(|_| ParserError::MalformedNumber(text.to_string()))
    }
}

/// Decodes the `rateNN` class token on the rating image anchor into a 0–5
/// rating; `rate45` → 4.5.
fn rating_from_classes(el: ElementRef) -> Option<f64> {
    el.value()
        .classes()
        .find_map(|class| class.strip_prefix("rate").and_then(|n| n.parse::<u32>().ok()))
        .map(|n| f64::from(n) / 10.0)
}

fn collapsed_text(el: ElementRef) -> String {
    el.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

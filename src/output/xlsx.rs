use std::collections::HashSet;
use std::path::Path;

use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet, XlsxError};

use crate::model::{BestDeal, IndividualDeal, Offer, OutputError};

const OFFER_HEADERS: [&str; 11] = [
    "Seller",
    "Reviews",
    "Rating",
    "Price",
    "Quantity",
    "Delivery Price",
    "Free Delivery From",
    "Total Price",
    "Total Price + Delivery",
    "Availability",
    "See Offer",
];

const CUMULATIVE_HEADERS: [&str; 8] = [
    "Seller",
    "Reviews",
    "Rating",
    "Cumulative Price",
    "Delivery Price",
    "Free Delivery From",
    "Cumulative Price + Delivery",
    "Availability",
];

/// Accumulates result sheets over a scan and writes the workbook once at the
/// end: one sheet per product, then the best-deal sheets.
pub struct ResultsWorkbook {
    workbook: Workbook,
    header_format: Format,
    money_format: Format,
    used_names: HashSet<String>,
}

impl Default for ResultsWorkbook {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultsWorkbook {
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            header_format: Format::new().set_bold().set_align(FormatAlign::Center),
            money_format: Format::new().set_num_format("#,##0.00"),
            used_names: HashSet::new(),
        }
    }

    /// One sheet per product with every scanned offer.
    pub fn add_product_sheet(
        &mut self,
        product: &str,
        offers: &[Offer],
    ) -> Result<(), OutputError> {
        let name = self.sheet_name(product);
        let header = self.header_format.clone();
        let money = self.money_format.clone();

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&name)?;
        write_headers(worksheet, &OFFER_HEADERS, &header)?;
        for (i, offer) in offers.iter().enumerate() {
            write_offer_cells(worksheet, (i + 1) as u32, 0, offer, &money)?;
        }
        Ok(())
    }

    /// Offers that individually cleared their free-delivery threshold, with a
    /// leading column naming the product they were found for.
    pub fn add_best_individual_sheet(
        &mut self,
        deals: &[IndividualDeal],
    ) -> Result<(), OutputError> {
        let name = self.sheet_name("Best Individual Deals");
        let header = self.header_format.clone();
        let money = self.money_format.clone();

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&name)?;
        worksheet.write_string_with_format(0, 0, "Product", &header)?;
        for (col, title) in OFFER_HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(0, (col + 1) as u16, *title, &header)?;
        }
        for (i, deal) in deals.iter().enumerate() {
            let row = (i + 1) as u32;
            worksheet.write_string(row, 0, &deal.product)?;
            write_offer_cells(worksheet, row, 1, &deal.offer, &money)?;
        }
        Ok(())
    }

    /// The ranked single-seller deals across all scanned products.
    pub fn add_best_cumulative_sheet(&mut self, deals: &[BestDeal]) -> Result<(), OutputError> {
        let name = self.sheet_name("Best Cumulative Deals");
        let header = self.header_format.clone();
        let money = self.money_format.clone();

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&name)?;
        write_headers(worksheet, &CUMULATIVE_HEADERS, &header)?;
        for (i, deal) in deals.iter().enumerate() {
            let row = (i + 1) as u32;
            worksheet.write_url_with_text(row, 0, deal.seller_link.as_str(), deal.seller.as_str())?;
            worksheet.write_url_with_text(
                row,
                1,
                deal.seller_reviews_link.as_str(),
                deal.seller_reviews.to_string(),
            )?;
            if let Some(rating) = deal.seller_rating {
                worksheet.write_number(row, 2, rating)?;
            }
            worksheet.write_number_with_format(row, 3, deal.cumulative_price, &money)?;
            worksheet.write_number_with_format(row, 4, deal.delivery_price, &money)?;
            if let Some(threshold) = deal.free_delivery {
                worksheet.write_number_with_format(row, 5, threshold, &money)?;
            }
            worksheet.write_number_with_format(
                row,
                6,
                deal.cumulative_price_plus_delivery,
                &money,
            )?;
            worksheet.write_boolean(row, 7, deal.availability)?;
        }
        Ok(())
    }

    pub fn save(&mut self, path: &Path) -> Result<(), OutputError> {
        self.workbook.save(path)?;
        Ok(())
    }

    /// Excel caps sheet names at 31 chars and requires them unique; truncated
    /// product names can collide, so collisions get a numeric suffix.
    fn sheet_name(&mut self, base: &str) -> String {
        let mut name: String = base.chars().take(31).collect();
        let mut n = 1;
        while !self.used_names.insert(name.clone()) {
            n += 1;
            let suffix = format!(" {n}");
            let keep = 31usize.saturating_sub(suffix.chars().count());
            name = base.chars().take(keep).collect::<String>() + &suffix;
        }
        name
    }
}

fn write_headers(
    worksheet: &mut Worksheet,
    headers: &[&str],
    format: &Format,
) -> Result<(), XlsxError> {
    for (col, title) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, format)?;
    }
    Ok(())
}

fn write_offer_cells(
    worksheet: &mut Worksheet,
    row: u32,
    start_col: u16,
    offer: &Offer,
    money: &Format,
) -> Result<(), XlsxError> {
    worksheet.write_url_with_text(row, start_col, offer.seller_link.as_str(), offer.seller.as_str())?;
    worksheet.write_url_with_text(
        row,
        start_col + 1,
        offer.seller_reviews_link.as_str(),
        offer.seller_reviews.to_string(),
    )?;
    if let Some(rating) = offer.seller_rating {
        worksheet.write_number(row, start_col + 2, rating)?;
    }
    worksheet.write_number_with_format(row, start_col + 3, offer.price, money)?;
    worksheet.write_number(row, start_col + 4, f64::from(offer.quantity))?;
    worksheet.write_number_with_format(row, start_col + 5, offer.delivery_price, money)?;
    if let Some(threshold) = offer.free_delivery {
        worksheet.write_number_with_format(row, start_col + 6, threshold, money)?;
    }
    worksheet.write_number_with_format(row, start_col + 7, offer.total_price, money)?;
    worksheet.write_number_with_format(
        row,
        start_col + 8,
        offer.total_price_plus_delivery,
        money,
    )?;
    worksheet.write_boolean(row, start_col + 9, offer.availability)?;
    worksheet.write_url_with_text(row, start_col + 10, offer.link.as_str(), "Link")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deals::engine_test::{offer, offer_with_delivery};
    use crate::deals::{find_best_cumulative_deals, find_individual_best_deals};
    use crate::model::Catalog;

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert(
            "Logitech MX Master 3S",
            vec![
                offer_with_delivery("ShopA", 89.99, 1, 7.99, Some(49.0)),
                offer("ShopB", 95.0, 1),
            ],
        );
        catalog.insert(
            "Logitech K120",
            vec![
                offer_with_delivery("ShopA", 12.5, 2, 7.99, Some(49.0)),
                offer("ShopC", 11.0, 2),
            ],
        );
        catalog
    }

    #[test]
    fn workbook_with_all_sheet_kinds_builds() {
        let catalog = sample_catalog();
        let mut results = ResultsWorkbook::new();
        for (product, offers) in catalog.iter() {
            results.add_product_sheet(product, offers).unwrap();
        }
        results
            .add_best_individual_sheet(&find_individual_best_deals(&catalog))
            .unwrap();
        results
            .add_best_cumulative_sheet(&find_best_cumulative_deals(&catalog))
            .unwrap();

        let buffer = results.workbook.save_to_buffer().unwrap();
        assert!(!buffer.is_empty());
    }

    #[test]
    fn long_sheet_names_are_truncated_to_excel_limit() {
        let mut results = ResultsWorkbook::new();
        let long = "An Unreasonably Long Product Name That Overflows";
        let name = results.sheet_name(long);
        assert_eq!(name.chars().count(), 31);
    }

    #[test]
    fn colliding_sheet_names_get_suffixes() {
        let mut results = ResultsWorkbook::new();
        let first = results.sheet_name("Same Product");
        let second = results.sheet_name("Same Product");
        assert_ne!(first, second);
        assert!(second.chars().count() <= 31);
    }
}

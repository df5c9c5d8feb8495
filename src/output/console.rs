//! Plain-text tables for terminal output. Widths adapt to content; absent
//! values render as `-`.

use crate::model::{BestDeal, IndividualDeal};

const INDIVIDUAL_HEADERS: [&str; 11] = [
    "Product",
    "Q.ty",
    "Price",
    "Seller",
    "Seller Rating",
    "Seller Reviews",
    "Delivery Price",
    "Free Delivery from",
    "Total Price",
    "Total Price + Delivery",
    "Avail.",
];

const CUMULATIVE_HEADERS: [&str; 8] = [
    "Seller",
    "Seller Reviews",
    "Seller Rating",
    "Cumulative Price",
    "Delivery Price",
    "Free Delivery from",
    "Cumulative Price + Delivery",
    "Avail.",
];

pub fn render_individual_deals(deals: &[IndividualDeal], title: &str) -> String {
    let rows: Vec<Vec<String>> = deals
        .iter()
        .map(|deal| {
            let offer = &deal.offer;
            vec![
                deal.product.clone(),
                offer.quantity.to_string(),
                money(offer.price),
                offer.seller.clone(),
                rating(offer.seller_rating),
                offer.seller_reviews.to_string(),
                money(offer.delivery_price),
                offer.free_delivery.map(money).unwrap_or_else(|| "-".into()),
                money(offer.total_price),
                money(offer.total_price_plus_delivery),
                availability(offer.availability),
            ]
        })
        .collect();
    render_table(title, &INDIVIDUAL_HEADERS, &rows)
}

pub fn render_cumulative_deals(deals: &[BestDeal], title: &str) -> String {
    let rows: Vec<Vec<String>> = deals
        .iter()
        .map(|deal| {
            vec![
                deal.seller.clone(),
                deal.seller_reviews.to_string(),
                rating(deal.seller_rating),
                money(deal.cumulative_price),
                money(deal.delivery_price),
                deal.free_delivery.map(money).unwrap_or_else(|| "-".into()),
                money(deal.cumulative_price_plus_delivery),
                availability(deal.availability),
            ]
        })
        .collect();
    render_table(title, &CUMULATIVE_HEADERS, &rows)
}

fn money(value: f64) -> String {
    format!("{value:.2} €")
}

fn rating(value: Option<f64>) -> String {
    value.map(|r| format!("{r:.1}")).unwrap_or_else(|| "-".into())
}

fn availability(available: bool) -> String {
    if available { "yes".into() } else { "no".into() }
}

fn render_table(title: &str, headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(title);
    out.push('\n');
    out.push_str(&render_row(headers.iter().map(|h| h.to_string()), &widths));
    let rule_len = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);
    out.push_str(&"-".repeat(rule_len));
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(row.iter().cloned(), &widths));
    }
    out
}

fn render_row(cells: impl Iterator<Item = String>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    let mut line = padded.join(" | ");
    line.truncate(line.trim_end().len());
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deals::engine_test::offer_with_delivery;
    use crate::deals::{find_best_cumulative_deals, find_individual_best_deals};
    use crate::model::Catalog;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert(
            "p1",
            vec![offer_with_delivery("ShopA", 30.0, 1, 5.0, Some(25.0))],
        );
        catalog.insert(
            "p2",
            vec![offer_with_delivery("ShopA", 20.0, 1, 5.0, None)],
        );
        catalog
    }

    #[test]
    fn individual_table_contains_product_and_seller() {
        let deals = find_individual_best_deals(&catalog());
        let table = render_individual_deals(&deals, "Best Individual Deals (1)");
        assert!(table.starts_with("Best Individual Deals (1)\n"));
        assert!(table.contains("Product"));
        assert!(table.contains("p1"));
        assert!(table.contains("ShopA"));
        assert!(table.contains("30.00 €"));
    }

    #[test]
    fn cumulative_table_renders_absent_threshold_as_dash() {
        let deals = find_best_cumulative_deals(&catalog());
        let table = render_cumulative_deals(&deals, "Best Cumulative Deals (1)");
        assert!(table.contains("ShopA"));
        assert!(table.contains("50.00 €"));
        assert!(table.contains(" - ") || table.contains(" -\n") || table.ends_with("-\n"));
    }
}

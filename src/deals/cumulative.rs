use std::collections::HashSet;

use crate::model::{price_plus_delivery, BestDeal, Catalog};

/// Finds the sellers that carry every scanned product and ranks them by the
/// total cost of buying everything from them in a single order, cheapest
/// first. An empty catalog, or any product nobody shares, yields an empty
/// list.
///
/// Non-price fields on each [`BestDeal`] (delivery terms, rating, links,
/// availability, product name) come from the last matching offer seen during
/// aggregation; when a seller's terms differ across products only the
/// last-processed product's terms survive. Kept as contract for parity with
/// existing consumers of the sheets.
pub fn find_best_cumulative_deals(catalog: &Catalog) -> Vec<BestDeal> {
    let mut deals: Vec<BestDeal> = common_sellers(catalog)
        .iter()
        .map(|seller| aggregate_seller(catalog, seller))
        .collect();

    for deal in &mut deals {
        deal.cumulative_price_plus_delivery =
            price_plus_delivery(deal.cumulative_price, deal.delivery_price, deal.free_delivery);
    }

    // Vec::sort_by is stable: equal-cost sellers keep the intersection order.
    deals.sort_by(|a, b| {
        a.cumulative_price_plus_delivery
            .total_cmp(&b.cumulative_price_plus_delivery)
    });
    deals
}

/// Sellers present in every product's offer list, ordered by first appearance
/// in the first product. Hash-set iteration order would leak into the
/// ranking's tie-breaks, so the ordering comes from the catalog itself.
fn common_sellers(catalog: &Catalog) -> Vec<String> {
    let mut products = catalog.iter();
    let Some((_, first)) = products.next() else {
        return Vec::new();
    };

    let mut common: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for offer in first {
        if seen.insert(offer.seller.as_str()) {
            common.push(offer.seller.clone());
        }
    }

    for (_, offers) in products {
        let sellers: HashSet<&str> = offers.iter().map(|o| o.seller.as_str()).collect();
        common.retain(|seller| sellers.contains(seller.as_str()));
    }
    common
}

/// Folds every offer of `seller` across the whole catalog into one deal:
/// totals accumulate, everything else is overwritten by each match in turn.
fn aggregate_seller(catalog: &Catalog, seller: &str) -> BestDeal {
    let mut deal = BestDeal {
        product: String::new(),
        seller: seller.to_string(),
        seller_link: String::new(),
        seller_reviews: 0,
        seller_reviews_link: String::new(),
        seller_rating: None,
        delivery_price: 0.0,
        free_delivery: None,
        availability: false,
        link: String::new(),
        cumulative_price: 0.0,
        cumulative_price_plus_delivery: 0.0,
    };
    for (product, offers) in catalog.iter() {
        for offer in offers.iter().filter(|offer| offer.seller == seller) {
            deal.product = product.to_string();
            deal.seller_link = offer.seller_link.clone();
            deal.seller_reviews = offer.seller_reviews;
            deal.seller_reviews_link = offer.seller_reviews_link.clone();
            deal.seller_rating = offer.seller_rating;
            deal.delivery_price = offer.delivery_price;
            deal.free_delivery = offer.free_delivery;
            deal.availability = offer.availability;
            deal.link = offer.link.clone();
            deal.cumulative_price += offer.total_price;
        }
    }
    deal
}

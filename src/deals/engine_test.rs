//! Scenario and generated-catalog tests for the deal engine as a whole.
//! Module-level tests next to each function cover the unit behavior; this
//! suite checks the engine's contracts over randomized catalogs with a fixed
//! seed so failures reproduce.

use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::deals::{
    filter_available, find_best_cumulative_deals, find_individual_best_deals,
};
use crate::model::{Catalog, Offer};

/// Minimal available offer with no delivery fee and no threshold.
pub fn offer(seller: &str, price: f64, quantity: u32) -> Offer {
    offer_with_delivery(seller, price, quantity, 0.0, None)
}

pub fn offer_with_delivery(
    seller: &str,
    price: f64,
    quantity: u32,
    delivery_price: f64,
    free_delivery: Option<f64>,
) -> Offer {
    let mut offer = Offer {
        seller: seller.to_string(),
        seller_link: format!("https://shop.example/{seller}"),
        seller_reviews: 12,
        seller_reviews_link: format!("https://shop.example/{seller}/reviews"),
        seller_rating: Some(4.2),
        price,
        quantity,
        delivery_price,
        free_delivery,
        total_price: 0.0,
        total_price_plus_delivery: 0.0,
        availability: true,
        link: format!("https://shop.example/{seller}/offer"),
    };
    offer.compute_totals();
    offer
}

const SELLER_POOL: [&str; 6] = ["S0", "S1", "S2", "S3", "S4", "S5"];

/// 2–4 products, each carried by a random subset of a small seller pool, with
/// cent-grid prices so aggregation sums compare exactly.
fn random_catalog(rng: &mut StdRng) -> Catalog {
    let mut catalog = Catalog::new();
    let product_count = rng.random_range(2..=4);
    for p in 0..product_count {
        let mut offers = Vec::new();
        for seller in SELLER_POOL {
            if !rng.random_bool(0.6) {
                continue;
            }
            let price = f64::from(rng.random_range(100..10_000)) / 100.0;
            let quantity = rng.random_range(1..=3);
            let delivery = f64::from(rng.random_range(0..1_500)) / 100.0;
            let threshold = if rng.random_bool(0.5) {
                Some(f64::from(rng.random_range(0..5_000)) / 100.0)
            } else {
                None
            };
            let mut o = offer_with_delivery(seller, price, quantity, delivery, threshold);
            o.availability = rng.random_bool(0.8);
            offers.push(o);
        }
        catalog.insert(format!("product-{p}"), offers);
    }
    catalog
}

fn seller_intersection(catalog: &Catalog) -> HashSet<String> {
    let mut products = catalog.iter();
    let Some((_, first)) = products.next() else {
        return HashSet::new();
    };
    let mut common: HashSet<String> = first.iter().map(|o| o.seller.clone()).collect();
    for (_, offers) in products {
        let sellers: HashSet<&str> = offers.iter().map(|o| o.seller.as_str()).collect();
        common.retain(|s| sellers.contains(s.as_str()));
    }
    common
}

#[test]
fn filter_removes_exactly_the_unavailable_offers() {
    let mut rng = StdRng::seed_from_u64(0xF1);
    for _ in 0..100 {
        let catalog = random_catalog(&mut rng);
        let (filtered, removed) = filter_available(&catalog);

        assert_eq!(removed, catalog.offer_count() - filtered.offer_count());
        for (_, offers) in filtered.iter() {
            assert!(offers.iter().all(|o| o.availability));
        }
        // Filtering never invents offers and keeps every available one.
        let available = catalog
            .iter()
            .flat_map(|(_, offers)| offers.iter())
            .filter(|o| o.availability)
            .count();
        assert_eq!(filtered.offer_count(), available);
    }
}

#[test]
fn individual_deals_match_the_threshold_predicate_exactly() {
    let mut rng = StdRng::seed_from_u64(0x1D);
    for _ in 0..100 {
        let catalog = random_catalog(&mut rng);
        let deals = find_individual_best_deals(&catalog);

        for deal in &deals {
            let threshold = deal.offer.free_delivery.expect("deal without threshold");
            assert!(deal.offer.total_price >= threshold);
        }
        let qualifying = catalog
            .iter()
            .flat_map(|(_, offers)| offers.iter())
            .filter(|o| o.free_delivery.is_some_and(|t| o.total_price >= t))
            .count();
        assert_eq!(deals.len(), qualifying);
    }
}

#[test]
fn cumulative_sellers_are_exactly_the_intersection() {
    let mut rng = StdRng::seed_from_u64(0xC0);
    for _ in 0..100 {
        let catalog = random_catalog(&mut rng);
        let deals = find_best_cumulative_deals(&catalog);

        let got: HashSet<String> = deals.iter().map(|d| d.seller.clone()).collect();
        assert_eq!(got, seller_intersection(&catalog));
        // One deal per seller, no duplicates.
        assert_eq!(got.len(), deals.len());
    }
}

#[test]
fn cumulative_price_is_the_sum_of_matching_totals() {
    let mut rng = StdRng::seed_from_u64(0xA6);
    for _ in 0..100 {
        let catalog = random_catalog(&mut rng);
        let deals = find_best_cumulative_deals(&catalog);

        let mut expected: HashMap<&str, f64> = HashMap::new();
        for (_, offers) in catalog.iter() {
            for o in offers {
                *expected.entry(o.seller.as_str()).or_insert(0.0) += o.total_price;
            }
        }
        for deal in &deals {
            // Same accumulation order as the engine, so bit-exact equality holds.
            assert_eq!(deal.cumulative_price, expected[deal.seller.as_str()]);
        }
    }
}

#[test]
fn delivery_fee_policy_holds_on_every_deal() {
    let mut rng = StdRng::seed_from_u64(0xFE);
    for _ in 0..100 {
        let catalog = random_catalog(&mut rng);
        for deal in find_best_cumulative_deals(&catalog) {
            let threshold_met = deal
                .free_delivery
                .is_some_and(|t| deal.cumulative_price >= t);
            if threshold_met {
                assert_eq!(deal.cumulative_price_plus_delivery, deal.cumulative_price);
            } else {
                assert_eq!(
                    deal.cumulative_price_plus_delivery,
                    deal.cumulative_price + deal.delivery_price
                );
            }
            assert!(deal.cumulative_price_plus_delivery >= deal.cumulative_price);
        }
    }
}

#[test]
fn ranking_is_sorted_and_deterministic() {
    let mut rng = StdRng::seed_from_u64(0x5A);
    for _ in 0..100 {
        let catalog = random_catalog(&mut rng);
        let first = find_best_cumulative_deals(&catalog);
        let second = find_best_cumulative_deals(&catalog);

        assert_eq!(first, second);
        for pair in first.windows(2) {
            assert!(
                pair[0].cumulative_price_plus_delivery <= pair[1].cumulative_price_plus_delivery
            );
        }
    }
}

#[test]
fn full_pipeline_over_two_products() {
    // Two products; A carries both at 10 + 20 with a 5.00 delivery fee.
    let mut catalog = Catalog::new();
    let mut gone = offer("B", 8.0, 1);
    gone.availability = false;
    catalog.insert(
        "p1",
        vec![offer_with_delivery("A", 10.0, 1, 5.0, None), gone],
    );
    catalog.insert(
        "p2",
        vec![
            offer_with_delivery("A", 20.0, 1, 5.0, None),
            offer("C", 18.0, 1),
        ],
    );

    let (filtered, removed) = filter_available(&catalog);
    assert_eq!(removed, 1);

    let deals = find_best_cumulative_deals(&filtered);
    assert_eq!(deals.len(), 1);
    assert_eq!(deals[0].seller, "A");
    assert_eq!(deals[0].cumulative_price, 30.0);
    assert_eq!(deals[0].cumulative_price_plus_delivery, 35.0);

    // With a 25.00 threshold the 30.00 basket ships free.
    let mut with_threshold = Catalog::new();
    with_threshold.insert(
        "p1",
        vec![offer_with_delivery("A", 10.0, 1, 5.0, Some(25.0))],
    );
    with_threshold.insert(
        "p2",
        vec![offer_with_delivery("A", 20.0, 1, 5.0, Some(25.0))],
    );
    let deals = find_best_cumulative_deals(&with_threshold);
    assert_eq!(deals[0].cumulative_price_plus_delivery, 30.0);
}

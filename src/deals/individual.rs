use crate::model::{Catalog, IndividualDeal};

/// Keeps every offer whose own total already clears the seller's free-delivery
/// threshold: buying just this product's quantity from that seller ships free.
/// Offers without a threshold never qualify. Result order is scan order
/// (product order, then offer order within each product).
pub fn find_individual_best_deals(catalog: &Catalog) -> Vec<IndividualDeal> {
    let mut deals = Vec::new();
    for (product, offers) in catalog.iter() {
        for offer in offers {
            let qualifies = offer
                .free_delivery
                .is_some_and(|threshold| offer.total_price >= threshold);
            if qualifies {
                deals.push(IndividualDeal {
                    product: product.to_string(),
                    offer: offer.clone(),
                });
            }
        }
    }
    deals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Catalog;
    use crate::deals::engine_test::offer_with_delivery;

    #[test]
    fn offer_clearing_its_threshold_qualifies() {
        let mut catalog = Catalog::new();
        catalog.insert(
            "product",
            vec![offer_with_delivery("A", 30.0, 1, 5.0, Some(25.0))],
        );

        let deals = find_individual_best_deals(&catalog);
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].product, "product");
        assert_eq!(deals[0].offer.seller, "A");
    }

    #[test]
    fn offer_below_its_threshold_does_not_qualify() {
        let mut catalog = Catalog::new();
        catalog.insert(
            "product",
            vec![offer_with_delivery("A", 20.0, 1, 5.0, Some(25.0))],
        );
        assert!(find_individual_best_deals(&catalog).is_empty());
    }

    #[test]
    fn offer_without_threshold_never_qualifies() {
        let mut catalog = Catalog::new();
        catalog.insert(
            "product",
            vec![offer_with_delivery("A", 1000.0, 1, 0.0, None)],
        );
        assert!(find_individual_best_deals(&catalog).is_empty());
    }

    #[test]
    fn quantity_counts_toward_the_threshold() {
        // 3 × 10 = 30 crosses a 25 threshold even though the unit price does not.
        let mut catalog = Catalog::new();
        catalog.insert(
            "product",
            vec![offer_with_delivery("A", 10.0, 3, 5.0, Some(25.0))],
        );
        assert_eq!(find_individual_best_deals(&catalog).len(), 1);
    }

    #[test]
    fn result_keeps_scan_order() {
        let mut catalog = Catalog::new();
        catalog.insert(
            "p1",
            vec![
                offer_with_delivery("B", 50.0, 1, 5.0, Some(25.0)),
                offer_with_delivery("A", 60.0, 1, 5.0, Some(25.0)),
            ],
        );
        catalog.insert("p2", vec![offer_with_delivery("C", 70.0, 1, 5.0, Some(25.0))]);

        let deals = find_individual_best_deals(&catalog);
        let sellers: Vec<&str> = deals.iter().map(|deal| deal.offer.seller.as_str()).collect();
        assert_eq!(sellers, vec!["B", "A", "C"]);
    }
}

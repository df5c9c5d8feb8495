use crate::model::{Catalog, Offer};

/// Drops offers marked unavailable, returning the filtered catalog and the
/// number of offers removed. The input is never touched: removing rows from
/// a list while iterating it skips entries, so this builds a new catalog
/// instead.
pub fn filter_available(catalog: &Catalog) -> (Catalog, usize) {
    filter_available_with_exemption(catalog, |_| false)
}

/// Like [`filter_available`], but offers whose seller matches `is_exempt`
/// survive regardless of their availability flag. Used for marketplaces whose
/// stock indicator on the listing page is not reliable.
pub fn filter_available_with_exemption<F>(catalog: &Catalog, is_exempt: F) -> (Catalog, usize)
where
    F: Fn(&str) -> bool,
{
    let mut filtered = Catalog::new();
    let mut removed = 0;
    for (name, offers) in catalog.iter() {
        let kept: Vec<Offer> = offers
            .iter()
            .filter(|offer| offer.availability || is_exempt(&offer.seller))
            .cloned()
            .collect();
        removed += offers.len() - kept.len();
        filtered.insert(name, kept);
    }
    (filtered, removed)
}

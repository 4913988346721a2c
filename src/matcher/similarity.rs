use std::collections::HashSet;

use crate::dataset::Dataset;
use crate::matcher::normalizer::{keywords, normalize};
use crate::types::MatchCandidate;

/// Score every catalog product against the query and return the matches at
/// or above `min_score`, best first, at most `top_n`.
///
/// Pure Jaccard under-weights exact brand/model tokens on short titles, so
/// raw overlap count and substring bonuses carry most of the weight there
/// while Jaccard smooths long noisy titles.
pub fn find_similar(
    query_name: &str,
    dataset: &Dataset,
    top_n: usize,
    min_score: f64,
) -> Vec<MatchCandidate> {
    let query_keywords = keywords(query_name);
    if query_keywords.is_empty() {
        return Vec::new();
    }
    let query_set: HashSet<&str> = query_keywords.iter().map(|s| s.as_str()).collect();
    let query_norm = normalize(query_name);
    // The two leading keywords are the brand/model tokens.
    let priority = &query_keywords[..query_keywords.len().min(2)];

    let mut candidates = Vec::new();
    for product in dataset.products() {
        let product_norm = normalize(product);
        let product_keywords = keywords(&product_norm);
        if product_keywords.is_empty() {
            continue;
        }
        let product_set: HashSet<&str> = product_keywords.iter().map(|s| s.as_str()).collect();

        let overlap = query_set.intersection(&product_set).count();
        if overlap == 0 {
            continue;
        }
        let union = query_set.union(&product_set).count();
        let jaccard = overlap as f64 / union as f64;

        let direct_bonus = if priority.iter().any(|k| product_norm.contains(k.as_str())) {
            1.0
        } else {
            0.0
        };
        let phrase_bonus = if product_norm.contains(&query_norm) || query_norm.contains(&product_norm)
        {
            1.0
        } else {
            0.0
        };

        let score = overlap as f64 * 1.5 + jaccard * 5.0 + direct_bonus + phrase_bonus;
        if score >= min_score {
            candidates.push(MatchCandidate { product_name: product.clone(), score });
        }
    }

    // Stable sort: equal scores keep catalog enumeration order.
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    candidates.truncate(top_n);
    candidates
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn catalog(names: &[&str]) -> Dataset {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Dataset::from_records(
            names.iter().map(|n| (n.to_string(), date, 100.0)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn exact_product_ranks_first_and_scores_descend() {
        let dataset = catalog(&[
            "Dell XPS 15 Laptop",
            "Apple iPhone 15 Pro Max 256GB",
            "Apple Watch Series 9",
        ]);

        let matches = find_similar("Apple iPhone 15 Pro Max", &dataset, 10, 2.0);
        assert!(!matches.is_empty());
        assert_eq!(matches[0].product_name, "Apple iPhone 15 Pro Max 256GB");
        for pair in matches.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn disjoint_keywords_produce_no_match() {
        let dataset = catalog(&["KitchenAid Stand Mixer"]);
        assert!(find_similar("Nike Running Shoes", &dataset, 10, 2.0).is_empty());
    }

    #[test]
    fn min_score_filters_weak_overlap() {
        // Single shared trailing token out of many: overlap 1.5 + small
        // jaccard, no substring bonuses, so it stays under the threshold.
        let dataset = catalog(&["Samsung Galaxy S24 Ultra Smartphone Android Device"]);
        let matches =
            find_similar("Frost Free Double Door Refrigerator by Samsung", &dataset, 10, 2.0);
        assert!(matches.is_empty());
    }

    #[test]
    fn phrase_containment_earns_bonus() {
        let dataset = catalog(&["Sony WH-1000XM5 Wireless Headphones"]);
        let with_phrase = find_similar("Sony WH-1000XM5 Wireless Headphones", &dataset, 10, 2.0);
        let without_phrase = find_similar("Sony WH-1000XM5 Headphones Wireless", &dataset, 10, 2.0);
        assert!(with_phrase[0].score > without_phrase[0].score);
    }

    #[test]
    fn top_n_caps_result_length() {
        let dataset = catalog(&[
            "Nike Air Max 270 Running Shoes",
            "Nike Revolution Running Shoes",
            "Nike Pegasus Running Shoes",
        ]);
        let matches = find_similar("Nike Running Shoes", &dataset, 2, 2.0);
        assert_eq!(matches.len(), 2);
    }
}

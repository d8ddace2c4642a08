use indexmap::IndexMap;

/// Orders currency shares largest first. Equal shares keep the map's order.
pub fn rank(exposure: &IndexMap<String, f64>) -> Vec<(String, f64)> {
    let mut ranked: Vec<(String, f64)> = exposure
        .iter()
        .map(|(currency, share)| (currency.clone(), *share))
        .collect();
    ranked.sort_by(|(_, a), (_, b)| b.total_cmp(a));
    ranked
}

/// Splits a ranking into the first `n` entries and a count of the rest.
pub fn preview(ranked: &[(String, f64)], n: usize) -> (&[(String, f64)], usize) {
    let shown = n.min(ranked.len());
    (&ranked[..shown], ranked.len() - shown)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exposure(pairs: &[(&str, f64)]) -> IndexMap<String, f64> {
        pairs.iter().map(|(c, s)| (c.to_string(), *s)).collect()
    }

    #[test]
    fn test_rank_and_preview() {
        let ranked = rank(&exposure(&[("PLN", 0.1), ("USD", 0.6), ("EUR", 0.3)]));
        assert_eq!(
            ranked,
            vec![
                ("USD".to_string(), 0.6),
                ("EUR".to_string(), 0.3),
                ("PLN".to_string(), 0.1)
            ]
        );

        let (shown, remaining) = preview(&ranked, 2);
        assert_eq!(
            shown,
            &[("USD".to_string(), 0.6), ("EUR".to_string(), 0.3)]
        );
        assert_eq!(remaining, 1);
    }

    #[test]
    fn test_rank_ties_keep_insertion_order() {
        let ranked = rank(&exposure(&[("GBP", 0.25), ("USD", 0.5), ("CHF", 0.25)]));
        let order: Vec<&str> = ranked.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(order, vec!["USD", "GBP", "CHF"]);
    }

    #[test]
    fn test_preview_larger_than_ranking() {
        let ranked = rank(&exposure(&[("USD", 1.0)]));
        let (shown, remaining) = preview(&ranked, 2);
        assert_eq!(shown.len(), 1);
        assert_eq!(remaining, 0);

        let (shown, remaining) = preview(&[], 3);
        assert!(shown.is_empty());
        assert_eq!(remaining, 0);
    }
}

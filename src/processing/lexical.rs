//! Order-insensitive fuzzy string similarity

use rapidfuzz::distance::indel;
use std::collections::BTreeSet;

/// Token-set ratio in `[0, 1]`.
///
/// Both inputs are lowercased and split on whitespace. If one token set is a
/// subset of the other (and they share at least one token) the ratio is 1.
/// Otherwise the best of three Indel ratios is returned: the two leftover
/// token groups against each other, and the shared tokens against each side.
/// Either side having no tokens yields 0.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let diff_ab: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let diff_ba: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    if !intersection.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 1.0;
    }

    // BTreeSet iteration is already sorted
    let diff_ab_joined = diff_ab.join(" ");
    let diff_ba_joined = diff_ba.join(" ");
    let ab_len = diff_ab_joined.chars().count();
    let ba_len = diff_ba_joined.chars().count();
    let sect_len = intersection.join(" ").chars().count();

    let mut best = indel_ratio(&diff_ab_joined, &diff_ba_joined);

    if sect_len == 0 {
        return best;
    }

    // "sect" is a prefix of "sect diff", so their Indel distance is the suffix length
    let sect_ab_len = sect_len + 1 + ab_len;
    let sect_ba_len = sect_len + 1 + ba_len;
    let sect_ab_ratio = 1.0 - (1 + ab_len) as f64 / (sect_len + sect_ab_len) as f64;
    let sect_ba_ratio = 1.0 - (1 + ba_len) as f64 / (sect_len + sect_ba_len) as f64;

    best = best.max(sect_ab_ratio).max(sect_ba_ratio);
    best.clamp(0.0, 1.0)
}

/// Normalized Indel similarity: `1 - (insertions + deletions) / (len_a + len_b)`.
pub fn indel_ratio(a: &str, b: &str) -> f64 {
    indel::normalized_similarity(a.chars(), b.chars())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_subset_tokens_score_one() {
        assert_eq!(token_set_ratio("python", "Python Programming"), 1.0);
        assert_eq!(token_set_ratio("programming python", "PYTHON programming"), 1.0);
    }

    #[test]
    fn test_empty_side_scores_zero() {
        assert_eq!(token_set_ratio("", "python"), 0.0);
        assert_eq!(token_set_ratio("   ", "   "), 0.0);
    }

    #[test]
    fn test_disjoint_tokens_use_indel_ratio() {
        // "abc" vs "abd": LCS 2, distance 2, total 6
        assert!(approx(token_set_ratio("abc", "abd"), 1.0 - 2.0 / 6.0));
        assert_eq!(token_set_ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_shared_tokens_with_leftovers() {
        // sect = "data", diff_ab = "analysis", diff_ba = "science"
        let score = token_set_ratio("data analysis", "data science");
        // sect vs "data analysis": distance 9 over 4 + 13
        let sect_ab: f64 = 1.0 - 9.0 / 17.0;
        // sect vs "data science": distance 8 over 4 + 12
        let sect_ba: f64 = 1.0 - 8.0 / 16.0;
        let diff = indel_ratio("analysis", "science");
        assert!(approx(score, sect_ab.max(sect_ba).max(diff)));
        assert!(score > 0.0 && score < 1.0);
    }

    #[test]
    fn test_ratio_is_symmetric_and_bounded() {
        let pairs = [
            ("REST API Design", "API Design"),
            ("Machine Learning", "Deep Learning with TensorFlow"),
            ("Budget Management", "Risk Management"),
        ];
        for (a, b) in pairs {
            let ab = token_set_ratio(a, b);
            let ba = token_set_ratio(b, a);
            assert!(approx(ab, ba));
            assert!((0.0..=1.0).contains(&ab));
        }
    }

    #[test]
    fn test_indel_ratio() {
        assert_eq!(indel_ratio("", ""), 1.0);
        assert_eq!(indel_ratio("rust", "rust"), 1.0);
        assert_eq!(indel_ratio("rust", ""), 0.0);
        assert!(approx(indel_ratio("Rust", "rust"), 1.0 - 2.0 / 8.0));
        // LCS("kitten", "sitting") = 4, distance 5, total 13
        assert!(approx(indel_ratio("kitten", "sitting"), 1.0 - 5.0 / 13.0));
    }
}

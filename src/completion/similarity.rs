//! Typo-tolerant string similarity

/// Jaro-Winkler similarity in `[0.0, 1.0]`, compared per `char`
///
/// Symmetric. Two empty strings score 1.0; an empty string against a
/// non-empty one scores 0.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::jaro_winkler(a, b)
}

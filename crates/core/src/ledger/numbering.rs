//! Card number generation.

use chrono::Utc;
use rand::Rng;

/// Length of the random base-36 suffix.
const SUFFIX_LEN: usize = 9;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates human-facing card numbers of the form `{prefix}{millis}-{suffix}`.
///
/// The suffix is nine random base-36 characters. Uniqueness is finally
/// enforced by the store, which reports a clash as `CardNumberTaken`.
#[derive(Debug, Clone)]
pub struct CardNumberGenerator {
    prefix: String,
}

impl CardNumberGenerator {
    /// Creates a generator with the given prefix.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Returns the configured prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Produces a fresh card number.
    #[must_use]
    pub fn generate(&self) -> String {
        let millis = Utc::now().timestamp_millis();
        let mut rng = rand::rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
            .collect();
        format!("{}{millis}-{suffix}", self.prefix)
    }
}

impl Default for CardNumberGenerator {
    fn default() -> Self {
        Self::new("CARD")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_number_shape() {
        let number = CardNumberGenerator::new("MC").generate();
        let rest = number.strip_prefix("MC").unwrap();
        let (millis, suffix) = rest.split_once('-').unwrap();

        assert_eq!(millis.len(), 13);
        assert!(millis.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn test_numbers_differ_within_one_millisecond() {
        let generator = CardNumberGenerator::default();
        let numbers: std::collections::HashSet<String> =
            (0..1000).map(|_| generator.generate()).collect();
        assert_eq!(numbers.len(), 1000);
    }

    #[test]
    fn test_default_prefix() {
        assert_eq!(CardNumberGenerator::default().prefix(), "CARD");
        assert!(CardNumberGenerator::default().generate().starts_with("CARD"));
    }
}

use super::base36;
use super::{RankError, RankGenerator};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Number of LexoRank buckets (`0|`, `1|`, `2|`).
pub const BUCKET_COUNT: u8 = 3;

const INTEGER_DIGITS: usize = 6;
const MAX_DIGIT: u8 = base36::BASE - 1;

/// A parsed LexoRank key: `bucket|integer:fraction`, e.g. `0|hzzzzz:i`.
///
/// The integer part is always six base-36 digits, so keys of one bucket sort
/// the same way as strings and as numbers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexoRank {
    bucket: u8,
    /// Integer digits followed by fraction digits.
    digits: Vec<u8>,
}

impl LexoRank {
    pub fn parse(key: &str) -> Result<Self, RankError> {
        let malformed = |reason| RankError::Malformed {
            key: key.to_string(),
            reason,
        };

        let (bucket, value) = key.split_once('|').ok_or_else(|| malformed("missing '|'"))?;
        let bucket = match bucket.as_bytes() {
            [b @ b'0'..=b'9'] if b - b'0' < BUCKET_COUNT => b - b'0',
            _ => return Err(malformed("bucket must be 0, 1 or 2")),
        };

        let (integer, fraction) = value.split_once(':').ok_or_else(|| malformed("missing ':'"))?;
        if integer.len() != INTEGER_DIGITS {
            return Err(malformed("integer part must be six digits"));
        }
        let mut digits =
            base36::parse_digits(integer).ok_or_else(|| malformed("integer part is not base-36"))?;
        digits.extend(
            base36::parse_digits(fraction).ok_or_else(|| malformed("fraction is not base-36"))?,
        );
        if base36::compare(&digits, &[MAX_DIGIT; INTEGER_DIGITS]) == Ordering::Greater {
            return Err(malformed("key is above the bucket maximum zzzzzz:"));
        }

        Ok(Self { bucket, digits })
    }

    pub fn min(bucket: u8) -> Result<Self, RankError> {
        Self::filled(bucket, 0)
    }

    pub fn max(bucket: u8) -> Result<Self, RankError> {
        Self::filled(bucket, MAX_DIGIT)
    }

    fn filled(bucket: u8, digit: u8) -> Result<Self, RankError> {
        if bucket >= BUCKET_COUNT {
            return Err(RankError::InvalidBucket(bucket));
        }
        Ok(Self {
            bucket,
            digits: vec![digit; INTEGER_DIGITS],
        })
    }

    pub fn bucket(&self) -> u8 {
        self.bucket
    }

    /// A rank strictly between `self` and `other`, in either order.
    pub fn between(&self, other: &LexoRank) -> Result<LexoRank, RankError> {
        if self.bucket != other.bucket {
            return Err(RankError::BucketMismatch {
                low: self.to_string(),
                high: other.to_string(),
            });
        }
        let (low, high) = match base36::compare(&self.digits, &other.digits) {
            Ordering::Less => (self, other),
            Ordering::Greater => (other, self),
            Ordering::Equal => {
                return Err(RankError::EmptyInterval {
                    key: self.to_string(),
                })
            }
        };
        Ok(LexoRank {
            bucket: self.bucket,
            digits: base36::between(&low.digits, &high.digits, INTEGER_DIGITS),
        })
    }
}

impl fmt::Display for LexoRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (integer, fraction) = self.digits.split_at(INTEGER_DIGITS);
        write!(
            f,
            "{}|{}:{}",
            self.bucket,
            base36::render(integer),
            base36::render(fraction)
        )
    }
}

impl FromStr for LexoRank {
    type Err = RankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LexoRank::parse(s)
    }
}

/// Generates LexoRank keys inside one bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LexoRankGenerator {
    bucket: u8,
}

impl LexoRankGenerator {
    pub fn new(bucket: u8) -> Result<Self, RankError> {
        if bucket >= BUCKET_COUNT {
            return Err(RankError::InvalidBucket(bucket));
        }
        Ok(Self { bucket })
    }

    pub fn bucket(&self) -> u8 {
        self.bucket
    }
}

impl RankGenerator for LexoRankGenerator {
    fn minimum_key(&self) -> String {
        format!("{}|{}:", self.bucket, "0".repeat(INTEGER_DIGITS))
    }

    fn maximum_key(&self) -> String {
        format!("{}|{}:", self.bucket, "z".repeat(INTEGER_DIGITS))
    }

    fn key_between(&self, low: &str, high: &str) -> Result<String, RankError> {
        let low = LexoRank::parse(low)?;
        let high = LexoRank::parse(high)?;
        Ok(low.between(&high)?.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rank(key: &str) -> LexoRank {
        LexoRank::parse(key).expect("valid lexorank")
    }

    // === parse ===

    #[test]
    fn parses_and_displays_unchanged() {
        for key in ["0|000000:", "1|hzzzzz:", "2|i00000:abc", "0|hzzzzz:i"] {
            assert_eq!(rank(key).to_string(), key);
        }
    }

    #[test]
    fn rejects_malformed_keys() {
        for key in [
            "",
            "hzzzzz",
            "3|hzzzzz:",
            "01|hzzzzz:",
            "0|hzzzz:",
            "0|hzzzzzz:",
            "0|hzzzzz",
            "0|HZZZZZ:",
            "0|hzzzzz:-1",
            "0|zzzzzz:i",
            "1|zzzzzz:001",
        ] {
            assert!(
                matches!(LexoRank::parse(key), Err(RankError::Malformed { .. })),
                "expected {:?} to be rejected",
                key
            );
        }
    }

    #[test]
    fn min_and_max_match_generator_bounds() {
        let gen = LexoRankGenerator::new(1).unwrap();
        assert_eq!(LexoRank::min(1).unwrap().to_string(), gen.minimum_key());
        assert_eq!(LexoRank::max(1).unwrap().to_string(), gen.maximum_key());
        assert_eq!(gen.minimum_key(), "1|000000:");
        assert_eq!(gen.maximum_key(), "1|zzzzzz:");
    }

    #[test]
    fn rejects_out_of_range_bucket() {
        assert_eq!(LexoRank::min(3), Err(RankError::InvalidBucket(3)));
        assert_eq!(LexoRankGenerator::new(3), Err(RankError::InvalidBucket(3)));
    }

    // === between ===

    #[test]
    fn middle_of_the_space() {
        let gen = LexoRankGenerator::default();
        let mid = gen
            .key_between(&gen.minimum_key(), &gen.maximum_key())
            .unwrap();
        assert_eq!(mid, "0|hzzzzz:");
    }

    #[test]
    fn between_adjacent_integers_uses_fraction() {
        let gen = LexoRankGenerator::default();
        let key = gen.key_between("0|hzzzzz:", "0|i00000:").unwrap();
        assert_eq!(key, "0|hzzzzz:i");
        assert!(key.as_str() > "0|hzzzzz:" && key.as_str() < "0|i00000:");
    }

    #[test]
    fn between_is_order_insensitive() {
        let a = rank("0|100000:");
        let b = rank("0|200000:");
        assert_eq!(a.between(&b).unwrap(), b.between(&a).unwrap());
    }

    #[test]
    fn between_equal_ranks_is_an_error() {
        let a = rank("0|100000:");
        assert!(matches!(
            a.between(&a.clone()),
            Err(RankError::EmptyInterval { .. })
        ));
    }

    #[test]
    fn between_different_buckets_is_an_error() {
        let gen = LexoRankGenerator::default();
        assert!(matches!(
            gen.key_between("0|100000:", "1|200000:"),
            Err(RankError::BucketMismatch { .. })
        ));
    }

    #[test]
    fn between_near_the_top() {
        let gen = LexoRankGenerator::default();
        let key = gen.key_between("0|zzzzzy:", &gen.maximum_key()).unwrap();
        assert!(key.as_str() > "0|zzzzzy:");
        assert!(key < gen.maximum_key());
    }

    #[test]
    fn repeated_bisection_toward_a_bound_keeps_string_order() {
        let gen = LexoRankGenerator::default();
        let high = "0|i00000:".to_string();
        let mut low = "0|hzzzzz:".to_string();
        for _ in 0..100 {
            let next = gen.key_between(&low, &high).unwrap();
            assert!(next > low && next < high, "{} not in ({}, {})", next, low, high);
            low = next;
        }
    }
}

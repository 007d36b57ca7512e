use super::base36;
use super::{RankError, RankGenerator};
use std::cmp::Ordering;

const MAX_DIGIT: u8 = base36::BASE - 1;

/// Bare base-36 keys read as fractions `0.k1k2k3…`.
///
/// `"0"` is the bottom of the space and `"z"` the top. Any non-empty
/// `0-9a-z` string up to `"z"` is a valid key, which makes this scheme a good
/// fit for lists seeded with hand-written keys such as `"a"`, `"b"`, `"c"`.
/// Keys past the top (`"zz"`, `"zi"`) are rejected: nothing above them could
/// ever be generated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FractionalKey;

impl FractionalKey {
    fn parse(key: &str) -> Result<Vec<u8>, RankError> {
        if key.is_empty() {
            return Err(RankError::Malformed {
                key: String::new(),
                reason: "key is empty",
            });
        }
        let digits = base36::parse_digits(key).ok_or_else(|| RankError::Malformed {
            key: key.to_string(),
            reason: "key is not base-36 (0-9, a-z)",
        })?;
        if base36::compare(&digits, &[MAX_DIGIT]) == Ordering::Greater {
            return Err(RankError::Malformed {
                key: key.to_string(),
                reason: "key is above the top of the key space \"z\"",
            });
        }
        Ok(digits)
    }
}

impl RankGenerator for FractionalKey {
    fn minimum_key(&self) -> String {
        "0".to_string()
    }

    fn maximum_key(&self) -> String {
        "z".to_string()
    }

    fn key_between(&self, low: &str, high: &str) -> Result<String, RankError> {
        let a = Self::parse(low)?;
        let b = Self::parse(high)?;
        let (low, high) = match base36::compare(&a, &b) {
            Ordering::Less => (a, b),
            Ordering::Greater => (b, a),
            Ordering::Equal => {
                return Err(RankError::EmptyInterval {
                    key: low.to_string(),
                })
            }
        };
        Ok(base36::render(&base36::between(&low, &high, 1)))
    }
}

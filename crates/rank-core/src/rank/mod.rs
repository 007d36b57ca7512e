//! Order-key generation (fractional indexing).
//!
//! A [`RankGenerator`] owns a densely ordered key space of strings compared
//! with plain byte-wise ordering. The reorder engine only ever asks it for the
//! two ends of the space and for a key strictly between two existing keys.

mod base36;
mod fractional;
mod lexo;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use fractional::FractionalKey;
pub use lexo::{LexoRank, LexoRankGenerator, BUCKET_COUNT};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankError {
    #[error("malformed order key {key:?}: {reason}")]
    Malformed { key: String, reason: &'static str },

    #[error("order keys {low:?} and {high:?} belong to different buckets")]
    BucketMismatch { low: String, high: String },

    #[error("no order key fits between {key:?} and an equal key")]
    EmptyInterval { key: String },

    #[error("rank bucket {0} is out of range (expected 0, 1 or 2)")]
    InvalidBucket(u8),

    #[error("unknown rank scheme {0:?} (expected \"lexorank\" or \"fractional\")")]
    UnknownScheme(String),
}

/// Source of order keys.
pub trait RankGenerator {
    /// The lowest key of the key space.
    fn minimum_key(&self) -> String;

    /// The highest key of the key space.
    fn maximum_key(&self) -> String;

    /// A key strictly greater than `low` and strictly less than `high`.
    ///
    /// Bounds given in the wrong order are swapped. Equal bounds are an
    /// [`RankError::EmptyInterval`].
    fn key_between(&self, low: &str, high: &str) -> Result<String, RankError>;

    /// `count` ascending keys spread evenly across the whole key space.
    ///
    /// Used to seed a list whose documents carry no order key yet.
    fn spread_keys(&self, count: usize) -> Result<Vec<String>, RankError> {
        let mut keys = Vec::with_capacity(count);
        let (low, high) = (self.minimum_key(), self.maximum_key());
        fill_between(self, &low, &high, count, &mut keys)?;
        Ok(keys)
    }
}

// In-order bisection: left half, midpoint, right half.
fn fill_between<G: RankGenerator + ?Sized>(
    ranks: &G,
    low: &str,
    high: &str,
    count: usize,
    out: &mut Vec<String>,
) -> Result<(), RankError> {
    if count == 0 {
        return Ok(());
    }
    let mid = ranks.key_between(low, high)?;
    let left = (count - 1) / 2;
    fill_between(ranks, low, &mid, left, out)?;
    out.push(mid.clone());
    fill_between(ranks, &mid, high, count - 1 - left, out)
}

impl<G: RankGenerator + ?Sized> RankGenerator for &G {
    fn minimum_key(&self) -> String {
        (**self).minimum_key()
    }

    fn maximum_key(&self) -> String {
        (**self).maximum_key()
    }

    fn key_between(&self, low: &str, high: &str) -> Result<String, RankError> {
        (**self).key_between(low, high)
    }
}

/// Which key format a list uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemeKind {
    /// `0|hzzzzz:` style keys.
    #[default]
    LexoRank,
    /// Bare base-36 fractions such as `"h"` or `"ci"`.
    Fractional,
}

impl fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemeKind::LexoRank => f.write_str("lexorank"),
            SchemeKind::Fractional => f.write_str("fractional"),
        }
    }
}

impl FromStr for SchemeKind {
    type Err = RankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexorank" | "lexo" => Ok(SchemeKind::LexoRank),
            "fractional" => Ok(SchemeKind::Fractional),
            _ => Err(RankError::UnknownScheme(s.to_string())),
        }
    }
}

/// A generator picked at runtime, e.g. from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankScheme {
    LexoRank(LexoRankGenerator),
    Fractional(FractionalKey),
}

impl RankScheme {
    /// Build the generator for `kind`. `bucket` only matters for LexoRank.
    pub fn new(kind: SchemeKind, bucket: u8) -> Result<Self, RankError> {
        match kind {
            SchemeKind::LexoRank => Ok(RankScheme::LexoRank(LexoRankGenerator::new(bucket)?)),
            SchemeKind::Fractional => Ok(RankScheme::Fractional(FractionalKey)),
        }
    }

    pub fn kind(&self) -> SchemeKind {
        match self {
            RankScheme::LexoRank(_) => SchemeKind::LexoRank,
            RankScheme::Fractional(_) => SchemeKind::Fractional,
        }
    }
}

impl Default for RankScheme {
    fn default() -> Self {
        RankScheme::LexoRank(LexoRankGenerator::default())
    }
}

impl RankGenerator for RankScheme {
    fn minimum_key(&self) -> String {
        match self {
            RankScheme::LexoRank(g) => g.minimum_key(),
            RankScheme::Fractional(g) => g.minimum_key(),
        }
    }

    fn maximum_key(&self) -> String {
        match self {
            RankScheme::LexoRank(g) => g.maximum_key(),
            RankScheme::Fractional(g) => g.maximum_key(),
        }
    }

    fn key_between(&self, low: &str, high: &str) -> Result<String, RankError> {
        match self {
            RankScheme::LexoRank(g) => g.key_between(low, high),
            RankScheme::Fractional(g) => g.key_between(low, high),
        }
    }
}

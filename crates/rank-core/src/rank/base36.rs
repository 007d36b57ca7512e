//! Base-36 digit arithmetic shared by the rank schemes.
//!
//! A key body is a run of digits `0..36` read as a number. Digits render as
//! `0-9a-z`, and that ASCII order matches digit order, so two bodies without
//! trailing fraction zeros compare the same way as strings and as numbers.

use std::cmp::Ordering;

pub(crate) const BASE: u8 = 36;

/// Parse `0-9a-z` into digit values. Returns `None` on any other byte.
pub(crate) fn parse_digits(text: &str) -> Option<Vec<u8>> {
    text.bytes().map(digit_value).collect()
}

fn digit_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'z' => Some(byte - b'a' + 10),
        _ => None,
    }
}

pub(crate) fn render(digits: &[u8]) -> String {
    digits
        .iter()
        .map(|&d| {
            if d < 10 {
                char::from(b'0' + d)
            } else {
                char::from(b'a' + d - 10)
            }
        })
        .collect()
}

/// Numeric comparison; a missing trailing digit reads as zero.
pub(crate) fn compare(a: &[u8], b: &[u8]) -> Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Exact midpoint `(a + b) / 2`, at most one digit longer than the longer input.
pub(crate) fn midpoint(a: &[u8], b: &[u8]) -> Vec<u8> {
    let len = a.len().max(b.len());

    let mut sum = vec![0u8; len];
    let mut carry = 0u8;
    for i in (0..len).rev() {
        let total = a.get(i).copied().unwrap_or(0) + b.get(i).copied().unwrap_or(0) + carry;
        sum[i] = total % BASE;
        carry = total / BASE;
    }

    // Halve from the most significant digit, pushing the remainder down.
    let mut half = Vec::with_capacity(len + 1);
    let mut remainder = carry;
    for digit in sum {
        let current = remainder * BASE + digit;
        half.push(current / 2);
        remainder = current % 2;
    }
    if remainder == 1 {
        half.push(BASE / 2);
    }
    half
}

/// Shortest digit run strictly between `low` and `high`, never shorter than
/// `min_len` digits and never ending in a zero past `min_len`.
///
/// Callers guarantee `low < high`.
pub(crate) fn between(low: &[u8], high: &[u8], min_len: usize) -> Vec<u8> {
    debug_assert_eq!(compare(low, high), Ordering::Less);

    let mut mid = midpoint(low, high);
    if mid.len() < min_len {
        mid.resize(min_len, 0);
    }

    // Any prefix of the midpoint is <= midpoint < high, so the first prefix
    // that clears `low` is the shortest valid key.
    let len = (min_len..mid.len())
        .find(|&len| compare(&mid[..len], low) == Ordering::Greater)
        .unwrap_or(mid.len());
    mid.truncate(len);

    while mid.len() > min_len && mid.last() == Some(&0) {
        mid.pop();
    }
    mid
}

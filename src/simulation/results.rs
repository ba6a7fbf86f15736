// src/simulation/results.rs
use std::collections::BTreeMap;
use std::fmt;

/// Measurement outcome frequencies: classical bit-string -> number of shots.
///
/// Bit-strings print classical bit 0 as the rightmost character. Keys are
/// kept ordered so reports and snapshots are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counts {
    outcomes: BTreeMap<String, u64>,
}

impl Counts {
    /// Creates an empty set of counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one observation of `bitstring`.
    pub fn record(&mut self, bitstring: impl Into<String>) {
        *self.outcomes.entry(bitstring.into()).or_insert(0) += 1;
    }

    /// Adds `count` observations of `bitstring`.
    pub fn add(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.outcomes.entry(bitstring.into()).or_insert(0) += count;
    }

    /// Number of observations of `bitstring` (0 when never observed).
    pub fn get(&self, bitstring: &str) -> u64 {
        self.outcomes.get(bitstring).copied().unwrap_or(0)
    }

    /// Total number of observations.
    pub fn total(&self) -> u64 {
        self.outcomes.values().sum()
    }

    /// Number of distinct outcomes observed.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// True when nothing was observed.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty() || self.total() == 0
    }

    /// Iterates outcomes in bit-string order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.outcomes.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// The most frequently observed outcome; ties resolve to the smallest bit-string.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.iter()
            .fold(None, |best: Option<(&str, u64)>, (k, v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((k, v)),
            })
    }
}

impl FromIterator<(String, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut counts = Counts::new();
        for (k, v) in iter {
            counts.add(k, v);
        }
        counts
    }
}

impl<'a> FromIterator<(&'a str, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (&'a str, u64)>>(iter: I) -> Self {
        iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.outcomes.iter().enumerate() {
            write!(f, "{}'{}': {}", if i > 0 { ", " } else { "" }, k, v)?;
        }
        write!(f, "}}")
    }
}

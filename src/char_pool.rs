use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::PoolError;

/// Built-in character pool types. The `Clear` variants drop characters that
/// are easily confused when a key is read back or typed by a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharType {
    AlphaUpper,
    AlphaLower,
    Numeric,
    AlphaUpperClear,
    AlphaLowerClear,
    NumericClear,
    Symbol,
    BasicSymbol,
}

impl CharType {
    /// All built-in types, in catalog order.
    pub const ALL: [CharType; 8] = [
        CharType::AlphaUpper,
        CharType::AlphaLower,
        CharType::Numeric,
        CharType::AlphaUpperClear,
        CharType::AlphaLowerClear,
        CharType::NumericClear,
        CharType::Symbol,
        CharType::BasicSymbol,
    ];

    /// The characters of this type.
    pub fn charset(self) -> &'static str {
        match self {
            CharType::AlphaUpper => "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
            CharType::AlphaLower => "abcdefghijklmnopqrstuvwxyz",
            CharType::Numeric => "0123456789",
            CharType::AlphaUpperClear => "ABCDEFGHJKLMNPQRTUVWXYZ",
            CharType::AlphaLowerClear => "abcdefghjkmnpqrtuvwxyz",
            CharType::NumericClear => "2346789",
            CharType::Symbol => "!@#$%^&*;:()_+-=[]{}\\|'\",.<>/?",
            CharType::BasicSymbol => "!@#$%^&*;:",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CharType::AlphaUpper => "alpha_upper",
            CharType::AlphaLower => "alpha_lower",
            CharType::Numeric => "numeric",
            CharType::AlphaUpperClear => "alpha_upper_clear",
            CharType::AlphaLowerClear => "alpha_lower_clear",
            CharType::NumericClear => "numeric_clear",
            CharType::Symbol => "symbol",
            CharType::BasicSymbol => "basic_symbol",
        }
    }
}

impl fmt::Display for CharType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for CharType {
    type Err = PoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CharType::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| PoolError::new(format!("invalid pool type: {s}")))
    }
}

/// A single source of characters: a built-in type or a custom literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinglePool {
    Builtin(CharType),
    Custom(String),
}

/// One component of a weighted mixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixEntry {
    pub pool: SinglePool,
    pub weight: f64,
}

impl MixEntry {
    pub fn new(pool: impl Into<SinglePool>, weight: f64) -> Self {
        Self {
            pool: pool.into(),
            weight,
        }
    }
}

/// Specification of a character pool: a single source, or an ordered weighted
/// mixture of several sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolSpec {
    Single(SinglePool),
    Mixture(Vec<MixEntry>),
}

impl From<CharType> for SinglePool {
    fn from(t: CharType) -> Self {
        SinglePool::Builtin(t)
    }
}

impl From<&str> for SinglePool {
    fn from(s: &str) -> Self {
        SinglePool::Custom(s.to_string())
    }
}

impl From<SinglePool> for PoolSpec {
    fn from(p: SinglePool) -> Self {
        PoolSpec::Single(p)
    }
}

impl From<CharType> for PoolSpec {
    fn from(t: CharType) -> Self {
        PoolSpec::Single(SinglePool::Builtin(t))
    }
}

impl From<&str> for PoolSpec {
    fn from(s: &str) -> Self {
        PoolSpec::Single(SinglePool::Custom(s.to_string()))
    }
}

impl PoolSpec {
    pub fn mixture(entries: impl IntoIterator<Item = MixEntry>) -> Self {
        PoolSpec::Mixture(entries.into_iter().collect())
    }
}

/// Resolves a pool specification into the flat character sequence keys are
/// sampled from. Deterministic; resolving the same spec twice yields the
/// same sequence.
pub fn resolve(spec: &PoolSpec) -> Result<Vec<char>, PoolError> {
    match spec {
        PoolSpec::Single(pool) => resolve_single(pool),
        PoolSpec::Mixture(entries) => resolve_mixture(entries),
    }
}

/// The built-in catalog: each type paired with its characters, in order.
pub fn available_char_pools() -> Vec<(CharType, &'static str)> {
    CharType::ALL.into_iter().map(|t| (t, t.charset())).collect()
}

fn resolve_single(pool: &SinglePool) -> Result<Vec<char>, PoolError> {
    match pool {
        SinglePool::Builtin(t) => Ok(t.charset().chars().collect()),
        SinglePool::Custom(s) if s.is_empty() => Err(PoolError::new("custom pool was blank")),
        SinglePool::Custom(s) => Ok(s.chars().collect()),
    }
}

/// Concatenates repeated copies of each sub-pool so that the ratio of
/// sub-pool lengths in the result approximates the normalized weights as
/// closely as integer repetition allows.
fn resolve_mixture(entries: &[MixEntry]) -> Result<Vec<char>, PoolError> {
    if entries.is_empty() {
        return Err(PoolError::new("mixture was empty"));
    }

    let mut pools = Vec::with_capacity(entries.len());
    for entry in entries {
        if !entry.weight.is_finite() || entry.weight < 0.0 {
            return Err(PoolError::new(format!(
                "invalid proportion: {}",
                entry.weight
            )));
        }
        pools.push(resolve_single(&entry.pool)?);
    }

    let total: f64 = entries.iter().map(|e| e.weight).sum();
    if total == 0.0 {
        return Err(PoolError::new("invalid proportion: 0"));
    }

    // Scale each sub-pool to an integer multiple: LCM of the lengths spreads
    // the weights over a common size, and dividing out the GCD of the
    // resulting multiples keeps the concatenation as short as possible.
    // The LCM grows multiplicatively for coprime lengths, so it can exceed
    // u64 on valid input; that mixture cannot be materialized.
    let lengths: Vec<u64> = pools.iter().map(|p| p.len() as u64).collect();
    let mut common = 1u64;
    for &len in &lengths {
        common = lcm(common, len)
            .ok_or_else(|| PoolError::new("mixture is too large to resolve"))?;
    }

    let multiples: Vec<u64> = lengths
        .iter()
        .zip(entries)
        .map(|(&len, entry)| {
            let normalized = entry.weight / total;
            ((common / len) as f64 * normalized * 100.0).round() as u64
        })
        .collect();
    // A sub-pool whose multiple rounds to zero is simply left out; if every
    // multiple rounds to zero the proportions cannot be represented at all.
    let reduce = multiples.iter().fold(0, |acc, &m| gcd(acc, m));
    if reduce == 0 {
        return Err(PoolError::new("invalid proportion: mixture is too fine-grained"));
    }

    let mut combined = Vec::new();
    for (pool, multiple) in pools.iter().zip(&multiples) {
        for _ in 0..(multiple / reduce) {
            combined.extend_from_slice(pool);
        }
    }

    Ok(combined)
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}

fn lcm(a: u64, b: u64) -> Option<u64> {
    (a / gcd(a, b)).checked_mul(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(spec: &PoolSpec) -> String {
        resolve(spec).unwrap().into_iter().collect()
    }

    #[test]
    fn builtin_pools_match_their_charsets() {
        assert_eq!(
            joined(&CharType::AlphaUpper.into()),
            "ABCDEFGHIJKLMNOPQRSTUVWXYZ"
        );
        assert_eq!(
            joined(&CharType::AlphaLower.into()),
            "abcdefghijklmnopqrstuvwxyz"
        );
        assert_eq!(joined(&CharType::Numeric.into()), "0123456789");
        assert_eq!(
            joined(&CharType::AlphaUpperClear.into()),
            "ABCDEFGHJKLMNPQRTUVWXYZ"
        );
        assert_eq!(
            joined(&CharType::AlphaLowerClear.into()),
            "abcdefghjkmnpqrtuvwxyz"
        );
        assert_eq!(joined(&CharType::NumericClear.into()), "2346789");
        assert_eq!(
            joined(&CharType::Symbol.into()),
            "!@#$%^&*;:()_+-=[]{}\\|'\",.<>/?"
        );
        assert_eq!(joined(&CharType::BasicSymbol.into()), "!@#$%^&*;:");
    }

    #[test]
    fn clear_variants_exclude_ambiguous_characters() {
        for c in ['I', 'O', 'S'] {
            assert!(!CharType::AlphaUpperClear.charset().contains(c));
        }
        for c in ['i', 'l', 'o', 's'] {
            assert!(!CharType::AlphaLowerClear.charset().contains(c));
        }
        for c in ['0', '1', '5'] {
            assert!(!CharType::NumericClear.charset().contains(c));
        }
    }

    #[test]
    fn catalog_lists_types_in_order() {
        let catalog = available_char_pools();
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog[0], (CharType::AlphaUpper, "ABCDEFGHIJKLMNOPQRSTUVWXYZ"));
        assert_eq!(catalog[7], (CharType::BasicSymbol, "!@#$%^&*;:"));
    }

    #[test]
    fn parses_type_names() {
        assert_eq!("numeric".parse::<CharType>().unwrap(), CharType::Numeric);
        assert_eq!(
            "alpha_upper_clear".parse::<CharType>().unwrap(),
            CharType::AlphaUpperClear
        );
        let err = "bad".parse::<CharType>().unwrap_err();
        assert_eq!(err.message(), "invalid pool type: bad");
    }

    #[test]
    fn custom_pool_keeps_characters_in_order() {
        assert_eq!(joined(&PoolSpec::from("XYZ01234")), "XYZ01234");
    }

    #[test]
    fn blank_custom_pool_is_rejected() {
        let err = resolve(&PoolSpec::from("")).unwrap_err();
        assert_eq!(err.message(), "custom pool was blank");
    }

    #[test]
    fn equal_length_equal_weight_mixture_concatenates_once() {
        let spec = PoolSpec::mixture([
            MixEntry::new(CharType::AlphaUpper, 1.0),
            MixEntry::new(CharType::AlphaLower, 1.0),
        ]);
        assert_eq!(
            joined(&spec),
            "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz"
        );
    }

    #[test]
    fn weights_are_normalized_before_use() {
        let scaled = PoolSpec::mixture([
            MixEntry::new(CharType::AlphaUpper, 0.2),
            MixEntry::new("246", 0.2),
        ]);
        let unit = PoolSpec::mixture([
            MixEntry::new(CharType::AlphaUpper, 1.0),
            MixEntry::new("246", 1.0),
        ]);
        assert_eq!(resolve(&scaled).unwrap(), resolve(&unit).unwrap());
    }

    #[test]
    fn proportioned_mixture_repeats_pools_to_match_weights() {
        let spec = PoolSpec::mixture([
            MixEntry::new(CharType::Numeric, 0.25),
            MixEntry::new(CharType::AlphaUpper, 0.75),
        ]);
        let resolved = resolve(&spec).unwrap();

        let digits = resolved.iter().filter(|c| c.is_ascii_digit()).count();
        let uppers = resolved.iter().filter(|c| c.is_ascii_uppercase()).count();
        assert_eq!(digits, 130);
        assert_eq!(uppers, 390);
        // Sub-pools appear in entry order.
        assert!(resolved[..digits].iter().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let spec = PoolSpec::mixture([MixEntry::new(CharType::Numeric, -1.0)]);
        let err = resolve(&spec).unwrap_err();
        assert_eq!(err.message(), "invalid proportion: -1");
    }

    #[test]
    fn nan_weight_is_rejected() {
        let spec = PoolSpec::mixture([MixEntry::new(CharType::Numeric, f64::NAN)]);
        let err = resolve(&spec).unwrap_err();
        assert_eq!(err.message(), "invalid proportion: NaN");
    }

    #[test]
    fn empty_mixture_is_rejected() {
        let err = resolve(&PoolSpec::Mixture(vec![])).unwrap_err();
        assert_eq!(err.message(), "mixture was empty");
    }

    #[test]
    fn mixture_with_unrepresentable_lcm_is_rejected() {
        // Pairwise-coprime lengths push the LCM past u64.
        let primes = [101, 103, 107, 109, 113, 127, 131, 137, 139, 149];
        let entries: Vec<MixEntry> = primes
            .iter()
            .map(|&len| MixEntry::new(SinglePool::Custom("a".repeat(len)), 1.0))
            .collect();
        let err = resolve(&PoolSpec::Mixture(entries)).unwrap_err();
        assert_eq!(err.message(), "mixture is too large to resolve");
    }

    #[test]
    fn mixture_with_too_many_entries_to_proportion_is_rejected() {
        // 201 equal weights: every multiple is round(100/201) = 0.
        let entries: Vec<MixEntry> = (0..201)
            .map(|_| MixEntry::new(SinglePool::Custom("a".to_string()), 1.0))
            .collect();
        let err = resolve(&PoolSpec::Mixture(entries)).unwrap_err();
        assert_eq!(err.message(), "invalid proportion: mixture is too fine-grained");
    }

    #[test]
    fn zero_sum_weights_are_rejected() {
        let spec = PoolSpec::mixture([
            MixEntry::new(CharType::Numeric, 0.0),
            MixEntry::new(CharType::AlphaUpper, 0.0),
        ]);
        let err = resolve(&spec).unwrap_err();
        assert_eq!(err.message(), "invalid proportion: 0");
    }

    #[test]
    fn resolution_is_deterministic() {
        let spec = PoolSpec::mixture([
            MixEntry::new(CharType::NumericClear, 1.0),
            MixEntry::new("AEIOU", 2.5),
        ]);
        assert_eq!(resolve(&spec).unwrap(), resolve(&spec).unwrap());
    }

    #[test]
    fn spec_round_trips_through_json() {
        let spec = PoolSpec::mixture([
            MixEntry::new(CharType::AlphaUpper, 3.0),
            MixEntry::new("xyz", 1.0),
        ]);
        let json = serde_json::to_string(&spec).unwrap();
        let back: PoolSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }
}

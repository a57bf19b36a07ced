use std::collections::BTreeMap;

use rand::Rng;

use crate::char_pool::{self, PoolSpec};
use crate::errors::GeneratorError;

/// Generates random keys matching a format string.
///
/// Characters of the format that appear as keys in the char_pool mapping are
/// placeholders filled by sampling the corresponding resolved pool; all other
/// characters pass through unchanged.
#[derive(Debug, Clone)]
pub struct Generator {
    format: String,
    char_pool: BTreeMap<String, PoolSpec>,
    resolved: BTreeMap<char, Vec<char>>,
    n_possible_keys: u128,
}

impl Generator {
    pub fn new(
        format: impl Into<String>,
        char_pool: BTreeMap<String, PoolSpec>,
    ) -> Result<Self, GeneratorError> {
        let format = format.into();
        let (resolved, n_possible_keys) = Self::rebuild(&format, &char_pool)?;
        Ok(Self {
            format,
            char_pool,
            resolved,
            n_possible_keys,
        })
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn char_pool(&self) -> &BTreeMap<String, PoolSpec> {
        &self.char_pool
    }

    /// Total count of distinct keys the current configuration can produce.
    pub fn n_possible_keys(&self) -> u128 {
        self.n_possible_keys
    }

    /// Replaces the format. On failure the generator is left unchanged.
    pub fn set_format(&mut self, new_format: impl Into<String>) -> Result<(), GeneratorError> {
        let new_format = new_format.into();
        let (resolved, n_possible_keys) = Self::rebuild(&new_format, &self.char_pool)?;
        self.format = new_format;
        self.resolved = resolved;
        self.n_possible_keys = n_possible_keys;
        Ok(())
    }

    /// Replaces the char_pool mapping. On failure the generator is left
    /// unchanged.
    pub fn set_char_pool(
        &mut self,
        new_char_pool: BTreeMap<String, PoolSpec>,
    ) -> Result<(), GeneratorError> {
        let (resolved, n_possible_keys) = Self::rebuild(&self.format, &new_char_pool)?;
        self.char_pool = new_char_pool;
        self.resolved = resolved;
        self.n_possible_keys = n_possible_keys;
        Ok(())
    }

    /// Generates a single key.
    pub fn generate(&self) -> String {
        let mut rng = rand::rng();
        self.sample_key(&mut rng)
    }

    /// Generates `n` pairwise-distinct keys, in the order they were first
    /// produced.
    ///
    /// Collisions are resampled without an upper bound, so generation slows
    /// down as `n` approaches [`n_possible_keys`](Self::n_possible_keys).
    pub fn generate_n(&self, n: usize) -> Result<Vec<String>, GeneratorError> {
        if n as u128 > self.n_possible_keys {
            return Err(GeneratorError::new(format!(
                "there are only {} possible keys",
                self.n_possible_keys
            )));
        }

        let mut rng = rand::rng();
        let mut keys: Vec<String> = Vec::with_capacity(n);
        while keys.len() < n {
            let key = self.sample_key(&mut rng);
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    /// Validates a candidate configuration and computes its caches. The
    /// caller commits the result, so a failure never leaves the generator
    /// half-updated.
    fn rebuild(
        format: &str,
        char_pool: &BTreeMap<String, PoolSpec>,
    ) -> Result<(BTreeMap<char, Vec<char>>, u128), GeneratorError> {
        if format.is_empty() {
            return Err(GeneratorError::new("format is required"));
        }
        if char_pool.is_empty() {
            return Err(GeneratorError::new("char_pool is required"));
        }
        if !char_pool.keys().all(|letter| letter.chars().count() == 1) {
            return Err(GeneratorError::new(
                "char_pool letters must each be strings of length 1",
            ));
        }
        if !format.chars().any(|c| char_pool.contains_key(c.to_string().as_str())) {
            return Err(GeneratorError::new("no char_pool letters present in format"));
        }

        let mut resolved = BTreeMap::new();
        for (letter, spec) in char_pool {
            // Keys were just checked to be exactly one character.
            let c = letter.chars().next().unwrap();
            resolved.insert(c, char_pool::resolve(spec)?);
        }

        let n_possible_keys = format
            .chars()
            .map(|c| resolved.get(&c).map_or(1, |pool| pool.len() as u128))
            .fold(1u128, |acc, size| acc.saturating_mul(size));

        Ok((resolved, n_possible_keys))
    }

    fn sample_key(&self, rng: &mut impl Rng) -> String {
        self.format
            .chars()
            .map(|c| match self.resolved.get(&c) {
                Some(pool) => pool[rng.random_range(0..pool.len())],
                None => c,
            })
            .collect()
    }
}

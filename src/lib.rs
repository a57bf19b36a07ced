//! Flexible random key generation.
//!
//! A [`Generator`] owns a format string in which designated placeholder
//! characters are replaced by characters drawn from configurable weighted
//! character pools, producing license keys, coupon codes, and similar tokens:
//!
//! ```
//! use flexkey::{CharType, Generator, PoolSpec};
//! use std::collections::BTreeMap;
//!
//! let mut pools = BTreeMap::new();
//! pools.insert("n".to_string(), PoolSpec::from(CharType::Numeric));
//! pools.insert("a".to_string(), PoolSpec::from(CharType::AlphaUpperClear));
//!
//! let generator = Generator::new("nnn-aaa", pools).unwrap();
//! let key = generator.generate();
//! assert_eq!(key.len(), 7);
//! ```

pub mod char_pool;
pub mod errors;
pub mod generator;

pub use char_pool::{CharType, MixEntry, PoolSpec, SinglePool};
pub use errors::{GeneratorError, PoolError};
pub use generator::Generator;

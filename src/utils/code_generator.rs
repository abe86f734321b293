//! Short code generation.
//!
//! Codes are drawn from a fixed 62-symbol alphanumeric alphabet. The entropy
//! source is passed in explicitly so tests can substitute fixed or failing
//! sources. When the primary source fails, [`CodeGenerator`] degrades to a
//! seeded PRNG instead of failing the request.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::warn;

/// Symbols a generated code is made of: lowercase, uppercase, digits.
pub const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Bytes at or above this value are discarded so every symbol is equally likely
/// (248 = 4 * 62).
const ACCEPT_BELOW: u8 = 248;

/// Consecutive reads without a single usable byte before a source is declared broken.
const MAX_EMPTY_ROUNDS: usize = 8;

#[derive(Debug, Error)]
#[error("entropy source failed: {0}")]
pub struct EntropyError(pub String);

/// A source of random bytes.
pub trait EntropySource: Send + Sync {
    fn fill(&self, dest: &mut [u8]) -> Result<(), EntropyError>;
}

/// Operating system CSPRNG via `getrandom`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<(), EntropyError> {
        getrandom::fill(dest).map_err(|e| EntropyError(e.to_string()))
    }
}

/// Draws a code of exactly `length` symbols from `source`.
///
/// # Errors
///
/// Returns [`EntropyError`] if the source fails or keeps yielding only
/// rejected bytes.
pub fn generate_code(length: usize, source: &dyn EntropySource) -> Result<String, EntropyError> {
    let mut code = String::with_capacity(length);
    let mut buf = [0u8; 64];
    let mut empty_rounds = 0;

    while code.len() < length {
        let missing = length - code.len();
        let want = (missing + missing / 4 + 1).min(buf.len());
        source.fill(&mut buf[..want])?;

        let before = code.len();
        for &b in buf[..want].iter().filter(|b| **b < ACCEPT_BELOW) {
            code.push(ALPHABET[usize::from(b % 62)] as char);
            if code.len() == length {
                break;
            }
        }

        if code.len() == before {
            empty_rounds += 1;
            if empty_rounds == MAX_EMPTY_ROUNDS {
                return Err(EntropyError(
                    "source produced no usable bytes".to_string(),
                ));
            }
        } else {
            empty_rounds = 0;
        }
    }

    Ok(code)
}

/// Draws a code from a PRNG seeded with `seed`.
///
/// Deterministic for a given seed.
pub fn fallback_code(length: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..length)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Seed for the degraded path: OS entropy if any is left, otherwise the clock
/// mixed with the process id.
pub fn default_fallback_seed() -> u64 {
    let mut buf = [0u8; 8];
    if getrandom::fill(&mut buf).is_ok() {
        return u64::from_le_bytes(buf);
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1);
    nanos ^ (u64::from(std::process::id()) << 32)
}

/// Code generator with an injected primary source and fallback seed strategy.
#[derive(Clone)]
pub struct CodeGenerator {
    source: Arc<dyn EntropySource>,
    fallback_seed: Arc<dyn Fn() -> u64 + Send + Sync>,
}

impl CodeGenerator {
    pub fn new(source: Arc<dyn EntropySource>) -> Self {
        Self {
            source,
            fallback_seed: Arc::new(default_fallback_seed),
        }
    }

    pub fn with_fallback_seed(mut self, seed: impl Fn() -> u64 + Send + Sync + 'static) -> Self {
        self.fallback_seed = Arc::new(seed);
        self
    }

    /// Generates a code of `length` symbols. Never fails.
    pub fn generate(&self, length: usize) -> String {
        match generate_code(length, self.source.as_ref()) {
            Ok(code) => code,
            Err(e) => {
                warn!("Falling back to seeded generator: {}", e);
                fallback_code(length, (self.fallback_seed)())
            }
        }
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(Arc::new(OsEntropy))
    }
}

impl std::fmt::Debug for CodeGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeGenerator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays a fixed byte sequence, wrapping around.
    struct SequenceEntropy {
        bytes: Vec<u8>,
        pos: AtomicUsize,
    }

    impl SequenceEntropy {
        fn new(bytes: Vec<u8>) -> Self {
            Self {
                bytes,
                pos: AtomicUsize::new(0),
            }
        }
    }

    impl EntropySource for SequenceEntropy {
        fn fill(&self, dest: &mut [u8]) -> Result<(), EntropyError> {
            for b in dest.iter_mut() {
                let i = self.pos.fetch_add(1, Ordering::Relaxed);
                *b = self.bytes[i % self.bytes.len()];
            }
            Ok(())
        }
    }

    struct BrokenEntropy;

    impl EntropySource for BrokenEntropy {
        fn fill(&self, _dest: &mut [u8]) -> Result<(), EntropyError> {
            Err(EntropyError("unavailable".to_string()))
        }
    }

    fn in_alphabet(code: &str) -> bool {
        code.bytes().all(|b| ALPHABET.contains(&b))
    }

    #[test]
    fn test_alphabet_has_62_distinct_symbols() {
        let set: HashSet<u8> = ALPHABET.iter().copied().collect();
        assert_eq!(set.len(), 62);
        assert!(ALPHABET.iter().all(|b| b.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_has_requested_length() {
        let generator = CodeGenerator::default();
        for length in [1, 6, 12, 100] {
            let code = generator.generate(length);
            assert_eq!(code.len(), length);
            assert!(in_alphabet(&code));
        }
    }

    #[test]
    fn test_generate_zero_length_is_empty() {
        assert_eq!(generate_code(0, &OsEntropy).unwrap(), "");
    }

    #[test]
    fn test_generate_produces_unique_codes() {
        let generator = CodeGenerator::default();
        let codes: HashSet<String> = (0..1000).map(|_| generator.generate(10)).collect();
        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn test_fixed_source_is_deterministic() {
        let source = SequenceEntropy::new((0u8..62).collect());
        let code = generate_code(6, &source).unwrap();
        assert_eq!(code, "abcdef");

        let source = SequenceEntropy::new(vec![26, 52, 61]);
        assert_eq!(generate_code(3, &source).unwrap(), "A09");
    }

    #[test]
    fn test_biased_bytes_are_rejected() {
        let source = SequenceEntropy::new(vec![255, 248, 1]);
        let code = generate_code(4, &source).unwrap();
        assert_eq!(code, "bbbb");
    }

    #[test]
    fn test_source_with_only_rejected_bytes_fails() {
        let source = SequenceEntropy::new(vec![250]);
        assert!(generate_code(6, &source).is_err());
    }

    #[test]
    fn test_broken_source_falls_back() {
        let generator = CodeGenerator::new(Arc::new(BrokenEntropy)).with_fallback_seed(|| 42);

        let first = generator.generate(6);
        let second = generator.generate(6);

        assert_eq!(first.len(), 6);
        assert!(in_alphabet(&first));
        assert_eq!(first, second);
        assert_eq!(first, fallback_code(6, 42));
    }

    #[test]
    fn test_fallback_depends_on_seed() {
        assert_ne!(fallback_code(12, 1), fallback_code(12, 2));
    }
}

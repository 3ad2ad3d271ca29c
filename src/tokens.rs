//! Document Number Tokens
//!
//! Tokens are non-cryptographic and collision-tolerant. Uniqueness across
//! runs is not guaranteed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Source of uppercase alphanumeric tokens
pub trait TokenSource {
    fn next_token(&mut self, len: usize) -> String;
}

fn draw<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect()
}

/// Thread-local RNG tokens, used outside of tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTokens;

impl TokenSource for RandomTokens {
    fn next_token(&mut self, len: usize) -> String {
        draw(&mut rand::rng(), len)
    }
}

/// Reproducible tokens: the same seed yields the same sequence.
#[derive(Debug, Clone)]
pub struct SeededTokens {
    rng: ChaCha8Rng,
}

impl SeededTokens {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }
}

impl TokenSource for SeededTokens {
    fn next_token(&mut self, len: usize) -> String {
        draw(&mut self.rng, len)
    }
}

/// Returns each configured token in turn, cycling when exhausted.
///
/// Tokens are truncated or right-padded with `0` to the requested length.
#[derive(Debug, Clone)]
pub struct FixedTokens {
    tokens: Vec<String>,
    next: usize,
}

impl FixedTokens {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            next: 0,
        }
    }
}

impl TokenSource for FixedTokens {
    fn next_token(&mut self, len: usize) -> String {
        let Some(token) = self.tokens.get(self.next % self.tokens.len().max(1)) else {
            return "0".repeat(len);
        };
        self.next += 1;
        let mut out: String = token.chars().take(len).collect();
        while out.chars().count() < len {
            out.push('0');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_token(s: &str, len: usize) -> bool {
        s.len() == len && s.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    }

    #[test]
    fn test_random_tokens_shape() {
        let mut source = RandomTokens;
        for _ in 0..50 {
            assert!(is_token(&source.next_token(7), 7));
        }
    }

    #[test]
    fn test_seeded_tokens_reproducible() {
        let mut a = SeededTokens::new(42);
        let mut b = SeededTokens::new(42);
        let first: Vec<_> = (0..5).map(|_| a.next_token(7)).collect();
        let second: Vec<_> = (0..5).map(|_| b.next_token(7)).collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|t| is_token(t, 7)));
    }

    #[test]
    fn test_fixed_tokens_cycle_and_pad() {
        let mut source = FixedTokens::new(["ABC1234", "XY"]);
        assert_eq!(source.next_token(7), "ABC1234");
        assert_eq!(source.next_token(7), "XY00000");
        assert_eq!(source.next_token(3), "ABC");
    }

    #[test]
    fn test_fixed_tokens_empty() {
        let mut source = FixedTokens::new(Vec::<String>::new());
        assert_eq!(source.next_token(4), "0000");
    }
}

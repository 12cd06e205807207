//! # Confirmation Numbers
//!
//! Generates the human-readable booking reference printed on vouchers and
//! read out over the phone.
//!
//! ## Format
//! ```text
//!   RES-20240212-7KQ2MX
//!   ─┬─ ───┬──── ───┬──
//!    │     │        └── 6 symbols from a 32-symbol alphabet (no 0/O, 1/I)
//!    │     └─────────── booking date (UTC)
//!    └───────────────── configurable prefix
//! ```
//!
//! 32⁶ ≈ 10⁹ suffixes per day. Uniqueness is still checked against the store
//! and a collision simply draws again, up to `max_attempts` times. The
//! store's UNIQUE constraint remains the final word: a code that becomes
//! taken between this check and the insert is retried by the booking flow.

use chrono::{NaiveDate, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::BookingConfig;
use crate::error::{BookingError, BookingResult};
use crate::store::ReservationStore;

/// Symbols of the random suffix.
pub const ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of the random suffix.
pub const SUFFIX_LEN: usize = 6;

/// Produces confirmation numbers that are unique in a [`ReservationStore`].
#[derive(Debug, Clone)]
pub struct ConfirmationCodeGenerator {
    prefix: String,
    max_attempts: u32,
}

impl ConfirmationCodeGenerator {
    pub fn new(prefix: impl Into<String>, max_attempts: u32) -> Self {
        ConfirmationCodeGenerator {
            prefix: prefix.into(),
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn from_config(config: &BookingConfig) -> Self {
        ConfirmationCodeGenerator::new(
            config.confirmation_prefix.clone(),
            config.confirmation_max_attempts,
        )
    }

    #[inline]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// A fresh candidate for `day`. Not checked against the store.
    pub fn candidate(&self, day: NaiveDate) -> String {
        format!("{}-{}-{}", self.prefix, day.format("%Y%m%d"), random_suffix())
    }

    /// A confirmation number not yet used in `store`.
    ///
    /// ## Errors
    /// - `ConfirmationCodeExhausted` after `max_attempts` collisions
    /// - `Storage` when the existence check fails
    pub async fn generate<S>(&self, store: &S) -> BookingResult<String>
    where
        S: ReservationStore + ?Sized,
    {
        let today = Utc::now().date_naive();
        let (code, _) = self
            .generate_with(store, self.max_attempts, || self.candidate(today))
            .await?;
        Ok(code)
    }

    /// Draws from `next` until a candidate is free, at most `attempts` times.
    ///
    /// Returns the free code and the number of draws it took, so a caller
    /// retrying on insert can charge them against one shared budget.
    pub async fn generate_with<S, F>(
        &self,
        store: &S,
        attempts: u32,
        mut next: F,
    ) -> BookingResult<(String, u32)>
    where
        S: ReservationStore + ?Sized,
        F: FnMut() -> String + Send,
    {
        for attempt in 1..=attempts {
            let code = next();
            if !store.confirmation_number_exists(&code).await? {
                debug!(attempt, confirmation_number = %code, "Generated confirmation number");
                return Ok((code, attempt));
            }
            warn!(attempt, confirmation_number = %code, "Confirmation number collision");
        }

        Err(BookingError::ConfirmationCodeExhausted { attempts })
    }
}

impl Default for ConfirmationCodeGenerator {
    fn default() -> Self {
        ConfirmationCodeGenerator::from_config(&BookingConfig::default())
    }
}

/// Six symbols drawn from the bytes of a v4 UUID.
///
/// 256 is a multiple of 32, so `byte % 32` is uniform.
fn random_suffix() -> String {
    Uuid::new_v4()
        .as_bytes()
        .iter()
        .take(SUFFIX_LEN)
        .map(|b| ALPHABET[(*b as usize) % ALPHABET.len()] as char)
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{date, reservation, MemoryStore};
    use crate::types::ReservationStatus;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_candidate_format() {
        let generator = ConfirmationCodeGenerator::default();
        let code = generator.candidate(date(2024, 2, 12));

        assert!(code.starts_with("RES-20240212-"), "{}", code);
        let suffix = &code["RES-20240212-".len()..];
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[test]
    fn test_alphabet_is_unambiguous() {
        for ambiguous in [b'0', b'O', b'1', b'I'] {
            assert!(!ALPHABET.contains(&ambiguous));
        }
        let distinct: HashSet<u8> = ALPHABET.iter().copied().collect();
        assert_eq!(distinct.len(), 32);
    }

    #[tokio::test]
    async fn test_concurrent_generation_is_distinct() {
        let store = Arc::new(MemoryStore::new());
        let generator = Arc::new(ConfirmationCodeGenerator::default());

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let store = Arc::clone(&store);
                let generator = Arc::clone(&generator);
                tokio::spawn(async move { generator.generate(store.as_ref()).await })
            })
            .collect();

        let mut codes = HashSet::new();
        for handle in handles {
            let code = handle.await.unwrap().unwrap();
            codes.insert(code);
        }
        assert_eq!(codes.len(), 64);
    }

    #[tokio::test]
    async fn test_collision_draws_again() {
        let store = MemoryStore::with_room("room-101");
        let mut taken = reservation(
            "res-a",
            "room-101",
            date(2024, 2, 1),
            date(2024, 2, 3),
            ReservationStatus::Confirmed,
        );
        taken.confirmation_number = "RES-20240201-AAAAAA".to_string();
        store.seed_reservation(taken);

        let mut candidates = vec!["RES-20240201-BBBBBB", "RES-20240201-AAAAAA"];
        let generator = ConfirmationCodeGenerator::default();
        let (code, used) = generator
            .generate_with(&store, 5, || candidates.pop().unwrap_or_default().to_string())
            .await
            .unwrap();

        assert_eq!(code, "RES-20240201-BBBBBB");
        assert_eq!(used, 2);
    }

    #[tokio::test]
    async fn test_exhaustion_after_max_attempts() {
        let store = MemoryStore::with_room("room-101");
        let mut taken = reservation(
            "res-a",
            "room-101",
            date(2024, 2, 1),
            date(2024, 2, 3),
            ReservationStatus::Confirmed,
        );
        taken.confirmation_number = "RES-20240201-AAAAAA".to_string();
        store.seed_reservation(taken);

        let mut calls = 0;
        let generator = ConfirmationCodeGenerator::new("RES", 3);
        let result = generator
            .generate_with(&store, generator.max_attempts(), || {
                calls += 1;
                "RES-20240201-AAAAAA".to_string()
            })
            .await;

        assert!(matches!(
            result,
            Err(BookingError::ConfirmationCodeExhausted { attempts: 3 })
        ));
        assert_eq!(calls, 3);
    }
}

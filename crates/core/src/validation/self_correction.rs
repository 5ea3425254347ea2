//! Bounded self-correction around a generative call.
//!
//! The loop generates a candidate, validates it, and on failure hands the
//! invalid candidate and the error text to a fix call. The attempt
//! counter is explicit and includes the first generation.

use crate::agents::AgentError;
use crate::validation::structural::StructuralError;
use std::future::Future;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CorrectionError {
    #[error("Validation failed after {attempts} attempts: {last_error}")]
    Exhausted {
        attempts: u32,
        last_error: StructuralError,
    },

    #[error("Agent call failed on attempt {attempt}: {source}")]
    Agent {
        attempt: u32,
        #[source]
        source: AgentError,
    },
}

/// A value that passed validation, and how many attempts it took.
#[derive(Debug, Clone, PartialEq)]
pub struct Corrected<T> {
    pub value: T,
    pub attempts: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct SelfCorrectionLoop {
    max_attempts: u32,
}

impl Default for SelfCorrectionLoop {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS)
    }
}

impl SelfCorrectionLoop {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    /// `max_attempts` counts the first generation; values below 1 become 1.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `generate`, then `fix` until `validate` accepts or the ceiling
    /// is reached.
    ///
    /// # Arguments
    ///
    /// * `generate` - First generation
    /// * `fix` - Called with the rejected value, the error text and the
    ///   number of the attempt it serves
    /// * `validate` - Structural check applied to every candidate
    ///
    /// # Errors
    ///
    /// - `CorrectionError::Exhausted` with the last validation error once
    ///   `max_attempts` candidates were rejected
    /// - `CorrectionError::Agent` as soon as a generate or fix call fails
    pub async fn run<T, G, GFut, F, FFut, V>(
        &self,
        generate: G,
        mut fix: F,
        validate: V,
    ) -> Result<Corrected<T>, CorrectionError>
    where
        G: FnOnce() -> GFut,
        GFut: Future<Output = Result<T, AgentError>>,
        F: FnMut(T, String, u32) -> FFut,
        FFut: Future<Output = Result<T, AgentError>>,
        V: Fn(&T) -> Result<(), StructuralError>,
    {
        let mut attempt = 1;
        let mut candidate = generate()
            .await
            .map_err(|source| CorrectionError::Agent { attempt, source })?;

        loop {
            let error = match validate(&candidate) {
                Ok(()) => {
                    return Ok(Corrected {
                        value: candidate,
                        attempts: attempt,
                    })
                }
                Err(error) => error,
            };

            if attempt >= self.max_attempts {
                tracing::error!(attempt, error = %error, "Self-correction exhausted");
                return Err(CorrectionError::Exhausted {
                    attempts: attempt,
                    last_error: error,
                });
            }

            tracing::warn!(attempt, max_attempts = self.max_attempts, error = %error, "Validation failed, requesting fix");
            attempt += 1;
            candidate = fix(candidate, error.to_string(), attempt)
                .await
                .map_err(|source| CorrectionError::Agent { attempt, source })?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn reject_below(threshold: u32) -> impl Fn(&u32) -> Result<(), StructuralError> {
        move |value: &u32| {
            if *value >= threshold {
                Ok(())
            } else {
                Err(StructuralError::DanglingReference {
                    source_id: format!("v{}", value),
                    target_id: "missing".to_string(),
                })
            }
        }
    }

    #[tokio::test]
    async fn test_valid_first_try() {
        let fixes = AtomicU32::new(0);

        let result = SelfCorrectionLoop::default()
            .run(
                || async { Ok(10u32) },
                |v, _, _| {
                    fixes.fetch_add(1, Ordering::SeqCst);
                    async move { Ok(v) }
                },
                reject_below(5),
            )
            .await
            .unwrap();

        assert_eq!(result, Corrected { value: 10, attempts: 1 });
        assert_eq!(fixes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_recovers_within_ceiling() {
        let result = SelfCorrectionLoop::new(3)
            .run(|| async { Ok(0u32) }, |v, _, _| async move { Ok(v + 1) }, reject_below(2))
            .await
            .unwrap();

        assert_eq!(result.value, 2);
        assert_eq!(result.attempts, 3);
    }

    #[tokio::test]
    async fn test_exhausts_exactly_at_ceiling() {
        let calls = AtomicU32::new(0);

        let err = SelfCorrectionLoop::new(3)
            .run(
                || async { Ok(0u32) },
                |v, _, _| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async move { Ok(v) }
                },
                reject_below(100),
            )
            .await
            .unwrap_err();

        match err {
            CorrectionError::Exhausted { attempts, last_error } => {
                assert_eq!(attempts, 3);
                assert!(last_error.to_string().contains("v0"));
            }
            other => panic!("Expected Exhausted, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fix_receives_error_text_and_attempt() {
        let seen = std::sync::Mutex::new(Vec::new());

        let _ = SelfCorrectionLoop::new(2)
            .run(
                || async { Ok(1u32) },
                |v, error, attempt| {
                    seen.lock().unwrap().push((error, attempt));
                    async move { Ok(v) }
                },
                reject_below(5),
            )
            .await;

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].0.contains("['v1']"));
        assert_eq!(seen[0].1, 2);
    }

    #[tokio::test]
    async fn test_agent_failure_stops_loop() {
        let err = SelfCorrectionLoop::new(3)
            .run(
                || async { Ok(0u32) },
                |_, _, _| async { Err(AgentError::ApiError("rate limited".to_string())) },
                reject_below(1),
            )
            .await
            .unwrap_err();

        assert_eq!(
            err,
            CorrectionError::Agent {
                attempt: 2,
                source: AgentError::ApiError("rate limited".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_generate_failure_is_attempt_one() {
        let err = SelfCorrectionLoop::default()
            .run(
                || async { Err::<u32, _>(AgentError::NotAvailable("architect".to_string())) },
                |v, _, _| async move { Ok(v) },
                reject_below(0),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CorrectionError::Agent { attempt: 1, .. }));
    }

    #[test]
    fn test_ceiling_is_at_least_one() {
        assert_eq!(SelfCorrectionLoop::new(0).max_attempts(), 1);
        assert_eq!(SelfCorrectionLoop::default().max_attempts(), 3);
    }
}

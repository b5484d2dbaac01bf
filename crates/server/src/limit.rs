//! Generation concurrency cap
//!
//! One engine instance serves every request. To bound memory and compute
//! pressure, at most `max_concurrent` generations run at once and at most
//! `max_queued` requests wait for a slot; anything beyond that is rejected
//! immediately. The pipeline itself does not self-limit.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Limiter errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitError {
    #[error("Server is busy, try again later")]
    Busy,

    #[error("Server is shutting down")]
    Closed,
}

/// Held for the duration of one generation
#[derive(Debug)]
pub struct GenerationPermit {
    _permit: OwnedSemaphorePermit,
}

/// Bounded admission for generation work
pub struct GenerationLimiter {
    slots: Arc<Semaphore>,
    queued: AtomicUsize,
    max_queued: usize,
}

impl GenerationLimiter {
    /// Limiter with `max_concurrent` running slots and `max_queued` waiters
    pub fn new(max_concurrent: usize, max_queued: usize) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(max_concurrent)),
            queued: AtomicUsize::new(0),
            max_queued,
        }
    }

    /// Acquire a generation slot, waiting in the queue if one is free
    pub async fn acquire(&self) -> Result<GenerationPermit, LimitError> {
        // Fast path: a slot is free right now
        if let Ok(permit) = Arc::clone(&self.slots).try_acquire_owned() {
            return Ok(GenerationPermit { _permit: permit });
        }

        if self.queued.fetch_add(1, Ordering::SeqCst) >= self.max_queued {
            self.queued.fetch_sub(1, Ordering::SeqCst);
            return Err(LimitError::Busy);
        }

        let result = Arc::clone(&self.slots).acquire_owned().await;
        self.queued.fetch_sub(1, Ordering::SeqCst);

        match result {
            Ok(permit) => Ok(GenerationPermit { _permit: permit }),
            Err(_) => Err(LimitError::Closed),
        }
    }

    /// Requests currently waiting for a slot
    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }

    /// Free generation slots
    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_concurrent_slots() {
        let limiter = GenerationLimiter::new(2, 4);

        let first = limiter.acquire().await.unwrap();
        let _second = limiter.acquire().await.unwrap();
        assert_eq!(limiter.available_slots(), 0);

        drop(first);
        assert!(limiter.acquire().await.is_ok());
    }

    #[tokio::test]
    async fn test_queue_overflow_rejected() {
        let limiter = Arc::new(GenerationLimiter::new(2, 4));

        // Fill both running slots
        let _running1 = limiter.acquire().await.unwrap();
        let _running2 = limiter.acquire().await.unwrap();

        // Fill the queue
        let mut waiters = Vec::new();
        for _ in 0..4 {
            let limiter = Arc::clone(&limiter);
            waiters.push(tokio::spawn(async move {
                let _permit = limiter.acquire().await.unwrap();
                tokio::time::sleep(Duration::from_secs(5)).await;
            }));
        }
        // Let the waiters enqueue
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(limiter.queued(), 4);

        // Seventh request has nowhere to go
        assert_eq!(limiter.acquire().await.unwrap_err(), LimitError::Busy);

        for waiter in waiters {
            waiter.abort();
        }
    }

    #[tokio::test]
    async fn test_queued_request_gets_released_slot() {
        let limiter = Arc::new(GenerationLimiter::new(1, 4));

        let running = limiter.acquire().await.unwrap();

        let waiter = {
            let limiter = Arc::clone(&limiter);
            tokio::spawn(async move { limiter.acquire().await.is_ok() })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(limiter.queued(), 1);

        drop(running);
        assert!(waiter.await.unwrap());
        assert_eq!(limiter.queued(), 0);
    }
}

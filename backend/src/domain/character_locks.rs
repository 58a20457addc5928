//! Per-character mutual exclusion.
//!
//! Every operation that reads or writes a character's equipment-and-stat
//! state holds that character's lock for its whole duration. Locks for
//! different characters are independent. Entries are held weakly, so a
//! character nobody is working on costs nothing beyond a pruned map slot.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::CharacterId;

/// Default bound on waiting for a character lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Raised when a character lock could not be acquired in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("timed out after {waited:?} waiting for character lock")]
pub struct LockTimeout {
    /// How long the caller waited.
    pub waited: Duration,
}

/// Registry of per-character async locks.
///
/// # Examples
///
/// ```
/// # use std::time::Duration;
/// # use armoury::domain::{CharacterId, CharacterLocks};
/// # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
/// let locks = CharacterLocks::new(Duration::from_millis(50));
/// let hero = CharacterId::random();
/// let guard = locks.acquire(&hero).await.unwrap();
/// assert!(locks.acquire(&hero).await.is_err());
/// drop(guard);
/// assert!(locks.acquire(&hero).await.is_ok());
/// # });
/// ```
#[derive(Debug)]
pub struct CharacterLocks {
    entries: Mutex<HashMap<CharacterId, Weak<AsyncMutex<()>>>>,
    timeout: Duration,
}

impl Default for CharacterLocks {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_TIMEOUT)
    }
}

impl CharacterLocks {
    /// Create an empty registry whose acquisitions wait at most `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    /// Configured acquisition bound.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wait for exclusive access to `character_id`.
    ///
    /// The guard releases the lock when dropped, on every exit path.
    pub async fn acquire(
        &self,
        character_id: &CharacterId,
    ) -> Result<OwnedMutexGuard<()>, LockTimeout> {
        let lock = self.lock_for(character_id);
        tokio::time::timeout(self.timeout, lock.lock_owned())
            .await
            .map_err(|_| LockTimeout {
                waited: self.timeout,
            })
    }

    /// Number of characters with a live lock.
    pub fn live_count(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.values().filter(|weak| weak.strong_count() > 0).count()
    }

    fn lock_for(&self, character_id: &CharacterId) -> Arc<AsyncMutex<()>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(lock) = entries.get(character_id).and_then(Weak::upgrade) {
            return lock;
        }
        entries.retain(|_, weak| weak.strong_count() > 0);
        let lock = Arc::new(AsyncMutex::new(()));
        entries.insert(*character_id, Arc::downgrade(&lock));
        lock
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn locks() -> CharacterLocks {
        CharacterLocks::new(Duration::from_millis(20))
    }

    #[rstest]
    #[tokio::test]
    async fn different_characters_do_not_contend(locks: CharacterLocks) {
        let _first = locks
            .acquire(&CharacterId::random())
            .await
            .expect("first lock");
        let second = locks.acquire(&CharacterId::random()).await;
        assert!(second.is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn same_character_times_out_while_held(locks: CharacterLocks) {
        let hero = CharacterId::random();
        let _guard = locks.acquire(&hero).await.expect("first lock");

        let error = locks.acquire(&hero).await.expect_err("lock is held");

        assert_eq!(error.waited, Duration::from_millis(20));
    }

    #[rstest]
    #[tokio::test]
    async fn released_locks_are_pruned(locks: CharacterLocks) {
        let guard = locks
            .acquire(&CharacterId::random())
            .await
            .expect("lock");
        assert_eq!(locks.live_count(), 1);
        drop(guard);
        assert_eq!(locks.live_count(), 0);
    }
}

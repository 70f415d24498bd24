//! Observable shared state.
//!
//! Screens mutate the model from the router's worker; the render loop
//! subscribes and redraws on every change.

use nav_nexus::{Error, Result};
use std::sync::{Arc, RwLock};
use tokio::sync::watch;

/// Shared state handle. Clones refer to the same value.
pub struct Entity<T> {
    inner: Arc<RwLock<T>>,
    tx: watch::Sender<()>,
}

impl<T> Entity<T> {
    /// Create a new entity with the given initial value.
    pub fn new(value: T) -> Self {
        let (tx, _) = watch::channel(());
        Self {
            inner: Arc::new(RwLock::new(value)),
            tx,
        }
    }

    /// Update the inner value using a closure and notify subscribers.
    pub fn update<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut guard = self.inner.write().map_err(|_| Error::LockPoisoned)?;
        let res = f(&mut *guard);
        drop(guard);
        let _ = self.tx.send(());
        Ok(res)
    }

    /// Read the inner value using a closure.
    pub fn read<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&T) -> R,
    {
        let guard = self.inner.read().map_err(|_| Error::LockPoisoned)?;
        Ok(f(&*guard))
    }

    /// Subscribe to changes of this entity.
    pub fn subscribe(&self) -> watch::Receiver<()> {
        self.tx.subscribe()
    }
}

impl<T> Clone for Entity<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            tx: watch::Sender::clone(&self.tx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_update_notifies_subscribers() {
        let entity = Entity::new(1);
        let mut rx = entity.subscribe();

        entity.update(|v| *v += 1).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(entity.read(|v| *v).unwrap(), 2);
    }

    #[test]
    fn test_clones_share_value() {
        let entity = Entity::new(String::from("a"));
        let other = entity.clone();
        other.update(|s| s.push('b')).unwrap();
        assert_eq!(entity.read(|s| s.clone()).unwrap(), "ab");
    }
}

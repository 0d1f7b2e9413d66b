//! Thread safe handle to a single [KBucket].

use std::{
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Instant,
};

use crate::common::{Id, Node};
use crate::kbucket::KBucket;
use crate::Result;

/// A [KBucket] behind one lock, for routing tables shared across threads.
///
/// Mutations hold the write lock for the whole read-then-write step, so
/// racing [SharedBucket::add_node] calls can never push the bucket past `k`.
/// Queries take the read lock and always see a consistent bucket.
#[derive(Debug, Clone)]
pub struct SharedBucket {
    inner: Arc<RwLock<KBucket>>,
}

impl SharedBucket {
    /// Wrap `bucket` in a new shared handle.
    pub fn new(bucket: KBucket) -> Self {
        SharedBucket {
            inner: Arc::new(RwLock::new(bucket)),
        }
    }

    // === Public Methods ===

    /// See [KBucket::add_node].
    pub fn add_node(&self, node: Node) -> Result<bool> {
        self.write().add_node(node)
    }

    /// See [KBucket::remove_node].
    pub fn remove_node(&self, id: &Id) -> bool {
        self.write().remove_node(id)
    }

    /// See [KBucket::touch].
    pub fn touch(&self) {
        self.write().touch()
    }

    /// See [KBucket::size].
    pub fn size(&self) -> usize {
        self.read().size()
    }

    /// See [KBucket::is_full].
    pub fn is_full(&self) -> bool {
        self.read().is_full()
    }

    /// See [KBucket::in_range].
    pub fn in_range(&self, node: &Node) -> bool {
        self.read().in_range(node)
    }

    /// See [KBucket::contains].
    pub fn contains(&self, id: &Id) -> bool {
        self.read().contains(id)
    }

    /// See [KBucket::last_change].
    pub fn last_change(&self) -> Instant {
        self.read().last_change()
    }

    /// Owned copy of the active nodes, least recently seen first.
    pub fn snapshot(&self) -> Vec<Node> {
        self.read().iter().cloned().collect()
    }

    /// Run `f` with shared access to the bucket.
    pub fn with_bucket<T>(&self, f: impl FnOnce(&KBucket) -> T) -> T {
        f(&self.read())
    }

    // === Private Methods ===

    // Every mutation leaves the bucket consistent before it can panic,
    // so a poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, KBucket> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, KBucket> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<KBucket> for SharedBucket {
    fn from(bucket: KBucket) -> Self {
        Self::new(bucket)
    }
}

#[cfg(test)]
mod test {
    use std::thread;

    use super::*;

    #[test]
    fn racing_adds_never_exceed_k() {
        let bucket = SharedBucket::new(KBucket::with_size(Id::MIN, Id::MAX, 4).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let bucket = bucket.clone();
                thread::spawn(move || {
                    for j in 0..50 {
                        let _ = bucket.add_node(Node::unique(i * 50 + j));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(bucket.size(), 4);
        assert!(bucket.is_full());
        bucket.with_bucket(|b| assert_eq!(b.replacement_nodes().len(), 4));
    }

    #[test]
    fn clones_share_state() {
        let bucket: SharedBucket = KBucket::new(Id::MIN, Id::MAX).unwrap().into();
        let other = bucket.clone();

        let node = Node::random();
        assert!(bucket.add_node(node.clone()).unwrap());

        assert!(other.contains(node.id()));
        assert_eq!(other.snapshot(), vec![node.clone()]);

        assert!(other.remove_node(node.id()));
        assert_eq!(bucket.size(), 0);
    }
}

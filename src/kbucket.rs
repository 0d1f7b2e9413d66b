//! Kbuckets
use std::{
    collections::VecDeque,
    fmt::{self, Debug, Formatter},
    slice::Iter,
    time::{Duration, Instant},
};

use tracing::{debug, trace};

use crate::common::{Id, Node};
use crate::config::{Config, DEFAULT_KSIZE};
use crate::{Error, Result};

/// Kbuckets hold the known peers of one contiguous range of the identifier
/// space, bounded to `k` active nodes.
///
/// Nodes seen while the bucket is full are kept in a replacement cache, and
/// promoted as soon as an active node is removed.
pub struct KBucket {
    /// Lowest id this bucket accepts (inclusive).
    range_start: Id,
    /// Highest id this bucket accepts (inclusive).
    range_end: Id,
    /// K (as in k-bucket) is the maximum number of active nodes.
    k: usize,
    /// Maximum number of queued replacement candidates.
    replacement_cache_size: usize,
    /// Nodes in the k-bucket, sorted by the least recently seen.
    nodes: Vec<Node>,
    /// Candidates seen while the bucket was full, most recently queued last.
    replacement_nodes: VecDeque<Node>,
    /// Last time this bucket or any of its nodes were updated.
    last_change: Instant,
    /// Age of `last_change` after which the bucket is due for a refresh.
    refresh_interval: Duration,
}

impl KBucket {
    /// Create an empty bucket for `[range_start, range_end]` holding up to
    /// [DEFAULT_KSIZE](crate::DEFAULT_KSIZE) nodes.
    pub fn new(range_start: Id, range_end: Id) -> Result<Self> {
        Self::with_config(range_start, range_end, &Config::default())
    }

    /// Create an empty bucket holding up to `k` nodes.
    pub fn with_size(range_start: Id, range_end: Id, k: usize) -> Result<Self> {
        Self::with_config(range_start, range_end, &Config::with_ksize(k))
    }

    pub fn with_config(range_start: Id, range_end: Id, config: &Config) -> Result<Self> {
        if range_start > range_end {
            return Err(Error::InvalidRange {
                start: range_start,
                end: range_end,
            });
        }

        if config.ksize == 0 {
            return Err(Error::InvalidBucketSize(config.ksize));
        }

        Ok(KBucket {
            range_start,
            range_end,
            k: config.ksize,
            replacement_cache_size: config.replacement_cache_size,
            // Capacities come from user config, only preallocate up to the default.
            nodes: Vec::with_capacity(config.ksize.min(DEFAULT_KSIZE)),
            replacement_nodes: VecDeque::with_capacity(
                config.replacement_cache_size.min(DEFAULT_KSIZE),
            ),
            last_change: Instant::now(),
            refresh_interval: config.refresh_interval,
        })
    }

    // === Getters ===

    pub fn range_start(&self) -> &Id {
        &self.range_start
    }

    pub fn range_end(&self) -> &Id {
        &self.range_end
    }

    /// Maximum number of active nodes.
    pub fn ksize(&self) -> usize {
        self.k
    }

    /// Number of active nodes, excluding the replacement cache.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.nodes.len() >= self.k
    }

    /// Returns `true` if the node's id lies within this bucket's range.
    pub fn in_range(&self, node: &Node) -> bool {
        self.covers(node.id())
    }

    /// Returns `true` if `id` lies within this bucket's range.
    pub fn covers(&self, id: &Id) -> bool {
        &self.range_start <= id && id <= &self.range_end
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.iter().any(|node| node.id() == id)
    }

    pub fn get(&self, id: &Id) -> Option<&Node> {
        self.iter().find(|node| node.id() == id)
    }

    /// Active nodes, least recently seen first.
    pub fn iter(&self) -> Iter<'_, Node> {
        self.nodes.iter()
    }

    /// The active node that has gone longest without being seen.
    pub fn least_recently_seen(&self) -> Option<&Node> {
        self.nodes.first()
    }

    /// Queued replacement candidates, most recently queued last.
    pub fn replacement_nodes(&self) -> &VecDeque<Node> {
        &self.replacement_nodes
    }

    pub fn last_change(&self) -> Instant {
        self.last_change
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Returns `true` if the bucket has not changed within its
    /// [Config::refresh_interval].
    pub fn needs_refresh(&self) -> bool {
        self.last_change.elapsed() >= self.refresh_interval
    }

    // === Public Methods ===

    /// Add or refresh a node, returning `true` if it is in the active set afterwards.
    ///
    /// A known node is moved to the most recently seen position (and its address
    /// updated). An unknown node is inserted if there is room, otherwise it is
    /// queued in the replacement cache and `false` is returned.
    pub fn add_node(&mut self, node: Node) -> Result<bool> {
        if !self.in_range(&node) {
            debug!(id = ?node.id(), start = ?self.range_start, end = ?self.range_end, "Rejected out of range node");

            return Err(Error::OutOfRange {
                id: *node.id(),
                start: self.range_start,
                end: self.range_end,
            });
        }

        if let Some(index) = self.nodes.iter().position(|n| n.id() == node.id()) {
            trace!(id = ?node.id(), "Refreshing node");

            self.nodes.remove(index);
            self.nodes.push(node);
        } else if self.nodes.len() < self.k {
            trace!(id = ?node.id(), size = self.nodes.len() + 1, "Adding node");

            self.replacement_nodes.retain(|n| n.id() != node.id());
            self.nodes.push(node);
        } else {
            self.save_replacement_node(node);
            self.touch();

            return Ok(false);
        }

        self.touch();

        Ok(true)
    }

    /// Remove an active node, backfilling from the replacement cache.
    ///
    /// Returns `false` if no active node has this id.
    pub fn remove_node(&mut self, id: &Id) -> bool {
        let Some(index) = self.nodes.iter().position(|n| n.id() == id) else {
            return false;
        };

        self.nodes.remove(index);
        trace!(?id, "Removed node");

        if let Some(replacement) = self.replacement_nodes.pop_back() {
            debug!(id = ?replacement.id(), "Promoting replacement node");
            self.nodes.push(replacement);
        }

        self.touch();

        true
    }

    /// Mark this bucket as changed now.
    pub fn touch(&mut self) {
        self.last_change = Instant::now();
    }

    // === Private Methods ===

    fn save_replacement_node(&mut self, node: Node) {
        self.replacement_nodes.retain(|n| n.id() != node.id());

        if self.replacement_nodes.len() >= self.replacement_cache_size {
            if let Some(dropped) = self.replacement_nodes.pop_front() {
                trace!(id = ?dropped.id(), "Replacement cache full, dropping oldest candidate");
            }
        }

        if self.replacement_cache_size > 0 {
            debug!(id = ?node.id(), queued = self.replacement_nodes.len() + 1, "Bucket full, queued replacement node");
            self.replacement_nodes.push_back(node);
        }
    }
}

impl Debug for KBucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("KBucket")
            .field("range_start", &self.range_start)
            .field("range_end", &self.range_end)
            .field("k", &self.k)
            .field("nodes", &self.nodes.len())
            .field("replacement_nodes", &self.replacement_nodes.len())
            .finish()
    }
}

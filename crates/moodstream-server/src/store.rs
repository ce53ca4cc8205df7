//! In-memory store of scored items
//!
//! Items are indexed by timestamp so listings walk newest first without
//! sorting. The store holds at most `max_items`; the oldest are evicted.

use chrono::{DateTime, Utc};
use moodstream_classifiers::aggregate;
use moodstream_core::{AggregateStats, RawItem, SentimentLabel, StoredItem};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Listing filter
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    /// Case-insensitive substring match on the topic
    pub topic: Option<String>,

    /// Case-insensitive substring match on the topic, raw text or normalized text
    pub search: Option<String>,

    /// Only items with this label
    pub sentiment: Option<SentimentLabel>,

    /// Maximum number of items returned
    pub limit: Option<usize>,
}

impl ItemFilter {
    fn matcher(&self) -> Matcher {
        Matcher {
            topic: self.topic.as_deref().map(str::to_lowercase),
            search: self.search.as_deref().map(str::to_lowercase),
            sentiment: self.sentiment,
        }
    }
}

/// Filter with its needles lowercased once
struct Matcher {
    topic: Option<String>,
    search: Option<String>,
    sentiment: Option<SentimentLabel>,
}

impl Matcher {
    fn matches(&self, item: &StoredItem) -> bool {
        if let Some(label) = self.sentiment {
            if item.scored.label != label {
                return false;
            }
        }

        if let Some(topic) = &self.topic {
            if !contains_ignore_case(&item.topic, topic) {
                return false;
            }
        }

        match &self.search {
            Some(needle) => {
                contains_ignore_case(&item.topic, needle)
                    || contains_ignore_case(&item.scored.raw_text, needle)
                    || contains_ignore_case(&item.scored.normalized_text, needle)
            }
            None => true,
        }
    }
}

fn contains_ignore_case(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}

type RecencyKey = (DateTime<Utc>, String);

#[derive(Default)]
struct Inner {
    /// Items ordered oldest to newest
    by_time: BTreeMap<RecencyKey, StoredItem>,

    /// id -> timestamp of the stored item
    ids: HashMap<String, DateTime<Utc>>,

    /// Ids claimed by an ingest that is still scoring them
    pending: HashSet<String>,
}

/// Scored items keyed by id; first write wins
pub struct ItemStore {
    inner: RwLock<Inner>,
    max_items: usize,
}

/// Ids reserved for scoring by one ingest. Released on drop.
pub struct Claim<'a> {
    store: &'a ItemStore,
    ids: Vec<String>,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        let mut inner = self.store.inner.write();
        for id in &self.ids {
            inner.pending.remove(id);
        }
    }
}

impl ItemStore {
    pub fn new(max_items: usize) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            max_items: max_items.max(1),
        }
    }

    /// Keep the raw items that are neither stored nor being scored by
    /// another ingest, and reserve their ids until the returned claim drops.
    ///
    /// Repeated ids within `items` are kept once.
    pub fn claim(&self, items: Vec<RawItem>) -> (Vec<RawItem>, Claim<'_>) {
        let mut guard = self.inner.write();
        let Inner { ids, pending, .. } = &mut *guard;

        let fresh: Vec<RawItem> = items
            .into_iter()
            .filter(|item| !ids.contains_key(&item.id) && pending.insert(item.id.clone()))
            .collect();

        let claim = Claim {
            store: self,
            ids: fresh.iter().map(|item| item.id.clone()).collect(),
        };
        (fresh, claim)
    }

    /// Insert items whose id is not yet stored, then evict the oldest items
    /// beyond capacity. Returns the inserted items that were kept.
    pub fn insert_new(&self, items: Vec<StoredItem>) -> Vec<StoredItem> {
        let mut inner = self.inner.write();
        let mut inserted = Vec::with_capacity(items.len());

        for item in items {
            if inner.ids.contains_key(&item.id) {
                continue;
            }
            inner.ids.insert(item.id.clone(), item.timestamp);
            inner
                .by_time
                .insert((item.timestamp, item.id.clone()), item.clone());
            inserted.push(item);
        }

        let mut evicted = HashSet::new();
        while inner.by_time.len() > self.max_items {
            let Some(((_, id), _)) = inner.by_time.pop_first() else {
                break;
            };
            inner.ids.remove(&id);
            evicted.insert(id);
        }

        if !evicted.is_empty() {
            debug!(evicted = evicted.len(), capacity = self.max_items, "Evicted oldest items");
            inserted.retain(|item| !evicted.contains(&item.id));
        }

        inserted
    }

    /// Matching items, newest first
    pub fn query(&self, filter: &ItemFilter) -> Vec<StoredItem> {
        let matcher = filter.matcher();
        let limit = filter.limit.unwrap_or(usize::MAX);

        let inner = self.inner.read();
        inner
            .by_time
            .values()
            .rev()
            .filter(|item| matcher.matches(item))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Aggregate statistics over matching items
    pub fn stats(&self, filter: &ItemFilter) -> AggregateStats {
        let matcher = filter.matcher();

        let inner = self.inner.read();
        aggregate(
            inner
                .by_time
                .values()
                .filter(|item| matcher.matches(item))
                .map(|item| &item.scored),
        )
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_time.len()
    }
}

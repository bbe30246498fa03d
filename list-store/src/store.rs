use crate::config::ListStoreConfig;
use crate::error::Result;
use crate::journal::ListJournal;
use crate::types::{ListEntry, ListKey, ListMutation, ListOp, SeedEntry};
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use risk_engine::{Address, Chain, ListKind, ListView};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Published membership, replaced wholesale on every mutation
#[derive(Debug, Default)]
struct Membership {
    members: HashSet<ListKey>,
    version: u64,
}

/// AddressListStore holds BLACKLIST/WHITELIST membership per chain and address.
///
/// `entries` is the authoritative map. Each mutation runs under its key's
/// shard lock and, while still holding it, journals the change and publishes
/// a new immutable membership set. Writers of different keys only meet in the
/// publish step; readers take the published set without copying.
#[derive(Clone)]
pub struct AddressListStore {
    // Map: (kind, chain, address) -> added_at
    entries: Arc<DashMap<ListKey, DateTime<Utc>>>,
    current: Arc<ArcSwap<Membership>>,
    journal: Option<Arc<Mutex<ListJournal>>>,
}

impl Default for AddressListStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressListStore {
    /// Memory-only store
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            current: Arc::new(ArcSwap::from_pointee(Membership::default())),
            journal: None,
        }
    }

    /// Open per configuration: replay the journal if one is set, then add the
    /// configured seed entries.
    pub fn open(config: &ListStoreConfig) -> Result<Self> {
        let mut store = Self::new();

        if let Some(path) = config.journal_path.as_deref() {
            let (journal, mutations) = ListJournal::open(path, config.sync_writes)?;
            let replayed = mutations.len();
            for mutation in mutations {
                store.apply_replayed(mutation);
            }
            store.current.store(Arc::new(Membership {
                members: store.entries.iter().map(|e| e.key().clone()).collect(),
                version: replayed as u64,
            }));
            info!(
                "Replayed {} list mutations into {} entries from {:?}",
                replayed,
                store.entries.len(),
                path
            );
            store.journal = Some(Arc::new(Mutex::new(journal)));
        }

        store.load(ListKind::Blacklist, &config.blacklist)?;
        store.load(ListKind::Whitelist, &config.whitelist)?;
        Ok(store)
    }

    /// Add an address. Returns false when it was already listed.
    pub fn add(&self, kind: ListKind, chain: &Chain, address: &Address) -> Result<bool> {
        let key = ListKey::new(kind, chain.clone(), address.clone());
        match self.entries.entry(key.clone()) {
            Entry::Occupied(_) => {
                debug!("{} already on {} for {}", address, kind, chain);
                Ok(false)
            }
            Entry::Vacant(slot) => {
                let at = Utc::now();
                self.journal(ListOp::Add, &key, at)?;
                // hold the shard lock until the new set is published
                let _guard = slot.insert(at);
                self.publish(|members| {
                    members.insert(key.clone());
                });
                info!("Added {} to {} on {}", address, kind, chain);
                Ok(true)
            }
        }
    }

    /// Remove an address. Returns false when it was not listed.
    pub fn remove(&self, kind: ListKind, chain: &Chain, address: &Address) -> Result<bool> {
        let key = ListKey::new(kind, chain.clone(), address.clone());
        match self.entries.entry(key.clone()) {
            Entry::Vacant(_) => Ok(false),
            Entry::Occupied(slot) => {
                self.journal(ListOp::Remove, &key, Utc::now())?;
                self.publish(|members| {
                    members.remove(&key);
                });
                slot.remove();
                info!("Removed {} from {} on {}", address, kind, chain);
                Ok(true)
            }
        }
    }

    pub fn contains(&self, kind: ListKind, chain: &Chain, address: &Address) -> bool {
        self.entries
            .contains_key(&ListKey::new(kind, chain.clone(), address.clone()))
    }

    /// Entries of one kind, ordered by chain then address
    pub fn list(&self, kind: ListKind) -> Vec<ListEntry> {
        let mut entries: Vec<ListEntry> = self
            .entries
            .iter()
            .filter(|e| e.key().kind == kind)
            .map(|e| ListEntry {
                kind,
                chain: e.key().chain.clone(),
                address: e.key().address.clone(),
                added_at: *e.value(),
            })
            .collect();

        entries.sort_by(|a, b| (&a.chain, &a.address).cmp(&(&b.chain, &b.address)));
        entries
    }

    /// String-typed listing, for admin surfaces
    pub fn list_raw(&self, kind: &str) -> Result<Vec<ListEntry>> {
        let kind: ListKind = kind.parse()?;
        Ok(self.list(kind))
    }

    /// Load seed entries into a list. Malformed entries abort the load before
    /// anything is inserted.
    pub fn load(&self, kind: ListKind, seeds: &[SeedEntry]) -> Result<usize> {
        let parsed = seeds
            .iter()
            .map(|s| -> Result<(Chain, Address)> {
                Ok((Chain::parse(&s.chain)?, Address::parse(&s.address)?))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut added = 0;
        for (chain, address) in &parsed {
            if self.add(kind, chain, address)? {
                added += 1;
            }
        }

        info!("Loaded {} list with {} new entries", kind, added);
        Ok(added)
    }

    /// Current membership for one assessment. O(1): shares the published set.
    pub fn snapshot(&self) -> ListSnapshot {
        ListSnapshot {
            inner: self.current.load_full(),
        }
    }

    /// Number of entries across both lists
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Monotonic mutation counter
    pub fn version(&self) -> u64 {
        self.current.load().version
    }

    fn journal(&self, op: ListOp, key: &ListKey, at: DateTime<Utc>) -> Result<()> {
        if let Some(journal) = &self.journal {
            journal.lock().append(&ListMutation {
                op,
                key: key.clone(),
                at,
            })?;
        }
        Ok(())
    }

    fn publish(&self, change: impl Fn(&mut HashSet<ListKey>)) {
        self.current.rcu(|current| {
            let mut members = current.members.clone();
            change(&mut members);
            Membership {
                members,
                version: current.version + 1,
            }
        });
    }

    fn apply_replayed(&self, mutation: ListMutation) {
        match mutation.op {
            ListOp::Add => {
                self.entries.entry(mutation.key).or_insert(mutation.at);
            }
            ListOp::Remove => {
                self.entries.remove(&mutation.key);
            }
        }
    }
}

impl ListView for AddressListStore {
    fn contains(&self, kind: ListKind, chain: &Chain, address: &Address) -> bool {
        AddressListStore::contains(self, kind, chain, address)
    }
}

/// Immutable membership taken by [`AddressListStore::snapshot`]
#[derive(Debug, Clone, Default)]
pub struct ListSnapshot {
    inner: Arc<Membership>,
}

impl ListSnapshot {
    /// Store version the snapshot was published at
    pub fn version(&self) -> u64 {
        self.inner.version
    }

    pub fn len(&self) -> usize {
        self.inner.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.members.is_empty()
    }
}

impl ListView for ListSnapshot {
    fn contains(&self, kind: ListKind, chain: &Chain, address: &Address) -> bool {
        self.inner
            .members
            .contains(&ListKey::new(kind, chain.clone(), address.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ListStoreError;

    fn eth() -> Chain {
        Chain::parse("ETH").unwrap()
    }

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    fn journaled(path: &std::path::Path) -> ListStoreConfig {
        ListStoreConfig {
            journal_path: Some(path.to_path_buf()),
            sync_writes: false,
            ..ListStoreConfig::default()
        }
    }

    #[test]
    fn test_add_remove_contains() {
        let store = AddressListStore::new();
        assert!(store.add(ListKind::Blacklist, &eth(), &addr("0xBAD")).unwrap());
        assert!(!store.add(ListKind::Blacklist, &eth(), &addr("0xbad")).unwrap());
        assert!(store.contains(ListKind::Blacklist, &eth(), &addr("0xBad")));
        assert!(!store.contains(ListKind::Whitelist, &eth(), &addr("0xbad")));
        assert!(!store.contains(ListKind::Blacklist, &Chain::parse("BSC").unwrap(), &addr("0xbad")));

        assert!(store.remove(ListKind::Blacklist, &eth(), &addr("0xbad")).unwrap());
        assert!(!store.remove(ListKind::Blacklist, &eth(), &addr("0xbad")).unwrap());
        assert!(store.is_empty());
        assert_eq!(store.version(), 2);
    }

    #[test]
    fn test_list_by_kind_sorted() {
        let store = AddressListStore::new();
        store.add(ListKind::Whitelist, &eth(), &addr("0xbbb")).unwrap();
        store.add(ListKind::Whitelist, &eth(), &addr("0xaaa")).unwrap();
        store.add(ListKind::Blacklist, &eth(), &addr("0xccc")).unwrap();

        let white: Vec<_> = store
            .list(ListKind::Whitelist)
            .into_iter()
            .map(|e| e.address.to_string())
            .collect();
        assert_eq!(white, vec!["0xaaa", "0xbbb"]);
        assert_eq!(store.list(ListKind::Blacklist).len(), 1);
    }

    #[test]
    fn test_raw_kind_rejected() {
        let store = AddressListStore::new();
        assert!(matches!(
            store.list_raw("nope"),
            Err(ListStoreError::InvalidListKind(_))
        ));
        assert!(matches!(
            ListKey::parse("GREYLIST", "ETH", "0xabc"),
            Err(ListStoreError::InvalidListKind(kind)) if kind == "GREYLIST"
        ));
        assert!(matches!(
            ListKey::parse("BLACKLIST", "ETH", "not an address"),
            Err(ListStoreError::InvalidEntry(_))
        ));
        assert_eq!(store.list_raw("whitelist").unwrap().len(), 0);
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_writes() {
        let store = AddressListStore::new();
        store.add(ListKind::Blacklist, &eth(), &addr("0xbad")).unwrap();
        let snapshot = store.snapshot();

        store.remove(ListKind::Blacklist, &eth(), &addr("0xbad")).unwrap();
        store.add(ListKind::Whitelist, &eth(), &addr("0xbad")).unwrap();

        assert!(ListView::contains(&snapshot, ListKind::Blacklist, &eth(), &addr("0xbad")));
        assert!(!ListView::contains(&snapshot, ListKind::Whitelist, &eth(), &addr("0xbad")));
        assert_eq!(snapshot.version(), 1);
        assert_eq!(snapshot.len(), 1);

        let fresh = store.snapshot();
        assert!(ListView::contains(&fresh, ListKind::Whitelist, &eth(), &addr("0xbad")));
        assert_eq!(fresh.version(), 3);
    }

    #[test]
    fn test_snapshots_share_the_published_set() {
        let store = AddressListStore::new();
        store.add(ListKind::Blacklist, &eth(), &addr("0xbad")).unwrap();

        let a = store.snapshot();
        let b = store.snapshot();
        assert!(Arc::ptr_eq(&a.inner, &b.inner));

        store.add(ListKind::Blacklist, &eth(), &addr("0xbad2")).unwrap();
        assert!(!Arc::ptr_eq(&a.inner, &store.snapshot().inner));
    }

    #[test]
    fn test_load_is_all_or_nothing() {
        let store = AddressListStore::new();
        let seeds = vec![
            SeedEntry {
                chain: "ETH".to_string(),
                address: "0xaaa".to_string(),
            },
            SeedEntry {
                chain: "".to_string(),
                address: "0xbbb".to_string(),
            },
        ];
        assert!(store.load(ListKind::Blacklist, &seeds).is_err());
        assert!(store.is_empty());

        assert_eq!(store.load(ListKind::Blacklist, &seeds[..1]).unwrap(), 1);
    }

    #[test]
    fn test_mutations_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = journaled(&dir.path().join("lists.jsonl"));

        {
            let store = AddressListStore::open(&config).unwrap();
            store.add(ListKind::Blacklist, &eth(), &addr("0xbad")).unwrap();
            store.add(ListKind::Whitelist, &eth(), &addr("0xgood")).unwrap();
            store.add(ListKind::Blacklist, &eth(), &addr("0xgone")).unwrap();
            store.remove(ListKind::Blacklist, &eth(), &addr("0xgone")).unwrap();
        }

        let store = AddressListStore::open(&config).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.contains(ListKind::Blacklist, &eth(), &addr("0xbad")));
        assert!(store.contains(ListKind::Whitelist, &eth(), &addr("0xgood")));
        assert!(!store.contains(ListKind::Blacklist, &eth(), &addr("0xgone")));
        assert!(ListView::contains(&store.snapshot(), ListKind::Blacklist, &eth(), &addr("0xbad")));
        assert_eq!(store.version(), 4);
    }

    #[test]
    fn test_seeds_are_not_journaled_twice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lists.jsonl");
        let mut config = journaled(&path);
        config.blacklist.push(SeedEntry {
            chain: "ETH".to_string(),
            address: "0xseed".to_string(),
        });

        drop(AddressListStore::open(&config).unwrap());
        let store = AddressListStore::open(&config).unwrap();
        assert_eq!(store.len(), 1);

        let lines = std::fs::read_to_string(&path).unwrap().lines().count();
        assert_eq!(lines, 1);
    }

    #[test]
    fn test_concurrent_writers_on_distinct_keys() {
        let store = AddressListStore::new();
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        store
                            .add(ListKind::Blacklist, &eth(), &addr(&format!("0x{:02x}{:04x}", t, i)))
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.len(), 800);
        assert_eq!(store.version(), 800);
        assert_eq!(store.snapshot().len(), 800);
    }
}

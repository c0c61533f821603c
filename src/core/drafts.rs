use super::constants::DRAFT_RING_CAPACITY;
use super::store::{retry_with_backoff, BackoffPolicy, KeyValueStore};
use serde::{Deserialize, Serialize};

pub const DRAFTS_KEY: &str = "zentype.drafts";
pub const ARCHIVE_KEY: &str = "zentype.archive";
pub const ARCHIVE_SYNC_KEY: &str = "zentype.drafts.last_sync";

/// A saved piece of writing. Independent lifecycle from typing sessions,
/// except for the one-way archive sync below.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DraftSnapshot {
    pub id: String,
    pub body: String,
    pub at_ms: f64,
    pub is_restore_point: bool,
}

/// A finished session entry as the archive records it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    pub id: String,
    pub body: String,
    pub ended_ms: f64,
}

/// Append-only ring of drafts, capacity 50, FIFO eviction of the oldest.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DraftArchive {
    drafts: Vec<DraftSnapshot>,
}

impl DraftArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the key-value store; missing or malformed data yields an
    /// empty archive.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(DRAFTS_KEY) {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|err| {
                log::warn!("[drafts] malformed archive, starting empty: {err}");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn persist(&self, store: &mut dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => {
                if let Err(err) = store.set(DRAFTS_KEY, &json) {
                    log::warn!("[drafts] persist failed: {err}");
                }
            }
            Err(err) => log::warn!("[drafts] encode failed: {err}"),
        }
    }

    /// Persist with retries. Storage writes can transiently fail (quota
    /// pressure); after the attempt cap the last error is surfaced to the
    /// caller rather than swallowed.
    pub fn persist_with_retry(
        &self,
        store: &mut dyn KeyValueStore,
        policy: BackoffPolicy,
    ) -> Result<(), super::store::CoreError> {
        let json = serde_json::to_string(self)?;
        retry_with_backoff(
            policy,
            |_| store.set(DRAFTS_KEY, &json),
            |attempt, delay_ms| {
                log::warn!("[drafts] persist retry {attempt} in {delay_ms}ms");
            },
        )
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DraftSnapshot> {
        self.drafts.iter()
    }

    pub fn get(&self, id: &str) -> Option<&DraftSnapshot> {
        self.drafts.iter().find(|d| d.id == id)
    }

    pub fn push(&mut self, draft: DraftSnapshot) {
        if self.drafts.len() == DRAFT_RING_CAPACITY {
            self.drafts.remove(0);
        }
        self.drafts.push(draft);
    }

    /// One-way archive -> draft sync. Entries at or before the last-sync
    /// watermark are skipped; missing entries are materialized as restore
    /// points; an existing draft is updated only when the archive entry
    /// ended after the draft's last update. Drafts never flow back into the
    /// archive.
    pub fn sync_from_archive(&mut self, entries: &[ArchiveEntry], last_sync_ms: f64) -> usize {
        let mut touched = 0;
        for entry in entries {
            if entry.ended_ms <= last_sync_ms {
                continue;
            }
            match self.drafts.iter_mut().find(|d| d.id == entry.id) {
                Some(draft) => {
                    if entry.ended_ms > draft.at_ms {
                        draft.body = entry.body.clone();
                        draft.at_ms = entry.ended_ms;
                        touched += 1;
                    }
                }
                None => {
                    self.push(DraftSnapshot {
                        id: entry.id.clone(),
                        body: entry.body.clone(),
                        at_ms: entry.ended_ms,
                        is_restore_point: true,
                    });
                    touched += 1;
                }
            }
        }
        if touched > 0 {
            log::info!("[drafts] archive sync touched {touched} draft(s)");
        }
        touched
    }
}

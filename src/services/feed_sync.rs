use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::models::{Contest, Status, Team};
use crate::store::{BroadcastPatch, Patch};

/// The named feeds this display consumes. Each owns one slice of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    Contest,
    Standings,
    Teams,
}

impl FeedKind {
    pub fn name(self) -> &'static str {
        match self {
            FeedKind::Contest => "contest",
            FeedKind::Standings => "standings",
            FeedKind::Teams => "teams",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "contest" => Some(FeedKind::Contest),
            "standings" => Some(FeedKind::Standings),
            "teams" => Some(FeedKind::Teams),
            _ => None,
        }
    }
}

/// Opaque fetch capability: resolve a pointer token to a JSON payload.
/// The transport behind it (HTTP, file, fixture) is the host's business.
pub trait PayloadFetcher: Send + Sync + 'static {
    fn fetch(&self, pointer: &str) -> impl Future<Output = Result<Value>> + Send;
}

/// Keeps local state consistent under out-of-order asynchronous delivery.
///
/// The push channel calls [`FeedSynchronizer::pointer_document_changed`] /
/// [`FeedSynchronizer::broadcast_changed`]; validated updates come out the
/// patch receiver for the host coordinator to apply. Fetches run as tokio
/// tasks, so completion order is unrelated to start order; a completed fetch
/// commits only if the pointer that initiated it is still the feed's current
/// pointer (latest-pointer-wins).
pub struct FeedSynchronizer<F> {
    fetcher: Arc<F>,
    patch_tx: UnboundedSender<Patch>,
    pointers: Arc<Mutex<HashMap<FeedKind, Option<String>>>>,
    ignored_feeds: HashSet<String>,
}

impl<F: PayloadFetcher> FeedSynchronizer<F> {
    pub fn new(fetcher: F, ignored_feeds: &[String]) -> (Self, UnboundedReceiver<Patch>) {
        let (patch_tx, patch_rx) = mpsc::unbounded_channel();
        (
            Self {
                fetcher: Arc::new(fetcher),
                patch_tx,
                pointers: Arc::new(Mutex::new(HashMap::new())),
                ignored_feeds: ignored_feeds.iter().cloned().collect(),
            },
            patch_rx,
        )
    }

    /// Apply a fresh pointer document (feed name -> token or null) from the
    /// push channel. Unknown feed names are skipped; configured ignored
    /// feeds are parked without fetching.
    pub fn pointer_document_changed(&self, doc: &Map<String, Value>) {
        for (name, value) in doc {
            if self.ignored_feeds.contains(name) {
                debug!("Feed {name} is ignored by configuration");
                continue;
            }
            let Some(feed) = FeedKind::from_name(name) else {
                debug!("Skipping unknown feed {name}");
                continue;
            };
            let pointer = value.as_str().map(str::to_string);
            if pointer.is_none() && !value.is_null() {
                warn!("Pointer for feed {name} is neither a string nor null: {value}");
                continue;
            }
            self.pointer_changed(feed, pointer);
        }
    }

    /// React to one feed's pointer change. A non-null pointer starts a
    /// fetch; a null pointer just supersedes whatever is in flight.
    pub fn pointer_changed(&self, feed: FeedKind, pointer: Option<String>) {
        {
            let mut pointers = self
                .pointers
                .lock()
                .expect("feed pointer map lock poisoned");
            if pointers.get(&feed) == Some(&pointer) {
                return;
            }
            pointers.insert(feed, pointer.clone());
        }

        let Some(pointer) = pointer else {
            debug!("Feed {} pointer cleared", feed.name());
            return;
        };

        info!("Feed {} pointer changed, fetching {pointer}", feed.name());
        let fetcher = Arc::clone(&self.fetcher);
        let pointers = Arc::clone(&self.pointers);
        let patch_tx = self.patch_tx.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch(&pointer).await;

            // The pointer may have moved on while we were fetching. A stale
            // response must never overwrite a newer commit.
            let current = pointers
                .lock()
                .expect("feed pointer map lock poisoned")
                .get(&feed)
                .cloned()
                .flatten();
            if current.as_deref() != Some(pointer.as_str()) {
                debug!(
                    "Dropping stale {} payload for superseded pointer {pointer}",
                    feed.name()
                );
                return;
            }

            let payload = match result {
                Ok(payload) => payload,
                Err(err) => {
                    warn!("Fetch for feed {} failed: {err:#}", feed.name());
                    return;
                }
            };
            match parse_payload(feed, payload) {
                Ok(patch) => {
                    let _ = patch_tx.send(patch);
                }
                Err(err) => {
                    warn!("Dropping malformed {} payload: {err:#}", feed.name());
                }
            }
        });
    }

    /// Broadcast documents merge key by key; they never replace the slice.
    pub fn broadcast_changed(&self, doc: Map<String, Value>) {
        if doc.is_empty() {
            return;
        }
        let _ = self
            .patch_tx
            .send(Patch::Broadcast(BroadcastPatch::Merge(doc)));
    }

    /// Single broadcast key set by an operator tool.
    pub fn broadcast_key_set(&self, key: String, value: Value) {
        let _ = self
            .patch_tx
            .send(Patch::Broadcast(BroadcastPatch::Set(key, value)));
    }
}

/// Validate a payload into a full-replace patch. Any error here means the
/// whole payload is dropped; the store never sees a half-applied feed.
fn parse_payload(feed: FeedKind, payload: Value) -> Result<Patch> {
    match feed {
        FeedKind::Contest => {
            let contest: Contest =
                serde_json::from_value(payload).context("contest payload validation")?;
            Ok(Patch::ReplaceContest(contest))
        }
        FeedKind::Standings => {
            let mut standings: Vec<Status> =
                serde_json::from_value(payload).context("standings payload validation")?;
            if !standings.is_sorted_by_key(|status| status.rank) {
                warn!("Standings feed is not rank-sorted; re-sorting defensively");
                standings.sort_by_key(|status| status.rank);
            }
            Ok(Patch::ReplaceStandings(standings))
        }
        FeedKind::Teams => {
            let teams: HashMap<String, Team> =
                serde_json::from_value(payload).context("teams payload validation")?;
            for (key, team) in &teams {
                if key != &team.id {
                    bail!("team map key {key} does not match team id {}", team.id);
                }
            }
            Ok(Patch::ReplaceTeams(teams))
        }
    }
}

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::models::{Contest, Settings, Status, Team};

/// The single shared state value. Every mutation goes through
/// [`apply_patch`]; the host coordinator owns the value and drains patches
/// from the synchronizer on its own event loop.
#[derive(Debug, Default)]
pub struct AppState {
    pub contest: Option<Contest>,
    pub standings: Vec<Status>,
    pub teams: HashMap<String, Team>,
    pub settings: Option<Settings>,
    pub broadcast: Map<String, Value>,
}

/// A validated, tagged mutation. Feed slices are full replacements (the
/// synchronizer only constructs these from payloads that already passed
/// validation, so no partial state can ever be committed); the broadcast
/// slice takes field-level set/merge patches.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    ReplaceContest(Contest),
    ReplaceStandings(Vec<Status>),
    ReplaceTeams(HashMap<String, Team>),
    ReplaceSettings(Settings),
    Broadcast(BroadcastPatch),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BroadcastPatch {
    /// Set a single key.
    Set(String, Value),
    /// Merge every key of a partial document, one independent set per key.
    Merge(Map<String, Value>),
}

pub fn apply_patch(state: &mut AppState, patch: Patch) {
    match patch {
        Patch::ReplaceContest(contest) => {
            debug!("Replacing contest slice: {}", contest.title);
            state.contest = Some(contest);
        }
        Patch::ReplaceStandings(standings) => {
            debug!("Replacing standings slice ({} rows)", standings.len());
            state.standings = standings;
        }
        Patch::ReplaceTeams(teams) => {
            debug!("Replacing teams slice ({} teams)", teams.len());
            state.teams = teams;
        }
        Patch::ReplaceSettings(settings) => {
            state.settings = Some(settings);
        }
        Patch::Broadcast(BroadcastPatch::Set(key, value)) => {
            state.broadcast.insert(key, value);
        }
        Patch::Broadcast(BroadcastPatch::Merge(partial)) => {
            for (key, value) in partial {
                state.broadcast.insert(key, value);
            }
        }
    }
}

impl AppState {
    /// Operator sign-in fact from the broadcast channel. Absent or
    /// non-boolean means signed out.
    pub fn signed_in(&self) -> bool {
        self.broadcast
            .get("signed_in")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Reveal progress index from the broadcast channel, if published.
    pub fn reveal_index(&self) -> Option<usize> {
        let value = self.broadcast.get("reveal_index")?;
        match value.as_u64() {
            Some(index) => Some(index as usize),
            None => {
                warn!("Ignoring non-integer reveal_index: {value}");
                None
            }
        }
    }
}

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::models::{RevealState, Status};
use crate::services::config_loader::AnimationConfig;

/// Stacking priority of the top row; rows further down descend from here so
/// that rows passing through one another during a move layer correctly.
const BASE_STACK_PRIORITY: i32 = 9999;
/// Rows that just turned finalized fly above everything else.
const TOP_STACK_PRIORITY: i32 = 10_000;

/// Capability to read and influence the on-screen layout of keyed rows.
/// The FLIP algorithm below is toolkit-agnostic; only this binding changes
/// per target environment.
pub trait LayoutProbe {
    /// Current vertical offset of the row, if it is laid out.
    fn offset_of(&self, key: &str) -> Option<f32>;
    /// Apply an instant vertical transform (no animation).
    fn set_transform(&mut self, key: &str, offset_y: f32);
    fn clear_transform(&mut self, key: &str);
    /// Toggle the animation-state flag for the row.
    fn set_animating(&mut self, key: &str, animating: bool);
    fn set_stack_priority(&mut self, key: &str, priority: i32);
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum AnimPhase {
    #[default]
    Idle,
    /// Instant transform equal to the layout delta is applied; the release
    /// starts on the next tick.
    Inverted { delta: f32 },
    /// Easing the transform back to zero since `started_at`.
    Playing { delta: f32, started_at: f64 },
}

/// Transient per-row state, created when a row first mounts and destroyed
/// when the row leaves the rendered set. Highlight windows are deadlines
/// against the host clock, so dropping the state cancels them.
#[derive(Debug, Default)]
struct RowAnimState {
    phase: AnimPhase,
    last_offset: f32,
    last_solved: u32,
    was_finalized: bool,
    rank_hidden_until: Option<f64>,
    new_solved_until: Option<f64>,
}

/// Result of committing a new row order.
#[derive(Debug, Default, PartialEq)]
pub struct ReorderOutcome {
    /// Index of the row boundary that should receive the one-time reveal
    /// marker: the first row that turned finalized this cycle, unless it is
    /// the top row. The exact trigger condition is deliberate.
    pub marker_index: Option<usize>,
}

/// Row lifecycle and layout-animation engine (FLIP). The host drives it
/// around every standings change:
///
/// 1. [`RowAnimator::begin_update`] before applying the new order;
/// 2. apply the new order to the layout;
/// 3. [`RowAnimator::finish_update`] after layout;
/// 4. [`RowAnimator::tick`] on every frame with the current clock.
///
/// All timestamps are milliseconds on a single monotonic host clock.
pub struct RowAnimator {
    config: AnimationConfig,
    rows: HashMap<String, RowAnimState>,
    before_offsets: Option<HashMap<String, f32>>,
}

impl RowAnimator {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            rows: HashMap::new(),
            before_offsets: None,
        }
    }

    /// Snapshot every currently rendered row's offset and reset leftover
    /// transforms and animation flags from the previous cycle.
    pub fn begin_update(&mut self, probe: &mut impl LayoutProbe, rendered_keys: &[String]) {
        let mut before = HashMap::with_capacity(rendered_keys.len());
        for key in rendered_keys {
            probe.clear_transform(key);
            probe.set_animating(key, false);
            if let Some(state) = self.rows.get_mut(key) {
                state.phase = AnimPhase::Idle;
            }
            if let Some(offset) = probe.offset_of(key) {
                before.insert(key.clone(), offset);
            }
        }
        self.before_offsets = Some(before);
    }

    /// Commit the new order: compute every delta from the single
    /// before/after snapshot pair, invert moved rows, assign stacking
    /// priorities, and tear down rows that left the rendered set.
    pub fn finish_update(
        &mut self,
        probe: &mut impl LayoutProbe,
        ordered: &[Status],
        now: f64,
        reveal_mode: bool,
    ) -> ReorderOutcome {
        let before = self.before_offsets.take().unwrap_or_default();

        // Rows that left the rendered set lose all pending state; nothing
        // may fire for their identity after this point.
        let old_len = self.rows.len();
        self.rows
            .retain(|key, _| ordered.iter().any(|status| &status.team_id == key));
        if self.rows.len() != old_len {
            debug!("Tore down {} removed row(s)", old_len - self.rows.len());
        }

        let mut outcome = ReorderOutcome::default();

        for (index, status) in ordered.iter().enumerate() {
            let key = status.team_id.as_str();
            let mounted = self.rows.contains_key(key);
            let state = self.rows.entry(status.team_id.clone()).or_default();

            if mounted {
                if status.solved > state.last_solved {
                    trace!("Row {key} solved {} -> {}", state.last_solved, status.solved);
                    highlight(state, now, &self.config, reveal_mode);
                }
            }
            state.last_solved = status.solved;

            let newly_finalized =
                status.reveal_state == RevealState::Finalized && !state.was_finalized;
            state.was_finalized = status.reveal_state == RevealState::Finalized;

            let new_offset = probe.offset_of(key).unwrap_or(state.last_offset);
            // Keys with no prior offset stay put: delta = 0 for new rows.
            let old_offset = before.get(key).copied().unwrap_or(new_offset);
            let delta = old_offset - new_offset;
            state.last_offset = new_offset;

            if delta != 0.0 {
                probe.set_transform(key, delta);
                state.phase = AnimPhase::Inverted { delta };
            } else {
                state.phase = AnimPhase::Idle;
            }

            let priority = if newly_finalized {
                TOP_STACK_PRIORITY
            } else {
                BASE_STACK_PRIORITY - index as i32
            };
            probe.set_stack_priority(key, priority);

            if newly_finalized && outcome.marker_index.is_none() && index != 0 {
                outcome.marker_index = Some(index);
            }
        }

        outcome
    }

    /// Advance animations to `now`. Inverted rows start their release on the
    /// first tick after the reorder; playing rows ease back to rest over the
    /// configured window. Returns whether anything is still animating, so
    /// the host knows to keep scheduling frames.
    pub fn tick(&mut self, probe: &mut impl LayoutProbe, now: f64) -> bool {
        let window = self.config.row_fly_millis.max(1) as f64;
        let mut active = false;

        for (key, state) in &mut self.rows {
            match state.phase {
                AnimPhase::Idle => {}
                AnimPhase::Inverted { delta } => {
                    probe.set_animating(key, true);
                    state.phase = AnimPhase::Playing {
                        delta,
                        started_at: now,
                    };
                    active = true;
                }
                AnimPhase::Playing { delta, started_at } => {
                    let progress = anim_progress(now, started_at, window);
                    if progress >= 1.0 {
                        probe.clear_transform(key);
                        probe.set_animating(key, false);
                        state.phase = AnimPhase::Idle;
                    } else {
                        probe.set_transform(key, lerp_f32(delta, 0.0, ease_out_cubic(progress)));
                        active = true;
                    }
                }
            }

            if state.rank_hidden_until.is_some_and(|until| now < until)
                || state.new_solved_until.is_some_and(|until| now < until)
            {
                active = true;
            }
        }

        active
    }

    /// Whether the row's rank is currently replaced by the placeholder.
    pub fn rank_hidden(&self, key: &str, now: f64) -> bool {
        self.rows
            .get(key)
            .and_then(|state| state.rank_hidden_until)
            .is_some_and(|until| now < until)
    }

    /// Whether the row carries the newly-solved highlight.
    pub fn newly_solved(&self, key: &str, now: f64) -> bool {
        self.rows
            .get(key)
            .and_then(|state| state.new_solved_until)
            .is_some_and(|until| now < until)
    }

    #[cfg(test)]
    fn has_row(&self, key: &str) -> bool {
        self.rows.contains_key(key)
    }
}

/// Enter the highlighted state. A re-trigger while still highlighted
/// reschedules both windows from the new event; the total duration extends,
/// it does not elapse from the first solve.
fn highlight(state: &mut RowAnimState, now: f64, config: &AnimationConfig, reveal_mode: bool) {
    let new_solved_window = if reveal_mode {
        config.new_solved_reveal_millis
    } else {
        config.new_solved_millis
    };
    state.rank_hidden_until = Some(now + config.rank_hidden_millis as f64);
    state.new_solved_until = Some(now + new_solved_window as f64);
}

fn anim_progress(now: f64, started_at: f64, duration_ms: f64) -> f64 {
    if duration_ms <= 0.0 {
        return 1.0;
    }
    ((now - started_at) / duration_ms).clamp(0.0, 1.0)
}

fn ease_out_cubic(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

fn lerp_f32(from: f32, to: f32, t: f64) -> f32 {
    from + (to - from) * t as f32
}

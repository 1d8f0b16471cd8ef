use std::collections::HashSet;

use crate::models::{Status, Team, placeholder_team};
use crate::services::grouping::university_ranks;
use crate::services::reveal::RevealSequence;
use crate::services::row_anim::RowAnimator;
use crate::store::AppState;

/// Shown instead of the rank while it is hidden after a solve, so viewers
/// never see a transient soon-to-be-wrong rank mid-animation.
pub const RANK_PLACEHOLDER: &str = "...";

/// Everything the view layer needs to draw one row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowModel {
    pub team: Team,
    pub status: Status,
    pub rank_display: String,
    pub university_rank: Option<String>,
    pub pinned: bool,
    /// Pinned rows are duplicated into the sticky region; this marks the
    /// duplicate, not the in-place row.
    pub sticky: bool,
    pub newly_solved: bool,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct StandingsView {
    pub sticky_rows: Vec<RowModel>,
    pub rows: Vec<RowModel>,
    pub invert_color: bool,
    pub autoscroll: bool,
}

/// Assemble row models from the store: reveal snapshot selection, placeholder
/// teams for referential gaps, sub-ranks, the sticky pinned region, and the
/// rank placeholder while hidden.
pub fn build_view(
    state: &AppState,
    reveal: &RevealSequence,
    animator: &RowAnimator,
    now: f64,
) -> StandingsView {
    let standings: &[Status] = match reveal.snapshot_at(state.reveal_index().unwrap_or(0)) {
        Some(snapshot) => snapshot,
        None => &state.standings,
    };

    let sub_ranks = university_ranks(standings, &state.teams);
    let (pinned_ids, invert_color, autoscroll) = match &state.settings {
        Some(settings) => (
            settings.pinned_team_ids.iter().cloned().collect::<HashSet<_>>(),
            settings.invert_color,
            settings.autoscroll,
        ),
        None => (HashSet::new(), false, false),
    };

    let make_row = |status: &Status, sticky: bool| {
        let team = state
            .teams
            .get(&status.team_id)
            .cloned()
            .unwrap_or_else(placeholder_team);
        let rank_display = if animator.rank_hidden(&status.team_id, now) {
            RANK_PLACEHOLDER.to_string()
        } else {
            status.rank.to_string()
        };
        RowModel {
            rank_display,
            university_rank: sub_ranks.get(&status.team_id).cloned(),
            pinned: pinned_ids.contains(&status.team_id),
            sticky,
            newly_solved: animator.newly_solved(&status.team_id, now),
            team,
            status: status.clone(),
        }
    };

    let sticky_rows = standings
        .iter()
        .filter(|status| pinned_ids.contains(&status.team_id))
        .map(|status| make_row(status, true))
        .collect();
    let rows = standings.iter().map(|status| make_row(status, false)).collect();

    StandingsView {
        sticky_rows,
        rows,
        invert_color,
        autoscroll,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RevealState, Settings};
    use crate::services::config_loader::AnimationConfig;
    use std::collections::HashMap;

    fn status(team_id: &str, rank: u32, solved: u32) -> Status {
        Status {
            team_id: team_id.to_string(),
            rank,
            solved,
            penalty: 0,
            problems: Vec::new(),
            reveal_state: RevealState::None,
        }
    }

    fn team(id: &str, university: &str) -> (String, Team) {
        (
            id.to_string(),
            Team {
                id: id.to_string(),
                name: format!("Team {id}"),
                university: university.to_string(),
                country: None,
                members: Vec::new(),
            },
        )
    }

    fn state_with(standings: Vec<Status>, teams: Vec<(String, Team)>) -> AppState {
        AppState {
            standings,
            teams: teams.into_iter().collect::<HashMap<_, _>>(),
            settings: Some(Settings {
                version: 2,
                pinned_team_ids: Vec::new(),
                invert_color: false,
                autoscroll: false,
            }),
            ..Default::default()
        }
    }

    fn animator() -> RowAnimator {
        RowAnimator::new(AnimationConfig::default())
    }

    #[test]
    fn unknown_team_id_gets_the_placeholder() {
        let state = state_with(vec![status("ghost", 1, 0)], vec![team("a", "U")]);
        let view = build_view(&state, &RevealSequence::default(), &animator(), 0.0);

        assert_eq!(view.rows[0].team.name, "???");
        assert_eq!(view.rows[0].team.university, "???");
        assert_eq!(view.rows[0].university_rank, None);
    }

    #[test]
    fn pinned_rows_are_duplicated_into_the_sticky_region() {
        let mut state = state_with(
            vec![status("a", 1, 0), status("b", 2, 0)],
            vec![team("a", "U"), team("b", "U")],
        );
        state.settings.as_mut().unwrap().pinned_team_ids = vec!["b".to_string()];

        let view = build_view(&state, &RevealSequence::default(), &animator(), 0.0);
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.sticky_rows.len(), 1);
        assert_eq!(view.sticky_rows[0].team.id, "b");
        assert!(view.sticky_rows[0].sticky);
        // The in-place row is still marked pinned but not sticky.
        assert!(view.rows[1].pinned);
        assert!(!view.rows[1].sticky);
    }

    #[test]
    fn sub_ranks_ride_along() {
        let state = state_with(
            vec![status("a", 1, 0), status("b", 2, 0)],
            vec![team("a", "U"), team("b", "U")],
        );
        let view = build_view(&state, &RevealSequence::default(), &animator(), 0.0);
        assert_eq!(view.rows[0].university_rank.as_deref(), Some("1/2"));
        assert_eq!(view.rows[1].university_rank.as_deref(), Some("2/2"));
    }

    #[test]
    fn reveal_snapshot_replaces_live_standings() {
        let mut state = state_with(vec![status("live", 1, 0)], vec![]);
        state
            .broadcast
            .insert("reveal_index".to_string(), serde_json::json!(0));
        let reveal = RevealSequence::new(vec![vec![status("frozen", 1, 0)]]);

        let view = build_view(&state, &reveal, &animator(), 0.0);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].status.team_id, "frozen");
    }

    #[test]
    fn hidden_rank_shows_the_placeholder() {
        use crate::services::row_anim::LayoutProbe;

        struct FlatProbe;
        impl LayoutProbe for FlatProbe {
            fn offset_of(&self, _key: &str) -> Option<f32> {
                Some(0.0)
            }
            fn set_transform(&mut self, _key: &str, _offset_y: f32) {}
            fn clear_transform(&mut self, _key: &str) {}
            fn set_animating(&mut self, _key: &str, _animating: bool) {}
            fn set_stack_priority(&mut self, _key: &str, _priority: i32) {}
        }

        let state = state_with(vec![status("a", 1, 1)], vec![team("a", "U")]);
        let mut anim = animator();
        let mut probe = FlatProbe;
        anim.begin_update(&mut probe, &[]);
        anim.finish_update(&mut probe, &[status("a", 1, 0)], 0.0, false);
        anim.begin_update(&mut probe, &["a".to_string()]);
        anim.finish_update(&mut probe, &[status("a", 1, 1)], 0.0, false);

        let view = build_view(&state, &RevealSequence::default(), &anim, 100.0);
        assert_eq!(view.rows[0].rank_display, RANK_PLACEHOLDER);

        let view = build_view(&state, &RevealSequence::default(), &anim, 4001.0);
        assert_eq!(view.rows[0].rank_display, "1");
    }

    #[test]
    fn missing_settings_mean_no_pins_and_defaults() {
        let mut state = state_with(vec![status("a", 1, 0)], vec![team("a", "U")]);
        state.settings = None;
        let view = build_view(&state, &RevealSequence::default(), &animator(), 0.0);
        assert!(view.sticky_rows.is_empty());
        assert!(!view.invert_color);
        assert!(!view.autoscroll);
    }
}

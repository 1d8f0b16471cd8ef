use std::collections::HashMap;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::time::timeout;

use liveboard::services::config_loader::AnimationConfig;
use liveboard::{
    AppState, FeedKind, FeedSynchronizer, LayoutProbe, PayloadFetcher, RevealSequence, RowAnimator,
    apply_patch, build_view,
};

const ROW_HEIGHT: f32 = 40.0;

/// Layout binding that lays rows out as a fixed-height vertical stack.
#[derive(Default)]
struct StackProbe {
    order: Vec<String>,
    transforms: HashMap<String, f32>,
    animating: HashMap<String, bool>,
}

impl StackProbe {
    fn lay_out(&mut self, order: &[&str]) {
        self.order = order.iter().map(|s| s.to_string()).collect();
    }
}

impl LayoutProbe for StackProbe {
    fn offset_of(&self, key: &str) -> Option<f32> {
        self.order
            .iter()
            .position(|k| k == key)
            .map(|index| index as f32 * ROW_HEIGHT)
    }

    fn set_transform(&mut self, key: &str, offset_y: f32) {
        self.transforms.insert(key.to_string(), offset_y);
    }

    fn clear_transform(&mut self, key: &str) {
        self.transforms.remove(key);
    }

    fn set_animating(&mut self, key: &str, animating: bool) {
        self.animating.insert(key.to_string(), animating);
    }

    fn set_stack_priority(&mut self, _key: &str, _priority: i32) {}
}

struct FixtureFetcher;

impl PayloadFetcher for FixtureFetcher {
    fn fetch(&self, pointer: &str) -> impl Future<Output = anyhow::Result<Value>> + Send {
        let payload = match pointer {
            "teams-1" => Ok(json!({
                "apple": { "id": "apple", "name": "Apple", "university": "Orchard" },
                "berry": { "id": "berry", "name": "Berry", "university": "Orchard" },
                "cedar": { "id": "cedar", "name": "Cedar", "university": "Forest" }
            })),
            "standings-1" => Ok(json!([
                { "teamId": "apple", "rank": 1, "solved": 3, "penalty": 200 },
                { "teamId": "berry", "rank": 2, "solved": 2, "penalty": 180 },
                { "teamId": "cedar", "rank": 3, "solved": 1, "penalty": 90 }
            ])),
            // Cedar solves one and leapfrogs Berry.
            "standings-2" => Ok(json!([
                { "teamId": "apple", "rank": 1, "solved": 3, "penalty": 200 },
                { "teamId": "cedar", "rank": 2, "solved": 2, "penalty": 170 },
                { "teamId": "berry", "rank": 3, "solved": 2, "penalty": 180 }
            ])),
            other => Err(anyhow::anyhow!("unknown fixture pointer {other}")),
        };
        async move { payload }
    }
}

#[tokio::test]
async fn live_update_flows_from_feed_to_animated_view() {
    let (sync, mut patches) = FeedSynchronizer::new(FixtureFetcher, &[]);
    let mut state = AppState::default();
    let mut animator = RowAnimator::new(AnimationConfig::default());
    let mut probe = StackProbe::default();
    let reveal = RevealSequence::default();

    sync.pointer_changed(FeedKind::Teams, Some("teams-1".into()));
    sync.pointer_changed(FeedKind::Standings, Some("standings-1".into()));
    for _ in 0..2 {
        let patch = timeout(Duration::from_secs(5), patches.recv())
            .await
            .expect("feed patch should arrive")
            .expect("synchronizer channel open");
        apply_patch(&mut state, patch);
    }

    // First layout: mount everything, no motion.
    probe.lay_out(&["apple", "berry", "cedar"]);
    animator.begin_update(&mut probe, &[]);
    animator.finish_update(&mut probe, &state.standings, 0.0, false);
    assert!(probe.transforms.is_empty());

    let view = build_view(&state, &reveal, &animator, 0.0);
    assert_eq!(view.rows[0].team.name, "Apple");
    assert_eq!(view.rows[0].university_rank.as_deref(), Some("1/2"));
    assert_eq!(view.rows[2].university_rank.as_deref(), Some("1/1"));

    // Cedar's solve arrives.
    sync.pointer_changed(FeedKind::Standings, Some("standings-2".into()));
    let patch = timeout(Duration::from_secs(5), patches.recv())
        .await
        .expect("feed patch should arrive")
        .expect("synchronizer channel open");

    let rendered: Vec<String> = state
        .standings
        .iter()
        .map(|status| status.team_id.clone())
        .collect();
    animator.begin_update(&mut probe, &rendered);
    apply_patch(&mut state, patch);
    probe.lay_out(&["apple", "cedar", "berry"]);
    let outcome = animator.finish_update(&mut probe, &state.standings, 1000.0, false);
    assert_eq!(outcome.marker_index, None);

    // Cedar flies up one row, Berry down one, Apple stays.
    assert_eq!(probe.transforms.get("cedar"), Some(&ROW_HEIGHT));
    assert_eq!(probe.transforms.get("berry"), Some(&-ROW_HEIGHT));
    assert!(!probe.transforms.contains_key("apple"));

    // Cedar is highlighted with its rank hidden until the motion settles.
    let view = build_view(&state, &reveal, &animator, 1000.0);
    let cedar = &view.rows[1];
    assert!(cedar.newly_solved);
    assert_eq!(cedar.rank_display, "...");
    assert_eq!(cedar.university_rank.as_deref(), Some("1/1"));
    assert_eq!(view.rows[2].rank_display, "3");

    // Release plays out and the board comes to rest.
    assert!(animator.tick(&mut probe, 1000.0));
    assert!(animator.tick(&mut probe, 1500.0));
    assert!(!animator.tick(&mut probe, 12_000.0));
    assert!(probe.transforms.is_empty());

    let view = build_view(&state, &reveal, &animator, 12_000.0);
    assert_eq!(view.rows[1].rank_display, "2");
    assert!(!view.rows[1].newly_solved);
}

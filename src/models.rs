use chrono::{DateTime, FixedOffset};
use serde::{self, Deserialize, Deserializer, Serialize};

/// Contest metadata delivered by the contest feed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Contest {
    pub title: String,
    #[serde(default, deserialize_with = "from_opt_datetime")]
    pub start_time: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "from_opt_datetime")]
    pub end_time: Option<DateTime<FixedOffset>>,
    /// Clock scaling factor used by rehearsal playback; 1.0 for live contests.
    #[serde(default)]
    pub scale: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TeamMember {
    pub name: String,
}

/// A team as delivered by the teams feed. The feed replaces the whole map
/// at once; `id` must match the map key.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub university: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

/// Sentinel substituted when a standing row references a team id the teams
/// feed does not know about. Rendering never fails on a referential gap.
pub fn placeholder_team() -> Team {
    Team {
        id: "null".to_string(),
        name: "???".to_string(),
        university: "???".to_string(),
        country: None,
        members: Vec::new(),
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RevealState {
    #[default]
    None,
    Finalized,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProblemCell {
    pub attempts: u32,
    pub penalty: i64,
    pub pendings: u32,
    pub solved: bool,
}

/// One standing row. The standings feed replaces the whole sequence
/// atomically, sorted by rank ascending. `team_id` is a weak reference into
/// the teams map and may not resolve.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Status {
    #[serde(rename = "teamId")]
    pub team_id: String,
    pub rank: u32,
    pub solved: u32,
    pub penalty: i64,
    #[serde(default)]
    pub problems: Vec<ProblemCell>,
    #[serde(rename = "revealState", default)]
    pub reveal_state: RevealState,
}

/// Viewer preferences. Created by the migration ladder in
/// `services::settings_store`; every known field is present after migration.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub version: u32,
    #[serde(rename = "pinnedTeamIds", default)]
    pub pinned_team_ids: Vec<String>,
    #[serde(rename = "invertColor", default)]
    pub invert_color: bool,
    #[serde(default)]
    pub autoscroll: bool,
}

fn from_opt_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    if let Some(s) = opt {
        let dt = DateTime::parse_from_rfc3339(&s).map_err(serde::de::Error::custom)?;
        Ok(Some(dt))
    } else {
        Ok(None)
    }
}

use std::collections::HashMap;

use crate::models::{Status, Team};

/// Per-university sub-ranks, as `"<position>/<groupSize>"` display strings
/// keyed by team id.
///
/// Group order is inherited from the global standings (already
/// rank-sorted), so position within a group is arrival order. A status whose
/// `rank` equals the immediately preceding status of the same group inherits
/// that status's display string, keeping visually tied teams on the same
/// sub-rank. Statuses whose team id does not resolve are skipped entirely.
pub fn university_ranks(
    standings: &[Status],
    teams: &HashMap<String, Team>,
) -> HashMap<String, String> {
    let mut group_sizes: HashMap<&str, usize> = HashMap::new();
    for status in standings {
        if let Some(team) = teams.get(&status.team_id) {
            *group_sizes.entry(team.university.as_str()).or_default() += 1;
        }
    }

    struct GroupCursor {
        seen: usize,
        last_rank: u32,
        last_display: String,
    }

    let mut cursors: HashMap<&str, GroupCursor> = HashMap::new();
    let mut out = HashMap::with_capacity(standings.len());

    for status in standings {
        let Some(team) = teams.get(&status.team_id) else {
            continue;
        };
        let university = team.university.as_str();
        let size = group_sizes[university];

        let display = match cursors.get_mut(university) {
            Some(cursor) => {
                cursor.seen += 1;
                if status.rank == cursor.last_rank {
                    // Tie with the preceding group member: reuse its string.
                    cursor.last_display.clone()
                } else {
                    let display = format!("{}/{}", cursor.seen, size);
                    cursor.last_rank = status.rank;
                    cursor.last_display = display.clone();
                    display
                }
            }
            None => {
                let display = format!("1/{size}");
                cursors.insert(
                    university,
                    GroupCursor {
                        seen: 1,
                        last_rank: status.rank,
                        last_display: display.clone(),
                    },
                );
                display
            }
        };

        out.insert(status.team_id.clone(), display);
    }

    out
}

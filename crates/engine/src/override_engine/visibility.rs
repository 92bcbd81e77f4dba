use std::collections::BTreeSet;

use crate::live::{ActorId, ActorVisibility};

/// Actors that should be hidden: non-local actors standing on a facade plot
/// that the local player is not on.
pub fn actors_to_hide(
    assignments: &[(ActorId, u8)],
    facade_plots: &BTreeSet<u8>,
    local_occupants: &[u8],
) -> BTreeSet<ActorId> {
    assignments
        .iter()
        .filter(|(_, plot)| facade_plots.contains(plot) && !local_occupants.contains(plot))
        .map(|&(actor, _)| actor)
        .collect()
}

/// Bring the hidden set in line with `wanted`. Returns (hidden, shown).
pub fn sync_hidden_actors(
    actors: &mut dyn ActorVisibility,
    hidden: &mut BTreeSet<ActorId>,
    wanted: &BTreeSet<ActorId>,
) -> (usize, usize) {
    let mut shown = 0;
    hidden.retain(|actor| {
        if wanted.contains(actor) {
            return true;
        }
        if actors.show(*actor) {
            shown += 1;
        }
        false
    });

    let mut newly_hidden = 0;
    for &actor in wanted {
        if !hidden.contains(&actor) && actors.hide(actor) {
            hidden.insert(actor);
            newly_hidden += 1;
        }
    }
    (newly_hidden, shown)
}

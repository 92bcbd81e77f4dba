use crate::config::FESTIVAL_SLOTS;
use crate::housing::HousingContext;
use crate::live::{self, Festival, FestivalSet, HousingLayout};
use crate::records::FestivalFacade;

use super::types::FestivalOutcome;

/// The festival state pushed for a forced festival: the id in slot 0, every
/// other slot empty.
pub fn forced_festivals(id: u16) -> FestivalSet {
    let mut festivals = [Festival::default(); FESTIVAL_SLOTS];
    festivals[0] = Festival { id, phase: 0 };
    festivals
}

/// Apply or undo the ward's forced festival.
///
/// `original` caches the ward's own festivals from the first override until
/// they are written back. Writes need an active division.
pub fn run_festival_pass(
    layout: &mut dyn HousingLayout,
    original: &mut Option<FestivalSet>,
    ctx: &HousingContext,
    festival: Option<&FestivalFacade>,
    reset: bool,
) -> FestivalOutcome {
    if !layout.is_available() {
        return FestivalOutcome::Unavailable;
    }

    match festival.filter(|_| !reset) {
        None => {
            let Some(saved) = original.take() else {
                return FestivalOutcome::Unchanged;
            };
            if ctx.division.is_some() {
                live::write_festivals(layout, &saved);
            }
            FestivalOutcome::Restored
        }
        Some(festival) => {
            if ctx.division.is_none() {
                return FestivalOutcome::Unchanged;
            }
            if original.is_none() {
                let Some(current) = live::read_festivals(layout) else {
                    return FestivalOutcome::Unavailable;
                };
                *original = Some(current);
            }
            live::write_festivals(layout, &forced_festivals(festival.id));
            FestivalOutcome::Applied { id: festival.id }
        }
    }
}

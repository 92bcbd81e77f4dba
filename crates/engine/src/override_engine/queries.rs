use crate::housing::{HousingContext, PlotSize};
use crate::live::{self, HousingLayout};
use crate::slot_codec::ExteriorSlot;

/// Live size of a plot in the current division.
pub fn plot_size(layout: &dyn HousingLayout, ctx: &HousingContext, plot: u8) -> Option<PlotSize> {
    if !ctx.owns_plot(plot) {
        return None;
    }
    live::read_plot(layout, plot).map(|p| p.size)
}

/// Live appearance id in one slot of a plot in the current division.
pub fn plot_exterior(
    layout: &dyn HousingLayout,
    ctx: &HousingContext,
    plot: u8,
    slot: ExteriorSlot,
) -> Option<i16> {
    if !ctx.owns_plot(plot) {
        return None;
    }
    live::read_plot(layout, plot).map(|p| p.exterior_ids[slot.lane()])
}

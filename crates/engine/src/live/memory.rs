use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::{FESTIVAL_SLOTS, PLOTS_PER_WARD};
use crate::housing::PlotSize;

use super::{ActorId, ActorVisibility, Festival, FestivalSet, HousingLayout, PlotExterior};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
struct HousingState {
    available: bool,
    plots: Vec<PlotExterior>,
    festivals: FestivalSet,
    seeded_plots: Vec<PlotExterior>,
    seeded_festivals: FestivalSet,
    update_pending: bool,
    writes: u64,
}

/// In-process layout used by the headless host and by tests.
///
/// Starts available, with every plot a small unloaded plot and every festival
/// slot empty. Seeded data is what the server sends; [`MemoryHousing::reload`]
/// throws away engine writes and goes back to it. Clones share the same layout, so a handle kept outside the
/// engine sees what the engine wrote.
#[derive(Debug, Clone)]
pub struct MemoryHousing {
    state: Arc<Mutex<HousingState>>,
}

impl Default for MemoryHousing {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHousing {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(HousingState {
                available: true,
                plots: vec![PlotExterior::unloaded(PlotSize::Small); PLOTS_PER_WARD],
                festivals: [Festival::default(); FESTIVAL_SLOTS],
                seeded_plots: vec![PlotExterior::unloaded(PlotSize::Small); PLOTS_PER_WARD],
                seeded_festivals: [Festival::default(); FESTIVAL_SLOTS],
                update_pending: false,
                writes: 0,
            })),
        }
    }

    pub fn set_available(&self, available: bool) {
        lock(&self.state).available = available;
    }

    /// Seed a plot without counting it as an engine write.
    pub fn set_plot(&self, plot: u8, data: PlotExterior) {
        let mut state = lock(&self.state);
        let index = usize::from(plot);
        if let Some(slot) = state.seeded_plots.get_mut(index) {
            *slot = data;
        }
        if let Some(slot) = state.plots.get_mut(index) {
            *slot = data;
        }
    }

    pub fn set_festivals(&self, festivals: FestivalSet) {
        let mut state = lock(&self.state);
        state.seeded_festivals = festivals;
        state.festivals = festivals;
    }

    /// Rebuild the layout from seeded data, as the client does when it loads
    /// a new ward.
    pub fn reload(&self) {
        let mut state = lock(&self.state);
        let HousingState {
            plots,
            festivals,
            seeded_plots,
            seeded_festivals,
            update_pending,
            ..
        } = &mut *state;
        plots.clone_from(seeded_plots);
        *festivals = *seeded_festivals;
        *update_pending = false;
    }

    /// Current data of `plot`, regardless of availability.
    pub fn plot(&self, plot: u8) -> Option<PlotExterior> {
        lock(&self.state).plots.get(usize::from(plot)).copied()
    }

    pub fn festivals(&self) -> FestivalSet {
        lock(&self.state).festivals
    }

    pub fn update_pending(&self) -> bool {
        lock(&self.state).update_pending
    }

    /// What the host's renderer does after picking up a pending update.
    pub fn clear_update_pending(&self) {
        lock(&self.state).update_pending = false;
    }

    /// Number of plot and festival writes accepted so far.
    pub fn writes(&self) -> u64 {
        lock(&self.state).writes
    }
}

impl HousingLayout for MemoryHousing {
    fn is_available(&self) -> bool {
        lock(&self.state).available
    }

    fn plot_count(&self) -> usize {
        lock(&self.state).plots.len()
    }

    fn read_plot(&self, plot: u8) -> Option<PlotExterior> {
        self.plot(plot)
    }

    fn write_plot(&mut self, plot: u8, data: &PlotExterior) -> bool {
        let mut state = lock(&self.state);
        let Some(slot) = state.plots.get_mut(usize::from(plot)) else {
            return false;
        };
        slot.exterior_ids = data.exterior_ids;
        slot.stain_ids = data.stain_ids;
        state.update_pending = true;
        state.writes += 1;
        true
    }

    fn read_festivals(&self) -> Option<FestivalSet> {
        Some(self.festivals())
    }

    fn write_festivals(&mut self, festivals: &FestivalSet) -> bool {
        let mut state = lock(&self.state);
        state.festivals = *festivals;
        state.writes += 1;
        true
    }
}

#[derive(Debug, Default)]
struct ActorState {
    present: BTreeSet<ActorId>,
    hidden: BTreeSet<ActorId>,
}

/// In-process actor table: remembers which actors exist and which are hidden.
/// Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct MemoryActors {
    state: Arc<Mutex<ActorState>>,
}

impl MemoryActors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the set of actors currently present. Hidden flags of actors
    /// that left are forgotten.
    pub fn set_present(&self, actors: impl IntoIterator<Item = ActorId>) {
        let mut state = lock(&self.state);
        state.present = actors.into_iter().collect();
        let ActorState { present, hidden } = &mut *state;
        hidden.retain(|id| present.contains(id));
    }

    pub fn is_hidden(&self, actor: ActorId) -> bool {
        lock(&self.state).hidden.contains(&actor)
    }

    pub fn hidden(&self) -> Vec<ActorId> {
        lock(&self.state).hidden.iter().copied().collect()
    }
}

impl ActorVisibility for MemoryActors {
    fn hide(&mut self, actor: ActorId) -> bool {
        let mut state = lock(&self.state);
        if !state.present.contains(&actor) {
            return false;
        }
        state.hidden.insert(actor);
        true
    }

    fn show(&mut self, actor: ActorId) -> bool {
        let mut state = lock(&self.state);
        state.hidden.remove(&actor) && state.present.contains(&actor)
    }
}

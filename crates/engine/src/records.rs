//! Facade configuration records.
//!
//! The engine only reads these. Editing (add, edit, delete) and persistence
//! belong to the configuration owner; the helpers here are what that owner
//! uses, and they keep one facade per location and one festival facade per
//! ward.

use bevy::prelude::*;
use bitcode::{Decode, Encode};

use crate::housing::{District, HousingContext, PlotSize};
use crate::live::PlotExterior;
use crate::slot_codec::{self, SlotValues};

// =============================================================================
// Records
// =============================================================================

/// An exterior override for one plot.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Facade {
    pub world: u32,
    pub district: District,
    pub ward: u8,
    pub plot: u8,
    /// The selection came from a single unified exterior item that was
    /// expanded into all eight lanes when the record was made.
    pub is_unified: bool,
    pub packed_exterior_ids: u128,
    pub packed_stain_ids: u128,
}

impl Facade {
    pub fn new(
        world: u32,
        district: District,
        ward: u8,
        plot: u8,
        exterior: SlotValues,
        stains: SlotValues,
    ) -> Self {
        Self {
            world,
            district,
            ward,
            plot,
            is_unified: false,
            packed_exterior_ids: slot_codec::pack(exterior),
            packed_stain_ids: slot_codec::pack(stains),
        }
    }

    pub fn exterior_ids(&self) -> SlotValues {
        slot_codec::unpack(self.packed_exterior_ids)
    }

    pub fn stain_ids(&self) -> SlotValues {
        slot_codec::unpack(self.packed_stain_ids)
    }

    pub fn location(&self) -> (u32, District, u8, u8) {
        (self.world, self.district, self.ward, self.plot)
    }

    /// Whether this record targets the ward of `ctx` (any division).
    pub fn in_ward(&self, ctx: &HousingContext) -> bool {
        self.world == ctx.world && self.district == ctx.district && Some(self.ward) == ctx.ward
    }

    /// Whether this record targets a plot of the current division.
    pub fn applies_to(&self, ctx: &HousingContext) -> bool {
        self.in_ward(ctx) && ctx.owns_plot(self.plot)
    }
}

/// A forced festival for one ward.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct FestivalFacade {
    pub world: u32,
    pub district: District,
    pub ward: u8,
    pub id: u16,
}

impl FestivalFacade {
    pub fn applies_to(&self, ctx: &HousingContext) -> bool {
        self.world == ctx.world && self.district == ctx.district && Some(self.ward) == ctx.ward
    }
}

/// A named, reusable exterior captured for a plot size.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Preset {
    pub name: String,
    pub plot_size: PlotSize,
    pub packed_exterior_ids: u128,
    pub packed_stain_ids: u128,
}

impl Preset {
    /// Capture a plot's current exterior. Every lane becomes explicit except
    /// unloaded appearance slots.
    pub fn from_exterior(name: impl Into<String>, data: &PlotExterior) -> Self {
        let exterior = data.exterior_ids.map(|id| u16::try_from(id).ok());
        let stains = data.stain_ids.map(|id| Some(u16::from(id as u8)));
        Self {
            name: name.into(),
            plot_size: data.size,
            packed_exterior_ids: slot_codec::pack(exterior),
            packed_stain_ids: slot_codec::pack(stains),
        }
    }

    /// Apply this preset to a location.
    pub fn to_facade(&self, world: u32, district: District, ward: u8, plot: u8) -> Facade {
        Facade {
            world,
            district,
            ward,
            plot,
            is_unified: false,
            packed_exterior_ids: self.packed_exterior_ids,
            packed_stain_ids: self.packed_stain_ids,
        }
    }
}

// =============================================================================
// Configuration resource
// =============================================================================

/// All user configuration the engine reads.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Default, Encode, Decode)]
pub struct FacadeConfig {
    pub facades: Vec<Facade>,
    pub festival_facades: Vec<FestivalFacade>,
    pub presets: Vec<Preset>,
    /// Hide other characters standing on an overridden plot instead of
    /// dropping the override while they are there.
    pub hide_players: bool,
}

impl FacadeConfig {
    /// Insert `facade`, replacing any record at the same location.
    pub fn upsert_facade(&mut self, facade: Facade) {
        let location = facade.location();
        match self.facades.iter_mut().find(|f| f.location() == location) {
            Some(existing) => *existing = facade,
            None => self.facades.push(facade),
        }
    }

    /// Remove the record at a location. Returns it if there was one.
    pub fn remove_facade(
        &mut self,
        world: u32,
        district: District,
        ward: u8,
        plot: u8,
    ) -> Option<Facade> {
        let location = (world, district, ward, plot);
        let index = self.facades.iter().position(|f| f.location() == location)?;
        Some(self.facades.remove(index))
    }

    pub fn facade_at(&self, world: u32, district: District, ward: u8, plot: u8) -> Option<&Facade> {
        let location = (world, district, ward, plot);
        self.facades.iter().rev().find(|f| f.location() == location)
    }

    /// Facades in the current division, in configuration order.
    pub fn current_facades<'a>(
        &'a self,
        ctx: &'a HousingContext,
    ) -> impl Iterator<Item = &'a Facade> + 'a {
        self.facades.iter().filter(move |f| f.applies_to(ctx))
    }

    /// Facades configured anywhere except the current division.
    pub fn other_division_count(&self, ctx: &HousingContext) -> usize {
        self.facades.len() - self.current_facades(ctx).count()
    }

    pub fn upsert_festival_facade(&mut self, festival: FestivalFacade) {
        let key = (festival.world, festival.district, festival.ward);
        match self
            .festival_facades
            .iter_mut()
            .find(|f| (f.world, f.district, f.ward) == key)
        {
            Some(existing) => *existing = festival,
            None => self.festival_facades.push(festival),
        }
    }

    pub fn remove_festival_facade(
        &mut self,
        world: u32,
        district: District,
        ward: u8,
    ) -> Option<FestivalFacade> {
        let key = (world, district, ward);
        let index = self
            .festival_facades
            .iter()
            .position(|f| (f.world, f.district, f.ward) == key)?;
        Some(self.festival_facades.remove(index))
    }

    pub fn current_festival_facade(&self, ctx: &HousingContext) -> Option<&FestivalFacade> {
        self.festival_facades.iter().find(|f| f.applies_to(ctx))
    }

    /// Add a preset. Presets are keyed by name; an existing one is replaced.
    pub fn add_preset(&mut self, preset: Preset) {
        match self.presets.iter_mut().find(|p| p.name == preset.name) {
            Some(existing) => *existing = preset,
            None => self.presets.push(preset),
        }
    }

    pub fn remove_preset(&mut self, name: &str) -> Option<Preset> {
        let index = self.presets.iter().position(|p| p.name == name)?;
        Some(self.presets.remove(index))
    }

    pub fn presets_for(&self, size: PlotSize) -> impl Iterator<Item = &Preset> + '_ {
        self.presets.iter().filter(move |p| p.plot_size == size)
    }

    /// Order facades by world, district, ward and plot. Done before saving.
    pub fn sort(&mut self) {
        self.facades.sort_by_key(|f| f.location());
        self.festival_facades
            .sort_by_key(|f| (f.world, f.district, f.ward));
    }
}

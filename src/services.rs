//! Process-wide services shared by every enclosure
//!
//! One instance per process: the species cache and the emitter's recipe
//! memos are global in scope, only the stored records belong to a pen.

use crate::core::config::RanchConfig;
use crate::core::error::Result;
use crate::host::DefinitionRegistry;
use crate::production::{GrowthBonusTable, ProductionEmitter};
use crate::species::{SideStore, SpeciesCache};
use std::rc::Rc;

pub struct RanchServices {
    pub config: RanchConfig,
    pub registry: Rc<dyn DefinitionRegistry>,
    pub species: SpeciesCache,
    pub emitter: ProductionEmitter,
}

impl RanchServices {
    /// Validate the config, open the species side-store and seed the emitter
    pub fn new(
        config: RanchConfig,
        registry: Rc<dyn DefinitionRegistry>,
        store: Box<dyn SideStore>,
        seed: u64,
    ) -> Result<Self> {
        Self::with_bonus_table(config, registry, store, GrowthBonusTable::with_defaults(), seed)
    }

    pub fn with_bonus_table(
        config: RanchConfig,
        registry: Rc<dyn DefinitionRegistry>,
        store: Box<dyn SideStore>,
        bonuses: GrowthBonusTable,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;
        let species = SpeciesCache::load(store, registry.as_ref(), &config);
        let emitter = ProductionEmitter::new(&config, bonuses, seed);
        tracing::info!(
            "Ranch services ready: {} cached species, seed {}",
            species.len(),
            seed
        );
        Ok(Self { config, registry, species, emitter })
    }
}

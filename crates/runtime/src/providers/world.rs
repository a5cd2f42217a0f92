use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use combat_core::{Fighter, FighterId, LocationId};

use crate::api::{ServiceError, WorldProvider};

/// In-memory world: a fixed roster per location.
///
/// Fighters keep the hp they were placed with; combat results are not
/// written back. Clones share the same rosters.
#[derive(Debug, Clone, Default)]
pub struct ScriptedWorld {
    locations: Arc<RwLock<HashMap<LocationId, Vec<Fighter>>>>,
}

impl ScriptedWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style placement.
    pub fn with_fighter(self, location: LocationId, fighter: Fighter) -> Self {
        self.place(location, fighter);
        self
    }

    /// Put `fighter` at `location`, replacing any fighter with the same id.
    pub fn place(&self, location: LocationId, fighter: Fighter) {
        let Ok(mut locations) = self.locations.write() else {
            tracing::error!(target: "runtime::world", "world lock poisoned");
            return;
        };
        for roster in locations.values_mut() {
            roster.retain(|f| f.id != fighter.id);
        }
        locations.entry(location).or_default().push(fighter);
    }

    pub fn remove(&self, fighter: FighterId) {
        if let Ok(mut locations) = self.locations.write() {
            for roster in locations.values_mut() {
                roster.retain(|f| f.id != fighter);
            }
        }
    }
}

#[async_trait]
impl WorldProvider for ScriptedWorld {
    async fn locate_eligible_participants(
        &self,
        location: LocationId,
    ) -> Result<Vec<Fighter>, ServiceError> {
        let locations = self.locations.read().map_err(|_| ServiceError::Unavailable)?;
        Ok(locations.get(&location).cloned().unwrap_or_default())
    }
}

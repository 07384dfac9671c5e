//! Priority-ordered actor registry.

use std::sync::Arc;

use tactics_core::ActorId;

use crate::actors::AutonomousActor;

/// One registered actor. Priority is read once, at registration.
#[derive(Clone)]
pub struct ActorRecord {
    pub id: ActorId,
    pub priority: i32,
    pub actor: Arc<dyn AutonomousActor>,
}

impl std::fmt::Debug for ActorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorRecord")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Actors in ascending priority. Equal priorities keep registration order.
#[derive(Default, Debug)]
pub struct ActorRegistry {
    records: Vec<ActorRecord>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `actor` and re-sorts. Returns `false` if its id is already present.
    pub fn register(&mut self, actor: Arc<dyn AutonomousActor>) -> bool {
        let id = actor.id();
        if self.contains(id) {
            return false;
        }
        self.records.push(ActorRecord {
            id,
            priority: actor.priority(),
            actor,
        });
        // `sort_by_key` is stable.
        self.records.sort_by_key(|record| record.priority);
        true
    }

    pub fn unregister(&mut self, id: ActorId) -> Option<ActorRecord> {
        let index = self.records.iter().position(|record| record.id == id)?;
        Some(self.records.remove(index))
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.records.iter().any(|record| record.id == id)
    }

    pub fn get(&self, id: ActorId) -> Option<&ActorRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Copy of the current order for one AI pass.
    pub fn snapshot(&self) -> Vec<ActorRecord> {
        self.records.clone()
    }

    pub fn order(&self) -> Vec<(ActorId, i32)> {
        self.records
            .iter()
            .map(|record| (record.id, record.priority))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

//! World wrapper around hecs

use hecs::Entity;

/// Game world containing all entities and components.
///
/// Entity handles are generational: once an entity is despawned, its handle
/// fails [`World::is_alive`] checks even if the underlying slot is reused.
pub struct World {
    /// The underlying hecs world
    pub inner: hecs::World,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
        }
    }

    /// Spawn an entity with the given components
    pub fn spawn(&mut self, components: impl hecs::DynamicBundle) -> Entity {
        self.inner.spawn(components)
    }

    /// Despawn an entity
    pub fn despawn(&mut self, entity: Entity) -> Result<(), hecs::NoSuchEntity> {
        self.inner.despawn(entity)
    }

    /// Check if an entity handle refers to a live entity
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    /// Get a reference to a component
    pub fn get<T: hecs::Component>(
        &self,
        entity: Entity,
    ) -> Result<hecs::Ref<'_, T>, hecs::ComponentError> {
        self.inner.get::<&T>(entity)
    }

    /// Get a mutable reference to a component
    pub fn get_mut<T: hecs::Component>(
        &mut self,
        entity: Entity,
    ) -> Result<hecs::RefMut<'_, T>, hecs::ComponentError> {
        self.inner.get::<&mut T>(entity)
    }

    /// Get a copy of a component, or `None` if the entity is dead or the
    /// component is absent
    pub fn cloned<T: hecs::Component + Clone>(&self, entity: Entity) -> Option<T> {
        self.inner.get::<&T>(entity).map(|c| (*c).clone()).ok()
    }

    /// Check whether an entity carries a component of the given type
    pub fn has<T: hecs::Component>(&self, entity: Entity) -> bool {
        self.inner.get::<&T>(entity).is_ok()
    }

    /// Attach a component to an entity, replacing any existing one of the
    /// same type
    pub fn insert<T: hecs::Component>(
        &mut self,
        entity: Entity,
        component: T,
    ) -> Result<(), hecs::NoSuchEntity> {
        self.inner.insert_one(entity, component)
    }

    /// Detach a component from an entity, returning it if present
    pub fn remove<T: hecs::Component>(&mut self, entity: Entity) -> Option<T> {
        self.inner.remove_one::<T>(entity).ok()
    }

    /// Get the number of entities
    pub fn len(&self) -> u32 {
        self.inner.len()
    }

    /// Check if the world is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Clear all entities from the world
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Query for entities with specific components
    pub fn query<Q: hecs::Query>(&self) -> hecs::QueryBorrow<'_, Q> {
        self.inner.query::<Q>()
    }

    /// Query for entities with specific components (mutable)
    pub fn query_mut<Q: hecs::Query>(&mut self) -> hecs::QueryMut<'_, Q> {
        self.inner.query_mut::<Q>()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_generational() {
        let mut world = World::new();
        let entity = world.spawn((1u32,));
        assert!(world.is_alive(entity));

        world.despawn(entity).unwrap();
        assert!(!world.is_alive(entity));

        // A new entity may reuse the slot, but the stale handle stays dead.
        let replacement = world.spawn((2u32,));
        assert!(!world.is_alive(entity));
        assert!(world.is_alive(replacement));
    }

    #[test]
    fn test_insert_remove_component() {
        let mut world = World::new();
        let entity = world.spawn(());

        world.insert(entity, 7u32).unwrap();
        assert!(world.has::<u32>(entity));
        assert_eq!(world.cloned::<u32>(entity), Some(7));

        assert_eq!(world.remove::<u32>(entity), Some(7));
        assert!(!world.has::<u32>(entity));
        assert_eq!(world.remove::<u32>(entity), None);
    }
}

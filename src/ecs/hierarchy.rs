//! Entity hierarchy components and reparenting operations
//!
//! [`Parent`] and [`Children`] form a two-way link: an entity with a `Parent`
//! pointing at `P` appears exactly once in `P`'s `Children` list. All
//! mutations go through [`set_parent`] and [`remove_from_parent`] so that the
//! link stays consistent in both directions.

use hecs::Entity;
use smallvec::SmallVec;

use crate::debug_check;
use crate::ecs::World;

/// Parent component - indicates this entity has a parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub Entity);

impl Parent {
    /// Get the parent entity
    #[must_use]
    pub const fn entity(&self) -> Entity {
        self.0
    }
}

/// Children component - tracks all children of this entity, in insertion order
#[derive(Debug, Clone, Default)]
pub struct Children(pub SmallVec<[Entity; 8]>);

impl Children {
    /// Create an empty children list
    #[must_use]
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Create from a single child
    #[must_use]
    pub fn single(child: Entity) -> Self {
        let mut children = SmallVec::new();
        children.push(child);
        Self(children)
    }

    /// Add a child, keeping the list duplicate-free
    pub fn add(&mut self, child: Entity) {
        if !self.0.contains(&child) {
            self.0.push(child);
        }
    }

    /// Remove a child, returning whether it was present
    pub fn remove(&mut self, child: Entity) -> bool {
        if let Some(pos) = self.0.iter().position(|&e| e == child) {
            self.0.remove(pos);
            true
        } else {
            false
        }
    }

    /// Check if this entity has no children
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of children
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over children in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.0.iter()
    }
}

/// Get an entity's current parent, if it has one
pub fn parent_of(world: &World, entity: Entity) -> Option<Entity> {
    world.get::<Parent>(entity).map(|p| p.0).ok()
}

/// Get a snapshot of an entity's children, in insertion order
pub fn children_of(world: &World, entity: Entity) -> Vec<Entity> {
    world
        .get::<Children>(entity)
        .map(|c| c.0.to_vec())
        .unwrap_or_default()
}

/// Walk up the ancestor chain from `start` looking for `target`
fn is_ancestor_or_self(world: &World, target: Entity, start: Entity) -> bool {
    let mut current = Some(start);
    while let Some(entity) = current {
        if entity == target {
            return true;
        }
        current = parent_of(world, entity);
    }
    false
}

/// Reparent `child` under `new_parent`, or make it a root when `new_parent`
/// is `None`.
///
/// Detaches the child from its former parent's child list first, then updates
/// the `Parent` component and appends to the new parent's `Children` list
/// (created on demand). Self-parenting and reparenting that would close an
/// ancestor cycle are rejected as invariant violations.
pub fn set_parent(world: &mut World, child: Entity, new_parent: Option<Entity>) {
    if !debug_check!(
        world.is_alive(child),
        "set_parent: child {:?} is not alive",
        child
    ) {
        return;
    }
    if let Some(parent) = new_parent {
        if !debug_check!(
            world.is_alive(parent),
            "set_parent: parent {:?} is not alive",
            parent
        ) {
            return;
        }
        if !debug_check!(
            parent != child,
            "set_parent: {:?} cannot be its own parent",
            child
        ) {
            return;
        }
        if !debug_check!(
            !is_ancestor_or_self(world, child, parent),
            "set_parent: attaching {:?} under {:?} would close a cycle",
            child,
            parent
        ) {
            return;
        }
    }

    if let Some(old_parent) = parent_of(world, child) {
        remove_from_parent(world, old_parent, child);
    }

    match new_parent {
        None => {
            world.remove::<Parent>(child);
        }
        Some(parent) => {
            let _ = world.insert(child, Parent(parent));
            let appended = {
                if let Ok(mut children) = world.get_mut::<Children>(parent) {
                    children.add(child);
                    true
                } else {
                    false
                }
            };
            if !appended {
                let _ = world.insert(parent, Children::single(child));
            }
        }
    }
}

/// Remove `child` from `parent`'s child list.
///
/// Tolerant: a missing `Children` component or an absent entry is a no-op.
/// The child's own `Parent` component is left untouched; callers reassign or
/// remove it themselves.
pub fn remove_from_parent(world: &mut World, parent: Entity, child: Entity) {
    if let Ok(mut children) = world.get_mut::<Children>(parent) {
        children.remove(child);
    }
}

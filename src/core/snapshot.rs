//! Scene snapshots: serializable scene state
//!
//! Supports saving and loading scene snapshots in RON (Rusty Object
//! Notation) or JSON. A snapshot is a flat list of game objects with
//! index-based parent/child references, captured from a live [`Scene`] and
//! instantiated back into one.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::Scene;
use crate::ecs::hierarchy::children_of;
use crate::ecs::{Name, Parent, Transform};
use hecs::Entity;

/// A serializable game object with its components
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameObjectSnapshot {
    /// Optional object name
    pub name: Option<String>,
    /// Local transform
    pub transform: Transform,
    /// Parent object index within the snapshot, if any
    pub parent_index: Option<usize>,
    /// Child object indices within the snapshot
    #[serde(default)]
    pub children_indices: Vec<usize>,
}

impl Default for GameObjectSnapshot {
    fn default() -> Self {
        Self {
            name: None,
            transform: Transform::default(),
            parent_index: None,
            children_indices: Vec::new(),
        }
    }
}

/// A serializable scene containing multiple game objects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSnapshot {
    /// Scene name
    pub name: String,
    /// Snapshot version for compatibility
    pub version: u32,
    /// All game objects in the scene
    pub objects: Vec<GameObjectSnapshot>,
}

impl SceneSnapshot {
    /// Create a new empty snapshot
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: 1,
            objects: Vec::new(),
        }
    }

    /// Add a game object to the snapshot, returning its index
    pub fn add_object(&mut self, object: GameObjectSnapshot) -> usize {
        let index = self.objects.len();
        self.objects.push(object);
        index
    }

    /// Capture the hierarchy of a live scene.
    ///
    /// Roots are visited in entity-handle order and each subtree is walked
    /// depth-first, so repeated captures of the same scene produce the same
    /// snapshot.
    #[must_use]
    pub fn capture(name: impl Into<String>, scene: &Scene) -> Self {
        let mut snapshot = Self::new(name);

        let mut roots: Vec<Entity> = scene
            .world
            .query::<&Transform>()
            .iter()
            .filter(|(entity, _)| !scene.world.has::<Parent>(*entity))
            .map(|(entity, _)| entity)
            .collect();
        roots.sort_by_key(|entity| entity.to_bits());

        for root in roots {
            capture_subtree(scene, root, None, &mut snapshot);
        }
        snapshot
    }

    /// Instantiate the snapshot's game objects into a live scene.
    ///
    /// Returns the created entities, index-aligned with
    /// [`SceneSnapshot::objects`]. Out-of-range parent references are
    /// reported and skipped; the object becomes a root.
    pub fn instantiate(&self, scene: &mut Scene) -> Vec<Entity> {
        let entities: Vec<Entity> = self
            .objects
            .iter()
            .map(|object| {
                let entity = scene.create_game_object(None);
                let _ = scene.world.insert(entity, object.transform);
                if let Some(name) = &object.name {
                    let _ = scene.world.insert(entity, Name::new(name.clone()));
                }
                entity
            })
            .collect();

        for (index, object) in self.objects.iter().enumerate() {
            let Some(parent_index) = object.parent_index else {
                continue;
            };
            if let Some(&parent) = entities.get(parent_index) {
                scene.set_parent(entities[index], Some(parent));
            } else {
                log::warn!(
                    "snapshot '{}': object {} references missing parent {}",
                    self.name,
                    index,
                    parent_index
                );
            }
        }
        entities
    }

    /// Save the snapshot to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SceneError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| SceneError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a snapshot from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path).map_err(|e| SceneError::IoError(e.to_string()))?;
        let snapshot: SceneSnapshot =
            ron::from_str(&content).map_err(|e| SceneError::DeserializeError(e.to_string()))?;
        Ok(snapshot)
    }

    /// Save the snapshot to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| SceneError::SerializeError(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| SceneError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a snapshot from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path).map_err(|e| SceneError::IoError(e.to_string()))?;
        let snapshot: SceneSnapshot = serde_json::from_str(&content)
            .map_err(|e| SceneError::DeserializeError(e.to_string()))?;
        Ok(snapshot)
    }

    /// Get the number of game objects
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Check if the snapshot is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

fn capture_subtree(
    scene: &Scene,
    entity: Entity,
    parent_index: Option<usize>,
    snapshot: &mut SceneSnapshot,
) -> usize {
    let transform = scene.world.cloned::<Transform>(entity).unwrap_or_default();
    let name = scene.world.cloned::<Name>(entity).map(|n| n.0);
    let index = snapshot.add_object(GameObjectSnapshot {
        name,
        transform,
        parent_index,
        children_indices: Vec::new(),
    });

    for child in children_of(&scene.world, entity) {
        if !scene.world.is_alive(child) {
            continue;
        }
        let child_index = capture_subtree(scene, child, Some(index), snapshot);
        snapshot.objects[index].children_indices.push(child_index);
    }
    index
}

/// Errors that can occur during snapshot operations
#[derive(Debug, Clone)]
pub enum SceneError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
        }
    }
}

impl std::error::Error for SceneError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::hierarchy::parent_of;
    use glam::Vec3;

    #[test]
    fn test_snapshot_serialization_ron() {
        let mut snapshot = SceneSnapshot::new("Test Scene");
        snapshot.add_object(GameObjectSnapshot {
            name: Some("Player".to_string()),
            transform: Transform::from_position(Vec3::new(1.0, 2.0, 0.0)),
            ..Default::default()
        });

        let ron_str =
            ron::ser::to_string_pretty(&snapshot, ron::ser::PrettyConfig::default()).unwrap();
        assert!(ron_str.contains("Player"));

        let loaded: SceneSnapshot = ron::from_str(&ron_str).unwrap();
        assert_eq!(loaded.name, "Test Scene");
        assert_eq!(loaded.object_count(), 1);
        assert_eq!(loaded.objects[0].name, Some("Player".to_string()));
    }

    #[test]
    fn test_snapshot_serialization_json() {
        let mut snapshot = SceneSnapshot::new("JSON Test");
        let root = snapshot.add_object(GameObjectSnapshot {
            name: Some("Level".to_string()),
            ..Default::default()
        });
        snapshot.add_object(GameObjectSnapshot {
            name: Some("Prop".to_string()),
            parent_index: Some(root),
            ..Default::default()
        });

        let json_str = serde_json::to_string(&snapshot).unwrap();
        let loaded: SceneSnapshot = serde_json::from_str(&json_str).unwrap();
        assert_eq!(loaded.name, "JSON Test");
        assert_eq!(loaded.objects[1].parent_index, Some(root));
    }

    #[test]
    fn test_instantiate_rebuilds_hierarchy() {
        let mut snapshot = SceneSnapshot::new("hierarchy");
        let root = snapshot.add_object(GameObjectSnapshot {
            transform: Transform::from_xy(100.0, 0.0),
            ..Default::default()
        });
        snapshot.add_object(GameObjectSnapshot {
            transform: Transform::from_xy(10.0, 0.0),
            parent_index: Some(root),
            ..Default::default()
        });

        let mut scene = Scene::default();
        let entities = snapshot.instantiate(&mut scene);

        assert_eq!(entities.len(), 2);
        assert_eq!(parent_of(&scene.world, entities[1]), Some(entities[0]));
        assert_eq!(children_of(&scene.world, entities[0]), vec![entities[1]]);
    }

    #[test]
    fn test_capture_round_trip() {
        let mut scene = Scene::default();
        let root = scene.create_game_object(None);
        scene
            .world
            .insert(root, Name::new("root"))
            .unwrap();
        scene.set_local_transform(
            root,
            Vec3::new(5.0, 6.0, 0.0),
            Vec3::ONE,
            glam::Quat::IDENTITY,
        );
        let _a = scene.create_game_object(Some(root));
        let _b = scene.create_game_object(Some(root));

        let snapshot = SceneSnapshot::capture("captured", &scene);
        assert_eq!(snapshot.object_count(), 3);
        assert_eq!(snapshot.objects[0].name, Some("root".to_string()));
        assert_eq!(snapshot.objects[0].children_indices, vec![1, 2]);

        // Instantiating into a fresh scene reproduces the same shape.
        let mut restored = Scene::default();
        let entities = snapshot.instantiate(&mut restored);
        let recaptured = SceneSnapshot::capture("captured", &restored);
        assert_eq!(recaptured.object_count(), 3);
        assert_eq!(recaptured.objects[0].children_indices, vec![1, 2]);
        let transform = restored.world.cloned::<Transform>(entities[0]).unwrap();
        assert!((transform.position.x - 5.0).abs() < 1e-5);
    }
}

//! Camera-state snapshots as compact JSON.

use crate::camera::Camera;
use crate::constants::PERSIST_DECIMALS;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("camera state is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("camera state field '{0}' is not finite")]
    NonFinite(&'static str),
    #[error("storage: {0}")]
    Storage(String),
}

/// Position, target, up and vertical fov, rounded to [`PERSIST_DECIMALS`].
/// Unknown fields are ignored on load.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub up: [f32; 3],
    pub fov: f32,
}

pub fn round_to(value: f32, decimals: i32) -> f32 {
    let scale = 10f64.powi(decimals);
    ((value as f64 * scale).round() / scale) as f32
}

fn round_vec(v: Vec3) -> [f32; 3] {
    v.to_array().map(|c| round_to(c, PERSIST_DECIMALS))
}

impl CameraState {
    pub fn capture(camera: &Camera) -> Self {
        Self {
            position: round_vec(camera.position),
            target: round_vec(camera.target),
            up: round_vec(camera.up),
            fov: round_to(camera.fov_degrees, PERSIST_DECIMALS),
        }
    }

    fn validate(&self) -> Result<(), PersistError> {
        let fields = [
            ("position", self.position.iter().all(|c| c.is_finite())),
            ("target", self.target.iter().all(|c| c.is_finite())),
            ("up", self.up.iter().all(|c| c.is_finite())),
            ("fov", self.fov.is_finite()),
        ];
        match fields.into_iter().find(|&(_, ok)| !ok) {
            Some((name, _)) => Err(PersistError::NonFinite(name)),
            None => Ok(()),
        }
    }

    /// Write into `camera` and recompute its projection.
    pub fn apply(&self, camera: &mut Camera) {
        camera.position = Vec3::from_array(self.position);
        camera.target = Vec3::from_array(self.target);
        camera.up = Vec3::from_array(self.up);
        camera.fov_degrees = self.fov;
        camera.update_projection_matrix();
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        let state: Self = serde_json::from_str(json)?;
        state.validate()?;
        Ok(state)
    }
}

/// String key-value storage such as `localStorage`.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub fn save_camera(
    store: &mut impl KeyValueStore,
    key: &str,
    camera: &Camera,
) -> Result<CameraState, PersistError> {
    let state = CameraState::capture(camera);
    store.set_item(key, &state.to_json()?)?;
    log::info!("[persist] saved camera under '{key}'");
    Ok(state)
}

/// Restore a saved camera. `Ok(None)` when nothing is stored under `key`;
/// on any error the camera is left untouched.
pub fn restore_camera(
    store: &impl KeyValueStore,
    key: &str,
    camera: &mut Camera,
) -> Result<Option<CameraState>, PersistError> {
    let Some(json) = store.get_item(key)? else {
        return Ok(None);
    };
    let state = CameraState::from_json(&json)?;
    state.apply(camera);
    log::info!("[persist] restored camera from '{key}'");
    Ok(Some(state))
}

//! Viewer settings loaded from a TOML file.
//!
//! Every field has a default, so an empty file (or no file at all) yields the stock scene:
//! an 800x600 window showing `resources/fourareen.obj` with its albedo texture.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::camera::{CameraState, DragState};
use crate::error::{Error, Result};
use crate::uniform_buffer::LightingUniforms;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub assets: AssetConfig,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub scene: SceneConfig,
}

impl ViewerConfig {
    pub fn open(p: impl AsRef<Path>) -> Result<Self> {
        let p = p.as_ref();
        let text = std::fs::read_to_string(p).map_err(Error::io_ctx(p))?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "WebGPU".to_string(),
            resizable: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub mesh: PathBuf,
    pub texture: PathBuf,
    /// WGSL file to compile instead of the built-in shader.
    pub shader: Option<PathBuf>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            mesh: PathBuf::from("resources/fourareen.obj"),
            texture: PathBuf::from("resources/fourareen2K_albedo.jpg"),
            shader: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub angles: [f32; 2],
    pub zoom: f32,
    pub sensitivity: f32,
    pub scroll_sensitivity: f32,
    pub inertia: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let state = CameraState::default();
        let drag = DragState::default();
        Self {
            angles: [state.angles.x, state.angles.y],
            zoom: state.zoom,
            sensitivity: drag.sensitivity,
            scroll_sensitivity: drag.scroll_sensitivity,
            inertia: drag.inertia,
        }
    }
}

impl CameraConfig {
    pub fn camera_state(&self) -> CameraState {
        CameraState {
            angles: nalgebra_glm::vec2(self.angles[0], self.angles[1]),
            zoom: self.zoom,
        }
    }

    pub fn drag_state(&self) -> DragState {
        DragState {
            sensitivity: self.sensitivity,
            scroll_sensitivity: self.scroll_sensitivity,
            inertia: self.inertia,
            ..DragState::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub directions: [[f32; 3]; 2],
    pub colors: [[f32; 3]; 2],
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            directions: [[0.5, -0.9, 0.1], [0.2, 0.4, 0.3]],
            colors: [[1.0, 0.9, 0.6], [0.6, 0.9, 1.0]],
        }
    }
}

impl LightingConfig {
    pub fn uniforms(&self) -> LightingUniforms {
        LightingUniforms::new(self.directions, self.colors)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub clear_color: [f64; 3],
    pub base_color: [f32; 4],
    /// Spin the model around +Z at this many radians per second when animation is on.
    pub spin_speed: f32,
    pub animate: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.05, 0.05, 0.05],
            base_color: [0.0, 1.0, 0.4, 1.0],
            spin_speed: 0.5,
            animate: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = ViewerConfig::parse("").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.title, "WebGPU");
        assert!(config.assets.shader.is_none());
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = ViewerConfig::parse(
            r#"
            [window]
            width = 1280
            resizable = true

            [assets]
            shader = "resources/shader.wgsl"

            [lighting]
            colors = [[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]
            "#,
        )
        .unwrap();

        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 600);
        assert!(config.window.resizable);
        assert_eq!(
            config.assets.shader.as_deref(),
            Some(Path::new("resources/shader.wgsl"))
        );
        assert_eq!(config.assets.mesh, AssetConfig::default().mesh);
        assert_eq!(config.lighting.colors[0], [1.0, 0.0, 0.0]);
        assert_eq!(config.lighting.directions, LightingConfig::default().directions);
    }

    #[test]
    fn camera_config_round_trips_into_state() {
        let config = CameraConfig::default();
        assert_eq!(config.camera_state(), CameraState::default());
        let drag = config.drag_state();
        assert_eq!(drag.inertia, 0.9);
        assert!(!drag.active);
    }

    #[test]
    fn bad_toml_is_reported() {
        assert!(matches!(
            ViewerConfig::parse("[window]\nwidth = \"wide\""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn bundled_pyramid_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/pyramid.toml");
        let config = ViewerConfig::open(path).unwrap();
        assert_eq!(config.window.title, "Pyramid");
        assert_eq!(config.assets.mesh, Path::new("resources/pyramid.txt"));
        assert!(config.scene.animate);
    }

    #[test]
    fn missing_file_names_the_path() {
        match ViewerConfig::open("does/not/exist.toml") {
            Err(Error::Io { path, .. }) => assert_eq!(path, Path::new("does/not/exist.toml")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}

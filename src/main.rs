use std::path::PathBuf;

use clap::Parser;

use mesh_viewer_core::{App, Result, ViewerConfig};

/// Textured, lit mesh viewer with an orbit camera.
#[derive(Clone, Debug, Parser)]
pub struct Args {
    /// TOML settings file. Built-in defaults are used when absent.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Mesh to display (`.obj`, or the `[points]`/`[indices]` text format).
    #[clap(long)]
    pub mesh: Option<PathBuf>,

    /// Base color texture.
    #[clap(long)]
    pub texture: Option<PathBuf>,

    /// WGSL shader to use instead of the built-in one.
    #[clap(long)]
    pub shader: Option<PathBuf>,
}

impl Args {
    pub fn load_config(&self) -> Result<ViewerConfig> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::open(path)?,
            None => ViewerConfig::default(),
        };
        if let Some(mesh) = &self.mesh {
            config.assets.mesh = mesh.clone();
        }
        if let Some(texture) = &self.texture {
            config.assets.texture = texture.clone();
        }
        if let Some(shader) = &self.shader {
            config.assets.shader = Some(shader.clone());
        }
        Ok(config)
    }

    pub fn run(&self) -> Result<()> {
        let config = self.load_config()?;
        log::debug!("{config:#?}");

        let event_loop = winit::event_loop::EventLoop::new()?;
        let mut app = App::new(config);
        event_loop.run_app(&mut app)?;

        match app.take_error() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

pub fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info,wgpu_core=warn,wgpu_hal=warn"),
    )
    .init();

    let args = Args::parse();
    if let Err(error) = args.run() {
        log::error!("{error}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_asset_paths() {
        let args = Args::parse_from(["mesh_viewer", "--mesh", "pyramid.txt", "--shader", "s.wgsl"]);
        let config = args.load_config().unwrap();
        assert_eq!(config.assets.mesh, PathBuf::from("pyramid.txt"));
        assert_eq!(config.assets.shader, Some(PathBuf::from("s.wgsl")));
        assert_eq!(
            config.assets.texture,
            ViewerConfig::default().assets.texture
        );
    }
}

//! # Errors
//!
//! Every fallible setup step of the viewer (opening files, decoding images and meshes,
//! acquiring the GPU adapter and device) reports through the [`Error`] enum below. The
//! binary logs the error and exits, so none of these are recovered from at runtime.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("io error while reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("image has no pixels")]
    EmptyImage,

    #[error("pixel buffer holds {got} bytes, expected {expected}")]
    PixelCount { expected: usize, got: usize },

    #[error("obj error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("obj mesh has no {0}")]
    MissingObjAttribute(&'static str),

    #[error("geometry line {line}: {message}")]
    Geometry { line: usize, message: String },

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to get adapter")]
    NoAdapter,

    #[error("surface is not supported by the adapter")]
    UnsupportedSurface,

    #[error(transparent)]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error(transparent)]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
}

impl Error {
    /// Wraps an io error with the path that was being read.
    pub fn io_ctx(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

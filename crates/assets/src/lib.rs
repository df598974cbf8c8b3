//! Model loading for the plane: glTF / GLB geometry import from disk or
//! HTTP, a download cache, and a built-in fallback mesh.
//!
//! The renderer consumes [`ModelMesh`] values, never files or URLs.

mod gltf;
mod model;
mod source;

pub use gltf::parse_model;
pub use model::ModelMesh;
pub use source::{DownloadCache, Fetch, FileFetch, HttpFetch, ModelSource};

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("unsupported resource uri: {0}")]
    UnsupportedUri(String),
    #[error("glTF parse error: {0}")]
    GltfParse(String),
}

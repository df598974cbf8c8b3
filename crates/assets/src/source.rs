use crate::AssetError;
use crate::gltf::parse_model;
use crate::model::ModelMesh;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Largest download accepted for a model or one of its buffers.
const MAX_DOWNLOAD_BYTES: u64 = 256 * 1024 * 1024;

/// Resolves resource URIs referenced from inside a model file.
pub trait Fetch {
    /// Fetch the bytes behind `uri`, relative to the model's location.
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, AssetError>;
}

/// Reads resources relative to a directory on disk.
#[derive(Debug, Clone)]
pub struct FileFetch {
    base: PathBuf,
}

impl FileFetch {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl Fetch for FileFetch {
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, AssetError> {
        reject_data_uri(uri)?;
        let path = self.base.join(percent_decode(uri));
        std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AssetError::NotFound(path.display().to_string()),
            _ => AssetError::Io(e),
        })
    }
}

/// Content cache for downloads, keyed by the SHA-256 of the URL.
#[derive(Debug, Clone)]
pub struct DownloadCache {
    dir: PathBuf,
}

impl DownloadCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, url: &str) -> PathBuf {
        let digest = Sha256::digest(url.as_bytes());
        let name: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        self.dir.join(name)
    }

    pub fn get(&self, url: &str) -> Option<Vec<u8>> {
        std::fs::read(self.path_for(url)).ok()
    }

    pub fn put(&self, url: &str, bytes: &[u8]) -> Result<(), AssetError> {
        std::fs::create_dir_all(&self.dir)?;
        // Write then rename so a crashed download never looks complete.
        let path = self.path_for(url);
        let tmp = path.with_extension("part");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Downloads resources relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpFetch {
    base_url: String,
    cache: Option<DownloadCache>,
}

impl HttpFetch {
    pub fn new(base_url: impl Into<String>, cache: Option<DownloadCache>) -> Self {
        Self {
            base_url: base_url.into(),
            cache,
        }
    }

    /// Resolve `uri` against the base URL's directory.
    pub fn resolve(&self, uri: &str) -> String {
        if uri.contains("://") {
            return uri.to_string();
        }
        if let Some(rest) = uri.strip_prefix('/') {
            // Host-relative: keep scheme and authority.
            let authority_end = self
                .base_url
                .find("://")
                .and_then(|s| self.base_url[s + 3..].find('/').map(|i| s + 3 + i))
                .unwrap_or(self.base_url.len());
            return format!("{}/{rest}", &self.base_url[..authority_end]);
        }
        let dir = match self.base_url.rfind('/') {
            Some(i) if i > self.base_url.find("://").map_or(0, |s| s + 2) => &self.base_url[..=i],
            _ => return format!("{}/{uri}", self.base_url),
        };
        format!("{dir}{uri}")
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        if let Some(bytes) = self.cache.as_ref().and_then(|c| c.get(url)) {
            tracing::debug!("cache hit for {url}");
            return Ok(bytes);
        }
        tracing::info!("downloading {url}");
        let mut response = ureq::get(url).call()?;
        let bytes = response
            .body_mut()
            .with_config()
            .limit(MAX_DOWNLOAD_BYTES)
            .read_to_vec()?;
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(url, &bytes) {
                tracing::warn!("failed to cache {url}: {e}");
            }
        }
        Ok(bytes)
    }
}

impl Fetch for HttpFetch {
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, AssetError> {
        reject_data_uri(uri)?;
        self.download(&self.resolve(uri))
    }
}

/// Where to get the plane model from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// The procedural paper dart shipped with the crate.
    Builtin,
    File(PathBuf),
    Url(String),
}

impl ModelSource {
    /// Interpret a config or command-line value.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.eq_ignore_ascii_case("builtin") {
            Self::Builtin
        } else if s.starts_with("http://") || s.starts_with("https://") {
            Self::Url(s.to_string())
        } else {
            Self::File(PathBuf::from(s))
        }
    }

    /// Load and parse the model. Downloads are cached in `cache_dir`.
    pub fn load(&self, cache_dir: Option<&Path>) -> Result<ModelMesh, AssetError> {
        let mesh = match self {
            Self::Builtin => ModelMesh::paper_plane(),
            Self::File(path) => {
                let bytes = std::fs::read(path).map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => {
                        AssetError::NotFound(path.display().to_string())
                    }
                    _ => AssetError::Io(e),
                })?;
                let base = path.parent().unwrap_or_else(|| Path::new("."));
                parse_model(&file_stem(&path.to_string_lossy()), &bytes, &FileFetch::new(base))?
            }
            Self::Url(url) => {
                let fetch = HttpFetch::new(url.clone(), cache_dir.map(DownloadCache::new));
                let bytes = fetch.download(url)?;
                parse_model(&file_stem(url), &bytes, &fetch)?
            }
        };
        tracing::info!(
            "loaded model '{}' from {}: {} vertices, {} triangles",
            mesh.name,
            self,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }
}

impl std::fmt::Display for ModelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Builtin => write!(f, "builtin"),
            Self::File(p) => write!(f, "{}", p.display()),
            Self::Url(u) => write!(f, "{u}"),
        }
    }
}

fn reject_data_uri(uri: &str) -> Result<(), AssetError> {
    if uri.starts_with("data:") {
        return Err(AssetError::UnsupportedUri(
            uri.chars().take(40).collect::<String>(),
        ));
    }
    Ok(())
}

fn file_stem(path: &str) -> String {
    let last = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let last = last.split(['?', '#']).next().unwrap_or(last);
    last.rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(last)
        .to_string()
}

/// Decode `%XX` escapes in a relative URI.
fn percent_decode(uri: &str) -> String {
    let bytes = uri.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(v) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(v);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

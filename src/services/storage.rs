//! Project file tree on disk.
//!
//! DESIGN
//! ======
//! Every project owns a directory
//! `<storage>/<country>/<city>/<clinic>/<department>/<doctor>/<patient>` with
//! three subfolders: `stl` (uploaded meshes), `sketches` (saved annotation
//! sets) and `tz` (technical task documents). The directory path is stored in
//! `projects.file_path_root`; the storage tree itself is served statically, so
//! a mesh URL is the public base URL plus the project path relative to the
//! storage root's parent.
//!
//! ERROR HANDLING
//! ==============
//! IO failures carry the path that failed. A missing `stl` folder is not an
//! error: the project simply has no meshes yet.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::path::{Component, Path, PathBuf};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::debug;
use viewer::scene::MeshFile;

pub const STL_DIR: &str = "stl";
pub const SKETCHES_DIR: &str = "sketches";
pub const TASKS_DIR: &str = "tz";
pub const PROJECT_SUBFOLDERS: [&str; 3] = [STL_DIR, SKETCHES_DIR, TASKS_DIR];

/// Everything except RFC 3986 unreserved characters is escaped in URL path segments.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

fn encode_segment(raw: &str) -> String {
    utf8_percent_encode(raw, PATH_SEGMENT).to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid path segment: {0:?}")]
    InvalidSegment(String),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io { path: path.to_path_buf(), source }
}

/// Folder names identifying one project in the tree. Empty values are
/// replaced with `Unknown_<Segment>`.
#[derive(Debug, Clone, Default)]
pub struct ProjectSegments {
    pub country: String,
    pub city: String,
    pub clinic: String,
    pub department: String,
    pub doctor: String,
    pub patient: String,
}

impl ProjectSegments {
    /// Segments in tree order, with placeholders applied.
    fn resolved(&self) -> Result<[String; 6], StorageError> {
        Ok([
            segment(&self.country, "Country")?,
            segment(&self.city, "City")?,
            segment(&self.clinic, "Clinic")?,
            segment(&self.department, "Department")?,
            segment(&self.doctor, "Doctor")?,
            segment(&self.patient, "Patient")?,
        ])
    }
}

fn segment(raw: &str, label: &str) -> Result<String, StorageError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(format!("Unknown_{label}"));
    }
    let mut components = Path::new(trimmed).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !trimmed.contains(['/', '\\']) => Ok(trimmed.to_string()),
        _ => Err(StorageError::InvalidSegment(raw.to_string())),
    }
}

/// Create the project directory and its subfolders under `root`. Existing
/// folders are kept.
///
/// # Errors
///
/// Returns [`StorageError::InvalidSegment`] for a segment that is not a
/// single plain folder name, or [`StorageError::Io`] if creation fails.
pub async fn project_path(root: &Path, segments: &ProjectSegments) -> Result<PathBuf, StorageError> {
    let mut path = root.to_path_buf();
    for part in segments.resolved()? {
        path.push(part);
    }
    for sub in PROJECT_SUBFOLDERS {
        let dir = path.join(sub);
        tokio::fs::create_dir_all(&dir).await.map_err(io_error(&dir))?;
    }
    debug!(path = %path.display(), "project tree ready");
    Ok(path)
}

/// Names of the `.stl` files (any case) in `<project_root>/stl`, sorted.
///
/// # Errors
///
/// Returns [`StorageError::Io`] if the folder exists but cannot be read.
pub async fn list_stl_files(project_root: &Path) -> Result<Vec<String>, StorageError> {
    let dir = project_root.join(STL_DIR);
    let mut entries = match tokio::fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(io_error(&dir)(e)),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_error(&dir))? {
        let file_type = entry.file_type().await.map_err(io_error(&entry.path()))?;
        if !file_type.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if has_stl_extension(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

fn has_stl_extension(name: &str) -> bool {
    Path::new(name).extension().is_some_and(|ext| ext.eq_ignore_ascii_case("stl"))
}

/// URL path of `project_root` as served: relative to the parent of
/// `storage_root`, so it starts with the storage folder name. Each segment
/// is percent-encoded.
///
/// A project root outside `storage_root` falls back to the part of the path
/// from the last component named like the storage folder, or an empty path.
#[must_use]
pub fn public_path(storage_root: &Path, project_root: &Path) -> String {
    let mount = storage_root.file_name();
    let tail: Vec<String> = match project_root.strip_prefix(storage_root) {
        Ok(rel) => mount.into_iter().chain(rel.iter()).map(|c| encode_segment(&c.to_string_lossy())).collect(),
        Err(_) => {
            let parts: Vec<_> = project_root.iter().collect();
            match parts.iter().rposition(|c| Some(*c) == mount) {
                Some(start) => parts[start..].iter().map(|c| encode_segment(&c.to_string_lossy())).collect(),
                None => Vec::new(),
            }
        }
    };
    tail.join("/")
}

/// Mesh descriptors for `names`, with ids `stl-<index>` in listing order.
/// `project_public_path` is expected already encoded, as [`public_path`] returns it.
#[must_use]
pub fn mesh_files(names: &[String], public_base_url: &str, project_public_path: &str) -> Vec<MeshFile> {
    names
        .iter()
        .enumerate()
        .map(|(index, name)| MeshFile {
            id: format!("stl-{index}"),
            name: name.clone(),
            url: format!("{public_base_url}/{project_public_path}/{STL_DIR}/{}", encode_segment(name)),
        })
        .collect()
}

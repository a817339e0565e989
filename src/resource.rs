//! Lookup of sibling resources (images) by container path.

use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Seek};
use std::path::Path;

use zip::ZipArchive;

use crate::error::Result;
use crate::util::extract_image_dimensions;

/// Read-only mapping from normalized container path to resource bytes.
///
/// Keys follow the scheme produced by [`crate::path::resolve`]:
/// slash-separated, relative to the container root, no leading slash.
pub trait ResourceTable {
    /// Raw bytes stored under `path`.
    fn get(&self, path: &str) -> Option<&[u8]>;

    /// Pixel size `(width, height)` of the image stored under `path`.
    ///
    /// The default implementation sniffs the image header. Tables that
    /// already know image metadata can answer without touching the bytes.
    fn image_size(&self, path: &str) -> Option<(u32, u32)> {
        self.get(path).and_then(extract_image_dimensions)
    }
}

impl<T: ResourceTable + ?Sized> ResourceTable for &T {
    fn get(&self, path: &str) -> Option<&[u8]> {
        (**self).get(path)
    }

    fn image_size(&self, path: &str) -> Option<(u32, u32)> {
        (**self).image_size(path)
    }
}

impl ResourceTable for HashMap<String, Vec<u8>> {
    fn get(&self, path: &str) -> Option<&[u8]> {
        HashMap::get(self, path).map(Vec::as_slice)
    }
}

impl ResourceTable for BTreeMap<String, Vec<u8>> {
    fn get(&self, path: &str) -> Option<&[u8]> {
        BTreeMap::get(self, path).map(Vec::as_slice)
    }
}

/// Height over width of the image at `path`, if it can be measured.
///
/// `None` when the resource is missing, isn't a recognized image, or reports
/// a zero dimension.
pub fn aspect_ratio<R: ResourceTable + ?Sized>(resources: &R, path: &str) -> Option<f32> {
    let (width, height) = resources.image_size(path)?;
    if width == 0 || height == 0 {
        return None;
    }
    Some(height as f32 / width as f32)
}

/// Owned resource table, usually filled from a ZIP container.
///
/// Entries keep their insertion order so callers can walk documents in the
/// order the archive stores them.
#[derive(Debug, Default, Clone)]
pub struct Resources {
    entries: HashMap<String, Vec<u8>>,
    order: Vec<String>,
}

impl Resources {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every file entry of a ZIP container on disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_zip(std::io::BufReader::new(file))
    }

    /// Load every file entry of a ZIP container.
    ///
    /// Directory entries are skipped. Entry names are normalized to the
    /// resolver's key scheme (forward slashes, no leading slash).
    pub fn from_zip<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut resources = Self::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().replace('\\', "/");
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            resources.insert(name.trim_start_matches('/'), data);
        }

        tracing::debug!(entries = resources.len(), "loaded container");
        Ok(resources)
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, path: impl Into<String>, data: Vec<u8>) {
        let path = path.into();
        if !self.entries.contains_key(&path) {
            self.order.push(path.clone());
        }
        self.entries.insert(path, data);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry paths in insertion order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Paths of entries that look like chapter markup (`.xhtml`, `.html`, `.htm`).
    pub fn documents(&self) -> impl Iterator<Item = &str> {
        self.paths().filter(|p| {
            let lower = p.to_ascii_lowercase();
            lower.ends_with(".xhtml") || lower.ends_with(".html") || lower.ends_with(".htm")
        })
    }
}

impl ResourceTable for Resources {
    fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path).map(Vec::as_slice)
    }
}

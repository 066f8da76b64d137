use crate::error::{CommonError, CommonResult};
use blockpage_document::PageDocument;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Where pages are read from and written to.
///
/// Pages are stored as camelCase JSON; block ids round-trip unchanged.
pub trait PageStorage {
    /// Check if a page exists
    fn exists(&self, path: &Path) -> bool;

    fn load(&self, path: &Path) -> CommonResult<PageDocument>;

    fn save(&mut self, path: &Path, page: &PageDocument) -> CommonResult<()>;
}

/// Parse a page from JSON text
pub fn page_from_json(source: &str) -> CommonResult<PageDocument> {
    Ok(serde_json::from_str(source)?)
}

/// Serialize a page to JSON text
pub fn page_to_json(page: &PageDocument, pretty: bool) -> CommonResult<String> {
    let json = if pretty {
        serde_json::to_string_pretty(page)?
    } else {
        serde_json::to_string(page)?
    };
    Ok(json)
}

/// Real file system storage
pub struct FileStorage {
    pub pretty: bool,
}

impl FileStorage {
    pub fn new() -> Self {
        Self { pretty: true }
    }
}

impl Default for FileStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl PageStorage for FileStorage {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn load(&self, path: &Path) -> CommonResult<PageDocument> {
        if !path.exists() {
            return Err(CommonError::NotFound(path.display().to_string()));
        }
        let source = std::fs::read_to_string(path)?;
        page_from_json(&source)
    }

    fn save(&mut self, path: &Path, page: &PageDocument) -> CommonResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, page_to_json(page, self.pretty)?)?;
        Ok(())
    }
}

/// In-memory storage for testing
pub struct MemoryStorage {
    pub pages: HashMap<PathBuf, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
        }
    }

    pub fn add_page(&mut self, path: PathBuf, json: impl Into<String>) {
        self.pages.insert(path, json.into());
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl PageStorage for MemoryStorage {
    fn exists(&self, path: &Path) -> bool {
        self.pages.contains_key(path)
    }

    fn load(&self, path: &Path) -> CommonResult<PageDocument> {
        let source = self
            .pages
            .get(path)
            .ok_or_else(|| CommonError::NotFound(path.display().to_string()))?;
        page_from_json(source)
    }

    fn save(&mut self, path: &Path, page: &PageDocument) -> CommonResult<()> {
        self.pages.insert(path.to_path_buf(), page_to_json(page, false)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockpage_document::{Block, BlockType};

    fn sample_page() -> PageDocument {
        let mut container = Block::new(BlockType::Container, "p-1");
        container.blocks.push(Block::new(BlockType::Text, "p-2"));
        PageDocument {
            blocks: vec![container],
            forms: vec![],
        }
    }

    #[test]
    fn test_memory_round_trip_keeps_ids() {
        let mut storage = MemoryStorage::new();
        let path = PathBuf::from("home.json");

        storage.save(&path, &sample_page()).unwrap();
        assert!(storage.exists(&path));

        let loaded = storage.load(&path).unwrap();
        assert_eq!(loaded, sample_page());
        assert_eq!(loaded.blocks[0].blocks[0].id, "p-2");
    }

    #[test]
    fn test_missing_page_is_not_found() {
        let storage = MemoryStorage::new();
        let err = storage.load(Path::new("nope.json")).unwrap_err();
        assert!(matches!(err, CommonError::NotFound(_)));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pages").join("home.json");
        let mut storage = FileStorage::new();

        storage.save(&path, &sample_page()).unwrap();
        assert!(storage.exists(&path));
        assert_eq!(storage.load(&path).unwrap(), sample_page());
    }

    #[test]
    fn test_malformed_json_is_reported() {
        let mut storage = MemoryStorage::new();
        storage.add_page(PathBuf::from("bad.json"), "{ not json");
        assert!(matches!(
            storage.load(Path::new("bad.json")),
            Err(CommonError::Json(_))
        ));
    }
}

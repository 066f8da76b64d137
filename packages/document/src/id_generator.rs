use crc32fast::Hasher;

/// Derive a short, stable seed from a document name using CRC32
pub fn document_seed(name: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(name.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential block id generator for one authoring session.
///
/// Ids look like `<seed>-<n>`. Ids already present in a loaded page must be
/// passed to [`IdGenerator::observe`] so the counter never hands them out
/// again.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u64,
}

impl IdGenerator {
    pub fn new(document_name: &str) -> Self {
        Self {
            seed: document_seed(document_name),
            count: 0,
        }
    }

    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Generate next sequential id
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    /// Advance past an id that already exists
    pub fn observe(&mut self, id: &str) {
        let Some(rest) = id.strip_prefix(self.seed.as_str()) else {
            return;
        };
        if let Some(n) = rest.strip_prefix('-').and_then(|n| n.parse::<u64>().ok()) {
            self.count = self.count.max(n);
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new("untitled")
    }
}

pub mod apply;
pub mod css;
pub mod init;
pub mod inspect;
pub mod resolve;

pub use apply::{apply, ApplyArgs};
pub use css::{css, CssArgs};
pub use init::{init, InitArgs};
pub use inspect::{inspect, InspectArgs};
pub use resolve::{resolve, ResolveArgs};

use crate::config::Config;
use anyhow::{Context, Result};
use blockpage_common::FileStorage;
use blockpage_editor::PageStore;
use std::path::{Path, PathBuf};

/// Page path relative to the working directory
pub(crate) fn page_path(cwd: &Path, page: &Path) -> PathBuf {
    if page.is_absolute() {
        page.to_path_buf()
    } else {
        cwd.join(page)
    }
}

pub(crate) fn open_page(cwd: &Path, page: &Path) -> Result<(Config, PathBuf, PageStore)> {
    let config = Config::load(cwd)?;
    let path = page_path(cwd, page);
    let storage = FileStorage::new();

    let store = PageStore::load(&storage, &path, config.store_options(&path))
        .with_context(|| format!("Cannot open page {}", path.display()))?;

    Ok((config, path, store))
}

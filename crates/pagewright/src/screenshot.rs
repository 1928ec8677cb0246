//! Screenshot files.
//!
//! Captures are written as `<random>.png` so repeated captures in one run
//! never overwrite each other.

use crate::driver::Driver;
use crate::page_object::PageSession;
use crate::result::{PagewrightError, PagewrightResult};
use crate::validation::random_string;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name for a new screenshot with a random stem of `len` characters
#[must_use]
pub fn screenshot_file_name(len: usize) -> String {
    format!("{}.png", random_string(len))
}

impl<D: Driver> PageSession<D> {
    /// Capture the viewport into the configured screenshot directory
    pub fn screenshot(&self) -> PagewrightResult<PathBuf> {
        let dir = self.config().screenshot_dir.clone();
        self.screenshot_into(&dir)
    }

    /// Capture the viewport into `dir`, creating it if needed
    pub fn screenshot_into(&self, dir: &Path) -> PagewrightResult<PathBuf> {
        let shot = self.driver().screenshot()?;
        if !shot.is_valid() {
            return Err(PagewrightError::Screenshot {
                message: "driver returned an empty image".to_string(),
            });
        }
        fs::create_dir_all(dir)?;
        let path = dir.join(screenshot_file_name(self.config().screenshot_name_length));
        fs::write(&path, &shot.data)?;
        info!(path = %path.display(), bytes = shot.size_bytes(), "screenshot saved");
        Ok(path)
    }
}

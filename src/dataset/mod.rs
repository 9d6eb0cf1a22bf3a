//! Dataset layout: one directory per case, each holding a main chart and the
//! candidate charts graded against it.
//!
//! ```text
//! dataset/
//!   case_01/
//!     main.png        <- reference ("main", or a name containing 主)
//!     sub_a.png       <- candidates: every other image
//!     sub_b.jpg
//!   case_02/
//!     ...
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use chart_trend::dataset::discover_cases;
//!
//! for case in discover_cases("./dataset")? {
//!     println!("{}: {} candidates", case.case_name, case.sub_paths.len());
//! }
//! ```

mod discovery;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use discovery::{discover_cases, find_main_image, find_sub_images};

/// Image extensions considered, in main-image search order.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// A reference chart and its candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseData {
    /// Name of the case directory.
    pub case_name: String,
    /// Reference image.
    pub main_path: PathBuf,
    /// Candidate images, sorted by path.
    pub sub_paths: Vec<PathBuf>,
}

impl CaseData {
    /// Create a case from already identified paths.
    #[must_use]
    pub fn new(
        case_name: impl Into<String>,
        main_path: impl Into<PathBuf>,
        sub_paths: Vec<PathBuf>,
    ) -> Self {
        Self {
            case_name: case_name.into(),
            main_path: main_path.into(),
            sub_paths,
        }
    }

    /// Number of candidate images.
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.sub_paths.len()
    }
}

/// File name of a path, or an empty string.
#[must_use]
pub fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|s| s.to_str()).unwrap_or("")
}

/// File name without its extension, or an empty string.
#[must_use]
pub fn file_stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("")
}

// src/diagnostics.rs
// Required-asset checks and placeholder synthesis

use std::fmt;
use std::path::{Path, PathBuf};

/// Assets the site is expected to reference, relative to the document root.
/// `preview.json` can override this list via `requiredAssets`.
pub const DEFAULT_REQUIRED_ASSETS: &[&str] = &[
    "static/images/work1.jpg",
    "static/images/work2.jpg",
    "static/images/work3.jpg",
    "static/images/employee1.jpg",
    "static/images/employee2.jpg",
    "static/images/employee3.jpg",
    "static/images/about.jpg",
    "static/images/hero-bg.jpg",
    "static/videos/demo.mp4",
];

#[cfg(feature = "placeholders")]
const VIDEO_PLACEHOLDER_PATH: &str = "static/videos/demo.mp4";
#[cfg(feature = "placeholders")]
const VIDEO_PLACEHOLDER_NOTE: &str =
    "Placeholder for demo.mp4. Replace this file with real footage.\n";

#[cfg(feature = "placeholders")]
struct PlaceholderSpec {
    path: &'static str,
    width: u32,
    height: u32,
}

#[cfg(feature = "placeholders")]
const PLACEHOLDER_IMAGES: &[PlaceholderSpec] = &[
    PlaceholderSpec { path: "static/images/work1.jpg", width: 800, height: 600 },
    PlaceholderSpec { path: "static/images/work2.jpg", width: 800, height: 600 },
    PlaceholderSpec { path: "static/images/work3.jpg", width: 800, height: 600 },
    PlaceholderSpec { path: "static/images/employee1.jpg", width: 600, height: 600 },
    PlaceholderSpec { path: "static/images/employee2.jpg", width: 600, height: 600 },
    PlaceholderSpec { path: "static/images/employee3.jpg", width: 600, height: 600 },
    PlaceholderSpec { path: "static/images/about.jpg", width: 800, height: 600 },
    PlaceholderSpec { path: "static/images/hero-bg.jpg", width: 1200, height: 800 },
];

#[cfg(feature = "placeholders")]
const PLACEHOLDER_FILL: [u8; 3] = [73, 109, 137];

pub fn default_required_assets() -> Vec<String> {
    DEFAULT_REQUIRED_ASSETS
        .iter()
        .map(|asset| asset.to_string())
        .collect()
}

/// Scan the document root for required assets that are not on disk.
pub fn missing_assets(root: &Path, required: &[String]) -> Vec<String> {
    required
        .iter()
        .filter(|relative| !root.join(relative.as_str()).exists())
        .cloned()
        .collect()
}

#[derive(Debug)]
pub enum PlaceholderError {
    /// Built without the `placeholders` feature.
    Unavailable,
    Image(String),
    IoError(std::io::Error),
}

impl fmt::Display for PlaceholderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceholderError::Unavailable => write!(
                f,
                "Placeholder synthesis is not compiled in; rebuild with the `placeholders` feature"
            ),
            PlaceholderError::Image(msg) => write!(f, "Failed to encode placeholder image: {}", msg),
            PlaceholderError::IoError(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for PlaceholderError {}

impl From<std::io::Error> for PlaceholderError {
    fn from(err: std::io::Error) -> Self {
        PlaceholderError::IoError(err)
    }
}

/// Create a sample file for every missing placeholder image, plus a stub
/// video. Existing files are never touched. Returns the files created.
#[cfg(feature = "placeholders")]
pub fn synthesize_placeholders(root: &Path) -> Result<Vec<PathBuf>, PlaceholderError> {
    use image::{Rgb, RgbImage};

    std::fs::create_dir_all(root.join("static/images"))?;
    std::fs::create_dir_all(root.join("static/videos"))?;

    let mut created = Vec::new();

    for spec in PLACEHOLDER_IMAGES {
        let path = root.join(spec.path);
        if path.exists() {
            continue;
        }

        let img = RgbImage::from_pixel(spec.width, spec.height, Rgb(PLACEHOLDER_FILL));
        img.save(&path)
            .map_err(|err| PlaceholderError::Image(err.to_string()))?;
        created.push(path);
    }

    let video_path = root.join(VIDEO_PLACEHOLDER_PATH);
    if !video_path.exists() {
        std::fs::write(&video_path, VIDEO_PLACEHOLDER_NOTE)?;
        created.push(video_path);
    }

    Ok(created)
}

#[cfg(not(feature = "placeholders"))]
pub fn synthesize_placeholders(_root: &Path) -> Result<Vec<PathBuf>, PlaceholderError> {
    Err(PlaceholderError::Unavailable)
}

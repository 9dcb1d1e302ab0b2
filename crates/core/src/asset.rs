//! Embeds images referenced from page prose.

use std::io;
use std::path::{Path, PathBuf};

use base64::{Engine as _, engine::general_purpose};
use serde::Serialize;

use crate::error::ParseErrorKind;
use crate::source::FileSource;

/// A binary file embedded alongside its chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    /// File name as referenced in the markdown.
    pub name: String,
    /// Base64 (standard alphabet, padded) file contents.
    #[serde(rename = "image")]
    pub content: String,
}

/// True when the line holds a markdown image reference.
pub fn is_image_reference(line: &str) -> bool {
    line.contains("![")
}

/// File name between the first `(` and the `)` ending the line.
///
/// Returns `None` when the reference is not a single well-formed line.
pub fn image_file_name(line: &str) -> Option<&str> {
    let (_, after_paren) = line.split_once('(')?;
    let name = after_paren.trim_end().strip_suffix(')')?.trim();
    (!name.is_empty()).then_some(name)
}

/// Load the image referenced by `line` relative to `base_path`.
pub fn resolve_asset(
    line: &str,
    base_path: &Path,
    files: &dyn FileSource,
) -> Result<Asset, ParseErrorKind> {
    let Some(name) = image_file_name(line) else {
        let reference = line.split_once('(').map_or(line, |(_, rest)| rest).trim();
        return Err(ParseErrorKind::AssetRead {
            path: PathBuf::from(reference),
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("malformed image reference `{}`", line.trim()),
            ),
        });
    };

    let path = base_path.join(name);
    let bytes = files
        .read(&path)
        .map_err(|source| ParseErrorKind::AssetRead { path, source })?;

    log::debug!("embedded asset {} ({} bytes)", name, bytes.len());
    Ok(Asset {
        name: name.to_string(),
        content: general_purpose::STANDARD.encode(bytes),
    })
}

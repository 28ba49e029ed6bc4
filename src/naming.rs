use std::fmt;
use std::path::PathBuf;

/// Characters removed from layer and group names.
const STRIPPED_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Characters replaced by an underscore in layer and group names.
const UNDERSCORED_CHARS: &[char] = &[' ', '#', '&', '@'];

/// Extension of every exported file
pub const EXPORT_EXTENSION: &str = "png";

/// Converts a layer or group name into a filesystem-safe path segment.
/// Strips characters that are invalid in file names, replaces spaces and
/// `#`, `&`, `@` with underscores, and lower-cases the result
pub fn sanitize_layer_name(name: &str) -> String {
    name.chars()
        .filter(|c| !STRIPPED_CHARS.contains(c))
        .map(|c| if UNDERSCORED_CHARS.contains(&c) { '_' } else { c })
        .collect::<String>()
        .to_lowercase()
}

/// Builds the exported file name for a layer: `<prefix><sanitized name>.png`.
/// The prefix is used as given.
pub fn export_file_name(prefix: &str, layer_name: &str) -> String {
    format!(
        "{}{}.{}",
        prefix,
        sanitize_layer_name(layer_name),
        EXPORT_EXTENSION
    )
}

/// Position of a layer inside the group hierarchy, as sanitized group names
/// from the image root downwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupPath {
    segments: Vec<String>,
}

impl GroupPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path one level deeper, named after `group_name`
    pub fn descend(&self, group_name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(sanitize_layer_name(group_name));
        Self { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Directory relative to the output directory
    pub fn to_relative_dir(&self) -> PathBuf {
        self.segments.iter().collect()
    }
}

impl fmt::Display for GroupPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

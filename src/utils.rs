//! Common utility functions shared across the codebase.

use std::path::{Component, Path, PathBuf};

use convert_case::{Case, Casing};

/// Converts a field identifier into its default external (attribute) name.
///
/// # Examples
///
/// ```
/// use wcscan::utils::kebab_case;
///
/// assert_eq!(kebab_case("firstName"), "first-name");
/// assert_eq!(kebab_case("label"), "label");
/// ```
pub fn kebab_case(name: &str) -> String {
    name.to_case(Case::Kebab)
}

/// Lowercases the first character, leaving the rest untouched.
///
/// ```
/// use wcscan::utils::lower_first;
///
/// assert_eq!(lower_first("SaveDraft"), "saveDraft");
/// assert_eq!(lower_first(""), "");
/// ```
pub fn lower_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lexically normalizes a path, folding `.` and `..` components.
///
/// No filesystem access; symlinks are not resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !result.pop() {
                    result.push("..");
                }
            }
            other => result.push(other.as_os_str()),
        }
    }
    result
}

/// Path of `path` relative to `root`, always `/`-separated.
///
/// Falls back to the full path when `path` is outside `root`.
pub fn relative_display(root: &Path, path: &Path) -> String {
    let Ok(relative) = path.strip_prefix(root) else {
        return path.to_string_lossy().to_string();
    };
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

//! Module specifier to file path candidates.
//!
//! Only relative specifiers are resolved; bare package imports are treated as
//! external and never followed.

use std::path::{Path, PathBuf};

use crate::utils::normalize_path;

/// Extensions tried, in order, when a specifier omits one.
const MODULE_EXTENSIONS: &[&str] = &[
    "ts", "tsx", "d.ts", "js", "jsx", "mts", "cts", "mjs", "cjs",
];

pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

fn specifier_base(from_file: &Path, specifier: &str) -> Option<PathBuf> {
    if !is_relative_specifier(specifier) {
        return None;
    }
    let base_dir = from_file.parent()?;
    Some(normalize_path(&base_dir.join(specifier)))
}

fn with_appended_extension(path: &Path, ext: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_owned();
    raw.push(".");
    raw.push(ext);
    PathBuf::from(raw)
}

/// Candidate files for a relative module specifier, in lookup order:
/// the exact path, the path with each known extension appended, then
/// `index.*` inside it.
///
/// Extensions are appended rather than substituted so that `./button.element`
/// looks for `button.element.ts`.
pub fn module_candidates(from_file: &Path, specifier: &str) -> Vec<PathBuf> {
    let Some(base) = specifier_base(from_file, specifier) else {
        return Vec::new();
    };

    let mut candidates = Vec::with_capacity(1 + MODULE_EXTENSIONS.len() * 2);
    candidates.push(base.clone());
    for ext in MODULE_EXTENSIONS {
        candidates.push(with_appended_extension(&base, ext));
    }
    for ext in MODULE_EXTENSIONS {
        candidates.push(base.join(format!("index.{}", ext)));
    }
    candidates
}

/// Broader candidate list used when following an import by path alone.
///
/// Adds the TypeScript source counterparts of emitted-JS specifiers
/// (`./button.js` → `./button.ts`, `./button.tsx`).
pub fn fallback_candidates(from_file: &Path, specifier: &str) -> Vec<PathBuf> {
    let mut candidates = module_candidates(from_file, specifier);
    let Some(base) = specifier_base(from_file, specifier) else {
        return candidates;
    };

    let substitutes: &[&str] = match base.extension().and_then(|e| e.to_str()) {
        Some("js") | Some("jsx") => &["ts", "tsx", "d.ts"],
        Some("mjs") => &["mts", "d.mts"],
        Some("cjs") => &["cts", "d.cts"],
        _ => &[],
    };
    for ext in substitutes {
        let candidate = base.with_extension(ext);
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_bare_specifiers_have_no_candidates() {
        let from = Path::new("/project/src/app.ts");
        assert!(module_candidates(from, "lit").is_empty());
        assert!(fallback_candidates(from, "@scope/pkg").is_empty());
    }

    #[test]
    fn test_module_candidates_order() {
        let candidates = module_candidates(Path::new("/project/src/app.ts"), "./button");
        assert_eq!(candidates[0], PathBuf::from("/project/src/button"));
        assert_eq!(candidates[1], PathBuf::from("/project/src/button.ts"));
        assert_eq!(candidates[2], PathBuf::from("/project/src/button.tsx"));
        assert!(candidates.contains(&PathBuf::from("/project/src/button/index.ts")));
    }

    #[test]
    fn test_parent_directory_specifier_is_normalized() {
        let candidates =
            module_candidates(Path::new("/project/src/app/main.ts"), "../lib/types");
        assert_eq!(candidates[1], PathBuf::from("/project/src/lib/types.ts"));
    }

    #[test]
    fn test_dotted_file_names_keep_their_suffix() {
        let candidates = module_candidates(Path::new("/p/a.ts"), "./button.element");
        assert!(candidates.contains(&PathBuf::from("/p/button.element.ts")));
    }

    #[test]
    fn test_fallback_maps_js_specifiers_to_sources() {
        let candidates = fallback_candidates(Path::new("/p/src/index.ts"), "./button.js");
        assert!(candidates.contains(&PathBuf::from("/p/src/button.ts")));
        assert!(candidates.contains(&PathBuf::from("/p/src/button.tsx")));
        assert!(
            !module_candidates(Path::new("/p/src/index.ts"), "./button.js")
                .contains(&PathBuf::from("/p/src/button.ts"))
        );
    }
}

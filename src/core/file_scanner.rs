use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use glob::{Pattern, glob};
use walkdir::WalkDir;

use crate::config::TEST_FILE_PATTERNS;

/// Extensions of files that may hold component sources.
pub const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mts", "cts", "mjs", "cjs"];

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal directory paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Result of scanning files.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Absolute source paths in lexicographic order.
    pub files: Vec<PathBuf>,
    pub skipped_count: usize,
}

pub fn scan_files(
    base_dir: &Path,
    includes: &[String],
    ignore_patterns: &[String],
    ignore_test_files: bool,
) -> ScanResult {
    let mut files: BTreeSet<PathBuf> = BTreeSet::new();
    let mut skipped_count = 0;

    let mut literal_ignore_paths: Vec<PathBuf> = Vec::new();
    let mut glob_patterns: Vec<Pattern> = Vec::new();

    for p in ignore_patterns {
        if is_glob_pattern(p) {
            match Pattern::new(p) {
                Ok(pattern) => glob_patterns.push(pattern),
                Err(e) => tracing::warn!("Invalid ignore pattern '{}': {}", p, e),
            }
        } else {
            literal_ignore_paths.push(base_dir.join(p));
        }
    }

    if ignore_test_files {
        for p in TEST_FILE_PATTERNS {
            if let Ok(pattern) = Pattern::new(p) {
                glob_patterns.push(pattern);
            }
        }
    }

    let dirs_to_scan: Vec<PathBuf> = if includes.is_empty() {
        vec![base_dir.to_path_buf()]
    } else {
        let mut paths = Vec::new();
        for inc in includes {
            if is_glob_pattern(inc) {
                let full_pattern = base_dir.join(inc);
                match glob(&full_pattern.to_string_lossy()) {
                    Ok(entries) => paths.extend(entries.flatten().filter(|e| e.is_dir())),
                    Err(e) => tracing::warn!("Invalid glob pattern '{}': {}", inc, e),
                }
            } else {
                let path = base_dir.join(inc);
                if path.exists() {
                    paths.push(path);
                } else {
                    tracing::warn!("Include path does not exist: {}", path.display());
                }
            }
        }
        paths
    };

    for dir in dirs_to_scan {
        let walker = WalkDir::new(dir)
            .into_iter()
            .filter_entry(|e| e.file_name() != "node_modules");
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    skipped_count += 1;
                    tracing::warn!("Cannot access path: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            let path_str = path.to_string_lossy();

            if literal_ignore_paths
                .iter()
                .any(|ignore_path| path.starts_with(ignore_path))
            {
                continue;
            }

            if glob_patterns.iter().any(|p| p.matches(&path_str)) {
                continue;
            }

            if path.is_file() && is_scannable_file(path) {
                files.insert(path.to_path_buf());
            }
        }
    }

    tracing::debug!(count = files.len(), "scanned source files");

    ScanResult {
        files: files.into_iter().collect(),
        skipped_count,
    }
}

pub fn is_scannable_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Declaration files and `*.generated.*` outputs are loaded for type lookup
/// but never searched for registrations.
pub fn is_generated_file(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    name.ends_with(".d.ts")
        || name.ends_with(".d.mts")
        || name.ends_with(".d.cts")
        || name.contains(".generated.")
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    fn names(result: &ScanResult, base: &Path) -> Vec<String> {
        result
            .files
            .iter()
            .map(|f| crate::utils::relative_display(base, f))
            .collect()
    }

    #[test]
    fn test_scan_source_files_sorted() {
        let dir = tempdir().unwrap();
        let dir_path = dir.path();

        File::create(dir_path.join("zeta.ts")).unwrap();
        File::create(dir_path.join("alpha.tsx")).unwrap();
        File::create(dir_path.join("legacy.mjs")).unwrap();
        File::create(dir_path.join("style.css")).unwrap();

        let result = scan_files(dir_path, &[], &[], false);

        assert_eq!(
            names(&result, dir_path),
            vec!["alpha.tsx", "legacy.mjs", "zeta.ts"]
        );
    }

    #[test]
    fn test_scan_always_skips_node_modules() {
        let dir = tempdir().unwrap();
        let dir_path = dir.path();

        let node_modules = dir_path.join("node_modules").join("lit");
        fs::create_dir_all(&node_modules).unwrap();
        File::create(node_modules.join("index.js")).unwrap();
        File::create(dir_path.join("app.ts")).unwrap();

        let result = scan_files(dir_path, &[], &[], false);

        assert_eq!(names(&result, dir_path), vec!["app.ts"]);
    }

    #[test]
    fn test_scan_with_includes() {
        let dir = tempdir().unwrap();
        let dir_path = dir.path();

        let src = dir_path.join("src");
        fs::create_dir(&src).unwrap();
        File::create(src.join("app.tsx")).unwrap();

        let lib = dir_path.join("lib");
        fs::create_dir(&lib).unwrap();
        File::create(lib.join("utils.ts")).unwrap();

        let result = scan_files(dir_path, &["src".to_owned()], &[], false);

        assert_eq!(names(&result, dir_path), vec!["src/app.tsx"]);
    }

    #[test]
    fn test_scan_deduplicates_overlapping_includes() {
        let dir = tempdir().unwrap();
        let dir_path = dir.path();

        let components = dir_path.join("src").join("components");
        fs::create_dir_all(&components).unwrap();
        File::create(components.join("Button.tsx")).unwrap();

        let result = scan_files(
            dir_path,
            &["src".to_owned(), "src/components".to_owned()],
            &[],
            false,
        );

        assert_eq!(result.files.len(), 1);
    }

    #[test]
    fn test_scan_with_glob_include() {
        let dir = tempdir().unwrap();
        let dir_path = dir.path();

        let elements = dir_path.join("packages").join("elements");
        fs::create_dir_all(&elements).unwrap();
        File::create(elements.join("button.ts")).unwrap();

        let docs = dir_path.join("docs");
        fs::create_dir(&docs).unwrap();
        File::create(docs.join("demo.ts")).unwrap();

        let result = scan_files(dir_path, &["packages/*".to_owned()], &[], false);

        assert_eq!(names(&result, dir_path), vec!["packages/elements/button.ts"]);
    }

    #[test]
    fn test_scan_ignores_mixed_patterns() {
        let dir = tempdir().unwrap();
        let dir_path = dir.path();

        let components = dir_path.join("src").join("components");
        fs::create_dir_all(&components).unwrap();
        File::create(components.join("card.ts")).unwrap();
        File::create(components.join("card.stories.ts")).unwrap();

        let vendor = dir_path.join("src").join("vendor");
        fs::create_dir_all(&vendor).unwrap();
        File::create(vendor.join("shim.js")).unwrap();

        let result = scan_files(
            dir_path,
            &[],
            &["src/vendor".to_owned(), "**/*.stories.ts".to_owned()],
            false,
        );

        assert_eq!(names(&result, dir_path), vec!["src/components/card.ts"]);
    }

    #[test]
    fn test_scan_ignores_test_files() {
        let dir = tempdir().unwrap();
        let dir_path = dir.path();

        File::create(dir_path.join("card.ts")).unwrap();
        File::create(dir_path.join("card.test.ts")).unwrap();
        File::create(dir_path.join("card.spec.js")).unwrap();

        let result = scan_files(dir_path, &[], &[], true);
        assert_eq!(names(&result, dir_path), vec!["card.ts"]);

        let result = scan_files(dir_path, &[], &[], false);
        assert_eq!(result.files.len(), 3);
    }

    #[test]
    fn test_is_scannable_file() {
        assert!(is_scannable_file(Path::new("app.tsx")));
        assert!(is_scannable_file(Path::new("app.cts")));
        assert!(is_scannable_file(Path::new("types.d.ts")));
        assert!(!is_scannable_file(Path::new("style.css")));
        assert!(!is_scannable_file(Path::new("package.json")));
    }

    #[test]
    fn test_is_generated_file() {
        assert!(is_generated_file(Path::new("src/types.d.ts")));
        assert!(is_generated_file(Path::new("src/api.generated.ts")));
        assert!(!is_generated_file(Path::new("src/button.ts")));
        assert!(!is_generated_file(Path::new("src/generated.ts")));
    }

    #[test]
    fn test_is_glob_pattern() {
        assert!(is_glob_pattern("src/*"));
        assert!(is_glob_pattern("file?.ts"));
        assert!(!is_glob_pattern("app/[locale]"));
    }
}

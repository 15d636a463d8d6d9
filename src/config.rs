use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = ".wcscanrc.json";

pub const TEST_FILE_PATTERNS: &[&str] = &[
    "**/*.test.tsx",
    "**/*.test.ts",
    "**/*.test.jsx",
    "**/*.test.js",
    "**/*.spec.tsx",
    "**/*.spec.ts",
    "**/*.spec.jsx",
    "**/*.spec.js",
    "**/*.stories.tsx",
    "**/*.stories.ts",
    "**/__tests__/**",
];

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directories (or glob patterns) to scan, relative to the project root.
    /// Empty means the whole root.
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default = "default_ignores")]
    pub ignores: Vec<String>,
    #[serde(default = "default_ignore_test_files")]
    pub ignore_test_files: bool,
    /// Explicit build-config path; skips candidate discovery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_config: Option<String>,
    #[serde(default)]
    pub conventions: Conventions,
}

/// Identifiers the extractors recognize.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Conventions {
    /// Bare registration functions, in addition to `customElements.define`.
    pub registration_functions: Vec<String>,
    /// Calls that wrap an implementation into an element (implementation first).
    pub wrapper_factories: Vec<String>,
    /// Class decorators carrying a tag name (`@customElement('x')`, `@Component({ tag })`).
    pub element_decorators: Vec<String>,
    /// Field decorators that mark a property.
    pub property_decorators: Vec<String>,
    /// Factory calls that declare a reactive property (`input<T>()`, `input.required<T>()`).
    pub property_factories: Vec<String>,
    /// Shape members that are never properties.
    pub reserved_shape_members: Vec<String>,
    /// Prefix of callback properties that describe events.
    pub event_callback_prefix: String,
    /// Methods that dispatch an event value.
    pub dispatch_methods: Vec<String>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            registration_functions: strings(&["define"]),
            wrapper_factories: strings(&[
                "createCustomElement",
                "r2wc",
                "reactToWebComponent",
                "defineCustomElement",
            ]),
            element_decorators: strings(&["customElement", "Component"]),
            property_decorators: strings(&["property", "Prop", "Input"]),
            property_factories: strings(&["input", "model"]),
            reserved_shape_members: strings(&["children", "key", "ref"]),
            event_callback_prefix: "on".to_string(),
            dispatch_methods: strings(&["dispatchEvent"]),
        }
    }
}

impl Conventions {
    pub fn is_wrapper_factory(&self, name: &str) -> bool {
        self.wrapper_factories.iter().any(|f| f == name)
    }

    pub fn is_property_decorator(&self, name: &str) -> bool {
        self.property_decorators.iter().any(|d| d == name)
    }

    pub fn is_property_factory(&self, name: &str) -> bool {
        self.property_factories.iter().any(|f| f == name)
    }

    pub fn is_reserved_member(&self, name: &str) -> bool {
        self.reserved_shape_members.iter().any(|m| m == name)
    }

    pub fn is_dispatch_method(&self, name: &str) -> bool {
        self.dispatch_methods.iter().any(|m| m == name)
    }

    pub fn is_registration_function(&self, name: &str) -> bool {
        self.registration_functions.iter().any(|f| f == name)
    }

    pub fn is_element_decorator(&self, name: &str) -> bool {
        self.element_decorators.iter().any(|d| d == name)
    }

    /// Strip the callback prefix from `onSaveDraft`-style names.
    ///
    /// Returns `None` unless the prefix is followed by an uppercase letter.
    pub fn strip_callback_prefix<'a>(&self, name: &'a str) -> Option<&'a str> {
        let rest = name.strip_prefix(self.event_callback_prefix.as_str())?;
        rest.chars()
            .next()
            .is_some_and(|c| c.is_uppercase())
            .then_some(rest)
    }
}

fn default_ignores() -> Vec<String> {
    strings(&["**/node_modules/**", "**/dist/**", "**/build/**"])
}

fn default_ignore_test_files() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            includes: Vec::new(),
            ignores: default_ignores(),
            ignore_test_files: default_ignore_test_files(),
            build_config: None,
            conventions: Conventions::default(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error if any glob patterns in `ignores` or `includes` are invalid.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        // Patterns without wildcards are literal directory paths.
        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }

        if self.conventions.event_callback_prefix.is_empty() {
            anyhow::bail!("'conventions.eventCallbackPrefix' must not be empty");
        }

        Ok(())
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}

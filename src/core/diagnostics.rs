//! Diagnostics collected during analysis.
//!
//! Nothing in the core pipeline aborts on a malformed registration, an
//! unresolved symbol or an unreadable build config. Each such event becomes a
//! [`Diagnostic`] pushed into a [`Diagnostics`] sink, which also forwards it to
//! `tracing` so library users get the same information through their logger.

use serde::Serialize;

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Registration call with a missing or non-literal tag name, or an
    /// implementation argument that is not a reference.
    MalformedRegistration,
    /// Implementation declaration not found locally, via imports, or via
    /// the path-based fallback.
    UnresolvedSymbol,
    /// A build config exists but could not be parsed.
    UnparsableConfig,
    /// No build config was found.
    MissingBuildConfig,
    /// A source file could not be read or parsed.
    ParseError,
    /// Two registrations used the same tag name; the later one wins.
    DuplicateTagName,
    /// Property or event extraction failed for one component.
    ExtractionFailed,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticKind::MalformedRegistration => write!(f, "malformed-registration"),
            DiagnosticKind::UnresolvedSymbol => write!(f, "unresolved-symbol"),
            DiagnosticKind::UnparsableConfig => write!(f, "unparsable-config"),
            DiagnosticKind::MissingBuildConfig => write!(f, "missing-build-config"),
            DiagnosticKind::ParseError => write!(f, "parse-error"),
            DiagnosticKind::DuplicateTagName => write!(f, "duplicate-tag-name"),
            DiagnosticKind::ExtractionFailed => write!(f, "extraction-failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Diagnostic {
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            message: message.into(),
            file: None,
            line: None,
        }
    }

    pub fn info(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            ..Self::warning(kind, message)
        }
    }

    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

/// Append-only sink for diagnostics.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        let location = match (&diagnostic.file, diagnostic.line) {
            (Some(file), Some(line)) => format!("{}:{}", file, line),
            (Some(file), None) => file.clone(),
            _ => String::new(),
        };
        match diagnostic.severity {
            Severity::Warning => tracing::warn!(
                kind = %diagnostic.kind,
                location = %location,
                "{}",
                diagnostic.message
            ),
            Severity::Info => tracing::info!(
                kind = %diagnostic.kind,
                location = %location,
                "{}",
                diagnostic.message
            ),
        }
        self.entries.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

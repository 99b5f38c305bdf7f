//! Data-shape problems reported while processing continues.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: Level,
    /// Dotted path of the offending feature or browser.
    pub path: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Diagnostic {
    pub fn new(level: Level, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            path: path.into(),
            message: message.into(),
            hint: None,
        }
    }

    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Level::Error, path, message)
    }

    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Level::Warning, path, message)
    }

    pub fn info(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Level::Info, path, message)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.path, self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, " ({hint})")?;
        }
        Ok(())
    }
}

/// Receives diagnostics from passes that must not stop on bad data.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Forwards every diagnostic to `tracing` and counts them per level.
#[derive(Debug, Default)]
pub struct TracingSink {
    pub errors: usize,
    pub warnings: usize,
}

impl DiagnosticSink for TracingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.level {
            Level::Error => {
                self.errors += 1;
                tracing::error!(path = %diagnostic.path, "{}", diagnostic.message);
            }
            Level::Warning => {
                self.warnings += 1;
                tracing::warn!(path = %diagnostic.path, "{}", diagnostic.message);
            }
            Level::Info => tracing::info!(path = %diagnostic.path, "{}", diagnostic.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<Diagnostic> = Vec::new();
        sink.report(Diagnostic::warning("api.Foo", "something odd"));
        sink.report(Diagnostic::error("api.Bar", "broken").with_hint("fix it"));

        assert_eq!(sink.len(), 2);
        assert_eq!(sink[1].to_string(), "[error] api.Bar: broken (fix it)");
        assert!(sink[1].level > sink[0].level);
    }

    #[test]
    fn test_tracing_sink_counts() {
        let mut sink = TracingSink::default();
        sink.report(Diagnostic::warning("a", "w"));
        sink.report(Diagnostic::error("b", "e"));
        sink.report(Diagnostic::info("c", "i"));
        assert_eq!((sink.errors, sink.warnings), (1, 1));
    }
}

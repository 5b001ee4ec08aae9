use log::debug;
use std::path::Path;

use crate::error::{read_non_empty, Result, TfimportError};
use crate::types::ResourceRecord;

/// The module/resource patterns selecting which resources to import
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatternSet {
    patterns: Vec<String>,
}

impl PatternSet {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses one pattern per line, ignoring blank lines
    pub fn parse(content: &str) -> Self {
        Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty()),
        )
    }

    /// Loads a pattern file. A file without any pattern is `EmptyPatterns`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_non_empty(path).map_err(|e| match e {
            TfimportError::EmptyFile(path) => TfimportError::EmptyPatterns(path),
            other => other,
        })?;
        let set = Self::parse(&content);
        debug!("Loaded {} patterns from {:?}", set.len(), path);
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }

    /// Returns the first pattern that is a substring of `type.name`, or a
    /// prefix of the resource's module path
    pub fn matching(&self, resource: &ResourceRecord) -> Option<&str> {
        let type_name = resource.type_name();
        self.iter().find(|&pattern| {
            type_name.contains(pattern)
                || (!resource.module_path.is_empty() && resource.module_path.starts_with(pattern))
        })
    }

    pub fn matches(&self, resource: &ResourceRecord) -> bool {
        self.matching(resource).is_some()
    }
}

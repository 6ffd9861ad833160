//! Type tables
//!
//! A type table maps API-level type names to low-level representation types,
//! one mapping per line:
//!
//! ```text
//! # API type, native type
//! GLenum, uint32
//! GLstring, byte*     # already a pointer
//! ```
//!
//! The left column must be a plain base name. Rows whose left side carries
//! indirection are skipped. A name may appear only once per table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{BindError, Result};
use crate::types::TypeDescriptor;

/// Comment marker for type tables
const COMMENT: char = '#';

/// Read-only mapping from API type names to low-level descriptors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMap {
    entries: BTreeMap<String, TypeDescriptor>,
}

impl TypeMap {
    /// Build a map from explicit entries
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, TypeDescriptor)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, descriptor)| (name.into(), descriptor))
                .collect(),
        }
    }

    /// Parse a type table
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = BTreeMap::new();
        let mut defined_on: BTreeMap<String, usize> = BTreeMap::new();

        for (idx, raw_line) in text.lines().enumerate() {
            let line_number = idx + 1;

            let line = match raw_line.find(COMMENT) {
                Some(comment) => &raw_line[..comment],
                None => raw_line,
            };
            if line.trim().is_empty() {
                continue;
            }

            // A whitespace-only field still counts as a column
            let fields: Vec<&str> = line
                .split(',')
                .filter(|field| !field.is_empty())
                .map(str::trim)
                .collect();
            let [source, target] = fields.as_slice() else {
                return Err(BindError::MalformedTypeMap {
                    line: line_number,
                    columns: fields.len(),
                });
            };

            let from = parse_column(source, line_number)?;
            if from.depth != 0 {
                debug!(line = line_number, source = %source, "Skipping typemap row with indirected source");
                continue;
            }
            let to = parse_column(target, line_number)?;

            if let Some(first_line) = defined_on.get(&from.base_name) {
                return Err(BindError::DuplicateTypeMapping {
                    name: from.base_name,
                    line: line_number,
                    first_line: *first_line,
                });
            }

            defined_on.insert(from.base_name.clone(), line_number);
            entries.insert(from.base_name, to);
        }

        Ok(Self { entries })
    }

    /// Read and parse a type table from disk
    pub fn read_path(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(BindError::DocumentNotFound {
                path: path.to_path_buf(),
            });
        }

        let text = fs::read_to_string(path).map_err(|e| BindError::from(e).in_file(path))?;
        let map = Self::parse(&text).map_err(|e| e.in_file(path))?;

        debug!(path = %path.display(), entries = map.len(), "Read typemap");
        Ok(map)
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.entries.get(name)
    }

    /// Map a descriptor through this table.
    ///
    /// The result's depth is the entry's own depth plus the input's depth.
    pub fn map(&self, descriptor: &TypeDescriptor) -> Option<TypeDescriptor> {
        self.get(&descriptor.base_name)
            .map(|mapped| mapped.indirected(descriptor.depth))
    }

    /// Compose two tables: every entry of `self` is mapped through `next`.
    ///
    /// Entries of `next` that `self` does not name are carried over, so
    /// types only the second table knows still map.
    pub fn bake(&self, next: &TypeMap) -> TypeMap {
        let mut entries: BTreeMap<String, TypeDescriptor> = self
            .entries
            .iter()
            .map(|(name, descriptor)| {
                let baked = next.map(descriptor).unwrap_or_else(|| descriptor.clone());
                (name.clone(), baked)
            })
            .collect();

        for (name, descriptor) in &next.entries {
            entries
                .entry(name.clone())
                .or_insert_with(|| descriptor.clone());
        }

        TypeMap { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeDescriptor)> {
        self.entries.iter().map(|(name, descriptor)| (name.as_str(), descriptor))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_column(text: &str, line: usize) -> Result<TypeDescriptor> {
    TypeDescriptor::parse(text).map_err(|source| BindError::AtLine {
        line,
        source: Box::new(source),
    })
}

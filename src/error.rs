//! Error types for the registry compiler

use std::path::PathBuf;

use thiserror::Error;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, BindError>;

/// Registry compiler errors
///
/// Every variant is fatal for the profile being processed. Non-fatal
/// findings go through [`crate::diagnostics::Diagnostics`] instead.
#[derive(Error, Debug)]
pub enum BindError {
    #[error("Registry document not found: {}", path.display())]
    DocumentNotFound { path: PathBuf },

    #[error("<{element}> is missing required attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: String },

    #[error("<{parent}> is missing required element <{element}>")]
    MissingElement { parent: String, element: String },

    #[error("Unrecognized feature element <{element}>")]
    UnknownFeatureElement { element: String },

    #[error("Invalid value '{value}' for enum constant {name}")]
    InvalidEnumValue { name: String, value: String },

    #[error("Invalid feature version: {0}")]
    InvalidVersion(String),

    #[error("Command {name} is declared more than once")]
    DuplicateCommand { name: String },

    #[error("Group {name} is declared more than once")]
    DuplicateGroup { name: String },

    #[error("Type signature '{text}' has no base type")]
    EmptyType { text: String },

    #[error("Line {line}: typemap row has {columns} columns, expected 2")]
    MalformedTypeMap { line: usize, columns: usize },

    #[error("Line {line}: duplicate typemap entry for '{name}' (first defined on line {first_line})")]
    DuplicateTypeMapping {
        name: String,
        line: usize,
        first_line: usize,
    },

    #[error("Unable to map {} type(s) to low-level types: {}", types.len(), types.join(", "))]
    UnmappedTypes { types: Vec<String> },

    #[error("Malformed XML document: {0}")]
    MalformedDocument(String),

    #[error("Line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<BindError>,
    },

    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<BindError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl BindError {
    /// Label this error with the file it was raised for.
    ///
    /// Errors that are already labeled are returned unchanged.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            labeled @ BindError::InFile { .. } => labeled,
            BindError::DocumentNotFound { .. } => self,
            other => BindError::InFile {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }

    pub(crate) fn missing_attribute(element: &str, attribute: &str) -> Self {
        BindError::MissingAttribute {
            element: element.to_string(),
            attribute: attribute.to_string(),
        }
    }

    pub(crate) fn missing_element(parent: &str, element: &str) -> Self {
        BindError::MissingElement {
            parent: parent.to_string(),
            element: element.to_string(),
        }
    }
}

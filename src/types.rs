//! Type signatures
//!
//! Parses C-like type text from the registry (`const GLubyte *`,
//! `GLfloat[4]`, `void **`) into a base name plus indirection depth.
//! Arrays count as exactly one extra level of indirection; nested arrays
//! are not supported and only their first dimension is counted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{BindError, Result};

/// Qualifier ignored when computing the base name
const CONST_QUALIFIER: &str = "const";

/// A possibly indirected type: `T**` is `{ base_name: "T", depth: 2 }`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub base_name: String,
    pub depth: u32,
}

impl TypeDescriptor {
    pub fn new(base_name: impl Into<String>, depth: u32) -> Self {
        Self {
            base_name: base_name.into(),
            depth,
        }
    }

    /// Parse raw type text into a descriptor
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();

        let (body, is_array) = match trimmed.find('[') {
            Some(idx) if trimmed.ends_with(']') => (&trimmed[..idx], true),
            _ => (trimmed, false),
        };

        let pointers = body.matches('*').count() as u32;
        let base_name = body
            .replace('*', " ")
            .split_whitespace()
            .filter(|word| *word != CONST_QUALIFIER)
            .collect::<Vec<_>>()
            .join(" ");

        if base_name.is_empty() {
            return Err(BindError::EmptyType {
                text: text.to_string(),
            });
        }

        Ok(Self {
            base_name,
            depth: pointers + u32::from(is_array),
        })
    }

    /// Add levels of indirection on top of this descriptor
    pub fn indirected(&self, extra: u32) -> Self {
        Self {
            base_name: self.base_name.clone(),
            depth: self.depth + extra,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_name)?;
        for _ in 0..self.depth {
            write!(f, "*")?;
        }
        Ok(())
    }
}

impl FromStr for TypeDescriptor {
    type Err = BindError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A type optionally tagged with the group its values are drawn from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedTypeDescriptor {
    pub descriptor: TypeDescriptor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl GroupedTypeDescriptor {
    pub fn new(descriptor: TypeDescriptor, group: Option<String>) -> Self {
        Self { descriptor, group }
    }

    pub fn ungrouped(descriptor: TypeDescriptor) -> Self {
        Self {
            descriptor,
            group: None,
        }
    }
}

impl fmt::Display for GroupedTypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.group {
            Some(group) => write!(f, "({}) {}", group, self.descriptor),
            None => write!(f, "{}", self.descriptor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_type() {
        let ty = TypeDescriptor::parse("GLenum").unwrap();
        assert_eq!(ty, TypeDescriptor::new("GLenum", 0));
    }

    #[test]
    fn test_pointer_and_const() {
        assert_eq!(
            TypeDescriptor::parse("GLfloat *").unwrap(),
            TypeDescriptor::new("GLfloat", 1)
        );
        assert_eq!(
            TypeDescriptor::parse("const GLubyte *").unwrap(),
            TypeDescriptor::new("GLubyte", 1)
        );
        assert_eq!(
            TypeDescriptor::parse("const void *const*").unwrap(),
            TypeDescriptor::new("void", 2)
        );
    }

    #[test]
    fn test_array_counts_as_one_level() {
        assert_eq!(
            TypeDescriptor::parse("GLfloat[4]").unwrap(),
            TypeDescriptor::new("GLfloat", 1)
        );
        assert_eq!(
            TypeDescriptor::parse("GLuint [2]").unwrap(),
            TypeDescriptor::new("GLuint", 1)
        );
        assert_eq!(
            TypeDescriptor::parse("GLfloat *[16]").unwrap(),
            TypeDescriptor::new("GLfloat", 2)
        );
    }

    #[test]
    fn test_multi_word_base_name() {
        let ty = TypeDescriptor::parse("struct _cl_context *").unwrap();
        assert_eq!(ty, TypeDescriptor::new("struct _cl_context", 1));

        let ty = TypeDescriptor::parse("  unsigned   int ").unwrap();
        assert_eq!(ty.base_name, "unsigned int");
    }

    #[test]
    fn test_empty_type_is_rejected() {
        assert!(matches!(
            TypeDescriptor::parse("const *"),
            Err(BindError::EmptyType { .. })
        ));
        assert!(TypeDescriptor::parse("   ").is_err());
    }

    #[test]
    fn test_display() {
        let ty: TypeDescriptor = "const GLchar **".parse().unwrap();
        assert_eq!(ty.to_string(), "GLchar**");

        let grouped = GroupedTypeDescriptor::new(ty, Some("String".to_string()));
        assert_eq!(grouped.to_string(), "(String) GLchar**");
    }
}

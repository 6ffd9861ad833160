//! Projected function signatures
//!
//! The shape handed to emitters: structured, flow-annotated parameter types
//! instead of the registry's raw C text.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::GroupedTypeDescriptor;

/// Whether a parameter is read by the callee or written through by it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    In,
    Out,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flow::In => write!(f, "in"),
            Flow::Out => write!(f, "out"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: GroupedTypeDescriptor,
    pub flow: Flow,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: GroupedTypeDescriptor, flow: Flow) -> Self {
        Self {
            name: name.into(),
            ty,
            flow,
        }
    }
}

/// A function with structured return and parameter types, parameters in call order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    pub return_type: GroupedTypeDescriptor,
    pub parameters: Vec<Parameter>,
}

impl FunctionSignature {
    pub fn new(
        name: impl Into<String>,
        return_type: GroupedTypeDescriptor,
        parameters: Vec<Parameter>,
    ) -> Self {
        Self {
            name: name.into(),
            return_type,
            parameters,
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.return_type, self.name)?;
        for (idx, param) in self.parameters.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {} {}", param.flow, param.ty, param.name)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeDescriptor;

    #[test]
    fn test_display_signature() {
        let signature = FunctionSignature::new(
            "glGetIntegerv",
            GroupedTypeDescriptor::ungrouped(TypeDescriptor::new("void", 0)),
            vec![
                Parameter::new(
                    "pname",
                    GroupedTypeDescriptor::new(TypeDescriptor::new("GLenum", 0), Some("GetPName".into())),
                    Flow::In,
                ),
                Parameter::new(
                    "data",
                    GroupedTypeDescriptor::ungrouped(TypeDescriptor::new("GLint", 1)),
                    Flow::In,
                ),
            ],
        );

        assert_eq!(
            signature.to_string(),
            "void glGetIntegerv(in (GetPName) GLenum pname, in GLint* data)"
        );
        assert_eq!(signature.parameter("data").unwrap().ty.descriptor.depth, 1);
    }
}

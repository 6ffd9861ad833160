//! Function Type Projection
//!
//! Turns the registry's raw prototype and parameter text into structured
//! descriptors and assigns each parameter a flow direction.

use regex::Regex;
use tracing::info;

use crate::error::Result;
use crate::registry::{FunctionDefinition, RawParameter, RawType, Registry};
use crate::signature::{Flow, FunctionSignature, Parameter};
use crate::types::{GroupedTypeDescriptor, TypeDescriptor};

/// Projects raw registry functions into [`FunctionSignature`]s.
///
/// A parameter whose raw type text contains the whole word `const` is
/// classified [`Flow::Out`]; every other parameter is [`Flow::In`].
/// Downstream consumers rely on this exact mapping.
pub struct TypeProjector {
    const_qualifier: Regex,
}

impl Default for TypeProjector {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeProjector {
    pub fn new() -> Self {
        Self {
            const_qualifier: Regex::new(r"\bconst\b").expect("const qualifier pattern is valid"),
        }
    }

    /// Flow direction for a parameter's raw type text
    pub fn flow(&self, ty: &RawType) -> Flow {
        if self.const_qualifier.is_match(&ty.text) {
            Flow::Out
        } else {
            Flow::In
        }
    }

    /// Parse raw type text, keeping the group tag
    pub fn project_type(ty: &RawType) -> Result<GroupedTypeDescriptor> {
        let descriptor = TypeDescriptor::parse(&ty.text)?;
        Ok(GroupedTypeDescriptor::new(descriptor, ty.group.clone()))
    }

    pub fn project_parameter(&self, parameter: &RawParameter) -> Result<Parameter> {
        Ok(Parameter::new(
            parameter.name.clone(),
            Self::project_type(&parameter.ty)?,
            self.flow(&parameter.ty),
        ))
    }

    pub fn project_function(&self, function: &FunctionDefinition) -> Result<FunctionSignature> {
        let parameters = function
            .parameters
            .iter()
            .map(|parameter| self.project_parameter(parameter))
            .collect::<Result<Vec<_>>>()?;

        Ok(FunctionSignature::new(
            function.name.clone(),
            Self::project_type(&function.return_type)?,
            parameters,
        ))
    }

    /// Project every function of the registry, ordered by name
    pub fn project(&self, registry: &Registry) -> Result<Vec<FunctionSignature>> {
        let signatures = registry
            .functions()
            .values()
            .map(|function| self.project_function(function))
            .collect::<Result<Vec<_>>>()?;

        info!(functions = signatures.len(), "Projected function types");
        Ok(signatures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BindError;

    fn raw(text: &str) -> RawType {
        RawType::new(text, None)
    }

    #[test]
    fn test_const_qualified_parameters_are_out() {
        let projector = TypeProjector::new();
        assert_eq!(projector.flow(&raw("const GLfloat *")), Flow::Out);
        assert_eq!(projector.flow(&raw("const void *const*")), Flow::Out);
        assert_eq!(projector.flow(&raw("GLfloat *")), Flow::In);
        assert_eq!(projector.flow(&raw("GLenum")), Flow::In);
    }

    #[test]
    fn test_const_must_be_a_whole_word() {
        let projector = TypeProjector::new();
        assert_eq!(projector.flow(&raw("GLconstant *")), Flow::In);
        assert_eq!(projector.flow(&raw("constexpr_t")), Flow::In);
        assert_eq!(projector.flow(&raw("myconst")), Flow::In);
    }

    #[test]
    fn test_project_function() {
        let function = FunctionDefinition::new(
            "glGetShaderSource",
            raw("void"),
            vec![
                RawParameter::new("shader", raw("GLuint")),
                RawParameter::new("length", raw("GLsizei *")),
                RawParameter::new("source", RawType::new("const GLchar **", Some("String".into()))),
                RawParameter::new("matrix", raw("GLfloat [16]")),
            ],
        );

        let signature = TypeProjector::new().project_function(&function).unwrap();
        assert_eq!(signature.name, "glGetShaderSource");
        assert_eq!(signature.return_type.descriptor, TypeDescriptor::new("void", 0));

        let names: Vec<_> = signature.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["shader", "length", "source", "matrix"]);

        let source = signature.parameter("source").unwrap();
        assert_eq!(source.ty.descriptor, TypeDescriptor::new("GLchar", 2));
        assert_eq!(source.ty.group.as_deref(), Some("String"));
        assert_eq!(source.flow, Flow::Out);

        let length = signature.parameter("length").unwrap();
        assert_eq!(length.flow, Flow::In);
        assert_eq!(length.ty.descriptor.depth, 1);

        assert_eq!(
            signature.parameter("matrix").unwrap().ty.descriptor,
            TypeDescriptor::new("GLfloat", 1)
        );
    }

    #[test]
    fn test_empty_parameter_type_is_an_error() {
        let function = FunctionDefinition::new(
            "glBroken",
            raw("void"),
            vec![RawParameter::new("x", raw(""))],
        );

        assert!(matches!(
            TypeProjector::new().project_function(&function),
            Err(BindError::EmptyType { .. })
        ));
    }
}

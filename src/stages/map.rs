//! Low-level Type Mapping
//!
//! Rewrites projected signatures from API type names to the native
//! representation types of a [`TypeMap`]. Indirection composes additively:
//! a `GLstring*` through `GLstring -> byte*` becomes `byte**`.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::error::{BindError, Result};
use crate::signature::{FunctionSignature, Parameter};
use crate::typemap::TypeMap;
use crate::types::{GroupedTypeDescriptor, TypeDescriptor};

/// What to do with a type the typemap does not know
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmappedPolicy {
    /// Pass the descriptor through unchanged and record a warning
    #[default]
    Lenient,
    /// Fail the profile, listing every unmapped type
    Strict,
}

/// Maps projected signatures through one [`TypeMap`]
pub struct TypeMapper<'a> {
    map: &'a TypeMap,
    policy: UnmappedPolicy,
}

impl<'a> TypeMapper<'a> {
    pub fn new(map: &'a TypeMap, policy: UnmappedPolicy) -> Self {
        Self { map, policy }
    }

    /// Map a single descriptor. Unknown base names come back unchanged and
    /// are recorded in `diagnostics`.
    pub fn map_type(
        &self,
        descriptor: &TypeDescriptor,
        used_by: &str,
        diagnostics: &mut Diagnostics,
    ) -> TypeDescriptor {
        match self.map.map(descriptor) {
            Some(mapped) => mapped,
            None => {
                warn!(
                    type_name = %descriptor.base_name,
                    used_by,
                    "Unable to map type to low-level type"
                );
                diagnostics.unmapped_type(&descriptor.base_name, used_by);
                descriptor.clone()
            }
        }
    }

    /// Map the inner descriptor; the group tag passes through
    pub fn map_grouped(
        &self,
        ty: &GroupedTypeDescriptor,
        used_by: &str,
        diagnostics: &mut Diagnostics,
    ) -> GroupedTypeDescriptor {
        GroupedTypeDescriptor::new(
            self.map_type(&ty.descriptor, used_by, diagnostics),
            ty.group.clone(),
        )
    }

    pub fn map_function(
        &self,
        function: &FunctionSignature,
        diagnostics: &mut Diagnostics,
    ) -> FunctionSignature {
        let parameters = function
            .parameters
            .iter()
            .map(|parameter| {
                Parameter::new(
                    parameter.name.clone(),
                    self.map_grouped(&parameter.ty, &function.name, diagnostics),
                    parameter.flow,
                )
            })
            .collect();

        FunctionSignature::new(
            function.name.clone(),
            self.map_grouped(&function.return_type, &function.name, diagnostics),
            parameters,
        )
    }

    /// Map every function, applying the unmapped-type policy at the end
    pub fn map_functions(
        &self,
        functions: &[FunctionSignature],
    ) -> Result<(Vec<FunctionSignature>, Diagnostics)> {
        let mut diagnostics = Diagnostics::new();
        let mapped: Vec<_> = functions
            .iter()
            .map(|function| self.map_function(function, &mut diagnostics))
            .collect();

        let unmapped: Vec<String> = diagnostics
            .with_code(DiagnosticCode::UnmappedType)
            .map(|item| item.subject.clone())
            .collect();

        if self.policy == UnmappedPolicy::Strict && !unmapped.is_empty() {
            return Err(BindError::UnmappedTypes { types: unmapped });
        }

        info!(
            functions = mapped.len(),
            unmapped = unmapped.len(),
            "Mapped function types"
        );
        Ok((mapped, diagnostics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Flow;

    fn table() -> TypeMap {
        TypeMap::parse("GLenum, uint32\nGLstring, byte*\nvoid, void\nGLuint, uint32\n").unwrap()
    }

    fn grouped(base: &str, depth: u32, group: Option<&str>) -> GroupedTypeDescriptor {
        GroupedTypeDescriptor::new(TypeDescriptor::new(base, depth), group.map(String::from))
    }

    #[test]
    fn test_map_type_composes_depth() {
        let map = table();
        let mapper = TypeMapper::new(&map, UnmappedPolicy::Lenient);
        let mut diagnostics = Diagnostics::new();

        assert_eq!(
            mapper.map_type(&TypeDescriptor::new("GLenum", 0), "f", &mut diagnostics),
            TypeDescriptor::new("uint32", 0)
        );
        assert_eq!(
            mapper.map_type(&TypeDescriptor::new("GLenum", 1), "f", &mut diagnostics),
            TypeDescriptor::new("uint32", 1)
        );
        assert_eq!(
            mapper.map_type(&TypeDescriptor::new("GLstring", 1), "f", &mut diagnostics),
            TypeDescriptor::new("byte", 2)
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unknown_type_passes_through() {
        let map = table();
        let mapper = TypeMapper::new(&map, UnmappedPolicy::Lenient);
        let mut diagnostics = Diagnostics::new();

        let original = TypeDescriptor::new("GLsync", 1);
        assert_eq!(mapper.map_type(&original, "glFenceSync", &mut diagnostics), original);
        assert_eq!(diagnostics.with_code(DiagnosticCode::UnmappedType).count(), 1);
    }

    #[test]
    fn test_group_tag_passes_through() {
        let map = table();
        let mapper = TypeMapper::new(&map, UnmappedPolicy::Lenient);
        let mut diagnostics = Diagnostics::new();

        let mapped = mapper.map_grouped(&grouped("GLenum", 0, Some("TextureTarget")), "f", &mut diagnostics);
        assert_eq!(mapped, grouped("uint32", 0, Some("TextureTarget")));
    }

    fn functions() -> Vec<FunctionSignature> {
        vec![
            FunctionSignature::new(
                "glBindTexture",
                grouped("void", 0, None),
                vec![
                    Parameter::new("target", grouped("GLenum", 0, Some("TextureTarget")), Flow::In),
                    Parameter::new("texture", grouped("GLuint", 0, None), Flow::In),
                ],
            ),
            FunctionSignature::new(
                "glFenceSync",
                grouped("GLsync", 0, None),
                vec![Parameter::new("flags", grouped("GLbitfield", 0, None), Flow::In)],
            ),
        ]
    }

    #[test]
    fn test_lenient_policy_reports_and_continues() {
        let map = table();
        let (mapped, diagnostics) = TypeMapper::new(&map, UnmappedPolicy::Lenient)
            .map_functions(&functions())
            .unwrap();

        assert_eq!(mapped.len(), 2);
        assert_eq!(mapped[0].parameters[0].ty, grouped("uint32", 0, Some("TextureTarget")));
        assert_eq!(mapped[1].return_type, grouped("GLsync", 0, None));

        let mut unmapped: Vec<_> = diagnostics
            .with_code(DiagnosticCode::UnmappedType)
            .map(|item| item.subject.as_str())
            .collect();
        unmapped.sort();
        assert_eq!(unmapped, ["GLbitfield", "GLsync"]);
    }

    #[test]
    fn test_strict_policy_fails_with_all_unmapped_types() {
        let map = table();
        let err = TypeMapper::new(&map, UnmappedPolicy::Strict)
            .map_functions(&functions())
            .unwrap_err();

        match err {
            BindError::UnmappedTypes { types } => {
                assert_eq!(types.len(), 2);
                assert!(types.contains(&"GLsync".to_string()));
                assert!(types.contains(&"GLbitfield".to_string()));
            }
            other => panic!("Expected UnmappedTypes, got {:?}", other),
        }
    }
}

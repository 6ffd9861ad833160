//! Registry Model
//!
//! The typed representation of one API registry document. A [`Registry`] is
//! built once by the reader and then replaced, never edited, by each pruning
//! pass: passes take `&Registry` and return a new snapshot.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::checksum::Checksum;
use crate::version::FeatureVersion;

/// A named integer constant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumConstant {
    pub name: String,
    pub value: i64,
}

impl EnumConstant {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A named classification of enum constants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeGroup {
    pub name: String,
    pub members: BTreeSet<String>,
}

impl TypeGroup {
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, member: &str) -> bool {
        self.members.contains(member)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Unparsed type text as written in a prototype or parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawType {
    /// C-like type text with the declared name removed, e.g. `const GLubyte *`
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl RawType {
    pub fn new(text: impl Into<String>, group: Option<String>) -> Self {
        Self {
            text: text.into(),
            group,
        }
    }
}

impl fmt::Display for RawType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.group {
            Some(group) => write!(f, "({}) {}", group, self.text),
            None => write!(f, "{}", self.text),
        }
    }
}

/// A parameter as declared in the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawParameter {
    pub name: String,
    pub ty: RawType,
}

impl RawParameter {
    pub fn new(name: impl Into<String>, ty: RawType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A command as declared in the registry. Parameter order is the call order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub return_type: RawType,
    pub parameters: Vec<RawParameter>,
}

impl FunctionDefinition {
    pub fn new(name: impl Into<String>, return_type: RawType, parameters: Vec<RawParameter>) -> Self {
        Self {
            name: name.into(),
            return_type,
            parameters,
        }
    }
}

impl fmt::Display for FunctionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.return_type, self.name)
    }
}

/// What kind of registry entry a feature element refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureElementKind {
    Enum,
    Function,
}

/// A by-name reference to an enum constant or function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureElement {
    pub name: String,
    pub kind: FeatureElementKind,
}

impl FeatureElement {
    pub fn new(name: impl Into<String>, kind: FeatureElementKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn enumerant(name: impl Into<String>) -> Self {
        Self::new(name, FeatureElementKind::Enum)
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self::new(name, FeatureElementKind::Function)
    }
}

/// A versioned bundle of additions and removals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub version: FeatureVersion,
    pub additions: Vec<FeatureElement>,
    pub removals: Vec<FeatureElement>,
}

impl Feature {
    pub fn new(
        version: FeatureVersion,
        additions: Vec<FeatureElement>,
        removals: Vec<FeatureElement>,
    ) -> Self {
        Self {
            version,
            additions,
            removals,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (+{} -{})",
            self.version,
            self.additions.len(),
            self.removals.len()
        )
    }
}

/// All enum constants, groups, functions and features of one document,
/// filtered to a single API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    enums: BTreeMap<String, EnumConstant>,
    groups: BTreeMap<String, TypeGroup>,
    functions: BTreeMap<String, FunctionDefinition>,
    features: Vec<Feature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_checksum: Option<Checksum>,
}

impl Registry {
    /// Assemble a registry. Later entries replace earlier ones with the same name.
    pub fn new(
        enums: impl IntoIterator<Item = EnumConstant>,
        groups: impl IntoIterator<Item = TypeGroup>,
        functions: impl IntoIterator<Item = FunctionDefinition>,
        features: Vec<Feature>,
    ) -> Self {
        Self {
            enums: enums.into_iter().map(|e| (e.name.clone(), e)).collect(),
            groups: groups.into_iter().map(|g| (g.name.clone(), g)).collect(),
            functions: functions.into_iter().map(|f| (f.name.clone(), f)).collect(),
            features,
            source_checksum: None,
        }
    }

    /// Record the digest of the document this registry was read from
    pub fn with_checksum(mut self, checksum: Checksum) -> Self {
        self.source_checksum = Some(checksum);
        self
    }

    /// A new snapshot with the enum and function tables replaced
    pub fn with_enums_and_functions(
        &self,
        enums: BTreeMap<String, EnumConstant>,
        functions: BTreeMap<String, FunctionDefinition>,
    ) -> Self {
        Self {
            enums,
            groups: self.groups.clone(),
            functions,
            features: self.features.clone(),
            source_checksum: self.source_checksum.clone(),
        }
    }

    /// A new snapshot with the group table replaced
    pub fn with_groups(&self, groups: BTreeMap<String, TypeGroup>) -> Self {
        Self {
            enums: self.enums.clone(),
            groups,
            functions: self.functions.clone(),
            features: self.features.clone(),
            source_checksum: self.source_checksum.clone(),
        }
    }

    pub fn enums(&self) -> &BTreeMap<String, EnumConstant> {
        &self.enums
    }

    pub fn groups(&self) -> &BTreeMap<String, TypeGroup> {
        &self.groups
    }

    pub fn functions(&self) -> &BTreeMap<String, FunctionDefinition> {
        &self.functions
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn source_checksum(&self) -> Option<&Checksum> {
        self.source_checksum.as_ref()
    }

    pub fn get_enum(&self, name: &str) -> Option<&EnumConstant> {
        self.enums.get(name)
    }

    pub fn get_group(&self, name: &str) -> Option<&TypeGroup> {
        self.groups.get(name)
    }

    pub fn get_function(&self, name: &str) -> Option<&FunctionDefinition> {
        self.functions.get(name)
    }

    /// Highest feature version present, if any
    pub fn latest_version(&self) -> Option<&FeatureVersion> {
        self.features.iter().map(|f| &f.version).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Registry {
        Registry::new(
            vec![EnumConstant::new("GL_RED", 1), EnumConstant::new("GL_BLUE", 2)],
            vec![TypeGroup::new("Color", ["GL_RED", "GL_BLUE", "GL_RED"])],
            vec![FunctionDefinition::new(
                "glClear",
                RawType::new("void", None),
                vec![RawParameter::new("mask", RawType::new("GLbitfield", Some("ClearBufferMask".into())))],
            )],
            vec![
                Feature::new(FeatureVersion::new(1, 1), vec![], vec![]),
                Feature::new(FeatureVersion::new(1, 0), vec![], vec![]),
            ],
        )
    }

    #[test]
    fn test_group_members_are_a_set() {
        let registry = sample();
        let group = registry.get_group("Color").unwrap();
        assert_eq!(group.members.len(), 2);
        assert!(group.contains("GL_RED"));
    }

    #[test]
    fn test_snapshots_leave_original_untouched() {
        let registry = sample();
        let pruned = registry.with_enums_and_functions(BTreeMap::new(), BTreeMap::new());

        assert!(pruned.enums().is_empty());
        assert!(pruned.functions().is_empty());
        assert_eq!(pruned.groups(), registry.groups());
        assert_eq!(registry.enums().len(), 2);
        assert_eq!(registry.functions().len(), 1);
    }

    #[test]
    fn test_latest_version() {
        let registry = sample();
        assert_eq!(registry.latest_version(), Some(&FeatureVersion::new(1, 1)));
        assert_eq!(Registry::default().latest_version(), None);
    }

    #[test]
    fn test_display_raw_types() {
        let registry = sample();
        let function = registry.get_function("glClear").unwrap();
        assert_eq!(function.to_string(), "void glClear");
        assert_eq!(
            function.parameters[0].ty.to_string(),
            "(ClearBufferMask) GLbitfield"
        );
    }
}

//! Registry Reader
//!
//! Parses a registry document into a [`Registry`] filtered to one API.
//! Nothing is pruned here: every declared enum, group and command is kept,
//! only features (and their require/remove blocks) are filtered by API and
//! sub-profile.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::checksum::Checksum;
use crate::error::{BindError, Result};
use crate::registry::{
    EnumConstant, Feature, FeatureElement, FeatureElementKind, FunctionDefinition, RawParameter,
    RawType, Registry, TypeGroup,
};
use crate::version::FeatureVersion;
use crate::xml::Element;

/// The API a registry is read for, e.g. `gl` with sub-profile `core`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApiSelection {
    /// API identifier matched against `api` attributes
    pub api: String,
    /// Sub-profile matched against `profile` attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

impl ApiSelection {
    pub fn new(api: impl Into<String>, profile: Option<String>) -> Self {
        Self {
            api: api.into(),
            profile,
        }
    }

    /// Whether an element's optional `api`/`profile` attributes admit this selection
    fn admits(&self, element: &Element) -> bool {
        if let Some(api) = element.attribute("api") {
            if api != self.api {
                return false;
            }
        }

        if let Some(profile) = element.attribute("profile") {
            if self.profile.as_deref() != Some(profile) {
                return false;
            }
        }

        true
    }
}

/// Whether an enum declaration is the default value or restricted to one API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Specificity {
    Default,
    ApiSpecific,
}

impl Specificity {
    fn of(element: &Element) -> Self {
        if element.attribute("api").is_some() {
            Specificity::ApiSpecific
        } else {
            Specificity::Default
        }
    }
}

/// Reads registry documents for one [`ApiSelection`]
#[derive(Debug, Clone)]
pub struct RegistryReader {
    selection: ApiSelection,
}

impl RegistryReader {
    pub fn new(selection: ApiSelection) -> Self {
        Self { selection }
    }

    pub fn selection(&self) -> &ApiSelection {
        &self.selection
    }

    /// Read and parse a registry document from disk
    pub fn read_path(&self, path: &Path) -> Result<Registry> {
        if !path.is_file() {
            return Err(BindError::DocumentNotFound {
                path: path.to_path_buf(),
            });
        }

        let text = fs::read_to_string(path).map_err(|e| BindError::from(e).in_file(path))?;
        let registry = self.read_str(&text).map_err(|e| e.in_file(path))?;

        info!(
            path = %path.display(),
            api = %self.selection.api,
            "Read registry document"
        );
        Ok(registry)
    }

    /// Parse a registry document held in memory
    pub fn read_str(&self, text: &str) -> Result<Registry> {
        let root = Element::parse_document(text)?;

        let enums = parse_enum_values(&root)?;
        let groups = parse_groups(&root)?;
        let functions = parse_functions(&root)?;
        let features = self.parse_features(&root)?;

        debug!(
            enums = enums.len(),
            groups = groups.len(),
            functions = functions.len(),
            features = features.len(),
            "Parsed registry"
        );

        Ok(Registry::new(enums, groups, functions, features).with_checksum(Checksum::from_text(text)))
    }

    fn parse_features(&self, root: &Element) -> Result<Vec<Feature>> {
        let mut features = Vec::new();

        for feature in root.elements_named("feature") {
            if feature.required_attribute("api")? != self.selection.api {
                continue;
            }

            let version = FeatureVersion::parse(feature.required_attribute("number")?)?;
            let additions = self.parse_feature_list(feature, "require")?;
            let removals = self.parse_feature_list(feature, "remove")?;

            features.push(Feature::new(version, additions, removals));
        }

        Ok(features)
    }

    fn parse_feature_list(&self, feature: &Element, list: &str) -> Result<Vec<FeatureElement>> {
        let mut elements = Vec::new();

        for block in feature
            .elements_named(list)
            .filter(|block| self.selection.admits(block))
        {
            for child in block.elements() {
                let name = child.required_attribute("name")?;
                let kind = match child.name() {
                    "type" => continue,
                    "enum" => FeatureElementKind::Enum,
                    "command" => FeatureElementKind::Function,
                    other => {
                        return Err(BindError::UnknownFeatureElement {
                            element: other.to_string(),
                        })
                    }
                };

                elements.push(FeatureElement::new(name, kind));
            }
        }

        Ok(elements)
    }
}

/// Parse an enum value: `0x`-prefixed hexadecimal or decimal, as a 64-bit
/// two's complement value
pub fn parse_enum_value(name: &str, text: &str) -> Result<i64> {
    let trimmed = text.trim();
    let invalid = || BindError::InvalidEnumValue {
        name: name.to_string(),
        value: text.to_string(),
    };

    if let Some(hex) = trimmed.strip_prefix("0x") {
        return u64::from_str_radix(hex, 16)
            .map(|value| value as i64)
            .map_err(|_| invalid());
    }

    trimmed
        .parse::<i64>()
        .or_else(|_| trimmed.parse::<u64>().map(|value| value as i64))
        .map_err(|_| invalid())
}

fn parse_enum_values(root: &Element) -> Result<Vec<EnumConstant>> {
    // A default declaration overrides an earlier API-specific one; in every
    // other collision the first declaration is kept.
    let mut recorded: BTreeMap<String, (i64, Specificity)> = BTreeMap::new();

    for block in root.elements_named("enums") {
        for declaration in block.elements_named("enum") {
            let name = declaration.required_attribute("name")?;
            let value = parse_enum_value(name, declaration.required_attribute("value")?)?;
            let specificity = Specificity::of(declaration);

            match recorded.get(name) {
                None => {
                    recorded.insert(name.to_string(), (value, specificity));
                }
                Some((_, Specificity::ApiSpecific)) if specificity == Specificity::Default => {
                    debug!(name, value, "Default enum value overrides API-specific value");
                    recorded.insert(name.to_string(), (value, specificity));
                }
                Some((kept, _)) => {
                    debug!(name, kept, ignored = value, "Keeping first enum declaration");
                }
            }
        }
    }

    Ok(recorded
        .into_iter()
        .map(|(name, (value, _))| EnumConstant::new(name, value))
        .collect())
}

fn parse_groups(root: &Element) -> Result<Vec<TypeGroup>> {
    let mut groups: BTreeMap<String, TypeGroup> = BTreeMap::new();

    for block in root.elements_named("groups") {
        for group in block.elements_named("group") {
            let name = group.required_attribute("name")?;
            let members = group
                .elements()
                .map(|member| member.required_attribute("name"))
                .collect::<Result<Vec<_>>>()?;

            if groups.contains_key(name) {
                return Err(BindError::DuplicateGroup {
                    name: name.to_string(),
                });
            }
            groups.insert(name.to_string(), TypeGroup::new(name, members));
        }
    }

    Ok(groups.into_values().collect())
}

fn parse_functions(root: &Element) -> Result<Vec<FunctionDefinition>> {
    let mut functions: BTreeMap<String, FunctionDefinition> = BTreeMap::new();

    for block in root.elements_named("commands") {
        for command in block.elements_named("command") {
            let proto = command.required_child("proto")?;
            let name = proto.required_child("name")?.text();
            let return_type = raw_type(proto, &name);

            let mut parameters = Vec::new();
            for param in command.elements_named("param") {
                let param_name = param.required_child("name")?.text();
                let param_type = raw_type(param, &param_name);
                parameters.push(RawParameter::new(param_name, param_type));
            }

            if functions.contains_key(&name) {
                return Err(BindError::DuplicateCommand { name });
            }
            functions.insert(name.clone(), FunctionDefinition::new(name, return_type, parameters));
        }
    }

    Ok(functions.into_values().collect())
}

/// Extract the C-like type text of a `<proto>` or `<param>` element.
///
/// The declared name is cut out of the element text at its last occurrence.
/// Anything written after the name (an array suffix such as `[2]`) stays
/// part of the type.
fn raw_type(element: &Element, name: &str) -> RawType {
    let text = element.text();
    let type_text = match text.rfind(name) {
        Some(idx) => {
            let prefix = text[..idx].trim();
            let suffix = text[idx + name.len()..].trim();
            if suffix.is_empty() {
                prefix.to_string()
            } else {
                format!("{} {}", prefix, suffix)
            }
        }
        None => text.trim().to_string(),
    };

    RawType::new(type_text, element.attribute("group").map(String::from))
}

//! Feature Resolution
//!
//! Replays the registry's features in ascending version order to find the
//! enum constants and functions that exist at the requested version.

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::registry::{
    EnumConstant, Feature, FeatureElement, FeatureElementKind, FunctionDefinition, Registry,
};
use crate::version::FeatureVersion;

/// Applies features cumulatively: per feature, additions first, then removals.
///
/// Features sharing a version are applied in document order.
#[derive(Debug, Clone, Default)]
pub struct FeatureResolver {
    max_version: Option<FeatureVersion>,
}

impl FeatureResolver {
    /// Resolve using every feature in the registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore features newer than `max_version`
    pub fn up_to(max_version: FeatureVersion) -> Self {
        Self {
            max_version: Some(max_version),
        }
    }

    pub fn max_version(&self) -> Option<&FeatureVersion> {
        self.max_version.as_ref()
    }

    /// Produce a registry whose enum and function tables hold exactly the
    /// entries alive after the last applicable feature
    pub fn resolve(&self, registry: &Registry) -> Registry {
        let mut ordered: Vec<&Feature> = registry
            .features()
            .iter()
            .filter(|feature| self.applies(feature))
            .collect();
        // sort_by is stable, so same-version features keep document order
        ordered.sort_by(|a, b| a.version.cmp(&b.version));

        let mut enums: BTreeMap<String, EnumConstant> = BTreeMap::new();
        let mut functions: BTreeMap<String, FunctionDefinition> = BTreeMap::new();

        for feature in &ordered {
            for addition in &feature.additions {
                match addition.kind {
                    FeatureElementKind::Enum => {
                        if enums.contains_key(&addition.name) {
                            continue;
                        }
                        match registry.get_enum(&addition.name) {
                            Some(constant) => {
                                enums.insert(addition.name.clone(), constant.clone());
                            }
                            None => dangling(feature, addition),
                        }
                    }
                    FeatureElementKind::Function => {
                        if functions.contains_key(&addition.name) {
                            continue;
                        }
                        match registry.get_function(&addition.name) {
                            Some(function) => {
                                functions.insert(addition.name.clone(), function.clone());
                            }
                            None => dangling(feature, addition),
                        }
                    }
                }
            }

            for removal in &feature.removals {
                match removal.kind {
                    FeatureElementKind::Enum => {
                        enums.remove(&removal.name);
                    }
                    FeatureElementKind::Function => {
                        functions.remove(&removal.name);
                    }
                }
            }
        }

        info!(
            features = ordered.len(),
            enums = enums.len(),
            functions = functions.len(),
            "Resolved features"
        );

        registry.with_enums_and_functions(enums, functions)
    }

    /// Feature entries, among the features this resolver applies, that name
    /// something the registry never declares
    pub fn dangling_references<'r>(
        &self,
        registry: &'r Registry,
    ) -> Vec<(&'r Feature, &'r FeatureElement)> {
        registry
            .features()
            .iter()
            .filter(|feature| self.applies(feature))
            .flat_map(|feature| {
                feature
                    .additions
                    .iter()
                    .chain(&feature.removals)
                    .map(move |element| (feature, element))
            })
            .filter(|(_, element)| !declares(registry, element))
            .collect()
    }

    fn applies(&self, feature: &Feature) -> bool {
        match &self.max_version {
            Some(max) => feature.version <= *max,
            None => true,
        }
    }
}

fn declares(registry: &Registry, element: &FeatureElement) -> bool {
    match element.kind {
        FeatureElementKind::Enum => registry.get_enum(&element.name).is_some(),
        FeatureElementKind::Function => registry.get_function(&element.name).is_some(),
    }
}

fn dangling(feature: &Feature, element: &FeatureElement) {
    debug!(
        version = %feature.version,
        name = %element.name,
        kind = ?element.kind,
        "Feature references an entry missing from the registry"
    );
}

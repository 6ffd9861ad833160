//! Profile pipeline
//!
//! Runs the stages for one profile:
//!
//! ```text
//! read ─▶ resolve features ─▶ prune groups ─▶ project ─▶ map
//! ```
//!
//! and fans several profiles out in parallel. Profiles share parsed
//! documents through a [`BindCache`] but never share results: one failing
//! profile does not affect the others.

use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};

use crate::cache::BindCache;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::reader::ApiSelection;
use crate::registry::Registry;
use crate::signature::FunctionSignature;
use crate::stages::{prune_groups, FeatureResolver, TypeMapper, TypeProjector, UnmappedPolicy};
use crate::version::FeatureVersion;

/// Everything needed to resolve one profile
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSettings {
    pub name: String,
    pub selection: ApiSelection,
    pub max_version: Option<FeatureVersion>,
    /// Registry document
    pub registry: PathBuf,
    /// Type tables, baked in order
    pub typemaps: Vec<PathBuf>,
    pub unmapped: UnmappedPolicy,
}

impl ProfileSettings {
    pub fn new(name: impl Into<String>, selection: ApiSelection, registry: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            selection,
            max_version: None,
            registry: registry.into(),
            typemaps: Vec::new(),
            unmapped: UnmappedPolicy::default(),
        }
    }

    pub fn with_max_version(mut self, version: FeatureVersion) -> Self {
        self.max_version = Some(version);
        self
    }

    pub fn with_typemap(mut self, path: impl Into<PathBuf>) -> Self {
        self.typemaps.push(path.into());
        self
    }

    pub fn with_unmapped(mut self, policy: UnmappedPolicy) -> Self {
        self.unmapped = policy;
        self
    }
}

/// The finished model for one profile, ready for an emitter
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedProfile {
    pub name: String,
    #[serde(flatten)]
    pub selection: ApiSelection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_version: Option<FeatureVersion>,
    /// Enum constants, groups and raw functions alive in this profile
    pub registry: Registry,
    /// Projected and mapped function signatures, ordered by name
    pub functions: Vec<FunctionSignature>,
    pub diagnostics: Diagnostics,
}

/// Runs profiles against a shared cache
pub struct Pipeline<'c> {
    cache: &'c BindCache,
    projector: TypeProjector,
}

impl<'c> Pipeline<'c> {
    pub fn new(cache: &'c BindCache) -> Self {
        Self {
            cache,
            projector: TypeProjector::new(),
        }
    }

    /// Resolve a single profile
    pub fn run_profile(&self, settings: &ProfileSettings) -> Result<ResolvedProfile> {
        info!(
            profile = %settings.name,
            api = %settings.selection.api,
            sub_profile = settings.selection.profile.as_deref().unwrap_or("-"),
            "Resolving profile"
        );

        let mut diagnostics = Diagnostics::new();
        let document = self.cache.registry(&settings.registry, &settings.selection)?;

        let resolver = match &settings.max_version {
            Some(version) => FeatureResolver::up_to(version.clone()),
            None => FeatureResolver::new(),
        };
        for (feature, element) in resolver.dangling_references(&document) {
            diagnostics.dangling_reference(&element.name, &feature.version.to_string());
        }
        let resolved = resolver.resolve(&document);

        let pruned = prune_groups(&resolved);
        for name in resolved.groups().keys() {
            if pruned.get_group(name).is_none() {
                diagnostics.dropped_group(name);
            }
        }

        let projected = self.projector.project(&pruned)?;

        let typemap = self.cache.typemap_chain(&settings.typemaps)?;
        let (functions, mapping) =
            TypeMapper::new(&typemap, settings.unmapped).map_functions(&projected)?;
        diagnostics.extend(mapping);

        info!(
            profile = %settings.name,
            enums = pruned.enums().len(),
            groups = pruned.groups().len(),
            functions = functions.len(),
            diagnostics = diagnostics.len(),
            "Resolved profile"
        );

        Ok(ResolvedProfile {
            name: settings.name.clone(),
            selection: settings.selection.clone(),
            max_version: settings.max_version.clone(),
            registry: pruned,
            functions,
            diagnostics,
        })
    }

    /// Resolve every profile in parallel. Results come back in input order,
    /// each paired with its profile name.
    pub fn run_all(&self, profiles: &[ProfileSettings]) -> Vec<(String, Result<ResolvedProfile>)> {
        profiles
            .par_iter()
            .map(|settings| {
                let result = self.run_profile(settings);
                if let Err(e) = &result {
                    error!(profile = %settings.name, error = %e, "Profile failed");
                }
                (settings.name.clone(), result)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticCode;
    use crate::error::BindError;
    use crate::types::TypeDescriptor;
    use std::fs;
    use tempfile::TempDir;

    const COLORS: &str = r#"<registry>
  <enums>
    <enum name="RED" value="0x1"/>
    <enum name="BLUE" value="0x2"/>
  </enums>
  <groups>
    <group name="Color"><enum name="RED"/><enum name="BLUE"/></group>
    <group name="Legacy"><enum name="BLUE"/></group>
  </groups>
  <commands>
    <command>
      <proto>void <name>glPaint</name></proto>
      <param group="Color"><ptype>GLenum</ptype> <name>color</name></param>
      <param>const <ptype>GLfloat</ptype> *<name>weights</name></param>
    </command>
  </commands>
  <feature api="gl" number="1.0">
    <require><enum name="RED"/><enum name="BLUE"/><command name="glPaint"/></require>
  </feature>
  <feature api="gl" number="1.1">
    <remove><enum name="BLUE"/></remove>
    <require><enum name="GREEN"/></require>
  </feature>
</registry>"#;

    fn workspace() -> (TempDir, ProfileSettings) {
        let temp = TempDir::new().unwrap();
        let registry = temp.path().join("colors.xml");
        let typemap = temp.path().join("gl.tm");
        fs::write(&registry, COLORS).unwrap();
        fs::write(&typemap, "GLenum, uint32\nvoid, void\n").unwrap();

        let settings = ProfileSettings::new("gl", ApiSelection::new("gl", None), registry)
            .with_typemap(typemap);
        (temp, settings)
    }

    #[test]
    fn test_run_profile_end_to_end() {
        let (_temp, settings) = workspace();
        let cache = BindCache::new();
        let profile = Pipeline::new(&cache).run_profile(&settings).unwrap();

        let enums: Vec<_> = profile.registry.enums().values().map(|e| (e.name.as_str(), e.value)).collect();
        assert_eq!(enums, [("RED", 1)]);

        let color = profile.registry.get_group("Color").unwrap();
        assert!(color.contains("RED"));
        assert!(!color.contains("BLUE"));
        assert!(profile.registry.get_group("Legacy").is_none());

        let paint = &profile.functions[0];
        let color_param = paint.parameter("color").unwrap();
        assert_eq!(color_param.ty.descriptor, TypeDescriptor::new("uint32", 0));
        assert_eq!(color_param.ty.group.as_deref(), Some("Color"));

        let codes: Vec<_> = profile.diagnostics.items().iter().map(|item| item.code).collect();
        assert!(codes.contains(&DiagnosticCode::DanglingReference));
        assert!(codes.contains(&DiagnosticCode::DroppedGroup));
        assert!(codes.contains(&DiagnosticCode::UnmappedType));
        assert!(profile.registry.source_checksum().is_some());
    }

    #[test]
    fn test_max_version_keeps_older_state() {
        let (_temp, settings) = workspace();
        let settings = settings.with_max_version(FeatureVersion::new(1, 0));

        let cache = BindCache::new();
        let profile = Pipeline::new(&cache).run_profile(&settings).unwrap();

        assert_eq!(profile.registry.enums().len(), 2);
        assert!(profile.registry.get_group("Legacy").is_some());
        assert_eq!(
            profile.diagnostics.with_code(DiagnosticCode::DanglingReference).count(),
            0
        );
    }

    #[test]
    fn test_strict_policy_fails_profile() {
        let (_temp, settings) = workspace();
        let settings = settings.with_unmapped(UnmappedPolicy::Strict);

        let cache = BindCache::new();
        let err = Pipeline::new(&cache).run_profile(&settings).unwrap_err();
        match err {
            BindError::UnmappedTypes { types } => assert_eq!(types, ["GLfloat"]),
            other => panic!("Expected UnmappedTypes, got {:?}", other),
        }
    }

    #[test]
    fn test_run_all_isolates_failures() {
        let (temp, settings) = workspace();
        let broken = ProfileSettings::new(
            "broken",
            ApiSelection::new("gl", None),
            temp.path().join("missing.xml"),
        );
        let gles = ProfileSettings {
            name: "gles2".to_string(),
            selection: ApiSelection::new("gles2", None),
            ..settings.clone()
        };

        let cache = BindCache::new();
        let results = Pipeline::new(&cache).run_all(&[settings, broken, gles]);

        let names: Vec<_> = results.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["gl", "broken", "gles2"]);
        assert!(results[0].1.is_ok());
        assert!(matches!(results[1].1, Err(BindError::DocumentNotFound { .. })));

        // No gles2 features in the document, so nothing survives
        let gles = results[2].1.as_ref().unwrap();
        assert!(gles.registry.enums().is_empty());
        assert!(gles.functions.is_empty());

        assert_eq!(cache.cached_registries(), 2);
    }

    #[test]
    fn test_resolved_profile_serializes() {
        let (_temp, settings) = workspace();
        let cache = BindCache::new();
        let profile = Pipeline::new(&cache).run_profile(&settings).unwrap();

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["name"], "gl");
        assert_eq!(json["api"], "gl");
        assert_eq!(json["functions"][0]["parameters"][1]["flow"], "out");
    }
}

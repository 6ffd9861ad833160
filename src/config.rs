//! Configuration management for registry-bind
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (bind.toml)
//! - Environment variables (BIND__*)
//!
//! ## Example config file (bind.toml):
//! ```toml
//! [input]
//! root = "./specifications"
//! registry = "gl.xml"
//!
//! [output]
//! dir = "./generated"
//! format = "pretty"
//!
//! [mapping]
//! unmapped = "strict"
//!
//! [[profiles]]
//! name = "gl-core"
//! api = "gl"
//! profile = "core"
//! max_version = "4.6"
//! typemaps = ["gl.tm", "csharp.tm"]
//!
//! [[profiles]]
//! name = "gles2"
//! api = "gles2"
//! registry = "gles.xml"
//! typemaps = ["gl.tm"]
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::pipeline::ProfileSettings;
use crate::reader::ApiSelection;
use crate::stages::UnmappedPolicy;
use crate::version::FeatureVersion;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindConfig {
    /// Where registry documents and typemaps live
    #[serde(default)]
    pub input: InputConfig,

    /// Where resolved profiles are written
    #[serde(default)]
    pub output: OutputConfig,

    /// Type mapping settings
    #[serde(default)]
    pub mapping: MappingConfig,

    /// Profiles to resolve
    #[serde(default = "default_profiles")]
    pub profiles: Vec<ProfileConfig>,
}

/// Input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory relative input paths are resolved against
    #[serde(default = "default_input_root")]
    pub root: PathBuf,

    /// Registry document used by profiles that do not name their own
    #[serde(default = "default_registry")]
    pub registry: PathBuf,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Output format (pretty or compact)
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingConfig {
    /// What to do with types no typemap entry covers
    #[serde(default)]
    pub unmapped: UnmappedPolicy,
}

/// Configuration for a single profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Profile name, also the output file stem
    pub name: String,

    /// API identifier, e.g. `gl` or `gles2`
    pub api: String,

    /// Sub-profile, e.g. `core` or `compatibility`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Ignore features newer than this version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_version: Option<FeatureVersion>,

    /// Registry document override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<PathBuf>,

    /// Type tables, baked in order
    #[serde(default = "default_typemaps")]
    pub typemaps: Vec<PathBuf>,
}

// Default value functions
fn default_input_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_registry() -> PathBuf {
    PathBuf::from("gl.xml")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

fn default_typemaps() -> Vec<PathBuf> {
    vec![PathBuf::from("gl.tm")]
}

fn default_profiles() -> Vec<ProfileConfig> {
    vec![
        ProfileConfig {
            name: "gl-compatibility".to_string(),
            api: "gl".to_string(),
            profile: Some("compatibility".to_string()),
            max_version: None,
            registry: None,
            typemaps: default_typemaps(),
        },
        ProfileConfig {
            name: "gl-core".to_string(),
            api: "gl".to_string(),
            profile: Some("core".to_string()),
            max_version: None,
            registry: None,
            typemaps: default_typemaps(),
        },
        ProfileConfig {
            name: "gles2".to_string(),
            api: "gles2".to_string(),
            profile: None,
            max_version: None,
            registry: None,
            typemaps: default_typemaps(),
        },
    ]
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            root: default_input_root(),
            registry: default_registry(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            format: OutputFormat::Pretty,
        }
    }
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            output: OutputConfig::default(),
            mapping: MappingConfig::default(),
            profiles: default_profiles(),
        }
    }
}

impl BindConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the default locations
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        for location in ["bind.toml", ".bind.toml", "config/bind.toml"] {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(dirs) = directories::ProjectDirs::from("org", "registry-bind", "registry-bind") {
            let xdg_config = dirs.config_dir().join("bind.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        // BIND__OUTPUT__DIR, BIND__MAPPING__UNMAPPED, ...
        builder = builder.add_source(
            Environment::with_prefix("BIND")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Resolve a path against the input root
    pub fn input_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.input.root.join(path)
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output.dir
    }

    pub fn profile(&self, name: &str) -> Option<&ProfileConfig> {
        self.profiles.iter().find(|profile| profile.name == name)
    }

    /// Pipeline settings for one configured profile, with every path
    /// resolved against the input root
    pub fn settings_for(&self, profile: &ProfileConfig) -> ProfileSettings {
        let registry = profile.registry.as_ref().unwrap_or(&self.input.registry);

        ProfileSettings {
            name: profile.name.clone(),
            selection: ApiSelection::new(profile.api.clone(), profile.profile.clone()),
            max_version: profile.max_version.clone(),
            registry: self.input_path(registry),
            typemaps: profile
                .typemaps
                .iter()
                .map(|path| self.input_path(path))
                .collect(),
            unmapped: self.mapping.unmapped,
        }
    }

    /// Pipeline settings for every configured profile
    pub fn profile_settings(&self) -> Vec<ProfileSettings> {
        self.profiles
            .iter()
            .map(|profile| self.settings_for(profile))
            .collect()
    }
}

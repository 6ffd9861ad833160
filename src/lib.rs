//! Registry Bind
//!
//! Compiles a versioned API registry (an XML document declaring enum
//! constants, enum groups, function prototypes and versioned features) into
//! per-profile models for binding generators.
//!
//! ## Features
//!
//! - **Feature Resolution**: Replays add/remove features in version order
//! - **Group Pruning**: Groups only name constants that survived resolution
//! - **Type Projection**: Raw C prototypes become structured descriptors with parameter flow
//! - **Type Mapping**: API types map to low-level types through baked typemaps
//! - **Shared Cache**: Profiles resolve in parallel over one parsed document
//!
//! ## Architecture
//!
//! ```text
//! gl.xml ──▶ RegistryReader ──▶ Registry
//!                                  │
//!                 FeatureResolver ─┤ (per profile, optional max version)
//!                    prune_groups ─┤
//!                   TypeProjector ─┤
//!        TypeMap ──▶ TypeMapper  ──┘──▶ ResolvedProfile
//! ```

pub mod cache;
pub mod checksum;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod pipeline;
pub mod reader;
pub mod registry;
pub mod signature;
pub mod stages;
pub mod typemap;
pub mod types;
pub mod version;
pub mod xml;

pub use cache::BindCache;
pub use checksum::Checksum;
pub use config::BindConfig;
pub use diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics, Severity};
pub use error::{BindError, Result};
pub use pipeline::{Pipeline, ProfileSettings, ResolvedProfile};
pub use reader::{ApiSelection, RegistryReader};
pub use registry::{
    EnumConstant, Feature, FeatureElement, FeatureElementKind, FunctionDefinition, RawParameter,
    RawType, Registry, TypeGroup,
};
pub use signature::{Flow, FunctionSignature, Parameter};
pub use stages::{prune_groups, FeatureResolver, TypeMapper, TypeProjector, UnmappedPolicy};
pub use typemap::TypeMap;
pub use types::{GroupedTypeDescriptor, TypeDescriptor};
pub use version::FeatureVersion;

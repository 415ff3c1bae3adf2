//! Identifier module configuration.
//!
//! [`IdentifierConfig`] is the immutable configuration a module runs with.
//! [`IdentifierSettings`] is its plain-data form for loading from JSON or any
//! other serde format.
//!
//! # Example
//!
//! ```ignore
//! use graphuid::{GeneratorKind, IdentifierConfig, InclusionPolicy};
//!
//! let config = IdentifierConfig::new()
//!     .identifier_property("guid")
//!     .strip_hyphens(true)
//!     .node_inclusion(InclusionPolicy::matching(["Person", "Company"]))
//!     .relationship_inclusion(InclusionPolicy::All)
//!     .generator(GeneratorKind::Random);
//! ```

use std::fmt;
use std::sync::Arc;

use graphuid_core::{Edge, Entity, EntityKind};
use serde::{Deserialize, Serialize};

use crate::error::{IdentifierError, IdentifierResult};
use crate::generator::SequenceConfig;

/// Default module id.
pub const DEFAULT_MODULE_ID: &str = "UIDM";
/// Default identifier property.
pub const DEFAULT_IDENTIFIER_PROPERTY: &str = "uuid";
/// Default node index name.
pub const DEFAULT_NODE_INDEX: &str = "uuidIndex";
/// Default relationship index name.
pub const DEFAULT_RELATIONSHIP_INDEX: &str = "uuidRelIndex";
/// Default number of elements per initialization batch.
pub const DEFAULT_INITIALIZATION_BATCH_SIZE: usize = 1000;

/// Something an inclusion policy can match by name: a node's labels or a
/// relationship's type.
pub trait Classified {
    /// Returns `true` if the element carries the label or type `name`.
    fn is_classified_as(&self, name: &str) -> bool;
}

impl Classified for Entity {
    fn is_classified_as(&self, name: &str) -> bool {
        self.has_label(name)
    }
}

impl Classified for Edge {
    fn is_classified_as(&self, name: &str) -> bool {
        self.edge_type.as_str() == name
    }
}

/// Predicate over a closure, shared between clones of a policy.
pub type InclusionPredicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Decides which elements of one kind receive identifiers.
pub enum InclusionPolicy<T> {
    /// Every element.
    All,
    /// No element.
    None,
    /// Elements carrying any of these labels (nodes) or types (relationships).
    Matching(Vec<String>),
    /// Elements accepted by a predicate.
    Custom(InclusionPredicate<T>),
}

impl<T: Classified> InclusionPolicy<T> {
    /// Match elements carrying any of `names`.
    pub fn matching<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Matching(names.into_iter().map(Into::into).collect())
    }

    /// Match elements accepted by `predicate`.
    pub fn custom(predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(predicate))
    }

    /// Returns `true` if `element` should carry an identifier.
    pub fn includes(&self, element: &T) -> bool {
        match self {
            Self::All => true,
            Self::None => false,
            Self::Matching(names) => names.iter().any(|n| element.is_classified_as(n)),
            Self::Custom(predicate) => predicate(element),
        }
    }
}

impl<T> Clone for InclusionPolicy<T> {
    fn clone(&self) -> Self {
        match self {
            Self::All => Self::All,
            Self::None => Self::None,
            Self::Matching(names) => Self::Matching(names.clone()),
            Self::Custom(predicate) => Self::Custom(Arc::clone(predicate)),
        }
    }
}

impl<T> fmt::Debug for InclusionPolicy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::None => f.write_str("None"),
            Self::Matching(names) => f.debug_tuple("Matching").field(names).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Which generator produces new identifiers.
#[derive(Debug, Clone, Default)]
pub enum GeneratorKind {
    /// Random version 4 UUIDs rendered as text.
    #[default]
    Random,
    /// A durable counter stored in the graph.
    Sequence(SequenceConfig),
    /// A generator registered under this name in a
    /// [`GeneratorRegistry`](crate::generator::GeneratorRegistry).
    Custom(String),
}

impl GeneratorKind {
    /// Map a settings name: `random`, `sequence`, or a custom name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "random" => Self::Random,
            "sequence" => Self::Sequence(SequenceConfig::default()),
            other => Self::Custom(other.to_owned()),
        }
    }

    /// The settings name of this generator.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Random => "random",
            Self::Sequence(_) => "sequence",
            Self::Custom(name) => name,
        }
    }
}

/// Configuration of one identifier module.
///
/// Built with chained setters starting from [`IdentifierConfig::new`]; the
/// defaults give every node a random UUID in the `uuid` property and leave
/// relationships alone.
#[derive(Debug, Clone)]
pub struct IdentifierConfig {
    /// Id distinguishing this module from others on the same store.
    pub module_id: String,
    /// Property holding the identifier.
    pub identifier_property: String,
    /// Name of the node index.
    pub node_index_name: String,
    /// Name of the relationship index.
    pub relationship_index_name: String,
    /// Remove `-` from generated text identifiers.
    pub strip_hyphens: bool,
    /// Generator for new identifiers.
    pub generator: GeneratorKind,
    /// Reject removal or change of an assigned identifier.
    pub immutable: bool,
    /// Which nodes receive identifiers.
    pub node_inclusion: InclusionPolicy<Entity>,
    /// Which relationships receive identifiers.
    pub relationship_inclusion: InclusionPolicy<Edge>,
    /// Elements per sub-transaction during initialization.
    pub initialization_batch_size: usize,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            module_id: DEFAULT_MODULE_ID.to_owned(),
            identifier_property: DEFAULT_IDENTIFIER_PROPERTY.to_owned(),
            node_index_name: DEFAULT_NODE_INDEX.to_owned(),
            relationship_index_name: DEFAULT_RELATIONSHIP_INDEX.to_owned(),
            strip_hyphens: false,
            generator: GeneratorKind::Random,
            immutable: true,
            node_inclusion: InclusionPolicy::All,
            relationship_inclusion: InclusionPolicy::None,
            initialization_batch_size: DEFAULT_INITIALIZATION_BATCH_SIZE,
        }
    }
}

impl IdentifierConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the module id.
    #[must_use]
    pub fn module_id(mut self, id: impl Into<String>) -> Self {
        self.module_id = id.into();
        self
    }

    /// Set the identifier property.
    #[must_use]
    pub fn identifier_property(mut self, property: impl Into<String>) -> Self {
        self.identifier_property = property.into();
        self
    }

    /// Set the node index name.
    #[must_use]
    pub fn node_index_name(mut self, name: impl Into<String>) -> Self {
        self.node_index_name = name.into();
        self
    }

    /// Set the relationship index name.
    #[must_use]
    pub fn relationship_index_name(mut self, name: impl Into<String>) -> Self {
        self.relationship_index_name = name.into();
        self
    }

    /// Strip hyphens from generated text identifiers.
    #[must_use]
    pub const fn strip_hyphens(mut self, strip: bool) -> Self {
        self.strip_hyphens = strip;
        self
    }

    /// Set the generator.
    #[must_use]
    pub fn generator(mut self, generator: GeneratorKind) -> Self {
        self.generator = generator;
        self
    }

    /// Allow or forbid changing assigned identifiers.
    #[must_use]
    pub const fn immutable(mut self, immutable: bool) -> Self {
        self.immutable = immutable;
        self
    }

    /// Set the node inclusion policy.
    #[must_use]
    pub fn node_inclusion(mut self, policy: InclusionPolicy<Entity>) -> Self {
        self.node_inclusion = policy;
        self
    }

    /// Set the relationship inclusion policy.
    #[must_use]
    pub fn relationship_inclusion(mut self, policy: InclusionPolicy<Edge>) -> Self {
        self.relationship_inclusion = policy;
        self
    }

    /// Set the initialization batch size.
    #[must_use]
    pub const fn initialization_batch_size(mut self, size: usize) -> Self {
        self.initialization_batch_size = size;
        self
    }

    /// The index name for a kind.
    #[must_use]
    pub fn index_name(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Node => &self.node_index_name,
            EntityKind::Relationship => &self.relationship_index_name,
        }
    }

    /// Check the configuration for values no module can run with.
    pub fn validate(&self) -> IdentifierResult<()> {
        if self.module_id.trim().is_empty() {
            return Err(IdentifierError::Config("module id must not be empty".to_owned()));
        }
        if self.identifier_property.trim().is_empty() {
            return Err(IdentifierError::Config(
                "identifier property must not be empty".to_owned(),
            ));
        }
        if self.node_index_name.is_empty() || self.relationship_index_name.is_empty() {
            return Err(IdentifierError::Config("index names must not be empty".to_owned()));
        }
        if self.node_index_name == self.relationship_index_name {
            return Err(IdentifierError::Config(format!(
                "node and relationship index share the name {}",
                self.node_index_name
            )));
        }
        if self.initialization_batch_size == 0 {
            return Err(IdentifierError::Config(
                "initialization batch size must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Inclusion rule in [`IdentifierSettings`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InclusionSetting {
    /// Every element.
    #[default]
    All,
    /// No element.
    None,
    /// Elements with any of these labels or types.
    Only(Vec<String>),
}

impl InclusionSetting {
    fn into_policy<T: Classified>(self) -> InclusionPolicy<T> {
        match self {
            Self::All => InclusionPolicy::All,
            Self::None => InclusionPolicy::None,
            Self::Only(names) => InclusionPolicy::Matching(names),
        }
    }
}

/// Plain-data module settings.
///
/// Field names follow the camelCase keys of the configuration format; missing
/// fields take the defaults of [`IdentifierConfig`].
///
/// # Example
///
/// ```ignore
/// let settings = IdentifierSettings::from_json(r#"{
///     "identifierProperty": "guid",
///     "stripHyphens": true,
///     "relationshipInclusion": { "only": ["KNOWS"] }
/// }"#)?;
/// let config = settings.into_config();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentifierSettings {
    /// Module id.
    pub module_id: String,
    /// Identifier property.
    pub identifier_property: String,
    /// Node index name.
    pub node_index_name: String,
    /// Relationship index name.
    pub relationship_index_name: String,
    /// Strip hyphens from generated identifiers.
    pub strip_hyphens: bool,
    /// `random`, `sequence`, or the name of a registered generator.
    pub generator: String,
    /// Forbid changing assigned identifiers.
    pub immutable: bool,
    /// Which nodes receive identifiers.
    pub node_inclusion: InclusionSetting,
    /// Which relationships receive identifiers.
    pub relationship_inclusion: InclusionSetting,
    /// Elements per initialization batch.
    pub initialization_batch_size: usize,
}

impl Default for IdentifierSettings {
    fn default() -> Self {
        Self {
            module_id: DEFAULT_MODULE_ID.to_owned(),
            identifier_property: DEFAULT_IDENTIFIER_PROPERTY.to_owned(),
            node_index_name: DEFAULT_NODE_INDEX.to_owned(),
            relationship_index_name: DEFAULT_RELATIONSHIP_INDEX.to_owned(),
            strip_hyphens: false,
            generator: "random".to_owned(),
            immutable: true,
            node_inclusion: InclusionSetting::All,
            relationship_inclusion: InclusionSetting::None,
            initialization_batch_size: DEFAULT_INITIALIZATION_BATCH_SIZE,
        }
    }
}

impl IdentifierSettings {
    /// Parse settings from JSON.
    pub fn from_json(json: &str) -> IdentifierResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| IdentifierError::Config(format!("invalid settings: {e}")))
    }

    /// Convert into a module configuration.
    #[must_use]
    pub fn into_config(self) -> IdentifierConfig {
        IdentifierConfig {
            module_id: self.module_id,
            identifier_property: self.identifier_property,
            node_index_name: self.node_index_name,
            relationship_index_name: self.relationship_index_name,
            strip_hyphens: self.strip_hyphens,
            generator: GeneratorKind::from_name(&self.generator),
            immutable: self.immutable,
            node_inclusion: self.node_inclusion.into_policy(),
            relationship_inclusion: self.relationship_inclusion.into_policy(),
            initialization_batch_size: self.initialization_batch_size,
        }
    }
}

impl From<IdentifierSettings> for IdentifierConfig {
    fn from(settings: IdentifierSettings) -> Self {
        settings.into_config()
    }
}

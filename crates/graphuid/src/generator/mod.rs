//! Identifier generators.
//!
//! A generator produces fresh identifiers on demand. Two ship with the crate:
//!
//! - [`RandomGenerator`] - version 4 UUIDs as text
//! - [`SequenceGenerator`] - a durable counter stored as a node in the graph
//!
//! Other generators are registered by name in a [`GeneratorRegistry`] and
//! selected with [`GeneratorKind::Custom`].

mod random;
mod sequence;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use graphuid_graph::GraphStore;

pub use random::RandomGenerator;
pub use sequence::{SequenceConfig, SequenceGenerator};

use crate::config::GeneratorKind;
use crate::error::{IdentifierError, IdentifierResult};
use crate::identifier::Identifier;

/// Produces new identifiers.
///
/// Generators are called from inside the commit pipeline, once per element
/// that needs an identifier. A generator may open and commit its own
/// transactions on `store`.
pub trait IdentifierGenerator: Send + Sync {
    /// A short name for logging.
    fn name(&self) -> &str;

    /// Produce the next identifier.
    ///
    /// # Errors
    ///
    /// Any error aborts the transaction that asked for the identifier.
    fn generate(&self, store: &GraphStore) -> IdentifierResult<Identifier>;
}

/// Factory creating a generator instance.
pub type GeneratorFactory =
    Arc<dyn Fn() -> IdentifierResult<Arc<dyn IdentifierGenerator>> + Send + Sync>;

/// Named generator factories for [`GeneratorKind::Custom`].
#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    factories: HashMap<String, GeneratorFactory>,
}

impl GeneratorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name`, replacing any earlier one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> IdentifierResult<Arc<dyn IdentifierGenerator>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Returns `true` if a factory is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Create the generator a configuration asks for.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::GeneratorInitialization`] if no factory is
    /// registered for a custom name or the factory fails.
    pub fn resolve(&self, kind: &GeneratorKind) -> IdentifierResult<Arc<dyn IdentifierGenerator>> {
        match kind {
            GeneratorKind::Random => Ok(Arc::new(RandomGenerator)),
            GeneratorKind::Sequence(config) => Ok(Arc::new(SequenceGenerator::new(config.clone()))),
            GeneratorKind::Custom(name) => {
                let factory = self.factories.get(name).ok_or_else(|| {
                    IdentifierError::GeneratorInitialization(format!(
                        "no generator registered under the name {name}"
                    ))
                })?;
                factory().map_err(|e| match e {
                    IdentifierError::GeneratorInitialization(_) => e,
                    other => IdentifierError::GeneratorInitialization(format!("{name}: {other}")),
                })
            }
        }
    }
}

impl fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("GeneratorRegistry").field("factories", &names).finish()
    }
}

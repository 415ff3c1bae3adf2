//! Module registration.

use std::sync::Arc;

use graphuid_core::EntityKind;
use graphuid_graph::{CommitHook, GraphStore};
use tracing::info;

use crate::config::{GeneratorKind, IdentifierConfig};
use crate::coordinator::{AssignmentCoordinator, InitializationReport};
use crate::error::IdentifierResult;
use crate::generator::GeneratorRegistry;
use crate::index::IdentifierIndex;
use crate::reader::IdentifierReader;

/// An identifier module installed on a store.
///
/// Registering a module creates its indexes and installs its
/// [`AssignmentCoordinator`] as a commit hook; from then on every write
/// transaction on the store is subject to its rules. Several modules with
/// different properties and index names may share one store.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use graphuid::{IdentifierConfig, IdentifierModule};
/// use graphuid_graph::GraphStore;
///
/// let store = Arc::new(GraphStore::in_memory()?);
/// let module = IdentifierModule::register(Arc::clone(&store), IdentifierConfig::new())?;
///
/// let mut tx = store.begin_write()?;
/// let node = tx.create_node()?.with_label("Person");
/// tx.put_node(&node)?;
/// tx.commit()?;
///
/// let uuid = module.reader().identifier_of(node.id.into())?;
/// ```
pub struct IdentifierModule {
    store: Arc<GraphStore>,
    coordinator: Arc<AssignmentCoordinator>,
}

impl IdentifierModule {
    /// Register a module with the built-in generators.
    ///
    /// # Errors
    ///
    /// - [`IdentifierError::Config`](crate::IdentifierError::Config) for an
    ///   invalid configuration or an index name taken by another property
    /// - [`IdentifierError::GeneratorInitialization`](crate::IdentifierError::GeneratorInitialization)
    ///   if the configuration names a custom generator
    pub fn register(store: Arc<GraphStore>, config: IdentifierConfig) -> IdentifierResult<Self> {
        Self::register_with_registry(store, config, &GeneratorRegistry::new())
    }

    /// Register a module, resolving custom generators from `registry`.
    pub fn register_with_registry(
        store: Arc<GraphStore>,
        config: IdentifierConfig,
        registry: &GeneratorRegistry,
    ) -> IdentifierResult<Self> {
        config.validate()?;
        let generator = registry.resolve(&config.generator)?;

        let excluded_labels = match &config.generator {
            GeneratorKind::Sequence(sequence) => vec![sequence.label.clone()],
            GeneratorKind::Random | GeneratorKind::Custom(_) => Vec::new(),
        };
        let coordinator = Arc::new(AssignmentCoordinator::new(config, generator, excluded_labels));

        let mut tx = store.begin_write()?;
        let config = coordinator.config();
        for kind in EntityKind::ALL {
            coordinator.index(kind).ensure(&mut tx, &config.identifier_property, &config.module_id)?;
        }
        tx.commit()?;

        store.register_hook(Arc::clone(&coordinator) as Arc<dyn CommitHook>);
        info!(
            module = %config.module_id,
            property = %config.identifier_property,
            generator = config.generator.name(),
            immutable = config.immutable,
            "identifier module registered"
        );
        Ok(Self { store, coordinator })
    }

    /// The module id.
    #[must_use]
    pub fn module_id(&self) -> &str {
        &self.coordinator.config().module_id
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &IdentifierConfig {
        self.coordinator.config()
    }

    /// The store the module is installed on.
    #[must_use]
    pub fn store(&self) -> &Arc<GraphStore> {
        &self.store
    }

    /// The index for a kind.
    #[must_use]
    pub fn index(&self, kind: EntityKind) -> &IdentifierIndex {
        self.coordinator.index(kind)
    }

    /// Give every qualifying element already in the store an identifier.
    ///
    /// See [`AssignmentCoordinator::initialize`].
    pub fn initialize(&self) -> IdentifierResult<InitializationReport> {
        self.coordinator.initialize(&self.store)
    }

    /// A reader over this module's indexes.
    #[must_use]
    pub fn reader(&self) -> IdentifierReader<'_> {
        IdentifierReader::new(
            &self.store,
            self.coordinator.index(EntityKind::Node),
            self.coordinator.index(EntityKind::Relationship),
        )
    }
}

impl std::fmt::Debug for IdentifierModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentifierModule").field("coordinator", &self.coordinator).finish_non_exhaustive()
    }
}

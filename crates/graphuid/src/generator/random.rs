//! Random UUID generator.

use graphuid_graph::GraphStore;
use uuid::Uuid;

use super::IdentifierGenerator;
use crate::error::IdentifierResult;
use crate::identifier::Identifier;

/// Generates version 4 UUIDs in their hyphenated text form.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGenerator;

impl IdentifierGenerator for RandomGenerator {
    fn name(&self) -> &str {
        "random"
    }

    fn generate(&self, _store: &GraphStore) -> IdentifierResult<Identifier> {
        Ok(Identifier::Text(Uuid::new_v4().hyphenated().to_string()))
    }
}

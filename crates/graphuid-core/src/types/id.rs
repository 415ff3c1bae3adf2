//! Internal element ids.
//!
//! These are the host store's own references, allocated on creation and never
//! reused while the element exists. They are distinct from the user-visible
//! identifiers that the `graphuid` engine writes into properties.

use serde::{Deserialize, Serialize};

id_type! {
    /// Id of a node.
    EntityId
}

id_type! {
    /// Id of a relationship.
    EdgeId
}

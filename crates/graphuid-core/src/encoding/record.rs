//! [`Record`] impls for the stored graph elements.

use crate::types::{Edge, Entity};

use super::traits::Record;

impl Record for Entity {}

impl Record for Edge {}

//! Core types for customer-api

use serde::{Deserialize, Serialize};

/// Customer identifier, assigned by the store on first insert
pub type CustomerId = String;

/// Customer record
///
/// `id` is optional so that request bodies can omit it on creation.
/// Persisted customers always carry one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CustomerId>,
    pub name: String,
    pub age: i32,
}

impl Customer {
    /// Customer without an id, ready to be inserted
    pub fn new(name: impl Into<String>, age: i32) -> Self {
        Self {
            id: None,
            name: name.into(),
            age,
        }
    }

    pub fn with_id(id: impl Into<CustomerId>, name: impl Into<String>, age: i32) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            age,
        }
    }

    /// The id if present and non-empty
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Keep this customer's identity, take mutable fields from `changes`
    pub fn merged_with(&self, changes: &Customer) -> Customer {
        Customer {
            id: self.id.clone(),
            name: changes.name.clone(),
            age: changes.age,
        }
    }
}

//! Collection schema model
//!
//! A snapshot of collection definitions is the immutable input to one
//! suggestion computation. Collections reference each other through
//! relation fields, so the schema forms a potentially cyclic graph.

use serde::{Deserialize, Serialize};

use crate::error::{KeyloomError, Result};

/// Kind of collection exposed by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    #[default]
    Base,
    /// Auth collections additionally contribute `@request.auth.*` keys.
    Auth,
    View,
}

/// Typed field of a collection.
///
/// Relation fields name their target collection; the target is resolved
/// against the snapshot at key-generation time and may not exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Number,
    Bool,
    Email,
    Url,
    Date,
    Select,
    Json,
    File,
    Relation { collection: String },
}

impl FieldType {
    pub fn is_relation(&self) -> bool {
        matches!(self, FieldType::Relation { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(flatten)]
    pub typ: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, typ: FieldType) -> Self {
        Self {
            name: name.into(),
            typ,
        }
    }
}

/// A named schema definition, analogous to a database table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: CollectionKind,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Collection {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A schema snapshot: the set of known collections plus an optional
/// reference ("base") collection name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_collection: Option<String>,
    #[serde(default)]
    pub collections: Vec<Collection>,
}

impl Snapshot {
    /// Parse a snapshot from its JSON representation.
    pub fn from_json(payload: &str) -> Result<Self> {
        serde_json::from_str(payload)
            .map_err(|e| KeyloomError::Parse(format!("Invalid schema snapshot: {}", e)))
    }

    /// Look up a collection by name.
    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_snapshot_with_relation_field() {
        let payload = r#"{
            "base_collection": "posts",
            "collections": [
                {
                    "id": "col_posts",
                    "name": "posts",
                    "fields": [
                        {"name": "title", "type": "text"},
                        {"name": "author", "type": "relation", "collection": "users"}
                    ]
                },
                {
                    "id": "col_users",
                    "name": "users",
                    "kind": "auth",
                    "fields": [{"name": "email", "type": "email"}]
                }
            ]
        }"#;

        let snapshot = Snapshot::from_json(payload).unwrap();
        assert_eq!(snapshot.base_collection.as_deref(), Some("posts"));
        assert_eq!(snapshot.collections.len(), 2);

        let posts = snapshot.collection("posts").unwrap();
        assert_eq!(
            posts.field("author").unwrap().typ,
            FieldType::Relation {
                collection: "users".to_string()
            }
        );
        assert!(posts.field("author").unwrap().typ.is_relation());

        let users = snapshot.collection("users").unwrap();
        assert_eq!(users.kind, CollectionKind::Auth);
    }

    #[test]
    fn collection_kind_defaults_to_base() {
        let payload = r#"{"collections": [{"id": "c1", "name": "notes", "fields": []}]}"#;
        let snapshot = Snapshot::from_json(payload).unwrap();
        assert_eq!(snapshot.collections[0].kind, CollectionKind::Base);
        assert_eq!(snapshot.base_collection, None);
    }

    #[test]
    fn malformed_snapshot_is_a_parse_error() {
        let err = Snapshot::from_json("{not json").unwrap_err();
        assert!(matches!(err, KeyloomError::Parse(_)));
    }
}

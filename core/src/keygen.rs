//! Autocomplete key generation
//!
//! Enumerates the dotted access paths reachable from a collection schema:
//! plain field names, `expand.<relation>.<field>` chains through relation
//! fields, and the `@request.*` / `@collection.*` prefixed forms used in
//! filter expressions.

use std::collections::HashSet;

use keyloom_common::schema::{Collection, CollectionKind, FieldType};

/// How many relation expansion levels a single key may traverse.
///
/// This bound also makes enumeration terminate on cyclic relation graphs.
pub const MAX_EXPAND_DEPTH: usize = 3;

/// Capability for producing autocomplete keys from a schema snapshot.
///
/// The worker consumes this as an opaque dependency so it can be tested
/// with synthetic generators.
pub trait KeyGenerator {
    /// Keys reachable from the base collection's own fields and relations.
    fn collection_keys(&self, collections: &[Collection], base: Option<&str>) -> Vec<String>;

    /// Keys usable in request-time filter expressions (`@request.*`).
    fn request_keys(&self, collections: &[Collection], base: Option<&str>) -> Vec<String>;

    /// Keys usable when joining across collections (`@collection.*`).
    fn collection_join_keys(&self, collections: &[Collection]) -> Vec<String>;
}

/// Default generator walking the snapshot's relation graph.
#[derive(Debug, Clone)]
pub struct SchemaKeyGenerator {
    max_depth: usize,
}

impl Default for SchemaKeyGenerator {
    fn default() -> Self {
        Self {
            max_depth: MAX_EXPAND_DEPTH,
        }
    }
}

impl SchemaKeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the expansion depth bound.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    fn keys_for(
        &self,
        collections: &[Collection],
        collection: &Collection,
        prefix: &str,
        depth: usize,
        out: &mut Vec<String>,
    ) {
        for field in &collection.fields {
            out.push(format!("{}{}", prefix, field.name));

            if let FieldType::Relation { collection: target } = &field.typ
                && depth < self.max_depth
                && let Some(related) = collections.iter().find(|c| c.name == *target)
            {
                let nested = format!("{}expand.{}.", prefix, field.name);
                self.keys_for(collections, related, &nested, depth + 1, out);
            }
        }
    }
}

impl KeyGenerator for SchemaKeyGenerator {
    fn collection_keys(&self, collections: &[Collection], base: Option<&str>) -> Vec<String> {
        let mut keys = Vec::new();

        if let Some(name) = base
            && let Some(collection) = collections.iter().find(|c| c.name == name)
        {
            self.keys_for(collections, collection, "", 0, &mut keys);
        }

        keys
    }

    fn request_keys(&self, collections: &[Collection], base: Option<&str>) -> Vec<String> {
        let mut keys = vec!["@request.context".to_string(), "@request.method".to_string()];

        if let Some(collection) = base.and_then(|name| collections.iter().find(|c| c.name == name))
        {
            for field in &collection.fields {
                if !field.typ.is_relation() {
                    keys.push(format!("@request.query.{}", field.name));
                }
                keys.push(format!("@request.body.{}", field.name));
            }
        }

        // Every auth collection is a candidate identity for @request.auth,
        // so their key sets are merged, first occurrence wins.
        let mut seen = HashSet::new();
        for auth in collections.iter().filter(|c| c.kind == CollectionKind::Auth) {
            for key in self.collection_keys(collections, Some(&auth.name)) {
                let qualified = format!("@request.auth.{}", key);
                if seen.insert(qualified.clone()) {
                    keys.push(qualified);
                }
            }
        }

        keys
    }

    fn collection_join_keys(&self, collections: &[Collection]) -> Vec<String> {
        let mut keys = Vec::new();

        for collection in collections {
            for key in self.collection_keys(collections, Some(&collection.name)) {
                keys.push(format!("@collection.{}.{}", collection.name, key));
            }
        }

        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyloom_common::schema::Field;
    use pretty_assertions::assert_eq;

    fn collection(id: &str, name: &str, kind: CollectionKind, fields: Vec<Field>) -> Collection {
        Collection {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            fields,
        }
    }

    fn relation(name: &str, target: &str) -> Field {
        Field::new(
            name,
            FieldType::Relation {
                collection: target.to_string(),
            },
        )
    }

    fn blog_schema() -> Vec<Collection> {
        vec![
            collection(
                "col_posts",
                "posts",
                CollectionKind::Base,
                vec![
                    Field::new("title", FieldType::Text),
                    Field::new("published", FieldType::Bool),
                    relation("author", "users"),
                ],
            ),
            collection(
                "col_users",
                "users",
                CollectionKind::Auth,
                vec![
                    Field::new("email", FieldType::Email),
                    relation("company", "companies"),
                ],
            ),
            collection(
                "col_companies",
                "companies",
                CollectionKind::Base,
                vec![Field::new("name", FieldType::Text)],
            ),
        ]
    }

    #[test]
    fn collection_keys_follow_relations_through_expand() {
        let generator = SchemaKeyGenerator::new();
        let keys = generator.collection_keys(&blog_schema(), Some("posts"));

        assert_eq!(
            keys,
            vec![
                "title",
                "published",
                "author",
                "expand.author.email",
                "expand.author.company",
                "expand.author.expand.company.name",
            ]
        );
    }

    #[test]
    fn missing_or_unknown_base_yields_no_keys() {
        let generator = SchemaKeyGenerator::new();
        assert!(generator.collection_keys(&blog_schema(), None).is_empty());
        assert!(
            generator
                .collection_keys(&blog_schema(), Some("comments"))
                .is_empty()
        );
    }

    #[test]
    fn unknown_relation_target_contributes_only_the_bare_field() {
        let generator = SchemaKeyGenerator::new();
        let collections = vec![collection(
            "c1",
            "posts",
            CollectionKind::Base,
            vec![relation("orphan", "missing")],
        )];

        assert_eq!(
            generator.collection_keys(&collections, Some("posts")),
            vec!["orphan"]
        );
    }

    #[test]
    fn cyclic_relations_terminate_at_the_depth_bound() {
        let collections = vec![
            collection(
                "c_a",
                "a",
                CollectionKind::Base,
                vec![relation("to_b", "b")],
            ),
            collection(
                "c_b",
                "b",
                CollectionKind::Base,
                vec![relation("to_a", "a")],
            ),
        ];

        let generator = SchemaKeyGenerator::with_max_depth(2);
        let keys = generator.collection_keys(&collections, Some("a"));

        assert_eq!(
            keys,
            vec!["to_b", "expand.to_b.to_a", "expand.to_b.expand.to_a.to_b"]
        );
    }

    #[test]
    fn request_keys_cover_static_query_body_and_auth() {
        let generator = SchemaKeyGenerator::new();
        let keys = generator.request_keys(&blog_schema(), Some("posts"));

        assert!(keys.contains(&"@request.context".to_string()));
        assert!(keys.contains(&"@request.method".to_string()));
        assert!(keys.contains(&"@request.query.title".to_string()));
        assert!(keys.contains(&"@request.body.author".to_string()));
        assert!(keys.contains(&"@request.auth.email".to_string()));
        assert!(keys.contains(&"@request.auth.expand.company.name".to_string()));

        // Relation fields are not query parameters.
        assert!(!keys.contains(&"@request.query.author".to_string()));
    }

    #[test]
    fn request_keys_without_base_still_carry_static_and_auth_keys() {
        let generator = SchemaKeyGenerator::new();
        let keys = generator.request_keys(&blog_schema(), None);

        assert!(keys.contains(&"@request.method".to_string()));
        assert!(keys.contains(&"@request.auth.email".to_string()));
        assert!(!keys.iter().any(|k| k.starts_with("@request.body.")));
    }

    #[test]
    fn auth_keys_from_multiple_collections_are_deduplicated() {
        let mut collections = blog_schema();
        collections.push(collection(
            "col_admins",
            "admins",
            CollectionKind::Auth,
            vec![Field::new("email", FieldType::Email)],
        ));

        let generator = SchemaKeyGenerator::new();
        let keys = generator.request_keys(&collections, None);
        let email_keys = keys
            .iter()
            .filter(|k| *k == "@request.auth.email")
            .count();
        assert_eq!(email_keys, 1);
    }

    #[test]
    fn join_keys_qualify_every_collection() {
        let generator = SchemaKeyGenerator::new();
        let keys = generator.collection_join_keys(&blog_schema());

        assert!(keys.contains(&"@collection.posts.title".to_string()));
        assert!(keys.contains(&"@collection.users.email".to_string()));
        assert!(keys.contains(&"@collection.companies.name".to_string()));
        assert!(keys.contains(&"@collection.posts.expand.author.email".to_string()));
    }
}

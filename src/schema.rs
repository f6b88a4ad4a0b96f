//! Schema registry: which fields of a record type users may query.
//!
//! A schema is declared once per record type, validated by
//! [`build_schema`], and then shared read-only by every query compiled
//! against that type.
//!
//! ```
//! use userquery::schema::{FieldDeclaration, SchemaDeclaration, TypeClass, build_schema};
//!
//! struct Track {
//!     title: String,
//!     rating: i64,
//! }
//!
//! let schema = build_schema(
//!     SchemaDeclaration::new("track")
//!         .field(FieldDeclaration::new("title", TypeClass::String).read(|t: &Track| t.title.as_str().into()))
//!         .field(FieldDeclaration::new("rating", TypeClass::Int).read(|t: &Track| t.rating.into()))
//!         .default_field("title"),
//! )
//! .unwrap();
//!
//! assert!(schema.field("RATING").is_some());
//! assert_eq!(schema.default_field().unwrap().query_name(), "title");
//! ```

use std::{collections::HashMap, sync::Arc};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{ast::Operator, error::QueryError, value::Value};

/// Reads one field out of a record.
pub type Accessor<R> = Arc<dyn Fn(&R) -> Value + Send + Sync>;

/// Category of a field, deciding which operators it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeClass {
    #[serde(alias = "integer")]
    Int,
    #[serde(alias = "number")]
    Float,
    Duration,
    String,
    Enum,
}

impl TypeClass {
    /// Accepts `<`, `<=`, `>` and `>=`.
    pub fn orderable(self) -> bool {
        matches!(self, TypeClass::Int | TypeClass::Float | TypeClass::Duration)
    }

    /// Accepts `^`, `!^`, `$`, `!$`, `*` and `!*`.
    pub fn string_matchable(self) -> bool {
        matches!(self, TypeClass::String)
    }

    pub fn supports(self, op: Operator) -> bool {
        if op.is_ordering() {
            self.orderable()
        } else if op.is_string_match() {
            self.string_matchable()
        } else {
            true
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TypeClass::Int => "int",
            TypeClass::Float => "float",
            TypeClass::Duration => "duration",
            TypeClass::String => "string",
            TypeClass::Enum => "enum",
        }
    }
}

impl std::fmt::Display for TypeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors found while building a schema.
///
/// These are configuration mistakes, reported once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("type {entity} field `{field}` is not readable")]
    Unreadable { entity: String, field: String },

    #[error("type {entity} default field `{field}` not found")]
    DefaultFieldNotFound { entity: String, field: String },

    #[error("type {entity} default field `{field}` is not user queryable")]
    DefaultFieldNotQueryable { entity: String, field: String },

    #[error("type {entity} declares query name `{query_name}` more than once")]
    DuplicateQueryName { entity: String, query_name: String },

    #[error("type {entity} enum field `{field}` declares no variants")]
    EnumWithoutVariants { entity: String, field: String },
}

/// Declaration of one record field, before validation.
pub struct FieldDeclaration<R> {
    name: String,
    query_name: Option<String>,
    type_class: TypeClass,
    variants: Vec<String>,
    accessor: Option<Accessor<R>>,
}

impl<R> FieldDeclaration<R> {
    /// Declare a field, queryable under its own name.
    pub fn new(name: impl Into<String>, type_class: TypeClass) -> Self {
        let name = name.into();
        FieldDeclaration {
            query_name: Some(name.clone()),
            name,
            type_class,
            variants: Vec::new(),
            accessor: None,
        }
    }

    /// Name users type in queries, when it differs from the field name.
    pub fn query_name(mut self, query_name: impl Into<String>) -> Self {
        self.query_name = Some(query_name.into());
        self
    }

    /// Exclude the field from user queries.
    pub fn hidden(mut self) -> Self {
        self.query_name = None;
        self
    }

    /// Variant names of an enum field, in declaration order.
    pub fn variants<I, S>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variants = variants.into_iter().map(Into::into).collect();
        self
    }

    pub fn read<F>(mut self, accessor: F) -> Self
    where
        F: Fn(&R) -> Value + Send + Sync + 'static,
    {
        self.accessor = Some(Arc::new(accessor));
        self
    }
}

/// Declaration of a record type's queryable surface.
pub struct SchemaDeclaration<R> {
    entity: String,
    fields: Vec<FieldDeclaration<R>>,
    default_field: Option<String>,
}

impl<R> SchemaDeclaration<R> {
    pub fn new(entity: impl Into<String>) -> Self {
        SchemaDeclaration {
            entity: entity.into(),
            fields: Vec::new(),
            default_field: None,
        }
    }

    pub fn field(mut self, field: FieldDeclaration<R>) -> Self {
        self.fields.push(field);
        self
    }

    /// Field that bare literals are compared against, by field name.
    pub fn default_field(mut self, name: impl Into<String>) -> Self {
        self.default_field = Some(name.into());
        self
    }
}

/// Validated description of one queryable field.
pub struct FieldDescriptor<R> {
    name: String,
    query_name: String,
    type_class: TypeClass,
    variants: Vec<String>,
    orderable: bool,
    string_matchable: bool,
    accessor: Accessor<R>,
}

impl<R> FieldDescriptor<R> {
    /// Declared field name (column name for SQL adapters).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn query_name(&self) -> &str {
        &self.query_name
    }

    pub fn type_class(&self) -> TypeClass {
        self.type_class
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    pub fn orderable(&self) -> bool {
        self.orderable
    }

    pub fn string_matchable(&self) -> bool {
        self.string_matchable
    }

    pub fn supports(&self, op: Operator) -> bool {
        self.type_class.supports(op)
    }

    /// Read this field out of a record.
    pub fn read(&self, record: &R) -> Value {
        (self.accessor)(record)
    }

    /// Parse a literal into this field's native type.
    pub fn parse_literal(&self, literal: &str) -> Result<Value, QueryError> {
        crate::value::parse_literal(self.type_class, literal, &self.variants).ok_or_else(|| {
            QueryError::InvalidLiteral {
                literal: literal.to_string(),
                field: self.query_name.clone(),
                type_class: self.type_class,
            }
        })
    }
}

impl<R> std::fmt::Debug for FieldDescriptor<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("query_name", &self.query_name)
            .field("type_class", &self.type_class)
            .field("variants", &self.variants)
            .finish_non_exhaustive()
    }
}

/// Queryable fields of one record type.
pub struct EntitySchema<R> {
    entity: String,
    fields: Vec<FieldDescriptor<R>>,
    by_query_name: HashMap<String, usize>,
    default_field: Option<usize>,
}

impl<R> EntitySchema<R> {
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Queryable fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor<R>] {
        &self.fields
    }

    pub fn query_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(FieldDescriptor::query_name)
    }

    /// Look up a field by query name, ignoring case.
    pub fn field(&self, query_name: &str) -> Option<&FieldDescriptor<R>> {
        self.by_query_name
            .get(&query_name.to_lowercase())
            .map(|&i| &self.fields[i])
    }

    pub fn contains(&self, query_name: &str) -> bool {
        self.by_query_name.contains_key(&query_name.to_lowercase())
    }

    pub fn default_field(&self) -> Option<&FieldDescriptor<R>> {
        self.default_field.map(|i| &self.fields[i])
    }
}

impl<R> std::fmt::Debug for EntitySchema<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitySchema")
            .field("entity", &self.entity)
            .field("fields", &self.fields)
            .field("default_field", &self.default_field().map(FieldDescriptor::query_name))
            .finish()
    }
}

/// Validate a declaration into a schema.
///
/// Fails when a queryable field has no accessor, when the default field
/// names no declared field, or when the default field is hidden from queries.
pub fn build_schema<R>(declaration: SchemaDeclaration<R>) -> Result<EntitySchema<R>, SchemaError> {
    let SchemaDeclaration {
        entity,
        fields: declarations,
        default_field,
    } = declaration;

    // Resolve the default field against every declaration, hidden ones included.
    let default_query_name = match &default_field {
        None => None,
        Some(name) => {
            let decl = declarations.iter().find(|d| &d.name == name).ok_or_else(|| {
                SchemaError::DefaultFieldNotFound {
                    entity: entity.clone(),
                    field: name.clone(),
                }
            })?;
            if decl.accessor.is_none() {
                return Err(SchemaError::Unreadable {
                    entity: entity.clone(),
                    field: name.clone(),
                });
            }
            let query_name = decl.query_name.clone().ok_or_else(|| {
                SchemaError::DefaultFieldNotQueryable {
                    entity: entity.clone(),
                    field: name.clone(),
                }
            })?;
            Some(query_name.to_lowercase())
        }
    };

    let mut fields = Vec::new();
    let mut by_query_name = HashMap::new();

    for decl in declarations {
        let Some(query_name) = decl.query_name else {
            continue;
        };
        let accessor = decl.accessor.ok_or_else(|| SchemaError::Unreadable {
            entity: entity.clone(),
            field: decl.name.clone(),
        })?;
        if decl.type_class == TypeClass::Enum && decl.variants.is_empty() {
            return Err(SchemaError::EnumWithoutVariants {
                entity: entity.clone(),
                field: decl.name,
            });
        }

        let key = query_name.to_lowercase();
        if by_query_name.insert(key, fields.len()).is_some() {
            return Err(SchemaError::DuplicateQueryName {
                entity: entity.clone(),
                query_name,
            });
        }

        fields.push(FieldDescriptor {
            name: decl.name,
            query_name,
            orderable: decl.type_class.orderable(),
            string_matchable: decl.type_class.string_matchable(),
            type_class: decl.type_class,
            variants: decl.variants,
            accessor,
        });
    }

    let default_field = default_query_name.and_then(|key| by_query_name.get(&key).copied());

    debug!(
        entity = %entity,
        fields = fields.len(),
        default_field = ?default_field.map(|i: usize| fields[i].query_name.as_str()),
        "built query schema"
    );

    Ok(EntitySchema {
        entity,
        fields,
        by_query_name,
        default_field,
    })
}

/// Record types that declare their own queryable surface.
///
/// Build the schema once at startup and share it:
///
/// ```
/// use std::sync::LazyLock;
/// use userquery::schema::{EntitySchema, FieldDeclaration, Queryable, SchemaDeclaration, TypeClass};
///
/// struct Playlist {
///     name: String,
/// }
///
/// impl Queryable for Playlist {
///     fn declare() -> SchemaDeclaration<Self> {
///         SchemaDeclaration::new("playlist")
///             .field(FieldDeclaration::new("name", TypeClass::String).read(|p: &Playlist| p.name.as_str().into()))
///             .default_field("name")
///     }
/// }
///
/// static PLAYLISTS: LazyLock<EntitySchema<Playlist>> =
///     LazyLock::new(|| Playlist::schema().expect("playlist schema"));
///
/// assert_eq!(PLAYLISTS.entity(), "playlist");
/// ```
pub trait Queryable: Sized {
    fn declare() -> SchemaDeclaration<Self>;

    fn schema() -> Result<EntitySchema<Self>, SchemaError> {
        build_schema(Self::declare())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Track {
        title: String,
        rating: i64,
    }

    fn track_fields() -> SchemaDeclaration<Track> {
        SchemaDeclaration::new("track")
            .field(FieldDeclaration::new("title", TypeClass::String).read(|t: &Track| t.title.as_str().into()))
            .field(FieldDeclaration::new("rating", TypeClass::Int).read(|t: &Track| t.rating.into()))
    }

    #[test]
    fn test_lookup_ignores_case() {
        let schema = build_schema(track_fields()).unwrap();
        assert_eq!(schema.field("Title").unwrap().name(), "title");
        assert!(schema.contains("RATING"));
        assert!(schema.field("length").is_none());
        assert!(schema.default_field().is_none());
    }

    #[test]
    fn test_capabilities_follow_type_class() {
        let schema = build_schema(track_fields()).unwrap();
        let title = schema.field("title").unwrap();
        let rating = schema.field("rating").unwrap();
        assert!(title.string_matchable() && !title.orderable());
        assert!(rating.orderable() && !rating.string_matchable());
    }

    #[test]
    fn test_unreadable_field() {
        let err = build_schema(track_fields().field(FieldDeclaration::new("secret", TypeClass::String)))
            .unwrap_err();
        assert!(matches!(err, SchemaError::Unreadable { ref field, .. } if field == "secret"));
    }

    #[test]
    fn test_hidden_unreadable_field_is_ignored() {
        let schema =
            build_schema(track_fields().field(FieldDeclaration::new("hash", TypeClass::String).hidden()))
                .unwrap();
        assert!(!schema.contains("hash"));
    }

    #[test]
    fn test_default_field_must_exist() {
        let err = build_schema(track_fields().default_field("name")).unwrap_err();
        assert!(matches!(err, SchemaError::DefaultFieldNotFound { .. }));
    }

    #[test]
    fn test_default_field_must_be_queryable() {
        let err = build_schema(
            track_fields()
                .field(FieldDeclaration::new("path", TypeClass::String).hidden().read(|_: &Track| Value::Null))
                .default_field("path"),
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DefaultFieldNotQueryable { .. }));
    }

    #[test]
    fn test_default_field_by_field_name() {
        let schema = build_schema(
            SchemaDeclaration::new("track")
                .field(
                    FieldDeclaration::new("title", TypeClass::String)
                        .query_name("name")
                        .read(|t: &Track| t.title.as_str().into()),
                )
                .default_field("title"),
        )
        .unwrap();
        assert_eq!(schema.default_field().unwrap().query_name(), "name");
    }

    #[test]
    fn test_duplicate_query_names() {
        let err = build_schema(
            track_fields().field(
                FieldDeclaration::new("name", TypeClass::String)
                    .query_name("TITLE")
                    .read(|t: &Track| t.title.as_str().into()),
            ),
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateQueryName { .. }));
    }

    #[test]
    fn test_schema_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EntitySchema<Track>>();
    }
}

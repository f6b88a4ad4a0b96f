//! List the queryable fields of a schema

use std::fmt::Write;

use crate::schema::EntitySchema;

/// One line per queryable field: name, type class, and enum variants.
/// The default field is marked with `*`.
pub fn describe_fields<R>(schema: &EntitySchema<R>) -> String {
    let default = schema.default_field().map(|f| f.query_name());
    let width = schema.query_names().map(str::len).max().unwrap_or(0);

    let mut out = format!("{}\n", schema.entity());
    for field in schema.fields() {
        let marker = if Some(field.query_name()) == default { '*' } else { ' ' };
        let _ = write!(out, "{} {:width$}  {}", marker, field.query_name(), field.type_class());
        if !field.variants().is_empty() {
            let _ = write!(out, " ({})", field.variants().join(", "));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        schema::{FieldDeclaration, SchemaDeclaration, TypeClass, build_schema},
        value::Value,
    };

    #[test]
    fn test_describe_fields() {
        let schema = build_schema(
            SchemaDeclaration::new("media")
                .field(FieldDeclaration::new("title", TypeClass::String).read(|_: &()| Value::Null))
                .field(
                    FieldDeclaration::new("genre", TypeClass::Enum)
                        .variants(["Jazz", "Rock"])
                        .read(|_: &()| Value::Null),
                )
                .default_field("title"),
        )
        .unwrap();

        assert_eq!(
            describe_fields(&schema),
            "media\n* title  string\n  genre  enum (Jazz, Rock)\n"
        );
    }
}

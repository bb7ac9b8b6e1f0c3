use plugin_framework::model::{FieldAttribute, ResourceFieldDescriptor, ValueType};
use plugin_framework::schema::{derive_schema, Dialect, RowParser, SchemaCache};
use plugin_framework::{base_resource, database_list, ConfigError, ResourceBuilder};
use serde_json::json;

fn list_fields() -> Vec<ResourceFieldDescriptor> {
    vec![
        ResourceFieldDescriptor::new(
            "id",
            ValueType::Integer,
            vec![
                FieldAttribute::AutoIncrement,
                FieldAttribute::PrimaryKeyConstraint(None),
                FieldAttribute::Required,
            ],
        ),
        ResourceFieldDescriptor::new("value", ValueType::String, vec![FieldAttribute::Required]),
        ResourceFieldDescriptor::new(
            "label",
            ValueType::String,
            vec![FieldAttribute::Required, FieldAttribute::UniqueConstraint(None)],
        ),
    ]
}

#[test]
fn test_end_to_end_list_schema() {
    let schema = derive_schema(&list_fields()).unwrap();
    let ddl = schema.table_definition("wp_colors", Dialect::MySQL, None);
    assert_eq!(
        ddl,
        "CREATE TABLE IF NOT EXISTS wp_colors (\n    \
         id INTEGER AUTO_INCREMENT NOT NULL,\n    \
         value VARCHAR(255) NOT NULL,\n    \
         label VARCHAR(255) NOT NULL,\n    \
         CONSTRAINT PK_id PRIMARY KEY (id),\n    \
         CONSTRAINT UC_label UNIQUE (label)\n)"
    );
    assert_eq!(ddl.matches("PRIMARY KEY (id)").count(), 1);
    assert_eq!(ddl.matches("UNIQUE").count(), 1);

    assert_eq!(
        schema.rest_args_json(false),
        json!({
            "value": {"type": "string", "required": true},
            "label": {"type": "string", "required": true}
        })
    );
    assert_eq!(
        schema.rest_args_json(true)["id"],
        json!({"type": "integer", "required": true})
    );
}

#[test]
fn test_rest_required_key_only_when_required() {
    let fields = vec![
        ResourceFieldDescriptor::new("name", ValueType::String, vec![FieldAttribute::Required]),
        ResourceFieldDescriptor::new("note", ValueType::String, vec![]),
    ];
    let args = derive_schema(&fields).unwrap().rest_args_json(false);
    assert_eq!(args["name"], json!({"type": "string", "required": true}));
    assert_eq!(args["note"], json!({"type": "string"}));
}

#[test]
fn test_derivation_is_idempotent() {
    let fields = list_fields();
    let a = derive_schema(&fields).unwrap();
    let b = derive_schema(&fields).unwrap();
    for dialect in [Dialect::MySQL, Dialect::PostgreSQL] {
        assert_eq!(
            a.table_definition("t", dialect, Some("ENGINE=InnoDB")),
            b.table_definition("t", dialect, Some("ENGINE=InnoDB"))
        );
    }
}

#[test]
fn test_attribute_order_is_reproduced() {
    let orders = [
        vec![FieldAttribute::Required, FieldAttribute::AutoIncrement],
        vec![FieldAttribute::AutoIncrement, FieldAttribute::Required],
    ];
    let rendered: Vec<String> = orders
        .iter()
        .map(|attrs| {
            let f = ResourceFieldDescriptor::new("n", ValueType::Integer, attrs.clone());
            derive_schema(&[f]).unwrap().definition_body(Dialect::MySQL)
        })
        .collect();
    assert_eq!(rendered[0], "n INTEGER NOT NULL AUTO_INCREMENT");
    assert_eq!(rendered[1], "n INTEGER AUTO_INCREMENT NOT NULL");

    let fields = vec![
        ResourceFieldDescriptor::new("b", ValueType::String, vec![FieldAttribute::UniqueConstraint(None)]),
        ResourceFieldDescriptor::new("a", ValueType::Integer, vec![FieldAttribute::PrimaryKeyConstraint(None)]),
    ];
    let body = derive_schema(&fields).unwrap().definition_body(Dialect::MySQL);
    assert!(body.find("UC_b").unwrap() < body.find("PK_a").unwrap());
}

#[test]
fn test_unnamed_constraints_merge_only_within_a_field() {
    let fields = vec![
        ResourceFieldDescriptor::new(
            "a",
            ValueType::String,
            vec![FieldAttribute::UniqueConstraint(None), FieldAttribute::UniqueConstraint(None)],
        ),
        ResourceFieldDescriptor::new("b", ValueType::String, vec![FieldAttribute::UniqueConstraint(None)]),
    ];
    let schema = derive_schema(&fields).unwrap();
    let rendered: Vec<String> = schema.constraints.iter().map(|c| c.render()).collect();
    assert_eq!(
        rendered,
        vec!["CONSTRAINT UC_a UNIQUE (a)", "CONSTRAINT UC_b UNIQUE (b)"]
    );
}

#[test]
fn test_named_constraint_spans_fields() {
    let fields = vec![
        ResourceFieldDescriptor::new(
            "first",
            ValueType::String,
            vec![FieldAttribute::UniqueConstraint(Some("name".into()))],
        ),
        ResourceFieldDescriptor::new(
            "last",
            ValueType::String,
            vec![FieldAttribute::UniqueConstraint(Some("name".into()))],
        ),
    ];
    let schema = derive_schema(&fields).unwrap();
    assert_eq!(schema.constraints.len(), 1);
    assert_eq!(schema.constraints[0].render(), "CONSTRAINT UC_name UNIQUE (first, last)");
}

#[test]
fn test_postgres_identity_column() {
    let schema = derive_schema(&list_fields()).unwrap();
    assert!(schema
        .definition_body(Dialect::PostgreSQL)
        .starts_with("id INTEGER GENERATED BY DEFAULT AS IDENTITY NOT NULL"));
}

#[test]
fn test_postgres_constraint_names_are_unique_per_table() {
    let colors = database_list("Shop\\ColorsList").build().unwrap();
    let sizes = database_list("Shop\\SizesList").build().unwrap();
    let cache = SchemaCache::new();
    let a = cache
        .get_or_derive(&colors)
        .unwrap()
        .derived
        .table_definition("wp_shop_colors", Dialect::PostgreSQL, None);
    let b = cache
        .get_or_derive(&sizes)
        .unwrap()
        .derived
        .table_definition("wp_shop_sizes", Dialect::PostgreSQL, None);
    let names = |ddl: &str| -> Vec<String> {
        ddl.lines()
            .filter_map(|l| l.trim().strip_prefix("CONSTRAINT "))
            .filter_map(|l| l.split_whitespace().next())
            .map(str::to_string)
            .collect()
    };
    assert_eq!(names(&a), vec!["wp_shop_colors_UC_label", "wp_shop_colors_PK_id"]);
    assert_eq!(names(&b), vec!["wp_shop_sizes_UC_label", "wp_shop_sizes_PK_id"]);
    assert!(names(&a).iter().all(|n| !names(&b).contains(n)));

    let mysql = cache
        .get_or_derive(&colors)
        .unwrap()
        .derived
        .table_definition("wp_shop_colors", Dialect::MySQL, None);
    assert_eq!(names(&mysql), vec!["UC_label", "PK_id"]);
}

#[test]
fn test_parse_row_null_and_empty() {
    let parser = RowParser::new(list_fields());
    assert_eq!(parser.parse_row(None).unwrap(), None);
    let record = parser.parse_row(Some(&serde_json::Map::new())).unwrap().unwrap();
    assert_eq!(record.len(), 3);
    assert!(record.values().all(|v| v.is_null()));
}

#[test]
fn test_inherited_resource_through_cache() {
    let def = database_list("Shop\\ColorsList").build().unwrap();
    let cache = SchemaCache::new();
    let first = cache.get_or_derive(&def).unwrap();
    let second = cache.get_or_derive(&def).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);
    let columns: Vec<&str> = first.derived.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(columns, vec!["value", "label", "inactive", "id"]);
}

#[test]
fn test_unsupported_type_in_resource() {
    let def = ResourceBuilder::new("Shop\\Event")
        .extends(base_resource())
        .field("when", ValueType::parse("DateTime"), [])
        .build()
        .unwrap();
    let err = SchemaCache::new().get_or_derive(&def).unwrap_err();
    assert_eq!(
        err,
        ConfigError::UnsupportedType {
            field: "when".into(),
            type_name: "DateTime".into()
        }
    );
}

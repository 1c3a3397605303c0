mod common;

use common::*;
use paramap_core::{
    resolve, DefaultClassifier, FieldId, MappingError, MappingTarget, MetadataProvider,
    ParameterDescriptor, TableId, TypeClassifier,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn date_options(query: paramap_core::QueryDefinition) -> serde_json::Value {
    let options = resolve(&sample_database(), &ParameterDescriptor::new("date/single"), &query)
        .expect("query resolves");
    serde_json::to_value(options).unwrap()
}

#[test]
fn returns_source_fields_then_foreign_key_fields() {
    let options = date_options(structured(json!({ "source-table": REVIEWS.0 })));

    assert_eq!(
        options,
        json!([
            {
                "sectionName": "Review",
                "icon": "calendar",
                "name": "Created At",
                "target": ["dimension", ["field", REVIEWS_CREATED_AT, null]],
                "isForeign": false
            },
            {
                "sectionName": "Product",
                "name": "Created At",
                "icon": "calendar",
                "target": [
                    "dimension",
                    ["field", PRODUCTS_CREATED_AT, { "source-field": REVIEWS_PRODUCT_ID }]
                ],
                "isForeign": true
            }
        ])
    );
}

#[test]
fn returns_explicit_joins_between_source_and_foreign_key_fields() {
    let options = date_options(structured(json!({
        "source-table": REVIEWS.0,
        "joins": [{ "alias": "Joined Table", "source-table": ORDERS.0 }]
    })));

    assert_eq!(
        options,
        json!([
            {
                "sectionName": "Review",
                "name": "Created At",
                "icon": "calendar",
                "target": ["dimension", ["field", 30, null]],
                "isForeign": false
            },
            {
                "sectionName": "Joined Table",
                "name": "Created At",
                "icon": "calendar",
                "target": ["dimension", ["field", 1, { "join-alias": "Joined Table" }]],
                "isForeign": true
            },
            {
                "sectionName": "Product",
                "name": "Created At",
                "icon": "calendar",
                "target": ["dimension", ["field", 22, { "source-field": 32 }]],
                "isForeign": true
            }
        ])
    );
}

#[test]
fn returns_fields_of_nested_query_without_section() {
    let options = date_options(structured(json!({
        "source-query": { "source-table": PRODUCTS.0 }
    })));

    assert_eq!(
        options,
        json!([
            {
                "sectionName": "",
                "name": "Created At",
                "icon": "calendar",
                "target": ["dimension", ["field", "CREATED_AT", { "base-type": "type/DateTime" }]],
                "isForeign": false
            }
        ])
    );
}

#[test]
fn nested_query_keeps_outer_joins_but_drops_implicit_ones() {
    let options = date_options(structured(json!({
        "source-query": { "source-table": REVIEWS.0 },
        "joins": [{ "alias": "P", "source-table": PRODUCTS.0 }]
    })));

    let sections: Vec<_> = options
        .as_array()
        .unwrap()
        .iter()
        .map(|o| (o["sectionName"].as_str().unwrap(), o["isForeign"].as_bool().unwrap()))
        .collect();
    assert_eq!(sections, vec![("", false), ("P", true)]);
}

#[test]
fn summarized_nested_query_exposes_its_result_columns() {
    let options = date_options(structured(json!({
        "source-query": {
            "source-table": ORDERS.0,
            "breakout": [["field", ORDERS_CREATED_AT, null]],
            "aggregation": [["count"], ["max", ["field", ORDERS_CREATED_AT, null]]]
        }
    })));

    assert_eq!(
        options,
        json!([
            {
                "sectionName": "",
                "name": "Created At",
                "icon": "calendar",
                "target": ["dimension", ["field", "CREATED_AT", { "base-type": "type/DateTime" }]],
                "isForeign": false
            },
            {
                "sectionName": "",
                "name": "Max of Created At",
                "icon": "calendar",
                "target": ["dimension", ["field", "max", { "base-type": "type/DateTime" }]],
                "isForeign": false
            }
        ])
    );
}

#[test]
fn foreign_keys_expand_in_source_field_order() {
    let options = date_options(structured(json!({ "source-table": ORDERS.0 })));

    let summary: Vec<_> = options
        .as_array()
        .unwrap()
        .iter()
        .map(|o| {
            (
                o["sectionName"].as_str().unwrap().to_string(),
                o["name"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Order".to_string(), "Created At".to_string()),
            ("User".to_string(), "Birth Date".to_string()),
            ("User".to_string(), "Created At".to_string()),
            ("Product".to_string(), "Created At".to_string()),
        ]
    );
    assert_eq!(
        options[1]["target"],
        json!(["dimension", ["field", PEOPLE_BIRTH_DATE, { "source-field": ORDERS_USER_ID }]])
    );
    assert_eq!(
        options[3]["target"],
        json!(["dimension", ["field", PRODUCTS_CREATED_AT, { "source-field": ORDERS_PRODUCT_ID }]])
    );
}

#[test]
fn returns_variables_for_plain_template_tags() {
    let options = date_options(native(json!({
        "query": "select * from ORDERS where CREATED_AT = {{created}}",
        "template-tags": {
            "created": { "type": "date", "name": "created" }
        }
    })));

    assert_eq!(
        options,
        json!([
            {
                "name": "created",
                "icon": "calendar",
                "target": ["variable", ["template-tag", "created"]],
                "isForeign": false
            }
        ])
    );
}

#[test]
fn returns_dimensions_for_dimension_template_tags() {
    let options = date_options(native(json!({
        "query": "select * from ORDERS where {{created}}",
        "template-tags": {
            "created": {
                "type": "dimension",
                "name": "created",
                "dimension": ["field", ORDERS_CREATED_AT, null]
            }
        }
    })));

    assert_eq!(
        options,
        json!([
            {
                "name": "Created At",
                "icon": "calendar",
                "target": ["dimension", ["template-tag", "created"]],
                "isForeign": false
            }
        ])
    );
}

#[test]
fn skips_template_tags_of_other_types() {
    let options = date_options(native(json!({
        "query": "select * from ORDERS where TOTAL > {{min}} and {{category}} and {{when}}",
        "template-tags": {
            "min": { "type": "number", "name": "min" },
            "category": {
                "type": "dimension",
                "name": "category",
                "dimension": ["field", 18, null]
            },
            "snippet: filters": { "type": "snippet", "name": "snippet: filters", "snippet-name": "filters" },
            "when": { "type": "date", "name": "when" }
        }
    })));

    assert_eq!(options.as_array().unwrap().len(), 1);
    assert_eq!(options[0]["target"], json!(["variable", ["template-tag", "when"]]));
}

#[test]
fn template_tags_resolve_in_declared_order() {
    let options = date_options(native(json!({
        "query": "select * from ORDERS where CREATED_AT between {{until}} and {{from}}",
        "template-tags": {
            "until": { "type": "date", "name": "until" },
            "from": { "type": "date", "name": "from" }
        }
    })));

    let names: Vec<_> = options
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["until", "from"]);
}

#[test]
fn nested_query_joins_contribute_columns() {
    let options = date_options(structured(json!({
        "source-query": {
            "source-table": REVIEWS.0,
            "joins": [{ "alias": "Orders", "source-table": ORDERS.0 }]
        }
    })));

    assert_eq!(
        options,
        json!([
            {
                "sectionName": "",
                "name": "Created At",
                "icon": "calendar",
                "target": ["dimension", ["field", "CREATED_AT", { "base-type": "type/DateTime" }]],
                "isForeign": false
            },
            {
                "sectionName": "",
                "name": "Orders → Created At",
                "icon": "calendar",
                "target": [
                    "dimension",
                    ["field", "Orders__CREATED_AT", { "base-type": "type/DateTime" }]
                ],
                "isForeign": false
            }
        ])
    );
}

#[test]
fn nested_join_to_unknown_table_is_an_error() {
    let query = structured(json!({
        "source-query": {
            "source-table": REVIEWS.0,
            "joins": [{ "alias": "Ghost", "source-table": 999 }]
        }
    }));

    let err = resolve(&sample_database(), &ParameterDescriptor::new("date/single"), &query)
        .unwrap_err();
    assert!(matches!(err, MappingError::UnknownTable(TableId(999))));
}

#[test]
fn join_on_nested_query_targets_named_column_through_alias() {
    let options = date_options(structured(json!({
        "source-table": REVIEWS.0,
        "joins": [{ "alias": "Q", "source-query": { "source-table": PRODUCTS.0 } }]
    })));

    assert_eq!(
        options[1],
        json!({
            "sectionName": "Q",
            "name": "Created At",
            "icon": "calendar",
            "target": [
                "dimension",
                ["field", "CREATED_AT", { "join-alias": "Q", "base-type": "type/DateTime" }]
            ],
            "isForeign": true
        })
    );
    let field_options = options[1]["target"][1][2].as_object().unwrap();
    assert_eq!(field_options.len(), 2);
    assert_eq!(options.as_array().unwrap().len(), 3);
}

#[test]
fn every_option_matches_the_parameter_class_and_nothing_is_missed() {
    let metadata = sample_database();
    let classifier = DefaultClassifier;

    for parameter_type in ["date/single", "string/=", "category", "number/=", "location/city", "id"] {
        let parameter = ParameterDescriptor::new(parameter_type);
        let class = classifier.classify(&parameter.parameter_type).unwrap();

        for table in [ORDERS, PEOPLE, PRODUCTS, REVIEWS] {
            let query = structured(json!({ "source-table": table.0 }));
            let options = resolve(&metadata, &parameter, &query).unwrap();

            let own: Vec<FieldId> = options
                .iter()
                .filter(|o| !o.is_foreign)
                .map(|o| match &o.target {
                    MappingTarget::Dimension(paramap_core::DimensionRef::Field(f)) => {
                        f.field_id().unwrap()
                    }
                    other => panic!("unexpected target {other:?}"),
                })
                .collect();

            let expected: Vec<FieldId> = metadata
                .table(table)
                .unwrap()
                .fields
                .iter()
                .copied()
                .filter(|id| {
                    let field = metadata.field(*id).unwrap();
                    classifier.accepts_column(class, &field.column_type)
                })
                .collect();

            assert_eq!(own, expected, "{parameter_type} on table {table}");
            assert!(options.iter().all(|o| {
                let MappingTarget::Dimension(paramap_core::DimensionRef::Field(f)) = &o.target else {
                    return false;
                };
                let field = metadata.field(f.field_id().unwrap()).unwrap();
                classifier.accepts_column(class, &field.column_type)
            }));
        }
    }
}

//! Sample database shared by the scenario tests: orders, people, products
//! and reviews, with the usual foreign keys between them.

#![allow(dead_code)]

use paramap_core::{Metadata, QueryDefinition, TableId};
use serde_json::json;

pub const ORDERS: TableId = TableId(1);
pub const PEOPLE: TableId = TableId(2);
pub const PRODUCTS: TableId = TableId(3);
pub const REVIEWS: TableId = TableId(4);

pub const ORDERS_CREATED_AT: u64 = 1;
pub const ORDERS_USER_ID: u64 = 9;
pub const ORDERS_PRODUCT_ID: u64 = 4;
pub const PEOPLE_BIRTH_DATE: u64 = 11;
pub const PEOPLE_CREATED_AT: u64 = 14;
pub const PRODUCTS_CREATED_AT: u64 = 22;
pub const REVIEWS_CREATED_AT: u64 = 30;
pub const REVIEWS_PRODUCT_ID: u64 = 32;

fn field(id: u64, name: &str, display_name: &str, base_type: &str) -> serde_json::Value {
    json!({ "id": id, "name": name, "display_name": display_name, "base_type": base_type })
}

fn typed(
    id: u64,
    name: &str,
    display_name: &str,
    base_type: &str,
    semantic_type: &str,
) -> serde_json::Value {
    let mut value = field(id, name, display_name, base_type);
    value["semantic_type"] = json!(semantic_type);
    value
}

fn fk(id: u64, name: &str, display_name: &str, target: u64) -> serde_json::Value {
    let mut value = typed(id, name, display_name, "type/Integer", "type/FK");
    value["fk_target_field_id"] = json!(target);
    value
}

pub fn sample_database() -> Metadata {
    serde_json::from_value(json!({
        "tables": [
            {
                "id": ORDERS.0, "name": "ORDERS", "display_name": "Orders", "schema": "PUBLIC",
                "fields": [
                    typed(3, "ID", "ID", "type/BigInteger", "type/PK"),
                    fk(ORDERS_USER_ID, "USER_ID", "User ID", 13),
                    fk(ORDERS_PRODUCT_ID, "PRODUCT_ID", "Product ID", 24),
                    field(5, "SUBTOTAL", "Subtotal", "type/Float"),
                    field(6, "TAX", "Tax", "type/Float"),
                    field(7, "TOTAL", "Total", "type/Float"),
                    field(8, "DISCOUNT", "Discount", "type/Float"),
                    typed(ORDERS_CREATED_AT, "CREATED_AT", "Created At", "type/DateTime", "type/CreationTimestamp"),
                    field(2, "QUANTITY", "Quantity", "type/Integer")
                ]
            },
            {
                "id": PEOPLE.0, "name": "PEOPLE", "display_name": "People", "schema": "PUBLIC",
                "fields": [
                    typed(13, "ID", "ID", "type/BigInteger", "type/PK"),
                    field(10, "ADDRESS", "Address", "type/Text"),
                    typed(17, "EMAIL", "Email", "type/Text", "type/Email"),
                    typed(15, "NAME", "Name", "type/Text", "type/Name"),
                    typed(12, "CITY", "City", "type/Text", "type/City"),
                    typed(16, "STATE", "State", "type/Text", "type/State"),
                    field(PEOPLE_BIRTH_DATE, "BIRTH_DATE", "Birth Date", "type/Date"),
                    typed(PEOPLE_CREATED_AT, "CREATED_AT", "Created At", "type/DateTime", "type/CreationTimestamp")
                ]
            },
            {
                "id": PRODUCTS.0, "name": "PRODUCTS", "display_name": "Products", "schema": "PUBLIC",
                "fields": [
                    typed(24, "ID", "ID", "type/BigInteger", "type/PK"),
                    field(19, "EAN", "Ean", "type/Text"),
                    typed(23, "TITLE", "Title", "type/Text", "type/Title"),
                    typed(18, "CATEGORY", "Category", "type/Text", "type/Category"),
                    typed(25, "VENDOR", "Vendor", "type/Text", "type/Company"),
                    field(20, "PRICE", "Price", "type/Float"),
                    field(21, "RATING", "Rating", "type/Float"),
                    typed(PRODUCTS_CREATED_AT, "CREATED_AT", "Created At", "type/DateTime", "type/CreationTimestamp")
                ]
            },
            {
                "id": REVIEWS.0, "name": "REVIEWS", "display_name": "Reviews", "schema": "PUBLIC",
                "fields": [
                    typed(31, "ID", "ID", "type/BigInteger", "type/PK"),
                    fk(REVIEWS_PRODUCT_ID, "PRODUCT_ID", "Product ID", 24),
                    field(34, "REVIEWER", "Reviewer", "type/Text"),
                    field(33, "RATING", "Rating", "type/Integer"),
                    field(29, "BODY", "Body", "type/Text"),
                    typed(REVIEWS_CREATED_AT, "CREATED_AT", "Created At", "type/DateTime", "type/CreationTimestamp")
                ]
            }
        ]
    }))
    .expect("sample database metadata is valid")
}

pub fn structured(query: serde_json::Value) -> QueryDefinition {
    serde_json::from_value(json!({ "type": "query", "database": 1, "query": query }))
        .expect("structured query is valid")
}

pub fn native(native: serde_json::Value) -> QueryDefinition {
    serde_json::from_value(json!({ "type": "native", "database": 1, "native": native }))
        .expect("native query is valid")
}

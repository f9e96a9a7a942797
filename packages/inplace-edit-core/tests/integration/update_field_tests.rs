//! Single-field update through the field update service.

use std::sync::Arc;

use serde_json::json;

use inplace_edit_core::error::{UpdateFieldError, ValueError};
use inplace_edit_core::host::{Connector, ConnectorRegistry, MemoryConnector, UpdatePipeline};
use inplace_edit_core::resource::{Column, ColumnType, ResourceConfig};
use inplace_edit_core::{
    AdminConfigBuilder, FieldUpdater, PluginOptions, UpdateFieldRequest, UpdateFieldResponse,
};

use super::helpers::{
    admin, posts_fixture, posts_resource, record, DenyingUpdater, PUBLISHED_AT,
};

fn request(field: &str, value: serde_json::Value) -> UpdateFieldRequest {
    UpdateFieldRequest {
        resource_id: "posts".to_string(),
        record_id: json!(42),
        field: field.to_string(),
        value,
    }
}

#[tokio::test]
async fn test_update_returns_refetched_record_with_hook_changes() {
    let fixture = posts_fixture(posts_resource()).await;

    let response = fixture
        .service
        .update_field(&fixture.instance_id, request("status", json!("published")), &admin())
        .await
        .unwrap();

    let UpdateFieldResponse::Record(record) = response else {
        panic!("expected record, got {:?}", response);
    };
    assert_eq!(record["status"], json!("published"));
    assert_eq!(record["publishedAt"], json!(PUBLISHED_AT));
    assert_eq!(record["title"], json!("Hello"));
    // old-record read plus the re-read after the update
    assert_eq!(fixture.connector.reads(), 2);
}

#[tokio::test]
async fn test_update_touches_only_the_edited_field() {
    let fixture = posts_fixture(posts_resource()).await;
    let resource = posts_resource();

    fixture
        .service
        .update_field(&fixture.instance_id, request("views", json!("11")), &admin())
        .await
        .unwrap();

    let stored = fixture
        .connector
        .inner
        .get_record_by_primary_key(&resource, &json!(42))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored["views"], json!(11));
    assert_eq!(stored["status"], json!("draft"));
    assert_eq!(stored["title"], json!("Hello"));

    let other = fixture
        .connector
        .inner
        .get_record_by_primary_key(&resource, &json!(7))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(other["views"], json!(0));
}

#[tokio::test]
async fn test_update_error_is_relayed_without_refetch() {
    let fixture = posts_fixture(posts_resource()).await;
    let service = FieldUpdater::new(
        fixture.service.config().clone(),
        fixture.connectors.clone(),
        Arc::new(DenyingUpdater),
    );

    let response = service
        .update_field(&fixture.instance_id, request("status", json!("published")), &admin())
        .await
        .unwrap();

    assert_eq!(response, UpdateFieldResponse::Error("Permission denied".to_string()));
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"error": "Permission denied"})
    );
    assert_eq!(fixture.connector.reads(), 1);
}

#[tokio::test]
async fn test_edit_disallowed_by_resource_is_relayed() {
    let fixture = posts_fixture(posts_resource().with_edit_allowed(false)).await;

    let response = fixture
        .service
        .update_field(&fixture.instance_id, request("status", json!("published")), &admin())
        .await
        .unwrap();

    assert_eq!(response, UpdateFieldResponse::Error("Action is not allowed".to_string()));
}

#[tokio::test]
async fn test_update_is_idempotent() {
    let fixture = posts_fixture(posts_resource()).await;

    let first = fixture
        .service
        .update_field(&fixture.instance_id, request("status", json!("published")), &admin())
        .await
        .unwrap();
    let second = fixture
        .service
        .update_field(&fixture.instance_id, request("status", json!("published")), &admin())
        .await
        .unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_record_id_is_coerced_to_primary_key_type() {
    let fixture = posts_fixture(posts_resource()).await;
    let mut req = request("views", json!(5));
    req.record_id = json!("42");

    let response = fixture
        .service
        .update_field(&fixture.instance_id, req, &admin())
        .await
        .unwrap();

    let UpdateFieldResponse::Record(record) = response else {
        panic!("expected record");
    };
    assert_eq!(record["id"], json!(42));
    assert_eq!(record["views"], json!(5));
}

#[tokio::test]
async fn test_unknown_resource_is_rejected_before_any_read() {
    let fixture = posts_fixture(posts_resource()).await;
    let mut req = request("status", json!("draft"));
    req.resource_id = "comments".to_string();

    let err = fixture
        .service
        .update_field(&fixture.instance_id, req, &admin())
        .await
        .unwrap_err();

    assert_eq!(err, UpdateFieldError::UnknownResource("comments".to_string()));
    assert_eq!(fixture.connector.reads(), 0);
}

#[tokio::test]
async fn test_unknown_instance_is_rejected() {
    let fixture = posts_fixture(posts_resource()).await;

    let err = fixture
        .service
        .update_field("deadbeef", request("status", json!("draft")), &admin())
        .await
        .unwrap_err();

    assert_eq!(err, UpdateFieldError::UnknownPluginInstance("deadbeef".to_string()));
}

#[tokio::test]
async fn test_field_outside_plugin_columns_is_rejected() {
    let fixture = posts_fixture(posts_resource()).await;

    for field in ["title", "missing"] {
        let err = fixture
            .service
            .update_field(&fixture.instance_id, request(field, json!("x")), &admin())
            .await
            .unwrap_err();
        assert!(matches!(err, UpdateFieldError::FieldNotEditable { .. }));
    }
}

#[tokio::test]
async fn test_invalid_value_is_rejected() {
    let fixture = posts_fixture(posts_resource()).await;

    let err = fixture
        .service
        .update_field(&fixture.instance_id, request("status", json!("archived")), &admin())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        UpdateFieldError::InvalidValue {
            source: ValueError::NotInEnum(_),
            ..
        }
    ));

    let err = fixture
        .service
        .update_field(&fixture.instance_id, request("views", json!("many")), &admin())
        .await
        .unwrap_err();
    assert!(matches!(err, UpdateFieldError::InvalidValue { .. }));
    assert_eq!(fixture.connector.reads(), 0);
}

#[tokio::test]
async fn test_invalid_record_id_is_rejected() {
    let fixture = posts_fixture(posts_resource()).await;
    let mut req = request("views", json!(1));
    req.record_id = json!("abc");

    let err = fixture
        .service
        .update_field(&fixture.instance_id, req, &admin())
        .await
        .unwrap_err();

    assert!(matches!(err, UpdateFieldError::InvalidRecordId(_)));
}

#[tokio::test]
async fn test_missing_record_is_not_found() {
    let fixture = posts_fixture(posts_resource()).await;
    let mut req = request("views", json!(1));
    req.record_id = json!(999);

    let err = fixture
        .service
        .update_field(&fixture.instance_id, req, &admin())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        UpdateFieldError::RecordNotFound {
            resource: "posts".to_string(),
            record_id: "999".to_string(),
        }
    );
    assert_eq!(fixture.connector.reads(), 1);
}

#[tokio::test]
async fn test_request_and_response_wire_format() {
    let req: UpdateFieldRequest = serde_json::from_value(json!({
        "resourceId": "posts",
        "recordId": 42,
        "field": "status",
        "value": "published"
    }))
    .unwrap();
    assert_eq!(req, request("status", json!("published")));

    let fixture = posts_fixture(posts_resource()).await;
    let response = fixture
        .service
        .update_field(&fixture.instance_id, req, &admin())
        .await
        .unwrap();
    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body["record"]["status"], json!("published"));
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_discovered_float_column_accepts_float_after_whole_numbers() {
    let resource = ResourceConfig::new("products", "main")
        .with_column(Column::new("id").typed(ColumnType::Integer).primary())
        .with_column(Column::new("price"))
        .with_column(Column::new("sku"));
    let connector = Arc::new(MemoryConnector::new());
    for seed in [
        json!({"id": 1, "price": 3, "sku": "A-1"}),
        json!({"id": 2, "price": 2.5, "sku": 2}),
        json!({"id": 3, "price": 4, "sku": null}),
    ] {
        connector.insert(&resource, record(seed)).unwrap();
    }
    let mut registry = ConnectorRegistry::new();
    registry.register("main", connector);
    let connectors = Arc::new(registry);

    let config = AdminConfigBuilder::new()
        .resource(resource)
        .plugin("products", PluginOptions::new(["price", "sku"]))
        .build(&connectors)
        .await
        .unwrap();
    let products = config.resource("products").unwrap();
    assert_eq!(products.column("price").unwrap().column_type, Some(ColumnType::Float));
    assert_eq!(products.column("sku").unwrap().column_type, None);

    let config = Arc::new(config);
    let instance_id = config.plugin_instances().next().unwrap().instance_id().to_string();
    let service = FieldUpdater::new(
        config,
        connectors.clone(),
        Arc::new(UpdatePipeline::new(connectors)),
    );

    let edit = |field: &str, value: serde_json::Value| UpdateFieldRequest {
        resource_id: "products".to_string(),
        record_id: json!(1),
        field: field.to_string(),
        value,
    };
    let response = service
        .update_field(&instance_id, edit("price", json!(2.75)), &admin())
        .await
        .unwrap();
    let UpdateFieldResponse::Record(updated) = response else {
        panic!("expected record, got {:?}", response);
    };
    assert_eq!(updated["price"], json!(2.75));

    // mixed kinds leave the column untyped
    let response = service
        .update_field(&instance_id, edit("sku", json!(17)), &admin())
        .await
        .unwrap();
    let UpdateFieldResponse::Record(updated) = response else {
        panic!("expected record, got {:?}", response);
    };
    assert_eq!(updated["sku"], json!(17));
}

//! End-to-end batch behaviour against a recording transport

mod support;

use std::sync::Arc;

use ledgerlink_core::batch::FaultError;
use ledgerlink_core::{BatchError, BatchItemResult, HttpMethod};
use ledgerlink_domain::{Customer, FaultKind, LedgerLinkError, OperationKind, UntypedEntity, Vendor};
use serde_json::json;
use support::{batch_with, RecordingTransport};

fn customer(name: &str) -> Customer {
    Customer { display_name: Some(name.to_string()), ..Customer::default() }
}

#[tokio::test]
async fn mixed_batch_sends_one_request_and_correlates_by_id() {
    let transport = Arc::new(RecordingTransport::new());
    transport.respond_json(
        200,
        &json!({
            "BatchItemResponse": [
                {"bId": "b1", "Customer": {"Id": "101", "SyncToken": "0", "DisplayName": "Amy"}},
                {"bId": "b2", "QueryResponse": {
                    "Vendor": [{"Id": "1"}, {"Id": "2"}, {"Id": "3"}],
                    "startPosition": 1,
                    "maxResults": 3
                }}
            ],
            "time": "2024-01-05T10:00:00.000-08:00"
        }),
    );
    let mut batch = batch_with(&transport);

    batch.add_entity(customer("Amy"), "b1", OperationKind::Create).unwrap();
    batch.add_query("select * from Vendor", "b2", None).unwrap();
    let results = batch.execute().await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(transport.call_count(), 1);

    let created = batch.get_result("b1").unwrap().entity::<Customer>().unwrap();
    assert_eq!(created.id.as_deref(), Some("101"));

    let vendors = batch.get_result("b2").unwrap().entities::<Vendor>();
    assert_eq!(vendors.len(), 3);
}

#[tokio::test]
async fn request_carries_uri_headers_and_tagged_body() {
    let transport = Arc::new(RecordingTransport::new());
    transport.respond_json(200, &json!({"BatchItemResponse": []}));
    let mut batch = batch_with(&transport);

    batch.add_entity(customer("Amy"), "b1", OperationKind::Create).unwrap();
    batch.add_entity(customer("Bob"), "b2", OperationKind::Update).unwrap();
    batch.add_report("ProfitAndLoss?date_macro=Today", "r1", None).unwrap();
    batch.execute().await.unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.method, HttpMethod::Post);
    let batch_uri = "https://sandbox.example.com/v3/company/4620816365/batch?requestid=";
    assert!(request.uri.starts_with(batch_uri));
    assert!(request.uri.ends_with("&minorversion=65"));
    assert_eq!(request.headers.get("Content-Type"), Some("application/json"));
    assert_eq!(request.headers.get("accept"), Some("application/json"));
    assert!(request.headers.get("user-agent").is_some_and(|ua| ua.starts_with("ledgerlink-sdk/")));

    assert_eq!(
        transport.last_body(),
        json!({"BatchItemRequest": [
            {"bId": "b1", "operation": "create", "Customer": {"DisplayName": "Amy"}},
            {"bId": "b2", "operation": "update", "Customer": {"DisplayName": "Bob"}},
            {"bId": "r1", "ReportQuery": "ProfitAndLoss?date_macro=Today"}
        ]})
    );
}

#[tokio::test]
async fn full_batch_is_sent_in_a_single_call() {
    let transport = Arc::new(RecordingTransport::new());
    transport.respond_json(200, &json!({"BatchItemResponse": []}));
    let mut batch = batch_with(&transport);

    for i in 0..25 {
        let (name, id) = (format!("c{i}"), format!("b{i}"));
        batch.add_entity(customer(&name), &id, OperationKind::Create).unwrap();
    }
    let err = batch.add_query("select * from Customer", "b25", None).unwrap_err();
    assert!(matches!(err, BatchError::BatchFull { limit: 25 }));
    assert_eq!(batch.len(), 25);

    batch.execute().await.unwrap();

    assert_eq!(transport.call_count(), 1);
    let body = transport.last_body();
    let elements = body["BatchItemRequest"].as_array().unwrap();
    assert_eq!(elements.len(), 25);
    assert!(elements
        .iter()
        .all(|e| e.get("Customer").is_some() && e.get("IntuitObject").is_none()));
}

#[tokio::test]
async fn twenty_sixth_entity_is_rejected_without_mutation() {
    let transport = Arc::new(RecordingTransport::new());
    let mut batch = batch_with(&transport);

    for i in 0..25 {
        let (name, id) = (format!("c{i}"), format!("b{i}"));
        batch.add_entity(customer(&name), &id, OperationKind::Create).unwrap();
    }
    let err = batch.add_entity(customer("late"), "b25", OperationKind::Create).unwrap_err();

    assert!(matches!(err, BatchError::BatchFull { limit: 25 }));
    assert_eq!(batch.len(), 25);
    assert!(!batch.contains("b25"));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn create_and_update_both_come_back_as_entities() {
    let transport = Arc::new(RecordingTransport::new());
    transport.respond_json(
        200,
        &json!({"BatchItemResponse": [
            {"bId": "b1", "Customer": {"Id": "201", "SyncToken": "0", "DisplayName": "Amy"}},
            {"bId": "b2", "Customer": {"Id": "58", "SyncToken": "4", "DisplayName": "Bob"}}
        ]}),
    );
    let mut batch = batch_with(&transport);
    batch.add_entity(customer("Amy"), "b1", OperationKind::Create).unwrap();
    batch
        .add_entity(
            Customer { id: Some("58".into()), sync_token: Some("3".into()), ..customer("Bob") },
            "b2",
            OperationKind::Update,
        )
        .unwrap();

    batch.execute().await.unwrap();

    for (id, expected) in [("b1", "201"), ("b2", "58")] {
        let result = batch.get_result(id).unwrap();
        assert!(matches!(result, BatchItemResult::EntitySuccess(_)), "{id}: {result:?}");
        assert_eq!(result.entity::<Customer>().unwrap().id.as_deref(), Some(expected));
    }
    let updated = batch.get_result("b2").unwrap().entity::<Customer>().unwrap();
    assert_eq!(updated.sync_token.as_deref(), Some("4"));
}

#[tokio::test]
async fn null_fault_error_list_does_not_discard_other_results() {
    let transport = Arc::new(RecordingTransport::new());
    transport.respond_json(
        200,
        &json!({"BatchItemResponse": [
            {"bId": "b1", "Customer": {"Id": "1"}},
            {"bId": "b2", "Fault": {"type": "ServiceFault", "Error": null}}
        ]}),
    );
    let mut batch = batch_with(&transport);
    batch.add_entity(customer("Amy"), "b1", OperationKind::Create).unwrap();
    batch.add_entity(Vendor::default(), "b2", OperationKind::Delete).unwrap();

    let results = batch.execute().await.unwrap();

    assert_eq!(results.get("b1").unwrap().entity::<Customer>().unwrap().id.as_deref(), Some("1"));
    assert!(results.get("b2").unwrap().is_success());
    assert_eq!(results.faults().count(), 0);
}

#[tokio::test]
async fn item_faults_are_reported_on_their_own_id() {
    let transport = Arc::new(RecordingTransport::new());
    transport.respond_json(
        200,
        &json!({"BatchItemResponse": [
            {"bId": "b1", "Fault": {"type": "ValidationFault", "Error": [
                {"Message": "Required param missing", "code": "2020", "element": "DisplayName"},
                {"Message": "Invalid Email", "code": "2030"},
                {"Message": "Invalid Phone", "code": "2030"}
            ]}},
            {"bId": "b2", "Fault": {"type": "ServiceFault", "Error": []}}
        ]}),
    );
    let mut batch = batch_with(&transport);
    batch.add_entity(customer(""), "b1", OperationKind::Create).unwrap();
    batch.add_entity(Vendor::default(), "b2", OperationKind::Delete).unwrap();

    let results = batch.execute().await.unwrap();

    let fault = results.get("b1").unwrap().fault().unwrap();
    assert_eq!(fault.kind(), FaultKind::Validation);
    assert_eq!(fault.len(), 3);
    assert_eq!(fault.errors()[0].element.as_deref(), Some("DisplayName"));

    let second = results.get("b2").unwrap();
    assert!(second.is_success());
    assert_eq!(results.faults().count(), 1);
}

#[tokio::test]
async fn removed_items_never_receive_results() {
    let transport = Arc::new(RecordingTransport::new());
    transport.respond_json(
        200,
        &json!({"BatchItemResponse": [
            {"bId": "q1", "QueryResponse": {}},
            {"bId": "q2", "QueryResponse": {}}
        ]}),
    );
    let mut batch = batch_with(&transport);
    batch.add_query("select * from Item", "q1", None).unwrap();
    batch.add_query("select * from Account", "q2", None).unwrap();
    batch.remove("q2").unwrap();

    batch.execute().await.unwrap();

    assert!(batch.get_result("q1").is_some());
    assert!(batch.get_result("q2").is_none());
    assert_eq!(transport.last_body()["BatchItemRequest"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn remove_after_execute_drops_the_stale_result() {
    let transport = Arc::new(RecordingTransport::new());
    transport
        .respond_json(200, &json!({"BatchItemResponse": [{"bId": "q1", "QueryResponse": {}}]}));
    let mut batch = batch_with(&transport);
    batch.add_query("select * from Item", "q1", None).unwrap();
    batch.execute().await.unwrap();

    batch.remove("q1").unwrap();

    assert!(batch.get_result("q1").is_none());
    assert!(batch.is_empty());
}

#[tokio::test]
async fn re_execute_overwrites_previous_results() {
    let transport = Arc::new(RecordingTransport::new());
    transport
        .respond_json(
            200,
            &json!({"BatchItemResponse": [
                {"bId": "q1", "QueryResponse": {"Item": [{"Id": "1"}]}}
            ]}),
        )
        .respond_json(200, &json!({"BatchItemResponse": []}));
    let mut batch = batch_with(&transport);
    batch.add_query("select * from Item", "q1", None).unwrap();

    batch.execute().await.unwrap();
    assert!(batch.get_result("q1").is_some());

    batch.execute().await.unwrap();
    assert!(batch.get_result("q1").is_none());
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn unknown_ids_in_the_response_are_dropped() {
    let transport = Arc::new(RecordingTransport::new());
    transport.respond_json(
        200,
        &json!({"BatchItemResponse": [
            {"bId": "q1", "QueryResponse": {}},
            {"bId": "ghost", "Customer": {"Id": "9"}}
        ]}),
    );
    let mut batch = batch_with(&transport);
    batch.add_query("select * from Customer", "q1", None).unwrap();

    let results = batch.execute().await.unwrap();

    assert_eq!(results.ids().collect::<Vec<_>>(), ["q1"]);
}

#[tokio::test]
async fn empty_response_body_is_unparsable_and_leaves_no_results() {
    let transport = Arc::new(RecordingTransport::new());
    transport.respond_raw(200, Vec::new());
    let mut batch = batch_with(&transport);
    batch.add_query("select * from Customer", "q1", None).unwrap();

    let err = batch.execute().await.unwrap_err();

    assert!(matches!(err, BatchError::UnparsableResponse(_)));
    assert!(batch.results().is_empty());
}

#[tokio::test]
async fn envelope_without_item_responses_is_an_empty_success() {
    let transport = Arc::new(RecordingTransport::new());
    transport.respond_json(200, &json!({"time": "2024-01-05T10:00:00.000-08:00"}));
    let mut batch = batch_with(&transport);
    batch.add_query("select * from Customer", "q1", None).unwrap();

    let results = batch.execute().await.unwrap();

    assert!(results.is_empty());
}

#[tokio::test]
async fn whole_batch_fault_on_error_status() {
    let transport = Arc::new(RecordingTransport::new());
    transport.respond_json(
        401,
        &json!({"Fault": {"type": "AUTHENTICATION", "Error": [
            {"Message": "message=AuthenticationFailed; errorCode=003200; statusCode=401", "code": "3200"}
        ]}}),
    );
    let mut batch = batch_with(&transport);
    batch.add_query("select * from Customer", "q1", None).unwrap();

    let err = batch.execute().await.unwrap_err();

    assert!(matches!(
        err,
        BatchError::Fault(FaultError::Security { kind: FaultKind::Authentication, .. })
    ));
    assert_eq!(LedgerLinkError::from(err).label(), "auth");
}

#[tokio::test]
async fn error_status_without_fault_keeps_the_status() {
    let transport = Arc::new(RecordingTransport::new());
    transport.respond_raw(503, b"Service Unavailable".to_vec());
    let mut batch = batch_with(&transport);
    batch.add_query("select * from Customer", "q1", None).unwrap();

    let err = batch.execute().await.unwrap_err();

    assert!(matches!(
        err,
        BatchError::HttpStatus { status: 503, ref body } if body == "Service Unavailable"
    ));
}

#[tokio::test]
async fn transport_errors_are_propagated() {
    let transport = Arc::new(RecordingTransport::new());
    transport.fail_with(LedgerLinkError::Network("connection refused".into()));
    let mut batch = batch_with(&transport);
    batch.add_query("select * from Customer", "q1", None).unwrap();

    let err = batch.execute().await.unwrap_err();

    assert!(matches!(err, BatchError::Transport(LedgerLinkError::Network(_))));
    assert!(batch.results().is_empty());
}

#[tokio::test]
async fn unregistered_entity_fails_without_sending() {
    #[derive(Debug)]
    struct Timesheet;
    impl ledgerlink_domain::Entity for Timesheet {}

    let transport = Arc::new(RecordingTransport::new());
    let mut batch = batch_with(&transport);
    batch.add_entity(Timesheet, "b1", OperationKind::Create).unwrap();

    let err = batch.execute().await.unwrap_err();

    assert!(err.is_local());
    assert!(matches!(err, BatchError::Assembly(_)));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn report_rows_come_back_untyped() {
    let transport = Arc::new(RecordingTransport::new());
    transport.respond_json(
        200,
        &json!({"BatchItemResponse": [{"bId": "r1", "Report": {
            "Header": {"ReportName": "ProfitAndLoss"},
            "Rows": {"Row": [{"group": "Income"}, {"group": "Expenses"}]}
        }}]}),
    );
    let mut batch = batch_with(&transport);
    batch.add_report("ProfitAndLoss", "r1", Some("pnl-2024")).unwrap();

    batch.execute().await.unwrap();

    let rows = batch.get_result("r1").unwrap().entities::<UntypedEntity>();
    let groups: Vec<_> = rows.iter().map(|r| r.body["group"].as_str()).collect();
    assert_eq!(groups, [Some("Income"), Some("Expenses")]);
    assert_eq!(batch.original_id("r1"), Some("pnl-2024"));
}

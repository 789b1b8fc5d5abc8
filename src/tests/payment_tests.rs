use crate::error::PortalError;
use crate::models::transaction::TransactionRecord;
use crate::service::{build_receipt, platform_fee, to_minor_units};
use crate::store::Store;
use crate::tests::portal;
use chrono::Utc;

fn sample_record(order_id: &str) -> TransactionRecord {
    TransactionRecord {
        id: "tx-1".to_string(),
        student_id: "stu-1".to_string(),
        amount_paid: 499.5,
        platform_fee: 9.99,
        description: r#"{"title":"Jan - Mar","desc":{"tuition":499.5}}"#.to_string(),
        transaction_id: "txn_1".to_string(),
        gateway_payment_id: "pay_1".to_string(),
        gateway_order_id: order_id.to_string(),
        receipt_id: "rcpt_stu-1_1".to_string(),
        payment_method: "online".to_string(),
        currency: "INR".to_string(),
        status: "success".to_string(),
        created_at: Utc::now(),
    }
}

#[test]
fn minor_units_round_half_up_on_the_product() {
    assert_eq!(to_minor_units(499.5), 49950);
    assert_eq!(to_minor_units(0.29), 29);
    assert_eq!(to_minor_units(100.0), 10000);
    assert_eq!(to_minor_units(0.01), 1);
}

#[test]
fn platform_fee_is_two_percent() {
    assert_eq!(platform_fee(100.0), 2.0);
    assert_eq!(platform_fee(0.0), 0.0);
}

#[test]
fn receipt_is_capped_at_forty_ascii_chars() {
    let long_id = "a".repeat(64);
    let receipt = build_receipt(&long_id, 1_752_000_000_000);
    assert!(receipt.len() <= 40);
    assert!(receipt.starts_with("rcpt_aaaaaa_"));
    assert!(receipt.is_ascii());

    assert!(build_receipt("", 1).starts_with("rcpt_std_"));

    // Non-ASCII ids must not leak into the token or inflate its byte length.
    let exotic = build_receipt("クラス-५-studént", 1_752_000_000_000);
    assert!(exotic.is_ascii());
    assert!(exotic.len() <= 40);
    assert!(exotic.starts_with("rcpt_studnt_"));
}

#[tokio::test]
async fn create_order_uses_auto_capture_and_minor_units() {
    let (portal, _store, _gateway) = portal();

    let checkout = portal
        .create_order(499.5, "stu-1", "tuition Jan - Mar".to_string())
        .await
        .unwrap();

    assert_eq!(checkout.order.amount, 49950);
    assert_eq!(checkout.order.currency, "INR");
    assert!(checkout.order.payment_capture);
    assert!(checkout.order.receipt.len() <= 40);
    assert_eq!(checkout.student_id, "stu-1");
}

#[tokio::test]
async fn create_order_rejects_bad_amounts() {
    let (portal, _store, _gateway) = portal();

    for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
        let err = portal
            .create_order(bad, "stu-1", "x".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::InvalidAmount(_)));
    }
}

#[tokio::test]
async fn unverified_payment_is_not_recorded() {
    let (portal, store, _gateway) = portal();

    let checkout = portal
        .create_order(100.0, "stu-1", "x".to_string())
        .await
        .unwrap();

    // Client claims success but the gateway still reports the order as
    // merely created.
    let err = portal
        .record_transaction(sample_record(&checkout.order.id))
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::PaymentUnverified(_)));

    assert!(
        store
            .get_transaction_by_order(&checkout.order.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn settled_payment_records_once_and_only_once() {
    let (portal, _store, gateway) = portal();

    let checkout = portal
        .create_order(100.0, "stu-1", "x".to_string())
        .await
        .unwrap();
    gateway.settle(&checkout.order.id).await.unwrap();

    let recorded = portal
        .record_transaction(sample_record(&checkout.order.id))
        .await
        .unwrap();
    assert_eq!(recorded.gateway_order_id, checkout.order.id);

    // A client retry replays the same order id and must not insert twice.
    let err = portal
        .record_transaction(sample_record(&checkout.order.id))
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::DuplicateTransaction(_)));

    let history = portal.student_transactions("stu-1").await.unwrap();
    assert_eq!(history.len(), 1);
}

// Two submissions that both cleared the service's read check still cannot
// both insert: uniqueness lives under the store's lock.
#[tokio::test]
async fn store_refuses_second_record_for_one_order() {
    let (_portal, store, _gateway) = portal();

    store.insert_transaction(sample_record("order_x")).await.unwrap();

    let mut retry = sample_record("order_x");
    retry.id = "tx-2".to_string();
    let err = store.insert_transaction(retry).await.unwrap_err();
    assert!(matches!(err, PortalError::DuplicateTransaction(_)));

    let history = store.list_student_transactions("stu-1").await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn unknown_order_id_is_rejected() {
    let (portal, _store, _gateway) = portal();

    let err = portal
        .record_transaction(sample_record("order_missing"))
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::OrderNotFound(_)));
}

#[tokio::test]
async fn failed_checkout_cannot_be_recorded() {
    let (portal, _store, gateway) = portal();

    let checkout = portal
        .create_order(100.0, "stu-1", "x".to_string())
        .await
        .unwrap();
    gateway.fail(&checkout.order.id).await.unwrap();

    let err = portal
        .record_transaction(sample_record(&checkout.order.id))
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::PaymentUnverified(_)));
}

mod common;

use common::{exec, exec_all, processor};
use payment_sim::domain::state::PaymentState;
use payment_sim::error::PaymentError;

async fn status(p: &payment_sim::application::processor::CommandProcessor, id: &str) -> String {
    exec(p, &format!("STATUS {id}")).await.unwrap()
}

#[tokio::test]
async fn test_full_payment_flow() {
    let p = processor(None);
    let outputs = [
        ("CREATE P001 100.00 USD M001", "Payment P001 created: 100.0 USD"),
        ("AUTHORIZE P001", "Payment P001 authorized"),
        ("CAPTURE P001", "Payment P001 captured"),
        ("SETTLE P001", "Payment P001 settled"),
        (
            "STATUS P001",
            "Payment P001: state=SETTLED amount=100.0 currency=USD merchant=M001",
        ),
    ];
    for (line, expected) in outputs {
        assert_eq!(exec(&p, line).await.unwrap(), expected);
    }
}

#[tokio::test]
async fn test_duplicate_create_keeps_single_history_entry() {
    let p = processor(None);
    exec_all(&p, &["CREATE P1 10.00 USD M1"]).await;
    let after_one = p.payments().await.unwrap();

    let out = exec(&p, "CREATE P1 10.00 USD M1").await.unwrap();

    assert!(out.contains("idempotent"));
    let after_two = p.payments().await.unwrap();
    assert_eq!(after_one[0].history().len(), after_two[0].history().len());
    assert_eq!(after_one, after_two);
}

#[tokio::test]
async fn test_conflicting_create_fails_original() {
    let p = processor(None);
    exec_all(&p, &["CREATE P1 100.00 USD M1"]).await;

    let err = exec(&p, "CREATE P1 200.00 USD M1").await.unwrap_err();

    assert!(matches!(err, PaymentError::CreateConflict { .. }));
    assert!(status(&p, "P1").await.contains("state=FAILED"));

    // A failed payment is terminal and no longer accepts CREATE either.
    let err = exec(&p, "CREATE P1 100.00 USD M1").await.unwrap_err();
    assert!(matches!(
        err,
        PaymentError::DuplicatePayment {
            state: PaymentState::Failed,
            ..
        }
    ));
}

#[tokio::test]
async fn test_pre_settlement_threshold() {
    let gated = processor(Some("1000"));
    exec_all(&gated, &["CREATE P1 1500.00 USD M1", "AUTHORIZE P1"]).await;
    assert!(status(&gated, "P1").await.contains("state=PRE_SETTLEMENT_REVIEW"));

    exec_all(&gated, &["CAPTURE P1", "SETTLE P1"]).await;
    assert!(status(&gated, "P1").await.contains("state=SETTLED"));

    let open = processor(None);
    exec_all(&open, &["CREATE P1 1500.00 USD M1", "AUTHORIZE P1"]).await;
    assert!(status(&open, "P1").await.contains("state=AUTHORIZED"));
}

#[tokio::test]
async fn test_review_blocks_void() {
    let p = processor(Some("1000"));
    exec_all(&p, &["CREATE P1 1000.00 USD M1", "AUTHORIZE P1"]).await;

    let err = exec(&p, "VOID P1").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid transition from PRE_SETTLEMENT_REVIEW to VOIDED"
    );
}

/// Drives a fresh payment `id` into `state` using the public commands.
async fn reach(p: &payment_sim::application::processor::CommandProcessor, id: &str, state: PaymentState) {
    exec_all(p, &[format!("CREATE {id} 10.00 USD M1").as_str()]).await;
    let steps: &[&str] = match state {
        PaymentState::Initiated => &[],
        PaymentState::Authorized => &["AUTHORIZE"],
        PaymentState::PreSettlementReview => unreachable!("needs a threshold"),
        PaymentState::Captured => &["AUTHORIZE", "CAPTURE"],
        PaymentState::Settled => &["AUTHORIZE", "CAPTURE", "SETTLE"],
        PaymentState::Voided => &["VOID"],
        PaymentState::Refunded => &["AUTHORIZE", "CAPTURE", "REFUND"],
        PaymentState::Failed => {
            let _ = exec(p, &format!("CREATE {id} 99.00 USD M1")).await;
            &[]
        }
    };
    for step in steps {
        exec_all(p, &[format!("{step} {id}").as_str()]).await;
    }
    assert!(status(p, id).await.contains(&format!("state={state}")));
}

#[tokio::test]
async fn test_capture_rejected_from_other_states() {
    let p = processor(None);
    for state in [
        PaymentState::Initiated,
        PaymentState::Captured,
        PaymentState::Settled,
        PaymentState::Voided,
        PaymentState::Refunded,
        PaymentState::Failed,
    ] {
        let id = format!("P-{state}");
        reach(&p, &id, state).await;

        let err = exec(&p, &format!("CAPTURE {id}")).await.unwrap_err();
        assert!(
            matches!(err, PaymentError::InvalidTransition { from, to: PaymentState::Captured } if from == state),
            "CAPTURE from {state} should fail"
        );
    }
}

#[tokio::test]
async fn test_settle_only_from_captured() {
    let p = processor(None);
    for state in [
        PaymentState::Initiated,
        PaymentState::Authorized,
        PaymentState::Voided,
        PaymentState::Refunded,
        PaymentState::Failed,
    ] {
        let id = format!("P-{state}");
        reach(&p, &id, state).await;
        assert!(exec(&p, &format!("SETTLE {id}")).await.is_err());
    }

    reach(&p, "S", PaymentState::Settled).await;
    let before = p.payments().await.unwrap();
    for _ in 0..5 {
        let out = exec(&p, "SETTLE S").await.unwrap();
        assert_eq!(out, "Payment S already settled (idempotent)");
    }
    assert_eq!(p.payments().await.unwrap(), before);
}

#[tokio::test]
async fn test_list_sorted_by_id() {
    let p = processor(None);
    exec_all(
        &p,
        &[
            "CREATE P3 30.00 USD M1",
            "CREATE P1 10.00 USD M1",
            "CREATE P2 20.00 USD M1",
        ],
    )
    .await;

    let out = exec(&p, "LIST").await.unwrap();
    let ids: Vec<&str> = out
        .lines()
        .skip(1)
        .map(|l| l.trim().split(':').next().unwrap())
        .collect();
    assert_eq!(ids, vec!["P1", "P2", "P3"]);
}

#[tokio::test]
async fn test_audit_never_changes_status() {
    let p = processor(None);
    for state in [
        PaymentState::Initiated,
        PaymentState::Authorized,
        PaymentState::Captured,
        PaymentState::Settled,
        PaymentState::Voided,
        PaymentState::Refunded,
        PaymentState::Failed,
    ] {
        let id = format!("A-{state}");
        reach(&p, &id, state).await;

        let before = status(&p, &id).await;
        let snapshot = p.payments().await.unwrap();
        assert_eq!(exec(&p, &format!("AUDIT {id}")).await.unwrap(), "AUDIT RECEIVED");
        assert_eq!(status(&p, &id).await, before);
        assert_eq!(p.payments().await.unwrap(), snapshot);
    }

    assert!(matches!(
        exec(&p, "AUDIT missing").await,
        Err(PaymentError::PaymentNotFound { .. })
    ));
}

#[tokio::test]
async fn test_comment_rules_through_parser() {
    let p = processor(None);

    assert!(matches!(
        exec(&p, "LIST # comment").await,
        Err(PaymentError::MalformedCommand { .. })
    ));

    let out = exec(&p, "CREATE P1 10.00 USD M1 # note").await.unwrap();
    assert_eq!(out, "Payment P1 created: 10.0 USD");
    assert!(status(&p, "P1").await.ends_with("merchant=M1"));
}

use serde_json::json;

use stagione::progress::channel;
use stagione::{JobEvent, Progress, RefreshOutcome};

#[tokio::test]
async fn events_arrive_in_order_with_terminal_last() {
    let (tx, mut rx) = channel::<u32>();
    tx.progress(1, 4, "step one");
    tx.progress(2, 4, "step two");
    tx.finish(9);

    assert_eq!(
        rx.recv().await,
        Some(JobEvent::Progress(Progress::new(1, 4, "step one")))
    );
    assert_eq!(
        rx.recv().await,
        Some(JobEvent::Progress(Progress::new(2, 4, "step two")))
    );
    assert_eq!(rx.recv().await, Some(JobEvent::Finished(9)));
    assert_eq!(rx.recv().await, None);
}

#[tokio::test]
async fn receiver_latches_after_a_failed_terminal() {
    let (tx, mut rx) = channel::<u32>();
    tx.fail("store is down");

    assert_eq!(
        rx.recv().await,
        Some(JobEvent::Failed {
            message: "store is down".to_owned()
        })
    );
    assert_eq!(rx.recv().await, None);
    assert_eq!(rx.recv().await, None);
}

#[tokio::test]
async fn dropped_sender_ends_the_stream_without_terminal() {
    let (tx, mut rx) = channel::<u32>();
    tx.progress(1, 2, "halfway");
    drop(tx);

    assert!(matches!(rx.recv().await, Some(JobEvent::Progress(_))));
    assert_eq!(rx.recv().await, None);
}

#[test]
fn percent_is_floored_and_clamped() {
    assert_eq!(Progress::new(1, 3, "").percent, 33);
    assert_eq!(Progress::new(2, 3, "").percent, 66);
    assert_eq!(Progress::new(3, 3, "").percent, 100);
    assert_eq!(Progress::new(5, 3, "").percent, 100);
    assert_eq!(Progress::new(0, 0, "").percent, 0);
}

#[test]
fn job_events_serialize_with_a_kind_tag() {
    let tick =
        serde_json::to_value(JobEvent::<RefreshOutcome>::Progress(Progress::new(1, 2, "half")))
            .unwrap();
    assert_eq!(tick["kind"], json!("progress"));
    assert_eq!(tick["percent"], json!(50));

    let done = serde_json::to_value(JobEvent::Finished(RefreshOutcome::default())).unwrap();
    assert_eq!(done["kind"], json!("finished"));
    assert_eq!(done["points_upserted"], json!(0));

    let failed = serde_json::to_value(JobEvent::<RefreshOutcome>::Failed {
        message: "boom".to_owned(),
    })
    .unwrap();
    assert_eq!(failed["kind"], json!("failed"));
    assert_eq!(failed["message"], json!("boom"));
}

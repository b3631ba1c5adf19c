use super::common::*;
use std::sync::Arc;

use crate::submission::{SubmitOutcome, WorkflowStage};

#[tokio::test]
async fn insert_waits_for_in_flight_upload() {
    let log = EventLog::default();
    let repository = Arc::new(MemoryRepository::new(log.clone()));
    let uploader = Arc::new(GatedUploader::new(log.clone()));
    let workflow = ready_workflow(repository.clone(), uploader.clone());
    workflow.attach_image(image()).expect("image attached");

    let auth = signed_in();
    let (outcome, ()) = tokio::join!(workflow.submit(&auth), async {
        assert_eq!(uploader.calls(), 1);
        assert_eq!(workflow.stage(), WorkflowStage::Submitting);
        assert!(repository.inserts().is_empty());
        uploader.release();
    });

    assert!(matches!(outcome, Ok(SubmitOutcome::Committed(_))));
    assert_eq!(log.events(), vec!["upload:start", "upload:end", "insert"]);
}

#[tokio::test]
async fn overlapping_submit_is_ignored() {
    let log = EventLog::default();
    let repository = Arc::new(MemoryRepository::new(log.clone()));
    let uploader = Arc::new(GatedUploader::new(log.clone()));
    let workflow = ready_workflow(repository.clone(), uploader.clone());
    workflow.attach_image(image()).expect("image attached");
    let auth = signed_in();

    let (first, second, ()) = tokio::join!(workflow.submit(&auth), workflow.submit(&auth), async {
        uploader.release();
    });

    assert!(matches!(first, Ok(SubmitOutcome::Committed(_))));
    assert_eq!(second, Ok(SubmitOutcome::Ignored));
    assert_eq!(uploader.calls(), 1);
    assert_eq!(repository.inserts().len(), 1);
    assert_eq!(workflow.stage(), WorkflowStage::Committed);
}

#[tokio::test]
async fn submits_from_separate_tasks_issue_one_attempt() {
    let log = EventLog::default();
    let repository = Arc::new(MemoryRepository::new(log.clone()));
    let uploader = Arc::new(GatedUploader::new(log.clone()));
    let workflow = Arc::new(ready_workflow(repository.clone(), uploader.clone()));
    workflow.attach_image(image()).expect("image attached");

    let background = {
        let workflow = Arc::clone(&workflow);
        tokio::spawn(async move { workflow.submit(&signed_in()).await })
    };
    while uploader.calls() == 0 {
        tokio::task::yield_now().await;
    }

    let repeat = workflow.submit(&signed_in()).await;
    uploader.release();
    let first = background.await.expect("task joins");

    assert_eq!(repeat, Ok(SubmitOutcome::Ignored));
    assert!(matches!(first, Ok(SubmitOutcome::Committed(_))));
    assert_eq!(uploader.calls(), 1);
    assert_eq!(repository.inserts().len(), 1);
}

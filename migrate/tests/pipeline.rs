#![cfg(feature = "test-utils")]

use dynamo::{AttributeValue, Item};
use migrate::conversions::record::{PLATFORM_FIELD, USER_ID_FIELD};
use migrate::error::ErrorKind;
use migrate::pipeline::PipelineId;
use migrate::store::memory::MemoryStoreClient;
use migrate::test_utils::item::{source_item, target_item};
use migrate::test_utils::pipeline::{
    SOURCE_TABLE, TARGET_TABLE, create_pipeline, create_user_tables,
};
use migrate::test_utils::test_client_wrapper::TestClientWrapper;
use rand::random;
use telemetry::tracing::init_test_tracing;

/// Extracts the numeric user ids of `items`.
fn user_ids(items: &[Item]) -> Vec<i64> {
    items
        .iter()
        .map(|item| {
            item.get(USER_ID_FIELD)
                .and_then(|value| value.as_n())
                .and_then(|raw| raw.parse::<i64>().ok())
                .expect("items in tests always carry a numeric user id")
        })
        .collect()
}

/// Returns `items` sorted by their numeric user id.
///
/// Migration workers race for batches, so target table order is not
/// deterministic.
fn sorted_by_user_id(mut items: Vec<Item>) -> Vec<Item> {
    items.sort_by_key(|item| {
        item.get(USER_ID_FIELD)
            .and_then(|value| value.as_n())
            .and_then(|raw| raw.parse::<i64>().ok())
            .expect("items in tests always carry a numeric user id")
    });

    items
}

#[tokio::test(flavor = "multi_thread")]
async fn pipeline_migrates_filtered_records_end_to_end() {
    init_test_tracing();

    let memory = MemoryStoreClient::with_page_size(2);
    create_user_tables(&memory).await;

    let mut source = Vec::new();
    for id in 1..=5 {
        source.push(source_item(id, "ios", &format!("ios-user-{id}")));
    }
    for id in 6..=8 {
        source.push(source_item(id, "android", &format!("android-user-{id}")));
    }
    memory.insert_items(SOURCE_TABLE, source).await.unwrap();

    let client = TestClientWrapper::wrap(memory.clone());

    let pipeline_id: PipelineId = random();
    let mut pipeline = create_pipeline(pipeline_id, 2, 4, client.clone());

    pipeline.start().await.unwrap();
    pipeline.wait().await.unwrap();

    // Five matching records at a page size of two take exactly three pages.
    assert_eq!(client.scan_calls().await, 3);

    // Every matching record is written exactly once.
    assert_eq!(client.put_calls().await, 5);

    let migrated = sorted_by_user_id(memory.table_items(TARGET_TABLE).await);
    let expected: Vec<Item> = (1..=5)
        .map(|id| target_item(id, &format!("ios-user-{id}")))
        .collect();
    assert_eq!(migrated, expected);
}

#[tokio::test(flavor = "multi_thread")]
async fn rerunning_pipeline_overwrites_records_by_key() {
    init_test_tracing();

    let memory = MemoryStoreClient::new();
    create_user_tables(&memory).await;
    memory
        .insert_items(
            SOURCE_TABLE,
            vec![source_item(1, "ios", "john"), source_item(2, "ios", "jane")],
        )
        .await
        .unwrap();

    for _ in 0..2 {
        let pipeline_id: PipelineId = random();
        let mut pipeline = create_pipeline(pipeline_id, 2, 2, memory.clone());

        pipeline.start().await.unwrap();
        pipeline.wait().await.unwrap();
    }

    let migrated = sorted_by_user_id(memory.table_items(TARGET_TABLE).await);
    assert_eq!(migrated, vec![target_item(1, "john"), target_item(2, "jane")]);
}

#[tokio::test(flavor = "multi_thread")]
async fn write_failure_fails_job_before_processing_more_batches() {
    init_test_tracing();

    let memory = MemoryStoreClient::new();
    create_user_tables(&memory).await;

    let source: Vec<Item> = (1..=10).map(|id| source_item(id, "ios", "user")).collect();
    memory.insert_items(SOURCE_TABLE, source).await.unwrap();

    let client = TestClientWrapper::wrap(memory.clone());
    client.fail_puts_for_user_ids([1]).await;

    let pipeline_id: PipelineId = random();
    // A single worker on one-record batches makes the failure the very first
    // write of the run.
    let mut pipeline = create_pipeline(pipeline_id, 1, 1, client.clone());

    pipeline.start().await.unwrap();
    let err = pipeline.wait().await.unwrap_err();

    assert!(err.kinds().contains(&ErrorKind::DestinationWriteFailed));
    assert_eq!(client.put_calls().await, 1);
    assert!(memory.table_items(TARGET_TABLE).await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_batch_is_abandoned_at_its_first_write() {
    init_test_tracing();

    let memory = MemoryStoreClient::new();
    create_user_tables(&memory).await;

    let source: Vec<Item> = (1..=10).map(|id| source_item(id, "ios", "user")).collect();
    memory.insert_items(SOURCE_TABLE, source).await.unwrap();

    let client = TestClientWrapper::wrap(memory.clone());
    client.fail_puts_for_user_ids([7]).await;

    let pipeline_id: PipelineId = random();
    let mut pipeline = create_pipeline(pipeline_id, 2, 4, client.clone());

    pipeline.start().await.unwrap();
    let err = pipeline.wait().await.unwrap_err();

    assert!(err.kinds().contains(&ErrorKind::DestinationWriteFailed));

    // The batch carrying the failing record stops at the failed write, so its
    // second record never reaches the target table either.
    let migrated_ids = user_ids(&memory.table_items(TARGET_TABLE).await);
    assert!(!migrated_ids.contains(&7));
    assert!(!migrated_ids.contains(&8));
}

#[tokio::test(flavor = "multi_thread")]
async fn undecodable_source_record_fails_job_without_writing_its_batch() {
    init_test_tracing();

    let memory = MemoryStoreClient::new();
    create_user_tables(&memory).await;

    let mut broken = source_item(2, "ios", "jane");
    broken.insert(
        USER_ID_FIELD.to_owned(),
        AttributeValue::from("not-a-number"),
    );
    memory
        .insert_items(
            SOURCE_TABLE,
            vec![source_item(1, "ios", "john"), broken],
        )
        .await
        .unwrap();

    let client = TestClientWrapper::wrap(memory.clone());

    let pipeline_id: PipelineId = random();
    // Both records share one batch, so the whole batch is rejected before its
    // first write.
    let mut pipeline = create_pipeline(pipeline_id, 2, 2, client.clone());

    pipeline.start().await.unwrap();
    let err = pipeline.wait().await.unwrap_err();

    assert!(err.kinds().contains(&ErrorKind::InvalidFieldType));
    assert_eq!(client.put_calls().await, 0);
    assert!(memory.table_items(TARGET_TABLE).await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_mid_run_stops_cleanly() {
    init_test_tracing();

    let memory = MemoryStoreClient::new();
    create_user_tables(&memory).await;

    let source: Vec<Item> = (1..=50)
        .map(|id| source_item(id, "ios", &format!("user-{id}")))
        .collect();
    memory.insert_items(SOURCE_TABLE, source).await.unwrap();

    let pipeline_id: PipelineId = random();
    let mut pipeline = create_pipeline(pipeline_id, 1, 2, memory.clone());

    pipeline.start().await.unwrap();
    pipeline.shutdown_and_wait().await.unwrap();

    // Records migrated before the signal landed stay in place and carry the
    // target shape.
    for item in &memory.table_items(TARGET_TABLE).await {
        assert!(!item.contains_key(PLATFORM_FIELD));
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn starting_pipeline_twice_reports_invalid_state() {
    init_test_tracing();

    let memory = MemoryStoreClient::new();
    create_user_tables(&memory).await;

    let pipeline_id: PipelineId = random();
    let mut pipeline = create_pipeline(pipeline_id, 2, 2, memory.clone());

    pipeline.start().await.unwrap();

    let err = pipeline.start().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    pipeline.shutdown_and_wait().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn waiting_before_start_reports_invalid_state() {
    init_test_tracing();

    let memory = MemoryStoreClient::new();

    let pipeline_id: PipelineId = random();
    let pipeline = create_pipeline(pipeline_id, 2, 2, memory);

    let err = pipeline.wait().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_configuration_aborts_before_scanning() {
    init_test_tracing();

    let memory = MemoryStoreClient::new();
    create_user_tables(&memory).await;

    let client = TestClientWrapper::wrap(memory.clone());

    let pipeline_id: PipelineId = random();
    let mut pipeline = create_pipeline(pipeline_id, 0, 2, client.clone());

    let err = pipeline.start().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ConfigError);
    assert_eq!(client.scan_calls().await, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_source_table_aborts_before_any_worker_starts() {
    init_test_tracing();

    let memory = MemoryStoreClient::new();
    // Only the target table exists.
    memory.create_table(TARGET_TABLE, USER_ID_FIELD).await;

    let client = TestClientWrapper::wrap(memory.clone());

    let pipeline_id: PipelineId = random();
    let mut pipeline = create_pipeline(pipeline_id, 2, 4, client.clone());

    let err = pipeline.start().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SourceScanFailed);
    assert_eq!(client.put_calls().await, 0);
}

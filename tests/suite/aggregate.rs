//! Aggregation over real HTTP against a mock pets API.

use std::time::Duration;

use petvet_engine::{
    AggregateOptions, DropReason, FetchError, PrimaryStatus, ResultOrder, RowError, VetId,
    aggregate, collect,
};
use tokio::sync::oneshot;
use wiremock::MockServer;

use crate::common::{
    mount_pets, mount_pets_status, mount_vet, mount_vet_delayed, mount_vet_status, pet_json,
    service_for, vet_json, vet_requests,
};

fn labels(rows: &[petvet_engine::PetVetRow]) -> Vec<(String, String)> {
    rows.iter()
        .map(|r| (r.pet_name().to_string(), r.vet_name_and_title().to_string()))
        .collect()
}

#[tokio::test]
async fn joins_pets_with_their_vets_and_drops_failures() {
    let server = MockServer::start().await;
    mount_pets(
        &server,
        vec![
            pet_json("Rex", "Smith", Some(1)),
            pet_json("Tom", "Jones", Some(2)),
            pet_json("Kit", "Doe", None),
        ],
    )
    .await;
    mount_vet(&server, 1, vet_json("Ann", "Lee", "DVM")).await;
    mount_vet_status(&server, 2, 500).await;

    let aggregation = collect(service_for(&server), AggregateOptions::default()).await;

    assert_eq!(
        labels(&aggregation.rows),
        vec![("Rex Smith".to_string(), "Ann Lee, DVM".to_string())]
    );
    assert_eq!(aggregation.primary, PrimaryStatus::Fetched { count: 3 });
    assert_eq!(aggregation.dispatched, 2);
    assert_eq!(aggregation.skipped_without_vet, 1);
    assert_eq!(aggregation.dropped.len(), 1);
    assert_eq!(aggregation.dropped[0].vet_id, VetId::new(2));
    assert!(matches!(
        aggregation.dropped[0].reason,
        DropReason::FetchFailed(FetchError::Status { status: 500, .. })
    ));
    assert_eq!(vet_requests(&server).await, 2);
}

#[tokio::test]
async fn failed_pet_collection_dispatches_nothing() {
    let server = MockServer::start().await;
    mount_pets_status(&server, 500).await;

    let aggregation = collect(service_for(&server), AggregateOptions::default()).await;

    assert!(aggregation.rows.is_empty());
    assert!(matches!(
        aggregation.primary,
        PrimaryStatus::Failed(FetchError::Status { status: 500, .. })
    ));
    assert_eq!(aggregation.dispatched, 0);
    assert_eq!(vet_requests(&server).await, 0);
}

#[tokio::test]
async fn empty_collection_completes_with_no_rows() {
    let server = MockServer::start().await;
    mount_pets(&server, Vec::new()).await;

    let aggregation = collect(service_for(&server), AggregateOptions::default()).await;

    assert!(aggregation.rows.is_empty());
    assert_eq!(aggregation.primary, PrimaryStatus::Fetched { count: 0 });
    assert!(aggregation.is_complete_success());
}

#[tokio::test]
async fn missing_and_incomplete_vets_are_dropped() {
    let server = MockServer::start().await;
    mount_pets(
        &server,
        vec![
            pet_json("Rex", "Smith", Some(1)),
            pet_json("Tom", "Jones", Some(2)),
            pet_json("Bo", "Ng", Some(3)),
        ],
    )
    .await;
    mount_vet_status(&server, 1, 404).await;
    mount_vet(&server, 2, vet_json("Ann", "Lee", "  ")).await;
    mount_vet(&server, 3, vet_json("Cy", "Oh", "Surgeon")).await;

    let aggregation = collect(service_for(&server), AggregateOptions::default()).await;

    assert_eq!(
        labels(&aggregation.rows),
        vec![("Bo Ng".to_string(), "Cy Oh, Surgeon".to_string())]
    );
    let reasons: Vec<_> = aggregation.dropped.iter().map(|d| d.reason.clone()).collect();
    assert_eq!(
        reasons,
        vec![
            DropReason::VetMissing,
            DropReason::Invalid(RowError::MissingVetField("title")),
        ]
    );
    assert_eq!(aggregation.failed_fetches(), 0);
}

#[tokio::test]
async fn negative_vet_id_only_drops_its_own_pet() {
    let server = MockServer::start().await;
    mount_pets(
        &server,
        vec![
            pet_json("Rex", "Smith", Some(1)),
            pet_json("Tom", "Jones", Some(-1)),
        ],
    )
    .await;
    mount_vet(&server, 1, vet_json("Ann", "Lee", "DVM")).await;
    mount_vet_status(&server, -1, 404).await;

    let aggregation = collect(service_for(&server), AggregateOptions::default()).await;

    assert_eq!(aggregation.primary, PrimaryStatus::Fetched { count: 2 });
    assert_eq!(
        labels(&aggregation.rows),
        vec![("Rex Smith".to_string(), "Ann Lee, DVM".to_string())]
    );
    assert_eq!(aggregation.dispatched, 2);
    assert_eq!(aggregation.dropped.len(), 1);
    assert_eq!(aggregation.dropped[0].vet_id, VetId::new(-1));
    assert_eq!(aggregation.dropped[0].reason, DropReason::VetMissing);
}

#[tokio::test]
async fn row_order_follows_options() {
    async fn run(order: ResultOrder) -> Vec<String> {
        let server = MockServer::start().await;
        mount_pets(
            &server,
            vec![
                pet_json("Slow", "Pet", Some(1)),
                pet_json("Fast", "Pet", Some(2)),
            ],
        )
        .await;
        mount_vet_delayed(
            &server,
            1,
            vet_json("Ann", "Lee", "DVM"),
            Duration::from_millis(400),
        )
        .await;
        mount_vet(&server, 2, vet_json("Bo", "Ng", "DVM")).await;

        let options = AggregateOptions::default().with_order(order);
        collect(service_for(&server), options)
            .await
            .rows
            .iter()
            .map(|r| r.pet_name().to_string())
            .collect()
    }

    assert_eq!(run(ResultOrder::Primary).await, vec!["Slow Pet", "Fast Pet"]);
    assert_eq!(run(ResultOrder::Completion).await, vec!["Fast Pet", "Slow Pet"]);
}

#[tokio::test]
async fn aggregate_delivers_rows_to_the_callback() {
    let server = MockServer::start().await;
    mount_pets(
        &server,
        vec![
            pet_json("Rex", "Smith", Some(1)),
            pet_json("Tom", "Jones", Some(2)),
        ],
    )
    .await;
    mount_vet(&server, 1, vet_json("Ann", "Lee", "DVM")).await;
    mount_vet(&server, 2, vet_json("Bo", "Ng", "Nurse")).await;

    let (tx, rx) = oneshot::channel();
    let handle = aggregate(service_for(&server), move |rows| {
        tx.send(rows).unwrap();
    });

    let rows = tokio::time::timeout(Duration::from_secs(10), rx)
        .await
        .unwrap()
        .unwrap();
    handle.await.unwrap();

    assert_eq!(
        labels(&rows),
        vec![
            ("Rex Smith".to_string(), "Ann Lee, DVM".to_string()),
            ("Tom Jones".to_string(), "Bo Ng, Nurse".to_string()),
        ]
    );
}

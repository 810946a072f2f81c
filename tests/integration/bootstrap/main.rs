use alloy::primitives::Address;
use std::{fs::File, io::Write, sync::Arc, sync::Mutex};
use tempfile::TempDir;
use tokio::sync::watch;

use chain_event_listener::{
	bootstrap::{load_endpoints, setup_endpoints},
	models::{ContractKind, Endpoint, EventKind},
	repositories::{EndpointRepository, RepositoryError},
	services::{
		connector::ChainConnector,
		notification::MemorySink,
		watcher::{EndpointWatcher, WatcherError},
	},
	utils::{
		metrics::ENDPOINT_SETUP_FAILURES,
		tests::builders::{EndpointBuilder, FactoryRegistry},
	},
};

use crate::integration::mocks::{registry_client, MockChainClient, MockJobScheduler};

// Scheduler construction is mocked through a global context
static SCHEDULER_LOCK: Mutex<()> = Mutex::new(());

type TestWatcher = EndpointWatcher<MockChainClient, MockJobScheduler>;

fn working_scheduler() -> MockJobScheduler {
	let mut scheduler = MockJobScheduler::default();
	scheduler.expect_add().returning(|_| Ok(()));
	scheduler.expect_start().returning(|| Ok(()));
	scheduler.expect_shutdown().returning(|| Ok(()));
	scheduler
}

async fn setup(
	endpoint: Endpoint,
	reported_chain_id: u64,
	sink: Arc<MemorySink>,
	shutdown: watch::Receiver<bool>,
) -> Result<TestWatcher, WatcherError> {
	let client = registry_client(
		reported_chain_id,
		500,
		FactoryRegistry::new().creator(Address::repeat_byte(0x0a), vec![Address::repeat_byte(0xc1)]),
	);
	let connector = ChainConnector::connect_with_client(&endpoint, client)
		.await
		.map_err(|e| WatcherError::connection_error("Handshake failed", Some(Box::new(e)), None))?;
	EndpointWatcher::setup_with_connector(connector, sink, shutdown).await
}

fn write_endpoint(dir: &TempDir, file: &str, endpoint: &Endpoint) {
	File::create(dir.path().join(file))
		.unwrap()
		.write_all(serde_json::to_string_pretty(endpoint).unwrap().as_bytes())
		.unwrap();
}

#[tokio::test]
async fn test_mismatched_chain_id_skips_only_that_endpoint() {
	let _lock = SCHEDULER_LOCK.lock().unwrap_or_else(|e| e.into_inner());
	let ctx = MockJobScheduler::new_context();
	ctx.expect().returning(|| Ok(working_scheduler()));

	let endpoints = vec![
		EndpointBuilder::new()
			.slug("wrong_chain")
			.name("Wrong Chain")
			.chain_id(5)
			.build(),
		EndpointBuilder::new()
			.slug("right_chain")
			.name("Right Chain")
			.chain_id(97)
			.build(),
	];
	let failures_before = ENDPOINT_SETUP_FAILURES
		.with_label_values(&["wrong_chain"])
		.get();

	let sink = Arc::new(MemorySink::new());
	let (_tx, rx) = watch::channel(false);
	let mut watchers = setup_endpoints(&endpoints, |endpoint| {
		let sink = sink.clone();
		let rx = rx.clone();
		// Every node in this test reports chain 97
		async move { setup(endpoint, 97, sink, rx).await }
	})
	.await;

	assert_eq!(watchers.len(), 1);
	assert_eq!(watchers[0].endpoint().slug, "right_chain");
	assert_eq!(
		ENDPOINT_SETUP_FAILURES
			.with_label_values(&["wrong_chain"])
			.get(),
		failures_before + 1
	);

	let lines = sink.lines();
	assert_eq!(lines[0], "Connected to Right Chain");
	assert!(!lines.iter().any(|line| line.contains("Wrong Chain")));

	let token = Address::repeat_byte(0xc1);
	assert_eq!(
		watchers[0].subscriptions().events_of(&token).await,
		EventKind::catalogue(ContractKind::Token).to_vec()
	);
	assert_eq!(watchers[0].poller().cursor().await, Some(500));

	for watcher in watchers.iter_mut() {
		watcher.stop().await.unwrap();
	}
}

#[tokio::test]
async fn test_scheduler_failures_fail_setup() {
	let _lock = SCHEDULER_LOCK.lock().unwrap_or_else(|e| e.into_inner());
	let endpoint = EndpointBuilder::new().chain_id(97).build();

	// Scheduler cannot be created
	{
		let ctx = MockJobScheduler::new_context();
		ctx.expect()
			.returning(|| Err("Failed to initialize scheduler".into()));

		let (_tx, rx) = watch::channel(false);
		let result = setup(endpoint.clone(), 97, Arc::new(MemorySink::new()), rx).await;
		assert!(matches!(result, Err(WatcherError::SchedulerError(_))));
	}

	// Poll job cannot be added
	{
		let ctx = MockJobScheduler::new_context();
		ctx.expect().returning(|| {
			let mut scheduler = MockJobScheduler::default();
			scheduler
				.expect_add()
				.returning(|_| Err("Failed to add job".into()));
			Ok(scheduler)
		});

		let (_tx, rx) = watch::channel(false);
		let result = setup(endpoint.clone(), 97, Arc::new(MemorySink::new()), rx).await;
		assert!(matches!(result, Err(WatcherError::SchedulerError(_))));
	}

	// Scheduler does not start
	{
		let ctx = MockJobScheduler::new_context();
		ctx.expect().returning(|| {
			let mut scheduler = MockJobScheduler::default();
			scheduler.expect_add().returning(|_| Ok(()));
			scheduler
				.expect_start()
				.times(1)
				.returning(|| Err("Failed to start scheduler".into()));
			Ok(scheduler)
		});

		let (_tx, rx) = watch::channel(false);
		let result = setup(endpoint.clone(), 97, Arc::new(MemorySink::new()), rx).await;
		assert!(matches!(result, Err(WatcherError::SchedulerError(_))));
	}

	// Scheduler does not shut down
	{
		let ctx = MockJobScheduler::new_context();
		ctx.expect().returning(|| {
			let mut scheduler = MockJobScheduler::default();
			scheduler.expect_add().returning(|_| Ok(()));
			scheduler.expect_start().returning(|| Ok(()));
			scheduler
				.expect_shutdown()
				.returning(|| Err("Failed to shutdown scheduler".into()));
			Ok(scheduler)
		});

		let (_tx, rx) = watch::channel(false);
		let mut watcher = setup(endpoint.clone(), 97, Arc::new(MemorySink::new()), rx)
			.await
			.unwrap();
		assert!(matches!(
			watcher.stop().await,
			Err(WatcherError::SchedulerError(_))
		));
	}
}

#[tokio::test]
async fn test_load_endpoints_from_directory() {
	let dir = TempDir::new().unwrap();
	write_endpoint(
		&dir,
		"01_bnb.json",
		&EndpointBuilder::new()
			.slug("bnb_testnet")
			.name("Binance Testnet")
			.chain_id(97)
			.symbol("BNB")
			.build(),
	);
	write_endpoint(
		&dir,
		"02_mumbai.json",
		&EndpointBuilder::new()
			.slug("mumbai")
			.name("Matic Mumbai Testnet")
			.chain_id(80001)
			.symbol("tMATIC")
			.build(),
	);

	let endpoints = load_endpoints::<EndpointRepository>(Some(dir.path()), &[])
		.await
		.unwrap();
	let slugs: Vec<_> = endpoints.iter().map(|e| e.slug.as_str()).collect();
	assert_eq!(slugs, vec!["bnb_testnet", "mumbai"]);

	let selected = load_endpoints::<EndpointRepository>(Some(dir.path()), &["mumbai".to_string()])
		.await
		.unwrap();
	assert_eq!(selected.len(), 1);
	assert_eq!(selected[0].symbol, "tMATIC");
}

#[tokio::test]
async fn test_invalid_configuration_is_fatal() {
	let empty = TempDir::new().unwrap();
	assert!(matches!(
		load_endpoints::<EndpointRepository>(Some(empty.path()), &[]).await,
		Err(RepositoryError::LoadError(_))
	));

	let dir = TempDir::new().unwrap();
	write_endpoint(
		&dir,
		"bad.json",
		&EndpointBuilder::new().cron_schedule("not a schedule").build(),
	);
	assert!(matches!(
		load_endpoints::<EndpointRepository>(Some(dir.path()), &[]).await,
		Err(RepositoryError::LoadError(_))
	));

	let missing = dir.path().join("missing");
	assert!(load_endpoints::<EndpointRepository>(Some(&missing), &[])
		.await
		.is_err());
}

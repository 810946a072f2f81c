use alloy::primitives::{Address, U256};
use std::sync::{
	atomic::{AtomicU64, Ordering},
	Arc,
};
use tokio::sync::watch;

use chain_event_listener::{
	models::{
		abi::{IFactory, IMinterMarketplace, IToken},
		ContractBinding, ContractKind, EvmLog,
	},
	services::{
		notification::MemorySink,
		subscription::{LogPoller, PollOutcome, SubscriptionManager},
	},
	utils::tests::builders::{EndpointBuilder, LogBuilder},
};

use crate::integration::mocks::MockChainClient;

struct Harness {
	poller: LogPoller<MockChainClient>,
	manager: SubscriptionManager,
	sink: Arc<MemorySink>,
	head: Arc<AtomicU64>,
}

impl Harness {
	/// Moves the chain head to `head` and polls
	async fn advance_to(&self, head: u64) -> PollOutcome {
		self.head.store(head, Ordering::SeqCst);
		self.poller.poll_once().await.unwrap()
	}

	async fn lines(self) -> Vec<String> {
		self.manager.close().await;
		self.sink.lines()
	}
}

async fn harness(
	symbol: &str,
	bindings: &[ContractBinding],
	logs: Vec<EvmLog>,
) -> Harness {
	let endpoint = EndpointBuilder::new().symbol(symbol).build();
	let head = Arc::new(AtomicU64::new(100));

	let mut client = MockChainClient::new();
	let head_reader = head.clone();
	client
		.expect_get_latest_block_number()
		.returning(move || Ok(head_reader.load(Ordering::SeqCst)));
	client
		.expect_get_logs()
		.times(1)
		.returning(move |_| Ok(logs.clone()));

	let sink = Arc::new(MemorySink::new());
	let manager = SubscriptionManager::new(&endpoint.slug, endpoint.channel_capacity, sink.clone());
	for binding in bindings {
		manager.subscribe_catalogue(binding).await;
	}

	let (_tx, rx) = watch::channel(false);
	let poller = LogPoller::new(&endpoint, Arc::new(client), manager.subscriptions(), rx)
		.await
		.unwrap();
	assert_eq!(
		poller.poll_once().await.unwrap(),
		PollOutcome::Initialized { head: 100 }
	);

	Harness {
		poller,
		manager,
		sink,
		head,
	}
}

fn binding(address: Address, kind: ContractKind, symbol: &str) -> ContractBinding {
	ContractBinding::new(address, kind, "test_endpoint", symbol)
}

#[tokio::test]
async fn test_token_transfer_line() {
	let token = Address::repeat_byte(0xcc);
	let log = LogBuilder::new()
		.address(token)
		.event(&IToken::Transfer {
			from: Address::repeat_byte(0xaa),
			to: Address::repeat_byte(0xbb),
			tokenId: U256::from(7),
		})
		.block_number(101)
		.build();

	let harness = harness("ETH", &[binding(token, ContractKind::Token, "ETH")], vec![log]).await;
	assert_eq!(
		harness.advance_to(101).await,
		PollOutcome::Processed {
			from: 101,
			to: 101,
			delivered: 1
		}
	);

	assert_eq!(
		harness.lines().await,
		vec![format!(
			"ETH {}: {} sent token #7 to {}!",
			token.to_checksum(None),
			Address::repeat_byte(0xaa).to_checksum(None),
			Address::repeat_byte(0xbb).to_checksum(None)
		)]
	);
}

#[tokio::test]
async fn test_marketplace_node_fee_line() {
	let marketplace = Address::repeat_byte(0xe0);
	let log = LogBuilder::new()
		.address(marketplace)
		.event(&IMinterMarketplace::ChangedNodeFee { newFee: 250 })
		.block_number(102)
		.build();

	let harness = harness(
		"BNB",
		&[binding(marketplace, ContractKind::Marketplace, "BNB")],
		vec![log],
	)
	.await;
	harness.advance_to(102).await;

	let lines = harness.lines().await;
	assert_eq!(lines.len(), 1);
	assert!(lines[0].contains("BNB Minter Marketplace updated the node fee to 250"));
}

#[tokio::test]
async fn test_events_are_routed_by_binding() {
	let marketplace = Address::repeat_byte(0xe0);
	let factory = Address::repeat_byte(0xf0);
	let token = Address::repeat_byte(0xcc);
	let stranger = Address::repeat_byte(0x99);

	let logs = vec![
		LogBuilder::new()
			.address(factory)
			.event(&IFactory::TokenNoLongerAccepted {
				tokenAddress: Address::repeat_byte(0x77),
			})
			.block_number(101)
			.log_index(0)
			.build(),
		// Token event on a contract nobody subscribed
		LogBuilder::new()
			.address(stranger)
			.event(&IToken::CollectionCompleted {
				collectionId: U256::from(1),
				name: "Foreign".to_string(),
			})
			.block_number(101)
			.log_index(1)
			.build(),
		LogBuilder::new()
			.address(token)
			.event(&IToken::CollectionCompleted {
				collectionId: U256::from(3),
				name: "Genesis".to_string(),
			})
			.block_number(102)
			.build(),
	];

	let harness = harness(
		"BNB",
		&[
			binding(marketplace, ContractKind::Marketplace, "BNB"),
			binding(factory, ContractKind::Factory, "BNB"),
			binding(token, ContractKind::Token, "BNB"),
		],
		logs,
	)
	.await;
	assert_eq!(
		harness.advance_to(102).await,
		PollOutcome::Processed {
			from: 101,
			to: 102,
			delivered: 2
		}
	);

	// Bindings drain independently, so only the per-binding order is fixed
	let mut lines = harness.lines().await;
	lines.sort();
	let mut expected = vec![
		format!(
			"BNB Factory: tokens from {} are no longer accepted!",
			Address::repeat_byte(0x77).to_checksum(None)
		),
		format!(
			"BNB {} collection #3 (Genesis) ran out of mintable copies!",
			token.to_checksum(None)
		),
	];
	expected.sort();
	assert_eq!(lines, expected);
}

//! Endpoints compiled into the binary, used when no configuration directory is given.

use alloy::primitives::{address, Address};

use crate::models::{
	Endpoint, RpcUrl, SecretString, SecretValue, DEFAULT_CHANNEL_CAPACITY,
	DEFAULT_CRON_SCHEDULE, DEFAULT_MAX_BLOCK_RANGE,
};

/// Environment variable holding the (API-keyed) Goerli RPC URL
pub const GOERLI_RPC_URL_ENV: &str = "GOERLI_RPC_URL";

fn endpoint(
	slug: &str,
	name: &str,
	chain_id: u64,
	symbol: &str,
	url: SecretValue,
	factory_address: Address,
	marketplace_address: Address,
) -> Endpoint {
	Endpoint {
		slug: slug.to_string(),
		name: name.to_string(),
		chain_id,
		symbol: symbol.to_string(),
		rpc_urls: vec![RpcUrl {
			type_: "rpc".to_string(),
			url,
			weight: 100,
		}],
		factory_address,
		marketplace_address,
		cron_schedule: DEFAULT_CRON_SCHEDULE.to_string(),
		channel_capacity: DEFAULT_CHANNEL_CAPACITY,
		max_block_range: DEFAULT_MAX_BLOCK_RANGE,
	}
}

fn plain(url: &str) -> SecretValue {
	SecretValue::Plain(SecretString::new(url.to_string()))
}

/// The Binance, Goerli and Mumbai test networks, in setup order.
///
/// Secrets are left unresolved; the Goerli URL is read from [`GOERLI_RPC_URL_ENV`].
pub fn builtin_endpoints() -> Vec<Endpoint> {
	vec![
		endpoint(
			"bnb_testnet",
			"Binance Testnet",
			97,
			"BNB",
			plain("https://data-seed-prebsc-1-s1.binance.org:8545/"),
			address!("0x58B81fE7D18ED2296A9E814c768d28dA3BCC94F9"),
			address!("0x8Fbb22212E2e5278743dE98E9A272e1f336d1Bdd"),
		),
		endpoint(
			"goerli",
			"Goerli Testnet",
			5,
			"ETH",
			SecretValue::Environment(GOERLI_RPC_URL_ENV.to_string()),
			address!("0xC9eF9902fa24923A17326aDdb7da0E67fF46692a"),
			address!("0x0Ce668D271b8016a785Bf146e58739F432300B12"),
		),
		endpoint(
			"mumbai",
			"Matic Mumbai Testnet",
			80001,
			"tMATIC",
			plain("https://rpc-mumbai.maticvigil.com"),
			address!("0xc76c3ebEA0aC6aC78d9c0b324f72CA59da36B9df"),
			address!("0xC9eF9902fa24923A17326aDdb7da0E67fF46692a"),
		),
	]
}

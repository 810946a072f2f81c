#![no_main]

use alloy::primitives::{Address, Bytes, B256};
use chain_event_listener::models::{ContractEvent, ContractKind, EventKind, EvmLog};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let [kind, selector, extra_topics, rest @ ..] = data else {
        return;
    };
    let kind = [ContractKind::Marketplace, ContractKind::Factory, ContractKind::Token]
        [*kind as usize % 3];
    let catalogue = EventKind::catalogue(kind);
    let event = catalogue[*selector as usize % catalogue.len()];

    let mut topics = vec![event.topic()];
    let mut chunks = rest.chunks_exact(32);
    for _ in 0..(*extra_topics % 4) {
        match chunks.next() {
            Some(chunk) => topics.push(B256::from_slice(chunk)),
            None => break,
        }
    }
    let consumed = (topics.len() - 1) * 32;

    let log = EvmLog {
        address: Address::ZERO,
        topics,
        data: Bytes::copy_from_slice(&rest[consumed..]),
        block_number: None,
        transaction_hash: None,
        log_index: None,
        removed: false,
    };
    let _ = ContractEvent::decode_log(event.contract_kind(), &log);
});

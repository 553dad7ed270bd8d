// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::config::TransactionApiConfig;
use crate::host::Host;
use crate::TransactionApi;
use chain_models::action::ActionSerializer;
use chain_models::{Action, ActionKind, Name, PermissionLevel, Transaction};
use chain_serialization::Serializer;
use chain_time::ChainTime;
use std::cell::RefCell;
use std::str::FromStr;

/// what the scheduler received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentDeferred {
    pub sender_id: u128,
    pub payer: Name,
    pub delay_until: ChainTime,
    pub data: Vec<u8>,
}

/// In-memory host executing one action of `transaction`
pub struct TestHost {
    pub transaction: Transaction,
    pub action_data: Vec<u8>,
    pub receiver: Name,
    pub now: ChainTime,
    pub sent: RefCell<Vec<SentDeferred>>,
    pub failures: RefCell<Vec<String>>,
}

impl TestHost {
    pub fn new(transaction: Transaction) -> Self {
        TestHost {
            transaction,
            action_data: Vec::new(),
            receiver: name("eosio"),
            now: ChainTime::from_secs(1_000_000),
            sent: RefCell::new(Vec::new()),
            failures: RefCell::new(Vec::new()),
        }
    }
}

/// copies `packed` when it fits and always reports its size
fn copy_if_fits(packed: &[u8], buffer: &mut [u8]) -> i32 {
    if buffer.len() >= packed.len() {
        buffer[..packed.len()].copy_from_slice(packed);
    }
    packed.len() as i32
}

impl Host for TestHost {
    fn get_action(&self, kind: u32, index: u32, buffer: &mut [u8]) -> i32 {
        let list = match ActionKind::from_raw(kind) {
            Ok(ActionKind::ContextFree) => &self.transaction.context_free_actions,
            Ok(ActionKind::Regular) => &self.transaction.actions,
            Err(_) => return -1,
        };
        let Some(action) = list.get(index as usize) else {
            return -1;
        };
        let mut packed = Vec::new();
        ActionSerializer::new()
            .serialize(action, &mut packed)
            .unwrap();
        copy_if_fits(&packed, buffer)
    }

    fn read_action_data(&self, buffer: &mut [u8]) -> i32 {
        copy_if_fits(&self.action_data, buffer)
    }

    fn send_deferred(&self, sender_id: u128, payer: Name, delay_until: ChainTime, data: &[u8]) {
        self.sent.borrow_mut().push(SentDeferred {
            sender_id,
            payer,
            delay_until,
            data: data.to_vec(),
        });
    }

    fn current_time(&self) -> ChainTime {
        self.now
    }

    fn current_receiver(&self) -> Name {
        self.receiver
    }

    fn fail_fast(&self, message: &str) {
        self.failures.borrow_mut().push(message.to_string());
    }
}

pub fn name(text: &str) -> Name {
    Name::from_str(text).unwrap()
}

pub fn transfer_action(data: Vec<u8>) -> Action {
    Action::new(
        name("eosio.token"),
        name("transfer"),
        vec![PermissionLevel::new(name("alice"), name("active"))],
        data,
    )
}

pub fn base_transaction() -> Transaction {
    let mut transaction = Transaction::new(ChainTime::from_secs(1000), 0);
    transaction.ref_block_num = 5;
    transaction.ref_block_prefix = 0xAABBCCDD;
    transaction
}

pub fn start_api(host: TestHost) -> TransactionApi<TestHost> {
    TransactionApi::new(host, TransactionApiConfig::default())
}

use std::io::Write;

use gxc_primitives::ec::PublicKey;
use serde::{Deserialize, Serialize};

use crate::authority::Authority;
use crate::encoder::{Encodable, Encoder};
use crate::types::{AssetAmount, Extensions, ObjectId};
use crate::vote::VoteSet;
use crate::TransactionError;

/// Register a new account.
///
/// Wire order: fee, registrar, referrer, referrer_percent, name, owner,
/// active, options, extensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountCreateOperation {
    pub fee: AssetAmount,
    pub registrar: ObjectId,
    pub referrer: ObjectId,
    /// Share of fees routed to the referrer, in hundredths of a percent.
    pub referrer_percent: u16,
    pub name: String,
    pub owner: Authority,
    pub active: Authority,
    pub options: AccountOptions,
    #[serde(default)]
    pub extensions: AccountCreateExtensions,
}

impl Encodable for AccountCreateOperation {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.encode(&self.fee)
            .encode(&self.registrar)
            .encode(&self.referrer)
            .write_u16(self.referrer_percent)
            .write_str(&self.name)
            .encode(&self.owner)
            .encode(&self.active)
            .encode(&self.options)
            .encode(&self.extensions);
    }
}

/// Per-account settings: memo key and governance votes.
///
/// Wire order: memo_key, voting_account, num_witness, num_committee,
/// votes (canonical order), extensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountOptions {
    pub memo_key: PublicKey,
    pub voting_account: ObjectId,
    pub num_witness: u16,
    pub num_committee: u16,
    #[serde(default)]
    pub votes: VoteSet,
    #[serde(default)]
    pub extensions: Extensions,
}

impl AccountOptions {
    /// Options with no votes, proxying to `voting_account`.
    pub fn new(memo_key: PublicKey, voting_account: ObjectId) -> Self {
        AccountOptions {
            memo_key,
            voting_account,
            num_witness: 0,
            num_committee: 0,
            votes: VoteSet::default(),
            extensions: Extensions::default(),
        }
    }
}

impl Encodable for AccountOptions {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.encode(&self.memo_key)
            .encode(&self.voting_account)
            .write_u16(self.num_witness)
            .write_u16(self.num_committee)
            .encode(&self.votes)
            .encode(&self.extensions);
    }
}

/// Optional account-creation extensions, kept as a JSON object.
///
/// Only the empty object has a binary encoding.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountCreateExtensions(pub serde_json::Map<String, serde_json::Value>);

impl Encodable for AccountCreateExtensions {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        if self.0.is_empty() {
            enc.write_uvarint(0);
        } else {
            let names: Vec<&str> = self.0.keys().map(String::as_str).collect();
            enc.fail(TransactionError::UnsupportedExtension(names.join(", ")));
        }
    }
}

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::encoder::{Encodable, Encoder};
use crate::memo::Memo;
use crate::types::{AssetAmount, Extensions, ObjectId};

/// Move an amount of an asset between two accounts, optionally with an
/// encrypted memo.
///
/// Wire order: fee, from, to, amount, memo flag (+ memo), extensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferOperation {
    pub fee: AssetAmount,
    pub from: ObjectId,
    pub to: ObjectId,
    pub amount: AssetAmount,
    /// A memo whose message is empty is kept in JSON but encoded as absent
    /// in the binary body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<Memo>,
    #[serde(default)]
    pub extensions: Extensions,
}

impl TransferOperation {
    pub fn new(from: ObjectId, to: ObjectId, amount: AssetAmount, fee: AssetAmount, memo: Option<Memo>) -> Self {
        TransferOperation {
            fee,
            from,
            to,
            amount,
            memo,
            extensions: Extensions::default(),
        }
    }
}

impl Encodable for TransferOperation {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.encode(&self.fee)
            .encode(&self.from)
            .encode(&self.to)
            .encode(&self.amount);
        // A memo with an empty message is dropped from the signed body.
        match &self.memo {
            Some(memo) if !memo.message.as_bytes().is_empty() => {
                enc.write_bool(true).encode(memo);
            }
            _ => {
                enc.write_bool(false);
            }
        }
        enc.encode(&self.extensions);
    }
}

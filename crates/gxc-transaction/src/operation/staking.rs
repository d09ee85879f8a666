//! Staking operations: lock an amount with a trust node, move the lock to
//! another node, and claim it back once the term has passed.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::encoder::{Encodable, Encoder};
use crate::types::{AssetAmount, Extensions, ObjectId};

/// Stake `amount` with `trust_node` under a staking program.
///
/// Wire order: fee, owner, trust_node, amount, program_id, weight,
/// staking_days, extensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StakingCreateOperation {
    pub fee: AssetAmount,
    pub owner: ObjectId,
    pub trust_node: ObjectId,
    pub amount: AssetAmount,
    pub program_id: String,
    pub weight: u32,
    pub staking_days: u32,
    #[serde(default)]
    pub extensions: Extensions,
}

impl StakingCreateOperation {
    pub fn new(
        owner: ObjectId,
        trust_node: ObjectId,
        amount: AssetAmount,
        fee: AssetAmount,
        program_id: impl Into<String>,
        weight: u32,
        staking_days: u32,
    ) -> Self {
        StakingCreateOperation {
            fee,
            owner,
            trust_node,
            amount,
            program_id: program_id.into(),
            weight,
            staking_days,
            extensions: Extensions::default(),
        }
    }
}

impl Encodable for StakingCreateOperation {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.encode(&self.fee)
            .encode(&self.owner)
            .encode(&self.trust_node)
            .encode(&self.amount)
            .write_str(&self.program_id)
            .write_u32(self.weight)
            .write_u32(self.staking_days)
            .encode(&self.extensions);
    }
}

/// Move an existing stake to a different trust node.
///
/// Wire order: fee, owner, trust_node, staking_id, extensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StakingUpdateOperation {
    pub fee: AssetAmount,
    pub owner: ObjectId,
    pub trust_node: ObjectId,
    pub staking_id: ObjectId,
    #[serde(default)]
    pub extensions: Extensions,
}

impl StakingUpdateOperation {
    pub fn new(owner: ObjectId, trust_node: ObjectId, staking_id: ObjectId, fee: AssetAmount) -> Self {
        StakingUpdateOperation {
            fee,
            owner,
            trust_node,
            staking_id,
            extensions: Extensions::default(),
        }
    }
}

impl Encodable for StakingUpdateOperation {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.encode(&self.fee)
            .encode(&self.owner)
            .encode(&self.trust_node)
            .encode(&self.staking_id)
            .encode(&self.extensions);
    }
}

/// Release a matured stake back to its owner.
///
/// Wire order: fee, owner, staking_id, extensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StakingClaimOperation {
    pub fee: AssetAmount,
    pub owner: ObjectId,
    pub staking_id: ObjectId,
    #[serde(default)]
    pub extensions: Extensions,
}

impl StakingClaimOperation {
    pub fn new(owner: ObjectId, staking_id: ObjectId, fee: AssetAmount) -> Self {
        StakingClaimOperation {
            fee,
            owner,
            staking_id,
            extensions: Extensions::default(),
        }
    }
}

impl Encodable for StakingClaimOperation {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.encode(&self.fee)
            .encode(&self.owner)
            .encode(&self.staking_id)
            .encode(&self.extensions);
    }
}

//! Vote identifiers.
//!
//! A vote id is a `(type, instance)` pair written `"type:instance"` and
//! packed on the wire as a little-endian u32 with the type in the low 8
//! bits and the instance in the high 24 bits.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::encoder::{Encodable, Encoder};
use crate::TransactionError;

/// Largest instance that fits in the packed form.
pub const MAX_VOTE_INSTANCE: u32 = 0x00ff_ffff;

/// A `(type, instance)` vote identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VoteId {
    vote_type: u8,
    instance: u32,
}

impl VoteId {
    /// Construct a vote id.
    ///
    /// # Returns
    /// `InvalidVoteId` if `instance` exceeds 24 bits.
    pub fn new(vote_type: u8, instance: u32) -> Result<Self, TransactionError> {
        if instance > MAX_VOTE_INSTANCE {
            return Err(TransactionError::InvalidVoteId(format!(
                "instance {} exceeds {}",
                instance, MAX_VOTE_INSTANCE
            )));
        }
        Ok(VoteId {
            vote_type,
            instance,
        })
    }

    /// The vote type (committee, witness, worker...).
    pub fn vote_type(&self) -> u8 {
        self.vote_type
    }

    /// The instance within the type.
    pub fn instance(&self) -> u32 {
        self.instance
    }

    /// The packed 32-bit form.
    pub fn pack(&self) -> u32 {
        u32::from(self.vote_type) | (self.instance << 8)
    }

    /// Unpack the 32-bit form.
    pub fn unpack(packed: u32) -> Self {
        VoteId {
            vote_type: (packed & 0xff) as u8,
            instance: packed >> 8,
        }
    }
}

impl fmt::Display for VoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.vote_type, self.instance)
    }
}

impl FromStr for VoteId {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TransactionError::InvalidVoteId(s.to_string());
        let (vote_type, instance) = s.split_once(':').ok_or_else(invalid)?;
        Self::new(
            vote_type.parse().map_err(|_| invalid())?,
            instance.parse().map_err(|_| invalid())?,
        )
    }
}

impl Serialize for VoteId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VoteId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Encodable for VoteId {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.write_u32(self.pack());
    }
}

/// A collection of votes.
///
/// Encoding drops exact duplicates and orders the rest by instance, then
/// by type, which is ascending order of the packed form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoteSet(pub Vec<VoteId>);

impl VoteSet {
    /// Votes in canonical encoding order, without duplicates.
    pub fn canonical(&self) -> Vec<VoteId> {
        let mut votes = self.0.clone();
        votes.sort_by_key(|v| (v.instance, v.vote_type));
        votes.dedup();
        votes
    }
}

impl FromIterator<VoteId> for VoteSet {
    fn from_iter<I: IntoIterator<Item = VoteId>>(iter: I) -> Self {
        VoteSet(iter.into_iter().collect())
    }
}

impl Encodable for VoteSet {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.encode(&self.canonical());
    }
}

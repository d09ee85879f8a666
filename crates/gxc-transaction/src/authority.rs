//! Weighted authorities and their canonical ordering.
//!
//! Each weighted collection is a set of unique entities with a `u16`
//! weight. Iteration order carries no meaning, so encoding always sorts
//! first:
//!
//! - account auths: ascending by account instance, then space, then type
//! - key auths: ascending by the derived address string
//! - address auths: ascending by the address string
//!
//! Inserting an entity that is already present replaces its weight; a JSON
//! array listing the same entity twice keeps the last weight.

use std::fmt;
use std::io::Write;
use std::marker::PhantomData;

use gxc_primitives::ec::{Address, PublicKey};
use serde::de::{DeserializeOwned, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::encoder::{Encodable, Encoder};
use crate::types::{Extensions, ObjectId};

/// An entity that can appear in a weighted authority collection.
pub trait AuthorityEntity: Clone + Eq + Encodable + Serialize + DeserializeOwned {
    /// Total order used when encoding.
    type SortKey: Ord;

    /// The key this entity sorts by.
    fn sort_key(&self) -> Self::SortKey;
}

impl AuthorityEntity for ObjectId {
    type SortKey = (u64, u8, u8);

    fn sort_key(&self) -> Self::SortKey {
        (self.instance, self.space, self.type_id)
    }
}

impl AuthorityEntity for PublicKey {
    type SortKey = String;

    fn sort_key(&self) -> Self::SortKey {
        self.to_address().to_string()
    }
}

impl AuthorityEntity for Address {
    type SortKey = String;

    fn sort_key(&self) -> Self::SortKey {
        self.to_string()
    }
}

/// A set of `(entity, weight)` pairs.
#[derive(Clone, Debug)]
pub struct WeightedSet<K> {
    entries: Vec<(K, u16)>,
}

/// Accounts allowed to act for an authority.
pub type AccountAuths = WeightedSet<ObjectId>;
/// Public keys allowed to sign for an authority.
pub type KeyAuths = WeightedSet<PublicKey>;
/// Addresses allowed to sign for an authority.
pub type AddressAuths = WeightedSet<Address>;

impl<K: AuthorityEntity> WeightedSet<K> {
    /// An empty set.
    pub fn new() -> Self {
        WeightedSet {
            entries: Vec::new(),
        }
    }

    /// Insert or replace an entity's weight.
    ///
    /// # Returns
    /// The previous weight, if the entity was already present.
    pub fn insert(&mut self, entity: K, weight: u16) -> Option<u16> {
        match self.entries.iter_mut().find(|(k, _)| *k == entity) {
            Some((_, w)) => Some(std::mem::replace(w, weight)),
            None => {
                self.entries.push((entity, weight));
                None
            }
        }
    }

    /// Remove an entity, returning its weight.
    pub fn remove(&mut self, entity: &K) -> Option<u16> {
        let pos = self.entries.iter().position(|(k, _)| k == entity)?;
        Some(self.entries.remove(pos).1)
    }

    /// The weight of an entity.
    pub fn get(&self, entity: &K) -> Option<u16> {
        self.entries.iter().find(|(k, _)| k == entity).map(|(_, w)| *w)
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, u16)> {
        self.entries.iter().map(|(k, w)| (k, *w))
    }

    /// Entries in canonical encoding order.
    pub fn canonical(&self) -> Vec<(&K, u16)> {
        let mut sorted: Vec<(&K, u16)> = self.iter().collect();
        sorted.sort_by_cached_key(|(k, _)| k.sort_key());
        sorted
    }
}

impl<K: AuthorityEntity> Default for WeightedSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: AuthorityEntity> PartialEq for WeightedSet<K> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, w)| other.get(k) == Some(w))
    }
}

impl<K: AuthorityEntity> Eq for WeightedSet<K> {}

impl<K: AuthorityEntity> FromIterator<(K, u16)> for WeightedSet<K> {
    fn from_iter<I: IntoIterator<Item = (K, u16)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (k, w) in iter {
            set.insert(k, w);
        }
        set
    }
}

impl<K: AuthorityEntity> Encodable for WeightedSet<K> {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.write_uvarint(self.entries.len() as u64);
        for (entity, weight) in self.canonical() {
            enc.encode(entity).write_u16(weight);
        }
    }
}

impl<K: AuthorityEntity> Serialize for WeightedSet<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for (entity, weight) in &self.entries {
            seq.serialize_element(&(entity, weight))?;
        }
        seq.end()
    }
}

impl<'de, K: AuthorityEntity> Deserialize<'de> for WeightedSet<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PairsVisitor<K>(PhantomData<K>);

        impl<'de, K: AuthorityEntity> Visitor<'de> for PairsVisitor<K> {
            type Value = WeightedSet<K>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an array of [entity, weight] pairs")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut set = WeightedSet::new();
                while let Some((entity, weight)) = seq.next_element::<(K, u16)>()? {
                    set.insert(entity, weight);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_seq(PairsVisitor(PhantomData))
    }
}

/// A weighted threshold authority.
///
/// Wire order: weight threshold (u32), account auths, key auths,
/// address auths, extensions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Authority {
    /// Total weight required to satisfy the authority.
    pub weight_threshold: u32,
    /// Weighted accounts.
    #[serde(default)]
    pub account_auths: AccountAuths,
    /// Weighted public keys.
    #[serde(default)]
    pub key_auths: KeyAuths,
    /// Weighted addresses.
    #[serde(default)]
    pub address_auths: AddressAuths,
    /// Extension slot.
    #[serde(default)]
    pub extensions: Extensions,
}

impl Authority {
    /// A single-key authority with threshold 1, the usual account setup.
    pub fn single_key(key: PublicKey) -> Self {
        Authority {
            weight_threshold: 1,
            key_auths: std::iter::once((key, 1)).collect(),
            ..Default::default()
        }
    }
}

impl Encodable for Authority {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.write_u32(self.weight_threshold)
            .encode(&self.account_auths)
            .encode(&self.key_auths)
            .encode(&self.address_auths)
            .encode(&self.extensions);
    }
}

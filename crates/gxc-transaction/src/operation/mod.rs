//! The operation envelope.
//!
//! On the wire an operation is `varint(tag)` followed by the variant body;
//! in JSON it is the pair `[tag, payload]`. Decoding looks the tag up in
//! [`REGISTRY`]. Tags with no entry decode into [`Operation::Unknown`],
//! which keeps the raw payload so it can be written back as JSON unchanged
//! but refuses binary encoding.

pub mod account_create;
pub mod staking;
pub mod transfer;

use std::fmt;
use std::io::Write;

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;

use crate::encoder::{Encodable, Encoder};
use crate::types::AssetAmount;
use crate::TransactionError;

pub use account_create::{AccountCreateExtensions, AccountCreateOperation, AccountOptions};
pub use staking::{StakingClaimOperation, StakingCreateOperation, StakingUpdateOperation};
pub use transfer::TransferOperation;

/// Operation kinds with a first-class representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationType {
    Transfer,
    AccountCreate,
    StakingCreate,
    StakingUpdate,
    StakingClaim,
}

impl OperationType {
    /// The chain's numeric tag for this kind.
    pub const fn tag(self) -> u64 {
        match self {
            OperationType::Transfer => 0,
            OperationType::AccountCreate => 5,
            OperationType::StakingCreate => 80,
            OperationType::StakingUpdate => 81,
            OperationType::StakingClaim => 82,
        }
    }

    pub fn from_tag(tag: u64) -> Option<Self> {
        REGISTRY
            .iter()
            .map(|(op_type, _)| *op_type)
            .find(|op_type| op_type.tag() == tag)
    }

    pub const fn name(self) -> &'static str {
        match self {
            OperationType::Transfer => "transfer",
            OperationType::AccountCreate => "account_create",
            OperationType::StakingCreate => "staking_create",
            OperationType::StakingUpdate => "staking_update",
            OperationType::StakingClaim => "staking_claim",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Decodes a JSON payload into the matching [`Operation`] variant.
pub type DecodeFn = fn(&RawValue) -> Result<Operation, serde_json::Error>;

/// Tag to constructor table consulted by JSON decode.
pub static REGISTRY: &[(OperationType, DecodeFn)] = &[
    (OperationType::Transfer, |raw| {
        serde_json::from_str(raw.get()).map(Operation::Transfer)
    }),
    (OperationType::AccountCreate, |raw| {
        serde_json::from_str(raw.get()).map(|op| Operation::AccountCreate(Box::new(op)))
    }),
    (OperationType::StakingCreate, |raw| {
        serde_json::from_str(raw.get()).map(Operation::StakingCreate)
    }),
    (OperationType::StakingUpdate, |raw| {
        serde_json::from_str(raw.get()).map(Operation::StakingUpdate)
    }),
    (OperationType::StakingClaim, |raw| {
        serde_json::from_str(raw.get()).map(Operation::StakingClaim)
    }),
];

/// Look up the decoder registered for `tag`.
pub fn decoder_for(tag: u64) -> Option<DecodeFn> {
    REGISTRY
        .iter()
        .find(|(op_type, _)| op_type.tag() == tag)
        .map(|(_, decode)| *decode)
}

/// An operation whose tag has no registered variant.
///
/// The payload is kept as the exact JSON text it was read from.
#[derive(Clone, Debug)]
pub struct UnknownOperation {
    pub tag: u64,
    pub payload: Box<RawValue>,
}

impl UnknownOperation {
    pub fn new(tag: u64, payload: Box<RawValue>) -> Self {
        UnknownOperation { tag, payload }
    }
}

impl PartialEq for UnknownOperation {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.payload.get() == other.payload.get()
    }
}

/// A single operation inside a transaction.
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    Transfer(TransferOperation),
    AccountCreate(Box<AccountCreateOperation>),
    StakingCreate(StakingCreateOperation),
    StakingUpdate(StakingUpdateOperation),
    StakingClaim(StakingClaimOperation),
    Unknown(UnknownOperation),
}

impl Operation {
    /// The variant kind, or `None` for an unknown tag.
    pub fn op_type(&self) -> Option<OperationType> {
        match self {
            Operation::Transfer(_) => Some(OperationType::Transfer),
            Operation::AccountCreate(_) => Some(OperationType::AccountCreate),
            Operation::StakingCreate(_) => Some(OperationType::StakingCreate),
            Operation::StakingUpdate(_) => Some(OperationType::StakingUpdate),
            Operation::StakingClaim(_) => Some(OperationType::StakingClaim),
            Operation::Unknown(_) => None,
        }
    }

    pub fn tag(&self) -> u64 {
        match self {
            Operation::Unknown(op) => op.tag,
            _ => self.op_type().map_or(0, OperationType::tag),
        }
    }

    /// The fee paid by this operation; unknown operations expose none.
    pub fn fee(&self) -> Option<&AssetAmount> {
        match self {
            Operation::Transfer(op) => Some(&op.fee),
            Operation::AccountCreate(op) => Some(&op.fee),
            Operation::StakingCreate(op) => Some(&op.fee),
            Operation::StakingUpdate(op) => Some(&op.fee),
            Operation::StakingClaim(op) => Some(&op.fee),
            Operation::Unknown(_) => None,
        }
    }

    /// Replace the fee, e.g. with one quoted by a node.
    ///
    /// # Returns
    /// `UnsupportedOperation` for an unknown operation.
    pub fn set_fee(&mut self, fee: AssetAmount) -> Result<(), TransactionError> {
        let slot = match self {
            Operation::Transfer(op) => &mut op.fee,
            Operation::AccountCreate(op) => &mut op.fee,
            Operation::StakingCreate(op) => &mut op.fee,
            Operation::StakingUpdate(op) => &mut op.fee,
            Operation::StakingClaim(op) => &mut op.fee,
            Operation::Unknown(op) => {
                return Err(TransactionError::UnsupportedOperation { tag: op.tag })
            }
        };
        *slot = fee;
        Ok(())
    }

    /// Encode the JSON payload (without the tag).
    fn payload_to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Operation::Transfer(op) => serde_json::to_value(op),
            Operation::AccountCreate(op) => serde_json::to_value(op),
            Operation::StakingCreate(op) => serde_json::to_value(op),
            Operation::StakingUpdate(op) => serde_json::to_value(op),
            Operation::StakingClaim(op) => serde_json::to_value(op),
            Operation::Unknown(op) => serde_json::from_str(op.payload.get()),
        }
    }
}

impl From<TransferOperation> for Operation {
    fn from(op: TransferOperation) -> Self {
        Operation::Transfer(op)
    }
}

impl From<AccountCreateOperation> for Operation {
    fn from(op: AccountCreateOperation) -> Self {
        Operation::AccountCreate(Box::new(op))
    }
}

impl From<StakingCreateOperation> for Operation {
    fn from(op: StakingCreateOperation) -> Self {
        Operation::StakingCreate(op)
    }
}

impl From<StakingUpdateOperation> for Operation {
    fn from(op: StakingUpdateOperation) -> Self {
        Operation::StakingUpdate(op)
    }
}

impl From<StakingClaimOperation> for Operation {
    fn from(op: StakingClaimOperation) -> Self {
        Operation::StakingClaim(op)
    }
}

impl Encodable for Operation {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        let tag = self.tag();
        match self {
            Operation::Transfer(op) => {
                enc.write_uvarint(tag).encode(op);
            }
            Operation::AccountCreate(op) => {
                enc.write_uvarint(tag).encode(op.as_ref());
            }
            Operation::StakingCreate(op) => {
                enc.write_uvarint(tag).encode(op);
            }
            Operation::StakingUpdate(op) => {
                enc.write_uvarint(tag).encode(op);
            }
            Operation::StakingClaim(op) => {
                enc.write_uvarint(tag).encode(op);
            }
            Operation::Unknown(_) => enc.fail(TransactionError::UnsupportedOperation { tag }),
        }
    }
}

impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.tag())?;
        match self {
            Operation::Unknown(op) => tuple.serialize_element(&op.payload)?,
            Operation::Transfer(op) => tuple.serialize_element(op)?,
            Operation::AccountCreate(op) => tuple.serialize_element(op)?,
            Operation::StakingCreate(op) => tuple.serialize_element(op)?,
            Operation::StakingUpdate(op) => tuple.serialize_element(op)?,
            Operation::StakingClaim(op) => tuple.serialize_element(op)?,
        }
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OperationVisitor;

        impl<'de> Visitor<'de> for OperationVisitor {
            type Value = Operation;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an operation as [tag, payload]")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Operation, A::Error> {
                let tag: u64 = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let payload: Box<RawValue> = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(1, &self))?;
                if seq.next_element::<de::IgnoredAny>()?.is_some() {
                    return Err(de::Error::invalid_length(3, &self));
                }

                match decoder_for(tag) {
                    Some(decode) => decode(&payload).map_err(|e| {
                        de::Error::custom(format!("operation {}: {}", tag, e))
                    }),
                    None => {
                        tracing::debug!(tag, "decoding unregistered operation as passthrough");
                        Ok(Operation::Unknown(UnknownOperation::new(tag, payload)))
                    }
                }
            }
        }

        deserializer.deserialize_seq(OperationVisitor)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload_to_value() {
            Ok(payload) => write!(f, "[{},{}]", self.tag(), payload),
            Err(_) => write!(f, "[{},?]", self.tag()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::to_bytes;
    use crate::types::ObjectId;

    fn gxc(amount: i64) -> AssetAmount {
        AssetAmount::new(amount, ObjectId::asset(0))
    }

    fn transfer() -> Operation {
        TransferOperation::new(
            ObjectId::account(100),
            ObjectId::account(200),
            gxc(401_000_000),
            gxc(0),
            None,
        )
        .into()
    }

    #[test]
    fn test_transfer_golden_vector() {
        let bytes = to_bytes(&transfer()).unwrap();
        assert_eq!(
            hex::encode(bytes),
            "0000000000000000000064c80140c6e61700000000000000"
        );
    }

    #[test]
    fn test_transfer_empty_memo_encodes_as_absent() {
        let mut op = TransferOperation::new(
            ObjectId::account(100),
            ObjectId::account(200),
            gxc(1),
            gxc(0),
            None,
        );
        let without = to_bytes(&op).unwrap();

        let key = gxc_primitives::ec::PrivateKey::from_brain_key("memo holder", 0).unwrap();
        op.memo = Some(crate::memo::Memo {
            from: key.public_key().clone(),
            to: key.public_key().clone(),
            nonce: 7,
            message: crate::types::Buffer(Vec::new()),
        });
        assert_eq!(to_bytes(&op).unwrap(), without);
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["memo"]["nonce"], 7);
    }

    #[test]
    fn test_registry_tags() {
        for (op_type, _) in REGISTRY {
            assert_eq!(OperationType::from_tag(op_type.tag()), Some(*op_type));
        }
        assert_eq!(OperationType::from_tag(1), None);
        assert_eq!(OperationType::StakingClaim.tag(), 82);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(transfer()).unwrap();
        assert_eq!(json[0], 0);
        assert_eq!(json[1]["from"], "1.2.100");
        assert_eq!(json[1]["amount"]["amount"], 401_000_000);
        assert!(json[1].get("memo").is_none());
        assert_eq!(json[1]["extensions"], serde_json::json!([]));
    }

    #[test]
    fn test_staking_json_roundtrip() {
        let ops: Vec<Operation> = vec![
            StakingCreateOperation::new(
                ObjectId::account(17),
                ObjectId::account(22),
                gxc(100_000),
                gxc(100),
                "5",
                10,
                7,
            )
            .into(),
            StakingUpdateOperation::new(
                ObjectId::account(17),
                ObjectId::account(23),
                ObjectId::new(1, 27, 4),
                gxc(100),
            )
            .into(),
            StakingClaimOperation::new(ObjectId::account(17), ObjectId::new(1, 27, 4), gxc(100)).into(),
        ];
        for op in ops {
            let text = serde_json::to_string(&op).unwrap();
            let back: Operation = serde_json::from_str(&text).unwrap();
            assert_eq!(back, op);
        }
    }

    #[test]
    fn test_staking_create_encoding() {
        let op: Operation = StakingCreateOperation::new(
            ObjectId::account(17),
            ObjectId::account(22),
            gxc(100_000),
            gxc(100),
            "5",
            10,
            7,
        )
        .into();
        let bytes = to_bytes(&op).unwrap();
        let expected = [
            "50",               // tag 80
            "6400000000000000", // fee amount
            "00",               // fee asset
            "11",               // owner
            "16",               // trust node
            "a086010000000000", // amount
            "00",
            "0135", // program id "5"
            "0a000000",
            "07000000",
            "00",
        ]
        .concat();
        assert_eq!(hex::encode(bytes), expected);
    }

    #[test]
    fn test_staking_claim_accepts_string_amounts() {
        let text = r#"[82,{"fee":{"amount":"100","asset_id":"1.3.0"},"owner":"1.2.17","staking_id":"1.27.4","extensions":[]}]"#;
        let op: Operation = serde_json::from_str(text).unwrap();
        match &op {
            Operation::StakingClaim(claim) => {
                assert_eq!(claim.fee.amount, 100);
                assert_eq!(claim.staking_id, ObjectId::new(1, 27, 4));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(hex::encode(to_bytes(&op).unwrap()), "52640000000000000000110400");
    }

    #[test]
    fn test_unknown_passthrough() {
        let text = r#"[37,{"fee":{"amount":5,"asset_id":"1.3.1"},"nested":{"b":[1,2,3],"a":null}}]"#;
        let op: Operation = serde_json::from_str(text).unwrap();
        assert_eq!(op.tag(), 37);
        assert_eq!(op.op_type(), None);
        assert!(op.fee().is_none());
        assert_eq!(serde_json::to_string(&op).unwrap(), text);

        match to_bytes(&op) {
            Err(TransactionError::UnsupportedOperation { tag }) => assert_eq!(tag, 37),
            other => panic!("expected UnsupportedOperation, got {:?}", other),
        }
    }

    #[test]
    fn test_set_fee() {
        let mut op = transfer();
        op.set_fee(gxc(1_000)).unwrap();
        assert_eq!(op.fee(), Some(&gxc(1_000)));

        let mut unknown: Operation = serde_json::from_str("[99,{}]").unwrap();
        assert!(unknown.set_fee(gxc(1)).is_err());
    }

    #[test]
    fn test_malformed_envelope() {
        assert!(serde_json::from_str::<Operation>("[0]").is_err());
        assert!(serde_json::from_str::<Operation>("[0,{},1]").is_err());
        assert!(serde_json::from_str::<Operation>(r#"{"type":0}"#).is_err());
        // registered tag with a payload of the wrong shape
        assert!(serde_json::from_str::<Operation>(r#"[0,{"fee":1}]"#).is_err());
    }

    #[test]
    fn test_non_empty_extensions_fail_encoding() {
        let mut op = TransferOperation::new(
            ObjectId::account(1),
            ObjectId::account(2),
            gxc(1),
            gxc(0),
            None,
        );
        op.extensions = crate::types::Extensions(vec![serde_json::json!({"x": 1})]);
        assert!(matches!(
            to_bytes(&op),
            Err(TransactionError::UnsupportedExtension(_))
        ));
    }
}

//! Protocol value types shared by operations.
//!
//! Binary forms:
//!
//! | Type          | Wire form                                  |
//! |---------------|--------------------------------------------|
//! | `ObjectId`    | varint(instance)                           |
//! | `AssetAmount` | i64 LE amount, then varint(asset instance) |
//! | `Time`        | u32 LE seconds since the Unix epoch        |
//! | `Buffer`      | varint length + bytes                      |
//! | `PublicKey`   | 33 compressed bytes, no length prefix      |
//! | `Address`     | 20 raw bytes                               |
//! | `Extensions`  | varint(0); non-empty sets are rejected     |

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use gxc_primitives::ec::{Address, PublicKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::encoder::{Encodable, Encoder};
use crate::TransactionError;

/// JSON time format used by Graphene nodes (UTC, no zone suffix).
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A `space.type.instance` object id such as `1.2.100`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId {
    /// Object space (1 = protocol, 2 = implementation).
    pub space: u8,
    /// Object type within the space.
    pub type_id: u8,
    /// Instance number.
    pub instance: u64,
}

impl ObjectId {
    /// Construct an id from its three parts.
    pub const fn new(space: u8, type_id: u8, instance: u64) -> Self {
        ObjectId {
            space,
            type_id,
            instance,
        }
    }

    /// An account id `1.2.<instance>`.
    pub const fn account(instance: u64) -> Self {
        Self::new(1, 2, instance)
    }

    /// An asset id `1.3.<instance>`.
    pub const fn asset(instance: u64) -> Self {
        Self::new(1, 3, instance)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.space, self.type_id, self.instance)
    }
}

impl FromStr for ObjectId {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TransactionError::InvalidObjectId(s.to_string());
        let mut parts = s.split('.');
        let (Some(space), Some(type_id), Some(instance), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        Ok(ObjectId {
            space: space.parse().map_err(|_| invalid())?,
            type_id: type_id.parse().map_err(|_| invalid())?,
            instance: instance.parse().map_err(|_| invalid())?,
        })
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Encodable for ObjectId {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.write_uvarint(self.instance);
    }
}

/// An amount of a given asset, in the asset's smallest unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAmount {
    /// Amount in base units. Accepted from JSON as a number or a numeric string.
    #[serde(deserialize_with = "number_or_string")]
    pub amount: i64,
    /// Asset id, e.g. `1.3.0` for GXC.
    pub asset_id: ObjectId,
}

impl AssetAmount {
    /// Construct an amount.
    pub const fn new(amount: i64, asset_id: ObjectId) -> Self {
        AssetAmount { amount, asset_id }
    }
}

impl Encodable for AssetAmount {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.write_i64(self.amount).encode(&self.asset_id);
    }
}

/// A point in time with one-second resolution, as carried on chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Time(u32);

impl Time {
    /// Time from seconds since the Unix epoch.
    pub const fn from_unix(secs: u32) -> Self {
        Time(secs)
    }

    /// Convert a UTC datetime, truncating sub-second precision.
    ///
    /// # Returns
    /// `InvalidTime` if the datetime does not fit the 32-bit protocol range.
    pub fn from_datetime(dt: DateTime<Utc>) -> Result<Self, TransactionError> {
        u32::try_from(dt.timestamp())
            .map(Time)
            .map_err(|_| TransactionError::InvalidTime(dt.to_rfc3339()))
    }

    /// Seconds since the Unix epoch.
    pub const fn unix(&self) -> u32 {
        self.0
    }

    /// The time as a UTC datetime.
    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(i64::from(self.0), 0).unwrap_or_default()
    }

    /// This time shifted forward by `secs` seconds, saturating at the range end.
    pub fn add_secs(&self, secs: u32) -> Self {
        Time(self.0.saturating_add(secs))
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_datetime().format(TIME_FORMAT))
    }
}

impl FromStr for Time {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let naive = NaiveDateTime::parse_from_str(s, TIME_FORMAT)
            .map_err(|e| TransactionError::InvalidTime(format!("{}: {}", s, e)))?;
        Self::from_datetime(naive.and_utc())
    }
}

impl Serialize for Time {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Time {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Encodable for Time {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.write_u32(self.0);
    }
}

/// Opaque bytes, hex in JSON.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Buffer(pub Vec<u8>);

impl Buffer {
    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(v: Vec<u8>) -> Self {
        Buffer(v)
    }
}

impl Serialize for Buffer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Buffer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map(Buffer).map_err(serde::de::Error::custom)
    }
}

impl Encodable for Buffer {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.write_buffer(&self.0);
    }
}

/// Future-extension slot carried by most operations.
///
/// Arbitrary JSON is kept so decoded operations round-trip, but only the
/// empty set has a binary encoding.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Extensions(pub Vec<serde_json::Value>);

impl Extensions {
    /// Whether no extension is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Encodable for Extensions {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        if self.0.is_empty() {
            enc.write_uvarint(0);
        } else {
            enc.fail(TransactionError::UnsupportedExtension(format!(
                "{} extension(s) set",
                self.0.len()
            )));
        }
    }
}

impl Encodable for PublicKey {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.write_raw(&self.to_compressed());
    }
}

impl Encodable for Address {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.write_raw(self.as_bytes());
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString<T> {
    Number(T),
    String(String),
}

/// Deserialize an integer given either as a JSON number or a decimal string.
pub(crate) fn number_or_string<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    match NumberOrString::<T>::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::to_bytes;

    #[test]
    fn test_object_id_parse_and_display() {
        let id: ObjectId = "1.2.100".parse().unwrap();
        assert_eq!(id, ObjectId::account(100));
        assert_eq!(id.to_string(), "1.2.100");
        for bad in ["", "1.2", "1.2.3.4", "a.b.c", "1.2.-1", "300.1.1"] {
            assert!(bad.parse::<ObjectId>().is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_object_id_encodes_instance_only() {
        assert_eq!(hex::encode(to_bytes(&ObjectId::account(200)).unwrap()), "c801");
        assert_eq!(hex::encode(to_bytes(&ObjectId::asset(0)).unwrap()), "00");
    }

    #[test]
    fn test_asset_amount_json_accepts_string_amount() {
        let a: AssetAmount =
            serde_json::from_str(r#"{"amount":"401000000","asset_id":"1.3.0"}"#).unwrap();
        let b: AssetAmount =
            serde_json::from_str(r#"{"amount":401000000,"asset_id":"1.3.0"}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            r#"{"amount":401000000,"asset_id":"1.3.0"}"#
        );
    }

    #[test]
    fn test_asset_amount_encoding() {
        let a = AssetAmount::new(401_000_000, ObjectId::asset(1));
        assert_eq!(hex::encode(to_bytes(&a).unwrap()), "40c6e6170000000001");
    }

    #[test]
    fn test_time_roundtrip() {
        let t: Time = "2019-01-01T00:00:10".parse().unwrap();
        assert_eq!(t.unix(), 1_546_300_810);
        assert_eq!(t.to_string(), "2019-01-01T00:00:10");
        assert_eq!(hex::encode(to_bytes(&t).unwrap()), "8aad2a5c");
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"2019-01-01T00:00:10\"");
        assert_eq!(t.add_secs(600).to_string(), "2019-01-01T00:10:10");
    }

    #[test]
    fn test_time_out_of_range() {
        assert!(matches!(
            "1960-01-01T00:00:00".parse::<Time>(),
            Err(TransactionError::InvalidTime(_))
        ));
        assert!("2019-01-01 00:00:00".parse::<Time>().is_err());
    }

    #[test]
    fn test_buffer_hex_json() {
        let b = Buffer(vec![0xde, 0xad]);
        assert_eq!(serde_json::to_string(&b).unwrap(), "\"dead\"");
        assert_eq!(hex::encode(to_bytes(&b).unwrap()), "02dead");
    }

    #[test]
    fn test_non_empty_extensions_fail() {
        let ext = Extensions(vec![serde_json::json!({"x": 1})]);
        assert!(matches!(
            to_bytes(&ext),
            Err(TransactionError::UnsupportedExtension(_))
        ));
        assert_eq!(to_bytes(&Extensions::default()).unwrap(), vec![0]);
    }
}

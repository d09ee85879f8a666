//! Structural check of serialized unsigned transactions.
//!
//! The offline signer receives bytes, not a [`Transaction`](crate::Transaction).
//! Before hashing it walks the canonical layout of the header, every
//! registered operation and the extension slot, so input that is cut short,
//! carries trailing bytes or lacks the empty signature count is rejected
//! instead of being signed as a different message.

use gxc_primitives::util::Reader;
use gxc_primitives::PrimitivesError;

use crate::operation::OperationType;
use crate::TransactionError;

/// Compressed public key width.
const PUBLIC_KEY_LEN: usize = 33;
/// Raw address width.
const ADDRESS_LEN: usize = 20;

/// Split `body || varint(0)` into the body.
///
/// # Returns
/// The unsigned body, `UnsupportedOperation` for an unregistered tag,
/// `UnsupportedExtension` for a non-empty extension slot, or
/// `InvalidTransaction` when the bytes do not follow the layout exactly.
pub(crate) fn split_unsigned(bytes: &[u8]) -> Result<&[u8], TransactionError> {
    let mut r = Reader::new(bytes);
    skip_body(&mut r)?;
    let body_len = r.position();

    let signatures = field(r.read_uvarint(), "signature count")?.value();
    if signatures != 0 {
        return Err(TransactionError::InvalidTransaction(format!(
            "expected an empty signature list, found {} signature(s)",
            signatures
        )));
    }
    if r.remaining() != 0 {
        return Err(TransactionError::InvalidTransaction(format!(
            "trailing {} bytes after transaction",
            r.remaining()
        )));
    }
    Ok(&bytes[..body_len])
}

fn skip_body(r: &mut Reader) -> Result<(), TransactionError> {
    field(r.read_u16_le(), "ref_block_num")?;
    field(r.read_u32_le(), "ref_block_prefix")?;
    field(r.read_u32_le(), "expiration")?;

    let count = field(r.read_uvarint(), "operation count")?.value();
    for _ in 0..count {
        skip_operation(r)?;
    }
    skip_extensions(r)
}

fn skip_operation(r: &mut Reader) -> Result<(), TransactionError> {
    let tag = field(r.read_uvarint(), "operation tag")?.value();
    let op_type =
        OperationType::from_tag(tag).ok_or(TransactionError::UnsupportedOperation { tag })?;

    match op_type {
        OperationType::Transfer => {
            skip_asset_amount(r)?;
            skip_object_id(r)?;
            skip_object_id(r)?;
            skip_asset_amount(r)?;
            if skip_presence(r, "memo")? {
                field(r.read_bytes(2 * PUBLIC_KEY_LEN), "memo keys")?;
                field(r.read_u64_le(), "memo nonce")?;
                skip_buffer(r, "memo message")?;
            }
        }
        OperationType::AccountCreate => {
            skip_asset_amount(r)?;
            skip_object_id(r)?;
            skip_object_id(r)?;
            field(r.read_u16_le(), "referrer_percent")?;
            skip_buffer(r, "name")?;
            skip_authority(r)?;
            skip_authority(r)?;
            // options
            field(r.read_bytes(PUBLIC_KEY_LEN), "memo_key")?;
            skip_object_id(r)?;
            field(r.read_u16_le(), "num_witness")?;
            field(r.read_u16_le(), "num_committee")?;
            let votes = field(r.read_uvarint(), "vote count")?.value();
            for _ in 0..votes {
                field(r.read_u32_le(), "vote id")?;
            }
            skip_extensions(r)?;
        }
        OperationType::StakingCreate => {
            skip_asset_amount(r)?;
            skip_object_id(r)?;
            skip_object_id(r)?;
            skip_asset_amount(r)?;
            skip_buffer(r, "program_id")?;
            field(r.read_u32_le(), "weight")?;
            field(r.read_u32_le(), "staking_days")?;
        }
        OperationType::StakingUpdate => {
            skip_asset_amount(r)?;
            skip_object_id(r)?;
            skip_object_id(r)?;
            skip_object_id(r)?;
        }
        OperationType::StakingClaim => {
            skip_asset_amount(r)?;
            skip_object_id(r)?;
            skip_object_id(r)?;
        }
    }
    skip_extensions(r)
}

fn skip_authority(r: &mut Reader) -> Result<(), TransactionError> {
    field(r.read_u32_le(), "weight_threshold")?;
    skip_weighted(r, "account_auths", |r| skip_object_id(r))?;
    skip_weighted(r, "key_auths", |r| {
        field(r.read_bytes(PUBLIC_KEY_LEN), "key").map(drop)
    })?;
    skip_weighted(r, "address_auths", |r| {
        field(r.read_bytes(ADDRESS_LEN), "address").map(drop)
    })?;
    skip_extensions(r)
}

fn skip_weighted(
    r: &mut Reader,
    what: &str,
    mut skip_entity: impl FnMut(&mut Reader) -> Result<(), TransactionError>,
) -> Result<(), TransactionError> {
    let count = field(r.read_uvarint(), what)?.value();
    for _ in 0..count {
        skip_entity(r)?;
        field(r.read_u16_le(), "weight")?;
    }
    Ok(())
}

fn skip_asset_amount(r: &mut Reader) -> Result<(), TransactionError> {
    field(r.read_u64_le(), "amount")?;
    skip_object_id(r)
}

fn skip_object_id(r: &mut Reader) -> Result<(), TransactionError> {
    field(r.read_uvarint(), "object id").map(drop)
}

fn skip_buffer(r: &mut Reader, what: &str) -> Result<(), TransactionError> {
    let len = field(r.read_uvarint(), what)?.value();
    let len = usize::try_from(len).map_err(|_| {
        TransactionError::InvalidTransaction(format!("reading {}: length {} too large", what, len))
    })?;
    field(r.read_bytes(len), what).map(drop)
}

fn skip_presence(r: &mut Reader, what: &str) -> Result<bool, TransactionError> {
    match field(r.read_u8(), what)? {
        0 => Ok(false),
        1 => Ok(true),
        flag => Err(TransactionError::InvalidTransaction(format!(
            "reading {}: invalid presence flag {}",
            what, flag
        ))),
    }
}

fn skip_extensions(r: &mut Reader) -> Result<(), TransactionError> {
    let count = field(r.read_uvarint(), "extensions")?.value();
    if count != 0 {
        return Err(TransactionError::UnsupportedExtension(format!(
            "{} extension(s) set",
            count
        )));
    }
    Ok(())
}

fn field<T>(result: Result<T, PrimitivesError>, what: &str) -> Result<T, TransactionError> {
    result.map_err(|e| TransactionError::InvalidTransaction(format!("reading {}: {}", what, e)))
}

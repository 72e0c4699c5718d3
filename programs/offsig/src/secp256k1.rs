//! Decoding and identity checks for secp256k1 recovery proofs.
//!
//! Two proof sources are supported: a preceding secp256k1 precompile
//! instruction, and an in-program `secp256k1_recover` syscall.
//!
//! Precompile payload layout:
//!
//! ```text
//! 0      u8   number of signatures (must be 1)
//! 1..12       offsets entry:
//!             u16 signature_offset, u8 signature_instruction_index,
//!             u16 eth_address_offset, u8 eth_address_instruction_index,
//!             u16 message_data_offset, u16 message_data_size,
//!             u8 message_instruction_index
//! 12..        eth address (20), signature (64), recovery id (1), message
//! ```
//!
//! The precompile recovers a key from `keccak256(message)` and requires it to
//! hash to the embedded eth address. Clients must therefore sign the keccak-256
//! digest of the raw message.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::secp256k1_program;
use anchor_lang::solana_program::secp256k1_recover::secp256k1_recover;

use crate::introspection::{PayloadReader, PrecompileInstruction};
use crate::state::{eth_address, ETH_ADDRESS_LEN, SECP256K1_KEY_LEN};
use crate::OffsigError;

pub const SIGNATURE_LEN: usize = 64;
pub const OFFSETS_START: usize = 1;
pub const OFFSETS_LEN: usize = 11;

/// Recovery proof carried by a secp256k1 precompile instruction.
#[derive(Debug, PartialEq, Eq)]
pub struct Secp256k1Proof<'a> {
    pub eth_address: [u8; ETH_ADDRESS_LEN],
    pub signature: [u8; SIGNATURE_LEN],
    pub recovery_id: u8,
    pub message: &'a [u8],
}

/// Decodes the single signature in a secp256k1 precompile payload.
///
/// Every instruction index in the offsets entry must equal `precompile_index`.
pub fn decode(
    data: &[u8],
    precompile_index: u16,
) -> std::result::Result<Secp256k1Proof<'_>, OffsigError> {
    let reader = PayloadReader::new(data);

    if reader.u8_at(0)? != 1 {
        return Err(OffsigError::MalformedPrecompileData);
    }

    let signature_offset = reader.u16_at(OFFSETS_START)? as usize;
    let signature_ix = reader.u8_at(OFFSETS_START + 2)?;
    let eth_address_offset = reader.u16_at(OFFSETS_START + 3)? as usize;
    let eth_address_ix = reader.u8_at(OFFSETS_START + 5)?;
    let message_offset = reader.u16_at(OFFSETS_START + 6)? as usize;
    let message_size = reader.u16_at(OFFSETS_START + 8)? as usize;
    let message_ix = reader.u8_at(OFFSETS_START + 10)?;

    let own_index =
        u8::try_from(precompile_index).map_err(|_| OffsigError::MalformedPrecompileData)?;
    if [signature_ix, eth_address_ix, message_ix]
        .iter()
        .any(|ix| *ix != own_index)
    {
        return Err(OffsigError::MalformedPrecompileData);
    }

    Ok(Secp256k1Proof {
        eth_address: reader.array(eth_address_offset)?,
        signature: reader.array(signature_offset)?,
        recovery_id: reader.u8_at(signature_offset + SIGNATURE_LEN)?,
        message: reader.slice(message_offset, message_size)?,
    })
}

/// Checks that `precompile` recovered the eth address of `group_key`.
///
/// # Errors
///
/// * [`OffsigError::MalformedPrecompileData`] - Not a secp256k1 instruction, or its
///   payload does not decode
/// * [`OffsigError::SignatureMismatch`] - The precompile checked a different address
pub fn check(precompile: &PrecompileInstruction, group_key: &[u8; SECP256K1_KEY_LEN]) -> Result<()> {
    let data = precompile.data_for(&secp256k1_program::ID)?;
    let proof = decode(data, precompile.index)?;

    require!(
        proof.eth_address == eth_address(group_key),
        OffsigError::SignatureMismatch
    );

    msg!(
        "secp256k1 proof accepted for a {} byte message",
        proof.message.len()
    );
    Ok(())
}

/// Recovers the signer of `message_hash` with the runtime syscall and compares it
/// with `group_key`.
///
/// A signature that fails to recover is reported as a mismatch.
pub fn check_recovered(
    message_hash: &[u8; 32],
    signature: &[u8; SIGNATURE_LEN],
    recovery_id: u8,
    group_key: &[u8; SECP256K1_KEY_LEN],
) -> Result<()> {
    let recovered = secp256k1_recover(message_hash, recovery_id, signature).map_err(|err| {
        msg!("secp256k1 recovery failed: {:?}", err);
        OffsigError::SignatureMismatch
    })?;

    require!(
        recovered.to_bytes() == *group_key,
        OffsigError::SignatureMismatch
    );

    msg!("secp256k1 signature recovered to the group key");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA_START: u16 = (OFFSETS_START + OFFSETS_LEN) as u16;

    fn payload(address: &[u8; 20], signature: &[u8; 64], recovery_id: u8, message: &[u8], ix: u8) -> Vec<u8> {
        let eth_address_offset = DATA_START;
        let signature_offset = eth_address_offset + 20;
        let message_offset = signature_offset + 65;

        let mut data = vec![1];
        data.extend_from_slice(&signature_offset.to_le_bytes());
        data.push(ix);
        data.extend_from_slice(&eth_address_offset.to_le_bytes());
        data.push(ix);
        data.extend_from_slice(&message_offset.to_le_bytes());
        data.extend_from_slice(&(message.len() as u16).to_le_bytes());
        data.push(ix);
        data.extend_from_slice(address);
        data.extend_from_slice(signature);
        data.push(recovery_id);
        data.extend_from_slice(message);
        data
    }

    #[test]
    fn decodes_builder_layout() {
        let data = payload(&[5; 20], &[6; 64], 1, &[7; 32], 0);
        assert_eq!(data.len(), DATA_START as usize + 20 + 65 + 32);

        let proof = decode(&data, 0).unwrap();
        assert_eq!(proof.eth_address, [5; 20]);
        assert_eq!(proof.signature, [6; 64]);
        assert_eq!(proof.recovery_id, 1);
        assert_eq!(proof.message, &[7; 32]);
    }

    #[test]
    fn instruction_indexes_must_point_at_the_precompile() {
        let data = payload(&[5; 20], &[6; 64], 0, b"msg", 3);
        assert!(decode(&data, 3).is_ok());
        assert!(matches!(
            decode(&data, 0),
            Err(OffsigError::MalformedPrecompileData)
        ));

        let mut mixed = data.clone();
        mixed[OFFSETS_START + 5] = 0;
        assert!(matches!(
            decode(&mixed, 3),
            Err(OffsigError::MalformedPrecompileData)
        ));
    }

    #[test]
    fn precompile_beyond_u8_range_is_rejected() {
        let data = payload(&[5; 20], &[6; 64], 0, b"msg", 0);
        assert!(matches!(
            decode(&data, 256),
            Err(OffsigError::MalformedPrecompileData)
        ));
    }

    #[test]
    fn rejects_bad_counts_and_truncation() {
        let data = payload(&[5; 20], &[6; 64], 0, &[1; 32], 0);

        let mut two = data.clone();
        two[0] = 2;
        assert!(matches!(
            decode(&two, 0),
            Err(OffsigError::MalformedPrecompileData)
        ));

        for len in [0, OFFSETS_START + 4, DATA_START as usize + 10, data.len() - 1] {
            assert!(
                matches!(
                    decode(&data[..len], 0),
                    Err(OffsigError::MalformedPrecompileData)
                ),
                "len {len}"
            );
        }
    }
}

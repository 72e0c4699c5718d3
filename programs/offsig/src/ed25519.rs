//! Decoding and key check for ed25519 precompile instructions.
//!
//! Payload layout, as produced by the native ed25519 program's instruction
//! builders:
//!
//! ```text
//! 0      u8   number of signatures (must be 1)
//! 1      u8   padding
//! 2..16       offsets entry, all u16 little-endian:
//!             signature_offset, signature_instruction_index,
//!             public_key_offset, public_key_instruction_index,
//!             message_data_offset, message_data_size,
//!             message_instruction_index
//! 16..        public key (32), signature (64), message
//! ```

use anchor_lang::prelude::*;
use anchor_lang::solana_program::ed25519_program;

use crate::introspection::{PayloadReader, PrecompileInstruction};
use crate::state::ED25519_KEY_LEN;
use crate::OffsigError;

pub const SIGNATURE_LEN: usize = 64;
pub const OFFSETS_START: usize = 2;
pub const OFFSETS_LEN: usize = 14;

/// Instruction index meaning "the precompile instruction itself".
pub const CURRENT_INSTRUCTION: u16 = u16::MAX;

/// Signature proof carried by an ed25519 precompile instruction.
#[derive(Debug, PartialEq, Eq)]
pub struct Ed25519Proof<'a> {
    pub public_key: [u8; ED25519_KEY_LEN],
    pub signature: [u8; SIGNATURE_LEN],
    pub message: &'a [u8],
}

/// Decodes the single signature in an ed25519 precompile payload.
///
/// `precompile_index` is the position of the precompile in the transaction. Offsets
/// may only point into that instruction, so the proof the precompile checked is the
/// proof decoded here.
pub fn decode(
    data: &[u8],
    precompile_index: u16,
) -> std::result::Result<Ed25519Proof<'_>, OffsigError> {
    let reader = PayloadReader::new(data);

    if reader.u8_at(0)? != 1 {
        return Err(OffsigError::MalformedPrecompileData);
    }

    let field = |n: usize| reader.u16_at(OFFSETS_START + 2 * n);
    let signature_offset = field(0)?;
    let signature_ix = field(1)?;
    let public_key_offset = field(2)?;
    let public_key_ix = field(3)?;
    let message_offset = field(4)?;
    let message_size = field(5)?;
    let message_ix = field(6)?;

    let in_place = |ix: u16| ix == CURRENT_INSTRUCTION || ix == precompile_index;
    if !(in_place(signature_ix) && in_place(public_key_ix) && in_place(message_ix)) {
        return Err(OffsigError::MalformedPrecompileData);
    }

    Ok(Ed25519Proof {
        public_key: reader.array(public_key_offset as usize)?,
        signature: reader.array(signature_offset as usize)?,
        message: reader.slice(message_offset as usize, message_size as usize)?,
    })
}

/// Checks that `precompile` is an ed25519 verification of `group_key`.
///
/// # Errors
///
/// * [`OffsigError::MalformedPrecompileData`] - Not an ed25519 instruction, or its
///   payload does not decode
/// * [`OffsigError::SignatureMismatch`] - The precompile checked a different key
pub fn check(precompile: &PrecompileInstruction, group_key: &[u8; ED25519_KEY_LEN]) -> Result<()> {
    let data = precompile.data_for(&ed25519_program::ID)?;
    let proof = decode(data, precompile.index)?;

    require!(
        proof.public_key == *group_key,
        OffsigError::SignatureMismatch
    );

    msg!(
        "ed25519 proof accepted for a {} byte message",
        proof.message.len()
    );
    Ok(())
}

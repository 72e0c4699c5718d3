use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::sysvar::instructions::{
    load_current_index_checked, load_instruction_at_checked,
};

use crate::OffsigError;

/// Instruction sitting directly before the executing one, with its position
/// in the transaction.
pub struct PrecompileInstruction {
    pub index: u16,
    pub instruction: Instruction,
}

impl PrecompileInstruction {
    /// Loads the instruction at `current - 1` from the instructions sysvar.
    ///
    /// # Errors
    ///
    /// * [`OffsigError::MalformedPrecompileData`] - The executing instruction is first
    ///   in the transaction.
    pub fn load_preceding(instructions: &AccountInfo) -> Result<Self> {
        let current = load_current_index_checked(instructions)?;
        let index = current
            .checked_sub(1)
            .ok_or(OffsigError::MalformedPrecompileData)?;
        let instruction = load_instruction_at_checked(index as usize, instructions)?;

        Ok(Self { index, instruction })
    }

    /// Payload of the instruction, provided it was sent to `program_id`.
    pub fn data_for(&self, program_id: &Pubkey) -> std::result::Result<&[u8], OffsigError> {
        if self.instruction.program_id != *program_id {
            msg!(
                "Instruction {} targets {}, expected {}",
                self.index,
                self.instruction.program_id,
                program_id
            );
            return Err(OffsigError::MalformedPrecompileData);
        }

        Ok(&self.instruction.data)
    }
}

/// Bounds-checked little-endian reader over a precompile payload.
pub(crate) struct PayloadReader<'a> {
    data: &'a [u8],
}

impl<'a> PayloadReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub(crate) fn u8_at(&self, offset: usize) -> std::result::Result<u8, OffsigError> {
        self.data
            .get(offset)
            .copied()
            .ok_or(OffsigError::MalformedPrecompileData)
    }

    pub(crate) fn u16_at(&self, offset: usize) -> std::result::Result<u16, OffsigError> {
        let bytes = self.slice(offset, 2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub(crate) fn slice(&self, offset: usize, len: usize) -> std::result::Result<&'a [u8], OffsigError> {
        let end = offset
            .checked_add(len)
            .ok_or(OffsigError::MalformedPrecompileData)?;
        self.data
            .get(offset..end)
            .ok_or(OffsigError::MalformedPrecompileData)
    }

    pub(crate) fn array<const N: usize>(&self, offset: usize) -> std::result::Result<[u8; N], OffsigError> {
        let bytes = self.slice(offset, N)?;
        <[u8; N]>::try_from(bytes).map_err(|_| OffsigError::MalformedPrecompileData)
    }
}

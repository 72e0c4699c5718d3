#![doc = include_str!("../README.md")]
#![allow(unexpected_cfgs)]

pub mod ed25519;
pub mod introspection;
pub mod secp256k1;
pub mod state;

use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::instructions as sysvar_instructions;

use introspection::PrecompileInstruction;
pub use state::{group_record_address, GroupKey, GroupRecord, SignatureScheme, GROUP_RECORD_SEED};

declare_id!("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS");

#[program]
pub mod offsig {
    use super::*;

    /// Register the authority's group key.
    ///
    /// Can only be called once per authority. The key and its scheme cannot be
    /// changed afterwards.
    ///
    /// # Arguments
    ///
    /// * `scheme` - Signature scheme future proofs are checked with
    /// * `group_key` - 32-byte ed25519 key, or 64-byte (65 with `0x04` tag)
    ///   uncompressed secp256k1 key
    ///
    /// # Accounts
    ///
    /// * `group_record` - PDA at `[b"group-record", authority]`
    /// * `authority` - Owner of the record, pays for its creation
    ///
    /// # Errors
    ///
    /// * [`OffsigError::AlreadyInitialized`] - The authority already has a record
    /// * [`OffsigError::InvalidKeyLength`] - Key size does not match `scheme`
    ///
    /// # Emits
    ///
    /// * [`GroupRecordInitializedEvent`]
    pub fn initialize(
        ctx: Context<Initialize>,
        scheme: SignatureScheme,
        group_key: Vec<u8>,
    ) -> Result<()> {
        let group_record = &mut ctx.accounts.group_record;
        require!(
            !group_record.is_initialized(),
            OffsigError::AlreadyInitialized
        );

        group_record.group_key = GroupKey::parse(scheme, &group_key)?;
        group_record.authority = ctx.accounts.authority.key();
        group_record.verified = false;
        group_record.verification_count = 0;
        group_record.bump = ctx.bumps.group_record;

        msg!("Group record {} initialized", group_record.key());
        emit!(GroupRecordInitializedEvent {
            record: group_record.key(),
            authority: group_record.authority,
            scheme,
        });

        Ok(())
    }

    /// Mark the record verified using the precompile instruction that directly
    /// precedes this one.
    ///
    /// The precompile performs the cryptographic check. This instruction only
    /// confirms that it checked the registered group key: an ed25519 precompile
    /// must carry the group key itself, a secp256k1 precompile must carry the
    /// group key's eth address.
    ///
    /// # Example
    ///
    /// ```typescript,ignore
    /// const tx = new Transaction().add(
    ///   Ed25519Program.createInstructionWithPublicKey({ publicKey, message, signature }),
    ///   await program.methods.verify().accounts({ groupRecord }).instruction(),
    /// );
    /// ```
    ///
    /// # Errors
    ///
    /// * [`OffsigError::MalformedPrecompileData`] - No preceding instruction, wrong
    ///   precompile for the record's scheme, or an undecodable payload
    /// * [`OffsigError::SignatureMismatch`] - The precompile checked another key
    ///
    /// # Emits
    ///
    /// * [`GroupRecordVerifiedEvent`]
    pub fn verify(ctx: Context<Verify>) -> Result<()> {
        let precompile = PrecompileInstruction::load_preceding(&ctx.accounts.instructions)?;
        let group_record = &mut ctx.accounts.group_record;

        match &group_record.group_key {
            GroupKey::Ed25519(key) => ed25519::check(&precompile, key)?,
            GroupKey::Secp256k1(key) => secp256k1::check(&precompile, key)?,
        }

        record_verified(group_record)
    }

    /// Mark a secp256k1 record verified by recovering the signer in-program.
    ///
    /// No precompile instruction is needed.
    ///
    /// # Arguments
    ///
    /// * `message_hash` - keccak-256 digest of the signed message
    /// * `signature` - 64-byte `r || s`
    /// * `recovery_id` - Recovery id (0 or 1)
    ///
    /// # Errors
    ///
    /// * [`OffsigError::UnsupportedScheme`] - The record holds an ed25519 key
    /// * [`OffsigError::SignatureMismatch`] - Recovery failed or yielded another key
    ///
    /// # Emits
    ///
    /// * [`GroupRecordVerifiedEvent`]
    pub fn verify_recovered(
        ctx: Context<VerifyRecovered>,
        message_hash: [u8; 32],
        signature: [u8; 64],
        recovery_id: u8,
    ) -> Result<()> {
        let group_record = &mut ctx.accounts.group_record;

        let GroupKey::Secp256k1(key) = &group_record.group_key else {
            return err!(OffsigError::UnsupportedScheme);
        };
        secp256k1::check_recovered(&message_hash, &signature, recovery_id, key)?;

        record_verified(group_record)
    }
}

fn record_verified(group_record: &mut Account<GroupRecord>) -> Result<()> {
    group_record.record_verification()?;

    msg!(
        "Group record {} verified ({} total)",
        group_record.key(),
        group_record.verification_count
    );
    emit!(GroupRecordVerifiedEvent {
        record: group_record.key(),
        scheme: group_record.scheme(),
        verification_count: group_record.verification_count,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(
        init_if_needed,
        payer = authority,
        space = 8 + GroupRecord::SPACE, // discriminator + authority + largest group key + verified + count + bump
        seeds = [GROUP_RECORD_SEED, authority.key().as_ref()],
        bump
    )]
    pub group_record: Account<'info, GroupRecord>,
    #[account(mut)]
    pub authority: Signer<'info>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct Verify<'info> {
    #[account(
        mut,
        seeds = [GROUP_RECORD_SEED, group_record.authority.as_ref()],
        bump = group_record.bump
    )]
    pub group_record: Account<'info, GroupRecord>,
    /// CHECK: Address is constrained to the instructions sysvar, which is read
    /// through the checked sysvar loaders.
    #[account(address = sysvar_instructions::ID)]
    pub instructions: AccountInfo<'info>,
}

#[derive(Accounts)]
pub struct VerifyRecovered<'info> {
    #[account(
        mut,
        seeds = [GROUP_RECORD_SEED, group_record.authority.as_ref()],
        bump = group_record.bump
    )]
    pub group_record: Account<'info, GroupRecord>,
}

/// Emitted when a group key is registered via [`offsig::initialize`].
#[event]
pub struct GroupRecordInitializedEvent {
    /// Address of the new group record.
    pub record: Pubkey,
    /// Authority the record belongs to.
    pub authority: Pubkey,
    /// Scheme the group key was registered under.
    pub scheme: SignatureScheme,
}

/// Emitted after every successful [`offsig::verify`] or [`offsig::verify_recovered`].
#[event]
pub struct GroupRecordVerifiedEvent {
    /// Address of the verified group record.
    pub record: Pubkey,
    /// Scheme of the group key the proof was checked against.
    pub scheme: SignatureScheme,
    /// Successful verifications so far, including this one.
    pub verification_count: u64,
}

#[error_code]
pub enum OffsigError {
    #[msg("Group record is already initialized")]
    AlreadyInitialized,
    #[msg("Group key length does not match the signature scheme")]
    InvalidKeyLength,
    #[msg("Preceding instruction is not a well-formed precompile for this record")]
    MalformedPrecompileData,
    #[msg("Signature was not produced by the group key")]
    SignatureMismatch,
    #[msg("Instruction does not support the record's signature scheme")]
    UnsupportedScheme,
}

use anchor_lang::prelude::*;
use anchor_lang::solana_program::keccak;

use crate::OffsigError;

/// Seed prefix of every group record PDA.
pub const GROUP_RECORD_SEED: &[u8] = b"group-record";

pub const ED25519_KEY_LEN: usize = 32;
pub const SECP256K1_KEY_LEN: usize = 64;
pub const ETH_ADDRESS_LEN: usize = 20;

/// Prefix byte of an uncompressed SEC1 secp256k1 point.
const SEC1_UNCOMPRESSED_TAG: u8 = 0x04;

/// Signature scheme a group record is bound to.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureScheme {
    Ed25519,
    Secp256k1,
}

/// Registered group key, tagged by scheme.
///
/// Secp256k1 keys are stored as the 64-byte uncompressed point without the
/// `0x04` prefix, which is also what the `secp256k1_recover` syscall returns.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum GroupKey {
    Ed25519([u8; ED25519_KEY_LEN]),
    Secp256k1([u8; SECP256K1_KEY_LEN]),
}

impl GroupKey {
    /// Borsh size of the largest variant.
    pub const MAX_SPACE: usize = 1 + SECP256K1_KEY_LEN;

    /// Validates `bytes` against the expected key size of `scheme`.
    ///
    /// Secp256k1 accepts both the raw 64-byte point and the 65-byte SEC1
    /// form with its `0x04` tag.
    pub fn parse(scheme: SignatureScheme, bytes: &[u8]) -> std::result::Result<Self, OffsigError> {
        match scheme {
            SignatureScheme::Ed25519 => <[u8; ED25519_KEY_LEN]>::try_from(bytes)
                .map(GroupKey::Ed25519)
                .map_err(|_| OffsigError::InvalidKeyLength),
            SignatureScheme::Secp256k1 => {
                let raw = match bytes {
                    [SEC1_UNCOMPRESSED_TAG, rest @ ..] if rest.len() == SECP256K1_KEY_LEN => rest,
                    _ => bytes,
                };
                <[u8; SECP256K1_KEY_LEN]>::try_from(raw)
                    .map(GroupKey::Secp256k1)
                    .map_err(|_| OffsigError::InvalidKeyLength)
            }
        }
    }

    pub fn scheme(&self) -> SignatureScheme {
        match self {
            GroupKey::Ed25519(_) => SignatureScheme::Ed25519,
            GroupKey::Secp256k1(_) => SignatureScheme::Secp256k1,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            GroupKey::Ed25519(key) => key,
            GroupKey::Secp256k1(key) => key,
        }
    }
}

/// Ethereum address of a secp256k1 key: the last 20 bytes of its keccak-256 hash.
pub fn eth_address(key: &[u8; SECP256K1_KEY_LEN]) -> [u8; ETH_ADDRESS_LEN] {
    let hash = keccak::hash(key).to_bytes();
    let mut address = [0u8; ETH_ADDRESS_LEN];
    address.copy_from_slice(&hash[32 - ETH_ADDRESS_LEN..]);
    address
}

/// Group key registered by a single authority.
///
/// Seeds: `[b"group-record", authority]`
#[account]
pub struct GroupRecord {
    /// Identity that created the record. `Pubkey::default()` until initialized.
    pub authority: Pubkey,
    /// Key every proof is checked against. Immutable after initialization.
    pub group_key: GroupKey,
    /// Set by the first successful verification and never cleared.
    pub verified: bool,
    /// Number of successful verifications. Resubmitting an already accepted proof
    /// counts again, so this is not a count of distinct signatures.
    pub verification_count: u64,
    pub bump: u8,
}

impl GroupRecord {
    /// Account space after the 8-byte discriminator.
    pub const SPACE: usize = 32 + GroupKey::MAX_SPACE + 1 + 8 + 1;

    pub fn is_initialized(&self) -> bool {
        self.authority != Pubkey::default()
    }

    pub fn scheme(&self) -> SignatureScheme {
        self.group_key.scheme()
    }

    pub(crate) fn record_verification(&mut self) -> Result<()> {
        self.verified = true;
        self.verification_count = self
            .verification_count
            .checked_add(1)
            .ok_or(ProgramError::ArithmeticOverflow)?;
        Ok(())
    }
}

/// PDA of the group record owned by `authority`.
pub fn group_record_address(authority: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[GROUP_RECORD_SEED, authority.as_ref()], &crate::ID)
}

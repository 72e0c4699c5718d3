//! Builders for the native signature precompile instructions, plus the
//! off-chain signing each one expects.

use libsecp256k1::{Message, PublicKey, SecretKey};
use solana_program::keccak;
use solana_sdk::{
    ed25519_instruction::new_ed25519_instruction_with_signature, instruction::Instruction,
    secp256k1_program, signature::Keypair, signer::Signer,
};

const SECP256K1_DATA_START: u16 = 1 + 11;

/// Signs `message` with `signer` and wraps it in an ed25519 precompile instruction.
pub fn signed_ed25519_instruction(signer: &Keypair, message: &[u8]) -> Instruction {
    let signature = <[u8; 64]>::from(signer.sign_message(message));

    new_ed25519_instruction_with_signature(message, &signature, &signer.pubkey().to_bytes())
}

/// Secp256k1 precompile instruction carrying a single recovery proof.
///
/// `instruction_index` must be the position of this instruction in the
/// transaction, since the precompile resolves offsets against it.
pub fn secp256k1_instruction(
    eth_address: &[u8; 20],
    message: &[u8],
    signature: &[u8; 64],
    recovery_id: u8,
    instruction_index: u8,
) -> Instruction {
    let eth_address_offset = SECP256K1_DATA_START;
    let signature_offset = eth_address_offset + 20;
    let message_offset = signature_offset + 64 + 1;

    let mut data = Vec::with_capacity(message_offset as usize + message.len());
    data.push(1);
    data.extend_from_slice(&signature_offset.to_le_bytes());
    data.push(instruction_index);
    data.extend_from_slice(&eth_address_offset.to_le_bytes());
    data.push(instruction_index);
    data.extend_from_slice(&message_offset.to_le_bytes());
    data.extend_from_slice(&(message.len() as u16).to_le_bytes());
    data.push(instruction_index);
    data.extend_from_slice(eth_address);
    data.extend_from_slice(signature);
    data.push(recovery_id);
    data.extend_from_slice(message);

    Instruction {
        program_id: secp256k1_program::ID,
        accounts: vec![],
        data,
    }
}

/// Recoverable secp256k1 signature over `keccak256(message)`.
pub struct RecoverableSignature {
    pub message_hash: [u8; 32],
    pub signature: [u8; 64],
    pub recovery_id: u8,
}

impl RecoverableSignature {
    /// Copy with one signature byte flipped.
    pub fn tampered(&self, byte: usize) -> Self {
        let mut signature = self.signature;
        signature[byte] ^= 0x01;
        Self {
            message_hash: self.message_hash,
            signature,
            recovery_id: self.recovery_id,
        }
    }
}

pub struct Secp256k1Signer {
    secret: SecretKey,
}

impl Secp256k1Signer {
    pub fn random() -> Self {
        loop {
            let bytes: [u8; 32] = rand::random();
            if let Ok(secret) = SecretKey::parse(&bytes) {
                return Self { secret };
            }
        }
    }

    /// 65-byte uncompressed SEC1 public key, `0x04` tag included.
    pub fn sec1_public_key(&self) -> [u8; 65] {
        PublicKey::from_secret_key(&self.secret).serialize()
    }

    /// 64-byte public key as stored in a group record.
    pub fn group_key(&self) -> [u8; 64] {
        let mut key = [0u8; 64];
        key.copy_from_slice(&self.sec1_public_key()[1..]);
        key
    }

    pub fn eth_address(&self) -> [u8; 20] {
        let hash = keccak::hash(&self.group_key()).to_bytes();
        let mut address = [0u8; 20];
        address.copy_from_slice(&hash[12..]);
        address
    }

    /// Hashes `message` with keccak-256 and signs the digest.
    pub fn sign(&self, message: &[u8]) -> RecoverableSignature {
        let message_hash = keccak::hash(message).to_bytes();
        let (signature, recovery_id) = libsecp256k1::sign(&Message::parse(&message_hash), &self.secret);

        RecoverableSignature {
            message_hash,
            signature: signature.serialize(),
            recovery_id: recovery_id.serialize(),
        }
    }

    /// Signs `message` and wraps it in a secp256k1 precompile instruction placed at
    /// `instruction_index`.
    pub fn precompile_instruction(&self, message: &[u8], instruction_index: u8) -> Instruction {
        let signed = self.sign(message);
        secp256k1_instruction(
            &self.eth_address(),
            message,
            &signed.signature,
            signed.recovery_id,
            instruction_index,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use offsig::ed25519;
    use offsig::secp256k1;
    use solana_sdk::ed25519_program;

    #[test]
    fn ed25519_builder_matches_program_decoder() {
        let signer = Keypair::new();
        let message = [0xab, 0xbc, 0xcd, 0xde];
        let ix = signed_ed25519_instruction(&signer, &message);
        assert_eq!(ix.program_id, ed25519_program::ID);
        assert!(ix.accounts.is_empty());

        let proof = ed25519::decode(&ix.data, 0).unwrap();
        assert_eq!(proof.public_key, signer.pubkey().to_bytes());
        assert_eq!(proof.message, &message);
        assert_eq!(
            &proof.signature[..],
            signer.sign_message(&message).as_ref()
        );
    }

    #[test]
    fn secp256k1_builder_matches_program_decoder() {
        let signer = Secp256k1Signer::random();
        let message: [u8; 32] = rand::random();
        let ix = signer.precompile_instruction(&message, 0);

        let proof = secp256k1::decode(&ix.data, 0).unwrap();
        let signed = signer.sign(&message);
        assert_eq!(proof.eth_address, signer.eth_address());
        assert_eq!(proof.signature, signed.signature);
        assert_eq!(proof.recovery_id, signed.recovery_id);
        assert_eq!(proof.message, &message);
    }

    #[test]
    fn eth_address_agrees_with_program_derivation() {
        let signer = Secp256k1Signer::random();
        assert_eq!(
            signer.eth_address(),
            offsig::state::eth_address(&signer.group_key())
        );
    }

    #[test]
    fn signature_recovers_to_group_key() {
        let signer = Secp256k1Signer::random();
        let signed = signer.sign(b"recoverable");

        let signature = libsecp256k1::Signature::parse_standard(&signed.signature).unwrap();
        let recovery_id = libsecp256k1::RecoveryId::parse(signed.recovery_id).unwrap();
        let recovered =
            libsecp256k1::recover(&Message::parse(&signed.message_hash), &signature, &recovery_id)
                .unwrap();

        assert_eq!(recovered.serialize(), signer.sec1_public_key());
    }
}

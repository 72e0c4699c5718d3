use anchor_client::anchor_lang::{InstructionData, ToAccountMetas};
use offsig::{group_record_address, SignatureScheme};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, system_program, sysvar};

pub fn initialize_instruction(
    authority: &Pubkey,
    scheme: SignatureScheme,
    group_key: &[u8],
) -> Instruction {
    let (group_record, _bump) = group_record_address(authority);

    Instruction {
        program_id: offsig::ID,
        data: offsig::instruction::Initialize {
            scheme,
            group_key: group_key.to_vec(),
        }
        .data(),
        accounts: offsig::accounts::Initialize {
            group_record,
            authority: *authority,
            system_program: system_program::ID,
        }
        .to_account_metas(None),
    }
}

/// Program instruction that inspects the instruction placed right before it.
pub fn verify_instruction(group_record: Pubkey) -> Instruction {
    Instruction {
        program_id: offsig::ID,
        data: offsig::instruction::Verify {}.data(),
        accounts: offsig::accounts::Verify {
            group_record,
            instructions: sysvar::instructions::ID,
        }
        .to_account_metas(None),
    }
}

pub fn verify_recovered_instruction(
    group_record: Pubkey,
    message_hash: [u8; 32],
    signature: [u8; 64],
    recovery_id: u8,
) -> Instruction {
    Instruction {
        program_id: offsig::ID,
        data: offsig::instruction::VerifyRecovered {
            message_hash,
            signature,
            recovery_id,
        }
        .data(),
        accounts: offsig::accounts::VerifyRecovered { group_record }.to_account_metas(None),
    }
}

use {
    anchor_client::anchor_lang::error::ERROR_CODE_OFFSET,
    litesvm::types::TransactionResult,
    offsig::OffsigError,
    solana_sdk::{
        instruction::{Instruction, InstructionError},
        native_token::LAMPORTS_PER_SOL,
        signature::Keypair,
        signer::Signer,
        transaction::{Transaction, TransactionError},
    },
};

pub fn generate_and_fund_key(svm: &mut litesvm::LiteSVM) -> Keypair {
    let keypair = Keypair::new();
    let pubkey = keypair.pubkey();
    svm.airdrop(&pubkey, 10 * LAMPORTS_PER_SOL).unwrap();
    keypair
}

/// Signs and sends `ixs` as one transaction.
///
/// The blockhash is expired afterwards so an identical instruction list can be
/// resubmitted without being rejected as already processed.
#[allow(clippy::result_large_err)]
pub fn submit_transaction(
    svm: &mut litesvm::LiteSVM,
    ixs: &[Instruction],
    payer: &Keypair,
    signers: &[&Keypair],
) -> TransactionResult {
    let tx = Transaction::new_signed_with_payer(
        ixs,
        Some(&payer.pubkey()),
        signers,
        svm.latest_blockhash(),
    );

    let result = svm.send_transaction(tx);
    svm.expire_blockhash();
    result
}

/// Code an [`OffsigError`] surfaces with in a failed transaction.
pub fn offsig_error_code(error: OffsigError) -> u32 {
    error as u32 + ERROR_CODE_OFFSET
}

/// Asserts that instruction `index` failed with the given custom error code.
pub fn assert_instruction_error(result: &TransactionResult, index: u8, code: u32) {
    match result {
        Ok(meta) => panic!(
            "expected instruction {index} to fail with {code}, transaction succeeded: {:#?}",
            meta.logs
        ),
        Err(failed) => assert_eq!(
            failed.err,
            TransactionError::InstructionError(index, InstructionError::Custom(code)),
            "logs: {:#?}",
            failed.meta.logs
        ),
    }
}

pub fn assert_offsig_error(result: &TransactionResult, index: u8, error: OffsigError) {
    assert_instruction_error(result, index, offsig_error_code(error));
}

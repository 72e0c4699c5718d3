use offsig::SignatureScheme;
use solana_sdk::{
    pubkey::Pubkey, signature::Keypair, signer::Signer, transaction::TransactionError,
};
use thiserror::Error;

use crate::helpers::{generate_and_fund_key, submit_transaction};
use crate::instructions::initialize_instruction;

/// Environment variable overriding the path of the compiled program.
pub const PROGRAM_PATH_ENV: &str = "OFFSIG_PROGRAM_SO";
pub const DEFAULT_PROGRAM_PATH: &str = "../target/deploy/offsig.so";

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to load program from {path}: {reason}")]
    LoadProgram { path: String, reason: String },
    #[error("group record initialization failed: {0}")]
    Initialize(#[source] TransactionError),
}

pub struct SetupOptions {
    pub program_path: String,
}

impl Default for SetupOptions {
    fn default() -> Self {
        SetupOptions {
            program_path: std::env::var(PROGRAM_PATH_ENV)
                .unwrap_or_else(|_| DEFAULT_PROGRAM_PATH.to_string()),
        }
    }
}

pub struct SetupResult {
    pub svm: litesvm::LiteSVM,
    pub payer: Keypair,
    pub authority: Keypair,
}

impl SetupResult {
    /// Registers `group_key` for the setup authority and returns the record address.
    pub fn initialize_record(
        &mut self,
        scheme: SignatureScheme,
        group_key: &[u8],
    ) -> Result<Pubkey, SetupError> {
        let authority = self.authority.pubkey();
        let ix = initialize_instruction(&authority, scheme, group_key);

        submit_transaction(&mut self.svm, &[ix], &self.payer, &[&self.payer, &self.authority])
            .map_err(|failed| SetupError::Initialize(failed.err))?;

        Ok(offsig::group_record_address(&authority).0)
    }
}

/// Fresh SVM with the program loaded and a funded payer and authority.
pub fn setup(options: Option<SetupOptions>) -> Result<SetupResult, SetupError> {
    let options = options.unwrap_or_default();

    let mut svm = litesvm::LiteSVM::new();
    svm.add_program_from_file(offsig::ID, &options.program_path)
        .map_err(|err| SetupError::LoadProgram {
            path: options.program_path.clone(),
            reason: err.to_string(),
        })?;

    let payer = generate_and_fund_key(&mut svm);
    let authority = generate_and_fund_key(&mut svm);

    Ok(SetupResult {
        svm,
        payer,
        authority,
    })
}

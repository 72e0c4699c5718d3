use anchor_client::anchor_lang::AccountDeserialize;
use offsig::GroupRecord;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("group record {0} not found")]
    NotFound(Pubkey),
    #[error("account {address} is owned by {owner}, not the offsig program")]
    WrongOwner { address: Pubkey, owner: Pubkey },
    #[error("account {address} is not a group record: {reason}")]
    Decode { address: Pubkey, reason: String },
}

/// Reads and decodes the group record stored at `address`.
pub fn fetch_group_record(
    svm: &litesvm::LiteSVM,
    address: &Pubkey,
) -> Result<GroupRecord, FetchError> {
    let account = svm
        .get_account(address)
        .filter(|account| account.lamports > 0)
        .ok_or(FetchError::NotFound(*address))?;

    if account.owner != offsig::ID {
        return Err(FetchError::WrongOwner {
            address: *address,
            owner: account.owner,
        });
    }

    GroupRecord::try_deserialize(&mut account.data.as_slice()).map_err(|err| FetchError::Decode {
        address: *address,
        reason: err.to_string(),
    })
}

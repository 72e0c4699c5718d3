use anchor_client::anchor_lang::{AnchorDeserialize, Discriminator};
use base64::{engine::general_purpose::STANDARD, Engine};

/// Prefix the runtime puts on `sol_log_data` output, which is what `emit!` uses.
const PROGRAM_DATA_PREFIX: &str = "Program data: ";

/// Decodes every `E` emitted with `emit!` from a transaction's log messages.
pub fn decode_events<E: Discriminator + AnchorDeserialize>(logs: &[String]) -> Vec<E> {
    logs.iter()
        .filter_map(|log| log.strip_prefix(PROGRAM_DATA_PREFIX))
        .filter_map(|encoded| STANDARD.decode(encoded).ok())
        .filter(|bytes| bytes.starts_with(E::DISCRIMINATOR))
        .filter_map(|bytes| E::try_from_slice(&bytes[E::DISCRIMINATOR.len()..]).ok())
        .collect()
}

pub mod client;
pub mod events;
pub mod helpers;
pub mod instructions;
pub mod precompile;
pub mod setup;

// crates/cweb-cli/src/commands/mod.rs
//
// Command module declarations for the cweb CLI.

pub mod admit;
pub mod identity;
pub mod keys;
pub mod votes;

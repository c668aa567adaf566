// Shared modules for the consensus layer emulator
pub mod utils;

//! Account abstraction (ERC-4337)-related constants

/// Entry point smart contract
pub mod entry_point {
    /// Address of the entry point smart contract
    pub const ADDRESS: &str = "0x5FF137D4b0FDCD49DcA30c7CF57E578a026d2789";
    /// Version of the entry point smart contract
    pub const VERSION: &str = "0.6.0";
}

/// Fallback gas values used by signers without a better estimate
pub mod gas {
    /// Default gas allocated for the verification step
    pub const DEFAULT_VERIFICATION_GAS_LIMIT: u64 = 300_000;
    /// Default gas compensating the bundler for pre-verification work
    pub const DEFAULT_PRE_VERIFICATION_GAS: u64 = 50_000;
}

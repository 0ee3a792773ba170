//! Lifecycle orchestration of the Satchel wallet engine.
//!
//! The coordinator drives a pending transaction request from arrival through
//! building, optional paymaster sponsorship, signing, and submission, and
//! reports exactly one outcome back to the requesting origin. Signing,
//! submission, and origin resolution live behind collaborator traits supplied
//! at construction.

mod builder;
mod coordinator;
mod errors;
mod signer;
mod submitter;

pub use builder::{augment_with_paymaster, UserOperationBuilder};
pub use coordinator::{LifecycleCoordinator, ResolveRequest};
pub use errors::{BuilderError, LifecycleError};
pub use signer::{LocalSigner, SignUserOperation, SignerError};
pub use submitter::{BundlerClient, SubmitUserOperation};

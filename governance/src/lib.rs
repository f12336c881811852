//! Off-chain vote aggregation for CrossGov.
//!
//! Vote submission path: [`PowerOracle`] → signature verification →
//! [`VoteLedger`]. Tally path: [`VoteLedger`] → [`MerkleFreezer`] →
//! [`prove_subset`] → [`assemble_batch`].
//!
//! Submission and freezing share one [`KeyedLocks`](crossgov_utils::KeyedLocks)
//! keyed by proposal id, so a freeze never reads a vote set that is being
//! written to.

pub mod batch;
pub mod error;
pub mod freezer;
pub mod ledger;
pub mod multiproof;
pub mod power;

pub use batch::{assemble_batch, VerificationBatch};
pub use error::GovernanceError;
pub use freezer::{build_artifact, MerkleFreezer};
pub use ledger::{AbstainPolicy, SubmitOutcome, VoteLedger, VoteSubmission};
pub use multiproof::{prove_subset, SubsetProof};
pub use power::{voting_power, PowerOracle};

use thiserror::Error;

use super::context::Feature;

/// Errors surfaced by the scheme. All variants are caller errors or
/// infeasible-parameter reports; there is no transient/retryable class.
///
/// Noise overflow past the decryption budget is deliberately NOT an error:
/// it produces a silently wrong plaintext, matching the scheme's contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BfvError {
    /// The requested modulus/depth/dimension combination is infeasible.
    #[error("infeasible parameters: {0}")]
    Parameter(String),

    /// A gated operation was invoked before its capability was enabled.
    #[error("operation requires the {0:?} feature; call enable({0:?}) first")]
    FeatureNotEnabled(Feature),

    /// Operands sit at different positions of the modulus chain.
    #[error("ciphertext level mismatch: {lhs} vs {rhs}")]
    LevelMismatch { lhs: usize, rhs: usize },

    /// Multiplication was attempted with no levels left in the chain.
    #[error("modulus chain exhausted: multiplication needs a level to consume")]
    DepthExceeded,

    /// Input vector cannot be packed into the plaintext slots.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// eval_mult was called before eval_mult_key_gen.
    #[error("relinearization key not generated; call eval_mult_key_gen first")]
    RelinKeyMissing,
}

pub type Result<T> = std::result::Result<T, BfvError>;

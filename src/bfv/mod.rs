//! A leveled BFV-style scheme over an RNS modulus chain: batched integer
//! plaintexts, public-key encryption, homomorphic add/sub/negate, and
//! multiplication with relinearization and per-multiplication modulus
//! switching, bounded by a declared multiplicative depth.

pub mod ciphertext;
pub mod context;
pub mod encoding;
pub mod error;
pub mod eval;
pub mod key;
pub mod params;
pub mod rns;
pub mod sampling;

pub use ciphertext::Ciphertext;
pub use context::{BfvContext, Feature};
pub use encoding::Plaintext;
pub use error::{BfvError, Result};
pub use key::{EvaluationKey, PublicKey, SecretKey};
pub use params::CryptoParams;

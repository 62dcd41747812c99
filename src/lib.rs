//! bfv_rns: a leveled BFV homomorphic encryption scheme over an RNS
//! modulus chain.
//!
//! The crate implements the minimal leveled integer scheme:
//! - packed-vector plaintexts (SIMD batching over Z_t)
//! - public-key encryption / decryption (RLWE)
//! - ct + ct addition and subtraction
//! - ct * ct multiplication with relinearization, consuming one level
//!   of the modulus chain per multiplication
//!
//! Out of scope:
//! - Bootstrapping
//! - Ciphertext rotation (Galois automorphism)
//! - CKKS approximate arithmetic
//! - Threshold / multiparty key generation

pub mod bfv;
pub mod math;

pub use bfv::{
    BfvContext, BfvError, Ciphertext, CryptoParams, EvaluationKey, Feature, Plaintext, PublicKey,
    Result, SecretKey,
};

//! Cryptographically strong verification code generation

use rand::{rngs::OsRng, Rng};

use super::traits::CodeGenerator;

/// Smallest code ever produced
pub const CODE_MIN: u32 = 100_000;

/// Largest code ever produced
pub const CODE_MAX: u32 = 999_999;

/// Draws codes from the operating system's CSPRNG.
///
/// `gen_range` samples integers by rejection, so every value in
/// `[CODE_MIN, CODE_MAX]` is equally likely; there is no modulo or
/// floating-point scaling bias.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRngCodeGenerator;

impl CodeGenerator for OsRngCodeGenerator {
    fn generate(&self) -> String {
        OsRng.gen_range(CODE_MIN..=CODE_MAX).to_string()
    }
}

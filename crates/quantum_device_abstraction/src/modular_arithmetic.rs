// =============================================================================
// Shor Factorization - Modular Arithmetic
// =============================================================================
// Table of Contents:
//   1. Integer helpers (gcd, mod_pow, bit_length)
//   2. ModularMultiplierSynthesizer - Controlled |x⟩ → |a·x mod N⟩ circuits
//   3. ModFifteenMultiplier - Swap/negation pattern for N = 15
// =============================================================================
// Purpose: Classical helpers shared by devices and the search loop, and the
//          pluggable gate synthesis of controlled modular multiplication.
// =============================================================================

use crate::DeviceError;
use quantum_runtime::circuit_program::QuantumCircuitStructure;

// =============================================================================
// 1. Integer helpers
// =============================================================================

pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// `base^exponent mod modulus` by square-and-multiply with u128 intermediates.
pub fn mod_pow(base: u64, mut exponent: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }
    let m = modulus as u128;
    let mut result = 1u128;
    let mut b = base as u128 % m;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = result * b % m;
        }
        exponent >>= 1;
        b = b * b % m;
    }
    result as u64
}

/// Number of bits needed to write `n` in binary (0 for 0).
pub fn bit_length(n: u64) -> usize {
    (u64::BITS - n.leading_zeros()) as usize
}

// =============================================================================
// 2. ModularMultiplierSynthesizer
// =============================================================================

/// Appends controlled multiplication by a constant modulo a fixed modulus.
///
/// `work_register[i]` carries weight `2^i` in the work value.
pub trait ModularMultiplierSynthesizer: Send + Sync + std::fmt::Debug {
    fn modulus(&self) -> u64;

    fn work_register_width(&self) -> usize;

    fn supports_multiplier(&self, multiplier: u64) -> bool;

    fn append_controlled_multiplication(
        &self,
        circuit: &mut QuantumCircuitStructure,
        control: usize,
        work_register: &[usize],
        multiplier: u64,
    ) -> Result<(), DeviceError>;
}

// =============================================================================
// 3. ModFifteenMultiplier
// =============================================================================

/// Multiplication modulo 15 for every unit (1, 2, 4, 7, 8, 11, 13, 14).
///
/// Doubling is a left rotation of the four work bits, multiplying by 8 a right
/// rotation, by 4 a rotation by two. `15 - x` is `x` with every bit flipped, so
/// 7, 11, 13 and 14 are the negations of 8, 4, 2 and 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModFifteenMultiplier;

const MOD_FIFTEEN: u64 = 15;
const MOD_FIFTEEN_WORK_WIDTH: usize = 4;

impl ModFifteenMultiplier {
    pub fn new() -> Self {
        Self
    }

    /// Work-bit position swaps realizing the rotation for `multiplier`.
    fn rotation_swaps(multiplier: u64) -> &'static [(usize, usize)] {
        match multiplier {
            2 | 13 => &[(2, 3), (1, 2), (0, 1)],
            7 | 8 => &[(0, 1), (1, 2), (2, 3)],
            4 | 11 => &[(1, 3), (0, 2)],
            _ => &[],
        }
    }

    fn negates(multiplier: u64) -> bool {
        matches!(multiplier, 7 | 11 | 13 | 14)
    }
}

impl ModularMultiplierSynthesizer for ModFifteenMultiplier {
    fn modulus(&self) -> u64 {
        MOD_FIFTEEN
    }

    fn work_register_width(&self) -> usize {
        MOD_FIFTEEN_WORK_WIDTH
    }

    fn supports_multiplier(&self, multiplier: u64) -> bool {
        matches!(multiplier % MOD_FIFTEEN, 1 | 2 | 4 | 7 | 8 | 11 | 13 | 14)
    }

    fn append_controlled_multiplication(
        &self,
        circuit: &mut QuantumCircuitStructure,
        control: usize,
        work_register: &[usize],
        multiplier: u64,
    ) -> Result<(), DeviceError> {
        let multiplier = multiplier % MOD_FIFTEEN;
        if !self.supports_multiplier(multiplier) {
            return Err(DeviceError::InvalidRequest(format!(
                "{} is not a unit modulo {}",
                multiplier, MOD_FIFTEEN
            )));
        }
        if work_register.len() != MOD_FIFTEEN_WORK_WIDTH {
            return Err(DeviceError::InvalidRequest(format!(
                "work register has {} qubits, modulus 15 needs {}",
                work_register.len(),
                MOD_FIFTEEN_WORK_WIDTH
            )));
        }

        for &(a, b) in Self::rotation_swaps(multiplier) {
            circuit.apply_controlled_swap_gate(control, work_register[a], work_register[b]);
        }
        if Self::negates(multiplier) {
            for &qubit in work_register {
                circuit.apply_controlled_not_gate(control, qubit);
            }
        }
        Ok(())
    }
}

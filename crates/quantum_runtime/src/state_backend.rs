// =============================================================================
// Shor Factorization - State Backend
// =============================================================================
// Table of Contents:
//   1. QuantumStateVector - Dense state vector representation
//   2. Register helpers - bit/qubit index conversion
// =============================================================================
// Purpose: Dense state vector used by the execution engine. Qubit 0 is the
//          most significant bit of a basis-state index, so reading a register
//          in qubit order yields its big-endian value.
// =============================================================================

use crate::error::{CircuitError, QuantumResult, QuantumRuntimeError};
use num_complex::Complex64;

// =============================================================================
// 1. QuantumStateVector - Full state vector representation
// =============================================================================

#[derive(Debug, Clone)]
pub struct QuantumStateVector {
    amplitudes: Vec<Complex64>,
    number_of_quantum_bits: usize,
}

impl QuantumStateVector {
    pub fn zero_state(number_of_quantum_bits: usize) -> Self {
        Self::basis_state(number_of_quantum_bits, 0)
    }

    /// Computational basis state `|index⟩`. `index` is taken modulo the
    /// state dimension.
    pub fn basis_state(number_of_quantum_bits: usize, index: usize) -> Self {
        let dimension = 1usize << number_of_quantum_bits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); dimension];
        amplitudes[index % dimension] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            number_of_quantum_bits,
        }
    }

    pub fn from_amplitudes(amplitudes: Vec<Complex64>) -> QuantumResult<Self> {
        let dimension = amplitudes.len();
        if dimension == 0 || !dimension.is_power_of_two() {
            return Err(QuantumRuntimeError::InvalidParameter(format!(
                "amplitude vector length {} is not a power of 2",
                dimension
            )));
        }
        let number_of_quantum_bits = dimension.trailing_zeros() as usize;
        Ok(Self {
            amplitudes,
            number_of_quantum_bits,
        })
    }

    /// Uniform superposition over the given basis indices.
    pub fn uniform_superposition(
        number_of_quantum_bits: usize,
        basis_indices: &[usize],
    ) -> QuantumResult<Self> {
        let dimension = 1usize << number_of_quantum_bits;
        if basis_indices.is_empty() {
            return Err(QuantumRuntimeError::InvalidParameter(
                "uniform superposition needs at least one basis state".to_string(),
            ));
        }
        let amplitude = Complex64::new(1.0 / (basis_indices.len() as f64).sqrt(), 0.0);
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); dimension];
        for &index in basis_indices {
            if index >= dimension {
                return Err(QuantumRuntimeError::InvalidParameter(format!(
                    "basis index {} exceeds dimension {}",
                    index, dimension
                )));
            }
            amplitudes[index] = amplitude;
        }
        Ok(Self {
            amplitudes,
            number_of_quantum_bits,
        })
    }

    pub fn number_of_quantum_bits(&self) -> usize {
        self.number_of_quantum_bits
    }

    pub fn dimension(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn amplitude(&self, index: usize) -> Complex64 {
        self.amplitudes[index]
    }

    pub fn set_amplitude(&mut self, index: usize, value: Complex64) {
        self.amplitudes[index] = value;
    }

    pub fn swap_amplitudes(&mut self, i: usize, j: usize) {
        self.amplitudes.swap(i, j);
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    pub fn norm_squared(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr()).sum()
    }

    pub fn probability_distribution(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Marginal probabilities of the listed qubits. Entry `v` of the result is
    /// the probability that reading `measured_qubits` in order (first listed =
    /// most significant) yields `v`.
    pub fn marginal_probabilities(&self, measured_qubits: &[usize]) -> QuantumResult<Vec<f64>> {
        if measured_qubits.is_empty() {
            return Err(CircuitError::EmptyMeasurementRegister.into());
        }
        for &qubit in measured_qubits {
            if qubit >= self.number_of_quantum_bits {
                return Err(CircuitError::InvalidQubitIndex {
                    index: qubit,
                    total: self.number_of_quantum_bits,
                }
                .into());
            }
        }

        let masks: Vec<usize> = measured_qubits
            .iter()
            .map(|&qubit| qubit_mask(self.number_of_quantum_bits, qubit))
            .collect();
        let mut marginal = vec![0.0; 1usize << measured_qubits.len()];

        for (index, amp) in self.amplitudes.iter().enumerate() {
            let probability = amp.norm_sqr();
            if probability == 0.0 {
                continue;
            }
            let outcome = masks
                .iter()
                .fold(0usize, |acc, &mask| (acc << 1) | usize::from(index & mask != 0));
            marginal[outcome] += probability;
        }

        Ok(marginal)
    }

    pub fn inner_product(&self, other: &Self) -> Complex64 {
        self.amplitudes
            .iter()
            .zip(other.amplitudes.iter())
            .map(|(a, b)| a.conj() * b)
            .sum()
    }
}

// =============================================================================
// 2. Register helpers
// =============================================================================

/// Index mask of `qubit` in a register of `number_of_quantum_bits` qubits.
pub fn qubit_mask(number_of_quantum_bits: usize, qubit: usize) -> usize {
    1usize << (number_of_quantum_bits - 1 - qubit)
}

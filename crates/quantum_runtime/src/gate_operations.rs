// =============================================================================
// Shor Factorization - Gate Operations
// =============================================================================
// Table of Contents:
//   1. QuantumGateInterface - Core trait for all gates
//   2. Single-qubit gates (Hadamard, Pauli X)
//   3. Two-qubit gates (CNOT, CPhase, SWAP)
//   4. Three-qubit gates (controlled SWAP)
// =============================================================================
// Purpose: The gate set needed by order finding: superposition, register
//          preparation, controlled modular multiplication (swap/X patterns)
//          and the inverse quantum Fourier transform (phases + swaps).
// =============================================================================

use crate::state_backend::{QuantumStateVector, qubit_mask};
use num_complex::Complex64;

// =============================================================================
// 1. QuantumGateInterface - Core trait for all gates
// =============================================================================

pub trait QuantumGateInterface: Send + Sync + std::fmt::Debug {
    fn apply_to_full_state_vector(&self, state: &mut QuantumStateVector);
    fn gate_name(&self) -> &str;
    fn target_quantum_bits(&self) -> Vec<usize>;
}

// =============================================================================
// 2. Single-qubit gates
// =============================================================================

#[derive(Debug, Clone)]
pub struct HadamardGate {
    target_qubit: usize,
}

impl HadamardGate {
    pub fn new(target_qubit: usize) -> Self {
        Self { target_qubit }
    }
}

impl QuantumGateInterface for HadamardGate {
    fn apply_to_full_state_vector(&self, state: &mut QuantumStateVector) {
        let target_mask = qubit_mask(state.number_of_quantum_bits(), self.target_qubit);
        let inv_sqrt2 = 1.0 / std::f64::consts::SQRT_2;

        for i in 0..state.dimension() {
            if (i & target_mask) == 0 {
                let j = i | target_mask;
                let a = state.amplitude(i);
                let b = state.amplitude(j);
                state.set_amplitude(i, (a + b) * inv_sqrt2);
                state.set_amplitude(j, (a - b) * inv_sqrt2);
            }
        }
    }

    fn gate_name(&self) -> &str {
        "hadamard_gate"
    }

    fn target_quantum_bits(&self) -> Vec<usize> {
        vec![self.target_qubit]
    }
}

#[derive(Debug, Clone)]
pub struct PauliXGate {
    target_qubit: usize,
}

impl PauliXGate {
    pub fn new(target_qubit: usize) -> Self {
        Self { target_qubit }
    }
}

impl QuantumGateInterface for PauliXGate {
    fn apply_to_full_state_vector(&self, state: &mut QuantumStateVector) {
        let target_mask = qubit_mask(state.number_of_quantum_bits(), self.target_qubit);

        for i in 0..state.dimension() {
            if (i & target_mask) == 0 {
                state.swap_amplitudes(i, i | target_mask);
            }
        }
    }

    fn gate_name(&self) -> &str {
        "pauli_x_gate"
    }

    fn target_quantum_bits(&self) -> Vec<usize> {
        vec![self.target_qubit]
    }
}

// =============================================================================
// 3. Two-qubit gates
// =============================================================================

#[derive(Debug, Clone)]
pub struct ControlledNotGate {
    control_qubit: usize,
    target_qubit: usize,
}

impl ControlledNotGate {
    pub fn new(control_qubit: usize, target_qubit: usize) -> Self {
        Self {
            control_qubit,
            target_qubit,
        }
    }
}

impl QuantumGateInterface for ControlledNotGate {
    fn apply_to_full_state_vector(&self, state: &mut QuantumStateVector) {
        let n = state.number_of_quantum_bits();
        let control_mask = qubit_mask(n, self.control_qubit);
        let target_mask = qubit_mask(n, self.target_qubit);

        for i in 0..state.dimension() {
            if (i & control_mask) != 0 && (i & target_mask) == 0 {
                state.swap_amplitudes(i, i | target_mask);
            }
        }
    }

    fn gate_name(&self) -> &str {
        "controlled_not_gate"
    }

    fn target_quantum_bits(&self) -> Vec<usize> {
        vec![self.control_qubit, self.target_qubit]
    }
}

/// Multiplies the `|11⟩` component by `e^{iθ}`. Symmetric in its two qubits.
#[derive(Debug, Clone)]
pub struct ControlledPhaseGate {
    control_qubit: usize,
    target_qubit: usize,
    theta: f64,
}

impl ControlledPhaseGate {
    pub fn new(control_qubit: usize, target_qubit: usize, theta: f64) -> Self {
        Self {
            control_qubit,
            target_qubit,
            theta,
        }
    }
}

impl QuantumGateInterface for ControlledPhaseGate {
    fn apply_to_full_state_vector(&self, state: &mut QuantumStateVector) {
        let n = state.number_of_quantum_bits();
        let both = qubit_mask(n, self.control_qubit) | qubit_mask(n, self.target_qubit);
        let phase = Complex64::from_polar(1.0, self.theta);

        for i in 0..state.dimension() {
            if (i & both) == both {
                let amp = state.amplitude(i);
                state.set_amplitude(i, phase * amp);
            }
        }
    }

    fn gate_name(&self) -> &str {
        "controlled_phase_gate"
    }

    fn target_quantum_bits(&self) -> Vec<usize> {
        vec![self.control_qubit, self.target_qubit]
    }
}

#[derive(Debug, Clone)]
pub struct SwapGate {
    qubit_a: usize,
    qubit_b: usize,
}

impl SwapGate {
    pub fn new(qubit_a: usize, qubit_b: usize) -> Self {
        Self { qubit_a, qubit_b }
    }
}

impl QuantumGateInterface for SwapGate {
    fn apply_to_full_state_vector(&self, state: &mut QuantumStateVector) {
        swap_where(state, 0, self.qubit_a, self.qubit_b);
    }

    fn gate_name(&self) -> &str {
        "swap_gate"
    }

    fn target_quantum_bits(&self) -> Vec<usize> {
        vec![self.qubit_a, self.qubit_b]
    }
}

// =============================================================================
// 4. Three-qubit gates
// =============================================================================

/// Fredkin gate: swaps `qubit_a` and `qubit_b` when `control_qubit` is set.
#[derive(Debug, Clone)]
pub struct ControlledSwapGate {
    control_qubit: usize,
    qubit_a: usize,
    qubit_b: usize,
}

impl ControlledSwapGate {
    pub fn new(control_qubit: usize, qubit_a: usize, qubit_b: usize) -> Self {
        Self {
            control_qubit,
            qubit_a,
            qubit_b,
        }
    }
}

impl QuantumGateInterface for ControlledSwapGate {
    fn apply_to_full_state_vector(&self, state: &mut QuantumStateVector) {
        let control_mask = qubit_mask(state.number_of_quantum_bits(), self.control_qubit);
        swap_where(state, control_mask, self.qubit_a, self.qubit_b);
    }

    fn gate_name(&self) -> &str {
        "controlled_swap_gate"
    }

    fn target_quantum_bits(&self) -> Vec<usize> {
        vec![self.control_qubit, self.qubit_a, self.qubit_b]
    }
}

/// Exchanges the amplitudes of `|..1..0..⟩` and `|..0..1..⟩` on the two qubits
/// for every basis state that has all bits of `required_mask` set.
fn swap_where(state: &mut QuantumStateVector, required_mask: usize, qubit_a: usize, qubit_b: usize) {
    let n = state.number_of_quantum_bits();
    let mask_a = qubit_mask(n, qubit_a);
    let mask_b = qubit_mask(n, qubit_b);

    for i in 0..state.dimension() {
        if (i & required_mask) == required_mask && (i & mask_a) != 0 && (i & mask_b) == 0 {
            let j = (i & !mask_a) | mask_b;
            state.swap_amplitudes(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hadamard_creates_superposition() {
        let mut state = QuantumStateVector::zero_state(1);
        HadamardGate::new(0).apply_to_full_state_vector(&mut state);

        assert!((state.amplitude(0).norm_sqr() - 0.5).abs() < 1e-10);
        assert!((state.amplitude(1).norm_sqr() - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_cnot_entanglement() {
        let mut state = QuantumStateVector::zero_state(2);
        HadamardGate::new(0).apply_to_full_state_vector(&mut state);
        ControlledNotGate::new(0, 1).apply_to_full_state_vector(&mut state);

        assert!((state.amplitude(0b00).norm_sqr() - 0.5).abs() < 1e-10);
        assert!((state.amplitude(0b11).norm_sqr() - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_swap_moves_excitation() {
        let mut state = QuantumStateVector::basis_state(3, 0b100);
        SwapGate::new(0, 2).apply_to_full_state_vector(&mut state);
        assert!((state.amplitude(0b001).re - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_controlled_swap_respects_control() {
        // Control qubit 0 clear: nothing happens.
        let mut idle = QuantumStateVector::basis_state(3, 0b010);
        ControlledSwapGate::new(0, 1, 2).apply_to_full_state_vector(&mut idle);
        assert!((idle.amplitude(0b010).re - 1.0).abs() < 1e-12);

        // Control qubit 0 set: qubits 1 and 2 exchange.
        let mut active = QuantumStateVector::basis_state(3, 0b110);
        ControlledSwapGate::new(0, 1, 2).apply_to_full_state_vector(&mut active);
        assert!((active.amplitude(0b101).re - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_controlled_phase_only_touches_both_set() {
        let mut state = QuantumStateVector::zero_state(2);
        HadamardGate::new(0).apply_to_full_state_vector(&mut state);
        HadamardGate::new(1).apply_to_full_state_vector(&mut state);
        ControlledPhaseGate::new(0, 1, std::f64::consts::PI).apply_to_full_state_vector(&mut state);

        assert!((state.amplitude(0b00).re - 0.5).abs() < 1e-12);
        assert!((state.amplitude(0b11).re + 0.5).abs() < 1e-12);
    }
}

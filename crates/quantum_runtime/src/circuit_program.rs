// =============================================================================
// Shor Factorization - Circuit Program IR
// =============================================================================
// Table of Contents:
//   1. QuantumCircuitStructure - Gate sequence container
//   2. Fourier transform builders
//   3. Validation
//   4. GateApplicationInstance - Single gate operation
// =============================================================================
// Purpose: Circuit intermediate representation consumed by the execution
//          engine. Builders return `&mut Self` for chaining; qubit indices are
//          checked once by `validate` before a circuit is run.
// =============================================================================

use crate::error::CircuitError;
use crate::gate_operations::{
    ControlledNotGate, ControlledPhaseGate, ControlledSwapGate, HadamardGate, PauliXGate,
    QuantumGateInterface, SwapGate,
};
use std::f64::consts::PI;
use std::sync::Arc;
use uuid::Uuid;

// =============================================================================
// 1. QuantumCircuitStructure - Main circuit container
// =============================================================================

#[derive(Debug, Clone)]
pub struct QuantumCircuitStructure {
    id: Uuid,
    number_of_quantum_bits: usize,
    gate_application_instances: Vec<GateApplicationInstance>,
}

impl QuantumCircuitStructure {
    pub fn new(number_of_quantum_bits: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            number_of_quantum_bits,
            gate_application_instances: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn number_of_quantum_bits(&self) -> usize {
        self.number_of_quantum_bits
    }

    pub fn gate_count(&self) -> usize {
        self.gate_application_instances.len()
    }

    pub fn gate_application_instances(&self) -> &[GateApplicationInstance] {
        &self.gate_application_instances
    }

    pub fn add_gate_application(&mut self, gate: Arc<dyn QuantumGateInterface>) -> &mut Self {
        let target_quantum_bits = gate.target_quantum_bits();
        self.gate_application_instances.push(GateApplicationInstance {
            quantum_gate_interface: gate,
            target_quantum_bits,
        });
        self
    }

    pub fn apply_hadamard_gate(&mut self, qubit: usize) -> &mut Self {
        self.add_gate_application(Arc::new(HadamardGate::new(qubit)))
    }

    pub fn apply_pauli_x_gate(&mut self, qubit: usize) -> &mut Self {
        self.add_gate_application(Arc::new(PauliXGate::new(qubit)))
    }

    pub fn apply_controlled_not_gate(&mut self, control: usize, target: usize) -> &mut Self {
        self.add_gate_application(Arc::new(ControlledNotGate::new(control, target)))
    }

    pub fn apply_controlled_phase_gate(
        &mut self,
        control: usize,
        target: usize,
        theta: f64,
    ) -> &mut Self {
        self.add_gate_application(Arc::new(ControlledPhaseGate::new(control, target, theta)))
    }

    pub fn apply_swap_gate(&mut self, qubit_a: usize, qubit_b: usize) -> &mut Self {
        self.add_gate_application(Arc::new(SwapGate::new(qubit_a, qubit_b)))
    }

    pub fn apply_controlled_swap_gate(
        &mut self,
        control: usize,
        qubit_a: usize,
        qubit_b: usize,
    ) -> &mut Self {
        self.add_gate_application(Arc::new(ControlledSwapGate::new(control, qubit_a, qubit_b)))
    }

    // =========================================================================
    // 2. Fourier transform builders
    // =========================================================================

    /// Quantum Fourier transform on `register` (first entry = most significant
    /// qubit): `|x⟩ → Σ_y e^{2πi·x·y/2^n} |y⟩ / √(2^n)`.
    pub fn apply_quantum_fourier_transform(&mut self, register: &[usize]) -> &mut Self {
        let n = register.len();
        for i in 0..n {
            self.apply_hadamard_gate(register[i]);
            for k in (i + 1)..n {
                self.apply_controlled_phase_gate(register[k], register[i], fourier_angle(k - i));
            }
        }
        for i in 0..n / 2 {
            self.apply_swap_gate(register[i], register[n - 1 - i]);
        }
        self
    }

    /// Inverse of [`apply_quantum_fourier_transform`]: gates in reverse order
    /// with negated phases. Maps `Σ_y e^{2πi·φ·y} |y⟩` to `|2^n·φ⟩`.
    ///
    /// [`apply_quantum_fourier_transform`]: Self::apply_quantum_fourier_transform
    pub fn apply_inverse_quantum_fourier_transform(&mut self, register: &[usize]) -> &mut Self {
        let n = register.len();
        for i in 0..n / 2 {
            self.apply_swap_gate(register[i], register[n - 1 - i]);
        }
        for i in (0..n).rev() {
            for k in ((i + 1)..n).rev() {
                self.apply_controlled_phase_gate(register[k], register[i], -fourier_angle(k - i));
            }
            self.apply_hadamard_gate(register[i]);
        }
        self
    }

    // =========================================================================
    // 3. Validation
    // =========================================================================

    pub fn validate(&self) -> Result<(), CircuitError> {
        for instance in &self.gate_application_instances {
            let targets = instance.target_qubits();
            for (position, &qubit) in targets.iter().enumerate() {
                if qubit >= self.number_of_quantum_bits {
                    return Err(CircuitError::InvalidQubitIndex {
                        index: qubit,
                        total: self.number_of_quantum_bits,
                    });
                }
                if targets[..position].contains(&qubit) {
                    return Err(CircuitError::DuplicateQubit(qubit));
                }
            }
        }
        Ok(())
    }
}

/// Rotation angle `π / 2^distance` between two register qubits.
fn fourier_angle(distance: usize) -> f64 {
    PI / (1u64 << distance) as f64
}

// =============================================================================
// 4. GateApplicationInstance - Single gate operation
// =============================================================================

#[derive(Debug, Clone)]
pub struct GateApplicationInstance {
    pub quantum_gate_interface: Arc<dyn QuantumGateInterface>,
    pub target_quantum_bits: Vec<usize>,
}

impl GateApplicationInstance {
    pub fn gate_name(&self) -> &str {
        self.quantum_gate_interface.gate_name()
    }

    pub fn target_qubits(&self) -> &[usize] {
        &self.target_quantum_bits
    }
}

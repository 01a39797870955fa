// =============================================================================
// Shor Factorization - Gate-Level Order-Finding Simulator
// =============================================================================
// Table of Contents:
//   1. GateLevelSimulatorDevice - Textbook order-finding circuit on a
//      dense state vector
//   2. Circuit construction
// =============================================================================
// Purpose: Builds Hadamards on the ancilla register, controlled modular
//          multiplications and the inverse QFT, then samples the ancilla
//          register. Modular multiplication comes from a synthesizer, so the
//          device serves exactly the synthesizer's modulus.
// =============================================================================

use crate::modular_arithmetic::{ModFifteenMultiplier, ModularMultiplierSynthesizer, gcd, mod_pow};
use crate::{DeviceError, OrderFindingRequest, QuantumDeviceInterface};
use quantum_runtime::circuit_program::QuantumCircuitStructure;
use quantum_runtime::execution::QuantumExecutionEngine;
use quantum_runtime::measurement::MeasurementDistribution;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_DEVICE_NAME: &str = "gate_level_order_finding_simulator";
pub const DEFAULT_MAXIMUM_QUANTUM_BITS: usize = 16;

// =============================================================================
// 1. GateLevelSimulatorDevice
// =============================================================================

#[derive(Debug)]
pub struct GateLevelSimulatorDevice {
    id: Uuid,
    synthesizer: Arc<dyn ModularMultiplierSynthesizer>,
    execution_engine: QuantumExecutionEngine,
    maximum_quantum_bits: usize,
}

/// Layout of one order-finding circuit.
#[derive(Debug, Clone)]
pub struct OrderFindingCircuit {
    pub circuit: QuantumCircuitStructure,
    pub ancilla_register: Vec<usize>,
    pub work_register: Vec<usize>,
}

impl GateLevelSimulatorDevice {
    pub fn new(synthesizer: Arc<dyn ModularMultiplierSynthesizer>) -> Self {
        Self {
            id: Uuid::new_v4(),
            synthesizer,
            execution_engine: QuantumExecutionEngine::new()
                .with_max_qubits(DEFAULT_MAXIMUM_QUANTUM_BITS),
            maximum_quantum_bits: DEFAULT_MAXIMUM_QUANTUM_BITS,
        }
    }

    pub fn mod_fifteen() -> Self {
        Self::new(Arc::new(ModFifteenMultiplier::new()))
    }

    /// Reseeds the shot sampler for reproducible distributions.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.execution_engine =
            QuantumExecutionEngine::with_seed(seed).with_max_qubits(self.maximum_quantum_bits);
        self
    }

    pub fn with_max_qubits(mut self, maximum_quantum_bits: usize) -> Self {
        self.maximum_quantum_bits = maximum_quantum_bits;
        self.execution_engine = std::mem::take(&mut self.execution_engine)
            .with_max_qubits(maximum_quantum_bits);
        self
    }

    fn required_qubits(&self, request: &OrderFindingRequest) -> usize {
        request.ancilla_width + self.synthesizer.work_register_width()
    }

    // =========================================================================
    // 2. Circuit construction
    // =========================================================================

    /// Ancilla qubits `0..w` (qubit 0 = most significant phase bit) followed by
    /// the work register. Ancilla qubit k controls multiplication by
    /// `a^(2^(w-1-k)) mod N`.
    pub fn build_order_finding_circuit(
        &self,
        request: &OrderFindingRequest,
    ) -> Result<OrderFindingCircuit, DeviceError> {
        let width = request.ancilla_width;
        let work_width = self.synthesizer.work_register_width();
        let total = width + work_width;

        let ancilla_register: Vec<usize> = (0..width).collect();
        // Last qubit is the least significant work bit.
        let work_register: Vec<usize> = (width..total).rev().collect();

        let mut circuit = QuantumCircuitStructure::new(total);
        for &qubit in &ancilla_register {
            circuit.apply_hadamard_gate(qubit);
        }
        circuit.apply_pauli_x_gate(work_register[0]);

        let mut multiplier = request.base % request.modulus;
        for k in (0..width).rev() {
            self.synthesizer.append_controlled_multiplication(
                &mut circuit,
                ancilla_register[k],
                &work_register,
                multiplier,
            )?;
            multiplier = mod_pow(multiplier, 2, request.modulus);
        }

        circuit.apply_inverse_quantum_fourier_transform(&ancilla_register);

        Ok(OrderFindingCircuit {
            circuit,
            ancilla_register,
            work_register,
        })
    }
}

impl QuantumDeviceInterface for GateLevelSimulatorDevice {
    fn device_id(&self) -> Uuid {
        self.id
    }

    fn device_name(&self) -> &str {
        DEFAULT_DEVICE_NAME
    }

    fn maximum_quantum_bits(&self) -> usize {
        self.maximum_quantum_bits
    }

    fn supports_request(&self, request: &OrderFindingRequest) -> bool {
        request.validate().is_ok()
            && request.modulus == self.synthesizer.modulus()
            && gcd(request.base, request.modulus) == 1
            && self.synthesizer.supports_multiplier(request.base)
            && self.required_qubits(request) <= self.maximum_quantum_bits
    }

    fn execute(&self, request: &OrderFindingRequest) -> Result<MeasurementDistribution, DeviceError> {
        request.validate()?;
        if request.modulus != self.synthesizer.modulus() {
            return Err(DeviceError::UnsupportedModulus(request.modulus));
        }
        let required = self.required_qubits(request);
        if required > self.maximum_quantum_bits {
            return Err(DeviceError::CircuitTooLarge {
                required,
                available: self.maximum_quantum_bits,
            });
        }

        let layout = self.build_order_finding_circuit(request)?;
        let result = self.execution_engine.execute_circuit(
            &layout.circuit,
            &layout.ancilla_register,
            request.shots,
        )?;

        tracing::debug!(
            device = DEFAULT_DEVICE_NAME,
            base = request.base,
            modulus = request.modulus,
            qubits = required,
            gates = layout.circuit.gate_count(),
            elapsed_us = result.execution_time_microseconds,
            "order-finding circuit executed"
        );
        Ok(result.distribution)
    }
}

// =============================================================================
// Shor Factorization - Period Oracle Simulator
// =============================================================================
// Table of Contents:
//   1. PeriodOracleSimulatorDevice - Order finding for any small odd modulus
//   2. Outcome classes of x → a^x mod N
// =============================================================================
// Purpose: Serves moduli that have no gate-level multiplier. Measuring the
//          work register after modular exponentiation leaves the ancilla in
//          a uniform superposition over one outcome class; classes of equal
//          size give identical distributions after the inverse QFT, so one
//          representative per size is evolved on the state-vector backend
//          and the results are mixed by class weight before sampling.
// =============================================================================

use crate::modular_arithmetic::gcd;
use crate::{DeviceError, OrderFindingRequest, QuantumDeviceInterface};
use quantum_runtime::circuit_program::QuantumCircuitStructure;
use quantum_runtime::execution::QuantumExecutionEngine;
use quantum_runtime::measurement::MeasurementDistribution;
use quantum_runtime::state_backend::QuantumStateVector;
use std::collections::BTreeMap;
use uuid::Uuid;

pub const DEFAULT_DEVICE_NAME: &str = "period_oracle_simulator";
pub const DEFAULT_MAXIMUM_QUANTUM_BITS: usize = 20;

// =============================================================================
// 1. PeriodOracleSimulatorDevice
// =============================================================================

#[derive(Debug)]
pub struct PeriodOracleSimulatorDevice {
    id: Uuid,
    execution_engine: QuantumExecutionEngine,
    maximum_quantum_bits: usize,
}

impl Default for PeriodOracleSimulatorDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl PeriodOracleSimulatorDevice {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            execution_engine: QuantumExecutionEngine::new()
                .with_max_qubits(DEFAULT_MAXIMUM_QUANTUM_BITS),
            maximum_quantum_bits: DEFAULT_MAXIMUM_QUANTUM_BITS,
        }
    }

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

    /// Exact ancilla-register distribution (index = measured value).
    pub fn outcome_probabilities(&self, request: &OrderFindingRequest) -> Result<Vec<f64>, DeviceError> {
        let width = request.ancilla_width;
        let register: Vec<usize> = (0..width).collect();
        let mut inverse_fourier = QuantumCircuitStructure::new(width);
        inverse_fourier.apply_inverse_quantum_fourier_transform(&register);

        let dimension = 1usize << width;
        let mut mixture = vec![0.0; dimension];

        for class in group_classes_by_size(request.base, request.modulus, width) {
            let mut state = QuantumStateVector::uniform_superposition(width, &class.representative)?;
            self.execution_engine.evolve_state(&inverse_fourier, &mut state)?;

            // Each class is reached with probability size / 2^w.
            let weight = (class.size * class.multiplicity) as f64 / dimension as f64;
            for (total, amp) in mixture.iter_mut().zip(state.amplitudes()) {
                *total += weight * amp.norm_sqr();
            }
        }

        Ok(mixture)
    }

    fn check_request(&self, request: &OrderFindingRequest) -> Result<(), DeviceError> {
        request.validate()?;
        if request.modulus % 2 == 0 {
            return Err(DeviceError::UnsupportedModulus(request.modulus));
        }
        if gcd(request.base, request.modulus) != 1 {
            return Err(DeviceError::InvalidRequest(format!(
                "base {} shares a factor with {}",
                request.base, request.modulus
            )));
        }
        if request.ancilla_width > self.maximum_quantum_bits {
            return Err(DeviceError::CircuitTooLarge {
                required: request.ancilla_width,
                available: self.maximum_quantum_bits,
            });
        }
        Ok(())
    }
}

impl QuantumDeviceInterface for PeriodOracleSimulatorDevice {
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
        self.check_request(request).is_ok()
    }

    fn execute(&self, request: &OrderFindingRequest) -> Result<MeasurementDistribution, DeviceError> {
        self.check_request(request)?;
        let start_time = std::time::Instant::now();

        let probabilities = self.outcome_probabilities(request)?;
        let distribution = self.execution_engine.sample_outcomes(
            &probabilities,
            request.ancilla_width,
            request.shots,
        )?;

        tracing::debug!(
            device = DEFAULT_DEVICE_NAME,
            base = request.base,
            modulus = request.modulus,
            ancilla_width = request.ancilla_width,
            elapsed_us = start_time.elapsed().as_micros() as u64,
            "period oracle sampled"
        );
        Ok(distribution)
    }
}

// =============================================================================
// 2. Outcome classes
// =============================================================================

/// Outcome classes of one size: `multiplicity` classes of `size` ancilla
/// values each, with the basis indices of one of them.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ClassGroup {
    size: usize,
    multiplicity: usize,
    representative: Vec<usize>,
}

fn group_classes_by_size(base: u64, modulus: u64, width: usize) -> Vec<ClassGroup> {
    let mut classes: BTreeMap<u64, Vec<usize>> = BTreeMap::new();
    let mut value = 1u64 % modulus;
    for x in 0..(1usize << width) {
        classes.entry(value).or_default().push(x);
        value = ((value as u128 * base as u128) % modulus as u128) as u64;
    }

    let mut groups: BTreeMap<usize, ClassGroup> = BTreeMap::new();
    for (_, members) in classes {
        let size = members.len();
        groups
            .entry(size)
            .and_modify(|group| group.multiplicity += 1)
            .or_insert(ClassGroup {
                size,
                multiplicity: 1,
                representative: members,
            });
    }
    groups.into_values().collect()
}

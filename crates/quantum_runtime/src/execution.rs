// =============================================================================
// Shor Factorization - Execution Engine
// =============================================================================
// Table of Contents:
//   1. QuantumExecutionEngine - Runs circuits on the dense backend
//   2. Sampling
//   3. ExecutionResult - Result container
// =============================================================================
// Purpose: Evolves a circuit from |0…0⟩ (or a prepared state), reads the
//          marginal distribution of a measured register and samples shots
//          from it with a seedable random source.
// =============================================================================

use crate::circuit_program::QuantumCircuitStructure;
use crate::error::{CircuitError, ExecutionError, QuantumResult};
use crate::measurement::MeasurementDistribution;
use crate::state_backend::QuantumStateVector;
use parking_lot::Mutex;
use rand::SeedableRng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Largest register the dense backend will allocate by default.
pub const DEFAULT_MAXIMUM_QUANTUM_BITS: usize = 24;

// =============================================================================
// 1. QuantumExecutionEngine
// =============================================================================

#[derive(Debug)]
pub struct QuantumExecutionEngine {
    engine_id: Uuid,
    maximum_quantum_bits: usize,
    random_source: Mutex<StdRng>,
}

impl Default for QuantumExecutionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl QuantumExecutionEngine {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Engine whose sampled shots are reproducible for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            engine_id: Uuid::new_v4(),
            maximum_quantum_bits: DEFAULT_MAXIMUM_QUANTUM_BITS,
            random_source: Mutex::new(rng),
        }
    }

    pub fn with_max_qubits(mut self, maximum_quantum_bits: usize) -> Self {
        self.maximum_quantum_bits = maximum_quantum_bits;
        self
    }

    pub fn engine_id(&self) -> Uuid {
        self.engine_id
    }

    pub fn maximum_quantum_bits(&self) -> usize {
        self.maximum_quantum_bits
    }

    /// Runs `circuit` from the all-zero state and samples `shots` readings of
    /// `measured_qubits` (first listed qubit = most significant bit).
    pub fn execute_circuit(
        &self,
        circuit: &QuantumCircuitStructure,
        measured_qubits: &[usize],
        shots: u64,
    ) -> QuantumResult<ExecutionResult> {
        self.check_size(circuit.number_of_quantum_bits())?;
        let initial = QuantumStateVector::zero_state(circuit.number_of_quantum_bits());
        self.execute_from_state(circuit, initial, measured_qubits, shots)
    }

    /// Same as [`execute_circuit`](Self::execute_circuit) but starting from a
    /// prepared state.
    pub fn execute_from_state(
        &self,
        circuit: &QuantumCircuitStructure,
        initial_state: QuantumStateVector,
        measured_qubits: &[usize],
        shots: u64,
    ) -> QuantumResult<ExecutionResult> {
        if shots == 0 {
            return Err(ExecutionError::InvalidShotCount(shots).into());
        }
        let start_time = std::time::Instant::now();
        let job_id = Uuid::new_v4();

        let mut state = initial_state;
        self.evolve_state(circuit, &mut state)?;
        let probabilities = state.marginal_probabilities(measured_qubits)?;
        let distribution = self.sample_outcomes(&probabilities, measured_qubits.len(), shots)?;

        let execution_time = start_time.elapsed();
        tracing::debug!(
            engine_id = %self.engine_id,
            %job_id,
            qubits = circuit.number_of_quantum_bits(),
            gates = circuit.gate_count(),
            shots,
            distinct_outcomes = distribution.distinct_outcomes(),
            "circuit executed"
        );

        Ok(ExecutionResult {
            job_id,
            circuit_id: circuit.id(),
            distribution,
            execution_time_microseconds: execution_time.as_micros() as u64,
        })
    }

    /// Applies every gate of `circuit` to `state` in order.
    pub fn evolve_state(
        &self,
        circuit: &QuantumCircuitStructure,
        state: &mut QuantumStateVector,
    ) -> QuantumResult<()> {
        self.check_size(circuit.number_of_quantum_bits())?;
        if state.number_of_quantum_bits() != circuit.number_of_quantum_bits() {
            return Err(ExecutionError::StateDimensionMismatch {
                expected: circuit.number_of_quantum_bits(),
                actual: state.number_of_quantum_bits(),
            }
            .into());
        }
        circuit.validate()?;

        for gate_instance in circuit.gate_application_instances() {
            gate_instance.quantum_gate_interface.apply_to_full_state_vector(state);
        }
        Ok(())
    }

    fn check_size(&self, qubits: usize) -> QuantumResult<()> {
        if qubits == 0 || qubits > self.maximum_quantum_bits {
            return Err(CircuitError::CircuitTooLarge {
                qubits,
                max: self.maximum_quantum_bits,
            }
            .into());
        }
        Ok(())
    }

    // =========================================================================
    // 2. Sampling
    // =========================================================================

    /// Draws `shots` outcomes from `probabilities` (index = register value)
    /// and tallies them as `width`-bit strings.
    pub fn sample_outcomes(
        &self,
        probabilities: &[f64],
        width: usize,
        shots: u64,
    ) -> QuantumResult<MeasurementDistribution> {
        if shots == 0 {
            return Err(ExecutionError::InvalidShotCount(shots).into());
        }
        let sampler = WeightedIndex::new(probabilities)
            .map_err(|e| ExecutionError::SamplingFailed(e.to_string()))?;

        let mut tallies: BTreeMap<u64, u64> = BTreeMap::new();
        {
            let mut rng = self.random_source.lock();
            for _ in 0..shots {
                *tallies.entry(sampler.sample(&mut *rng) as u64).or_insert(0) += 1;
            }
        }

        Ok(MeasurementDistribution::from_value_counts(width, tallies)?)
    }
}

// =============================================================================
// 3. ExecutionResult
// =============================================================================

#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub job_id: Uuid,
    pub circuit_id: Uuid,
    pub distribution: MeasurementDistribution,
    pub execution_time_microseconds: u64,
}

impl ExecutionResult {
    pub fn total_shots(&self) -> u64 {
        self.distribution.total_shots()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuantumRuntimeError;

    #[test]
    fn test_circuit_execution() {
        let engine = QuantumExecutionEngine::with_seed(7);
        let mut circuit = QuantumCircuitStructure::new(2);
        circuit.apply_hadamard_gate(0).apply_controlled_not_gate(0, 1);

        let result = engine.execute_circuit(&circuit, &[0, 1], 200).unwrap();
        assert_eq!(result.total_shots(), 200);
        assert_eq!(result.distribution.count_of("00") + result.distribution.count_of("11"), 200);
        assert_eq!(result.circuit_id, circuit.id());
    }

    #[test]
    fn test_seeded_engines_agree() {
        let mut circuit = QuantumCircuitStructure::new(3);
        circuit.apply_hadamard_gate(0).apply_hadamard_gate(1).apply_hadamard_gate(2);

        let first = QuantumExecutionEngine::with_seed(42)
            .execute_circuit(&circuit, &[0, 1, 2], 64)
            .unwrap();
        let second = QuantumExecutionEngine::with_seed(42)
            .execute_circuit(&circuit, &[0, 1, 2], 64)
            .unwrap();
        assert_eq!(first.distribution, second.distribution);
    }

    #[test]
    fn test_rejects_zero_shots_and_oversized_circuits() {
        let engine = QuantumExecutionEngine::with_seed(1).with_max_qubits(2);
        let circuit = QuantumCircuitStructure::new(2);
        assert!(matches!(
            engine.execute_circuit(&circuit, &[0], 0),
            Err(QuantumRuntimeError::Execution(ExecutionError::InvalidShotCount(0)))
        ));

        let too_large = QuantumCircuitStructure::new(3);
        assert!(matches!(
            engine.execute_circuit(&too_large, &[0], 10),
            Err(QuantumRuntimeError::Circuit(CircuitError::CircuitTooLarge { qubits: 3, max: 2 }))
        ));
    }

    #[test]
    fn test_deterministic_state_samples_single_outcome() {
        let engine = QuantumExecutionEngine::with_seed(3);
        let mut circuit = QuantumCircuitStructure::new(3);
        circuit.apply_pauli_x_gate(1);

        let result = engine.execute_circuit(&circuit, &[0, 1], 50).unwrap();
        assert_eq!(result.distribution.most_frequent(), ("01", 50));
    }

    #[test]
    fn test_state_dimension_mismatch() {
        let engine = QuantumExecutionEngine::with_seed(3);
        let circuit = QuantumCircuitStructure::new(2);
        let mut state = QuantumStateVector::zero_state(3);
        assert!(matches!(
            engine.evolve_state(&circuit, &mut state),
            Err(QuantumRuntimeError::Execution(ExecutionError::StateDimensionMismatch { .. }))
        ));
    }
}

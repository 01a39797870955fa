//! Gate and Fourier-transform throughput on the dense state vector backend.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use quantum_runtime::prelude::*;

fn benchmark_gates(c: &mut Criterion) {
    c.bench_function("hadamard_layer_12_qubits", |b| {
        let mut circuit = QuantumCircuitStructure::new(12);
        for qubit in 0..12 {
            circuit.apply_hadamard_gate(qubit);
        }
        let engine = QuantumExecutionEngine::with_seed(0);
        b.iter(|| {
            let mut state = QuantumStateVector::zero_state(12);
            engine.evolve_state(black_box(&circuit), &mut state).unwrap();
            black_box(state);
        });
    });

    c.bench_function("inverse_qft_10_qubits", |b| {
        let register: Vec<usize> = (0..10).collect();
        let mut circuit = QuantumCircuitStructure::new(10);
        circuit.apply_inverse_quantum_fourier_transform(&register);
        let engine = QuantumExecutionEngine::with_seed(0);
        b.iter(|| {
            let mut state = QuantumStateVector::basis_state(10, 341);
            engine.evolve_state(black_box(&circuit), &mut state).unwrap();
            black_box(state);
        });
    });

    c.bench_function("sample_1024_shots", |b| {
        let engine = QuantumExecutionEngine::with_seed(0);
        let probabilities = vec![1.0 / 256.0; 256];
        b.iter(|| {
            let distribution = engine
                .sample_outcomes(black_box(&probabilities), 8, 1024)
                .unwrap();
            black_box(distribution);
        });
    });
}

criterion_group!(benches, benchmark_gates);
criterion_main!(benches);

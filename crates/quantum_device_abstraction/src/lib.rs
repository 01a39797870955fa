// =============================================================================
// Shor Factorization - Quantum Device Abstraction
// =============================================================================
// Table of Contents:
//   1. OrderFindingRequest - Circuit description handed to a device
//   2. QuantumDeviceInterface - Core device trait
//   3. DeviceError - Device failures
//   4. DeviceRegistry - Device discovery and management
// =============================================================================
// Purpose: Hardware abstraction for order-finding collaborators. The search
//          loop only sees `QuantumDeviceInterface`; the shipped simulators
//          are one gate-level circuit device and one period oracle device.
// =============================================================================

pub mod circuit_simulator;
pub mod modular_arithmetic;
pub mod period_oracle;

pub use circuit_simulator::GateLevelSimulatorDevice;
pub use modular_arithmetic::{ModFifteenMultiplier, ModularMultiplierSynthesizer};
pub use period_oracle::PeriodOracleSimulatorDevice;

use parking_lot::RwLock;
use quantum_runtime::error::QuantumRuntimeError;
use quantum_runtime::measurement::{MAXIMUM_BITSTRING_WIDTH, MeasurementDistribution};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

// =============================================================================
// 1. OrderFindingRequest
// =============================================================================

/// Estimate the order of `base` modulo `modulus` with an `ancilla_width`-bit
/// phase register, sampled `shots` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFindingRequest {
    pub base: u64,
    pub modulus: u64,
    pub ancilla_width: usize,
    pub shots: u64,
}

impl OrderFindingRequest {
    pub fn new(base: u64, modulus: u64, ancilla_width: usize, shots: u64) -> Self {
        Self {
            base,
            modulus,
            ancilla_width,
            shots,
        }
    }

    /// Phase register width of `2·⌈log2(N+1)⌉` qubits, enough to resolve any
    /// order below N by continued fractions.
    pub fn default_ancilla_width(modulus: u64) -> usize {
        2 * modular_arithmetic::bit_length(modulus)
    }

    pub fn validate(&self) -> Result<(), DeviceError> {
        if self.shots == 0 {
            return Err(DeviceError::InvalidRequest("shots must be at least 1".into()));
        }
        if self.ancilla_width == 0 || self.ancilla_width > MAXIMUM_BITSTRING_WIDTH {
            return Err(DeviceError::InvalidRequest(format!(
                "ancilla width {} outside 1..={}",
                self.ancilla_width, MAXIMUM_BITSTRING_WIDTH
            )));
        }
        if self.modulus < 3 || self.base < 2 || self.base >= self.modulus {
            return Err(DeviceError::InvalidRequest(format!(
                "base {} is not in [2, {}]",
                self.base,
                self.modulus.saturating_sub(1)
            )));
        }
        Ok(())
    }
}

// =============================================================================
// 2. QuantumDeviceInterface
// =============================================================================

pub trait QuantumDeviceInterface: Send + Sync {
    fn device_id(&self) -> Uuid;
    fn device_name(&self) -> &str;
    fn maximum_quantum_bits(&self) -> usize;

    /// Whether `execute` can serve this request.
    fn supports_request(&self, request: &OrderFindingRequest) -> bool;

    /// Runs order finding and returns the ancilla-register distribution:
    /// bitstrings exactly `ancilla_width` long, counts summing to `shots`.
    fn execute(&self, request: &OrderFindingRequest) -> Result<MeasurementDistribution, DeviceError>;
}

// =============================================================================
// 3. DeviceError
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Modulus {0} is not supported by this device")]
    UnsupportedModulus(u64),
    #[error("Circuit too large: requires {required} qubits, device has {available}")]
    CircuitTooLarge { required: usize, available: usize },
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
    #[error("Device not available")]
    NotAvailable,
}

impl From<QuantumRuntimeError> for DeviceError {
    fn from(err: QuantumRuntimeError) -> Self {
        DeviceError::ExecutionFailed(err.to_string())
    }
}

// =============================================================================
// 4. DeviceRegistry
// =============================================================================

/// Devices in registration order; lookups return the first that fits.
#[derive(Default)]
pub struct DeviceRegistry {
    devices: RwLock<Vec<Arc<dyn QuantumDeviceInterface>>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the modulus-15 gate-level simulator, then the period
    /// oracle simulator.
    pub fn with_default_simulators() -> Self {
        let registry = Self::new();
        registry.register_device(Arc::new(GateLevelSimulatorDevice::mod_fifteen()));
        registry.register_device(Arc::new(PeriodOracleSimulatorDevice::new()));
        registry
    }

    pub fn register_device(&self, device: Arc<dyn QuantumDeviceInterface>) -> Uuid {
        let device_id = device.device_id();
        tracing::debug!(%device_id, name = device.device_name(), "device registered");
        self.devices.write().push(device);
        device_id
    }

    pub fn find_suitable_device(
        &self,
        request: &OrderFindingRequest,
    ) -> Option<Arc<dyn QuantumDeviceInterface>> {
        self.devices
            .read()
            .iter()
            .find(|d| d.supports_request(request))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }
}

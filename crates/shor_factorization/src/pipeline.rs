// =============================================================================
// Shor Factorization - Order-Finding Pipeline
// =============================================================================
// Table of Contents:
//   1. DeviceSource - Where order-finding requests go
//   2. OrderFindingPipeline - Collaborator → phase → order
//   3. Collaborator call with timeout
// =============================================================================
// Purpose: One order-finding step. A zero phase is reported as an outcome so
//          the search loop can retry; everything else that goes wrong with
//          the collaborator is fatal.
// =============================================================================

use crate::error::{FactorizationError, FactorizationResult};
use crate::order::{OrderCandidate, OrderResolutionStrategy, OrderResolver};
use crate::phase::{PhaseEstimate, PhaseExtractionError, extract_phase};
use crossbeam_channel::RecvTimeoutError;
use quantum_device_abstraction::{DeviceRegistry, OrderFindingRequest, QuantumDeviceInterface};
use quantum_runtime::measurement::MeasurementDistribution;
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// 1. DeviceSource
// =============================================================================

#[derive(Clone)]
pub enum DeviceSource {
    /// Every request goes to this device.
    Fixed(Arc<dyn QuantumDeviceInterface>),
    /// Each request goes to the first registered device that supports it.
    Registry(Arc<DeviceRegistry>),
}

impl DeviceSource {
    pub fn device_for(
        &self,
        request: &OrderFindingRequest,
    ) -> FactorizationResult<Arc<dyn QuantumDeviceInterface>> {
        match self {
            DeviceSource::Fixed(device) => Ok(device.clone()),
            DeviceSource::Registry(registry) => {
                registry
                    .find_suitable_device(request)
                    .ok_or(FactorizationError::NoSuitableDevice {
                        base: request.base,
                        modulus: request.modulus,
                    })
            }
        }
    }
}

impl std::fmt::Debug for DeviceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceSource::Fixed(device) => f.debug_tuple("Fixed").field(&device.device_name()).finish(),
            DeviceSource::Registry(registry) => f.debug_tuple("Registry").field(&registry.len()).finish(),
        }
    }
}

// =============================================================================
// 2. OrderFindingPipeline
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderFindingOutcome {
    Order {
        phase: PhaseEstimate,
        order: OrderCandidate,
    },
    PhaseZero,
}

#[derive(Debug, Clone)]
pub struct OrderFindingPipeline {
    devices: DeviceSource,
    strategy: OrderResolutionStrategy,
    shots: u64,
    ancilla_width: Option<usize>,
    collaborator_timeout: Option<Duration>,
}

impl OrderFindingPipeline {
    pub fn new(devices: DeviceSource) -> Self {
        Self {
            devices,
            strategy: OrderResolutionStrategy::default(),
            shots: crate::config::DEFAULT_SHOTS,
            ancilla_width: None,
            collaborator_timeout: Some(Duration::from_millis(
                crate::config::DEFAULT_COLLABORATOR_TIMEOUT_MS,
            )),
        }
    }

    pub fn with_strategy(mut self, strategy: OrderResolutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_shots(mut self, shots: u64) -> Self {
        self.shots = shots;
        self
    }

    /// Fixed phase register width; `None` sizes it from the modulus.
    pub fn with_ancilla_width(mut self, ancilla_width: Option<usize>) -> Self {
        self.ancilla_width = ancilla_width;
        self
    }

    /// `None` waits for the collaborator indefinitely.
    pub fn with_collaborator_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.collaborator_timeout = timeout;
        self
    }

    pub fn request_for(&self, base: u64, modulus: u64) -> OrderFindingRequest {
        let ancilla_width = self
            .ancilla_width
            .unwrap_or_else(|| OrderFindingRequest::default_ancilla_width(modulus));
        OrderFindingRequest::new(base, modulus, ancilla_width, self.shots)
    }

    pub fn find_order(&self, base: u64, modulus: u64) -> FactorizationResult<OrderFindingOutcome> {
        let request = self.request_for(base, modulus);
        let device = self.devices.device_for(&request)?;
        let distribution = self.call_collaborator(device, request)?;
        check_distribution(&request, &distribution)?;

        let phase = match extract_phase(&distribution) {
            Ok(phase) => phase,
            Err(PhaseExtractionError::PhaseZero) => return Ok(OrderFindingOutcome::PhaseZero),
            Err(PhaseExtractionError::Malformed(err)) => {
                return Err(FactorizationError::MalformedDistribution(err.to_string()));
            }
        };
        let order = OrderResolver::new(self.strategy, modulus)
            .resolve_order(&phase)
            .map_err(|err| FactorizationError::MalformedDistribution(err.to_string()))?;

        tracing::debug!(base, modulus, %phase, %order, "order candidate resolved");
        Ok(OrderFindingOutcome::Order { phase, order })
    }

    // =========================================================================
    // 3. Collaborator call with timeout
    // =========================================================================

    fn call_collaborator(
        &self,
        device: Arc<dyn QuantumDeviceInterface>,
        request: OrderFindingRequest,
    ) -> FactorizationResult<MeasurementDistribution> {
        let Some(timeout) = self.collaborator_timeout else {
            return Ok(device.execute(&request)?);
        };

        let (sender, receiver) = crossbeam_channel::bounded(1);
        std::thread::Builder::new()
            .name("order-finding-collaborator".to_string())
            .spawn(move || {
                // The receiver is gone if the caller already timed out.
                let _ = sender.send(device.execute(&request));
            })
            .map_err(|err| FactorizationError::WorkerFailed(err.to_string()))?;

        match receiver.recv_timeout(timeout) {
            Ok(result) => Ok(result?),
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    base = request.base,
                    modulus = request.modulus,
                    timeout_ms = timeout.as_millis() as u64,
                    "order-finding collaborator timed out"
                );
                Err(FactorizationError::CollaboratorTimeout {
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
            Err(RecvTimeoutError::Disconnected) => Err(FactorizationError::WorkerFailed(
                "collaborator thread exited without a result".to_string(),
            )),
        }
    }
}

/// The collaborator must answer with `ancilla_width`-bit strings whose counts
/// sum to `shots`.
fn check_distribution(
    request: &OrderFindingRequest,
    distribution: &MeasurementDistribution,
) -> FactorizationResult<()> {
    if distribution.bitstring_width() != request.ancilla_width {
        return Err(FactorizationError::MalformedDistribution(format!(
            "expected {}-bit outcomes, got {}-bit",
            request.ancilla_width,
            distribution.bitstring_width()
        )));
    }
    if distribution.total_shots() != request.shots {
        return Err(FactorizationError::MalformedDistribution(format!(
            "expected {} shots, got {}",
            request.shots,
            distribution.total_shots()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantum_device_abstraction::{DeviceError, GateLevelSimulatorDevice};
    use uuid::Uuid;

    #[derive(Debug)]
    struct FixedAnswer {
        counts: Vec<(&'static str, u64)>,
        delay: Duration,
    }

    impl QuantumDeviceInterface for FixedAnswer {
        fn device_id(&self) -> Uuid {
            Uuid::nil()
        }
        fn device_name(&self) -> &str {
            "fixed_answer"
        }
        fn maximum_quantum_bits(&self) -> usize {
            64
        }
        fn supports_request(&self, _request: &OrderFindingRequest) -> bool {
            true
        }
        fn execute(&self, _request: &OrderFindingRequest) -> Result<MeasurementDistribution, DeviceError> {
            std::thread::sleep(self.delay);
            MeasurementDistribution::from_counts(self.counts.clone())
                .map_err(|e| DeviceError::ExecutionFailed(e.to_string()))
        }
    }

    fn pipeline(counts: Vec<(&'static str, u64)>, delay: Duration) -> OrderFindingPipeline {
        OrderFindingPipeline::new(DeviceSource::Fixed(Arc::new(FixedAnswer { counts, delay })))
            .with_ancilla_width(Some(4))
            .with_shots(10)
    }

    #[test]
    fn test_phase_to_order() {
        let outcome = pipeline(vec![("1100", 10)], Duration::ZERO).find_order(7, 15).unwrap();
        match outcome {
            OrderFindingOutcome::Order { phase, order } => {
                assert_eq!(phase.numerator(), 12);
                assert_eq!(order.value(), 4);
            }
            OrderFindingOutcome::PhaseZero => panic!("expected an order"),
        }
    }

    #[test]
    fn test_zero_phase_is_an_outcome() {
        let outcome = pipeline(vec![("0000", 10)], Duration::ZERO).find_order(4, 15).unwrap();
        assert_eq!(outcome, OrderFindingOutcome::PhaseZero);
    }

    #[test]
    fn test_width_and_shot_mismatch_are_fatal() {
        let wrong_width = pipeline(vec![("100", 10)], Duration::ZERO).find_order(7, 15);
        assert!(matches!(wrong_width, Err(FactorizationError::MalformedDistribution(_))));

        let wrong_shots = pipeline(vec![("1000", 9)], Duration::ZERO).find_order(7, 15);
        assert!(matches!(wrong_shots, Err(FactorizationError::MalformedDistribution(_))));
    }

    #[test]
    fn test_timeout_is_fatal() {
        let slow = pipeline(vec![("1000", 10)], Duration::from_millis(500))
            .with_collaborator_timeout(Some(Duration::from_millis(20)));
        assert!(matches!(
            slow.find_order(7, 15),
            Err(FactorizationError::CollaboratorTimeout { timeout_ms: 20 })
        ));
    }

    #[test]
    fn test_registry_without_matching_device() {
        let registry = Arc::new(DeviceRegistry::new());
        registry.register_device(Arc::new(GateLevelSimulatorDevice::mod_fifteen()));
        let pipeline = OrderFindingPipeline::new(DeviceSource::Registry(registry));
        assert!(matches!(
            pipeline.find_order(2, 21),
            Err(FactorizationError::NoSuitableDevice { base: 2, modulus: 21 })
        ));
    }

    #[test]
    fn test_default_width_tracks_modulus() {
        let pipeline = OrderFindingPipeline::new(DeviceSource::Registry(Arc::new(DeviceRegistry::new())));
        assert_eq!(pipeline.request_for(2, 21).ancilla_width, 10);
    }
}

//! End-to-end search scenarios against a scripted order-finding device.

use parking_lot::Mutex;
use quantum_device_abstraction::{
    DeviceError, DeviceRegistry, GateLevelSimulatorDevice, OrderFindingRequest,
    QuantumDeviceInterface,
};
use quantum_runtime::measurement::MeasurementDistribution;
use shor_factorization::base_selection::SequenceBaseSelector;
use shor_factorization::config::FactorizationConfig;
use shor_factorization::error::{FactorizationError, NotFactorableReason};
use shor_factorization::parallel::ParallelFactorSearch;
use shor_factorization::pipeline::{DeviceSource, OrderFindingPipeline};
use shor_factorization::search::{FactorSearchLoop, ResolutionPath};
use shor_factorization::Factorizer;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Answers each request with every shot on the next scripted bitstring,
/// repeating the last one once the script runs out.
#[derive(Debug)]
struct ScriptedDevice {
    script: Mutex<VecDeque<&'static str>>,
    last: Mutex<Option<&'static str>>,
    calls: Mutex<Vec<OrderFindingRequest>>,
    delay: Duration,
}

impl ScriptedDevice {
    fn new(script: &[&'static str]) -> Self {
        Self {
            script: Mutex::new(script.iter().copied().collect()),
            last: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn calls(&self) -> Vec<OrderFindingRequest> {
        self.calls.lock().clone()
    }
}

impl QuantumDeviceInterface for ScriptedDevice {
    fn device_id(&self) -> Uuid {
        Uuid::nil()
    }

    fn device_name(&self) -> &str {
        "scripted"
    }

    fn maximum_quantum_bits(&self) -> usize {
        64
    }

    fn supports_request(&self, _request: &OrderFindingRequest) -> bool {
        true
    }

    fn execute(&self, request: &OrderFindingRequest) -> Result<MeasurementDistribution, DeviceError> {
        self.calls.lock().push(*request);
        std::thread::sleep(self.delay);

        let next = self.script.lock().pop_front();
        let bitstring = {
            let mut last = self.last.lock();
            if next.is_some() {
                *last = next;
            }
            (*last).ok_or(DeviceError::NotAvailable)?
        };
        MeasurementDistribution::from_counts([(bitstring, request.shots)])
            .map_err(|err| DeviceError::ExecutionFailed(err.to_string()))
    }
}

fn scripted_loop(device: &Arc<ScriptedDevice>) -> FactorSearchLoop {
    FactorSearchLoop::new(OrderFindingPipeline::new(DeviceSource::Fixed(device.clone())))
}

#[test]
fn even_target_never_calls_the_device() {
    let device = Arc::new(ScriptedDevice::new(&[]));
    let factorizer = Factorizer::new().with_device(device.clone());

    let report = factorizer.factorize(22).unwrap();
    assert_eq!((report.factor1, report.factor2), (2, 11));
    assert_eq!(report.resolution, ResolutionPath::EvenShortcut);
    assert!(device.calls().is_empty());
}

#[test]
fn quarter_phase_for_seven_mod_fifteen_gives_three_and_five() {
    // 0.25 with the default 8-bit register for N = 15.
    let device = Arc::new(ScriptedDevice::new(&["01000000"]));
    let outcome = scripted_loop(&device)
        .run(15, &mut SequenceBaseSelector::new(vec![7]))
        .unwrap();

    assert_eq!((outcome.pair.factor1(), outcome.pair.factor2()), (3, 5));
    assert_eq!(outcome.order, Some(4));
    assert_eq!(outcome.resolution, ResolutionPath::OrderFinding);
    assert_eq!(device.calls().len(), 1);
    assert_eq!(device.calls()[0].ancilla_width, 8);
}

#[test]
fn zero_phase_retries_exactly_once_with_a_new_base() {
    let device = Arc::new(ScriptedDevice::new(&["00000000", "01000000"]));
    let outcome = scripted_loop(&device)
        .run(15, &mut SequenceBaseSelector::new(vec![4, 7]))
        .unwrap();

    let bases: Vec<u64> = device.calls().iter().map(|r| r.base).collect();
    assert_eq!(bases, vec![4, 7]);
    assert_eq!(outcome.statistics.attempts, 2);
    assert_eq!(outcome.statistics.phase_zero, 1);
    assert_eq!(outcome.base, Some(7));
    assert_eq!(outcome.pair.product(), 15);
}

#[test]
fn shared_factor_with_twenty_one_skips_order_finding() {
    let device = Arc::new(ScriptedDevice::new(&[]));

    let outcome = scripted_loop(&device)
        .run(21, &mut SequenceBaseSelector::new(vec![6]))
        .unwrap();
    assert_eq!((outcome.pair.factor1(), outcome.pair.factor2()), (3, 7));
    assert_eq!(outcome.resolution, ResolutionPath::GcdShortcut);

    let outcome = scripted_loop(&device)
        .run(21, &mut SequenceBaseSelector::new(vec![14]))
        .unwrap();
    assert_eq!((outcome.pair.factor1(), outcome.pair.factor2()), (7, 3));

    assert!(device.calls().is_empty());
}

#[test]
fn small_primes_and_values_below_two_are_not_factorable() {
    let factorizer = Factorizer::new().with_device(Arc::new(ScriptedDevice::new(&[])));
    for target in [2, 3] {
        assert!(matches!(
            factorizer.factorize(target),
            Err(FactorizationError::NotFactorable {
                reason: NotFactorableReason::Prime,
                ..
            })
        ));
    }
    for target in [0, 1] {
        assert!(matches!(
            factorizer.factorize(target),
            Err(FactorizationError::NotFactorable {
                reason: NotFactorableReason::BelowTwo,
                ..
            })
        ));
    }
}

#[test]
fn attempt_cap_ends_in_factorization_failed() {
    let device = Arc::new(ScriptedDevice::new(&["00000000"]));
    let result = scripted_loop(&device)
        .with_max_attempts(5)
        .run(15, &mut SequenceBaseSelector::new(vec![2, 4, 7, 8]));

    match result {
        Err(FactorizationError::FactorizationFailed { target, attempts, .. }) => {
            assert_eq!(target, 15);
            assert_eq!(attempts, 5);
        }
        other => panic!("expected FactorizationFailed, got {other:?}"),
    }
    assert_eq!(device.calls().len(), 5);
}

#[test]
fn slow_collaborator_times_out() {
    let device = Arc::new(ScriptedDevice::new(&["01000000"]).with_delay(Duration::from_millis(400)));
    let mut config = FactorizationConfig::default();
    config.execution.collaborator_timeout_ms = 25;

    let factorizer = Factorizer::with_config(config)
        .with_device(device)
        .with_base_selector(SequenceBaseSelector::new(vec![7]));
    assert!(matches!(
        factorizer.factorize(15),
        Err(FactorizationError::CollaboratorTimeout { timeout_ms: 25 })
    ));
}

#[test]
fn malformed_answer_is_fatal() {
    // Four bits where the request asked for eight.
    let device = Arc::new(ScriptedDevice::new(&["0100"]));
    let result = scripted_loop(&device).run(15, &mut SequenceBaseSelector::new(vec![7]));
    assert!(matches!(result, Err(FactorizationError::MalformedDistribution(_))));
    assert_eq!(device.calls().len(), 1);
}

#[test]
fn device_errors_are_surfaced() {
    let device = Arc::new(ScriptedDevice::new(&[]));
    let result = scripted_loop(&device).run(15, &mut SequenceBaseSelector::new(vec![7]));
    assert!(matches!(
        result,
        Err(FactorizationError::Collaborator(DeviceError::NotAvailable))
    ));
}

#[test]
fn gate_level_simulator_factors_fifteen() {
    let device = Arc::new(GateLevelSimulatorDevice::mod_fifteen().with_seed(2024));
    let mut config = FactorizationConfig::default();
    config.search.seed = Some(2024);

    let report = Factorizer::with_config(config).with_device(device).factorize(15).unwrap();
    assert_eq!(report.accuracy, 1.0);
    assert_eq!(u128::from(report.factor1) * u128::from(report.factor2), 15);
}

#[tokio::test]
async fn parallel_search_returns_a_valid_pair() {
    let mut config = FactorizationConfig::default();
    config.search.seed = Some(99);
    config.parallel.workers = 3;

    let factorizer = Factorizer::with_config(config)
        .with_registry(Arc::new(DeviceRegistry::with_default_simulators()));
    for target in [15, 33, 39] {
        let report = factorizer.factorize_parallel(target).await.unwrap();
        assert!(report.factor1 > 1 && report.factor2 > 1);
        assert_eq!(u128::from(report.factor1) * u128::from(report.factor2), u128::from(target));
    }
}

// 1_000_003 × 999_983: almost no base shares a factor with it.
const LARGE_SEMIPRIME: u64 = 999_985_999_949;

#[test]
fn duration_cap_ends_in_factorization_failed() {
    let device = Arc::new(ScriptedDevice::new(&["00000000"]).with_delay(Duration::from_millis(20)));
    let result = scripted_loop(&device)
        .with_max_attempts(10_000)
        .with_max_duration(Some(Duration::from_millis(50)))
        .run(15, &mut SequenceBaseSelector::new(vec![2, 4, 7, 8]));

    match result {
        Err(FactorizationError::FactorizationFailed { attempts, elapsed_ms, .. }) => {
            assert!(attempts >= 1 && attempts < 100, "attempts = {attempts}");
            assert!(elapsed_ms >= 50);
        }
        other => panic!("expected FactorizationFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn first_parallel_success_stops_the_other_workers() {
    // The device never yields a usable phase; the search can only win on a
    // base sharing a factor with 15.
    let device = Arc::new(ScriptedDevice::new(&["00000000"]).with_delay(Duration::from_millis(2)));
    let pipeline = OrderFindingPipeline::new(DeviceSource::Fixed(device.clone()));
    let outcome = ParallelFactorSearch::new(pipeline, 3)
        .with_max_attempts(100_000)
        .with_seed(Some(12))
        .run(15)
        .await
        .unwrap();

    assert_eq!(outcome.resolution, ResolutionPath::GcdShortcut);
    let calls_at_return = device.calls().len();
    assert_eq!(outcome.statistics.quantum_invocations as usize, calls_at_return);
    assert!(outcome.statistics.attempts < 1_000);

    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(device.calls().len(), calls_at_return);
}

#[tokio::test]
async fn parallel_exhaustion_sums_attempts_over_workers() {
    let device = Arc::new(ScriptedDevice::new(&["00000000"]));
    let pipeline = OrderFindingPipeline::new(DeviceSource::Fixed(device.clone()))
        .with_ancilla_width(Some(8));
    let result = ParallelFactorSearch::new(pipeline, 3)
        .with_max_attempts(10)
        .with_seed(Some(3))
        .run(LARGE_SEMIPRIME)
        .await;

    match result {
        Err(FactorizationError::FactorizationFailed { target, attempts, .. }) => {
            assert_eq!(target, LARGE_SEMIPRIME);
            assert_eq!(attempts, 10);
        }
        other => panic!("expected FactorizationFailed, got {other:?}"),
    }
    assert_eq!(device.calls().len(), 10);
}

#[tokio::test]
async fn parallel_report_counts_every_device_call() {
    let device = Arc::new(ScriptedDevice::new(&["00000000"; 6]).with_delay(Duration::from_millis(1)));
    // After six zero phases every answer is a quarter phase.
    device.script.lock().push_back("01000000");

    let mut config = FactorizationConfig::default();
    config.search.seed = Some(40);
    config.parallel.workers = 3;
    let report = Factorizer::with_config(config)
        .with_device(device.clone())
        .factorize_parallel(15)
        .await
        .unwrap();

    assert_eq!(report.quantum_invocations as usize, device.calls().len());
    assert!(report.attempts as usize >= device.calls().len());
}

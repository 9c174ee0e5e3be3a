//! The benchmark driver.
//!
//! For every dataset and every [`Contender`], the driver runs `num_runs` trial cycles. A cycle
//! builds a fresh instance, issues a batch of random queries and then a batch of random updates
//! against it, and drops it. Each of the three steps runs under the [`Watchdog`] deadline on its
//! own worker thread; the instance moves into the worker and only comes back if the step
//! succeeded.
//!
//! Failures stay local to their (dataset, engine) pair: a timed-out step skips the remaining runs
//! of its metric, a failed build skips the rest of the pair, and everything not measured is
//! recorded as a missing sample rather than a zero.

use std::{collections::HashMap, hint::black_box, ops::RangeInclusive, sync::Arc, time::Instant};

use log::{debug, info, trace, warn};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use rmq::{RangeMin, engine::EngineKind};

use crate::{
    Error, Result, aggregate, alloc,
    config::{BenchConfig, MemorySource},
    dataset::Dataset,
    sample::{Metric, MissingReason, Outcome, Sample},
    watchdog::Watchdog,
};

/// A built structure, owned by exactly one trial cycle.
pub type Instance = Box<dyn RangeMin<i64> + Send>;

const UPDATE_VALUES: RangeInclusive<i64> = -1000..=1000;

/// Something the driver can benchmark.
pub trait Contender: Send + Sync {
    /// Name used in samples and reports.
    fn name(&self) -> &str;

    /// Build a fresh instance, sharing no state with earlier builds.
    fn build(&self, values: &[i64]) -> rmq::Result<Instance>;
}

impl Contender for EngineKind {
    fn name(&self) -> &str {
        EngineKind::name(*self)
    }

    fn build(&self, values: &[i64]) -> rmq::Result<Instance> {
        Ok(Box::new(EngineKind::build(*self, values)?))
    }
}

/// Lifecycle of a single trial cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Building,
    Ready,
    Querying,
    Updating,
    Done,
    TimedOut,
    Failed,
}

impl Phase {
    pub fn can_advance_to(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Idle, Building)
                | (Building | Querying | Updating, Ready | TimedOut | Failed)
                | (Ready, Querying | Updating | Done)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::TimedOut | Phase::Failed)
    }
}

struct Cycle<'a> {
    engine: &'a str,
    n: usize,
    trial: usize,
    phase: Phase,
}

impl<'a> Cycle<'a> {
    fn new(engine: &'a str, n: usize, trial: usize) -> Self {
        Self {
            engine,
            n,
            trial,
            phase: Phase::Idle,
        }
    }

    fn advance(&mut self, next: Phase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "Illegal transition {:?} -> {next:?}",
            self.phase
        );
        trace!(
            "{} (N={}) run {}: {:?} -> {next:?}",
            self.engine, self.n, self.trial, self.phase
        );
        self.phase = next;
    }
}

/// Samples and per-metric state of one (dataset, engine) pair.
struct PairRecorder {
    n: usize,
    engine: String,
    trial: usize,
    stopped: [bool; 3],
    samples: Vec<Sample>,
}

impl PairRecorder {
    fn new(n: usize, engine: &str) -> Self {
        Self {
            n,
            engine: engine.to_owned(),
            trial: 0,
            stopped: [false; 3],
            samples: Vec::new(),
        }
    }

    fn push(&mut self, metric: Metric, outcome: Outcome) {
        self.samples.push(Sample {
            metric,
            n: self.n,
            engine: self.engine.clone(),
            trial: self.trial,
            outcome,
        });
    }

    fn push_latencies(&mut self, metric: Metric, latencies: Vec<f64>) {
        for seconds in latencies {
            self.push(
                metric,
                Outcome::Measured {
                    seconds,
                    memory_bytes: None,
                },
            );
        }
    }

    fn skip(&mut self, metric: Metric) {
        self.push(metric, Outcome::Missing(MissingReason::Skipped));
    }

    fn stop(&mut self, metric: Metric) {
        self.stopped[metric as usize] = true;
    }

    fn is_stopped(&self, metric: Metric) -> bool {
        self.stopped[metric as usize]
    }
}

struct Built {
    instance: Instance,
    seconds: f64,
    memory_bytes: usize,
}

pub struct Driver {
    config: BenchConfig,
    watchdog: Watchdog,
    rng: SmallRng,
    /// Smallest N at which an (engine, metric) timed out
    timeouts: HashMap<(String, Metric), usize>,
}

impl Driver {
    pub fn new(config: BenchConfig) -> Result<Self> {
        config.validate()?;
        if config.memory == MemorySource::Peak && !alloc::is_active() {
            warn!("Allocation tracker is not installed, build memory falls back to footprint");
        }
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Ok(Self {
            watchdog: Watchdog::new(config.timeout),
            config,
            rng,
            timeouts: HashMap::new(),
        })
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Benchmark every contender on every dataset, strictly one operation at a time.
    pub fn sweep(&mut self, datasets: &[Dataset], contenders: &[Arc<dyn Contender>]) -> Vec<Sample> {
        info!(
            "Running RMQ benchmarks ({} engines × {} datasets × {} runs)",
            contenders.len(),
            datasets.len(),
            self.config.num_runs
        );

        let mut samples = Vec::new();
        for dataset in datasets {
            info!("Dataset {} (N={})", dataset.label(), dataset.len());
            for contender in contenders {
                let pair = self.run_pair(dataset, contender);
                info!(
                    "{}",
                    aggregate::summary_line(contender.name(), &aggregate::aggregate(&pair))
                );
                samples.extend(pair);
            }
        }

        info!("All benchmarks completed");
        samples
    }

    fn run_pair(&mut self, dataset: &Dataset, contender: &Arc<dyn Contender>) -> Vec<Sample> {
        let n = dataset.len();
        let mut pair = PairRecorder::new(n, contender.name());

        for metric in Metric::ALL {
            if self.skipped_after_timeout(contender.name(), metric, n) {
                debug!("{} (N={n}) {metric} skipped after an earlier timeout", contender.name());
                pair.stop(metric);
            }
        }

        for trial in 0..self.config.num_runs {
            pair.trial = trial;
            self.run_cycle(dataset, contender, &mut pair);
        }

        pair.samples
    }

    fn skipped_after_timeout(&self, engine: &str, metric: Metric, n: usize) -> bool {
        self.config.skip_larger_after_timeout
            && self
                .timeouts
                .get(&(engine.to_owned(), metric))
                .is_some_and(|&timed_out_at| timed_out_at <= n)
    }

    fn run_cycle(
        &mut self,
        dataset: &Dataset,
        contender: &Arc<dyn Contender>,
        pair: &mut PairRecorder,
    ) {
        if pair.is_stopped(Metric::Build) {
            for metric in Metric::ALL {
                pair.skip(metric);
            }
            return;
        }

        let n = dataset.len();
        let mut cycle = Cycle::new(contender.name(), n, pair.trial);

        cycle.advance(Phase::Building);
        let mut instance = match self.timed_build(dataset, contender) {
            Ok(built) => {
                pair.push(
                    Metric::Build,
                    Outcome::Measured {
                        seconds: built.seconds,
                        memory_bytes: Some(built.memory_bytes),
                    },
                );
                cycle.advance(Phase::Ready);
                built.instance
            }
            Err(e) => {
                self.record_error(&mut cycle, pair, Metric::Build, &e);
                pair.skip(Metric::Query);
                pair.skip(Metric::Update);
                return;
            }
        };

        if pair.is_stopped(Metric::Query) {
            pair.skip(Metric::Query);
        } else if n > 0 && self.config.num_queries > 0 {
            cycle.advance(Phase::Querying);
            let queries: Vec<(usize, usize)> = (0..self.config.num_queries)
                .map(|_| random_query(&mut self.rng, n))
                .collect();
            let name = format!("{}-query", contender.name());
            match self.timed_batch(&name, instance, queries, |rmq, (l, r)| {
                black_box(rmq.query(l, r)?);
                Ok(())
            }) {
                Ok((rmq, latencies)) => {
                    pair.push_latencies(Metric::Query, latencies);
                    instance = rmq;
                    cycle.advance(Phase::Ready);
                }
                Err(e) => {
                    self.record_error(&mut cycle, pair, Metric::Query, &e);
                    pair.skip(Metric::Update);
                    return;
                }
            }
        }

        if pair.is_stopped(Metric::Update) {
            pair.skip(Metric::Update);
        } else if !instance.supports_update() {
            pair.push(Metric::Update, Outcome::NotApplicable);
        } else if n > 0 && self.config.num_updates > 0 {
            cycle.advance(Phase::Updating);
            let updates: Vec<(usize, i64)> = (0..self.config.num_updates)
                .map(|_| random_update(&mut self.rng, n))
                .collect();
            let name = format!("{}-update", contender.name());
            match self.timed_batch(&name, instance, updates, |rmq, (i, v)| rmq.update(i, v)) {
                Ok((rmq, latencies)) => {
                    pair.push_latencies(Metric::Update, latencies);
                    instance = rmq;
                    cycle.advance(Phase::Ready);
                }
                Err(Error::Engine(rmq::Error::Unsupported { .. })) => {
                    debug!("{} (N={n}) refused an update", contender.name());
                    pair.push(Metric::Update, Outcome::NotApplicable);
                    cycle.advance(Phase::Failed);
                    return;
                }
                Err(e) => {
                    self.record_error(&mut cycle, pair, Metric::Update, &e);
                    return;
                }
            }
        }

        cycle.advance(Phase::Done);
        drop(instance);
    }

    /// Record a missing sample for a step that did not complete and stop its metric.
    fn record_error(
        &mut self,
        cycle: &mut Cycle<'_>,
        pair: &mut PairRecorder,
        metric: Metric,
        error: &Error,
    ) {
        let reason = match error {
            Error::Timeout { limit } => {
                warn!(
                    "{} (N={}) {metric} exceeded {limit:?}, skipping its remaining runs",
                    pair.engine, pair.n
                );
                cycle.advance(Phase::TimedOut);
                let timed_out_at = self
                    .timeouts
                    .entry((pair.engine.clone(), metric))
                    .or_insert(pair.n);
                *timed_out_at = (*timed_out_at).min(pair.n);
                MissingReason::TimedOut
            }
            e => {
                warn!("{} (N={}) {metric} failed: {e}", pair.engine, pair.n);
                cycle.advance(Phase::Failed);
                MissingReason::Failed
            }
        };
        debug_assert!(cycle.phase.is_terminal());

        pair.push(metric, Outcome::Missing(reason));
        pair.stop(metric);
        // No instance means nothing else can run for this pair
        if metric == Metric::Build {
            pair.stop(Metric::Query);
            pair.stop(Metric::Update);
        }
    }

    fn timed_build(&self, dataset: &Dataset, contender: &Arc<dyn Contender>) -> Result<Built> {
        let values = Arc::clone(dataset.values());
        let contender = Arc::clone(contender);
        let track_peak = self.config.memory == MemorySource::Peak && alloc::is_active();
        let name = format!("{}-build", contender.name());

        // Peak memory is counted on the worker thread only, a detached worker from an earlier
        // timeout keeps allocating on its own thread
        self.watchdog.run(&name, move |_| -> Result<Built> {
            let start = Instant::now();
            let (instance, peak) = if track_peak {
                let (instance, peak) = alloc::measure_peak(|| contender.build(&values));
                (instance?, Some(peak))
            } else {
                (contender.build(&values)?, None)
            };
            let seconds = start.elapsed().as_secs_f64();
            let memory_bytes = peak.unwrap_or_else(|| instance.heap_size());
            Ok(Built {
                instance,
                seconds,
                memory_bytes,
            })
        })?
    }

    /// Run `op` once per operation on a worker, timing each call separately.
    ///
    /// The instance is handed back together with the latencies, unless the batch timed out or an
    /// operation failed; it is dropped in that case.
    fn timed_batch<Op>(
        &self,
        name: &str,
        mut instance: Instance,
        ops: Vec<Op>,
        op: fn(&mut Instance, Op) -> rmq::Result<()>,
    ) -> Result<(Instance, Vec<f64>)>
    where
        Op: Copy + Send + 'static,
    {
        let (instance, latencies) = self.watchdog.run(name, move |cancel| {
            let mut latencies = Vec::with_capacity(ops.len());
            for &args in &ops {
                if cancel.is_cancelled() {
                    break;
                }
                let start = Instant::now();
                let result = op(&mut instance, args);
                let elapsed = start.elapsed();
                if let Err(e) = result {
                    return (instance, Err(e));
                }
                latencies.push(elapsed.as_secs_f64());
            }
            (instance, Ok(latencies))
        })?;
        Ok((instance, latencies?))
    }
}

/// A uniformly random closed range in `[0, n)`, `n` must be positive.
pub fn random_query<R: Rng + ?Sized>(rng: &mut R, n: usize) -> (usize, usize) {
    let a = rng.random_range(0..n);
    let b = rng.random_range(0..n);
    if a <= b { (a, b) } else { (b, a) }
}

/// A uniformly random position in `[0, n)` and a new value, `n` must be positive.
pub fn random_update<R: Rng + ?Sized>(rng: &mut R, n: usize) -> (usize, i64) {
    (rng.random_range(0..n), rng.random_range(UPDATE_VALUES))
}

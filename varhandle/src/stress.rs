//! Contention harness: many threads incrementing one shared `long`
//! through a handle, followed by a check that no update was lost.
use std::{
    fmt, thread,
    time::{Duration, Instant},
};

use thiserror::Error;

use crate::{
    AccessError, Array, ByteBuffer, ByteOrder, ClassBuilder, Instance, LookupError, PrimitiveType,
    TypedVarHandle, Value, array_element_var_handle, byte_array_view_var_handle,
    byte_buffer_view_var_handle, find_static_var_handle, find_var_handle,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
pub enum StressTarget {
    InstanceField,
    StaticField,
    ArrayElement,
    ByteArrayView,
    ByteBufferView,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
pub enum StressOp {
    GetAndAdd,
    CompareAndSet,
    WeakCompareAndSet,
    CompareAndExchange,
}

#[derive(Debug, Clone)]
pub struct StressSettings {
    pub threads: usize,
    pub iterations: u64,
    pub target: StressTarget,
    pub op: StressOp,
    /// only used by the view targets
    pub order: ByteOrder,
}

impl Default for StressSettings {
    fn default() -> Self {
        Self {
            threads: 4,
            iterations: 100_000,
            target: StressTarget::ArrayElement,
            op: StressOp::GetAndAdd,
            order: ByteOrder::NATIVE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StressReport {
    pub settings: StressSettings,
    pub final_value: i64,
    /// failed compare-and-set attempts across all workers
    pub retries: u64,
    pub elapsed: Duration,
}

#[derive(Debug, Error)]
pub enum StressError {
    #[error("invalid settings: {0}")]
    InvalidSettings(&'static str),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("a worker thread panicked")]
    WorkerPanicked,

    #[error("lost updates: expected {expected}, found {actual}")]
    LostUpdates { expected: i64, actual: i64 },
}

impl StressReport {
    pub fn operations(&self) -> u64 {
        (self.settings.threads as u64).saturating_mul(self.settings.iterations)
    }

    pub fn ops_per_second(&self) -> f64 {
        self.operations() as f64 / self.elapsed.as_secs_f64().max(f64::EPSILON)
    }
}

impl fmt::Display for StressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}/{:?}: {} threads x {} = {} in {:?} ({:.0} ops/s, {} retries)",
            self.settings.target,
            self.settings.op,
            self.settings.threads,
            self.settings.iterations,
            self.final_value,
            self.elapsed,
            self.ops_per_second(),
            self.retries,
        )
    }
}

/// The shared counter: a handle plus the coordinates naming one variable.
struct Counter {
    handle: TypedVarHandle<i64>,
    coords: Vec<Value>,
}

fn counter(settings: &StressSettings) -> Result<Counter, StressError> {
    let (handle, coords) = match settings.target {
        StressTarget::InstanceField => {
            let class = ClassBuilder::new("StressCounter")
                .field("value", PrimitiveType::Long)
                .build()?;
            let handle = find_var_handle(&class, "value", PrimitiveType::Long)?;
            (handle, vec![Value::from(Instance::new(&class))])
        }
        StressTarget::StaticField => {
            let class = ClassBuilder::new("StressTotals")
                .static_field("total", PrimitiveType::Long, 0i64)
                .build()?;
            (find_static_var_handle(&class, "total", PrimitiveType::Long)?, Vec::new())
        }
        StressTarget::ArrayElement => {
            let array = Array::new(PrimitiveType::Long, 4);
            (array_element_var_handle(PrimitiveType::Long), vec![Value::from(array), Value::Int(2)])
        }
        StressTarget::ByteArrayView => {
            let array = Array::new(PrimitiveType::Byte, 32);
            let handle = byte_array_view_var_handle(PrimitiveType::Long, settings.order)?;
            (handle, vec![Value::from(array), Value::Int(8)])
        }
        StressTarget::ByteBufferView => {
            let buffer = ByteBuffer::allocate(32);
            let window = buffer.slice(8, 16).ok_or(StressError::InvalidSettings("buffer window"))?;
            let handle = byte_buffer_view_var_handle(PrimitiveType::Long, settings.order)?;
            (handle, vec![Value::from(window), Value::Int(8)])
        }
    };
    Ok(Counter {
        handle: handle.typed::<i64>()?,
        coords,
    })
}

/// Increment once, returning the number of failed attempts.
fn increment(counter: &Counter, op: StressOp) -> Result<u64, AccessError> {
    let Counter { handle, coords } = counter;
    let mut retries = 0;
    match op {
        StressOp::GetAndAdd => {
            handle.get_and_add(coords, 1)?;
        }
        StressOp::CompareAndSet => loop {
            let current = handle.get_volatile(coords)?;
            if handle.compare_and_set(coords, current, current.wrapping_add(1))? {
                break;
            }
            retries += 1;
        },
        StressOp::WeakCompareAndSet => loop {
            let current = handle.get(coords)?;
            if handle.weak_compare_and_set(coords, current, current.wrapping_add(1))? {
                break;
            }
            retries += 1;
        },
        StressOp::CompareAndExchange => {
            let mut current = handle.get_opaque(coords)?;
            loop {
                let next = current.wrapping_add(1);
                let witness = handle.compare_and_exchange(coords, current, next)?;
                if witness == current {
                    break;
                }
                current = witness;
                retries += 1;
            }
        }
    }
    Ok(retries)
}

pub fn run(settings: &StressSettings) -> Result<StressReport, StressError> {
    if settings.threads == 0 {
        return Err(StressError::InvalidSettings("threads must be positive"));
    }
    if settings.iterations == 0 {
        return Err(StressError::InvalidSettings("iterations must be positive"));
    }

    let counter = counter(settings)?;
    log::info!(
        "stressing {:?} with {:?} on {} threads",
        settings.target,
        settings.op,
        settings.threads
    );

    let start = Instant::now();
    let outcomes: Vec<_> = thread::scope(|scope| {
        let workers: Vec<_> = (0..settings.threads)
            .map(|_| {
                let counter = &counter;
                scope.spawn(move || -> Result<u64, AccessError> {
                    let mut retries = 0;
                    for _ in 0..settings.iterations {
                        retries += increment(counter, settings.op)?;
                    }
                    Ok(retries)
                })
            })
            .collect();
        workers.into_iter().map(|worker| worker.join()).collect()
    });
    let elapsed = start.elapsed();

    let mut retries = 0;
    for outcome in outcomes {
        retries += outcome.map_err(|_| StressError::WorkerPanicked)??;
    }

    let expected = (settings.threads as u64).wrapping_mul(settings.iterations) as i64;
    let actual = counter.handle.get_volatile(&counter.coords)?;
    if actual != expected {
        log::warn!("lost updates: expected {expected}, found {actual}");
        return Err(StressError::LostUpdates { expected, actual });
    }

    let report = StressReport {
        settings: settings.clone(),
        final_value: actual,
        retries,
        elapsed,
    };
    log::info!("{report}");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_runs() {
        let settings = StressSettings {
            threads: 0,
            ..Default::default()
        };
        assert!(matches!(run(&settings), Err(StressError::InvalidSettings(_))));
    }

    #[test]
    fn operation_count_saturates() {
        let report = StressReport {
            settings: StressSettings {
                threads: usize::MAX,
                iterations: u64::MAX,
                ..Default::default()
            },
            final_value: 0,
            retries: 0,
            elapsed: Duration::from_secs(1),
        };
        assert_eq!(report.operations(), u64::MAX);
        assert!(report.ops_per_second().is_finite());
    }

    #[test]
    fn every_target_and_op_counts_exactly() {
        let targets = [
            StressTarget::InstanceField,
            StressTarget::StaticField,
            StressTarget::ArrayElement,
            StressTarget::ByteArrayView,
            StressTarget::ByteBufferView,
        ];
        let ops = [
            StressOp::GetAndAdd,
            StressOp::CompareAndSet,
            StressOp::WeakCompareAndSet,
            StressOp::CompareAndExchange,
        ];
        for target in targets {
            for op in ops {
                let settings = StressSettings {
                    threads: 3,
                    iterations: 500,
                    target,
                    op,
                    order: ByteOrder::BigEndian,
                };
                let report = run(&settings).unwrap();
                assert_eq!(report.final_value, 1500, "{target:?} {op:?}");
                assert_eq!(report.operations(), 1500);
            }
        }
    }
}

use std::{sync::Arc, thread};

use varhandle::*;

const THREADS: usize = 4;
const ITERATIONS: usize = 2_000;

#[test]
fn release_acquire_publishes_plain_writes() {
    let class = ClassBuilder::new("Message")
        .field("payload", PrimitiveType::Long)
        .field("ready", PrimitiveType::Boolean)
        .build()
        .unwrap();
    let payload = find_var_handle(&class, "payload", PrimitiveType::Long).unwrap();
    let ready = find_var_handle(&class, "ready", PrimitiveType::Boolean).unwrap();

    for round in 0..50i64 {
        let message = Instance::new(&class);
        let recv = [Value::from(&message)];

        let reader = {
            let (payload, ready, recv) = (payload.clone(), ready.clone(), recv.clone());
            thread::spawn(move || {
                while ready.get_acquire(&recv).unwrap() != Value::Boolean(true) {
                    std::hint::spin_loop();
                }
                payload.get(&recv).unwrap()
            })
        };

        payload.set(&recv, round * 1_000 + 7).unwrap();
        ready.set_release(&recv, true).unwrap();
        assert_eq!(reader.join().unwrap(), Value::Long(round * 1_000 + 7));
    }
}

#[test]
fn contended_get_and_add_loses_nothing() {
    let vh = array_element_var_handle(PrimitiveType::Int);
    let array = Array::new(PrimitiveType::Int, 4);
    let at = [Value::from(&array), Value::Int(1)];

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let (vh, at) = (vh.clone(), at.clone());
            thread::spawn(move || {
                for _ in 0..ITERATIONS {
                    vh.get_and_add(&at, 1i32).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(vh.get_volatile(&at).unwrap(), Value::Int((THREADS * ITERATIONS) as i32));
    let neighbour = vh.get(&[Value::from(&array), Value::Int(0)]).unwrap();
    assert_eq!(neighbour, Value::Int(0), "neighbour untouched");
}

#[test]
fn contended_cas_on_swapped_view() {
    let vh = byte_buffer_view_var_handle(PrimitiveType::Long, ByteOrder::BigEndian)
        .unwrap()
        .typed::<i64>()
        .unwrap();
    let buffer = ByteBuffer::allocate(16);
    let at = [Value::from(&buffer), Value::Int(8)];

    thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                for _ in 0..ITERATIONS {
                    let mut current = vh.get_opaque(&at).unwrap();
                    loop {
                        let witness = vh.compare_and_exchange(&at, current, current + 1).unwrap();
                        if witness == current {
                            break;
                        }
                        current = witness;
                    }
                }
            });
        }
    });
    let total = (THREADS * ITERATIONS) as i64;
    assert_eq!(vh.get_volatile(&at).unwrap(), total);
    assert_eq!(buffer.to_vec()[8..], total.to_be_bytes());
}

#[test]
fn weak_cas_caller_loop_on_static() {
    let class = ClassBuilder::new("Totals")
        .static_field("count", PrimitiveType::Long, 0i64)
        .build()
        .unwrap();
    let vh = find_static_var_handle(&class, "count", PrimitiveType::Long)
        .unwrap()
        .typed::<i64>()
        .unwrap();

    thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                for _ in 0..ITERATIONS {
                    loop {
                        let current = vh.get(&[]).unwrap();
                        if vh.weak_compare_and_set_volatile(&[], current, current + 1).unwrap() {
                            break;
                        }
                    }
                }
            });
        }
    });
    assert_eq!(vh.get_volatile(&[]).unwrap(), (THREADS * ITERATIONS) as i64);
}

#[test]
fn contended_float_add_is_exact_for_small_integers() {
    let vh = array_element_var_handle(PrimitiveType::Double).typed::<f64>().unwrap();
    let array = Array::new(PrimitiveType::Double, 1);
    let at: Arc<[Value]> = Arc::from([Value::from(&array), Value::Int(0)]);

    thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                for _ in 0..ITERATIONS {
                    vh.add_and_get(&at, 1.0).unwrap();
                }
            });
        }
    });
    assert_eq!(vh.get_volatile(&at).unwrap(), (THREADS * ITERATIONS) as f64);
}

#[test]
fn handles_are_shared_between_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<VarHandle>();
    assert_send_sync::<TypedVarHandle<i64>>();
    assert_send_sync::<ModeInvoker>();
    assert_send_sync::<Value>();
}

#[test]
fn stress_harness_counts_exactly() {
    let report = stress::run(&stress::StressSettings {
        threads: THREADS,
        iterations: 1_000,
        target: stress::StressTarget::ByteBufferView,
        op: stress::StressOp::CompareAndSet,
        order: ByteOrder::BigEndian,
    })
    .unwrap();
    assert_eq!(report.final_value, (THREADS * 1_000) as i64);
}

use varhandle::*;

const VALUE_1: i64 = 0x0102030405060708;
const VALUE_2: i64 = 0x1112131415161718;
const VALUE_3: i64 = 0xCAFEBABE;
const WEAK_ATTEMPTS: usize = 10;

fn at(array: &std::sync::Arc<Array>, index: i32) -> [Value; 2] {
    [Value::from(array), Value::Int(index)]
}

/// Arguments needed after the coordinates by each access type.
fn operands(mode: AccessMode, value: Value) -> Vec<Value> {
    match mode.access_type() {
        AccessType::Get => vec![],
        AccessType::Set | AccessType::GetAndUpdate => vec![value],
        AccessType::CompareAndSet | AccessType::CompareAndExchange => vec![value.clone(), value],
    }
}

#[test]
fn long_array_set_get_and_compare() {
    let vh = array_element_var_handle(PrimitiveType::Long);
    let array = Array::new(PrimitiveType::Long, 10);
    let i = at(&array, 3);

    vh.set(&i, VALUE_1).unwrap();
    assert_eq!(vh.get(&i).unwrap(), Value::Long(VALUE_1));

    assert!(vh.compare_and_set(&i, VALUE_1, VALUE_2).unwrap());
    assert_eq!(vh.get(&i).unwrap(), Value::Long(VALUE_2));

    assert!(!vh.compare_and_set(&i, VALUE_1, VALUE_3).unwrap());
    assert_eq!(vh.get(&i).unwrap(), Value::Long(VALUE_2));
}

#[test]
fn long_array_every_mode() {
    let vh = array_element_var_handle(PrimitiveType::Long);
    let array = Array::new(PrimitiveType::Long, 10);
    let i = at(&array, 9);

    vh.set_volatile(&i, VALUE_1).unwrap();
    assert_eq!(vh.get_volatile(&i).unwrap(), Value::Long(VALUE_1));
    vh.set_release(&i, VALUE_2).unwrap();
    assert_eq!(vh.get_acquire(&i).unwrap(), Value::Long(VALUE_2));
    vh.set_opaque(&i, VALUE_1).unwrap();
    assert_eq!(vh.get_opaque(&i).unwrap(), Value::Long(VALUE_1));

    assert_eq!(vh.compare_and_exchange(&i, VALUE_1, VALUE_2).unwrap(), Value::Long(VALUE_1));
    assert_eq!(vh.compare_and_exchange(&i, VALUE_1, VALUE_3).unwrap(), Value::Long(VALUE_2));
    assert_eq!(
        vh.compare_and_exchange_acquire(&i, VALUE_2, VALUE_1).unwrap(),
        Value::Long(VALUE_2)
    );
    assert_eq!(
        vh.compare_and_exchange_release(&i, VALUE_1, VALUE_2).unwrap(),
        Value::Long(VALUE_1)
    );
    assert_eq!(vh.get(&i).unwrap(), Value::Long(VALUE_2));

    let weak: [fn(&VarHandle, &[Value], i64, i64) -> Result<bool>; 4] = [
        |vh, c, e, n| vh.weak_compare_and_set(c, e, n),
        |vh, c, e, n| vh.weak_compare_and_set_acquire(c, e, n),
        |vh, c, e, n| vh.weak_compare_and_set_release(c, e, n),
        |vh, c, e, n| vh.weak_compare_and_set_volatile(c, e, n),
    ];
    let mut current = VALUE_2;
    for (step, cas) in weak.iter().enumerate() {
        let next = if step % 2 == 0 { VALUE_1 } else { VALUE_2 };
        let succeeded = (0..WEAK_ATTEMPTS).any(|_| cas(&vh, &i, current, next).unwrap());
        assert!(succeeded, "weak variant {step} never succeeded");
        assert_eq!(vh.get(&i).unwrap(), Value::Long(next));
        current = next;
    }

    vh.set(&i, VALUE_1).unwrap();
    assert_eq!(vh.get_and_set(&i, VALUE_2).unwrap(), Value::Long(VALUE_1));
    assert_eq!(vh.get(&i).unwrap(), Value::Long(VALUE_2));

    vh.set(&i, VALUE_1).unwrap();
    assert_eq!(vh.get_and_add(&i, VALUE_3).unwrap(), Value::Long(VALUE_1));
    assert_eq!(vh.add_and_get(&i, VALUE_3).unwrap(), Value::Long(VALUE_1 + 2 * VALUE_3));
}

#[test]
fn elements_are_independent() {
    let vh = array_element_var_handle(PrimitiveType::Int);
    let array = Array::new(PrimitiveType::Int, 3);
    vh.set(&at(&array, 1), -1i32).unwrap();
    assert_eq!(vh.get(&at(&array, 0)).unwrap(), Value::Int(0));
    assert_eq!(vh.get(&at(&array, 2)).unwrap(), Value::Int(0));
    assert_eq!(array.to_bytes()[4..8], [0xFF; 4]);
}

#[test]
fn out_of_bounds_in_every_mode() {
    let vh = array_element_var_handle(PrimitiveType::Long);
    let array = Array::new(PrimitiveType::Long, 10);
    for index in [-1, i32::MIN, 10, 11, i32::MAX] {
        for mode in AccessMode::ALL {
            let mut args = at(&array, index).to_vec();
            args.extend(operands(mode, Value::Long(VALUE_1)));
            let err = vh.access(mode, &args).unwrap_err();
            assert_eq!(
                err,
                AccessError::IndexOutOfBounds {
                    index: index as i64,
                    length: 10
                },
                "{mode} at {index}"
            );
        }
    }
}

#[test]
fn index_accepts_narrower_integers() {
    let vh = array_element_var_handle(PrimitiveType::Byte);
    let array = Array::from_bytes(&[1, 2, 3]);
    assert_eq!(vh.get(&[Value::from(&array), Value::Short(2)]).unwrap(), Value::Byte(3));
    assert_eq!(vh.get(&[Value::from(&array), Value::Char(1)]).unwrap(), Value::Byte(2));
    let err = vh.get(&[Value::from(&array), Value::Long(0)]).unwrap_err();
    assert_eq!(err.kind_name(), "WrongMethodType");
}

#[test]
fn boolean_arrays_have_no_numeric_add() {
    let vh = array_element_var_handle(PrimitiveType::Boolean);
    assert!(!vh.is_supported(AccessMode::GetAndAdd));
    assert!(!vh.is_supported(AccessMode::AddAndGet));
    assert!(vh.is_supported(AccessMode::GetAndSet));

    let array = Array::new(PrimitiveType::Boolean, 2);
    let i = at(&array, 1);
    assert_eq!(vh.get_and_set(&i, true).unwrap(), Value::Boolean(false));
    assert_eq!(vh.compare_and_exchange(&i, true, false).unwrap(), Value::Boolean(true));
    assert_eq!(
        vh.get_and_add(&i, true).unwrap_err(),
        AccessError::UnsupportedOperation {
            mode: AccessMode::GetAndAdd,
            kind: HandleKind::ArrayElement,
            var_type: PrimitiveType::Boolean,
        }
    );
}

#[test]
fn float_and_double_arithmetic() {
    let vh = array_element_var_handle(PrimitiveType::Float);
    let array = Array::new(PrimitiveType::Float, 1);
    let i = at(&array, 0);
    vh.set(&i, 1.0f32).unwrap();
    assert_eq!(vh.get_and_add(&i, 0.5f32).unwrap(), Value::Float(1.0));
    assert_eq!(vh.add_and_get(&i, 0.25f32).unwrap(), Value::Float(1.75));

    let vh = array_element_var_handle(PrimitiveType::Double);
    let array = Array::new(PrimitiveType::Double, 1);
    let i = at(&array, 0);
    vh.set(&i, 1.0f32).unwrap();
    assert_eq!(vh.get(&i).unwrap(), Value::Double(1.0), "float widened to double");
    assert_eq!(vh.add_and_get(&i, 2i32).unwrap(), Value::Double(3.0));
}

#[test]
fn narrow_integers_wrap() {
    let vh = array_element_var_handle(PrimitiveType::Char);
    let array = Array::new(PrimitiveType::Char, 1);
    let i = at(&array, 0);
    vh.set(&i, u16::MAX).unwrap();
    assert_eq!(vh.add_and_get(&i, 1u16).unwrap(), Value::Char(0));

    let vh = array_element_var_handle(PrimitiveType::Byte);
    let array = Array::new(PrimitiveType::Byte, 1);
    let i = at(&array, 0);
    vh.set(&i, i8::MAX).unwrap();
    assert_eq!(vh.get_and_add(&i, 1i8).unwrap(), Value::Byte(i8::MAX));
    assert_eq!(vh.get(&i).unwrap(), Value::Byte(i8::MIN));
}

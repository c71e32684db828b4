//! Call-site type contract of a handle.
//!
//! The expected signature of a mode is derived from the variable type and
//! the coordinate types. Checking happens in two passes: static shape
//! (arity, return type, primitive conversions) raises `WrongMethodType`
//! for every argument before any dynamic value (null, reference class) is
//! inspected.
use crate::{AccessError, AccessMode, AccessType, MethodType, PrimitiveType, Result, Type, Value};

/// `(coordinates..., operands...) -> ret` of `mode`.
pub fn access_mode_type(
    var_type: PrimitiveType,
    coordinates: &[Type],
    access: AccessType,
) -> MethodType {
    let var = Type::Primitive(var_type);
    let (operands, ret) = match access {
        AccessType::Get => (0, var.clone()),
        AccessType::Set => (1, Type::Void),
        AccessType::CompareAndSet => (2, Type::BOOLEAN),
        AccessType::CompareAndExchange => (2, var.clone()),
        AccessType::GetAndUpdate => (1, var.clone()),
    };
    let mut params = coordinates.to_vec();
    params.extend(std::iter::repeat_n(var, operands));
    MethodType::new(params, ret)
}

/// Operand bit patterns converted to the variable type.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Operands(pub [u64; 2]);

fn wrong_type(mode: AccessMode, expected: &MethodType, reason: String) -> AccessError {
    AccessError::WrongMethodType {
        mode,
        expected: expected.clone(),
        reason,
    }
}

/// Static part of the contract, no argument value is looked at beyond its type.
fn check_static(
    mode: AccessMode,
    expected: &MethodType,
    args: &[Value],
    requested: Option<&Type>,
) -> Result<()> {
    if args.len() != expected.arity() {
        return Err(wrong_type(
            mode,
            expected,
            format!("got {} arguments instead of {}", args.len(), expected.arity()),
        ));
    }

    if let Some(requested) = requested.filter(|r| !expected.ret.returns_as(r)) {
        return Err(wrong_type(
            mode,
            expected,
            format!("cannot return {} as {requested}", expected.ret),
        ));
    }

    for (position, (param, arg)) in expected.params.iter().zip(args).enumerate() {
        let fits = match (param, arg) {
            (_, Value::Void) => false,
            (_, Value::Null) => true,
            (Type::Primitive(_), Value::Ref(_)) => false,
            (Type::Reference(_), Value::Ref(_)) => true,
            (Type::Primitive(want), other) => other
                .primitive_type()
                .is_some_and(|have| have.widens_to(*want)),
            (Type::Reference(_), _) | (Type::Void, _) => false,
        };
        if !fits {
            let reason = format!(
                "argument {position} of type {} does not convert to {param}",
                arg.type_name()
            );
            return Err(wrong_type(mode, expected, reason));
        }
    }
    Ok(())
}

/// Dynamic part: nulls and reference classes, left to right.
fn check_dynamic(expected: &MethodType, args: &[Value]) -> Result<()> {
    for (position, (param, arg)) in expected.params.iter().zip(args).enumerate() {
        match (param, arg) {
            (_, Value::Null) => return Err(AccessError::NullReference { position }),
            (Type::Reference(want), Value::Ref(obj)) if !obj.is_instance_of(want) => {
                return Err(AccessError::ClassCast {
                    position,
                    expected: want.name(),
                    actual: obj.ref_type().name(),
                });
            }
            _ => {}
        }
    }
    Ok(())
}

/// Validate `args` against `expected` and return the operand bits.
///
/// `coordinates` is the number of leading coordinate arguments.
pub(crate) fn check(
    mode: AccessMode,
    var_type: PrimitiveType,
    expected: &MethodType,
    coordinates: usize,
    args: &[Value],
    requested: Option<&Type>,
) -> Result<Operands> {
    check_static(mode, expected, args, requested)?;
    check_dynamic(expected, args)?;

    let mut operands = Operands::default();
    for (slot, arg) in operands.0.iter_mut().zip(&args[coordinates..]) {
        *slot = arg
            .widen(var_type)
            .and_then(|v| v.to_bits())
            .ok_or_else(|| {
                let reason = format!("{} is not a {var_type}", arg.type_name());
                wrong_type(mode, expected, reason)
            })?;
    }
    Ok(operands)
}

/// Convert a result of the variable type to the requested return type.
pub(crate) fn convert_result(value: Value, requested: Option<&Type>) -> Value {
    match requested {
        Some(Type::Void) => Value::Void,
        Some(Type::Primitive(want)) => value.widen(*want).unwrap_or(value),
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Array, RefType};
    use PrimitiveType::*;

    fn long_array_coords() -> Vec<Type> {
        vec![Type::Reference(RefType::Array(Long)), Type::INT]
    }

    #[test]
    fn derived_signatures_per_access_type() {
        let coords = long_array_coords();
        let get = access_mode_type(Long, &coords, AccessType::Get);
        assert_eq!(get.to_string(), "(long[],int)long");
        let cas = access_mode_type(Long, &coords, AccessType::CompareAndSet);
        assert_eq!(cas.to_string(), "(long[],int,long,long)boolean");
        let set = access_mode_type(Float, &[], AccessType::Set);
        assert_eq!(set.to_string(), "(float)void");
        let upd = access_mode_type(Char, &[], AccessType::GetAndUpdate);
        assert_eq!(upd.to_string(), "(char)char");
    }

    #[test]
    fn wrong_arity_beats_null() {
        let expected = access_mode_type(Long, &long_array_coords(), AccessType::Get);
        let err = check(AccessMode::Get, Long, &expected, 2, &[Value::Null], None).unwrap_err();
        assert_eq!(err.kind_name(), "WrongMethodType");
    }

    #[test]
    fn static_mismatch_later_in_list_beats_earlier_null() {
        let expected = access_mode_type(Long, &long_array_coords(), AccessType::Set);
        let args = [Value::Null, Value::Int(0), Value::Boolean(true)];
        let err = check(AccessMode::Set, Long, &expected, 2, &args, None).unwrap_err();
        assert_eq!(err.kind_name(), "WrongMethodType");
    }

    #[test]
    fn sibling_reference_is_class_cast() {
        let expected = access_mode_type(Long, &long_array_coords(), AccessType::Get);
        let ints = Array::new(Int, 1);
        let args = [ints.into(), Value::Int(0)];
        let err = check(AccessMode::Get, Long, &expected, 2, &args, None).unwrap_err();
        assert!(matches!(err, AccessError::ClassCast { position: 0, .. }), "{err:?}");
    }

    #[test]
    fn primitive_in_reference_position_is_wrong_type() {
        let expected = access_mode_type(Long, &long_array_coords(), AccessType::Get);
        let args = [Value::Int(0), Value::Int(0)];
        let err = check(AccessMode::Get, Long, &expected, 2, &args, None).unwrap_err();
        assert_eq!(err.kind_name(), "WrongMethodType");
    }

    #[test]
    fn null_operand_is_null_reference() {
        let expected = access_mode_type(Int, &[], AccessType::Set);
        let err = check(AccessMode::Set, Int, &expected, 0, &[Value::Null], None).unwrap_err();
        assert_eq!(err, AccessError::NullReference { position: 0 });
    }

    #[test]
    fn operands_are_widened() {
        let expected = access_mode_type(Long, &[], AccessType::CompareAndSet);
        let ops = check(
            AccessMode::CompareAndSet,
            Long,
            &expected,
            0,
            &[Value::Byte(-1), Value::Char(7)],
            None,
        )
        .unwrap();
        assert_eq!(ops.0, [u64::MAX, 7]);

        let set = access_mode_type(Int, &[], AccessType::Set);
        let err = check(AccessMode::Set, Int, &set, 0, &[Value::Long(1)], None).unwrap_err();
        assert_eq!(err.kind_name(), "WrongMethodType");
    }

    #[test]
    fn requested_return_type_is_checked_first() {
        let expected = access_mode_type(Int, &[], AccessType::Get);
        let long = Type::Primitive(Long);
        assert!(check(AccessMode::Get, Int, &expected, 0, &[], Some(&long)).is_ok());
        assert!(check(AccessMode::Get, Int, &expected, 0, &[], Some(&Type::OBJECT)).is_ok());
        assert!(check(AccessMode::Get, Int, &expected, 0, &[], Some(&Type::Void)).is_ok());
        let err = check(AccessMode::Get, Int, &expected, 0, &[], Some(&Type::BOOLEAN)).unwrap_err();
        assert_eq!(err.kind_name(), "WrongMethodType");

        let set = access_mode_type(Int, &[], AccessType::Set);
        let err =
            check(AccessMode::Set, Int, &set, 0, &[Value::Null], Some(&Type::INT)).unwrap_err();
        assert_eq!(err.kind_name(), "WrongMethodType", "void result requested as int");
    }

    #[test]
    fn result_conversion() {
        assert_eq!(convert_result(Value::Int(3), Some(&Type::Primitive(Long))), Value::Long(3));
        assert_eq!(convert_result(Value::Int(3), Some(&Type::Void)), Value::Void);
        assert_eq!(convert_result(Value::Int(3), Some(&Type::OBJECT)), Value::Int(3));
        assert_eq!(convert_result(Value::Int(3), None), Value::Int(3));
    }
}

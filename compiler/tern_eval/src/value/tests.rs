use super::*;
use crate::environment::{Ident, LocalScope, ScopeKind, SymbolFlags};
use crate::errors::EvalErrorKind;
use num_complex::Complex64;
use pretty_assertions::assert_eq;
use tern_ir::StringInterner;
use tern_types::NoTypes;

// Narrowing

#[test]
fn int_narrows_by_magnitude() {
    assert_eq!(Value::int(127).subtype(), Some(Subtype::Int8));
    assert_eq!(Value::int(-127).subtype(), Some(Subtype::Int8));
    assert_eq!(Value::int(128).subtype(), Some(Subtype::Int16));
    assert_eq!(Value::int(-128).subtype(), Some(Subtype::Int16));
    assert_eq!(Value::int(32_767).subtype(), Some(Subtype::Int16));
    assert_eq!(Value::int(32_768).subtype(), Some(Subtype::IntBig));
}

#[test]
fn bigint_narrows_back_down() {
    let n: BigInt = "100000000000000000000".parse().unwrap();
    assert_eq!(Value::make_int(n.clone()).subtype(), Some(Subtype::IntBig));
    assert_eq!(Value::make_int(n / BigInt::from(10).pow(19)).subtype(), Some(Subtype::Int8));
}

#[test]
fn float_picks_the_smallest_exact_width() {
    assert_eq!(Value::make_float(1.5).subtype(), Some(Subtype::Float32));
    assert_eq!(Value::make_float(0.1).subtype(), Some(Subtype::Float64));
    assert_eq!(Value::make_float(f64::NAN).subtype(), Some(Subtype::Float32));
}

#[test]
fn complex_needs_both_parts_exact() {
    assert_eq!(
        Value::make_complex(Complex64::new(1.0, 2.0)).subtype(),
        Some(Subtype::Complex64)
    );
    assert_eq!(
        Value::make_complex(Complex64::new(1.0, 0.1)).subtype(),
        Some(Subtype::Complex128)
    );
}

#[test]
fn width_never_changes_the_nominal_type() {
    assert_eq!(Value::int(1).type_of(), Type::Int);
    assert_eq!(Value::int(1 << 40).type_of(), Type::Int);
    assert_eq!(Value::make_float(0.1).type_of(), Type::Float);
}

// Equality and display

#[test]
fn numeric_equality_crosses_widths() {
    assert_eq!(Value::int(300), Value::make_int(BigInt::from(300)));
    assert_eq!(Value::int(2), Value::make_float(2.0));
    assert_eq!(Value::make_complex(Complex64::new(3.0, 0.0)), Value::int(3));
    assert_ne!(Value::int(2), Value::string("2"));
}

#[test]
fn char_equals_single_char_string() {
    assert_eq!(Value::Char('a'), Value::string("a"));
    assert_ne!(Value::Char('a'), Value::string("ab"));
}

#[test]
fn display_forms() {
    assert_eq!(Value::make_float(2.0).to_display_string(), "2.0");
    assert_eq!(Value::make_complex(Complex64::new(1.0, -2.5)).to_string(), "1.0-2.5i");
    assert_eq!(
        Value::tuple(vec![Value::int(1), Value::string("a")]).to_string(),
        "(1, a)"
    );
    assert_eq!(
        Value::array(vec![Value::int(1), Value::int(2)]).to_string(),
        "[1, 2]"
    );
    assert_eq!(Value::Nil.to_string(), "nil");
}

// Arrays

#[test]
fn array_type_is_union_of_items() {
    let mixed = Value::array(vec![Value::int(1), Value::string("x"), Value::int(2)]);
    assert_eq!(
        mixed.type_of(),
        Type::array(Type::union([Type::Int, Type::String]))
    );
    assert_eq!(Value::array(vec![]).type_of(), Type::array(Type::Untyped));
}

#[test]
fn append_fixes_untyped_element_type() {
    let Value::Array(array) = Value::array(vec![]) else {
        unreachable!()
    };
    array.append(Value::int(1), &NoTypes).unwrap();
    assert_eq!(array.element_type(), Type::Int);
}

#[test]
fn rejected_append_leaves_array_unchanged() {
    let Value::Array(array) = Value::typed_array(Type::Int, vec![Value::int(1)]) else {
        unreachable!()
    };
    let err = array.append(Value::string("no"), &NoTypes).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::WrongTypes {
            to: Type::Int,
            from: Type::String,
        }
    );
    assert_eq!(array.len(), 1);
    assert_eq!(array.element_type(), Type::Int);
}

#[test]
fn set_and_remove_check_bounds() {
    let Value::Array(array) = Value::array(vec![Value::int(1), Value::int(2)]) else {
        unreachable!()
    };
    array.set(1, Value::int(20), &NoTypes).unwrap();
    assert_eq!(array.get(1), Some(Value::int(20)));
    assert_eq!(
        array.remove(2).unwrap_err().kind,
        EvalErrorKind::IndexOutOfBounds { index: 2, len: 2 }
    );
    assert_eq!(array.remove(0).unwrap(), Value::int(1));
    assert_eq!(array.len(), 1);
}

#[test]
fn arrays_never_hold_themselves() {
    let value = Value::typed_array(Type::Any, vec![Value::int(1)]);
    let Value::Array(array) = &value else {
        unreachable!()
    };
    let cyclic = [
        value.clone(),
        Value::Any(Box::new(value.clone())),
        Value::tuple(vec![Value::int(2), value.clone()]),
        Value::array(vec![Value::array(vec![value.clone()])]),
    ];
    for candidate in cyclic {
        assert_eq!(
            array.append(candidate.clone(), &NoTypes).unwrap_err().kind,
            EvalErrorKind::CyclicValue
        );
        assert_eq!(
            array.set(0, candidate, &NoTypes).unwrap_err().kind,
            EvalErrorKind::CyclicValue
        );
    }
    assert_eq!(array.len(), 1);

    // An equal but distinct array is fine, and the result still compares
    // and prints.
    let twin = Value::typed_array(Type::Any, vec![Value::int(1)]);
    array.append(twin.clone(), &NoTypes).unwrap();
    assert_ne!(value, twin);
    assert_eq!(value.to_string(), "[1, [1]]");
}

#[test]
fn clones_alias_the_same_array() {
    let a = Value::array(vec![]);
    let b = a.clone();
    if let Value::Array(array) = &a {
        array.append(Value::Bool(true), &NoTypes).unwrap();
    }
    assert_eq!(b.length(), Some(1));
}

#[test]
fn empty_array_adopts_slot_type() {
    let value = Value::array(vec![]);
    value.adopt_type(&Type::array(Type::Float));
    assert_eq!(value.type_of(), Type::array(Type::Float));
}

// Unions

#[test]
fn union_value_dedups_by_kind_and_width() {
    let union = Value::union([Value::int(1), Value::int(2), Value::int(1000), Value::Bool(true)]);
    let Value::Union(members) = &union else {
        unreachable!()
    };
    assert_eq!(members.members().len(), 3);
    assert_eq!(union.type_of(), Type::union([Type::Int, Type::Bool]));
}

// Structs

#[test]
fn struct_attributes_live_in_their_own_scope() {
    let interner = StringInterner::new();
    let x = interner.intern("x");
    let outer = LocalScope::root();
    outer
        .declare(Ident::Named(x), SymbolFlags::empty(), Type::Int, Value::int(99))
        .unwrap();

    let scope = outer.child(ScopeKind::Struct);
    let y = interner.intern("y");
    scope
        .declare(Ident::Named(y), SymbolFlags::empty(), Type::Int, Value::int(1))
        .unwrap();
    let st = StructValue::new(vec![y], scope);

    assert_eq!(st.get(y).unwrap(), Value::int(1));
    // Enclosing symbols are not attributes.
    assert_eq!(
        st.get(x).unwrap_err().kind,
        EvalErrorKind::AttributeNotFound { name: x }
    );

    st.set(y, Value::int(2)).unwrap();
    assert_eq!(st.get(y).unwrap(), Value::int(2));
    assert!(st.set(y, Value::string("nope")).is_err());
    assert_eq!(st.type_of(), Type::structure([(y, Type::Int)]));
}

#[test]
fn struct_attributes_never_hold_their_struct() {
    let interner = StringInterner::new();
    let next = interner.intern("next");
    let scope = LocalScope::root().child(ScopeKind::Struct);
    scope
        .declare(Ident::Named(next), SymbolFlags::empty(), Type::Any, Value::Nil)
        .unwrap();
    let st = StructValue::new(vec![next], scope);
    let value = Value::Struct(st.clone());

    assert_eq!(
        st.set(next, Value::Any(Box::new(value.clone()))).unwrap_err().kind,
        EvalErrorKind::CyclicValue
    );
    assert_eq!(
        st.set(next, Value::array(vec![value.clone()])).unwrap_err().kind,
        EvalErrorKind::CyclicValue
    );

    let Value::Array(array) = Value::typed_array(Type::Any, vec![]) else {
        unreachable!()
    };
    array.append(value.clone(), &NoTypes).unwrap();
    // The struct now sits inside the array, so the array cannot go back in.
    assert_eq!(
        st.set(next, Value::Array(array)).unwrap_err().kind,
        EvalErrorKind::CyclicValue
    );
    assert_eq!(st.get(next).unwrap(), Value::Nil);
    assert_eq!(value.to_string(), "{next: nil}");
}

// Casts

#[test]
fn numeric_casts() {
    assert_eq!(Value::make_float(3.9).cast_to(&Type::Int, &NoTypes).unwrap(), Value::int(3));
    assert_eq!(Value::make_float(-3.9).cast_to(&Type::Int, &NoTypes).unwrap(), Value::int(-3));
    assert_eq!(Value::int(2).cast_to(&Type::Float, &NoTypes).unwrap(), Value::make_float(2.0));
    assert!(Value::make_float(f64::INFINITY).cast_to(&Type::Int, &NoTypes).is_err());
    assert!(Value::make_complex(Complex64::new(1.0, 1.0))
        .cast_to(&Type::Float, &NoTypes)
        .is_err());
}

#[test]
fn string_casts_parse() {
    assert_eq!(Value::string(" 42 ").cast_to(&Type::Int, &NoTypes).unwrap(), Value::int(42));
    assert_eq!(
        Value::string("true").cast_to(&Type::Bool, &NoTypes).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        Value::string("ab").cast_to(&Type::array(Type::Char), &NoTypes).unwrap(),
        Value::array(vec![Value::Char('a'), Value::Char('b')])
    );
    let err = Value::string("x1").cast_to(&Type::Int, &NoTypes).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::InvalidCast {
            from: Type::String,
            to: Type::Int,
        }
    );
}

#[test]
fn scalars_cast_to_string() {
    assert_eq!(Value::int(7).cast_to(&Type::String, &NoTypes).unwrap(), Value::string("7"));
    assert_eq!(Value::Char('z').cast_to(&Type::String, &NoTypes).unwrap(), Value::string("z"));
    assert_eq!(
        Value::Char('A').cast_to(&Type::Int, &NoTypes).unwrap(),
        Value::int(65)
    );
}

#[test]
fn nil_keeps_nil_for_reference_like_targets() {
    assert_eq!(
        Value::Nil.cast_to(&Type::array(Type::Int), &NoTypes).unwrap(),
        Value::Nil
    );
    assert!(Value::Nil.cast_to(&Type::Int, &NoTypes).is_err());
}

#[test]
fn element_wise_array_cast() {
    let ints = Value::array(vec![Value::int(1), Value::int(2)]);
    let floats = ints.cast_to(&Type::array(Type::Float), &NoTypes).unwrap();
    assert_eq!(floats.type_of(), Type::array(Type::Float));
    assert_eq!(floats, Value::array(vec![Value::make_float(1.0), Value::make_float(2.0)]));
}

#[test]
fn casting_to_any_wraps() {
    let wrapped = Value::int(5).cast_to(&Type::Any, &NoTypes).unwrap();
    assert_eq!(wrapped.type_of(), Type::Any);
    assert_eq!(wrapped.unwrap_any(), &Value::int(5));
}

#[test]
fn union_casts_through_first_convertible_member() {
    let union = Value::union([Value::string("x"), Value::int(4)]);
    assert_eq!(union.cast_to(&Type::Int, &NoTypes).unwrap(), Value::int(4));
}

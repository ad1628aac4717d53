use super::*;
use crate::{LambdaType, NoTypes};
use pretty_assertions::assert_eq;
use rustc_hash::FxHashMap;
use tern_ir::StringInterner;

fn assign(to: &Type, from: &Type) -> Result<Type, TypeError> {
    reconcile(to, from, Mode::Assign, &NoTypes)
}

fn eq(to: &Type, from: &Type) -> Result<Type, TypeError> {
    reconcile(to, from, Mode::Equal, &NoTypes)
}

// Absorption

#[test]
fn untyped_takes_the_source_type() {
    assert_eq!(assign(&Type::Untyped, &Type::Int), Ok(Type::Int));
    assert_eq!(
        assign(&Type::Untyped, &Type::array(Type::String)),
        Ok(Type::array(Type::String))
    );
}

#[test]
fn untyped_stays_untyped_for_nil() {
    assert_eq!(assign(&Type::Untyped, &Type::Nil), Ok(Type::Untyped));
}

#[test]
fn untyped_source_fits_anything() {
    assert_eq!(assign(&Type::Float, &Type::Untyped), Ok(Type::Float));
}

#[test]
fn any_and_nil_are_absorbed_on_assign() {
    assert_eq!(assign(&Type::Any, &Type::Complex), Ok(Type::Any));
    assert_eq!(assign(&Type::String, &Type::Nil), Ok(Type::String));
    assert!(eq(&Type::Any, &Type::Complex).is_err());
}

#[test]
fn different_tags_fail_naming_both() {
    assert_eq!(
        assign(&Type::Int, &Type::String),
        Err(TypeError::WrongTypes {
            to: Type::Int,
            from: Type::String,
        })
    );
}

// Arrays

#[test]
fn array_elements_reconcile_recursively() {
    assert_eq!(
        assign(&Type::array(Type::Untyped), &Type::array(Type::Int)),
        Ok(Type::array(Type::Int))
    );
    assert!(assign(&Type::array(Type::Int), &Type::array(Type::Bool)).is_err());
}

#[test]
fn nested_array_absorbs_inner_untyped() {
    let to = Type::array(Type::array(Type::Untyped));
    let from = Type::array(Type::array(Type::Char));
    assert_eq!(assign(&to, &from), Ok(from));
}

// Unions

#[test]
fn member_is_assignable_to_union() {
    let int_or_string = Type::union([Type::Int, Type::String]);
    assert_eq!(assign(&int_or_string, &Type::Int), Ok(int_or_string.clone()));
    assert!(assign(&Type::Int, &int_or_string).is_err());
}

#[test]
fn union_to_union_requires_same_cardinality() {
    let wide = Type::union([Type::Int, Type::String, Type::Bool]);
    let narrow = Type::union([Type::Int, Type::String]);
    assert!(assign(&wide, &narrow).is_err());

    let reordered = Type::union([Type::String, Type::Int]);
    assert_eq!(assign(&narrow, &reordered), Ok(narrow.clone()));
}

#[test]
fn union_never_equals_a_single_member() {
    let int_or_string = Type::union([Type::Int, Type::String]);
    assert!(eq(&int_or_string, &Type::Int).is_err());
}

#[test]
fn union_source_into_untyped_rebuilds_the_union() {
    let int_or_float = Type::union([Type::Int, Type::Float]);
    assert_eq!(assign(&Type::Untyped, &int_or_float), Ok(int_or_float));
}

#[test]
fn nil_into_union_slot_is_allowed() {
    let int_or_string = Type::union([Type::Int, Type::String]);
    assert_eq!(assign(&int_or_string, &Type::Nil), Ok(int_or_string.clone()));
}

// Tuples and structs

#[test]
fn tuple_arity_must_match() {
    let pair = Type::Tuple(vec![Type::Int, Type::String]);
    let triple = Type::Tuple(vec![Type::Int, Type::String, Type::Bool]);
    assert!(assign(&pair, &triple).is_err());
    assert_eq!(
        assign(
            &Type::Tuple(vec![Type::Untyped, Type::String]),
            &Type::Tuple(vec![Type::Int, Type::String])
        ),
        Ok(pair)
    );
}

#[test]
fn empty_struct_is_a_wildcard() {
    let interner = StringInterner::new();
    let point = Type::structure([
        (interner.intern("x"), Type::Int),
        (interner.intern("y"), Type::Int),
    ]);
    let wildcard = Type::Struct(StructType::wildcard());
    assert_eq!(assign(&point, &wildcard), Ok(point.clone()));
    assert_eq!(assign(&wildcard, &point), Ok(wildcard.clone()));
}

#[test]
fn struct_attributes_match_by_name_in_target_order() {
    let interner = StringInterner::new();
    let x = interner.intern("x");
    let y = interner.intern("y");
    let to = Type::structure([(x, Type::Untyped), (y, Type::String)]);
    let from = Type::structure([(y, Type::String), (x, Type::Float)]);
    assert_eq!(
        assign(&to, &from),
        Ok(Type::structure([(x, Type::Float), (y, Type::String)]))
    );
}

#[test]
fn struct_with_unknown_attribute_fails() {
    let interner = StringInterner::new();
    let to = Type::structure([(interner.intern("x"), Type::Int)]);
    let from = Type::structure([(interner.intern("z"), Type::Int)]);
    assert!(assign(&to, &from).is_err());
}

// Lambdas

#[test]
fn lambda_parameter_names_are_irrelevant() {
    let interner = StringInterner::new();
    let f = Type::lambda(LambdaType::new([(interner.intern("a"), Type::Int)], Type::Int));
    let g = Type::lambda(LambdaType::new([(interner.intern("b"), Type::Int)], Type::Int));
    assert_eq!(eq(&f, &g), Ok(f.clone()));
}

#[test]
fn lambda_signatures_are_invariant() {
    let interner = StringInterner::new();
    let a = interner.intern("a");
    let takes_any = Type::lambda(LambdaType::new([(a, Type::Any)], Type::Nil));
    let takes_int = Type::lambda(LambdaType::new([(a, Type::Int)], Type::Nil));
    // `any` would absorb `int` under Assign, but signatures compare strictly.
    assert!(assign(&takes_any, &takes_int).is_err());
}

#[test]
fn lambda_variadic_flag_must_match() {
    let interner = StringInterner::new();
    let xs = interner.intern("xs");
    let plain = Type::lambda(LambdaType::new([(xs, Type::Int)], Type::Nil));
    let variadic = Type::lambda(LambdaType::new([(xs, Type::Int)], Type::Nil).variadic());
    assert!(eq(&plain, &variadic).is_err());
}

// References and aliases

#[test]
fn references_resolve_through_the_resolver() {
    let interner = StringInterner::new();
    let id = interner.intern("Id");
    let mut types = FxHashMap::default();
    types.insert(id, Type::alias(id, Type::Int));

    let result = reconcile(&Type::Reference(id), &Type::Int, Mode::Assign, &types);
    assert_eq!(result, Ok(Type::alias(id, Type::Int)));
}

#[test]
fn unresolved_reference_is_reported() {
    let interner = StringInterner::new();
    let missing = interner.intern("Missing");
    assert_eq!(
        assign(&Type::Reference(missing), &Type::Int),
        Err(TypeError::UnresolvedType { name: missing })
    );
}

#[test]
fn same_alias_name_reconciles_nominally() {
    let interner = StringInterner::new();
    let meters = interner.intern("Meters");
    let a = Type::alias(meters, Type::Float);
    let b = Type::alias(meters, Type::Float);
    assert_eq!(eq(&a, &b), Ok(a.clone()));
}

#[test]
fn alias_source_is_unwrapped() {
    let interner = StringInterner::new();
    let meters = Type::alias(interner.intern("Meters"), Type::Float);
    assert_eq!(assign(&Type::Float, &meters), Ok(Type::Float));
    assert!(assign(&Type::Int, &meters).is_err());
}

#[test]
fn wrappers_agree_with_reconcile() {
    assert!(can_assign(&Type::Any, &Type::Bool, &NoTypes).is_ok());
    assert!(equal(&Type::Any, &Type::Bool, &NoTypes).is_err());
    assert_eq!(infer(&Type::Untyped, &Type::Char, &NoTypes), Ok(Type::Char));
}

use super::*;
use pretty_assertions::assert_eq;
use tern_ir::StringInterner;

#[test]
fn union_flattens_and_deduplicates() {
    let nested = Type::union([Type::Int, Type::union([Type::String, Type::Int])]);
    assert_eq!(nested, Type::Union(vec![Type::Int, Type::String]));
}

#[test]
fn union_of_one_is_the_member() {
    assert_eq!(Type::union([Type::Bool, Type::Bool]), Type::Bool);
}

#[test]
fn empty_union_is_untyped() {
    assert_eq!(Type::union(std::iter::empty()), Type::Untyped);
}

#[test]
fn variadic_split() {
    let interner = StringInterner::new();
    let sig = LambdaType::new(
        [
            (interner.intern("sep"), Type::String),
            (interner.intern("xs"), Type::Int),
        ],
        Type::Nil,
    )
    .variadic();

    assert_eq!(sig.fixed_params().len(), 1);
    assert_eq!(sig.variadic_param().map(|p| &p.ty), Some(&Type::Int));
}

#[test]
fn reference_like_types_accept_nil() {
    assert!(Type::array(Type::Int).is_reference_like());
    assert!(Type::String.is_reference_like());
    assert!(!Type::Int.is_reference_like());
    assert!(!Type::Bool.is_reference_like());
}

#[test]
fn element_type_sees_through_alias() {
    let interner = StringInterner::new();
    let ints = Type::alias(interner.intern("Ints"), Type::array(Type::Int));
    assert_eq!(ints.element_type(), Some(&Type::Int));
    assert_eq!(ints.kind(), Kind::Alias);
    assert_eq!(ints.unaliased().kind(), Kind::Array);
}

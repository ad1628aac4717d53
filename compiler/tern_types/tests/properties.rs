//! Property tests for reconciliation.

use proptest::prelude::*;
use tern_ir::StringInterner;
use tern_types::{reconcile, Mode, NoTypes, StructType, Type};

fn scalar() -> impl Strategy<Value = Type> {
    prop_oneof![
        Just(Type::Any),
        Just(Type::Bool),
        Just(Type::Char),
        Just(Type::Int),
        Just(Type::Float),
        Just(Type::Complex),
        Just(Type::String),
    ]
}

fn concrete() -> impl Strategy<Value = Type> {
    scalar().prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(Type::array),
            prop::collection::vec(inner.clone(), 1..4).prop_map(Type::Tuple),
            prop::collection::vec(inner, 2..4).prop_map(Type::union),
        ]
    })
}

proptest! {
    #[test]
    fn untyped_absorbs_every_concrete_type(ty in concrete()) {
        prop_assert_eq!(reconcile(&Type::Untyped, &ty, Mode::Assign, &NoTypes), Ok(ty));
    }

    #[test]
    fn every_type_reconciles_with_itself(ty in concrete()) {
        prop_assert_eq!(reconcile(&ty, &ty, Mode::Equal, &NoTypes), Ok(ty.clone()));
        prop_assert_eq!(reconcile(&ty, &ty, Mode::Assign, &NoTypes), Ok(ty));
    }

    #[test]
    fn arrays_are_covariant(a in concrete(), b in concrete()) {
        let elementwise = reconcile(&a, &b, Mode::Assign, &NoTypes);
        let arrays = reconcile(&Type::array(a), &Type::array(b), Mode::Assign, &NoTypes);
        prop_assert_eq!(arrays, elementwise.map(Type::array));
    }

    #[test]
    fn union_accepts_its_members(a in scalar(), b in scalar()) {
        prop_assume!(a != b);
        let union = Type::union([a.clone(), b.clone()]);
        prop_assert!(reconcile(&union, &a, Mode::Assign, &NoTypes).is_ok());
        prop_assert!(reconcile(&union, &b, Mode::Assign, &NoTypes).is_ok());
    }

    #[test]
    fn wildcard_struct_fits_any_struct(names in prop::collection::hash_set("[a-z]{1,6}", 1..5)) {
        let interner = StringInterner::new();
        let target = Type::structure(names.iter().map(|n| (interner.intern(n), Type::Int)));
        let wildcard = Type::Struct(StructType::wildcard());
        prop_assert_eq!(
            reconcile(&target, &wildcard, Mode::Assign, &NoTypes),
            Ok(target.clone())
        );
    }
}

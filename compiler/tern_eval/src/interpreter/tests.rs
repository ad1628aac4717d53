use pretty_assertions::assert_eq;
use tern_ir::{BinaryOp, DecodeError, Opcode, SharedInterner, UnaryOp};
use tern_types::{LambdaType, Type};

use super::*;
use crate::emit::{Emitter, Operand};
use crate::errors::{EvalError, EvalErrorKind, Location};
use crate::BuiltinRegistry;

fn named(name: &str) -> Operand {
    Operand::named(name)
}

fn run(emitter: Emitter) -> EvalResult {
    Interpreter::new(emitter.finish().unwrap()).run()
}

fn run_err(emitter: Emitter) -> EvalError {
    run(emitter).unwrap_err()
}

// Basics

#[test]
fn empty_program_yields_nil() {
    assert_eq!(Interpreter::new(Vec::new()).run().unwrap(), Value::Nil);
}

#[test]
fn top_level_return() {
    let mut e = Emitter::new();
    e.ret(42);
    assert_eq!(run(e).unwrap(), Value::int(42));
}

#[test]
fn results_flow_through_the_mailbox() {
    let mut e = Emitter::new();
    e.declare(named("x"), SymbolFlags::empty(), &Type::Int, 2)
        .operation(BinaryOp::Mul, named("x"), 21)
        .move_to(named("x"), Operand::Pop)
        .ret(named("x"));
    assert_eq!(run(e).unwrap(), Value::int(42));
}

#[test]
fn pop_on_empty_mailbox_is_nil() {
    let mut e = Emitter::new();
    e.ret(Operand::Pop);
    assert_eq!(run(e).unwrap(), Value::Nil);
}

#[test]
fn move_to_pop_reposts() {
    let mut e = Emitter::new();
    e.move_to(Operand::Pop, 7).ret(Operand::Pop);
    assert_eq!(run(e).unwrap(), Value::int(7));
}

#[test]
fn unary_and_ternary() {
    let mut e = Emitter::new();
    e.unary(UnaryOp::Neg, 5)
        .unary(UnaryOp::Not, false)
        .ternary(Operand::Pop, "yes", "no");
    // The ternary consumed the negation first, which is not a bool.
    let err = run_err(e);
    assert_eq!(
        err.kind,
        EvalErrorKind::WrongTypes {
            to: Type::Bool,
            from: Type::Int,
        }
    );

    let mut e = Emitter::new();
    e.unary(UnaryOp::Not, false)
        .ternary(Operand::Pop, Value::string("yes"), Value::string("no"))
        .ret(Operand::Pop);
    assert_eq!(run(e).unwrap(), Value::string("yes"));
}

// Blocks and jumps

#[test]
fn block_scope_shadows_without_clobbering() {
    let mut e = Emitter::new();
    e.declare(named("x"), SymbolFlags::empty(), &Type::Int, 1);
    let block = e.begin_block();
    e.declare(named("x"), SymbolFlags::empty(), &Type::String, Value::string("inner"));
    e.end_block(block);
    e.ret(named("x"));
    assert_eq!(run(e).unwrap(), Value::int(1));
}

#[test]
fn block_end_leaves_only_the_innermost_block() {
    let mut e = Emitter::new();
    let outer = e.begin_block();
    let inner = e.begin_block();
    e.leave().ret(1);
    e.end_block(inner);
    e.ret(2);
    e.end_block(outer);
    assert_eq!(run(e).unwrap(), Value::int(2));
}

#[test]
fn return_unwinds_nested_blocks() {
    let mut e = Emitter::new();
    let outer = e.begin_block();
    let inner = e.begin_block();
    e.ret(1);
    e.end_block(inner);
    e.ret(2);
    e.end_block(outer);
    assert_eq!(run(e).unwrap(), Value::int(1));
}

#[test]
fn for_loop_renews_its_scope_each_iteration() {
    let mut e = Emitter::new();
    e.declare(named("i"), SymbolFlags::empty(), &Type::Int, 0);
    let body = e.begin_for();
    let top = e.position();
    let exit = e.jump_if_equal_forward(named("i"), 5);
    // Would be a duplicate without a fresh scope per iteration.
    e.declare(named("step"), SymbolFlags::CONST, &Type::Int, 1)
        .operation(BinaryOp::Add, named("i"), named("step"))
        .move_to(named("i"), Operand::Pop)
        .jump(top);
    e.end_block(body);
    e.bind(exit);
    e.ret(named("i"));
    assert_eq!(run(e).unwrap(), Value::int(5));
}

#[test]
fn jump_to_program_end_finishes_the_run() {
    let mut e = Emitter::new();
    let end = e.jump_forward();
    e.ret(1);
    e.bind(end);
    assert_eq!(run(e).unwrap(), Value::Nil);
}

#[test]
fn jump_outside_the_program_is_invalid() {
    let mut e = Emitter::new();
    e.jump(1_000);
    assert_eq!(run_err(e).kind, EvalErrorKind::InvalidJump { target: 1_000 });
}

// Lambdas

fn emit_counter(e: &mut Emitter) {
    e.declare(named("count"), SymbolFlags::empty(), &Type::Int, 0);
    let body = e.lambda(&LambdaType::new([], Type::Nil));
    e.operation(BinaryOp::Add, named("count"), 1)
        .move_to(named("count"), Operand::Pop);
    e.end_block(body);
    e.declare(named("bump"), SymbolFlags::CONST, &Type::Untyped, Operand::Pop);
}

#[test]
fn closures_mutate_their_captured_scope() {
    let mut e = Emitter::new();
    emit_counter(&mut e);
    e.call(named("bump"), &[])
        .call(named("bump"), &[])
        .ret(named("count"));
    assert_eq!(run(e).unwrap(), Value::int(2));
}

#[test]
fn lambda_body_is_skipped_at_creation() {
    let mut e = Emitter::new();
    let body = e.lambda(&LambdaType::new([], Type::Int));
    e.ret(1);
    e.end_block(body);
    e.ret(Operand::Pop);
    let value = run(e).unwrap();
    assert_eq!(value.type_of(), Type::lambda(LambdaType::new([], Type::Int)));
}

#[test]
fn call_result_is_posted() {
    let interner = SharedInterner::new();
    let x = interner.intern("x");
    let mut e = Emitter::new();
    let body = e.lambda(&LambdaType::new([(x, Type::Int)], Type::Int));
    e.operation(BinaryOp::Mul, named("x"), named("x"))
        .ret(Operand::Pop);
    e.end_block(body);
    e.declare(named("square"), SymbolFlags::CONST, &Type::Untyped, Operand::Pop)
        .call(named("square"), &[Operand::from(9)])
        .ret(Operand::Pop);

    let mut interp = InterpreterBuilder::new(e.finish().unwrap())
        .interner(interner)
        .build()
        .unwrap();
    assert_eq!(interp.run().unwrap(), Value::int(81));
}

#[test]
fn calling_a_non_lambda_fails() {
    let mut e = Emitter::new();
    e.call(3, &[]);
    assert_eq!(
        run_err(e).kind,
        EvalErrorKind::NotCallable { found: Type::Int }
    );
}

#[test]
fn jump_escaping_a_lambda_is_invalid() {
    let mut e = Emitter::new();
    e.declare(named("pad"), SymbolFlags::empty(), &Type::Int, 0);
    let body = e.lambda(&LambdaType::new([], Type::Nil));
    e.jump(0);
    e.end_block(body);
    e.declare(named("f"), SymbolFlags::CONST, &Type::Untyped, Operand::Pop)
        .call(named("f"), &[]);
    assert_eq!(run_err(e).kind, EvalErrorKind::InvalidJump { target: 0 });
}

#[test]
fn call_depth_limit() {
    let mut e = Emitter::new();
    let body = e.lambda(&LambdaType::new([], Type::Nil));
    e.call(named("forever"), &[]);
    e.end_block(body);
    e.declare(named("forever"), SymbolFlags::CONST, &Type::Untyped, Operand::Pop)
        .call(named("forever"), &[]);

    let mut interp = InterpreterBuilder::new(e.finish().unwrap())
        .max_call_depth(16)
        .build()
        .unwrap();
    assert_eq!(
        interp.run().unwrap_err().kind,
        EvalErrorKind::StackOverflow { depth: 16 }
    );
}

#[test]
fn builtins_are_callable_by_name() {
    let interner = SharedInterner::new();
    let mut builtins = BuiltinRegistry::new();
    builtins.register(
        interner.intern("double"),
        LambdaType::new([(interner.intern("n"), Type::Int)], Type::Int),
        |args| crate::eval_binary(BinaryOp::Mul, &args[0], &Value::int(2)),
    );

    let mut e = Emitter::new();
    e.call(named("double"), &[Operand::from(21)])
        .ret(Operand::Pop);
    let mut interp = InterpreterBuilder::new(e.finish().unwrap())
        .interner(interner)
        .builtins(builtins)
        .build()
        .unwrap();
    assert_eq!(interp.run().unwrap(), Value::int(42));
}

// Collections and structs

#[test]
fn typed_array_construction_checks_elements() {
    let mut e = Emitter::new();
    e.make_array(&Type::Int, &[Operand::from(1), Operand::from("two")]);
    assert!(matches!(run_err(e).kind, EvalErrorKind::WrongTypes { .. }));
}

#[test]
fn array_get_set_remove_and_length() {
    let mut e = Emitter::new();
    e.make_array(&Type::Int, &[Operand::from(1), Operand::from(2), Operand::from(3)])
        .declare(named("xs"), SymbolFlags::empty(), &Type::array(Type::Int), Operand::Pop)
        .set(named("xs"), 0, 10)
        .remove(named("xs"), 1)
        .length(named("xs"))
        .get(named("xs"), 0)
        .make_tuple(&[Operand::Pop, Operand::Pop])
        .ret(Operand::Pop);
    assert_eq!(
        run(e).unwrap(),
        Value::tuple(vec![Value::int(2), Value::int(10)])
    );
}

#[test]
fn remove_posts_nothing() {
    let mut e = Emitter::new();
    e.make_array(&Type::Int, &[Operand::from(1)])
        .declare(named("xs"), SymbolFlags::empty(), &Type::Untyped, Operand::Pop)
        .remove(named("xs"), 0)
        .ret(Operand::Pop);
    assert_eq!(run(e).unwrap(), Value::Nil);
}

#[test]
fn index_out_of_bounds_reports_index_and_length() {
    let mut e = Emitter::new();
    e.get(Value::string("abc"), 3);
    assert_eq!(
        run_err(e).kind,
        EvalErrorKind::IndexOutOfBounds { index: 3, len: 3 }
    );
}

#[test]
fn struct_attributes() {
    let mut e = Emitter::new();
    e.make_struct(&[
        ("x", Type::Int, Operand::from(1)),
        ("label", Type::String, Operand::from(Value::string("a"))),
    ])
    .declare(named("p"), SymbolFlags::empty(), &Type::Untyped, Operand::Pop)
    .attr_set(named("p"), "x", 5)
    .attr_get(named("p"), "x")
    .ret(Operand::Pop);
    assert_eq!(run(e).unwrap(), Value::int(5));

    let mut e = Emitter::new();
    e.make_struct(&[("x", Type::Int, Operand::from(1))])
        .attr_set(Operand::Pop, "x", Value::string("no"));
    assert!(matches!(
        run_err(e).kind,
        EvalErrorKind::WrongTypes { .. }
    ));

    let mut e = Emitter::new();
    e.make_struct(&[("x", Type::Int, Operand::from(1))])
        .attr_get(Operand::Pop, "y");
    assert!(matches!(
        run_err(e).kind,
        EvalErrorKind::AttributeNotFound { .. }
    ));
}

#[test]
fn struct_type_lists_declared_attributes() {
    let interner = SharedInterner::new();
    let x = interner.intern("x");
    let mut e = Emitter::new();
    e.make_struct(&[("x", Type::Int, Operand::from(4))]);
    e.ret(Operand::Pop);
    let mut interp = InterpreterBuilder::new(e.finish().unwrap())
        .interner(interner)
        .build()
        .unwrap();
    let value = interp.run().unwrap();
    assert_eq!(value.type_of(), Type::structure([(x, Type::Int)]));
}

// Types

#[test]
fn type_aliases_constrain_declarations() {
    let interner = SharedInterner::new();
    let id = interner.intern("Id");
    let mut e = Emitter::new();
    e.type_alias("Id", &Type::Int)
        .declare(named("a"), SymbolFlags::empty(), &Type::Reference(id), 1)
        .declare(named("b"), SymbolFlags::empty(), &Type::Reference(id), true);
    let mut interp = InterpreterBuilder::new(e.finish().unwrap())
        .interner(interner)
        .build()
        .unwrap();
    let err = interp.run().unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::WrongTypes { .. }));
    assert_eq!(err.location.map(|l| l.opcode), Some(Opcode::Declare));
}

#[test]
fn cast_instruction() {
    let mut e = Emitter::new();
    e.cast(Value::string("12"), &Type::Int)
        .operation(BinaryOp::Add, Operand::Pop, 1)
        .ret(Operand::Pop);
    assert_eq!(run(e).unwrap(), Value::int(13));
}

#[test]
fn const_symbols_reject_moves() {
    let mut e = Emitter::new();
    e.declare(named("k"), SymbolFlags::CONST, &Type::Int, 1)
        .move_to(named("k"), 2);
    assert!(matches!(
        run_err(e).kind,
        EvalErrorKind::ConstAssignment { .. }
    ));
}

// Errors

#[test]
fn errors_carry_the_failing_instruction() {
    let mut e = Emitter::new();
    e.declare(named("x"), SymbolFlags::empty(), &Type::Int, 1);
    let offset = e.position();
    e.operation(BinaryOp::Quo, named("x"), 0);
    let err = run_err(e);
    assert_eq!(err.kind, EvalErrorKind::DivisionByZero);
    assert_eq!(
        err.location,
        Some(Location {
            opcode: Opcode::Operation,
            offset,
        })
    );
    assert!(err.to_string().contains("`operation` at offset"));
}

#[test]
fn unknown_opcodes_are_fatal() {
    let err = Interpreter::new(vec![0xEE]).run().unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::Decode(DecodeError::UnknownOpcode {
            byte: 0xEE,
            offset: 0,
        })
    );
}

#[test]
fn truncated_blocks_are_fatal() {
    let err = Interpreter::new(vec![Opcode::BlockBegin.as_u8(), 10, 0]).run().unwrap_err();
    assert!(matches!(
        err.kind,
        EvalErrorKind::Decode(DecodeError::UnexpectedEnd { .. })
    ));
}

#[test]
fn undeclared_symbols_are_reported() {
    let mut e = Emitter::new();
    e.ret(named("ghost"));
    assert!(matches!(
        run_err(e).kind,
        EvalErrorKind::SymbolNotFound { .. }
    ));
}

//! Bytecode interpreter.
//!
//! # Architecture
//!
//! The whole program is the root frame `[0, len)` running in the `Global`
//! scope. `block-begin` and `for-begin` open nested frames; each frame runs
//! instructions until its end or until an instruction yields a [`Flow`]
//! other than `Next`:
//!
//! - `Jump(target)` inside the frame resumes there (a `for` frame also
//!   renews its scope); a jump to the frame's end leaves it; any other
//!   target bubbles to the enclosing frame.
//! - `Return(value)` unwinds to the enclosing lambda call or ends the run.
//! - `Leave` (from `block-end`) finishes the innermost frame.
//!
//! Lambda bodies run through [`BodyRunner`]: the program counter and scope
//! are saved, the body block runs in the call's `Lambda` scope, and both
//! are restored afterwards.
//!
//! Instruction results travel to the next instruction through the current
//! scope's mailbox, read back by `Pop` operands.

#![expect(
    clippy::disallowed_types,
    reason = "the program buffer is shared with every reader without copying"
)]

mod builder;
mod decode;

pub use builder::{InterpreterBuilder, InterpreterConfig};

use std::rc::Rc;

use smallvec::SmallVec;
use tern_ir::{ByteReader, DecodeError, Opcode, SharedInterner};
use tern_stack::ensure_sufficient_stack;
use tern_types::{decode_type, StructType, Type};
use tracing::{debug, trace};

use crate::builtins::BuiltinRegistry;
use crate::environment::{Ident, LocalScope, Scope, ScopeKind, SymbolFlags};
use crate::errors::{
    index_out_of_bounds, invalid_jump, not_callable, stack_overflow, unsupported_unary,
    wrong_types,
};
use crate::lambda::{self, BodyRunner};
use crate::operators::{eval_binary, eval_unary};
use crate::value::{ArrayValue, LambdaValue, StructValue};
use crate::{EvalResult, Value};

use decode::Target;

/// What an instruction asks of the enclosing frame.
#[derive(Debug)]
pub(crate) enum Flow {
    Next,
    Return(Value),
    Jump(usize),
    Leave,
}

/// Bytecode interpreter over one program.
pub struct Interpreter {
    code: Rc<[u8]>,
    pc: usize,
    /// Scope of the instruction being executed.
    scope: LocalScope<Scope>,
    root: LocalScope<Scope>,
    /// Declared into every fresh root.
    builtins: BuiltinRegistry,
    interner: SharedInterner,
    config: InterpreterConfig,
    depth: usize,
}

impl Interpreter {
    /// Interpreter with a fresh interner, no builtins and default limits.
    pub fn new(code: Vec<u8>) -> Self {
        Self::assemble(
            code,
            LocalScope::root(),
            BuiltinRegistry::new(),
            SharedInterner::new(),
            InterpreterConfig::default(),
        )
    }

    pub(crate) fn with_parts(
        code: Vec<u8>,
        builtins: BuiltinRegistry,
        interner: SharedInterner,
        config: InterpreterConfig,
    ) -> EvalResult<Self> {
        let root = fresh_root(&builtins)?;
        Ok(Self::assemble(code, root, builtins, interner, config))
    }

    fn assemble(
        code: Vec<u8>,
        root: LocalScope<Scope>,
        builtins: BuiltinRegistry,
        interner: SharedInterner,
        config: InterpreterConfig,
    ) -> Self {
        Self {
            code: Rc::from(code),
            pc: 0,
            scope: root.clone(),
            root,
            builtins,
            interner,
            config,
            depth: 0,
        }
    }

    /// The global scope.
    pub fn root(&self) -> &LocalScope<Scope> {
        &self.root
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Value of the global symbol `name`.
    pub fn global(&self, name: &str) -> EvalResult {
        self.root.lookup(&Ident::Named(self.interner.intern(name)))
    }

    /// Execute the program.
    ///
    /// Every run starts from a fresh global scope holding only the builtins,
    /// so the globals of the previous run stay readable until the next one
    /// starts. Yields the value of a top-level `return`, or `nil` when
    /// execution falls off the end (or jumps to it).
    #[tracing::instrument(level = "debug", skip_all, fields(len = self.code.len()))]
    pub fn run(&mut self) -> EvalResult {
        let end = self.code.len();
        self.root = fresh_root(&self.builtins)?;
        self.scope = self.root.clone();
        self.depth = 0;
        match self.run_range(0, end, None)? {
            Flow::Return(value) => Ok(value),
            Flow::Next | Flow::Leave => Ok(Value::Nil),
            Flow::Jump(target) => Err(invalid_jump(target)),
        }
    }

    /// Run `[start, end)` in a child scope of `kind`, or in the current
    /// scope when `kind` is `None`.
    fn run_block(&mut self, start: usize, end: usize, kind: Option<ScopeKind>) -> EvalResult<Flow> {
        let outer = self.scope.clone();
        if let Some(kind) = kind {
            self.scope = outer.child(kind);
        }
        debug!(start, end, ?kind, "enter block");
        let flow = self.run_range(start, end, kind);
        self.scope = outer;
        debug!(start, end, ?flow, "leave block");
        flow
    }

    fn run_range(&mut self, start: usize, end: usize, kind: Option<ScopeKind>) -> EvalResult<Flow> {
        self.pc = start;
        while self.pc < end {
            match self.step()? {
                Flow::Next => {}
                Flow::Jump(target) if (start..end).contains(&target) => {
                    if kind == Some(ScopeKind::For) {
                        let parent = self.scope.borrow().parent().cloned();
                        if let Some(parent) = parent {
                            self.scope = parent.child(ScopeKind::For);
                        }
                    }
                    self.pc = target;
                }
                Flow::Jump(target) if target == end => break,
                Flow::Leave => break,
                flow @ (Flow::Jump(_) | Flow::Return(_)) => {
                    if let Flow::Jump(target) = flow {
                        debug!(target, start, end, "jump bubbles out");
                    }
                    return Ok(flow);
                }
            }
        }
        self.pc = end;
        Ok(Flow::Next)
    }

    /// Decode and execute one instruction.
    fn step(&mut self) -> EvalResult<Flow> {
        let code = Rc::clone(&self.code);
        let offset = self.pc;
        let mut reader = ByteReader::at(&code, offset);
        let opcode = reader.read_opcode()?;
        trace!(offset, %opcode);

        let flow = self
            .exec(opcode, &mut reader)
            .map_err(|err| err.at(opcode, offset))?;
        self.pc = reader.position();
        Ok(flow)
    }

    fn exec(&mut self, opcode: Opcode, r: &mut ByteReader<'_>) -> EvalResult<Flow> {
        match opcode {
            Opcode::BlockBegin | Opcode::ForBegin => {
                let (start, end) = self.block_bounds(r)?;
                let kind = if opcode == Opcode::ForBegin {
                    ScopeKind::For
                } else {
                    ScopeKind::Block
                };
                let flow = ensure_sufficient_stack(|| self.run_block(start, end, Some(kind)))?;
                r.set_position(end);
                return Ok(flow);
            }
            Opcode::BlockEnd => return Ok(Flow::Leave),
            Opcode::Lambda => {
                let lambda = self.lambda(r)?;
                self.scope.post(Value::Lambda(lambda));
            }
            Opcode::Call => {
                let callee = self.operand(r)?;
                let argc = r.read_u8()?;
                let mut args: SmallVec<[Value; 4]> = SmallVec::with_capacity(usize::from(argc));
                for _ in 0..argc {
                    args.push(self.operand(r)?);
                }
                let result = self.call(&callee, &args)?;
                self.scope.post(result);
            }
            Opcode::Return => return Ok(Flow::Return(self.operand(r)?)),
            Opcode::Declare => {
                let ident = self.ident(r)?;
                let flags = SymbolFlags::from_bits_truncate(r.read_u8()?);
                let ty = decode_type(r, &self.interner)?;
                let value = self.operand(r)?;
                self.scope.declare(ident, flags, ty, value)?;
            }
            Opcode::Move => {
                let target = self.target(r)?;
                let value = self.operand(r)?;
                match target {
                    Target::Mailbox => self.scope.post(value),
                    Target::Symbol(ident) => self.scope.assign(&ident, value)?,
                }
            }
            Opcode::Operation => {
                let op = r.read_binary_op()?;
                let left = self.operand(r)?;
                let right = self.operand(r)?;
                self.scope.post(eval_binary(op, &left, &right)?);
            }
            Opcode::Unary => {
                let op = r.read_unary_op()?;
                let operand = self.operand(r)?;
                self.scope.post(eval_unary(op, &operand)?);
            }
            Opcode::Jump => return Ok(Flow::Jump(read_target(r)?)),
            Opcode::JumpIfEqual => {
                let left = self.operand(r)?;
                let right = self.operand(r)?;
                let target = read_target(r)?;
                if left == right {
                    return Ok(Flow::Jump(target));
                }
            }
            Opcode::Ternary => {
                let cond = self.operand(r)?;
                let then = self.operand(r)?;
                let otherwise = self.operand(r)?;
                let Value::Bool(cond) = cond.unwrap_any() else {
                    return Err(wrong_types(&Type::Bool, &cond.type_of()));
                };
                self.scope.post(if *cond { then } else { otherwise });
            }
            Opcode::TypeAlias => {
                let name = r.read_name(&self.interner)?;
                let ty = decode_type(r, &self.interner)?;
                self.scope.declare(
                    Ident::Named(name),
                    SymbolFlags::CONST,
                    Type::alias(name, ty),
                    Value::Nil,
                )?;
            }
            Opcode::Cast => {
                let value = self.operand(r)?;
                let ty = decode_type(r, &self.interner)?;
                let cast = value.cast_to(&ty, &self.scope)?;
                self.scope.post(cast);
            }
            Opcode::Spread => {
                let value = self.operand(r)?;
                if value.length().is_none() {
                    return Err(unsupported_unary("...", &value.type_of()));
                }
                self.scope.post(Value::spreadable(value));
            }
            Opcode::Length => {
                let value = self.operand(r)?;
                let len = value
                    .length()
                    .ok_or_else(|| unsupported_unary("len", &value.type_of()))?;
                self.scope.post(Value::int(i64::try_from(len).unwrap_or(i64::MAX)));
            }
            Opcode::Get => {
                let iterable = self.operand(r)?;
                let index = index_of(&self.operand(r)?)?;
                self.scope.post(element_at(&iterable, index)?);
            }
            Opcode::Set => {
                let array = self.operand(r)?;
                let index = index_of(&self.operand(r)?)?;
                let value = self.operand(r)?;
                expect_array(&array)?.set(index, value, &self.scope)?;
            }
            Opcode::Append => {
                let array = self.operand(r)?;
                let value = self.operand(r)?;
                expect_array(&array)?.append(value, &self.scope)?;
            }
            Opcode::Remove => {
                let array = self.operand(r)?;
                let index = index_of(&self.operand(r)?)?;
                expect_array(&array)?.remove(index)?;
            }
            Opcode::AttrGet => {
                let target = self.operand(r)?;
                let name = r.read_name(&self.interner)?;
                let value = expect_struct(&target)?.get(name)?;
                self.scope.post(value);
            }
            Opcode::AttrSet => {
                let target = self.operand(r)?;
                let name = r.read_name(&self.interner)?;
                let value = self.operand(r)?;
                expect_struct(&target)?.set(name, value)?;
            }
            Opcode::MakeArray => {
                let element = decode_type(r, &self.interner)?;
                let count = r.read_u8()?;
                let mut items = Vec::with_capacity(usize::from(count));
                for _ in 0..count {
                    items.push(self.operand(r)?);
                }
                let array = if element.is_untyped() {
                    Value::array(items)
                } else {
                    let array = Value::typed_array(element, Vec::with_capacity(items.len()));
                    if let Value::Array(inner) = &array {
                        for item in items {
                            inner.append(item, &self.scope)?;
                        }
                    }
                    array
                };
                self.scope.post(array);
            }
            Opcode::MakeTuple => {
                let count = r.read_u8()?;
                let mut items = Vec::with_capacity(usize::from(count));
                for _ in 0..count {
                    items.push(self.operand(r)?);
                }
                self.scope.post(Value::tuple(items));
            }
            Opcode::MakeStruct => {
                let count = r.read_u8()?;
                let scope = self.scope.child(ScopeKind::Struct);
                let mut names = Vec::with_capacity(usize::from(count));
                for _ in 0..count {
                    let name = r.read_name(&self.interner)?;
                    let ty = decode_type(r, &self.interner)?;
                    let value = self.operand(r)?;
                    scope.declare(Ident::Named(name), SymbolFlags::PUBLIC, ty, value)?;
                    names.push(name);
                }
                self.scope.post(Value::Struct(StructValue::new(names, scope)));
            }
        }
        Ok(Flow::Next)
    }

    /// Read a `u16` block length and return the body's `[start, end)`.
    fn block_bounds(&self, r: &mut ByteReader<'_>) -> EvalResult<(usize, usize)> {
        let len = usize::from(r.read_u16()?);
        let start = r.position();
        let end = start + len;
        if end > self.code.len() {
            return Err(DecodeError::UnexpectedEnd {
                offset: start,
                wanted: end - self.code.len(),
            }
            .into());
        }
        Ok((start, end))
    }

    /// Decode a lambda instruction and skip over its body.
    fn lambda(&self, r: &mut ByteReader<'_>) -> EvalResult<LambdaValue> {
        let type_offset = r.position();
        let tag = r.peek_tag()?;
        let Type::Lambda(signature) = decode_type(r, &self.interner)? else {
            return Err(DecodeError::UnexpectedTag {
                tag,
                offset: type_offset,
                expected: "a lambda type",
            }
            .into());
        };

        let body = r.position();
        self.expect_block(r)?;
        let (_, end) = self.block_bounds(r)?;
        r.set_position(end);
        debug!(body, "lambda created");
        Ok(LambdaValue::bytecode(*signature, body, self.scope.clone()))
    }

    fn expect_block(&self, r: &mut ByteReader<'_>) -> EvalResult<()> {
        let offset = r.position();
        match r.read_opcode()? {
            Opcode::BlockBegin => Ok(()),
            other => Err(DecodeError::UnknownOpcode {
                byte: other.as_u8(),
                offset,
            }
            .into()),
        }
    }

    /// Invoke a callable with depth accounting.
    fn call(&mut self, callee: &Value, args: &[Value]) -> EvalResult {
        let Value::Lambda(callable) = callee.unwrap_any() else {
            return Err(not_callable(&callee.type_of()));
        };
        if let Some(max) = self.config.max_call_depth {
            if self.depth >= max {
                return Err(stack_overflow(max));
            }
        }

        self.depth += 1;
        let result = ensure_sufficient_stack(|| lambda::call(callable, args, self));
        self.depth -= 1;
        result
    }
}

impl BodyRunner for Interpreter {
    fn run_body(&mut self, offset: usize, scope: LocalScope<Scope>) -> EvalResult<Option<Value>> {
        let saved_pc = self.pc;
        let saved_scope = std::mem::replace(&mut self.scope, scope);
        let result = self.enter_body(offset);
        self.pc = saved_pc;
        self.scope = saved_scope;
        result
    }
}

impl Interpreter {
    fn enter_body(&mut self, offset: usize) -> EvalResult<Option<Value>> {
        let code = Rc::clone(&self.code);
        let mut reader = ByteReader::at(&code, offset);
        self.expect_block(&mut reader)?;
        let (start, end) = self.block_bounds(&mut reader)?;
        match self.run_block(start, end, None)? {
            Flow::Return(value) => Ok(Some(value)),
            Flow::Next | Flow::Leave => Ok(None),
            Flow::Jump(target) => Err(invalid_jump(target)),
        }
    }
}

impl Drop for Interpreter {
    /// Break lambda/scope cycles rooted in the global scope.
    fn drop(&mut self) {
        if let Ok(mut root) = self.root.try_borrow_mut() {
            root.release();
        }
    }
}

fn fresh_root(builtins: &BuiltinRegistry) -> EvalResult<LocalScope<Scope>> {
    let root = LocalScope::root();
    builtins.declare_into(&root)?;
    Ok(root)
}

fn read_target(r: &mut ByteReader<'_>) -> EvalResult<usize> {
    let offset = r.position();
    let target = r.read_u32()?;
    usize::try_from(target).map_err(|_| DecodeError::LengthOutOfRange { offset }.into())
}

fn index_of(value: &Value) -> EvalResult<i64> {
    match value.unwrap_any() {
        Value::Int(n) => Ok(n.to_i64().unwrap_or(i64::MAX)),
        other => Err(wrong_types(&Type::Int, &other.type_of())),
    }
}

fn element_at(iterable: &Value, index: i64) -> EvalResult {
    match iterable.unwrap_any() {
        Value::Array(array) => {
            let slot = array.checked_index(index)?;
            Ok(array.get(slot).unwrap_or(Value::Nil))
        }
        other => {
            let items = other
                .elements()
                .ok_or_else(|| unsupported_unary("[]", &other.type_of()))?;
            usize::try_from(index)
                .ok()
                .and_then(|slot| items.get(slot).cloned())
                .ok_or_else(|| index_out_of_bounds(index, items.len()))
        }
    }
}

fn expect_array(value: &Value) -> EvalResult<&ArrayValue> {
    match value.unwrap_any() {
        Value::Array(array) => Ok(array),
        other => Err(wrong_types(&Type::array(Type::Untyped), &other.type_of())),
    }
}

fn expect_struct(value: &Value) -> EvalResult<&StructValue> {
    match value.unwrap_any() {
        Value::Struct(st) => Ok(st),
        other => Err(wrong_types(
            &Type::Struct(StructType::wildcard()),
            &other.type_of(),
        )),
    }
}

#[cfg(test)]
mod tests;

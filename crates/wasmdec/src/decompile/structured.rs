//! Symbolic-stack expression lifting with control-flow reconstruction.
//!
//! One operand stack per function: every numeric instruction pops its
//! arity and pushes an expression tree, so by the time a value is
//! consumed by a statement (assignment, call, return) it renders as a
//! C-flavored expression. Wasm's implicit `block`/`loop`/`if` structure
//! is re-emitted as nested constructs; a block whose type produces a
//! value is modeled as a `__lambda_<label>` function whose return value
//! lands in a synthetic local.
//!
//! State (stack, branch frames, indent depth, instruction counter) is
//! threaded through the recursive decoder by exclusive reference.

use crate::disasm::{Disassembler, Function};
use crate::error::{DecodeError, Result};
use crate::module::ValueType;
use crate::opcode::{trunc_sat_mnemonic, Opcode};
use crate::reader::BinaryReader;

use super::expr::{Expression, Operand};
use super::Render;

/// Name of the synthetic local receiving block results.
const SYNTH_LOCAL: &str = "__dyn_local_l";

/// An active `block` / `loop` / `if` frame. The innermost frame is the
/// last entry; `br n` walks `n` frames up from there.
#[derive(Debug)]
struct Branch {
    label: String,
    block_type: ValueType,
    is_loop: bool,
}

/// Per-function decoder state.
#[derive(Debug)]
struct FuncState {
    stack: Vec<Operand>,
    branches: Vec<Branch>,
    depth: usize,
    counter: u32,
    inside_if: bool,
}

/// What ended a decoded sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    End,
    Else,
}

/// The structured renderer.
#[derive(Debug, Default)]
pub struct StructuredDecompiler {
    output: String,
}

impl StructuredDecompiler {
    pub fn new() -> Self {
        Self::default()
    }

    fn append_line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.output.push_str("    ");
        }
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn blank_line(&mut self) {
        self.output.push('\n');
    }

    fn pop(&self, state: &mut FuncState) -> Result<Operand> {
        state
            .stack
            .pop()
            .ok_or(DecodeError::InvalidState("operand stack underflow"))
    }

    /// Pop twice, handing back the pair in source order: Wasm pushes
    /// the left operand first, so the second pop is the left-hand side.
    fn pop_reverse(&self, state: &mut FuncState) -> Result<(Operand, Operand)> {
        let rhs = self.pop(state)?;
        let lhs = self.pop(state)?;
        Ok((lhs, rhs))
    }

    /// Tolerant, type-matching pop: discards stray entries from the top
    /// until one satisfies `ty`. Runs dry to a void marker.
    fn pop_match_type(&self, state: &mut FuncState, ty: ValueType) -> Operand {
        if ty == ValueType::Void {
            return Operand::Void;
        }
        while let Some(operand) = state.stack.pop() {
            if operand.matches_type(ty) {
                return operand;
            }
        }
        Operand::Void
    }

    /// Lower one function. The returned value is whatever the operand
    /// stack still holds after the final `end`.
    fn lower_function(&mut self, disasm: &Disassembler, func: &Function) -> Result<Vec<Operand>> {
        let body = func
            .body
            .as_deref()
            .ok_or(DecodeError::InvalidState("imported function has no body"))?;

        let params: Vec<&str> = func.params().map(|p| p.name.as_str()).collect();
        let mut header = format!("function {}({})", func.name, params.join(", "));
        if let Some(exported) = &func.exported_name {
            header.push_str(&format!(" /* export: \"{exported}\" */"));
        }
        header.push_str(" {");
        self.append_line(0, &header);

        let mut any_locals = false;
        for local in func.locals.iter().filter(|l| !l.is_parameter) {
            let zero = match local.ty {
                ValueType::I32 | ValueType::I64 => "0",
                ValueType::F32 | ValueType::F64 => "0.0F",
                other => return Err(DecodeError::UnexpectedLocalType(other.name())),
            };
            self.append_line(1, &format!("let {} = {};", local.name, zero));
            any_locals = true;
        }
        if any_locals {
            self.blank_line();
        }

        let mut state = FuncState {
            stack: Vec::new(),
            branches: vec![Branch {
                label: func.name.clone(),
                block_type: func.return_type,
                is_loop: false,
            }],
            depth: 1,
            counter: 0,
            inside_if: false,
        };

        let mut r = BinaryReader::new(body);
        self.decode_sequence(&mut r, &mut state, disasm, func)?;

        self.append_line(0, "}");
        self.blank_line();
        Ok(state.stack)
    }

    /// Decode opcodes until the sequence's own terminator.
    fn decode_sequence(
        &mut self,
        r: &mut BinaryReader<'_>,
        state: &mut FuncState,
        disasm: &Disassembler,
        func: &Function,
    ) -> Result<Terminator> {
        loop {
            let op = Opcode::from_byte(r.read_u8()?)?;
            state.counter += 1;
            match op {
                Opcode::End => {
                    if let Some(branch) = state.branches.last() {
                        if has_result(branch.block_type) && !state.stack.is_empty() {
                            let top = self.pop(state)?;
                            self.append_line(state.depth, &format!("return {top};"));
                        }
                    }
                    return Ok(Terminator::End);
                }
                Opcode::Else => {
                    if !state.inside_if {
                        return Err(DecodeError::InvalidOpcode(Opcode::Else.byte()));
                    }
                    return Ok(Terminator::Else);
                }

                // Traps and nops leave no trace in the pseudocode.
                Opcode::Unreachable | Opcode::Nop => {}

                Opcode::Block => self.lower_block(r, state, disasm, func)?,
                Opcode::Loop => self.lower_loop(r, state, disasm, func)?,
                Opcode::If => self.lower_if(r, state, disasm, func)?,

                Opcode::Br => {
                    let n = r.read_uleb128()?;
                    self.branch_statement(state, n, state.depth)?;
                }
                Opcode::BrIf => {
                    let n = r.read_uleb128()?;
                    let condition = self.pop(state)?;
                    self.append_line(state.depth, &format!("if ({condition})"));
                    self.branch_statement(state, n, state.depth + 1)?;
                }
                Opcode::BrTable => {
                    let count = r.read_uleb128()?;
                    let mut targets = Vec::with_capacity(count as usize);
                    for _ in 0..count {
                        targets.push(r.read_uleb128()?);
                    }
                    let default = r.read_uleb128()?;
                    let selector = self.pop(state)?;

                    self.append_line(state.depth, &format!("switch ({selector}) {{"));
                    for (i, target) in targets.iter().enumerate() {
                        self.append_line(state.depth, &format!("case {i}:"));
                        self.branch_statement(state, *target, state.depth + 1)?;
                    }
                    self.append_line(state.depth, "default:");
                    self.branch_statement(state, default, state.depth + 1)?;
                    self.append_line(state.depth, "}");
                }
                Opcode::Return => {
                    let value = self.pop_match_type(state, func.return_type);
                    let rendered = value.to_string();
                    if rendered.is_empty() {
                        self.append_line(state.depth, "return;");
                    } else {
                        self.append_line(state.depth, &format!("return {rendered};"));
                    }
                }

                Opcode::Call => self.lower_call(r, state, disasm)?,
                Opcode::CallIndirect => self.lower_call_indirect(r, state, disasm)?,

                Opcode::Drop => {
                    let value = self.pop(state)?;
                    if value.is_function_call() {
                        self.append_line(state.depth, &format!("{value};"));
                    }
                }
                Opcode::Select => {
                    let condition = self.pop(state)?;
                    let first = self.pop(state)?;
                    let second = self.pop(state)?;
                    state
                        .stack
                        .push(Operand::expr(Expression::ternary(condition, first, second)));
                }

                Opcode::GetLocal => {
                    let local = local_at(func, r.read_uleb128()?)?;
                    state.stack.push(Operand::Local {
                        name: local.name.clone(),
                        ty: local.ty,
                    });
                }
                Opcode::SetLocal => {
                    let local = local_at(func, r.read_uleb128()?)?;
                    let value = self.pop(state)?;
                    self.append_line(state.depth, &format!("{} = {value};", local.name));
                }
                Opcode::TeeLocal => {
                    let local = local_at(func, r.read_uleb128()?)?;
                    let value = self.pop(state)?;
                    self.append_line(state.depth, &format!("{} = {value};", local.name));
                    state.stack.push(Operand::Local {
                        name: local.name.clone(),
                        ty: local.ty,
                    });
                }
                Opcode::GetGlobal => {
                    let global = global_at(disasm, r.read_uleb128()?)?;
                    state.stack.push(Operand::Global {
                        name: global.name.clone(),
                    });
                }
                Opcode::SetGlobal => {
                    let global = global_at(disasm, r.read_uleb128()?)?;
                    let value = self.pop(state)?;
                    self.append_line(state.depth, &format!("{} = {value};", global.name));
                }

                op if is_load(op) => {
                    let flags = r.read_uleb128()?;
                    let offset = r.read_uleb128()?;
                    let address = self.pop(state)?;
                    let target = offset_address(address, offset);
                    state.stack.push(Operand::expr(Expression::call(
                        "mem_get_value",
                        vec![target, Operand::I32(flags as i32)],
                    )));
                }
                op if is_store(op) => {
                    let flags = r.read_uleb128()?;
                    let offset = r.read_uleb128()?;
                    let value = self.pop(state)?;
                    let address = self.pop(state)?;
                    let target = offset_address(address, offset);
                    self.append_line(
                        state.depth,
                        &format!("mem_set_value({target}, {value}, {flags});"),
                    );
                }
                Opcode::CurrentMemory => {
                    let reserved = r.read_u8()?;
                    state.stack.push(Operand::expr(Expression::call(
                        "__getmemsize",
                        vec![Operand::I32(i32::from(reserved))],
                    )));
                }
                Opcode::GrowMemory => {
                    let reserved = r.read_u8()?;
                    state.stack.push(Operand::expr(Expression::call(
                        "__growmemsize",
                        vec![Operand::I32(i32::from(reserved))],
                    )));
                }

                Opcode::I32Const => state.stack.push(Operand::I32(r.read_sleb128()?)),
                Opcode::I64Const => state.stack.push(Operand::I64(r.read_sleb128_64()?)),
                Opcode::F32Const => state.stack.push(Operand::F32(r.read_f32()?)),
                Opcode::F64Const => state.stack.push(Operand::F64(r.read_f64()?)),

                Opcode::I32Eqz => {
                    let value = self.pop(state)?;
                    state.stack.push(Operand::expr(Expression::binary(
                        "==",
                        value,
                        Operand::I32(0),
                    )));
                }
                Opcode::I64Eqz => {
                    let value = self.pop(state)?;
                    state.stack.push(Operand::expr(Expression::binary(
                        "==",
                        value,
                        Operand::I64(0),
                    )));
                }

                op if counting_call(op).is_some() => {
                    let value = self.pop(state)?;
                    state.stack.push(Operand::expr(Expression::call(
                        counting_call(op).unwrap_or_default(),
                        vec![value],
                    )));
                }
                op if rotate_call(op).is_some() => {
                    let (lhs, rhs) = self.pop_reverse(state)?;
                    state.stack.push(Operand::expr(Expression::call(
                        rotate_call(op).unwrap_or_default(),
                        vec![lhs, rhs],
                    )));
                }
                Opcode::F32Neg | Opcode::F64Neg => {
                    let value = self.pop(state)?;
                    state
                        .stack
                        .push(Operand::expr(Expression::unary("-", value)));
                }
                op if float_unary_call(op).is_some() => {
                    let value = self.pop(state)?;
                    state.stack.push(Operand::expr(Expression::call(
                        float_unary_call(op).unwrap_or_default(),
                        vec![value],
                    )));
                }
                op if float_binary_call(op).is_some() => {
                    let (lhs, rhs) = self.pop_reverse(state)?;
                    state.stack.push(Operand::expr(Expression::call(
                        float_binary_call(op).unwrap_or_default(),
                        vec![lhs, rhs],
                    )));
                }
                op if binary_symbol(op).is_some() => {
                    let (lhs, rhs) = self.pop_reverse(state)?;
                    state.stack.push(Operand::expr(Expression::binary(
                        binary_symbol(op).unwrap_or_default(),
                        lhs,
                        rhs,
                    )));
                }

                // Width and representation changes carry the operand
                // through untouched.
                op if is_conversion(op) => {}
                Opcode::TruncSatPrefix => {
                    trunc_sat_mnemonic(r.read_u8()?)?;
                }

                other => return Err(DecodeError::InvalidOpcode(other.byte())),
            }
        }
    }

    fn lower_block(
        &mut self,
        r: &mut BinaryReader<'_>,
        state: &mut FuncState,
        disasm: &Disassembler,
        func: &Function,
    ) -> Result<()> {
        let block_type = ValueType::from_wire(r.read_u8()?)?;
        let label = format!("block_{}", state.counter);
        state.branches.push(Branch {
            label: label.clone(),
            block_type,
            is_loop: false,
        });

        self.append_line(state.depth, &format!("function __lambda_{label}() {{"));
        state.depth += 1;
        let was_inside_if = std::mem::replace(&mut state.inside_if, false);
        let terminator = self.decode_sequence(r, state, disasm, func)?;
        state.inside_if = was_inside_if;
        state.depth -= 1;
        self.append_line(state.depth, "}");
        if terminator == Terminator::Else {
            return Err(DecodeError::InvalidOpcode(Opcode::Else.byte()));
        }

        if has_result(block_type) {
            let result = Operand::Local {
                name: SYNTH_LOCAL.to_string(),
                ty: block_type,
            };
            let assign = Expression::binary(
                "=",
                result.clone(),
                Operand::expr(Expression::call(format!("__lambda_{label}"), Vec::new())),
            );
            self.append_line(state.depth, &format!("{assign};"));
            // Both consumers of the block result observe the value.
            state.stack.push(result.clone());
            state.stack.push(result);
        } else {
            self.append_line(state.depth, &format!("__lambda_{label}();"));
        }

        remove_branch(state, &label);
        Ok(())
    }

    fn lower_loop(
        &mut self,
        r: &mut BinaryReader<'_>,
        state: &mut FuncState,
        disasm: &Disassembler,
        func: &Function,
    ) -> Result<()> {
        let block_type = ValueType::from_wire(r.read_u8()?)?;
        let label = format!("loop_{}", state.counter);
        state.branches.push(Branch {
            label: label.clone(),
            block_type,
            is_loop: true,
        });

        let wrapped = has_result(block_type);
        if wrapped {
            self.append_line(state.depth, &format!("function __lambda_{label}() {{"));
            state.depth += 1;
        }
        self.append_line(state.depth, "while (true) {");
        state.depth += 1;
        let was_inside_if = std::mem::replace(&mut state.inside_if, false);
        let terminator = self.decode_sequence(r, state, disasm, func)?;
        state.inside_if = was_inside_if;
        self.append_line(state.depth, "break;");
        state.depth -= 1;
        self.append_line(state.depth, "}");
        if terminator == Terminator::Else {
            return Err(DecodeError::InvalidOpcode(Opcode::Else.byte()));
        }

        if wrapped {
            state.depth -= 1;
            self.append_line(state.depth, "}");
            let result = Operand::Local {
                name: SYNTH_LOCAL.to_string(),
                ty: block_type,
            };
            let assign = Expression::binary(
                "=",
                result.clone(),
                Operand::expr(Expression::call(format!("__lambda_{label}"), Vec::new())),
            );
            self.append_line(state.depth, &format!("{assign};"));
            state.stack.push(result.clone());
            state.stack.push(result);
        }

        remove_branch(state, &label);
        Ok(())
    }

    fn lower_if(
        &mut self,
        r: &mut BinaryReader<'_>,
        state: &mut FuncState,
        disasm: &Disassembler,
        func: &Function,
    ) -> Result<()> {
        let block_type = ValueType::from_wire(r.read_u8()?)?;
        let label = format!("block_{}", state.counter);
        let condition = self.pop(state)?;
        state.branches.push(Branch {
            label: label.clone(),
            block_type,
            is_loop: false,
        });

        self.append_line(state.depth, &format!("if ({condition}) {{"));
        state.depth += 1;
        let was_inside_if = std::mem::replace(&mut state.inside_if, true);
        let terminator = self.decode_sequence(r, state, disasm, func)?;
        state.inside_if = was_inside_if;
        state.depth -= 1;

        if terminator == Terminator::Else {
            self.append_line(state.depth, "} else {");
            state.depth += 1;
            let was_inside_if = std::mem::replace(&mut state.inside_if, false);
            self.decode_sequence(r, state, disasm, func)?;
            state.inside_if = was_inside_if;
            state.depth -= 1;
        }
        self.append_line(state.depth, "}");

        remove_branch(state, &label);
        Ok(())
    }

    /// The statement a `br n` stands for: `continue` into a loop frame,
    /// a value-carrying or bare `return` otherwise.
    fn branch_statement(&mut self, state: &mut FuncState, n: u32, depth: usize) -> Result<()> {
        if state.branches.len() == 1 {
            let block_type = state.branches[0].block_type;
            return self.emit_branch_return(state, block_type, depth);
        }
        let index = state
            .branches
            .len()
            .checked_sub(1 + n as usize)
            .ok_or(DecodeError::InvalidState("branch depth out of range"))?;
        if state.branches[index].is_loop {
            self.append_line(depth, "continue;");
            Ok(())
        } else {
            let block_type = state.branches[index].block_type;
            self.emit_branch_return(state, block_type, depth)
        }
    }

    fn emit_branch_return(
        &mut self,
        state: &mut FuncState,
        block_type: ValueType,
        depth: usize,
    ) -> Result<()> {
        if has_result(block_type) {
            let top = self.pop(state)?;
            self.append_line(depth, &format!("return {top};"));
        } else {
            self.append_line(depth, "return;");
        }
        Ok(())
    }

    fn lower_call(
        &mut self,
        r: &mut BinaryReader<'_>,
        state: &mut FuncState,
        disasm: &Disassembler,
    ) -> Result<()> {
        let index = r.read_uleb128()?;
        let callee = disasm
            .functions()
            .get(index as usize)
            .ok_or(DecodeError::InvalidState("call target out of range"))?;

        let param_types: Vec<ValueType> = callee.params().map(|p| p.ty).collect();
        let mut args: Vec<Operand> = param_types
            .iter()
            .rev()
            .map(|ty| self.pop_match_type(state, *ty))
            .collect();
        args.reverse();

        let call = Expression::call(callee.name.clone(), args);
        if callee.return_type == ValueType::Void {
            self.append_line(state.depth, &format!("{call};"));
        } else {
            state.stack.push(Operand::expr(call));
        }
        Ok(())
    }

    fn lower_call_indirect(
        &mut self,
        r: &mut BinaryReader<'_>,
        state: &mut FuncState,
        disasm: &Disassembler,
    ) -> Result<()> {
        let type_index = r.read_uleb128()?;
        let _reserved = r.read_u8()?;
        let func_type = disasm
            .types()
            .get(type_index as usize)
            .ok_or(DecodeError::InvalidState("type index out of range"))?;
        let param_types = func_type.params.clone();
        let return_type = func_type.effective_return();

        let table_index = self.pop(state)?;
        let mut args: Vec<Operand> = param_types
            .iter()
            .rev()
            .map(|ty| self.pop_match_type(state, *ty))
            .collect();
        args.reverse();

        let call = Expression::call_indirect(table_index, args);
        if return_type == ValueType::Void {
            self.append_line(state.depth, &format!("{call};"));
        } else {
            state.stack.push(Operand::expr(call));
        }
        Ok(())
    }
}

impl Render for StructuredDecompiler {
    fn prepare(&mut self, disasm: &Disassembler) -> Result<()> {
        for global in disasm.globals() {
            let keyword = if global.is_const { "const" } else { "let" };
            self.append_line(
                0,
                &format!(
                    "{keyword} {} = {}; /* type: {} */",
                    global.name, global.value, global.type_name
                ),
            );
        }
        if !disasm.globals().is_empty() {
            self.blank_line();
        }
        Ok(())
    }

    fn decompile_function(&mut self, disasm: &Disassembler, func: &Function) -> Result<()> {
        if func.body.is_none() {
            return Ok(()); // imports have nothing to lift
        }
        self.lower_function(disasm, func).map(|_| ())
    }

    fn build_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

fn has_result(ty: ValueType) -> bool {
    !matches!(ty, ValueType::EmptyBlock | ValueType::Void)
}

fn remove_branch(state: &mut FuncState, label: &str) {
    if let Some(position) = state.branches.iter().rposition(|b| b.label == label) {
        state.branches.remove(position);
    }
}

fn local_at<'f>(func: &'f Function, index: u32) -> Result<&'f crate::disasm::Local> {
    func.locals
        .get(index as usize)
        .ok_or(DecodeError::InvalidState("local index out of range"))
}

fn global_at<'d>(disasm: &'d Disassembler, index: u32) -> Result<&'d crate::disasm::Global> {
    disasm
        .globals()
        .get(index as usize)
        .ok_or(DecodeError::InvalidState("global index out of range"))
}

/// `addr` or `addr + offset`, omitting `+ 0`.
fn offset_address(address: Operand, offset: u32) -> Operand {
    if offset == 0 {
        address
    } else {
        Operand::expr(Expression::binary("+", address, Operand::I32(offset as i32)))
    }
}

fn is_load(op: Opcode) -> bool {
    (Opcode::I32Load.byte()..=Opcode::I64Load32U.byte()).contains(&op.byte())
}

fn is_store(op: Opcode) -> bool {
    (Opcode::I32Store.byte()..=Opcode::I64Store32.byte()).contains(&op.byte())
}

fn is_conversion(op: Opcode) -> bool {
    (Opcode::I32WrapI64.byte()..=Opcode::F64ReinterpretI64.byte()).contains(&op.byte())
}

fn counting_call(op: Opcode) -> Option<&'static str> {
    match op {
        Opcode::I32Clz => Some("int32_count_leading_zero_bits"),
        Opcode::I32Ctz => Some("int32_count_trailing_zero_bits"),
        Opcode::I32Popcnt => Some("int32_count_one_bits"),
        Opcode::I64Clz => Some("int64_count_leading_zero_bits"),
        Opcode::I64Ctz => Some("int64_count_trailing_zero_bits"),
        Opcode::I64Popcnt => Some("int64_count_one_bits"),
        _ => None,
    }
}

fn rotate_call(op: Opcode) -> Option<&'static str> {
    match op {
        Opcode::I32Rotl | Opcode::I64Rotl => Some("int_rotl"),
        Opcode::I32Rotr | Opcode::I64Rotr => Some("int_rotr"),
        _ => None,
    }
}

fn float_unary_call(op: Opcode) -> Option<&'static str> {
    match op {
        Opcode::F32Abs | Opcode::F64Abs => Some("__abs"),
        Opcode::F32Ceil | Opcode::F64Ceil => Some("__ceil"),
        Opcode::F32Floor | Opcode::F64Floor => Some("__floor"),
        Opcode::F32Trunc | Opcode::F64Trunc => Some("__trunc"),
        Opcode::F32Nearest | Opcode::F64Nearest => Some("__nearest"),
        Opcode::F32Sqrt | Opcode::F64Sqrt => Some("__sqrt"),
        _ => None,
    }
}

fn float_binary_call(op: Opcode) -> Option<&'static str> {
    match op {
        Opcode::F32Min | Opcode::F64Min => Some("__min"),
        Opcode::F32Max | Opcode::F64Max => Some("__max"),
        Opcode::F32Copysign | Opcode::F64Copysign => Some("__copysign"),
        _ => None,
    }
}

fn binary_symbol(op: Opcode) -> Option<&'static str> {
    use Opcode::*;
    Some(match op {
        I32Add | I64Add | F32Add | F64Add => "+",
        I32Sub | I64Sub | F32Sub | F64Sub => "-",
        I32Mul | I64Mul | F32Mul | F64Mul => "*",
        I32DivS | I32DivU | I64DivS | I64DivU | F32Div | F64Div => "/",
        I32RemS | I32RemU | I64RemS | I64RemU => "%",
        I32And | I64And => "&",
        I32Or | I64Or => "|",
        I32Xor | I64Xor => "^",
        I32Shl | I64Shl => "<<",
        I32ShrS | I32ShrU | I64ShrS | I64ShrU => ">>",
        I32Eq | I64Eq | F32Eq | F64Eq => "==",
        I32Ne | I64Ne | F32Ne | F64Ne => "!=",
        I32LtS | I32LtU | I64LtS | I64LtU | F32Lt | F64Lt => "<",
        I32GtS | I32GtU | I64GtS | I64GtU | F32Gt | F64Gt => ">",
        I32LeS | I32LeU | I64LeS | I64LeU | F32Le | F64Le => "<=",
        I32GeS | I32GeU | I64GeS | I64GeU | F32Ge | F64Ge => ">=",
        _ => return None,
    })
}

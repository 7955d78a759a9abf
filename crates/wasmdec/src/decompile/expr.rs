//! Symbolic operands for the structured renderer.
//!
//! While lifting stack-machine bytecode, every stack slot holds one of
//! these: a literal, a named local or global, or an expression tree
//! folded from earlier slots. Rendering is plain text via `Display`.

use std::fmt;

use crate::module::ValueType;

/// One slot of the symbolic operand stack.
#[derive(Debug, Clone)]
pub enum Operand {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Local { name: String, ty: ValueType },
    Global { name: String },
    Expr(Box<Expression>),
    /// Renders as the empty string; the result of a void-typed pop.
    Void,
}

impl Operand {
    pub fn expr(expression: Expression) -> Self {
        Operand::Expr(Box::new(expression))
    }

    /// Whether this operand satisfies a type-matching pop for `ty`:
    /// a local of exactly that type, any expression, or a literal of
    /// the same numeric class.
    pub fn matches_type(&self, ty: ValueType) -> bool {
        match self {
            Operand::I32(_) => ValueType::I32.equivalent(ty),
            Operand::I64(_) => ValueType::I64.equivalent(ty),
            Operand::F32(_) => ValueType::F32.equivalent(ty),
            Operand::F64(_) => ValueType::F64.equivalent(ty),
            Operand::Local { ty: local_ty, .. } => *local_ty == ty,
            Operand::Expr(_) => true,
            Operand::Global { .. } | Operand::Void => false,
        }
    }

    /// True for expressions with observable side effects when dropped.
    pub fn is_function_call(&self) -> bool {
        matches!(
            self,
            Operand::Expr(e) if e.kind == ExprKind::FunctionCall
        )
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::I32(v) => write!(f, "{v}"),
            Operand::I64(v) => write!(f, "{v}"),
            Operand::F32(v) => write!(f, "{v:?}"),
            Operand::F64(v) => write!(f, "{v:?}"),
            Operand::Local { name, .. } => f.write_str(name),
            Operand::Global { name } => f.write_str(name),
            Operand::Expr(e) => e.fmt(f),
            Operand::Void => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprKind {
    Unary,
    Binary,
    Ternary,
    FunctionCall,
}

/// An expression tree folded from stack slots.
///
/// `op` is the operator or callee name; a `FunctionCall` without one
/// treats its first operand as the callee (indirect calls).
#[derive(Debug, Clone)]
pub struct Expression {
    pub op: Option<String>,
    pub kind: ExprKind,
    pub operands: Vec<Operand>,
}

impl Expression {
    pub fn unary(op: &str, operand: Operand) -> Self {
        Self {
            op: Some(op.to_string()),
            kind: ExprKind::Unary,
            operands: vec![operand],
        }
    }

    pub fn binary(op: &str, lhs: Operand, rhs: Operand) -> Self {
        Self {
            op: Some(op.to_string()),
            kind: ExprKind::Binary,
            operands: vec![lhs, rhs],
        }
    }

    pub fn ternary(condition: Operand, when_true: Operand, when_false: Operand) -> Self {
        Self {
            op: None,
            kind: ExprKind::Ternary,
            operands: vec![condition, when_true, when_false],
        }
    }

    pub fn call(callee: impl Into<String>, args: Vec<Operand>) -> Self {
        Self {
            op: Some(callee.into()),
            kind: ExprKind::FunctionCall,
            operands: args,
        }
    }

    /// An indirect call: the callee is the first operand.
    pub fn call_indirect(callee: Operand, args: Vec<Operand>) -> Self {
        let mut operands = vec![callee];
        operands.extend(args);
        Self {
            op: None,
            kind: ExprKind::FunctionCall,
            operands,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.op.as_deref().unwrap_or("");
        match self.kind {
            ExprKind::Unary => write!(f, "{op}{}", self.operands[0]),
            ExprKind::Binary => {
                write!(f, "{} {op} {}", self.operands[0], self.operands[1])
            }
            ExprKind::Ternary => write!(
                f,
                "{} ? {} : {}",
                self.operands[0], self.operands[1], self.operands[2]
            ),
            ExprKind::FunctionCall => {
                let (callee, args) = match &self.op {
                    Some(name) => (name.clone(), &self.operands[..]),
                    None => (self.operands[0].to_string(), &self.operands[1..]),
                };
                write!(f, "{callee}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    arg.fmt(f)?;
                }
                f.write_str(")")
            }
        }
    }
}

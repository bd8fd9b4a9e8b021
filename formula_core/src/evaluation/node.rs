//! Expression tree
//!
//! Every node carries the character offset of the token it was built from.
//! `validate` type checks children before the node's own rule, `result_type`
//! computes the static type, and `execute` evaluates. Failures leave a node
//! tagged with the innermost offset that applies.

use std::fmt;

use crate::evaluation::binding::{FunctionCall, Identifier, Member};
use crate::evaluation::operators;
use crate::evaluation::{EvalError, EvalResult};
use crate::resolution::Resolver;
use crate::tokens::RelationalOperator;
use crate::types::{FormulaType, Value};

#[derive(Debug)]
pub struct Operands {
    pub left: Box<Node>,
    pub right: Box<Node>,
}

impl Operands {
    pub fn new(left: Node, right: Node) -> Self {
        Self {
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

#[derive(Debug)]
pub enum NodeKind {
    Or(Operands),
    Xor(Operands),
    And(Operands),
    Not(Box<Node>),
    Comparison {
        left: Box<Node>,
        operator: RelationalOperator,
        right: Box<Node>,
    },
    Concatenation(Operands),
    Addition(Operands),
    Subtraction(Operands),
    Mod(Operands),
    IntegerDivision(Operands),
    Multiplication(Operands),
    Division(Operands),
    Negation(Box<Node>),
    Constant(Value),
    Dot {
        target: Box<Node>,
        member: Member,
    },
    Identifier(Identifier),
    FunctionCall(FunctionCall),
}

#[derive(Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub offset: usize,
}

impl Node {
    pub fn new(kind: NodeKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    pub fn constant(value: Value, offset: usize) -> Self {
        Self::new(NodeKind::Constant(value), offset)
    }

    pub fn identifier(name: impl Into<String>, offset: usize) -> Self {
        Self::new(NodeKind::Identifier(Identifier::new(name)), offset)
    }

    pub fn function_call(name: impl Into<String>, arguments: Vec<Node>, offset: usize) -> Self {
        Self::new(
            NodeKind::FunctionCall(FunctionCall::new(name, arguments)),
            offset,
        )
    }

    /// Type check this subtree without evaluating it
    pub fn validate(&self, resolver: &dyn Resolver) -> EvalResult<()> {
        self.check(resolver)
            .map_err(|error| error.with_offset(self.offset))
    }

    /// Static type of this subtree
    pub fn result_type(&self, resolver: &dyn Resolver) -> EvalResult<FormulaType> {
        self.infer(resolver)
            .map_err(|error| error.with_offset(self.offset))
    }

    /// Evaluate this subtree
    pub fn execute(&self, resolver: &dyn Resolver) -> EvalResult<Value> {
        self.evaluate(resolver)
            .map_err(|error| error.with_offset(self.offset))
    }

    fn check(&self, resolver: &dyn Resolver) -> EvalResult<()> {
        match &self.kind {
            NodeKind::Or(ops) | NodeKind::Xor(ops) | NodeKind::And(ops) => {
                Self::check_operands(resolver, ops, operators::check_boolean)
            }
            NodeKind::Not(child) => {
                child.validate(resolver)?;
                operators::check_boolean(&child.result_type(resolver)?)
            }
            NodeKind::Comparison {
                left,
                operator,
                right,
            } => {
                left.validate(resolver)?;
                right.validate(resolver)?;
                operators::check_comparable(*operator, &left.result_type(resolver)?)?;
                operators::check_comparable(*operator, &right.result_type(resolver)?)
            }
            NodeKind::Concatenation(ops) => {
                ops.left.validate(resolver)?;
                ops.right.validate(resolver)
            }
            NodeKind::Addition(ops) => Self::check_operands(resolver, ops, operators::check_addend),
            NodeKind::Subtraction(ops)
            | NodeKind::Multiplication(ops)
            | NodeKind::Division(ops) => {
                Self::check_operands(resolver, ops, operators::check_numeric)
            }
            NodeKind::Mod(ops) | NodeKind::IntegerDivision(ops) => {
                Self::check_operands(resolver, ops, operators::check_integer)
            }
            NodeKind::Negation(child) => {
                child.validate(resolver)?;
                operators::check_numeric(&child.result_type(resolver)?)
            }
            NodeKind::Constant(_) => Ok(()),
            NodeKind::Dot { target, member } => {
                target.validate(resolver)?;
                member.validate(resolver, &target.result_type(resolver)?)
            }
            NodeKind::Identifier(identifier) => identifier.result_type(resolver).map(|_| ()),
            NodeKind::FunctionCall(call) => call.validate(resolver, None),
        }
    }

    fn check_operands(
        resolver: &dyn Resolver,
        ops: &Operands,
        rule: fn(&FormulaType) -> EvalResult<()>,
    ) -> EvalResult<()> {
        ops.left.validate(resolver)?;
        ops.right.validate(resolver)?;
        rule(&ops.left.result_type(resolver)?)?;
        rule(&ops.right.result_type(resolver)?)
    }

    fn infer(&self, resolver: &dyn Resolver) -> EvalResult<FormulaType> {
        match &self.kind {
            NodeKind::Or(_)
            | NodeKind::Xor(_)
            | NodeKind::And(_)
            | NodeKind::Not(_)
            | NodeKind::Comparison { .. } => Ok(FormulaType::Boolean),
            NodeKind::Concatenation(_) => Ok(FormulaType::Text),
            NodeKind::Addition(ops) => Ok(operators::addition_type(
                &ops.left.result_type(resolver)?,
                &ops.right.result_type(resolver)?,
            )),
            NodeKind::Subtraction(ops) | NodeKind::Multiplication(ops) => {
                Ok(operators::numeric_type(
                    &ops.left.result_type(resolver)?,
                    &ops.right.result_type(resolver)?,
                ))
            }
            NodeKind::Division(_) => Ok(FormulaType::Double),
            NodeKind::Mod(_) | NodeKind::IntegerDivision(_) => Ok(FormulaType::Integer),
            NodeKind::Negation(child) => match child.result_type(resolver)? {
                FormulaType::Integer => Ok(FormulaType::Integer),
                _ => Ok(FormulaType::Double),
            },
            NodeKind::Constant(value) => Ok(value.formula_type()),
            NodeKind::Dot { target, member } => {
                member.result_type(resolver, &target.result_type(resolver)?)
            }
            NodeKind::Identifier(identifier) => identifier.result_type(resolver),
            NodeKind::FunctionCall(call) => call.result_type(resolver, None),
        }
    }

    fn evaluate(&self, resolver: &dyn Resolver) -> EvalResult<Value> {
        match &self.kind {
            NodeKind::Or(ops) => {
                if operators::as_boolean(&ops.left.execute(resolver)?)? {
                    return Ok(Value::Boolean(true));
                }
                Ok(Value::Boolean(operators::as_boolean(
                    &ops.right.execute(resolver)?,
                )?))
            }
            NodeKind::And(ops) => {
                if !operators::as_boolean(&ops.left.execute(resolver)?)? {
                    return Ok(Value::Boolean(false));
                }
                Ok(Value::Boolean(operators::as_boolean(
                    &ops.right.execute(resolver)?,
                )?))
            }
            NodeKind::Xor(ops) => {
                let left = operators::as_boolean(&ops.left.execute(resolver)?)?;
                let right = operators::as_boolean(&ops.right.execute(resolver)?)?;
                Ok(Value::Boolean(left ^ right))
            }
            NodeKind::Not(child) => Ok(Value::Boolean(!operators::as_boolean(
                &child.execute(resolver)?,
            )?)),
            NodeKind::Comparison {
                left,
                operator,
                right,
            } => {
                let left = left.execute(resolver)?;
                let right = right.execute(resolver)?;
                operators::relate(*operator, &left, &right).map(Value::Boolean)
            }
            NodeKind::Concatenation(ops) => {
                let (left, right) = Self::execute_operands(resolver, ops)?;
                Ok(operators::concatenate(&left, &right))
            }
            NodeKind::Addition(ops) => Self::apply(resolver, ops, operators::add),
            NodeKind::Subtraction(ops) => Self::apply(resolver, ops, operators::subtract),
            NodeKind::Multiplication(ops) => Self::apply(resolver, ops, operators::multiply),
            NodeKind::Division(ops) => Self::apply(resolver, ops, operators::divide),
            NodeKind::IntegerDivision(ops) => {
                Self::apply(resolver, ops, operators::integer_divide)
            }
            NodeKind::Mod(ops) => Self::apply(resolver, ops, operators::modulo),
            NodeKind::Negation(child) => operators::negate(&child.execute(resolver)?),
            NodeKind::Constant(value) => Ok(value.clone()),
            NodeKind::Dot { target, member } => {
                let value = target.execute(resolver)?;
                if value.is_nothing() {
                    return Err(EvalError::null_member_access(
                        Self::diagnostic_name(target, resolver),
                        member,
                    ));
                }
                member.execute(resolver, &value)
            }
            NodeKind::Identifier(identifier) => identifier.execute(resolver),
            NodeKind::FunctionCall(call) => call.execute(resolver, None),
        }
    }

    fn execute_operands(resolver: &dyn Resolver, ops: &Operands) -> EvalResult<(Value, Value)> {
        let left = ops.left.execute(resolver)?;
        let right = ops.right.execute(resolver)?;
        Ok((left, right))
    }

    fn apply(
        resolver: &dyn Resolver,
        ops: &Operands,
        operation: fn(&Value, &Value) -> EvalResult<Value>,
    ) -> EvalResult<Value> {
        let (left, right) = Self::execute_operands(resolver, ops)?;
        operation(&left, &right)
    }

    /// Host identifiers are reported in their declared spelling
    fn diagnostic_name(node: &Node, resolver: &dyn Resolver) -> String {
        match &node.kind {
            NodeKind::Identifier(identifier) => resolver
                .get_case_sensitive_name(identifier.name())
                .unwrap_or_else(|_| identifier.name().to_string()),
            _ => node.to_string(),
        }
    }

    /// Direct children in evaluation order
    pub fn children(&self) -> Vec<&Node> {
        match &self.kind {
            NodeKind::Or(ops)
            | NodeKind::Xor(ops)
            | NodeKind::And(ops)
            | NodeKind::Concatenation(ops)
            | NodeKind::Addition(ops)
            | NodeKind::Subtraction(ops)
            | NodeKind::Mod(ops)
            | NodeKind::IntegerDivision(ops)
            | NodeKind::Multiplication(ops)
            | NodeKind::Division(ops) => vec![ops.left.as_ref(), ops.right.as_ref()],
            NodeKind::Comparison { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            NodeKind::Not(child) | NodeKind::Negation(child) => vec![child.as_ref()],
            NodeKind::Dot { target, member } => {
                let mut children = vec![target.as_ref()];
                if let Member::Method(call) = member {
                    children.extend(call.arguments());
                }
                children
            }
            NodeKind::FunctionCall(call) => call.arguments().iter().collect(),
            NodeKind::Constant(_) | NodeKind::Identifier(_) => Vec::new(),
        }
    }

    /// Short description used by the tree dump
    pub fn label(&self) -> String {
        match &self.kind {
            NodeKind::Or(_) => "Or".to_string(),
            NodeKind::Xor(_) => "Xor".to_string(),
            NodeKind::And(_) => "And".to_string(),
            NodeKind::Not(_) => "Not".to_string(),
            NodeKind::Comparison { operator, .. } => format!("Comparison {}", operator_text(*operator)),
            NodeKind::Concatenation(_) => "Concatenation".to_string(),
            NodeKind::Addition(_) => "Addition".to_string(),
            NodeKind::Subtraction(_) => "Subtraction".to_string(),
            NodeKind::Mod(_) => "Mod".to_string(),
            NodeKind::IntegerDivision(_) => "IntegerDivision".to_string(),
            NodeKind::Multiplication(_) => "Multiplication".to_string(),
            NodeKind::Division(_) => "Division".to_string(),
            NodeKind::Negation(_) => "Negation".to_string(),
            NodeKind::Constant(value) => format!("Constant {}", literal_text(value)),
            NodeKind::Dot { member, .. } => match member {
                Member::Property { name, .. } => format!("Dot .{}", name),
                Member::Method(call) => format!("Dot .{}()", call.name()),
            },
            NodeKind::Identifier(identifier) => format!("Identifier {}", identifier.name()),
            NodeKind::FunctionCall(call) => format!("FunctionCall {}", call.name()),
        }
    }

    /// Indented dump of the tree, one node per line with its offset
    pub fn to_tree_string(&self) -> String {
        let mut out = String::new();
        self.write_tree(&mut out, 0);
        out
    }

    fn write_tree(&self, out: &mut String, depth: usize) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&format!("{} @{}\n", self.label(), self.offset));
        for child in self.children() {
            child.write_tree(out, depth + 1);
        }
    }

    fn is_operator(&self) -> bool {
        !matches!(
            self.kind,
            NodeKind::Constant(_)
                | NodeKind::Identifier(_)
                | NodeKind::FunctionCall(_)
                | NodeKind::Dot { .. }
        )
    }
}

fn operator_text(operator: RelationalOperator) -> &'static str {
    match operator {
        RelationalOperator::Is => "Is",
        other => other.as_str(),
    }
}

fn literal_text(value: &Value) -> String {
    match value {
        Value::Text(text) => format!("\"{}\"", text),
        Value::Char(c) => format!("\"{}\"c", c),
        other => other.to_string(),
    }
}

fn write_binary(f: &mut fmt::Formatter<'_>, ops: &Operands, symbol: &str) -> fmt::Result {
    write!(f, "{} {} {}", Operand(&ops.left), symbol, Operand(&ops.right))
}

/// Nested operator operands are parenthesized
struct Operand<'a>(&'a Node);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_operator() {
            write!(f, "({})", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Or(ops) => write_binary(f, ops, "Or"),
            NodeKind::Xor(ops) => write_binary(f, ops, "Xor"),
            NodeKind::And(ops) => write_binary(f, ops, "And"),
            NodeKind::Not(child) => write!(f, "Not {}", Operand(child)),
            NodeKind::Comparison {
                left,
                operator,
                right,
            } => write!(
                f,
                "{} {} {}",
                Operand(left),
                operator_text(*operator),
                Operand(right)
            ),
            NodeKind::Concatenation(ops) => write_binary(f, ops, "&"),
            NodeKind::Addition(ops) => write_binary(f, ops, "+"),
            NodeKind::Subtraction(ops) => write_binary(f, ops, "-"),
            NodeKind::Mod(ops) => write_binary(f, ops, "Mod"),
            NodeKind::IntegerDivision(ops) => write_binary(f, ops, "\\"),
            NodeKind::Multiplication(ops) => write_binary(f, ops, "*"),
            NodeKind::Division(ops) => write_binary(f, ops, "/"),
            NodeKind::Negation(child) => write!(f, "-{}", Operand(child)),
            NodeKind::Constant(value) => write!(f, "{}", literal_text(value)),
            NodeKind::Dot { target, member } => write!(f, "{}.{}", Operand(target), member),
            NodeKind::Identifier(identifier) => write!(f, "{}", identifier),
            NodeKind::FunctionCall(call) => write!(f, "{}", call),
        }
    }
}

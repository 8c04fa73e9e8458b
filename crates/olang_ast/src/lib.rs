//! Olang AST definitions
//!
//! This crate defines the abstract syntax tree (AST) for the Olang language.
//! It serves as the contract between the parser and the compiler core: the
//! parser produces a `Program`, the code generator consumes it. Every node
//! owns its children by value; nothing is shared and no cycles exist.

use std::fmt;
use std::ops::Range;

/// Represents a source code span as a byte range.
pub type Span = Range<usize>;

/// A type in the Olang type system.
///
/// Pointers and arrays carry their element type; struct references are
/// nominal and resolved against the module's struct table during code
/// generation. `Void` is valid only as a function return type.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    I1,
    I8,
    I16,
    I32,
    I64,
    F16,
    F32,
    F64,
    Pointer(Box<Type>),
    Array(u32, Box<Type>),
    Struct(String),
    Void,
}

impl Type {
    /// Whether this type is one of the integer widths (including `i1`).
    pub fn is_integer(&self) -> bool {
        matches!(self, Type::I1 | Type::I8 | Type::I16 | Type::I32 | Type::I64)
    }

    /// Whether this type is one of the floating widths.
    pub fn is_float(&self) -> bool {
        matches!(self, Type::F16 | Type::F32 | Type::F64)
    }

    /// Whether this type lowers to an LLVM aggregate (struct or array).
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Type::Struct(_) | Type::Array(..))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::I1 => write!(f, "i1"),
            Type::I8 => write!(f, "i8"),
            Type::I16 => write!(f, "i16"),
            Type::I32 => write!(f, "i32"),
            Type::I64 => write!(f, "i64"),
            Type::F16 => write!(f, "f16"),
            Type::F32 => write!(f, "f32"),
            Type::F64 => write!(f, "f64"),
            Type::Pointer(elem) => write!(f, "*{}", elem),
            Type::Array(len, elem) => write!(f, "array[{}] {}", len, elem),
            Type::Struct(name) => write!(f, "{}", name),
            Type::Void => write!(f, "void"),
        }
    }
}

/// The top-level program node: an ordered sequence of declarations.
#[derive(Debug, Clone)]
pub struct Program {
    pub decls: Vec<Decl>,
}

/// Top-level declarations.
#[derive(Debug, Clone)]
pub enum Decl {
    Struct(StructDecl),
    Function(FunctionDecl),
    Extern(ExternDecl),
}

/// A named struct with an ordered field list.
#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: String,
    pub fields: Vec<Field>,
    pub span: Span,
}

/// A single struct field.
#[derive(Debug, Clone)]
pub struct Field {
    pub ty: Type,
    pub name: String,
}

/// A function definition. `return_type` defaults to `Void` when the source
/// omits the `-> T` clause; `is_export` controls linkage.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub body: Vec<Stmt>,
    pub is_export: bool,
    pub span: Span,
}

/// An external function prototype, identical to `FunctionDecl` minus body.
#[derive(Debug, Clone)]
pub struct ExternDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub span: Span,
}

/// A function parameter.
#[derive(Debug, Clone)]
pub struct Param {
    pub ty: Type,
    pub name: String,
}

/// Statements.
#[derive(Debug, Clone)]
pub enum Stmt {
    Let(LetStmt),
    Return(ReturnStmt),
    Expr(ExprStmt),
    If(IfStmt),
    While(WhileStmt),
}

/// `let name: T = expr;`
#[derive(Debug, Clone)]
pub struct LetStmt {
    pub ty: Type,
    pub name: String,
    pub init: Expr,
    pub span: Span,
}

/// `return expr?;`
#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub expr: Option<Expr>,
    pub span: Span,
}

/// An expression evaluated for effect.
#[derive(Debug, Clone)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

/// `if cond { … } else { … }` — `else_body` is empty when absent.
#[derive(Debug, Clone)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_body: Vec<Stmt>,
    pub else_body: Vec<Stmt>,
    pub span: Span,
}

/// `while cond { … }`
#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Expressions.
#[derive(Debug, Clone)]
pub enum Expr {
    Int(IntLit),
    Float(FloatLit),
    Str(StrLit),
    Bool(BoolLit),
    Ident(Ident),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Assign(AssignExpr),
    Call(CallExpr),
    Member(MemberExpr),
    Index(IndexExpr),
}

impl Expr {
    /// The source span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::Int(e) => e.span.clone(),
            Expr::Float(e) => e.span.clone(),
            Expr::Str(e) => e.span.clone(),
            Expr::Bool(e) => e.span.clone(),
            Expr::Ident(e) => e.span.clone(),
            Expr::Binary(e) => e.span.clone(),
            Expr::Unary(e) => e.span.clone(),
            Expr::Assign(e) => e.span.clone(),
            Expr::Call(e) => e.span.clone(),
            Expr::Member(e) => e.span.clone(),
            Expr::Index(e) => e.span.clone(),
        }
    }
}

/// Integer literal.
#[derive(Debug, Clone)]
pub struct IntLit {
    pub value: i64,
    pub span: Span,
}

/// Float literal.
#[derive(Debug, Clone)]
pub struct FloatLit {
    pub value: f64,
    pub span: Span,
}

/// String literal (escapes already resolved).
#[derive(Debug, Clone)]
pub struct StrLit {
    pub value: String,
    pub span: Span,
}

/// Boolean literal.
#[derive(Debug, Clone)]
pub struct BoolLit {
    pub value: bool,
    pub span: Span,
}

/// Identifier reference.
#[derive(Debug, Clone)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    /// Whether the operator yields an `i1` comparison result.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge
        )
    }
}

/// `lhs op rhs`; chains fold left-leaning.
#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub span: Span,
}

/// Unary operators: logical not, negation, dereference, address-of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Deref,
    Addr,
}

/// `op operand`
#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
    pub span: Span,
}

/// `lhs = rhs`; right-associative. The LHS is matched structurally during
/// lowering, never evaluated as a value.
#[derive(Debug, Clone)]
pub struct AssignExpr {
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub span: Span,
}

/// `callee(args…)` — callees are resolved by name in the module.
#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: String,
    pub args: Vec<Expr>,
    pub span: Span,
}

/// `object.member`
#[derive(Debug, Clone)]
pub struct MemberExpr {
    pub object: Box<Expr>,
    pub member: String,
    pub span: Span,
}

/// `array[index]`
#[derive(Debug, Clone)]
pub struct IndexExpr {
    pub array: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Span,
}

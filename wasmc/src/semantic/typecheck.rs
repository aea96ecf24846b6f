/**
 * Copyright 2022 - Jahred Love
 *
 * Redistribution and use in source and binary forms, with or without modification,
 * are permitted provided that the following conditions are met:
 *
 * 1. Redistributions of source code must retain the above copyright notice, this
 * list of conditions and the following disclaimer.
 *
 * 2. Redistributions in binary form must reproduce the above copyright notice, this
 * list of conditions and the following disclaimer in the documentation and/or other
 * materials provided with the distribution.
 *
 * 3. Neither the name of the copyright holder nor the names of its contributors may
 * be used to endorse or promote products derived from this software without specific
 * prior written permission.
 *
 * THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS “AS IS” AND
 * ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE IMPLIED
 * WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE DISCLAIMED.
 * IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT,
 * INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT
 * NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR
 * PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
 * WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE)
 * ARISING IN ANY WAY OUT OF THE USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE
 * POSSIBILITY OF SUCH DAMAGE.
 */

use std::collections::HashMap;

use crate::ast::{
    BinaryOp, Block, Expr, ExprKind, FunctionDecl, NumberLit, Program, Span, Stmt, StmtKind,
    UnaryOp, VarDecl,
};
use crate::error::CompileError;
use crate::wasm::format::MEMORY_EXPORT;

use super::symbols::{FuncSig, FuncTable, LocalTable, LocalVar, SymbolTables};
use super::Type;

/// Check the whole program and build its symbol tables. Stops at the first error.
pub fn analyze(program: &Program) -> Result<SymbolTables, CompileError> {
    let mut tc = TypeChecker::default();
    for s in &program.stmts {
        tc.check_top_stmt(s)?;
    }
    Ok(tc.finish())
}

/// The function whose body is being checked.
struct FnCx<'a> {
    name: &'a str,
    ret: Type,
    locals: LocalTable,
}

#[derive(Default)]
struct TypeChecker {
    funcs: FuncTable,
    locals: HashMap<String, LocalTable>,
}

fn err<T>(span: Span, msg: impl Into<String>) -> Result<T, CompileError> {
    Err(CompileError::semantic(span, msg))
}

fn resolve_type(name: &str, span: Span) -> Result<Type, CompileError> {
    Type::from_name(name).ok_or_else(|| CompileError::semantic(span, format!("unknown type '{}'", name)))
}

impl TypeChecker {
    fn finish(self) -> SymbolTables {
        SymbolTables::new(self.funcs, self.locals)
    }

    fn check_top_stmt(&mut self, s: &Stmt) -> Result<(), CompileError> {
        let what = match &s.node {
            StmtKind::FunctionDecl(f) => return self.check_function(f, s.span),
            StmtKind::VarDecl(v) => format!("variable '{}'", v.name),
            StmtKind::If { .. } => "if statement".to_string(),
            StmtKind::While { .. } => "while loop".to_string(),
            StmtKind::Return { .. } => "return".to_string(),
            StmtKind::Raw { .. } => "raw instruction".to_string(),
            StmtKind::Expr { expr } => match &expr.node {
                ExprKind::Assign { target, .. } => format!("assignment to '{}'", target),
                ExprKind::Call { callee, .. } => format!("call to '{}'", callee),
                _ => "expression".to_string(),
            },
        };
        err(s.span, format!("{} outside of a function", what))
    }

    fn check_function(&mut self, f: &FunctionDecl, span: Span) -> Result<(), CompileError> {
        if f.name == MEMORY_EXPORT {
            return err(
                span,
                format!("function name '{}' clashes with the memory export", f.name),
            );
        }
        if self.funcs.get(&f.name).is_some() {
            return err(span, format!("function '{}' is already declared", f.name));
        }
        let ret = resolve_type(&f.ret, span)?;

        let mut locals = LocalTable::default();
        let mut params = Vec::with_capacity(f.params.len());
        for p in &f.params {
            let ty = resolve_type(&p.node.ty, p.span)?;
            if ty == Type::Void {
                return err(p.span, format!("parameter '{}' cannot have type void", p.node.name));
            }
            if p.node.init.is_some() {
                return err(p.span, format!("parameter '{}' cannot have an initializer", p.node.name));
            }
            let fresh = locals.declare(LocalVar {
                name: p.node.name.clone(),
                ty,
                is_param: true,
            });
            if !fresh {
                return err(
                    p.span,
                    format!("there is already a parameter named '{}'", p.node.name),
                );
            }
            params.push(ty);
        }

        // Registered before the body so the function can call itself.
        self.funcs.declare(FuncSig {
            name: f.name.clone(),
            ret,
            params,
            span,
        });

        let mut cx = FnCx {
            name: &f.name,
            ret,
            locals,
        };
        self.check_block(&f.body, &mut cx)?;
        self.locals.insert(f.name.clone(), cx.locals);
        Ok(())
    }

    fn check_block(&self, b: &Block, cx: &mut FnCx<'_>) -> Result<(), CompileError> {
        for s in &b.stmts {
            self.check_stmt(s, cx)?;
        }
        Ok(())
    }

    fn check_stmt(&self, s: &Stmt, cx: &mut FnCx<'_>) -> Result<(), CompileError> {
        match &s.node {
            StmtKind::FunctionDecl(f) => err(
                s.span,
                format!("function '{}' cannot be declared inside '{}'", f.name, cx.name),
            ),
            StmtKind::VarDecl(v) => self.check_var_decl(v, s.span, cx),
            StmtKind::If { conds, blocks } => {
                for c in conds {
                    self.expect_condition(c, cx)?;
                }
                for b in blocks {
                    self.check_block(b, cx)?;
                }
                Ok(())
            }
            StmtKind::While { cond, body } => {
                self.expect_condition(cond, cx)?;
                self.check_block(body, cx)
            }
            StmtKind::Return { expr } => {
                let ty = self.check_expr(expr, cx)?;
                if ty != cx.ret {
                    return err(
                        expr.span,
                        format!(
                            "cannot return a value of type {} from '{}' which returns {}",
                            ty, cx.name, cx.ret
                        ),
                    );
                }
                Ok(())
            }
            // Opaque: only its mnemonic is checked, at emission.
            StmtKind::Raw { .. } => Ok(()),
            StmtKind::Expr { expr } => self.check_expr(expr, cx).map(|_| ()),
        }
    }

    fn check_var_decl(&self, v: &VarDecl, span: Span, cx: &mut FnCx<'_>) -> Result<(), CompileError> {
        if cx.locals.get(&v.name).is_some() {
            return err(
                span,
                format!("variable '{}' is already declared in '{}'", v.name, cx.name),
            );
        }
        let ty = resolve_type(&v.ty, span)?;
        if ty == Type::Void {
            return err(span, format!("variable '{}' cannot have type void", v.name));
        }
        if let Some(init) = &v.init {
            let found = self.check_expr(init, cx)?;
            if found != ty {
                return err(
                    init.span,
                    format!("cannot initialize {} variable '{}' with a value of type {}", ty, v.name, found),
                );
            }
        }
        cx.locals.declare(LocalVar {
            name: v.name.clone(),
            ty,
            is_param: false,
        });
        Ok(())
    }

    fn expect_condition(&self, cond: &Expr, cx: &FnCx<'_>) -> Result<(), CompileError> {
        let ty = self.check_expr(cond, cx)?;
        if ty != Type::Bool {
            return err(cond.span, format!("condition must be bool, found {}", ty));
        }
        Ok(())
    }

    fn lookup<'c>(&self, name: &str, span: Span, cx: &'c FnCx<'_>) -> Result<&'c LocalVar, CompileError> {
        cx.locals
            .get(name)
            .ok_or_else(|| CompileError::semantic(span, format!("variable '{}' is not declared", name)))
    }

    fn check_expr(&self, e: &Expr, cx: &FnCx<'_>) -> Result<Type, CompileError> {
        match &e.node {
            ExprKind::Ident(name) => Ok(self.lookup(name, e.span, cx)?.ty),
            ExprKind::Number(NumberLit::Int(v)) => {
                if *v > u32::MAX as i64 || *v < i32::MIN as i64 {
                    return err(e.span, format!("integer literal {} does not fit in 32 bits", v));
                }
                Ok(Type::I32)
            }
            ExprKind::Number(NumberLit::Float(_)) => Ok(Type::F32),
            ExprKind::Bool(_) => Ok(Type::Bool),
            ExprKind::Str(_) => err(e.span, "string literals have no value type"),
            ExprKind::Assign { target, value } => {
                let var_ty = self.lookup(target, e.span, cx)?.ty;
                let found = self.check_expr(value, cx)?;
                if found != var_ty {
                    return err(
                        value.span,
                        format!("cannot assign a value of type {} to {} variable '{}'", found, var_ty, target),
                    );
                }
                Ok(Type::Void)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lt = self.check_expr(lhs, cx)?;
                let rt = self.check_expr(rhs, cx)?;
                check_binary(*op, lt, rt, e.span)
            }
            ExprKind::Unary { op, operand } => {
                let ty = self.check_expr(operand, cx)?;
                match op {
                    UnaryOp::Not if ty != Type::Bool => {
                        err(e.span, format!("operator '!' needs a bool operand, found {}", ty))
                    }
                    UnaryOp::Plus | UnaryOp::Neg if !ty.is_numeric() => err(
                        e.span,
                        format!("operator '{}' cannot be applied to {}", op.symbol(), ty),
                    ),
                    _ => Ok(ty),
                }
            }
            ExprKind::Cast { ty, operand } => {
                // A string operand is left for the emitter to reject.
                if !matches!(operand.node, ExprKind::Str(_)) {
                    self.check_expr(operand, cx)?;
                }
                resolve_type(ty, e.span)
            }
            ExprKind::Call { callee, args } => {
                let sig = self
                    .funcs
                    .get(callee)
                    .ok_or_else(|| CompileError::semantic(e.span, format!("function '{}' is not defined", callee)))?;
                if sig.params.len() != args.len() {
                    return err(
                        e.span,
                        format!(
                            "wrong number of arguments for '{}': expected {}, found {}",
                            callee,
                            sig.params.len(),
                            args.len()
                        ),
                    );
                }
                for (i, (arg, want)) in args.iter().zip(&sig.params).enumerate() {
                    let found = self.check_expr(arg, cx)?;
                    if found != *want {
                        return err(
                            arg.span,
                            format!(
                                "argument {} of '{}' must be {}, found {}",
                                i + 1,
                                callee,
                                want,
                                found
                            ),
                        );
                    }
                }
                Ok(sig.ret)
            }
        }
    }
}

/// Operand rules per operator class. Both sides must already have the same type.
fn check_binary(op: BinaryOp, lt: Type, rt: Type, span: Span) -> Result<Type, CompileError> {
    let sym = op.symbol();
    if lt != rt {
        return err(span, format!("type mismatch: {} {} {}", lt, sym, rt));
    }
    if lt == Type::Void {
        return err(span, format!("operator '{}' cannot be applied to void", sym));
    }
    if op.is_logical() {
        if lt != Type::Bool {
            return err(span, format!("operator '{}' needs bool operands, found {}", sym, lt));
        }
        return Ok(Type::Bool);
    }
    if op.is_equality() {
        return Ok(Type::Bool);
    }
    if lt == Type::Bool {
        return err(span, format!("operator '{}' cannot be applied to bool", sym));
    }
    if op.is_relational() {
        Ok(Type::Bool)
    } else {
        Ok(lt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::parse::parse_program;

    fn analyze_src(src: &str) -> Result<SymbolTables, CompileError> {
        analyze(&parse_program(src).unwrap())
    }

    fn message(src: &str) -> String {
        let err = analyze_src(src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Semantic);
        err.message
    }

    #[test]
    fn locals_get_slots_after_parameters() {
        let src = "i32 f(i32 b, f32 a) { i64 z; bool c = true; i32 y = b; return y; }";
        let tables = analyze_src(src).unwrap();
        let locals = tables.locals_of("f").unwrap();
        let order: Vec<(&str, Type, bool)> = locals
            .iter()
            .map(|v| (v.name.as_str(), v.ty, v.is_param))
            .collect();
        assert_eq!(
            order,
            vec![
                ("b", Type::I32, true),
                ("a", Type::F32, true),
                ("z", Type::I64, false),
                ("c", Type::Bool, false),
                ("y", Type::I32, false),
            ]
        );
        assert_eq!(locals.slot_of("y"), Some(4));
    }

    #[test]
    fn variables_in_nested_blocks_share_the_function_scope() {
        let src = "void f(bool p) { if (p) { i32 x; } while (p) { i32 y; } }";
        let tables = analyze_src(src).unwrap();
        let names: Vec<&str> = tables.locals_of("f").unwrap().locals().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(
            message("void f(bool p) { if (p) { i32 x; } else { f32 x; } }"),
            "variable 'x' is already declared in 'f'"
        );
    }

    #[test]
    fn bool_assigned_to_i32_is_rejected() {
        assert_eq!(
            message("void f() { i32 x; x = true; }"),
            "cannot assign a value of type bool to i32 variable 'x'"
        );
    }

    #[test]
    fn comparison_yields_bool() {
        let tables = analyze_src("bool isPos(i32 x) { return x > 0; }").unwrap();
        assert_eq!(tables.funcs.get("isPos").map(|s| s.ret), Some(Type::Bool));
    }

    #[test]
    fn undefined_function_and_wrong_arity() {
        assert_eq!(
            message("i32 f() { return g(); }"),
            "function 'g' is not defined"
        );
        assert_eq!(
            message("i32 g(i32 a) { return a; } i32 f() { return g(1, 2); }"),
            "wrong number of arguments for 'g': expected 1, found 2"
        );
        assert_eq!(
            message("i32 g(i32 a) { return a; } i32 f() { return g(1.5); }"),
            "argument 1 of 'g' must be i32, found f32"
        );
    }

    #[test]
    fn functions_must_be_declared_before_use_except_for_recursion() {
        assert!(analyze_src("i32 fact(i32 n) { if (n < 2) { return 1; } return n * fact(n - 1); }").is_ok());
        assert_eq!(
            message("i32 a() { return b(); } i32 b() { return 1; }"),
            "function 'b' is not defined"
        );
    }

    #[test]
    fn return_type_must_match_exactly() {
        assert_eq!(
            message("i64 f(i32 a) { return a; }"),
            "cannot return a value of type i32 from 'f' which returns i64"
        );
        assert!(analyze_src("i64 f(i32 a) { return (i64) a; }").is_ok());
    }

    #[test]
    fn mismatched_operands_are_rejected() {
        assert_eq!(
            message("i32 f(i32 a, i64 b) { return a + b; }"),
            "type mismatch: i32 + i64"
        );
        assert_eq!(
            message("i32 f(i32 a) { return a & 1.0; }"),
            "type mismatch: i32 & f32"
        );
    }

    #[test]
    fn bool_rules() {
        assert_eq!(
            message("bool f(bool a) { return a + a; }"),
            "operator '+' cannot be applied to bool"
        );
        assert_eq!(
            message("bool f(bool a) { return a < a; }"),
            "operator '<' cannot be applied to bool"
        );
        assert_eq!(
            message("bool f(i32 a) { return a && a; }"),
            "operator '&&' needs bool operands, found i32"
        );
        assert_eq!(
            message("bool f(i32 a) { return !a; }"),
            "operator '!' needs a bool operand, found i32"
        );
        assert_eq!(
            message("bool f(bool a) { return -a; }"),
            "operator '-' cannot be applied to bool"
        );
        assert!(analyze_src("bool f(bool a, bool b) { return a == b && !a || b != a; }").is_ok());
    }

    #[test]
    fn conditions_must_be_bool() {
        assert_eq!(
            message("void f(i32 a) { while (a) { a = a - 1; } }"),
            "condition must be bool, found i32"
        );
        assert_eq!(
            message("void f(i32 a) { if (a > 0) { } else if (a) { } }"),
            "condition must be bool, found i32"
        );
    }

    #[test]
    fn declaration_rules() {
        assert_eq!(
            message("void f() { } i32 f() { return 1; }"),
            "function 'f' is already declared"
        );
        assert_eq!(
            message("void f() { void g() { } }"),
            "function 'g' cannot be declared inside 'f'"
        );
        assert_eq!(
            message("void f(i32 a, i32 a) { }"),
            "there is already a parameter named 'a'"
        );
        assert_eq!(
            message("void f(i32 a = 1) { }"),
            "parameter 'a' cannot have an initializer"
        );
        assert_eq!(
            message("void f() { void v; }"),
            "variable 'v' cannot have type void"
        );
        assert_eq!(
            message("void f() { i32 x = x; }"),
            "variable 'x' is not declared"
        );
        assert_eq!(
            message("void memory() { }"),
            "function name 'memory' clashes with the memory export"
        );
    }

    #[test]
    fn statements_need_a_function() {
        assert_eq!(message("i32 x = 1;"), "variable 'x' outside of a function");
        assert_eq!(message("void g() { } g();"), "call to 'g' outside of a function");
        assert_eq!(message("_wasm \"nop\";"), "raw instruction outside of a function");
    }

    #[test]
    fn literals() {
        assert_eq!(
            message("i32 f() { return 4294967296; }"),
            "integer literal 4294967296 does not fit in 32 bits"
        );
        assert!(analyze_src("i32 f() { return 0xFFFFFFFF; }").is_ok());
        assert_eq!(
            message("i32 f() { i32 s = \"hi\"; return s; }"),
            "string literals have no value type"
        );
        assert!(analyze_src("i32 f() { return (i32) \"hi\"; }").is_ok());
    }

    #[test]
    fn raw_instructions_are_not_checked() {
        assert!(analyze_src("void f() { _wasm \"bogus $nope\"; }").is_ok());
    }
}

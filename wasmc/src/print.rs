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

// Source printer and the `-tree` / `-tokens` debug dumps.

use std::fmt::Write;

use crate::ast::{Block, Expr, ExprKind, NumberLit, Program, Stmt, StmtKind, VarDecl};
use crate::source::Source;
use crate::token::Token;

const INDENT: &str = "    ";

/// Render a tree as source text that parses back to the same tree.
/// Operator expressions are fully parenthesized.
pub fn print_program(program: &Program) -> String {
    let mut out = String::new();
    for s in &program.stmts {
        print_stmt(&mut out, s, 0);
    }
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn print_braced(out: &mut String, b: &Block, depth: usize) {
    out.push_str("{\n");
    for s in &b.stmts {
        print_stmt(out, s, depth + 1);
    }
    indent(out, depth);
    out.push('}');
}

fn print_var_decl(out: &mut String, v: &VarDecl) {
    let _ = write!(out, "{} {}", v.ty, v.name);
    if let Some(init) = &v.init {
        out.push_str(" = ");
        print_expr(out, init);
    }
}

fn print_stmt(out: &mut String, s: &Stmt, depth: usize) {
    indent(out, depth);
    match &s.node {
        StmtKind::FunctionDecl(f) => {
            let _ = write!(out, "{} {}(", f.ret, f.name);
            for (i, p) in f.params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                print_var_decl(out, &p.node);
            }
            out.push_str(") ");
            print_braced(out, &f.body, depth);
        }
        StmtKind::VarDecl(v) => {
            print_var_decl(out, v);
            out.push(';');
        }
        StmtKind::If { conds, blocks } => {
            for (i, (cond, block)) in conds.iter().zip(blocks).enumerate() {
                if i > 0 {
                    out.push_str(" else ");
                }
                out.push_str("if (");
                print_expr(out, cond);
                out.push_str(") ");
                print_braced(out, block, depth);
            }
            if let Some(else_block) = blocks.get(conds.len()) {
                out.push_str(" else ");
                print_braced(out, else_block, depth);
            }
        }
        StmtKind::While { cond, body } => {
            out.push_str("while (");
            print_expr(out, cond);
            out.push_str(") ");
            print_braced(out, body, depth);
        }
        StmtKind::Return { expr } => {
            out.push_str("return ");
            print_expr(out, expr);
            out.push(';');
        }
        StmtKind::Raw { text } => {
            let _ = write!(out, "_wasm \"{}\";", text);
        }
        StmtKind::Expr { expr } => {
            print_expr(out, expr);
            out.push(';');
        }
    }
    out.push('\n');
}

fn float_text(v: f64) -> String {
    let s = v.to_string();
    if s.contains('.') {
        s
    } else {
        s + ".0"
    }
}

pub fn print_expr(out: &mut String, e: &Expr) {
    match &e.node {
        ExprKind::Ident(name) => out.push_str(name),
        ExprKind::Number(NumberLit::Int(v)) => {
            let _ = write!(out, "{}", v);
        }
        ExprKind::Number(NumberLit::Float(v)) => out.push_str(&float_text(*v)),
        ExprKind::Bool(b) => {
            let _ = write!(out, "{}", b);
        }
        ExprKind::Str(s) => {
            let _ = write!(out, "\"{}\"", s);
        }
        ExprKind::Assign { target, value } => {
            let _ = write!(out, "{} = ", target);
            print_expr(out, value);
        }
        ExprKind::Binary { op, lhs, rhs } => {
            out.push('(');
            print_expr(out, lhs);
            let _ = write!(out, " {} ", op.symbol());
            print_expr(out, rhs);
            out.push(')');
        }
        ExprKind::Unary { op, operand } => {
            out.push('(');
            out.push_str(op.symbol());
            print_expr(out, operand);
            out.push(')');
        }
        ExprKind::Cast { ty, operand } => {
            let _ = write!(out, "(({}) ", ty);
            print_expr(out, operand);
            out.push(')');
        }
        ExprKind::Call { callee, args } => {
            let _ = write!(out, "{}(", callee);
            for (i, a) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                print_expr(out, a);
            }
            out.push(')');
        }
    }
}

/// One node per line, children indented by two spaces.
pub fn dump_tree(program: &Program) -> String {
    let mut out = String::from("Program\n");
    for s in &program.stmts {
        dump_stmt(&mut out, s, 1);
    }
    out
}

fn line(out: &mut String, depth: usize, text: std::fmt::Arguments<'_>) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    let _ = out.write_fmt(text);
    out.push('\n');
}

fn dump_block(out: &mut String, label: &str, b: &Block, depth: usize) {
    line(out, depth, format_args!("{}", label));
    for s in &b.stmts {
        dump_stmt(out, s, depth + 1);
    }
}

fn dump_stmt(out: &mut String, s: &Stmt, depth: usize) {
    match &s.node {
        StmtKind::FunctionDecl(f) => {
            line(out, depth, format_args!("FunctionDecl {} -> {}", f.name, f.ret));
            for p in &f.params {
                line(out, depth + 1, format_args!("Param {}: {}", p.node.name, p.node.ty));
                if let Some(init) = &p.node.init {
                    dump_expr(out, init, depth + 2);
                }
            }
            dump_block(out, "Body", &f.body, depth + 1);
        }
        StmtKind::VarDecl(v) => {
            line(out, depth, format_args!("VarDecl {}: {}", v.name, v.ty));
            if let Some(init) = &v.init {
                dump_expr(out, init, depth + 1);
            }
        }
        StmtKind::If { conds, blocks } => {
            line(out, depth, format_args!("If"));
            for (cond, block) in conds.iter().zip(blocks) {
                line(out, depth + 1, format_args!("Cond"));
                dump_expr(out, cond, depth + 2);
                dump_block(out, "Then", block, depth + 1);
            }
            if let Some(else_block) = blocks.get(conds.len()) {
                dump_block(out, "Else", else_block, depth + 1);
            }
        }
        StmtKind::While { cond, body } => {
            line(out, depth, format_args!("While"));
            dump_expr(out, cond, depth + 1);
            dump_block(out, "Body", body, depth + 1);
        }
        StmtKind::Return { expr } => {
            line(out, depth, format_args!("Return"));
            dump_expr(out, expr, depth + 1);
        }
        StmtKind::Raw { text } => line(out, depth, format_args!("Raw \"{}\"", text)),
        StmtKind::Expr { expr } => dump_expr(out, expr, depth),
    }
}

fn dump_expr(out: &mut String, e: &Expr, depth: usize) {
    match &e.node {
        ExprKind::Ident(name) => line(out, depth, format_args!("Ident {}", name)),
        ExprKind::Number(NumberLit::Int(v)) => line(out, depth, format_args!("Int {}", v)),
        ExprKind::Number(NumberLit::Float(v)) => {
            line(out, depth, format_args!("Float {}", float_text(*v)))
        }
        ExprKind::Bool(b) => line(out, depth, format_args!("Bool {}", b)),
        ExprKind::Str(s) => line(out, depth, format_args!("Str \"{}\"", s)),
        ExprKind::Assign { target, value } => {
            line(out, depth, format_args!("Assign {}", target));
            dump_expr(out, value, depth + 1);
        }
        ExprKind::Binary { op, lhs, rhs } => {
            line(out, depth, format_args!("Binary {}", op.symbol()));
            dump_expr(out, lhs, depth + 1);
            dump_expr(out, rhs, depth + 1);
        }
        ExprKind::Unary { op, operand } => {
            line(out, depth, format_args!("Unary {}", op.symbol()));
            dump_expr(out, operand, depth + 1);
        }
        ExprKind::Cast { ty, operand } => {
            line(out, depth, format_args!("Cast {}", ty));
            dump_expr(out, operand, depth + 1);
        }
        ExprKind::Call { callee, args } => {
            line(out, depth, format_args!("Call {}", callee));
            for a in args {
                dump_expr(out, a, depth + 1);
            }
        }
    }
}

/// `line:col Kind 'text'` for each token.
pub fn dump_tokens(src: &str, tokens: &[Token]) -> String {
    let source = Source::new(src);
    let mut out = String::new();
    for t in tokens {
        let (l, c) = source.line_col(t.span.start);
        let _ = writeln!(out, "{}:{} {:?} '{}'", l, c, t.kind, t.text);
    }
    out
}

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

// Statement parsing.

use crate::ast::{Block, Expr, ExprKind, FunctionDecl, Span, Spanned, Stmt, StmtKind, VarDecl};
use crate::error::CompileError;
use crate::token::TokenKind;

use super::expr::{parse_call_args, parse_expr};
use super::P;

/// Statements until one can't start; the caller checks what stopped it.
pub fn parse_block_body(p: &mut P) -> Result<Block, CompileError> {
    let mut stmts = Vec::new();
    while let Some(s) = parse_stmt(p)? {
        stmts.push(s);
    }
    Ok(Block { stmts })
}

fn parse_braced_block(p: &mut P) -> Result<Block, CompileError> {
    p.expect(TokenKind::LBrace)?;
    let block = parse_block_body(p)?;
    p.expect(TokenKind::RBrace)?;
    Ok(block)
}

/// Body of an `if`/`else`/`while`: a braced block or one bare statement.
fn parse_branch(p: &mut P) -> Result<Block, CompileError> {
    if p.peek_kind() == TokenKind::LBrace {
        return parse_braced_block(p);
    }
    match parse_stmt(p)? {
        Some(s) => Ok(Block { stmts: vec![s] }),
        None => p.err(format!("expected statement, found {}", p.found())),
    }
}

/// `None` when the current token cannot start a statement.
pub fn parse_stmt(p: &mut P) -> Result<Option<Stmt>, CompileError> {
    let stmt = match p.peek_kind() {
        TokenKind::KwWhile => parse_while(p)?,
        TokenKind::KwIf => parse_if(p)?,
        TokenKind::KwWasm => parse_raw(p)?,
        TokenKind::KwReturn => parse_return(p)?,
        TokenKind::Ident => parse_ident_stmt(p)?,
        TokenKind::Type if p.peek_kind_n(3) == TokenKind::LParen => parse_function(p)?,
        TokenKind::Type => {
            let decl = parse_var_decl(p)?;
            p.expect(TokenKind::Semicolon)?;
            let span = Span::new(decl.span.start, p.last_span_end());
            Stmt::new(StmtKind::VarDecl(decl.node), span)
        }
        _ => return Ok(None),
    };
    Ok(Some(stmt))
}

fn parse_paren_cond(p: &mut P) -> Result<Expr, CompileError> {
    p.expect(TokenKind::LParen)?;
    let cond = parse_expr(p)?;
    p.expect(TokenKind::RParen)?;
    Ok(cond)
}

fn parse_while(p: &mut P) -> Result<Stmt, CompileError> {
    let start = p.expect(TokenKind::KwWhile)?.span.start;
    let cond = parse_paren_cond(p)?;
    let body = parse_branch(p)?;
    Ok(Stmt::new(
        StmtKind::While { cond, body },
        Span::new(start, p.last_span_end()),
    ))
}

fn parse_if(p: &mut P) -> Result<Stmt, CompileError> {
    let start = p.expect(TokenKind::KwIf)?.span.start;
    let mut conds = vec![parse_paren_cond(p)?];
    let mut blocks = vec![parse_branch(p)?];
    while p.eat(TokenKind::KwElse) {
        if p.eat(TokenKind::KwIf) {
            conds.push(parse_paren_cond(p)?);
            blocks.push(parse_branch(p)?);
        } else {
            blocks.push(parse_branch(p)?);
            break;
        }
    }
    Ok(Stmt::new(
        StmtKind::If { conds, blocks },
        Span::new(start, p.last_span_end()),
    ))
}

fn parse_raw(p: &mut P) -> Result<Stmt, CompileError> {
    let start = p.expect(TokenKind::KwWasm)?.span.start;
    let text = p.expect(TokenKind::Str)?.text;
    p.expect(TokenKind::Semicolon)?;
    Ok(Stmt::new(
        StmtKind::Raw { text },
        Span::new(start, p.last_span_end()),
    ))
}

fn parse_return(p: &mut P) -> Result<Stmt, CompileError> {
    let start = p.expect(TokenKind::KwReturn)?.span.start;
    let expr = parse_expr(p)?;
    p.expect(TokenKind::Semicolon)?;
    Ok(Stmt::new(
        StmtKind::Return { expr },
        Span::new(start, p.last_span_end()),
    ))
}

/// `name = expr;` or `name(args);`
fn parse_ident_stmt(p: &mut P) -> Result<Stmt, CompileError> {
    let name = p.expect(TokenKind::Ident)?;
    let start = name.span.start;
    let kind = match p.peek_kind() {
        TokenKind::Assign => {
            p.bump();
            let value = parse_expr(p)?;
            ExprKind::Assign {
                target: name.text,
                value: Box::new(value),
            }
        }
        TokenKind::LParen => {
            let args = parse_call_args(p)?;
            ExprKind::Call {
                callee: name.text,
                args,
            }
        }
        _ => {
            return p.err(format!(
                "expected '=' or '(' after '{}', found {}",
                name.text,
                p.found()
            ))
        }
    };
    let expr = Spanned::new(kind, Span::new(start, p.last_span_end()));
    p.expect(TokenKind::Semicolon)?;
    Ok(Stmt::new(
        StmtKind::Expr { expr },
        Span::new(start, p.last_span_end()),
    ))
}

/// `type name [= expr]`, without the terminator. Shared by locals and parameters.
fn parse_var_decl(p: &mut P) -> Result<Spanned<VarDecl>, CompileError> {
    let ty = p.expect(TokenKind::Type)?;
    if p.peek_kind() == TokenKind::LBracket {
        return p.err("array types are not supported");
    }
    let name = p.expect(TokenKind::Ident)?.text;
    let init = if p.eat(TokenKind::Assign) {
        Some(parse_expr(p)?)
    } else {
        None
    };
    Ok(Spanned::new(
        VarDecl {
            name,
            ty: ty.text,
            init,
        },
        Span::new(ty.span.start, p.last_span_end()),
    ))
}

fn parse_function(p: &mut P) -> Result<Stmt, CompileError> {
    let ret = p.expect(TokenKind::Type)?;
    let name = p.expect(TokenKind::Ident)?.text;
    p.expect(TokenKind::LParen)?;
    let mut params = Vec::new();
    if !p.eat(TokenKind::RParen) {
        loop {
            params.push(parse_var_decl(p)?);
            if p.eat(TokenKind::Comma) {
                continue;
            }
            p.expect(TokenKind::RParen)?;
            break;
        }
    }
    let body = parse_braced_block(p)?;
    Ok(Stmt::new(
        StmtKind::FunctionDecl(FunctionDecl {
            name,
            ret: ret.text,
            params,
            body,
        }),
        Span::new(ret.span.start, p.last_span_end()),
    ))
}

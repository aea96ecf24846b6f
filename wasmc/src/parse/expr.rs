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

// Expression parsing (precedence climbing).

use crate::ast::{
    BinaryOp, Expr, ExprKind, NumberLit, Span, UnaryOp, CAST_PRECEDENCE, UNARY_PRECEDENCE,
};
use crate::error::CompileError;
use crate::token::{Token, TokenKind};

use super::P;

pub fn parse_expr(p: &mut P) -> Result<Expr, CompileError> {
    parse_expr_prec(p, 0)
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Le => BinaryOp::Le,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::Ge => BinaryOp::Ge,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::BangEq => BinaryOp::Ne,
        TokenKind::Amp => BinaryOp::BitAnd,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::AmpAmp => BinaryOp::And,
        TokenKind::PipePipe => BinaryOp::Or,
        _ => return None,
    };
    Some(op)
}

/// Parse a term, then fold in binary operators that bind tighter than `floor`.
/// Equal precedence stops the recursion, so chains associate to the left.
fn parse_expr_prec(p: &mut P, floor: u8) -> Result<Expr, CompileError> {
    let mut lhs = parse_unary(p)?;
    while let Some(op) = binary_op(p.peek_kind()) {
        let prec = op.precedence();
        if prec <= floor {
            break;
        }
        p.bump();
        let rhs = parse_expr_prec(p, prec)?;
        let span = Span::new(lhs.span.start, rhs.span.end);
        lhs = Expr::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        );
    }
    Ok(lhs)
}

fn parse_unary(p: &mut P) -> Result<Expr, CompileError> {
    let op = match p.peek_kind() {
        TokenKind::Plus => UnaryOp::Plus,
        TokenKind::Minus => UnaryOp::Neg,
        TokenKind::Bang => UnaryOp::Not,
        _ => return parse_primary(p),
    };
    let start = p.bump().span.start;
    let operand = parse_expr_prec(p, UNARY_PRECEDENCE)?;
    let span = Span::new(start, operand.span.end);
    Ok(Expr::new(
        ExprKind::Unary {
            op,
            operand: Box::new(operand),
        },
        span,
    ))
}

fn parse_primary(p: &mut P) -> Result<Expr, CompileError> {
    match p.peek_kind() {
        TokenKind::Number => {
            let t = p.bump();
            let lit = parse_number_lit(&t)?;
            Ok(Expr::new(ExprKind::Number(lit), t.span))
        }
        TokenKind::True | TokenKind::False => {
            let t = p.bump();
            Ok(Expr::new(ExprKind::Bool(t.is(TokenKind::True)), t.span))
        }
        TokenKind::Str => {
            let t = p.bump();
            Ok(Expr::new(ExprKind::Str(t.text), t.span))
        }
        TokenKind::Ident => {
            let t = p.bump();
            if p.peek_kind() == TokenKind::LParen {
                let args = parse_call_args(p)?;
                let span = Span::new(t.span.start, p.last_span_end());
                return Ok(Expr::new(
                    ExprKind::Call {
                        callee: t.text,
                        args,
                    },
                    span,
                ));
            }
            Ok(Expr::new(ExprKind::Ident(t.text), t.span))
        }
        TokenKind::LParen if p.peek_kind_n(2) == TokenKind::Type => {
            let start = p.bump().span.start;
            let ty = p.bump().text;
            p.expect(TokenKind::RParen)?;
            let operand = parse_expr_prec(p, CAST_PRECEDENCE)?;
            let span = Span::new(start, operand.span.end);
            Ok(Expr::new(
                ExprKind::Cast {
                    ty,
                    operand: Box::new(operand),
                },
                span,
            ))
        }
        TokenKind::LParen => {
            let start = p.bump().span.start;
            let inner = parse_expr(p)?;
            p.expect(TokenKind::RParen)?;
            Ok(Expr::new(inner.node, Span::new(start, p.last_span_end())))
        }
        _ => p.err(format!("expected expression, found {}", p.found())),
    }
}

/// `( expr, ... )` with zero or more arguments.
pub fn parse_call_args(p: &mut P) -> Result<Vec<Expr>, CompileError> {
    p.expect(TokenKind::LParen)?;
    let mut args = Vec::new();
    if p.eat(TokenKind::RParen) {
        return Ok(args);
    }
    loop {
        args.push(parse_expr(p)?);
        if p.eat(TokenKind::Comma) {
            continue;
        }
        p.expect(TokenKind::RParen)?;
        return Ok(args);
    }
}

/// Decode a number token: `0x`/`0b` prefixes are integers, a `.` makes a float.
pub fn parse_number_lit(t: &Token) -> Result<NumberLit, CompileError> {
    let text = t.text.as_str();
    let bad = || CompileError::syntax(t.span, format!("invalid number literal '{}'", text));
    let radix_digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .map(|d| (d, 16))
        .or_else(|| {
            text.strip_prefix("0b")
                .or_else(|| text.strip_prefix("0B"))
                .map(|d| (d, 2))
        });
    if let Some((digits, radix)) = radix_digits {
        return i64::from_str_radix(digits, radix)
            .map(NumberLit::Int)
            .map_err(|_| bad());
    }
    if text.contains('.') {
        return text.parse::<f64>().map(NumberLit::Float).map_err(|_| bad());
    }
    text.parse::<i64>().map(NumberLit::Int).map_err(|_| bad())
}

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

// Token cursor for the parser (peek, lookahead, bump, expect).

use crate::ast::Span;
use crate::error::CompileError;
use crate::token::{Token, TokenKind};

/// Token stream with an `Eof` sentinel; reading past the end keeps returning it.
pub struct TokenP {
    tokens: Vec<Token>,
    i: usize,
}

impl TokenP {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        let eof_pos = tokens.last().map(|t| t.span.end).unwrap_or(0);
        tokens.push(Token::new(TokenKind::Eof, "", Span::point(eof_pos)));
        Self { tokens, i: 0 }
    }

    pub fn peek(&self) -> &Token {
        self.peek_n(1)
    }

    /// 1-based lookahead: `peek_n(1)` is the current token.
    pub fn peek_n(&self, n: usize) -> &Token {
        let idx = (self.i + n.max(1) - 1).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    pub fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    pub fn peek_kind_n(&self, n: usize) -> TokenKind {
        self.peek_n(n).kind
    }

    pub fn bump(&mut self) -> Token {
        let t = self.peek().clone();
        if self.i < self.tokens.len() - 1 {
            self.i += 1;
        }
        t
    }

    /// Rewind to the first token.
    pub fn reset(&mut self) {
        self.i = 0;
    }

    pub fn eof(&self) -> bool {
        self.peek_kind() == TokenKind::Eof
    }

    /// End of the last consumed token, for closing a node's span.
    pub fn last_span_end(&self) -> usize {
        match self.i {
            0 => self.peek().span.start,
            i => self.tokens[i - 1].span.end,
        }
    }

    pub fn err<T>(&self, msg: impl Into<String>) -> Result<T, CompileError> {
        Err(CompileError::syntax(self.peek().span, msg))
    }

    pub fn expect(&mut self, want: TokenKind) -> Result<Token, CompileError> {
        if self.peek_kind() == want {
            Ok(self.bump())
        } else {
            self.err(format!("expected {}, found {}", want, self.found()))
        }
    }

    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek_kind() == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Current token for "found ..." diagnostics.
    pub fn found(&self) -> String {
        let t = self.peek();
        match t.kind {
            TokenKind::Eof => t.kind.describe().to_string(),
            TokenKind::Str => format!("\"{}\"", t.text),
            _ => format!("'{}'", t.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::lex;

    #[test]
    fn lookahead_is_one_based_and_saturates_at_eof() {
        let p = TokenP::new(lex("i32 f(").unwrap());
        assert_eq!(p.peek_kind_n(1), TokenKind::Type);
        assert_eq!(p.peek_kind_n(3), TokenKind::LParen);
        assert_eq!(p.peek_kind_n(9), TokenKind::Eof);
    }

    #[test]
    fn bump_stops_at_eof_and_reset_rewinds() {
        let mut p = TokenP::new(lex("x;").unwrap());
        assert_eq!(p.bump().text, "x");
        assert_eq!(p.bump().text, ";");
        assert!(p.eof());
        assert!(p.bump().is(TokenKind::Eof));
        p.reset();
        assert_eq!(p.peek().text, "x");
    }

    #[test]
    fn expect_reports_found_token() {
        let mut p = TokenP::new(lex("x }").unwrap());
        p.bump();
        let err = p.expect(TokenKind::Semicolon).unwrap_err();
        assert_eq!(err.message, "expected ';', found '}'");
        assert_eq!(err.span, Span::new(2, 3));
    }
}

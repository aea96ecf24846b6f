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

use crate::ast::Span;
use crate::error::{CompileError, ErrorKind};
use crate::token::{Token, TokenKind};

const KEYWORDS: &[(&str, TokenKind)] = &[
    ("if", TokenKind::KwIf),
    ("else", TokenKind::KwElse),
    ("while", TokenKind::KwWhile),
    ("return", TokenKind::KwReturn),
    ("_wasm", TokenKind::KwWasm),
    ("true", TokenKind::True),
    ("false", TokenKind::False),
    ("void", TokenKind::Type),
    ("i32", TokenKind::Type),
    ("i64", TokenKind::Type),
    ("f32", TokenKind::Type),
    ("f64", TokenKind::Type),
    ("bool", TokenKind::Type),
];

// Longest spellings first so `<=` wins over `<`.
const PUNCT: &[(&str, TokenKind)] = &[
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::BangEq),
    ("<=", TokenKind::Le),
    (">=", TokenKind::Ge),
    ("&&", TokenKind::AmpAmp),
    ("||", TokenKind::PipePipe),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    (",", TokenKind::Comma),
    (";", TokenKind::Semicolon),
    ("=", TokenKind::Assign),
    ("!", TokenKind::Bang),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("&", TokenKind::Amp),
    ("|", TokenKind::Pipe),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
];

pub struct Lexer<'a> {
    src: &'a str,
    i: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, i: 0 }
    }

    fn eof(&self) -> bool {
        self.i >= self.src.len()
    }

    fn rest(&self) -> &'a str {
        &self.src[self.i..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.i += ch.len_utf8();
        Some(ch)
    }

    fn err<T>(&self, at: usize, msg: impl Into<String>) -> Result<T, CompileError> {
        Err(CompileError::at(ErrorKind::Lex, at, msg))
    }

    fn skip_ws_and_comments(&mut self) -> Result<(), CompileError> {
        loop {
            while self.peek_char().is_some_and(char::is_whitespace) {
                self.bump_char();
            }

            // Line comment: // ... \n
            if self.rest().starts_with("//") {
                while self.peek_char().is_some_and(|c| c != '\n') {
                    self.bump_char();
                }
                continue;
            }

            // Block comment: /* ... */
            if self.rest().starts_with("/*") {
                let start = self.i;
                match self.rest()[2..].find("*/") {
                    Some(end) => self.i += 2 + end + 2,
                    None => return self.err(start, "unterminated block comment"),
                }
                continue;
            }

            return Ok(());
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek_char().is_some_and(&pred) {
            self.bump_char();
        }
    }

    fn token_from(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(kind, &self.src[start..self.i], Span::new(start, self.i))
    }

    fn lex_ident_or_kw(&mut self) -> Token {
        let start = self.i;
        self.take_while(|c| c == '_' || c.is_ascii_alphanumeric());
        let text = &self.src[start..self.i];
        let kind = KEYWORDS
            .iter()
            .find(|(kw, _)| *kw == text)
            .map(|(_, kind)| *kind)
            .unwrap_or(TokenKind::Ident);
        self.token_from(kind, start)
    }

    fn lex_number(&mut self) -> Result<Token, CompileError> {
        let start = self.i;
        let rest = self.rest();
        if rest.starts_with("0x") || rest.starts_with("0X") {
            self.i += 2;
            self.take_while(|c| c.is_ascii_hexdigit());
            if self.i == start + 2 {
                return self.err(start, "hex literal needs at least one digit");
            }
        } else if rest.starts_with("0b") || rest.starts_with("0B") {
            self.i += 2;
            self.take_while(|c| c == '0' || c == '1');
            if self.i == start + 2 {
                return self.err(start, "binary literal needs at least one digit");
            }
        } else {
            self.take_while(|c| c.is_ascii_digit());
            // Fraction only when a digit follows the dot.
            let mut chars = self.rest().chars();
            if chars.next() == Some('.') && chars.next().is_some_and(|c| c.is_ascii_digit()) {
                self.bump_char();
                self.take_while(|c| c.is_ascii_digit());
            }
        }
        Ok(self.token_from(TokenKind::Number, start))
    }

    fn lex_string(&mut self) -> Result<Token, CompileError> {
        let start = self.i;
        self.bump_char(); // opening quote
        let body = self.i;
        loop {
            match self.bump_char() {
                Some('"') => break,
                Some('\n') | None => return self.err(start, "unterminated string literal"),
                Some(_) => {}
            }
        }
        Ok(Token::new(
            TokenKind::Str,
            &self.src[body..self.i - 1],
            Span::new(start, self.i),
        ))
    }

    fn lex_punct(&mut self) -> Result<Token, CompileError> {
        let start = self.i;
        let Some((text, kind)) = PUNCT.iter().find(|(p, _)| self.rest().starts_with(*p)) else {
            let ch = self.peek_char().unwrap_or('\0');
            return self.err(start, format!("unrecognized symbol '{}'", ch));
        };
        self.i += text.len();
        Ok(self.token_from(*kind, start))
    }

    pub fn next_token(&mut self) -> Result<Token, CompileError> {
        self.skip_ws_and_comments()?;
        if self.eof() {
            return Ok(Token::new(TokenKind::Eof, "", Span::point(self.i)));
        }
        match self.peek_char() {
            Some('"') => self.lex_string(),
            Some(c) if c.is_ascii_digit() => self.lex_number(),
            Some(c) if c == '_' || c.is_ascii_alphabetic() => Ok(self.lex_ident_or_kw()),
            _ => self.lex_punct(),
        }
    }
}

/// Tokenize a whole (preprocessed) source. The trailing `Eof` is not included.
pub fn lex(src: &str) -> Result<Vec<Token>, CompileError> {
    let mut lexer = Lexer::new(src);
    let mut tokens = Vec::new();
    loop {
        let t = lexer.next_token()?;
        if t.is(TokenKind::Eof) {
            break;
        }
        tokens.push(t);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lex_function_header() {
        use TokenKind::*;
        assert_eq!(
            kinds("i32 add(i32 a, i32 b) {"),
            vec![Type, Ident, LParen, Type, Ident, Comma, Type, Ident, RParen, LBrace]
        );
    }

    #[test]
    fn two_char_operators_win() {
        use TokenKind::*;
        assert_eq!(
            kinds("a <= b >= c == d != e && f || g < h"),
            vec![
                Ident, Le, Ident, Ge, Ident, EqEq, Ident, BangEq, Ident, AmpAmp, Ident,
                PipePipe, Ident, Lt, Ident
            ]
        );
    }

    #[test]
    fn numbers_keep_their_spelling() {
        let toks = lex("0xFF 0b101 3.25 42 7").unwrap();
        let texts: Vec<&str> = toks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["0xFF", "0b101", "3.25", "42", "7"]);
        assert!(toks[..5].iter().all(|t| t.is(TokenKind::Number)));
    }

    #[test]
    fn comments_are_skipped() {
        use TokenKind::*;
        assert_eq!(
            kinds("x // line\n/* block\n comment */ = 1;"),
            vec![Ident, Assign, Number, Semicolon]
        );
    }

    #[test]
    fn string_text_has_no_quotes() {
        let toks = lex("_wasm \"local.get $a\";").unwrap();
        assert_eq!(toks[0].kind, TokenKind::KwWasm);
        assert_eq!(toks[1].kind, TokenKind::Str);
        assert_eq!(toks[1].text, "local.get $a");
        assert_eq!(toks[1].span, Span::new(6, 20));
    }

    #[test]
    fn type_keywords_share_a_kind() {
        let toks = lex("void bool f64 float").unwrap();
        assert_eq!(toks[0].kind, TokenKind::Type);
        assert_eq!(toks[2].text, "f64");
        assert_eq!(toks[3].kind, TokenKind::Ident);
    }

    #[test]
    fn unknown_symbol_is_reported_with_position() {
        let err = lex("i32 x;\nx = 3 % 2;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lex);
        assert_eq!(err.message, "unrecognized symbol '%'");
        assert_eq!(err.line_col("i32 x;\nx = 3 % 2;"), (2, 7));
    }

    #[test]
    fn unterminated_string_and_comment_fail() {
        assert_eq!(lex("\"abc").unwrap_err().message, "unterminated string literal");
        assert_eq!(lex("/* abc").unwrap_err().message, "unterminated block comment");
    }
}

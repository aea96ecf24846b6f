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

use thiserror::Error;

use crate::ast::Span;
use crate::error::{CompileError, ErrorKind};
use crate::semantic::Type;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmitError {
    #[error("empty raw instruction")]
    EmptyRaw,
    #[error("unknown instruction '{0}'")]
    UnknownMnemonic(String),
    #[error("invalid operand '{operand}' for '{mnemonic}'")]
    BadOperand { mnemonic: String, operand: String },
    #[error("unknown local '${0}' in raw instruction")]
    UnknownRawLocal(String),
    #[error("string literals cannot be lowered")]
    StringLiteral,
    #[error("no instruction for operator '{op}' on {ty}")]
    UnsupportedOperator { op: &'static str, ty: Type },
    #[error("cannot cast {from} to {to}")]
    UnsupportedCast { from: Type, to: Type },
    #[error("unresolved local '{0}'")]
    UnresolvedLocal(String),
    #[error("unresolved function '{0}'")]
    UnresolvedFunction(String),
    #[error("{0}")]
    Invariant(String),
}

impl EmitError {
    /// Failures a checked program cannot produce are internal errors.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EmitError::UnresolvedLocal(_)
            | EmitError::UnresolvedFunction(_)
            | EmitError::Invariant(_) => ErrorKind::Internal,
            _ => ErrorKind::Emit,
        }
    }

    pub fn at(self, span: Span) -> CompileError {
        CompileError::new(self.kind(), span, self.to_string())
    }
}

pub type EmitResult<T> = Result<T, EmitError>;

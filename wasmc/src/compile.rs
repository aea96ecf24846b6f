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

// Compilation orchestration: preprocess, lex, parse, analyze, emit.

use std::path::Path;

use thiserror::Error;

use crate::ast::Span;
use crate::error::CompileError;
use crate::lex;
use crate::parse;
use crate::preprocess::{self, Expansion};
use crate::print;
use crate::semantic;
use crate::wasm;

/// Debug dumps requested on the command line.
#[derive(Clone, Copy, Debug, Default)]
pub struct Dumps {
    pub tokens: bool,
    pub tree: bool,
    pub wat: bool,
}

/// Failure of a file compilation, carrying what is needed to render it.
#[derive(Debug, Error)]
pub enum CompileFailure {
    /// The include graph could not be expanded. The message already names the file.
    #[error(transparent)]
    Include(CompileError),
    /// A later phase failed on the expanded source.
    #[error("{err}")]
    Compile { err: CompileError, src: Expansion },
}

impl CompileFailure {
    pub fn render(&self) -> String {
        match self {
            CompileFailure::Include(e) => e.to_string(),
            CompileFailure::Compile { err, src } => err.render_mapped(&src.text, |line| match src.origin(line) {
                Some(o) => (Some(o.file.clone()), o.line),
                None => (None, line),
            }),
        }
    }

    pub fn error(&self) -> &CompileError {
        match self {
            CompileFailure::Include(e) | CompileFailure::Compile { err: e, .. } => e,
        }
    }
}

/// Compile preprocessed source text to a module binary.
pub fn compile_source(src: &str) -> Result<Vec<u8>, CompileError> {
    compile_source_with(src, Dumps::default(), |_| {})
}

/// Like [`compile_source`], handing each requested dump to `sink` as soon as
/// its phase has run, so dumps survive a later failure.
pub fn compile_source_with(
    src: &str,
    dumps: Dumps,
    mut sink: impl FnMut(&str),
) -> Result<Vec<u8>, CompileError> {
    let tokens = lex::lex(src)?;
    if dumps.tokens {
        sink(&print::dump_tokens(src, &tokens));
    }
    let program = parse::parse_tokens(tokens)?;
    if dumps.tree {
        sink(&print::dump_tree(&program));
    }
    let symbols = semantic::analyze(&program)?;
    let module = wasm::build_module(&program, &symbols)?;
    if dumps.wat {
        let text = wasm::render_wat(&module).map_err(|e| e.at(Span::default()))?;
        sink(&text);
    }
    Ok(module.encode())
}

pub fn compile_file(input: &Path) -> Result<Vec<u8>, CompileFailure> {
    compile_file_with(input, Dumps::default(), |_| {})
}

pub fn compile_file_with(
    input: &Path,
    dumps: Dumps,
    sink: impl FnMut(&str),
) -> Result<Vec<u8>, CompileFailure> {
    let src = preprocess::expand_file(input).map_err(CompileFailure::Include)?;
    compile_source_with(&src.text, dumps, sink).map_err(|err| CompileFailure::Compile { err, src })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn dumps_are_emitted_in_phase_order() {
        let mut seen = Vec::new();
        let dumps = Dumps {
            tokens: true,
            tree: true,
            wat: true,
        };
        compile_source_with("void f() { }", dumps, |s| seen.push(s.to_string())).unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].starts_with("1:1 Type 'void'"));
        assert!(seen[1].starts_with("Program\n  FunctionDecl f -> void"));
        assert!(seen[2].starts_with("(module\n"));
    }

    #[test]
    fn tree_dump_survives_a_semantic_error() {
        let mut seen = Vec::new();
        let dumps = Dumps {
            tree: true,
            ..Dumps::default()
        };
        let err = compile_source_with("i32 f() { return y; }", dumps, |s| seen.push(s.to_string()))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Semantic);
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn no_dump_after_a_lex_error() {
        let mut calls = 0;
        let dumps = Dumps {
            tokens: true,
            tree: true,
            wat: true,
        };
        let err = compile_source_with("void f() { @ }", dumps, |_| calls += 1).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lex);
        assert_eq!(calls, 0);
    }

    #[test]
    fn missing_input_is_an_include_failure() {
        let failure = compile_file(Path::new("/nonexistent/wasmc/input.wl")).unwrap_err();
        assert!(matches!(failure, CompileFailure::Include(_)));
        assert_eq!(failure.error().kind, ErrorKind::Include);
        assert!(failure.render().starts_with("include error: cannot read"));
    }
}

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

// `#include "file"` expansion. Runs on raw text before lexing.

use std::fs;
use std::path::{Path, PathBuf};

use crate::ast::Span;
use crate::error::{CompileError, ErrorKind};

const DIRECTIVE: &str = "#include";

fn include_err(at: usize, msg: impl Into<String>) -> CompileError {
    CompileError::new(ErrorKind::Include, Span::point(at), msg)
}

/// File and 1-based line an expanded line was read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineOrigin {
    pub file: String,
    pub line: usize,
}

/// Expanded text with the origin of each of its lines.
#[derive(Clone, Debug, Default)]
pub struct Expansion {
    pub text: String,
    origins: Vec<LineOrigin>,
}

impl Expansion {
    /// Origin of 1-based line `line` of `text`.
    pub fn origin(&self, line: usize) -> Option<&LineOrigin> {
        self.origins.get(line.checked_sub(1)?)
    }
}

/// Read `path` and splice its includes in place, recursively.
pub fn preprocess_file(path: &Path) -> Result<String, CompileError> {
    expand_file(path).map(|e| e.text)
}

/// Like [`preprocess_file`], keeping where every line came from.
pub fn expand_file(path: &Path) -> Result<Expansion, CompileError> {
    let mut pp = Preprocessor::default();
    pp.expand_file(path, None)?;
    Ok(pp.finish())
}

/// Expand includes in an in-memory source; relative includes resolve from `base_dir`.
pub fn preprocess_source(src: &str, base_dir: &Path) -> Result<String, CompileError> {
    let mut pp = Preprocessor::default();
    pp.expand(src, "<input>", base_dir)?;
    Ok(pp.finish().text)
}

#[derive(Default)]
struct Preprocessor {
    /// Files currently being expanded, outermost first.
    stack: Vec<PathBuf>,
    out: Vec<String>,
    origins: Vec<LineOrigin>,
}

impl Preprocessor {
    fn finish(self) -> Expansion {
        Expansion {
            text: self.out.join("\n"),
            origins: self.origins,
        }
    }

    fn expand_file(&mut self, path: &Path, from: Option<(&str, usize)>) -> Result<(), CompileError> {
        let text = fs::read_to_string(path).map_err(|e| {
            let msg = match from {
                Some((parent, _)) => format!("cannot read '{}' included from {}: {}", path.display(), parent, e),
                None => format!("cannot read '{}': {}", path.display(), e),
            };
            include_err(from.map(|(_, at)| at).unwrap_or(0), msg)
        })?;
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if self.stack.contains(&key) {
            return Err(include_err(
                from.map(|(_, at)| at).unwrap_or(0),
                format!("include cycle through '{}'", path.display()),
            ));
        }
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        self.stack.push(key);
        self.expand(&text, &path.display().to_string(), &dir)?;
        self.stack.pop();
        Ok(())
    }

    fn expand(&mut self, text: &str, name: &str, dir: &Path) -> Result<(), CompileError> {
        let mut offset = 0;
        for (i, line) in text.lines().enumerate() {
            let at = offset;
            offset += line.len() + 1;
            let Some(rest) = line.trim_start().strip_prefix(DIRECTIVE) else {
                self.out.push(line.to_string());
                self.origins.push(LineOrigin {
                    file: name.to_string(),
                    line: i + 1,
                });
                continue;
            };
            let target = rest
                .trim()
                .strip_prefix('"')
                .and_then(|r| r.strip_suffix('"'))
                .filter(|t| !t.is_empty() && !t.contains('"'))
                .ok_or_else(|| include_err(at, format!("{}:{}: malformed #include directive", name, i + 1)))?;
            let from = format!("{}:{}", name, i + 1);
            self.expand_file(&dir.join(target), Some((from.as_str(), at)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("wasmc-pp-{}-{}", tag, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn plain_text_passes_through() {
        let out = preprocess_source("i32 a;\n\ni32 b;", Path::new(".")).unwrap();
        assert_eq!(out, "i32 a;\n\ni32 b;");
    }

    #[test]
    fn nested_includes_are_spliced_in_place() {
        let dir = scratch_dir("nested");
        fs::create_dir_all(dir.join("lib")).unwrap();
        fs::write(dir.join("lib/math.wl"), "#include \"inner.wl\"\ni32 sq(i32 x) { return x * x; }").unwrap();
        fs::write(dir.join("lib/inner.wl"), "// inner").unwrap();
        fs::write(dir.join("main.wl"), "// top\n  #include \"lib/math.wl\"\n// end").unwrap();
        let out = preprocess_file(&dir.join("main.wl")).unwrap();
        assert_eq!(out, "// top\n// inner\ni32 sq(i32 x) { return x * x; }\n// end");
    }

    #[test]
    fn expansion_maps_lines_to_their_files() {
        let dir = scratch_dir("origins");
        fs::write(dir.join("inc.wl"), "// one\n// two").unwrap();
        fs::write(dir.join("top.wl"), "// a\n#include \"inc.wl\"\n// b").unwrap();
        let top = dir.join("top.wl");
        let e = expand_file(&top).unwrap();
        assert_eq!(e.text, "// a\n// one\n// two\n// b");
        let at = |line| e.origin(line).map(|o| (o.file.clone(), o.line));
        let inc = dir.join("inc.wl").display().to_string();
        let top = top.display().to_string();
        assert_eq!(at(1), Some((top.clone(), 1)));
        assert_eq!(at(2), Some((inc.clone(), 1)));
        assert_eq!(at(3), Some((inc, 2)));
        assert_eq!(at(4), Some((top, 3)));
        assert_eq!(at(0), None);
        assert_eq!(at(5), None);
    }

    #[test]
    fn missing_include_is_an_error() {
        let dir = scratch_dir("missing");
        let err = preprocess_source("#include \"nope.wl\"", &dir).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Include);
        assert!(err.message.contains("nope.wl"), "{}", err.message);
        assert!(err.message.contains("included from <input>:1"), "{}", err.message);
    }

    #[test]
    fn include_cycle_is_an_error() {
        let dir = scratch_dir("cycle");
        fs::write(dir.join("a.wl"), "#include \"b.wl\"").unwrap();
        fs::write(dir.join("b.wl"), "#include \"a.wl\"").unwrap();
        let err = preprocess_file(&dir.join("a.wl")).unwrap_err();
        assert!(err.message.starts_with("include cycle through"), "{}", err.message);
    }

    #[test]
    fn directive_needs_a_quoted_name() {
        let err = preprocess_source("i32 a;\n#include lib.wl", Path::new(".")).unwrap_err();
        assert_eq!(err.message, "<input>:2: malformed #include directive");
        assert_eq!(err.span, Span::point(7));
    }
}

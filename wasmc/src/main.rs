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

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Arg, ArgAction, Command};

use wasmc::compile::{self, Dumps};

fn cli() -> Command {
    Command::new("wasmc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compile a source file to a WebAssembly module")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_parser(clap::value_parser!(PathBuf))
                .help("source file to compile")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_parser(clap::value_parser!(PathBuf))
                .help("where to write the .wasm module"),
        )
        .arg(
            Arg::new("tree")
                .long("tree")
                .action(ArgAction::SetTrue)
                .help("print the syntax tree"),
        )
        .arg(
            Arg::new("tokens")
                .long("tokens")
                .action(ArgAction::SetTrue)
                .help("print the token stream"),
        )
        .arg(
            Arg::new("wat")
                .long("wat")
                .action(ArgAction::SetTrue)
                .help("print the module in text format"),
        )
}

// The dump flags are also accepted with a single dash.
fn normalize_args(args: impl Iterator<Item = String>) -> Vec<String> {
    args.map(|a| match a.as_str() {
        "-tree" | "-tokens" | "-wat" => format!("-{}", a),
        _ => a,
    })
    .collect()
}

fn run() -> anyhow::Result<ExitCode> {
    let matches = cli().get_matches_from(normalize_args(std::env::args()));
    let Some(input) = matches.get_one::<PathBuf>("input") else {
        anyhow::bail!("no input file given");
    };
    let dumps = Dumps {
        tokens: matches.get_flag("tokens"),
        tree: matches.get_flag("tree"),
        wat: matches.get_flag("wat"),
    };

    let wasm = match compile::compile_file_with(input, dumps, |dump| print!("{}", dump)) {
        Ok(wasm) => wasm,
        Err(failure) => {
            eprintln!("{}", failure.render());
            return Ok(ExitCode::FAILURE);
        }
    };

    if let Some(out) = matches.get_one::<PathBuf>("output") {
        std::fs::write(out, &wasm)
            .with_context(|| format!("failed to write {}", out.display()))?;
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> clap::ArgMatches {
        cli().get_matches_from(normalize_args(args.iter().map(|a| a.to_string())))
    }

    #[test]
    fn single_dash_dump_flags() {
        let m = parse(&["wasmc", "-i", "a.wl", "-tree", "-wat"]);
        assert!(m.get_flag("tree"));
        assert!(m.get_flag("wat"));
        assert!(!m.get_flag("tokens"));
        assert_eq!(m.get_one::<PathBuf>("input"), Some(&PathBuf::from("a.wl")));
    }

    #[test]
    fn input_is_required() {
        let err = cli()
            .try_get_matches_from(["wasmc", "-o", "out.wasm"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }
}

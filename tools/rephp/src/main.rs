// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use clap::Parser;
use clap::builder::ValueHint;
use clap_derive::Parser;
use eyre::eyre;
use figment::Figment;
use figment::providers::{Format as ProviderFormat, Serialized, Yaml};
use rephp_syntax::decode_json;
use rephp_unparse::{UnparseOptions, unparse, unparse_fragment};
use std::io::{Read, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    #[arg(
        value_name = "input",
        help = "JSON php-ast dump to render; standard input when omitted",
        value_hint = ValueHint::FilePath
    )]
    input: Option<PathBuf>,

    #[arg(
        long,
        value_name = "config",
        help = "YAML file of rendering options, applied before command-line overrides",
        value_hint = ValueHint::FilePath
    )]
    config: Option<PathBuf>,

    #[arg(
        long,
        help = "Render the tree as an embeddable fragment: no opening tag, no trailing line break"
    )]
    fragment: bool,

    #[arg(long, help = "Omit the `<?php` opening tag from whole-file output")]
    no_prologue: bool,

    #[arg(long, help = "Spaces per indentation level")]
    indent_width: Option<usize>,

    #[arg(long, help = "Maximum node nesting depth before rendering gives up")]
    max_depth: Option<usize>,

    #[arg(long, help = "Reject node kinds from earlier AST versions instead of translating them")]
    no_legacy: bool,

    #[arg(long, help = "Enable debug logging")]
    debug: bool,
}

impl Args {
    /// Defaults, then the configuration file if we have one, then whatever was given on the
    /// command line.
    fn load_options(&self) -> Result<UnparseOptions, eyre::Report> {
        let mut options = match &self.config {
            Some(config_path) => Figment::new()
                .merge(Serialized::defaults(UnparseOptions::default()))
                .merge(Yaml::file(config_path))
                .extract::<UnparseOptions>()
                .map_err(|e| {
                    eyre!(
                        "Failed to parse configuration from {:?}: {}",
                        config_path,
                        e
                    )
                })?,
            None => UnparseOptions::default(),
        };
        if self.no_prologue {
            options.file_prologue = false;
        }
        if let Some(indent_width) = self.indent_width {
            options.indent_width = indent_width;
        }
        if let Some(max_depth) = self.max_depth {
            options.max_depth = max_depth;
        }
        if self.no_legacy {
            options.translate_legacy = false;
        }
        Ok(options)
    }

    fn read_input(&self) -> Result<String, eyre::Report> {
        match &self.input {
            Some(path) => std::fs::read_to_string(path)
                .map_err(|e| eyre!("Unable to read {:?}: {}", path, e)),
            None => {
                let mut json = String::new();
                std::io::stdin()
                    .read_to_string(&mut json)
                    .map_err(|e| eyre!("Unable to read standard input: {}", e))?;
                Ok(json)
            }
        }
    }
}

fn main() -> Result<(), eyre::Report> {
    color_eyre::install()?;
    let args = Args::parse();

    let main_subscriber = tracing_subscriber::fmt()
        .compact()
        .with_ansi(true)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .with_max_level(if args.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(main_subscriber).unwrap_or_else(|e| {
        eprintln!("Unable to set configure logging: {e}");
        std::process::exit(1);
    });

    let options = args.load_options()?;
    debug!(?options, "rendering options");

    let json = args.read_input()?;
    let tree = decode_json(&json, options.decode_options())?;
    debug!(kind = %tree.describe(), "decoded tree");

    let source = if args.fragment {
        format!("{}\n", unparse_fragment(&tree, &options)?)
    } else {
        unparse(&tree, &options)?
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(source.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

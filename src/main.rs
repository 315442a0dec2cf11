use std::{
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Parser;
use mdtablejson::{
    ConvertOptions, NewlineMode, convert_file, convert_request_file, convert_request_json,
    convert_text, rewrite,
};
use rayon::prelude::*;

#[derive(Parser)]
#[command(
    version,
    about = "Replace Markdown and HTML tables with fenced JSON blocks"
)]
struct Cli {
    /// Rewrite files in place
    #[arg(long = "in-place", requires = "files", conflicts_with = "skill")]
    in_place: bool,
    /// Treat input as a custom-skill request (JSON) and print the response
    #[arg(long = "skill")]
    skill: bool,
    /// How line breaks outside tables are rewritten: `space` or `strip`
    #[arg(long = "newlines", default_value = "space")]
    newlines: NewlineMode,
    /// Markdown files (or request files with `--skill`) to convert
    files: Vec<PathBuf>,
}

impl Cli {
    fn options(&self) -> ConvertOptions {
        ConvertOptions {
            newlines: self.newlines,
        }
    }
}

/// Convert one file, returning the text to print (empty for `--in-place`).
fn process_path(cli: &Cli, path: &Path) -> anyhow::Result<String> {
    let options = cli.options();
    let out = if cli.skill {
        convert_request_file(path, &options)?
    } else if cli.in_place {
        rewrite(path, &options)?;
        String::new()
    } else {
        convert_file(path, &options)?
    };
    Ok(out)
}

/// Entry point for the command-line tool.
///
/// Without file arguments the input is read from standard input. Files are
/// converted in parallel and printed in argument order; a failing file does
/// not stop the others, but makes the process exit with an error.
///
/// # Examples
///
/// ```sh
/// # Convert tables in a file and print to stdout
/// mdtablejson notes.md
///
/// # Convert in place, removing line breaks instead of turning them into spaces
/// mdtablejson --in-place --newlines strip notes.md
///
/// # Answer a custom-skill request
/// mdtablejson --skill < request.json
/// ```
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.files.is_empty() {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input)?;
        let out = if cli.skill {
            convert_request_json(&input, &cli.options())?
        } else {
            convert_text(&input, &cli.options())
        };
        println!("{out}");
        return Ok(());
    }

    let results: Vec<anyhow::Result<String>> = cli
        .files
        .par_iter()
        .map(|path| {
            process_path(&cli, path).with_context(|| format!("failed to process {}", path.display()))
        })
        .collect();

    let mut first_error = None;
    for result in results {
        match result {
            Ok(out) => {
                if !cli.in_place {
                    println!("{out}");
                }
            }
            Err(err) => {
                log::error!("{err:#}");
                first_error.get_or_insert(err);
            }
        }
    }
    first_error.map_or(Ok(()), Err)
}

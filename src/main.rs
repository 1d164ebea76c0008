use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use rumdown_lib::config::{self as rumdown_config, Config, OutputFormat, SafeMode};
use rumdown_lib::exit_codes::exit;
use rumdown_lib::Markdown;

#[derive(Parser)]
#[command(author, version, about, long_about = None, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    convert: ConvertArgs,

    /// Control colored output: auto, always, never
    #[arg(long, global = true, default_value = "auto", value_parser = ["auto", "always", "never"])]
    color: String,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Ignore all configuration files and use built-in defaults
    #[arg(long, global = true)]
    no_config: bool,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a default configuration file in the current directory
    Init,
}

#[derive(Args)]
struct ConvertArgs {
    /// Markdown files to convert; stdin when empty or `-`
    files: Vec<String>,

    /// Write output to this file, or into this directory when converting several files
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Raw HTML policy: default, escape, remove, replace
    #[arg(long)]
    safe_mode: Option<SafeMode>,

    /// Output dialect: xhtml or html
    #[arg(long)]
    output_format: Option<OutputFormat>,

    /// Enable an extension (repeatable)
    #[arg(short = 'x', long = "extension")]
    extensions: Vec<String>,

    /// Spaces per indentation level
    #[arg(long)]
    tab_length: Option<usize>,

    /// Print the element tree as JSON instead of HTML
    #[arg(long)]
    tree: bool,
}

/// One document to convert.
struct Input {
    name: String,
    path: Option<PathBuf>,
    text: String,
}

fn read_inputs(files: &[String]) -> Result<Vec<Input>> {
    if files.is_empty() {
        return Ok(vec![read_stdin()?]);
    }
    files
        .iter()
        .map(|file| {
            if file == "-" {
                return read_stdin();
            }
            let text = fs::read_to_string(file).with_context(|| format!("Failed to read {file}"))?;
            Ok(Input {
                name: file.clone(),
                path: Some(PathBuf::from(file)),
                text,
            })
        })
        .collect()
}

fn read_stdin() -> Result<Input> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read from stdin")?;
    Ok(Input {
        name: "<stdin>".to_string(),
        path: None,
        text,
    })
}

fn render(markdown: &Markdown, input: &Input, tree: bool) -> Result<String> {
    if tree {
        let root = markdown.tree(&input.text)?;
        serde_json::to_string_pretty(&root).with_context(|| format!("Failed to serialize the tree of {}", input.name))
    } else {
        Ok(markdown.convert(&input.text)?)
    }
}

#[cfg(feature = "parallel")]
fn render_all(markdown: &Markdown, inputs: &[Input], tree: bool) -> Vec<Result<String>> {
    use rayon::prelude::*;
    inputs.par_iter().map(|input| render(markdown, input, tree)).collect()
}

#[cfg(not(feature = "parallel"))]
fn render_all(markdown: &Markdown, inputs: &[Input], tree: bool) -> Vec<Result<String>> {
    inputs.iter().map(|input| render(markdown, input, tree)).collect()
}

/// Where the output of `input` goes when `--output` names a directory.
fn output_path_in(dir: &Path, input: &Input, index: usize, tree: bool) -> PathBuf {
    let extension = if tree { "json" } else { "html" };
    let stem = input
        .path
        .as_deref()
        .and_then(Path::file_stem)
        .map_or_else(|| format!("stdin-{index}"), |s| s.to_string_lossy().into_owned());
    dir.join(format!("{stem}.{extension}"))
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    fs::write(path, format!("{content}\n")).with_context(|| format!("Failed to write {}", path.display()))
}

fn build_options(cli: &Cli) -> Result<rumdown_lib::Options> {
    let config = Config::load_with_discovery(cli.config.as_deref(), cli.no_config)?;
    let mut options = config.global;
    let args = &cli.convert;
    if let Some(safe_mode) = args.safe_mode {
        options.safe_mode = safe_mode;
    }
    if let Some(format) = args.output_format {
        options.output_format = format;
    }
    if let Some(tab_length) = args.tab_length {
        options.tab_length = tab_length;
    }
    for extension in &args.extensions {
        if !options.extensions.contains(extension) {
            options.extensions.push(extension.clone());
        }
    }
    Ok(options)
}

fn run_convert(cli: &Cli) -> Result<bool> {
    let options = build_options(cli)?;
    log::debug!("[rumdown] Effective options: {options:?}");
    let markdown = Markdown::new(options)?;
    let args = &cli.convert;
    let inputs = read_inputs(&args.files)?;
    let results = render_all(&markdown, &inputs, args.tree);

    let mut all_ok = true;
    let mut stdout = io::stdout().lock();
    for (index, (input, result)) in inputs.iter().zip(results).enumerate() {
        let content = match result {
            Ok(content) => content,
            Err(err) => {
                eprintln!("{}: {}: {:#}", "Error".red().bold(), input.name, err);
                all_ok = false;
                continue;
            }
        };
        match &args.output {
            Some(dir) if inputs.len() > 1 => {
                fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
                write_output(&output_path_in(dir, input, index, args.tree), &content)?;
            }
            Some(file) => write_output(file, &content)?,
            None => writeln!(stdout, "{content}").context("Failed to write to stdout")?,
        }
    }
    stdout.flush().context("Failed to write to stdout")?;
    Ok(all_ok)
}

fn main() {
    let cli = Cli::parse();

    match cli.color.as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::unset_override(),
    }

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env().filter_level(level).init();

    if let Some(Commands::Init) = cli.command {
        match rumdown_config::create_default_config(".rumdown.toml") {
            Ok(()) => {
                println!("Created default configuration file: .rumdown.toml");
                exit::success();
            }
            Err(e) => {
                eprintln!("{}: Failed to create config file: {}", "Error".red().bold(), e);
                exit::tool_error();
            }
        }
    }

    match run_convert(&cli) {
        Ok(true) => exit::success(),
        Ok(false) => exit::conversion_failed(),
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            exit::tool_error();
        }
    }
}

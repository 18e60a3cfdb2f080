mod test_runner;

use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::EnvFilter;

use editor::{Command as EditCommand, Editor, EditorConfig, MixedSelectionPolicy};
use richtext::{Document, Selection, serialize};

#[derive(Parser)]
#[command(name = "rte", version, about = "Rich-text document tool")]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import a Markdown file and print its HTML
    Render(RenderArgs),

    /// Apply editing commands to a Markdown file and print the result
    Edit(EditArgs),

    /// Run .test.md test files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Markdown source file
    file: String,

    /// Import only, don't print (exit 0 if valid)
    #[arg(long)]
    check: bool,

    /// Dump the document tree
    #[arg(long)]
    ast: bool,

    /// Print Markdown instead of HTML
    #[arg(long)]
    markdown: bool,
}

#[derive(clap::Args)]
struct EditArgs {
    /// Markdown source file
    file: String,

    /// Selection as `block:run:offset..block:run:offset`, or a single caret point
    #[arg(short, long, default_value = "0:0:0")]
    select: Selection,

    /// Command to apply (bold, italic, underline, highlight, strikethrough,
    /// code, paragraph, undo, redo). Repeatable; applied in order.
    #[arg(short = 'c', long = "command", required = true)]
    commands: Vec<EditCommand>,

    /// How a mark toggle resolves runs that disagree
    #[arg(long, default_value_t = MixedSelectionPolicy::default())]
    policy: MixedSelectionPolicy,

    /// Print Markdown instead of HTML
    #[arg(long)]
    markdown: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.md file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Render(args) => do_render(args, cli.no_color),
        Command::Edit(args) => do_edit(args, cli.no_color),
        Command::Test(args) => {
            let path = Path::new(&args.path);
            if args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &args.category);
            process::exit(exit_code);
        }
    }
}

/// Log to stderr, filtered by `RTE_LOG` (defaults to warnings only).
fn init_logging() {
    let filter = EnvFilter::try_from_env("RTE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn do_render(args: RenderArgs, no_color: bool) {
    let document = import(&args.file, no_color);

    if args.check {
        eprintln!("ok: {} imported successfully", args.file);
        return;
    }

    if args.ast {
        println!("{:#?}", document);
        return;
    }

    print_document(&document, args.markdown);
}

fn do_edit(args: EditArgs, no_color: bool) {
    let document = import(&args.file, no_color);
    let config = EditorConfig {
        mixed_selection: args.policy,
        ..EditorConfig::default()
    };

    let mut editor = match Editor::with_document(document, config) {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    for command in &args.commands {
        match editor.apply(&args.select, *command) {
            Ok(true) => tracing::info!(%command, "document changed"),
            Ok(false) => tracing::info!(%command, "no change"),
            Err(e) => {
                eprintln!("error: {}: {}", command, e);
                process::exit(1);
            }
        }
    }

    print_document(editor.document(), args.markdown);
}

fn print_document(document: &Document, markdown: bool) {
    if markdown {
        println!("{}", document);
    } else {
        println!("{}", serialize(document));
    }
}

/// Read and import a Markdown file, reporting diagnostics. Exits on failure.
fn import(file: &str, no_color: bool) -> Document {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    let source = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", file, e);
            process::exit(1);
        }
    };

    let mut files = SimpleFiles::new();
    let file_id = files.add(file.to_string(), source.clone());

    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();

    let parser = richtext::parser::Parser::new(source, file_id);
    match parser.parse() {
        Ok(parsed) => {
            for warning in &parsed.warnings {
                let diagnostic = warning.to_diagnostic();
                let _ =
                    term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
            }
            parsed.document
        }
        Err(errors) => {
            for error in &errors {
                let diagnostic = error.to_diagnostic();
                let _ =
                    term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
            }
            process::exit(1);
        }
    }
}

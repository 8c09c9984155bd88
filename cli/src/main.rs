mod test_runner;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use log::{LevelFilter, warn};

use mailcraft::personalize::{Personalization, personalize, scan};
use mailcraft::{Document, import_html, render_email, render_rows};
use mailcraft_cli::config::Config;
use mailcraft_cli::delivery::{
    Campaign, OutboxTransport, SmtpTransport, Transport, parse_recipients, send_batch,
};

#[derive(Parser)]
#[command(name = "mailcraft", version, about = "Email template builder and importer")]
struct Cli {
    /// Disable colored diagnostics
    #[arg(long, global = true)]
    no_color: bool,

    /// Config file (defaults to ./mailcraft.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a document JSON file to email HTML
    Render(RenderArgs),

    /// Import an exported template back into document JSON
    Import(ImportArgs),

    /// Compose a document from a Markdown draft
    Draft(DraftArgs),

    /// Check that a template imports cleanly and uses known placeholders
    Check(CheckArgs),

    /// Fill in placeholders for a single recipient
    Personalize(PersonalizeArgs),

    /// Personalize and deliver a template to a recipient list
    Send(SendArgs),

    /// Run .test.html fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Document JSON file
    file: PathBuf,

    /// Write output here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit only the block rows, without the email scaffold
    #[arg(long)]
    body_only: bool,
}

#[derive(clap::Args)]
struct ImportArgs {
    /// Exported HTML template
    file: PathBuf,

    /// Write document JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct DraftArgs {
    /// Markdown draft
    file: PathBuf,

    /// Write output here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit the rendered email instead of document JSON
    #[arg(long)]
    html: bool,
}

#[derive(clap::Args)]
struct CheckArgs {
    /// Exported HTML template
    file: PathBuf,
}

#[derive(clap::Args)]
struct PersonalizeArgs {
    /// Exported HTML template
    file: PathBuf,

    #[arg(long)]
    email: String,

    #[arg(long)]
    subject: String,

    #[arg(long)]
    campaign_id: String,

    /// Write output here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct SendArgs {
    /// Exported HTML template
    file: PathBuf,

    #[arg(long)]
    subject: String,

    #[arg(long)]
    campaign_id: String,

    /// Recipient list, one address per line
    #[arg(long)]
    recipients: PathBuf,

    /// Write to this outbox directory, even when an SMTP relay is configured
    #[arg(long)]
    outbox: Option<PathBuf>,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.html file or directory containing them
    path: PathBuf,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let color_choice = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    if let Command::Test(args) = &cli.command {
        if args.list_categories {
            test_runner::list_categories(&args.path);
            return;
        }
        let exit_code = test_runner::run_tests(&args.path, cli.no_color, &args.category);
        process::exit(exit_code);
    }

    let result = Config::load(cli.config.as_deref(), Path::new("."))
        .context("loading configuration")
        .and_then(|config| dispatch(cli.command, &config, color_choice));

    match result {
        Ok(0) => {}
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("error: {:#}", err);
            process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    if std::env::var_os("RUST_LOG").is_some() {
        let _ = env_logger::try_init();
        return;
    }
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = env_logger::builder()
        .filter_module("mailcraft", level)
        .filter_module("mailcraft_cli", level)
        .filter_module("editor", level)
        .try_init();
}

/// Run one command. Returns the process exit code.
fn dispatch(command: Command, config: &Config, color: ColorChoice) -> Result<i32> {
    match command {
        Command::Render(args) => do_render(args, config),
        Command::Import(args) => do_import(args, config, color),
        Command::Draft(args) => do_draft(args, config),
        Command::Check(args) => do_check(args, config, color),
        Command::Personalize(args) => do_personalize(args),
        Command::Send(args) => do_send(args, config),
        Command::Test(_) => Ok(0),
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read '{}'", path.display()))
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("cannot write '{}'", path.display())),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}

fn emit(color: ColorChoice, files: &SimpleFiles<String, String>, diagnostics: &[Diagnostic<usize>]) {
    let writer = StandardStream::stderr(color);
    let config = term::Config::default();
    for diagnostic in diagnostics {
        let _ = term::emit_to_write_style(&mut writer.lock(), &config, files, diagnostic);
    }
}

fn do_render(args: RenderArgs, config: &Config) -> Result<i32> {
    let source = read(&args.file)?;
    let document = Document::from_json(&source)
        .with_context(|| format!("invalid document '{}'", args.file.display()))?;
    let html = if args.body_only {
        render_rows(&document)
    } else {
        render_email(&document, &config.export)
    };
    write_output(args.output.as_deref(), &html)?;
    Ok(0)
}

fn do_import(args: ImportArgs, config: &Config, color: ColorChoice) -> Result<i32> {
    let source = read(&args.file)?;
    let mut files = SimpleFiles::new();
    let file_id = files.add(args.file.display().to_string(), source.clone());

    let imported = match import_html(&source, &config.import_options()) {
        Ok(imported) => imported,
        Err(err) => {
            emit(color, &files, &[err.to_diagnostic()]);
            return Ok(1);
        }
    };

    let warnings: Vec<_> = imported
        .warnings
        .iter()
        .map(|w| w.to_diagnostic(file_id))
        .collect();
    emit(color, &files, &warnings);

    let json = imported
        .document
        .to_json()
        .context("serializing imported document")?;
    write_output(args.output.as_deref(), &json)?;
    Ok(0)
}

fn do_draft(args: DraftArgs, config: &Config) -> Result<i32> {
    let source = read(&args.file)?;
    let document = mailcraft::draft::draft_document(&source)
        .with_context(|| format!("cannot draft '{}'", args.file.display()))?;
    let out = if args.html {
        render_email(&document, &config.export)
    } else {
        document.to_json().context("serializing drafted document")?
    };
    write_output(args.output.as_deref(), &out)?;
    Ok(0)
}

fn do_check(args: CheckArgs, config: &Config, color: ColorChoice) -> Result<i32> {
    let source = read(&args.file)?;
    let mut files = SimpleFiles::new();
    let file_id = files.add(args.file.display().to_string(), source.clone());

    let imported = match import_html(&source, &config.import_options()) {
        Ok(imported) => imported,
        Err(err) => {
            emit(color, &files, &[err.to_diagnostic()]);
            return Ok(1);
        }
    };

    let mut diagnostics: Vec<Diagnostic<usize>> = imported
        .warnings
        .iter()
        .map(|w| w.to_diagnostic(file_id))
        .collect();

    for token in scan(&source) {
        if token.placeholder.is_none() {
            warn!("unknown placeholder {{{{{}}}}}", token.name);
            diagnostics.push(
                Diagnostic::warning()
                    .with_message(format!("unknown placeholder `{}`", token.name))
                    .with_labels(vec![
                        Label::primary(file_id, token.span)
                            .with_message("left unchanged when personalizing"),
                    ]),
            );
        }
    }
    emit(color, &files, &diagnostics);

    eprintln!(
        "ok: {} block(s), {} warning(s)",
        imported.document.len(),
        diagnostics.len()
    );
    Ok(0)
}

fn do_personalize(args: PersonalizeArgs) -> Result<i32> {
    let source = read(&args.file)?;
    let values = Personalization::new(args.email, args.subject, args.campaign_id);
    write_output(args.output.as_deref(), &personalize(&source, &values))?;
    Ok(0)
}

fn do_send(args: SendArgs, config: &Config) -> Result<i32> {
    let template = read(&args.file)?;
    let recipients = parse_recipients(&read(&args.recipients)?);
    if recipients.is_empty() {
        anyhow::bail!("no recipients in '{}'", args.recipients.display());
    }

    let campaign = Campaign {
        id: args.campaign_id,
        subject: args.subject,
        from: config.delivery.from.clone(),
    };

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    let (report, destination) = runtime.block_on(async {
        let (transport, destination): (Box<dyn Transport>, String) =
            match (args.outbox, &config.delivery.smtp) {
                (None, Some(smtp)) => {
                    let relay = SmtpTransport::new(smtp)?;
                    let destination = format!("relayed through {}", relay.host());
                    (Box::new(relay) as Box<dyn Transport>, destination)
                }
                (outbox, _) => {
                    let outbox = OutboxTransport::new(
                        outbox.unwrap_or_else(|| config.delivery.outbox.clone()),
                    );
                    let destination = format!("written to {}", outbox.dir().display());
                    (Box::new(outbox) as Box<dyn Transport>, destination)
                }
            };
        let report = send_batch(transport.as_ref(), &template, &campaign, &recipients).await;
        anyhow::Ok((report, destination))
    })?;

    for outcome in &report.results {
        match &outcome.result {
            Ok(id) => println!("sent    {} ({})", outcome.email, id),
            Err(err) => println!("failed  {}: {}", outcome.email, err),
        }
    }
    println!("{} sent, {} failed, {}", report.sent, report.failed, destination);
    Ok(if report.failed == 0 { 0 } else { 1 })
}

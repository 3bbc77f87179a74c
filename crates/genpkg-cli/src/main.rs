//! genpkg - Generate a package from package templates

mod logging;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use colored::Colorize;
use genpkg_core::prompts::DefaultsPrompter;
use genpkg_core::tui::{fetch_template, CliclackPrompter};
use genpkg_core::{Generator, Prompter, Settings, TemplateFetcher, TemplateReference};
use std::path::PathBuf;
use std::process::ExitCode;

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Printed after a package has been written
const SUCCESS_MESSAGE: &str = "generated package successfuly";

/// Exit code used when the user interrupts the run
const INTERRUPTED: u8 = 130;

#[derive(Parser, Debug)]
#[command(name = "genpkg")]
#[command(about = "Generate a package from package templates simply")]
#[command(version, disable_version_flag = true)]
pub struct Args {
    /// The project location
    #[arg(default_value = ".")]
    pub dirname: PathBuf,

    /// Template source (by default pulls the #main branch)
    #[arg(short, long)]
    pub template: String,

    /// Accept every default answer without prompting
    #[arg(short, long)]
    pub yes: bool,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(INTERRUPTED.into());
    })
    .ok();

    let args = Args::parse();

    if let Err(e) = logging::init_logging() {
        eprintln!("{e}");
    }

    let result = run(args).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let interrupted = matches!(
                e.downcast_ref::<genpkg_core::Error>(),
                Some(genpkg_core::Error::PromptAborted)
            );
            eprintln!("{} {}", "Error:".red().bold(), render_error(&e));
            if interrupted {
                ExitCode::from(INTERRUPTED)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let settings = Settings::from_env(format!("genpkg/{}", CLI_VERSION));
    let fetcher = TemplateFetcher::new(&settings);
    let reference = TemplateReference::classify(&args.template);
    tracing::debug!(reference = %reference, dest = %args.dirname.display(), "starting");

    let template_dir = fetch_template(&fetcher, &reference)
        .await
        .with_context(|| format!("unable to get template from: {}.", args.template))?;

    let mut prompter: Box<dyn Prompter> = if args.yes {
        Box::new(DefaultsPrompter)
    } else {
        cliclack::intro("genpkg")?;
        Box::new(CliclackPrompter::new())
    };

    let report = Generator::new()
        .generate(&template_dir, &args.dirname, prompter.as_mut())
        .await
        .context("unable to generate template.")?;

    if let Some(message) = report.message {
        println!("{}", message);
    }
    println!("{}", SUCCESS_MESSAGE);

    Ok(())
}

/// Outer context on the first line, underlying causes below it
fn render_error(e: &anyhow::Error) -> String {
    e.chain()
        .map(|cause| cause.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_dirname_defaults_to_current_dir() {
        let args = Args::try_parse_from(["genpkg", "-t", "./tmpl"]).unwrap();
        assert_eq!(args.dirname, PathBuf::from("."));
        assert_eq!(args.template, "./tmpl");
        assert!(!args.yes);
    }

    #[test]
    fn test_template_is_required() {
        assert!(Args::try_parse_from(["genpkg", "out"]).is_err());
    }

    #[test]
    fn test_render_error_joins_causes() {
        let err = anyhow::anyhow!("template path ./x does not exist")
            .context("unable to get template from: ./x.");
        assert_eq!(
            render_error(&err),
            "unable to get template from: ./x.\ntemplate path ./x does not exist"
        );
    }
}

//! Command dispatch

use std::io;

use clap::CommandFactory;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::SelectionService;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::render::{render_tree, resolve_service, PrintingRenderer, RenderOptions};
use crate::config::{global_config_path, Settings};
use crate::domain::NodeId;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::Prompt;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(catalog) = &cli.catalog {
        settings.catalog = Some(catalog.clone());
    }
    if !settings.color {
        output::disable_colors();
    }
    debug!("settings: {:?}", settings);

    let container = ServiceContainer::new(settings);

    match &cli.command {
        Some(Commands::Tree) | None => cmd_tree(&container),
        Some(Commands::Toggle { services }) => cmd_toggle(&container, services),
        Some(Commands::Total { services }) => cmd_total(&container, services),
        Some(Commands::Interactive) => {
            let mut svc = container.selection_service()?;
            let opts = RenderOptions::from(container.settings.as_ref());
            run_interactive(&mut svc, container.prompt.as_ref(), &opts)
        }
        Some(Commands::Config { command }) => cmd_config(&container.settings, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

/// Map every argument to an id before anything is toggled.
///
/// All unknown arguments are reported together.
pub fn resolve_all(svc: &SelectionService, args: &[String]) -> CliResult<Vec<NodeId>> {
    let (ids, unknown): (Vec<_>, Vec<_>) = args
        .iter()
        .map(|arg| resolve_service(svc.tree(), arg).ok_or(arg))
        .partition(Result::is_ok);

    if !unknown.is_empty() {
        let names = unknown.into_iter().filter_map(Result::err).join(", ");
        return Err(CliError::UnknownService(names));
    }
    Ok(ids.into_iter().filter_map(Result::ok).collect())
}

fn print_tree(svc: &SelectionService, opts: &RenderOptions) {
    output::info(&render_tree(svc.tree(), opts));
    output::header(&opts.total(svc.total()));
}

#[instrument(skip(container))]
fn cmd_tree(container: &ServiceContainer) -> CliResult<()> {
    let svc = container.selection_service()?;
    print_tree(&svc, &RenderOptions::from(container.settings.as_ref()));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_toggle(container: &ServiceContainer, services: &[String]) -> CliResult<()> {
    let opts = RenderOptions::from(container.settings.as_ref());
    let mut svc = container.selection_service()?;
    let ids = resolve_all(&svc, services)?;
    svc.subscribe(PrintingRenderer::new(opts.clone()));

    for id in ids {
        if let Some(node) = svc.tree().get(id) {
            output::info(&format!("toggle {}", opts.label(node)));
        }
        svc.toggle(id)?;
    }
    print_tree(&svc, &opts);
    Ok(())
}

#[instrument(skip(container))]
fn cmd_total(container: &ServiceContainer, services: &[String]) -> CliResult<()> {
    let opts = RenderOptions::from(container.settings.as_ref());
    let mut svc = container.selection_service()?;
    for id in resolve_all(&svc, services)? {
        svc.toggle(id)?;
    }
    output::info(&opts.price(svc.total()));
    Ok(())
}

fn cmd_config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => output::warning("no config directory on this platform"),
        },
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Toggle(String),
    Check(String),
    Uncheck(String),
    Clear,
    Tree,
    Total,
    Help,
    Quit,
    Empty,
}

impl ReplCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };
        let needs_arg = |make: fn(String) -> ReplCommand| {
            if rest.is_empty() {
                Err(format!("'{}' needs a service id or title", word))
            } else {
                Ok(make(rest.to_string()))
            }
        };
        match word.to_ascii_lowercase().as_str() {
            "" => Ok(Self::Empty),
            "toggle" | "t" => needs_arg(Self::Toggle),
            "check" | "c" => needs_arg(Self::Check),
            "uncheck" | "u" => needs_arg(Self::Uncheck),
            "clear" => Ok(Self::Clear),
            "tree" | "ls" => Ok(Self::Tree),
            "total" => Ok(Self::Total),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(format!("unknown command '{}' (try 'help')", other)),
        }
    }
}

const REPL_HELP: &str =
    "commands: toggle <x>, check <x>, uncheck <x>, clear, tree, total, help, quit";

/// Read commands until `quit` or end of input.
///
/// Bad input is reported and the loop continues; only I/O errors end it.
pub fn run_interactive(
    svc: &mut SelectionService,
    prompt: &dyn Prompt,
    opts: &RenderOptions,
) -> CliResult<()> {
    svc.subscribe(PrintingRenderer::new(opts.clone()));
    print_tree(svc, opts);

    loop {
        let Some(line) = prompt
            .read_line("svcpick>")
            .map_err(|e| crate::infrastructure::InfraError::io("read command", e))?
        else {
            break;
        };

        let command = match ReplCommand::parse(&line) {
            Ok(c) => c,
            Err(msg) => {
                output::error(&msg);
                continue;
            }
        };

        let result = match command {
            ReplCommand::Toggle(arg) => lookup(svc, &arg).map(|id| svc.toggle(id).map(|_| ())),
            ReplCommand::Check(arg) => {
                lookup(svc, &arg).map(|id| svc.set_checked(id, true).map(|_| ()))
            }
            ReplCommand::Uncheck(arg) => {
                lookup(svc, &arg).map(|id| svc.set_checked(id, false).map(|_| ()))
            }
            ReplCommand::Clear => {
                svc.clear();
                None
            }
            ReplCommand::Tree => {
                print_tree(svc, opts);
                None
            }
            ReplCommand::Total => {
                output::header(&opts.total(svc.total()));
                None
            }
            ReplCommand::Help => {
                output::info(REPL_HELP);
                None
            }
            ReplCommand::Quit => break,
            ReplCommand::Empty => None,
        };

        if let Some(Err(e)) = result {
            output::error(&e);
        }
    }
    Ok(())
}

fn lookup(svc: &SelectionService, arg: &str) -> Option<NodeId> {
    let id = resolve_service(svc.tree(), arg);
    if id.is_none() {
        output::error(&CliError::UnknownService(arg.to_string()));
    }
    id
}

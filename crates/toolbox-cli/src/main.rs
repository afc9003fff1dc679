use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};
use toolbox_editor_core::{DualView, HostFeatures, RenderedView, Selection, Toolbar};

mod config;

use config::Config;

#[derive(Parser)]
#[command(version, about = "Toolbox - apply rich-text toolbar actions to markup", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply actions to a document and print the resulting markup
    Apply {
        /// Markup file to edit, or `-` for stdin
        input: PathBuf,

        /// Selected range as `START..END` char offsets, or a caret `N`.
        /// Repeat to select several ranges in the rendered view.
        #[arg(long = "select", value_parser = parse_selection)]
        selections: Vec<Selection>,

        /// Action to run, in order
        #[arg(long = "action")]
        actions: Vec<String>,

        /// View the selection and actions apply to
        #[arg(long, value_enum, default_value_t = ViewArg::Rendered)]
        view: ViewArg,

        /// Selection API the simulated host exposes
        #[arg(long, value_enum, default_value_t = HostArg::Modern)]
        host: HostArg,

        /// Path to config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the markup here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// List registered action names
    Actions {
        /// Path to config file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ViewArg {
    /// Structured document, offsets count text only
    Rendered,
    /// Raw markup text, offsets count every char
    Markup,
}

#[derive(Clone, Copy, ValueEnum)]
enum HostArg {
    Modern,
    Legacy,
    None,
}

impl From<HostArg> for HostFeatures {
    fn from(host: HostArg) -> Self {
        match host {
            HostArg::Modern => HostFeatures::MODERN,
            HostArg::Legacy => HostFeatures::LEGACY,
            HostArg::None => HostFeatures::NONE,
        }
    }
}

fn main() -> Result<()> {
    init_miette();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Apply {
            input,
            selections,
            actions,
            view,
            host,
            config,
            output,
        } => {
            let config = Config::load(config.as_deref())?;
            let source = read_input(&input)?;
            let views = open_views(&source, view, host.into(), &selections)?;
            let mut toolbar = Toolbar::new(config.catalog()?, views);

            for action in &actions {
                let applied = toolbar.on_action(action)?;
                if !applied {
                    tracing::info!("action `{action}` had nothing to act on");
                }
            }

            let markup = toolbar.views().markup().content();
            match output {
                Some(path) => std::fs::write(&path, markup).into_diagnostic()?,
                None => println!("{markup}"),
            }
        }
        Commands::Actions { config } => {
            let catalog = Config::load(config.as_deref())?.catalog()?;
            for name in catalog.names() {
                println!("{name}");
            }
        }
    }

    Ok(())
}

fn open_views(
    source: &str,
    view: ViewArg,
    host: HostFeatures,
    selections: &[Selection],
) -> Result<DualView> {
    match view {
        ViewArg::Rendered => {
            let mut views = DualView::new(RenderedView::from_markup(source, host));
            if let Some((first, rest)) = selections.split_first() {
                views.select_rendered(Some(*first));
                for sel in rest {
                    views.add_rendered_range(*sel);
                }
            }
            Ok(views)
        }
        ViewArg::Markup => {
            let mut views = DualView::from_markup(source, host);
            match selections {
                [] => {}
                [sel] => views.select_markup(*sel),
                _ => {
                    return Err(miette::miette!(
                        "the markup view supports a single --select range"
                    ));
                }
            }
            Ok(views)
        }
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .into_diagnostic()?;
        return Ok(buf);
    }
    std::fs::read_to_string(path)
        .into_diagnostic()
        .map_err(|e| e.wrap_err(format!("could not read {}", path.display())))
}

/// `START..END` or a caret offset `N`.
fn parse_selection(s: &str) -> std::result::Result<Selection, String> {
    let offset = |v: &str| {
        v.trim()
            .parse::<usize>()
            .map_err(|_| format!("`{v}` is not a char offset"))
    };
    match s.split_once("..") {
        Some((start, end)) => Ok(Selection::new(offset(start)?, offset(end)?)),
        None => Ok(Selection::caret(offset(s)?)),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("3..9"), Ok(Selection::new(3, 9)));
        assert_eq!(parse_selection("9..3"), Ok(Selection::new(9, 3)));
        assert_eq!(parse_selection("4"), Ok(Selection::caret(4)));
        assert!(parse_selection("a..3").is_err());
        assert!(parse_selection("").is_err());
    }

    #[test]
    fn test_open_views_rendered_ranges() {
        let sels = [Selection::new(0, 1), Selection::new(2, 3)];
        let views = open_views("abc", ViewArg::Rendered, HostFeatures::MODERN, &sels).unwrap();
        assert_eq!(views.rendered().ranges(), &sels);
    }

    #[test]
    fn test_open_views_markup_rejects_multiple_ranges() {
        let sels = [Selection::new(0, 1), Selection::new(2, 3)];
        assert!(open_views("abc", ViewArg::Markup, HostFeatures::MODERN, &sels).is_err());
    }
}

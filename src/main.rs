use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use paneweave::app::{Action, AppState, Workbench};
use paneweave::config::{load_config, WorkbenchConfig};
use paneweave::continuity::FileContinuityStore;
use paneweave::layout::{pane_at, SplitDirection, SplitNode, SplitPath};
use paneweave::models::PaneId;
use paneweave::persistence::JsonFileStore;
use paneweave::terminal::LoggingTerminalHost;

#[derive(Parser)]
#[command(name = "paneweave")]
#[command(version)]
#[command(about = "Inspect and edit a project's tiled session workspace")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project whose workspace is loaded (defaults to the current directory)
    #[arg(short, long, env = "PANEWEAVE_PROJECT")]
    project: Option<String>,

    /// Working directory for newly created sessions
    #[arg(long)]
    cwd: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tree, panes, pane rectangles and dividers
    Show,
    /// Create the first session, or add one to the focused pane
    New,
    /// Split the focused pane
    Split {
        #[arg(value_enum)]
        direction: DirectionArg,
    },
    /// Close a pane and all of its sessions
    ClosePane { pane: String },
    /// Hide a pane without removing it from the layout
    Minimize { pane: String },
    /// Show a minimized pane again
    Restore { pane: String },
    /// Move a divider. PATH is `root` or `/`-joined first/second steps
    Ratio { path: String, ratio: f64 },
    /// Pane under a normalized point
    At { x: f64, y: f64 },
    /// List resumable assistant sessions, newest first
    History,
    /// Rewrite the stored workspace in the current schema
    Migrate,
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    /// Side by side
    #[value(alias = "horizontal")]
    H,
    /// Stacked
    #[value(alias = "vertical")]
    V,
}

impl From<DirectionArg> for SplitDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::H => SplitDirection::Horizontal,
            DirectionArg::V => SplitDirection::Vertical,
        }
    }
}

fn init_tracing(config: &WorkbenchConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        config
            .log_filter
            .as_deref()
            .and_then(|f| EnvFilter::try_new(f).ok())
            .unwrap_or_else(|| EnvFilter::new("info"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config();
    init_tracing(&config);

    let cwd = match cli.cwd {
        Some(cwd) => cwd,
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    let project_id = cli
        .project
        .unwrap_or_else(|| cwd.to_string_lossy().into_owned());

    let data_dir = config.resolved_data_dir();
    let store = Arc::new(JsonFileStore::new(data_dir.clone()));
    let terminal = Arc::new(LoggingTerminalHost::new(config.shell.clone()));
    let continuity = Arc::new(FileContinuityStore::new(data_dir.join("continuity")));

    let mut bench = Workbench::open(&project_id, &config, store, terminal, continuity);
    for warning in bench.restore_warnings() {
        eprintln!("warning: {}", warning);
    }

    let result = run_command(&mut bench, cli.command, cwd);
    bench.shutdown();
    result
}

fn run_command(bench: &mut Workbench, command: Commands, cwd: PathBuf) -> Result<()> {
    match command {
        Commands::Show => print_workspace(bench.state()),
        Commands::New => {
            let action = match bench.state().layout.focused_pane_id {
                _ if bench.state().data.panes.is_empty() => Action::CreateFirstSession { cwd },
                Some(pane_id) => Action::CreateSessionInPane { pane_id, cwd },
                None => bail!("no focused pane to add a session to"),
            };
            bench.dispatch(action);
            print_workspace(bench.state());
        }
        Commands::Split { direction } => {
            if !bench.dispatch(Action::SplitPane {
                direction: direction.into(),
                cwd,
            }) {
                bail!("nothing to split; create a session first");
            }
            print_workspace(bench.state());
        }
        Commands::ClosePane { pane } => {
            let pane_id = resolve_pane(bench.state(), &pane)?;
            bench.dispatch(Action::ClosePane(pane_id));
            print_workspace(bench.state());
        }
        Commands::Minimize { pane } => {
            let pane_id = resolve_pane(bench.state(), &pane)?;
            bench.dispatch(Action::MinimizePane(pane_id));
            print_workspace(bench.state());
        }
        Commands::Restore { pane } => {
            let pane_id = resolve_pane(bench.state(), &pane)?;
            bench.dispatch(Action::RestorePane(pane_id));
            print_workspace(bench.state());
        }
        Commands::Ratio { path, ratio } => {
            let path: SplitPath = if path == "root" {
                SplitPath::root()
            } else {
                path.parse()?
            };
            if !bench.dispatch(Action::UpdateSplitRatio { path, ratio }) {
                eprintln!("ratio unchanged");
            }
            print_workspace(bench.state());
        }
        Commands::At { x, y } => match pane_at(&bench.state().bounds(), x, y) {
            Some(pane_id) => println!("{}", describe_pane(bench.state(), pane_id)),
            None => println!("(no visible pane)"),
        },
        Commands::History => {
            let entries = bench.history().list(&bench.state().project_id);
            if entries.is_empty() {
                println!("No resumable sessions");
            }
            for entry in entries {
                println!(
                    "{}  {}  {}  {}",
                    entry.closed_at.format("%Y-%m-%d %H:%M"),
                    entry.bound_assistant_id,
                    entry.session_name,
                    entry.last_title.unwrap_or_default()
                );
            }
        }
        Commands::Migrate => {
            bench.save_now();
            println!("Workspace written for {}", bench.state().project_id);
        }
    }
    Ok(())
}

/// Accept a pane id, a unique id prefix, or a pane name
fn resolve_pane(state: &AppState, query: &str) -> Result<PaneId> {
    let query = query.trim();
    let matches: Vec<PaneId> = state
        .data
        .panes
        .iter()
        .filter(|p| p.name == query || p.id.to_string().starts_with(query))
        .map(|p| p.id)
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => bail!("no pane matches `{}`", query),
        _ => bail!("`{}` matches more than one pane", query),
    }
}

fn describe_pane(state: &AppState, pane_id: PaneId) -> String {
    match state.pane(pane_id) {
        Some(pane) => format!("{} ({})", pane.name, &pane.id.to_string()[..8]),
        None => pane_id.to_string(),
    }
}

fn print_tree(state: &AppState, node: &SplitNode, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        SplitNode::Leaf { pane_id } => {
            let marker = if state.is_minimized(*pane_id) { " [minimized]" } else { "" };
            println!("{}{}{}", indent, describe_pane(state, *pane_id), marker);
        }
        SplitNode::Branch {
            direction,
            ratio,
            first,
            second,
        } => {
            println!("{}{:?} {:.2}", indent, direction, ratio);
            print_tree(state, first, depth + 1);
            print_tree(state, second, depth + 1);
        }
    }
}

fn print_workspace(state: &AppState) {
    let Some(tree) = state.layout.tree.as_ref() else {
        println!("Empty workspace");
        return;
    };

    println!("Layout:");
    print_tree(state, tree, 1);

    println!("Panes:");
    let bounds = state.bounds();
    for pane in &state.data.panes {
        let focus = if state.layout.focused_pane_id == Some(pane.id) { "*" } else { " " };
        let rect = bounds.get(&pane.id);
        println!(
            " {} {}  x={:.2} y={:.2} w={:.2} h={:.2}",
            focus,
            describe_pane(state, pane.id),
            rect.map_or(0.0, |r| r.x),
            rect.map_or(0.0, |r| r.y),
            rect.map_or(0.0, |r| r.w),
            rect.map_or(0.0, |r| r.h),
        );
        for session_id in &pane.session_ids {
            if let Some(session) = state.session(*session_id) {
                let active = if pane.active_session_id == Some(session.id) { ">" } else { " " };
                println!("     {} {}  {}", active, session.name, session.cwd.display());
            }
        }
    }

    let dividers = state.dividers();
    if !dividers.is_empty() {
        println!("Dividers:");
        for divider in dividers {
            let path = if divider.path.is_root() {
                "root".to_string()
            } else {
                divider.path.to_string()
            };
            let lock = if divider.disabled { " (locked)" } else { "" };
            println!("   {:<20} {:?} {:.2}{}", path, divider.direction, divider.ratio, lock);
        }
    }
}

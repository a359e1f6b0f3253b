use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use startpage::config::{
    DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SEARCH_DEBOUNCE_MS, DEFAULT_SEARCH_LIMIT, StartpageConfig,
};
use startpage::engine::memory::MemoryEngine;
use startpage::engine::{EngineError, ItemId, read_geometry};
use startpage::net::api::{ApiError, HttpGridApi};
use startpage::net::types::{CellContent, Grid};
use startpage::services::serializer::{load_grid, serialize};
use startpage::state::icon_search::SearchEvent;
use startpage::state::session::{CreationTab, GridSession, SaveState, SessionError, SessionNotice};
use tracing::{debug, info, warn};


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid grid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("grid file could not be loaded into the engine: {0}")]
    Load(#[from] EngineError),
    #[error("no built-in widget named `{0}`")]
    UnknownGallery(String),
    #[error("icon search for `{query}` has no result #{index}")]
    NoSuchIcon { query: String, index: usize },
    #[error("icon search for `{query}` failed: {message}")]
    SearchFailed { query: String, message: String },
    #[error("grid save failed: {0}")]
    SaveFailed(String),
}

#[derive(Parser, Debug)]
#[command(name = "startpage-cli", about = "Start-page grid editing CLI")]
struct Cli {
    #[arg(long, env = "STARTPAGE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Raw `Cookie` header of an authenticated session.
    #[arg(long, env = "STARTPAGE_COOKIE")]
    cookie: Option<String>,

    #[arg(long, env = "STARTPAGE_SEARCH_DEBOUNCE_MS", default_value_t = DEFAULT_SEARCH_DEBOUNCE_MS)]
    search_debounce_ms: u64,

    #[arg(long, env = "STARTPAGE_SEARCH_LIMIT", default_value_t = DEFAULT_SEARCH_LIMIT)]
    search_limit: u32,

    #[arg(long, env = "STARTPAGE_REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    request_timeout_secs: u64,

    /// Local copy of the account grid.
    #[arg(long, default_value = "grid.json")]
    grid: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn config(&self) -> StartpageConfig {
        StartpageConfig {
            base_url: self.base_url.trim_end_matches('/').to_owned(),
            cookie: self.cookie.clone().filter(|c| !c.trim().is_empty()),
            search_debounce_ms: self.search_debounce_ms,
            search_limit: self.search_limit,
            request_timeout_secs: self.request_timeout_secs,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the local grid and its layout.
    Show,
    /// Run an icon search and list the results.
    Search { query: String },
    /// Add a link tile to the local grid.
    AddLink(AddLinkArgs),
    /// Add an embedded widget to the local grid.
    AddDynamic(AddDynamicArgs),
    /// Save the local grid to the backend.
    Push,
}

#[derive(Args, Debug)]
struct AddLinkArgs {
    #[arg(long)]
    link: String,

    /// Search query whose result supplies the icon and suggested color.
    #[arg(long)]
    icon: Option<String>,

    /// Which search result to use.
    #[arg(long, default_value_t = 0, requires = "icon")]
    icon_index: usize,

    /// Override the tile color, e.g. `#1e90ff`.
    #[arg(long)]
    color: Option<String>,

    /// Also save to the backend.
    #[arg(long, default_value_t = false)]
    push: bool,
}

#[derive(Args, Debug)]
struct AddDynamicArgs {
    /// Built-in widget name.
    #[arg(long, conflicts_with = "src", required_unless_present = "src")]
    gallery: Option<String>,

    /// Custom widget URL.
    #[arg(long)]
    src: Option<String>,

    #[arg(long, default_value_t = false)]
    push: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    if let Err(e) = dotenv {
        debug!(error = %e, "no .env loaded");
    }

    let cli = Cli::parse();
    let config = cli.config();

    match &cli.command {
        Command::Show => run_show(&cli.grid),
        Command::Search { query } => run_search(&cli.grid, &config, query).await,
        Command::AddLink(args) => run_add_link(&cli.grid, &config, args).await,
        Command::AddDynamic(args) => run_add_dynamic(&cli.grid, &config, args).await,
        Command::Push => run_push(&cli.grid, &config).await,
    }
}

fn run_show(path: &Path) -> Result<(), CliError> {
    let grid = read_grid_file(path)?;
    println!("{}", serde_json::to_string_pretty(&grid)?);
    println!();
    print!("{}", render_layout(&grid));
    Ok(())
}

async fn run_search(path: &Path, config: &StartpageConfig, query: &str) -> Result<(), CliError> {
    let mut session = open_session(path, config)?;
    search(&mut session, query).await?;

    for (index, icon) in session.icon_search().results().iter().enumerate() {
        println!("{index:>3}  {:<24} {}  {}", icon.title, icon.hex, icon.url);
    }
    if session.icon_search().results().is_empty() {
        println!("no icons match `{query}`");
    }
    Ok(())
}

async fn run_add_link(path: &Path, config: &StartpageConfig, args: &AddLinkArgs) -> Result<(), CliError> {
    let mut session = open_session(path, config)?;
    session.enter_editing()?;
    session.open_creation();
    session.select_tab(CreationTab::Link);

    if let Some(query) = &args.icon {
        search(&mut session, query).await?;
        let icon = session
            .select_search_result(args.icon_index)
            .ok_or_else(|| CliError::NoSuchIcon { query: query.clone(), index: args.icon_index })?;
        info!(title = %icon.title, hex = %icon.hex, "icon selected");
    }
    if let Some(color) = &args.color {
        session.link_builder_mut().pick_color(color);
    }
    session.link_builder_mut().set_link(&args.link);

    let id = session.add_link_cell()?;
    finish_edit(session, path, id, args.push).await
}

async fn run_add_dynamic(path: &Path, config: &StartpageConfig, args: &AddDynamicArgs) -> Result<(), CliError> {
    let mut session = open_session(path, config)?;
    session.enter_editing()?;
    session.open_creation();
    session.select_tab(CreationTab::Dynamic);

    let builder = session.dynamic_builder_mut();
    if let Some(name) = &args.gallery {
        let index = builder
            .gallery()
            .iter()
            .position(|entry| &entry.name == name)
            .ok_or_else(|| CliError::UnknownGallery(name.clone()))?;
        builder.select_gallery(index);
    }
    if let Some(src) = &args.src {
        builder.set_custom(src);
    }

    let id = session.add_dynamic_cell()?;
    finish_edit(session, path, id, args.push).await
}

async fn run_push(path: &Path, config: &StartpageConfig) -> Result<(), CliError> {
    let mut session = open_session(path, config)?;
    session.enter_editing()?;
    save(&mut session).await
}

/// Write the edited grid back to disk and optionally save it remotely.
async fn finish_edit(
    mut session: GridSession<MemoryEngine>,
    path: &Path,
    id: ItemId,
    push: bool,
) -> Result<(), CliError> {
    let geo = read_geometry(session.engine(), id);
    let grid = serialize(session.engine());
    write_grid_file(path, &grid)?;
    println!("added {}x{} cell at ({}, {})", geo.w, geo.h, geo.x, geo.y);

    if push {
        save(&mut session).await?;
    }
    Ok(())
}

/// Leave editing, which queues the save, then wait for the outcome.
async fn save(session: &mut GridSession<MemoryEngine>) -> Result<(), CliError> {
    session.exit_editing()?;
    let state = session.wait_for_save().await.clone();
    for notice in session.take_notices() {
        match notice {
            SessionNotice::SaveSucceeded { seq } => info!(seq, "grid saved"),
            SessionNotice::SaveFailed { seq, message } => warn!(seq, %message, "grid save failed"),
            SessionNotice::SearchFailed { message } => warn!(%message, "icon search failed"),
        }
    }
    match state {
        SaveState::Saved { .. } => {
            println!("saved");
            Ok(())
        }
        SaveState::Failed { message, .. } => Err(CliError::SaveFailed(message)),
        SaveState::Idle | SaveState::Pending { .. } => Err(CliError::SaveFailed("save did not complete".to_owned())),
    }
}

async fn search(session: &mut GridSession<MemoryEngine>, query: &str) -> Result<(), CliError> {
    session.search_input(query);
    while let Some(event) = session.next_search_event().await {
        match event {
            SearchEvent::Applied { .. } => return Ok(()),
            SearchEvent::Failed { error, .. } => {
                return Err(CliError::SearchFailed { query: query.to_owned(), message: error.to_string() });
            }
            SearchEvent::Stale { seq } => debug!(seq, "stale icon search reply"),
        }
    }
    Ok(())
}

fn open_session(path: &Path, config: &StartpageConfig) -> Result<GridSession<MemoryEngine>, CliError> {
    let grid = read_grid_file(path)?;
    let mut engine = MemoryEngine::new(grid.col, grid.row);
    load_grid(&mut engine, &grid)?;
    let api = Arc::new(HttpGridApi::new(config)?);
    Ok(GridSession::new(engine, api, config)?)
}

/// Read the local grid. A missing file is a fresh default grid.
fn read_grid_file(path: &Path) -> Result<Grid, CliError> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(serde_json::from_str(&raw)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no grid file; starting from an empty grid");
            Ok(Grid::default())
        }
        Err(source) => Err(CliError::Io { path: path.to_owned(), source }),
    }
}

fn write_grid_file(path: &Path, grid: &Grid) -> Result<(), CliError> {
    let mut rendered = serde_json::to_string_pretty(grid)?;
    rendered.push('\n');
    fs::write(path, rendered).map_err(|source| CliError::Io { path: path.to_owned(), source })
}

/// One character per slot: `L` link, `D` dynamic, `#` empty cell, `.` free.
fn render_layout(grid: &Grid) -> String {
    let (cols, rows) = (grid.col as usize, grid.row as usize);
    let mut slots = vec![b'.'; cols * rows];
    for cell in &grid.cells {
        let mark = match &cell.content {
            Some(CellContent::Link(_)) => b'L',
            Some(CellContent::Dynamic(_)) => b'D',
            None => b'#',
        };
        let (x, y) = (cell.x as usize, cell.y as usize);
        for row in y..(y + cell.h as usize).min(rows) {
            for col in x..(x + cell.w as usize).min(cols) {
                slots[row * cols + col] = mark;
            }
        }
    }
    slots
        .chunks(cols.max(1))
        .map(|line| format!("{}\n", String::from_utf8_lossy(line)))
        .collect()
}

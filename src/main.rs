
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use trailmap::config::{ClientConfig, ConfigError};
use trailmap::error::ApiError;
use trailmap::map::memory::MemorySurface;
use trailmap::map::surface::MapEvent;
use trailmap::net::api::HttpApi;
use trailmap::net::payload::LoginForm;
use trailmap::net::types::{Bundle, BundleId, LatLng, PathId, PlaceId};
use trailmap::state::notice::{NoticeBoard, NoticeLevel};
use trailmap::state::session::{CookieFile, SessionGate, SessionToken};
use trailmap::view::admin::AdminView;
use trailmap::view::mode::Route;
use trailmap::view::nav::Nav;
use trailmap::view::public::PublicView;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("not logged in; run `trailmap login` first")]
    NotLoggedIn,
    #[error("session expired; returned to the public map")]
    SessionExpired,
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },
}

#[derive(Parser, Debug)]
#[command(name = "trailmap", about = "Browse and edit trail bundles from the command line")]
struct Cli {
    #[arg(long, env = "TRAILMAP_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "TRAILMAP_COOKIE_FILE")]
    cookie_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the public map and print the bundle tree.
    Map,
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Status,
    Bundle(BundleCommand),
    Path(PathCommand),
    Place(PlaceCommand),
}

#[derive(Args, Debug)]
struct BundleCommand {
    #[command(subcommand)]
    command: BundleSubcommand,
}

#[derive(Subcommand, Debug)]
enum BundleSubcommand {
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        info: String,
        #[arg(long, default_value = "")]
        image: String,
    },
    Update {
        bundle_id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        info: Option<String>,
        #[arg(long)]
        image: Option<String>,
    },
    Delete {
        bundle_id: i64,
    },
}

#[derive(Args, Debug)]
struct PathCommand {
    #[command(subcommand)]
    command: PathSubcommand,
}

#[derive(Args, Debug)]
struct PathFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    info: Option<String>,
    #[arg(long)]
    image: Option<String>,
    #[arg(long)]
    length: Option<f64>,
    #[arg(long)]
    duration: Option<f64>,
    /// Map click appended to the polyline, as LAT,LNG. Repeatable.
    #[arg(long = "point", value_parser = parse_lat_lng)]
    points: Vec<LatLng>,
}

#[derive(Subcommand, Debug)]
enum PathSubcommand {
    Create {
        bundle_id: i64,
        #[command(flatten)]
        fields: PathFields,
    },
    Update {
        path_id: i64,
        #[command(flatten)]
        fields: PathFields,
    },
    Delete {
        path_id: i64,
    },
}

#[derive(Args, Debug)]
struct PlaceCommand {
    #[command(subcommand)]
    command: PlaceSubcommand,
}

#[derive(Args, Debug)]
struct PlaceFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    info: Option<String>,
    #[arg(long)]
    radius: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum PlaceSubcommand {
    Create {
        path_id: i64,
        /// Map click that places the marker, as LAT,LNG.
        #[arg(long, value_parser = parse_lat_lng)]
        at: LatLng,
        #[command(flatten)]
        fields: PlaceFields,
    },
    Update {
        place_id: i64,
        /// New marker position, as LAT,LNG.
        #[arg(long, value_parser = parse_lat_lng)]
        at: Option<LatLng>,
        #[command(flatten)]
        fields: PlaceFields,
    },
    Delete {
        place_id: i64,
    },
}

struct CliContext {
    api: Arc<HttpApi>,
    session: Arc<SessionGate>,
    board: Arc<NoticeBoard>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trailmap=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = build_context(&cli)?;

    let result = match cli.command {
        Command::Map => run_map(&ctx).await,
        Command::Login { username, password } => run_login(&ctx, username, password).await,
        Command::Logout => run_logout(&ctx).await,
        Command::Status => {
            println!("{}", if ctx.session.is_authenticated() { "logged in" } else { "logged out" });
            Ok(())
        }
        Command::Bundle(bundle) => run_bundle(&ctx, bundle).await,
        Command::Path(path) => run_path(&ctx, path).await,
        Command::Place(place) => run_place(&ctx, place).await,
    };
    print_notice(&ctx);
    result
}

fn build_context(cli: &Cli) -> Result<CliContext, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url)?;
    }
    if let Some(path) = &cli.cookie_file {
        config.cookie_file.clone_from(path);
    }
    tracing::debug!(base_url = %config.base_url, cookie_file = %config.cookie_file.display(), "config loaded");

    let token = SessionToken::default();
    let api = Arc::new(HttpApi::new(&config, token.clone())?);
    let board = Arc::new(NoticeBoard::new());
    let session = Arc::new(SessionGate::new(
        token,
        Box::new(CookieFile::new(config.cookie_file.clone())),
        api.clone(),
        board.clone(),
    ));
    Ok(CliContext { api, session, board })
}

fn print_notice(ctx: &CliContext) {
    if let Some(notice) = ctx.board.current() {
        match notice.level {
            NoticeLevel::Alarm => eprintln!("{}", notice.message),
            NoticeLevel::Info | NoticeLevel::Warning => println!("{}", notice.message),
        }
    }
}

// =============================================================================
// PUBLIC / SESSION
// =============================================================================

async fn run_map(ctx: &CliContext) -> Result<(), CliError> {
    let mut view = PublicView::new(ctx.api.clone(), ctx.board.clone(), MemorySurface::default());
    view.load().await?;
    for bundle in view.bundles().values() {
        print_bundle(bundle);
    }
    let surface = view.map().surface();
    println!("markers: {}, polylines: {}", surface.marker_count(), surface.polyline_count());
    Ok(())
}

fn print_bundle(bundle: &Bundle) {
    let id = bundle.id.map_or_else(|| "-".to_owned(), |id| id.to_string());
    println!("bundle {id}: {}", bundle.name);
    for path in &bundle.paths {
        let id = path.id.map_or_else(|| "-".to_owned(), |id| id.to_string());
        println!(
            "  path {id}: {} ({} km, {} h, {} points)",
            path.name,
            path.length,
            path.duration,
            path.polyline.len()
        );
        for place in &path.places {
            let id = place.id.map_or_else(|| "-".to_owned(), |id| id.to_string());
            println!("    place {id}: {} ({}, {})", place.name, place.position.lat, place.position.lng);
        }
    }
}

async fn run_login(ctx: &CliContext, username: String, password: String) -> Result<(), CliError> {
    let mut nav = Nav::new(ctx.session.clone());
    let mut form = LoginForm::new(username, password);
    nav.login(&mut form).await?;
    Ok(())
}

async fn run_logout(ctx: &CliContext) -> Result<(), CliError> {
    let mut nav = Nav::new(ctx.session.clone());
    nav.logout().await?;
    Ok(())
}

// =============================================================================
// ADMIN
// =============================================================================

async fn admin_view(ctx: &CliContext) -> Result<AdminView<MemorySurface>, CliError> {
    if !ctx.session.is_authenticated() {
        return Err(CliError::NotLoggedIn);
    }
    let mut view = AdminView::new(ctx.api.clone(), ctx.session.clone(), ctx.board.clone(), MemorySurface::default());
    let loaded = view.load().await;
    settle(&view, loaded)?;
    Ok(view)
}

/// Turn an admin operation's outcome into the CLI result; a redirect to the
/// public map always fails the command.
fn settle(view: &AdminView<MemorySurface>, result: Result<(), ApiError>) -> Result<(), CliError> {
    if view.route() == Route::Public {
        return Err(CliError::SessionExpired);
    }
    result.map_err(CliError::from)
}

async fn run_bundle(ctx: &CliContext, bundle: BundleCommand) -> Result<(), CliError> {
    let mut view = admin_view(ctx).await?;
    let result = match bundle.command {
        BundleSubcommand::Create { name, info, image } => {
            view.new_bundle();
            if let Some(draft) = view.bundle_draft_mut() {
                draft.name = name;
                draft.info = info;
                draft.image = image;
            }
            view.save_bundle().await
        }
        BundleSubcommand::Update { bundle_id, name, info, image } => {
            if !view.edit_bundle(BundleId(bundle_id)) {
                return Err(CliError::NotFound { kind: "bundle", id: bundle_id });
            }
            if let Some(draft) = view.bundle_draft_mut() {
                overwrite(&mut draft.name, name);
                overwrite(&mut draft.info, info);
                overwrite(&mut draft.image, image);
            }
            view.save_bundle().await
        }
        BundleSubcommand::Delete { bundle_id } => view.delete_bundle(BundleId(bundle_id)).await,
    };
    settle(&view, result)
}

async fn run_path(ctx: &CliContext, path: PathCommand) -> Result<(), CliError> {
    let mut view = admin_view(ctx).await?;
    let result = match path.command {
        PathSubcommand::Create { bundle_id, fields } => {
            if !view.new_path(BundleId(bundle_id)) {
                return Err(CliError::NotFound { kind: "bundle", id: bundle_id });
            }
            draw_path(&mut view, fields);
            view.save_path().await
        }
        PathSubcommand::Update { path_id, fields } => {
            if !view.edit_path(PathId(path_id)) {
                return Err(CliError::NotFound { kind: "path", id: path_id });
            }
            draw_path(&mut view, fields);
            view.save_path().await
        }
        PathSubcommand::Delete { path_id } => view.delete_path(PathId(path_id)).await,
    };
    settle(&view, result)
}

fn draw_path(view: &mut AdminView<MemorySurface>, fields: PathFields) {
    if let Some(draft) = view.path_draft_mut() {
        overwrite(&mut draft.name, fields.name);
        overwrite(&mut draft.info, fields.info);
        overwrite(&mut draft.image, fields.image);
        overwrite(&mut draft.length, fields.length);
        overwrite(&mut draft.duration, fields.duration);
    }
    for point in fields.points {
        view.handle_map_event(MapEvent::Click(point));
    }
}

async fn run_place(ctx: &CliContext, place: PlaceCommand) -> Result<(), CliError> {
    let mut view = admin_view(ctx).await?;
    let result = match place.command {
        PlaceSubcommand::Create { path_id, at, fields } => {
            if !view.new_place(PathId(path_id)) {
                return Err(CliError::NotFound { kind: "path", id: path_id });
            }
            view.handle_map_event(MapEvent::Click(at));
            fill_place(&mut view, fields, None);
            view.save_place().await
        }
        PlaceSubcommand::Update { place_id, at, fields } => {
            if !view.edit_place(PlaceId(place_id)) {
                return Err(CliError::NotFound { kind: "place", id: place_id });
            }
            fill_place(&mut view, fields, at);
            view.save_place().await
        }
        PlaceSubcommand::Delete { place_id } => view.delete_place(PlaceId(place_id)).await,
    };
    settle(&view, result)
}

fn fill_place(view: &mut AdminView<MemorySurface>, fields: PlaceFields, at: Option<LatLng>) {
    if let Some(draft) = view.place_draft_mut() {
        overwrite(&mut draft.name, fields.name);
        overwrite(&mut draft.info, fields.info);
        overwrite(&mut draft.radius, fields.radius);
        overwrite(&mut draft.position, at);
    }
}

fn overwrite<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn parse_lat_lng(raw: &str) -> Result<LatLng, String> {
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LNG, got `{raw}`"))?;
    let lat = lat.trim().parse::<f64>().map_err(|e| format!("bad latitude `{lat}`: {e}"))?;
    let lng = lng.trim().parse::<f64>().map_err(|e| format!("bad longitude `{lng}`: {e}"))?;
    Ok(LatLng::new(lat, lng))
}

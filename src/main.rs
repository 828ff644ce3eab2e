use std::{process, sync::Arc};

use polemap::{
    application::{
        bootstrap::BootstrapOptions, error::AppError, source::PostSource, store::PostStore,
    },
    config,
    domain::{filter::PostStats, posts::Post},
    infra::{
        api_client::HttpPostSource,
        catalog::PostCatalog,
        error::InfraError,
        http::{self, HttpState},
        sessions::PageSessions,
        telemetry,
    },
};
use serde::Serialize;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Posts(args) => run_posts(settings, args).await,
    }
}

fn remote_source(settings: &config::Settings) -> Result<Option<HttpPostSource>, AppError> {
    settings
        .source
        .api_url
        .as_ref()
        .map(|url| HttpPostSource::new(url, settings.source.timeout))
        .transpose()
        .map_err(AppError::from)
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let catalog = PostCatalog::load(settings.posts.seed_file.as_deref()).await;
    info!(
        target = "polemap::serve",
        origin = catalog.origin().label(),
        posts = catalog.posts().len(),
        "`/api/posts` catalog ready"
    );
    let remote = remote_source(&settings)?;
    if let Some(remote) = remote.as_ref() {
        info!(
            target = "polemap::serve",
            endpoint = %remote.endpoint(),
            "map page reads posts from remote instance"
        );
    }

    let page = BootstrapOptions {
        header_height_px: settings.map.header_height_px,
        fit_padding_px: settings.map.fit_padding_px,
        ..BootstrapOptions::default()
    };
    let state = HttpState {
        catalog: Arc::new(catalog),
        remote: remote.map(Arc::new),
        page: Arc::new(page),
        viewport_height_px: settings.map.viewport_height_px.get(),
        sessions: Arc::new(PageSessions::new(settings.sessions.capacity)),
    };

    serve_http(&settings, state).await
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "polemap::serve",
        addr = %settings.server.addr,
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

#[derive(Serialize)]
struct PostsOutput<'a> {
    posts: Vec<&'a Post>,
    stats: PostStats,
}

async fn run_posts(settings: config::Settings, args: config::PostsArgs) -> Result<(), AppError> {
    let remote = remote_source(&settings)?;
    let catalog;
    let source: &dyn PostSource = match remote.as_ref() {
        Some(remote) => remote,
        None => {
            catalog = PostCatalog::load(settings.posts.seed_file.as_deref()).await;
            &catalog
        }
    };

    let mut store = PostStore::load(source).await;
    if let Some(query) = args.query {
        store.set_query(query);
    }
    store.set_status_filter(args.status);

    let view = store.filtered_view();
    let stats = store.stats();

    if args.json {
        let output = PostsOutput {
            posts: view.iter().collect(),
            stats,
        };
        let rendered = serde_json::to_string_pretty(&output)
            .map_err(|err| AppError::unexpected(format!("failed to encode posts: {err}")))?;
        println!("{rendered}");
        return Ok(());
    }

    for post in view.iter() {
        println!(
            "{:<8} {:<12} {:>10.5} {:>11.5}  {}",
            post.id.as_str(),
            post.status.as_str(),
            post.position.lat,
            post.position.lng,
            post.name
        );
    }
    println!(
        "({}) active {} · maintenance {} · inactive {}",
        stats.total, stats.active, stats.maintenance, stats.inactive
    );

    Ok(())
}

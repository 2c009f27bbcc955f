use std::{process, sync::Arc};

use docweave::{
    application::{
        documents::DocumentRenderer,
        error::AppError,
        locks::DocumentLocks,
        maintenance::SweepService,
        repos::{AssetStore, DocumentSource, ImageFetcher},
    },
    cache::{CacheConfig, RenderCache},
    config::{self, AssetBackend, SourceBackend},
    infra::{
        assets::{FilesystemAssetStore, MemoryAssetStore},
        error::InfraError,
        http::{self, HttpState},
        images::HttpImageFetcher,
        source::{DirectorySource, GoogleDocsSource},
        telemetry,
    },
};
use tokio::sync::oneshot;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
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

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
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
        config::Command::Render(args) => run_render(settings, args).await,
        config::Command::Sweep(_) => run_sweep(settings).await,
    }
}

/// Shared collaborators wired from the resolved settings.
struct ApplicationContext {
    source: Arc<dyn DocumentSource>,
    store: Arc<dyn AssetStore>,
    renderer: Arc<DocumentRenderer>,
    sweeper: Arc<SweepService>,
}

fn build_application_context(settings: &config::Settings) -> Result<ApplicationContext, AppError> {
    let source = build_source(&settings.source)?;
    let store = build_store(&settings.assets)?;
    let fetcher: Arc<dyn ImageFetcher> = Arc::new(
        HttpImageFetcher::new(settings.source.timeout).map_err(InfraError::from)?,
    );
    let cache = Arc::new(RenderCache::new(&CacheConfig::from(&settings.cache)));
    let locks = DocumentLocks::new();

    let renderer = DocumentRenderer::new(
        Arc::clone(&source),
        Arc::clone(&store),
        fetcher,
        cache,
    )
    .with_locks(locks.clone())
    .with_share_principal(settings.source.share_with.clone());
    let sweeper =
        SweepService::new(Arc::clone(&source), Arc::clone(&store)).with_locks(locks);

    Ok(ApplicationContext {
        source,
        store,
        renderer: Arc::new(renderer),
        sweeper: Arc::new(sweeper),
    })
}

fn build_source(settings: &config::SourceSettings) -> Result<Arc<dyn DocumentSource>, AppError> {
    let source: Arc<dyn DocumentSource> = match &settings.backend {
        SourceBackend::Google {
            docs_api_base,
            drive_api_base,
            access_token,
        } => {
            if access_token.is_none() {
                warn!(
                    target = "docweave::bootstrap",
                    "no access token configured; only public documents will be readable"
                );
            }
            Arc::new(
                GoogleDocsSource::new(
                    docs_api_base.clone(),
                    drive_api_base.clone(),
                    access_token.clone(),
                    settings.timeout,
                )
                .map_err(InfraError::from)?,
            )
        }
        SourceBackend::Directory { path } => Arc::new(DirectorySource::new(path.clone())),
    };
    Ok(source)
}

fn build_store(settings: &config::AssetSettings) -> Result<Arc<dyn AssetStore>, AppError> {
    let public_base = settings.public_base_url.to_string();
    let store: Arc<dyn AssetStore> = match &settings.backend {
        AssetBackend::Filesystem { directory } => Arc::new(
            FilesystemAssetStore::new(directory.clone(), public_base).map_err(InfraError::from)?,
        ),
        AssetBackend::Memory => Arc::new(MemoryAssetStore::new(public_base)),
    };
    Ok(store)
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let app = build_application_context(&settings)?;
    let router = http::build_router(HttpState {
        renderer: app.renderer,
        sweeper: app.sweeper,
        source: app.source,
        store: app.store,
    });

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "docweave::serve",
        addr = %settings.server.addr,
        "listening"
    );

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tokio::select! {
        joined = &mut server => return flatten_server_result(joined),
        _ = shutdown_signal() => {}
    }

    info!(
        target = "docweave::serve",
        grace_seconds = settings.server.graceful_shutdown.as_secs(),
        "shutting down"
    );
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(settings.server.graceful_shutdown, &mut server).await {
        Ok(joined) => flatten_server_result(joined),
        Err(_) => {
            warn!(
                target = "docweave::serve",
                "graceful shutdown timed out; aborting open connections"
            );
            server.abort();
            Ok(())
        }
    }
}

fn flatten_server_result(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(AppError::unexpected(format!("server error: {err}"))),
        Err(err) => Err(AppError::unexpected(format!("server task failed: {err}"))),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(target = "docweave::serve", error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(target = "docweave::serve", error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn run_render(settings: config::Settings, args: config::RenderArgs) -> Result<(), AppError> {
    let app = build_application_context(&settings)?;
    let outcome = app.renderer.render(&args.id, args.fresh).await?;

    match args.output {
        Some(path) => {
            tokio::fs::write(&path, outcome.html.as_bytes())
                .await
                .map_err(|err| AppError::from(InfraError::from(err)))?;
            info!(
                target = "docweave::render",
                document_id = %args.id,
                output = %path.display(),
                "wrote rendered document"
            );
        }
        None => println!("{}", outcome.html),
    }

    Ok(())
}

async fn run_sweep(settings: config::Settings) -> Result<(), AppError> {
    let app = build_application_context(&settings)?;
    let report = app.sweeper.sweep_orphans().await?;

    info!(
        target = "docweave::sweep",
        documents_checked = report.documents_checked,
        documents_skipped = report.documents_skipped,
        removed = report.removed.len(),
        "sweep complete"
    );
    let summary = serde_json::to_string_pretty(&report)
        .map_err(|err| AppError::unexpected(format!("failed to encode sweep report: {err}")))?;
    println!("{summary}");

    Ok(())
}

use ballot_bootstrap::Config;
use ballot_bootstrap::error::INTERRUPTED_EXIT_CODE;
use mimalloc::MiMalloc;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cfg = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(e.exit_code());
        }
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        manifest = %cfg.dependencies.manifest.display(),
        installer = %cfg.dependencies.installer,
        uploads = %cfg.uploads.dir.display(),
        seed_defaults = cfg.database.seed_defaults,
        loglevel = %cfg.loglevel
    );

    let interrupted = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                warn!(error = %e, "cannot listen for Ctrl-C; running without interrupt handling");
                std::future::pending::<()>().await
            }
        }
    };

    // The installer sees the same SIGINT; the interrupt must win if both are ready.
    tokio::select! {
        biased;
        () = interrupted => {
            warn!("interrupted; steps already completed are kept");
            ExitCode::from(INTERRUPTED_EXIT_CODE)
        }
        res = ballot_bootstrap::run(&cfg) => match res {
            Ok(report) => {
                info!(
                    steps = report.steps.len(),
                    finished_at = %report.finished_at.to_rfc3339(),
                    "bootstrap complete"
                );
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = %e, "bootstrap failed");
                ExitCode::from(e.exit_code())
            }
        },
    }
}

use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use anyhow::Result;
use tracing::info;

use bulk_result_scraper::orchestrator::janitor;
use bulk_result_scraper::{
    api, logger, ArtifactWriter, Config, JobRunner, PortalFetcher, RetryPolicy, Scheduler,
    TesseractSolver,
};

#[actix_web::main]
async fn main() -> Result<()> {
    logger::init();

    let config = Config::from_env();
    info!(
        "starting bulk result scraper at {} - portal: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        config.portal_base_url
    );

    // Capabilities
    let solver = Arc::new(TesseractSolver::new(&config));
    let fetcher = Arc::new(PortalFetcher::new(&config)?);
    let writer = ArtifactWriter::new(&config.artifacts_dir);

    // Scheduler, single worker, janitor
    let (scheduler, queue_rx) = Scheduler::new(writer);
    let runner = JobRunner::new(solver, fetcher, RetryPolicy::from_config(&config));
    scheduler.spawn_worker(queue_rx, runner);
    janitor::spawn(
        Arc::clone(&scheduler),
        Duration::from_secs(config.janitor_interval_secs),
        Duration::from_secs(config.retention_secs),
    );

    info!(
        "listening on {}:{} (retention {}s, janitor every {}s)",
        config.bind_addr, config.port, config.retention_secs, config.janitor_interval_secs
    );

    let data = web::Data::from(scheduler);
    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .service(api::submit)
            .service(api::progress)
            .service(api::getfile)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}

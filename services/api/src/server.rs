use crate::cli::ServeArgs;
use crate::demo::seed_demo_store;
use crate::infra::{AppState, InMemoryAuditRepository, InMemoryCallerDirectory};
use crate::routes::with_report_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use outlet_audit::audit::AuditReportService;
use outlet_audit::config::AppConfig;
use outlet_audit::error::AppError;
use outlet_audit::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = InMemoryAuditRepository::default();
    let callers = InMemoryCallerDirectory::default();
    if args.demo_data {
        seed_demo_store(&repository, &callers);
        for (token, caller) in callers.tokens() {
            info!(
                user = %caller.name,
                role = caller.role.label(),
                token = %token,
                "demo bearer token registered"
            );
        }
    } else {
        warn!("starting with an empty audit store; pass --demo-data to seed sample visits");
    }

    let policy = config.reporting.access_policy();
    let report_service = Arc::new(AuditReportService::new(
        Arc::new(repository),
        Arc::new(callers),
        policy,
    ));

    let app = with_report_routes(report_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        restrict_by_role = policy.restrict_by_role,
        "outlet audit service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

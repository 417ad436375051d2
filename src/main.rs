//! gymdesk sweep runner
//!
//! One invocation runs one expiry sweep for "today" in the configured
//! business offset, then exits. Schedule it (cron, systemd timer) as often
//! as reminders should go out; repeated runs are safe.

use std::sync::Arc;

use gymdesk::adapters::email::ResendEmailSender;
use gymdesk::adapters::postgres::{
    create_pool, run_migrations, PostgresApplicationRepository, PostgresCompensationRepository,
    PostgresMembershipRepository, PostgresNotificationChannel, PostgresNotificationMarkers,
    PostgresPlanCatalog, PostgresUserDirectory,
};
use gymdesk::adapters::realtime::{LoggingRealtimeBus, RedisRealtimeBus};
use gymdesk::adapters::SystemClock;
use gymdesk::application::{MembershipLedger, Notifier, RunExpirySweepCommand, RunExpirySweepHandler};
use gymdesk::config::{AppConfig, LogFormat};
use gymdesk::ports::{Clock, RealtimeBus, UserDirectory};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    tracing::info!(environment = ?config.environment, "Starting gymdesk expiry sweep");

    let pool = create_pool(&config.database).await?;
    if config.database.run_migrations {
        run_migrations(&pool).await?;
        tracing::info!("Migrations applied");
    }

    let directory: Arc<dyn UserDirectory> = Arc::new(PostgresUserDirectory::new(pool.clone()));

    let mut channel = PostgresNotificationChannel::new(pool.clone());
    if let Some(email) = &config.email {
        let sender = ResendEmailSender::new(email)?;
        channel = channel.with_email(Arc::new(sender), directory.clone());
    }

    let bus: Arc<dyn RealtimeBus> = match &config.redis {
        Some(redis) => Arc::new(RedisRealtimeBus::connect(redis).await?),
        None => Arc::new(LoggingRealtimeBus),
    };

    let memberships = Arc::new(PostgresMembershipRepository::new(pool.clone()));
    let compensations = Arc::new(PostgresCompensationRepository::new(pool.clone()));
    let ledger = MembershipLedger::new(memberships.clone(), compensations.clone());

    let handler = RunExpirySweepHandler::new(
        ledger,
        memberships,
        compensations,
        Arc::new(PostgresApplicationRepository::new(pool.clone())),
        Arc::new(PostgresPlanCatalog::new(pool.clone())),
        Arc::new(PostgresNotificationMarkers::new(pool.clone())),
        Notifier::new(Arc::new(channel), bus),
        config.policy.expiring_soon_days,
    );

    let calendar = config.policy.calendar()?;
    let today = calendar.date_of(&SystemClock.now());

    handler.handle(RunExpirySweepCommand { today }).await?;

    pool.close().await;
    Ok(())
}

use clap::Parser;
use std::sync::Arc;
use support_router::domain::ports::TicketStore;
use support_router::utils::{logger, validation::Validate};
use support_router::{
    AppConfig, CliArgs, Command, EnvCredential, OpenAiClient, RouterError, SqliteTicketStore,
    SupportRouter,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting support-router");

    let config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            match AppConfig::from_file(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path.display(), e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            }
        }
        None => AppConfig::default(),
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if args.verbose {
        tracing::debug!("Configuration: {:?}", config);
    }

    if let Err(e) = run(args.command, &config).await {
        tracing::error!(
            "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        std::process::exit(e.severity().exit_code());
    }

    Ok(())
}

async fn run(command: Command, config: &AppConfig) -> Result<(), RouterError> {
    let store = Arc::new(SqliteTicketStore::open(&config.store.path)?);

    match command {
        Command::Process { message, customer } => {
            let router = build_router(Arc::clone(&store), config)?;
            let entry = router.process(&message, Some(&customer)).await?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        Command::Batch { file, customer } => {
            let router = build_router(Arc::clone(&store), config)?;
            let content = std::fs::read_to_string(&file)?;

            let messages = content.lines().map(str::trim).filter(|l| !l.is_empty());
            let report = router.process_batch(messages, Some(&customer)).await;
            for entry in &report.entries {
                println!("{}", serde_json::to_string(entry)?);
            }

            let summary = router.log().summary();
            tracing::info!(
                "📊 Processed {} messages, {} failed",
                summary.total,
                report.failures.len()
            );
            println!("{}", serde_json::to_string_pretty(&summary)?);

            if let Some((_, e)) = report
                .failures
                .into_iter()
                .max_by_key(|(_, e)| e.severity())
            {
                return Err(e);
            }
        }
        Command::Tickets { limit } => {
            let tickets = store.list().await?;
            let limit = limit.unwrap_or(tickets.len());
            for ticket in tickets.iter().take(limit) {
                println!(
                    "#{}  {:<11}  {}  {}",
                    ticket.id(),
                    ticket.status(),
                    ticket.created_at().format("%Y-%m-%d %H:%M:%S"),
                    ticket.description()
                );
            }
        }
        Command::Show { id } => match store.get(id.as_str()).await? {
            Some(ticket) => println!("{}", serde_json::to_string_pretty(&ticket)?),
            None => println!("Ticket #{} not found", id),
        },
        Command::Resolve { id, status } => match store.update_status(id.as_str(), status).await? {
            Some(ticket) => println!("✅ Ticket #{} is now {}", ticket.id(), ticket.status()),
            None => println!("Ticket #{} not found", id),
        },
    }

    Ok(())
}

fn build_router(
    store: Arc<SqliteTicketStore>,
    config: &AppConfig,
) -> Result<SupportRouter<SqliteTicketStore, OpenAiClient<EnvCredential>>, RouterError> {
    let credentials = EnvCredential::new(config.service.api_key_env.clone());
    let client = OpenAiClient::new(config.service.endpoint.clone(), config.timeout(), credentials)?;
    Ok(SupportRouter::new(
        store,
        Arc::new(client),
        config.router_settings(),
    ))
}

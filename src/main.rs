use clap::Parser;
use dotenvy::dotenv;
use northwind_admin::{
    cli::{Cli, execute},
    config::{database::create_connection, load_settings_or_default},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    let cli = Cli::parse();

    // 3. Settings: config file, then DATABASE_URL override
    let settings = load_settings_or_default(&cli.config)
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;

    // 4. Connect
    let db = create_connection(&settings.database_url)
        .await
        .inspect(|_| info!("Connected to database"))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;

    // 5. Run the command
    let mut stdout = std::io::stdout().lock();
    execute(cli.command, &db, &settings, &mut stdout)
        .await
        .inspect_err(|e| error!("{}", e))
}

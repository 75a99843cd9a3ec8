use merchant_backoffice::{
    error::BackofficeError,
    settings::Settings,
    startup::Server,
    telemetry::{get_tracing_subscriber, init_tracing_subscriber},
};
use tracing::level_filters::LevelFilter;

#[tokio::main]
async fn main() -> Result<(), BackofficeError> {
    // `.env`가 없어도 된다.
    dotenvy::dotenv().ok();

    let tracing_subscriber = get_tracing_subscriber(LevelFilter::INFO, std::io::stdout);
    init_tracing_subscriber(tracing_subscriber);

    let settings = Settings::get_settings()?;
    let server = Server::build(&settings).await?;
    tracing::info!(port = server.port(), "Server is ready");
    server.run().await?;

    Ok(())
}

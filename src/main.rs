use eventos::{
    configuration::get_configuration,
    startup::Application,
    telemetry::{get_subscriber, init_subscriber},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("eventos".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber)?;

    let settings = get_configuration()?;
    let application = Application::build(settings).await?;
    tracing::info!(port = application.port(), "Starting server");
    application.run_until_stopped().await?;
    Ok(())
}

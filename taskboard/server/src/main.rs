#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let config = taskboard_server::config::Config::from_env()?;
    taskboard_server::web::start_web_server(config).await
}

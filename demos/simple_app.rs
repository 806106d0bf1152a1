use apollo_client::{ClientConfig, ConfigResponse, ConfigService, ConfigServiceBuilder};
use std::time::Duration;
use tokio::time::sleep;

/// Usage: `cargo run --example simple_app -- http://127.0.0.1:8080 table_use`
#[tokio::main]
async fn main() -> apollo_client::Result<()> {
    tracing_subscriber::fmt().init();

    let mut args = std::env::args().skip(1);
    let server_url = args
        .next()
        .unwrap_or_else(|| "http://127.0.0.1:8080".to_string());
    let app_id = args.next().unwrap_or_else(|| "table_use".to_string());

    let mut config_service = ConfigServiceBuilder::new(
        ClientConfig::new()
            .server_url(server_url)
            .app_id(app_id)
            .persist_path("apollo.json"),
    )
    .build()
    .await?;

    println!("get the config {:?}", config_service.get("news_topic_ch"));

    config_service.add_listener(Box::new(|resp: ConfigResponse| {
        println!(
            "listen the config {} release {} {:?}",
            resp.get_namespace(),
            resp.get_release_key(),
            resp.get_configurations()
        );
    }));
    let handle = config_service.listen()?;

    sleep(Duration::from_secs(300)).await;

    config_service.close();
    handle.join().await;
    Ok(())
}

use anyhow::{Context, Result};
use contact_form::{
    config,
    infrastructure::{directories, logging},
    ContactApp, IncomingSubmission,
};
use tokio::io::{self, AsyncReadExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_config()?;
    let paths = directories::ensure_directories(&config.directories)?;
    logging::init_tracing(&config, &paths)?;

    let app = ContactApp::initialize(&config)?;

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .await
        .context("failed to read submission from stdin")?;
    let submission: IncomingSubmission =
        serde_json::from_str(&input).context("submission is not valid JSON")?;

    let outcome = app.submit(submission).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

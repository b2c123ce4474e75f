use animal_core::{AnimalClient, App};
use animal_shell::{script, ShellConfig, UreqTransport};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = ShellConfig::from_env();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let commands = script::parse(&args)?;

    let mut app = App::new(AnimalClient::new(&config.api_url))?;
    let summary = animal_shell::run(&mut app, &commands, &UreqTransport::new())?;
    tracing::info!(
        api_url = %config.api_url,
        applied = summary.applied,
        failed = summary.failed,
        skipped = summary.skipped,
        "page settled"
    );
    println!("{}", app.render_html());
    Ok(())
}

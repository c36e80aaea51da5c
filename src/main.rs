use room_player::config::{get_config_path, load_config, UiMode};
use room_player::session::{spawn_stdin_reader, Session};
use room_player::ui::{JsonLinesPresenter, TerminalPresenter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout belongs to the presenter
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "room_player=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(&get_config_path())?;
    tracing::info!(
        "Joining {} as user {}",
        config.server.url,
        config.server.user_id
    );

    let input = spawn_stdin_reader();
    match config.ui.mode {
        UiMode::Text => {
            let presenter = TerminalPresenter::new(std::io::stdout(), config.toast_duration());
            let mut session = Session::new(config, presenter);
            session.run(input).await
        }
        UiMode::Json => {
            let presenter = JsonLinesPresenter::new(std::io::stdout());
            let mut session = Session::new(config, presenter);
            session.run(input).await
        }
    }
}

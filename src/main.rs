use anyhow::Context;
use research_studio::{
    api::routes::build_app,
    cli::{output::Output, Cli, Commands, ProgressPrinter},
    utils::toml_config::{ConfigManager, ProviderConfig, StudioConfig},
    AppState, Customization,
};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = cli.output();

    match cli.command {
        None => serve(&cli, &output, false).await,
        Some(Commands::Serve { watch_config }) => serve(&cli, &output, watch_config).await,
        Some(Commands::Run {
            ref topic,
            output: ref report_path,
            ref customization,
        }) => run(&cli, &output, topic, report_path, customization.as_deref()).await,
        Some(Commands::Config { validate }) => show_config(&cli, &output, validate),
    }
}

/// Install the global subscriber; `RUST_LOG` wins over the configured level
fn init_tracing(cli: &Cli, log_level: &str) {
    let default_level = if cli.verbose { "debug" } else { log_level };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("research_studio={0},tower_http={0}", default_level)));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_ansi(!cli.no_color))
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Arc<ConfigManager>> {
    let manager = ConfigManager::new(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    Ok(Arc::new(manager))
}

async fn serve(cli: &Cli, output: &Output, watch_config: bool) -> anyhow::Result<()> {
    let config_manager = load_config(cli)?;
    let config = config_manager.config();
    init_tracing(cli, &config.server.log_level);

    if watch_config {
        config_manager.start_watching()?;
    }

    let state = AppState::from_config(Arc::clone(&config_manager))?;
    let app = build_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    output.banner();
    output.kv("Listening", &format!("http://{}", addr));
    output.kv("Model", config.provider()?.model());
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    if watch_config {
        config_manager.stop_watching();
    }
    Ok(())
}

async fn run(
    cli: &Cli,
    output: &Output,
    topic: &str,
    report_path: &Path,
    customization: Option<&str>,
) -> anyhow::Result<()> {
    let config_manager = load_config(cli)?;
    init_tracing(cli, &config_manager.config().server.log_level);

    let customization: Customization = match customization {
        Some(raw) => serde_json::from_str(raw).context("--customization must be a JSON object")?,
        None => Customization::default(),
    };

    let state = AppState::from_config(config_manager)?;

    output.banner();
    output.header(&format!("Researching: {}", topic));

    let printer = ProgressPrinter::new(cli.output());
    let result = state
        .service
        .run_research(topic, customization, &printer)
        .await?;

    match &result.html_output {
        Some(html) => {
            std::fs::write(report_path, html)
                .with_context(|| format!("failed to write {}", report_path.display()))?;
            output.success(&format!("Report written to {}", report_path.display()));
        }
        None => output.warning("No HTML report was produced"),
    }

    output.summary(&result);
    Ok(())
}

fn show_config(cli: &Cli, output: &Output, validate: bool) -> anyhow::Result<()> {
    let config = if validate {
        match StudioConfig::load(&cli.config) {
            Ok(config) => {
                output.success(&format!("{} is valid", cli.config.display()));
                config
            }
            Err(e) => {
                output.error(&e.to_string());
                anyhow::bail!("invalid configuration");
            }
        }
    } else {
        let content = std::fs::read_to_string(&cli.config)
            .with_context(|| format!("failed to read {}", cli.config.display()))?;
        toml::from_str(&content).context("failed to parse configuration")?
    };

    output.header("Server");
    output.kv("Address", &format!("{}:{}", config.server.host, config.server.port));
    output.kv("Log level", &config.server.log_level);

    output.header("LLM");
    match &config.llm.provider {
        ProviderConfig::OpenAI {
            api_key_env,
            api_base,
            model,
        } => {
            output.kv("Provider", "openai");
            output.kv("API base", api_base);
            output.kv("Model", model);
            let key_state = if config.resolve_env(api_key_env).is_some() {
                "set"
            } else {
                "missing"
            };
            output.kv("API key", &format!("${} ({})", api_key_env, key_state));
        }
        ProviderConfig::Ollama { base_url, model } => {
            output.kv("Provider", "ollama");
            output.kv("Base URL", base_url);
            output.kv("Model", model);
        }
    }
    output.kv("Temperature", &config.llm.temperature.to_string());
    output.kv("Request timeout", &format!("{}s", config.llm.request_timeout_secs));

    output.header("Pipeline");
    output.kv("Search results", &config.search.num_results.to_string());
    output.kv("Search timeout", &format!("{}s", config.pipeline.search_timeout_secs));
    output.kv("Synthesis cap", &format!("{} chars", config.pipeline.max_synthesis_chars));
    output.kv("Question concurrency", &config.pipeline.question_concurrency.to_string());

    if !validate {
        output.hint("Run with --validate to check value ranges and API key variables");
    }
    Ok(())
}

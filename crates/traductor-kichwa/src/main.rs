use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::http::HeaderName;
use kichwa_lexicon::{Lexicon, LoadMode};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

use traductor_kichwa::rate_limit::{DEFAULT_CLIENT_HEADER, RateLimiterLayer};
use traductor_kichwa::{AppState, DEFAULT_MAX_INPUT_CHARS, install, router};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_RATE_LIMIT_RPS: u32 = 5;
const DEFAULT_RATE_LIMIT_BURST: u32 = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_config()?;
    info!("binding to {}:{}", config.host, config.port);
    match &config.lexicon_dir {
        Some(dir) => info!(
            "using lexicon at {} (mode: {:?})",
            dir.display(),
            config.lexicon_mode
        ),
        None => info!("using bundled lexicon"),
    }
    info!(
        "rate limit: {} req/s (burst {}) keyed on {}",
        config.rate_limit_rps, config.rate_limit_burst, config.client_ip_header
    );

    let start = Instant::now();
    let lexicon = match &config.lexicon_dir {
        Some(dir) => Lexicon::load_with_mode(dir, config.lexicon_mode)?,
        None => Lexicon::bundled()?,
    };
    let stats = lexicon.stats();
    info!("lexicon loaded in {} ms", start.elapsed().as_millis());
    info!(
        "{} pronouns, {} surface forms, {} roots ({} conjugations), {} vocabulary entries",
        stats.pronouns, stats.surface_forms, stats.roots, stats.conjugations, stats.vocabulary
    );
    if stats.partial_pairs > 0 {
        info!(
            "{} (root, tense) pairs fall back to a generic or third-person form",
            stats.partial_pairs
        );
    }

    install(Arc::new(lexicon));
    let state = AppState {
        max_input_chars: config.max_input_chars,
    };

    let rate_limiter = RateLimiterLayer::new(config.rate_limit_rps, config.rate_limit_burst)
        .with_header(config.client_ip_header);
    let app = router(state)
        .layer(rate_limiter)
        .layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Clone)]
struct Config {
    host: String,
    port: u16,
    /// `None` serves the tables compiled into the binary.
    lexicon_dir: Option<PathBuf>,
    lexicon_mode: LoadMode,
    max_input_chars: usize,
    rate_limit_rps: u32,
    rate_limit_burst: u32,
    client_ip_header: HeaderName,
}

fn load_config() -> anyhow::Result<Config> {
    let mut cli_lexicon_dir: Option<PathBuf> = None;
    let mut cli_lexicon_mode: Option<LoadMode> = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--lexicon-dir" => {
                if let Some(path) = args.next() {
                    cli_lexicon_dir = Some(PathBuf::from(path));
                }
            }
            _ => {
                if let Some(path) = arg.strip_prefix("--lexicon-dir=") {
                    cli_lexicon_dir = Some(PathBuf::from(path));
                } else if let Some(mode) = arg.strip_prefix("--lexicon-mode=") {
                    cli_lexicon_mode = parse_load_mode(mode);
                    if cli_lexicon_mode.is_none() {
                        warn!("ignoring unknown lexicon mode {mode:?}");
                    }
                } else {
                    warn!("ignoring unknown argument {arg:?}");
                }
            }
        }
    }

    let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let lexicon_dir = cli_lexicon_dir.or_else(|| {
        env::var("LEXICON_DIR")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    });
    let lexicon_mode = cli_lexicon_mode
        .or_else(|| {
            env::var("LEXICON_LOAD_MODE")
                .ok()
                .as_deref()
                .and_then(parse_load_mode)
        })
        .unwrap_or(LoadMode::Mmap);
    let max_input_chars = positive_env("MAX_INPUT_CHARS").unwrap_or(DEFAULT_MAX_INPUT_CHARS);
    let rate_limit_rps = positive_env("RATE_LIMIT_RPS").unwrap_or(DEFAULT_RATE_LIMIT_RPS);
    let rate_limit_burst = positive_env("RATE_LIMIT_BURST").unwrap_or(DEFAULT_RATE_LIMIT_BURST);
    let client_ip_header = match env::var("CLIENT_IP_HEADER") {
        Ok(raw) => HeaderName::from_bytes(raw.trim().as_bytes())
            .with_context(|| format!("CLIENT_IP_HEADER is not a valid header name: {raw:?}"))?,
        Err(_) => HeaderName::from_static(DEFAULT_CLIENT_HEADER),
    };

    Ok(Config {
        host,
        port,
        lexicon_dir,
        lexicon_mode,
        max_input_chars,
        rate_limit_rps,
        rate_limit_burst,
        client_ip_header,
    })
}

fn positive_env<T>(name: &str) -> Option<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .filter(|v| *v > T::default())
}

fn parse_load_mode(raw: &str) -> Option<LoadMode> {
    match raw.to_ascii_lowercase().as_str() {
        "mmap" => Some(LoadMode::Mmap),
        "owned" => Some(LoadMode::Owned),
        _ => None,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}

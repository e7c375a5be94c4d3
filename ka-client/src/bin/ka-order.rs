//! `ka-order` command line client

use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use ka_client::logger::init_logger_with_file;
use ka_client::{
    AppError, CartLine, CatalogCache, CatalogItem, ClientConfig, OrderingSession, RealtimeStore,
    RpcClient, SessionStatus, SessionStore,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "ka-order")]
#[command(about = "Browse the KA retail catalog and place orders")]
struct Args {
    /// Working directory (cache, session, logs)
    #[arg(long, env = "KA_WORK_DIR", value_name = "DIR")]
    work_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List catalog styles
    Items {
        /// Only styles containing this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Fetch the catalog now, ignoring the cache
    Sync,
    /// Submit an order from a cart file
    Order {
        /// Party name; defaults to the logged-in business
        #[arg(short, long)]
        party: Option<String>,
        /// JSON array of `{ "name": style, "colors": { color: { size: qty } } }`
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
        /// Order note
        #[arg(short, long, default_value = "")]
        note: String,
    },
    /// Request an OTP, or log in when `--otp` is given
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        otp: Option<String>,
    },
    /// Forget the saved session
    Logout,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(dir) = args.work_dir {
        config = config.with_work_dir(dir);
    }

    let log_dir = config.is_production().then(|| config.log_dir());
    init_logger_with_file(&config.log_level, config.log_json, log_dir.as_deref())?;
    tracing::debug!(work_dir = %config.work_dir.display(), "Configuration loaded");

    match args.command {
        Command::Items { search } => list_items(&config, search.as_deref()).await,
        Command::Sync => sync(&config).await,
        Command::Order { party, file, note } => place_order(&config, party, &file, &note).await,
        Command::Login { email, otp } => login(&config, &email, otp.as_deref()).await,
        Command::Logout => {
            SessionStore::new(config.session_path())
                .clear()
                .map_err(user_error)?;
            println!("Logged out");
            Ok(())
        }
    }
}

/// Component error as a user-facing message carrying its code
fn user_error(err: impl Into<AppError>) -> anyhow::Error {
    let err: AppError = err.into();
    tracing::error!(
        code = %err.code,
        category = err.code.category().name(),
        message = %err.message,
        "Command failed"
    );
    if err.message == err.user_message() {
        anyhow!("{} (code {})", err.message, err.code)
    } else {
        anyhow!("{} (code {}): {}", err.user_message(), err.code, err.message)
    }
}

fn open_session(config: &ClientConfig) -> anyhow::Result<OrderingSession<RealtimeStore>> {
    let remote = RealtimeStore::from_config(config)?;
    let cache = CatalogCache::open(config.cache_path())
        .with_context(|| format!("opening catalog cache {}", config.cache_path().display()))?;
    Ok(OrderingSession::new(Arc::new(remote), cache, config))
}

fn print_item(item: &CatalogItem) {
    println!("{}  sizes: {}", item.name, item.sizes.join(" "));
    for color in &item.colors {
        match item.color_details(color) {
            Some((name, mrp)) if !mrp.is_empty() => println!("    {} {} (MRP {})", color, name, mrp),
            Some((name, _)) => println!("    {} {}", color, name),
            None => println!("    {}", color),
        }
    }
}

async fn list_items(config: &ClientConfig, search: Option<&str>) -> anyhow::Result<()> {
    let mut session = open_session(config)?;
    let source = session.load_catalog().await.map_err(user_error)?;
    if let Some(notice) = source.notice() {
        eprintln!("{}", notice.message());
    }

    let items = match search {
        Some(query) => session.search(query),
        None => session.list_items(),
    };
    for item in items {
        print_item(item);
    }
    Ok(())
}

async fn sync(config: &ClientConfig) -> anyhow::Result<()> {
    let mut session = open_session(config)?;
    session.refresh_catalog().await.map_err(user_error)?;
    println!("Synced {} styles", session.items().len());
    Ok(())
}

async fn place_order(
    config: &ClientConfig,
    party: Option<String>,
    file: &Path,
    note: &str,
) -> anyhow::Result<()> {
    let party = match party {
        Some(party) => party,
        None => {
            let rpc = RpcClient::new(config)?;
            let store = SessionStore::new(config.session_path());
            match store.validate_session(&rpc).await.map_err(user_error)? {
                SessionStatus::Valid(user) => user.party_name().to_string(),
                status => match status.error_code() {
                    Some(code) => bail!("{} (or pass --party)", code.message()),
                    None => bail!("Please login to continue, or pass --party"),
                },
            }
        }
    };

    let content = std::fs::read_to_string(file)
        .with_context(|| format!("reading cart file {}", file.display()))?;
    let lines: Vec<CartLine> = serde_json::from_str(&content).context("parsing cart file")?;

    let mut session = open_session(config)?;
    session.load_catalog().await.map_err(user_error)?;
    for line in &lines {
        session.add_to_cart(&line.style, &line.colors).map_err(user_error)?;
    }

    for row in session.summary_rows() {
        println!("{} ({})  {}  = {}", row.style, row.color, row.sizes_label(), row.total);
    }

    let order = session.submit_order(&party, note).await.map_err(user_error)?;
    session.empty_cart();

    println!();
    println!("Order placed: {}", order.reference_number);
    println!();
    println!("{}", order.share_message());
    Ok(())
}

async fn login(config: &ClientConfig, email: &str, otp: Option<&str>) -> anyhow::Result<()> {
    let rpc = RpcClient::new(config)?;
    let store = SessionStore::new(config.session_path());

    match otp {
        None => {
            let message = store.request_otp(&rpc, email).await.map_err(user_error)?;
            println!("{}", if message.is_empty() { "OTP sent" } else { message.as_str() });
            println!("Run again with --otp <code> to log in");
        }
        Some(otp) => {
            let user = store.login_with_otp(&rpc, email, otp).await.map_err(user_error)?;
            println!("Logged in as {} ({})", user.party_name(), user.email);
        }
    }
    Ok(())
}

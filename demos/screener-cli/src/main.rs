use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use screener::prelude::*;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "screener",
    about = "Log in to the market screener API and browse its dashboard",
    version
)]
struct Cli {
    /// API server, e.g. http://127.0.0.1:8000
    #[arg(long, global = true, env = screener::ENV_BASE_URL)]
    base_url: Option<String>,

    /// Where the session tokens are kept between runs
    #[arg(long, global = true, env = screener::ENV_STORAGE_PATH)]
    storage_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Obtain a token pair and keep it for later runs
    Login {
        #[arg(short, long)]
        username: String,
        /// Read from stdin when omitted
        #[arg(short, long, env = "SCREENER_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show who the stored session belongs to
    Whoami,
    /// Render a screen: /, /login or /application
    Open {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Fetch market data and print the summary
    Market {
        /// Print the counts as JSON
        #[arg(long)]
        json: bool,
    },
    /// Exchange the refresh token for a new access token
    Refresh,
    /// Walk through the sign-up form
    Signup,
    /// Keep the session fresh until Ctrl-C
    Watch {
        /// Seconds between refreshes
        #[arg(long, default_value_t = RefreshConfig::RECOMMENDED_INTERVAL_SECS)]
        interval: u64,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    screener::init_tracing("warn");
    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(path) = cli.storage_path {
        config.storage_path = path;
    }
    if let Command::Watch { interval } = &cli.command {
        config.refresh = RefreshConfig::every(*interval);
    }

    let mut app = ScreenerApp::builder().config(config).build()?;
    let result = run(&mut app, cli.command).await;

    for alert in app.take_alerts() {
        eprintln!("! {alert}");
    }
    result
}

async fn run(app: &mut ScreenerApp, command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt("Password")?,
            };
            print_action(app, Action::Login { username, password }).await
        }
        Command::Logout => print_action(app, Action::Logout).await,
        Command::Whoami => print_action(app, Action::Whoami).await,
        Command::Open { path } => print_action(app, Action::Open { path }).await,
        Command::Refresh => print_action(app, Action::Refresh).await,
        Command::Market { json } => market(app, json).await,
        Command::Signup => signup(),
        Command::Watch { .. } => watch(app).await,
    }
}

async fn print_action(app: &mut ScreenerApp, action: Action) -> Result<(), Box<dyn Error>> {
    let text = handle_action(app, action).await?;
    println!("{text}");
    Ok(())
}

async fn market(app: &mut ScreenerApp, json: bool) -> Result<(), Box<dyn Error>> {
    let resolution = app.navigate(Route::Application.path()).await?;
    if resolution.redirected() {
        return Err("not logged in; run `screener login` first".into());
    }

    if json {
        println!("{}", market_json(app.market())?);
    } else {
        if app.market().is_none() {
            return Err(MARKET_UNAVAILABLE.into());
        }
        println!("{}", app.render().await?);
    }
    Ok(())
}

const MARKET_UNAVAILABLE: &str = "market data could not be fetched; see the log for details";

/// The dashboard counts as JSON. A failed fetch is an error, never
/// all-zero counts.
fn market_json(market: Option<&MarketSnapshot>) -> Result<String, Box<dyn Error>> {
    let snapshot = market.ok_or(MARKET_UNAVAILABLE)?;
    Ok(serde_json::to_string_pretty(&MarketStats::from_snapshot(snapshot))?)
}

fn signup() -> Result<(), Box<dyn Error>> {
    let mut form = SignupForm::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        println!("\n{}", form.render());
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next().transpose()? else {
            return Ok(());
        };
        if line.trim() == "<" {
            form.back();
            continue;
        }

        form.set_value(&line);
        match form.next() {
            Ok(SignupProgress::Advanced(_)) => {}
            Ok(SignupProgress::Complete(details)) => {
                println!("Thanks {}, sign-up is not open yet.", details.username);
                return Ok(());
            }
            Err(e) => tracing::debug!(error = %e, "signup step rejected"),
        }
    }
}

async fn watch(app: &mut ScreenerApp) -> Result<(), Box<dyn Error>> {
    let Some(task) = app.spawn_refresh_task() else {
        return Err("refresh interval must be greater than zero".into());
    };
    println!("Keeping the session fresh. Press Ctrl-C to stop.");

    tokio::signal::ctrl_c().await?;
    let metrics = task.stop().await;
    println!(
        "{} refreshed, {} failed, {} skipped",
        metrics.total_refreshed, metrics.total_failed, metrics.total_skipped
    );
    Ok(())
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

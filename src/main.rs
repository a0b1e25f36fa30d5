//! # flash-client — terminal driver
//!
//! Plays one session against the backend from the terminal.
//!
//! ## Flow
//! ```text
//! 1. Hydrate identity from FLASH_IDENTITY_FILE (login with FLASH_EMAIL/PASSWORD if needed)
//! 2. Fetch the session options for FLASH_MODE
//! 3. Create the session, then for every iteration:
//!      stdin  b / s / k  ─▶ Decision ─▶ engine
//!      1s interval       ─▶ countdown, forced skip on expiry
//! 4. Print results and the scoreboard
//! ```
//!
//! Environment variables are listed in [`flash_client::config`].

use std::sync::Arc;

use anyhow::{bail, Context};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use flash_client::api::{ApiGateway, ReqwestTransport};
use flash_client::auth::FileIdentityStorage;
use flash_client::config::{ClientConfig, SessionDefaults};
use flash_client::engine::{run_session, RunOutcome, SessionEngine};
use flash_client::events::SessionEvent;
use flash_client::models::Decision;
use flash_client::state::build_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env (optional) ──────────────────────────────────────────────
    dotenvy::dotenv().ok();

    // ── 2. Initialise structured logging ─────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env()
            .add_directive("flash_client=debug".parse()?)
            .add_directive("reqwest=warn".parse()?))
        .init();

    info!(r#"

  ╔═══════════════════════════════════════════╗
  ║   FLASH DECISION — Trainer Client         ║
  ║   b = buy  ·  s = sell  ·  k = skip       ║
  ╚═══════════════════════════════════════════╝"#);

    let config = ClientConfig::from_env().context("Failed to load client config")?;
    let defaults = SessionDefaults::from_env().context("Failed to load session defaults")?;

    info!(
        backend  = %config.api_url,
        identity = %config.identity_file.display(),
        mode     = %defaults.config.mode,
        ticker   = %defaults.config.ticker,
        "flash-client started"
    );

    // ── 3. Shared state + gateway ────────────────────────────────────────────
    let state = build_state(Box::new(FileIdentityStorage::new(&config.identity_file)));
    let transport = ReqwestTransport::new(&config.api_url, config.request_timeout);
    let gateway = ApiGateway::new(Arc::new(transport), state.clone());

    // ── 4. Sign in ───────────────────────────────────────────────────────────
    if !state.auth.is_authenticated() {
        let Some(credentials) = defaults.credentials.as_ref() else {
            bail!("Not signed in: set FLASH_EMAIL and FLASH_PASSWORD");
        };
        gateway.login(credentials).await.context("Login failed")?;
        info!(email = %credentials.email, "🔑 Signed in");
    }

    // ── 5. Options (informational) ───────────────────────────────────────────
    match gateway.session_options(defaults.config.mode).await {
        Ok(options) => info!(
            tickers    = options.tickers.len(),
            timeframes = ?options.timeframes,
            "Session options loaded"
        ),
        Err(e) => warn!(error = %e, "Could not load session options — using configured defaults"),
    }

    // ── 6. Play ──────────────────────────────────────────────────────────────
    let mut engine = SessionEngine::new(gateway.clone());
    let printer = tokio::spawn(print_events(engine.subscribe()));

    engine
        .create_session(defaults.config.clone())
        .await
        .context("Failed to create session")?;

    let (tx, rx) = mpsc::channel(8);
    std::thread::spawn(move || read_decisions(tx));

    let outcome = run_session(&mut engine, rx).await;
    drop(engine);
    printer.await.ok();

    match outcome {
        RunOutcome::Completed => info!("🏁 Session finished"),
        RunOutcome::Stopped => {
            info!("Session stopped before the end");
            return Ok(());
        }
        RunOutcome::Failed => {
            for e in state.errors.entries() {
                error!(kind = %e.kind, status = ?e.http_status, "{}", e.message);
            }
            bail!("Session failed");
        }
    }

    // ── 7. Scoreboard ────────────────────────────────────────────────────────
    if let Some(user_id) = state.auth.current_identity().id {
        match gateway.scoreboard(defaults.config.mode, &user_id).await {
            Ok(board) => {
                if let Some(rank) = board.user_rank {
                    info!(mode = %rank.mode, rank = rank.rank, "🏆 Your rank");
                }
                if let Some(summary) = board.user_mode_summary {
                    info!(
                        sessions     = summary.total_sessions,
                        profitable   = summary.profitable_sessions,
                        total_result = summary.total_result,
                        best         = summary.best_session_result,
                        "Mode summary"
                    );
                }
            }
            Err(e) => warn!(error = %e, "Could not load scoreboard"),
        }
    }

    Ok(())
}

/// Forward `b` / `s` / `k` lines from stdin as decisions; `q` or EOF stops.
///
/// Blocking: runs on its own OS thread, outside the runtime.
fn read_decisions(tx: mpsc::Sender<Decision>) {
    for line in std::io::stdin().lines().map_while(Result::ok) {
        let decision = match line.trim() {
            "b" | "buy" => Decision::Buy,
            "s" | "sell" => Decision::Sell,
            "k" | "skip" => Decision::Skip,
            "q" | "quit" => break,
            "" => continue,
            other => {
                warn!(input = other, "Unknown input — use b, s, k or q");
                continue;
            }
        };

        if tx.blocking_send(decision).is_err() {
            break;
        }
    }
}

async fn print_events(mut rx: broadcast::Receiver<SessionEvent>) {
    loop {
        match rx.recv().await {
            Ok(SessionEvent::IterationStarted { iteration_num, timer_seconds }) => {
                println!("── Iteration {iteration_num}: {timer_seconds}s to decide (b/s/k)");
            }
            Ok(SessionEvent::TimerTick { remaining, .. }) if remaining <= 3 => {
                println!("   {remaining}s");
            }
            Ok(SessionEvent::DecisionSubmitted { record, result_final }) => match result_final {
                Some(result) => println!("   {} in {}s → {result:+.3}", record.decision, record.time_spent_seconds),
                None => println!("   {} in {}s", record.decision, record.time_spent_seconds),
            },
            Ok(SessionEvent::DecisionPending { decision, .. }) => {
                println!("   {decision} not delivered — press any decision key to retry");
            }
            Ok(SessionEvent::SessionCompleted { results }) => {
                println!(
                    "== Done: {} decisions, {} profitable, total {:+.3}",
                    results.total_decisions, results.profitable_decisions, results.total_result
                );
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(n)) => warn!(skipped = n, "Event printer lagged"),
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

//! # vega-terminal: Register Binary for Vega POS
//!
//! Headless terminal session: stdin lines act as USB-wedge scans, slash
//! commands drive payment and commit, output goes to stdout via the
//! [`ConsoleSink`](sink::ConsoleSink).
//!
//! ## Wiring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         vega-terminal                                   │
//! │                                                                         │
//! │  stdin ──► parse_command ──► mpsc ──► Session ──► EventSink ──► stdout  │
//! │                                         │                               │
//! │                              ┌──────────┼──────────┐                    │
//! │                              ▼          ▼          ▼                    │
//! │                         ScanRouter    Cart    TicketRepository          │
//! │                          (vega-db) (vega-core)   (vega-db)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Commands
//! ```text
//! <barcode>          scan (wedge entry)
//! /qty <line> <n>    set quantity of cart line (1-based; 0 removes)
//! /remove <line>     remove cart line
//! /discount <amt>    whole-sale discount, e.g. /discount 1.50
//! /pay <amt>         tendered payment, e.g. /pay 20
//! /customer <name>   customer reference
//! /commit            commit the sale
//! /clear             empty the cart
//! /quit              end the session
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod router;
pub mod session;
pub mod sink;

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vega_core::Money;
use vega_db::{Database, DbConfig};
use vega_scan::ScanDebouncer;

use crate::config::TerminalConfig;
use crate::context::AppContext;
use crate::error::SessionResult;
use crate::session::{Session, SessionCommand};
use crate::sink::ConsoleSink;

/// Runs the terminal until stdin closes or `/quit`.
pub async fn run() -> SessionResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = TerminalConfig::load_or_default(None);
    info!(
        device = %config.device.name,
        db = %config.database.path.display(),
        "Starting Vega POS terminal"
    );

    let db = Database::new(DbConfig::new(&config.database.path)).await?;
    let context = AppContext::new(db.clone(), &config.session.cashier_id, &config.device.id);

    let session = Session::new(
        context,
        ScanDebouncer::new(config.scanner.wedge_window()),
        Arc::new(ConsoleSink),
    );

    let (tx, rx) = mpsc::channel(64);
    let session_task = tokio::spawn(session.run(rx, None));

    // stdin loop: each line is a wedge scan or a slash command.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match parse_command(&line) {
            Ok(Some(SessionCommand::Shutdown)) => {
                let _ = tx.send(SessionCommand::Shutdown).await;
                break;
            }
            Ok(Some(command)) => {
                if tx.send(command).await.is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(usage) => println!("[ ! ] {usage}"),
        }
    }
    drop(tx);

    let _ = session_task.await;
    db.close().await;
    info!("Terminal stopped");
    Ok(())
}

/// Parses one stdin line into a command.
///
/// `Ok(None)` for blank lines; `Err(usage)` for a malformed slash command.
/// Anything that doesn't start with `/` is a wedge entry.
fn parse_command(line: &str) -> Result<Option<SessionCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if !line.starts_with('/') {
        return Ok(Some(SessionCommand::Entry(line.to_string())));
    }

    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let rest: Vec<&str> = parts.collect();

    match command {
        "/qty" => {
            let (line_no, quantity) = match (rest.first(), rest.get(1)) {
                (Some(l), Some(q)) => (l.parse::<usize>(), q.parse::<i64>()),
                _ => return Err("usage: /qty <line> <quantity>".to_string()),
            };
            match (line_no, quantity) {
                // 1-based on the console, 0-based in the cart.
                (Ok(l), Ok(q)) if l >= 1 => Ok(Some(SessionCommand::SetQuantity {
                    index: l - 1,
                    quantity: q,
                })),
                _ => Err("usage: /qty <line> <quantity>".to_string()),
            }
        }
        "/remove" => match rest.first().map(|l| l.parse::<usize>()) {
            Some(Ok(l)) if l >= 1 => Ok(Some(SessionCommand::RemoveLine(l - 1))),
            _ => Err("usage: /remove <line>".to_string()),
        },
        "/discount" => parse_amount("discount", "/discount", &rest)
            .map(|cents| Some(SessionCommand::SetDiscount(cents))),
        "/pay" => parse_amount("payment", "/pay", &rest)
            .map(|cents| Some(SessionCommand::SetPayment(cents))),
        "/customer" => {
            if rest.is_empty() {
                Err("usage: /customer <name>".to_string())
            } else {
                Ok(Some(SessionCommand::SetCustomer(rest.join(" "))))
            }
        }
        "/commit" => Ok(Some(SessionCommand::Commit)),
        "/clear" => Ok(Some(SessionCommand::Clear)),
        "/quit" | "/exit" => Ok(Some(SessionCommand::Shutdown)),
        other => Err(format!("unknown command: {other}")),
    }
}

fn parse_amount(field: &str, usage: &str, rest: &[&str]) -> Result<i64, String> {
    let raw = rest
        .first()
        .ok_or_else(|| format!("usage: {usage} <amount>"))?;
    Money::parse(field, raw)
        .map(|money| money.cents())
        .map_err(|e| e.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_line_is_entry() {
        match parse_command("8901234567890").unwrap() {
            Some(SessionCommand::Entry(payload)) => assert_eq!(payload, "8901234567890"),
            other => panic!("expected Entry, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_line_is_ignored() {
        assert!(parse_command("   ").unwrap().is_none());
    }

    #[test]
    fn test_pay_parses_decimal_amount() {
        match parse_command("/pay 12.50").unwrap() {
            Some(SessionCommand::SetPayment(cents)) => assert_eq!(cents, 1250),
            other => panic!("expected SetPayment, got {other:?}"),
        }
    }

    #[test]
    fn test_qty_is_one_based() {
        match parse_command("/qty 1 3").unwrap() {
            Some(SessionCommand::SetQuantity { index, quantity }) => {
                assert_eq!(index, 0);
                assert_eq!(quantity, 3);
            }
            other => panic!("expected SetQuantity, got {other:?}"),
        }

        assert!(parse_command("/qty 0 3").is_err());
        assert!(parse_command("/qty").is_err());
    }

    #[test]
    fn test_bad_amount_is_usage_error() {
        assert!(parse_command("/pay abc").is_err());
        assert!(parse_command("/discount").is_err());
    }

    #[test]
    fn test_quit_variants() {
        assert!(matches!(
            parse_command("/quit").unwrap(),
            Some(SessionCommand::Shutdown)
        ));
        assert!(matches!(
            parse_command("/exit").unwrap(),
            Some(SessionCommand::Shutdown)
        ));
    }
}

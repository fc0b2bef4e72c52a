//! Ledger is a backend for keeping a personal finance ledger.
//!
//! The ledger is made of two kinds of records:
//! - [entries](models::Entry) summarise the money that came in and went out on a day,
//! - [expenses](models::Expense) record single transactions and may be linked to an entry.
//!
//! This library provides a JSON REST API for creating, querying and modifying
//! both kinds of records, and for exporting them as CSV files.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod database_id;
mod db;
mod endpoints;
mod error;
mod export;
mod extract;
mod latest;
mod linking;
mod logging;
pub mod models;
pub mod query;
mod relations;
mod routes;
pub mod stores;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, ExportState};
pub use database_id::{DatabaseId, EntryId, ExpenseId};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use export::ExportConfig;
pub use logging::logging_middleware;
pub use routes::{Count, build_router};
pub use timezone::get_local_offset;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Could not install the Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("Could not install the terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

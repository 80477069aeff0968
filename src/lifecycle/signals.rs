//! OS signal handling.

/// Resolves on Ctrl+C.
///
/// If the handler cannot be installed this never resolves, and the process
/// must be stopped another way.
pub async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Interrupt received");
}

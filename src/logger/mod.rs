//! Logger module
//!
//! Provides logging utilities for the review service including:
//! - Server lifecycle logging
//! - Route registration logging
//! - Access logging (combined or JSON)
//! - Error and warning logging

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use crate::routing::RouteError;
use crate::store::seed::SeedSummary;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn write_info(message: &str) {
    if writer::is_initialized() {
        writer::get().write_info(message);
    } else {
        println!("{message}");
    }
}

fn write_error(message: &str) {
    if writer::is_initialized() {
        writer::get().write_error(message);
    } else {
        eprintln!("{message}");
    }
}

fn write_access(message: &str) {
    if writer::is_initialized() {
        writer::get().write_access(message);
    } else {
        println!("{message}");
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, routes: usize) {
    write_info("======================================");
    write_info(&format!("{} started", config.http.server_name));
    write_info(&format!("Listening on: http://{addr}"));
    if !config.server.base_path.is_empty() {
        write_info(&format!("Mounted under: {}", config.server.base_path));
    }
    write_info(&format!("Routes: {routes}"));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_route_registered(method: &str, path: &str, required_auth: bool) {
    let auth = if required_auth { " (auth)" } else { "" };
    write_info(&format!("[Route] {method} {path}{auth}"));
}

pub fn log_route_skipped(method: &str, path: &str, err: &RouteError) {
    write_error(&format!("[ERROR] Skipping route {method} {path}: {err}"));
}

pub fn log_seed_loaded(path: &str, summary: &SeedSummary) {
    write_info(&format!("[Seed] Loaded {path}: {summary}"));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_connection_limit(peer_addr: &SocketAddr, limit: usize) {
    log_warning(&format!(
        "Dropping connection from {peer_addr}: {limit} connections already open"
    ));
}

pub fn log_shutdown() {
    write_info("\n[Shutdown] Signal received, stopping listener");
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

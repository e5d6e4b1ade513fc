//! autoreject-sync - declines calendar invitations that conflict with
//! autoreject blocks
//!
//! Usage: autoreject-sync [path/to/autoreject.json]

use anyhow::{Context, Result, bail};
use autoreject::{
    AutorejectConfig, GoogleAuth, GoogleCalendarClient, GoogleCredentials, SqliteSettingsStore,
    SyncEngine, SyncTarget,
};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use std::path::Path;
use std::sync::Arc;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let service = match std::env::args().nth(1) {
        Some(path) => AutorejectConfig::from_file(Path::new(&path))?,
        None => AutorejectConfig::load()?,
    };

    if service.targets.is_empty() {
        warn!("No sync targets configured, nothing to do");
        return Ok(());
    }

    let credentials = GoogleCredentials::load().context("Failed to load Google credentials")?;

    let db_path = service.database_path()?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let store = Arc::new(SqliteSettingsStore::new(&db_path)?);
    info!("Using settings database at {}", db_path.display());

    let mut engines = Vec::new();
    for (user_id, targets) in service.targets_by_user() {
        let auth = match GoogleAuth::for_user(&credentials, &user_id) {
            Ok(auth) => auth,
            Err(e) => {
                error!("Skipping {}: {:#}", user_id, e);
                continue;
            }
        };
        let client = GoogleCalendarClient::new(auth);
        if !client.is_authenticated() {
            warn!("No usable token for {}; its calendars will fail until one is provisioned", user_id);
        }

        let engine = SyncEngine::new(Arc::new(client), store.clone());
        let targets = register_targets(&engine, targets, Utc::now());
        if targets.is_empty() {
            error!("Skipping {}: no calendar could be registered", user_id);
            continue;
        }
        engines.push((engine, targets));
    }

    if engines.is_empty() {
        bail!("No sync target could be started");
    }

    loop {
        let failures = sync_pass(&engines);

        match service.poll_interval() {
            Some(interval) => {
                info!("Next pass in {}s", interval.as_secs());
                std::thread::sleep(interval);
            }
            None if failures > 0 => bail!("{} target(s) failed to sync", failures),
            None => return Ok(()),
        }
    }
}

/// Register targets that lack a cutoff, keeping only those that are ready
fn register_targets(
    engine: &SyncEngine,
    targets: Vec<SyncTarget>,
    now: DateTime<Utc>,
) -> Vec<SyncTarget> {
    targets
        .into_iter()
        .filter(|target| match engine.ensure_registered(target, now) {
            Ok(true) => {
                info!("Now watching {}", target);
                true
            }
            Ok(false) => true,
            Err(e) => {
                error!("Failed to register {}: {:#}", target, e);
                false
            }
        })
        .collect()
}

/// Run one cycle for every target, returning how many failed
fn sync_pass(engines: &[(SyncEngine, Vec<SyncTarget>)]) -> usize {
    let mut failures = 0;

    for (engine, targets) in engines {
        for (target, result) in engine.sync_all(targets) {
            match result {
                Ok(stats) if stats.declined > 0 => {
                    info!("{}: declined {} invitation(s)", target, stats.declined);
                }
                Ok(_) => {}
                Err(e) => {
                    error!("Sync failed for {}: {:#}", target, e);
                    failures += 1;
                }
            }
        }
    }

    failures
}

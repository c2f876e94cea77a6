use anyhow::{Context, Result};
use rusqlite::Connection;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use crate::visit::{Transition, Visit, VisitStore};

/// Microseconds between 1601-01-01 (WebKit epoch) and 1970-01-01.
const WEBKIT_EPOCH_OFFSET_MICROS: i64 = 11_644_473_600_000_000;

const VISITS_QUERY: &str = "SELECT visits.id, urls.url, urls.title, visits.visit_time, \
     visits.from_visit, visits.transition \
     FROM visits JOIN urls ON visits.url = urls.id \
     ORDER BY visits.visit_time, visits.id";

pub fn get_browser_history_path(browser: &str) -> Result<PathBuf> {
    let system = env::consts::OS;
    let home = env::var("HOME").or_else(|_| env::var("USERPROFILE"))?;

    let profile_dir = match (browser.to_lowercase().as_str(), system) {
        ("vivaldi", "windows") => local_app_data()?.join("Vivaldi/User Data/Default"),
        ("vivaldi", "macos") => {
            PathBuf::from(home).join("Library/Application Support/Vivaldi/Default")
        }
        ("vivaldi", "linux") => PathBuf::from(home).join(".config/vivaldi/Default"),
        ("chrome", "windows") => local_app_data()?.join("Google/Chrome/User Data/Default"),
        ("chrome", "macos") => {
            PathBuf::from(home).join("Library/Application Support/Google/Chrome/Default")
        }
        ("chrome", "linux") => PathBuf::from(home).join(".config/google-chrome/Default"),
        ("chromium", "windows") => local_app_data()?.join("Chromium/User Data/Default"),
        ("chromium", "macos") => {
            PathBuf::from(home).join("Library/Application Support/Chromium/Default")
        }
        ("chromium", "linux") => PathBuf::from(home).join(".config/chromium/Default"),
        ("brave", "windows") => {
            local_app_data()?.join("BraveSoftware/Brave-Browser/User Data/Default")
        }
        ("brave", "macos") => PathBuf::from(home)
            .join("Library/Application Support/BraveSoftware/Brave-Browser/Default"),
        ("brave", "linux") => {
            PathBuf::from(home).join(".config/BraveSoftware/Brave-Browser/Default")
        }
        ("edge", "windows") => local_app_data()?.join("Microsoft/Edge/User Data/Default"),
        ("edge", "macos") => {
            PathBuf::from(home).join("Library/Application Support/Microsoft Edge/Default")
        }
        ("edge", "linux") => PathBuf::from(home).join(".config/microsoft-edge/Default"),
        _ => anyhow::bail!(
            "Unsupported browser '{}' or operating system '{}'",
            browser,
            system
        ),
    };

    let path = profile_dir.join("History");
    info!(action = "resolve", component = "browser_path", browser = browser, path = ?path, "Browser history path resolved");
    Ok(path)
}

fn local_app_data() -> Result<PathBuf> {
    let dir = env::var("LOCALAPPDATA").context("LOCALAPPDATA is not set")?;
    Ok(PathBuf::from(dir))
}

/// Copies the (usually locked) live database so it can be opened safely.
pub fn copy_history_database(history_path: &Path, temp_path: Option<&Path>) -> Result<PathBuf> {
    let start_time = Instant::now();

    let temp_path = match temp_path {
        Some(path) => path.to_path_buf(),
        None => env::temp_dir().join(format!("visitstats_history_{}.db", std::process::id())),
    };

    info!(action = "copy", component = "database_copy", source = ?history_path, destination = ?temp_path, "Database copy paths");

    if !history_path.exists() {
        anyhow::bail!("History file not found at {:?}", history_path);
    }

    fs::copy(history_path, &temp_path)
        .with_context(|| format!("Failed to copy {:?} to {:?}", history_path, temp_path))?;

    info!(action = "complete", component = "database_copy", duration_ms = start_time.elapsed().as_millis(), "Database copy completed");
    Ok(temp_path)
}

/// Converts a WebKit timestamp to Unix milliseconds. Pre-1970 times yield `None`.
pub fn webkit_to_unix_millis(webkit_micros: i64) -> Option<i64> {
    let unix_micros = webkit_micros.checked_sub(WEBKIT_EPOCH_OFFSET_MICROS)?;
    (unix_micros >= 0).then_some(unix_micros / 1000)
}

/// Reads every visit from a Chromium `History` database, oldest first.
///
/// Rows before 1970 or with an unknown transition code are skipped.
pub fn load_visits(conn: &Connection) -> Result<VisitStore> {
    let start_time = Instant::now();

    let mut stmt = conn
        .prepare(VISITS_QUERY)
        .context("Failed to prepare visits query")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, i64>(3)?,
            row.get::<_, Option<i64>>(4)?,
            row.get::<_, i64>(5)?,
        ))
    })?;

    let mut visits = Vec::new();
    let mut skipped_time = 0u32;
    let mut skipped_transition = 0u32;

    for row in rows {
        let (id, url, title, visit_time, from_visit, transition) =
            row.context("Failed to read visit row")?;

        let Some(time) = webkit_to_unix_millis(visit_time) else {
            skipped_time += 1;
            continue;
        };
        let Some(transition) = Transition::from_chrome_code(transition) else {
            skipped_transition += 1;
            continue;
        };

        visits.push(Visit {
            id: id.to_string(),
            url,
            title: title.unwrap_or_default(),
            time,
            ref_id: from_visit.filter(|&v| v != 0).map(|v| v.to_string()),
            transition,
        });
    }

    if skipped_time > 0 || skipped_transition > 0 {
        warn!(
            action = "skip",
            component = "visit_loading",
            skipped_time,
            skipped_transition,
            "Skipped visits that cannot be represented"
        );
    }

    info!(
        action = "complete",
        component = "visit_loading",
        visit_count = visits.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Loaded visits from database"
    );
    Ok(VisitStore::new(visits))
}

/// Copies, opens and reads `history_path`, then removes the copy.
pub fn load_history_file(history_path: &Path, temp_path: Option<&Path>) -> Result<VisitStore> {
    let temp_history_path = copy_history_database(history_path, temp_path)?;

    let store = Connection::open(&temp_history_path)
        .with_context(|| format!("Failed to open {:?}", temp_history_path))
        .and_then(|conn| load_visits(&conn));

    if let Err(e) = fs::remove_file(&temp_history_path) {
        warn!(action = "cleanup", component = "database_copy", error = %e, "Failed to remove temporary file");
    }

    store
}

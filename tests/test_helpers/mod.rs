//! Shared environment guards for integration tests.

use std::env;
use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard, OnceLock};

static ENV_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

/// Every variable read by the settings loader, cleared before each scenario
/// so the host environment cannot leak into assertions.
pub const CASEBRIDGE_VARIABLES: [&str; 16] = [
    "CASEBRIDGE_BASE_URL",
    "CASEBRIDGE_CLIENT_ID",
    "CASEBRIDGE_CLIENT_SECRET",
    "CASEBRIDGE_TOKEN_URL",
    "CASEBRIDGE_FALLBACK_CASE_ENDPOINT",
    "CASEBRIDGE_REQUEST_TIMEOUT_SECS",
    "CASEBRIDGE_TOKEN_LEEWAY_SECS",
    "CASEBRIDGE_MAX_ATTEMPTS",
    "CASEBRIDGE_RETRY_BASE_DELAY_MS",
    "CASEBRIDGE_PAGE_SIZE",
    "CASEBRIDGE_CATALOG_TTL_SECS",
    "CASEBRIDGE_ITEM_INTERVAL_MS",
    "CASEBRIDGE_LOCAL_UTC_OFFSET_HOURS",
    "CASEBRIDGE_TASK_TYPE_ID",
    "CASEBRIDGE_TASK_SUBTYPE_ID",
    "CASEBRIDGE_TASK_STATUS_ID",
];

/// Guard that applies a scoped environment variable update.
pub struct EnvVarGuard {
    previous: Vec<(OsString, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvVarGuard {
    /// Sets multiple environment variables for the guard lifetime.
    pub fn set_many(changes: &[(OsString, Option<OsString>)]) -> Self {
        let lock = env_lock();
        let mut previous = Vec::with_capacity(changes.len());

        for (key, value) in changes {
            previous.push((key.clone(), env::var_os(key)));
            unsafe {
                // SAFETY: the global mutex serializes environment mutations in tests.
                match value {
                    Some(new_value) => env::set_var(key, new_value),
                    None => env::remove_var(key),
                }
            }
        }

        Self {
            previous,
            _lock: lock,
        }
    }

    /// Clears every settings variable, then applies `values`.
    pub fn casebridge(values: &[(&str, &str)]) -> Self {
        let mut changes: Vec<(OsString, Option<OsString>)> = CASEBRIDGE_VARIABLES
            .iter()
            .map(|key| (OsString::from(key), None))
            .collect();
        changes.extend(
            values
                .iter()
                .map(|(key, value)| (OsString::from(key), Some(OsString::from(value)))),
        );
        Self::set_many(&changes)
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..).rev() {
            unsafe {
                // SAFETY: the global mutex serializes environment mutations in tests.
                match value {
                    Some(previous) => env::set_var(&key, &previous),
                    None => env::remove_var(&key),
                }
            }
        }
    }
}

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

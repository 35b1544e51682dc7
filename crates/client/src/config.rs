//! Client configuration loaded from the environment.

use std::env;
use std::time::Duration;

use client_frontend_core::FrontendConfig;
use runtime::RuntimeConfig;

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    /// Campaign seed; every encounter seed is derived from it.
    pub seed: u64,
    pub allow_flee: bool,
    /// Simulated frame length fed to the scene while a reveal plays.
    pub frame: Duration,
    /// Rounds after which a scripted encounter is abandoned.
    pub max_rounds: u32,
    pub runtime: RuntimeConfig,
    pub frontend: FrontendConfig,
}

impl ClientConfig {
    pub const DEFAULT_SEED: u64 = 0x5eed;
    pub const DEFAULT_FRAME: Duration = Duration::from_millis(50);
    pub const DEFAULT_MAX_ROUNDS: u32 = 40;

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `ENCOUNTER_SEED` - Campaign seed (default: 0x5eed)
    /// - `ENCOUNTER_FEEDBACK_MS` - Transient feedback lifetime (default: 600)
    /// - `ENCOUNTER_ALLOW_FLEE` - Whether the hero may flee (default: true)
    /// - `ENCOUNTER_FRAME_MS` - Frame length while reveals play (default: 50)
    /// - `ENCOUNTER_MAX_ROUNDS` - Round limit per encounter (default: 40)
    /// - `ENCOUNTER_LOG_CAPACITY` - Combat log entries kept (default: 64)
    ///
    /// Drag threshold and reveal timings come from [`FrontendConfig::from_env`].
    pub fn from_env() -> Self {
        let mut config = Self {
            frontend: FrontendConfig::from_env(),
            ..Self::default()
        };

        if let Some(seed) = read_env::<u64>("ENCOUNTER_SEED") {
            config.seed = seed;
        }
        if let Some(ms) = read_env::<u64>("ENCOUNTER_FEEDBACK_MS") {
            config.runtime = config
                .runtime
                .with_feedback_duration(Duration::from_millis(ms));
        }
        if let Some(allow) = read_env_bool("ENCOUNTER_ALLOW_FLEE") {
            config.allow_flee = allow;
        }
        if let Some(ms) = read_env::<u64>("ENCOUNTER_FRAME_MS") {
            config.frame = Duration::from_millis(ms.max(1));
        }
        if let Some(rounds) = read_env::<u32>("ENCOUNTER_MAX_ROUNDS") {
            config.max_rounds = rounds.max(1);
        }
        if let Some(capacity) = read_env::<usize>("ENCOUNTER_LOG_CAPACITY") {
            config.runtime = config.runtime.with_log_capacity(capacity);
        }

        config
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            seed: Self::DEFAULT_SEED,
            allow_flee: true,
            frame: Self::DEFAULT_FRAME,
            max_rounds: Self::DEFAULT_MAX_ROUNDS,
            runtime: RuntimeConfig::default(),
            frontend: FrontendConfig::default(),
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

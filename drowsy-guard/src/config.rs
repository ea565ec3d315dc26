//! Runtime configuration.
//!
//! Every value has a default matching the tuned behavior of the alert engine;
//! the daemon overrides them from `DROWSY_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Label the detector assigns to the drowsy class.
pub const DEFAULT_DROWSY_LABEL: &str = "Drowsy";

#[derive(Debug, Clone)]
pub struct EscalationConfig {
    /// Trailing window over which drowsy frames are counted.
    pub window: Duration,

    /// Drowsy frames within `window` that escalate to a continuous alert.
    pub escalation_threshold: usize,

    /// Minimum spacing between two single beeps.
    pub debounce: Duration,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            escalation_threshold: 6,
            debounce: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// Sound played for both single beeps and the continuous alert.
    pub asset: PathBuf,

    /// Hard cap on a continuous alert's lifetime, measured from its start.
    pub max_continuous: Duration,

    /// How often a continuous alert checks its stop flag and deadline while
    /// waiting between plays. Bounds cancellation latency.
    pub poll_interval: Duration,

    /// Pause between consecutive plays of a continuous alert.
    pub replay_gap: Duration,

    /// How long an explicit stop waits for the alert task to exit before
    /// detaching from it.
    pub stop_wait: Duration,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            asset: PathBuf::from("beep.mp3"),
            max_continuous: Duration::from_secs(15),
            poll_interval: Duration::from_millis(100),
            replay_gap: Duration::from_secs(1),
            stop_wait: Duration::from_secs(1),
        }
    }
}

/// External command used to play the alert sound to completion. The asset
/// path is appended as the last argument.
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub command: String,
    pub args: Vec<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            command: "mpg123".to_string(),
            args: vec!["-q".to_string()],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub listen: SocketAddr,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 5500)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub escalation: EscalationConfig,
    pub alert: AlertConfig,
    pub player: PlayerConfig,
    pub api: ApiConfig,

    /// Detection label treated as the drowsy predicate.
    pub drowsy_label: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            escalation: EscalationConfig::default(),
            alert: AlertConfig::default(),
            player: PlayerConfig::default(),
            api: ApiConfig::default(),
            drowsy_label: DEFAULT_DROWSY_LABEL.to_string(),
        }
    }
}

impl Config {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup, starting from
    /// the defaults and overriding whatever keys are present.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(secs) = parse::<u64>(&lookup, "DROWSY_WINDOW_SECS")? {
            config.escalation.window = Duration::from_secs(secs);
        }
        if let Some(n) = parse::<usize>(&lookup, "DROWSY_ESCALATION_THRESHOLD")? {
            config.escalation.escalation_threshold = n;
        }
        if let Some(ms) = parse::<u64>(&lookup, "DROWSY_DEBOUNCE_MS")? {
            config.escalation.debounce = Duration::from_millis(ms);
        }
        if let Some(secs) = parse::<u64>(&lookup, "DROWSY_MAX_CONTINUOUS_SECS")? {
            config.alert.max_continuous = Duration::from_secs(secs);
        }
        if let Some(ms) = parse::<u64>(&lookup, "DROWSY_POLL_INTERVAL_MS")? {
            config.alert.poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = parse::<u64>(&lookup, "DROWSY_REPLAY_GAP_MS")? {
            config.alert.replay_gap = Duration::from_millis(ms);
        }
        if let Some(ms) = parse::<u64>(&lookup, "DROWSY_STOP_WAIT_MS")? {
            config.alert.stop_wait = Duration::from_millis(ms);
        }
        if let Some(asset) = lookup("DROWSY_ASSET") {
            config.alert.asset = PathBuf::from(asset);
        }
        if let Some(label) = lookup("DROWSY_LABEL") {
            config.drowsy_label = label;
        }
        if let Some(command) = lookup("DROWSY_PLAYER") {
            config.player.command = command;
        }
        if let Some(args) = lookup("DROWSY_PLAYER_ARGS") {
            config.player.args = args.split_whitespace().map(str::to_string).collect();
        }
        if let Some(listen) = parse::<SocketAddr>(&lookup, "DROWSY_API_ADDR")? {
            config.api.listen = listen;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.escalation.escalation_threshold == 0 {
            return Err(Error::Config(
                "escalation threshold must be at least 1".to_string(),
            ));
        }
        if self.escalation.window.is_zero() {
            return Err(Error::Config("window must be non-zero".to_string()));
        }
        if self.alert.poll_interval.is_zero() {
            return Err(Error::Config("poll interval must be non-zero".to_string()));
        }
        if self.drowsy_label.is_empty() {
            return Err(Error::Config("drowsy label must not be empty".to_string()));
        }
        if self.player.command.is_empty() {
            return Err(Error::Config("player command must not be empty".to_string()));
        }
        Ok(())
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| Error::Config(format!("{key}={raw:?}: {e}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_tuned_constants() {
        let config = Config::from_lookup(|_| None).unwrap();

        assert_eq!(config.escalation.window, Duration::from_secs(60));
        assert_eq!(config.escalation.escalation_threshold, 6);
        assert_eq!(config.escalation.debounce, Duration::from_secs(1));
        assert_eq!(config.alert.max_continuous, Duration::from_secs(15));
        assert_eq!(config.alert.poll_interval, Duration::from_millis(100));
        assert_eq!(config.alert.stop_wait, Duration::from_secs(1));
        assert_eq!(config.drowsy_label, "Drowsy");
        assert_eq!(config.api.listen.port(), 5500);
    }

    #[test]
    fn overrides_apply() {
        let config = Config::from_lookup(lookup_from(&[
            ("DROWSY_WINDOW_SECS", "30"),
            ("DROWSY_ESCALATION_THRESHOLD", "3"),
            ("DROWSY_DEBOUNCE_MS", "250"),
            ("DROWSY_ASSET", "/usr/share/sounds/alarm.mp3"),
            ("DROWSY_PLAYER", "ffplay"),
            ("DROWSY_PLAYER_ARGS", "-nodisp -autoexit"),
            ("DROWSY_API_ADDR", "0.0.0.0:8080"),
        ]))
        .unwrap();

        assert_eq!(config.escalation.window, Duration::from_secs(30));
        assert_eq!(config.escalation.escalation_threshold, 3);
        assert_eq!(config.escalation.debounce, Duration::from_millis(250));
        assert_eq!(
            config.alert.asset,
            PathBuf::from("/usr/share/sounds/alarm.mp3")
        );
        assert_eq!(config.player.command, "ffplay");
        assert_eq!(config.player.args, vec!["-nodisp", "-autoexit"]);
        assert_eq!(config.api.listen.port(), 8080);
    }

    #[test]
    fn rejects_unparseable_value() {
        let err = Config::from_lookup(lookup_from(&[("DROWSY_WINDOW_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_zero_threshold() {
        let err = Config::from_lookup(lookup_from(&[("DROWSY_ESCALATION_THRESHOLD", "0")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let err =
            Config::from_lookup(lookup_from(&[("DROWSY_POLL_INTERVAL_MS", "0")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}

//! Scanner configuration, loaded once at startup from `bistscan.toml`.
//!
//! Every section is optional; missing keys take the documented defaults.
//! Secrets can come from the environment instead of the file:
//! `BISTSCAN_TELEGRAM_TOKEN` and `BISTSCAN_CHAT_IDS` (comma-separated).

use bistscan_core::data::Lookback;
use bistscan_core::indicators::extrema::min_points;
use bistscan_core::rules::RuleParams;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const TOKEN_ENV: &str = "BISTSCAN_TELEGRAM_TOKEN";
pub const CHAT_IDS_ENV: &str = "BISTSCAN_CHAT_IDS";

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("symbol universe is empty")]
    EmptyUniverse,

    #[error("symbol {0} is listed more than once")]
    DuplicateSymbol(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("data.provider = \"csv\" requires data.csv_dir")]
    MissingCsvDir,
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

/// Which market data provider the scanner pulls from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Csv,
    Synthetic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub provider: ProviderKind,
    pub csv_dir: Option<PathBuf>,
    pub daily_lookback_days: u32,
    pub intraday_lookback_days: u32,
    /// How long Yahoo requests pause after a ban or a run of failures.
    pub breaker_cooldown_secs: u64,
    pub breaker_failure_threshold: u32,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Yahoo,
            csv_dir: None,
            daily_lookback_days: 730,
            intraday_lookback_days: 60,
            breaker_cooldown_secs: 30 * 60,
            breaker_failure_threshold: 3,
        }
    }
}

impl DataConfig {
    pub fn daily_lookback(&self) -> Lookback {
        Lookback::days(self.daily_lookback_days)
    }

    pub fn intraday_lookback(&self) -> Lookback {
        Lookback::days(self.intraday_lookback_days)
    }

    pub fn breaker_cooldown(&self) -> Duration {
        Duration::from_secs(self.breaker_cooldown_secs)
    }
}

/// Alert destinations. Without a bot token, alerts are only logged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub bot_token: Option<String>,
    pub chat_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    pub path: PathBuf,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("status.json"),
        }
    }
}

/// Full scanner configuration. Fixed at process start, never hot-reloaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Ordered symbol universe; scanned in this order every cycle.
    pub symbols: Vec<String>,
    /// Target cycle cadence.
    pub interval_secs: u64,
    /// Fan symbols out over the rayon pool instead of scanning sequentially.
    pub parallel: bool,
    /// Keep at most this many signals in history (oldest dropped). Unbounded when absent.
    pub signal_history_limit: Option<usize>,
    pub rules: RuleParams,
    pub data: DataConfig,
    pub alert: AlertConfig,
    pub status: StatusConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            symbols: default_universe(),
            interval_secs: 900,
            parallel: false,
            signal_history_limit: None,
            rules: RuleParams::default(),
            data: DataConfig::default(),
            alert: AlertConfig::default(),
            status: StatusConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Read, apply environment overrides, and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup (the process environment in production).
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
            self.alert.bot_token = Some(token.trim().to_string());
        }
        if let Some(ids) = lookup(CHAT_IDS_ENV) {
            let ids: Vec<String> = ids
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(String::from)
                .collect();
            if !ids.is_empty() {
                self.alert.chat_ids = ids;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::EmptyUniverse);
        }
        let mut seen = HashSet::new();
        for symbol in &self.symbols {
            if symbol.trim().is_empty() {
                return Err(invalid("symbols", "blank symbol"));
            }
            if !seen.insert(symbol.as_str()) {
                return Err(ConfigError::DuplicateSymbol(symbol.clone()));
            }
        }

        if self.interval_secs == 0 {
            return Err(invalid("interval_secs", "must be at least 1"));
        }
        if self.signal_history_limit == Some(0) {
            return Err(invalid("signal_history_limit", "must be at least 1 when set"));
        }

        validate_rules(&self.rules)?;

        if self.data.daily_lookback_days == 0 {
            return Err(invalid("data.daily_lookback_days", "must be at least 1"));
        }
        if self.data.intraday_lookback_days == 0 {
            return Err(invalid("data.intraday_lookback_days", "must be at least 1"));
        }
        if self.data.breaker_failure_threshold == 0 {
            return Err(invalid("data.breaker_failure_threshold", "must be at least 1"));
        }
        if self.data.provider == ProviderKind::Csv && self.data.csv_dir.is_none() {
            return Err(ConfigError::MissingCsvDir);
        }
        Ok(())
    }
}

fn validate_rules(rules: &RuleParams) -> Result<(), ConfigError> {
    if rules.momentum_period == 0 {
        return Err(invalid("rules.momentum_period", "must be at least 1"));
    }
    if rules.g2_ema_span == 0 {
        return Err(invalid("rules.g2_ema_span", "must be at least 1"));
    }
    if rules.volume_window == 0 {
        return Err(invalid("rules.volume_window", "must be at least 1"));
    }
    if !(rules.volume_multiplier.is_finite() && rules.volume_multiplier > 0.0) {
        return Err(invalid("rules.volume_multiplier", "must be a positive number"));
    }
    if rules.extrema_order == 0 {
        return Err(invalid("rules.extrema_order", "must be at least 1"));
    }
    if rules.extrema_lookback < min_points(rules.extrema_order) {
        return Err(invalid(
            "rules.extrema_lookback",
            format!(
                "must be at least {} for extrema_order {}",
                min_points(rules.extrema_order),
                rules.extrema_order
            ),
        ));
    }

    let thresholds = [
        ("rules.rsi_oversold", rules.rsi_oversold),
        ("rules.rsi_overbought", rules.rsi_overbought),
        ("rules.g2_rsi_ceiling", rules.g2_rsi_ceiling),
        ("rules.strong_buy_rsi_ceiling", rules.strong_buy_rsi_ceiling),
        ("rules.strong_sell_rsi_floor", rules.strong_sell_rsi_floor),
    ];
    for (field, value) in thresholds {
        if !(0.0..=100.0).contains(&value) {
            return Err(invalid(field, format!("{value} is outside 0..=100")));
        }
    }
    if rules.rsi_oversold >= rules.rsi_overbought {
        return Err(invalid("rules.rsi_oversold", "must be below rsi_overbought"));
    }
    Ok(())
}

/// Liquid Borsa Istanbul names with the Yahoo `.IS` suffix.
pub fn default_universe() -> Vec<String> {
    [
        "AKBNK", "ARCLK", "ASELS", "BIMAS", "EKGYO", "ENKAI", "EREGL", "FROTO", "GARAN", "HEKTS",
        "ISCTR", "KCHOL", "KOZAL", "KRDMD", "PETKM", "PGSUS", "SAHOL", "SASA", "SISE", "TCELL",
        "THYAO", "TOASO", "TUPRS", "YKBNK",
    ]
    .into_iter()
    .map(|ticker| format!("{ticker}.IS"))
    .collect()
}

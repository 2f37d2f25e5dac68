//! Alert dispatch: Telegram Bot API, or the log when no token is configured.
//!
//! Delivery is best effort. Each destination is tried independently and a
//! failure is logged and reported, never returned as an error to the scanner.

use bistscan_core::domain::{Signal, Strength};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

const TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Outcome of one dispatch across all destinations.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failures: Vec<(String, DeliveryError)>,
}

impl DeliveryReport {
    pub fn all_delivered(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Sends one formatted message to a list of destinations.
pub trait AlertDispatcher: Send + Sync {
    fn name(&self) -> &str;

    /// Deliver `message` to every destination independently.
    fn dispatch(&self, message: &str, destinations: &[String]) -> DeliveryReport;
}

/// Run `send` for each destination, collecting failures instead of stopping.
pub fn deliver_each(
    destinations: &[String],
    mut send: impl FnMut(&str) -> Result<(), DeliveryError>,
) -> DeliveryReport {
    let mut report = DeliveryReport::default();
    for destination in destinations {
        match send(destination) {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                warn!(destination = %destination, error = %e, "alert delivery failed");
                report.failures.push((destination.clone(), e));
            }
        }
    }
    report
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

/// Telegram Bot API dispatcher (`sendMessage`, HTML parse mode).
pub struct TelegramDispatcher {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl TelegramDispatcher {
    pub fn new(bot_token: &str) -> Result<Self, DeliveryError> {
        Self::with_api_base(TELEGRAM_API, bot_token)
    }

    /// Point at a different Bot API host (self-hosted server, tests).
    pub fn with_api_base(api_base: &str, bot_token: &str) -> Result<Self, DeliveryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| DeliveryError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!("{}/bot{bot_token}/sendMessage", api_base.trim_end_matches('/')),
        })
    }

    fn send_one(&self, chat_id: &str, text: &str) -> Result<(), DeliveryError> {
        let body = SendMessage {
            chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().unwrap_or_default();
        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

impl AlertDispatcher for TelegramDispatcher {
    fn name(&self) -> &str {
        "telegram"
    }

    fn dispatch(&self, message: &str, destinations: &[String]) -> DeliveryReport {
        deliver_each(destinations, |chat_id| self.send_one(chat_id, message))
    }
}

/// Logs alerts instead of sending them.
#[derive(Debug, Default, Clone)]
pub struct LogDispatcher;

impl AlertDispatcher for LogDispatcher {
    fn name(&self) -> &str {
        "log"
    }

    fn dispatch(&self, message: &str, destinations: &[String]) -> DeliveryReport {
        info!(destinations = destinations.len(), "alert\n{message}");
        DeliveryReport {
            delivered: destinations.len(),
            failures: Vec::new(),
        }
    }
}

/// Escape the three characters Telegram's HTML mode treats as markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Ticker without the exchange suffix (`THYAO.IS` -> `THYAO`).
pub fn display_symbol(symbol: &str) -> &str {
    symbol.strip_suffix(".IS").unwrap_or(symbol)
}

fn headline(strength: Strength) -> &'static str {
    match strength {
        Strength::StrongBuy => "🟢🟢 STRONG BUY",
        Strength::Buy => "🟢 BUY",
        Strength::StrongSell => "🔴🔴 STRONG SELL",
        Strength::Sell => "🔴 SELL",
        Strength::None => "⚪ WATCH",
    }
}

/// Telegram HTML body for a signal.
pub fn format_signal(signal: &Signal) -> String {
    let mut text = format!(
        "<b>{}</b> {}\nStrength: {}\nPrice: {:.2}\n",
        headline(signal.strength),
        escape_html(display_symbol(&signal.symbol)),
        signal.strength,
        signal.price,
    );
    for trigger in &signal.triggers {
        text.push_str("• ");
        text.push_str(&escape_html(trigger));
        text.push('\n');
    }
    text.push_str(&format!(
        "<i>{}</i>",
        signal.time.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    text
}

pub fn startup_message() -> String {
    "🔔 <b>BIST Signal Worker Active!</b>\nScan loop started.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn signal() -> Signal {
        Signal {
            symbol: "THYAO.IS".into(),
            price: 287.25,
            time: Utc.with_ymd_and_hms(2024, 7, 3, 8, 0, 0).unwrap(),
            triggers: vec![
                "G1+G2: daily and 4h bullish momentum".into(),
                "Golden cross: MA50 crossed above MA200".into(),
                "Volume spike: 2.00x average".into(),
            ],
            strength: Strength::StrongBuy,
        }
    }

    #[test]
    fn message_carries_every_field_in_order() {
        let text = format_signal(&signal());
        assert!(text.starts_with("<b>🟢🟢 STRONG BUY</b> THYAO\n"));
        assert!(text.contains("Strength: strong_buy"));
        assert!(text.contains("Price: 287.25"));
        assert!(text.ends_with("<i>2024-07-03 08:00:00 UTC</i>"));

        let g = text.find("G1+G2").unwrap();
        let cross = text.find("Golden cross").unwrap();
        let vol = text.find("Volume spike").unwrap();
        assert!(g < cross && cross < vol);
    }

    #[test]
    fn triggers_are_escaped() {
        let mut s = signal();
        s.triggers = vec!["a < b & c > d".into()];
        assert!(format_signal(&s).contains("a &lt; b &amp; c &gt; d"));
    }

    #[test]
    fn suffix_is_stripped_for_display() {
        assert_eq!(display_symbol("ASELS.IS"), "ASELS");
        assert_eq!(display_symbol("XU100"), "XU100");
    }

    #[test]
    fn one_failed_destination_does_not_stop_the_rest() {
        let destinations: Vec<String> = vec!["1".into(), "2".into(), "3".into()];
        let mut seen = Vec::new();
        let report = deliver_each(&destinations, |dest| {
            seen.push(dest.to_string());
            if dest == "2" {
                Err(DeliveryError::Rejected {
                    status: 403,
                    body: "bot was blocked by the user".into(),
                })
            } else {
                Ok(())
            }
        });

        assert_eq!(seen, vec!["1", "2", "3"]);
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "2");
        assert!(!report.all_delivered());
    }

    #[test]
    fn unreachable_api_is_reported_not_raised() {
        let dispatcher = TelegramDispatcher::with_api_base("http://127.0.0.1:9", "0:test").unwrap();
        let report = dispatcher.dispatch("hello", &["42".to_string()]);
        assert_eq!(report.delivered, 0);
        assert!(matches!(report.failures[0].1, DeliveryError::Transport(_)));
    }

    #[test]
    fn endpoint_layout() {
        let dispatcher = TelegramDispatcher::with_api_base("https://example.org/", "123:abc").unwrap();
        assert_eq!(dispatcher.endpoint, "https://example.org/bot123:abc/sendMessage");
    }

    #[test]
    fn log_dispatcher_always_delivers() {
        let report = LogDispatcher.dispatch("hi", &["a".to_string(), "b".to_string()]);
        assert_eq!(report.delivered, 2);
        assert!(report.all_delivered());
    }
}

use std::cmp::Ordering;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
}

impl PartialOrd for LogLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        fn rank(level: LogLevel) -> u8 {
            match level {
                LogLevel::Debug => 0,
                LogLevel::Info => 1,
            }
        }

        rank(*self).cmp(&rank(*other))
    }
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            _ => None,
        }
    }
}

/// Emits one JSON object per event, filtered by level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Logger {
    level: LogLevel,
}

impl Logger {
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.level
    }

    pub fn debug(&self, event: &str, fields: serde_json::Value) {
        self.log(LogLevel::Debug, event, fields);
    }

    pub fn info(&self, event: &str, fields: serde_json::Value) {
        self.log(LogLevel::Info, event, fields);
    }

    pub fn log(&self, level: LogLevel, event: &str, fields: serde_json::Value) {
        if !self.enabled(level) {
            return;
        }
        emit(&format_event(now_unix_seconds(), level, event, fields));
    }
}

pub fn format_event(ts: u64, level: LogLevel, event: &str, fields: serde_json::Value) -> String {
    let mut payload = serde_json::Map::new();
    payload.insert(
        "ts".to_string(),
        serde_json::Value::Number(serde_json::Number::from(ts)),
    );
    payload.insert("level".to_string(), serde_json::Value::String(level.as_str().to_string()));
    payload.insert("event".to_string(), serde_json::Value::String(event.to_string()));

    if let serde_json::Value::Object(extra) = fields {
        for (key, value) in extra {
            payload.insert(key, value);
        }
    }

    serde_json::Value::Object(payload).to_string()
}

#[cfg(target_arch = "wasm32")]
fn emit(line: &str) {
    web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(line));
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(line: &str) {
    println!("{line}");
}

#[cfg(target_arch = "wasm32")]
fn now_unix_seconds() -> u64 {
    (js_sys::Date::now() / 1_000.0) as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn now_unix_seconds() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_line_carries_header_and_fields() {
        let line = format_event(
            1_700_000_000,
            LogLevel::Info,
            "section_active",
            json!({ "section": "skills" }),
        );
        let parsed: serde_json::Value = serde_json::from_str(&line).expect("valid JSON line");

        assert_eq!(parsed["ts"], 1_700_000_000);
        assert_eq!(parsed["level"], "info");
        assert_eq!(parsed["event"], "section_active");
        assert_eq!(parsed["section"], "skills");
    }

    #[test]
    fn non_object_fields_are_dropped() {
        let line = format_event(1, LogLevel::Debug, "tick", json!(42));
        let parsed: serde_json::Value = serde_json::from_str(&line).expect("valid JSON line");

        assert_eq!(parsed.as_object().map(|object| object.len()), Some(3));
    }

    #[test]
    fn debug_events_are_filtered_at_info_level() {
        let logger = Logger::new(LogLevel::Info);

        assert!(!logger.enabled(LogLevel::Debug));
        assert!(logger.enabled(LogLevel::Info));
        assert!(Logger::new(LogLevel::Debug).enabled(LogLevel::Debug));
    }

    #[test]
    fn parses_levels_case_insensitively() {
        assert_eq!(LogLevel::parse(" DEBUG "), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("trace"), None);
    }
}

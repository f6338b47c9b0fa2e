use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// JSON-lines trace of layout decisions. One object per line; a
/// `debug.summary` line with accumulated counters closes each report.
#[derive(Clone)]
pub(crate) struct DebugLogger {
    inner: Arc<Mutex<DebugState>>,
}

struct DebugState {
    writer: BufWriter<File>,
    counters: BTreeMap<String, u64>,
}

impl DebugLogger {
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(DebugState {
                writer: BufWriter::new(file),
                counters: BTreeMap::new(),
            })),
        })
    }

    /// Writes `{"type": kind, ...fields}`.
    pub fn log_event(&self, kind: &str, fields: Value) {
        let mut event = Map::new();
        event.insert("type".to_string(), Value::String(kind.to_string()));
        if let Value::Object(extra) = fields {
            event.extend(extra);
        }
        if let Ok(mut state) = self.inner.lock() {
            let _ = writeln!(state.writer, "{}", Value::Object(event));
        }
    }

    pub fn increment(&self, key: &str, amount: u64) {
        if let Ok(mut state) = self.inner.lock() {
            let entry = state.counters.entry(key.to_string()).or_insert(0);
            *entry = entry.saturating_add(amount);
        }
    }

    pub fn emit_summary(&self, context: &str) {
        if let Ok(mut state) = self.inner.lock() {
            let counts = std::mem::take(&mut state.counters);
            let line = json!({
                "type": "debug.summary",
                "context": context,
                "counts": counts,
            });
            let _ = writeln!(state.writer, "{line}");
        }
    }

    pub fn flush(&self) {
        if let Ok(mut state) = self.inner.lock() {
            let _ = state.writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_events_and_sorted_summary() {
        let path = std::env::temp_dir().join(format!(
            "riskreport-debug-{}-{:?}.jsonl",
            std::process::id(),
            std::thread::current().id()
        ));
        let logger = DebugLogger::new(&path).expect("create trace");
        logger.log_event("report.page_break", json!({"from_page": 1, "to_page": 2}));
        logger.increment("report.page_break", 1);
        logger.increment("report.capture.failed", 2);
        logger.emit_summary("report");
        logger.flush();

        let text = std::fs::read_to_string(&path).expect("read trace");
        let _ = std::fs::remove_file(&path);
        let lines: Vec<Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "report.page_break");
        assert_eq!(lines[0]["to_page"], 2);
        assert_eq!(lines[1]["counts"]["report.capture.failed"], 2);
        let keys: Vec<&String> = lines[1]["counts"]
            .as_object()
            .expect("counts")
            .keys()
            .collect();
        assert_eq!(keys, vec!["report.capture.failed", "report.page_break"]);
    }
}

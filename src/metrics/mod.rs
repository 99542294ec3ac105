/// meter registry: counters, gauges and timers registered by name.
///
/// Every meter is stamped with the configured common labels, e.g. region.
/// Deny filters keep matching meter names out of the exported set: a denied
/// meter is still live for the caller, it just never reaches the registry, so
/// the time-series database never sees it.  Names are sanitized to the
/// exposition charset, so `transform-photo-task` exports as
/// `transform_photo_task`.
///
use std::collections::HashMap as StdHashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;
use hashbrown::HashMap;
use log::*;
use prometheus::{
    exponential_buckets, Counter, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry,
    TextEncoder,
};

use crate::errors::CacheError;

#[derive(Debug, Clone, Default)]
pub struct MetersConfig {
    pub common_labels: StdHashMap<String, String>,
    pub deny_prefixes: Vec<String>,
}

impl MetersConfig {
    pub fn new() -> MetersConfig {
        MetersConfig::default()
    }

    /// stamp this label on every meter, e.g. region=us-west
    pub fn with_common_label(mut self, name: &str, value: &str) -> Self {
        self.common_labels
            .insert(name.to_string(), value.to_string());
        self
    }

    /// meters whose name starts with the prefix are never exported
    pub fn with_deny_prefix(mut self, prefix: &str) -> Self {
        self.deny_prefixes.push(prefix.to_string());
        self
    }
}

pub struct Meters {
    registry: Registry,
    config: MetersConfig,
    counters: Mutex<HashMap<String, Counter>>,
    gauges: Mutex<HashMap<String, Gauge>>,
    timers: Mutex<HashMap<String, Histogram>>,
}

impl Meters {
    pub fn new(config: MetersConfig) -> Meters {
        Meters {
            registry: Registry::new(),
            config,
            counters: Mutex::new(HashMap::new()),
            gauges: Mutex::new(HashMap::new()),
            timers: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_defaults() -> Meters {
        Meters::new(MetersConfig::new())
    }

    // exposition names are [a-zA-Z0-9_:]; anything else maps to underscore
    fn sanitize(name: &str) -> String {
        let mut clean: String = name
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || ch == '_' || ch == ':' {
                    ch
                } else {
                    '_'
                }
            })
            .collect();

        if clean.chars().next().map(|ch| ch.is_ascii_digit()) == Some(true) {
            clean.insert(0, '_');
        }

        clean
    }

    fn denied(&self, name: &str) -> bool {
        self.config
            .deny_prefixes
            .iter()
            .any(|prefix| name.starts_with(prefix.as_str()))
    }

    /// return the counter for name, creating and registering it on first use
    pub fn counter(&self, name: &str) -> Result<Counter> {
        let name = Meters::sanitize(name);
        let mut meters = self.counters.lock().map_err(|_| CacheError::LockPoisoned)?;

        if let Some(counter) = meters.get(&name) {
            return Ok(counter.clone());
        }

        let opts = Opts::new(name.clone(), format!("{} counter", name))
            .const_labels(self.config.common_labels.clone());
        let counter = Counter::with_opts(opts)?;

        if self.denied(&name) {
            debug!("counter {} denied, not exported", name);
        } else {
            self.registry.register(Box::new(counter.clone()))?;
        }

        meters.insert(name, counter.clone());

        Ok(counter)
    }

    /// return the gauge for name, creating and registering it on first use
    pub fn gauge(&self, name: &str) -> Result<Gauge> {
        let name = Meters::sanitize(name);
        let mut meters = self.gauges.lock().map_err(|_| CacheError::LockPoisoned)?;

        if let Some(gauge) = meters.get(&name) {
            return Ok(gauge.clone());
        }

        let opts = Opts::new(name.clone(), format!("{} gauge", name))
            .const_labels(self.config.common_labels.clone());
        let gauge = Gauge::with_opts(opts)?;

        if self.denied(&name) {
            debug!("gauge {} denied, not exported", name);
        } else {
            self.registry.register(Box::new(gauge.clone()))?;
        }

        meters.insert(name, gauge.clone());

        Ok(gauge)
    }

    /// return the timer histogram for name, creating it on first use
    pub fn timer(&self, name: &str) -> Result<Histogram> {
        let name = Meters::sanitize(name);
        let mut meters = self.timers.lock().map_err(|_| CacheError::LockPoisoned)?;

        if let Some(timer) = meters.get(&name) {
            return Ok(timer.clone());
        }

        // 1ms to ~16s
        let opts = HistogramOpts::new(name.clone(), format!("{} seconds", name))
            .const_labels(self.config.common_labels.clone())
            .buckets(exponential_buckets(0.001, 2.0, 15)?);
        let timer = Histogram::with_opts(opts)?;

        if self.denied(&name) {
            debug!("timer {} denied, not exported", name);
        } else {
            self.registry.register(Box::new(timer.clone()))?;
        }

        meters.insert(name, timer.clone());

        Ok(timer)
    }

    /// record a known duration against the named timer
    pub fn record(&self, name: &str, duration: Duration) -> Result<()> {
        self.timer(name)?.observe(duration.as_secs_f64());

        Ok(())
    }

    /// time the closure against the named timer and return its result
    pub fn time<F, R>(&self, name: &str, f: F) -> Result<R>
    where
        F: FnOnce() -> R,
    {
        let timer = self.timer(name)?;
        let start = Instant::now();
        let result = f();
        timer.observe(start.elapsed().as_secs_f64());

        Ok(result)
    }

    /// render the registered meters in prometheus text format
    pub fn export(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = vec![];
        encoder.encode(&self.registry.gather(), &mut buffer)?;

        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_names() {
        assert_eq!(Meters::sanitize("orders-placed"), "orders_placed");
        assert_eq!(
            Meters::sanitize("transform-photo-task"),
            "transform_photo_task"
        );
        assert_eq!(Meters::sanitize("jvm.memory.used"), "jvm_memory_used");
        assert_eq!(Meters::sanitize("9lives"), "_9lives");
        assert_eq!(Meters::sanitize("plain_name"), "plain_name");
    }

    #[test]
    fn counter_with_common_labels() {
        let meters = Meters::new(MetersConfig::new().with_common_label("region", "us-west"));

        let counter = meters.counter("orders-placed").unwrap();
        counter.inc();
        counter.inc();

        // same name returns the same meter
        let again = meters.counter("orders-placed").unwrap();
        again.inc();
        assert_eq!(counter.get(), 3.0);

        let text = meters.export().unwrap();
        println!("{}", text);
        assert!(text.contains("orders_placed"));
        assert!(text.contains(r#"region="us-west""#));
    }

    #[test]
    fn deny_prefix_blocks_export() {
        let meters = Meters::new(MetersConfig::new().with_deny_prefix("jvm"));

        let denied = meters.gauge("jvm.memory.used").unwrap();
        denied.set(55.0);
        assert_eq!(denied.get(), 55.0);

        let allowed = meters.gauge("speed").unwrap();
        allowed.set(55.0);

        let text = meters.export().unwrap();
        assert!(!text.contains("jvm_memory_used"));
        assert!(text.contains("speed"));
    }

    #[test]
    fn timer_records() {
        let meters = Meters::with_defaults();

        meters
            .record("transform-photo-task", Duration::from_millis(12))
            .unwrap();

        let greeting = meters.time("transform-photo-task", || "hello, world").unwrap();
        assert_eq!(greeting, "hello, world");

        let timer = meters.timer("transform-photo-task").unwrap();
        assert_eq!(timer.get_sample_count(), 2);

        let text = meters.export().unwrap();
        assert!(text.contains("transform_photo_task"));
    }
}

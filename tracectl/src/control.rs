// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Runtime control of log levels.

use ordermap::OrderMap;
use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, OnceLock};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, Registry, filter::LevelFilter, prelude::*, reload};

use crate::targets::LOG_TARGETS;
use crate::trace_target;

trace_target!("tracectl", LevelFilter::INFO, &[]);

#[derive(Debug, Error, PartialEq)]
pub enum LogCtlError {
    #[error("Invalid syntax '{0}': expected tag=level")]
    Syntax(String),
    #[error("Invalid level '{0}'")]
    Level(String),
    #[error("Unknown tag '{0}'")]
    UnknownTag(String),
}

#[derive(Debug, Clone)]
pub struct TargetCfg {
    pub target: &'static str,
    pub name: &'static str,
    pub level: LevelFilter,
    pub tags: Vec<&'static str>,
}

#[derive(Debug)]
struct TargetDb {
    default: LevelFilter,
    targets: OrderMap<&'static str, TargetCfg>,
}

impl TargetDb {
    fn new(default: LevelFilter) -> Self {
        let mut db = Self {
            default,
            targets: OrderMap::new(),
        };
        for t in LOG_TARGETS {
            db.register(t.target, t.name, t.level, t.tags);
        }
        db
    }
    fn register(
        &mut self,
        target: &'static str,
        name: &'static str,
        level: LevelFilter,
        tags: &'static [&'static str],
    ) {
        // the name is always a tag of its own
        let mut tags = tags.to_vec();
        if !tags.contains(&name) {
            tags.push(name);
        }
        let cfg = TargetCfg {
            target,
            name,
            level,
            tags,
        };
        if self.targets.insert(target, cfg).is_some() {
            warn!("Logging target {target} declared more than once");
        }
    }
    fn tags(&self) -> BTreeSet<&'static str> {
        self.targets
            .values()
            .flat_map(|t| t.tags.iter().copied())
            .collect()
    }
    fn env_filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::new(self.default.to_string());
        for t in self.targets.values() {
            if let Ok(directive) = format!("{}={}", t.target, t.level).parse() {
                filter = filter.add_directive(directive);
            }
        }
        filter
    }
    fn as_config_string(&self) -> String {
        let mut out = format!("default={}", self.default);
        for t in self.targets.values() {
            out += &format!(",{}={}", t.name, t.level);
        }
        out
    }
}

/// Owner of the log-level configuration of all registered targets
#[derive(Debug)]
pub struct LogControl {
    db: Mutex<TargetDb>,
    reload: Option<reload::Handle<EnvFilter, Registry>>,
}

static LOG_CTL: OnceLock<LogControl> = OnceLock::new();

/// Get the process-wide [`LogControl`], installing the subscriber on first use.
pub fn get_log_ctl() -> &'static LogControl {
    LOG_CTL.get_or_init(LogControl::new)
}

impl LogControl {
    fn new() -> Self {
        let db = TargetDb::new(LevelFilter::WARN);
        let (filter, handle) = reload::Layer::new(db.env_filter());
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .with_thread_names(true)
            .with_level(true);

        // another subscriber may already be installed (e.g. by a test harness)
        let reload = match tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
        {
            Ok(()) => Some(handle),
            Err(_) => None,
        };
        Self {
            db: Mutex::new(db),
            reload,
        }
    }
    fn lock(&self) -> MutexGuard<'_, TargetDb> {
        self.db.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
    fn apply(&self, db: &TargetDb) {
        if let Some(handle) = &self.reload
            && let Err(e) = handle.reload(db.env_filter())
        {
            warn!("Failed to reload log filter: {e}");
        }
    }
    pub fn init() {
        get_log_ctl();
    }
    #[must_use]
    pub fn default_level(&self) -> LevelFilter {
        self.lock().default
    }
    pub fn set_default_level(&self, level: LevelFilter) {
        let mut db = self.lock();
        if db.default != level {
            db.default = level;
            self.apply(&db);
        }
    }
    /// Set the level of all the targets carrying a tag
    ///
    /// # Errors
    /// Fails if no target carries the tag.
    pub fn set_tag_level(&self, tag: &str, level: LevelFilter) -> Result<usize, LogCtlError> {
        let mut db = self.lock();
        if !db.tags().contains(tag) {
            return Err(LogCtlError::UnknownTag(tag.to_string()));
        }
        let mut changed = 0;
        for t in db.targets.values_mut().filter(|t| t.tags.contains(&tag)) {
            if t.level != level {
                t.level = level;
                changed += 1;
            }
        }
        if changed > 0 {
            self.apply(&db);
        }
        info!("Log level for tag '{tag}' set to {level} ({changed} targets changed)");
        Ok(changed)
    }
    pub fn set_level_all(&self, level: LevelFilter) {
        let mut db = self.lock();
        for t in db.targets.values_mut() {
            t.level = level;
        }
        self.apply(&db);
    }

    fn parse_config(input: &str) -> Result<OrderMap<String, LevelFilter>, LogCtlError> {
        let mut out = OrderMap::new();
        for item in input.split(',').map(str::trim).filter(|i| !i.is_empty()) {
            let (tag, level) = item
                .split_once('=')
                .ok_or_else(|| LogCtlError::Syntax(item.to_string()))?;
            let level = LevelFilter::from_str(level.trim())
                .map_err(|_| LogCtlError::Level(level.trim().to_string()))?;
            out.insert(tag.trim().to_string(), level);
        }
        Ok(out)
    }

    /// Configure levels from a string like `default=warn,all=info,lowering=debug`.
    ///
    /// # Errors
    /// Fails on bad syntax, bad levels, or tags that no target carries.
    pub fn setup_from_string(&self, input: &str) -> Result<(), LogCtlError> {
        let config = Self::parse_config(input)?;
        if let Some(level) = config.get("default") {
            self.set_default_level(*level);
        }
        if let Some(level) = config.get("all") {
            self.set_level_all(*level);
        }
        for (tag, level) in config
            .iter()
            .filter(|(tag, _)| *tag != "default" && *tag != "all")
        {
            self.set_tag_level(tag, *level)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn target(&self, target: &str) -> Option<TargetCfg> {
        self.lock().targets.get(target).cloned()
    }
    #[must_use]
    pub fn targets(&self) -> Vec<TargetCfg> {
        self.lock().targets.values().cloned().collect()
    }
    #[must_use]
    pub fn as_config_string(&self) -> String {
        self.lock().as_config_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{LogControl, LogCtlError, get_log_ctl};
    use crate::LevelFilter;

    #[test]
    fn parse_config() {
        let parsed = LogControl::parse_config("default=error, tracectl = debug").unwrap();
        assert_eq!(parsed.get("default"), Some(&LevelFilter::ERROR));
        assert_eq!(parsed.get("tracectl"), Some(&LevelFilter::DEBUG));

        assert_eq!(
            LogControl::parse_config("tracectl").unwrap_err(),
            LogCtlError::Syntax("tracectl".to_string())
        );
        assert_eq!(
            LogControl::parse_config("tracectl=loud").unwrap_err(),
            LogCtlError::Level("loud".to_string())
        );
    }

    #[test]
    fn own_target_is_registered() {
        let ctl = get_log_ctl();
        let me = ctl
            .targets()
            .into_iter()
            .find(|t| t.name == "tracectl")
            .unwrap();
        assert!(me.tags.contains(&"tracectl"));
    }

    #[test]
    fn tag_levels() {
        let ctl = get_log_ctl();
        ctl.setup_from_string("tracectl=trace").unwrap();
        let me = ctl
            .targets()
            .into_iter()
            .find(|t| t.name == "tracectl")
            .unwrap();
        assert_eq!(me.level, LevelFilter::TRACE);
        assert!(ctl.as_config_string().contains("tracectl=trace"));

        assert_eq!(
            ctl.set_tag_level("no-such-tag", LevelFilter::OFF),
            Err(LogCtlError::UnknownTag("no-such-tag".to_string()))
        );
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Tracing runtime control.

use ordermap::OrderMap;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use thiserror::Error;
#[allow(unused)]
use tracing::{debug, error, info, warn};
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::{EnvFilter, Registry, prelude::*, reload};

use crate::display::TargetCfgDbByTag;
use crate::targets::TRACING_TARGETS;
use crate::trace_target;

trace_target!("tracectl", LevelFilter::INFO, &[]);

#[derive(Debug, Error, PartialEq)]
pub enum TraceCtlError {
    #[error("Invalid syntax '{0}': expected tag=level")]
    BadSyntax(String),
    #[error("Invalid log level '{0}'")]
    BadLevel(String),
}

/// Runtime configuration of a single target
#[derive(Debug, Clone)]
pub struct TargetCfg {
    pub target: &'static str,
    pub name: &'static str,
    pub level: LevelFilter,
    pub tags: Vec<&'static str>,
    pub custom: bool,
}
impl TargetCfg {
    fn new(
        target: &'static str,
        name: &'static str,
        level: LevelFilter,
        tags: &'static [&'static str],
        custom: bool,
    ) -> Self {
        // a target can always be addressed by its name
        let mut tags = tags.to_vec();
        if !tags.contains(&name) {
            tags.push(name);
        }
        Self {
            target,
            name,
            level,
            tags,
            custom,
        }
    }
}

#[derive(Debug)]
pub(crate) struct TargetCfgDb {
    pub(crate) level: LevelFilter,
    pub(crate) targets: OrderMap<&'static str, TargetCfg>,
    pub(crate) tags: OrderMap<&'static str, HashSet<&'static str>>,
}

impl TargetCfgDb {
    fn new(level: LevelFilter) -> Self {
        let mut db = Self {
            level,
            targets: OrderMap::new(),
            tags: OrderMap::new(),
        };
        for t in TRACING_TARGETS {
            db.register(TargetCfg::new(t.target, t.name, t.level, t.tags, t.custom));
        }
        db
    }
    fn register(&mut self, tcfg: TargetCfg) {
        let target = tcfg.target;
        for tag in &tcfg.tags {
            self.tags.entry(*tag).or_default().insert(target);
        }
        if self.targets.insert(target, tcfg).is_some() {
            warn!("Tracing target {target} is declared more than once");
        }
    }
    fn env_filter(&self) -> EnvFilter {
        self.targets
            .values()
            .filter_map(|t| format!("{}={}", t.target, t.level).parse::<Directive>().ok())
            .fold(EnvFilter::new(self.level.to_string()), |f, directive| {
                f.add_directive(directive)
            })
    }
    pub(crate) fn tagged(&self, tag: &str) -> impl Iterator<Item = &TargetCfg> {
        let members = self.tags.get(tag);
        self.targets
            .values()
            .filter(move |t| members.is_some_and(|m| m.contains(t.target)))
    }
    fn set_tag_level(&mut self, tag: &str, level: LevelFilter) -> usize {
        let Some(members) = self.tags.get(tag) else {
            return 0;
        };
        let mut changed = 0;
        for t in self.targets.values_mut() {
            if members.contains(t.target) && t.level != level {
                t.level = level;
                changed += 1;
            }
        }
        changed
    }
    /// A string that, fed to [`TracingControl::setup_from_string`], would reproduce
    /// the current levels.
    fn as_config_string(&self) -> String {
        self.targets
            .values()
            .fold(format!("default={}", self.level), |acc, t| {
                format!("{acc},{}={}", t.name, t.level)
            })
    }
}

/// Object to change log levels of targets and tags at runtime
#[derive(Debug)]
pub struct TracingControl {
    db: Mutex<TargetCfgDb>,
    reload_filter: Option<reload::Handle<EnvFilter, Registry>>,
}

impl TracingControl {
    fn new() -> Self {
        let db = TargetCfgDb::new(LevelFilter::INFO);
        let (filter, handle) = reload::Layer::new(db.env_filter());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_line_number(true)
            .with_target(true)
            .with_level(true);

        // a subscriber may already be installed (e.g. by a test harness)
        let reload_filter = tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .ok()
            .map(|()| handle);

        Self {
            db: Mutex::new(db),
            reload_filter,
        }
    }
    fn lock(&self) -> MutexGuard<'_, TargetCfgDb> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }
    fn reload(&self, db: &TargetCfgDb) {
        if let Some(handle) = &self.reload_filter
            && let Err(e) = handle.reload(db.env_filter())
        {
            error!("Failed to reload tracing filter: {e}");
        }
    }

    /// Parse a comma-separated list of tag=level items
    fn parse_tracing_config(input: &str) -> Result<OrderMap<String, LevelFilter>, TraceCtlError> {
        let mut result = OrderMap::new();
        for item in input.split(',').map(str::trim) {
            let (tag, level) = item
                .split_once('=')
                .ok_or_else(|| TraceCtlError::BadSyntax(item.to_string()))?;
            let level = LevelFilter::from_str(level.trim())
                .map_err(|_| TraceCtlError::BadLevel(level.trim().to_string()))?;
            result.insert(tag.trim().to_string(), level);
        }
        Ok(result)
    }
}

static TRACING_CTL: OnceLock<TracingControl> = OnceLock::new();

/// Get the process-wide [`TracingControl`], installing the subscriber on first use
pub fn get_trace_ctl() -> &'static TracingControl {
    TRACING_CTL.get_or_init(TracingControl::new)
}

impl TracingControl {
    pub fn init() {
        get_trace_ctl();
    }
    pub fn set_tag_level(&self, tag: &str, level: LevelFilter) {
        let mut db = self.lock();
        let changed = db.set_tag_level(tag, level);
        if changed > 0 {
            self.reload(&db);
        }
        debug!("Log level for tag '{tag}' set to {level} ({changed} targets changed)");
    }
    pub fn set_level_all(&self, level: LevelFilter) {
        let mut db = self.lock();
        db.targets.values_mut().for_each(|t| t.level = level);
        self.reload(&db);
    }
    pub fn set_default_level(&self, level: LevelFilter) {
        let mut db = self.lock();
        if db.level != level {
            db.level = level;
            self.reload(&db);
        }
    }
    #[must_use]
    pub fn get_default_level(&self) -> LevelFilter {
        self.lock().level
    }

    /// Configure levels from a string like `default=warn,all=info,frr=debug`.
    /// `default` sets the level of undeclared targets, `all` the level of every
    /// declared target; any other key is a tag, applied after `all`.
    pub fn setup_from_string(&self, input: &str) -> Result<(), TraceCtlError> {
        let config = Self::parse_tracing_config(input)?;
        if let Some(level) = config.get("default") {
            self.set_default_level(*level);
        }
        if let Some(level) = config.get("all") {
            self.set_level_all(*level);
        }
        config
            .iter()
            .filter(|(tag, _)| !matches!(tag.as_str(), "default" | "all"))
            .for_each(|(tag, level)| self.set_tag_level(tag, *level));
        Ok(())
    }

    #[must_use]
    pub fn get_target(&self, target: &str) -> Option<TargetCfg> {
        self.lock().targets.get(target).cloned()
    }
    #[must_use]
    pub fn get_targets_by_tag(&self, tag: &str) -> Vec<TargetCfg> {
        self.lock().tagged(tag).cloned().collect()
    }
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.lock().tags.contains_key(tag)
    }
    #[must_use]
    pub fn as_config_string(&self) -> String {
        self.lock().as_config_string()
    }
    /// Print the targets, grouped by tag
    pub fn dump_targets_by_tag(&self) {
        let db = self.lock();
        println!("{}", TargetCfgDbByTag(&db));
    }
    /// Print the targets and their levels
    pub fn dump(&self) {
        let db = self.lock();
        println!("{db}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custom_target;
    use serial_test::serial;

    const TAG: &str = "shared-tag";
    custom_target!("tgt-one", LevelFilter::DEBUG, &[TAG]);
    custom_target!("tgt-two", LevelFilter::ERROR, &[TAG]);
    custom_target!("tgt-lonely", LevelFilter::WARN, &[]);

    #[test]
    #[serial]
    fn test_static_registration() {
        let tctl = get_trace_ctl();
        assert!(tctl.get_target(module_path!()).is_some());
        assert!(tctl.get_target("tgt-one").is_some());
        assert!(tctl.get_target("tgt-lonely").is_some());
        assert!(tctl.has_tag(TAG));
        // targets are tagged with their own name
        assert!(tctl.has_tag("tgt-lonely"));
    }

    #[test]
    #[serial]
    fn test_change_tag_level() {
        let tctl = get_trace_ctl();
        tctl.set_tag_level(TAG, LevelFilter::OFF);
        let targets = tctl.get_targets_by_tag(TAG);
        assert_eq!(targets.len(), 2);
        assert!(targets.iter().all(|t| t.level == LevelFilter::OFF));
        assert_ne!(
            tctl.get_target("tgt-lonely").map(|t| t.level),
            Some(LevelFilter::OFF)
        );
    }

    #[test]
    #[serial]
    fn test_setup_from_string() {
        let tctl = get_trace_ctl();
        tctl.setup_from_string("default=error, all=info, tgt-two=trace")
            .unwrap();
        assert_eq!(tctl.get_default_level(), LevelFilter::ERROR);
        assert_eq!(
            tctl.get_target("tgt-one").map(|t| t.level),
            Some(LevelFilter::INFO)
        );
        assert_eq!(
            tctl.get_target("tgt-two").map(|t| t.level),
            Some(LevelFilter::TRACE)
        );
        assert!(tctl.as_config_string().starts_with("default=error"));
        assert!(tctl.as_config_string().contains("tgt-two=trace"));
    }

    #[test]
    #[serial]
    fn test_setup_from_bad_string() {
        let tctl = get_trace_ctl();
        assert_eq!(
            tctl.setup_from_string("tgt-one=loud"),
            Err(TraceCtlError::BadLevel("loud".to_string()))
        );
        assert_eq!(
            tctl.setup_from_string("tgt-one=info,tgt-two"),
            Err(TraceCtlError::BadSyntax("tgt-two".to_string()))
        );
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Link-time registry of logging targets declared by the crates of the workspace

use crate::LevelFilter;
use linkme::distributed_slice;

/// A logging target, as declared with [`trace_target!`](crate::trace_target)
pub struct LogTarget {
    pub(crate) target: &'static str,
    pub(crate) name: &'static str,
    pub(crate) level: LevelFilter,
    pub(crate) tags: &'static [&'static str],
}
impl LogTarget {
    #[must_use]
    pub const fn new(
        target: &'static str,
        name: &'static str,
        level: LevelFilter,
        tags: &'static [&'static str],
    ) -> Self {
        Self {
            target,
            name,
            level,
            tags,
        }
    }
}

#[distributed_slice]
pub static LOG_TARGETS: [LogTarget];

#[macro_export]
/// Declare the logging target of the calling module: its name, default level and tags.
/// The target string is the module path, which is what `tracing` uses by default.
macro_rules! trace_target {
    // The const scope lets the macro be invoked several times in a crate without
    // clashing statics and without callers importing the registry.
    ($name:expr, $level:expr, $tags:expr) => {
        const _: () = {
            use linkme::distributed_slice;
            use $crate::LevelFilter;
            use $crate::targets::{LOG_TARGETS, LogTarget};

            #[distributed_slice(LOG_TARGETS)]
            static LOG_TGT: LogTarget = LogTarget::new(module_path!(), $name, $level, $tags);
        };
    };
}

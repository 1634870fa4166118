// Copyright 2025 Palisade Contributors
// SPDX-License-Identifier: Apache-2.0

//! Rate-limit rules.
//!
//! A rule is plain data handed to the guard per protected operation - the
//! explicit replacement for annotation-driven interception. Rules are
//! deserializable so deployments can keep them in configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Unit of the fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowUnit {
    /// Seconds.
    Seconds,
    /// Minutes.
    Minutes,
    /// Hours.
    Hours,
    /// Days.
    Days,
}

impl WindowUnit {
    /// `window` units as a [`Duration`].
    pub fn to_duration(self, window: u64) -> Duration {
        let secs = match self {
            WindowUnit::Seconds => window,
            WindowUnit::Minutes => window * 60,
            WindowUnit::Hours => window * 3600,
            WindowUnit::Days => window * 86_400,
        };
        Duration::from_secs(secs)
    }

    /// Singular label used in user-facing wait hints.
    pub fn label(self) -> &'static str {
        match self {
            WindowUnit::Seconds => "second",
            WindowUnit::Minutes => "minute",
            WindowUnit::Hours => "hour",
            WindowUnit::Days => "day",
        }
    }
}

/// One rate-limit policy: N permits per fixed window, replenished entirely
/// at window rollover ("overall" semantics, not a smoothed bucket).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateRule {
    /// Key expression resolved against the call's arguments (`#p0`, a
    /// literal, ...).
    pub key_expr: String,
    /// Permits per window.
    pub permits: u32,
    /// Window length, in `unit`s.
    pub window: u64,
    /// Window unit.
    pub unit: WindowUnit,
    /// Append `#<ip>` to the key.
    #[serde(default)]
    pub restrict_ip: bool,
    /// Append `#<user-id>` to the key.
    #[serde(default)]
    pub restrict_user: bool,
}

impl RateRule {
    /// Rule without IP or user restriction.
    pub fn new(key_expr: impl Into<String>, permits: u32, window: u64, unit: WindowUnit) -> Self {
        Self {
            key_expr: key_expr.into(),
            permits,
            window,
            unit,
            restrict_ip: false,
            restrict_user: false,
        }
    }

    /// Restrict by caller IP.
    pub fn restrict_ip(mut self) -> Self {
        self.restrict_ip = true;
        self
    }

    /// Restrict by caller identity.
    pub fn restrict_user(mut self) -> Self {
        self.restrict_user = true;
        self
    }

    /// The 429-class message shown to a rejected caller.
    pub fn wait_hint(&self) -> String {
        format!(
            "please wait for {} {}(s) and try again",
            self.window,
            self.unit.label()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_unit_durations() {
        assert_eq!(WindowUnit::Seconds.to_duration(5), Duration::from_secs(5));
        assert_eq!(WindowUnit::Minutes.to_duration(2), Duration::from_secs(120));
        assert_eq!(WindowUnit::Hours.to_duration(1), Duration::from_secs(3600));
        assert_eq!(WindowUnit::Days.to_duration(1), Duration::from_secs(86_400));
    }

    #[test]
    fn test_wait_hint_interpolates_window_and_unit() {
        let rule = RateRule::new("#p0", 1, 1, WindowUnit::Seconds);
        assert_eq!(rule.wait_hint(), "please wait for 1 second(s) and try again");

        let rule = RateRule::new("#p0", 10, 5, WindowUnit::Minutes);
        assert_eq!(rule.wait_hint(), "please wait for 5 minute(s) and try again");
    }

    #[test]
    fn test_rule_restrictions_default_off() {
        let rule = RateRule::new("k", 1, 1, WindowUnit::Seconds);
        assert!(!rule.restrict_ip);
        assert!(!rule.restrict_user);

        let rule = rule.restrict_ip().restrict_user();
        assert!(rule.restrict_ip);
        assert!(rule.restrict_user);
    }

    #[test]
    fn test_rule_deserializes_from_config_shape() {
        let rule: RateRule = serde_json::from_str(
            r##"{"key_expr": "#p0", "permits": 3, "window": 1, "unit": "seconds", "restrict_ip": true}"##,
        )
        .unwrap();
        assert_eq!(rule.permits, 3);
        assert_eq!(rule.unit, WindowUnit::Seconds);
        assert!(rule.restrict_ip);
        assert!(!rule.restrict_user);
    }
}

// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Configuration for statistics windows
//!
//! Controls the two rolling windows used by the statistics reports and the
//! page-key namespace treated as "articles".

use crate::error::{PagestatsError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default short rolling window ("last 30 days")
pub const DEFAULT_SHORT_WINDOW_DAYS: u32 = 30;

/// Default long rolling window ("last year")
pub const DEFAULT_LONG_WINDOW_DAYS: u32 = 365;

/// Default article page-key namespace
pub const DEFAULT_ARTICLE_PATTERN: &str = "^kta-article-";

/// Statistics window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsConfig {
    /// Regex selecting article page keys
    #[serde(default = "default_article_pattern")]
    pub article_pattern: String,

    /// Days covered by the short window (current day included)
    #[serde(default = "default_short_window_days")]
    pub short_window_days: u32,

    /// Days covered by the long window (current day included)
    #[serde(default = "default_long_window_days")]
    pub long_window_days: u32,
}

fn default_article_pattern() -> String {
    DEFAULT_ARTICLE_PATTERN.to_string()
}

fn default_short_window_days() -> u32 {
    DEFAULT_SHORT_WINDOW_DAYS
}

fn default_long_window_days() -> u32 {
    DEFAULT_LONG_WINDOW_DAYS
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            article_pattern: default_article_pattern(),
            short_window_days: DEFAULT_SHORT_WINDOW_DAYS,
            long_window_days: DEFAULT_LONG_WINDOW_DAYS,
        }
    }
}

impl StatisticsConfig {
    /// Compile the article pattern
    pub fn article_regex(&self) -> Result<Regex> {
        Ok(Regex::new(&self.article_pattern)?)
    }

    /// Validate window ordering and the article pattern
    pub fn validate(&self) -> Result<()> {
        self.article_regex()?;
        if self.short_window_days == 0 {
            return Err(PagestatsError::InvalidConfig(
                "short_window_days must be greater than 0".to_string(),
            ));
        }
        if self.short_window_days >= self.long_window_days {
            return Err(PagestatsError::InvalidConfig(format!(
                "short_window_days ({}) must be smaller than long_window_days ({})",
                self.short_window_days, self.long_window_days
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StatisticsConfig::default();
        assert_eq!(config.short_window_days, 30);
        assert_eq!(config.long_window_days, 365);
        assert!(config.validate().is_ok());
        assert!(config.article_regex().unwrap().is_match("kta-article-key"));
    }

    #[test]
    fn test_rejects_inverted_windows() {
        let config = StatisticsConfig {
            short_window_days: 400,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_pattern() {
        let config = StatisticsConfig {
            article_pattern: "[".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PagestatsError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: StatisticsConfig = serde_json::from_str(r#"{"short_window_days": 7}"#).unwrap();
        assert_eq!(config.short_window_days, 7);
        assert_eq!(config.long_window_days, 365);
        assert_eq!(config.article_pattern, DEFAULT_ARTICLE_PATTERN);
    }
}

/*
 * Copyright (c) 2025 Clément GRENNERAT
 *
 * This program is free software: you can redistribute it and/or modify it under the terms of the
 * GNU General Public License as published by the Free Software Foundation, version 3.
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
 * even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
 * See the GNU General Public License for more details.
 * You should have received a copy of the GNU General Public License along with this program.
 * If not, see https://www.gnu.org/licenses/.
 *
 */

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "/etc/rota/rota.conf";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Configuration {
    // --- Rest and fairness weights ---
    /// Minimum separation between two extended-rest duties of one person,
    /// measured from the end of the earlier to the start of the later.
    pub rest_buffer_hours: i64,
    pub weekend_penalty_weight: i64,
    pub repeat_penalty_weight: i64,
    // --- Solver budget ---
    pub solver_wall_seconds: u32,
    pub solver_workers: u32,
    // --- Cap rotation hours ---
    // The cap rotation overrides the stored duty duration with fixed
    // weekday/weekend hours.
    pub cap_weekday_hours: u32,
    pub cap_weekend_hours: u32,
    // --- Calendar configuration ---
    /// JSON file listing national holiday dates. Missing or unreadable files
    /// degrade to "no holidays".
    pub holidays_conf_file: Option<String>,
    // --- Weekend fairness history window ---
    pub weekend_history_months: u32,
}

impl Configuration {
    /// Load configuration from a file, in a .conf format (key=value).
    pub fn load() -> Self {
        let path = if let Ok(path) = std::env::var("ROTACONFFILE") {
            path
        } else {
            DEFAULT_CONFIG_FILE.to_string()
        };

        let contents = std::fs::read_to_string(&path).ok();
        if let Some(contents) = contents {
            serde_envfile::from_str(&contents).unwrap_or_else(|e| {
                eprintln!(
                    "Warning: could not parse configuration file '{}': {}, using default configuration.",
                    path, e
                );
                Configuration::default()
            })
        } else {
            Configuration::default()
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            // --- Rest and fairness weights ---
            rest_buffer_hours: 48,
            weekend_penalty_weight: 3,
            repeat_penalty_weight: 5,
            // --- Solver budget ---
            solver_wall_seconds: 10,
            solver_workers: 8,
            // --- Cap rotation hours ---
            cap_weekday_hours: 16,
            cap_weekend_hours: 24,
            // --- Calendar configuration ---
            holidays_conf_file: None,
            // --- Weekend fairness history window ---
            weekend_history_months: 3,
        }
    }
}

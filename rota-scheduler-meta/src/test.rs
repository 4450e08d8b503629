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

#![allow(dead_code)]

use dotenvy::dotenv;
use log::LevelFilter;
use rota_scheduler_core::model::configuration::Configuration;
use rota_scheduler_db::Session;

#[cfg(test)]
mod approval_test;
#[cfg(test)]
mod plan_cycle_test;

fn setup_for_tests(seed: bool) -> (Session, Configuration) {
    // Load .env file if present
    dotenv().ok();

    // Initialize logging
    env_logger::Builder::new()
        .is_test(true)
        .filter(None, LevelFilter::Info)
        .try_init()
        .ok();

    let config = Configuration::default();

    // Initialize database connection
    let session = Session::new("sqlite::memory:");

    // Create schema
    session.create_schema();

    if seed {
        rota_scheduler_db::example::seed_example_data(&session).expect("Failed to seed example data");
    }

    (session, config)
}

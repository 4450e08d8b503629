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

mod meta_schedule;
mod platform;
mod test;

use chrono::Datelike;
use dotenvy::dotenv;
use log::{LevelFilter, error, info};
use meta_schedule::plan_month;
use platform::Platform;
use rota_scheduler_core::model::configuration::Configuration;
use rota_scheduler_core::platform::PlatformTrait;
use rota_scheduler_core::scheduler::planning::PlanType;
use rota_scheduler_db::Session;
use rota_scheduler_db::example::{EXAMPLE_UNIT_ID, seed_example_data};
use rota_scheduler_db::model::StaffDatabaseRequests;

fn main() {
    // Load .env file if present
    dotenv().ok();

    // Initialize logging
    env_logger::Builder::new().filter(None, LevelFilter::Info).init();

    // Load configuration
    let config = Configuration::load();

    // Initialize database connection
    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    let session = Session::new(&database_url);
    session.create_schema();

    // Seed the demo unit when the database is empty.
    let staff = rota_scheduler_core::model::rows::StaffRow::get_all(&session, EXAMPLE_UNIT_ID)
        .expect("Failed to list staff");
    if staff.is_empty() {
        info!("No staff found, seeding example data");
        seed_example_data(&session).expect("Failed to seed example data");
    }

    let platform = Platform::from_database(session, EXAMPLE_UNIT_ID, config);
    let today = chrono::Local::now().date_naive();

    for plan_type in [PlanType::Clinic, PlanType::Nobet] {
        info!("Computing {} plan for {}-{:02}", plan_type.as_str(), today.year(), today.month());
        match plan_month(&platform, today.year(), today.month(), plan_type) {
            Ok(plan) => {
                let clinics = platform.list_clinics().expect("Failed to list clinics");
                let duty_types = platform.list_duty_types().expect("Failed to list duty types");
                let staff_names = platform
                    .list_staff()
                    .expect("Failed to list staff")
                    .into_iter()
                    .map(|row| (row.id, row.name))
                    .collect();

                println!("\n# {} plan {} ({})\n", plan_type.as_str(), plan.plan_period, plan.status_label);
                plan.to_table(&clinics, &duty_types, &staff_names).printstd();
                if plan_type == PlanType::Nobet {
                    println!("\nCap rotation:");
                    plan.cap_summary_table().printstd();
                    println!("\nNight duties:");
                    plan.night_summary_table().printstd();
                }
                for note in &plan.notes {
                    println!("note: {}", note);
                }
            }
            Err(e) => error!("{} plan failed: {}", plan_type.as_str(), e),
        }
    }
}

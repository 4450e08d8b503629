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

use crate::{Session, SessionSelectStatement};
use chrono::NaiveDate;
use log::warn;
use rota_scheduler_core::model::rows::{DayType, HistoryRow};
use sea_query::{Expr, ExprTrait, Iden, Order, Query};
use sqlx::{Error, Row};

#[derive(Iden)]
pub enum AssignmentHistory {
    #[iden = "assignment_history"]
    Table,
    #[iden = "id"]
    Id,
    #[iden = "unit_id"]
    UnitId,
    #[iden = "staff_id"]
    StaffId,
    #[iden = "clinic_id"]
    ClinicId,
    #[iden = "assignment_date"]
    AssignmentDate,
    #[iden = "plan_month_year"]
    PlanMonthYear,
    #[iden = "day_type"]
    DayType,
}

pub trait HistoryDatabaseRequests {
    fn get_all(session: &Session, unit_id: i64, period: Option<&str>) -> Result<Vec<HistoryRow>, Error>;
    /// Delete the period's rows and insert the new set as one transaction.
    fn replace_period(session: &Session, unit_id: i64, period: &str, rows: &[HistoryRow]) -> Result<(), Error>;
}

impl HistoryDatabaseRequests for HistoryRow {
    fn get_all(session: &Session, unit_id: i64, period: Option<&str>) -> Result<Vec<HistoryRow>, Error> {
        let rows = session.runtime.block_on(async {
            let mut query = Query::select()
                .columns(vec![
                    AssignmentHistory::Id,
                    AssignmentHistory::StaffId,
                    AssignmentHistory::ClinicId,
                    AssignmentHistory::AssignmentDate,
                    AssignmentHistory::PlanMonthYear,
                    AssignmentHistory::DayType,
                ])
                .from(AssignmentHistory::Table)
                .and_where(Expr::col(AssignmentHistory::UnitId).eq(unit_id))
                .order_by(AssignmentHistory::AssignmentDate, Order::Asc)
                .order_by(AssignmentHistory::ClinicId, Order::Asc)
                .order_by(AssignmentHistory::StaffId, Order::Asc)
                .order_by(AssignmentHistory::Id, Order::Asc)
                .to_owned();
            if let Some(period) = period {
                query.and_where(Expr::col(AssignmentHistory::PlanMonthYear).eq(period.trim()));
            }
            query.fetch_all(session).await
        })?;

        let mut history = Vec::new();
        for row in rows {
            let id: i64 = row.try_get("id")?;
            let date_raw: String = row.try_get("assignment_date")?;
            let Ok(assignment_date) = NaiveDate::parse_from_str(date_raw.trim(), "%Y-%m-%d") else {
                warn!("Skipping history row {} with invalid date '{}'", id, date_raw);
                continue;
            };
            let day_type_raw: Option<String> = row.try_get("day_type")?;
            history.push(HistoryRow {
                staff_id: row.try_get("staff_id")?,
                clinic_id: row.try_get("clinic_id")?,
                assignment_date,
                plan_period: row.try_get("plan_month_year")?,
                day_type: DayType::parse(day_type_raw.as_deref().unwrap_or("weekday")),
            });
        }
        Ok(history)
    }

    fn replace_period(session: &Session, unit_id: i64, period: &str, rows: &[HistoryRow]) -> Result<(), Error> {
        let period = period.trim().to_string();

        let delete = Query::delete()
            .from_table(AssignmentHistory::Table)
            .and_where(Expr::col(AssignmentHistory::UnitId).eq(unit_id))
            .and_where(Expr::col(AssignmentHistory::PlanMonthYear).eq(period.as_str()))
            .to_owned();
        let (delete_sql, delete_values) = session.backend.build_delete(&delete);

        let insert = if rows.is_empty() {
            None
        } else {
            let mut insert = Query::insert()
                .into_table(AssignmentHistory::Table)
                .columns(vec![
                    AssignmentHistory::UnitId,
                    AssignmentHistory::StaffId,
                    AssignmentHistory::ClinicId,
                    AssignmentHistory::AssignmentDate,
                    AssignmentHistory::PlanMonthYear,
                    AssignmentHistory::DayType,
                ])
                .to_owned();
            for row in rows {
                insert.values_panic(vec![
                    Expr::val(unit_id),
                    Expr::val(row.staff_id),
                    Expr::val(row.clinic_id),
                    Expr::val(row.assignment_date.format("%Y-%m-%d").to_string()),
                    Expr::val(period.as_str()),
                    Expr::val(row.day_type.as_str()),
                ]);
            }
            Some(session.backend.build_insert(&insert))
        };

        session.runtime.block_on(async {
            let mut tx = session.pool.begin().await?;
            sqlx::query_with(delete_sql.as_str(), delete_values).execute(&mut *tx).await?;
            if let Some((insert_sql, insert_values)) = insert {
                sqlx::query_with(insert_sql.as_str(), insert_values).execute(&mut *tx).await?;
            }
            tx.commit().await
        })?;
        Ok(())
    }
}

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

use crate::model::staff::Staff;
use crate::{Session, SessionDeleteStatement, SessionInsertStatement, SessionSelectStatement};
use chrono::NaiveDate;
use log::warn;
use rota_scheduler_core::model::rows::LeaveRow;
use sea_query::{Expr, ExprTrait, Iden, Order, Query};
use sqlx::{Error, Row};

#[derive(Iden)]
pub enum LeaveRequests {
    #[iden = "leave_requests"]
    Table,
    #[iden = "id"]
    Id,
    #[iden = "staff_id"]
    StaffId,
    #[iden = "start_date"]
    StartDate,
    #[iden = "end_date"]
    EndDate,
    #[iden = "reason"]
    Reason,
}

pub trait LeaveDatabaseRequests {
    fn get_all(session: &Session, unit_id: i64) -> Result<Vec<LeaveRow>, Error>;
    fn insert(&self, session: &Session) -> Result<(), Error>;
    fn delete(session: &Session, leave_id: i64) -> Result<(), Error>;
}

impl LeaveDatabaseRequests for LeaveRow {
    /// Leave of the unit's staff, ordered by start then end date. Rows with
    /// unparsable dates are skipped with a warning.
    fn get_all(session: &Session, unit_id: i64) -> Result<Vec<LeaveRow>, Error> {
        let rows = session.runtime.block_on(async {
            Query::select()
                .columns(vec![
                    (LeaveRequests::Table, LeaveRequests::Id),
                    (LeaveRequests::Table, LeaveRequests::StaffId),
                    (LeaveRequests::Table, LeaveRequests::StartDate),
                    (LeaveRequests::Table, LeaveRequests::EndDate),
                    (LeaveRequests::Table, LeaveRequests::Reason),
                ])
                .from(LeaveRequests::Table)
                .inner_join(
                    Staff::Table,
                    Expr::col((LeaveRequests::Table, LeaveRequests::StaffId)).equals((Staff::Table, Staff::Id)),
                )
                .and_where(Expr::col((Staff::Table, Staff::UnitId)).eq(unit_id))
                .order_by((LeaveRequests::Table, LeaveRequests::StartDate), Order::Asc)
                .order_by((LeaveRequests::Table, LeaveRequests::EndDate), Order::Asc)
                .order_by((LeaveRequests::Table, LeaveRequests::Id), Order::Asc)
                .fetch_all(session)
                .await
        })?;

        let mut leave = Vec::new();
        for row in rows {
            let id: i64 = row.try_get("id")?;
            let start_raw: String = row.try_get("start_date")?;
            let end_raw: String = row.try_get("end_date")?;
            let (Ok(start_date), Ok(end_date)) = (
                NaiveDate::parse_from_str(start_raw.trim(), "%Y-%m-%d"),
                NaiveDate::parse_from_str(end_raw.trim(), "%Y-%m-%d"),
            ) else {
                warn!("Skipping leave request {} with invalid dates '{}'..'{}'", id, start_raw, end_raw);
                continue;
            };
            leave.push(LeaveRow {
                id,
                staff_id: row.try_get("staff_id")?,
                start_date,
                end_date,
                reason: row.try_get("reason")?,
            });
        }
        Ok(leave)
    }

    fn insert(&self, session: &Session) -> Result<(), Error> {
        let reason = self.reason.as_deref().map(str::trim).filter(|r| !r.is_empty());
        session.runtime.block_on(async {
            Query::insert()
                .into_table(LeaveRequests::Table)
                .columns(vec![
                    LeaveRequests::StaffId,
                    LeaveRequests::StartDate,
                    LeaveRequests::EndDate,
                    LeaveRequests::Reason,
                ])
                .values_panic(vec![
                    Expr::val(self.staff_id),
                    Expr::val(self.start_date.format("%Y-%m-%d").to_string()),
                    Expr::val(self.end_date.format("%Y-%m-%d").to_string()),
                    Expr::val(reason.map(str::to_string)),
                ])
                .execute(session)
                .await
        })?;
        Ok(())
    }

    fn delete(session: &Session, leave_id: i64) -> Result<(), Error> {
        session.runtime.block_on(async {
            Query::delete()
                .from_table(LeaveRequests::Table)
                .and_where(Expr::col(LeaveRequests::Id).eq(leave_id))
                .execute(session)
                .await
        })?;
        Ok(())
    }
}

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

use crate::{Session, SessionDeleteStatement, SessionInsertStatement, SessionSelectStatement, SessionUpdateStatement};
use rota_scheduler_core::model::rows::StaffRow;
use sea_query::{Expr, ExprTrait, Iden, Order, Query};
use sqlx::{Error, Row};

#[derive(Iden)]
pub enum Staff {
    #[iden = "staff"]
    Table,
    #[iden = "id"]
    Id,
    #[iden = "unit_id"]
    UnitId,
    #[iden = "name"]
    Name,
    #[iden = "title"]
    Title,
    #[iden = "seniority"]
    Seniority,
    #[iden = "min_night_duties_per_month"]
    MinNightDutiesPerMonth,
    #[iden = "max_night_duties_per_month"]
    MaxNightDutiesPerMonth,
    #[iden = "education_year"]
    EducationYear,
    #[iden = "night_duty_exempt"]
    NightDutyExempt,
}

pub trait StaffDatabaseRequests {
    fn get_all(session: &Session, unit_id: i64) -> Result<Vec<StaffRow>, Error>;
    fn insert(&self, session: &Session, unit_id: i64) -> Result<(), Error>;
    fn delete(session: &Session, staff_id: i64) -> Result<(), Error>;
    fn update_preferences(
        session: &Session,
        staff_id: i64,
        seniority: Option<&str>,
        min_night: Option<i64>,
        max_night: Option<i64>,
    ) -> Result<(), Error>;
}

impl StaffDatabaseRequests for StaffRow {
    /// All staff of the unit, ordered by id.
    fn get_all(session: &Session, unit_id: i64) -> Result<Vec<StaffRow>, Error> {
        let rows = session.runtime.block_on(async {
            Query::select()
                .columns(vec![
                    Staff::Id,
                    Staff::Name,
                    Staff::Title,
                    Staff::Seniority,
                    Staff::MinNightDutiesPerMonth,
                    Staff::MaxNightDutiesPerMonth,
                    Staff::EducationYear,
                    Staff::NightDutyExempt,
                ])
                .from(Staff::Table)
                .and_where(Expr::col(Staff::UnitId).eq(unit_id))
                .order_by(Staff::Id, Order::Asc)
                .fetch_all(session)
                .await
        })?;

        let mut staff = Vec::new();
        for row in rows {
            staff.push(StaffRow {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                title: row.try_get("title")?,
                seniority: row.try_get("seniority")?,
                min_night_duties_per_month: row.try_get("min_night_duties_per_month")?,
                max_night_duties_per_month: row.try_get("max_night_duties_per_month")?,
                education_year: row.try_get("education_year")?,
                night_duty_exempt: row.try_get::<i64, _>("night_duty_exempt")? != 0,
            });
        }
        Ok(staff)
    }

    /// Negative night limits are stored as NULL, matching the projection's
    /// tolerance for absent values.
    fn insert(&self, session: &Session, unit_id: i64) -> Result<(), Error> {
        let min_value = self.min_night_duties_per_month.filter(|v| *v >= 0);
        let max_value = self.max_night_duties_per_month.filter(|v| *v >= 0);
        session.runtime.block_on(async {
            Query::insert()
                .into_table(Staff::Table)
                .columns(vec![
                    Staff::Id,
                    Staff::UnitId,
                    Staff::Name,
                    Staff::Title,
                    Staff::Seniority,
                    Staff::MinNightDutiesPerMonth,
                    Staff::MaxNightDutiesPerMonth,
                    Staff::EducationYear,
                    Staff::NightDutyExempt,
                ])
                .values_panic(vec![
                    Expr::val(self.id),
                    Expr::val(unit_id),
                    Expr::val(self.name.trim()),
                    Expr::val(self.title.as_deref().unwrap_or("").trim()),
                    Expr::val(self.seniority.as_deref().map(str::trim)),
                    Expr::val(min_value),
                    Expr::val(max_value),
                    Expr::val(self.education_year),
                    Expr::val(self.night_duty_exempt as i64),
                ])
                .execute(session)
                .await
        })?;
        Ok(())
    }

    fn delete(session: &Session, staff_id: i64) -> Result<(), Error> {
        session.runtime.block_on(async {
            Query::delete()
                .from_table(Staff::Table)
                .and_where(Expr::col(Staff::Id).eq(staff_id))
                .execute(session)
                .await
        })?;
        Ok(())
    }

    fn update_preferences(
        session: &Session,
        staff_id: i64,
        seniority: Option<&str>,
        min_night: Option<i64>,
        max_night: Option<i64>,
    ) -> Result<(), Error> {
        let min_value = min_night.filter(|v| *v >= 0);
        let max_value = max_night.filter(|v| *v >= 0);
        session.runtime.block_on(async {
            Query::update()
                .table(Staff::Table)
                .values(vec![
                    (Staff::Seniority, seniority.map(str::to_string).into()),
                    (Staff::MinNightDutiesPerMonth, min_value.into()),
                    (Staff::MaxNightDutiesPerMonth, max_value.into()),
                ])
                .and_where(Expr::col(Staff::Id).eq(staff_id))
                .execute(session)
                .await
        })?;
        Ok(())
    }
}

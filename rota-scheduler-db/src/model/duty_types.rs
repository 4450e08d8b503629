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

use crate::{Session, SessionDeleteStatement, SessionInsertStatement, SessionSelectStatement};
use rota_scheduler_core::model::rows::DutyTypeRow;
use sea_query::{Expr, ExprTrait, Iden, Order, Query};
use sqlx::{Error, Row};

#[derive(Iden)]
pub enum DutyTypes {
    #[iden = "duty_types"]
    Table,
    #[iden = "id"]
    Id,
    #[iden = "unit_id"]
    UnitId,
    #[iden = "name"]
    Name,
    #[iden = "duration_hours"]
    DurationHours,
    #[iden = "duty_category"]
    DutyCategory,
    #[iden = "required_staff_count"]
    RequiredStaffCount,
}

pub trait DutyTypeDatabaseRequests {
    fn get_all(session: &Session, unit_id: i64) -> Result<Vec<DutyTypeRow>, Error>;
    fn insert(&self, session: &Session, unit_id: i64) -> Result<(), Error>;
    fn delete(session: &Session, duty_type_id: i64) -> Result<(), Error>;
}

impl DutyTypeDatabaseRequests for DutyTypeRow {
    fn get_all(session: &Session, unit_id: i64) -> Result<Vec<DutyTypeRow>, Error> {
        let rows = session.runtime.block_on(async {
            Query::select()
                .columns(vec![
                    DutyTypes::Id,
                    DutyTypes::Name,
                    DutyTypes::DurationHours,
                    DutyTypes::DutyCategory,
                    DutyTypes::RequiredStaffCount,
                ])
                .from(DutyTypes::Table)
                .and_where(Expr::col(DutyTypes::UnitId).eq(unit_id))
                .order_by(DutyTypes::Id, Order::Asc)
                .fetch_all(session)
                .await
        })?;

        let mut duty_types = Vec::new();
        for row in rows {
            duty_types.push(DutyTypeRow {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                duration_hours: row.try_get("duration_hours")?,
                duty_category: row.try_get("duty_category")?,
                required_staff_count: Ord::max(row.try_get::<i64, _>("required_staff_count")?, 1),
            });
        }
        Ok(duty_types)
    }

    /// Unknown categories are stored as `nobet`, the storage default.
    fn insert(&self, session: &Session, unit_id: i64) -> Result<(), Error> {
        let category = match self.duty_category.as_deref().map(|c| c.trim().to_lowercase()) {
            Some(category) if category == "mesa" || category == "nobet" => category,
            _ => "nobet".to_string(),
        };
        session.runtime.block_on(async {
            Query::insert()
                .into_table(DutyTypes::Table)
                .columns(vec![
                    DutyTypes::Id,
                    DutyTypes::UnitId,
                    DutyTypes::Name,
                    DutyTypes::DurationHours,
                    DutyTypes::DutyCategory,
                    DutyTypes::RequiredStaffCount,
                ])
                .values_panic(vec![
                    Expr::val(self.id),
                    Expr::val(unit_id),
                    Expr::val(self.name.trim()),
                    Expr::val(self.duration_hours),
                    Expr::val(category.as_str()),
                    Expr::val(Ord::max(self.required_staff_count, 1)),
                ])
                .execute(session)
                .await
        })?;
        Ok(())
    }

    fn delete(session: &Session, duty_type_id: i64) -> Result<(), Error> {
        session.runtime.block_on(async {
            Query::delete()
                .from_table(DutyTypes::Table)
                .and_where(Expr::col(DutyTypes::Id).eq(duty_type_id))
                .execute(session)
                .await
        })?;
        Ok(())
    }
}

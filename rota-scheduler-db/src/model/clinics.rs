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
use rota_scheduler_core::model::rows::{ClinicRow, RotationPeriod, SeniorityRuleRow};
use sea_query::{Expr, ExprTrait, Func, Iden, OnConflict, Order, Query};
use sqlx::{Error, Row};

// clinics and their seniority composition rules
#[derive(Iden)]
pub enum Clinics {
    #[iden = "clinics"]
    Table,
    #[iden = "id"]
    Id,
    #[iden = "unit_id"]
    UnitId,
    #[iden = "name"]
    Name,
    #[iden = "display_order"]
    DisplayOrder,
    #[iden = "required_assistants"]
    RequiredAssistants,
    #[iden = "rotation_period"]
    RotationPeriod,
    #[iden = "responsible_specialist_id"]
    ResponsibleSpecialistId,
}

#[derive(Iden)]
pub enum ClinicSeniorityRules {
    #[iden = "clinic_seniority_rules"]
    Table,
    #[iden = "id"]
    Id,
    #[iden = "clinic_id"]
    ClinicId,
    #[iden = "required_seniority"]
    RequiredSeniority,
    #[iden = "required_count"]
    RequiredCount,
}

pub trait ClinicDatabaseRequests {
    fn get_all(session: &Session, unit_id: i64) -> Result<Vec<ClinicRow>, Error>;
    fn insert(&self, session: &Session, unit_id: i64) -> Result<(), Error>;
    fn delete(session: &Session, clinic_id: i64) -> Result<(), Error>;
    fn reorder(session: &Session, unit_id: i64, clinic_id: i64, offset: i64) -> Result<bool, Error>;
}

impl ClinicDatabaseRequests for ClinicRow {
    /// All clinics of the unit, ordered by display_order then id.
    fn get_all(session: &Session, unit_id: i64) -> Result<Vec<ClinicRow>, Error> {
        let rows = session.runtime.block_on(async {
            Query::select()
                .columns(vec![
                    Clinics::Id,
                    Clinics::Name,
                    Clinics::DisplayOrder,
                    Clinics::RequiredAssistants,
                    Clinics::RotationPeriod,
                    Clinics::ResponsibleSpecialistId,
                ])
                .from(Clinics::Table)
                .and_where(Expr::col(Clinics::UnitId).eq(unit_id))
                .order_by(Clinics::DisplayOrder, Order::Asc)
                .order_by(Clinics::Id, Order::Asc)
                .fetch_all(session)
                .await
        })?;

        let mut clinics = Vec::new();
        for row in rows {
            clinics.push(ClinicRow {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                display_order: row.try_get("display_order")?,
                required_assistants: Ord::max(row.try_get::<i64, _>("required_assistants")?, 1),
                rotation_period: row.try_get("rotation_period")?,
                responsible_specialist_id: row.try_get("responsible_specialist_id")?,
            });
        }
        Ok(clinics)
    }

    /// Appends the clinic at the end of the display order. The rotation
    /// period is normalised before storage.
    fn insert(&self, session: &Session, unit_id: i64) -> Result<(), Error> {
        let rotation = RotationPeriod::parse(self.rotation_period.as_deref()).as_str();
        session.runtime.block_on(async {
            let rows = Query::select()
                .expr(Func::max(Expr::col(Clinics::DisplayOrder)))
                .from(Clinics::Table)
                .and_where(Expr::col(Clinics::UnitId).eq(unit_id))
                .fetch_all(session)
                .await?;
            let max_order: Option<i64> = rows.first().and_then(|row| row.try_get(0).ok());
            let next_order = max_order.unwrap_or(0) + 1;

            Query::insert()
                .into_table(Clinics::Table)
                .columns(vec![
                    Clinics::Id,
                    Clinics::UnitId,
                    Clinics::Name,
                    Clinics::DisplayOrder,
                    Clinics::RequiredAssistants,
                    Clinics::RotationPeriod,
                    Clinics::ResponsibleSpecialistId,
                ])
                .values_panic(vec![
                    Expr::val(self.id),
                    Expr::val(unit_id),
                    Expr::val(self.name.trim()),
                    Expr::val(next_order),
                    Expr::val(Ord::max(self.required_assistants, 1)),
                    Expr::val(rotation),
                    Expr::val(self.responsible_specialist_id),
                ])
                .execute(session)
                .await
        })?;
        Ok(())
    }

    fn delete(session: &Session, clinic_id: i64) -> Result<(), Error> {
        session.runtime.block_on(async {
            Query::delete()
                .from_table(Clinics::Table)
                .and_where(Expr::col(Clinics::Id).eq(clinic_id))
                .execute(session)
                .await
        })?;
        Ok(())
    }

    /// Move a clinic up or down in the display order and renumber the unit's
    /// clinics sequentially. Returns false when the move falls off either end.
    fn reorder(session: &Session, unit_id: i64, clinic_id: i64, offset: i64) -> Result<bool, Error> {
        let clinics = ClinicRow::get_all(session, unit_id)?;
        let mut ids: Vec<i64> = clinics.iter().map(|clinic| clinic.id).collect();
        let Some(index) = ids.iter().position(|id| *id == clinic_id) else {
            return Ok(false);
        };
        let new_index = index as i64 + offset;
        if new_index < 0 || new_index >= ids.len() as i64 {
            return Ok(false);
        }
        ids.swap(index, new_index as usize);

        session.runtime.block_on(async {
            for (order, id) in ids.iter().enumerate() {
                Query::update()
                    .table(Clinics::Table)
                    .values(vec![(Clinics::DisplayOrder, (order as i64 + 1).into())])
                    .and_where(Expr::col(Clinics::Id).eq(*id))
                    .execute(session)
                    .await?;
            }
            Ok::<_, Error>(())
        })?;
        Ok(true)
    }
}

pub trait SeniorityRuleDatabaseRequests {
    fn get_all(session: &Session, unit_id: i64) -> Result<Vec<SeniorityRuleRow>, Error>;
    fn upsert(session: &Session, clinic_id: i64, required_seniority: &str, required_count: i64) -> Result<(), Error>;
    fn delete(session: &Session, rule_id: i64) -> Result<(), Error>;
}

impl SeniorityRuleDatabaseRequests for SeniorityRuleRow {
    /// Rules across all clinics of the unit, ordered by clinic then id.
    fn get_all(session: &Session, unit_id: i64) -> Result<Vec<SeniorityRuleRow>, Error> {
        let rows = session.runtime.block_on(async {
            Query::select()
                .columns(vec![
                    (ClinicSeniorityRules::Table, ClinicSeniorityRules::Id),
                    (ClinicSeniorityRules::Table, ClinicSeniorityRules::ClinicId),
                    (ClinicSeniorityRules::Table, ClinicSeniorityRules::RequiredSeniority),
                    (ClinicSeniorityRules::Table, ClinicSeniorityRules::RequiredCount),
                ])
                .from(ClinicSeniorityRules::Table)
                .inner_join(
                    Clinics::Table,
                    Expr::col((ClinicSeniorityRules::Table, ClinicSeniorityRules::ClinicId))
                        .equals((Clinics::Table, Clinics::Id)),
                )
                .and_where(Expr::col((Clinics::Table, Clinics::UnitId)).eq(unit_id))
                .order_by((ClinicSeniorityRules::Table, ClinicSeniorityRules::ClinicId), Order::Asc)
                .order_by((ClinicSeniorityRules::Table, ClinicSeniorityRules::Id), Order::Asc)
                .fetch_all(session)
                .await
        })?;

        let mut rules = Vec::new();
        for row in rows {
            rules.push(SeniorityRuleRow {
                id: row.try_get("id")?,
                clinic_id: row.try_get("clinic_id")?,
                required_seniority: row.try_get("required_seniority")?,
                required_count: row.try_get("required_count")?,
            });
        }
        Ok(rules)
    }

    /// Insert or replace the count of a (clinic, seniority) rule.
    fn upsert(session: &Session, clinic_id: i64, required_seniority: &str, required_count: i64) -> Result<(), Error> {
        let seniority = required_seniority.trim().to_lowercase();
        session.runtime.block_on(async {
            Query::insert()
                .into_table(ClinicSeniorityRules::Table)
                .columns(vec![
                    ClinicSeniorityRules::ClinicId,
                    ClinicSeniorityRules::RequiredSeniority,
                    ClinicSeniorityRules::RequiredCount,
                ])
                .values_panic(vec![
                    Expr::val(clinic_id),
                    Expr::val(seniority.as_str()),
                    Expr::val(Ord::max(required_count, 0)),
                ])
                .on_conflict(
                    OnConflict::columns([ClinicSeniorityRules::ClinicId, ClinicSeniorityRules::RequiredSeniority])
                        .update_column(ClinicSeniorityRules::RequiredCount)
                        .to_owned(),
                )
                .execute(session)
                .await
        })?;
        Ok(())
    }

    fn delete(session: &Session, rule_id: i64) -> Result<(), Error> {
        session.runtime.block_on(async {
            Query::delete()
                .from_table(ClinicSeniorityRules::Table)
                .and_where(Expr::col(ClinicSeniorityRules::Id).eq(rule_id))
                .execute(session)
                .await
        })?;
        Ok(())
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An employee assigned to exactly one cafe.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub email_address: String,
    pub phone_number: String,
    pub gender: String,
    pub start_date: NaiveDate,
    pub cafe_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cafe::Entity",
        from = "Column::CafeId",
        to = "super::cafe::Column::Id",
        on_delete = "Restrict"
    )]
    Cafe,
}

impl Related<super::cafe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cafe.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whole days between `start_date` and `today`. Negative for future start dates.
    pub fn days_worked_on(&self, today: NaiveDate) -> i64 {
        (today - self.start_date).num_days()
    }

    pub fn days_worked(&self) -> i64 {
        self.days_worked_on(Utc::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(start_date: NaiveDate) -> Model {
        let now = Utc::now();
        Model {
            id: "UIAB12CD3".into(),
            name: "Ada".into(),
            email_address: "ada@example.com".into(),
            phone_number: "91234567".into(),
            gender: "Female".into(),
            start_date,
            cafe_id: "123e4567-e89b-12d3-a456-426614174000".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn days_worked_counts_whole_days() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(employee(start).days_worked_on(today), 10);
        assert_eq!(employee(today).days_worked_on(today), 0);
    }

    #[test]
    fn days_worked_crosses_leap_day() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(employee(start).days_worked_on(today), 2);
    }

    #[test]
    fn days_worked_against_current_date() {
        let start = Utc::now().date_naive() - chrono::Duration::days(10);
        assert_eq!(employee(start).days_worked(), 10);
    }
}

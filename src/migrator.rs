use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_cafes_table::Migration),
            Box::new(m20240101_000002_create_employees_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_cafes_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_cafes_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Cafes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Cafes::Id)
                                .string_len(36)
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Cafes::Name).string_len(100).not_null())
                        .col(
                            ColumnDef::new(Cafes::Description)
                                .string_len(255)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Cafes::Location).string_len(100).not_null())
                        .col(ColumnDef::new(Cafes::Logo).blob().null())
                        .col(
                            ColumnDef::new(Cafes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Cafes::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_cafes_location")
                        .table(Cafes::Table)
                        .col(Cafes::Location)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_cafes_name")
                        .table(Cafes::Table)
                        .col(Cafes::Name)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Cafes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Cafes {
        Table,
        Id,
        Name,
        Description,
        Location,
        Logo,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_employees_table {

    use super::m20240101_000001_create_cafes_table::Cafes;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_employees_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Employees are removed by the service before their cafe, so the
            // foreign key only has to refuse dangling references.
            manager
                .create_table(
                    Table::create()
                        .table(Employees::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Employees::Id)
                                .string_len(9)
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Employees::Name).string_len(100).not_null())
                        .col(
                            ColumnDef::new(Employees::EmailAddress)
                                .string_len(100)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Employees::PhoneNumber)
                                .string_len(8)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Employees::Gender).string_len(10).not_null())
                        .col(ColumnDef::new(Employees::StartDate).date().not_null())
                        .col(ColumnDef::new(Employees::CafeId).string_len(36).not_null())
                        .col(
                            ColumnDef::new(Employees::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Employees::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_employees_cafe_id")
                                .from(Employees::Table, Employees::CafeId)
                                .to(Cafes::Table, Cafes::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_employees_cafe_id")
                        .table(Employees::Table)
                        .col(Employees::CafeId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_employees_start_date")
                        .table(Employees::Table)
                        .col(Employees::StartDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Employees::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Employees {
        Table,
        Id,
        Name,
        EmailAddress,
        PhoneNumber,
        Gender,
        StartDate,
        CafeId,
        CreatedAt,
        UpdatedAt,
    }
}

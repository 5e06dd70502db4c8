use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Companies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Companies::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Companies::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Companies::Logo).string())
                    .col(ColumnDef::new(Companies::Location).string())
                    .col(ColumnDef::new(Companies::Industry).string())
                    .col(ColumnDef::new(Companies::Website).string())
                    .col(
                        ColumnDef::new(Companies::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Jobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Jobs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Jobs::Title).string().not_null())
                    .col(ColumnDef::new(Jobs::Company).string().not_null())
                    .col(ColumnDef::new(Jobs::CompanyId).integer())
                    .col(ColumnDef::new(Jobs::Location).string().not_null())
                    .col(ColumnDef::new(Jobs::Country).string().not_null())
                    .col(ColumnDef::new(Jobs::Description).text().not_null())
                    .col(ColumnDef::new(Jobs::ApplyUrl).string())
                    .col(ColumnDef::new(Jobs::SalaryMin).big_integer())
                    .col(ColumnDef::new(Jobs::SalaryMax).big_integer())
                    .col(ColumnDef::new(Jobs::SalaryCurrency).string())
                    .col(ColumnDef::new(Jobs::JobType).string())
                    .col(ColumnDef::new(Jobs::ExperienceLevel).string())
                    .col(ColumnDef::new(Jobs::Skills).string())
                    .col(
                        ColumnDef::new(Jobs::IsRemote)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Jobs::IsHybrid)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Jobs::IsFeatured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Jobs::IsUrgent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Jobs::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Jobs::Sector).string())
                    .col(ColumnDef::new(Jobs::PostedAt).timestamp())
                    .col(
                        ColumnDef::new(Jobs::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_jobs_company")
                            .from(Jobs::Table, Jobs::CompanyId)
                            .to(Companies::Table, Companies::Id),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_jobs_active", Jobs::IsActive),
            ("idx_jobs_country", Jobs::Country),
            ("idx_jobs_job_type", Jobs::JobType),
            ("idx_jobs_featured", Jobs::IsFeatured),
            ("idx_jobs_posted_at", Jobs::PostedAt),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Jobs::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Applications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Applications::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Applications::JobId).integer().not_null())
                    .col(ColumnDef::new(Applications::ApplicantRef).string())
                    .col(
                        ColumnDef::new(Applications::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_applications_job")
                            .from(Applications::Table, Applications::JobId)
                            .to(Jobs::Table, Jobs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_applications_job")
                    .table(Applications::Table)
                    .col(Applications::JobId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Bookmarks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bookmarks::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Bookmarks::JobId).integer().not_null())
                    .col(ColumnDef::new(Bookmarks::UserRef).string())
                    .col(
                        ColumnDef::new(Bookmarks::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookmarks_job")
                            .from(Bookmarks::Table, Bookmarks::JobId)
                            .to(Jobs::Table, Jobs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookmarks_job")
                    .table(Bookmarks::Table)
                    .col(Bookmarks::JobId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bookmarks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Applications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Jobs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Companies::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Jobs {
    Table,
    Id,
    Title,
    Company,
    CompanyId,
    Location,
    Country,
    Description,
    ApplyUrl,
    SalaryMin,
    SalaryMax,
    SalaryCurrency,
    JobType,
    ExperienceLevel,
    Skills,
    IsRemote,
    IsHybrid,
    IsFeatured,
    IsUrgent,
    IsActive,
    Sector,
    PostedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Companies {
    Table,
    Id,
    Name,
    Logo,
    Location,
    Industry,
    Website,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Applications {
    Table,
    Id,
    JobId,
    ApplicantRef,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Bookmarks {
    Table,
    Id,
    JobId,
    UserRef,
    CreatedAt,
}

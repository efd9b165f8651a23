use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table. The places column holds the denormalized set of
        // owned place ids as a JSON array; it is maintained transactionally
        // together with the places table.
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Name)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::PasswordHash)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::Image)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::Places)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create places table. Every place carries exactly one owner id.
        manager
            .create_table(
                Table::create()
                    .table(Places::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Places::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Places::Title)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Places::Description)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Places::Address)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Places::Image)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Places::OwnerId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Places::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Owner lookups back the public places-by-user listing.
        manager
            .create_index(
                Index::create()
                    .name("idx_places_owner_id")
                    .table(Places::Table)
                    .col(Places::OwnerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Places::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    Image,
    Places,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Places {
    Table,
    Id,
    Title,
    Description,
    Address,
    Image,
    OwnerId,
    CreatedAt,
}

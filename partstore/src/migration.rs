//! Schema for the catalog tables, applied with `Migrator::up` at startup and in tests.

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(CreateCategoryTable),
            Box::new(CreateProductTable),
            Box::new(CreateProductImageTable),
        ]
    }
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    Slug,
    Description,
    Level,
    ParentId,
    SortOrder,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Sku,
    Name,
    Slug,
    Description,
    ShortDescription,
    MetaDescription,
    Price,
    CompareAtPrice,
    StockQuantity,
    LowStockThreshold,
    TrackQuantity,
    CompatibleModels,
    Weight,
    Dimensions,
    IsActive,
    IsFeatured,
    CategoryId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProductImages {
    Table,
    Id,
    ProductId,
    Url,
    AltText,
    SortOrder,
    IsPrimary,
    CreatedAt,
}

pub struct CreateCategoryTable;

impl MigrationName for CreateCategoryTable {
    fn name(&self) -> &'static str {
        "m20250101_000001_create_categories_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateCategoryTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(Categories::Table)
            .if_not_exists()
            .col(ColumnDef::new(Categories::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Categories::Name).string_len(255).not_null())
            .col(ColumnDef::new(Categories::Slug).string_len(255).not_null())
            .col(ColumnDef::new(Categories::Description).text().null())
            .col(ColumnDef::new(Categories::Level).integer().not_null().default(1))
            .col(ColumnDef::new(Categories::ParentId).uuid().null())
            .col(ColumnDef::new(Categories::SortOrder).integer().not_null().default(0))
            .col(ColumnDef::new(Categories::IsActive).boolean().not_null().default(true))
            .col(
                ColumnDef::new(Categories::CreatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(
                ColumnDef::new(Categories::UpdatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_category_parent")
                    .from(Categories::Table, Categories::ParentId)
                    .to(Categories::Table, Categories::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            )
            .to_owned();
        manager.create_table(table).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_categories_parent_name")
                    .table(Categories::Table)
                    .col(Categories::ParentId)
                    .col(Categories::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_categories_parent_slug")
                    .table(Categories::Table)
                    .col(Categories::ParentId)
                    .col(Categories::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // NULL parents never collide in a composite unique index, so roots need their own
        let db = manager.get_connection();
        db.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_categories_root_name ON categories (name) WHERE parent_id IS NULL",
        )
        .await?;
        db.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_categories_root_slug ON categories (slug) WHERE parent_id IS NULL",
        )
        .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await
    }
}

pub struct CreateProductTable;

impl MigrationName for CreateProductTable {
    fn name(&self) -> &'static str {
        "m20250101_000002_create_products_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateProductTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(Products::Table)
            .if_not_exists()
            .col(ColumnDef::new(Products::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Products::Sku).string_len(100).not_null().unique_key())
            .col(ColumnDef::new(Products::Name).string_len(255).not_null())
            .col(ColumnDef::new(Products::Slug).string_len(255).not_null().unique_key())
            .col(ColumnDef::new(Products::Description).text().null())
            .col(ColumnDef::new(Products::ShortDescription).string_len(255).null())
            .col(ColumnDef::new(Products::MetaDescription).string_len(255).null())
            .col(ColumnDef::new(Products::Price).decimal_len(12, 2).not_null())
            .col(ColumnDef::new(Products::CompareAtPrice).decimal_len(12, 2).null())
            .col(ColumnDef::new(Products::StockQuantity).integer().not_null().default(0))
            .col(ColumnDef::new(Products::LowStockThreshold).integer().not_null().default(5))
            .col(ColumnDef::new(Products::TrackQuantity).boolean().not_null().default(true))
            .col(ColumnDef::new(Products::CompatibleModels).string_len(255).not_null().default(""))
            .col(ColumnDef::new(Products::Weight).decimal_len(10, 3).null())
            .col(ColumnDef::new(Products::Dimensions).string_len(255).null())
            .col(ColumnDef::new(Products::IsActive).boolean().not_null().default(true))
            .col(ColumnDef::new(Products::IsFeatured).boolean().not_null().default(false))
            .col(ColumnDef::new(Products::CategoryId).uuid().not_null())
            .col(
                ColumnDef::new(Products::CreatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(
                ColumnDef::new(Products::UpdatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_product_category")
                    .from(Products::Table, Products::CategoryId)
                    .to(Categories::Table, Categories::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            )
            .to_owned();
        manager.create_table(table).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_category")
                    .table(Products::Table)
                    .col(Products::CategoryId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

pub struct CreateProductImageTable;

impl MigrationName for CreateProductImageTable {
    fn name(&self) -> &'static str {
        "m20250101_000003_create_product_images_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateProductImageTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(ProductImages::Table)
            .if_not_exists()
            .col(ColumnDef::new(ProductImages::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(ProductImages::ProductId).uuid().not_null())
            .col(ColumnDef::new(ProductImages::Url).text().not_null())
            .col(ColumnDef::new(ProductImages::AltText).string_len(255).null())
            .col(ColumnDef::new(ProductImages::SortOrder).integer().not_null().default(0))
            .col(ColumnDef::new(ProductImages::IsPrimary).boolean().not_null().default(false))
            .col(
                ColumnDef::new(ProductImages::CreatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_product_image_product")
                    .from(ProductImages::Table, ProductImages::ProductId)
                    .to(Products::Table, Products::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            )
            .to_owned();
        manager.create_table(table).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProductImages::Table).to_owned())
            .await
    }
}

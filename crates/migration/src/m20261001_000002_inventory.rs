//! Inventory schema:
//!
//! - `warehouses` and `products`, soft-deleted through `deleted_at`
//! - `inventory_stock`: quantity per (product, warehouse)
//! - `inventory_movements`: every signed change applied to a stock row

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Warehouses {
    Table,
    Id,
    Name,
    Location,
    CreatedAt,
    DeletedAt,
}

#[derive(Iden)]
enum Products {
    Table,
    Id,
    Name,
    Sku,
    Description,
    UnitPriceMinor,
    WarehouseId,
    Photo,
    CreatedAt,
    DeletedAt,
}

#[derive(Iden)]
enum InventoryStock {
    Table,
    Id,
    ProductId,
    WarehouseId,
    Quantity,
}

#[derive(Iden)]
enum InventoryMovements {
    Table,
    Id,
    ProductId,
    WarehouseId,
    Kind,
    Quantity,
    Remarks,
    CreatedAt,
    DeletedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Warehouses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Warehouses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Warehouses::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Warehouses::Location).string_len(255))
                    .col(
                        ColumnDef::new(Warehouses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Warehouses::DeletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Products::Sku)
                            .string_len(50)
                            .not_null()
                            .unique_key()
                            .extra("COLLATE NOCASE"),
                    )
                    .col(ColumnDef::new(Products::Description).text())
                    .col(
                        ColumnDef::new(Products::UnitPriceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Products::WarehouseId).integer())
                    .col(ColumnDef::new(Products::Photo).string_len(255))
                    .col(
                        ColumnDef::new(Products::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Products::DeletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-products-warehouse_id")
                            .from(Products::Table, Products::WarehouseId)
                            .to(Warehouses::Table, Warehouses::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InventoryStock::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryStock::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InventoryStock::ProductId).integer().not_null())
                    .col(
                        ColumnDef::new(InventoryStock::WarehouseId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryStock::Quantity)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-inventory_stock-product_id")
                            .from(InventoryStock::Table, InventoryStock::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-inventory_stock-warehouse_id")
                            .from(InventoryStock::Table, InventoryStock::WarehouseId)
                            .to(Warehouses::Table, Warehouses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-inventory_stock-product_id-warehouse_id-unique")
                    .table(InventoryStock::Table)
                    .col(InventoryStock::ProductId)
                    .col(InventoryStock::WarehouseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InventoryMovements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryMovements::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InventoryMovements::ProductId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryMovements::WarehouseId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InventoryMovements::Kind).string_len(16).not_null())
                    .col(
                        ColumnDef::new(InventoryMovements::Quantity)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InventoryMovements::Remarks).string_len(255))
                    .col(
                        ColumnDef::new(InventoryMovements::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InventoryMovements::DeletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-inventory_movements-product_id")
                            .from(InventoryMovements::Table, InventoryMovements::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-inventory_movements-warehouse_id")
                            .from(InventoryMovements::Table, InventoryMovements::WarehouseId)
                            .to(Warehouses::Table, Warehouses::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-inventory_movements-created_at")
                    .table(InventoryMovements::Table)
                    .col(InventoryMovements::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InventoryMovements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InventoryStock::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Warehouses::Table).to_owned())
            .await?;
        Ok(())
    }
}

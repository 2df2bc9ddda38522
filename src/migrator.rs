use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_users_table::Migration),
            Box::new(m20240601_000002_create_categories_table::Migration),
            Box::new(m20240601_000003_create_products_table::Migration),
            Box::new(m20240601_000004_create_cart_table::Migration),
            Box::new(m20240601_000005_create_orders_table::Migration),
            Box::new(m20240601_000006_create_order_items_table::Migration),
            Box::new(m20240601_000007_create_wishlist_table::Migration),
        ]
    }
}

mod m20240601_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(ColumnDef::new(Users::Email).string().not_null())
                        .col(ColumnDef::new(Users::Password).string().not_null())
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Emails are stored normalized, so a plain unique index is case-insensitive.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_users_email_unique")
                        .table(Users::Table)
                        .col(Users::Email)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Users {
        Table,
        Id,
        Name,
        Email,
        Password,
        CreatedAt,
    }
}

mod m20240601_000002_create_categories_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_categories_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Categories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Categories::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Categories::Name).string().not_null())
                        .col(ColumnDef::new(Categories::Slug).string().not_null())
                        .col(
                            ColumnDef::new(Categories::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Slugs are not unique: several categories may share one.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_categories_slug")
                        .table(Categories::Table)
                        .col(Categories::Slug)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Categories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Categories {
        Table,
        Id,
        Name,
        Slug,
        CreatedAt,
    }
}

mod m20240601_000003_create_products_table {
    use super::m20240601_000002_create_categories_table::Categories;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000003_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Description).text().null())
                        .col(
                            ColumnDef::new(Products::Price)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Products::OriginalPrice).decimal_len(12, 2).null())
                        .col(
                            ColumnDef::new(Products::DiscountPercent)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Products::CategoryId).uuid().null())
                        .col(
                            ColumnDef::new(Products::Stock)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::Rating)
                                .decimal_len(3, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::ReviewCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Products::Brand).string().null())
                        .col(ColumnDef::new(Products::Images).json().not_null())
                        .col(ColumnDef::new(Products::Specifications).json().not_null())
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
                                .name("fk_products_category_id")
                                .from(Products::Table, Products::CategoryId)
                                .to(Categories::Table, Categories::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_category_id")
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

    #[derive(DeriveIden)]
    pub(super) enum Products {
        Table,
        Id,
        Name,
        Description,
        Price,
        OriginalPrice,
        DiscountPercent,
        CategoryId,
        Stock,
        Rating,
        ReviewCount,
        Brand,
        Images,
        Specifications,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000004_create_cart_table {
    use super::m20240601_000001_create_users_table::Users;
    use super::m20240601_000003_create_products_table::Products;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000004_create_cart_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Cart::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Cart::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Cart::UserId).uuid().not_null())
                        .col(ColumnDef::new(Cart::ProductId).uuid().not_null())
                        .col(ColumnDef::new(Cart::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(Cart::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Cart::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_cart_user_id")
                                .from(Cart::Table, Cart::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_cart_product_id")
                                .from(Cart::Table, Cart::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            // One row per (user, product); concurrent adds collide here.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_cart_user_product_unique")
                        .table(Cart::Table)
                        .col(Cart::UserId)
                        .col(Cart::ProductId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Cart::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Cart {
        Table,
        Id,
        UserId,
        ProductId,
        Quantity,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000005_create_orders_table {
    use super::m20240601_000001_create_users_table::Users;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000005_create_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Orders::UserId).uuid().not_null())
                        .col(ColumnDef::new(Orders::OrderNumber).string().not_null())
                        .col(
                            ColumnDef::new(Orders::TotalAmount)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Orders::ShippingAddress).json().not_null())
                        .col(ColumnDef::new(Orders::Status).string().not_null())
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_user_id")
                                .from(Orders::Table, Orders::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_order_number_unique")
                        .table(Orders::Table)
                        .col(Orders::OrderNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_user_id")
                        .table(Orders::Table)
                        .col(Orders::UserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Orders {
        Table,
        Id,
        UserId,
        OrderNumber,
        TotalAmount,
        ShippingAddress,
        Status,
        CreatedAt,
    }
}

mod m20240601_000006_create_order_items_table {
    use super::m20240601_000003_create_products_table::Products;
    use super::m20240601_000005_create_orders_table::Orders;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000006_create_order_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::ProductId).uuid().null())
                        .col(ColumnDef::new(OrderItems::ProductName).string().not_null())
                        .col(
                            ColumnDef::new(OrderItems::ProductPrice)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(OrderItems::Subtotal)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order_id")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_product_id")
                                .from(OrderItems::Table, OrderItems::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_order_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum OrderItems {
        Table,
        Id,
        OrderId,
        ProductId,
        ProductName,
        ProductPrice,
        Quantity,
        Subtotal,
    }
}

mod m20240601_000007_create_wishlist_table {
    use super::m20240601_000001_create_users_table::Users;
    use super::m20240601_000003_create_products_table::Products;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000007_create_wishlist_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Wishlist::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Wishlist::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Wishlist::UserId).uuid().not_null())
                        .col(ColumnDef::new(Wishlist::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(Wishlist::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_wishlist_user_id")
                                .from(Wishlist::Table, Wishlist::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_wishlist_product_id")
                                .from(Wishlist::Table, Wishlist::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_wishlist_user_product_unique")
                        .table(Wishlist::Table)
                        .col(Wishlist::UserId)
                        .col(Wishlist::ProductId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Wishlist::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Wishlist {
        Table,
        Id,
        UserId,
        ProductId,
        CreatedAt,
    }
}

use sea_orm_migration::prelude::*;

const CREATED_AT_INDEX: &str = "idx_posts_created_at";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    Title,
    Content,
    Author,
    CreatedAt,
    UpdatedAt,
}

fn posts_table() -> TableCreateStatement {
    Table::create()
        .table(Posts::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Posts::Id)
                .uuid()
                .not_null()
                .primary_key()
                .default(Expr::cust("gen_random_uuid()")),
        )
        .col(ColumnDef::new(Posts::Title).text().not_null())
        .col(ColumnDef::new(Posts::Content).text().not_null())
        .col(ColumnDef::new(Posts::Author).text().not_null())
        .col(
            ColumnDef::new(Posts::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(Posts::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .to_owned()
}

// Serves the newest-first listing.
fn created_at_index() -> IndexCreateStatement {
    Index::create()
        .if_not_exists()
        .name(CREATED_AT_INDEX)
        .table(Posts::Table)
        .col(Posts::CreatedAt)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(posts_table()).await?;
        manager.create_index(created_at_index()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name(CREATED_AT_INDEX).table(Posts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posts_table_sql() {
        let sql = posts_table().to_string(PostgresQueryBuilder);
        assert!(sql.starts_with(r#"CREATE TABLE IF NOT EXISTS "posts""#), "{sql}");
        assert!(sql.contains(r#""author" text NOT NULL"#), "{sql}");
        assert!(sql.contains("gen_random_uuid()"), "{sql}");
        assert!(sql.contains(r#""created_at" timestamp with time zone NOT NULL"#), "{sql}");
    }

    #[test]
    fn test_created_at_index_sql() {
        let sql = created_at_index().to_string(PostgresQueryBuilder);
        assert!(sql.contains(CREATED_AT_INDEX), "{sql}");
        assert!(sql.contains(r#""created_at""#), "{sql}");
    }

    #[test]
    fn test_migration_is_registered() {
        let names: Vec<String> = crate::Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(names, vec!["m20240101_000001_create_posts_table"]);
    }
}

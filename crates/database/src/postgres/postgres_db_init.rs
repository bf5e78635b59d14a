use refinery::{AsyncMigrate, Report};

/// Embeds the migrations folder into the binary.
/// The macro does not track changes to the folder, so adding a migration may need a clean build.
mod embedded_migrations {
    use refinery::embed_migrations;
    embed_migrations!("src/postgres/migrations");
}

/// Runs the migrations in src/postgres/migrations in version order.
/// Refinery records applied versions in `refinery_schema_history` and only runs the missing ones.
pub async fn run_migrations_async<C>(conn: &'_ mut C) -> Result<Report, refinery::Error>
where
    C: AsyncMigrate + Send,
{
    embedded_migrations::migrations::runner().run_async(conn).await
}

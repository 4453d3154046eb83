//! Basic example: apply and revert a migration set against a scratch
//! database, printing each run event as JSON.

use qs_core::{DbHandle, MigrationEvent, MigrationId, MigrationRegistry, MigrationSet, SqlMigration};
use qs_db::DuckDbBackend;
use qs_engine::{Downgrade, Runner};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("example.duckdb");
    let db = DuckDbBackend::from_path(&db_path)?;

    let registry = MigrationRegistry::new()
        .register(
            SqlMigration::new(
                MigrationId::new("001_create_users"),
                "CREATE TABLE users (id INTEGER, name VARCHAR);
                 INSERT INTO users (id, name) VALUES (1, 'John Doe');",
                "DROP TABLE users",
            )
            .with_description("Create the users table"),
        )
        .register(SqlMigration::new(
            MigrationId::new("002_add_email"),
            "ALTER TABLE users ADD COLUMN email VARCHAR;
             UPDATE users SET email = 'john@example.com' WHERE id = 1;",
            "CREATE TABLE users_tmp (id INTEGER, name VARCHAR);
             INSERT INTO users_tmp SELECT id, name FROM users;
             DROP TABLE users;
             ALTER TABLE users_tmp RENAME TO users;",
        ));
    let set = MigrationSet::from_source(&registry)?;

    let runner = Runner::new(&db, set).with_event_sink(|event: &MigrationEvent| {
        println!("{}", serde_json::to_string(event).expect("events serialize"));
    });

    let report = runner.upgrade(None)?;
    println!(
        "upgrade run {}: {} migrations, outcome {}",
        report.run_id,
        report.executed.len(),
        report.outcome
    );

    for row in db.query_rows("SELECT CAST(id AS VARCHAR), name, email FROM users")? {
        println!("user: {:?}", row);
    }

    let report = runner.downgrade(Downgrade::All)?;
    println!(
        "downgrade run {}: {} migrations, outcome {}",
        report.run_id,
        report.executed.len(),
        report.outcome
    );

    let tables = db.query_rows(
        "SELECT table_name FROM information_schema.tables WHERE table_name = 'users'",
    )?;
    assert!(tables.is_empty(), "users table should be gone");
    println!("users table dropped, history empty");

    Ok(())
}

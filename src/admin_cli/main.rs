use clap::{Parser, Subcommand};
use detailing::{
    config::Config,
    database::{self, schema},
    repositories::admins,
    services::auth::hash_password,
};
use sea_orm::{ConnectionTrait, DatabaseConnection, JsonValue, Statement};
use serde_json::{Map, Value as JsonValueSerde};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, verbatim_doc_comment)]
/// Administration utility for the detailing backend.
/// Schema creation and admin seeding.
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Database maintenance.
    Db {
        #[command(subcommand)]
        db_command: DbCommand,
    },
    /// Admin accounts.
    Admin {
        #[command(subcommand)]
        admin_command: AdminCommand,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommand {
    /// Creates every missing table and unique index.
    Sync,
    /// Runs a SELECT against one table and prints the rows as JSON.
    Query {
        #[arg(short, long)]
        table: String,

        /// WHERE clause, e.g. "status_id = 1".
        #[arg(short, long)]
        filter: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// Seeds an active admin account.
    Create {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        #[arg(long, default_value = "Admin")]
        first_name: String,

        #[arg(long, default_value = "")]
        last_name: String,
    },
}

async fn get_db_connection(
    config: &Config,
) -> Result<DatabaseConnection, Box<dyn std::error::Error>> {
    let url = config
        .database_url
        .clone()
        .ok_or("DATABASE_URL must be set")?;
    Ok(database::connect_from_url(&url).await?)
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

async fn query_table(
    db: &DatabaseConnection,
    table: &str,
    filter: Option<&str>,
) -> Result<Vec<JsonValueSerde>, Box<dyn std::error::Error>> {
    if !is_identifier(table) {
        return Err(format!("Invalid table name: {}", table).into());
    }
    let mut query_str = format!("SELECT * FROM {}", table);
    if let Some(f) = filter {
        query_str.push_str(" WHERE ");
        query_str.push_str(f);
    }
    println!("Running: {}", query_str);

    let rows = db
        .query_all(Statement::from_string(db.get_database_backend(), query_str))
        .await?;

    let mut json_rows = Vec::with_capacity(rows.len());
    for row in rows {
        let mut map = Map::new();
        for col in row.column_names() {
            let value: JsonValue = row.try_get("", col.as_str()).unwrap_or(JsonValue::Null);
            map.insert(col.to_string(), value);
        }
        json_rows.push(JsonValueSerde::Object(map));
    }
    Ok(json_rows)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));
    let config = Config::from_env()?;
    let cli = Cli::parse();
    let db = get_db_connection(&config).await?;

    match &cli.command {
        Commands::Db { db_command } => match db_command {
            DbCommand::Sync => {
                schema::sync(&db).await?;
                println!("Schema is up to date.");
            }
            DbCommand::Query { table, filter } => {
                let rows = query_table(&db, table, filter.as_deref()).await?;
                println!("{}", serde_json::to_string_pretty(&rows)?);
            }
        },
        Commands::Admin { admin_command } => match admin_command {
            AdminCommand::Create {
                email,
                password,
                first_name,
                last_name,
            } => {
                let hash = hash_password(password, config.hash_salt_rounds)?;
                let admin = admins::create(&db, first_name.clone(), last_name.clone(), email, hash)
                    .await?;
                println!("Created admin {} <{}>", admin.id, admin.email);
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_are_plain_identifiers() {
        assert!(is_identifier("sms_conversations"));
        assert!(!is_identifier("customers; DROP TABLE admins"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn parses_admin_create() {
        let cli = Cli::parse_from([
            "admin-cli", "admin", "create", "--email", "a@b.co", "--password", "secret1",
        ]);
        match cli.command {
            Commands::Admin {
                admin_command: AdminCommand::Create { email, first_name, .. },
            } => {
                assert_eq!(email, "a@b.co");
                assert_eq!(first_name, "Admin");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}

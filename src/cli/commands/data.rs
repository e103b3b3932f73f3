use clap::Subcommand;
use serde_json::Value;
use std::str::FromStr;
use uuid::Uuid;

use crate::cli::{utils, OutputFormat};
use crate::client::AdminClient;
use crate::database::operations::OrderBy;
use crate::session::{FileSessionStore, SessionManager, SystemClock};
use crate::types::Table;

#[derive(Subcommand)]
pub enum DataCommands {
    #[command(about = "List all rows of a table")]
    Select {
        #[arg(help = "Table name (e.g. projects, skills)")]
        table: String,
        #[arg(long, help = "Column to order by")]
        order_by: Option<String>,
        #[arg(long, help = "Sort descending (default ascending)")]
        descending: bool,
    },

    #[command(about = "Insert one record from a JSON object")]
    Insert {
        table: String,
        #[arg(help = "Record as a JSON object")]
        data: String,
    },

    #[command(about = "Update the record with the given id")]
    Update {
        table: String,
        id: Uuid,
        #[arg(help = "Partial record as a JSON object")]
        data: String,
    },

    #[command(about = "Delete the record with the given id")]
    Delete { table: String, id: Uuid },

    #[command(about = "Insert-or-update the single record of a singleton table")]
    Upsert {
        table: String,
        #[arg(help = "Record as a JSON object")]
        data: String,
    },
}

pub async fn handle(
    cmd: DataCommands,
    server: &str,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let path = FileSessionStore::default_path()?;
    let manager = SessionManager::new(FileSessionStore::new(path), SystemClock);
    let admin = AdminClient::from_session(server, &manager)
        .map_err(|e| anyhow::anyhow!("{} (run 'portfolio auth login' first)", e))?;

    match cmd {
        DataCommands::Select {
            table,
            order_by,
            descending,
        } => {
            let table = parse_table(&table)?;
            let order = order_by.map(|column| OrderBy {
                column,
                ascending: !descending,
            });
            let data = admin.select(table, order).await?;
            utils::output_data(&output_format, &data)
        }
        DataCommands::Insert { table, data } => {
            let table = parse_table(&table)?;
            let record = parse_record(&data)?;
            let inserted = admin.insert(table, record).await?;
            utils::output_data(&output_format, &inserted)
        }
        DataCommands::Update { table, id, data } => {
            let table = parse_table(&table)?;
            let record = parse_record(&data)?;
            let updated = admin.update(table, id, record).await?;
            utils::output_data(&output_format, &updated)
        }
        DataCommands::Delete { table, id } => {
            let table = parse_table(&table)?;
            admin.delete(table, id).await?;
            utils::output_success(&output_format, &format!("Deleted {} from {}", id, table), None)
        }
        DataCommands::Upsert { table, data } => {
            let table = parse_table(&table)?;
            let record = parse_record(&data)?;
            let row = admin.upsert(table, record).await?;
            utils::output_data(&output_format, &row)
        }
    }
}

fn parse_table(name: &str) -> anyhow::Result<Table> {
    Table::from_str(name).map_err(|_| {
        anyhow::anyhow!(
            "Unknown table '{}'. Known tables: {}",
            name,
            Table::all()
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })
}

fn parse_record(data: &str) -> anyhow::Result<Value> {
    let value: Value = serde_json::from_str(data)?;
    if !value.is_object() {
        anyhow::bail!("Record payload must be a JSON object");
    }
    Ok(value)
}

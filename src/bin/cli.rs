//! Clinicdesk CLI
//!
//! Command-line client for a running Clinicdesk API:
//! - Check server status
//! - List patients, appointments and ledger entries
//! - Send payment reminders
//! - Export the ledger as CSV

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "clinicdesk")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Clinic back office: patients, appointments and khatabook")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8085", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show server status
    Status,

    /// List patients
    Patients {
        /// Search by name, contact or email
        #[arg(short, long)]
        query: Option<String>,
    },

    /// List appointments
    Appointments {
        #[arg(short, long)]
        query: Option<String>,
        /// pending, confirmed, completed, cancelled
        #[arg(short, long)]
        status: Option<String>,
    },

    /// List khatabook entries
    Transactions {
        #[arg(short, long)]
        query: Option<String>,
        /// pending, partial, completed
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Add a patient
    AddPatient {
        name: String,
        contact: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Send a WhatsApp payment reminder for one ledger entry
    Remind {
        /// Transaction id
        id: String,
    },

    /// Scan for due payments now
    RunReminders,

    /// Export the ledger as CSV
    Export {
        #[arg(short, long)]
        status: Option<String>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let api = format!("{}/api/v1", cli.api_url.trim_end_matches('/'));

    match cli.command {
        Commands::Status => {
            let response = client.get(format!("{}/health", cli.api_url)).send().await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: Value = resp.json().await?;

                    println!("Clinicdesk v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!("API Status: {}", str_field(&health, "status"));
                    println!(
                        "Storage:    {} ({})",
                        str_field(&health, "storage"),
                        str_field(&health, "backend")
                    );
                    println!("Launcher:   {}", str_field(&health, "launcher"));
                    println!(
                        "Reminders:  {}",
                        if health["reminders_enabled"].as_bool().unwrap_or(false) {
                            "on"
                        } else {
                            "off"
                        }
                    );

                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!("Uptime:     {}", format_duration(uptime));
                    }
                }
                Ok(resp) => bail!("API returned error: {}", resp.status()),
                Err(e) => {
                    eprintln!("Cannot connect to Clinicdesk API at {}", cli.api_url);
                    eprintln!();
                    eprintln!("Make sure the server is running:");
                    eprintln!("  cargo run --bin clinicdesk");
                    return Err(e.into());
                }
            }
        }

        Commands::Patients { query } => {
            let list = fetch_list(&client, &format!("{}/patients", api), query, None).await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else {
                print_rows(
                    &list,
                    &[("Name", "name", 24), ("Contact", "contact", 14), ("Email", "email", 28)],
                );
            }
        }

        Commands::Appointments { query, status } => {
            let list = fetch_list(&client, &format!("{}/appointments", api), query, status).await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else {
                print_rows(
                    &list,
                    &[
                        ("When", "appointmentDate", 18),
                        ("Patient", "patientName", 20),
                        ("Title", "title", 20),
                        ("Status", "status", 10),
                        ("Pending", "pendingAmount", 8),
                    ],
                );
            }
        }

        Commands::Transactions { query, status } => {
            let list = fetch_list(&client, &format!("{}/transactions", api), query, status).await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else {
                print_rows(
                    &list,
                    &[
                        ("Date", "date", 12),
                        ("Patient", "patientName", 20),
                        ("Amount", "amount", 10),
                        ("Type", "paymentType", 14),
                        ("Status", "status", 10),
                        ("Due", "dueDate", 12),
                    ],
                );
            }
        }

        Commands::AddPatient {
            name,
            contact,
            email,
            address,
            notes,
        } => {
            let body = serde_json::json!({
                "name": name,
                "contact": contact,
                "email": email,
                "address": address,
                "notes": notes,
            });

            let response = client
                .post(format!("{}/patients", api))
                .json(&body)
                .send()
                .await?;
            let patient = expect_success(response, "Add patient").await?;
            println!("Added {} ({})", str_field(&patient, "name"), str_field(&patient, "id"));
        }

        Commands::Remind { id } => {
            let response = client
                .post(format!("{}/transactions/{}/remind", api, id))
                .send()
                .await?;
            let message = expect_success(response, "Reminder").await?;
            println!(
                "Reminder to {} ({}): {}",
                str_field(&message, "recipient"),
                str_field(&message, "phone"),
                str_field(&message["status"], "state")
            );
        }

        Commands::RunReminders => {
            let response = client
                .post(format!("{}/reminders/run", api))
                .send()
                .await?;
            let report = expect_success(response, "Reminder run").await?;

            let count = |key: &str| report[key].as_array().map_or(0, Vec::len);
            println!("Due:     {}", report["due"].as_u64().unwrap_or(0));
            println!("Sent:    {}", count("sent"));
            println!("Skipped: {}", count("skipped"));
            println!("Failed:  {}", count("failed"));
        }

        Commands::Export { status, output } => {
            let mut request = client.get(format!("{}/transactions/export", api));
            if let Some(status) = &status {
                request = request.query(&[("status", status)]);
            }

            let response = request.send().await?;
            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                bail!("Export failed ({}): {}", status, text);
            }
            let csv = response.text().await?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &csv)
                        .with_context(|| format!("writing {:?}", path))?;
                    println!("Exported {} entries to {:?}", csv.lines().count().saturating_sub(1), path);
                }
                None => print!("{}", csv),
            }
        }

        Commands::Config { output } => {
            let config = clinicdesk::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", config),
            }
        }
    }

    Ok(())
}

async fn fetch_list(
    client: &reqwest::Client,
    url: &str,
    query: Option<String>,
    status: Option<String>,
) -> anyhow::Result<Value> {
    let mut params = Vec::new();
    if let Some(q) = query {
        params.push(("q", q));
    }
    if let Some(s) = status {
        params.push(("status", s));
    }

    let response = client.get(url).query(&params).send().await?;
    expect_success(response, "Request").await
}

async fn expect_success(response: reqwest::Response, what: &str) -> anyhow::Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let body: Value = response.json().await.unwrap_or(Value::Null);
        let message = body["error"]["message"].as_str().unwrap_or("unknown error");
        bail!("{} failed ({}): {}", what, status, message);
    }
    Ok(response.json().await?)
}

fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value[key].as_str().unwrap_or("-")
}

fn print_rows(list: &Value, columns: &[(&str, &str, usize)]) {
    let items = list["items"].as_array().cloned().unwrap_or_default();
    if items.is_empty() {
        println!("No entries.");
        return;
    }

    let header: String = columns
        .iter()
        .map(|(title, _, width)| format!("{:<width$} ", title, width = width))
        .collect();
    println!("{}", header.trim_end());
    println!("{}", "-".repeat(header.len()));

    for item in &items {
        let row: String = columns
            .iter()
            .map(|(_, key, width)| {
                let cell = match &item[*key] {
                    Value::String(s) => s.clone(),
                    Value::Null => "-".to_string(),
                    other => other.to_string(),
                };
                format!("{:<width$} ", truncate(&cell, *width), width = width)
            })
            .collect();
        println!("{}", row.trim_end());
    }

    println!();
    println!("{} total", list["total"].as_u64().unwrap_or(items.len() as u64));
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('~');
        out
    }
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

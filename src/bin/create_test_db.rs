use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::sync::{Arc, Mutex};

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, macros::date};

use ledger_rs::{
    initialize_db,
    models::{NewEntry, NewExpense},
    stores::{
        EntryStore, ExpenseStore,
        sqlite::{SQLiteEntryStore, SQLiteExpenseStore},
    },
};

/// A utility for creating a test database for the REST API server of ledger_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// How many days of entries to create, ending on the last day of February 2024.
    #[arg(long, default_value_t = 60)]
    days: u16,
}

const METHODS: [&str; 3] = ["cash", "card", "transfer"];
const EXPENSE_DESCRIPTIONS: [&str; 4] = ["Coffee", "Groceries", "Bus fare", "Lunch"];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let conn = Arc::new(Mutex::new(conn));
    let entry_store = SQLiteEntryStore::new(conn.clone());
    let expense_store = SQLiteExpenseStore::new(conn);

    println!("Creating {} days of entries and expenses...", args.days);

    let last_day = date!(2024 - 02 - 29);
    let days = i64::from(args.days);
    let mut new_entries = Vec::new();
    let mut new_expenses = Vec::new();

    for offset in 0..days {
        let ymd = last_day - Duration::days(days - 1 - offset);
        let method = METHODS[offset as usize % METHODS.len()];
        let outflow = 10.0 + (offset % 7) as f64 * 3.5;

        new_entries.push(NewEntry {
            ymd,
            description: format!("Spending on {ymd}"),
            tags: "daily".to_owned(),
            method: method.to_owned(),
            inflow: if ymd.day() == 1 { 2500.0 } else { 0.0 },
            outflow,
        });

        new_expenses.push(sample_expense(ymd, offset, method, outflow));
    }

    let entries = entry_store.create_many(new_entries)?;

    // Link every other expense to the entry for the same day.
    let new_expenses = new_expenses
        .into_iter()
        .zip(entries.iter())
        .enumerate()
        .map(|(i, (expense, entry))| {
            if i % 2 == 0 {
                expense.entry_id(Some(entry.id))
            } else {
                expense
            }
        })
        .collect();
    let expenses = expense_store.create_many(new_expenses)?;

    let unassigned = expenses.iter().filter(|expense| expense.is_unassigned()).count();
    println!(
        "Created {} entries and {} expenses ({unassigned} unassigned).",
        entries.len(),
        expenses.len()
    );
    println!("Success!");

    Ok(())
}

fn sample_expense(ymd: Date, offset: i64, method: &str, outflow: f64) -> NewExpense {
    let description = EXPENSE_DESCRIPTIONS[offset as usize % EXPENSE_DESCRIPTIONS.len()];

    NewExpense {
        ymd,
        description: description.to_owned(),
        tags: vec![description.to_lowercase(), "sample".to_owned()],
        method: method.to_owned(),
        inflow: 0.0,
        outflow,
        entry_id: None,
    }
}

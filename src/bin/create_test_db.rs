use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Date, Duration, OffsetDateTime};

use fintrack::{
    Amount, Category, Email, NewExpense, PasswordHash, ValidatedPassword, create_expense,
    create_user, initialize_db,
};

/// A utility for creating a test database for the FinTrack server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const DEMO_EMAIL: &str = "demo@example.com";
const DEMO_PASSWORD: &str = "demo-password-1234";

/// Recurring expenses as (category, cents, day of month, description).
const MONTHLY_EXPENSES: [(Category, i64, u8, &str); 4] = [
    (Category::Housing, 120_000, 1, "Rent"),
    (Category::Utilities, 14_550, 5, "Power and internet"),
    (Category::Healthcare, 4_500, 12, "Pharmacy"),
    (Category::Education, 2_999, 20, "Online course"),
];

/// Weekly expenses as (category, cents, description).
const WEEKLY_EXPENSES: [(Category, i64, &str); 3] = [
    (Category::Food, 8_540, "Groceries"),
    (Category::Transportation, 3_000, "Bus pass top up"),
    (Category::Entertainment, 1_850, ""),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating demo user {DEMO_EMAIL}...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(DEMO_PASSWORD),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user("Demo User", &Email::new(DEMO_EMAIL)?, password_hash, &conn)?;

    println!("Creating a year of expenses...");

    let today = OffsetDateTime::now_utc().date();
    let start = today - Duration::days(365);
    let mut count = 0;

    for (category, cents, description, date) in sample_expenses(start, today) {
        let expense = NewExpense::new(
            category,
            Amount::new(Decimal::new(cents, 2))?,
            date,
            Some(description.to_owned()),
        );
        create_expense(user.id, &expense, &conn)?;
        count += 1;
    }

    println!("Created {count} expenses.");
    println!("Log in with {DEMO_EMAIL} and the password \"{DEMO_PASSWORD}\".");
    println!("Success!");

    Ok(())
}

/// Every sample expense dated from `start` to `end` inclusive.
fn sample_expenses(start: Date, end: Date) -> Vec<(Category, i64, &'static str, Date)> {
    let mut expenses = Vec::new();
    let mut date = start;
    let mut week = 0;

    while date <= end {
        for (category, cents, day, description) in MONTHLY_EXPENSES {
            if date.day() == day {
                expenses.push((category, cents, description, date));
            }
        }

        if date.weekday() == time::Weekday::Saturday {
            for (offset, (category, cents, description)) in WEEKLY_EXPENSES.into_iter().enumerate()
            {
                // Vary the amounts a little from week to week.
                let cents = cents + ((week + offset as i64) % 5) * 125;
                expenses.push((category, cents, description, date));
            }

            if week % 3 == 0 {
                expenses.push((Category::Shopping, 6_499 + week * 10, "Clothes", date));
            }
            if week % 4 == 1 {
                expenses.push((Category::Other, 2_000, "Gift", date));
            }

            week += 1;
        }

        date += Duration::days(1);
    }

    expenses
}

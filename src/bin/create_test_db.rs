use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::str::FromStr;

use clap::Parser;
use email_address::EmailAddress;
use rusqlite::Connection;

use fintrack_rs::{
    CurrencyCode, NewUser, PasswordHash, ValidatedPassword, create_user, initialize_db,
    update_currency,
};

const DEMO_EMAIL: &str = "demo@fintrack.local";
const DEMO_PASSWORD: &str = "password123";

/// A utility for creating a test database for the REST API server of fintrack_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

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
    let mut conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating demo user {DEMO_EMAIL}...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new(DEMO_PASSWORD)?,
        PasswordHash::DEFAULT_COST,
    )?;

    let user = create_user(
        NewUser {
            email: EmailAddress::from_str(DEMO_EMAIL)?,
            display_name: Some("Demo".to_owned()),
            password_hash,
        },
        &conn,
    )?;
    update_currency(user.id, CurrencyCode::Usd, &mut conn)?;

    println!("Success! Log in with {DEMO_EMAIL} / {DEMO_PASSWORD}");

    Ok(())
}

#![allow(clippy::doc_markdown, clippy::uninlined_format_args)]
//! Example: log in, list mailboxes and print STATUS for each one.
//!
//! ## Running
//!
//! ```bash
//! cargo run --package relaymail-imap --example mailbox_status -- imap.example.com
//! ```
//!
//! The username and password are read from stdin.

use std::io::{self, Write};

use relaymail_imap::command::StatusAttribute;
use relaymail_imap::{Command, Config, Connection, ResponseMapper, TypedResult};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let host = std::env::args()
        .nth(1)
        .ok_or("usage: mailbox_status <host>")?;

    print!("Username: ");
    io::stdout().flush()?;
    let mut username = String::new();
    io::stdin().read_line(&mut username)?;

    print!("Password: ");
    io::stdout().flush()?;
    let mut password = String::new();
    io::stdin().read_line(&mut password)?;

    println!("\nConnecting to {}:993...", host);
    let connection = Connection::connect(&Config::new(host)).await?;
    let session = connection.session();
    println!("✓ Connected");

    let login = session
        .execute(Command::login(username.trim(), password.trim()))?
        .wait()
        .await?;
    if !login.is_ok() {
        return Err("login rejected".into());
    }
    println!("✓ Authenticated\n");

    let listed = session.execute(Command::list("", "*"))?.wait().await?;
    let TypedResult::List(list) = ResponseMapper::map(&listed)? else {
        return Err("unexpected LIST result".into());
    };

    for entry in list.mailboxes {
        let status = Command::Status {
            mailbox: entry.mailbox.clone(),
            items: vec![StatusAttribute::Messages, StatusAttribute::Unseen],
        };
        let response = session.execute(status)?.wait().await?;
        match ResponseMapper::map(&response) {
            Ok(TypedResult::Status(info)) => println!(
                "  {:<30} {:>6} messages {:>6} unseen",
                entry.mailbox.to_string(),
                info.messages.unwrap_or_default(),
                info.unseen.unwrap_or_default()
            ),
            _ => println!("  {:<30} (no status)", entry.mailbox.to_string()),
        }
    }

    session.execute(Command::Logout)?.wait().await?;
    session.close().wait().await?;
    println!("\n✓ Disconnected");
    Ok(())
}

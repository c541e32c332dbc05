use clap::Parser;
use creo_kiosk::application::engine::KioskEngine;
use creo_kiosk::application::feedback::{Feedback, Severity};
use creo_kiosk::domain::ports::AuthorityBox;
use creo_kiosk::error::BankError;
use creo_kiosk::infrastructure::http::HttpAuthority;
use creo_kiosk::infrastructure::in_memory::InMemoryAuthority;
use miette::{IntoDiagnostic, Result};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the transaction authority
    #[arg(long, default_value = "http://localhost:8000")]
    base_url: String,

    /// Run against a seeded in-memory authority instead of a live server
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let authority: AuthorityBox = if cli.offline {
        Box::new(InMemoryAuthority::seeded())
    } else {
        Box::new(HttpAuthority::new(cli.base_url))
    };
    let mut engine = KioskEngine::new(authority);

    println!("Creo Kiosk. Type 'help' for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().into_diagnostic()?;
        let Some(line) = lines.next_line().await.into_diagnostic()? else {
            break;
        };
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [] => {}
            ["quit" | "exit"] => break,
            ["help"] => print_help(),
            ["login", location, card, pin] => {
                render(engine.login(location, card, pin).await);
            }
            ["logout"] => render_feedback(&engine.logout()),
            ["withdraw", amount] => match amount.parse() {
                Ok(amount) => render(engine.withdraw(amount).await),
                Err(_) => println!("[error] amount must be a whole number of CKB"),
            },
            ["deposit", amount] => match amount.parse() {
                Ok(amount) => render(engine.deposit(amount).await),
                Err(_) => println!("[error] amount must be a whole number of CKB"),
            },
            ["reset-pin", new_pin, confirm] => {
                render(engine.reset_pin(new_pin, confirm).await);
            }
            ["reset-atm-pin", new_pin, confirm] => {
                render(engine.reset_atm_pin(new_pin, confirm).await);
            }
            ["directory"] => {
                render(engine.refresh_directory().await);
                print_directory(&engine);
            }
            ["logs"] => {
                render(engine.refresh_atm_logs().await);
                print_logs(&engine);
            }
            ["session"] => print_session(&engine),
            _ => println!("[error] unrecognized command; type 'help'"),
        }
    }

    Ok(())
}

fn render(result: std::result::Result<Feedback, BankError>) {
    match result {
        Ok(feedback) => render_feedback(&feedback),
        Err(err) => render_feedback(&Feedback::from(&err)),
    }
}

fn render_feedback(feedback: &Feedback) {
    let tag = match feedback.severity {
        Severity::Success => "ok",
        Severity::Info => "info",
        Severity::Error => "error",
    };
    println!("[{tag}] {}", feedback.message);
}

fn print_session(engine: &KioskEngine) {
    let session = engine.session();
    if let Some(customer) = session.customer() {
        println!(
            "customer {} ({}) balance {} CKB at ATM {}",
            customer.name,
            customer.card_name,
            customer.balance,
            session.atm_of_operation().unwrap_or_default()
        );
    } else if let Some(atm) = session.admin_atm() {
        println!("admin at {} (cash {} CKB)", atm.location, atm.current_cash);
    } else {
        println!("not logged in");
    }
}

fn print_directory(engine: &KioskEngine) {
    for atm in &engine.directory().atms {
        println!("  atm {:>3}  {:<12} {:>6} CKB", atm.id, atm.location, atm.current_cash);
    }
    for customer in &engine.directory().customers {
        println!(
            "  card {:>2}  {:<16} {:<10} {:>4} CKB  {:?}",
            customer.id, customer.name, customer.card_name, customer.balance, customer.status
        );
    }
}

fn print_logs(engine: &KioskEngine) {
    for entry in engine.atm_logs() {
        println!(
            "  {}  customer {:>3}  -{:>3} CKB  balance {:>4}  atm cash {:>5}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.customer_id,
            entry.amount_withdrawn,
            entry.customer_total_balance,
            entry.atm_current_cash
        );
    }
}

fn print_help() {
    println!("  login <location> <card> <pin>    open a customer or admin session");
    println!("  logout                           end the session");
    println!("  withdraw <amount>                withdraw CKB (customer)");
    println!("  deposit <amount>                 deposit CKB (customer)");
    println!("  reset-pin <new> <confirm>        reset your PIN (customer)");
    println!("  reset-atm-pin <new> <confirm>    reset this ATM's PIN (admin)");
    println!("  directory                        refresh and list customers and ATMs");
    println!("  logs                             refresh this ATM's ledger (admin)");
    println!("  session                          show the active session");
    println!("  quit                             exit");
}

//! Operator commands: bootstrap an admin, seed demo data

use std::sync::Arc;

use anyhow::Context;
use api::{DatabaseConfig, config, connect_database};
use auth::application::{AdminUseCase, RegisterInput, RegisterUseCase};
use auth::{AuthConfig, PgAuthRepository};
use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use kernel::id::UserId;
use rand::Rng;
use rand::seq::IndexedRandom;
use tickets::domain::{AuditStamp, Ticket, TicketStatus, TicketText};
use tickets::{PgTicketRepository, TicketRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEMO_PASSWORD: &str = "demo-pass-123";

const FIRST_NAMES: &[&str] = &["Olena", "Taras", "Iryna", "Andrii", "Maria", "Petro"];
const LAST_NAMES: &[&str] = &["Shevchenko", "Kovalenko", "Bondarenko", "Tkachenko"];
const TICKET_TEXTS: &[&str] = &[
    "The street light outside my building has been off for a week.",
    "There is a deep pothole at the crossroads near the school.",
    "Garbage has not been collected in our yard since Monday.",
    "The playground swing is broken and unsafe for children.",
    "Hot water is missing in the whole building.",
    "A fallen tree is blocking the pedestrian path in the park.",
];
const STAFF_COMMENTS: &[&str] = &[
    "Crew dispatched.",
    "Forwarded to the utility provider.",
    "Fixed on site.",
    "Duplicate of an earlier request.",
    "Outside of our responsibility.",
];

#[derive(Parser)]
#[command(name = "manage", version, about = "Ticket service operator commands")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an ADMIN account
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ADMIN_PASSWORD")]
        password: String,
    },
    /// Fill the database with citizens, staff and tickets
    SeedDemo {
        #[arg(long, default_value_t = 20)]
        users: usize,
        #[arg(long, default_value_t = 5)]
        staff: usize,
        #[arg(long, default_value_t = 550)]
        tickets: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "manage=info,auth=info,tickets=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let pool = connect_database(&DatabaseConfig::from_env()?).await?;
    // Only the pepper matters here; no tokens are issued
    let auth_config = Arc::new(config::auth_config(
        &|key: &str| std::env::var(key).ok(),
        false,
    )?);
    let users = Arc::new(PgAuthRepository::new(pool.clone()));
    let tickets = Arc::new(PgTicketRepository::new(pool));

    match cli.command {
        Command::CreateAdmin { email, password } => {
            let admin = AdminUseCase::new(users, auth_config)
                .create_admin(email, password)
                .await?;
            println!("Created admin {} ({})", admin.email, admin.id);
        }
        Command::SeedDemo {
            users: user_count,
            staff: staff_count,
            tickets: ticket_count,
        } => {
            let seed = Seed {
                users,
                tickets,
                config: auth_config,
            };
            seed.run(user_count, staff_count, ticket_count).await?;
        }
    }

    Ok(())
}

struct Seed {
    users: Arc<PgAuthRepository>,
    tickets: Arc<PgTicketRepository>,
    config: Arc<AuthConfig>,
}

impl Seed {
    async fn run(&self, user_count: usize, staff_count: usize, ticket_count: usize) -> anyhow::Result<()> {
        // Keeps emails unique across repeated runs
        let batch: u32 = rand::rng().random();

        let register = RegisterUseCase::new(self.users.clone(), self.config.clone());
        let mut owners = Vec::with_capacity(user_count);
        for i in 0..user_count {
            let output = register.execute(citizen(batch, i)?).await?;
            owners.push(output.user_id);
        }

        let admin = AdminUseCase::new(self.users.clone(), self.config.clone());
        let mut staff = Vec::with_capacity(staff_count);
        for i in 0..staff_count {
            let email = format!("staff{i}.{batch:08x}@demo.local");
            staff.push(admin.create_staff(email, DEMO_PASSWORD.into()).await?.id);
        }

        let demo_tickets = if ticket_count == 0 {
            Vec::new()
        } else {
            anyhow::ensure!(
                !owners.is_empty() && !staff.is_empty(),
                "tickets need at least one citizen and one staff member"
            );
            demo_tickets(&owners, &staff, ticket_count)?
        };
        let inserted = self.tickets.bulk_create(&demo_tickets).await?;

        println!(
            "Seeded {} citizens, {} staff, {} tickets (password: {DEMO_PASSWORD})",
            owners.len(),
            staff.len(),
            inserted
        );

        Ok(())
    }
}

fn citizen(batch: u32, index: usize) -> anyhow::Result<RegisterInput> {
    let mut rng = rand::rng();

    let birth_date = NaiveDate::from_ymd_opt(
        rng.random_range(1950..2005),
        rng.random_range(1..=12),
        rng.random_range(1..=28),
    )
    .context("invalid birth date")?;

    Ok(RegisterInput {
        email: format!("citizen{index}.{batch:08x}@demo.local"),
        password: DEMO_PASSWORD.into(),
        inn: format!("{:010}", rng.random_range(0..10_000_000_000u64)),
        phone: format!("+380{:09}", rng.random_range(0..1_000_000_000u64)),
        first_name: pick(&mut rng, FIRST_NAMES).into(),
        last_name: pick(&mut rng, LAST_NAMES).into(),
        middle_name: None,
        birth_date,
    })
}

/// Roughly 6:2:2:1 across NEW, IN_PROGRESS, RESOLVED and REJECTED, spread
/// over the last 30 days
fn demo_tickets(owners: &[UserId], staff: &[UserId], count: usize) -> anyhow::Result<Vec<Ticket>> {
    let mut rng = rand::rng();
    let now = Utc::now();

    (0..count)
        .map(|_| {
            let owner = *owners.choose(&mut rng).context("no owners")?;
            let mut ticket = Ticket::new(owner, TicketText::new(pick(&mut rng, TICKET_TEXTS))?);

            let age = rng.random_range(0..30 * 24 * 60);
            ticket.created_at = now - Duration::minutes(age);
            ticket.updated_at = ticket.created_at;

            ticket.status = match rng.random_range(0..11) {
                0..=5 => TicketStatus::New,
                6 | 7 => TicketStatus::InProgress,
                8 | 9 => TicketStatus::Resolved,
                _ => TicketStatus::Rejected,
            };

            if ticket.status != TicketStatus::New {
                let by = *staff.choose(&mut rng).context("no staff")?;
                let at = ticket.created_at + Duration::minutes(rng.random_range(0..=age));
                ticket.staff_assignee_id = Some(by);
                ticket.staff_comment = Some(pick(&mut rng, STAFF_COMMENTS).into());
                ticket.last_modified = Some(AuditStamp { by, at });
                ticket.updated_at = at;
            }

            Ok(ticket)
        })
        .collect()
}

fn pick(rng: &mut impl Rng, options: &[&'static str]) -> &'static str {
    options.choose(rng).copied().unwrap_or_default()
}

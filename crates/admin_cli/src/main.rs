use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{Engine, NewUserCmd, RoleCmd};
use migration::MigratorTrait;
use sea_orm::Database;

mod prompt;

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "stockdesk_admin")]
#[command(about = "Admin utilities for stockdesk (bootstrap roles and users)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./stockdesk.db?mode=rwc"
    )]
    database_url: String,

    /// Bcrypt work factor for passwords set by this tool.
    #[arg(long, env = "STOCKDESK__SECURITY__BCRYPT_COST", default_value_t = 12)]
    bcrypt_cost: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Role(Role),
    User(User),
}

#[derive(Args, Debug)]
struct Role {
    #[command(subcommand)]
    command: RoleCommand,
}

#[derive(Subcommand, Debug)]
enum RoleCommand {
    Create(RoleCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct RoleCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    group: Option<String>,
    /// Mark the role as automatically assigned.
    #[arg(long)]
    auto: bool,
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
    /// Replace a user's password hash.
    Passwd(UserPasswdArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    /// Primary role; `0` picks the default role.
    #[arg(long, default_value_t = 0)]
    role_id: i32,
    #[arg(long)]
    email: String,
    #[arg(long)]
    admin: bool,
}

#[derive(Args, Debug)]
struct UserPasswdArgs {
    #[arg(long)]
    username: String,
}

async fn connect_engine(cli: &Cli) -> CliResult<Engine> {
    let db = Database::connect(&cli.database_url).await?;
    migration::Migrator::up(&db, None).await?;
    let engine = Engine::builder()
        .database(db)
        .bcrypt_cost(cli.bcrypt_cost)
        .build()
        .await?;
    Ok(engine)
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();
    let engine = connect_engine(&cli).await?;

    match cli.command {
        Command::Role(Role {
            command: RoleCommand::Create(args),
        }) => {
            let mut cmd = RoleCmd::new(args.name).auto_assigned(args.auto);
            if let Some(group) = args.group {
                cmd = cmd.group(group);
            }
            let role = engine.new_role(cmd).await?;
            println!("created role: {} ({}) in {}", role.name, role.id, role.group);
        }
        Command::Role(Role {
            command: RoleCommand::List,
        }) => {
            for role in engine.roles().await? {
                println!(
                    "{:>4}  {:<20} {:<20} {}",
                    role.id,
                    role.name,
                    role.group,
                    role.users.join(", ")
                );
            }
        }
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt::new_password()?;
            let cmd = NewUserCmd::new(args.username.clone(), password, args.email)
                .role_id(args.role_id)
                .admin(args.admin);
            let id = engine.new_user(cmd).await?;
            println!("created user: {} ({id})", args.username);
        }
        Command::User(User {
            command: UserCommand::Passwd(args),
        }) => {
            let password = prompt::new_password()?;
            engine.rehash_password(&args.username, &password).await?;
            println!("password updated for: {}", args.username);
        }
    }

    Ok(())
}

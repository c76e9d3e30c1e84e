use clap::{Parser, Subcommand};
use manage::{AdminAccount, create_admin, migrate};
use store::Store;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "manage", about = "Operator tasks for the food backend")]
struct Args {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://food.db")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations
    Migrate,
    /// Create an Admin account
    CreateAdmin {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "ADMIN_PASSWORD")]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    info!("Connecting to {}", args.database_url);
    let store = Store::connect(&args.database_url, 1).await?;

    match args.command {
        Command::Migrate => migrate(&store).await?,
        Command::CreateAdmin {
            name,
            email,
            password,
        } => {
            migrate(&store).await?;
            create_admin(
                &store,
                AdminAccount {
                    name,
                    email,
                    password,
                },
            )
            .await?;
        }
    }

    Ok(())
}

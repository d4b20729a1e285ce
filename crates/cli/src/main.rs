//! NissaHub CLI - Cart inspection and marketplace actions.
//!
//! # Usage
//!
//! ```bash
//! # Add a product to the persisted cart
//! nissahub cart add --id p1 --name Widget --price 19.99 --image /i.png
//!
//! # Show the cart and its totals
//! nissahub cart list
//!
//! # Render the cart items fragment as HTML
//! nissahub cart render-cart
//!
//! # Start a discussion thread on a course
//! nissahub discussion post --skill s1 "When does the next session start?"
//!
//! # Exchange an ID token for a marketplace session
//! NISSAHUB_ID_TOKEN=... nissahub auth login
//!
//! # Act as a logged-in user (session lasts for this one command)
//! nissahub --id-token "$TOKEN" review delete --skill s1 --review r9
//! ```
//!
//! # Commands
//!
//! - `cart` - Inspect and mutate the file-backed cart
//! - `discussion` - Create and delete discussion posts and replies
//! - `review delete` - Delete a course review
//! - `auth` - Log in to or out of the marketplace

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use secrecy::SecretString;

mod commands;

#[derive(Parser)]
#[command(name = "nissahub")]
#[command(author, version, about = "NissaHub CLI tools")]
struct Cli {
    /// ID token used to open a marketplace session before the command runs
    #[arg(long, global = true, env = "NISSAHUB_ID_TOKEN", hide_env_values = true)]
    id_token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and mutate the persisted cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage course discussion threads
    Discussion {
        #[command(subcommand)]
        action: DiscussionAction,
    },
    /// Manage course reviews
    Review {
        #[command(subcommand)]
        action: ReviewAction,
    },
    /// Marketplace session management
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a product (no-op if it is already in the cart)
    Add {
        /// Product id
        #[arg(long)]
        id: String,

        /// Product display name
        #[arg(long)]
        name: String,

        /// Unit price in MAD, e.g. `19.99`
        #[arg(long)]
        price: String,

        /// Product image URL
        #[arg(long, default_value = "")]
        image: String,
    },
    /// Remove a product by id
    Remove {
        /// Product id
        id: String,
    },
    /// List cart items and totals
    List,
    /// Print the item count shown in the header badge
    Count,
    /// Empty the cart without placing an order
    Clear,
    /// Render the cart items fragment as HTML
    RenderCart,
    /// Render the checkout summary as HTML
    RenderCheckout,
}

#[derive(Subcommand)]
enum DiscussionAction {
    /// Start a new thread
    Post {
        /// Course (skill) id
        #[arg(long)]
        skill: String,

        /// Post content
        content: String,
    },
    /// Reply to a thread
    Reply {
        #[arg(long)]
        skill: String,

        #[arg(long)]
        post: String,

        /// Reply content
        content: String,
    },
    /// Delete a thread and its replies
    DeletePost {
        #[arg(long)]
        skill: String,

        #[arg(long)]
        post: String,
    },
    /// Delete a single reply
    DeleteReply {
        #[arg(long)]
        skill: String,

        #[arg(long)]
        post: String,

        #[arg(long)]
        reply: String,
    },
}

#[derive(Subcommand)]
enum ReviewAction {
    /// Delete a course review
    Delete {
        #[arg(long)]
        skill: String,

        #[arg(long)]
        review: String,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Exchange the `--id-token` for a session and print the redirect
    Login,
    /// End the current session
    Logout,
}

#[tokio::main]
async fn main() {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nissahub=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let id_token = cli.id_token.map(SecretString::from);
    let session = || commands::marketplace::Session::connect(id_token.as_ref());

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Add {
                id,
                name,
                price,
                image,
            } => commands::cart::add(&id, name, &price, image)?,
            CartAction::Remove { id } => commands::cart::remove(&id)?,
            CartAction::List => commands::cart::list()?,
            CartAction::Count => commands::cart::count()?,
            CartAction::Clear => commands::cart::clear()?,
            CartAction::RenderCart => commands::cart::render_cart()?,
            CartAction::RenderCheckout => commands::cart::render_checkout()?,
        },
        Commands::Discussion { action } => match action {
            DiscussionAction::Post { skill, content } => {
                session().await?.create_post(&skill, &content).await?;
            }
            DiscussionAction::Reply {
                skill,
                post,
                content,
            } => session().await?.create_reply(&skill, &post, &content).await?,
            DiscussionAction::DeletePost { skill, post } => {
                session().await?.delete_post(&skill, &post).await?;
            }
            DiscussionAction::DeleteReply { skill, post, reply } => {
                session().await?.delete_reply(&skill, &post, &reply).await?;
            }
        },
        Commands::Review { action } => match action {
            ReviewAction::Delete { skill, review } => {
                session().await?.delete_review(&skill, &review).await?;
            }
        },
        Commands::Auth { action } => match action {
            AuthAction::Login => {
                let token = id_token
                    .as_ref()
                    .ok_or(commands::marketplace::CommandError::MissingIdToken)?;
                commands::marketplace::login(token).await?;
            }
            AuthAction::Logout => session().await?.logout().await?,
        },
    }
    Ok(())
}

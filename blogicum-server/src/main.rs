use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::sync::Arc;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
#[cfg(test)]
mod test_support;

use application::{AuthService, BlogService, CatalogService};
use data::{
    catalog_repository::{PostgresCategoryRepository, PostgresLocationRepository},
    comment_repository::PostgresCommentRepository,
    post_repository::PostgresPostRepository,
    user_repository::PostgresUserRepository,
};
use domain::catalog::{NewCategory, NewLocation};
use infrastructure::{
    config::ServerConfig,
    database::{create_pool, run_migrations},
    jwt::JwtService,
    logging::init_logging,
};
use presentation::routes;

#[derive(Parser)]
#[command(author, version, about = "Blogicum server and management commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,

    #[command(subcommand)]
    Category(CategoryCommand),

    #[command(subcommand)]
    Location(LocationCommand),

    #[command(subcommand)]
    User(UserCommand),
}

#[derive(Subcommand)]
enum CategoryCommand {
    Add {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        slug: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Create the category unpublished
        #[arg(long)]
        hidden: bool,
    },
    Publish {
        slug: String,
    },
    Hide {
        slug: String,
    },
    Remove {
        slug: String,
    },
    List,
}

#[derive(Subcommand)]
enum LocationCommand {
    Add {
        #[arg(short, long)]
        name: String,

        #[arg(long)]
        hidden: bool,
    },
    Remove {
        id: i64,
    },
    List,
}

#[derive(Subcommand)]
enum UserCommand {
    /// Delete a user together with their posts and comments
    Remove { username: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    init_logging();

    let cli = Cli::parse();
    let config = ServerConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = create_pool(&config).await?;

    tracing::info!("Running database migrations...");
    run_migrations(&pool).await?;
    tracing::info!("Migrations completed successfully");

    // Repositories
    let user_repo = Arc::new(PostgresUserRepository::new(pool.clone()));
    let post_repo = Arc::new(PostgresPostRepository::new(pool.clone()));
    let comment_repo = Arc::new(PostgresCommentRepository::new(pool.clone()));
    let category_repo = Arc::new(PostgresCategoryRepository::new(pool.clone()));
    let location_repo = Arc::new(PostgresLocationRepository::new(pool.clone()));

    let jwt_service = Arc::new(JwtService::new(&config.jwt_secret, config.token_ttl_hours)?);
    let auth_service = Arc::new(AuthService::new(user_repo.clone(), jwt_service.clone()));

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let blog_service = Arc::new(BlogService::new(
                post_repo,
                comment_repo,
                category_repo,
                location_repo,
                user_repo,
            ));
            run_http_server(config.http_addr(), auth_service, blog_service, jwt_service).await
        }
        Commands::Category(command) => {
            let catalog = CatalogService::new(category_repo, location_repo);
            run_category_command(&catalog, command).await
        }
        Commands::Location(command) => {
            let catalog = CatalogService::new(category_repo, location_repo);
            run_location_command(&catalog, command).await
        }
        Commands::User(UserCommand::Remove { username }) => {
            auth_service.remove_user(&username).await?;
            println!("Removed user {}", username);
            Ok(())
        }
    }
}

async fn run_category_command(
    catalog: &CatalogService,
    command: CategoryCommand,
) -> anyhow::Result<()> {
    match command {
        CategoryCommand::Add {
            title,
            slug,
            description,
            hidden,
        } => {
            let category = catalog
                .add_category(NewCategory {
                    title,
                    description,
                    slug,
                    is_published: !hidden,
                })
                .await?;
            println!("Created category {} ({})", category.slug, category.url());
        }
        CategoryCommand::Publish { slug } => {
            catalog.set_category_published(&slug, true).await?;
            println!("Published category {}", slug);
        }
        CategoryCommand::Hide { slug } => {
            catalog.set_category_published(&slug, false).await?;
            println!("Hid category {}", slug);
        }
        CategoryCommand::Remove { slug } => {
            catalog.remove_category(&slug).await?;
            println!("Removed category {}", slug);
        }
        CategoryCommand::List => {
            for category in catalog.categories().await? {
                println!(
                    "{:>4}  {:<24} {:<32} {}",
                    category.id,
                    category.slug,
                    category.title,
                    if category.published.is_published {
                        "published"
                    } else {
                        "hidden"
                    }
                );
            }
        }
    }
    Ok(())
}

async fn run_location_command(
    catalog: &CatalogService,
    command: LocationCommand,
) -> anyhow::Result<()> {
    match command {
        LocationCommand::Add { name, hidden } => {
            let location = catalog
                .add_location(NewLocation {
                    name,
                    is_published: !hidden,
                })
                .await?;
            println!("Created location {} ({})", location.id, location.name);
        }
        LocationCommand::Remove { id } => {
            catalog.remove_location(id).await?;
            println!("Removed location {}", id);
        }
        LocationCommand::List => {
            for location in catalog.locations().await? {
                println!(
                    "{:>4}  {:<32} {}",
                    location.id,
                    location.name,
                    if location.published.is_published {
                        "published"
                    } else {
                        "hidden"
                    }
                );
            }
        }
    }
    Ok(())
}

async fn run_http_server(
    addr: String,
    auth_service: Arc<AuthService>,
    blog_service: Arc<BlogService>,
    jwt_service: Arc<JwtService>,
) -> anyhow::Result<()> {
    use actix_web::middleware::{Logger, NormalizePath, TrailingSlash};
    use actix_web::{web, App, HttpServer};

    tracing::info!("Configuring HTTP server...");

    let server = HttpServer::new(move || {
        App::new()
            .wrap(NormalizePath::new(TrailingSlash::Always))
            .wrap(Logger::default())
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(blog_service.clone()))
            .app_data(web::Data::new(jwt_service.clone()))
            .configure(routes::configure)
    })
    .bind(&addr)?
    .run();

    tracing::info!("HTTP server running on {}", addr);

    server.await?;

    tracing::info!("Shutting down...");
    Ok(())
}

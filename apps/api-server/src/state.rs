//! Application state - shared across all handlers.

use folio_core::domain::{Category, User};
use folio_core::pagination::PageRequest;
use folio_core::{Blog, RepoError};
use folio_infra::InMemoryStore;
use folio_infra::database::DatabaseConfig;
use folio_shared::dto::PageQuery;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub blog: Blog,
    pub posts_per_page: i64,
}

impl AppState {
    pub fn new(blog: Blog, posts_per_page: i64) -> Self {
        Self {
            blog,
            posts_per_page,
        }
    }

    /// A page request at the configured page size.
    pub fn page_request(&self, query: PageQuery) -> PageRequest {
        PageRequest::new(self.posts_per_page, query.page)
    }

    /// Build the state on Postgres when a database is configured and
    /// reachable, otherwise on the in-memory store, seeded with a demo user
    /// and category when `seed_demo` is set.
    pub async fn connect(
        db_config: Option<&DatabaseConfig>,
        posts_per_page: i64,
        seed_demo: bool,
    ) -> Self {
        #[cfg(feature = "postgres")]
        let blog = match db_config {
            Some(config) => match folio_infra::database::connect(config).await {
                Ok(db) => Blog::new(folio_infra::PostgresStore::new(db).repositories()),
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory store.",
                        e
                    );
                    in_memory(seed_demo).await
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running on the in-memory store.");
                in_memory(seed_demo).await
            }
        };

        #[cfg(not(feature = "postgres"))]
        let blog = {
            if db_config.is_some() {
                tracing::warn!("Built without the postgres feature; DATABASE_URL is ignored.");
            }
            in_memory(seed_demo).await
        };

        tracing::info!(posts_per_page, "Application state initialized");
        Self::new(blog, posts_per_page)
    }
}

pub const DEMO_USERNAME: &str = "demo";

async fn in_memory(seed_demo: bool) -> Blog {
    let blog = Blog::new(InMemoryStore::new().repositories());
    if seed_demo && let Err(e) = seed(&blog).await {
        tracing::error!("Failed to seed demo data: {}", e);
    }
    blog
}

/// Nothing in the API creates users, so an empty store would reject every write.
async fn seed(blog: &Blog) -> Result<(), RepoError> {
    let repos = blog.repositories();
    let user = repos
        .users
        .save(User::new(DEMO_USERNAME, "demo@example.com"))
        .await?;
    let category = repos
        .categories
        .save(Category::new("General", "Everything else", "general"))
        .await?;

    tracing::info!(
        user_id = %user.id,
        category = %category.slug,
        "Seeded in-memory store; send the user id as X-Viewer-Id to write"
    );
    Ok(())
}

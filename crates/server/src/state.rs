use std::path::PathBuf;
use std::sync::Arc;

use configs::AppConfig;
use sea_orm::DatabaseConnection;
use service::auth::password::HashCost;
use service::auth::repo::SeaOrmAuthRepository;
use service::auth::{AuthConfig, AuthService};
use service::comment_service::CommentService;
use service::listing::ListingService;
use service::user_service::UserService;

/// Where uploaded photos go and how many one request may carry.
#[derive(Clone, Debug)]
pub struct UploadSettings {
    pub dir: PathBuf,
    pub max_files: usize,
}

/// Shared handler state, built once at startup.
#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<AuthService<SeaOrmAuthRepository>>,
    pub listings: ListingService,
    pub comments: CommentService,
    pub users: UserService,
    pub uploads: UploadSettings,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, config: &AppConfig) -> Self {
        let auth_cfg = AuthConfig {
            jwt_secret: config.auth.jwt_secret.clone(),
            token_ttl_hours: config.auth.token_ttl_hours,
            hash_cost: HashCost {
                memory_kib: config.auth.hash_memory_kib,
                iterations: config.auth.hash_iterations,
            },
        };
        let repo = Arc::new(SeaOrmAuthRepository::new(db.clone()));
        Self {
            auth: Arc::new(AuthService::new(repo, auth_cfg)),
            listings: ListingService::new(db.clone()),
            comments: CommentService::new(db.clone()),
            users: UserService::new(db),
            uploads: UploadSettings {
                dir: PathBuf::from(&config.uploads.dir),
                max_files: config.uploads.max_files,
            },
        }
    }
}

use std::sync::Arc;

use kura_db::Database;
use kura_db::models::NewAdmin;
use kura_types::models::Role;
use uuid::Uuid;

use crate::auth::{AppState, AppStateInner};
use crate::bootstrap::BootstrapAccounts;
use crate::policy::Caller;
use crate::uploads::UploadStore;

pub(crate) struct Callers {
    pub founder: Caller,
    pub super_admin: Caller,
    pub admin: Caller,
}

fn insert(db: &Database, username: &str, role: Role) -> Caller {
    let id = db
        .create_admin(&NewAdmin {
            username: username.into(),
            // Not a valid PHC string; these accounts never log in.
            password_hash: "unused".into(),
            role,
            name: None,
            email: None,
            phone: None,
        })
        .unwrap();
    Caller { id, username: username.into(), role }
}

/// In-memory store with one account per role.
pub(crate) fn seeded_db() -> (Database, Callers) {
    let db = Database::open_in_memory().unwrap();
    let callers = Callers {
        founder: insert(&db, "marxe", Role::Founder),
        super_admin: insert(&db, "fayfejder", Role::SuperAdmin),
        admin: insert(&db, "ali", Role::Admin),
    };
    (db, callers)
}

pub(crate) fn admin_caller(db: &Database, username: &str) -> Caller {
    insert(db, username, Role::Admin)
}

/// Full application state over an empty store and a scratch upload dir.
pub(crate) async fn test_state(legacy_login_provisioning: bool) -> AppState {
    let dir = std::env::temp_dir().join(format!("kura-test-{}", Uuid::new_v4()));
    Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        jwt_secret: "test-secret".into(),
        token_ttl: chrono::Duration::hours(1),
        uploads: UploadStore::new(dir, "/static/uploads").await.unwrap(),
        max_upload_bytes: 1024 * 1024,
        bootstrap: BootstrapAccounts::default(),
        legacy_login_provisioning,
    })
}

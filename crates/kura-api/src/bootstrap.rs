use anyhow::Result;
use tracing::{info, warn};

use kura_db::Database;
use kura_db::models::{BootstrapReport, NewAdmin};
use kura_types::models::Role;

use crate::auth::hash_password;

/// Credentials for the two accounts every installation starts with.
#[derive(Debug, Clone)]
pub struct BootstrapAccounts {
    pub founder_username: String,
    pub founder_password: String,
    pub super_username: String,
    pub super_password: String,
}

impl Default for BootstrapAccounts {
    fn default() -> Self {
        Self {
            founder_username: "marxe".into(),
            founder_password: "ali12345".into(),
            super_username: "fayfejder".into(),
            super_password: "ali12345".into(),
        }
    }
}

impl BootstrapAccounts {
    fn founder(&self) -> Result<NewAdmin> {
        Ok(NewAdmin {
            username: self.founder_username.clone(),
            password_hash: hash_password(&self.founder_password)?,
            role: Role::Founder,
            name: Some("Kurucu".into()),
            email: None,
            phone: None,
        })
    }

    fn super_admin(&self) -> Result<NewAdmin> {
        Ok(NewAdmin {
            username: self.super_username.clone(),
            password_hash: hash_password(&self.super_password)?,
            role: Role::SuperAdmin,
            name: Some("Baş Admin".into()),
            email: None,
            phone: None,
        })
    }
}

/// Startup step: make sure a founder and the bootstrap super-admin exist.
/// Safe to run on every start.
pub fn run(db: &Database, accounts: &BootstrapAccounts) -> Result<BootstrapReport> {
    let report = db.ensure_bootstrap_accounts(&accounts.founder()?, &accounts.super_admin()?)?;

    if report.founder_created {
        info!("Created founder account '{}'", accounts.founder_username);
    }
    if report.founder_username_taken {
        warn!(
            "No founder exists and username '{}' belongs to another account; \
             promote an admin to founder manually",
            accounts.founder_username
        );
    }
    if report.super_admin_created {
        info!("Created super-admin account '{}'", accounts.super_username);
    }

    Ok(report)
}

/// Login-time provisioning of the bootstrap super-admin (legacy behaviour).
pub fn ensure_super_admin(db: &Database, accounts: &BootstrapAccounts) -> Result<bool> {
    if db.get_admin_by_username(&accounts.super_username)?.is_some() {
        return Ok(false);
    }
    let created = db.ensure_admin(&accounts.super_admin()?)?;
    if created {
        info!("Provisioned super-admin '{}' on login", accounts.super_username);
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_creates_both_accounts_once() {
        let db = Database::open_in_memory().unwrap();
        let accounts = BootstrapAccounts::default();

        let report = run(&db, &accounts).unwrap();
        assert!(report.founder_created);
        assert!(report.super_admin_created);

        let report = run(&db, &accounts).unwrap();
        assert_eq!(report, BootstrapReport::default());

        let founder = db.get_admin_by_username("marxe").unwrap().unwrap();
        assert_eq!(founder.role, Role::Founder);
        let sup = db.get_admin_by_username("fayfejder").unwrap().unwrap();
        assert_eq!(sup.role, Role::SuperAdmin);
        assert_eq!(db.count_founders().unwrap(), 1);
    }

    #[test]
    fn bootstrap_super_admin_never_becomes_founder() {
        let db = Database::open_in_memory().unwrap();
        let accounts = BootstrapAccounts::default();
        ensure_super_admin(&db, &accounts).unwrap();
        run(&db, &accounts).unwrap();

        let sup = db.get_admin_by_username("fayfejder").unwrap().unwrap();
        assert_eq!(sup.role, Role::SuperAdmin);
        let founder = db.get_admin_by_username("marxe").unwrap().unwrap();
        assert_eq!(founder.role, Role::Founder);
    }

    #[test]
    fn passwords_are_stored_hashed() {
        let db = Database::open_in_memory().unwrap();
        run(&db, &BootstrapAccounts::default()).unwrap();
        let founder = db.get_admin_by_username("marxe").unwrap().unwrap();
        assert_ne!(founder.password_hash, "ali12345");
        assert!(crate::auth::verify_password("ali12345", &founder.password_hash));
    }
}

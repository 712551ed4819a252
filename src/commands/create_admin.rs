//! Create-admin command - bootstraps an administrator account.
//!
//! Registration only hands out guest and host roles, so the first admin
//! has to come from here. An existing account with the same email is
//! promoted instead.

use crate::cli::args::CreateAdminArgs;
use crate::config::Config;
use crate::domain::{NewUser, Password, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, Persistence, UnitOfWork};

pub async fn execute(args: CreateAdminArgs, config: Config) -> AppResult<()> {
    let email = args.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(AppError::validation("Email is invalid"));
    }

    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;
    let uow = Persistence::new(db.get_connection());

    if let Some(existing) = uow.users().find_by_email(&email).await? {
        if existing.role == UserRole::Admin {
            tracing::info!(user_id = %existing.id, "user is already an admin");
            return Ok(());
        }
        let id = existing.id;
        uow.transaction(move |ctx| {
            Box::pin(async move { ctx.users().set_role(id, UserRole::Admin).await })
        })
        .await?;
        tracing::info!(user_id = %id, "existing user promoted to admin");
        return Ok(());
    }

    let password = Password::new(&args.password)?;
    let user = uow
        .users()
        .create(NewUser {
            email,
            password_hash: password.into_string(),
            name: args.name.trim().to_string(),
            role: UserRole::Admin,
        })
        .await?;

    tracing::info!(user_id = %user.id, email = %user.email, "admin created");
    Ok(())
}

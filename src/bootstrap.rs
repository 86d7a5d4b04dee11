//! Idempotent startup bootstrap: ensures a default admin user and a default
//! support-staff account exist so a freshly-provisioned deployment has a way
//! to log in.

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::{info, warn};

use crate::auth::hash_password;
use crate::config::AppConfig;
use crate::infrastructure::database::entities::{support_staff, user, wallet};

/// Creates the admin user from `admin_email`/`admin_password`/`admin_name`
/// if no user with that email exists yet. If it exists, its password and
/// `is_admin` flag are refreshed to match configuration -- re-running
/// bootstrap after rotating `ADMIN_PASSWORD` is the intended way to reset it.
pub async fn ensure_admin(db: &DatabaseConnection, config: &AppConfig) -> Result<(), crate::error::InfraError> {
    let password_hash = hash_password(&config.admin_password).map_err(|e| crate::error::InfraError::Crypto(e.to_string()))?;
    let existing = user::Entity::find().filter(user::Column::Email.eq(&config.admin_email)).one(db).await?;

    match existing {
        Some(existing) => {
            let mut am: user::ActiveModel = existing.into();
            am.password_hash = Set(password_hash);
            am.is_admin = Set(true);
            am.update(db).await?;
            info!(email = config.admin_email.as_str(), "admin user refreshed");
        }
        None => {
            let now = chrono::Utc::now();
            let am = user::ActiveModel {
                email: Set(config.admin_email.clone()),
                password_hash: Set(password_hash),
                full_name: Set(config.admin_name.clone()),
                is_admin: Set(true),
                is_active: Set(true),
                is_verified: Set(true),
                created_at: Set(now),
                ..Default::default()
            };
            let admin = am.insert(db).await?;

            let wallet_am = wallet::ActiveModel { user_id: Set(admin.id), cash_balance: Set(rust_decimal::Decimal::ZERO), points_balance: Set(0), updated_at: Set(now), ..Default::default() };
            wallet_am.insert(db).await?;

            info!(email = config.admin_email.as_str(), "default admin user created");
        }
    }
    Ok(())
}

/// Creates the default support-staff seat from `staff_email`/`staff_department`
/// if no staff account with that email exists. Does nothing on repeat runs.
pub async fn ensure_staff(db: &DatabaseConnection, config: &AppConfig) -> Result<(), crate::error::InfraError> {
    let existing_user = user::Entity::find().filter(user::Column::Email.eq(&config.staff_email)).one(db).await?;

    let staff_user = match existing_user {
        Some(u) => u,
        None => {
            let password_hash = hash_password(&config.staff_password).map_err(|e| crate::error::InfraError::Crypto(e.to_string()))?;
            let am = user::ActiveModel {
                email: Set(config.staff_email.clone()),
                password_hash: Set(password_hash),
                full_name: Set(config.staff_name.clone()),
                is_admin: Set(false),
                is_active: Set(true),
                is_verified: Set(true),
                created_at: Set(chrono::Utc::now()),
                ..Default::default()
            };
            am.insert(db).await?
        }
    };

    let existing_staff = support_staff::Entity::find().filter(support_staff::Column::UserId.eq(staff_user.id)).one(db).await?;
    if existing_staff.is_some() {
        info!(email = config.staff_email.as_str(), "default support staff already provisioned");
        return Ok(());
    }

    let am = support_staff::ActiveModel {
        user_id: Set(staff_user.id),
        department: Set(config.staff_department.clone()),
        is_manager: Set(true),
        is_active: Set(true),
        open_ticket_count: Set(0),
        ..Default::default()
    };
    am.insert(db).await?;
    warn!(email = config.staff_email.as_str(), "default support staff created, change the default password after first login");
    Ok(())
}

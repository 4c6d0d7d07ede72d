use std::sync::Arc;

use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{connect, output_empty_collection, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::database::models::{Membership, Role, User, UserProfile};
use crate::database::{PgDocumentStore, Repository};
use crate::services::UserService;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user with a chosen password, e.g. the first ADMIN")]
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long, default_value = "")]
        phone_number: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, help = "ADMIN, LEADER, MATERIAL, TRAVEL or COST")]
        role: Option<String>,
        #[arg(long, default_value = "free")]
        membership: String,
    },

    #[command(about = "Replace a user's password")]
    SetPassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    #[command(about = "Assign a role to a user")]
    SetRole {
        #[arg(long)]
        email: String,
        #[arg(long)]
        role: String,
    },

    #[command(about = "List users")]
    List {
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long, default_value_t = 50)]
        limit: u64,
        #[arg(long, help = "free or premium")]
        membership: Option<String>,
    },
}

async fn user_service() -> anyhow::Result<UserService> {
    let config = config::config();
    let pool = connect(config).await?;
    let store = Arc::new(PgDocumentStore::new(pool));
    Ok(UserService::new(
        Repository::new(store),
        config.security.clone(),
    ))
}

async fn find_user(users: &UserService, email: &str) -> anyhow::Result<crate::database::Record<User>> {
    users
        .find_by_email(email)
        .await?
        .ok_or_else(|| anyhow::anyhow!("No user with email '{}'", email))
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let users = user_service().await?;

    match cmd {
        UserCommands::Create {
            email,
            password,
            first_name,
            last_name,
            phone_number,
            address,
            role,
            membership,
        } => {
            let role = role.map(|r| r.parse::<Role>()).transpose()?;
            let membership: Membership = membership.parse()?;

            let user = User {
                name: User::full_name(&first_name, &last_name),
                first_name,
                last_name,
                email,
                phone_number,
                address,
                avatar: None,
                bio: None,
                role,
                membership,
                expiration_date: None,
                password: String::new(),
            };
            let record = users.create_with_password(user, &password).await?;

            output_success(
                &output_format,
                &format!("Created user {} ({})", record.data.email, record.id),
                Some(json!(UserProfile::from(&record))),
            )
        }
        UserCommands::SetPassword { email, password } => {
            let record = find_user(&users, &email).await?;
            users.set_password(record.id, &password).await?;
            output_success(
                &output_format,
                &format!("Password updated for {}", record.data.email),
                Some(json!({ "id": record.id })),
            )
        }
        UserCommands::SetRole { email, role } => {
            let role: Role = role.parse()?;
            let record = find_user(&users, &email).await?;
            let updated = users.set_role(record.id, role).await?;
            output_success(
                &output_format,
                &format!("Assigned {} to {}", role, updated.data.email),
                Some(json!({ "id": updated.id, "role": role })),
            )
        }
        UserCommands::List {
            page,
            limit,
            membership,
        } => {
            let membership = membership.map(|m| m.parse::<Membership>()).transpose()?;
            let result = users.list(page.max(1), limit.max(1), membership).await?;

            if result.users.is_empty() {
                return output_empty_collection(&output_format, "users", "No users found");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                }
                OutputFormat::Text => {
                    println!("{:<38} {:<30} {:<24} {:<10} {}", "ID", "EMAIL", "NAME", "ROLE", "MEMBERSHIP");
                    println!("{}", "-".repeat(112));
                    for user in &result.users {
                        let role = user.role.map(|r| r.as_str()).unwrap_or("-");
                        println!(
                            "{:<38} {:<30} {:<24} {:<10} {}",
                            user.id, user.email, user.name, role, user.membership.as_str()
                        );
                    }
                    println!("\n{} of {} user(s)", result.users.len(), result.total);
                }
            }
            Ok(())
        }
    }
}

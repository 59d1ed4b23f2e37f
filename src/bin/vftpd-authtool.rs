//! Read-only diagnostic CLI for the authentication/authorization core.
//!
//! Exercises `Authenticator`/`Authorizer` the way an operator would want to
//! check a deployment's character files and access map without granting the
//! tool any power to change either.

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use vftpd_core::{
    Authenticator, Authorizer, Config, FileAccessSource, FileUserSource, Permission,
    UserRepository,
};

#[derive(Parser)]
#[command(name = "vftpd-authtool", about = "Inspect vftpd authentication and authorization state")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Prompt for a password and report whether it would authenticate `user`.
    CheckAuth { user: String },
    /// Report the resolved permission for `user` on `path` and whether it
    /// satisfies `permission`.
    CheckPerm {
        user: String,
        path: String,
        permission: String,
    },
    /// List the resolved group membership (explicit + implicit) for `user`.
    Groups { user: String },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let users = FileUserSource::new(config.character_dir_path.clone());
    let repository = Arc::new(UserRepository::new(users, config.character_cache_time));

    match cli.command {
        Command::CheckAuth { user } => {
            let password = rpassword::prompt_password(format!("password for {user}: "))?;
            let authenticator = Authenticator::new(repository);
            match authenticator.authenticate(&user, &password) {
                Ok(_) => println!("ok"),
                Err(_) => println!("denied"),
            }
        }
        Command::CheckPerm { user, path, permission } => {
            let required = parse_permission(&permission)?;
            let access = FileAccessSource::new(config.access_file_path.clone());
            let authorizer = Authorizer::new(access, repository, config.access_cache_time);
            let resolved = authorizer.resolve_permission(&user, &path);
            println!("{resolved:?}");
            println!(
                "satisfies {permission}: {}",
                authorizer.has_permission(&user, &path, required)
            );
        }
        Command::Groups { user } => {
            let access = FileAccessSource::new(config.access_file_path.clone());
            let authorizer = Authorizer::new(access, repository, config.access_cache_time);
            for group in authorizer.resolve_groups(&user) {
                println!("{group}");
            }
        }
    }

    Ok(())
}

fn parse_permission(raw: &str) -> Result<Permission> {
    Ok(match raw.to_ascii_lowercase().as_str() {
        "revoked" => Permission::Revoked,
        "read" => Permission::Read,
        "write" => Permission::Write,
        "grantread" | "grant-read" => Permission::GrantRead,
        "grantwrite" | "grant-write" => Permission::GrantWrite,
        "grantgrant" | "grant-grant" => Permission::GrantGrant,
        other => bail!("unknown permission '{other}'"),
    })
}

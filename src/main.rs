//! Photo Vault - CLI
//!
//! Command-line front end for vault operations.

use std::path::PathBuf;
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use photo_vault::{codec, PhotoVault, RegistrationForm, VaultError};

#[derive(Parser)]
#[command(name = "photo-vault")]
#[command(version = photo_vault::VERSION)]
#[command(about = "Photo Vault - personal photo vault on local storage")]
struct Cli {
    /// Vault path
    #[arg(short, long, default_value = "./vault")]
    vault: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the vault directory and manifest
    Init,

    /// Register a new user and sign in
    Register {
        username: String,

        #[arg(short, long)]
        password: String,

        /// Password confirmation
        #[arg(short, long)]
        confirm: String,
    },

    /// Sign in
    SignIn {
        username: String,

        #[arg(short, long)]
        password: String,
    },

    /// Show the signed-in user
    Whoami,

    /// Change the signed-in user's name and password
    Account {
        username: String,

        #[arg(short, long)]
        password: String,

        #[arg(short, long)]
        confirm: String,
    },

    /// Add a photo
    Add {
        /// Image path
        path: PathBuf,

        /// Store the file as-is instead of re-encoding it as JPEG
        #[arg(long)]
        raw: bool,
    },

    /// List photos
    List {
        /// Liked photos only
        #[arg(long)]
        liked: bool,
    },

    /// Show one photo
    Show {
        index: usize,

        /// Index into the liked photos instead of all photos
        #[arg(long)]
        liked: bool,
    },

    /// Export a photo's image
    Export {
        index: usize,

        /// Output path
        output: PathBuf,

        /// Export the grid thumbnail
        #[arg(long)]
        thumbnail: bool,
    },

    /// Toggle a photo's like
    Like { index: usize },

    /// Set a photo's comment
    Comment { index: usize, text: String },

    /// Remove a photo
    Remove { index: usize },

    /// Show vault statistics
    Stats,

    /// List (or delete) image files no photo points at
    Orphans {
        #[arg(long)]
        purge: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut vault = PhotoVault::open(&cli.vault)
        .with_context(|| format!("opening vault at {}", cli.vault.display()))?;

    match cli.command {
        Commands::Init => {
            println!("✅ Vault ready at: {}", cli.vault.display());
            println!("   vault.json   - manifest");
            println!("   db/store.db  - users");
            println!("   images/      - photo files");
        }

        Commands::Register { username, password, confirm } => {
            let form = RegistrationForm::new(&username, &password, &confirm);
            match vault.register(&form) {
                Ok(user) => println!("✅ Registered {}", user.name.as_deref().unwrap_or_default()),
                Err(VaultError::Validation(report)) => {
                    for warning in report.warnings() {
                        println!("⚠️ {}", warning);
                    }
                    bail!("registration rejected");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Commands::SignIn { username, password } => {
            let user = vault.sign_in(&username, &password)?;
            println!(
                "🔓 Signed in as {} ({} photos)",
                user.name.as_deref().unwrap_or_default(),
                user.photo_count()
            );
        }

        Commands::Whoami => match vault.user() {
            Some(user) => println!("{}", user.name.as_deref().unwrap_or_default()),
            None => println!("Not signed in"),
        },

        Commands::Account { username, password, confirm } => {
            let form = RegistrationForm::new(&username, &password, &confirm);
            match vault.update_account(&form) {
                Ok(user) => println!("✅ Account changed to {}", user.name.as_deref().unwrap_or_default()),
                Err(VaultError::Validation(report)) => {
                    for warning in report.warnings() {
                        println!("⚠️ {}", warning);
                    }
                    bail!("account change rejected");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Add { path, raw } => {
            let data = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            let data = if raw {
                data
            } else {
                codec::to_jpeg(&data, vault.config().jpeg_quality)?
            };

            let name = vault.add_photo(&data)?;
            println!("📥 Added photo {} at index {}", name, vault.current_index());
        }

        Commands::List { liked } => {
            let Some(user) = vault.user() else {
                println!("Not signed in");
                return Ok(());
            };

            if user.photo_count() == 0 {
                println!("📭 You don't have photos");
                return Ok(());
            }

            if liked {
                for (n, photo) in user.liked_photos().into_iter().enumerate() {
                    let full = user.liked_index_to_full(n).unwrap_or(n);
                    println!("{:>3} (#{}) ❤️ {} {}", n, full, photo.name, photo.comment.as_deref().unwrap_or(""));
                }
            } else {
                for (i, photo) in user.photos().iter().enumerate() {
                    let heart = if photo.is_liked { "❤️" } else { "  " };
                    println!("{:>3} {} {} {}", i, heart, photo.name, photo.comment.as_deref().unwrap_or(""));
                }
            }
        }

        Commands::Show { index, liked } => {
            let index = if liked { vault.open_liked(index)? } else { index };
            vault.set_index(index)?;

            if let Some(photo) = vault.current_photo() {
                println!("Photo #{}: {}", index, photo.name);
                println!("  liked:   {}", photo.is_liked);
                match photo.comment.as_deref() {
                    Some(comment) => println!("  comment: {}", comment),
                    None => println!("  comment: (add a comment)"),
                }
            }

            match vault.load_photo_image(index)? {
                Some(data) => println!("  image:   {} bytes, {}", data.len(), codec::detect_mime(&data)),
                None => println!("  image:   missing"),
            }
        }

        Commands::Export { index, output, thumbnail } => {
            let data = if thumbnail {
                vault.load_thumbnail(index)?
            } else {
                vault.load_photo_image(index)?
            };

            let Some(data) = data else {
                bail!("image file for photo #{} is missing", index);
            };
            std::fs::write(&output, &data).with_context(|| format!("writing {}", output.display()))?;
            println!("📤 Exported to {}", output.display());
        }

        Commands::Like { index } => {
            let liked = vault.toggle_like(index)?;
            println!("{} Photo #{}", if liked { "❤️" } else { "🤍" }, index);
        }

        Commands::Comment { index, text } => {
            if vault.edit_comment(index, &text)? {
                println!("💬 Comment saved");
            } else {
                println!("Empty comment ignored");
            }
        }

        Commands::Remove { index } => match vault.remove_photo(index)? {
            Some(next) => println!("🗑️ Removed, now showing #{}", next),
            None => println!("🗑️ Removed, you don't have photos"),
        },

        Commands::Stats => {
            let stats = vault.stats()?;
            println!("📊 Photo Vault Statistics");
            println!("{:-<40}", "");
            println!("Registered users: {}", stats.users);
            println!("Photos:           {}", stats.photos);
            println!("Liked:            {}", stats.liked);
            println!("Commented:        {}", stats.commented);
            println!("Stored images:    {}", stats.stored_images);
            println!("Stored size:      {} KB", stats.stored_bytes / 1024);
            println!("Orphaned images:  {}", stats.orphaned_images);
        }

        Commands::Orphans { purge } => {
            let names = if purge { vault.purge_orphans()? } else { vault.orphaned_images()? };
            if names.is_empty() {
                println!("No orphaned images");
            }
            for name in names {
                println!("{}{}", if purge { "deleted " } else { "" }, name);
            }
        }
    }

    Ok(())
}

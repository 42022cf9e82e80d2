// Avatar Store for Amazon S3 Compatible Cloud Storage
// Copyright 2025 The avatar-store Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use avatar_store::config::Config;
use avatar_store::s3::source::FileSource;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

/// Manage user avatar files in the bucket named by AWS_BUCKET_NAME.
#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a file as the avatar of a user, replacing any previous one.
    Upload {
        /// Id of the user owning the avatar.
        user_id: u64,
        /// File to upload.
        file: PathBuf,
    },
    /// Print the URL of the avatar of a user.
    Url { user_id: u64 },
    /// Delete the avatar of a user.
    Delete { user_id: u64 },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init(); // Note: set environment variable RUST_LOG="INFO" to log info and higher
    let args = Cli::parse();

    let repository = Config::from_env()?.repository()?;

    match args.command {
        Command::Upload { user_id, file } => {
            let source = FileSource::open(&file).await?;
            let file_name = source
                .file_name()
                .ok_or_else(|| format!("'{}' has no usable file name", file.display()))?
                .to_string();
            let source_path = source.path().to_path_buf();
            let location = repository
                .update(user_id, &file_name, Arc::new(source))
                .await?;
            info!(
                "uploaded {} for user {user_id} to bucket {}",
                source_path.display(),
                repository.bucket()
            );
            println!("{location}");
        }
        Command::Url { user_id } => match repository.get_url_by_user(user_id).await? {
            Some(url) => println!("{url}"),
            None => info!("user {user_id} has no avatar"),
        },
        Command::Delete { user_id } => {
            repository.delete(user_id).await?;
            info!("deleted avatar of user {user_id} from bucket {}", repository.bucket());
        }
    }

    Ok(())
}

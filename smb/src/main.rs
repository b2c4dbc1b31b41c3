use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::time::Duration;

use anyhow::Context;
use argh::FromArgs;
use tracing_subscriber::EnvFilter;

use smb_client::client::{SMBClient, SMBClientConfig};
use smb_client::util::auth::User;

#[derive(FromArgs)]
/// Runs one file operation against an SMB2 share.
///
/// Options default to the SMB_HOST, SMB_PORT, SMB_SHARE, SMB_USER and
/// SMB_PASSWORD environment variables.
struct Args {
    #[argh(option, short = 'H', default = "env_or(\"SMB_HOST\", \"\")", description = "server address or NetBIOS name")]
    host: String,
    #[argh(option, short = 'p', default = "env_or(\"SMB_PORT\", \"139\").parse().unwrap_or(139)", description = "server port")]
    port: u16,
    #[argh(option, short = 's', default = "env_or(\"SMB_SHARE\", \"microSD\")", description = "share name")]
    share: String,
    #[argh(option, short = 'u', default = "env_or(\"SMB_USER\", \"\")", description = "user name, empty for anonymous")]
    user: String,
    #[argh(option, short = 'P', default = "env_or(\"SMB_PASSWORD\", \"\")", description = "password")]
    password: String,
    #[argh(switch, description = "skip the NetBIOS session request (direct TCP, port 445)")]
    direct: bool,
    #[argh(option, default = "5", description = "timeout in seconds")]
    timeout: u64,
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    List(ListArgs),
    Get(GetArgs),
    Put(PutArgs),
    Remove(RemoveArgs),
    RemoveDir(RemoveDirArgs),
    Rename(RenameArgs),
    MakeDir(MakeDirArgs),
    Stat(StatArgs),
    Info(InfoArgs),
}

#[derive(FromArgs)]
#[argh(subcommand, name = "ls", description = "list a directory")]
struct ListArgs {
    #[argh(positional, default = "String::from(\"/\")")]
    path: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "get", description = "download a file")]
struct GetArgs {
    #[argh(positional)]
    remote: String,
    #[argh(positional, description = "local file, standard output when omitted")]
    local: Option<String>,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "put", description = "upload a file")]
struct PutArgs {
    #[argh(positional)]
    local: String,
    #[argh(positional)]
    remote: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "rm", description = "delete a file")]
struct RemoveArgs {
    #[argh(positional)]
    path: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "rmdir", description = "delete an empty directory")]
struct RemoveDirArgs {
    #[argh(positional)]
    path: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "mv", description = "rename a file or directory")]
struct RenameArgs {
    #[argh(positional)]
    from: String,
    #[argh(positional)]
    to: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "mkdir", description = "create a directory")]
struct MakeDirArgs {
    #[argh(positional)]
    path: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "stat", description = "show the metadata of a path")]
struct StatArgs {
    #[argh(positional)]
    path: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "info", description = "show the negotiated connection")]
struct InfoArgs {}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
    let args: Args = argh::from_env();

    let config = SMBClientConfig::builder()
        .host(args.host.as_str())
        .port(args.port)
        .share(args.share.as_str())
        .netbios_session(!args.direct)
        .timeout(Duration::from_secs(args.timeout))
        .build()?;
    let user = User::new(args.user, args.password);
    let mut client = SMBClient::connect(config, user).context("could not connect")?;

    match args.command {
        Command::List(list) => {
            for entry in client.list_directory(&list.path)? {
                let entry = entry?;
                let kind = if entry.is_directory() { "d" } else { "-" };
                println!("{} {:>12} {}", kind, entry.size, entry.name);
            }
        }
        Command::Get(get) => match get.local {
            Some(local) => {
                let mut file = File::create(&local).with_context(|| format!("could not create {}", local))?;
                let mut reader = client.read_file(&get.remote)?;
                io::copy(&mut reader, &mut file)?;
            }
            None => {
                let mut stdout = io::stdout().lock();
                for chunk in client.read_file(&get.remote)? {
                    stdout.write_all(&chunk?)?;
                }
            }
        },
        Command::Put(put) => {
            let file = File::open(&put.local).with_context(|| format!("could not open {}", put.local))?;
            let written = client.write_file(&put.remote, file)?;
            println!("{} bytes written", written);
        }
        Command::Remove(remove) => client.delete_file(&remove.path)?,
        Command::RemoveDir(remove) => client.delete_directory(&remove.path)?,
        Command::Rename(rename) => client.rename(&rename.from, &rename.to)?,
        Command::MakeDir(make) => client.create_directory(&make.path)?,
        Command::Stat(stat) => {
            let metadata = client.stat(&stat.path)?;
            println!("name:       {}", metadata.name);
            println!("size:       {}", metadata.size);
            println!("attributes: {:?}", metadata.attributes);
            println!("modified:   {:?}", metadata.modified.to_system_time());
        }
        Command::Info(_) => {
            if let Some(info) = client.connection_info() {
                println!("{}", info);
            }
        }
    }

    client.disconnect();
    Ok(())
}

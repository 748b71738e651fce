use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lite_wallet_lib::{Intent, WalletApp, WalletContext, WalletError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const HELP: &str = "\
Commands:
  new                  generate a new wallet
  create <password>    protect the new wallet with a password and save it
  cancel               discard the new wallet
  show <i>             open the password prompt of wallet i
  unlock <i> <pw>      reveal the private key of wallet i
  close <i>            close the password prompt of wallet i
  hide <i>             hide the private key of wallet i
  balance <i>          load the balance of wallet i
  help                 show this text
  quit                 exit";

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Directory holding the wallet list and configuration.
    #[clap(long, default_value = ".lite-wallet")]
    data_dir: PathBuf,

    /// Node JSON-RPC endpoint. Overrides the configuration file and
    /// LITE_WALLET_PROVIDER.
    #[clap(long)]
    endpoint: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Intents(Vec<Intent>),
    Help,
    Quit,
}

/// Split off the first whitespace-delimited word; the remainder keeps its
/// inner spacing.
fn next_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (input, ""),
    }
}

fn parse_index(value: &str) -> Result<usize, String> {
    if value.is_empty() {
        return Err("missing wallet index".to_string());
    }
    value
        .parse()
        .map_err(|_| format!("invalid wallet index: {value}"))
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let (name, rest) = next_word(line.trim_end());
    if name.is_empty() {
        return Ok(None);
    }

    let command = match name {
        "new" => Command::Intents(vec![Intent::GenerateNewWallet]),
        // Passwords run to the end of the line.
        "create" => Command::Intents(vec![
            Intent::TypeNewWalletPassword(rest.to_string()),
            Intent::CreateNewWallet,
        ]),
        "cancel" => Command::Intents(vec![Intent::CancelNewWallet]),
        "unlock" => {
            let (index, password) = next_word(rest);
            let index = parse_index(index)?;
            Command::Intents(vec![
                Intent::OpenPasswordPrompt(index),
                Intent::TypePassword(index, password.to_string()),
                Intent::SubmitPassword(index),
            ])
        }
        "show" | "close" | "hide" | "balance" => {
            let index = parse_index(next_word(rest).0)?;
            let intent = match name {
                "show" => Intent::OpenPasswordPrompt(index),
                "close" => Intent::ClosePasswordPrompt(index),
                "hide" => Intent::HidePrivateKey(index),
                _ => Intent::RequestBalance(index),
            };
            Command::Intents(vec![intent])
        }
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(Some(command))
}

fn to_frontend_error(err: WalletError) -> String {
    err.to_string()
}

async fn run(args: Args) -> Result<()> {
    let context = WalletContext::initialize(args.data_dir.clone(), args.endpoint)
        .context("failed to initialize wallet context")?;
    let (wallets, flow) = context.managers();
    let mut app = WalletApp::new(wallets, flow);
    app.initialize().with_context(|| {
        format!(
            "stored wallet list in {} could not be read; leaving it untouched",
            context.paths().storage_file().display()
        )
    })?;

    println!("{}", app.render());
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        match command {
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
            Command::Intents(intents) => {
                for intent in intents {
                    if let Err(err) = app.dispatch(intent).await {
                        eprintln!("{}", to_frontend_error(err));
                        break;
                    }
                }
                println!("{}", app.render());
            }
        }
    }

    tracing::info!("wallet session closed");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("unable to set global default subscriber")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .enable_time()
        .build()
        .context("could not create tokio runtime")?;
    runtime.block_on(run(args))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_is_ignored() {
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn unlock_expands_to_prompt_intents() {
        assert_eq!(
            parse_command("unlock 2 hunter2").unwrap(),
            Some(Command::Intents(vec![
                Intent::OpenPasswordPrompt(2),
                Intent::TypePassword(2, "hunter2".into()),
                Intent::SubmitPassword(2),
            ]))
        );
    }

    #[test]
    fn create_without_password_submits_empty_password() {
        assert_eq!(
            parse_command("create").unwrap(),
            Some(Command::Intents(vec![
                Intent::TypeNewWalletPassword(String::new()),
                Intent::CreateNewWallet,
            ]))
        );
    }

    #[test]
    fn passwords_keep_their_spaces() {
        assert_eq!(
            parse_command("create my long pass").unwrap(),
            Some(Command::Intents(vec![
                Intent::TypeNewWalletPassword("my long pass".into()),
                Intent::CreateNewWallet,
            ]))
        );
        assert_eq!(
            parse_command("  unlock   0  correct horse battery  ").unwrap(),
            Some(Command::Intents(vec![
                Intent::OpenPasswordPrompt(0),
                Intent::TypePassword(0, "correct horse battery".into()),
                Intent::SubmitPassword(0),
            ]))
        );
    }

    #[test]
    fn index_commands_map_to_single_intents() {
        assert_eq!(
            parse_command("close 1").unwrap(),
            Some(Command::Intents(vec![Intent::ClosePasswordPrompt(1)]))
        );
        assert_eq!(
            parse_command("balance 3").unwrap(),
            Some(Command::Intents(vec![Intent::RequestBalance(3)]))
        );
    }

    #[test]
    fn bad_index_is_reported() {
        assert_eq!(
            parse_command("balance x").unwrap_err(),
            "invalid wallet index: x"
        );
        assert_eq!(parse_command("hide").unwrap_err(), "missing wallet index");
    }

    #[test]
    fn unknown_command_is_reported() {
        assert!(parse_command("send 1").is_err());
        assert_eq!(parse_command("quit").unwrap(), Some(Command::Quit));
    }
}

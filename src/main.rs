use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{debug, error};

use evaldraft::{ChatClient, DrafterConfig, Error};

#[derive(Parser)]
#[command(name = "evaldraft", version, about = "Draft LLM evals from a task description")]
struct Cli
{   /// JSON config file; the environment is used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>
  , #[command(subcommand)]
    command: Command
}

#[derive(Subcommand)]
enum Command
{   /// Draft an eval for TASK and print the model's answer
    Draft
    {   task: String
      , /// Reduce the draft to its final code block
        #[arg(long)]
        code_only: bool
    }
  , /// Print only the code contained in FILE (stdin when omitted)
    ExtractCode
    {   file: Option<PathBuf>
    }
}

/// Work resolved from the command line, with all local input read
#[derive(Debug, PartialEq)]
enum Job
{   Draft
    {   task: String
      , code_only: bool
    }
  , ExtractCode
    {   text: String
    }
}

fn read_input(file: Option<PathBuf>) -> Result<String, Error>
{   match file
    {   Some(path) => std::fs::read_to_string(&path).map_err(|e| {
          Error::Other(format!("{}: {}", path.display(), e))
        })
      , None => {
          let mut text = String::new();
          std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| Error::Other(e.to_string()))?;
          Ok(text)
        }
    }
}

/// Resolve the command, reading the input file or stdin
fn prepare(command: Command) -> Result<Job, Error>
{   match command
    {   Command::Draft { task, code_only } => Ok(Job::Draft { task, code_only })
      , Command::ExtractCode { file } => {
          Ok(Job::ExtractCode { text: read_input(file)? })
        }
    }
}

async fn run(cli: Cli) -> Result<String, Error>
{   let config = match &cli.config
    {   Some(path) => {
          let mut config = DrafterConfig::from_json_file(path)?;
          if config.provider.api_key.is_none()
          {   config.provider.api_key = DrafterConfig::from_env()?.provider.api_key;
          }
          config
        }
      , None => DrafterConfig::from_env()?
    };
    debug!("Resolved config: {:?}", config.provider.kind);
    let job = prepare(cli.command)?;

    let client = ChatClient::new(config.provider.clone())?;
    let output = match job
    {   Job::Draft { task, code_only: false } => {
          evaldraft::draft_eval(&client, &config.draft, &task).await
        }
      , Job::Draft { task, code_only: true } => {
          evaldraft::draft_eval_code(
            &client, &config.draft, &config.extract, &task
          ).await
        }
      , Job::ExtractCode { text } => {
          evaldraft::extract_code(&client, &config.extract, &text).await
        }
    };
    client.shutdown().await?;
    output
}

#[tokio::main]
async fn main() -> ExitCode
{   env_logger::init();
    let cli = Cli::parse();

    match run(cli).await
    {   Ok(text) => {
          println!("{}", text);
          ExitCode::SUCCESS
        }
      , Err(e) => {
          error!("{}", e);
          eprintln!("evaldraft: {}", e);
          ExitCode::FAILURE
        }
    }
}

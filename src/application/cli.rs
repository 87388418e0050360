#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::env;
use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendName;
use crate::domain::models::GenerationStatus;
use crate::domain::services::actions::help_text;
use crate::domain::services::actions::save_image;
use crate::domain::services::Session;
use crate::infrastructure::backends::BackendManager;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

/// Directory debug logs are written to, `ANYTHINGEDIT_LOG_DIR` when set.
pub fn log_dir() -> path::PathBuf {
    if let Ok(dir) = env::var("ANYTHINGEDIT_LOG_DIR") {
        return path::PathBuf::from(dir);
    }

    return dirs::cache_dir()
        .unwrap_or_else(|| return env::temp_dir())
        .join("anythingedit");
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

/// Runs a single generation without the TUI and writes the result to disk.
async fn generate_once(matches: &ArgMatches) -> Result<()> {
    let prompt = match matches.get_one::<String>("prompt") {
        Some(prompt) => prompt.to_string(),
        None => bail!("A prompt is required"),
    };
    let output = match matches.get_one::<String>("output") {
        Some(output) => path::PathBuf::from(output),
        None => bail!("An output path is required"),
    };

    let backend_name = match BackendName::parse(Config::get(ConfigKey::Backend)) {
        Some(name) => name,
        None => bail!(format!(
            "Unknown backend {}",
            Config::get(ConfigKey::Backend)
        )),
    };
    let backend = BackendManager::get(backend_name)?;

    let mut session = Session::new();
    let image_path = Config::get(ConfigKey::Image);
    if !image_path.is_empty() {
        session.upload_image(&path::PathBuf::from(image_path)).await;
        if session.status() == GenerationStatus::Error {
            bail!(session.message().to_string());
        }
    }

    session.set_prompt(&prompt);
    session.generate(backend.as_ref()).await;
    if session.status() == GenerationStatus::Error {
        bail!(session.message().to_string());
    }

    let image = match session.current_image() {
        Some(image) => image,
        None => bail!("The backend did not return an image"),
    };
    let saved_path = save_image(image, &output).await?;
    println!("{}", Paint::green(format!("Saved image to {}", saved_path.display())));

    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    let mut cmd = Command::new("debug");
    cmd = cmd.about("Debug helpers for AnythingEdit")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running AnythingEdit with environment variable RUST_LOG=anythingedit")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );

    return cmd;
}

fn arg_image() -> Arg {
    return Arg::new(ConfigKey::Image.to_string())
        .short('i')
        .long(ConfigKey::Image.to_string())
        .env("ANYTHINGEDIT_IMAGE")
        .num_args(1)
        .help("Path to an image (png, jpeg, gif, webp) to start from as the base image.");
}

fn subcommand_edit() -> Command {
    return Command::new("edit")
        .about("Start a new editing session. This is the default when no subcommand is given.")
        .arg(arg_image());
}

fn subcommand_generate() -> Command {
    return Command::new("generate")
        .about("Generate a single image from the command line and save it.")
        .arg(
            Arg::new("prompt")
                .short('p')
                .long("prompt")
                .help("Instruction describing the image to create, or how to change the base image.")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("File to write the generated image to. An extension is added when missing.")
                .num_args(1)
                .required(true),
        )
        .arg(arg_image());
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") || line.starts_with("HOTKEYS:") {
                return Paint::new(format!("EDIT {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("anythingedit")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(subcommand_edit())
        .subcommand(subcommand_generate())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .arg(arg_image())
        .arg(
            Arg::new(ConfigKey::Backend.to_string())
                .short('b')
                .long(ConfigKey::Backend.to_string())
                .env("ANYTHINGEDIT_BACKEND")
                .num_args(1)
                .help(format!(
                    "The image generation backend to connect to. [default: {}]",
                    Config::default(ConfigKey::Backend)
                ))
                .value_parser(PossibleValuesParser::new(BackendName::VARIANTS))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::BackendHealthCheckTimeout.to_string())
                .long(ConfigKey::BackendHealthCheckTimeout.to_string())
                .env("ANYTHINGEDIT_BACKEND_HEALTH_CHECK_TIMEOUT")
                .num_args(1)
                .help(format!("Time to wait in milliseconds before timing out when doing a healthcheck for a backend. [default: {}]", Config::default(ConfigKey::BackendHealthCheckTimeout)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Model.to_string())
                .short('m')
                .long(ConfigKey::Model.to_string())
                .env("ANYTHINGEDIT_MODEL")
                .num_args(1)
                .help(format!("The image model on the backend to generate with. [default: {}]", Config::default(ConfigKey::Model)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("ANYTHINGEDIT_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::GeminiURL.to_string())
                .long(ConfigKey::GeminiURL.to_string())
                .env("ANYTHINGEDIT_GEMINI_URL")
                .num_args(1)
                .help(format!("Google Gemini API URL when using the Gemini backend. Can be swapped to a compatible proxy. [default: {}]", Config::default(ConfigKey::GeminiURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::GeminiToken.to_string())
                .long(ConfigKey::GeminiToken.to_string())
                .env("ANYTHINGEDIT_GEMINI_TOKEN")
                .num_args(1)
                .help("Google Gemini API token when using the Gemini backend.")
                .global(true),
        );
}

pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();
    return dispatch(&matches).await;
}

/// Runs the selected subcommand. Returns true when the editor UI should start.
async fn dispatch(matches: &ArgMatches) -> Result<bool> {
    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    println!("{}", log_dir().join("debug.log").to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("edit", subcmd_matches)) => {
            Config::load(build(), vec![matches, subcmd_matches]).await?;
        }
        Some(("generate", subcmd_matches)) => {
            Config::load(build(), vec![matches, subcmd_matches]).await?;
            generate_once(subcmd_matches).await?;
            return Ok(false);
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(false);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        _ => {
            Config::load(build(), vec![matches]).await?;
        }
    }

    return Ok(true);
}

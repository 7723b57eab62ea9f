use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use resdoc_cli::{init_logging, ResdocConfig, Runner};
use resdoc_loader::Format;

fn cli() -> Command {
    Command::new("resdoc")
        .version(resdoc_cli::VERSION)
        .about("Merge, fingerprint and diff configuration documents")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("annotation")
                .long("annotation")
                .global(true)
                .help("Annotation holding the last-applied snapshot"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .global(true)
                .value_parser(|s: &str| s.parse::<Format>())
                .help("Output format: json or yaml"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Raise log verbosity (repeatable)"),
        )
        .subcommand(
            Command::new("merge")
                .about("Deep merge the first document of each file, later files winning")
                .arg(
                    Arg::new("files")
                        .required(true)
                        .num_args(1..)
                        .value_parser(value_parser!(PathBuf))
                        .help("Files to merge, lowest precedence first"),
                ),
        )
        .subcommand(
            Command::new("checksum")
                .about("Print the fingerprint of every document under a path")
                .arg(
                    Arg::new("path")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("File or directory"),
                ),
        )
        .subcommand(
            Command::new("diff")
                .about("Print the JSON patch that takes a live document to the desired one")
                .arg(
                    Arg::new("live")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Live document carrying the last-applied annotation"),
                )
                .arg(
                    Arg::new("desired")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Desired document"),
                )
                .arg(
                    Arg::new("plain")
                        .long("plain")
                        .action(ArgAction::SetTrue)
                        .help("Diff the live document itself instead of its snapshot"),
                ),
        )
        .subcommand(
            Command::new("current-config")
                .about("Print the last-applied snapshot of a document")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Document file"),
                ),
        )
        .subcommand(
            Command::new("sort")
                .about("Print every document under a path in canonical order")
                .arg(
                    Arg::new("path")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("File or directory"),
                ),
        )
}

fn path_arg<'a>(args: &'a ArgMatches, id: &str) -> Result<&'a PathBuf> {
    args.get_one::<PathBuf>(id)
        .with_context(|| format!("missing argument <{id}>"))
}

fn resolve_config(matches: &ArgMatches) -> Result<ResdocConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ResdocConfig::load(path)?,
        None => ResdocConfig::default(),
    };
    if let Some(key) = matches.get_one::<String>("annotation") {
        config = config.with_annotation(key.clone());
    }
    if let Some(format) = matches.get_one::<Format>("output") {
        config = config.with_output(*format);
    }
    config.validate()?;
    Ok(config)
}

fn run(matches: &ArgMatches) -> Result<String> {
    let config = resolve_config(matches)?;
    let runner = Runner::new(&config);

    match matches.subcommand() {
        Some(("merge", args)) => {
            let files: Vec<PathBuf> = args
                .get_many::<PathBuf>("files")
                .map(|files| files.cloned().collect())
                .unwrap_or_default();
            runner.merge(&files)
        }
        Some(("checksum", args)) => runner.checksum(path_arg(args, "path")?),
        Some(("diff", args)) => runner.diff(
            path_arg(args, "live")?,
            path_arg(args, "desired")?,
            args.get_flag("plain"),
        ),
        Some(("current-config", args)) => runner.current_config(path_arg(args, "file")?),
        Some(("sort", args)) => runner.sort(path_arg(args, "path")?),
        _ => Ok(String::new()),
    }
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_logging(matches.get_count("verbose"))?;

    let output = run(&matches)?;
    if output.is_empty() || output.ends_with('\n') {
        print!("{output}");
    } else {
        println!("{output}");
    }
    Ok(())
}

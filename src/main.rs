use anyhow::{Context, Result};
use catmodal::ads::expand_tags;
use catmodal::category::CategoryTable;
use catmodal::config::Config;
use catmodal::dom::Document;
use catmodal::feed::build_feed;
use catmodal::modal::ModalController;
use catmodal::post::Parser as PostParser;
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_arg = Arg::with_name("config")
        .long("config")
        .short("c")
        .takes_value(true)
        .value_name("FILE")
        .help("The project file (defaults to the nearest catmodal.yaml)");

    let matches = App::new("catmodal")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Category data and modal previews for static blogs")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("Writes the category table for the project's posts")
                .arg(config_arg.clone())
                .arg(
                    Arg::with_name("output")
                        .long("output")
                        .short("o")
                        .takes_value(true)
                        .value_name("FILE")
                        .help("Where to write the JSON table"),
                )
                .arg(
                    Arg::with_name("island")
                        .long("island")
                        .takes_value(true)
                        .value_name("FILE")
                        .help("Where to write the HTML data island"),
                ),
        )
        .subcommand(
            SubCommand::with_name("show")
                .about("Prints the modal title and markup for a category label")
                .arg(config_arg)
                .arg(
                    Arg::with_name("LABEL")
                        .required(true)
                        .help("The category label text, as shown on the page"),
                ),
        )
        .subcommand(
            SubCommand::with_name("expand")
                .about("Prints a file with its {% ads %} tags expanded")
                .arg(Arg::with_name("FILE").required(true)),
        )
        .get_matches();

    match matches.subcommand() {
        ("build", Some(matches)) => build(matches),
        ("show", Some(matches)) => show(matches),
        ("expand", Some(matches)) => expand(matches),
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn build(matches: &ArgMatches) -> Result<()> {
    let mut config = load_config(matches)?;
    if let Some(output) = matches.value_of("output") {
        config.output = PathBuf::from(output);
    }
    if let Some(island) = matches.value_of("island") {
        config.island = Some(PathBuf::from(island));
    }

    let table = build_feed(&config)?;
    info!(categories = table.len(), "done");
    Ok(())
}

fn show(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    // required by clap
    let label = matches.value_of("LABEL").unwrap_or_default();

    let posts = PostParser::new(&config.posts_url).parse_posts(&config.posts_directory)?;
    let table = CategoryTable::from_posts(&posts, &config.date_format)?;
    let document = Document::with_modal(&config.modal);
    let mut controller = ModalController::attach(table, config.modal.clone(), document)?;
    controller.open(label);

    let ids = controller.ids();
    let dom = controller.dom();
    println!("{}", dom.text(&ids.title).unwrap_or_default());
    println!();
    print!("{}", dom.html(&ids.content).unwrap_or_default());
    Ok(())
}

fn expand(matches: &ArgMatches) -> Result<()> {
    let path = Path::new(matches.value_of("FILE").unwrap_or_default());
    let input = std::fs::read_to_string(path)
        .with_context(|| format!("Reading `{}`", path.display()))?;
    print!("{}", expand_tags(&input));
    Ok(())
}

fn load_config(matches: &ArgMatches) -> Result<Config> {
    match matches.value_of("config") {
        Some(path) => Config::from_project_file(Path::new(path)),
        None => Config::from_directory(&std::env::current_dir()?),
    }
}

use clap::Parser;
use colorize_lib::colorize_generate;
use colorize_lib::{ColorizeConfig, ColorizeError};
use std::fs;
use std::path::PathBuf;

const COLORIZE_INTRO: &str = r#"
               __            _
      _______ / /___  _____ (_)___  ___
     / ___/ __ \/ / __ \/ ___/ /_  / / _ \
    / /__/ /_/ / / /_/ / /  / / / /_/  __/
    \___/\____/_/\____/_/  /_/ /___/\___/

    Welcome to Colorize - re-skin any page with a palette!
"#;

#[derive(Parser)]
#[command(name = "Colorize")]
#[command(about = "Override matching colors in an HTML page")]
struct Args {
    /// Input HTML file.
    input: PathBuf,

    /// Output HTML file.
    output: PathBuf,

    /// JSON config with the palette and reactor mode.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Extra stylesheet applied after the page's own; may be repeated.
    #[arg(short, long = "stylesheet")]
    stylesheets: Vec<PathBuf>,
}

fn run(args: &Args) -> Result<(), ColorizeError> {
    let config = match &args.config {
        Some(path) => ColorizeConfig::load(path)?,
        None => ColorizeConfig::default(),
    };

    let html_content = fs::read_to_string(&args.input)?;
    log::info!("Successfully read the HTML file {}.", args.input.display());

    let extra_css = args
        .stylesheets
        .iter()
        .map(fs::read_to_string)
        .collect::<Result<Vec<_>, _>>()?;

    let output = colorize_generate::colorize::generate(&html_content, &extra_css, &config)?;
    fs::write(&args.output, output)?;
    log::info!("Wrote {}.", args.output.display());
    Ok(())
}

fn main() {
    env_logger::init();
    println!("{}", COLORIZE_INTRO);

    // parse the args given in terminal
    let args: Args = Args::parse();

    if let Err(e) = run(&args) {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

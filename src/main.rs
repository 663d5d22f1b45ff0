use clap::{Parser, Subcommand};
use formmark::{
    FormDocument, FormmarkError, PipelineBuilder, SessionFile, TemplateFile, DEFAULT_DISPLAY_WIDTH,
};
use formmark::core::{classify, LayoutTemplate, Point};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "formmark")]
#[command(about = "Mark item selections and quantities onto fixed-layout PDF order forms", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a session file onto a form and write the annotated copy
    Generate {
        /// The blank form
        input: PathBuf,
        /// JSON list of clicks with optional quantities
        session: PathBuf,
        /// Where to write the annotated form
        output: PathBuf,
        /// Layout template JSON (defaults to the built-in order form)
        #[arg(long)]
        layout: Option<PathBuf>,
        /// Width the clicks were recorded at, overriding the session file
        #[arg(long)]
        display_width: Option<f32>,
        /// Also outline every column band
        #[arg(long)]
        guides: bool,
    },

    /// Print the cell and item label under a click
    Resolve {
        x: f32,
        y: f32,
        #[arg(long)]
        layout: Option<PathBuf>,
        #[arg(long, default_value_t = DEFAULT_DISPLAY_WIDTH)]
        display_width: f32,
    },

    /// Print the built-in layout template as JSON
    Template,
}

fn load_template(layout: Option<&PathBuf>) -> Result<LayoutTemplate, FormmarkError> {
    match layout {
        Some(path) => LayoutTemplate::from_json_file(path),
        None => Ok(LayoutTemplate::default()),
    }
}

#[tokio::main]
async fn main() -> Result<(), FormmarkError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    run(Cli::parse().command).await.inspect_err(|e| log::error!("{e}"))
}

async fn run(command: Commands) -> Result<(), FormmarkError> {
    match command {
        Commands::Generate {
            input,
            session,
            output,
            layout,
            display_width,
            guides,
        } => {
            let session_file = SessionFile::from_json_file(&session)?;
            let width = display_width
                .or(session_file.display_width)
                .unwrap_or(DEFAULT_DISPLAY_WIDTH);

            let pipeline = PipelineBuilder::new()
                .with_template(load_template(layout.as_ref())?)
                .with_display_width(width)
                .with_calibration_guides(guides)
                .build();

            let form = FormDocument::open(&input)?;
            let mut form_session = pipeline.open(&form)?;
            pipeline.replay(&mut form_session, &session_file)?;
            for selection in form_session.store().iter() {
                log::info!(
                    "  {} ({}): quantity '{}'",
                    selection.label(),
                    selection.address(),
                    selection.quantity()
                );
            }

            let emitted = pipeline.generate(&form, &form_session).await?;
            fs::write(&output, &emitted.bytes)?;
            log::info!("Wrote {}", output.display());
        }

        Commands::Resolve {
            x,
            y,
            layout,
            display_width,
        } => {
            let template = load_template(layout.as_ref())?;
            let grid = template.grid_for_width(display_width)?;
            match classify(Point::new(x, y), &grid) {
                Ok(address) => {
                    println!("{} ({})", template.catalog().label_for(address), address.key());
                }
                Err(reason) => println!("no cell: {reason}"),
            }
        }

        Commands::Template => {
            println!("{}", serde_json::to_string_pretty(&LayoutTemplate::default())?);
        }
    }

    Ok(())
}

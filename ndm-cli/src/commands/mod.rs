use clap::Subcommand;
use ndmkit::options::DecodeOptions;
use std::path::PathBuf;

pub mod debug;
pub mod export;
pub mod inspect;
pub mod scan;

#[derive(Subcommand)]
pub enum Commands {
    /// Show the structure of an NDM file
    Inspect {
        /// NDM file
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List mesh nodes with vertex and face counts
    Meshes {
        /// NDM file
        file: PathBuf,
    },

    /// Dump decoder diagnostics for one mesh
    Debug {
        /// NDM file
        file: PathBuf,

        /// Mesh node name
        mesh: String,
    },

    /// Export decoded geometry as JSON
    Export {
        /// NDM file
        file: PathBuf,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Merge all meshes into one
        #[arg(long)]
        merge: bool,

        /// Apply node position/scale before merging
        #[arg(long, requires = "merge")]
        pretransform: bool,
    },

    /// Inspect every NDM file under a directory
    Scan {
        /// Directory to search
        dir: PathBuf,

        /// Also write the full results as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Commands {
    pub fn execute(&self, options: &DecodeOptions) -> anyhow::Result<()> {
        match self {
            Commands::Inspect { file, json } => inspect::inspect(file, options, *json),
            Commands::Meshes { file } => inspect::meshes(file, options),
            Commands::Debug { file, mesh } => debug::execute(file, mesh, options),
            Commands::Export {
                file,
                output,
                merge,
                pretransform,
            } => export::execute(file, output, options, *merge, *pretransform),
            Commands::Scan { dir, output } => scan::execute(dir, output.as_deref(), options),
        }
    }
}

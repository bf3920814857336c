//! vp9mv CLI
//!
//! Inspect and exercise the VP9 motion vector probability model

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use vp9mv_lib::codec::vp9::{
    adapt_mv_probs, global_block_center_mv, tables::MV_MAX, BlockSize, ComponentSymbols, GlobalMotionParams,
    GlobalMotionType, MotionVector, NmvContext, NmvContextCounts,
};
use vp9mv_lib::{init, Config};

#[derive(Parser)]
#[command(name = "vp9mv")]
#[command(about = "VP9 motion vector entropy model", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the default motion vector context as JSON
    Defaults {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show how motion vector components decompose into coded symbols
    Classify {
        /// Component values in 1/8 pel
        #[arg(allow_negative_numbers = true, required = true)]
        values: Vec<i32>,
    },

    /// Adapt a context to a frame's counts
    Adapt {
        /// Prior context (JSON); defaults when omitted
        #[arg(short, long)]
        prior: Option<PathBuf>,

        /// Symbol counts (JSON)
        #[arg(short, long)]
        counts: PathBuf,

        /// Adapt the high-precision probabilities too
        #[arg(long)]
        allow_hp: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Predict the global motion vector at a block centre
    GlobalMv {
        /// Block left edge in pixels
        #[arg(long, default_value = "0")]
        col: i32,

        /// Block top edge in pixels
        #[arg(long, default_value = "0")]
        row: i32,

        /// Block width in pixels
        #[arg(long, default_value = "8")]
        width: usize,

        /// Block height in pixels
        #[arg(long, default_value = "8")]
        height: usize,

        /// Zoom in 1/64 units
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        zoom: i32,

        /// Rotation in 1/16 degree units
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        rotation: i32,

        /// Translation row in 1/8 pel
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        mv_row: i16,

        /// Translation col in 1/8 pel
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        mv_col: i16,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config {
        verbose: cli.verbose,
        debug: cli.debug,
    };

    init(config)?;

    info!("vp9mv v{}", vp9mv_lib::VERSION);

    match cli.command {
        Commands::Defaults { output } => {
            cmd_defaults(output.as_deref())?;
        }
        Commands::Classify { values } => {
            cmd_classify(&values);
        }
        Commands::Adapt {
            prior,
            counts,
            allow_hp,
            output,
        } => {
            info!("Adapting with counts from {}", counts.display());
            cmd_adapt(prior.as_deref(), &counts, allow_hp, output.as_deref())?;
        }
        Commands::GlobalMv {
            col,
            row,
            width,
            height,
            zoom,
            rotation,
            mv_row,
            mv_col,
        } => {
            let bsize = BlockSize::from_dimensions(width, height)
                .ok_or_else(|| anyhow::anyhow!("Unsupported block size {}x{}", width, height))?;
            let gm_type = if zoom != 0 || rotation != 0 {
                GlobalMotionType::RotZoom
            } else if mv_row != 0 || mv_col != 0 {
                GlobalMotionType::Translation
            } else {
                GlobalMotionType::Zero
            };
            let params = GlobalMotionParams {
                gm_type,
                zoom,
                rotation,
                mv: MotionVector::new(mv_row, mv_col),
            };
            cmd_global_mv(col, row, bsize, &params);
        }
    }

    Ok(())
}

fn write_json<T: serde::Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

fn cmd_defaults(output: Option<&Path>) -> anyhow::Result<()> {
    write_json(&NmvContext::default(), output)
}

fn cmd_classify(values: &[i32]) {
    for &v in values {
        if v == 0 {
            println!("{:>7}: zero component, not coded", v);
            continue;
        }

        let s = ComponentSymbols::from_component(v);
        let note = if v.unsigned_abs() > MV_MAX as u32 + 1 {
            " (beyond the class 10 ceiling, not codable)"
        } else {
            ""
        };
        println!(
            "{:>7}: sign {} class {:>2} int {:>4} fp {} hp {}{}",
            v,
            if s.sign { '-' } else { '+' },
            s.class.index(),
            s.int_bits,
            s.fp,
            s.hp,
            note
        );
    }
}

fn cmd_adapt(
    prior: Option<&Path>,
    counts: &Path,
    allow_hp: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let pre_fc: NmvContext = match prior {
        Some(path) => read_json(path)?,
        None => NmvContext::default(),
    };
    pre_fc.validate()?;
    let counts: NmvContextCounts = read_json(counts)?;

    let mut fc = pre_fc;
    adapt_mv_probs(&pre_fc, &counts, allow_hp, &mut fc);
    info!("Adapted from {} motion vectors", counts.total());

    write_json(&fc, output)
}

fn cmd_global_mv(col: i32, row: i32, bsize: BlockSize, params: &GlobalMotionParams) {
    let mv = global_block_center_mv(col, row, bsize, params);
    println!("Block:  {}x{} at ({}, {})", bsize.width(), bsize.height(), col, row);
    println!("Model:  {:?}", params.gm_type);
    println!("MV:     row {} col {} (1/8 pel)", mv.row, mv.col);
}

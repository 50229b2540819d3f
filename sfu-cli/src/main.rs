use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sfu_core::{
    parse_operand, reference, tables, ulp_error, Opcode, RoundingMode, Sfu, SfuConfig, SfuOutput,
    TableFunction,
};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Bit-accurate SFU golden model")]
struct Cli {
    /// Rounding mode for the result converter (rne, rtz, rdn, rup, rmm)
    #[arg(long, global = true)]
    rounding: Option<RoundingMode>,

    /// JSON configuration file; --rounding and --debug override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate one operand
    Eval {
        #[arg(long)]
        op: Opcode,

        /// Hex bit pattern (0x3f800000) or decimal float
        input: String,

        /// Report the pre-rounding accumulator
        #[arg(long)]
        debug: bool,
    },

    /// Evaluate a run of bit patterns against the reference
    Sweep {
        #[arg(long)]
        op: Opcode,

        /// First bit pattern, hex or decimal float
        #[arg(long)]
        start: String,

        #[arg(long, default_value_t = 1 << 16)]
        count: u32,

        /// Distance between consecutive patterns
        #[arg(long, default_value_t = 1)]
        step: u32,

        /// ULP bound; patterns above it are counted and fail the run
        #[arg(long, default_value_t = 2.0)]
        max_ulp: f64,
    },

    /// Print the coefficient segments an opcode reads
    Table {
        #[arg(long)]
        op: Opcode,
    },
}

fn load_config(cli: &Cli, debug: bool) -> Result<SfuConfig> {
    let mut config = match cli.config.as_ref() {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            SfuConfig::from_json(&text)
                .with_context(|| format!("parse config {}", path.display()))?
        }
        None => SfuConfig::default(),
    };
    if let Some(rounding) = cli.rounding {
        config = config.with_rounding(rounding);
    }
    if debug {
        config = config.with_debug(true);
    }
    Ok(config)
}

fn print_output(op: Opcode, input: u32, out: &SfuOutput, debug: bool) {
    println!("{op}({input:#010x}) [{}]", f32::from_bits(input));
    println!("  data:  {:#010x} [{}]", out.data, out.data_f32());
    println!("  flags: {} ({:#04x})", out.exceptions, out.exceptions.bits());
    println!("  err:   {:#010x} [{:e}]", out.err, out.err_f32());
    if debug {
        println!("  trace: {:#018x}", out.booth_trace);
    }
}

fn sweep(sfu: &Sfu, op: Opcode, start: u32, count: u32, step: u32, max_ulp: f64) -> Result<()> {
    let mut worst = (0.0f64, start);
    let mut over = 0u32;
    let mut evaluated = 0u32;
    for i in 0..count {
        let Some(input) = i.checked_mul(step).and_then(|offset| start.checked_add(offset)) else {
            log::warn!("sweep stopped at the end of the 32-bit pattern space");
            break;
        };
        let out = sfu.evaluate(input, op);
        let expected = reference(op, f32::from_bits(input) as f64);
        let error = ulp_error(out.data, expected);
        evaluated += 1;
        if error > worst.0 {
            worst = (error, input);
        }
        if error > max_ulp {
            over += 1;
            log::debug!("{op}({input:#010x}) = {:#010x}: {error:.3} ulp", out.data);
        }
    }

    println!("Sweep {op}: {evaluated} patterns from {start:#010x} step {step}");
    println!("  worst: {:.3} ulp at {:#010x}", worst.0, worst.1);
    println!("  over {max_ulp} ulp: {over}");
    if over > 0 {
        bail!("{over} patterns exceed {max_ulp} ulp");
    }
    Ok(())
}

fn print_tables(op: Opcode) {
    let function = match op {
        Opcode::Exp2 => TableFunction::Exp2,
        Opcode::Rcp => TableFunction::Reciprocal,
        Opcode::Tanh => TableFunction::Tanh,
        Opcode::Sigmoid => TableFunction::Sigmoid,
    };
    for table in tables().iter().filter(|t| t.function() == function) {
        println!(
            "{function:?} octave {} ({} segments, c1 weight {}, c2 weight {})",
            table.octave(),
            table.segments().len(),
            table.c1_weight(),
            table.c2_weight()
        );
        for (index, segment) in table.segments().iter().enumerate() {
            println!(
                "  [{index:3}] base {:<12.8} c0 {:#010x} c1 {:#08x} c2 {:#06x}",
                table.base(index),
                segment.c0,
                segment.c1,
                segment.c2
            );
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Eval { op, input, debug } => {
            let bits = parse_operand(input)?;
            let sfu = Sfu::new(load_config(&cli, *debug)?);
            let out = sfu.evaluate(bits, *op);
            print_output(*op, bits, &out, sfu.config().debug);
        }
        Commands::Sweep {
            op,
            start,
            count,
            step,
            max_ulp,
        } => {
            let start = parse_operand(start)?;
            let sfu = Sfu::new(load_config(&cli, false)?);
            log::info!("sweeping {op} with {} rounding", sfu.config().rounding);
            sweep(&sfu, *op, start, *count, *step, *max_ulp)?;
        }
        Commands::Table { op } => print_tables(*op),
    }
    Ok(())
}

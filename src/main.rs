use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::TimeDelta;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use brfcorr_core::{
    BatchConfig, CorrectionConfig, LOCAL_TIME_OFFSET_HOURS, Masl, MetersOfWater,
    NanometersPerSecondSquared, Polarity, StationId, StationInputs, StationRecord,
    TIDE_UNIT_DIVISOR, TimeSeries,
};
use brfcorr_io::{
    BrfReader, CorrectedWriter, IoError, StationReader, WideDataset, WideSeriesReader,
};

#[derive(Parser)]
#[command(name = "brfcorr")]
#[command(about = "Barometric and Earth-tide correction of groundwater levels")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Input files shared by every station.
#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// Wide CSV of raw water levels (masl), local time
    #[arg(long)]
    levels: PathBuf,

    /// Wide CSV of barometric pressure (m of water)
    #[arg(long)]
    pressure: PathBuf,

    /// Metadata lines to skip before the pressure header row
    #[arg(long, default_value_t = 0)]
    pressure_preamble: usize,

    /// Wide CSV of synthetic Earth tides (nm/s**2)
    #[arg(long)]
    tides: PathBuf,

    /// Station list CSV (station_id,name,latitude,longitude,elevation)
    #[arg(long)]
    stations: PathBuf,

    /// Directory holding one `brf_{station_id}.csv` per fitted well
    #[arg(long)]
    brf_dir: PathBuf,
}

/// Correction parameters.
#[derive(Args, Debug, Clone)]
struct CorrectionArgs {
    /// Resampling interval in minutes (must match the BRF lag step)
    #[arg(long, default_value_t = 60)]
    sampling_minutes: i64,

    /// Hours added to pressure and tide timestamps to reach station local time
    #[arg(long, default_value_t = LOCAL_TIME_OFFSET_HOURS, allow_negative_numbers = true)]
    utc_offset_hours: i64,

    /// Divisor converting the tidal response from feet to meters
    #[arg(long, default_value_t = TIDE_UNIT_DIVISOR)]
    tide_unit_divisor: f64,

    /// How the correction is applied: "add" or "subtract"
    #[arg(long, default_value = "add")]
    polarity: String,
}

#[derive(Subcommand)]
enum Command {
    /// Correct every listed station and write one CSV per corrected well
    Correct {
        #[command(flatten)]
        inputs: InputArgs,

        #[command(flatten)]
        correction: CorrectionArgs,

        /// Output directory for corrected files and the batch summary
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Station to leave uncorrected (repeatable), e.g. pumping-influenced wells
        #[arg(long = "exclude")]
        excluded: Vec<String>,

        /// Restrict the run to these stations (repeatable, defaults to all)
        #[arg(long = "station")]
        only: Vec<String>,
    },
}

fn parse_polarity(s: &str) -> Result<Polarity> {
    match s {
        "add" => Ok(Polarity::Add),
        "subtract" => Ok(Polarity::Subtract),
        other => anyhow::bail!("unknown polarity: {other} (expected add or subtract)"),
    }
}

fn parse_station_ids(raw: &[String]) -> Result<BTreeSet<StationId>> {
    raw.iter()
        .map(|s| StationId::parse(s).with_context(|| format!("blank station ID: {s:?}")))
        .collect()
}

fn build_config(args: &CorrectionArgs) -> Result<CorrectionConfig> {
    let config = CorrectionConfig::new(TimeDelta::minutes(args.sampling_minutes))?
        .with_utc_offset(TimeDelta::hours(args.utc_offset_hours))
        .with_tide_unit_divisor(args.tide_unit_divisor)
        .with_polarity(parse_polarity(&args.polarity)?);
    Ok(config)
}

type StationSeries = (
    TimeSeries<Masl>,
    TimeSeries<MetersOfWater>,
    TimeSeries<NanometersPerSecondSquared>,
);

fn station_series(
    id: &StationId,
    levels: &WideDataset,
    pressure: &WideDataset,
    tides: &WideDataset,
) -> Result<StationSeries, IoError> {
    Ok((levels.series(id)?, pressure.series(id)?, tides.series(id)?))
}

/// Assemble one station's inputs, or `None` when a dataset has nothing for it.
fn station_inputs(
    record: StationRecord,
    levels: &WideDataset,
    pressure: &WideDataset,
    tides: &WideDataset,
    brf_dir: &Path,
) -> Result<Option<StationInputs>> {
    let id = &record.id;
    let (water_levels, pressure, tide) = match station_series(id, levels, pressure, tides) {
        Ok(s) => s,
        Err(e) => {
            warn!(station = %id, error = %e, "station has no usable data, skipping");
            return Ok(None);
        }
    };

    let brf_path = brf_dir.join(format!("brf_{id}.csv"));
    let brf = if brf_path.exists() {
        Some(
            BrfReader::new(&brf_path)
                .read()
                .with_context(|| format!("failed to read BRF file {}", brf_path.display()))?,
        )
    } else {
        None
    };

    Ok(Some(StationInputs {
        record,
        water_levels,
        pressure,
        tide,
        brf,
    }))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Correct {
            inputs,
            correction,
            output_dir,
            excluded,
            only,
        } => {
            let config = build_config(&correction).context("invalid correction parameters")?;
            let excluded = parse_station_ids(&excluded)?;
            let only = parse_station_ids(&only)?;

            let stations = StationReader::new(&inputs.stations)
                .read()
                .context("failed to read station list")?;
            let levels = WideSeriesReader::new(&inputs.levels)
                .read()
                .context("failed to read water levels")?;
            let pressure = WideSeriesReader::new(&inputs.pressure)
                .with_preamble_lines(inputs.pressure_preamble)
                .read()
                .context("failed to read barometric pressure")?;
            let tides = WideSeriesReader::new(&inputs.tides)
                .read()
                .context("failed to read Earth tides")?;

            let mut station_data = Vec::new();
            for record in stations {
                if !only.is_empty() && !only.contains(&record.id) {
                    continue;
                }
                if let Some(s) =
                    station_inputs(record, &levels, &pressure, &tides, &inputs.brf_dir)?
                {
                    station_data.push(s);
                }
            }
            info!(n_stations = station_data.len(), "station inputs assembled");

            let report = BatchConfig::new(config)
                .with_excluded(excluded)
                .run(&station_data);

            let writer = CorrectedWriter::new(&output_dir)
                .context("failed to create output directory")?;
            let summary = writer
                .write_batch(&report)
                .context("failed to write corrected water levels")?;

            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

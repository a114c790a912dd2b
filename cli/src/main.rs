use clap::{Parser, Subcommand};
use hound::{SampleFormat, WavSpec};
use log::{info, warn};
use mpda_core::pcm::{downmix_to_mono, f32_to_i16, i16_to_f32};
use mpda_core::{Decoded, ModemConfig, ProtocolMode, Receiver, Transmitter, SAMPLE_RATE};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("no text given")]
    NoText,
    #[error("unsupported WAV format: {0:?} {1} bits")]
    UnsupportedFormat(SampleFormat, u16),
}

#[derive(Parser)]
#[command(name = "mpda")]
#[command(about = "Acoustic text modem using multi-parallel differential ASK")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode text to a mono 16-bit WAV file
    Encode {
        /// Output WAV file
        #[arg(value_name = "OUTPUT.WAV")]
        output: PathBuf,

        /// Text to send
        #[arg(value_name = "TEXT", required_unless_present = "input", conflicts_with = "input")]
        text: Option<String>,

        /// Read the text from a file instead
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Parallel carrier tracks (1, 4 or 8)
        #[arg(short, long, default_value = "4")]
        tracks: usize,

        /// Cycles per second
        #[arg(short, long, default_value = "10")]
        speed: u32,

        /// Output sample rate in Hz
        #[arg(long, default_value_t = SAMPLE_RATE)]
        sample_rate: u32,
    },

    /// Stream a WAV file through the receiver and print the decoded text
    Decode {
        /// Input WAV file
        #[arg(value_name = "INPUT.WAV")]
        input: PathBuf,

        /// Parallel carrier tracks (must match the sender)
        #[arg(short, long, default_value = "4")]
        tracks: usize,

        /// Cycles per second (must match the sender)
        #[arg(short, long, default_value = "10")]
        speed: u32,

        /// Samples fed to the receiver per call
        #[arg(short, long, default_value = "4096")]
        chunk_size: usize,
    },

    /// Print link parameters for a configuration
    Info {
        #[arg(short, long, default_value = "4")]
        tracks: usize,

        #[arg(short, long, default_value = "10")]
        speed: u32,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Encode {
            output,
            text,
            input,
            tracks,
            speed,
            sample_rate,
        } => {
            let text = match (text, input) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)?,
                (None, None) => return Err(CliError::NoText.into()),
            };
            let config = ModemConfig::new(tracks, speed)?.with_sample_rate(sample_rate)?;
            encode_command(&text, &output, config)?
        }
        Commands::Decode {
            input,
            tracks,
            speed,
            chunk_size,
        } => decode_command(&input, tracks, speed, chunk_size)?,
        Commands::Info { tracks, speed } => info_command(ModemConfig::new(tracks, speed)?),
    }

    Ok(())
}

fn encode_command(
    text: &str,
    output_path: &Path,
    config: ModemConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let transmitter = Transmitter::new(config);
    let samples = transmitter.generate(text);
    if samples.is_empty() {
        warn!("empty text, writing an empty WAV file");
    }
    info!(
        "Encoded {} chars on {} tracks at speed {}: {} samples ({:.2} s)",
        text.chars().count(),
        config.track_count(),
        config.speed(),
        samples.len(),
        samples.len() as f32 / config.sample_rate() as f32
    );

    let spec = WavSpec {
        channels: 1,
        sample_rate: config.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let file = File::create(output_path)?;
    let mut writer = hound::WavWriter::new(file, spec)?;
    for sample in samples {
        writer.write_sample(f32_to_i16(sample))?;
    }
    writer.finalize()?;

    info!("Wrote {}", output_path.display());
    Ok(())
}

fn read_wav(path: &Path) -> Result<(Vec<f32>, WavSpec), Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let mut reader = hound::WavReader::new(file)?;
    let spec = reader.spec();
    info!(
        "Read WAV: {} Hz, {} channels, {} bits",
        spec.sample_rate, spec.channels, spec.bits_per_sample
    );

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader.samples::<f32>().collect::<Result<_, _>>()?,
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(i16_to_f32))
            .collect::<Result<_, _>>()?,
        (SampleFormat::Int, bits @ (8 | 24 | 32)) => {
            let scale = 1.0 / (1u64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()?
        }
        (format, bits) => return Err(CliError::UnsupportedFormat(format, bits).into()),
    };

    Ok((downmix_to_mono(&interleaved, spec.channels as usize), spec))
}

fn decode_command(
    input_path: &Path,
    tracks: usize,
    speed: u32,
    chunk_size: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let (samples, spec) = read_wav(input_path)?;
    let config = ModemConfig::new(tracks, speed)?.with_sample_rate(spec.sample_rate)?;
    let mut receiver = Receiver::with_config(config);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut chars = 0usize;
    let mut transmissions = 0usize;
    let mut emit = |unit: Decoded, out: &mut dyn Write| -> std::io::Result<()> {
        match unit {
            Decoded::Char(c) => {
                chars += 1;
                write!(out, "{}", c)
            }
            Decoded::EndOfTransmission => {
                transmissions += 1;
                writeln!(out)
            }
        }
    };

    for chunk in samples.chunks(chunk_size.max(1)) {
        if let Some(unit) = receiver.process_audio(chunk) {
            emit(unit, &mut out)?;
        }
        for unit in receiver.decoded() {
            emit(unit, &mut out)?;
        }
    }
    out.flush()?;

    if chars == 0 && transmissions == 0 {
        warn!("No transmission found in {}", input_path.display());
    } else {
        info!(
            "Decoded {} chars, {} complete transmission(s)",
            chars, transmissions
        );
    }
    Ok(())
}

fn info_command(config: ModemConfig) {
    let mode = ProtocolMode::Mpda;
    println!("mode:        {} {}", mode.name(), mode.version());
    println!("tracks:      {}", config.track_count());
    println!("carriers:    {:?} Hz", config.carrier_frequencies());
    println!("speed:       {} cycles/s", config.speed());
    println!("cycle:       {} samples", config.cycle_samples());
    println!("threshold:   {:.2}", config.threshold_ratio());
    println!("bit rate:    {:.1} bit/s", config.bit_rate());
}

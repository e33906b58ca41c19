#![forbid(unsafe_code)]

use std::fs::{File, OpenOptions};
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use zedaudio_cli::codec::SysfsTransmitEnable;
use zedaudio_cli::player::{self, PlaybackOptions};

const DEFAULT_DEVICE: &str = "/dev/zedaudio0";
const DEFAULT_TX_ENABLE: &str = "/sys/devices/soc0/amba_pl/77600000.axi_i2s_adi/tx_enabled";

/// Stream a WAV file into the audio FIFO character device.
#[derive(Debug, Parser)]
#[command(name = "zedaudio-play")]
struct Args {
    /// WAV file to play.
    wav: PathBuf,

    /// Audio FIFO character device receiving transmit words.
    #[arg(long, default_value = DEFAULT_DEVICE)]
    device: PathBuf,

    /// Sysfs attribute controlling the codec transmit line.
    #[arg(long, default_value = DEFAULT_TX_ENABLE)]
    tx_enable: PathBuf,

    /// First sample (frame index) to play.
    #[arg(long, default_value_t = 0)]
    start_sample: u64,

    /// How many samples to play; defaults to the rest of the file.
    #[arg(long)]
    sample_count: Option<u64>,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // Usage problems exit 1; --help and --version exit 0.
            let code = u8::from(err.use_stderr());
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            exit_code_for(&err)
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut source =
        File::open(&args.wav).with_context(|| format!("open {}", args.wav.display()))?;

    // Buffered so the device sees one syscall per burst rather than one
    // per transmit word.
    let device = OpenOptions::new()
        .write(true)
        .open(&args.device)
        .with_context(|| format!("open audio device {}", args.device.display()))?;
    let sink = BufWriter::new(device);

    let mut codec = SysfsTransmitEnable::new(&args.tx_enable);
    let opts = PlaybackOptions {
        start_sample: args.start_sample,
        sample_count: args.sample_count,
    };
    player::play(&mut source, sink, &mut codec, opts)?;
    Ok(())
}

/// Map the failure to the platform error code where one exists, so the
/// shell sees the errno the kernel reported.
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    for cause in err.chain() {
        if let Some(io_err) = cause.downcast_ref::<std::io::Error>() {
            if let Some(code) = io_err.raw_os_error() {
                return ExitCode::from(u8::try_from(code).unwrap_or(1).max(1));
            }
        }
    }
    ExitCode::FAILURE
}

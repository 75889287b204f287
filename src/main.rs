use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::{generate, Shell};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use pathogenicity_analyzer::input::{read_input_file, read_payload};
use pathogenicity_analyzer::{
    AnalysisOutput, AnalyzerConfig, ClassificationEngine, ErrorReport, ReportFormat,
    ReportGenerator, VariantAnalyzer,
};

/// Genomic variant pathogenicity analyzer
#[derive(Parser, Debug)]
#[command(
    name = "pathogenicity-analyzer",
    version,
    about = "Classify genomic variants by pathogenicity and disease category",
    long_about = r#"
Reads VCF-like, FASTA-like or raw nucleotide text and reports:
- Known pathogenic variants from the built-in catalog
- Model-estimated pathogenic probability for everything else
- Likely disease category, risk tier and clinical recommendations

With no FILE, input is read from stdin. A JSON object with a "file_content"
string is unwrapped; any other text is analyzed as-is.
"#
)]
struct Cli {
    /// Variant file (.vcf, .fa, .txt, optionally .gz / .bz2 / .xz)
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Only report the core disease set, with capped confidences
    #[arg(short, long)]
    restricted: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Write the report into this directory instead of stdout
    #[arg(short, long, value_name = "DIR", value_hint = ValueHint::DirPath)]
    output: Option<PathBuf>,

    /// TOML configuration for model training and the restricted disease list
    #[arg(short, long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Number of threads (0 = auto-detect)
    #[arg(short, long, default_value = "0")]
    threads: usize,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions
    Completions { shell: Shell },
    /// List supported input formats
    Formats,
    /// List the core diseases used by --restricted
    Diseases,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Json,
    Csv,
    Tsv,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> ReportFormat {
        match format {
            OutputFormat::Json => ReportFormat::Json,
            OutputFormat::Csv => ReportFormat::Csv,
            OutputFormat::Tsv => ReportFormat::Tsv,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
            return Ok(());
        }
        Some(Commands::Formats) => {
            list_formats();
            return Ok(());
        }
        Some(Commands::Diseases) => {
            list_diseases(&cli)?;
            return Ok(());
        }
        None => {}
    }

    init_logging(cli.verbose);
    init_thread_pool(cli.threads)?;
    info!("Using {} threads", rayon::current_num_threads());

    let output = run_analysis(&cli).unwrap_or_else(|err| {
        AnalysisOutput::Error(ErrorReport::new(format!("{:#}", err)))
    });

    let generator = ReportGenerator::new(cli.pretty);
    match &cli.output {
        Some(dir) => {
            let path = generator.write_to_dir(&output, cli.format.into(), dir)?;
            eprintln!(
                "{} Report saved to: {}",
                style("✓").green().bold(),
                style(path.display()).cyan()
            );
        }
        None => generator.write(&output, cli.format.into(), io::stdout().lock())?,
    }

    Ok(())
}

fn run_analysis(cli: &Cli) -> Result<AnalysisOutput> {
    let content = match &cli.input {
        Some(path) => read_input_file(path)?,
        None => read_payload(io::stdin().lock())?,
    };

    let config = load_config(cli)?;
    let mut analyzer = VariantAnalyzer::new();
    if let Some(config) = &config {
        analyzer = analyzer.with_engine(train_engine(config)?);
    }

    Ok(if cli.restricted {
        let diseases = config
            .map(|config| config.restricted_diseases)
            .unwrap_or_else(|| AnalyzerConfig::default().restricted_diseases);
        analyzer.analyze_restricted(&content, &diseases).into()
    } else {
        analyzer.analyze(&content).into()
    })
}

fn load_config(cli: &Cli) -> Result<Option<AnalyzerConfig>> {
    cli.config
        .as_ref()
        .map(|path| {
            AnalyzerConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))
        })
        .transpose()
}

fn train_engine(config: &AnalyzerConfig) -> Result<Arc<ClassificationEngine>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!(
        "Training models on {} synthetic variants...",
        config.model.n_samples
    ));

    let engine = ClassificationEngine::train(&config.model);
    match &engine {
        Ok(engine) => pb.finish_with_message(format!(
            "Models trained in {:.1}s",
            engine.summary().training_time.as_secs_f64()
        )),
        Err(_) => pb.abandon_with_message("Training failed"),
    }

    Ok(Arc::new(engine.context("Failed to train classification models")?))
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn list_formats() {
    println!("{}", style("Supported Input Formats:").bold().cyan());
    println!();

    let formats = [
        (
            "VCF",
            "Variant Call Format (.vcf, .vcf.gz)",
            "Tab-delimited CHROM POS ID REF ALT QUAL FILTER INFO records",
        ),
        (
            "FASTA",
            "FASTA (.fa, .fasta)",
            "Sequence records scanned for catalogued pathogenic motifs",
        ),
        (
            "Raw DNA",
            "Plain nucleotide text (.txt)",
            "A single sequence summarized as one variant",
        ),
    ];

    for (name, ext, desc) in formats {
        println!("  {} - {}", style(name).green().bold(), style(ext).yellow());
        println!("         {}", style(desc).dim());
    }
    println!();
    println!(
        "  {}",
        style("Compressed inputs (.gz, .bgz, .bz2, .xz) are decompressed by extension").dim()
    );
}

fn list_diseases(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?.unwrap_or_default();

    println!("{}", style("Core Diseases (--restricted):").bold().cyan());
    println!();
    for disease in &config.restricted_diseases {
        println!("  {} {}", style("•").green(), disease);
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("pathogenicity_analyzer={}", level))
        .with_writer(io::stderr)
        .init();
}

fn init_thread_pool(threads: usize) -> Result<()> {
    let num_threads = if threads == 0 {
        num_cpus::get()
    } else {
        threads
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .map_err(|e| anyhow::anyhow!("Failed to initialize thread pool: {}", e))?;

    Ok(())
}

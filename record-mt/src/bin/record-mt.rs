use clap::{Arg, ArgAction, Command};
use record_mt::{
    BatchEngine, Config, Directive, GoogleTranslateProvider, MachineTranslator, MockMode,
    MockTranslator, parse_records, to_pretty_json,
};
use std::fs;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("record-mt")
        .version("0.1.0")
        .about("Translate selected fields of a JSON record file")
        .arg(
            Arg::new("input")
                .help("JSON file holding an array of flat objects")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("key")
                .long("key")
                .short('k')
                .help("Field to translate as key[:newKey[:lang]] (repeatable; default: every field of the first record)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("source-lang")
                .long("source")
                .short('s')
                .help("Source language code (default: az)")
                .default_value("az"),
        )
        .arg(
            Arg::new("target-lang")
                .long("target")
                .short('t')
                .help("Target language for seeded directives (default: en)")
                .default_value("en"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Where to write the translated records")
                .default_value("data_modified.json"),
        )
        .arg(
            Arg::new("concurrency")
                .long("concurrency")
                .short('c')
                .help("Maximum translation calls in flight (overrides RECORD_MT_MAX_CONCURRENCY)")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Use mock translator instead of Google Translate")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log every translation call")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive((if verbose { "debug" } else { "warn" }).parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let input = matches
        .get_one::<String>("input")
        .ok_or("missing input file")?;
    let source_lang = matches
        .get_one::<String>("source-lang")
        .ok_or("missing source language")?;
    let target_lang = matches
        .get_one::<String>("target-lang")
        .ok_or("missing target language")?;
    let output = matches
        .get_one::<String>("output")
        .ok_or("missing output path")?;

    let mut config = Config::from_env()?;
    if let Some(limit) = matches.get_one::<usize>("concurrency") {
        config.max_concurrency = *limit;
    }

    // 1. Read records
    let content = fs::read_to_string(input)
        .map_err(|e| format!("Failed to read file '{}': {}", input, e))?;
    let mut records = parse_records(&content)?;

    // 2. Pick directives, seeding from the first record when none are given
    let directives: Vec<Directive> = match matches.get_many::<String>("key") {
        Some(args) => args
            .map(|arg| Directive::from_arg(arg))
            .collect::<Result<_, _>>()?,
        None => records
            .first()
            .map(|first| Directive::defaults_for(first, target_lang))
            .unwrap_or_default(),
    };

    if verbose {
        eprintln!("📝 {} records from {}", records.len(), input);
        for d in &directives {
            eprintln!("   {} → {} ({} → {})", d.source_key, d.target_key, source_lang, d.target_lang);
        }
    }

    // 3. Translate
    let translator: Arc<dyn MachineTranslator> = if matches.get_flag("mock") {
        Arc::new(MockTranslator::new(MockMode::Suffix))
    } else {
        Arc::new(GoogleTranslateProvider::new(config.client())?)
    };
    let engine = BatchEngine::new(translator, config.engine());
    let report = engine
        .translate_batch(&mut records, &directives, source_lang)
        .await?;

    // 4. Write, including partial results
    fs::write(output, to_pretty_json(&records)?)
        .map_err(|e| format!("Failed to write '{}': {}", output, e))?;

    eprintln!(
        "✅ {} of {} translations written to {}",
        report.translated, report.units, output
    );

    if !report.is_complete() {
        for failure in &report.failures {
            eprintln!(
                "❌ record {} field '{}' ({} → {}): {}",
                failure.record_index,
                failure.source_key,
                failure.source_lang,
                failure.target_lang,
                failure.error
            );
        }
        report.into_result()?;
    }

    Ok(())
}

//! Checks that the configured environment can serve requests: fact store,
//! classification backend and speech service.

use product_insight::domain::narration::SpeechSynthesizer;
use product_insight::infra::speech::HttpSpeechSynthesizer;
use product_insight::storage::seed;
use product_insight::{ClassifierGateway, Config, FactStore};
use std::time::Duration;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--seed]\n\
         \n\
         Reads env vars (or .env):\n\
           DATABASE_URL, CLASSIFIER_URL, TRANSLATOR_URL, TTS_URL, LABEL_MAPPING_PATH\n\
         --seed creates the schema and loads the demo catalogue if empty.\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "product_insight=warn".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let seed_requested = args.iter().any(|a| a == "--seed");

    println!("> Preflight:");
    println!("  DATABASE_URL={}", config.database_url);
    println!("  CLASSIFIER_URL={}", config.classifier_url.as_deref().unwrap_or("(unset)"));
    println!("  TRANSLATOR_URL={}", config.translator_url.as_deref().unwrap_or("(unset)"));
    println!("  TTS_URL={}", config.tts_url.as_deref().unwrap_or("(unset)"));
    println!("  STATIC_ROOT={}", config.static_root.display());

    let mut failures = 0;

    // Fact store
    let store = FactStore::connect(&config.database_url).await?;
    if seed_requested || config.seed_demo_data {
        seed::ensure_schema(store.pool()).await?;
        let inserted = seed::load_demo_catalogue(store.pool()).await?;
        println!("  Seeded demo catalogue ({} products inserted).", inserted);
    }
    match store.list_products().await {
        Ok(products) if products.is_empty() => {
            eprintln!("  Warning: fact store is reachable but has no products.");
        }
        Ok(products) => println!("  Fact store OK ({} products).", products.len()),
        Err(e) => {
            eprintln!("  Fact store check failed: {}", e);
            failures += 1;
        }
    }

    // Label mapping
    if let Some(path) = &config.label_mapping_path {
        match product_insight::domain::label::LabelMapping::load_from_file(path) {
            Ok(mapping) => println!("  Label mapping OK ({} labels).", mapping.len()),
            Err(e) => {
                eprintln!("  Label mapping failed to load: {:#}", e);
                failures += 1;
            }
        }
    }

    // Classification backend
    let classifier = ClassifierGateway::from_config(&config)?;
    if classifier.is_configured() {
        match classifier.ping().await {
            Ok(status) => println!("  Classification backend answered HTTP {}.", status.as_u16()),
            Err(e) => {
                eprintln!("  Classification backend unreachable: {}", e);
                failures += 1;
            }
        }
    } else {
        eprintln!("  Warning: CLASSIFIER_URL is not set; /predict will answer 503.");
    }

    // Speech service
    match &config.tts_url {
        Some(url) => {
            let synth = HttpSpeechSynthesizer::new(url, Duration::from_secs(10))?;
            match synth.voices().await {
                Ok(voices) => println!("  Speech service OK ({} voices).", voices.len()),
                Err(e) => {
                    eprintln!("  Speech service unreachable: {:#}", e);
                    failures += 1;
                }
            }
        }
        None => eprintln!("  Warning: TTS_URL is not set; answers will be text-only."),
    }

    if failures > 0 {
        anyhow::bail!("preflight found {} problem(s)", failures);
    }
    println!("> Preflight OK.");
    Ok(())
}

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use versewise::app::App;
use versewise::classify::{IntentClassifier, ResponseFormatClassifier, ScopeClassifier};
use versewise::cli::{Cli, Commands, ConfigAction};
use versewise::config::Config;
use versewise::corpus::BibleCorpus;
use versewise::embedding::{build_provider, EmbeddingProvider};
use versewise::error::{Result, VersewiseError};
use versewise::retrieval::{render_search_result, render_statistics, render_verses, SearchOptions};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(cli.verbose);

    let config_path = cli.config;
    let profile = cli.profile;

    match cli.command {
        Commands::Search {
            query,
            limit,
            min_score,
            translation,
            json,
        } => {
            let config = load_config(config_path, profile)?;
            let options = SearchOptions {
                max_results: limit,
                min_score,
                version_filter: translation,
            };
            cmd_search(config, &query, &options, json)?;
        }
        Commands::Classify { query, json } => {
            let config = load_config(config_path, profile)?;
            cmd_classify(&config, &query, json)?;
        }
        Commands::Stats { query, translation } => {
            let config = load_config(config_path, profile)?;
            cmd_stats(&config, &query, translation.as_deref())?;
        }
        Commands::Verse {
            book,
            chapter,
            verse,
            to,
            context,
            translation,
        } => {
            let config = load_config(config_path, profile)?;
            cmd_verse(&config, &book, chapter, verse, to, context, translation.as_deref())?;
        }
        Commands::Repl { session } => {
            let config = load_config(config_path, profile)?;
            cmd_repl(config, session)?;
        }
        Commands::Config { action } => {
            cmd_config(config_path, profile, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "versewise=debug" } else { "versewise=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_search(config: Config, query: &str, options: &SearchOptions, json: bool) -> Result<()> {
    let app = App::new(config)?;
    let result = app.engine().search(query, options);

    if json {
        println!("{}", to_json(&result)?);
    } else {
        print!("{}", render_search_result(&result));
    }
    Ok(())
}

fn cmd_classify(config: &Config, query: &str, json: bool) -> Result<()> {
    let provider = load_provider(config)?;
    let registry = config.classifier.load_registry()?;

    let scope = ScopeClassifier::new(provider.clone(), &registry)?.extract(query);
    let intent = IntentClassifier::new(provider.clone(), &registry)?.classify(scope.search_query());
    let format = ResponseFormatClassifier::new(provider, &registry)?.classify(query);

    if json {
        let value = serde_json::json!({
            "query": query,
            "scope": scope,
            "intent": intent,
            "response_format": format,
            "requires_llm": format.requires_llm(),
        });
        println!("{}", to_json(&value)?);
        return Ok(());
    }

    println!("Query:           {}", query);
    println!("Scope:           {} (confidence {:.3})", scope, scope.confidence);
    if scope.is_scoped() {
        println!("Search text:     {}", scope.search_query());
    }
    println!("Intent:          {} ({})", intent.intent_type.as_str(), intent.reason);
    if let Some(keyword) = &intent.keyword {
        println!("Keyword:         {}", keyword);
    }
    println!(
        "Response format: {}{}",
        format,
        if format.requires_llm() { " (needs LLM)" } else { "" }
    );
    Ok(())
}

fn cmd_stats(config: &Config, query: &str, version: Option<&str>) -> Result<()> {
    let corpus = BibleCorpus::load(&config.corpus.resolved_translations())?;
    let provider = load_provider(config)?;
    let registry = config.classifier.load_registry()?;

    let scope = ScopeClassifier::new(provider, &registry)?
        .extract(query)
        .with_canonical_books(&corpus);
    let stats = corpus.keyword_statistics(scope.search_query().trim(), &scope, version);

    if scope.is_scoped() {
        println!("Scope: {}", scope);
    }
    print!("{}", render_statistics(&stats));
    Ok(())
}

fn cmd_verse(
    config: &Config,
    book: &str,
    chapter: u32,
    verse: Option<u32>,
    to: Option<u32>,
    context: Option<u32>,
    version: Option<&str>,
) -> Result<()> {
    let corpus = BibleCorpus::load(&config.corpus.resolved_translations())?;

    let verses = match (verse, to, context) {
        (None, _, _) => corpus.get_chapter(book, chapter, version).iter().collect(),
        (Some(v), Some(end), _) => corpus.verse_range(book, chapter, v, end, version),
        (Some(v), None, Some(n)) => corpus.verse_with_context(book, chapter, v, n, version),
        (Some(v), None, None) => corpus.get_verse(book, chapter, v, version).into_iter().collect(),
    };

    if verses.is_empty() {
        println!("No verses found for {} {}", book, chapter);
    } else {
        println!("{}", render_verses(&verses));
    }
    Ok(())
}

fn cmd_repl(config: Config, session: Option<String>) -> Result<()> {
    let session_id = session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let rt = tokio::runtime::Runtime::new().map_err(|e| VersewiseError::Io {
        source: e,
        context: "Failed to create tokio runtime".to_string(),
    })?;
    let _guard = rt.enter();

    let app = App::new(config)?;
    let sweeper = app.spawn_session_sweeper()?;

    println!("Versewise interactive search (session {})", session_id);
    println!("Commands: :history, :clear, :stats, :quit");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let options = SearchOptions::default();

    loop {
        print!("> ");
        stdout.flush().ok();

        let mut line = String::new();
        let read = stdin.lock().read_line(&mut line).map_err(|e| VersewiseError::Io {
            source: e,
            context: "Failed to read input".to_string(),
        })?;
        if read == 0 {
            break;
        }

        match line.trim() {
            "" => continue,
            ":quit" | ":q" => break,
            ":clear" => {
                app.sessions().clear_session(&session_id);
                println!("Session cleared");
            }
            ":history" => {
                let memory = app.sessions().get_or_create(&session_id);
                let memory = memory
                    .lock()
                    .map_err(|_| VersewiseError::Session("Session memory poisoned".to_string()))?;
                for message in memory.messages() {
                    println!("[{:?}] {}", message.role, message.content);
                }
            }
            ":stats" => {
                println!("{}", to_json(&app.engine().stats())?);
                println!("Active sessions: {}", app.sessions().active_session_count());
            }
            query => {
                let result = app.ask(&session_id, query, &options);
                print!("{}", render_search_result(&result));
            }
        }
    }

    sweeper.abort();
    Ok(())
}

fn cmd_config(
    config_path: Option<PathBuf>,
    profile: Option<String>,
    action: ConfigAction,
) -> Result<()> {
    match action {
        ConfigAction::Show { section } => {
            let config = load_config(config_path, profile)?;
            let value = serde_json::to_value(&config).map_err(|e| VersewiseError::Json {
                source: e,
                context: "Failed to serialize config".to_string(),
            })?;

            let value = match section {
                Some(section) => value.get(&section).cloned().ok_or_else(|| {
                    VersewiseError::Config(format!("Unknown config section: {}", section))
                })?,
                None => value,
            };
            println!("{}", to_json(&value)?);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
            println!("  Translations: {}", config.corpus.translations.len());
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            Config::default().save(&path)?;
            println!("✓ Configuration initialized at: {}", path.display());
            println!("  Place translation JSON files at the [corpus] paths before searching");
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>, profile: Option<String>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'versewise config init' to create one."
        );
        let mut config = Config::default();
        config.apply_env_overrides();
        if let Some(profile) = profile {
            config.apply_profile(&profile)?;
        }
        return Ok(config);
    }

    match profile {
        Some(profile) => Config::load_with_profile(&path, &profile),
        None => Config::load(&path),
    }
}

fn load_provider(config: &Config) -> Result<Arc<dyn EmbeddingProvider>> {
    Ok(build_provider(
        &config.embedding.model,
        config.embedding.dimension,
    )?)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| VersewiseError::Json {
        source: e,
        context: "Failed to serialize output".to_string(),
    })
}

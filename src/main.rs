use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use secrecy::{ExposeSecret, SecretString};
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use brasa_voice::api::ApiServerBuilder;
use brasa_voice::db::{self, MenuRepo};
use brasa_voice::dialogue::{Assistant, Controller, Input, Session};
use brasa_voice::menu::{self, Catalog, MenuSource};
use brasa_voice::voice::{
    AudioCapture, AudioPlayback, ConsoleVoice, MicrophoneVoice, SpeechToText, TextToSpeech,
    UTTERANCE_ALLOWANCE,
};
use brasa_voice::{Config, HttpOrderClient, OrderStatus};

/// Brasa - voice ordering assistant and order backend
#[derive(Parser)]
#[command(name = "brasa", version, about)]
struct Cli {
    /// Port for the order backend
    #[arg(long, env = "BRASA_PORT")]
    port: Option<u16>,

    /// Order backend URL used by the assistant
    #[arg(long, env = "BRASA_BACKEND_URL")]
    backend_url: Option<String>,

    /// Menu file (TOML, or saved menu page with --menu-source markup)
    #[arg(long, env = "BRASA_MENU_PATH")]
    menu_path: Option<PathBuf>,

    /// Where to load the menu from: embedded, file, markup, database
    #[arg(long, env = "BRASA_MENU_SOURCE")]
    menu_source: Option<MenuSource>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the order backend (default)
    Serve,
    /// Take an order by voice
    Talk {
        /// Use the microphone and speaker instead of the terminal
        #[arg(long)]
        mic: bool,
    },
    /// Print the loaded menu
    Menu {
        /// Scrape the menu from a saved page instead
        #[arg(long)]
        markup: Option<PathBuf>,
    },
    /// List orders from the backend
    Orders {
        /// Only orders with this status (pendiente, en-proceso, completado)
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hola. Bienvenido a Brasa Roja.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,brasa_voice=info",
        1 => "info,brasa_voice=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    // CLI flags override env and file
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(url) = cli.backend_url {
        config.backend.url = url;
    }
    if let Some(path) = cli.menu_path {
        config.menu.source = MenuSource::for_path(&path);
        config.menu.path = Some(path);
    }
    if let Some(source) = cli.menu_source {
        config.menu.source = source;
    }
    tracing::debug!(?config, "loaded configuration");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config).await,
        Command::Talk { mic } => talk(&config, mic).await,
        Command::Menu { markup } => print_menu(&config, markup.as_deref()),
        Command::Orders { status } => list_orders(&config, status).await,
        Command::TestMic { duration } => test_mic(duration).await,
        Command::TestTts { text } => test_tts(&config, &text).await,
    }
}

/// Load the catalog, opening the database only when the menu lives there
fn load_catalog(config: &Config) -> anyhow::Result<Catalog> {
    let repo = if config.menu.source == MenuSource::Database {
        Some(MenuRepo::new(db::init(config.db_path())?))
    } else {
        None
    };
    Ok(menu::load_catalog(
        config.menu.source,
        config.menu.path.as_deref(),
        repo.as_ref(),
    )?)
}

/// Run the order backend until interrupted
async fn serve(config: &Config) -> anyhow::Result<()> {
    tracing::info!(port = config.server.port, "starting order backend");

    let pool = db::init(config.db_path())?;
    let menu_repo = MenuRepo::new(pool.clone());

    // Seed the menu table on first start so the database source has something to serve
    let catalog = if config.menu.source == MenuSource::Database {
        let catalog = menu_repo.load_catalog()?;
        if catalog.is_empty() {
            let seed = menu::default_catalog();
            let count = menu_repo.replace(&seed)?;
            tracing::info!(items = count, "seeded menu table with the embedded menu");
            seed
        } else {
            catalog
        }
    } else {
        let catalog = menu::load_catalog(config.menu.source, config.menu.path.as_deref(), None)?;
        if menu_repo.count()? == 0 && !catalog.is_empty() {
            let count = menu_repo.replace(&catalog)?;
            tracing::info!(items = count, "seeded menu table");
        }
        catalog
    };

    let server = ApiServerBuilder::new(pool, config.server.port)
        .catalog(Arc::new(catalog))
        .static_dir(config.server.static_dir.clone())
        .build();

    let handle = server.spawn();
    tracing::info!(
        port = config.server.port,
        "order backend ready - kitchen feed on /ws/cocina"
    );

    tokio::select! {
        result = handle => result??,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }

    Ok(())
}

/// Run a voice ordering session against the backend
async fn talk(config: &Config, mic: bool) -> anyhow::Result<()> {
    let catalog = Arc::new(load_catalog(config)?);
    let controller = Controller::new(catalog, config.dialogue.controller_config());
    let submitter = HttpOrderClient::new(&config.backend.url)?;
    let mut session = Session::new();
    let listen_timeout = config.dialogue.listen_timeout;

    tracing::info!(backend = %config.backend.url, mic, "starting voice session");

    if !mic {
        let voice = ConsoleVoice::stdio();
        let mut assistant =
            Assistant::new(controller, voice, submitter).with_listen_timeout(listen_timeout);

        println!("Presiona Enter para hablar con el asistente (Ctrl+D para salir).");
        while assistant.voice_mut().wait_for_activation().await {
            assistant.run_turns(&mut session, Input::Activate).await;
            println!("Presiona Enter para continuar.");
        }
        return Ok(());
    }

    let (stt, tts) = speech_services(config)?;
    let voice = MicrophoneVoice::new(stt, tts, listen_timeout);
    let mut assistant = Assistant::new(controller, voice, submitter)
        .with_listen_timeout(listen_timeout + UTTERANCE_ALLOWANCE);

    // Enter on stdin activates the assistant
    let (tx, rx) = mpsc::channel(4);
    tokio::spawn(async move {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(_)) = lines.next_line().await {
            if tx.send(()).await.is_err() {
                break;
            }
        }
    });

    println!("Presiona Enter para hablar con el asistente (Ctrl+D para salir).");
    assistant.run(&mut session, rx).await;
    Ok(())
}

fn speech_services(config: &Config) -> anyhow::Result<(SpeechToText, TextToSpeech)> {
    let voice = &config.voice;
    let api_key = voice
        .api_key
        .as_ref()
        .map(|key| key.expose_secret().to_string())
        .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY is required for microphone mode"))?;

    let stt = SpeechToText::new(
        SecretString::from(api_key.clone()),
        voice.stt_url.clone(),
        voice.stt_model.clone(),
        voice.language.clone(),
    )?;
    let tts = TextToSpeech::new(
        SecretString::from(api_key),
        voice.tts_url.clone(),
        voice.tts_model.clone(),
        voice.tts_voice.clone(),
        voice.tts_speed,
    )?;
    Ok((stt, tts))
}

/// Print the menu with prices
fn print_menu(config: &Config, markup: Option<&Path>) -> anyhow::Result<()> {
    let catalog = match markup {
        Some(path) => menu::load_catalog(MenuSource::Markup, Some(path), None)?,
        None => load_catalog(config)?,
    };

    if catalog.is_empty() {
        println!("(menú vacío)");
        return Ok(());
    }

    for category in catalog.categories() {
        println!("{}", category.name.to_uppercase());
        for item in &category.items {
            println!("  {:<32} S/ {:>7}", item.name, item.unit_price.to_string());
        }
    }
    Ok(())
}

/// List orders from the backend, newest first
async fn list_orders(config: &Config, status: Option<OrderStatus>) -> anyhow::Result<()> {
    let client = HttpOrderClient::new(&config.backend.url)?;
    let orders = client.list_orders(status).await?;

    if orders.is_empty() {
        println!("No hay pedidos.");
        return Ok(());
    }

    for order in orders {
        println!(
            "#{:<4} {:<11} {:<20} S/ {:>8}  {}",
            order.id,
            order.status.as_str(),
            order.customer_name,
            order.total.to_string(),
            order.created_at.format("%Y-%m-%d %H:%M")
        );
        for line in &order.items {
            println!("        {} x {}", line.quantity, line.name);
        }
    }
    Ok(())
}

/// Test microphone input
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let levels = tokio::task::spawn_blocking(move || -> brasa_voice::Result<Vec<(f32, f32)>> {
        let mut capture = AudioCapture::new()?;
        capture.start()?;

        let mut levels = Vec::new();
        for _ in 0..duration {
            std::thread::sleep(Duration::from_secs(1));
            let samples = capture.take_buffer();
            let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
            levels.push((calculate_rms(&samples), peak));
        }
        capture.stop();
        Ok(levels)
    })
    .await??;

    for (i, (energy, peak)) in levels.into_iter().enumerate() {
        // Visual meter
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "█".repeat(meter_len) + &" ".repeat(50 - meter_len);
        println!("[{:2}s] RMS: {energy:.4} | Peak: {peak:.4} | [{meter}]", i + 1);
    }

    println!("\n---");
    println!("If RMS stayed near 0, check that the microphone is connected and allowed.");
    Ok(())
}

/// Calculate RMS energy
#[allow(clippy::cast_precision_loss)]
fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Test TTS output
async fn test_tts(config: &Config, text: &str) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\"\n");

    let (_, tts) = speech_services(config)?;

    println!("Synthesizing speech...");
    let mp3_data = tts.synthesize(text).await?;
    println!("Got {} bytes of audio data", mp3_data.len());

    println!("Playing audio...");
    let mut playback = AudioPlayback::new();
    playback.play_mp3(mp3_data).await?;

    println!("\n---");
    println!("If you heard the speech, TTS is working!");
    Ok(())
}

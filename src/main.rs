use clap::{Parser, Subcommand};
use respimg::config::{self, Config};
use respimg::modifiers::ModifierSet;
use respimg::output;
use respimg::provider::ProviderRegistry;
use respimg::render::{self, Fallback, ImageRequest, Renderer};
use respimg::width::{self, BreakpointTable};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "respimg")]
#[command(about = "Responsive image srcset/sizes resolver with pluggable image CDN providers")]
#[command(long_about = "\
Responsive image srcset/sizes resolver with pluggable image CDN providers

Width specs describe how wide an image is displayed at each breakpoint:

  300              300px everywhere
  100vw            full viewport width
  50vw lg:400px    half the viewport, 400px from the lg breakpoint up
  sm:50 md:100     per-breakpoint fixed widths

Breakpoints default to sm=640 md=768 lg=1024 xl=1280 2xl=1536 and can be
redefined in respimg.toml. Providers (cloudinary, fastly, liip_imagine,
placeholder) turn each resolved width into a delivery URL.

Run 'respimg gen-config' to generate a documented respimg.toml.")]
#[command(version)]
struct Cli {
    /// Configuration file (optional; stock defaults when absent)
    #[arg(long, default_value = "respimg.toml", global = true)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

/// Per-request options shared by `render`.
#[derive(clap::Args, Clone)]
struct RenderArgs {
    /// Image source path or URL
    src: String,
    /// Width spec, e.g. "50vw lg:400px"
    #[arg(long)]
    width: Option<String>,
    /// Pixel densities, e.g. "1x 2x"
    #[arg(long)]
    densities: Option<String>,
    #[arg(long)]
    format: Option<String>,
    /// auto | empty | <format>
    #[arg(long)]
    fallback: Option<String>,
    #[arg(long)]
    quality: Option<u32>,
    #[arg(long)]
    fit: Option<String>,
    #[arg(long)]
    focal: Option<String>,
    #[arg(long)]
    background: Option<String>,
    #[arg(long)]
    ratio: Option<String>,
    /// Explicit sizes attribute
    #[arg(long)]
    sizes: Option<String>,
    #[arg(long)]
    preset: Option<String>,
    #[arg(long)]
    provider: Option<String>,
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

impl From<RenderArgs> for ImageRequest {
    fn from(args: RenderArgs) -> Self {
        ImageRequest {
            src: args.src,
            width: args.width,
            densities: args.densities,
            format: args.format,
            fallback: args.fallback.map(Fallback::from),
            quality: args.quality,
            fit: args.fit,
            focal: args.focal,
            background: args.background,
            ratio: args.ratio,
            sizes: args.sizes,
            preset: args.preset,
            provider: args.provider,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a width spec against the breakpoint ladder
    Widths {
        /// Width spec, e.g. "50vw lg:400px"
        spec: String,
    },
    /// Build a single provider URL from raw modifiers
    Url {
        src: String,
        #[arg(long)]
        provider: Option<String>,
        /// Modifier as key=value (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
    /// Render src, srcset and sizes for one image
    Render(RenderArgs),
    /// Render a JSON array of requests in parallel
    Batch {
        /// JSON file with an array of requests
        file: PathBuf,
    },
    /// List registered providers
    Providers,
    /// Validate the configuration
    Check,
    /// Print a stock respimg.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Command::Widths { spec } => {
            let ctx = Context::load(&cli.config)?;
            let map = width::resolve_widths(&spec, &ctx.table)?;
            let sizes = width::compute_sizes(&map, &ctx.table);
            let initial = width::initial_width(&map, &spec);
            output::print_width_map(&spec, &map, &ctx.table, &sizes, initial);
        }
        Command::Url { src, provider, set } => {
            let ctx = Context::load(&cli.config)?;
            let mapper = ctx.registry.resolve(provider.as_deref())?;
            let defaults = ctx.config.defaults.to_modifiers();
            let modifiers = parse_modifiers(&set)?.merged_over(&defaults);
            println!("{}", mapper.build_url(&src, &modifiers));
        }
        Command::Render(args) => {
            let ctx = Context::load(&cli.config)?;
            let json = args.json;
            let image = ctx.renderer().render(&ImageRequest::from(args))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&image)?);
            } else {
                output::print_rendered(&image);
            }
        }
        Command::Batch { file } => {
            let ctx = Context::load(&cli.config)?;
            let content = std::fs::read_to_string(&file)?;
            let requests: Vec<ImageRequest> = serde_json::from_str(&content)?;
            init_thread_pool(&ctx.config.processing);
            let results = render::render_batch(&ctx.renderer(), &requests);

            let rendered: Vec<serde_json::Value> = results
                .iter()
                .map(|result| match result {
                    Ok(image) => serde_json::to_value(image),
                    Err(err) => Ok(serde_json::json!({ "error": err.to_string() })),
                })
                .collect::<Result<_, _>>()?;
            println!("{}", serde_json::to_string_pretty(&rendered)?);
            output::print_batch_summary(&requests, &results);
        }
        Command::Providers => {
            let ctx = Context::load(&cli.config)?;
            output::print_providers(&ctx.registry);
        }
        Command::Check => {
            println!("==> Checking {}", cli.config.display());
            let ctx = Context::load(&cli.config)?;
            output::print_config_summary(&ctx.config);
            println!("==> Configuration is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Validated configuration plus everything built from it.
struct Context {
    config: Config,
    table: BreakpointTable,
    registry: ProviderRegistry,
}

impl Context {
    fn load(path: &Path) -> Result<Self, config::ConfigError> {
        let config = config::load_config(path)?;
        let table = config.breakpoint_table()?;
        let registry = ProviderRegistry::from_config(&config)?;
        Ok(Self {
            config,
            table,
            registry,
        })
    }

    fn renderer(&self) -> Renderer<'_> {
        Renderer::new(&self.registry, &self.table)
            .with_defaults(self.config.defaults.clone())
            .with_presets(self.config.presets.clone())
    }
}

/// Parse repeated `--set key=value` flags. Integer values stay numeric.
fn parse_modifiers(pairs: &[String]) -> Result<ModifierSet, String> {
    let mut modifiers = ModifierSet::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("expected KEY=VALUE, got \"{pair}\""))?;
        match value.parse::<i64>() {
            Ok(n) => modifiers.insert(key, n),
            Err(_) => modifiers.insert(key, value),
        }
    }
    Ok(modifiers)
}

/// Install the stderr log subscriber.
fn init_tracing(log_level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

use std::io::Read as _;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use frameit::{
    CompositorOpts, CompressOpts, DirectoryTarget, ExportFormat, ExportOpts, FrameColor,
    FrameEdit, ImageSource, JsonFileTemplateStore, PhotoPlacement, ShareOpts, StoreLimits,
    TemplateDraft, TemplateStore, Vec2,
};

const DEFAULT_STORE: &str = "frameit_frames.json";

#[derive(Parser, Debug)]
#[command(name = "frameit", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite a photo into a frame and export it.
    Compose(ComposeArgs),
    /// Format caption HTML as styled Unicode text.
    Caption(CaptionArgs),
    /// Manage shared frame templates.
    Template {
        #[command(subcommand)]
        cmd: TemplateCommand,
    },
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Frame overlay image (PNG, JPEG or SVG path, or a data URL).
    #[arg(long, conflicts_with = "template")]
    frame: Option<String>,

    /// Load frame, color and placement from a stored template.
    #[arg(long)]
    template: Option<String>,

    /// User photo.
    #[arg(long)]
    photo: Option<String>,

    /// Background color as hex.
    #[arg(long)]
    color: Option<FrameColor>,

    /// Photo scale in percent (50-150).
    #[arg(long)]
    scale: Option<f64>,

    /// Photo rotation in degrees (0-360).
    #[arg(long)]
    rotate: Option<f64>,

    /// Horizontal photo offset in preview pixels.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    offset_x: f64,

    /// Vertical photo offset in preview pixels.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    offset_y: f64,

    /// Output format.
    #[arg(long, value_enum, default_value_t = FormatChoice::Png)]
    format: FormatChoice,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = ExportFormat::DEFAULT_JPEG_QUALITY)]
    quality: u8,

    /// Output edge length in pixels.
    #[arg(long)]
    size: Option<u32>,

    /// Directory relative image paths resolve against.
    #[arg(long, default_value = ".")]
    assets: PathBuf,

    /// Directory the exported file is written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    #[command(flatten)]
    store: StoreArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Png,
    Jpeg,
}

#[derive(Parser, Debug)]
struct CaptionArgs {
    /// Caption HTML; read from stdin when omitted.
    html: Option<String>,
}

#[derive(Parser, Debug, Clone)]
struct StoreArgs {
    /// Template store file (defaults to `$FRAMEIT_STORE` or `frameit_frames.json`).
    #[arg(long)]
    store: Option<PathBuf>,
}

impl StoreArgs {
    fn open(&self) -> anyhow::Result<JsonFileTemplateStore> {
        let path = self
            .store
            .clone()
            .or_else(|| std::env::var_os("FRAMEIT_STORE").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE));
        JsonFileTemplateStore::open(&path, StoreLimits::from_env())
            .with_context(|| format!("open template store '{}'", path.display()))
    }
}

#[derive(Subcommand, Debug)]
enum TemplateCommand {
    /// Share a frame as a template and print its link.
    Save(SaveArgs),
    /// Print one template as JSON.
    Get {
        frame_id: String,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// List an owner's templates, oldest first.
    List {
        #[arg(long)]
        owner: String,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Delete a template.
    Delete {
        frame_id: String,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Show store usage.
    Info {
        #[command(flatten)]
        store: StoreArgs,
    },
}

#[derive(Parser, Debug)]
struct SaveArgs {
    /// Owner id.
    #[arg(long)]
    owner: String,

    /// Frame overlay image (path or data URL).
    #[arg(long)]
    frame: String,

    /// Re-share an existing template.
    #[arg(long)]
    frame_id: Option<String>,

    #[arg(long)]
    color: Option<FrameColor>,

    /// Caption HTML.
    #[arg(long, default_value = "")]
    caption: String,

    #[arg(long)]
    name: Option<String>,

    /// Vanity subdomain segment.
    #[arg(long)]
    custom_path: Option<String>,

    #[arg(long)]
    scale: Option<f64>,

    #[arg(long)]
    rotate: Option<f64>,

    /// App origin used for links without a vanity host.
    #[arg(long)]
    origin: Option<String>,

    #[command(flatten)]
    store: StoreArgs,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Caption(args) => cmd_caption(args),
        Command::Template { cmd } => cmd_template(cmd),
    }
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let mut edit = match (&args.template, &args.frame) {
        (Some(id), _) => {
            let store = args.store.open()?;
            let t = store
                .get(id)?
                .with_context(|| format!("template '{id}' not found"))?;
            FrameEdit::from_template(&t)?
        }
        (None, Some(frame)) => FrameEdit::new(ImageSource::parse(frame)?),
        (None, None) => anyhow::bail!("either --frame or --template is required"),
    };

    if let Some(photo) = &args.photo {
        let src = ImageSource::parse(photo).with_context(|| format!("photo '{photo}'"))?;
        edit = edit.with_photo(src);
    }
    if let Some(color) = args.color {
        edit = edit.with_frame_color(color);
    }
    let base = edit.customization.placement;
    edit = edit.with_placement(PhotoPlacement {
        scale_percent: args.scale.unwrap_or(base.scale_percent),
        rotate_degrees: args.rotate.unwrap_or(base.rotate_degrees),
        offset: Vec2::new(args.offset_x, args.offset_y),
    });

    let format = match args.format {
        FormatChoice::Png => ExportFormat::Png,
        FormatChoice::Jpeg => ExportFormat::jpeg(args.quality)?,
    };
    let mut compositor = CompositorOpts::from_env();
    if let Some(size) = args.size {
        compositor = compositor.with_output_size(size);
    }
    let opts = ExportOpts::default()
        .with_compositor(compositor)
        .with_format(format)
        .with_assets_root(&args.assets);

    let mut target = DirectoryTarget::new(&args.out_dir);
    let delivery = frameit::download_frame(&edit, &opts, chrono::Utc::now(), &mut target)
        .map_err(|e| anyhow::anyhow!("{}\n{e}", e.user_message()))?;

    let written = delivery
        .location
        .unwrap_or_else(|| args.out_dir.join(&delivery.file_name));
    eprintln!("wrote {}", written.display());
    Ok(())
}

fn cmd_caption(args: CaptionArgs) -> anyhow::Result<()> {
    let html = match args.html {
        Some(html) => html,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read caption from stdin")?;
            buf
        }
    };
    println!("{}", frameit::format_caption(&html));
    Ok(())
}

fn cmd_template(cmd: TemplateCommand) -> anyhow::Result<()> {
    match cmd {
        TemplateCommand::Save(args) => {
            let mut store = args.store.open()?;
            let mut draft = TemplateDraft::new(args.frame).with_caption(args.caption);
            draft.frame_id = args.frame_id;
            draft.frame_color = args.color;
            draft.template_name = args.name;
            draft.custom_path = args.custom_path;
            draft.scale = args.scale;
            draft.rotate = args.rotate;

            let mut share = ShareOpts::default();
            if let Some(origin) = args.origin {
                share = share.with_origin(origin);
            }
            let shared = frameit::share_template(
                &mut store,
                &args.owner,
                draft,
                &share,
                &CompressOpts::from_env(),
                chrono::Utc::now(),
            )?;
            for id in &shared.outcome.evicted {
                eprintln!("evicted {id}");
            }
            println!("{}", shared.share_url);
        }
        TemplateCommand::Get { frame_id, store } => {
            let store = store.open()?;
            let t = store
                .get(&frame_id)?
                .with_context(|| format!("template '{frame_id}' not found"))?;
            println!("{}", serde_json::to_string_pretty(&t)?);
        }
        TemplateCommand::List { owner, store } => {
            let store = store.open()?;
            for t in store.list_by_owner(&owner)? {
                println!(
                    "{}\t{}\t{}",
                    t.frame_id,
                    t.created_at.to_rfc3339(),
                    t.template_name
                );
            }
        }
        TemplateCommand::Delete { frame_id, store } => {
            let mut store = store.open()?;
            if !store.delete(&frame_id)? {
                anyhow::bail!("template '{frame_id}' not found");
            }
            eprintln!("deleted {frame_id}");
        }
        TemplateCommand::Info { store } => {
            let store = store.open()?;
            let info = store.storage_info()?;
            let max = info
                .max_bytes
                .map_or_else(|| "unlimited".to_owned(), |m| m.to_string());
            println!(
                "templates: {}\nused bytes: {}\nmax bytes: {max}",
                info.templates, info.used_bytes
            );
        }
    }
    Ok(())
}

use anyhow::{bail, Context};
use cardforge::server::{CardServer, ServerConfig};
use cardforge::{CardRecord, CardRenderer, RendererConfig};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cardforge", version, about = "Render business cards as PNG")]
struct Cli {
    #[command(flatten)]
    renderer: RendererArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct RendererArgs {
    /// Bold font used for the name line
    /// [default: assets/fonts/DejaVuSans-Bold.ttf, relative to the working directory]
    #[arg(long, env = "CARDFORGE_BOLD_FONT", global = true)]
    bold_font: Option<PathBuf>,

    /// Regular font used for title and contact lines
    /// [default: assets/fonts/DejaVuSans.ttf, relative to the working directory]
    #[arg(long, env = "CARDFORGE_REGULAR_FONT", global = true)]
    regular_font: Option<PathBuf>,

    /// Logo fetch timeout in milliseconds
    #[arg(long, env = "CARDFORGE_LOGO_TIMEOUT_MS", default_value_t = 10_000, global = true)]
    logo_timeout_ms: u64,

    /// Largest logo body accepted, in bytes
    #[arg(long, env = "CARDFORGE_MAX_LOGO_BYTES", default_value_t = 10 * 1024 * 1024, global = true)]
    max_logo_bytes: u64,

    /// User agent sent with logo requests
    #[arg(long, env = "CARDFORGE_USER_AGENT", global = true)]
    user_agent: Option<String>,

    /// Never fetch logos
    #[arg(long, env = "CARDFORGE_NO_LOGOS", global = true)]
    no_logos: bool,
}

impl RendererArgs {
    fn config(&self) -> RendererConfig {
        let mut cfg = RendererConfig {
            logo_timeout_ms: self.logo_timeout_ms,
            max_logo_bytes: self.max_logo_bytes,
            enable_logos: !self.no_logos,
            ..Default::default()
        };
        if let Some(p) = &self.bold_font {
            cfg.bold_font = p.clone();
        }
        if let Some(p) = &self.regular_font {
            cfg.regular_font = p.clone();
        }
        if let Some(ua) = &self.user_agent {
            cfg.user_agent = ua.clone();
        }
        cfg
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single card to a PNG file (or stdout)
    Render(RenderArgs),
    /// Run the HTTP front end
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// JSON file holding a card record; field flags override its values
    #[arg(long)]
    record: Option<PathBuf>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    logo_url: Option<String>,
    /// Output path; `-` or absent writes to stdout
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(long, env = "CARDFORGE_ADDR", default_value = "127.0.0.1:8080")]
    addr: String,
    #[arg(long, env = "CARDFORGE_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,
    /// Base URL used in uploaded logo URLs
    #[arg(long, env = "CARDFORGE_PUBLIC_URL")]
    public_url: Option<String>,
    /// Worker threads (defaults to the number of CPUs)
    #[arg(long, env = "CARDFORGE_WORKERS")]
    workers: Option<usize>,
}

fn load_record(args: &RenderArgs) -> anyhow::Result<CardRecord> {
    let mut record = match &args.record {
        Some(path) => {
            let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_slice(&data).with_context(|| format!("parsing {}", path.display()))?
        }
        None => CardRecord::default(),
    };
    if let Some(v) = &args.name {
        record.name = v.clone();
    }
    let overrides = [
        (&mut record.title, &args.title),
        (&mut record.company, &args.company),
        (&mut record.phone, &args.phone),
        (&mut record.email, &args.email),
        (&mut record.logo_url, &args.logo_url),
    ];
    for (field, value) in overrides {
        if value.is_some() {
            *field = value.clone();
        }
    }
    if record.name.trim().is_empty() {
        bail!("a card needs a name (--name or a record file)");
    }
    Ok(record)
}

fn render(renderer: &CardRenderer, args: &RenderArgs) -> anyhow::Result<()> {
    let record = load_record(args)?;
    let png = renderer.render(&record)?;
    match args.out.as_deref() {
        Some(p) if p.as_os_str() != "-" => {
            std::fs::write(p, &png).with_context(|| format!("writing {}", p.display()))?;
            log::info!("wrote {} ({} bytes)", p.display(), png.len());
        }
        _ => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&png)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let renderer = CardRenderer::new(cli.renderer.config()).context("failed to initialize renderer")?;

    match cli.command {
        Command::Render(args) => render(&renderer, &args),
        Command::Serve(args) => {
            let mut config = ServerConfig {
                addr: args.addr,
                data_dir: args.data_dir,
                public_url: args.public_url,
                ..Default::default()
            };
            if let Some(w) = args.workers {
                config.workers = w;
            }
            let server = CardServer::bind(config, renderer)?;
            server.run();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn render_args(argv: &[&str]) -> RenderArgs {
        let cli = Cli::try_parse_from(std::iter::once("cardforge").chain(argv.iter().copied())).unwrap();
        match cli.command {
            Command::Render(args) => args,
            other => panic!("expected render, got {:?}", other),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_record_file() {
        let path = std::env::temp_dir().join(format!("cardforge-record-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"name":"Lee","title":"Engineer","phone":"010-1234-5678","email":"lee@example.com"}"#,
        )
        .unwrap();

        let record = load_record(&render_args(&[
            "render",
            "--record",
            path.to_str().unwrap(),
            "--title",
            "CTO",
            "--company",
            "Acme",
        ]))
        .unwrap();
        assert_eq!(record.name, "Lee");
        assert_eq!(record.title.as_deref(), Some("CTO"));
        assert_eq!(record.company.as_deref(), Some("Acme"));
        assert_eq!(record.phone.as_deref(), Some("010-1234-5678"));
        assert_eq!(record.email.as_deref(), Some("lee@example.com"));
        assert_eq!(record.logo_url, None);

        let renamed = load_record(&render_args(&["render", "--record", path.to_str().unwrap(), "--name", "Kim"])).unwrap();
        assert_eq!(renamed.name, "Kim");
        assert_eq!(renamed.title.as_deref(), Some("Engineer"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn empty_name_is_refused() {
        assert!(load_record(&render_args(&["render"])).is_err());
        assert!(load_record(&render_args(&["render", "--name", "   "])).is_err());
        assert!(load_record(&render_args(&["render", "--name", "Lee"])).is_ok());
    }

    #[test]
    fn missing_record_file_is_an_error() {
        let err = load_record(&render_args(&["render", "--record", "/nonexistent/card.json"])).unwrap_err();
        assert!(format!("{:#}", err).contains("card.json"));
    }

    #[test]
    fn renderer_flags_map_onto_config() {
        let cli = Cli::try_parse_from([
            "cardforge",
            "--user-agent",
            "cards-test/1",
            "--max-logo-bytes",
            "2048",
            "--logo-timeout-ms",
            "250",
            "--no-logos",
            "--bold-font",
            "/fonts/b.ttf",
            "render",
            "--name",
            "Lee",
        ])
        .unwrap();
        let cfg = cli.renderer.config();
        assert_eq!(cfg.user_agent, "cards-test/1");
        assert_eq!(cfg.max_logo_bytes, 2048);
        assert_eq!(cfg.logo_timeout_ms, 250);
        assert!(!cfg.enable_logos);
        assert_eq!(cfg.bold_font, PathBuf::from("/fonts/b.ttf"));
        assert_eq!(cfg.regular_font, RendererConfig::default().regular_font);
    }
}

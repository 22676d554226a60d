use webcraft::config::WebCraftConfig;
use webcraft::deploy::{sanitize_project_name, DeploymentDescriptor, HostingProvider, SiteBundle};
use webcraft::doctor::{CheckStatus, WebCraftDoctor};
use webcraft::generator::WebsiteGenerator;
use webcraft::logging::init_logging;
use webcraft::pipeline::{parse_response, PipelineOptions};
use webcraft::{ai_service::AIService, server};

use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};

fn cli() -> Command {
    Command::new("webcraft")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Prompt-to-website generator with one-step static deployment")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .subcommand(
            Command::new("serve")
                .about("Run the HTTP API")
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .value_parser(clap::value_parser!(u16))
                        .help("Port to listen on (default 8080)"),
                )
                .arg(Arg::new("host").long("host").help("Address to bind")),
        )
        .subcommand(
            Command::new("generate")
                .about("Generate a website from a prompt")
                .arg(Arg::new("prompt").required(true))
                .arg(
                    Arg::new("out")
                        .short('o')
                        .long("out")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Write index.html, styles.css and script.js into this directory"),
                ),
        )
        .subcommand(
            Command::new("parse")
                .about("Run the response parser over a saved model response")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("prompt")
                        .long("prompt")
                        .default_value("")
                        .help("Prompt used for fallback content"),
                ),
        )
        .subcommand(
            Command::new("deploy")
                .about("Deploy index.html/styles.css/script.js from a directory")
                .arg(
                    Arg::new("dir")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .required(true)
                        .help("Project name (sanitized into a slug)"),
                ),
        )
        .subcommand(
            Command::new("doctor")
                .about("Check AI and hosting configuration")
                .arg(
                    Arg::new("skip-deploy")
                        .long("skip-deploy")
                        .action(ArgAction::SetTrue)
                        .help("Do not publish a throwaway test site"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the raw report as JSON"),
                ),
        )
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let matches = cli().get_matches();

    if let Err(e) = init_logging(matches.get_flag("verbose")) {
        eprintln!("⚠️  {}", e);
    }

    let config = match WebCraftConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let result = match matches.subcommand() {
        Some(("serve", args)) => run_serve(config, args).await,
        Some(("generate", args)) => run_generate(config, args).await,
        Some(("parse", args)) => run_parse(&config, args),
        Some(("deploy", args)) => run_deploy(&config, args).await,
        Some(("doctor", args)) => run_doctor(&config, args).await,
        _ => run_serve(config, &ArgMatches::default()).await,
    };

    if let Err(e) = result {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn run_serve(mut config: WebCraftConfig, args: &ArgMatches) -> Result<()> {
    if let Ok(Some(port)) = args.try_get_one::<u16>("port") {
        config.server.port = *port;
    }
    if let Ok(Some(host)) = args.try_get_one::<String>("host") {
        config.server.host = host.clone();
    }
    server::start_server(config).await
}

async fn run_generate(config: WebCraftConfig, args: &ArgMatches) -> Result<()> {
    let prompt = args
        .get_one::<String>("prompt")
        .ok_or_else(|| anyhow!("Prompt required"))?;

    let generator = WebsiteGenerator::new(
        AIService::new(config.ai_config(), reqwest::Client::new()),
        PipelineOptions {
            atomic_fallback: config.atomic_fallback,
        },
    );
    if !generator.is_configured() {
        return Err(anyhow!(
            "No AI provider configured. Set GEMINI_API_KEY or run 'webcraft doctor'."
        ));
    }

    let outcome = generator.generate(prompt).await?;

    match args.get_one::<PathBuf>("out") {
        Some(dir) => {
            let bundle = SiteBundle::build(
                &outcome.result.html,
                &outcome.result.css,
                &outcome.result.js,
            );
            write_bundle(dir, &bundle)?;
            println!("✅ Website written to {}", dir.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&outcome.result)?),
    }
    Ok(())
}

fn write_bundle(dir: &Path, bundle: &SiteBundle) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    for file in bundle.files() {
        let path = dir.join(file.path);
        std::fs::write(&path, &file.contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

fn run_parse(config: &WebCraftConfig, args: &ArgMatches) -> Result<()> {
    let file = args
        .get_one::<PathBuf>("file")
        .ok_or_else(|| anyhow!("File required"))?;
    let prompt = args
        .get_one::<String>("prompt")
        .map(String::as_str)
        .unwrap_or_default();

    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let outcome = parse_response(
        &raw,
        prompt,
        PipelineOptions {
            atomic_fallback: config.atomic_fallback,
        },
    );

    eprintln!("🔍 Extracted with: {}", outcome.source());
    if outcome.fallback.any() {
        eprintln!(
            "⚠️  Fallback used (html: {}, css: {}, js: {})",
            outcome.fallback.html, outcome.fallback.css, outcome.fallback.js
        );
    }
    println!("{}", serde_json::to_string_pretty(&outcome.result)?);
    Ok(())
}

fn read_optional(path: &Path) -> Result<String> {
    if path.exists() {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    } else {
        Ok(String::new())
    }
}

async fn run_deploy(config: &WebCraftConfig, args: &ArgMatches) -> Result<()> {
    let dir = args
        .get_one::<PathBuf>("dir")
        .ok_or_else(|| anyhow!("Directory required"))?;
    let name = args
        .get_one::<String>("name")
        .ok_or_else(|| anyhow!("Project name required"))?;

    let hosting = HostingProvider::from_config(config, reqwest::Client::new()).ok_or_else(
        || anyhow!("No hosting credential configured. Set NETLIFY_TOKEN or VERCEL_TOKEN."),
    )?;

    let index = dir.join("index.html");
    let html = std::fs::read_to_string(&index)
        .with_context(|| format!("Failed to read {}", index.display()))?;
    let css = read_optional(&dir.join("styles.css"))?;
    let js = read_optional(&dir.join("script.js"))?;

    let project_name = sanitize_project_name(name);
    println!(
        "🚀 Deploying '{}' to {}...",
        project_name,
        hosting.kind().display_name()
    );
    let descriptor = DeploymentDescriptor::new(project_name, &html, &css, &js);
    let outcome = hosting.deploy(&descriptor).await?;

    println!("✅ Live at {}", outcome.url);
    Ok(())
}

async fn run_doctor(config: &WebCraftConfig, args: &ArgMatches) -> Result<()> {
    let mut doctor = WebCraftDoctor::new(config, reqwest::Client::new());
    if args.get_flag("skip-deploy") {
        doctor = doctor.without_test_deployment();
    }
    let report = doctor.run().await;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("🩺 WebCraft Doctor\n");
    for check in &report.checks {
        let icon = match check.status {
            CheckStatus::Pass => "✅",
            CheckStatus::Warning => "⚠️ ",
            CheckStatus::Fail => "❌",
        };
        println!("{} {}: {}", icon, check.name, check.message);
    }
    println!();
    match report.overall_health {
        CheckStatus::Pass => println!("Overall: ✅ healthy"),
        CheckStatus::Warning => println!("Overall: ⚠️  usable with warnings"),
        CheckStatus::Fail => println!("Overall: ❌ needs attention"),
    }
    Ok(())
}

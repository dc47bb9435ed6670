//! `ivm` command line: drive the screens from a terminal

use anyhow::{anyhow, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use ivm_core::prelude::*;
use ivm_core::{DelayedProbe, FileProbe};
use ivm_generation::{GeneratedInterview, Question, ScriptedGenerationService};
use ivm_history::InMemoryRemoteStore;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("ivm")
        .version(ivm_core::VERSION)
        .about("InterviewMe screen simulator")
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .default_value("info")
                .help("Log filter when RUST_LOG is unset"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("splash")
                .about("Run the splash barrier with simulated resources")
                .arg(
                    Arg::new("fonts-ms")
                        .long("fonts-ms")
                        .default_value("300")
                        .value_parser(value_parser!(u64))
                        .help("Font load time"),
                )
                .arg(
                    Arg::new("auth-ms")
                        .long("auth-ms")
                        .default_value("600")
                        .value_parser(value_parser!(u64))
                        .help("Time until auth resolves"),
                )
                .arg(
                    Arg::new("logo-ms")
                        .long("logo-ms")
                        .default_value("200")
                        .value_parser(value_parser!(u64))
                        .help("Logo load time"),
                )
                .arg(
                    Arg::new("logo-fail")
                        .long("logo-fail")
                        .action(ArgAction::SetTrue)
                        .help("Make the logo fail to load"),
                )
                .arg(
                    Arg::new("logo-file")
                        .long("logo-file")
                        .value_parser(value_parser!(PathBuf))
                        .conflicts_with_all(["logo-ms", "logo-fail"])
                        .help("Load the logo from disk instead"),
                ),
        )
        .subcommand(
            Command::new("generate")
                .about("Run the setup flow against a scripted generation service")
                .arg(
                    Arg::new("company")
                        .long("company")
                        .default_value("Acme Corp")
                        .help("Company name"),
                )
                .arg(
                    Arg::new("description-file")
                        .long("description-file")
                        .value_parser(value_parser!(PathBuf))
                        .help("Job description file; stdin when omitted"),
                )
                .arg(
                    Arg::new("latency-ms")
                        .long("latency-ms")
                        .default_value("1200")
                        .value_parser(value_parser!(u64))
                        .help("Simulated service latency"),
                )
                .arg(
                    Arg::new("fail-code")
                        .long("fail-code")
                        .help("Fail with this service code, e.g. unavailable"),
                )
                .arg(
                    Arg::new("uid")
                        .long("uid")
                        .help("Generate as this signed-in user"),
                ),
        )
        .subcommand(
            Command::new("history")
                .about("Show or append interview history")
                .arg(Arg::new("uid").long("uid").help("Signed-in user"))
                .arg(
                    Arg::new("add")
                        .long("add")
                        .value_name("COMPANY")
                        .help("Append a session for this company"),
                )
                .arg(
                    Arg::new("question")
                        .long("question")
                        .action(ArgAction::Append)
                        .requires("add")
                        .help("Question for the appended session"),
                )
                .arg(
                    Arg::new("file")
                        .long("file")
                        .value_parser(value_parser!(PathBuf))
                        .help("Local history file, overrides the configuration"),
                ),
        )
}

fn arg<T>(args: &ArgMatches, name: &str) -> anyhow::Result<T>
where
    T: Clone + Send + Sync + 'static,
{
    args.get_one::<T>(name)
        .cloned()
        .ok_or_else(|| anyhow!("missing --{name}"))
}

fn identity(args: &ArgMatches) -> Option<Identity> {
    args.get_one::<String>("uid").map(Identity::new)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    let log_level: String = arg(&matches, "log-level")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .init();

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::new(),
    };

    match matches.subcommand() {
        Some(("splash", args)) => splash(&config, args).await,
        Some(("generate", args)) => generate(&config, args).await,
        Some(("history", args)) => history(config, args).await,
        _ => Err(anyhow!("unknown subcommand")),
    }
}

async fn splash(config: &AppConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let fonts_ms: u64 = arg(args, "fonts-ms")?;
    let auth_ms: u64 = arg(args, "auth-ms")?;

    let logo: Arc<dyn ResourceProbe> = match args.get_one::<PathBuf>("logo-file") {
        Some(path) => Arc::new(FileProbe::new("logo", path)),
        None => {
            let delay = Duration::from_millis(arg(args, "logo-ms")?);
            if args.get_flag("logo-fail") {
                Arc::new(DelayedProbe::failing_after("logo", delay, "404 Not Found"))
            } else {
                Arc::new(DelayedProbe::ready_after("logo", delay))
            }
        }
    };

    let auth = AuthState::new();
    let splash = SplashScreen::mount(
        config.splash,
        SplashResources {
            fonts: Arc::new(DelayedProbe::ready_after("fonts", Duration::from_millis(fonts_ms))),
            logo,
            auth: auth.clone(),
        },
        || tracing::info!("splash complete, handing off"),
    )?;

    let resolver = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(auth_ms)).await;
        auth.resolve(None);
    });

    let mut phases = splash.subscribe();
    loop {
        let phase = *phases.borrow_and_update();
        println!("{:>6}ms  {phase}", splash.elapsed().as_millis());
        if phase.is_terminal() || phases.changed().await.is_err() {
            break;
        }
    }

    resolver.abort();
    println!("splash finished after {}ms", splash.elapsed().as_millis());
    Ok(())
}

async fn generate(config: &AppConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let company: String = arg(args, "company")?;
    let latency = Duration::from_millis(arg(args, "latency-ms")?);
    let description = match args.get_one::<PathBuf>("description-file") {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => std::io::read_to_string(std::io::stdin()).context("reading stdin")?,
    };

    let service: Arc<dyn GenerationService> = match args.get_one::<String>("fail-code") {
        Some(code) => Arc::new(ScriptedGenerationService::failing(latency, code.as_str())),
        None => Arc::new(ScriptedGenerationService::succeeding(
            latency,
            GeneratedInterview {
                questions: vec![
                    Question::new(format!("Why do you want to work at {company}?"))
                        .with_category("behavioral"),
                    Question::new("Describe a project from this role's requirements you have shipped.")
                        .with_category("technical"),
                    Question::new("Tell me about a disagreement with a teammate and how it ended."),
                ],
            },
        )),
    };

    let router = Arc::new(HistoryRouter::from_config(
        &config.history,
        Arc::new(InMemoryRemoteStore::new()),
    ));
    let auth = AuthState::resolved_with(identity(args));

    let mut setup = InterviewSetup::from_config(config, service, router, auth);
    setup.set_company_name(company);
    setup.set_job_description(description);
    println!("{} words", setup.word_count());

    let mut progress = setup.subscribe();
    let printer = tokio::spawn(async move {
        let mut last = None;
        while progress.changed().await.is_ok() {
            let task = progress.borrow_and_update().clone();
            if last != Some(task.percent()) && task.is_running() {
                last = Some(task.percent());
                println!("{:>3}%", task.percent());
            }
        }
    });

    let result = setup.try_generate().await;
    printer.abort();

    let interview = result.map_err(|err| {
        if let Some(message) = err.user_message() {
            eprintln!("{message}");
        }
        if err.is_retryable() {
            eprintln!("this failure is transient; run the command again");
        }
        anyhow::Error::new(err)
    })?;
    println!("{}", serde_json::to_string_pretty(&interview)?);
    Ok(())
}

async fn history(mut config: AppConfig, args: &ArgMatches) -> anyhow::Result<()> {
    if let Some(path) = args.get_one::<PathBuf>("file") {
        config.history.path = Some(path.clone());
    }
    let router = HistoryRouter::from_config(&config.history, Arc::new(InMemoryRemoteStore::new()));
    let identity = identity(args);

    if let Some(company) = args.get_one::<String>("add") {
        let questions = args
            .get_many::<String>("question")
            .map(|qs| qs.cloned().collect())
            .unwrap_or_default();
        router
            .save(identity.as_ref(), SessionRecord::new(company.as_str(), questions))
            .await;
    }

    let records = router.load(identity.as_ref()).await;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let matches = cli()
            .try_get_matches_from(["ivm", "history", "--log-level", "debug", "--uid", "ada"])
            .unwrap();
        assert_eq!(arg::<String>(&matches, "log-level").unwrap(), "debug");
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(identity(args).unwrap().uid, "ada");
    }

    #[test]
    fn question_requires_add() {
        assert!(cli()
            .try_get_matches_from(["ivm", "history", "--question", "Why?"])
            .is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn generate_failure_surfaces_app_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.txt");
        std::fs::write(&path, vec!["word"; 60].join(" ")).unwrap();

        let matches = cli()
            .try_get_matches_from([
                "ivm",
                "generate",
                "--description-file",
                path.to_str().unwrap(),
                "--latency-ms",
                "10",
                "--fail-code",
                "unavailable",
            ])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();

        let err = generate(&AppConfig::default(), args).await.unwrap_err();
        let app = err.downcast_ref::<AppError>().unwrap();
        assert!(matches!(app, AppError::Operation(_)));
        assert!(app.is_retryable());
    }
}

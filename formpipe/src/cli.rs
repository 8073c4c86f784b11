//! The `formpipe` command line.
//!
//! | Command | Purpose |
//! |---|---|
//! | `serve` | Run the HTTP API |
//! | `submit` | Push one JSON submission through the pipeline and print the response body |
//! | `check` | Load settings and form definitions and report what was found |
//!
//! Settings come from `--config` (TOML, or JSON by extension) with
//! `FORMPIPE_*` overrides; `--forms` overrides `forms_path`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::{json, Value};
use tokio::io::AsyncReadExt;

use formpipe_core::{settings_loader, FormError, FormResult, Settings};
use formpipe_mail::Mailer;
use formpipe_store::store_from_settings;
use formpipe_views::{
    ApiError, FormApp, FormRepository, FormService, InMemoryFormRepository, LogNotifier,
    SubmissionContext, TokenPresenceVerifier,
};

/// Builds the clap command tree.
pub fn command() -> Command {
    Command::new("formpipe")
        .about("Form submission pipeline")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Settings file (TOML, or JSON with a .json extension)"),
        )
        .arg(
            Arg::new("forms")
                .long("forms")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("JSON file with the form definitions"),
        )
        .subcommand(
            Command::new("serve").about("Run the HTTP API").arg(
                Arg::new("bind")
                    .long("bind")
                    .help("Address to listen on (overrides bind_address)"),
            ),
        )
        .subcommand(
            Command::new("submit")
                .about("Process one submission and print the response body")
                .arg(
                    Arg::new("input")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Submission JSON file; reads stdin when omitted or '-'"),
                )
                .arg(
                    Arg::new("request-id")
                        .long("request-id")
                        .help("Request id used in logs"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Validate settings and form definitions")
                .arg(
                    Arg::new("quiet")
                        .long("quiet")
                        .short('q')
                        .action(ArgAction::SetTrue)
                        .help("Only report problems"),
                ),
        )
}

/// Loads settings for the parsed command line.
pub fn load_settings(matches: &ArgMatches) -> FormResult<Settings> {
    let mut settings = match matches.get_one::<PathBuf>("config") {
        Some(path) => settings_loader::from_file_with_env(path)?,
        None => settings_loader::from_env(),
    };
    if let Some(forms) = matches.get_one::<PathBuf>("forms") {
        settings.forms_path = Some(forms.clone());
    }
    Ok(settings)
}

/// Loads the form definitions named by `settings.forms_path`.
pub async fn load_forms(settings: &Settings) -> FormResult<InMemoryFormRepository> {
    let path = settings.forms_path.as_ref().ok_or_else(|| {
        FormError::ConfigurationError("no form definitions configured (forms_path)".to_string())
    })?;
    InMemoryFormRepository::from_json_file(path).await
}

/// Wires a [`FormService`] with the standard handlers from `settings`.
pub async fn build_service(
    settings: &Settings,
    forms: Arc<dyn FormRepository>,
) -> FormResult<FormService> {
    let store = store_from_settings(settings).await?;
    let mailer = Mailer::from_settings(settings)?;
    Ok(
        FormService::from_settings(settings, forms, store, &mailer, Arc::new(LogNotifier))
            .with_challenge(Arc::new(TokenPresenceVerifier::default())),
    )
}

/// Runs the selected subcommand.
pub async fn execute(matches: &ArgMatches, settings: Settings) -> FormResult<()> {
    match matches.subcommand() {
        Some(("serve", sub)) => serve(sub, settings).await,
        Some(("submit", sub)) => {
            let input = read_input(sub.get_one::<PathBuf>("input")).await?;
            let mut ctx = SubmissionContext::new();
            if let Some(id) = sub.get_one::<String>("request-id") {
                ctx.request_id.clone_from(id);
            }
            let (body, result) = submit(&settings, &ctx, input).await?;
            println!("{body}");
            result
        }
        Some(("check", sub)) => {
            for line in check(&settings).await? {
                if !sub.get_flag("quiet") {
                    println!("{line}");
                }
            }
            Ok(())
        }
        Some((name, _)) => Err(FormError::ConfigurationError(format!(
            "unknown command: {name}"
        ))),
        None => Err(FormError::ConfigurationError("no command given".to_string())),
    }
}

async fn serve(matches: &ArgMatches, settings: Settings) -> FormResult<()> {
    let addr = matches
        .get_one::<String>("bind")
        .cloned()
        .unwrap_or_else(|| settings.bind_address.clone());
    let forms = load_forms(&settings).await?;
    let service = build_service(&settings, Arc::new(forms)).await?;

    tracing::info!(%addr, api_prefix = %settings.api_prefix, "starting formpipe");
    FormApp::with_settings(Arc::new(service), &settings)
        .run(&addr)
        .await
}

/// Processes one submission the way the HTTP API would.
///
/// Returns the response body alongside the outcome. Only configuration
/// problems (unreadable forms, unknown email backend) fail outright.
pub async fn submit(
    settings: &Settings,
    ctx: &SubmissionContext,
    input: Value,
) -> FormResult<(Value, FormResult<()>)> {
    let forms = load_forms(settings).await?;
    let service = build_service(settings, Arc::new(forms)).await?;
    Ok(match service.submit(ctx, input).await {
        Ok(()) => (json!({}), Ok(())),
        Err(err) => {
            let body = ApiError(err).body();
            let summary = body["name"].as_str().unwrap_or("error").to_string();
            (body, Err(FormError::BadRequest(format!("submission {summary}"))))
        }
    })
}

/// Loads settings-dependent collaborators and every form, reporting one line
/// per form.
pub async fn check(settings: &Settings) -> FormResult<Vec<String>> {
    Mailer::from_settings(settings)?;
    let forms = load_forms(settings).await?;

    let mut report = vec![format!(
        "email backend: {}, submissions: {}",
        settings.email_backend,
        settings
            .submissions_path
            .as_ref()
            .map_or_else(|| "memory".to_string(), |p| p.display().to_string()),
    )];
    for id in forms.ids().await {
        if let Some(form) = forms.find(&id).await? {
            report.push(format!(
                "{id}: {:?} ({} fields, {} email rules)",
                form.title,
                form.field_names().len(),
                form.emails.len()
            ));
        }
    }
    Ok(report)
}

async fn read_input(path: Option<&PathBuf>) -> FormResult<Value> {
    let text = match path {
        Some(path) if path.as_os_str() != "-" => tokio::fs::read_to_string(path).await?,
        _ => {
            let mut text = String::new();
            tokio::io::stdin().read_to_string(&mut text).await?;
            text
        }
    };
    serde_json::from_str(&text).map_err(|e| FormError::BadRequest(format!("malformed JSON: {e}")))
}

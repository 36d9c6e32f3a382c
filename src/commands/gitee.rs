//! # Gitee Command Implementation
//!
//! Runs a complete migration to Gitee:
//!
//! 1. Discover the repositories in SOURCE and let the operator confirm them.
//! 2. Log in (password grant, or a personal access token).
//! 3. Pick the namespace and the visibility of the new projects.
//! 4. Create the projects, resolve failures and name collisions, push.
//!
//! Every interactive step has a flag so the command can also run unattended
//! (`--yes --token ... --namespace ... --visibility ... --on-error ... --on-exists ...`).

use anyhow::{anyhow, Result};
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password, Select};
use std::path::PathBuf;
use std::time::Duration;

use up2::config::{RunConfig, Visibility, DEFAULT_REMOTE_PREFIX};
use up2::outcome::{OutcomeKind, WorkItem};
use up2::phases::orchestrator::{Pipeline, RunOutcome, Target};
use up2::policy::{PolicyDecision, PresetDecisions};
use up2::provider::gitee::{GiteeSettings, DEFAULT_BASE_URL};
use up2::provider::{AccessToken, Account, GiteeClient, HostingProvider, Namespace};
use up2::repository::SystemGit;

use super::console::{print_repositories, ConsoleReporter, TerminalDecisions};
use super::Globals;

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Create projects on Gitee and push all branches and tags of each repository
#[derive(Args, Debug)]
pub struct GiteeArgs {
    /// A directory whose subdirectories are repositories, or a file with one path per line
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Personal access token; skips the email/password login
    #[arg(long, env = "UP2_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Gitee account email (prompted when missing)
    #[arg(long, value_name = "EMAIL")]
    pub email: Option<String>,

    /// OAuth application id used for the password login
    #[arg(long, env = "UP2_GITEE_CLIENT_ID")]
    pub client_id: Option<String>,

    /// OAuth application secret used for the password login
    #[arg(long, env = "UP2_GITEE_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Base URL of the Gitee instance
    #[arg(long, env = "UP2_GITEE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Path of the namespace to create projects in (prompted when missing)
    #[arg(long, value_name = "PATH")]
    pub namespace: Option<String>,

    /// Visibility of the new projects (prompted when missing)
    #[arg(long, value_enum)]
    pub visibility: Option<Visibility>,

    /// What to do when some projects could not be created (prompted when missing)
    #[arg(long, value_enum, value_name = "DECISION")]
    pub on_error: Option<PolicyDecision>,

    /// What to do when some projects already exist (prompted when missing)
    #[arg(long, value_enum, value_name = "DECISION")]
    pub on_exists: Option<PolicyDecision>,

    /// Do not ask to confirm the discovered repositories
    #[arg(short, long)]
    pub yes: bool,

    /// Hide progress bars
    #[arg(short, long)]
    pub quiet: bool,

    /// Prefix of the temporary remote added to each repository while pushing
    #[arg(long, default_value = DEFAULT_REMOTE_PREFIX)]
    pub remote_prefix: String,
}

/// Execute the `gitee` command.
pub fn execute(args: GiteeArgs, globals: &Globals) -> Result<()> {
    let out = globals.output;
    let mut config = RunConfig {
        workers: globals.workers,
        remote_prefix: args.remote_prefix.clone(),
        on_error: args.on_error,
        on_exists: args.on_exists,
        ..RunConfig::default()
    };
    config.validate()?;

    let provider = GiteeClient::new(GiteeSettings {
        base_url: args.base_url.clone(),
        client_id: args.client_id.clone(),
        client_secret: args.client_secret.clone(),
        timeout: Some(HTTP_TIMEOUT),
    })?;
    let git = SystemGit;
    let reporter = ConsoleReporter::new(out, args.quiet, provider.display_name());
    let decisions = PresetDecisions::new(args.on_error, args.on_exists, TerminalDecisions);

    let repos = Pipeline {
        config: &config,
        provider: &provider,
        git: &git,
        decisions: &decisions,
        reporter: &reporter,
    }
    .discover(&args.source)?;

    if repos.is_empty() {
        println!(
            "{}",
            out.error(format!(
                "No git repositories detected in {}",
                args.source.display()
            ))
        );
        return Ok(());
    }
    print_repositories(&repos, &out);
    if !args.yes && !confirm_repositories()? {
        println!("Bye, see you next time!");
        return Ok(());
    }
    let items: Vec<WorkItem> = repos.into_iter().map(|r| r.item).collect();

    let (token, account) = log_in(&provider, &args)?;
    let user = provider.current_user(&token)?;
    println!(
        "\n{}\n",
        out.outcome(OutcomeKind::Success, format!("Hello, {}!", user.name))
    );

    let namespaces = provider.namespaces(&token, &user)?;
    let namespace = select_namespace(namespaces, args.namespace.as_deref())?;
    println!(
        "\n{}",
        out.notice(format!(
            "Selected {}({}) as namespace, Type: {}",
            namespace.name,
            provider.web_url(&namespace.path),
            namespace.kind
        ))
    );
    println!(
        "The following projects will be generated on {}:\n",
        provider.display_name()
    );
    for (i, item) in items.iter().enumerate() {
        let url = provider.repository_url(&namespace, &item.base_name());
        println!("{}", out.warning(format!("{}. {}", i + 1, url)));
    }

    config.visibility = match args.visibility {
        Some(visibility) => visibility,
        None => select_visibility(&namespace)?,
    };
    config.validate_for(namespace.kind)?;

    println!("\nCreating projects, please wait...");
    let pipeline = Pipeline {
        config: &config,
        provider: &provider,
        git: &git,
        decisions: &decisions,
        reporter: &reporter,
    };
    let target = Target {
        namespace: &namespace,
        token: &token,
        account: account.as_ref(),
    };
    let summary = pipeline.run(items, &target)?;

    if summary.outcome == RunOutcome::Completed {
        if let Some(counts) = summary.synchronization {
            println!(
                "\n{} Done: {} of {} repositories synced to {}",
                out.emoji("✅", "[OK]"),
                counts.success,
                counts.total(),
                provider.display_name()
            );
        }
    }
    Ok(())
}

fn confirm_repositories() -> Result<bool> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Check if these repositories are what you expected, ready for the next step?")
        .default(false)
        .interact()?)
}

/// Obtain an access token and, for password logins, the account used to push.
fn log_in(provider: &dyn HostingProvider, args: &GiteeArgs) -> Result<(AccessToken, Option<Account>)> {
    if let Some(token) = args.token.as_deref().filter(|t| !t.is_empty()) {
        return Ok((AccessToken::new(token), None));
    }

    let theme = ColorfulTheme::default();
    let username = match &args.email {
        Some(email) => email.clone(),
        None => Input::<String>::with_theme(&theme)
            .with_prompt(format!("Please enter your {} email", provider.display_name()))
            .interact_text()?,
    };
    let password = Password::with_theme(&theme)
        .with_prompt(format!("Please enter your {} password", provider.display_name()))
        .interact()?;

    let account = Account { username, password };
    let token = provider.authenticate(&account)?;
    Ok((token, Some(account)))
}

fn select_namespace(namespaces: Vec<Namespace>, wanted: Option<&str>) -> Result<Namespace> {
    if namespaces.is_empty() {
        return Err(anyhow!("no namespace is available for this account"));
    }

    if let Some(path) = wanted {
        let available: Vec<String> = namespaces.iter().map(|n| n.path.clone()).collect();
        return namespaces
            .into_iter()
            .find(|n| n.path == path)
            .ok_or_else(|| {
                anyhow!(
                    "namespace '{}' not found (available: {})",
                    path,
                    available.join(", ")
                )
            });
    }

    let labels: Vec<String> = namespaces
        .iter()
        .map(|n| format!("{} ({}) [{}]", n.name, n.path, n.kind))
        .collect();
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Please choose this project's namespace")
        .items(&labels)
        .default(0)
        .interact()?;

    namespaces
        .into_iter()
        .nth(selection)
        .ok_or_else(|| anyhow!("no namespace at position {}", selection))
}

fn select_visibility(namespace: &Namespace) -> Result<Visibility> {
    let choices = Visibility::choices_for(namespace.kind);
    let labels: Vec<&str> = choices.iter().map(|v| v.description()).collect();
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Please choose this project's type")
        .items(&labels)
        .default(0)
        .interact()?;

    choices
        .get(selection)
        .copied()
        .ok_or_else(|| anyhow!("no visibility at position {}", selection))
}

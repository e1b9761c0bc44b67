//! `docflow` command-line client.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use docflow_auth::{RegisterUser, Role, User, UserListRequest};
use docflow_client::{
    AppState, AutoConfirm, ClientConfig, ConsoleNotifier, LinkRenderer, TerminalConfirm,
};
use docflow_core::{DocumentId, PageRequest, SortKey};
use docflow_documents::{
    Capabilities, Confirm, CreateOutcome, CreatorFilter, Document, DocumentListRequest,
    DocumentStatus, DocumentView, FileUpload, NewDocument, Outcome,
};
use docflow_observability::LogFormat;

/// Document approval workflow client
#[derive(Parser, Debug)]
#[command(name = "docflow")]
#[command(about = "Upload documents and move them through review")]
struct Cli {
    /// Answer "yes" to every confirmation prompt
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the session
    Login {
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the persisted session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List documents
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        size: Option<u32>,
        /// `field` or `field,asc|desc`
        #[arg(long)]
        sort: Option<SortKey>,
        #[arg(long)]
        status: Option<DocumentStatus>,
        /// Reviewers only
        #[arg(long, conflicts_with = "creator_email")]
        creator_id: Option<String>,
        /// Reviewers only
        #[arg(long)]
        creator_email: Option<String>,
    },
    /// Show one document and what you can do with it
    Show { id: String },
    /// Upload a file as a new document
    Create {
        file: PathBuf,
        /// Defaults to the file name without extension
        #[arg(long)]
        name: Option<String>,
        /// Submit for review right after upload
        #[arg(long)]
        submit: bool,
    },
    /// Rename a document
    Rename { id: String, name: String },
    /// Submit a draft for review
    Submit { id: String },
    /// Withdraw a document from review
    Revoke { id: String },
    /// Start reviewing a document
    Review { id: String },
    /// Approve a document under review
    Approve { id: String },
    /// Decline a document under review
    Decline { id: String },
    /// Delete a document
    Delete { id: String },
    /// List registered users
    Users {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        size: Option<u32>,
        #[arg(long)]
        sort: Option<SortKey>,
        /// Case-insensitive match on email or name, over the fetched page
        #[arg(long)]
        filter: Option<String>,
    },
    /// Create an account
    Register {
        email: String,
        #[arg(long)]
        full_name: String,
        #[arg(long, default_value = "SUBMITTER")]
        role: Role,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ClientConfig::from_env().context("invalid configuration")?;
    docflow_observability::init(LogFormat::from_json_flag(config.log_json));

    let confirm: Arc<dyn Confirm> = if cli.yes {
        Arc::new(AutoConfirm(true))
    } else {
        Arc::new(TerminalConfirm)
    };
    let state = AppState::new(config, confirm, Arc::new(ConsoleNotifier))
        .context("failed to initialize client")?;

    run(cli.command, &state).await
}

async fn run(command: Command, state: &AppState) -> Result<()> {
    let page_size = state.config.page_size;
    match command {
        Command::Login { email, password } => {
            let password = password_or_prompt(password)?;
            let session = state.session.login(&email, &password).await?;
            if let Some(user) = session.current_user() {
                println!("Signed in as {} ({})", user.email, user.role);
            }
        }
        Command::Logout => {
            state.logout();
            println!("Signed out");
        }
        Command::Whoami => match state.session.current_user() {
            Some(user) => print_user(&user),
            None => println!("Not signed in"),
        },
        Command::List {
            page,
            size,
            sort,
            status,
            creator_id,
            creator_email,
        } => {
            let mut request = DocumentListRequest::default()
                .with_page(PageRequest::new(page, size.unwrap_or(page_size))?);
            request.sort = sort;
            request.status = status;
            request.creator = creator_id
                .map(|id| CreatorFilter::Id(id.into()))
                .or(creator_email.map(CreatorFilter::Email));

            let listed = state.engine.list(request).await?;
            for doc in &listed.items {
                print_row(doc);
            }
            println!(
                "page {} · {} of {} document(s)",
                listed.page(),
                listed.items.len(),
                listed.total_count
            );
        }
        Command::Show { id } => {
            let view = DocumentView::new(state.engine.clone(), Arc::new(LinkRenderer::default()));
            view.open(&DocumentId::new(id), "terminal").await?;
            if let Some(doc) = view.document() {
                print_detail(&doc, &view.capabilities());
            }
            view.close();
        }
        Command::Create { file, name, submit } => {
            let upload = FileUpload::from_path(&file)
                .with_context(|| format!("cannot read {}", file.display()))?;
            let new = match name {
                Some(name) => NewDocument::new(name, upload)?,
                None => NewDocument::from_file(upload)?,
            };
            match state.engine.create(new, submit).await? {
                CreateOutcome::Draft(doc) | CreateOutcome::Submitted(doc) => print_row(&doc),
                CreateOutcome::SubmitFailed { document, .. } => print_row(&document),
            }
        }
        Command::Rename { id, name } => {
            let doc = state
                .engine
                .update_metadata(&DocumentId::new(id), &name)
                .await?;
            print_row(&doc);
        }
        Command::Submit { id } => report(state.engine.submit_for_review(&DocumentId::new(id)).await?),
        Command::Revoke { id } => report(state.engine.revoke(&DocumentId::new(id)).await?),
        Command::Review { id } => report(state.engine.start_review(&DocumentId::new(id)).await?),
        Command::Approve { id } => report(state.engine.approve(&DocumentId::new(id)).await?),
        Command::Decline { id } => report(state.engine.decline(&DocumentId::new(id)).await?),
        Command::Delete { id } => {
            if let Outcome::Declined = state.engine.delete(&DocumentId::new(id)).await? {
                println!("Cancelled");
            }
        }
        Command::Users {
            page,
            size,
            sort,
            filter,
        } => {
            if !state.session.current_user().is_some_and(|u| u.is_reviewer()) {
                bail!("only reviewers can browse the user directory");
            }
            let request = UserListRequest {
                page: PageRequest::new(page, size.unwrap_or(page_size))?,
                sort,
            };
            let fetched = state.directory.fetch(request).await?;
            let users = match filter {
                Some(q) => state.directory.filter(&q),
                None => fetched.users,
            };
            for user in &users {
                print_user(user);
            }
            println!("{} shown · {} registered", users.len(), fetched.total_count);
        }
        Command::Register {
            email,
            full_name,
            role,
            password,
        } => {
            let password = password_or_prompt(password)?;
            let user = state
                .session
                .register(RegisterUser {
                    email,
                    password,
                    full_name,
                    role,
                })
                .await?;
            println!("Registered {} ({}). You can now log in.", user.email, user.role);
        }
    }
    Ok(())
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    print!("Password: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn report(outcome: Outcome<Document>) {
    match outcome {
        Outcome::Applied(doc) => print_row(&doc),
        Outcome::Declined => println!("Cancelled"),
    }
}

fn print_user(user: &User) {
    println!("{}  {:<30} {:<24} {}", user.id, user.email, user.full_name, user.role);
}

fn print_row(doc: &Document) {
    let id = doc.id.as_ref().map(DocumentId::as_str).unwrap_or("-");
    let creator = doc.creator.as_ref().map(|c| c.email.as_str()).unwrap_or("-");
    println!("{id}  {:<32} {:<18} {creator}", doc.name, doc.status.label());
}

fn print_detail(doc: &Document, caps: &Capabilities) {
    print_row(doc);
    if let Some(created) = doc.created_at {
        println!("Created: {created}");
    }
    if let Some(updated) = doc.updated_at {
        println!("Updated: {updated}");
    }
    let actions: Vec<&str> = [
        (caps.can_edit, "rename"),
        (caps.can_delete, "delete"),
        (caps.can_submit_for_review, "submit"),
        (caps.can_revoke, "revoke"),
        (caps.can_advance_to_under_review, "review"),
        (caps.can_approve, "approve"),
        (caps.can_decline, "decline"),
    ]
    .into_iter()
    .filter_map(|(allowed, name)| allowed.then_some(name))
    .collect();
    if actions.is_empty() {
        println!("Actions: none");
    } else {
        println!("Actions: {}", actions.join(", "));
    }
}

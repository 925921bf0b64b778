use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use hanashi_client::{
    api::{CaptchaChallenge, CommentId, MediaType, SortField, SortOrder, SortState},
    ClientConfig, CommentApi, CommentDraft, CommentStore, HttpApi,
};

#[derive(structopt::StructOpt)]
struct Opt {
    /// Base URL of the comment API, defaults to HANASHI_API_URL
    #[structopt(short, long)]
    host: Option<String>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Print the comment tree
    List {
        /// One of created_at, username, email
        #[structopt(long, default_value = "created_at", parse(try_from_str = parse_sort_field))]
        sort_by: SortField,

        /// asc or desc
        #[structopt(long, default_value = "desc", parse(try_from_str = parse_sort_order))]
        order: SortOrder,
    },

    /// Request a new CAPTCHA challenge
    Captcha,

    /// Post a comment, answering a challenge obtained with `captcha`
    Post {
        username: String,
        email: String,
        text: String,

        #[structopt(long)]
        home_page: Option<String>,

        /// Id of the comment to reply to
        #[structopt(long)]
        parent: Option<i64>,

        #[structopt(long, parse(from_os_str))]
        avatar: Option<PathBuf>,

        #[structopt(long, parse(from_os_str))]
        attachment: Option<PathBuf>,

        #[structopt(long)]
        captcha_key: String,

        #[structopt(long)]
        captcha: String,
    },
}

fn parse_sort_field(s: &str) -> anyhow::Result<SortField> {
    SortField::from_param(s).ok_or_else(|| anyhow!("unknown sort field {s:?}"))
}

fn parse_sort_order(s: &str) -> anyhow::Result<SortOrder> {
    SortOrder::from_param(s).ok_or_else(|| anyhow!("unknown sort order {s:?}"))
}

async fn read_upload(path: &Path) -> anyhow::Result<(String, &'static str, Vec<u8>)> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("figuring out file name of {path:?}"))?
        .to_string();
    let mime = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(MediaType::from_extension)
        .with_context(|| format!("figuring out media type of {path:?}"))?
        .mime();
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {path:?}"))?;
    Ok((file_name, mime, data))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let opt = <Opt as structopt::StructOpt>::from_args();

    let config = match opt.host {
        Some(host) => ClientConfig::new(host),
        None => ClientConfig::from_env()?,
    };
    let api = HttpApi::new(config.clone());

    match opt.cmd {
        Command::List { sort_by, order } => {
            let mut store = CommentStore::new();
            store.replace(
                SortState {
                    field: sort_by,
                    order,
                },
                Default::default(),
            );
            store.refresh(&api).await?;
            for (depth, c) in store.walk() {
                let indent = "    ".repeat(depth);
                println!(
                    "{indent}#{} {} <{}> {}",
                    c.id.0,
                    c.display_name(),
                    c.email,
                    c.display_date()
                );
                if let Some(home_page) = &c.home_page {
                    println!("{indent}  {home_page}");
                }
                println!("{indent}  {}", c.text);
                if let Some(url) = &c.attachment_url {
                    println!("{indent}  [attachment] {url}");
                }
            }
        }
        Command::Captcha => {
            let challenge = api.fetch_captcha().await?;
            println!("key:   {}", challenge.key);
            println!("image: {}", challenge.image_url(&config.api_url));
        }
        Command::Post {
            username,
            email,
            text,
            home_page,
            parent,
            avatar,
            attachment,
            captcha_key,
            captcha,
        } => {
            let mut draft = CommentDraft::new(parent.map(CommentId));
            draft.username = username;
            draft.email = email;
            draft.set_text(text);
            if let Some(home_page) = home_page {
                draft.set_home_page(home_page);
                if let Some(err) = draft.home_page_error() {
                    tracing::warn!("{err}");
                }
            }
            if let Some(path) = avatar {
                let (name, mime, data) = read_upload(&path).await?;
                draft.set_avatar(name, mime, data).await?;
            }
            if let Some(path) = attachment {
                let (name, mime, data) = read_upload(&path).await?;
                draft.attach_file(name, mime, data).await?;
            }
            draft.set_captcha(CaptchaChallenge {
                key: captcha_key,
                image: String::new(),
            });
            draft.captcha_response = captcha;

            let comment = draft.post(&api).await?;
            println!("posted comment #{}", comment.id.0);
        }
    }

    Ok(())
}

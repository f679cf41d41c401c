use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::{Builder, Env};
use log::debug;
use snippetbox_core::{
    FilteredTreeModel, FindOptions, FindReplaceSession, Snippet, SnippetManager, SnippetNode,
    SnippetTree,
};
use snippetbox_highlight::{HighlightKind, KeywordHighlighter, Language};
use snippetbox_settings::PreferencesStore;

#[derive(Parser)]
#[command(
    name = "snippetbox",
    about = "Organize code snippets grouped by language",
    author,
    version
)]
struct Cli {
    /// 要讀取與更新的片段文件。 / Snippet document to read and update.
    #[arg(long, global = true, value_name = "PATH", default_value = "snippets.xml")]
    file: PathBuf,
    /// 偏好設定檔（JSON）；略過或不存在時使用預設值。 / Preferences file (JSON); defaults apply when omitted or missing.
    #[arg(long, global = true, value_name = "PATH")]
    preferences: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 列出片段樹，可選擇套用篩選。 / Print the snippet tree, optionally filtered.
    List(ListArgs),
    /// 顯示單一片段。 / Print a single snippet.
    Show { name: String },
    /// 新增片段。 / Add a new snippet.
    Add(AddArgs),
    /// 移除片段。 / Remove a snippet.
    Remove { name: String },
    /// 重新命名片段。 / Rename a snippet.
    Rename { old: String, new: String },
    /// 在片段內容中尋找並取代。 / Find and replace inside a snippet body.
    Replace(ReplaceArgs),
    /// 列出片段內容中的關鍵字與數字範圍。 / Print keyword and number ranges of a snippet body.
    Highlight { name: String },
}

#[derive(Args)]
struct ListArgs {
    /// 以子字串比對名稱、描述與語言，關鍵字需完全相符。 / Matches names, descriptions and languages by substring, keywords exactly.
    #[arg(long, default_value = "")]
    filter: String,
}

#[derive(Args)]
struct AddArgs {
    /// 片段名稱。 / Snippet name.
    name: String,
    /// 語言識別碼或顯示名稱（例如 Java、C#、"Plain Text"）。 / Language identifier or display name (e.g. Java, C#, "Plain Text").
    #[arg(long)]
    language: Language,
    /// 片段內容。 / Snippet body.
    #[arg(long, default_value = "")]
    body: String,
    /// 片段描述。 / Snippet description.
    #[arg(long, default_value = "")]
    description: String,
    /// 可重複指定。 / Repeatable.
    #[arg(long = "keyword", value_name = "KEYWORD")]
    keywords: Vec<String>,
}

#[derive(Args)]
struct ReplaceArgs {
    /// 目標片段名稱。 / Name of the snippet to edit.
    name: String,
    /// 搜尋樣式（文字或 regex）。 / Pattern to search for (literal or regex).
    #[arg(long = "find", value_name = "PATTERN")]
    pattern: String,
    /// 取代文字。 / Replacement text.
    #[arg(long = "with", value_name = "TEXT")]
    replacement: String,
    /// 使用正規表示式。 / Treat the pattern as a regular expression.
    #[arg(long)]
    regex: bool,
    /// 區分大小寫。 / Case sensitive search.
    #[arg(long)]
    case_sensitive: bool,
}

fn init_logger() {
    Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut manager = open_store(&cli.file)?;
    manager.subscribe_fn(|manager, kind| debug!("{kind:?}: {} snippets", manager.count()));

    match cli.command {
        Commands::List(args) => list(&manager, &args.filter),
        Commands::Show { name } => show(&manager, &name),
        Commands::Add(args) => {
            let snippet = Snippet::new(
                args.name,
                args.body,
                args.description,
                &args.keywords,
                args.language,
            )?;
            let name = snippet.name().to_string();
            manager.add(snippet)?;
            save_store(&manager, &cli.file)?;
            println!("Added '{name}'");
            Ok(())
        }
        Commands::Remove { name } => {
            let snippet = lookup(&manager, &name)?.clone();
            manager.delete(&snippet);
            save_store(&manager, &cli.file)?;
            println!("Removed '{}'", snippet.name());
            Ok(())
        }
        Commands::Rename { old, new } => {
            let snippet = lookup(&manager, &old)?.clone();
            let renamed = snippet.renamed(new)?;
            let new_name = renamed.name().to_string();
            manager.update(&snippet, renamed)?;
            save_store(&manager, &cli.file)?;
            println!("Renamed '{}' to '{new_name}'", snippet.name());
            Ok(())
        }
        Commands::Replace(args) => replace(&mut manager, &cli.file, args),
        Commands::Highlight { name } => highlight(&manager, &name, cli.preferences.as_deref()),
    }
}

fn open_store(path: &Path) -> Result<SnippetManager> {
    let mut manager = SnippetManager::new();
    if path.exists() {
        manager
            .load_from(path)
            .with_context(|| format!("failed to load snippets from {}", path.display()))?;
    } else {
        debug!("{} does not exist, starting empty", path.display());
    }
    Ok(manager)
}

fn save_store(manager: &SnippetManager, path: &Path) -> Result<()> {
    manager
        .save_to(path)
        .with_context(|| format!("failed to save snippets to {}", path.display()))
}

fn lookup<'a>(manager: &'a SnippetManager, name: &str) -> Result<&'a Snippet> {
    match manager.find_by_name(name) {
        Some(snippet) => Ok(snippet),
        None => bail!("snippet '{name}' not found"),
    }
}

fn list(manager: &SnippetManager, filter: &str) -> Result<()> {
    let mut view = FilteredTreeModel::new(manager.build_hierarchy());
    view.set_filter(filter);
    print_node(&view, view.root(), 0);
    Ok(())
}

fn print_node(view: &FilteredTreeModel<SnippetTree>, node: &SnippetNode, depth: usize) {
    println!("{}{}", "  ".repeat(depth), node.label());
    for child in view.visible_children(node) {
        print_node(view, child, depth + 1);
    }
}

fn show(manager: &SnippetManager, name: &str) -> Result<()> {
    let snippet = lookup(manager, name)?;
    println!("Name: {}", snippet.name());
    println!("Language: {}", snippet.language());
    println!("Description: {}", snippet.description());
    let keywords: Vec<&str> = snippet.keywords().iter().map(String::as_str).collect();
    println!("Keywords: {}", keywords.join(", "));
    println!();
    println!("{}", snippet.body());
    Ok(())
}

fn replace(manager: &mut SnippetManager, path: &Path, args: ReplaceArgs) -> Result<()> {
    let snippet = lookup(manager, &args.name)?.clone();
    let options = if args.regex {
        FindOptions::regex(args.pattern)
    } else {
        FindOptions::literal(args.pattern)
    }
    .case_sensitive(args.case_sensitive);

    let mut session = FindReplaceSession::new(snippet.body());
    let count = session.replace_all(&options, &args.replacement)?;
    if count > 0 {
        let edited = snippet.with_body(session.into_text());
        manager.update_content_only(&snippet, edited)?;
        save_store(manager, path)?;
    }
    println!("Replaced {count} occurrence(s) in '{}'", snippet.name());
    Ok(())
}

fn highlight(manager: &SnippetManager, name: &str, preferences: Option<&Path>) -> Result<()> {
    let snippet = lookup(manager, name)?;
    let settings = match preferences {
        Some(path) => PreferencesStore::load(path)
            .with_context(|| format!("failed to load preferences from {}", path.display()))?
            .preferences()
            .highlight_settings(),
        None => Default::default(),
    };
    let highlighter = KeywordHighlighter::new(snippet.language(), settings);
    let body = snippet.body();
    println!("Colour: {}", settings.colour);
    for token in highlighter.highlight(body) {
        let kind = match token.kind {
            HighlightKind::Keyword => "keyword",
            HighlightKind::Number => "number",
        };
        println!(
            "{kind} {}..{} {}",
            token.range.start,
            token.range.end,
            &body[token.range.clone()]
        );
    }
    Ok(())
}

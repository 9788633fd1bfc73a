use anyhow::{bail, Context};
use colored::Colorize;
use serde::Serialize;
use servdash_gateway::{GatewayConfig, HttpGateway};
use servdash_server::{DashboardServer, ServerConfig};
use servdash_store::{
    CollectionStore, CustomField, FlattenedSite, Server, ServerCategory, ServerInput, SiteAssociation,
    SiteInput, Stats,
};

use crate::cli::*;

type Store = CollectionStore<HttpGateway>;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::Servers(args) => {
            let mut store = open_store(&cli.url).await?;
            store.set_category_filter(args.category);
            print_servers(format, &store.filtered_servers())
        }
        Command::Sites(args) => {
            let mut store = open_store(&cli.url).await?;
            store.set_site_query(args.query.unwrap_or_default());
            print_sites(format, &store.filtered_sites())
        }
        Command::Stats => {
            let store = open_store(&cli.url).await?;
            print_stats(format, &store.stats())
        }
        Command::Server { action } => {
            let store = open_store(&cli.url).await?;
            cmd_server(store, format, action).await
        }
        Command::Site { action } => {
            let store = open_store(&cli.url).await?;
            cmd_site(store, format, action).await
        }
    }
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = ServerConfig::load(args.config.as_deref())
        .context("failed to load server configuration")?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(dir) = args.data_dir {
        config.data_dir = Some(dir);
    }
    tracing::debug!(?config, "server configuration");
    DashboardServer::new(config).await?.serve().await?;
    Ok(())
}

async fn open_store(url: &str) -> anyhow::Result<Store> {
    let gateway = HttpGateway::new(url, &GatewayConfig::default())?;
    let mut store = CollectionStore::new(gateway);
    store
        .load()
        .await
        .with_context(|| format!("failed to load data from {url}"))?;
    Ok(store)
}

// ---------------------------------------------------------------------------
// Servers
// ---------------------------------------------------------------------------

async fn cmd_server(mut store: Store, format: OutputFormat, action: ServerAction) -> anyhow::Result<()> {
    match action {
        ServerAction::Add(fields) => {
            let category = fields.category.unwrap_or_default();
            let mut input = ServerInput::new(category);
            apply_server_fields(&mut input, fields);
            let server = store.upsert_server(input, false).await?;
            print_saved(format, "Added server", &server.id, &server)
        }
        ServerAction::Edit { id, fields } => {
            let current = store
                .find_server(&id)
                .with_context(|| format!("server not found: {id}"))?;
            let mut input = ServerInput::from_server(current);
            apply_server_fields(&mut input, fields);
            let server = store.upsert_server(input, true).await?;
            print_saved(format, "Updated server", &server.id, &server)
        }
        ServerAction::Delete { id, yes } => {
            let impact = store
                .delete_impact(&id)
                .with_context(|| format!("server not found: {id}"))?;
            if !yes {
                println!("{}", impact.summary());
                println!("Re-run with {} to delete.", "--yes".bold());
                return Ok(());
            }
            let deleted = store.delete_server(&id).await?;
            print_saved(format, "Deleted server", &id, &deleted)
        }
        ServerAction::Show { id } => {
            let server = store
                .find_server(&id)
                .with_context(|| format!("server not found: {id}"))?;
            match format {
                OutputFormat::Json => print_json(server),
                OutputFormat::Text => {
                    print_server_detail(server);
                    Ok(())
                }
            }
        }
        ServerAction::Associations { id } => {
            if store.find_server(&id).is_none() {
                bail!("server not found: {id}");
            }
            print_sites(format, &store.sites_associated_with(&id))
        }
    }
}

fn apply_server_fields(input: &mut ServerInput, fields: ServerFields) {
    if let Some(category) = fields.category.filter(|c| *c != input.server_category) {
        input.set_category(category);
    }
    let ServerFields {
        title,
        link,
        port,
        login,
        password,
        mx_records,
        custom_fields,
        clear_fields,
        fixed,
        mural,
        ..
    } = fields;
    if let Some(title) = title {
        input.title = title;
    }
    if let Some(link) = link {
        input.link = link;
    }
    if port.is_some() {
        input.port = port;
    }
    if login.is_some() {
        input.login = login;
    }
    if password.is_some() {
        input.password = password;
    }
    if !mx_records.is_empty() {
        input.raw_mx_records = mx_records.join("\n");
    }
    if clear_fields {
        input.custom_fields.clear();
    }
    for (label, value) in custom_fields {
        input.custom_fields.push(CustomField::for_server(label, value));
    }
    if let Some(fixed) = fixed {
        input.is_fixed = fixed;
    }
    if let Some(mural) = mural {
        input.show_on_mural = mural;
    }
}

// ---------------------------------------------------------------------------
// Sites
// ---------------------------------------------------------------------------

async fn cmd_site(mut store: Store, format: OutputFormat, action: SiteAction) -> anyhow::Result<()> {
    match action {
        SiteAction::Add {
            file_server,
            fields,
        } => {
            let mut input = SiteInput::new(file_server);
            apply_site_fields(&mut input, fields);
            let site = store.upsert_site(input, false).await?;
            print_saved(format, "Added site", &site.id, &site)
        }
        SiteAction::Edit {
            id,
            move_to,
            fields,
        } => {
            let (parent, site) = store
                .find_site(&id)
                .with_context(|| format!("site not found: {id}"))?;
            let mut input = SiteInput::from_site(site, parent.id.clone());
            if let Some(target) = move_to {
                input.target_file_server_id = target;
            }
            apply_site_fields(&mut input, fields);
            let site = store.upsert_site(input, true).await?;
            print_saved(format, "Updated site", &site.id, &site)
        }
        SiteAction::Delete { id, yes } => {
            let (parent, site) = store
                .find_site(&id)
                .with_context(|| format!("site not found: {id}"))?;
            let parent = parent.id.clone();
            if !yes {
                println!("Delete site \"{}\"?", site.domain_name);
                println!("Re-run with {} to delete.", "--yes".bold());
                return Ok(());
            }
            let removed = store.delete_site(&id, &parent).await?;
            print_saved(format, "Deleted site", &id, &removed)
        }
        SiteAction::Show { id } => {
            let row = store
                .flattened_sites()
                .into_iter()
                .find(|row| row.site.id == id)
                .with_context(|| format!("site not found: {id}"))?;
            match format {
                OutputFormat::Json => print_json(&row),
                OutputFormat::Text => {
                    print_site_detail(&row);
                    Ok(())
                }
            }
        }
    }
}

fn apply_site_fields(input: &mut SiteInput, fields: SiteFields) {
    if let Some(domain) = fields.domain {
        input.domain_name = domain;
    }
    if let Some(user) = fields.admin_user {
        input.admin_user = user;
    }
    if let Some(password) = fields.admin_password {
        input.admin_password = password;
    }
    let associations = [
        (SiteAssociation::Database, fields.db_server),
        (SiteAssociation::ReverseProxy, fields.reverse_proxy),
        (SiteAssociation::Backup, fields.backup_server),
        (SiteAssociation::EmailService, fields.email_service),
    ];
    for (kind, value) in associations {
        if let Some(server_id) = value {
            input.set_association(kind, Some(server_id));
        }
    }
    if let Some(mx) = fields.mx_records {
        input.raw_email_mx_records = mx;
    }
    if fields.clear_fields {
        input.custom_fields.clear();
    }
    for (label, value) in fields.custom_fields {
        input.custom_fields.push(CustomField::for_site(label, value));
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_saved<T: Serialize>(format: OutputFormat, verb: &str, id: &str, value: &T) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Text => {
            println!("{} {} {}", "✓".green().bold(), verb, id.yellow());
            Ok(())
        }
    }
}

fn print_servers(format: OutputFormat, servers: &[&Server]) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(servers);
    }
    if servers.is_empty() {
        println!("No servers.");
        return Ok(());
    }
    for server in servers {
        let sites = if server.is_file_server() {
            format!(" ({} sites)", server.sites().len())
        } else {
            String::new()
        };
        println!(
            "{:<32} {:<22} {}{} {}",
            server.id.yellow(),
            server.server_category.as_str().cyan(),
            server.title.bold(),
            sites,
            server.link.dimmed()
        );
    }
    Ok(())
}

fn print_server_detail(server: &Server) {
    println!("{} {}", server.title.bold(), server.id.yellow());
    println!("  Category: {}", server.server_category.as_str().cyan());
    println!("  Link: {}", server.link);
    if let Some(port) = &server.port {
        println!("  Port: {port}");
    }
    println!("  Login: {}", server.login);
    if server.category() == ServerCategory::EmailService {
        for mx in server.mx_records() {
            println!("  MX: {mx}");
        }
    }
    for field in &server.custom_fields {
        println!("  {}: {}", field.label, field.value);
    }
    if server.is_file_server() {
        println!("  Sites: {}", server.sites().len());
        for site in server.sites() {
            println!("    {} {}", site.id.yellow(), site.domain_name);
        }
    }
}

fn print_sites(format: OutputFormat, rows: &[FlattenedSite]) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(rows);
    }
    if rows.is_empty() {
        println!("No sites.");
        return Ok(());
    }
    for row in rows {
        println!(
            "{:<32} {:<32} {:<16} db {}  proxy {}",
            row.site.id.yellow(),
            row.site.domain_name.bold(),
            row.group_name.cyan(),
            row.display_bd_link,
            row.display_reverse_proxy_link
        );
    }
    Ok(())
}

fn print_site_detail(row: &FlattenedSite) {
    let site = &row.site;
    println!("{} {}", site.domain_name.bold(), site.id.yellow());
    println!("  File server: {} ({})", row.group_name.cyan(), row.group_id);
    println!("  Admin user: {}", site.admin_user);
    println!("  Database: {}", row.display_bd_link);
    println!("  Reverse proxy: {}", row.display_reverse_proxy_link);
    for kind in [SiteAssociation::Backup, SiteAssociation::EmailService] {
        if let Some(id) = site.association(kind) {
            println!("  {kind}: {id}");
        }
    }
    for mx in &site.email_mx_records {
        println!("  MX: {mx}");
    }
    for field in &site.custom_fields {
        println!("  {}: {}", field.label, field.value);
    }
}

fn print_stats(format: OutputFormat, stats: &Stats) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(stats);
    }
    for category in ServerCategory::ALL {
        println!("{:<22} {}", category.as_str().cyan(), stats.count(category));
    }
    println!("{:<22} {}", "SITES".cyan(), stats.total_sites);
    Ok(())
}

//! movie-query CLI: co-stars and degrees of separation.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use movie_query::config::{Config, DatasetSize};
use movie_query::engine::QueryEngine;
use movie_query::error::{Entity, QueryError};
use movie_query::graph::Separation;
use movie_query::id::ActorId;

const KEVIN_BACON: &str = "Kevin Bacon";

#[derive(Parser)]
#[command(name = "movie-query", version, about = "Actor co-stars and degrees of separation")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Dataset size to fetch from the dataset server.
    #[arg(long, global = true, value_enum)]
    size: Option<DatasetSize>,

    /// Load the dataset from a local JSON file instead of the network.
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// Disable the on-disk HTTP cache.
    #[arg(long, global = true)]
    no_cache: bool,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up actor ids by exact name.
    Actor {
        /// Full actor name (case-sensitive).
        name: String,
    },

    /// List the movies an actor appears in.
    Movies {
        /// Actor id or exact name.
        actor: String,
    },

    /// List an actor's co-stars.
    Costars {
        /// Actor id or exact name.
        actor: String,
    },

    /// Degrees of separation between two actors.
    Separation {
        /// First actor id or exact name.
        from: String,
        /// Second actor id or exact name.
        to: String,
        /// Also print one shortest chain of shared movies.
        #[arg(long)]
        path: bool,
    },

    /// Degrees of separation from Kevin Bacon.
    Bacon {
        /// Actor id or exact name.
        actor: String,
    },

    /// Show dataset statistics.
    Info,

    /// Show connected components of the collaboration graph.
    Components {
        /// Number of components to show.
        #[arg(long, default_value = "5")]
        top: usize,
    },
}

#[derive(Serialize)]
struct ActorRow<'a> {
    id: &'a ActorId,
    name: &'a str,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(size) = cli.size {
        config.dataset.size = size;
    }
    if let Some(file) = cli.file.clone() {
        config.dataset.file = Some(file);
    }
    if cli.no_cache {
        config.dataset.cache = false;
    }

    let engine = QueryEngine::from_config(&config.dataset)?;

    match cli.command {
        Commands::Actor { name } => {
            let ids = engine.actor_ids_by_name(&name);
            if ids.is_empty() {
                return Err(QueryError::NotFound {
                    entity: Entity::ActorName,
                    key: name,
                }
                .into());
            }
            if cli.json {
                print_json(&ids)?;
            } else {
                for id in &ids {
                    println!("{id}");
                }
                if ids.len() > 1 {
                    eprintln!("note: {} actors share this name; lookups use {}", ids.len(), ids[0]);
                }
            }
        }

        Commands::Movies { actor } => {
            let id = engine.resolve_actor(&actor)?;
            let movies = engine.movies_with_titles(id.as_str())?;
            if cli.json {
                print_json(&movies)?;
            } else {
                let name = engine.actor_name_by_id(id.as_str())?;
                println!("{name} ({id}) appears in {} movies:", movies.len());
                for (movie, title) in &movies {
                    println!("  {title} ({movie})");
                }
            }
        }

        Commands::Costars { actor } => {
            let id = engine.resolve_actor(&actor)?;
            let costars = engine.costars_of(id.as_str())?;
            let rows = costars
                .iter()
                .map(|c| {
                    Ok(ActorRow {
                        id: c,
                        name: engine.actor_name_by_id(c.as_str())?,
                    })
                })
                .collect::<std::result::Result<Vec<_>, movie_query::error::QueryError>>()?;
            if cli.json {
                print_json(&rows)?;
            } else {
                let name = engine.actor_name_by_id(id.as_str())?;
                println!("{name} ({id}) has {} co-stars:", rows.len());
                for row in &rows {
                    println!("  {} ({})", row.name, row.id);
                }
            }
        }

        Commands::Separation { from, to, path } => {
            let a = engine.resolve_actor(&from)?;
            let b = engine.resolve_actor(&to)?;
            print_separation(&engine, &a, &b, path, cli.json)?;
        }

        Commands::Bacon { actor } => {
            let bacon = engine.actor_id_by_name(KEVIN_BACON)?;
            let id = engine.resolve_actor(&actor)?;
            print_separation(&engine, &bacon, &id, false, cli.json)?;
        }

        Commands::Info => {
            let info = engine.info();
            if cli.json {
                print_json(&info)?;
            } else {
                print!("{info}");
            }
        }

        Commands::Components { top } => {
            let components = engine.components();
            let shown: Vec<_> = components.iter().take(top).collect();
            if cli.json {
                print_json(&shown)?;
            } else {
                println!("{} components", components.len());
                for c in shown {
                    let preview: Vec<&str> = c
                        .members
                        .iter()
                        .take(3)
                        .map(|m| engine.actor_name_by_id(m.as_str()).unwrap_or(m.as_str()))
                        .collect();
                    println!("  #{} size {}: {}", c.id, c.size, preview.join(", "));
                }
            }
        }
    }

    Ok(())
}

fn print_separation(
    engine: &QueryEngine,
    a: &ActorId,
    b: &ActorId,
    with_path: bool,
    json: bool,
) -> Result<()> {
    let separation = engine.degrees_of_separation(a.as_str(), b.as_str())?;
    let chain = if with_path {
        engine.separation_path(a.as_str(), b.as_str())?
    } else {
        None
    };

    if json {
        #[derive(Serialize)]
        struct Out<'a> {
            from: &'a ActorId,
            to: &'a ActorId,
            separation: Separation,
            #[serde(skip_serializing_if = "Option::is_none")]
            path: Option<Vec<movie_query::graph::Link>>,
        }
        return print_json(&Out {
            from: a,
            to: b,
            separation,
            path: chain,
        });
    }

    let name_a = engine.actor_name_by_id(a.as_str())?;
    let name_b = engine.actor_name_by_id(b.as_str())?;
    match separation {
        Separation::Degrees(d) => println!("{name_a} and {name_b}: {d} degrees of separation"),
        Separation::Unreachable => println!("{name_a} and {name_b} are not connected"),
    }
    for link in chain.iter().flatten() {
        println!(
            "  {} -> {} in {}",
            engine.actor_name_by_id(link.from.as_str())?,
            engine.actor_name_by_id(link.to.as_str())?,
            engine.movie_title_by_id(link.movie.as_str())?
        );
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{json}");
    Ok(())
}

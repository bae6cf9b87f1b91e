//! Command-line front end for the shelter catalog.
//!
//! # Responsibility
//! - Map subcommands onto `PetService` use-cases.
//! - Resolve settings from flags first, then `SHELTER_*` environment values.
//! - Print human-readable lines by default, JSON with `--json`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::info;
use shelter_core::db::open_db;
use shelter_core::{
    core_version, init_logging_from_config, ping, Gender, PetFields, PetFilter, PetService,
    PetTarget, Projection, ShelterConfig, SortOrder, SqlitePetRepository,
};

#[derive(Debug, Parser)]
#[command(name = "shelter")]
#[command(about = "Pet shelter catalog backed by SQLite")]
struct Cli {
    /// Database file (overrides SHELTER_DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Log level (overrides SHELTER_LOG_LEVEL).
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Absolute log directory (overrides SHELTER_LOG_DIR).
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a health-check response.
    Ping,
    /// Print the core version.
    Version,
    /// List pets in the catalog.
    List(ListArgs),
    /// Show one pet by id.
    Show(IdArgs),
    /// Add a pet.
    Add(AddArgs),
    /// Update fields of one pet.
    Update(UpdateArgs),
    /// Remove one pet by id.
    Remove(IdArgs),
    /// Insert the sample "Tommy" pet.
    Dummy,
    /// Delete every pet.
    Clear,
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Print full rows as JSON.
    #[arg(long)]
    json: bool,
    /// Sort keys, e.g. "weight desc, name".
    #[arg(long)]
    sort: Option<String>,
    /// Name substring, ignoring case.
    #[arg(long)]
    name: Option<String>,
    /// Gender label or code.
    #[arg(long)]
    gender: Option<String>,
}

#[derive(Debug, Args)]
struct IdArgs {
    id: i64,
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct AddArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    breed: Option<String>,
    /// Gender label (unknown|male|female) or code (0|1|2).
    #[arg(long, default_value = "unknown")]
    gender: String,
    #[arg(long, allow_negative_numbers = true)]
    weight: Option<i64>,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    id: i64,
    #[arg(long)]
    name: Option<String>,
    #[arg(long, conflicts_with = "clear_breed")]
    breed: Option<String>,
    /// Set breed to empty (NULL).
    #[arg(long)]
    clear_breed: bool,
    #[arg(long)]
    gender: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    weight: Option<i64>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Ping => {
            println!("shelter_core ping={}", ping());
            return Ok(());
        }
        Command::Version => {
            println!("shelter_core version={}", core_version());
            return Ok(());
        }
        _ => {}
    }

    let config = resolve_config(&cli)?;
    init_logging_from_config(&config)?;
    info!("event=cli_start module=cli status=ok");

    let conn = open_db(&config.db_path).map_err(|err| format!("database open failed: {err}"))?;
    let repo = SqlitePetRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let service = PetService::new(repo);

    match cli.command {
        Command::Ping | Command::Version => Ok(()),
        Command::List(args) => run_list(&service, args),
        Command::Show(args) => run_show(&service, args),
        Command::Add(args) => run_add(&service, args),
        Command::Update(args) => run_update(&service, args),
        Command::Remove(args) => {
            let removed = service
                .delete(PetTarget::Item(args.id), &PetFilter::all())
                .map_err(|err| err.to_string())?;
            println!("removed {removed}");
            Ok(())
        }
        Command::Dummy => {
            let id = service.insert_dummy_pet().map_err(|err| err.to_string())?;
            println!("inserted {}", PetTarget::Item(id));
            Ok(())
        }
        Command::Clear => {
            let removed = service.delete_all_pets().map_err(|err| err.to_string())?;
            println!("removed {removed} pets");
            Ok(())
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<ShelterConfig, String> {
    let mut config = ShelterConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(db) = cli.db.as_ref() {
        config.db_path = db.clone();
    }
    if let Some(level) = cli.log_level.as_ref() {
        config.log_level = level.clone();
    }
    if let Some(dir) = cli.log_dir.as_ref() {
        config.log_dir = Some(dir.clone());
    }
    Ok(config)
}

type Service<'conn> = PetService<SqlitePetRepository<'conn>>;

fn run_list(service: &Service<'_>, args: ListArgs) -> Result<(), String> {
    let order = match args.sort.as_deref() {
        Some(raw) => SortOrder::parse(raw).ok_or_else(|| format!("invalid --sort `{raw}`"))?,
        None => SortOrder::default(),
    };
    let filter = PetFilter {
        name_contains: args.name,
        gender: args.gender.as_deref().map(parse_gender).transpose()?,
        ..PetFilter::default()
    };

    let cursor = service
        .query(PetTarget::Collection, &filter, &Projection::all(), &order)
        .map_err(|err| err.to_string())?;
    let rows = cursor.rows().map_err(|err| err.to_string())?;

    if args.json {
        let text = serde_json::to_string_pretty(&rows).map_err(|err| err.to_string())?;
        println!("{text}");
        return Ok(());
    }

    if rows.is_empty() {
        println!("no pets");
    }
    for row in rows {
        println!(
            "{}\t{}\t{}",
            row.id.unwrap_or_default(),
            row.name.unwrap_or_default(),
            row.breed.unwrap_or_default()
        );
    }
    Ok(())
}

fn run_show(service: &Service<'_>, args: IdArgs) -> Result<(), String> {
    let pet = service
        .get_pet(args.id)
        .map_err(|err| err.to_string())?
        .ok_or_else(|| format!("pet not found: {}", args.id))?;

    if args.json {
        let text = serde_json::to_string_pretty(&pet).map_err(|err| err.to_string())?;
        println!("{text}");
    } else {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            pet.id,
            pet.name,
            pet.breed.as_deref().unwrap_or(""),
            pet.gender.label(),
            pet.weight
        );
    }
    Ok(())
}

fn run_add(service: &Service<'_>, args: AddArgs) -> Result<(), String> {
    let mut fields = PetFields::new()
        .name(args.name)
        .gender_code(parse_gender_code(&args.gender)?);
    if let Some(breed) = args.breed {
        fields = fields.breed(breed);
    }
    if let Some(weight) = args.weight {
        fields = fields.weight(weight);
    }

    let target = service
        .insert(PetTarget::Collection, &fields)
        .map_err(|err| err.to_string())?;
    println!("inserted {target}");
    Ok(())
}

fn run_update(service: &Service<'_>, args: UpdateArgs) -> Result<(), String> {
    let mut fields = PetFields::new();
    if let Some(name) = args.name {
        fields = fields.name(name);
    }
    if let Some(breed) = args.breed {
        fields = fields.breed(breed);
    }
    if args.clear_breed {
        fields = fields.clear_breed();
    }
    if let Some(gender) = args.gender.as_deref() {
        fields = fields.gender_code(parse_gender_code(gender)?);
    }
    if let Some(weight) = args.weight {
        fields = fields.weight(weight);
    }

    let changed = service
        .update(PetTarget::Item(args.id), &PetFilter::all(), &fields)
        .map_err(|err| err.to_string())?;
    println!("updated {changed}");
    Ok(())
}

fn parse_gender(value: &str) -> Result<Gender, String> {
    Gender::parse(value).ok_or_else(|| format!("invalid gender `{value}`"))
}

/// Numeric input passes through unchecked so the core reports invalid codes.
fn parse_gender_code(value: &str) -> Result<i64, String> {
    if let Ok(code) = value.trim().parse::<i64>() {
        return Ok(code);
    }
    parse_gender(value).map(Gender::code)
}

#[cfg(test)]
mod tests {
    use super::{parse_gender_code, Cli};
    use clap::Parser;

    #[test]
    fn gender_code_accepts_labels_and_raw_numbers() {
        assert_eq!(parse_gender_code("female"), Ok(2));
        assert_eq!(parse_gender_code("7"), Ok(7));
        assert!(parse_gender_code("lizard").is_err());
    }

    #[test]
    fn global_db_flag_parses_after_subcommand() {
        let cli = Cli::try_parse_from(["shelter", "list", "--db", "/tmp/x.db"]).unwrap();
        assert_eq!(cli.db.as_deref(), Some(std::path::Path::new("/tmp/x.db")));
    }

    #[test]
    fn update_rejects_breed_with_clear_breed() {
        let result =
            Cli::try_parse_from(["shelter", "update", "1", "--breed", "Lab", "--clear-breed"]);
        assert!(result.is_err());
    }
}

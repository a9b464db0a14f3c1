use std::env;
use std::path::Path;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use tracing_subscriber::EnvFilter;

use relaycraft::{
    read_cl2_dir, AgeGroup, Course, Directory, Event, RelayGenerator, RelaySettings, Sex, Stroke,
    Swimmer, TimeStandards,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("ingest") => run_ingest(&args[2..]),
        Some("history") => run_history(&args[2..]),
        Some("relays") => run_relays(&args[2..]),
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("relaycraft {}", relaycraft::VERSION);
    println!();
    println!("Usage:");
    println!("  relaycraft ingest  <data-dir> [--json]");
    println!("  relaycraft history <data-dir> \"Last, First\" [standards-dir]");
    println!(
        "  relaycraft relays  <data-dir> <club> <F|M> <age-group> <course> \
         <free|medley> <leg-distance> [num-relays] [standards-dir]"
    );
    println!();
    println!("Age groups: 10&u 11-12 13-14 15-16 17-18 senior");
    println!("Courses:    SCY SCM LCM");
}

/// Load every .cl2 file under the data directory into a fresh directory.
fn load(data_dir: &str) -> Result<Directory> {
    let mut directory = Directory::new();
    let files = read_cl2_dir(&mut directory, Path::new(data_dir))?;
    println!("✓ Read {} files from {}", files, data_dir);
    Ok(directory)
}

fn load_standards(arg: Option<&String>) -> Result<TimeStandards> {
    match arg {
        Some(dir) => TimeStandards::load_dir(Path::new(dir)),
        None => Ok(TimeStandards::new()),
    }
}

fn run_ingest(args: &[String]) -> Result<()> {
    let data_dir = match args.first() {
        Some(dir) => dir,
        None => bail!("usage: relaycraft ingest <data-dir> [--json]"),
    };

    let directory = load(data_dir)?;
    let quality = directory.quality();

    if args.iter().any(|arg| arg == "--json") {
        println!("{}", serde_json::to_string_pretty(quality)?);
        return Ok(());
    }

    println!();
    println!("Ingestion summary");
    println!("  Swimmers:  {}", directory.swimmer_count());
    println!("  Clubs:     {}", directory.clubs().count());
    println!("  Records:   {}", quality.records_ingested);
    println!("  Dropped:   {}", quality.records_dropped);
    if !quality.issues.is_empty() {
        println!();
        println!("Data quality: {}", quality.summary());
        for issue in &quality.issues {
            let provenance = match (&issue.source_file, issue.line_number) {
                (Some(file), Some(line)) => format!(" [{}:{}]", file, line),
                _ => String::new(),
            };
            println!("  - {}: {}{}", issue.kind.as_str(), issue.message, provenance);
        }
    }
    Ok(())
}

fn run_history(args: &[String]) -> Result<()> {
    let (data_dir, name) = match (args.first(), args.get(1)) {
        (Some(dir), Some(name)) => (dir, name),
        _ => bail!("usage: relaycraft history <data-dir> \"Last, First\" [standards-dir]"),
    };
    let (last_name, first_name) = match name.split_once(',') {
        Some((last, first)) => (last.trim(), first.trim()),
        None => bail!("swimmer name must be \"Last, First\""),
    };

    let directory = load(data_dir)?;
    let standards = load_standards(args.get(2))?;
    let today = chrono::Local::now().date_naive();

    let swimmers = directory.find_swimmers_by_name(last_name, first_name);
    if swimmers.is_empty() {
        println!("No swimmer named \"{}, {}\" found.", last_name, first_name);
        return Ok(());
    }
    for swimmer in swimmers {
        print_swimmer_history(swimmer, &standards, today);
    }
    Ok(())
}

fn print_swimmer_history(swimmer: &Swimmer, standards: &TimeStandards, today: NaiveDate) {
    let (min_age, max_age) = swimmer.age_range(today);
    let age = if min_age == max_age {
        format!("{}", min_age)
    } else {
        format!("{}-{}", min_age, max_age)
    };
    println!();
    println!(
        "{}  ({}, age {}, id {})",
        swimmer.full_name(),
        swimmer.sex.as_str(),
        age,
        swimmer.long_id.as_deref().unwrap_or(&swimmer.short_id)
    );
    for performance in swimmer.time_history() {
        let annotation = standards
            .highest_standard(performance.final_time, swimmer.sex, max_age, performance.event)
            .map(|s| format!("[{}]", s))
            .unwrap_or_default();
        println!(
            "  {:<12} {:>8}  {}  {:<30} {:<6}",
            performance.event.to_string(),
            performance.final_time.to_string(),
            performance.date,
            performance.meet_name,
            annotation
        );
    }
}

fn run_relays(args: &[String]) -> Result<()> {
    if args.len() < 7 {
        bail!(
            "usage: relaycraft relays <data-dir> <club> <F|M> <age-group> <course> \
             <free|medley> <leg-distance> [num-relays] [standards-dir]"
        );
    }
    let data_dir = &args[0];
    let club = args[1].clone();
    let sex = Sex::from_code(&args[2])?;
    let age_group = AgeGroup::from_label(&args[3])
        .ok_or_else(|| anyhow::anyhow!("unknown age group: {}", args[3]))?;
    let course = match args[4].as_str() {
        "SCY" => Course::Scy,
        "SCM" => Course::Scm,
        "LCM" => Course::Lcm,
        other => bail!("unknown course: {}", other),
    };
    let stroke = match args[5].as_str() {
        "free" => Stroke::FreestyleRelay,
        "medley" => Stroke::MedleyRelay,
        other => bail!("relay kind must be free or medley, got {}", other),
    };
    let leg_distance: u32 = args[6].parse()?;
    let num_relays: usize = match args.get(7) {
        Some(n) => n.parse()?,
        None => 2,
    };
    let standards = load_standards(args.get(8))?;

    let event = Event::new(leg_distance * 4, stroke, course)?;
    let directory = load(data_dir)?;
    let relay_date = chrono::Local::now().date_naive();

    let generator = RelayGenerator::new(RelaySettings {
        club: club.clone(),
        sex,
        age_range: age_group.range(),
        relay_date,
        num_relays,
    });
    let relays = generator.generate(&directory, event);

    let letters = ["A", "B", "C", "D", "E", "F"];
    for (index, slot) in relays.iter().enumerate() {
        let letter = letters.get(index).copied().unwrap_or("?");
        println!();
        match slot {
            None => println!(
                "4x{} {} {} '{}': not enough eligible swimmers",
                leg_distance, stroke, course, letter
            ),
            Some(relay) => {
                let annotation = standards
                    .highest_standard(relay.total_time, sex, age_group.range().1, event)
                    .map(|s| format!(" {}", s))
                    .unwrap_or_default();
                println!(
                    "4x{} {} {} '{}' [{}]{}",
                    leg_distance, stroke, course, letter, relay.total_time, annotation
                );
                for leg in &relay.legs {
                    let swimmer = match directory.swimmer(leg.swimmer) {
                        Some(swimmer) => swimmer,
                        None => continue,
                    };
                    let (_, max_age) = swimmer.age_range(relay_date);
                    let leg_annotation = standards
                        .highest_standard(leg.best_time, sex, max_age, leg.event)
                        .map(|s| format!("[{}]", s))
                        .unwrap_or_default();
                    let meet = swimmer
                        .best_performance(leg.event)
                        .map(|p| p.meet_name.clone())
                        .unwrap_or_default();
                    println!(
                        "  {:<6}  {:<28} {:>8}  {:<5} {:<30}",
                        leg.stroke.to_string(),
                        swimmer.full_name(),
                        leg.best_time.to_string(),
                        leg_annotation,
                        meet
                    );
                }
            }
        }
    }
    Ok(())
}

use crate::cli::commands::open_session;
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::dashboard::{Dashboard, DashboardLogic, Heatmap};
use crate::errors::AppResult;
use crate::ui::messages::{header, success, warning};
use crate::utils::colors::{CYAN, GREY, RED, RESET, YELLOW};
use crate::utils::date::{parse_optional_date, today, week_label};
use crate::utils::table::Table;

fn heat_cell(n: usize) -> String {
    match n {
        0 => format!("{GREY}·{RESET}"),
        1 => format!("{YELLOW}1{RESET}"),
        n => format!("{RED}{n}{RESET}"),
    }
}

fn print_kpis(d: &Dashboard) {
    let k = &d.kpis;
    let lines = [
        ("Active projects", k.active_projects.to_string()),
        (
            "Confirmed / not confirmed",
            format!("{} / {}", k.confirmed_projects, k.unconfirmed_projects),
        ),
        ("Personnel", k.total_personnel.to_string()),
        (
            "Available / busy",
            format!("{} / {}", k.available_personnel, k.busy_personnel),
        ),
        ("Active assignments", k.active_assignments.to_string()),
        ("Over-assigned people", k.overassigned_people.to_string()),
    ];
    for (label, value) in lines {
        println!("{CYAN}• {label}:{RESET} {value}");
    }
    println!();
}

fn print_heatmap(heat: &Heatmap) {
    if heat.rows.is_empty() {
        println!("{GREY}No assignments in the heatmap window.{RESET}\n");
        return;
    }

    let labels: Vec<String> = heat
        .weeks
        .iter()
        .map(|w| week_label(*w).split_once("-W").map(|(_, n)| format!("W{n}")).unwrap_or_default())
        .collect();

    let mut headers: Vec<&str> = vec!["Person"];
    headers.extend(labels.iter().map(String::as_str));

    let mut table = Table::with_headers(&headers);
    for (person, counts) in &heat.rows {
        let mut row = vec![person.clone()];
        row.extend(counts.iter().map(|n| heat_cell(*n)));
        table.add_row(row);
    }
    print!("{}", table.render());
}

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Dashboard { person, as_of } = &cli.command else {
        return Ok(());
    };

    let as_of = parse_optional_date(as_of.as_ref())?.unwrap_or_else(today);
    let (pool, session) = open_session(cli, cfg)?;
    let d = DashboardLogic::build(&pool.conn, cfg, &session, person.as_deref(), as_of)?;

    match &d.person {
        Some(p) => header(format!("Dashboard for {} as of {}", p.name, d.as_of)),
        None => header(format!("Dashboard as of {}", d.as_of)),
    }
    print_kpis(&d);

    header("Alerts");
    if d.alerts.is_empty() {
        success("No pending alerts");
    } else {
        for a in &d.alerts {
            warning(a.message());
        }
    }
    println!();

    header("Weekly load");
    print_heatmap(&d.heatmap);
    Ok(())
}

//! Text table and JSON rendering of a ranked tick.

use std::io;

use serde::Serialize;

use crate::context::RunContext;
use crate::display::{Attr, Display};
use crate::format::format_count;
use crate::pool::{RecordPool, SampleRecord};
use crate::ranking::{Column, Ranking, SortMetric, Totals};

/// Line printed once before the first tick of a plain periodic run.
pub const INTERVAL_BANNER: &str = "Change in page faults (average per second):\n";

/// Table shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Single sample: absolute counters only.
    Snapshot,
    /// Periodic sample: absolute and delta counters.
    Interval,
}

fn highlight(sort: SortMetric, column: Column) -> Attr {
    if sort.uses(column) {
        Attr::UNDERLINE | Attr::BOLD
    } else {
        Attr::BOLD
    }
}

fn arrow(rec: &SampleRecord) -> &'static str {
    match rec.total_delta() {
        d if d > 0 => "^ ",
        d if d < 0 => "v ",
        _ => "  ",
    }
}

fn heading(display: &mut dyn Display, ctx: &RunContext, layout: Layout) -> io::Result<()> {
    let w = ctx.pid_width;

    if layout == Layout::Snapshot {
        return display.print(&format!(
            " {:>w$.w$}  Major   Minor    Swap  User       Command\n",
            "PID"
        ));
    }

    let cells = [
        (Column::Major, "Major", "   "),
        (Column::Minor, "Minor", "  "),
        (Column::DeltaMajor, "+Major", "  "),
        (Column::DeltaMinor, "+Minor", "    "),
    ];

    display.set_attributes(Attr::BOLD)?;
    display.print(&format!(" {:>w$.w$}  ", "PID"))?;
    for (column, label, gap) in cells {
        display.set_attributes(highlight(ctx.sort, column))?;
        display.print(label)?;
        display.set_attributes(Attr::NORMAL)?;
        display.print(gap)?;
    }
    display.set_attributes(highlight(ctx.sort, Column::Swap))?;
    display.print("Swap")?;
    display.set_attributes(Attr::BOLD)?;
    display.print(&format!(
        "  {}User       Command\n",
        if ctx.arrows { "D " } else { "" }
    ))?;
    display.set_attributes(Attr::NORMAL)
}

fn row(display: &mut dyn Display, ctx: &RunContext, rec: &SampleRecord, layout: Layout) -> io::Result<()> {
    let w = ctx.pid_width;
    let line = match layout {
        Layout::Snapshot => format!(
            " {:>w$} {:>7} {:>7} {:>7} {:<10.10} {}\n",
            rec.pid,
            format_count(rec.major),
            format_count(rec.minor),
            format_count(rec.swap),
            rec.user_name(),
            rec.command(),
        ),
        Layout::Interval => format!(
            " {:>w$} {:>7} {:>7} {:>7} {:>7} {:>7} {}{:<10.10} {}\n",
            rec.pid,
            format_count(rec.major),
            format_count(rec.minor),
            format_count(rec.delta_major),
            format_count(rec.delta_minor),
            format_count(rec.swap),
            if ctx.arrows { arrow(rec) } else { "" },
            rec.user_name(),
            rec.command(),
        ),
    };
    display.print(&line)
}

fn totals_row(display: &mut dyn Display, ctx: &RunContext, totals: &Totals, layout: Layout) -> io::Result<()> {
    let w = ctx.pid_width;
    let line = match layout {
        Layout::Snapshot => format!(
            " {:>w$} {:>7} {:>7}\n\n",
            "Total:",
            format_count(totals.major),
            format_count(totals.minor),
        ),
        Layout::Interval => format!(
            " {:>w$} {:>7} {:>7} {:>7} {:>7}\n\n",
            "Total:",
            format_count(totals.major),
            format_count(totals.minor),
            format_count(totals.delta_major),
            format_count(totals.delta_minor),
        ),
    };
    display.print(&line)
}

/// Prints heading, one row per ranked record and the totals row.
pub fn render_text(
    display: &mut dyn Display,
    ctx: &RunContext,
    pool: &RecordPool,
    ranking: &Ranking,
    layout: Layout,
) -> io::Result<()> {
    heading(display, ctx, layout)?;
    for &id in &ranking.order {
        row(display, ctx, pool.get(id), layout)?;
    }
    totals_row(display, ctx, &ranking.totals, layout)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonProcess<'a> {
    pid: i32,
    major: i64,
    minor: i64,
    delta_major: i64,
    delta_minor: i64,
    swap: i64,
    user: &'a str,
    command: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonTotals {
    major: i64,
    minor: i64,
    delta_major: i64,
    delta_minor: i64,
    swap: i64,
}

#[derive(Debug, Serialize)]
struct JsonTick<'a> {
    processes: Vec<JsonProcess<'a>>,
    totals: JsonTotals,
    timestamp: i64,
}

/// Builds the JSON object for one tick.
pub fn tick_json(pool: &RecordPool, ranking: &Ranking, timestamp: i64) -> serde_json::Result<String> {
    let processes = ranking
        .order
        .iter()
        .map(|&id| {
            let rec = pool.get(id);
            JsonProcess {
                pid: rec.pid,
                major: rec.major,
                minor: rec.minor,
                delta_major: rec.delta_major,
                delta_minor: rec.delta_minor,
                swap: rec.swap,
                user: rec.user_name(),
                command: rec.command(),
            }
        })
        .collect();

    let t = &ranking.totals;
    serde_json::to_string(&JsonTick {
        processes,
        totals: JsonTotals {
            major: t.major,
            minor: t.minor,
            delta_major: t.delta_major,
            delta_minor: t.delta_minor,
            swap: t.swap,
        },
        timestamp,
    })
}

/// Prints one tick as a single JSON line.
pub fn render_json(
    display: &mut dyn Display,
    pool: &RecordPool,
    ranking: &Ranking,
    timestamp: i64,
) -> io::Result<()> {
    let mut line = tick_json(pool, ranking, timestamp).map_err(io::Error::from)?;
    line.push('\n');
    display.print(&line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::PlainDisplay;
    use crate::pool::RecordList;
    use crate::ranking::{rank, DumpMode};

    fn ranked(records: &[(i32, i64, i64)]) -> (RecordPool, Ranking) {
        let mut pool = RecordPool::new();
        let mut list = RecordList::new();
        for &(pid, major, minor) in records {
            let id = pool.acquire().unwrap();
            let rec = pool.get_mut(id);
            rec.pid = pid;
            rec.major = major;
            rec.minor = minor;
            list.push(id);
        }
        let ranking = rank(&mut pool, &list, &RecordList::new(), SortMetric::MajorMinor, DumpMode::Full);
        (pool, ranking)
    }

    fn render(ctx: &RunContext, pool: &RecordPool, ranking: &Ranking, layout: Layout) -> String {
        let mut display = PlainDisplay::new(Vec::new());
        render_text(&mut display, ctx, pool, ranking, layout).unwrap();
        String::from_utf8(display.into_inner()).unwrap()
    }

    #[test]
    fn test_snapshot_layout() {
        let (pool, ranking) = ranked(&[(42, 3, 1200)]);
        let out = render(&RunContext::default(), &pool, &ranking, Layout::Snapshot);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "    PID  Major   Minor    Swap  User       Command");
        assert_eq!(
            lines[1],
            "     42      3    1200       0  <unknown>  <unknown>"
        );
        assert_eq!(lines[2], " Total:      3    1200 ");
        assert!(out.ends_with("\n\n"));
    }

    #[test]
    fn test_interval_layout_with_arrows() {
        let (pool, ranking) = ranked(&[(7, 1, 0)]);
        let ctx = RunContext {
            arrows: true,
            ..RunContext::default()
        };
        let out = render(&ctx, &pool, &ranking, Layout::Interval);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(
            lines[0],
            "    PID  Major   Minor  +Major  +Minor    Swap  D User       Command"
        );
        assert!(lines[1].contains("^ <unknown>"), "{:?}", lines[1]);
        assert!(lines[2].starts_with(" Total:"));
    }

    #[test]
    fn test_json_zero_processes() {
        let (pool, ranking) = ranked(&[]);
        let json = tick_json(&pool, &ranking, 1_700_000_000).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["processes"].as_array().unwrap().len(), 0);
        assert_eq!(value["totals"]["deltaMajor"], 0);
        assert_eq!(value["timestamp"], 1_700_000_000i64);
    }

    #[test]
    fn test_json_field_names() {
        let (pool, ranking) = ranked(&[(9, 2, 5)]);
        let json = tick_json(&pool, &ranking, 1).unwrap();
        assert_eq!(
            json,
            "{\"processes\":[{\"pid\":9,\"major\":2,\"minor\":5,\"deltaMajor\":2,\"deltaMinor\":5,\"swap\":0,\"user\":\"<unknown>\",\"command\":\"<unknown>\"}],\"totals\":{\"major\":2,\"minor\":5,\"deltaMajor\":2,\"deltaMinor\":5,\"swap\":0},\"timestamp\":1}"
        );
    }
}
